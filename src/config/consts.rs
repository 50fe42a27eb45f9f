// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Capacity of the `page_cache` valve when `max_entries` is not configured
pub const DEFAULT_CACHE_ENTRIES: usize = 256;
/// Upper bound on `page_cache` capacity
pub const MAX_CACHE_ENTRIES: usize = 65_536;
/// Status used by the `redirect` valve when `status` is not configured
pub const DEFAULT_REDIRECT_STATUS: u16 = 302;
/// Threshold above which the `diagnostics` valve reports a slow request
pub const DEFAULT_SLOW_THRESHOLD_MS: u64 = 500;
/// Body template used by the `render` valve when `template` is not configured
pub const DEFAULT_RENDER_TEMPLATE: &str = "rendered {path}";
