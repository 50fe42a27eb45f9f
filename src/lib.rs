// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // valve backends
pub mod config;     // config + runtime builder
pub mod errors;     // error handling
pub mod observability;
pub mod pipeline;   // valve chain engine
pub mod registry;   // session-scoped service registry
pub mod traits;     // unified abstractions
