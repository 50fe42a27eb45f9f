// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Session-scoped service registry and the per-component plugin context.
//!
//! A [`ServiceRegistry`] is created per session (or container) and passed
//! explicitly to whatever needs it; there is no global instance. Components
//! publish and discover collaborators through it by logical name, and use a
//! [`PluginContext`] to tie their registrations to their own start/stop
//! lifecycle.

mod plugin_context;
mod service_registry;

pub use plugin_context::PluginContext;
pub use service_registry::ServiceRegistry;
