// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit the same event with structured `tracing` fields
//! at the level documented on the type.
//!
//! # Organization
//!
//! * `pipeline` - Pipeline initialization and invocation events
//! * `valve` - Built-in valve events (redirects, cache hits, slow chains)
//! * `registry` - Service registration, trackers and plugin context teardown
//! * `validation` - Configuration validation errors
//!
//! # Usage Pattern
//!
//! ```rust
//! use valvechain::observability::messages::registry::ServiceRegistered;
//!
//! let msg = ServiceRegistered {
//!     name: "dialog.id",
//!     service_type: "my_plugin::DialogService",
//!     provider_count: 1,
//! };
//!
//! tracing::debug!("{}", msg);
//! ```

use std::fmt::Display;
use tracing::Span;

pub mod pipeline;
pub mod registry;
pub mod validation;
pub mod valve;

/// Emits a message as a structured `tracing` event or opens a span carrying its fields.
pub trait StructuredLog: Display {
    /// Log the message at its documented level with structured fields.
    fn log(&self);

    /// Create a span carrying the message fields.
    fn span(&self, name: &str) -> Span;
}
