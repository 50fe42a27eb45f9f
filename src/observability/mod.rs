// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and operational
//! logging throughout valvechain. Message types follow a struct-based pattern
//! with `Display` trait implementation to:
//!
//! * Eliminate magic strings scattered throughout the codebase
//! * Keep field names consistent between the human-readable text and structured fields
//! * Provide consistent, structured logging output
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::pipeline` - Pipeline initialization and invocation events
//! * `messages::valve` - Events emitted by the built-in valves
//! * `messages::registry` - Service registry and plugin context events
//! * `messages::validation` - Configuration validation errors
//!
//! # Usage
//!
//! ```rust
//! use valvechain::observability::messages::pipeline::PipelineInitialized;
//! use valvechain::observability::messages::StructuredLog;
//!
//! let msg = PipelineInitialized {
//!     pipeline: "site",
//!     valve_count: 4,
//!     cleanup_valve_count: 1,
//! };
//!
//! msg.log();
//! ```

pub mod messages;
