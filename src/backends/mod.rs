// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Valve backends for the pipeline engine.
//!
//! # Available Backends
//!
//! ## Local Backend
//! In-process valves selected by the `valve:` key of a stage:
//! - **Flow**: `noop`, `redirect`, `page_cache`
//! - **Context**: `set_attribute`, `require_attribute`, `contributors`
//! - **Output**: `render`
//! - **Observability**: `diagnostics`
//!
//! `service:` stages are also resolved by the local factory, from the
//! session's [`ServiceRegistry`](crate::registry::ServiceRegistry).
//!
//! ## Stub Backend (Test-Only)
//! Testing utilities for engine development (only available in test builds):
//! - **RecordingValve**: records its hooks into a shared `CallLog`
//! - **ShortCircuitValve**: stops the chain
//! - **FailingValve** / **FailingInitValve**: simulated failures
//! - **SleepingValve**: slow stage for timing tests
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use valvechain::backends::local::LocalValveFactory;
//! use valvechain::config::StageConfig;
//! use valvechain::registry::ServiceRegistry;
//! use valvechain::traits::Valve;
//!
//! let factory = LocalValveFactory::new(&Arc::new(ServiceRegistry::new()));
//! let stage = StageConfig::valve("redirect")
//!     .named("legacy")
//!     .option("from", "/old")
//!     .option("to", "/new");
//!
//! let valve = factory.create_valve(&stage)?;
//! assert_eq!(valve.name(), "legacy");
//! # Ok::<(), valvechain::errors::ValveFactoryError>(())
//! ```

pub mod local;
#[cfg(test)]
pub mod stub;
