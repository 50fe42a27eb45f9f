// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for pipeline lifecycle and invocation events.
//!
//! This module contains message types for logging events related to:
//! * Pipeline initialization (valve `initialize()` hooks)
//! * Request invocation through the valve chain (start, completion, short-circuit, failure)
//! * Cleanup chain execution

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Pipeline initialization started.
///
/// # Log Level
/// `debug!` - Lifecycle detail
pub struct PipelineInitializationStarted<'a> {
    pub pipeline: &'a str,
    pub valve_count: usize,
}

impl Display for PipelineInitializationStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Initializing pipeline '{}' with {} valves",
            self.pipeline, self.valve_count
        )
    }
}

impl StructuredLog for PipelineInitializationStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            pipeline = self.pipeline,
            valve_count = self.valve_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "pipeline_initialization",
            span_name = name,
            pipeline = self.pipeline,
            valve_count = self.valve_count,
        )
    }
}

/// Pipeline initialized and ready to accept requests.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use valvechain::observability::messages::pipeline::PipelineInitialized;
///
/// let msg = PipelineInitialized {
///     pipeline: "site",
///     valve_count: 5,
///     cleanup_valve_count: 1,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct PipelineInitialized<'a> {
    pub pipeline: &'a str,
    pub valve_count: usize,
    pub cleanup_valve_count: usize,
}

impl Display for PipelineInitialized<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline '{}' initialized: {} valves, {} cleanup valves",
            self.pipeline, self.valve_count, self.cleanup_valve_count
        )
    }
}

impl StructuredLog for PipelineInitialized<'_> {
    fn log(&self) {
        tracing::info!(
            pipeline = self.pipeline,
            valve_count = self.valve_count,
            cleanup_valve_count = self.cleanup_valve_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pipeline_initialized",
            span_name = name,
            pipeline = self.pipeline,
            valve_count = self.valve_count,
            cleanup_valve_count = self.cleanup_valve_count,
        )
    }
}

/// A valve's `initialize()` hook failed; the pipeline is unusable.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ValveInitializationFailed<'a> {
    pub pipeline: &'a str,
    pub valve: &'a str,
    pub error: &'a dyn Display,
}

impl Display for ValveInitializationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Valve '{}' failed to initialize in pipeline '{}': {}",
            self.valve, self.pipeline, self.error
        )
    }
}

impl StructuredLog for ValveInitializationFailed<'_> {
    fn log(&self) {
        tracing::error!(
            pipeline = self.pipeline,
            valve = self.valve,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "valve_initialization_failed",
            span_name = name,
            pipeline = self.pipeline,
            valve = self.valve,
            error = %self.error,
        )
    }
}

/// A request entered a valve chain.
///
/// # Log Level
/// `debug!` - Per-request detail
///
/// The span variant wraps the whole chain so events emitted by valves carry
/// the pipeline name and request path.
pub struct ChainInvocationStarted<'a> {
    pub pipeline: &'a str,
    pub chain: &'a str,
    pub path: &'a str,
    pub valve_count: usize,
}

impl Display for ChainInvocationStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Invoking {} chain of pipeline '{}' for '{}' ({} valves)",
            self.chain, self.pipeline, self.path, self.valve_count
        )
    }
}

impl StructuredLog for ChainInvocationStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            pipeline = self.pipeline,
            chain = self.chain,
            path = self.path,
            valve_count = self.valve_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pipeline_invocation",
            span_name = name,
            pipeline = self.pipeline,
            chain = self.chain,
            path = self.path,
        )
    }
}

/// Every valve in the chain ran.
///
/// # Log Level
/// `debug!` - Per-request detail
pub struct ChainInvocationCompleted<'a> {
    pub pipeline: &'a str,
    pub chain: &'a str,
    pub path: &'a str,
    pub duration: std::time::Duration,
}

impl Display for ChainInvocationCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} chain of pipeline '{}' completed for '{}' in {:?}",
            self.chain, self.pipeline, self.path, self.duration
        )
    }
}

impl StructuredLog for ChainInvocationCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            pipeline = self.pipeline,
            chain = self.chain,
            path = self.path,
            duration_us = self.duration.as_micros() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "pipeline_invocation_completed",
            span_name = name,
            pipeline = self.pipeline,
            chain = self.chain,
            path = self.path,
            duration = ?self.duration,
        )
    }
}

/// A valve returned without continuing the chain.
///
/// # Log Level
/// `debug!` - Per-request detail; short-circuiting is normal control flow
///
/// # Example
/// ```
/// use valvechain::observability::messages::pipeline::ChainShortCircuited;
///
/// let msg = ChainShortCircuited {
///     pipeline: "site",
///     path: "/old",
///     valve: "redirect",
///     skipped: 3,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct ChainShortCircuited<'a> {
    pub pipeline: &'a str,
    pub path: &'a str,
    pub valve: &'a str,
    pub skipped: usize,
}

impl Display for ChainShortCircuited<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Valve '{}' short-circuited pipeline '{}' for '{}', {} valves skipped",
            self.valve, self.pipeline, self.path, self.skipped
        )
    }
}

impl StructuredLog for ChainShortCircuited<'_> {
    fn log(&self) {
        tracing::debug!(
            pipeline = self.pipeline,
            path = self.path,
            valve = self.valve,
            skipped = self.skipped,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "pipeline_short_circuited",
            span_name = name,
            pipeline = self.pipeline,
            path = self.path,
            valve = self.valve,
            skipped = self.skipped,
        )
    }
}

/// A valve raised an error; it is propagated to the caller untouched.
///
/// # Log Level
/// `debug!` - The dispatch layer owns user-facing error reporting
pub struct ChainInvocationFailed<'a> {
    pub pipeline: &'a str,
    pub chain: &'a str,
    pub path: &'a str,
    pub valve: &'a str,
    pub error: &'a dyn Display,
}

impl Display for ChainInvocationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Valve '{}' failed in {} chain of pipeline '{}' for '{}': {}",
            self.valve, self.chain, self.pipeline, self.path, self.error
        )
    }
}

impl StructuredLog for ChainInvocationFailed<'_> {
    fn log(&self) {
        tracing::debug!(
            pipeline = self.pipeline,
            chain = self.chain,
            path = self.path,
            valve = self.valve,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "pipeline_invocation_failed",
            span_name = name,
            pipeline = self.pipeline,
            chain = self.chain,
            path = self.path,
            valve = self.valve,
            error = %self.error,
        )
    }
}
