// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration validation warnings and errors.
//!
//! This module contains message types for logging events related to:
//! * Pipeline name checks
//! * Stage ordering reference resolution
//! * Cyclic ordering constraint detection

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Cyclic ordering constraint detected in a valve chain.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use valvechain::observability::messages::validation::CyclicOrderingDetected;
///
/// let cycle = vec!["cache", "render", "cache"];
/// let msg = CyclicOrderingDetected {
///     pipeline: "site",
///     cycle: &cycle,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct CyclicOrderingDetected<'a> {
    pub pipeline: &'a str,
    pub cycle: &'a [&'a str],
}

impl Display for CyclicOrderingDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cyclic valve ordering in pipeline '{}': {}",
            self.pipeline,
            self.cycle.join(" -> ")
        )
    }
}

impl StructuredLog for CyclicOrderingDetected<'_> {
    fn log(&self) {
        tracing::error!(
            pipeline = self.pipeline,
            cycle = self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "span_name",
            name = name,
            pipeline = self.pipeline,
            cycle = self.cycle.join(" -> "),
        )
    }
}

/// A stage's `after`/`before` list names a stage that does not exist.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct UnresolvedOrderingReference<'a> {
    pub pipeline: &'a str,
    pub stage: &'a str,
    pub reference: &'a str,
}

impl Display for UnresolvedOrderingReference<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stage '{}' in pipeline '{}' is ordered against missing stage '{}'",
            self.stage, self.pipeline, self.reference
        )
    }
}

impl StructuredLog for UnresolvedOrderingReference<'_> {
    fn log(&self) {
        tracing::error!(
            pipeline = self.pipeline,
            stage = self.stage,
            reference = self.reference,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "span_name",
            name = name,
            pipeline = self.pipeline,
            stage = self.stage,
            reference = self.reference,
        )
    }
}

/// Configuration validation finished with errors.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ConfigValidationFailed {
    pub error_count: usize,
}

impl Display for ConfigValidationFailed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Configuration validation failed with {} errors",
            self.error_count
        )
    }
}

impl StructuredLog for ConfigValidationFailed {
    fn log(&self) {
        tracing::error!(error_count = self.error_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "span_name",
            name = name,
            error_count = self.error_count,
        )
    }
}
