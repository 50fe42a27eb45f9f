// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for pipeline initialization and request processing.

use thiserror::Error;

/// Error raised by a valve while processing a request.
///
/// The pipeline never wraps or translates it, so callers can `downcast_ref`
/// to the concrete type the valve produced.
pub type ValveError = anyhow::Error;

/// Result of a valve's `initialize()` or `invoke()`.
pub type ValveResult = Result<(), ValveError>;

/// A pipeline could not be initialized and must not receive requests.
#[derive(Error, Debug)]
pub enum PipelineInitializationError {
    #[error("Valve '{valve}' failed to initialize in pipeline '{pipeline}': {source}")]
    ValveInitialization {
        pipeline: String,
        valve: String,
        #[source]
        source: ValveError,
    },
}

impl PipelineInitializationError {
    /// Name of the pipeline that failed to initialize
    pub fn pipeline(&self) -> &str {
        match self {
            Self::ValveInitialization { pipeline, .. } => pipeline,
        }
    }

    /// Name of the valve whose `initialize()` failed
    pub fn valve(&self) -> &str {
        match self {
            Self::ValveInitialization { valve, .. } => valve,
        }
    }
}

/// A caller-supplied chain walks some other valve list than the pipeline it
/// was handed to.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Chain does not walk the valves of pipeline '{pipeline}'")]
pub struct ForeignChain {
    pub pipeline: String,
}
