// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{PipelineInitializationError, ValidationError, ValveFactoryError};
use thiserror::Error;

/// Errors raised while building initialized pipelines from configuration
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Configuration is invalid: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Validation(Vec<ValidationError>),

    #[error("Failed to create valve for pipeline '{pipeline}': {source}")]
    ValveCreation {
        pipeline: String,
        #[source]
        source: ValveFactoryError,
    },

    #[error(transparent)]
    Initialization(#[from] PipelineInitializationError),
}
