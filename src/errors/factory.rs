// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for valve instantiation from configuration.

use thiserror::Error;

/// Errors that can occur while turning a stage configuration into a valve
#[derive(Error, Debug, PartialEq)]
pub enum ValveFactoryError {
    /// The `valve` key does not match any built-in valve
    #[error("Unknown valve kind '{kind}' for stage '{stage}'")]
    UnknownValve { stage: String, kind: String },

    /// A required option is absent
    #[error("Valve '{stage}' requires option '{option}'")]
    MissingOption { stage: String, option: &'static str },

    /// An option is present but has the wrong shape
    #[error("Valve '{stage}' has invalid option '{option}': {reason}")]
    InvalidOption {
        stage: String,
        option: &'static str,
        reason: String,
    },

    /// A `service` stage names a key with no valve registered in the session registry
    #[error("No valve registered under service key '{key}' for stage '{stage}'")]
    ServiceNotRegistered { stage: String, key: String },

    /// The stage names neither a valve kind nor a service key
    #[error("Stage '{stage}' names neither a valve kind nor a service key")]
    MissingSource { stage: String },
}
