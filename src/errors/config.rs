// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A pipeline was declared without a name
    #[error("Pipeline at position {index} has an empty name")]
    EmptyPipelineName { index: usize },

    /// Two pipelines share a name
    #[error("Duplicate pipeline name: '{pipeline}'")]
    DuplicatePipelineName { pipeline: String },

    /// A stage must name exactly one of `valve` or `service`
    #[error("Stage {index} of the {chain} chain in pipeline '{pipeline}' is malformed: {reason}")]
    MalformedStage {
        pipeline: String,
        chain: &'static str,
        index: usize,
        reason: &'static str,
    },

    /// An `after`/`before` entry names a stage that is not in the same chain
    #[error("Stage '{stage}' in pipeline '{pipeline}' is ordered against '{reference}' which does not exist")]
    UnresolvedOrderingReference {
        pipeline: String,
        stage: String,
        reference: String,
    },

    /// Ordering constraints form a cycle
    #[error("Cyclic valve ordering detected in pipeline '{pipeline}': {}", .cycle.join(" -> "))]
    CyclicOrdering { pipeline: String, cycle: Vec<String> },

    /// `default_pipeline` names a pipeline that is not declared
    #[error("Default pipeline '{pipeline}' is not declared")]
    UnknownDefaultPipeline { pipeline: String },
}

/// Errors raised while loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported config file extension '{0}' (expected yaml, yml or toml)")]
    UnsupportedFormat(String),

    #[error("Configuration validation failed:\n{}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
