// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration validation for pipeline definitions.
//!
//! Validation collects every problem it finds instead of stopping at the
//! first, so a broken config file can be fixed in one pass.
//!
//! # Validation Pipeline
//!
//! 1. **Pipeline names**: non-empty and unique
//! 2. **Stage sources**: each stage names exactly one of `valve` or `service`
//! 3. **Ordering references**: every `after`/`before` entry names a stage in the same chain
//! 4. **Cycle detection**: ordering constraints must admit a topological order
//! 5. **Default pipeline**: `default_pipeline`, if set, names a declared pipeline
//!
//! Cycle detection for a chain only runs when its references all resolved,
//! so a typo is reported as a typo and not as a phantom cycle.
//!
//! # Examples
//!
//! ```
//! use valvechain::config::{parse_config, validate_config, ConfigFormat};
//! use valvechain::errors::ValidationError;
//!
//! let cfg = parse_config(
//!     r#"
//! pipelines:
//!   - name: site
//!     valves:
//!       - valve: render
//!         after: [cache]
//! "#,
//!     ConfigFormat::Yaml,
//! )
//! .unwrap();
//!
//! let errors = validate_config(&cfg).unwrap_err();
//! assert!(matches!(
//!     &errors[0],
//!     ValidationError::UnresolvedOrderingReference { reference, .. } if reference == "cache"
//! ));
//! ```

use std::collections::HashSet;

use crate::config::{find_ordering_cycle, Config, PipelineConfig, StageConfig};
use crate::errors::ValidationError;
use crate::observability::messages::validation::{
    ConfigValidationFailed, CyclicOrderingDetected, UnresolvedOrderingReference,
};
use crate::observability::messages::StructuredLog;

const PROCESSING_CHAIN: &str = "processing";
const CLEANUP_CHAIN: &str = "cleanup";

/// Validate a whole configuration.
///
/// # Returns
///
/// * `Ok(())` - Every pipeline can be built
/// * `Err(Vec<ValidationError>)` - Every problem found, in discovery order
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = validate_pipeline_names(config);

    for pipeline in &config.pipelines {
        errors.extend(validate_chain(pipeline, PROCESSING_CHAIN, &pipeline.valves));
        errors.extend(validate_chain(pipeline, CLEANUP_CHAIN, &pipeline.cleanup));
    }

    if let Some(default) = &config.default_pipeline {
        if config.pipeline(default).is_none() {
            errors.push(ValidationError::UnknownDefaultPipeline {
                pipeline: default.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        ConfigValidationFailed {
            error_count: errors.len(),
        }
        .log();
        Err(errors)
    }
}

fn validate_pipeline_names(config: &Config) -> Vec<ValidationError> {
    let mut seen = HashSet::new();
    let mut errors = Vec::new();

    for (index, pipeline) in config.pipelines.iter().enumerate() {
        if pipeline.name.trim().is_empty() {
            errors.push(ValidationError::EmptyPipelineName { index });
        } else if !seen.insert(pipeline.name.as_str()) {
            errors.push(ValidationError::DuplicatePipelineName {
                pipeline: pipeline.name.clone(),
            });
        }
    }

    errors
}

fn validate_chain(
    pipeline: &PipelineConfig,
    chain: &'static str,
    stages: &[StageConfig],
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (index, stage) in stages.iter().enumerate() {
        let reason = match (&stage.valve, &stage.service) {
            (None, None) => Some("names neither a valve nor a service"),
            (Some(_), Some(_)) => Some("names both a valve and a service"),
            _ => None,
        };
        if let Some(reason) = reason {
            errors.push(ValidationError::MalformedStage {
                pipeline: pipeline.name.clone(),
                chain,
                index,
                reason,
            });
        }
    }

    let reference_errors = validate_ordering_references(pipeline, stages);
    let references_resolved = reference_errors.is_empty();
    errors.extend(reference_errors);

    if references_resolved {
        if let Some(cycle) = find_ordering_cycle(stages) {
            let names: Vec<&str> = cycle.iter().map(String::as_str).collect();
            CyclicOrderingDetected {
                pipeline: &pipeline.name,
                cycle: &names,
            }
            .log();
            errors.push(ValidationError::CyclicOrdering {
                pipeline: pipeline.name.clone(),
                cycle,
            });
        }
    }

    errors
}

fn validate_ordering_references(pipeline: &PipelineConfig, stages: &[StageConfig]) -> Vec<ValidationError> {
    let names: HashSet<&str> = stages.iter().map(StageConfig::stage_name).collect();
    let mut errors = Vec::new();

    for stage in stages {
        for reference in stage.after.iter().chain(stage.before.iter()) {
            if !names.contains(reference.as_str()) {
                UnresolvedOrderingReference {
                    pipeline: &pipeline.name,
                    stage: stage.stage_name(),
                    reference,
                }
                .log();
                errors.push(ValidationError::UnresolvedOrderingReference {
                    pipeline: pipeline.name.clone(),
                    stage: stage.stage_name().to_string(),
                    reference: reference.clone(),
                });
            }
        }
    }

    errors
}
