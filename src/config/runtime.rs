// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::backends::local::LocalValveFactory;
use crate::config::{ordered_stage_indices, validate_config, Config, PipelineConfig, StageConfig};
use crate::errors::{RuntimeError, ValidationError};
use crate::pipeline::{PipelineDefinition, Pipelines};
use crate::registry::ServiceRegistry;
use crate::traits::Valve;

/// Pipeline runtime builder - turns a configuration into initialized pipelines.
///
/// The builder validates the configuration, orders each chain by its
/// `after`/`before` constraints, creates every valve through a
/// [`LocalValveFactory`] bound to the session registry, and initializes each
/// pipeline. Any failure leaves no pipeline behind.
///
/// # Examples
///
/// ## Building pipelines from configuration
/// ```
/// use std::sync::Arc;
/// use valvechain::config::{parse_config, ConfigFormat, RuntimeBuilder};
/// use valvechain::pipeline::RequestContext;
/// use valvechain::registry::ServiceRegistry;
///
/// let config = parse_config(
///     r#"
/// default_pipeline: site
/// pipelines:
///   - name: site
///     valves:
///       - valve: render
///       - valve: redirect
///         options: { from: /old, to: /new }
///         before: [render]
/// "#,
///     ConfigFormat::Yaml,
/// )
/// .unwrap();
///
/// let registry = Arc::new(ServiceRegistry::new());
/// let pipelines = RuntimeBuilder::from_config(&config, &registry).unwrap();
/// let site = pipelines.select(None).unwrap();
/// assert_eq!(site.valve_names(), vec!["redirect", "render"]);
///
/// let mut ctx = RequestContext::new("/old");
/// site.invoke(&mut ctx).unwrap();
/// assert_eq!(ctx.response().status, 302);
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build every configured pipeline.
    ///
    /// # Arguments
    /// * `cfg` - Configuration containing pipeline definitions
    /// * `registry` - Session registry used for `service:` stages and registry-aware valves
    ///
    /// # Returns
    /// The initialized pipelines, with the configured default selected
    pub fn from_config(cfg: &Config, registry: &Arc<ServiceRegistry>) -> Result<Pipelines, RuntimeError> {
        validate_config(cfg).map_err(RuntimeError::Validation)?;

        let factory = LocalValveFactory::new(registry);
        let mut pipelines = Pipelines::new();

        for pipeline_cfg in &cfg.pipelines {
            let pipeline = Self::build_definition(pipeline_cfg, &factory)?.initialize()?;
            pipelines.insert(pipeline);
        }

        if let Some(default) = &cfg.default_pipeline {
            // validation guarantees the name is known
            pipelines.set_default(default);
        }

        Ok(pipelines)
    }

    /// Create and order the valves of one pipeline without initializing them
    pub fn build_definition(
        pipeline_cfg: &PipelineConfig,
        factory: &LocalValveFactory,
    ) -> Result<PipelineDefinition, RuntimeError> {
        let mut definition = PipelineDefinition::new(pipeline_cfg.name.as_str());

        for valve in Self::create_chain(pipeline_cfg, &pipeline_cfg.valves, factory)? {
            definition.add_valve(valve);
        }
        for valve in Self::create_chain(pipeline_cfg, &pipeline_cfg.cleanup, factory)? {
            definition.add_cleanup_valve(valve);
        }

        Ok(definition)
    }

    fn create_chain(
        pipeline_cfg: &PipelineConfig,
        stages: &[StageConfig],
        factory: &LocalValveFactory,
    ) -> Result<Vec<Arc<dyn Valve>>, RuntimeError> {
        let order = ordered_stage_indices(stages).map_err(|cycle| {
            RuntimeError::Validation(vec![ValidationError::CyclicOrdering {
                pipeline: pipeline_cfg.name.clone(),
                cycle,
            }])
        })?;

        order
            .into_iter()
            .map(|index| {
                factory
                    .create_valve(&stages[index])
                    .map_err(|source| RuntimeError::ValveCreation {
                        pipeline: pipeline_cfg.name.clone(),
                        source,
                    })
            })
            .collect()
    }
}
