// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::valves::*;
use crate::config::consts::{
    DEFAULT_CACHE_ENTRIES, DEFAULT_REDIRECT_STATUS, DEFAULT_RENDER_TEMPLATE, DEFAULT_SLOW_THRESHOLD_MS,
    MAX_CACHE_ENTRIES,
};
use crate::config::{StageConfig, StageSource};
use crate::errors::ValveFactoryError;
use crate::observability::messages::{valve::ValveCreated, StructuredLog};
use crate::registry::ServiceRegistry;
use crate::traits::Valve;

const AVAILABLE_VALVES: &[&str] = &[
    "noop",
    "set_attribute",
    "require_attribute",
    "redirect",
    "diagnostics",
    "page_cache",
    "render",
    "contributors",
];

/// Factory for creating valve instances from stage configuration.
///
/// The factory is bound to the session registry it was created with:
/// `service:` stages are resolved from it, and valves that consult the
/// registry per request (`contributors`) are handed a reference to it.
///
/// The `valve` key of a stage determines which built-in valve to create:
/// - "noop" -> NoopValve
/// - "set_attribute" -> SetAttributeValve (requires `key` and `value`)
/// - "require_attribute" -> RequireAttributeValve (requires `key`)
/// - "redirect" -> RedirectValve (requires `from` and `to`, optional `status`)
/// - "diagnostics" -> DiagnosticsValve (optional `threshold_ms`)
/// - "page_cache" -> PageCacheValve (optional `max_entries`)
/// - "render" -> RenderValve (optional `template`)
/// - "contributors" -> ContributorsValve (requires `service`)
pub struct LocalValveFactory {
    registry: Arc<ServiceRegistry>,
}

impl LocalValveFactory {
    pub fn new(registry: &Arc<ServiceRegistry>) -> Self {
        Self {
            registry: Arc::clone(registry),
        }
    }

    /// Create the valve a stage describes.
    ///
    /// Built-in valves are named after the stage. Registry-resolved valves
    /// keep the name they were registered with.
    pub fn create_valve(&self, stage: &StageConfig) -> Result<Arc<dyn Valve>, ValveFactoryError> {
        let name = stage.stage_name();

        let valve = match stage.source() {
            Some(StageSource::Valve(kind)) => {
                let valve = self.create_builtin(name, kind, stage)?;
                ValveCreated {
                    valve: name,
                    kind,
                    source: "factory",
                }
                .log();
                valve
            }
            Some(StageSource::Service(key)) => {
                let valve = self
                    .registry
                    .get_service::<dyn Valve>(key)
                    .ok_or_else(|| ValveFactoryError::ServiceNotRegistered {
                        stage: name.to_string(),
                        key: key.to_string(),
                    })?;
                ValveCreated {
                    valve: valve.name(),
                    kind: key,
                    source: "registry",
                }
                .log();
                valve
            }
            None => {
                return Err(ValveFactoryError::MissingSource {
                    stage: name.to_string(),
                })
            }
        };

        Ok(valve)
    }

    fn create_builtin(&self, name: &str, kind: &str, stage: &StageConfig) -> Result<Arc<dyn Valve>, ValveFactoryError> {
        match kind {
            "noop" => Ok(Arc::new(NoopValve::new(name))),

            "set_attribute" => {
                let key = required_str(stage, "key")?;
                let value = stage
                    .options
                    .get("value")
                    .cloned()
                    .ok_or_else(|| missing(stage, "value"))?;
                Ok(Arc::new(SetAttributeValve::new(name, key, value)))
            }

            "require_attribute" => {
                let key = required_str(stage, "key")?;
                Ok(Arc::new(RequireAttributeValve::new(name, key)))
            }

            "redirect" => {
                let from = required_str(stage, "from")?;
                let to = required_str(stage, "to")?;
                let status = optional_u64(stage, "status")?.unwrap_or(u64::from(DEFAULT_REDIRECT_STATUS));
                if !(300..=399).contains(&status) {
                    return Err(invalid(stage, "status", format!("{status} is not a 3xx status")));
                }
                // the range check above makes the narrowing lossless
                Ok(Arc::new(RedirectValve::with_status(name, from, to, status as u16)))
            }

            "diagnostics" => {
                let threshold_ms = optional_u64(stage, "threshold_ms")?.unwrap_or(DEFAULT_SLOW_THRESHOLD_MS);
                Ok(Arc::new(DiagnosticsValve::new(name, Duration::from_millis(threshold_ms))))
            }

            "page_cache" => {
                let max_entries = optional_u64(stage, "max_entries")?.unwrap_or(DEFAULT_CACHE_ENTRIES as u64);
                if max_entries == 0 || max_entries > MAX_CACHE_ENTRIES as u64 {
                    return Err(invalid(
                        stage,
                        "max_entries",
                        format!("must be between 1 and {MAX_CACHE_ENTRIES}, got {max_entries}"),
                    ));
                }
                Ok(Arc::new(PageCacheValve::new(name, max_entries as usize)))
            }

            "render" => {
                let template = optional_str(stage, "template")?.unwrap_or(DEFAULT_RENDER_TEMPLATE);
                Ok(Arc::new(RenderValve::new(name, template)))
            }

            "contributors" => {
                let service = required_str(stage, "service")?;
                Ok(Arc::new(ContributorsValve::new(name, service, &self.registry)))
            }

            _ => Err(ValveFactoryError::UnknownValve {
                stage: name.to_string(),
                kind: kind.to_string(),
            }),
        }
    }

    /// List all built-in valve kinds
    pub fn list_available_valves() -> Vec<&'static str> {
        AVAILABLE_VALVES.to_vec()
    }

    /// Check if a built-in valve kind exists
    pub fn is_valve_available(kind: &str) -> bool {
        AVAILABLE_VALVES.contains(&kind)
    }
}

fn missing(stage: &StageConfig, option: &'static str) -> ValveFactoryError {
    ValveFactoryError::MissingOption {
        stage: stage.stage_name().to_string(),
        option,
    }
}

fn invalid(stage: &StageConfig, option: &'static str, reason: String) -> ValveFactoryError {
    ValveFactoryError::InvalidOption {
        stage: stage.stage_name().to_string(),
        option,
        reason,
    }
}

fn optional_str<'a>(stage: &'a StageConfig, option: &'static str) -> Result<Option<&'a str>, ValveFactoryError> {
    match stage.options.get(option) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(invalid(stage, option, format!("expected a string, got {other}"))),
    }
}

fn required_str<'a>(stage: &'a StageConfig, option: &'static str) -> Result<&'a str, ValveFactoryError> {
    optional_str(stage, option)?.ok_or_else(|| missing(stage, option))
}

fn optional_u64(stage: &StageConfig, option: &'static str) -> Result<Option<u64>, ValveFactoryError> {
    match stage.options.get(option) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| invalid(stage, option, format!("expected a non-negative integer, got {value}"))),
    }
}
