// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::ConfigError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main configuration structure for the pipeline runtime.
///
/// Describes every named pipeline, the valve chain of each, and which
/// pipeline serves requests that do not name one. It is typically loaded
/// from a YAML or TOML file.
///
/// # Fields
/// * `default_pipeline` - Pipeline used when the dispatcher is given no name (optional)
/// * `pipelines` - Pipeline definitions
///
/// # Example
/// ```yaml
/// default_pipeline: site
/// pipelines:
///   - name: site
///     valves:
///       - valve: diagnostics
///       - name: cache
///         valve: page_cache
///         options:
///           max_entries: 128
///       - valve: redirect
///         options: { from: /old, to: /new }
///         before: [cache]
///       - valve: render
///     cleanup:
///       - valve: noop
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub default_pipeline: Option<String>,
    pub pipelines: Vec<PipelineConfig>,
}

impl Config {
    pub fn pipeline(&self, name: &str) -> Option<&PipelineConfig> {
        self.pipelines.iter().find(|p| p.name == name)
    }
}

/// Configuration for one named pipeline.
///
/// # Fields
/// * `name` - Pipeline identity, used for selection and diagnostics
/// * `valves` - Processing chain, in declared order
/// * `cleanup` - Cleanup chain, run after processing whatever its outcome
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    #[serde(default)]
    pub valves: Vec<StageConfig>,
    #[serde(default)]
    pub cleanup: Vec<StageConfig>,
}

/// Configuration for a single stage of a valve chain.
///
/// A stage names exactly one source for its valve: a built-in `valve` kind
/// or a `service` key resolved from the session registry.
///
/// # Fields
/// * `name` - Stage name used by ordering constraints (defaults to the valve kind or service key)
/// * `valve` - Built-in valve kind
/// * `service` - Registry key of an `Arc<dyn Valve>` published by a component
/// * `after` / `before` - Stage names this stage must follow / precede
/// * `options` - Valve-specific options
///
/// # Example
/// ```yaml
/// name: legacy
/// valve: redirect
/// after: [diagnostics]
/// options:
///   from: /old
///   to: /new
///   status: 301
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StageConfig {
    pub name: Option<String>,
    pub valve: Option<String>,
    pub service: Option<String>,
    #[serde(default)]
    pub after: Vec<String>,
    #[serde(default)]
    pub before: Vec<String>,
    #[serde(default)]
    pub options: HashMap<String, Value>,
}

/// Where a stage's valve comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageSource<'a> {
    /// Built-in valve created by the local factory
    Valve(&'a str),
    /// Valve looked up in the session registry
    Service(&'a str),
}

impl StageConfig {
    /// Built-in valve stage with default name and no options
    pub fn valve(kind: &str) -> Self {
        Self {
            valve: Some(kind.to_string()),
            ..Default::default()
        }
    }

    /// Registry-resolved stage with default name
    pub fn service(key: &str) -> Self {
        Self {
            service: Some(key.to_string()),
            ..Default::default()
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn after(mut self, names: &[&str]) -> Self {
        self.after.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn before(mut self, names: &[&str]) -> Self {
        self.before.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn option(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    /// Name used for ordering and diagnostics
    pub fn stage_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.valve.as_deref())
            .or(self.service.as_deref())
            .unwrap_or_default()
    }

    /// The valve source, or `None` when the stage names neither or both
    pub fn source(&self) -> Option<StageSource<'_>> {
        match (self.valve.as_deref(), self.service.as_deref()) {
            (Some(kind), None) => Some(StageSource::Valve(kind)),
            (None, Some(key)) => Some(StageSource::Service(key)),
            _ => None,
        }
    }

    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }

    pub fn option_u64(&self, key: &str) -> Option<u64> {
        self.options.get(key).and_then(Value::as_u64)
    }
}

/// Serialization format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            _ => Err(ConfigError::UnsupportedFormat(extension)),
        }
    }
}

/// Parse configuration text in the given format
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<Config, ConfigError> {
    let cfg = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        ConfigFormat::Toml => toml::from_str(content)?,
    };
    Ok(cfg)
}

/// Load a config from a YAML or TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content, format)
}

/// Load and validate a config file
///
/// This function loads the configuration and validates every pipeline:
/// names, stage sources, ordering references and ordering cycles.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_config(&cfg).map_err(ConfigError::Validation)?;
    Ok(cfg)
}
