// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use crate::pipeline::Pipeline;

/// Initialized pipelines by name, with an optional default.
///
/// The dispatch layer selects a pipeline per request (for example per mount
/// or virtual host) and falls back to the default when no name is given.
#[derive(Default, Clone)]
pub struct Pipelines {
    pipelines: HashMap<String, Arc<Pipeline>>,
    default_pipeline: Option<String>,
}

impl Pipelines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pipeline, returning the one it replaced under the same name
    pub fn insert(&mut self, pipeline: Pipeline) -> Option<Arc<Pipeline>> {
        self.pipelines
            .insert(pipeline.name().to_string(), Arc::new(pipeline))
    }

    pub fn get(&self, name: &str) -> Option<Arc<Pipeline>> {
        self.pipelines.get(name).cloned()
    }

    /// Mark a known pipeline as the default. Returns false if no pipeline has that name.
    pub fn set_default(&mut self, name: &str) -> bool {
        if self.pipelines.contains_key(name) {
            self.default_pipeline = Some(name.to_string());
            true
        } else {
            false
        }
    }

    pub fn default_pipeline(&self) -> Option<Arc<Pipeline>> {
        self.default_pipeline.as_deref().and_then(|name| self.get(name))
    }

    /// The named pipeline, or the default when `name` is `None`
    pub fn select(&self, name: Option<&str>) -> Option<Arc<Pipeline>> {
        match name {
            Some(name) => self.get(name),
            None => self.default_pipeline(),
        }
    }

    /// Pipeline names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.pipelines.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}

impl std::fmt::Debug for Pipelines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipelines")
            .field("pipelines", &self.names())
            .field("default_pipeline", &self.default_pipeline)
            .finish()
    }
}
