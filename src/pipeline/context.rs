// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Response state accumulated by valves while a request moves through the chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: 200,
            headers: BTreeMap::new(),
            body: None,
        }
    }
}

impl Response {
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Per-request value bag shared by the valves of one invocation.
///
/// A context is created by the dispatch layer for a single request and is
/// borrowed mutably by each valve in turn; it is never shared between
/// requests.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    path: String,
    attributes: HashMap<String, Value>,
    response: Response,
    executed_valves: Vec<String>,
}

impl RequestContext {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Request path the pipeline is resolving
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Set an attribute, returning the previous value if one existed
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.attributes.insert(key.into(), value.into())
    }

    pub fn remove_attribute(&mut self, key: &str) -> Option<Value> {
        self.attributes.remove(key)
    }

    pub fn attributes(&self) -> &HashMap<String, Value> {
        &self.attributes
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    /// Names of the valves entered so far, in invocation order
    pub fn executed_valves(&self) -> &[String] {
        &self.executed_valves
    }

    pub(crate) fn record_valve(&mut self, name: &str) {
        self.executed_valves.push(name.to_string());
    }
}
