// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use thiserror::Error;

use crate::errors::ValveResult;
use crate::pipeline::{RequestContext, ValveChain};
use crate::traits::Valve;

/// Raised by [`RequireAttributeValve`] when the request lacks its attribute.
///
/// Callers can recover it from the pipeline error with
/// `err.downcast_ref::<MissingAttribute>()`.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Valve '{valve}' requires attribute '{key}' which is not set")]
pub struct MissingAttribute {
    pub valve: String,
    pub key: String,
}

/// Set Attribute valve - stores a fixed value on every request, then continues
pub struct SetAttributeValve {
    name: String,
    key: String,
    value: Value,
}

impl SetAttributeValve {
    pub fn new(name: impl Into<String>, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Valve for SetAttributeValve {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, ctx: &mut RequestContext, chain: &mut ValveChain<'_>) -> ValveResult {
        ctx.set_attribute(self.key.clone(), self.value.clone());
        chain.invoke_next(ctx)
    }
}

/// Require Attribute valve - fails the request unless an earlier valve set `key`
pub struct RequireAttributeValve {
    name: String,
    key: String,
}

impl RequireAttributeValve {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }
}

impl Valve for RequireAttributeValve {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, ctx: &mut RequestContext, chain: &mut ValveChain<'_>) -> ValveResult {
        if ctx.attribute(&self.key).is_none() {
            return Err(MissingAttribute {
                valve: self.name.clone(),
                key: self.key.clone(),
            }
            .into());
        }
        chain.invoke_next(ctx)
    }
}
