// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::ValveResult;
use crate::pipeline::{RequestContext, ValveChain};
use crate::traits::Valve;

/// Noop valve - passes every request straight to the next valve
pub struct NoopValve {
    name: String,
}

impl NoopValve {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Valve for NoopValve {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, ctx: &mut RequestContext, chain: &mut ValveChain<'_>) -> ValveResult {
        chain.invoke_next(ctx)
    }
}
