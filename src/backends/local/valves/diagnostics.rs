// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::{Duration, Instant};

use crate::errors::ValveResult;
use crate::observability::messages::{valve::SlowChainDetected, StructuredLog};
use crate::pipeline::{RequestContext, ValveChain};
use crate::traits::Valve;

/// Attribute holding the downstream elapsed time in milliseconds
pub const ELAPSED_ATTRIBUTE: &str = "diagnostics.elapsed_ms";

/// Diagnostics valve - times the rest of the chain.
///
/// The elapsed time is recorded on the context whether the downstream
/// valves succeed or fail, and a warning is logged when it exceeds the
/// threshold. The downstream result is returned unchanged.
pub struct DiagnosticsValve {
    name: String,
    threshold: Duration,
}

impl DiagnosticsValve {
    pub fn new(name: impl Into<String>, threshold: Duration) -> Self {
        Self {
            name: name.into(),
            threshold,
        }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }
}

impl Valve for DiagnosticsValve {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, ctx: &mut RequestContext, chain: &mut ValveChain<'_>) -> ValveResult {
        let start_time = Instant::now();
        let result = chain.invoke_next(ctx);
        let elapsed = start_time.elapsed();

        ctx.set_attribute(ELAPSED_ATTRIBUTE, elapsed.as_millis() as u64);

        if elapsed > self.threshold {
            SlowChainDetected {
                valve: &self.name,
                path: ctx.path(),
                elapsed,
                threshold: self.threshold,
            }
            .log();
        }

        result
    }
}
