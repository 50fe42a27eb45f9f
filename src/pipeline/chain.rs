// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::errors::ValveResult;
use crate::pipeline::RequestContext;
use crate::traits::Valve;

/// Cursor over a pipeline's valves for a single invocation.
///
/// Each invocation owns its own chain, so concurrent requests against one
/// pipeline never share a position. Valves receive the chain mutably and
/// decide whether to call [`invoke_next`](Self::invoke_next).
pub struct ValveChain<'a> {
    valves: &'a [Arc<dyn Valve>],
    position: usize,
    ran_to_end: bool,
}

impl<'a> ValveChain<'a> {
    /// Create a chain positioned at the first valve.
    pub fn new(valves: &'a [Arc<dyn Valve>]) -> Self {
        Self {
            valves,
            position: 0,
            ran_to_end: false,
        }
    }

    /// Invoke the next valve, if any.
    ///
    /// Returns `Ok(())` immediately when the chain is exhausted. Errors from
    /// the valve are returned as-is.
    pub fn invoke_next(&mut self, ctx: &mut RequestContext) -> ValveResult {
        let valves = self.valves;
        let Some(valve) = valves.get(self.position) else {
            self.ran_to_end = true;
            return Ok(());
        };
        self.position += 1;

        ctx.record_valve(valve.name());
        tracing::trace!(valve = valve.name(), position = self.position, "invoking valve");

        valve.invoke(ctx, self)
    }

    /// Number of valves entered so far
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of valves not yet entered
    pub fn remaining(&self) -> usize {
        self.valves.len() - self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.valves.len()
    }

    /// Whether the last valve passed control on, i.e. nobody short-circuited.
    ///
    /// A chain whose final valve stops without calling `invoke_next` is
    /// exhausted but did not run to the end.
    pub fn ran_to_end(&self) -> bool {
        self.ran_to_end
    }

    /// Whether this chain walks exactly `valves` (the same slice, not an equal one)
    pub fn walks(&self, valves: &[Arc<dyn Valve>]) -> bool {
        std::ptr::eq(self.valves.as_ptr(), valves.as_ptr()) && self.valves.len() == valves.len()
    }

    /// The most recently entered valve
    pub fn current(&self) -> Option<&'a Arc<dyn Valve>> {
        let valves = self.valves;
        self.position.checked_sub(1).and_then(|i| valves.get(i))
    }

    /// Rewind to the head so the chain can serve another request.
    pub fn reset(&mut self) {
        self.position = 0;
        self.ran_to_end = false;
    }
}

impl std::fmt::Debug for ValveChain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValveChain")
            .field("valve_count", &self.valves.len())
            .field("position", &self.position)
            .field("ran_to_end", &self.ran_to_end)
            .finish()
    }
}
