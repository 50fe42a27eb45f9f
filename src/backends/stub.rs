// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::errors::ValveResult;
use crate::pipeline::{RequestContext, ValveChain};
use crate::traits::Valve;

/// Shared, ordered record of valve hook calls
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// A valve that records its hooks and always continues the chain
pub struct RecordingValve {
    name: String,
    log: Option<CallLog>,
}

impl RecordingValve {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            log: None,
        }
    }

    pub fn with_log(name: &str, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            log: Some(log.clone()),
        }
    }

    fn record(&self, hook: &str) {
        if let Some(log) = &self.log {
            log.push(format!("{}.{}", self.name, hook));
        }
    }
}

impl Valve for RecordingValve {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&self) -> ValveResult {
        self.record("initialize");
        Ok(())
    }

    fn invoke(&self, ctx: &mut RequestContext, chain: &mut ValveChain<'_>) -> ValveResult {
        self.record("invoke");
        chain.invoke_next(ctx)
    }
}

/// A valve that ends the chain without calling the next valve
pub struct ShortCircuitValve {
    name: String,
}

impl ShortCircuitValve {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string() }
    }
}

impl Valve for ShortCircuitValve {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, _ctx: &mut RequestContext, _chain: &mut ValveChain<'_>) -> ValveResult {
        Ok(())
    }
}

/// Error raised by the failing stubs, so tests can downcast and compare it
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Simulated failure in valve '{valve}'")]
pub struct SimulatedFailure {
    pub valve: String,
}

/// A valve whose invoke always fails without calling the next valve
pub struct FailingValve {
    name: String,
}

impl FailingValve {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string() }
    }
}

impl Valve for FailingValve {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, _ctx: &mut RequestContext, _chain: &mut ValveChain<'_>) -> ValveResult {
        Err(SimulatedFailure {
            valve: self.name.clone(),
        }
        .into())
    }
}

/// A valve whose initialization hook always fails
pub struct FailingInitValve {
    name: String,
}

impl FailingInitValve {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string() }
    }
}

impl Valve for FailingInitValve {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&self) -> ValveResult {
        Err(SimulatedFailure {
            valve: self.name.clone(),
        }
        .into())
    }

    fn invoke(&self, ctx: &mut RequestContext, chain: &mut ValveChain<'_>) -> ValveResult {
        chain.invoke_next(ctx)
    }
}

/// A valve that blocks for a fixed time before continuing
pub struct SleepingValve {
    name: String,
    delay: Duration,
}

impl SleepingValve {
    pub fn new(name: &str, delay: Duration) -> Self {
        Self {
            name: name.to_string(),
            delay,
        }
    }
}

impl Valve for SleepingValve {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, ctx: &mut RequestContext, chain: &mut ValveChain<'_>) -> ValveResult {
        std::thread::sleep(self.delay);
        chain.invoke_next(ctx)
    }
}
