// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Request-processing pipeline: an ordered chain of valves driven per request.

mod chain;
mod context;
mod definition;
mod pipelines;

#[cfg(test)]
mod integration_tests;

pub use chain::ValveChain;
pub use context::{RequestContext, Response};
pub use definition::{Pipeline, PipelineDefinition};
pub use pipelines::Pipelines;
