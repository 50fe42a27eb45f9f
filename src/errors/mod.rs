// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod factory;
mod pipeline;
mod runtime;

pub use config::{ConfigError, ValidationError};
pub use factory::ValveFactoryError;
pub use pipeline::{ForeignChain, PipelineInitializationError, ValveError, ValveResult};
pub use runtime::RuntimeError;
