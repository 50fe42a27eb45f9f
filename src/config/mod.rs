// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod ordering;
mod runtime;
mod validation;

#[cfg(test)]
mod integration_tests;
pub mod consts;

pub use loader::{
    load_and_validate_config, load_config, parse_config, Config, ConfigFormat, PipelineConfig,
    StageConfig, StageSource,
};
pub use ordering::{find_ordering_cycle, ordered_stage_indices};
pub use runtime::RuntimeBuilder;
pub use validation::validate_config;
