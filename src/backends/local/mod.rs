// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod factory;
pub mod valves;

pub use factory::LocalValveFactory;
pub use valves::*;
