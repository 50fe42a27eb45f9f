// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod attributes;
pub mod contributors;
pub mod diagnostics;
pub mod noop;
pub mod page_cache;
pub mod redirect;
pub mod render;

pub use attributes::*;
pub use contributors::*;
pub use diagnostics::*;
pub use noop::*;
pub use page_cache::*;
pub use redirect::*;
pub use render::*;
