// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::DEFAULT_REDIRECT_STATUS;
use crate::errors::ValveResult;
use crate::observability::messages::{valve::RedirectIssued, StructuredLog};
use crate::pipeline::{RequestContext, ValveChain};
use crate::traits::Valve;

pub const LOCATION_HEADER: &str = "Location";

/// Redirect valve - answers requests for `from` with a redirect to `to`.
///
/// A matching request never reaches the valves after this one. Any other
/// path passes through untouched.
pub struct RedirectValve {
    name: String,
    from: String,
    to: String,
    status: u16,
}

impl RedirectValve {
    pub fn new(name: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::with_status(name, from, to, DEFAULT_REDIRECT_STATUS)
    }

    pub fn with_status(
        name: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        status: u16,
    ) -> Self {
        Self {
            name: name.into(),
            from: from.into(),
            to: to.into(),
            status,
        }
    }
}

impl Valve for RedirectValve {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, ctx: &mut RequestContext, chain: &mut ValveChain<'_>) -> ValveResult {
        if ctx.path() != self.from {
            return chain.invoke_next(ctx);
        }

        let response = ctx.response_mut();
        response.status = self.status;
        response.body = None;
        response.set_header(LOCATION_HEADER, self.to.as_str());

        RedirectIssued {
            valve: &self.name,
            from: &self.from,
            to: &self.to,
            status: self.status,
        }
        .log();

        Ok(())
    }
}
