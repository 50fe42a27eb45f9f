// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::ValveResult;
use crate::pipeline::{RequestContext, ValveChain};
use crate::traits::Valve;

const PATH_PLACEHOLDER: &str = "{path}";

/// Render valve - writes a 200 response whose body is `template` with
/// every `{path}` replaced by the request path.
///
/// Usually the last valve of a chain; it still calls the next valve so that
/// post-processing stages placed after it run.
pub struct RenderValve {
    name: String,
    template: String,
}

impl RenderValve {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl Valve for RenderValve {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, ctx: &mut RequestContext, chain: &mut ValveChain<'_>) -> ValveResult {
        let body = self.template.replace(PATH_PLACEHOLDER, ctx.path());
        let response = ctx.response_mut();
        response.status = 200;
        response.body = Some(body);
        chain.invoke_next(ctx)
    }
}
