// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Arc, Weak};

use crate::errors::ValveResult;
use crate::pipeline::{RequestContext, ValveChain};
use crate::registry::ServiceRegistry;
use crate::traits::{ContextContributor, Valve};

/// Contributors valve - lets registry-published [`ContextContributor`]s
/// decorate each request.
///
/// Contributors are looked up on every request, so components that start
/// or stop while the pipeline runs are picked up without a rebuild. When the
/// registry is gone or holds no contributors the request simply continues.
pub struct ContributorsValve {
    name: String,
    service: String,
    registry: Weak<ServiceRegistry>,
}

impl ContributorsValve {
    pub fn new(name: impl Into<String>, service: impl Into<String>, registry: &Arc<ServiceRegistry>) -> Self {
        Self {
            name: name.into(),
            service: service.into(),
            registry: Arc::downgrade(registry),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }
}

impl Valve for ContributorsValve {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, ctx: &mut RequestContext, chain: &mut ValveChain<'_>) -> ValveResult {
        let contributors = self
            .registry
            .upgrade()
            .map(|registry| registry.get_services::<dyn ContextContributor>(&self.service))
            .unwrap_or_default();

        for contributor in contributors {
            for (key, value) in contributor.contribute(ctx.path()) {
                ctx.set_attribute(key, value);
            }
        }

        chain.invoke_next(ctx)
    }
}
