// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

use crate::errors::ValveResult;
use crate::observability::messages::{
    valve::{CacheEvicted, CacheHit},
    StructuredLog,
};
use crate::pipeline::{RequestContext, Response, ValveChain};
use crate::traits::Valve;

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, Response>,
    insertion_order: VecDeque<String>,
}

/// Page Cache valve - answers repeat requests from memory.
///
/// On a hit the stored response is copied into the context and the rest of
/// the chain is skipped. On a miss the chain continues; if it succeeds with
/// a 200 response carrying a body, that response is stored under the
/// request path. The oldest entry is evicted once `max_entries` is reached.
pub struct PageCacheValve {
    name: String,
    max_entries: usize,
    state: Mutex<CacheState>,
}

impl PageCacheValve {
    pub fn new(name: impl Into<String>, max_entries: usize) -> Self {
        Self {
            name: name.into(),
            max_entries,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, path: &str) -> bool {
        self.state.lock().entries.contains_key(path)
    }

    fn store(&self, path: &str, response: &Response) {
        let mut state = self.state.lock();
        if state.entries.contains_key(path) {
            return;
        }

        while state.entries.len() >= self.max_entries {
            let Some(oldest) = state.insertion_order.pop_front() else {
                break;
            };
            state.entries.remove(&oldest);
            CacheEvicted {
                valve: &self.name,
                path: &oldest,
                max_entries: self.max_entries,
            }
            .log();
        }

        state.entries.insert(path.to_string(), response.clone());
        state.insertion_order.push_back(path.to_string());
    }
}

impl Valve for PageCacheValve {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, ctx: &mut RequestContext, chain: &mut ValveChain<'_>) -> ValveResult {
        let cached = self.state.lock().entries.get(ctx.path()).cloned();
        if let Some(response) = cached {
            CacheHit {
                valve: &self.name,
                path: ctx.path(),
            }
            .log();
            *ctx.response_mut() = response;
            return Ok(());
        }

        chain.invoke_next(ctx)?;

        let response = ctx.response();
        if response.status == 200 && response.body.is_some() {
            self.store(ctx.path(), response);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::local::{RedirectValve, RenderValve};
    use crate::backends::stub::{CallLog, FailingValve, RecordingValve};
    use std::sync::Arc;

    fn serve(valves: &[Arc<dyn Valve>], path: &str) -> RequestContext {
        let mut ctx = RequestContext::new(path);
        ValveChain::new(valves).invoke_next(&mut ctx).unwrap();
        ctx
    }

    #[test]
    fn test_second_request_is_served_from_cache() {
        let log = CallLog::default();
        let valves: Vec<Arc<dyn Valve>> = vec![
            Arc::new(PageCacheValve::new("cache", 8)),
            Arc::new(RecordingValve::with_log("counter", &log)),
            Arc::new(RenderValve::new("render", "page {path}")),
        ];

        let first = serve(&valves, "/news");
        let second = serve(&valves, "/news");

        assert_eq!(first.response(), second.response());
        assert_eq!(second.executed_valves(), ["cache"]);
        assert_eq!(log.entries(), vec!["counter.invoke"]);
    }

    #[test]
    fn test_only_successful_bodies_are_cached() {
        let cache = Arc::new(PageCacheValve::new("cache", 8));
        let valves: Vec<Arc<dyn Valve>> = vec![
            cache.clone(),
            Arc::new(RedirectValve::new("legacy", "/old", "/new")),
            Arc::new(RecordingValve::new("empty")),
        ];

        serve(&valves, "/old");
        serve(&valves, "/no-body");

        assert!(cache.is_empty());
    }

    #[test]
    fn test_failed_requests_are_not_cached() {
        let cache = Arc::new(PageCacheValve::new("cache", 8));
        let valves: Vec<Arc<dyn Valve>> = vec![
            cache.clone(),
            Arc::new(RenderValve::new("render", "page")),
            Arc::new(FailingValve::new("broken")),
        ];

        let mut ctx = RequestContext::new("/");
        assert!(ValveChain::new(&valves).invoke_next(&mut ctx).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_oldest_entry_evicted_at_capacity() {
        let cache = Arc::new(PageCacheValve::new("cache", 2));
        let valves: Vec<Arc<dyn Valve>> = vec![
            cache.clone(),
            Arc::new(RenderValve::new("render", "page {path}")),
        ];

        for path in ["/a", "/b", "/c"] {
            serve(&valves, path);
        }

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains("/a"));
        assert!(cache.contains("/b"));
        assert!(cache.contains("/c"));
    }
}
