// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Instant;

use crate::errors::{ForeignChain, PipelineInitializationError, ValveResult};
use crate::observability::messages::{pipeline::*, StructuredLog};
use crate::pipeline::{RequestContext, ValveChain};
use crate::traits::Valve;

const PROCESSING_CHAIN: &str = "processing";
const CLEANUP_CHAIN: &str = "cleanup";

/// A pipeline under construction.
///
/// Valves are appended in the order they should run; the same valve may be
/// added more than once. A definition cannot serve requests: call
/// [`initialize`](Self::initialize) to obtain a [`Pipeline`]. Because
/// initialization consumes the definition, a pipeline is initialized exactly
/// once and a failed initialization leaves nothing that could be invoked.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use valvechain::backends::local::{NoopValve, RenderValve};
/// use valvechain::pipeline::{PipelineDefinition, RequestContext};
///
/// let pipeline = PipelineDefinition::new("site")
///     .with_valve(Arc::new(NoopValve::new("noop")))
///     .with_valve(Arc::new(RenderValve::new("render", "page {path}")))
///     .initialize()
///     .unwrap();
///
/// let mut ctx = RequestContext::new("/about");
/// pipeline.invoke(&mut ctx).unwrap();
/// assert_eq!(ctx.response().body.as_deref(), Some("page /about"));
/// ```
pub struct PipelineDefinition {
    name: String,
    valves: Vec<Arc<dyn Valve>>,
    cleanup_valves: Vec<Arc<dyn Valve>>,
}

impl PipelineDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            valves: Vec::new(),
            cleanup_valves: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a valve to the processing chain
    pub fn add_valve(&mut self, valve: Arc<dyn Valve>) {
        self.valves.push(valve);
    }

    /// Append a valve to the cleanup chain
    pub fn add_cleanup_valve(&mut self, valve: Arc<dyn Valve>) {
        self.cleanup_valves.push(valve);
    }

    pub fn with_valve(mut self, valve: Arc<dyn Valve>) -> Self {
        self.add_valve(valve);
        self
    }

    pub fn with_cleanup_valve(mut self, valve: Arc<dyn Valve>) -> Self {
        self.add_cleanup_valve(valve);
        self
    }

    /// Run every valve's `initialize()` hook in chain order, processing
    /// chain first, then cleanup chain.
    ///
    /// The first failure stops initialization; remaining valves are not
    /// initialized and no [`Pipeline`] is produced.
    pub fn initialize(self) -> Result<Pipeline, PipelineInitializationError> {
        PipelineInitializationStarted {
            pipeline: &self.name,
            valve_count: self.valves.len() + self.cleanup_valves.len(),
        }
        .log();

        for valve in self.valves.iter().chain(self.cleanup_valves.iter()) {
            if let Err(source) = valve.initialize() {
                ValveInitializationFailed {
                    pipeline: &self.name,
                    valve: valve.name(),
                    error: &source,
                }
                .log();

                return Err(PipelineInitializationError::ValveInitialization {
                    pipeline: self.name.clone(),
                    valve: valve.name().to_string(),
                    source,
                });
            }
        }

        PipelineInitialized {
            pipeline: &self.name,
            valve_count: self.valves.len(),
            cleanup_valve_count: self.cleanup_valves.len(),
        }
        .log();

        Ok(Pipeline {
            name: self.name,
            valves: self.valves,
            cleanup_valves: self.cleanup_valves,
        })
    }
}

impl std::fmt::Debug for PipelineDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineDefinition")
            .field("name", &self.name)
            .field("valves", &valve_names(&self.valves))
            .field("cleanup_valves", &valve_names(&self.cleanup_valves))
            .finish()
    }
}

/// An initialized, immutable pipeline.
///
/// `Pipeline` is `Send + Sync` and is meant to be shared (`Arc<Pipeline>`)
/// by every request thread. All per-request state lives in the
/// [`RequestContext`] and the [`ValveChain`] created for each call.
pub struct Pipeline {
    name: String,
    valves: Vec<Arc<dyn Valve>>,
    cleanup_valves: Vec<Arc<dyn Valve>>,
}

impl Pipeline {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn valve_names(&self) -> Vec<&str> {
        valve_names(&self.valves)
    }

    pub fn cleanup_valve_names(&self) -> Vec<&str> {
        valve_names(&self.cleanup_valves)
    }

    /// A fresh chain over the processing valves, for callers that want to
    /// reuse one chain across requests with [`invoke_with_chain`](Self::invoke_with_chain).
    pub fn chain(&self) -> ValveChain<'_> {
        ValveChain::new(&self.valves)
    }

    /// Drive one request through the processing valves.
    ///
    /// Valves run strictly in configured order. Any valve may stop the chain
    /// by not calling `invoke_next`. An error from a valve aborts the chain
    /// and is returned unchanged; the pipeline performs no retries.
    pub fn invoke(&self, ctx: &mut RequestContext) -> ValveResult {
        let mut chain = self.chain();
        self.drive(PROCESSING_CHAIN, ctx, &mut chain)
    }

    /// Like [`invoke`](Self::invoke) but starting from a caller-supplied
    /// chain. A chain that is not at its head is rewound first.
    ///
    /// The chain must come from this pipeline's [`chain`](Self::chain); a
    /// chain over any other valve list is rejected with [`ForeignChain`]
    /// before a single valve runs.
    pub fn invoke_with_chain(&self, ctx: &mut RequestContext, chain: &mut ValveChain<'_>) -> ValveResult {
        if !chain.walks(&self.valves) {
            return Err(ForeignChain {
                pipeline: self.name.clone(),
            }
            .into());
        }
        chain.reset();
        self.drive(PROCESSING_CHAIN, ctx, chain)
    }

    /// Run the cleanup valves for a request.
    ///
    /// Dispatchers call this after [`invoke`](Self::invoke) regardless of
    /// its outcome. Cleanup valves follow the same chain semantics.
    pub fn cleanup(&self, ctx: &mut RequestContext) -> ValveResult {
        let mut chain = ValveChain::new(&self.cleanup_valves);
        self.drive(CLEANUP_CHAIN, ctx, &mut chain)
    }

    fn drive(&self, chain_kind: &str, ctx: &mut RequestContext, chain: &mut ValveChain<'_>) -> ValveResult {
        let start_msg = ChainInvocationStarted {
            pipeline: &self.name,
            chain: chain_kind,
            path: ctx.path(),
            valve_count: chain.remaining(),
        };
        let span = start_msg.span("chain_invocation");
        let _guard = span.enter();
        start_msg.log();

        let start_time = Instant::now();
        let result = chain.invoke_next(ctx);

        match &result {
            Ok(()) if chain.ran_to_end() => ChainInvocationCompleted {
                pipeline: &self.name,
                chain: chain_kind,
                path: ctx.path(),
                duration: start_time.elapsed(),
            }
            .log(),
            Ok(()) => ChainShortCircuited {
                pipeline: &self.name,
                path: ctx.path(),
                valve: chain.current().map(|v| v.name()).unwrap_or_default(),
                skipped: chain.remaining(),
            }
            .log(),
            Err(error) => ChainInvocationFailed {
                pipeline: &self.name,
                chain: chain_kind,
                path: ctx.path(),
                valve: chain.current().map(|v| v.name()).unwrap_or_default(),
                error,
            }
            .log(),
        }

        result
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("valves", &self.valve_names())
            .field("cleanup_valves", &self.cleanup_valve_names())
            .finish()
    }
}

fn valve_names(valves: &[Arc<dyn Valve>]) -> Vec<&str> {
    valves.iter().map(|v| v.name()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{CallLog, FailingInitValve, RecordingValve};

    #[test]
    fn test_initialize_runs_hooks_in_chain_order() {
        let log = CallLog::default();
        let definition = PipelineDefinition::new("p")
            .with_valve(Arc::new(RecordingValve::with_log("a", &log)))
            .with_valve(Arc::new(RecordingValve::with_log("b", &log)))
            .with_cleanup_valve(Arc::new(RecordingValve::with_log("z", &log)));

        let pipeline = definition.initialize().unwrap();

        assert_eq!(log.entries(), vec!["a.initialize", "b.initialize", "z.initialize"]);
        assert_eq!(pipeline.name(), "p");
        assert_eq!(pipeline.valve_names(), vec!["a", "b"]);
        assert_eq!(pipeline.cleanup_valve_names(), vec!["z"]);
    }

    #[test]
    fn test_initialize_failure_names_valve_and_stops() {
        let log = CallLog::default();
        let definition = PipelineDefinition::new("site")
            .with_valve(Arc::new(RecordingValve::with_log("a", &log)))
            .with_valve(Arc::new(FailingInitValve::new("broken")))
            .with_valve(Arc::new(RecordingValve::with_log("c", &log)));

        let err = definition.initialize().unwrap_err();

        assert_eq!(err.pipeline(), "site");
        assert_eq!(err.valve(), "broken");
        assert!(err.to_string().contains("Valve 'broken' failed to initialize in pipeline 'site'"));
        assert_eq!(log.entries(), vec!["a.initialize"]);
    }

    #[test]
    fn test_invoke_with_chain_rewinds_reused_chain() {
        let log = CallLog::default();
        let pipeline = PipelineDefinition::new("p")
            .with_valve(Arc::new(RecordingValve::with_log("a", &log)))
            .with_valve(Arc::new(RecordingValve::with_log("b", &log)))
            .initialize()
            .unwrap();
        log.clear();

        let mut chain = pipeline.chain();
        pipeline.invoke_with_chain(&mut RequestContext::new("/1"), &mut chain).unwrap();
        pipeline.invoke_with_chain(&mut RequestContext::new("/2"), &mut chain).unwrap();

        assert_eq!(
            log.entries(),
            vec!["a.invoke", "b.invoke", "a.invoke", "b.invoke"]
        );
    }

    #[test]
    fn test_invoke_with_chain_rejects_chain_of_other_pipeline() {
        let log = CallLog::default();
        let site = PipelineDefinition::new("site")
            .with_valve(Arc::new(RecordingValve::with_log("render", &log)))
            .initialize()
            .unwrap();
        let admin = PipelineDefinition::new("admin")
            .with_valve(Arc::new(RecordingValve::with_log("delete_all", &log)))
            .initialize()
            .unwrap();
        log.clear();

        let mut ctx = RequestContext::new("/");
        let err = site.invoke_with_chain(&mut ctx, &mut admin.chain()).unwrap_err();

        assert_eq!(
            err.downcast_ref::<ForeignChain>(),
            Some(&ForeignChain {
                pipeline: "site".to_string()
            })
        );
        assert!(log.entries().is_empty());
        assert!(ctx.executed_valves().is_empty());

        site.invoke_with_chain(&mut ctx, &mut site.chain()).unwrap();
        assert_eq!(log.entries(), vec!["render.invoke"]);
    }

    #[test]
    fn test_empty_pipeline_invokes_cleanly() {
        let pipeline = PipelineDefinition::new("empty").initialize().unwrap();
        let mut ctx = RequestContext::new("/");
        assert!(pipeline.invoke(&mut ctx).is_ok());
        assert!(pipeline.cleanup(&mut ctx).is_ok());
        assert!(ctx.executed_valves().is_empty());
    }

    #[test]
    fn test_pipeline_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Pipeline>();
    }
}
