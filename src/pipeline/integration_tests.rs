// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::backends::local::{PageCacheValve, RenderValve};
use crate::backends::stub::{
    CallLog, FailingInitValve, FailingValve, RecordingValve, ShortCircuitValve, SimulatedFailure, SleepingValve,
};
use crate::errors::ValveResult;
use crate::pipeline::{Pipeline, PipelineDefinition, RequestContext, ValveChain};
use crate::traits::Valve;

/// Records the chain position it observed, then yields to other threads before continuing
struct PositionProbe {
    name: String,
}

impl PositionProbe {
    fn new(name: &str) -> Self {
        Self { name: name.to_string() }
    }
}

impl Valve for PositionProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, ctx: &mut RequestContext, chain: &mut ValveChain<'_>) -> ValveResult {
        ctx.set_attribute(format!("position.{}", self.name), chain.position() as u64);
        thread::yield_now();
        chain.invoke_next(ctx)
    }
}

fn recording_pipeline(names: &[&str], log: &CallLog) -> Pipeline {
    let mut definition = PipelineDefinition::new("p");
    for name in names {
        definition.add_valve(Arc::new(RecordingValve::with_log(name, log)));
    }
    let pipeline = definition.initialize().unwrap();
    log.clear();
    pipeline
}

#[test]
fn test_every_valve_runs_once_in_configured_order() {
    let log = CallLog::default();
    let pipeline = recording_pipeline(&["a", "b", "c", "d", "e"], &log);

    let mut ctx = RequestContext::new("/");
    pipeline.invoke(&mut ctx).unwrap();

    assert_eq!(
        log.entries(),
        vec!["a.invoke", "b.invoke", "c.invoke", "d.invoke", "e.invoke"]
    );
    assert_eq!(ctx.executed_valves(), ["a", "b", "c", "d", "e"]);
}

#[test]
fn test_same_valve_may_appear_twice() {
    let log = CallLog::default();
    let shared: Arc<dyn Valve> = Arc::new(RecordingValve::with_log("audit", &log));
    let pipeline = PipelineDefinition::new("p")
        .with_valve(Arc::clone(&shared))
        .with_valve(Arc::new(RecordingValve::with_log("render", &log)))
        .with_valve(shared)
        .initialize()
        .unwrap();
    log.clear();

    pipeline.invoke(&mut RequestContext::new("/")).unwrap();

    assert_eq!(log.entries(), vec!["audit.invoke", "render.invoke", "audit.invoke"]);
}

#[test]
fn test_short_circuit_skips_remaining_valves() {
    let log = CallLog::default();
    let pipeline = PipelineDefinition::new("p")
        .with_valve(Arc::new(RecordingValve::with_log("a", &log)))
        .with_valve(Arc::new(ShortCircuitValve::new("b")))
        .with_valve(Arc::new(RecordingValve::with_log("c", &log)))
        .initialize()
        .unwrap();
    log.clear();

    let mut ctx = RequestContext::new("/");
    assert!(pipeline.invoke(&mut ctx).is_ok());

    assert_eq!(log.entries(), vec!["a.invoke"]);
    assert_eq!(ctx.executed_valves(), ["a", "b"]);
}

#[test]
fn test_short_circuit_at_every_position() {
    for k in 0..4 {
        let log = CallLog::default();
        let mut definition = PipelineDefinition::new("p");
        for i in 0..4 {
            let name = format!("v{i}");
            if i == k {
                definition.add_valve(Arc::new(ShortCircuitValve::new(&name)));
            } else {
                definition.add_valve(Arc::new(RecordingValve::with_log(&name, &log)));
            }
        }
        let pipeline = definition.initialize().unwrap();
        log.clear();

        let mut ctx = RequestContext::new("/");
        pipeline.invoke(&mut ctx).unwrap();

        let expected: Vec<String> = (0..k).map(|i| format!("v{i}.invoke")).collect();
        assert_eq!(log.entries(), expected, "short-circuit at {k}");
        assert_eq!(ctx.executed_valves().len(), k + 1);
    }
}

#[test]
fn test_error_propagates_unchanged_and_stops_chain() {
    let log = CallLog::default();
    let pipeline = PipelineDefinition::new("p")
        .with_valve(Arc::new(RecordingValve::with_log("a", &log)))
        .with_valve(Arc::new(FailingValve::new("b")))
        .with_valve(Arc::new(RecordingValve::with_log("c", &log)))
        .initialize()
        .unwrap();
    log.clear();

    let err = pipeline.invoke(&mut RequestContext::new("/")).unwrap_err();

    assert_eq!(log.entries(), vec!["a.invoke"]);
    assert_eq!(
        err.downcast_ref::<SimulatedFailure>(),
        Some(&SimulatedFailure {
            valve: "b".to_string()
        })
    );
    assert_eq!(err.to_string(), "Simulated failure in valve 'b'");
}

#[test]
fn test_cleanup_runs_after_processing_error() {
    let log = CallLog::default();
    let pipeline = PipelineDefinition::new("p")
        .with_valve(Arc::new(FailingValve::new("broken")))
        .with_cleanup_valve(Arc::new(RecordingValve::with_log("release", &log)))
        .initialize()
        .unwrap();
    log.clear();

    let mut ctx = RequestContext::new("/");
    assert!(pipeline.invoke(&mut ctx).is_err());
    assert!(pipeline.cleanup(&mut ctx).is_ok());

    assert_eq!(log.entries(), vec!["release.invoke"]);
    assert_eq!(ctx.executed_valves(), ["broken", "release"]);
}

#[test]
fn test_cleanup_chain_can_short_circuit() {
    let log = CallLog::default();
    let pipeline = PipelineDefinition::new("p")
        .with_cleanup_valve(Arc::new(ShortCircuitValve::new("stop")))
        .with_cleanup_valve(Arc::new(RecordingValve::with_log("late", &log)))
        .initialize()
        .unwrap();
    log.clear();

    pipeline.cleanup(&mut RequestContext::new("/")).unwrap();
    assert!(log.entries().is_empty());
}

#[test]
fn test_initialization_failure_yields_no_pipeline() {
    let log = CallLog::default();
    let result = PipelineDefinition::new("site")
        .with_valve(Arc::new(RecordingValve::with_log("a", &log)))
        .with_cleanup_valve(Arc::new(FailingInitValve::new("janitor")))
        .initialize();

    let err = result.unwrap_err();
    assert_eq!(err.valve(), "janitor");
    assert_eq!(log.entries(), vec!["a.initialize"]);

    let source = std::error::Error::source(&err).unwrap();
    assert_eq!(source.to_string(), "Simulated failure in valve 'janitor'");
}

#[test]
fn test_concurrent_invokes_do_not_share_chain_state() {
    let pipeline = Arc::new(
        PipelineDefinition::new("p")
            .with_valve(Arc::new(PositionProbe::new("first")))
            .with_valve(Arc::new(PositionProbe::new("second")))
            .with_valve(Arc::new(SleepingValve::new("pause", Duration::from_millis(1))))
            .with_valve(Arc::new(PositionProbe::new("third")))
            .initialize()
            .unwrap(),
    );

    thread::scope(|scope| {
        for worker in 0..8 {
            let pipeline = Arc::clone(&pipeline);
            scope.spawn(move || {
                for request in 0..25 {
                    let mut ctx = RequestContext::new(format!("/w{worker}/r{request}"));
                    pipeline.invoke(&mut ctx).unwrap();

                    assert_eq!(ctx.executed_valves(), ["first", "second", "pause", "third"]);
                    assert_eq!(ctx.attribute("position.first").and_then(|v| v.as_u64()), Some(1));
                    assert_eq!(ctx.attribute("position.second").and_then(|v| v.as_u64()), Some(2));
                    assert_eq!(ctx.attribute("position.third").and_then(|v| v.as_u64()), Some(4));
                }
            });
        }
    });
}

#[tokio::test]
async fn test_concurrent_invokes_on_blocking_pool() {
    let pipeline = Arc::new(
        PipelineDefinition::new("site")
            .with_valve(Arc::new(PageCacheValve::new("cache", 16)))
            .with_valve(Arc::new(SleepingValve::new("pause", Duration::from_millis(2))))
            .with_valve(Arc::new(RenderValve::new("render", "page {path}")))
            .initialize()
            .unwrap(),
    );

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let pipeline = Arc::clone(&pipeline);
            tokio::task::spawn_blocking(move || {
                let path = format!("/page/{}", i % 4);
                let mut ctx = RequestContext::new(path.clone());
                pipeline.invoke(&mut ctx).map(|()| (path, ctx))
            })
        })
        .collect();

    for handle in handles {
        let (path, ctx) = handle.await.unwrap().unwrap();
        assert_eq!(ctx.response().body.as_deref(), Some(format!("page {path}").as_str()));
    }
}
