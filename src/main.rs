// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{anyhow, bail, Context};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::env;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use valvechain::config::{load_and_validate_config, RuntimeBuilder};
use valvechain::pipeline::{Pipeline, RequestContext, Response};
use valvechain::registry::{PluginContext, ServiceRegistry};
use valvechain::traits::ContextContributor;

const CONTRIBUTOR_SERVICE: &str = "context.contributor";

/// Command line options
struct Args {
    config_file: String,
    pipeline: Option<String>,
    json: bool,
    paths: Vec<String>,
}

impl Args {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut config_file = None;
        let mut pipeline = None;
        let mut json = false;
        let mut paths = Vec::new();

        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--pipeline" => {
                    let name = iter.next().ok_or_else(|| anyhow!("--pipeline requires a name"))?;
                    pipeline = Some(name.clone());
                }
                "--json" => json = true,
                _ if config_file.is_none() => config_file = Some(arg.clone()),
                _ => paths.push(arg.clone()),
            }
        }

        let Some(config_file) = config_file else {
            bail!("missing config file");
        };
        if paths.is_empty() {
            bail!("at least one request path is required");
        }

        Ok(Self {
            config_file,
            pipeline,
            json,
            paths,
        })
    }
}

/// Publishes the request path split into segments as `request.segments`
struct RequestSegments;

impl ContextContributor for RequestSegments {
    fn contribute(&self, path: &str) -> Vec<(String, Value)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        vec![("request.segments".to_string(), json!(segments))]
    }
}

/// What the dispatcher reports for one request
#[derive(Serialize)]
struct DispatchOutcome {
    path: String,
    pipeline: String,
    response: Response,
    executed_valves: Vec<String>,
    attributes: BTreeMap<String, Value>,
    error: Option<String>,
}

/// Run one request through the pipeline, then its cleanup chain.
///
/// A processing error becomes a 500 response; cleanup always runs.
fn dispatch(pipeline: &Pipeline, path: String) -> DispatchOutcome {
    let mut ctx = RequestContext::new(path);

    let error = match pipeline.invoke(&mut ctx) {
        Ok(()) => None,
        Err(e) => {
            let response = ctx.response_mut();
            response.status = 500;
            response.body = Some(format!("{e:#}"));
            Some(format!("{e:#}"))
        }
    };

    if let Err(e) = pipeline.cleanup(&mut ctx) {
        tracing::warn!(pipeline = pipeline.name(), path = ctx.path(), error = %e, "cleanup chain failed");
    }

    DispatchOutcome {
        path: ctx.path().to_string(),
        pipeline: pipeline.name().to_string(),
        response: ctx.response().clone(),
        executed_valves: ctx.executed_valves().to_vec(),
        attributes: ctx
            .attributes()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        error,
    }
}

fn print_outcome(index: usize, outcome: &DispatchOutcome) {
    let marker = if outcome.error.is_some() { "❌" } else { "✅" };
    println!(
        "{} {}. {} → {} via '{}'",
        marker,
        index + 1,
        outcome.path,
        outcome.response.status,
        outcome.pipeline
    );
    println!("     🔄 Valves: {}", outcome.executed_valves.join(" → "));
    for (name, value) in &outcome.response.headers {
        println!("     📨 {}: {}", name, value);
    }
    if let Some(body) = &outcome.response.body {
        println!("     📄 Body: {}", body);
    }
    if !outcome.attributes.is_empty() {
        println!("     📝 Attributes:");
        for (key, value) in &outcome.attributes {
            println!("        • {}: {}", key, value);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let raw_args: Vec<String> = env::args().collect();
    let args = match Args::parse(&raw_args) {
        Ok(args) => args,
        Err(e) => {
            let program = raw_args.first().map(String::as_str).unwrap_or("valvechain");
            eprintln!("Error: {e}");
            eprintln!(
                "Usage: {} <config.yaml|config.toml> [--pipeline <name>] [--json] <path> [path ...]",
                program
            );
            eprintln!("Example: {} configs/site.yaml /news /old-news /about", program);
            std::process::exit(1);
        }
    };

    let start_time = Instant::now();
    let config = load_and_validate_config(&args.config_file)
        .with_context(|| format!("loading {}", args.config_file))?;

    // one registry per session; components publish into it through their own context
    let registry = Arc::new(ServiceRegistry::new());
    let dispatcher = PluginContext::new("dispatcher", &registry);
    dispatcher.register_service(Arc::new(RequestSegments) as Arc<dyn ContextContributor>, CONTRIBUTOR_SERVICE);

    let pipelines = RuntimeBuilder::from_config(&config, &registry)?;
    let pipeline = pipelines.select(args.pipeline.as_deref()).ok_or_else(|| match &args.pipeline {
        Some(name) => anyhow!("no pipeline named '{}' (available: {})", name, pipelines.names().join(", ")),
        None => anyhow!("no pipeline named and no default_pipeline configured"),
    })?;

    if !args.json {
        println!("🚰 Pipeline '{}' from {}", pipeline.name(), args.config_file);
        println!("🔧 Valves: {}", pipeline.valve_names().join(" → "));
        if !pipeline.cleanup_valve_names().is_empty() {
            println!("🧹 Cleanup: {}", pipeline.cleanup_valve_names().join(" → "));
        }
        println!();
    }

    // every request gets its own blocking task; results are reported in request order
    let handles: Vec<_> = args
        .paths
        .iter()
        .cloned()
        .map(|path| {
            let pipeline = Arc::clone(&pipeline);
            tokio::task::spawn_blocking(move || dispatch(&pipeline, path))
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        outcomes.push(handle.await.context("request task panicked")?);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        for (index, outcome) in outcomes.iter().enumerate() {
            print_outcome(index, outcome);
        }
        println!("\n⏱️  Total Time (including config load): {:?}", start_time.elapsed());
    }

    dispatcher.stop();
    Ok(())
}
