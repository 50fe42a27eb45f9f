// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{json, Value};
use std::sync::Arc;

use crate::backends::local::{MissingAttribute, LOCATION_HEADER};
use crate::config::{load_and_validate_config, parse_config, ConfigFormat, RuntimeBuilder};
use crate::errors::{ConfigError, RuntimeError};
use crate::pipeline::RequestContext;
use crate::registry::{PluginContext, ServiceRegistry};
use crate::traits::{ContextContributor, Valve};

struct SegmentContributor;

impl ContextContributor for SegmentContributor {
    fn contribute(&self, path: &str) -> Vec<(String, Value)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        vec![("request.segments".to_string(), json!(segments))]
    }
}

/// Test that the bundled YAML configuration loads and orders correctly
#[test]
fn test_site_yaml_loading() {
    let config = load_and_validate_config("configs/site.yaml").unwrap();

    assert_eq!(config.default_pipeline.as_deref(), Some("site"));
    assert_eq!(config.pipelines.len(), 2);

    let site = config.pipeline("site").unwrap();
    assert_eq!(site.valves.len(), 5);
    assert_eq!(site.cleanup.len(), 1);
    assert_eq!(site.valves[2].stage_name(), "legacy");
    assert_eq!(site.valves[2].option_u64("status"), Some(301));
}

/// Test that the TOML variant builds the same site chain
#[test]
fn test_site_toml_builds_runtime() {
    let config = load_and_validate_config("configs/site.toml").unwrap();
    let pipelines = RuntimeBuilder::from_config(&config, &Arc::new(ServiceRegistry::new())).unwrap();

    let site = pipelines.select(None).unwrap();
    assert_eq!(site.valve_names(), vec!["diagnostics", "legacy", "cache", "render"]);
    assert_eq!(site.cleanup_valve_names(), vec!["noop"]);
}

/// Test building pipelines from the bundled YAML and serving requests through them
#[test]
fn test_site_yaml_end_to_end() {
    let config = load_and_validate_config("configs/site.yaml").unwrap();
    let registry = Arc::new(ServiceRegistry::new());
    let core = PluginContext::new("core", &registry);
    core.register_service(
        Arc::new(SegmentContributor) as Arc<dyn ContextContributor>,
        "context.contributor",
    );

    let pipelines = RuntimeBuilder::from_config(&config, &registry).unwrap();
    assert_eq!(pipelines.names(), vec!["api", "site"]);

    let site = pipelines.select(None).unwrap();
    assert_eq!(
        site.valve_names(),
        vec!["diagnostics", "contributors", "legacy", "cache", "render"]
    );

    // first request renders, contributors decorate the context
    let mut first = RequestContext::new("/news/today");
    site.invoke(&mut first).unwrap();
    site.cleanup(&mut first).unwrap();
    assert_eq!(first.response().body.as_deref(), Some("<h1>/news/today</h1>"));
    assert_eq!(first.attribute("request.segments"), Some(&json!(["news", "today"])));
    assert!(first.attribute("diagnostics.elapsed_ms").is_some());
    assert_eq!(
        first.executed_valves(),
        ["diagnostics", "contributors", "legacy", "cache", "render", "noop"]
    );

    // second request is answered by the cache
    let mut second = RequestContext::new("/news/today");
    site.invoke(&mut second).unwrap();
    assert_eq!(second.response(), first.response());
    assert_eq!(second.executed_valves(), ["diagnostics", "contributors", "legacy", "cache"]);

    // legacy path is redirected before the cache is consulted
    let mut legacy = RequestContext::new("/old-news");
    site.invoke(&mut legacy).unwrap();
    assert_eq!(legacy.response().status, 301);
    assert_eq!(legacy.response().header(LOCATION_HEADER), Some("/news"));
    assert_eq!(legacy.executed_valves(), ["diagnostics", "contributors", "legacy"]);

    let api = pipelines.select(Some("api")).unwrap();
    let mut ctx = RequestContext::new("/users");
    api.invoke(&mut ctx).unwrap();
    assert_eq!(ctx.response().body.as_deref(), Some(r#"{"path":"/users"}"#));
    assert_eq!(ctx.attribute("channel"), Some(&json!("json")));
}

/// Test that a registry-published valve takes part in a configured chain
#[test]
fn test_service_stage_uses_registered_valve() {
    let yaml = r#"
pipelines:
  - name: guarded
    valves:
      - service: valves.guard
      - valve: render
"#;
    let config = parse_config(yaml, ConfigFormat::Yaml).unwrap();
    let registry = Arc::new(ServiceRegistry::new());
    let auth = PluginContext::new("auth", &registry);

    let missing = RuntimeBuilder::from_config(&config, &registry);
    assert!(matches!(missing, Err(RuntimeError::ValveCreation { .. })));

    let guard: Arc<dyn Valve> = Arc::new(crate::backends::local::RequireAttributeValve::new("guard", "user"));
    auth.register_service(guard, "valves.guard");

    let pipelines = RuntimeBuilder::from_config(&config, &registry).unwrap();
    let guarded = pipelines.get("guarded").unwrap();
    assert_eq!(guarded.valve_names(), vec!["guard", "render"]);

    let err = guarded.invoke(&mut RequestContext::new("/account")).unwrap_err();
    let missing_attribute = err.downcast_ref::<MissingAttribute>().unwrap();
    assert_eq!(missing_attribute.key, "user");

    let mut ctx = RequestContext::new("/account");
    ctx.set_attribute("user", "ada");
    guarded.invoke(&mut ctx).unwrap();
    assert_eq!(ctx.response().body.as_deref(), Some("rendered /account"));
}

/// Test that validation errors from every pipeline are reported together
#[test]
fn test_invalid_yaml_reports_all_errors() {
    let yaml = r#"
default_pipeline: nowhere
pipelines:
  - name: site
    valves:
      - valve: render
        service: valves.render
      - valve: noop
        after: [ghost]
  - name: site
"#;
    let config = parse_config(yaml, ConfigFormat::Yaml).unwrap();

    let err = RuntimeBuilder::from_config(&config, &Arc::new(ServiceRegistry::new())).unwrap_err();
    match err {
        RuntimeError::Validation(errors) => assert_eq!(errors.len(), 4),
        other => panic!("unexpected error: {other}"),
    }

    let wrapped = ConfigError::Validation(crate::config::validate_config(&config).unwrap_err());
    let message = wrapped.to_string();
    assert!(message.contains("Duplicate pipeline name: 'site'"));
    assert!(message.contains("names both a valve and a service"));
    assert!(message.contains("'ghost'"));
    assert!(message.contains("Default pipeline 'nowhere' is not declared"));
}
