//! Integration tests for the observability layer
//!
//! These tests verify:
//! - Level filtering and the audit bypass
//! - Sink isolation when file output fails
//! - Registry overwrite semantics
//! - JSON-lines file output
//! - Exception normalization end to end
//! - Instrumentation passthrough

use safe_observability::boundary::{ExceptionNormalizer, Failure, RequestContext};
use safe_observability::core::config::LoggingConfig;
use safe_observability::core::context_value::ContextValue;
use safe_observability::core::log_level::LogLevel;
use safe_observability::core::registry::LoggerRegistry;
use safe_observability::core::serializer::{CIRCULAR, TRUNCATED};
use safe_observability::core::Environment;
use safe_observability::instrumentation::{Instrumented, TracingIntegration};
use safe_observability::sinks::{ConsoleTarget, SharedBuffer};
use serde_json::Value;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn buffered(config: LoggingConfig) -> (LoggerRegistry, SharedBuffer) {
    let buffer = SharedBuffer::new();
    let registry = LoggerRegistry::with_console_target(config, ConsoleTarget::Buffer(buffer.clone()));
    (registry, buffer)
}

/// Production keeps ERROR entries on a single console line
fn production() -> LoggingConfig {
    LoggingConfig::default().with_environment(Environment::Production)
}

fn parse_lines(buffer: &SharedBuffer) -> Vec<Value> {
    buffer
        .lines()
        .iter()
        .map(|line| serde_json::from_str(line).expect("Console line is not JSON"))
        .collect()
}

#[test]
fn test_level_filtering_with_audit_bypass() {
    let (registry, buffer) = buffered(production().with_min_level(LogLevel::Warn));
    let logger = registry.for_name("Filtering");

    logger.verbose("verbose");
    logger.debug("debug");
    logger.info("info");
    logger.warn("warn");
    logger.error("error");
    logger.audit("audit");

    let levels: Vec<String> = parse_lines(&buffer)
        .iter()
        .filter_map(|line| line["level"].as_str().map(str::to_string))
        .collect();
    assert_eq!(levels, vec!["WARN", "ERROR", "AUDIT"]);
    assert_eq!(logger.metrics().filtered(), 3);
}

#[test]
fn test_only_first_extra_is_used() {
    let (registry, buffer) = buffered(LoggingConfig::default());
    let logger = registry.for_name("Extras");

    logger.log(
        LogLevel::Info,
        "two extras",
        &[ContextValue::map().with("first", 1), ContextValue::map().with("second", 2)],
    );

    let lines = parse_lines(&buffer);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["extra"], serde_json::json!({ "first": 1 }));
}

#[test]
fn test_file_failure_does_not_affect_console() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    // A directory cannot be opened for appending
    let config = production().with_file(temp_dir.path());
    let (registry, buffer) = buffered(config);
    let logger = registry.for_name("Isolation");

    logger.info("first");
    logger.flush();
    logger.info("second");
    logger.flush();

    let lines = parse_lines(&buffer);
    let messages: Vec<&str> = lines
        .iter()
        .filter(|line| line["name"] == "Isolation")
        .filter_map(|line| line["message"].as_str())
        .collect();
    assert_eq!(messages, vec!["first", "second"]);

    let reports = lines.iter().filter(|line| line["name"] == "FileSink").count();
    assert_eq!(reports, 2);
    assert_eq!(logger.metrics().sink_failures(), 0);
}

#[test]
fn test_file_output_is_json_lines() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("app.log");
    let mut config = LoggingConfig::default().with_file(&log_file);
    config.console_enabled = false;
    let (registry, buffer) = buffered(config);
    let logger = registry.for_name("Orders");

    let order = ContextValue::map().with("id", 17).with("symbol", "ACME");
    order.insert("self", order.clone());
    logger.info_with("order placed", order.clone());
    logger.flush();
    order.insert("self", ContextValue::Null);

    assert!(buffer.contents().is_empty());
    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert!(content.starts_with('\n'));

    let line = content.lines().find(|l| !l.is_empty()).expect("No log line");
    let parsed: Value = serde_json::from_str(line).expect("Log line is not JSON");
    let keys: Vec<&String> = parsed.as_object().expect("Not an object").keys().collect();
    assert_eq!(keys.len(), 5);
    assert_eq!(parsed["name"], "Orders");
    assert_eq!(parsed["extra"]["id"], 17);
    // The depth bound stops the cycle before any marker is needed
    let mut cursor = &parsed["extra"];
    let mut depth = 1;
    while cursor.get("self").is_some() {
        cursor = &cursor["self"];
        depth += 1;
    }
    assert_eq!(depth, 10);
    assert_eq!(cursor.get(TRUNCATED), Some(&Value::from(TRUNCATED)));
}

#[test]
fn test_pretty_console_marks_cycles() {
    let mut config = LoggingConfig::default();
    config.structured = false;
    let (registry, buffer) = buffered(config);
    let logger = registry.for_name("Pretty");

    let node = ContextValue::map().with("name", "node");
    node.insert("next", node.clone());
    logger.warn_with("cyclic", node.clone());
    node.insert("next", ContextValue::Null);

    let contents = buffer.contents();
    assert!(contents.contains("[Pretty]"));
    assert!(contents.contains("cyclic"));
    assert!(contents.contains(CIRCULAR));
}

#[test]
fn test_registry_overwrite_gives_independent_loggers() {
    let (registry, _) = buffered(LoggingConfig::default());

    let first = registry.for_name("Quotes");
    let second = registry.for_name("Quotes");
    second.set_level(LogLevel::Error);

    assert_eq!(first.level(), LogLevel::Debug);
    assert_eq!(second.level(), LogLevel::Error);
    let current = registry.get("Quotes").expect("Quotes not registered");
    assert!(Arc::ptr_eq(&current, &second));
}

#[test]
fn test_unknown_level_string_is_rejected() {
    let (registry, buffer) = buffered(LoggingConfig::default());
    let logger = registry.for_name("Strings");

    assert!(logger.set_level_str("LOUD").is_err());
    assert_eq!(logger.level(), LogLevel::Debug);
    assert!(!logger.can_log_str("LOUD"));

    logger.log_named("LOUD", "never", &[]);
    assert!(buffer.contents().is_empty());
}

#[test]
fn test_normalizer_logs_through_registry() {
    let (registry, buffer) = buffered(production());
    let normalizer =
        ExceptionNormalizer::from_config(registry.for_name("ExceptionNormalizer"), registry.config());
    let request = RequestContext::new()
        .with_url("/api/quotes")
        .with_header("Request-Id", "abc");

    let (status, body) = normalizer.respond(Failure::http(503, "Upstream unavailable"), &request);

    assert_eq!(status, 503);
    let envelope: Value = serde_json::from_str(&body).expect("Body is not JSON");
    assert_eq!(envelope["statusCode"], 503);
    assert_eq!(envelope["path"], "/api/quotes");
    assert_eq!(envelope["requestId"], "abc");
    assert!(envelope.get("stack").is_none());

    let lines = parse_lines(&buffer);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["level"], "ERROR");
    assert_eq!(lines[0]["message"], "Upstream unavailable");
}

#[test]
fn test_instrumentation_passthrough() {
    let (registry, buffer) = buffered(LoggingConfig::default());
    let calls = Instrumented::new(
        "QuoteService",
        registry.for_name("QuoteService"),
        Arc::new(TracingIntegration::disabled()),
    );

    let value = calls.instrument("answer", || 42);

    assert_eq!(value, 42);
    let lines = parse_lines(&buffer);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["level"], "INFO");
    assert_eq!(lines[0]["message"], "Invoking QuoteService.answer");
}

#[tokio::test]
async fn test_async_instrumentation_with_tracing_disabled() {
    let (registry, buffer) = buffered(LoggingConfig::default());
    let calls = Instrumented::new(
        "QuoteService",
        registry.for_name("QuoteService"),
        Arc::new(TracingIntegration::disabled()),
    );

    let value = calls
        .instrument_async("fetch", async {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
            "quotes"
        })
        .await;

    assert_eq!(value, "quotes");
    assert_eq!(buffer.lines().len(), 1);
}
