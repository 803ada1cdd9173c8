//! Integration tests for the logging system

use core_runtime::config::Environment;
use core_runtime::logging::{
    component_span, init_logging, redact_if_sensitive, LogFormat, LogLevel, LoggingConfig,
};
use tracing::Span;

#[test]
fn test_logging_initializes_once() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn);

    assert!(init_logging(config.clone()).is_ok());
    // The global subscriber can only be installed once per process
    assert!(init_logging(config).is_err());
}

#[test]
fn test_environment_selects_level() {
    assert_eq!(
        LoggingConfig::for_environment(Environment::Dev).level,
        LogLevel::Debug
    );
    assert_eq!(
        LoggingConfig::for_environment(Environment::Prod).level,
        LogLevel::Info
    );
}

#[test]
fn test_component_spans_nest_under_root() {
    let root = tracing::info_span!("songlibrary");
    let store = component_span(&root, "storage/postgres");
    let service = component_span(&root, "services/song");

    // Both handles are independent values; emitting through one must not
    // require entering the other.
    tracing::debug!(parent: &store, "store event");
    tracing::debug!(parent: &service, "service event");

    let detached = component_span(&Span::none(), "http/songs");
    tracing::debug!(parent: &detached, "detached event");
}

#[test]
fn test_password_never_logged_verbatim() {
    assert_eq!(redact_if_sensitive("password", "s3cr3t"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("dbname", "songlibrary"), "songlibrary");
}
