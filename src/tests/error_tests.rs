//! Tests for the error module.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{
    ConfigError, ErrorContext, ErrorReporter, MaukaError, TableError, TracingErrorReporter,
};

/// Test that error context can be created and displayed properly.
#[test]
fn test_error_context_display() {
    let error = MaukaError::Custom("test error".to_string());
    let context = ErrorContext::new(error, "test_component").with_details("additional details");

    let display_string = format!("{context}");
    assert!(display_string.contains("test error"));
    assert!(display_string.contains("test_component"));
    assert!(display_string.contains("additional details"));
}

/// Test that nested errors work correctly.
#[test]
fn test_nested_errors() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let mauka_error = MaukaError::Io(io_error);
    assert!(mauka_error.to_string().contains("file not found"));

    let table: MaukaError = TableError::Empty.into();
    assert!(matches!(table, MaukaError::Table(TableError::Empty)));

    let config: MaukaError = ConfigError::ValidationError("bad".to_string()).into();
    assert!(config.to_string().contains("bad"));
}

#[test]
fn test_table_error_messages_name_the_problem() {
    let err = TableError::invalid_argument("capacity", "must be greater than 0");
    assert!(err.to_string().contains("capacity"));

    let err = TableError::ConcurrentModification {
        expected: 3,
        found: 5,
    };
    let message = err.to_string();
    assert!(message.contains('3') && message.contains('5'));
}

#[test]
fn test_config_error_from_table_error() {
    let err = ConfigError::from_table(
        "puka",
        TableError::invalid_argument("load_factor", "out of range"),
    );
    assert!(matches!(
        err,
        ConfigError::ValueOutOfRange { ref key, .. } if key == "puka.load_factor"
    ));

    let err = ConfigError::from_table("puka", TableError::KeyNotFound);
    assert!(matches!(err, ConfigError::ValidationError(_)));
}

/// Counting error reporter for testing.
#[derive(Debug, Default)]
struct CountingReporter {
    reported: AtomicUsize,
}

impl ErrorReporter for CountingReporter {
    fn report(&self, _context: ErrorContext) {
        self.reported.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_reporter_receives_contexts() {
    let reporter = CountingReporter::default();
    for component in ["nalu", "moana"] {
        reporter.report(ErrorContext::new(
            MaukaError::Table(TableError::KeyNotFound),
            component,
        ));
    }
    assert_eq!(reporter.reported.load(Ordering::SeqCst), 2);
}

/// Test that the default tracing error reporter can be used.
#[test]
fn test_tracing_error_reporter() {
    let reporter = TracingErrorReporter;
    let context = ErrorContext::new(MaukaError::Custom("test error".to_string()), "test");
    reporter.report(context);
}
