/*!
 * Structured Tracing
 * Subscriber setup and spans for process lifecycle operations
 */

use crate::core::types::Pid;
use std::time::Instant;
use tracing::{debug, span, Level, Span};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - KPROC_TRACE_JSON: Enable JSON output (default: false)
///
/// Returns false if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("KPROC_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        debug!(json = use_json, "Structured tracing initialized");
    }
    installed
}

/// Span scoping one lifecycle operation on one process
pub struct OperationSpan {
    span: Span,
    start: Instant,
}

impl OperationSpan {
    pub fn new(operation: &'static str, pid: Pid) -> Self {
        let span = span!(
            Level::DEBUG,
            "process_op",
            operation,
            pid,
            duration_us = tracing::field::Empty,
            error = tracing::field::Empty,
        );
        Self {
            span,
            start: Instant::now(),
        }
    }

    /// The underlying span, for `enter()` or `in_scope()`
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn record_error(&self, error: &dyn std::fmt::Display) {
        self.span.record("error", tracing::field::display(error));
    }
}

impl Drop for OperationSpan {
    fn drop(&mut self) {
        self.span
            .record("duration_us", self.start.elapsed().as_micros() as u64);
    }
}

/// Helper to create an operation span
#[inline]
pub fn span_operation(operation: &'static str, pid: Pid) -> OperationSpan {
    OperationSpan::new(operation, pid)
}
