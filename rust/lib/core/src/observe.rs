//! Observability sink for failures.
//!
//! Every failure that gets turned into a response is reported here first,
//! together with the request's correlation id.

use std::error::Error;
use std::sync::Mutex;

/// Receives `(correlation id, error)` for every failure path.
pub trait ErrorReporter: Send + Sync + 'static {
    fn report(&self, request_id: &str, error: &(dyn Error + 'static));
}

/// Default sink: one structured `tracing` event per failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, request_id: &str, error: &(dyn Error + 'static)) {
        let mut chain = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        if chain.is_empty() {
            tracing::warn!(request_id = %request_id, error = %error, "request failed");
        } else {
            tracing::warn!(
                request_id = %request_id,
                error = %error,
                caused_by = %chain.join(": "),
                "request failed"
            );
        }
    }
}

/// Sink that keeps every report in memory. Used by tests.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<(String, String)>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All `(request_id, error message)` pairs received so far.
    pub fn reports(&self) -> Vec<(String, String)> {
        self.reports
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, request_id: &str, error: &(dyn Error + 'static)) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push((request_id.to_string(), error.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServiceError;

    #[test]
    fn recording_reporter_keeps_order() {
        let sink = RecordingReporter::new();
        sink.report("a", &ServiceError::Timeout);
        sink.report("b", &ServiceError::Internal("disk full".into()));
        assert_eq!(
            sink.reports(),
            vec![
                ("a".to_string(), "request canceled or timed out".to_string()),
                ("b".to_string(), "disk full".to_string()),
            ]
        );
    }

    #[test]
    fn tracing_reporter_accepts_any_error() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        TracingReporter.report("c", &io);
    }
}
