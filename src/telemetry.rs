//! Telemetry utilities for command timing and span construction.

use std::time::Instant;

/// Guard for timing command execution.
///
/// Emits a debug event with the elapsed time when dropped, so the latency is
/// recorded on both the success and the error path.
pub struct CommandTimer {
    command: String,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!(command = %self.command, elapsed_ms, "Command timing");
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};

    /// Create a span for a command execution.
    pub fn command(name: &str, caller: &str) -> Span {
        info_span!("command", name = %name, caller = %caller)
    }

    /// Create a span for a control API request.
    pub fn control_request(method: &str, path: &str) -> Span {
        info_span!("control", method = %method, path = %path)
    }

    /// Create a span for a session connection.
    pub fn session(kind: &str) -> Span {
        info_span!("session", kind = %kind)
    }
}
