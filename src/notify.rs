use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Success => "ok",
            Severity::Info => "info",
            Severity::Warning => "aviso",
            Severity::Error => "error",
        };
        f.write_str(label)
    }
}

/// Receives user-facing notices. Rendering and dismissal belong to the sink.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}
