//! Diagnostic sink.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

/// How serious a reported message is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
    None,
}

impl Severity {
    /// The fixed-width tag the default sink puts in front of a message.
    pub fn tag(self) -> &'static str {
        match self {
            Severity::Debug => "Debug:",
            Severity::Info => "Info :",
            Severity::Warn => "Warn :",
            Severity::Error => "Error:",
            Severity::None => "None :",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::None => "none",
        };
        f.write_str(name)
    }
}

/// A callable that receives every diagnostic of a parse session.
pub type LogCallback = Arc<dyn Fn(Severity, &str) + Send + Sync>;

/// The sink installed when none is given: one tagged line per message on stdout.
pub fn default_log_callback() -> LogCallback {
    Arc::new(log_to_stdout)
}

fn log_to_stdout(severity: Severity, msg: &str) {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    // A closed stdout must not turn into a parse failure.
    let _ = writeln!(out, "{}{}", severity.tag(), msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_aligned() {
        let tags = [
            Severity::Debug,
            Severity::Info,
            Severity::Warn,
            Severity::Error,
            Severity::None,
        ]
        .map(Severity::tag);
        assert!(tags.iter().all(|t| t.len() == 6));
        assert_eq!(tags[3], "Error:");
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Debug < Severity::Warn);
        assert!(Severity::Error > Severity::Info);
        assert_eq!(Severity::Warn.to_string(), "warn");
    }
}
