//! Generation diagnostics

use std::error::Error as StdError;
use std::fmt;

pub const MODEL_GENERATOR: &str = "ModelGenerator";
pub const CLIENT_GENERATOR: &str = "ClientGenerator";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// One message attributed to a generator and a subject (definition name,
/// client group or operation)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub generator: &'static str,
    pub subject: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.severity, self.generator, self.subject, self.message
        )
    }
}

/// Outcome of a generation run
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub diagnostics: Vec<Diagnostic>,
    /// Units written to the sink, in emission order
    pub generated: Vec<String>,
    /// Subjects whose generation failed
    pub failed: Vec<String>,
    /// The run stopped early on request
    pub cancelled: bool,
}

impl GenerationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&mut self, generator: &'static str, subject: &str, message: impl Into<String>) {
        self.push(Severity::Info, generator, subject, message.into());
    }

    pub fn warning(&mut self, generator: &'static str, subject: &str, message: impl Into<String>) {
        self.push(Severity::Warning, generator, subject, message.into());
    }

    /// Record a failure with the full error chain
    pub fn failure(&mut self, generator: &'static str, subject: &str, error: &dyn StdError) {
        let mut message = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            let text = cause.to_string();
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = cause.source();
        }
        self.failed.push(subject.to_string());
        self.push(Severity::Error, generator, subject, message);
    }

    pub fn record_generated(&mut self, unit: &str) {
        self.generated.push(unit.to_string());
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    fn push(&mut self, severity: Severity, generator: &'static str, subject: &str, message: String) {
        self.diagnostics.push(Diagnostic {
            severity,
            generator,
            subject: subject.to_string(),
            message,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_failure_is_attributed() {
        let mut report = GenerationReport::new();
        report.success(MODEL_GENERATOR, "Order", "Generated Order");
        report.failure(
            MODEL_GENERATOR,
            "Broken",
            &Error::InvalidIdentifier("{}".into()),
        );

        assert!(report.has_failures());
        let errors: Vec<_> = report.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].subject, "Broken");
        assert_eq!(
            errors[0].to_string(),
            "[error] ModelGenerator Broken: Cannot derive an identifier from '{}'"
        );
    }
}
