//! Validation report data structures.

use std::fmt;

/// The result of validating a set of configured rates.
///
/// Contains a boolean indicating overall validity and a vector of
/// individual validation results. The set is considered invalid if any
/// result has Error severity.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Report {
    /// Whether the rate set is valid overall. False if any errors were found.
    pub is_valid: bool,
    /// Individual validation results found during checks.
    pub results: Vec<ValidationResult>,
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

impl Report {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            results: Vec::new(),
        }
    }

    /// Adds a validation result to the report.
    ///
    /// If the result has Error severity, marks the overall report as
    /// invalid.
    pub fn add_result(&mut self, result: ValidationResult) {
        if result.severity == Severity::Error {
            self.is_valid = false;
        }
        self.results.push(result);
    }
}

/// A single validation issue: where it was found, what it is, and how
/// serious it is.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ValidationResult {
    /// The reaction equation (or other location) the issue was found at
    location: String,
    /// Human readable description of the issue
    message: String,
    /// Severity level of the issue
    severity: Severity,
}

impl ValidationResult {
    pub fn new(location: String, message: String, severity: Severity) -> Self {
        Self {
            location,
            message,
            severity,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.location, self.severity, self.message)
    }
}

/// Severity levels for validation issues.
#[derive(Debug, Clone, PartialEq, Copy, serde::Serialize, serde::Deserialize)]
pub enum Severity {
    /// Critical issue that makes the rate set invalid
    Error,
    /// Non-critical issue that should be reviewed
    Warning,
    /// Informational message
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "Error"),
            Severity::Warning => write!(f, "Warning"),
            Severity::Info => write!(f, "Info"),
        }
    }
}
