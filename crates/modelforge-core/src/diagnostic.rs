//! Diagnostic codes and warning reporting
//!
//! IMPORTANT: Diagnostic codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.
//!
//! Resolution never throws for these conditions; every diagnostic is folded
//! into the report and the CLI maps their presence to an exit code.

use serde::{Deserialize, Serialize};

/// Diagnostic code registry (v1)
///
/// These codes are STABLE and VERSIONED.
/// Do NOT rename or remove codes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    /// Two known declarations disagree on a table's kind
    AmbiguousDependencyKind,

    /// Filesystem inference disagrees with an explicitly declared kind
    InferenceDisagreement,

    /// A placeholder matched no substitution rule and survived verbatim
    UnresolvedFragment,
}

impl DiagnosticCode {
    /// Get the diagnostic code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AmbiguousDependencyKind => "AMBIGUOUS_DEPENDENCY_KIND",
            Self::InferenceDisagreement => "INFERENCE_DISAGREEMENT",
            Self::UnresolvedFragment => "UNRESOLVED_FRAGMENT",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Warning - worth a follow-up question but not blocking
    Warn,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
        }
    }
}

/// A diagnostic message recorded in the resolution report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code
    pub code: DiagnosticCode,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_code_stability() {
        assert_eq!(
            DiagnosticCode::AmbiguousDependencyKind.as_str(),
            "AMBIGUOUS_DEPENDENCY_KIND"
        );
        assert_eq!(
            DiagnosticCode::UnresolvedFragment.as_str(),
            "UNRESOLVED_FRAGMENT"
        );
    }

    #[test]
    fn diagnostic_serialization() {
        let diag = Diagnostic::new(
            DiagnosticCode::AmbiguousDependencyKind,
            Severity::Warn,
            "table 'blocks' declared as both external and transformation",
        );

        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("AMBIGUOUS_DEPENDENCY_KIND"));
        assert!(json.contains("\"warn\""));
    }
}
