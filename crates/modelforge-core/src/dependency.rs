//! Dependency kinds, observations, and classified dependencies
//!
//! A model references tables that are either fed from outside the
//! transformation database ("external") or produced by other transformation
//! models ("transformation"). Declarations come from several places; each one
//! is kept as an immutable observation so the classifier can merge them with
//! an explicit conflict policy instead of silently picking a winner.

use serde::{Deserialize, Serialize};

/// Kind of data source backing a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepKind {
    /// Table whose data originates outside the transformation database
    External,

    /// Table produced by another transformation model
    Transformation,

    /// Conflicting declarations, or no declaration resolved yet
    Unknown,
}

impl DepKind {
    /// Get the kind as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::External => "external",
            Self::Transformation => "transformation",
            Self::Unknown => "unknown",
        }
    }

    /// Whether this is one of the two concrete kinds
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Parse a kind token; only the two concrete kinds are valid tokens
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "external" => Some(Self::External),
            "transformation" => Some(Self::Transformation),
            _ => None,
        }
    }
}

impl std::fmt::Display for DepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a dependency declaration was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationSource {
    /// Declared in the model's frontmatter dependency list
    Frontmatter,

    /// Referenced by a dependency accessor in the SQL body
    DepHelper,
}

impl ObservationSource {
    /// Get the source as a stable provenance tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frontmatter => "frontmatter",
            Self::DepHelper => "dep_helper",
        }
    }
}

impl std::fmt::Display for ObservationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single raw (table, kind) declaration, independent of classification
/// policy. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyObservation {
    /// Referenced table name
    pub table: String,

    /// Kind the source declared
    pub kind: DepKind,

    /// Which declaration source produced this observation
    pub source: ObservationSource,
}

impl DependencyObservation {
    /// Create a new observation
    pub fn new(table: impl Into<String>, kind: DepKind, source: ObservationSource) -> Self {
        Self {
            table: table.into(),
            kind,
            source,
        }
    }
}

/// A classified dependency: the final kind plus the full provenance trail.
///
/// Provenance tags are `"frontmatter"`, `"dep_helper"`, and
/// `"inferred:<kind>"`, in the order the classifier appended them.
/// Duplicates across distinct observations are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Table name (unique key across the dependency list)
    pub table: String,

    /// Final classified kind
    pub kind: DepKind,

    /// Ordered source tags that contributed to the classification
    pub provenance: Vec<String>,
}

impl Dependency {
    /// Create a classified dependency
    pub fn new(table: impl Into<String>, kind: DepKind, provenance: Vec<String>) -> Self {
        Self {
            table: table.into(),
            kind,
            provenance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tokens_are_stable() {
        assert_eq!(DepKind::External.as_str(), "external");
        assert_eq!(DepKind::Transformation.as_str(), "transformation");
        assert_eq!(DepKind::Unknown.as_str(), "unknown");
    }

    #[test]
    fn only_concrete_kinds_parse() {
        assert_eq!(DepKind::from_token("external"), Some(DepKind::External));
        assert_eq!(
            DepKind::from_token("transformation"),
            Some(DepKind::Transformation)
        );
        assert_eq!(DepKind::from_token("unknown"), None);
        assert_eq!(DepKind::from_token("External"), None);
    }

    #[test]
    fn unknown_is_not_known() {
        assert!(DepKind::External.is_known());
        assert!(DepKind::Transformation.is_known());
        assert!(!DepKind::Unknown.is_known());
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&DepKind::External).unwrap();
        assert_eq!(json, "\"external\"");
    }

    #[test]
    fn dependency_serialization() {
        let dep = Dependency::new(
            "canonical_block",
            DepKind::External,
            vec!["frontmatter".to_string(), "dep_helper".to_string()],
        );

        let json = serde_json::to_string(&dep).unwrap();
        assert!(json.contains("\"canonical_block\""));
        assert!(json.contains("\"provenance\""));
    }
}
