//! Resolution report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.
//!
//! Two collaborators consume this report as their sole contract: schema
//! introspection keys off `dependencies`, benchmarking keys off
//! `rendered_sql`. Neither re-implements classification or substitution.

use serde::{Deserialize, Serialize};

use crate::dependency::{DepKind, Dependency};
use crate::diagnostic::Diagnostic;
use crate::interval::Interval;

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Per-kind dependency counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyCounts {
    /// Dependencies classified as external
    pub external: usize,

    /// Dependencies classified as transformation
    pub transformation: usize,

    /// Dependencies with conflicting or missing declarations
    pub unknown: usize,
}

impl DependencyCounts {
    /// Tally counts over a classified dependency list
    pub fn tally(dependencies: &[Dependency]) -> Self {
        let mut counts = Self::default();
        for dep in dependencies {
            match dep.kind {
                DepKind::External => counts.external += 1,
                DepKind::Transformation => counts.transformation += 1,
                DepKind::Unknown => counts.unknown += 1,
            }
        }
        counts
    }
}

/// Summary statistics for a resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionSummary {
    /// Model file name
    pub model: String,

    /// Processing interval from the frontmatter (or defaults)
    pub interval: Interval,

    /// Total number of classified dependencies
    pub dependency_count: usize,

    /// Per-kind breakdown
    pub dependency_counts: DependencyCounts,

    /// Number of distinct unresolved fragments
    pub unresolved_count: usize,

    /// Whether the rendered SQL can be executed as-is
    pub is_runnable: bool,
}

impl ResolutionSummary {
    /// Build the summary from the classified dependencies and the final
    /// unresolved set. `is_runnable` is derived here and nowhere else - it is
    /// a pure function of the unresolved fragments.
    pub fn new(
        model: impl Into<String>,
        interval: Interval,
        dependencies: &[Dependency],
        unresolved_fragments: &[String],
    ) -> Self {
        Self {
            model: model.into(),
            interval,
            dependency_count: dependencies.len(),
            dependency_counts: DependencyCounts::tally(dependencies),
            unresolved_count: unresolved_fragments.len(),
            is_runnable: unresolved_fragments.is_empty(),
        }
    }
}

/// Resolution report (report.json v1)
///
/// This is the stable output format.
/// All fields are versioned and backward-compatible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionReport {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub generated_at: String,

    /// Repository root the model was resolved against
    pub repo_root: String,

    /// Absolute path of the resolved model file
    pub model_path: String,

    /// Classified dependencies, sorted by table name
    pub dependencies: Vec<Dependency>,

    /// Final substituted SQL text
    pub rendered_sql: String,

    /// Placeholder spans that survived substitution (sorted, deduplicated)
    pub unresolved_fragments: Vec<String>,

    /// Warnings recorded during resolution
    pub diagnostics: Vec<Diagnostic>,

    /// Summary statistics
    pub summary: ResolutionSummary,
}

impl ResolutionReport {
    /// Assemble a report. The summary (including `is_runnable`) is derived
    /// from the dependency list and the unresolved set.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        repo_root: impl Into<String>,
        model_path: impl Into<String>,
        model_name: impl Into<String>,
        interval: Interval,
        dependencies: Vec<Dependency>,
        rendered_sql: String,
        unresolved_fragments: Vec<String>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        let summary =
            ResolutionSummary::new(model_name, interval, &dependencies, &unresolved_fragments);

        Self {
            version: ReportVersion::CURRENT,
            generated_at: chrono::Utc::now().to_rfc3339(),
            repo_root: repo_root.into(),
            model_path: model_path.into(),
            dependencies,
            rendered_sql,
            unresolved_fragments,
            diagnostics,
            summary,
        }
    }

    /// Whether the rendered SQL can be executed as-is
    pub fn is_runnable(&self) -> bool {
        self.summary.is_runnable
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}
