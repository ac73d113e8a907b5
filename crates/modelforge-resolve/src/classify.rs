//! Dependency extraction and classification
//!
//! Observations arrive from two declaration sources (frontmatter list, body
//! accessors) and are merged by a pure left-fold with an explicit conflict
//! policy: two known kinds that disagree collapse to `unknown` rather than
//! letting first-seen order win, and a stored `unknown` yields to any later
//! known declaration. Filesystem inference runs once per table afterwards
//! and never overrides an explicit declaration - a disagreement is flagged
//! in provenance instead.

use std::collections::BTreeMap;
use std::path::Path;

use modelforge_core::{
    DepKind, Dependency, DependencyObservation, Diagnostic, DiagnosticCode, ObservationSource,
    Severity,
};

use crate::template::{scan, Placeholder};

/// Collect one observation per dependency accessor in the body, in
/// appearance order. Classification policy is applied later; this is a raw
/// observation list.
pub fn extract_body_observations(body: &str) -> Vec<DependencyObservation> {
    scan(body)
        .into_iter()
        .filter_map(|m| match m.placeholder {
            Placeholder::DependencyAccessor {
                kind_hint, table, ..
            } => Some(DependencyObservation::new(
                table,
                kind_hint,
                ObservationSource::DepHelper,
            )),
            _ => None,
        })
        .collect()
}

/// Infer a table's kind from which model directory defines it. Ambiguous
/// (both or neither) is `unknown`.
pub fn infer_kind(repo_root: &Path, table: &str) -> DepKind {
    let external = repo_root
        .join("models")
        .join("external")
        .join(format!("{table}.sql"))
        .is_file();
    let transformation = repo_root
        .join("models")
        .join("transformations")
        .join(format!("{table}.sql"))
        .is_file();

    match (external, transformation) {
        (true, false) => DepKind::External,
        (false, true) => DepKind::Transformation,
        _ => DepKind::Unknown,
    }
}

/// Result of the classification fold
#[derive(Debug, Clone)]
pub struct Classification {
    /// Final dependencies, sorted by table name
    pub dependencies: Vec<Dependency>,

    /// Warnings emitted while merging
    pub diagnostics: Vec<Diagnostic>,
}

impl Classification {
    /// Final kind per table, for the substitution pass
    pub fn kinds(&self) -> BTreeMap<String, DepKind> {
        self.dependencies
            .iter()
            .map(|dep| (dep.table.clone(), dep.kind))
            .collect()
    }
}

struct Entry {
    kind: DepKind,
    provenance: Vec<String>,
}

/// Merge observations into the authoritative dependency map.
///
/// Callers pass frontmatter observations before body observations; within a
/// source, original appearance order is preserved. `infer` is consulted once
/// per table after the fold.
pub fn classify<F>(observations: &[DependencyObservation], infer: F) -> Classification
where
    F: Fn(&str) -> DepKind,
{
    let mut merged: BTreeMap<String, Entry> = BTreeMap::new();
    let mut diagnostics = Vec::new();

    for observation in observations {
        let tag = observation.source.as_str().to_string();

        match merged.get_mut(&observation.table) {
            None => {
                merged.insert(
                    observation.table.clone(),
                    Entry {
                        kind: observation.kind,
                        provenance: vec![tag],
                    },
                );
            }
            Some(entry) => {
                if entry.kind != observation.kind
                    && entry.kind.is_known()
                    && observation.kind.is_known()
                {
                    diagnostics.push(Diagnostic::new(
                        DiagnosticCode::AmbiguousDependencyKind,
                        Severity::Warn,
                        format!(
                            "table '{}' declared as both {} and {}",
                            observation.table, entry.kind, observation.kind
                        ),
                    ));
                    entry.kind = DepKind::Unknown;
                } else if !entry.kind.is_known() && observation.kind.is_known() {
                    entry.kind = observation.kind;
                }
                entry.provenance.push(tag);
            }
        }
    }

    for (table, entry) in merged.iter_mut() {
        let inferred = infer(table);
        if !inferred.is_known() {
            continue;
        }

        if !entry.kind.is_known() {
            entry.kind = inferred;
            entry.provenance.push(format!("inferred:{inferred}"));
        } else if entry.kind != inferred {
            // Explicit declarations win; the disagreement stays visible.
            entry.provenance.push(format!("inferred:{inferred}"));
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::InferenceDisagreement,
                Severity::Warn,
                format!(
                    "table '{table}' declared {} but repo files suggest {inferred}",
                    entry.kind
                ),
            ));
        }
    }

    let dependencies = merged
        .into_iter()
        .map(|(table, entry)| Dependency::new(table, entry.kind, entry.provenance))
        .collect();

    Classification {
        dependencies,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(table: &str, kind: DepKind, source: ObservationSource) -> DependencyObservation {
        DependencyObservation::new(table, kind, source)
    }

    fn no_inference(_table: &str) -> DepKind {
        DepKind::Unknown
    }

    #[test]
    fn body_observations_come_from_accessors_only() {
        let body = concat!(
            "SELECT * FROM {{ index .dep \"{{external}}\" \"blocks\" \"helpers\" \"from\" }}\n",
            "WHERE slot >= {{ .bounds.start }}\n",
        );

        let observations = extract_body_observations(body);
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].table, "blocks");
        assert_eq!(observations[0].kind, DepKind::External);
        assert_eq!(observations[0].source, ObservationSource::DepHelper);
    }

    #[test]
    fn agreeing_sources_keep_the_shared_kind() {
        let result = classify(
            &[
                obs("blocks", DepKind::External, ObservationSource::Frontmatter),
                obs("blocks", DepKind::External, ObservationSource::DepHelper),
            ],
            no_inference,
        );

        assert_eq!(result.dependencies.len(), 1);
        let dep = &result.dependencies[0];
        assert_eq!(dep.kind, DepKind::External);
        assert_eq!(dep.provenance, vec!["frontmatter", "dep_helper"]);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn conflicting_known_kinds_collapse_to_unknown() {
        let result = classify(
            &[
                obs("blocks", DepKind::External, ObservationSource::Frontmatter),
                obs(
                    "blocks",
                    DepKind::Transformation,
                    ObservationSource::DepHelper,
                ),
            ],
            no_inference,
        );

        let dep = &result.dependencies[0];
        assert_eq!(dep.kind, DepKind::Unknown);
        assert_eq!(dep.provenance, vec!["frontmatter", "dep_helper"]);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(
            result.diagnostics[0].code,
            DiagnosticCode::AmbiguousDependencyKind
        );
    }

    #[test]
    fn stored_unknown_yields_to_later_known_observation() {
        let result = classify(
            &[
                obs("blocks", DepKind::External, ObservationSource::Frontmatter),
                obs(
                    "blocks",
                    DepKind::Transformation,
                    ObservationSource::DepHelper,
                ),
                obs(
                    "blocks",
                    DepKind::Transformation,
                    ObservationSource::DepHelper,
                ),
            ],
            no_inference,
        );

        let dep = &result.dependencies[0];
        assert_eq!(dep.kind, DepKind::Transformation);
        assert_eq!(dep.provenance.len(), 3);
    }

    #[test]
    fn inference_fills_in_unknown() {
        let result = classify(
            &[
                obs("blocks", DepKind::External, ObservationSource::Frontmatter),
                obs(
                    "blocks",
                    DepKind::Transformation,
                    ObservationSource::DepHelper,
                ),
            ],
            |_| DepKind::External,
        );

        let dep = &result.dependencies[0];
        assert_eq!(dep.kind, DepKind::External);
        assert_eq!(
            dep.provenance,
            vec!["frontmatter", "dep_helper", "inferred:external"]
        );
    }

    #[test]
    fn inference_never_overrides_a_declared_kind() {
        let result = classify(
            &[obs(
                "blocks",
                DepKind::Transformation,
                ObservationSource::Frontmatter,
            )],
            |_| DepKind::External,
        );

        let dep = &result.dependencies[0];
        assert_eq!(dep.kind, DepKind::Transformation);
        assert_eq!(dep.provenance, vec!["frontmatter", "inferred:external"]);
        assert_eq!(
            result.diagnostics[0].code,
            DiagnosticCode::InferenceDisagreement
        );
    }

    #[test]
    fn agreeing_inference_adds_nothing() {
        let result = classify(
            &[obs(
                "blocks",
                DepKind::External,
                ObservationSource::Frontmatter,
            )],
            |_| DepKind::External,
        );

        assert_eq!(result.dependencies[0].provenance, vec!["frontmatter"]);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn dependencies_are_sorted_by_table() {
        let result = classify(
            &[
                obs("zeta", DepKind::External, ObservationSource::Frontmatter),
                obs("alpha", DepKind::External, ObservationSource::Frontmatter),
            ],
            no_inference,
        );

        let tables: Vec<&str> = result
            .dependencies
            .iter()
            .map(|d| d.table.as_str())
            .collect();
        assert_eq!(tables, vec!["alpha", "zeta"]);
    }

    #[test]
    fn infer_kind_checks_model_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("models/external")).unwrap();
        std::fs::create_dir_all(dir.path().join("models/transformations")).unwrap();
        std::fs::write(dir.path().join("models/external/blocks.sql"), "").unwrap();
        std::fs::write(dir.path().join("models/transformations/int_head.sql"), "").unwrap();
        std::fs::write(dir.path().join("models/external/both.sql"), "").unwrap();
        std::fs::write(dir.path().join("models/transformations/both.sql"), "").unwrap();

        assert_eq!(infer_kind(dir.path(), "blocks"), DepKind::External);
        assert_eq!(infer_kind(dir.path(), "int_head"), DepKind::Transformation);
        assert_eq!(infer_kind(dir.path(), "both"), DepKind::Unknown);
        assert_eq!(infer_kind(dir.path(), "absent"), DepKind::Unknown);
    }
}
