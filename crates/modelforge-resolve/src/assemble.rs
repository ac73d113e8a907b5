//! Output assembly
//!
//! Optionally strips the write prefix for read-only rendering, collects the
//! placeholder spans that survived substitution, and assembles the final
//! report. The unresolved scan is how the engine says "I don't know how to
//! fill this in" instead of guessing or failing.

use std::path::Path;

use modelforge_core::{Diagnostic, DiagnosticCode, Interval, ResolutionReport, Severity};
use modelforge_model::Model;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::classify::Classification;
use crate::template::scan;

static INSERT_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*INSERT\s+INTO\b").expect("valid insert pattern"));
static QUERY_KEYWORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:WITH|SELECT)\b").expect("valid keyword pattern"));

/// Strip a leading `INSERT INTO` clause so the query can be inspected
/// without mutating state. Text not starting with an insert, or with no
/// `WITH`/`SELECT` to cut to, is returned untouched.
pub fn strip_insert_prefix(sql: &str) -> &str {
    if !INSERT_PREFIX_RE.is_match(sql) {
        return sql;
    }

    match QUERY_KEYWORD_RE.find(sql) {
        Some(m) => &sql[m.start()..],
        None => sql,
    }
}

/// Collect every placeholder span still present in the final text,
/// deduplicated and sorted lexicographically.
pub fn collect_unresolved(sql: &str) -> Vec<String> {
    let mut fragments: Vec<String> = scan(sql)
        .iter()
        .map(|m| m.text(sql).to_string())
        .collect();
    fragments.sort();
    fragments.dedup();
    fragments
}

/// Strip (unless `keep_insert`), collect unresolved spans, and assemble the
/// resolution report.
pub fn build_report(
    repo_root: &Path,
    model: &Model,
    interval: Interval,
    classification: Classification,
    substituted: &str,
    keep_insert: bool,
) -> ResolutionReport {
    let sql = if keep_insert {
        substituted
    } else {
        strip_insert_prefix(substituted)
    };
    let rendered_sql = sql.trim().to_string();

    let unresolved_fragments = collect_unresolved(&rendered_sql);

    let mut diagnostics = classification.diagnostics;
    diagnostics.extend(unresolved_fragments.iter().map(|fragment| {
        Diagnostic::new(
            DiagnosticCode::UnresolvedFragment,
            Severity::Warn,
            format!("no substitution rule matched {fragment}"),
        )
    }));

    ResolutionReport::new(
        repo_root.display().to_string(),
        model.path.display().to_string(),
        model.file_name(),
        interval,
        classification.dependencies,
        rendered_sql,
        unresolved_fragments,
        diagnostics,
    )
}
