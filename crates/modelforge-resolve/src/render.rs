//! Template substitution
//!
//! Walks the tokenized placeholder spans and resolves each against explicit
//! lookup rules. Spans with no matching rule are copied through verbatim;
//! the assembler reports them afterwards.

use std::collections::BTreeMap;

use modelforge_core::DepKind;
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

use crate::template::{
    scan, Placeholder, PlaceholderMatch, ScalarVar, SELF_DATABASE_VALUE, SELF_TABLE_VALUE,
};

static CLUSTER_CALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bcluster\s*\(").expect("valid cluster pattern"));
static DATABASE_TABLE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bdatabase\.table_name\b").expect("valid reference pattern"));
static DATABASE_TABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bdatabase\.table\b").expect("valid reference pattern"));

/// Scalar values bound by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarBindings {
    /// Network name (`.env.NETWORK`)
    pub network: String,

    /// Window start, epoch seconds (`.bounds.start`)
    pub window_start: i64,

    /// Window end, epoch seconds (`.bounds.end`)
    pub window_end: i64,

    /// Task start timestamp, epoch seconds (`.task.start`)
    pub task_start: i64,
}

/// Everything substitution needs besides the classified kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    /// Database for external dependencies
    pub external_database: String,

    /// Database for transformation dependencies
    pub transformation_database: String,

    /// Caller-supplied reference template for external tables
    pub external_template: String,

    /// Scalar placeholder values
    pub scalars: ScalarBindings,
}

/// Substitute every resolvable placeholder in `body`, leaving unrecognized
/// or unresolvable spans untouched.
pub fn substitute(
    body: &str,
    kinds: &BTreeMap<String, DepKind>,
    settings: &RenderSettings,
) -> String {
    let matches = scan(body);
    let mut out = String::with_capacity(body.len());
    let mut cursor = 0;

    for m in &matches {
        if let Some(replacement) = resolve_match(m, kinds, settings) {
            out.push_str(&body[cursor..m.start]);
            out.push_str(&replacement);
            cursor = m.end;
        }
    }

    out.push_str(&body[cursor..]);
    out
}

fn resolve_match(
    m: &PlaceholderMatch,
    kinds: &BTreeMap<String, DepKind>,
    settings: &RenderSettings,
) -> Option<String> {
    match &m.placeholder {
        Placeholder::Scalar(var) => Some(resolve_scalar(*var, &settings.scalars)),
        Placeholder::DependencyAccessor {
            kind_hint,
            table,
            key1,
            key2,
        } => resolve_accessor(*kind_hint, table, key1.as_deref(), key2.as_deref(), kinds, settings),
        Placeholder::Unrecognized => None,
    }
}

fn resolve_scalar(var: ScalarVar, scalars: &ScalarBindings) -> String {
    match var {
        ScalarVar::Network => scalars.network.clone(),
        ScalarVar::WindowStart => scalars.window_start.to_string(),
        ScalarVar::WindowEnd => scalars.window_end.to_string(),
        ScalarVar::TaskStart => scalars.task_start.to_string(),
        ScalarVar::SelfDatabase => SELF_DATABASE_VALUE.to_string(),
        ScalarVar::SelfTable => SELF_TABLE_VALUE.to_string(),
    }
}

/// Resolve one dependency accessor. The classifier's kind wins when known;
/// otherwise the kind named literally in the placeholder is used, so a
/// conflicted table still renders the way the SQL author wrote it.
fn resolve_accessor(
    kind_hint: DepKind,
    table: &str,
    key1: Option<&str>,
    key2: Option<&str>,
    kinds: &BTreeMap<String, DepKind>,
    settings: &RenderSettings,
) -> Option<String> {
    let stored = kinds.get(table).copied().unwrap_or(kind_hint);
    let kind = if stored.is_known() { stored } else { kind_hint };

    match (key1, key2) {
        // helpers.from => full table reference
        (Some("helpers"), Some("from")) => Some(match kind {
            DepKind::External => render_external_ref(
                &settings.external_template,
                &settings.external_database,
                table,
            ),
            _ => format!("`{}`.`{}`", settings.transformation_database, table),
        }),

        // database => database name only
        (Some("database"), None) => Some(match kind {
            DepKind::External => settings.external_database.clone(),
            _ => settings.transformation_database.clone(),
        }),

        // table => table name only
        (Some("table"), None) => Some(match kind {
            DepKind::External => effective_external_table(&settings.external_template, table),
            _ => table.to_string(),
        }),

        // Unknown accessor: leave the directive for explicit follow-up
        _ => None,
    }
}

/// Expand the caller's external reference template for one table.
///
/// A cluster-style template addresses the distributed table's `_local`
/// shards, so the table name gains a `_local` suffix unless it already
/// carries one.
pub fn render_external_ref(template: &str, database: &str, table: &str) -> String {
    let table = effective_external_table(template, table);

    let rendered = template
        .replace("{database}", database)
        .replace("{db}", database)
        .replace("{table}", &table)
        .replace("{table_name}", &table);

    let qualified = format!("{database}.{table}");
    let rendered = DATABASE_TABLE_NAME_RE.replace_all(&rendered, NoExpand(&qualified));
    DATABASE_TABLE_RE
        .replace_all(&rendered, NoExpand(&qualified))
        .into_owned()
}

/// Table name an external accessor resolves to under the given template
pub fn effective_external_table(template: &str, table: &str) -> String {
    if CLUSTER_CALL_RE.is_match(template) && !table.ends_with("_local") {
        format!("{table}_local")
    } else {
        table.to_string()
    }
}
