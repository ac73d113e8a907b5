//! Frontmatter splitting and parsing
//!
//! A model may begin with a `---` delimited header carrying a dependency
//! list and an interval descriptor:
//!
//! ```text
//! ---
//! dependencies:
//!   - "{{external}}.canonical_block"
//!   - "{{transformation}}.int_head"
//! interval:
//!   type: slot
//!   max: 1000
//! ---
//! SELECT ...
//! ```
//!
//! Parsing is total: malformed header content degrades to defaults, and a
//! missing or unterminated block means "no frontmatter".

use modelforge_core::{DepKind, DependencyObservation, Interval, IntervalType, ObservationSource};

/// Split raw model content into (frontmatter, body).
///
/// The open marker must be the very first line; without it (or without a
/// matching close marker) the frontmatter is empty and the body is the
/// entire content.
pub fn split_frontmatter(content: &str) -> (&str, &str) {
    let Some(rest) = content.strip_prefix("---\n") else {
        return ("", content);
    };

    match rest.find("\n---\n") {
        Some(idx) => (&rest[..idx], &rest[idx + "\n---\n".len()..]),
        None => ("", content),
    }
}

/// Parsed frontmatter header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontmatter {
    /// Dependencies declared in the header, in appearance order
    pub dependencies: Vec<DependencyObservation>,

    /// Interval descriptor, defaulted field-wise when absent or malformed
    pub interval: Interval,
}

/// Indentation-sensitive scan state. A label line enters the matching block;
/// the first non-empty line at column zero leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockState {
    Outside,
    InDependencies,
    InInterval,
}

impl Frontmatter {
    /// Parse a frontmatter region in a single pass
    pub fn parse(frontmatter: &str) -> Self {
        let mut dependencies = Vec::new();
        let mut interval = Interval::default();
        let mut state = BlockState::Outside;

        for line in frontmatter.lines() {
            if is_block_label(line, "dependencies") {
                state = BlockState::InDependencies;
                continue;
            }
            if is_block_label(line, "interval") {
                state = BlockState::InInterval;
                continue;
            }
            if !line.is_empty() && !line.starts_with([' ', '\t']) {
                state = BlockState::Outside;
                continue;
            }

            match state {
                BlockState::Outside => {}
                BlockState::InDependencies => {
                    if let Some(observation) = parse_dependency_entry(line) {
                        dependencies.push(observation);
                    }
                }
                BlockState::InInterval => apply_interval_entry(line, &mut interval),
            }
        }

        Self {
            dependencies,
            interval,
        }
    }
}

/// A block label is the label word followed only by a colon and whitespace
fn is_block_label(line: &str, label: &str) -> bool {
    let Some(rest) = line.trim().strip_prefix(label) else {
        return false;
    };
    match rest.trim_start().strip_prefix(':') {
        Some(tail) => tail.trim().is_empty(),
        None => false,
    }
}

/// Parse a `- "{{kind}}.table"` list entry; quotes on either side are
/// independently optional. Non-matching lines are ignored by the caller.
fn parse_dependency_entry(line: &str) -> Option<DependencyObservation> {
    let entry = line.trim().strip_prefix('-')?.trim();
    let entry = entry.strip_prefix(['"', '\'']).unwrap_or(entry);
    let entry = entry.strip_suffix(['"', '\'']).unwrap_or(entry);

    let rest = entry.strip_prefix("{{")?;
    let (kind_token, rest) = rest.split_once("}}")?;
    let kind = DepKind::from_token(kind_token)?;

    let table = rest.strip_prefix('.')?;
    if table.is_empty() || !table.chars().all(is_ident_char) {
        return None;
    }

    Some(DependencyObservation::new(
        table,
        kind,
        ObservationSource::Frontmatter,
    ))
}

/// Apply a `type:`/`max:` entry to the interval; anything else is ignored
/// and malformed values keep the default.
fn apply_interval_entry(line: &str, interval: &mut Interval) {
    let Some((key, value)) = line.split_once(':') else {
        return;
    };
    let value = value.trim();

    match key.trim() {
        "type" => {
            if let Some(interval_type) = IntervalType::from_token(value) {
                interval.interval_type = interval_type;
            }
        }
        "max" => {
            if let Ok(max) = value.parse::<u64>() {
                if max > 0 {
                    interval.max = max;
                }
            }
        }
        _ => {}
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_without_marker_has_no_frontmatter() {
        let (fm, body) = split_frontmatter("SELECT 1");
        assert_eq!(fm, "");
        assert_eq!(body, "SELECT 1");
    }

    #[test]
    fn unterminated_marker_degrades_to_no_frontmatter() {
        let content = "---\ndependencies:\nSELECT 1";
        let (fm, body) = split_frontmatter(content);
        assert_eq!(fm, "");
        assert_eq!(body, content);
    }

    #[test]
    fn marker_pair_splits_header_and_body() {
        let (fm, body) = split_frontmatter("---\ninterval:\n  type: slot\n---\nSELECT 1\n");
        assert_eq!(fm, "interval:\n  type: slot");
        assert_eq!(body, "SELECT 1\n");
    }

    #[test]
    fn empty_frontmatter_yields_defaults() {
        let parsed = Frontmatter::parse("");
        assert!(parsed.dependencies.is_empty());
        assert_eq!(parsed.interval, Interval::default());
    }

    #[test]
    fn dependency_entries_parse_with_quote_variants() {
        let fm = concat!(
            "dependencies:\n",
            "  - \"{{external}}.canonical_block\"\n",
            "  - '{{transformation}}.int_head'\n",
            "  - {{external}}.raw_events\n",
        );

        let parsed = Frontmatter::parse(fm);
        let tables: Vec<&str> = parsed
            .dependencies
            .iter()
            .map(|d| d.table.as_str())
            .collect();
        assert_eq!(tables, vec!["canonical_block", "int_head", "raw_events"]);
        assert_eq!(parsed.dependencies[0].kind, DepKind::External);
        assert_eq!(parsed.dependencies[1].kind, DepKind::Transformation);
        assert!(parsed
            .dependencies
            .iter()
            .all(|d| d.source == ObservationSource::Frontmatter));
    }

    #[test]
    fn non_matching_lines_inside_block_are_ignored() {
        let fm = concat!(
            "dependencies:\n",
            "  # a comment\n",
            "  - not_a_dependency\n",
            "  - \"{{external}}.blocks\"\n",
        );

        let parsed = Frontmatter::parse(fm);
        assert_eq!(parsed.dependencies.len(), 1);
        assert_eq!(parsed.dependencies[0].table, "blocks");
    }

    #[test]
    fn unindented_line_ends_the_block() {
        let fm = concat!(
            "dependencies:\n",
            "  - \"{{external}}.blocks\"\n",
            "other:\n",
            "  - \"{{external}}.ignored\"\n",
        );

        let parsed = Frontmatter::parse(fm);
        assert_eq!(parsed.dependencies.len(), 1);
    }

    #[test]
    fn interval_block_parses_type_and_max() {
        let fm = "interval:\n  type: epoch\n  max: 256\n";

        let parsed = Frontmatter::parse(fm);
        assert_eq!(parsed.interval.interval_type, IntervalType::Epoch);
        assert_eq!(parsed.interval.max, 256);
    }

    #[test]
    fn malformed_interval_degrades_field_wise() {
        let fm = "interval:\n  type: fortnight\n  max: lots\n";

        let parsed = Frontmatter::parse(fm);
        assert_eq!(parsed.interval, Interval::default());
    }

    #[test]
    fn zero_max_is_malformed() {
        let parsed = Frontmatter::parse("interval:\n  max: 0\n");
        assert_eq!(parsed.interval.max, Interval::default().max);
    }

    #[test]
    fn label_spacing_variants_are_recognized() {
        let parsed = Frontmatter::parse("dependencies :\n  - \"{{external}}.blocks\"\n");
        assert_eq!(parsed.dependencies.len(), 1);
    }

    #[test]
    fn both_blocks_parse_in_one_pass() {
        let fm = concat!(
            "description: hourly rollup\n",
            "dependencies:\n",
            "  - \"{{transformation}}.int_head\"\n",
            "interval:\n",
            "  type: block\n",
            "  max: 1000\n",
        );

        let parsed = Frontmatter::parse(fm);
        assert_eq!(parsed.dependencies.len(), 1);
        assert_eq!(parsed.interval.interval_type, IntervalType::Block);
        assert_eq!(parsed.interval.max, 1000);
    }
}
