//! Placeholder tokenizer
//!
//! Scans a SQL body for `{{ ... }}` spans and classifies each into a tagged
//! variant before any substitution happens. The dependency accessor carries a
//! literal `{{external}}`/`{{transformation}}` inside itself, so the scanner
//! tracks one level of brace nesting.
//!
//! Grammar of a dependency accessor (whitespace-separated, quoted args):
//!
//! ```text
//! {{ index .dep "{{external}}" "canonical_block" "helpers" "from" }}
//! {{ index .dep "{{transformation}}" "int_head" "database" }}
//! ```
//!
//! Anything that is not an accessor or a known scalar token is
//! `Unrecognized` and survives substitution verbatim.

use modelforge_core::DepKind;

/// Value substituted for the self-database scalar. The true self-reference
/// is assigned by an outer orchestration layer, not by this engine.
pub const SELF_DATABASE_VALUE: &str = "benchmark_db";

/// Value substituted for the self-table scalar
pub const SELF_TABLE_VALUE: &str = "benchmark_table";

/// Closed set of scalar variable tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarVar {
    /// `.env.NETWORK`
    Network,

    /// `.bounds.start`
    WindowStart,

    /// `.bounds.end`
    WindowEnd,

    /// `.task.start`
    TaskStart,

    /// `.self.database`
    SelfDatabase,

    /// `.self.table`
    SelfTable,
}

impl ScalarVar {
    /// Match a trimmed placeholder body against the closed token set
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            ".env.NETWORK" => Some(Self::Network),
            ".bounds.start" => Some(Self::WindowStart),
            ".bounds.end" => Some(Self::WindowEnd),
            ".task.start" => Some(Self::TaskStart),
            ".self.database" => Some(Self::SelfDatabase),
            ".self.table" => Some(Self::SelfTable),
            _ => None,
        }
    }
}

/// A classified placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// `index .dep "{{kind}}" "table" ["key1" ["key2"]]`
    DependencyAccessor {
        /// Kind named literally inside the placeholder
        kind_hint: DepKind,

        /// Referenced table
        table: String,

        /// First access key, if any
        key1: Option<String>,

        /// Second access key, if any
        key2: Option<String>,
    },

    /// One of the closed scalar tokens
    Scalar(ScalarVar),

    /// No recognized grammar; left verbatim
    Unrecognized,
}

/// A placeholder with its original text span, for substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderMatch {
    /// Byte offset of the opening braces
    pub start: usize,

    /// Byte offset one past the closing braces
    pub end: usize,

    /// Classified content
    pub placeholder: Placeholder,
}

impl PlaceholderMatch {
    /// The original span text
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Tokenize every placeholder span in `text`, in appearance order.
///
/// An unterminated `{{` ends the scan; the remainder is left for the caller
/// to copy through verbatim.
pub fn scan(text: &str) -> Vec<PlaceholderMatch> {
    let bytes = text.as_bytes();
    let mut matches = Vec::new();
    let mut i = 0;

    while i + 1 < bytes.len() {
        if &bytes[i..i + 2] != b"{{" {
            i += 1;
            continue;
        }

        match find_span_end(bytes, i) {
            Some(end) => {
                let inner = &text[i + 2..end - 2];
                matches.push(PlaceholderMatch {
                    start: i,
                    end,
                    placeholder: classify(inner),
                });
                i = end;
            }
            None => break,
        }
    }

    matches
}

/// Find the end of the span opened at `open`, tracking brace nesting
fn find_span_end(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut j = open + 2;

    while j + 2 <= bytes.len() {
        if &bytes[j..j + 2] == b"{{" {
            depth += 1;
            j += 2;
        } else if &bytes[j..j + 2] == b"}}" {
            depth -= 1;
            j += 2;
            if depth == 0 {
                return Some(j);
            }
        } else {
            j += 1;
        }
    }

    None
}

fn classify(inner: &str) -> Placeholder {
    let trimmed = inner.trim();

    if let Some(var) = ScalarVar::from_token(trimmed) {
        return Placeholder::Scalar(var);
    }

    parse_accessor(trimmed).unwrap_or(Placeholder::Unrecognized)
}

/// Parse the accessor grammar; any deviation yields `None`
fn parse_accessor(trimmed: &str) -> Option<Placeholder> {
    let mut parts = trimmed.split_whitespace();

    if parts.next()? != "index" {
        return None;
    }
    if parts.next()? != ".dep" {
        return None;
    }

    let kind_hint = match unquote(parts.next()?)? {
        "{{external}}" => DepKind::External,
        "{{transformation}}" => DepKind::Transformation,
        _ => return None,
    };

    let table = unquote(parts.next()?)?;
    if !is_ident(table) {
        return None;
    }

    let key1 = match parts.next() {
        Some(part) => Some(ident_arg(part)?),
        None => None,
    };
    let key2 = match parts.next() {
        Some(part) => Some(ident_arg(part)?),
        None => None,
    };
    if parts.next().is_some() {
        return None;
    }

    Some(Placeholder::DependencyAccessor {
        kind_hint,
        table: table.to_string(),
        key1,
        key2,
    })
}

fn ident_arg(part: &str) -> Option<String> {
    let arg = unquote(part)?;
    if !is_ident(arg) {
        return None;
    }
    Some(arg.to_string())
}

fn unquote(token: &str) -> Option<&str> {
    token.strip_prefix('"')?.strip_suffix('"')
}

fn is_ident(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
