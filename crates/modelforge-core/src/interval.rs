//! Interval descriptor parsed from a model's frontmatter

use serde::{Deserialize, Serialize};

/// Default interval size when the frontmatter omits or malforms `max`
pub const DEFAULT_INTERVAL_MAX: u64 = 50_000;

/// Unit a model is incrementally processed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalType {
    /// Consensus slots
    Slot,

    /// Consensus epochs
    Epoch,

    /// Execution blocks
    Block,
}

impl IntervalType {
    /// Get the type as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slot => "slot",
            Self::Epoch => "epoch",
            Self::Block => "block",
        }
    }

    /// Parse a frontmatter token; anything outside the closed set is
    /// malformed and the caller keeps the default.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "slot" => Some(Self::Slot),
            "epoch" => Some(Self::Epoch),
            "block" => Some(Self::Block),
            _ => None,
        }
    }
}

impl Default for IntervalType {
    fn default() -> Self {
        Self::Slot
    }
}

impl std::fmt::Display for IntervalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Processing interval for a model; one per model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    /// Interval unit
    #[serde(rename = "type")]
    pub interval_type: IntervalType,

    /// Maximum interval size (positive)
    pub max: u64,
}

impl Default for Interval {
    fn default() -> Self {
        Self {
            interval_type: IntervalType::default(),
            max: DEFAULT_INTERVAL_MAX,
        }
    }
}
