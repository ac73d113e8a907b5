//! Modelforge Core
//!
//! Stable domain types shared across the workspace: dependency kinds and
//! provenance, interval descriptors, diagnostics, the resolution report, and
//! TOML configuration. The report schema is versioned - collaborators consume
//! it as their sole contract, so never rename its fields or diagnostic codes.

pub mod config;
pub mod dependency;
pub mod diagnostic;
pub mod interval;
pub mod report;

pub use config::{Config, ConfigError, DatabaseConfig};
pub use dependency::{DepKind, Dependency, DependencyObservation, ObservationSource};
pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use interval::{Interval, IntervalType};
pub use report::{DependencyCounts, ReportVersion, ResolutionReport, ResolutionSummary};
