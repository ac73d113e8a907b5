//! Modelforge Resolve
//!
//! The resolution engine: placeholder tokenizing, dependency classification,
//! template substitution, read-only stripping, and report assembly, wired
//! into one linear pipeline. Purely synchronous; every stage is a total,
//! side-effect-free transformation of in-memory text, and the only fatal
//! errors come from locating and reading the model file.

pub mod assemble;
pub mod classify;
pub mod render;
pub mod template;

pub use assemble::{build_report, collect_unresolved, strip_insert_prefix};
pub use classify::{classify, extract_body_observations, infer_kind, Classification};
pub use render::{render_external_ref, substitute, RenderSettings, ScalarBindings};
pub use template::{scan, Placeholder, PlaceholderMatch, ScalarVar};

use std::path::{Path, PathBuf};

use modelforge_core::{DepKind, ResolutionReport};
use modelforge_model::{find_repo_root, locate_model, Frontmatter, LocateError, Model};

/// Caller-supplied knobs for one resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Database for external dependencies
    pub external_database: String,

    /// Database for transformation dependencies
    pub transformation_database: String,

    /// Reference template for external tables
    pub external_template: String,

    /// Network name bound to the network scalar
    pub network: String,

    /// Window start, epoch seconds
    pub window_start: i64,

    /// Window end, epoch seconds
    pub window_end: i64,

    /// Task start timestamp, epoch seconds
    pub task_start: i64,

    /// Keep a leading INSERT INTO instead of stripping to read-only
    pub keep_insert: bool,
}

impl ResolveOptions {
    fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            external_database: self.external_database.clone(),
            transformation_database: self.transformation_database.clone(),
            external_template: self.external_template.clone(),
            scalars: ScalarBindings {
                network: self.network.clone(),
                window_start: self.window_start,
                window_end: self.window_end,
                task_start: self.task_start,
            },
        }
    }
}

/// A model to resolve, by name or path, under a repository root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    /// Model name or path
    pub model: String,

    /// Directory to start repo-root discovery from
    pub repo_root: PathBuf,

    /// Resolution knobs
    pub options: ResolveOptions,
}

/// Resolve a model from disk: locate, load, and run the in-memory pipeline
/// with filesystem kind inference. The only error cases are locating and
/// reading the model file.
pub fn resolve_model(request: &ResolveRequest) -> Result<ResolutionReport, LocateError> {
    let repo_root = find_repo_root(&request.repo_root)?;
    let model_path = locate_model(&repo_root, &request.model)?;
    let model = Model::load(&model_path)?;

    Ok(resolve_content(&repo_root, &model, &request.options, |table| {
        infer_kind(&repo_root, table)
    }))
}

/// The in-memory pipeline: parse frontmatter, extract and classify
/// dependency observations, substitute placeholders, and assemble the
/// report. Inference is injected so the policy is testable without a
/// filesystem.
pub fn resolve_content<F>(
    repo_root: &Path,
    model: &Model,
    options: &ResolveOptions,
    infer: F,
) -> ResolutionReport
where
    F: Fn(&str) -> DepKind,
{
    let frontmatter = Frontmatter::parse(&model.frontmatter);

    let mut observations = frontmatter.dependencies.clone();
    observations.extend(extract_body_observations(&model.body));

    let classification = classify(&observations, infer);
    let kinds = classification.kinds();

    let substituted = render::substitute(&model.body, &kinds, &options.render_settings());

    build_report(
        repo_root,
        model,
        frontmatter.interval,
        classification,
        &substituted,
        options.keep_insert,
    )
}
