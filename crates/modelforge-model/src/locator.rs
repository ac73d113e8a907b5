//! Model file location
//!
//! Resolves a model name or path to a concrete file under the repository.
//! These are the only fatal failures in the pipeline - they abort before any
//! parsing begins.

use std::path::{Path, PathBuf};

/// Fatal location errors
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error(
        "could not find repo root containing models/transformations and models/external \
         (searched from {start} upward)"
    )]
    RepoRootNotFound { start: String },

    #[error("model not found for '{model}'; looked under {hint}")]
    ModelNotFound { model: String, hint: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Walk `start` and its ancestors for the first directory holding both
/// `models/transformations/` and `models/external/`.
pub fn find_repo_root(start: &Path) -> Result<PathBuf, LocateError> {
    let start = start
        .canonicalize()
        .unwrap_or_else(|_| start.to_path_buf());

    for candidate in start.ancestors() {
        if candidate.join("models").join("transformations").is_dir()
            && candidate.join("models").join("external").is_dir()
        {
            return Ok(candidate.to_path_buf());
        }
    }

    Err(LocateError::RepoRootNotFound {
        start: start.display().to_string(),
    })
}

/// Resolve a model argument to an existing file.
///
/// Candidate order: an absolute path is tried as-is; otherwise the argument
/// is probed relative to the repo root, then under
/// `models/transformations/`, bare and with a `.sql` suffix. An argument
/// that already ends in `.sql` is additionally probed by file name under
/// `models/transformations/`.
pub fn locate_model(repo_root: &Path, model_arg: &str) -> Result<PathBuf, LocateError> {
    let raw = Path::new(model_arg);
    let transformations = repo_root.join("models").join("transformations");

    let mut candidates: Vec<PathBuf> = Vec::new();

    if raw.is_absolute() {
        candidates.push(raw.to_path_buf());
    } else {
        candidates.push(repo_root.join(raw));
        candidates.push(transformations.join(raw));
        candidates.push(transformations.join(format!("{model_arg}.sql")));
    }

    // Handle name.sql passed without folder.
    if raw.extension().is_some_and(|ext| ext == "sql") {
        if let Some(name) = raw.file_name() {
            candidates.push(transformations.join(name));
        }
    }

    for candidate in candidates {
        if candidate.is_file() {
            return candidate.canonicalize().map_err(|e| LocateError::Io {
                path: candidate.display().to_string(),
                source: e,
            });
        }
    }

    Err(LocateError::ModelNotFound {
        model: model_arg.to_string(),
        hint: transformations.display().to_string(),
    })
}
