// src/assets/clean.rs

//! Clean task: empty the images destination directory.

use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::config::ResolvedPaths;
use crate::errors::{PipelineError, PipelineResult};

/// Delete everything under the images destination directory, keeping the
/// directory itself when present. Idempotent: a missing or already-empty
/// directory is a successful no-op.
///
/// Returns the number of top-level entries removed.
pub fn clean_images(paths: &ResolvedPaths) -> PipelineResult<usize> {
    let removed = clean_dir(&paths.images.dest)?;
    info!(dir = ?paths.images.dest, removed, "cleaned images destination");
    Ok(removed)
}

fn clean_dir(dir: &Path) -> PipelineResult<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    let entries = fs::read_dir(dir)
        .with_context(|| format!("reading directory {:?}", dir))
        .map_err(PipelineError::Other)?;

    for entry in entries {
        let entry = entry.map_err(PipelineError::Io)?;
        let path = entry.path();
        if entry.file_type().map_err(PipelineError::Io)?.is_dir() {
            fs::remove_dir_all(&path)
                .with_context(|| format!("removing directory {:?}", path))
                .map_err(PipelineError::Other)?;
        } else {
            fs::remove_file(&path)
                .with_context(|| format!("removing file {:?}", path))
                .map_err(PipelineError::Other)?;
        }
        removed += 1;
    }

    Ok(removed)
}
