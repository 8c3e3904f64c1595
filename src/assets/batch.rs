// src/assets/batch.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tracing::debug;

use crate::errors::{PipelineError, PipelineResult};

/// One matched source file with its text contents.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path as matched by the glob (relative to the working directory).
    pub path: PathBuf,
    pub contents: String,
}

impl SourceFile {
    /// File name component, e.g. `app.js`.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// Expand a list of glob patterns into a sorted, de-duplicated list of
/// matching files.
///
/// A pattern that matches nothing contributes nothing; an empty result is
/// not an error (a pipeline over an empty batch is a no-op).
pub fn expand_globs(patterns: &[String]) -> PipelineResult<Vec<PathBuf>> {
    let mut out = Vec::new();

    for pattern in patterns {
        let walker = glob::glob(pattern)
            .map_err(|e| PipelineError::Other(anyhow!("invalid glob '{pattern}': {e}")))?;

        for entry in walker {
            let path = entry.map_err(|e| PipelineError::Other(anyhow!(e)))?;
            if path.is_file() {
                out.push(path);
            }
        }
    }

    out.sort();
    out.dedup();
    debug!(files = out.len(), ?patterns, "expanded source globs");
    Ok(out)
}

/// Expand globs and read each match as UTF-8 text.
pub fn load_text_batch(patterns: &[String]) -> PipelineResult<Vec<SourceFile>> {
    let mut batch = Vec::new();

    for path in expand_globs(patterns)? {
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("reading source file {:?}", path))
            .map_err(PipelineError::Other)?;
        batch.push(SourceFile { path, contents });
    }

    Ok(batch)
}

/// Write a text artifact into `dest_dir`, creating the directory as
/// needed. Existing files are overwritten.
pub fn write_text(dest_dir: &Path, file_name: &str, contents: &str) -> PipelineResult<PathBuf> {
    fs::create_dir_all(dest_dir)
        .with_context(|| format!("creating destination dir {:?}", dest_dir))
        .map_err(PipelineError::Other)?;

    let out_path = dest_dir.join(file_name);
    fs::write(&out_path, contents)
        .with_context(|| format!("writing artifact {:?}", out_path))
        .map_err(PipelineError::Other)?;

    debug!(path = ?out_path, "wrote artifact");
    Ok(out_path)
}

/// Insert a `.min` suffix before the final extension:
/// `app.js` -> `app.min.js`, `style.css` -> `style.min.css`.
pub fn min_name(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}.min.{ext}"),
        None => format!("{file_name}.min"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_name_inserts_suffix_before_extension() {
        assert_eq!(min_name("app.js"), "app.min.js");
        assert_eq!(min_name("style.css"), "style.min.css");
        assert_eq!(min_name("noext"), "noext.min");
    }

    #[test]
    fn unmatched_glob_is_empty_not_error() {
        let files =
            expand_globs(&["/nonexistent-assetpipe-test/**/*.js".to_string()]).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn expand_globs_finds_written_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.js");
        let b = dir.path().join("b.txt");
        fs::write(&a, "1").unwrap();
        fs::write(&b, "2").unwrap();

        let pattern = format!("{}/*.js", dir.path().display());
        let files = expand_globs(&[pattern]).unwrap();
        assert_eq!(files, vec![a]);
    }
}
