// src/assets/images.rs

//! Images pipeline: newer-filter, compress, write.
//!
//! A source image is skipped when its destination counterpart exists with
//! an mtime at least as fresh; running the pipeline twice in a row does no
//! work the second time. PNG and JPEG are re-encoded through the `image`
//! crate; formats the encoder does not cover (svg, webp, ...) are copied
//! byte for byte.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use image::codecs::jpeg::JpegEncoder;
use tracing::{debug, info};

use crate::config::ResolvedPaths;
use crate::errors::{PipelineError, PipelineResult};

use super::batch;

/// Fixed JPEG re-encode quality.
const JPEG_QUALITY: u8 = 80;

/// What the run actually did, so callers can observe the newer-filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImagesReport {
    pub written: usize,
    pub skipped: usize,
}

/// Run the images pipeline over the configured glob.
pub fn run(paths: &ResolvedPaths) -> PipelineResult<ImagesReport> {
    let sources = batch::expand_globs(&paths.images.src)?;
    let src_root = paths.dev_dir.join("assets").join("images");
    let mut report = ImagesReport::default();

    for source in &sources {
        let dest = dest_path(source, &src_root, &paths.images.dest);

        if !is_newer(source, &dest)? {
            debug!(path = ?source, "images: up to date, skipping");
            report.skipped += 1;
            continue;
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating image dest dir {:?}", parent))
                .map_err(PipelineError::Other)?;
        }

        compress(source, &dest)?;
        debug!(from = ?source, to = ?dest, "images: wrote");
        report.written += 1;
    }

    info!(
        written = report.written,
        skipped = report.skipped,
        "images pipeline finished"
    );
    Ok(report)
}

/// Destination path for a source image, preserving the subtree below the
/// conventional images root when the source lives under it.
fn dest_path(source: &Path, src_root: &Path, dest_root: &Path) -> PathBuf {
    match source.strip_prefix(src_root) {
        Ok(rel) => dest_root.join(rel),
        Err(_) => dest_root.join(source.file_name().unwrap_or_default()),
    }
}

/// True when `source` must be (re)processed: no destination yet, or the
/// source mtime is strictly newer.
fn is_newer(source: &Path, dest: &Path) -> PipelineResult<bool> {
    let src_mtime = fs::metadata(source)
        .and_then(|m| m.modified())
        .with_context(|| format!("reading mtime of {:?}", source))
        .map_err(PipelineError::Other)?;

    match fs::metadata(dest).and_then(|m| m.modified()) {
        Ok(dest_mtime) => Ok(src_mtime > dest_mtime),
        Err(_) => Ok(true),
    }
}

/// Re-encode where the codec allows it, copy through otherwise.
fn compress(source: &Path, dest: &Path) -> PipelineResult<()> {
    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let transform_err = |message: String| PipelineError::Transform {
        file: source.to_path_buf(),
        message,
    };

    match ext.as_str() {
        "jpg" | "jpeg" => {
            let img = image::open(source).map_err(|e| transform_err(e.to_string()))?;
            // JPEG has no alpha channel.
            let rgb = img.to_rgb8();
            let mut out = fs::File::create(dest)?;
            let mut encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
            encoder
                .encode_image(&rgb)
                .map_err(|e| transform_err(e.to_string()))?;
        }
        "png" => {
            let img = image::open(source).map_err(|e| transform_err(e.to_string()))?;
            img.save(dest).map_err(|e| transform_err(e.to_string()))?;
        }
        _ => {
            fs::copy(source, dest)?;
        }
    }

    Ok(())
}
