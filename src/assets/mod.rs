// src/assets/mod.rs

//! Asset pipelines.
//!
//! Each pipeline is a fixed, ordered chain of transforms over the files
//! matched by its source globs: load, transform N times, write, and (in
//! watch mode) notify the reload channel. There is no shared mutable
//! state between pipelines; they only meet in the destination tree.
//!
//! - [`scripts`]: lint, transpile, minify, `.min` rename, source map
//! - [`styles`]: preprocess ([`scss`]), parse/lint, prefix+minify, map
//! - [`template`]: compile ([`pug`]), advisory validate, minify
//! - [`images`]: newer-filter, compress
//! - [`clean`]: empty the images destination
//! - [`deploy`]: rsync the build tree to the remote

pub mod batch;
pub mod clean;
pub mod deploy;
pub mod images;
pub mod pug;
pub mod scripts;
pub mod scss;
pub mod sourcemap;
pub mod styles;
pub mod template;

use std::path::PathBuf;

/// Artifacts written by one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub written: Vec<PathBuf>,
}

pub use clean::clean_images;
pub use images::ImagesReport;
