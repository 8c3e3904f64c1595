// src/errors.rs

//! Structured errors for pipeline runs.
//!
//! Application-level wiring uses `anyhow`; the pipelines themselves return
//! `PipelineError` so callers (and tests) can tell a fatal lint apart from
//! a compile failure or plain I/O trouble.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A fatal lint finding (scripts structural errors, style parse
    /// errors). Advisory findings are logged, never returned.
    #[error("lint error in {file}: {message}")]
    Lint { file: PathBuf, message: String },

    /// A preprocessor failed to compile its input.
    #[error("compile error in {file}: {message}")]
    Compile { file: PathBuf, message: String },

    /// A transform step failed after compilation (minify, encode, ...).
    #[error("transform error in {file}: {message}")]
    Transform { file: PathBuf, message: String },

    /// The deploy process exited with a non-zero status.
    #[error("deploy failed with exit code {code}")]
    Deploy { code: i32 },

    #[error("deploy is not configured ([deploy] hostname/destination missing)")]
    DeployNotConfigured,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
