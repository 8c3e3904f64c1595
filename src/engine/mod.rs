// src/engine/mod.rs

//! Orchestration for watch mode and the named task compositions.
//!
//! - [`runtime`] holds the resident event loop that reacts to watch
//!   triggers, pipeline completions, reload requests and shutdown.
//! - [`tasks`] defines the series/parallel compositions over the
//!   pipelines and the shared task context.

pub mod runtime;
pub mod tasks;

pub use runtime::{PipelineKind, PipelineOutcome, Runtime, RuntimeEvent};
pub use tasks::{TaskContext, run_assets, run_build_parallel, run_pipeline};
