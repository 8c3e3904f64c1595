// src/config/mod.rs

//! Configuration loading and validation for assetpipe.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, falling back to built-in defaults
//!   (`loader.rs`).
//! - Validate basic invariants like distinct dev/build dirs (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{
    AssetPaths, ConfigFile, DeploySection, ResolvedPaths, ServerSection, StylePreprocessor,
    TemplatePreprocessor, WatchSection,
};
pub use validate::validate_config;
