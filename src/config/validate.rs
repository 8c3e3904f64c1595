// src/config/validate.rs

use anyhow::{Context, Result, anyhow};
use globset::Glob;

use crate::config::model::ConfigFile;

/// Run semantic validation against a loaded configuration.
///
/// This checks:
/// - `dev_dir` and `build_dir` are non-empty and distinct
/// - the watched extension lists are non-empty
/// - deploy include/exclude patterns compile as globs
/// - a partially configured deploy target (hostname without destination,
///   or vice versa)
/// - `server.port` is non-zero
///
/// Whether the source directory actually exists is deliberately not
/// checked here; a pipeline run on an empty batch is a no-op, matching
/// the original behaviour.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_dirs(cfg)?;
    validate_watch(cfg)?;
    validate_deploy(cfg)?;
    validate_server(cfg)?;
    Ok(())
}

fn validate_dirs(cfg: &ConfigFile) -> Result<()> {
    if cfg.project.dev_dir.trim().is_empty() {
        return Err(anyhow!("[project].dev_dir must not be empty"));
    }
    if cfg.project.build_dir.trim().is_empty() {
        return Err(anyhow!("[project].build_dir must not be empty"));
    }
    if cfg.project.dev_dir == cfg.project.build_dir {
        return Err(anyhow!(
            "[project].dev_dir and [project].build_dir must differ (both are '{}')",
            cfg.project.dev_dir
        ));
    }
    Ok(())
}

fn validate_watch(cfg: &ConfigFile) -> Result<()> {
    if cfg.watch.files.is_empty() {
        return Err(anyhow!("[watch].files must list at least one extension"));
    }
    if cfg.watch.images.is_empty() {
        return Err(anyhow!("[watch].images must list at least one extension"));
    }
    for ext in cfg.watch.files.iter().chain(cfg.watch.images.iter()) {
        if ext.contains('.') || ext.contains('/') {
            return Err(anyhow!(
                "watched extension '{}' must be a bare extension (no dot or slash)",
                ext
            ));
        }
    }
    Ok(())
}

fn validate_deploy(cfg: &ConfigFile) -> Result<()> {
    let d = &cfg.deploy;

    if d.hostname.is_empty() != d.destination.is_empty() {
        return Err(anyhow!(
            "[deploy] needs both hostname and destination (or neither)"
        ));
    }

    for pat in d.include.iter().chain(d.exclude.iter()) {
        Glob::new(pat).with_context(|| format!("invalid [deploy] pattern: {pat}"))?;
    }

    Ok(())
}

fn validate_server(cfg: &ConfigFile) -> Result<()> {
    if cfg.server.port == 0 {
        return Err(anyhow!("[server].port must be non-zero"));
    }
    Ok(())
}
