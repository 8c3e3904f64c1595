// src/watch/patterns.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::{ConfigFile, ResolvedPaths};
use crate::engine::PipelineKind;

/// What a matched filesystem change should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchTarget {
    /// Re-run the given pipeline.
    Pipeline(PipelineKind),
    /// Push a bare reload notification without rebuilding anything.
    Reload,
}

/// Compiled watch/exclude glob patterns for one target.
///
/// The patterns are evaluated against paths relative to the project root,
/// with forward slashes.
#[derive(Clone)]
pub struct WatchProfile {
    target: WatchTarget,
    watch_set: GlobSet,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for WatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchProfile")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl WatchProfile {
    pub fn target(&self) -> WatchTarget {
        self.target
    }

    /// Returns true if this target is interested in the given path
    /// (relative to project root), e.g. `"dev/assets/scss/style.scss"`.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.watch_set.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

/// Build the fixed watch registrations:
///
/// - template sources -> template pipeline
/// - style sources -> styles pipeline
/// - dev images with the configured image extensions -> images pipeline
/// - dev scripts (minus emitted `.min.js`) -> scripts pipeline
/// - build-tree files with the catch-all extensions -> bare reload
pub fn build_watch_profiles(
    cfg: &ConfigFile,
    paths: &ResolvedPaths,
) -> Result<Vec<WatchProfile>> {
    let dev = paths.dev_dir.display();
    let build = paths.build_dir.display();
    let css_ext = cfg.preprocessors.styles.extension();
    let html_ext = cfg.preprocessors.template.extension();

    let mut profiles = Vec::new();

    profiles.push(profile(
        WatchTarget::Pipeline(PipelineKind::Template),
        &[format!("{dev}/assets/{html_ext}/**/*")],
        &[],
    )?);

    profiles.push(profile(
        WatchTarget::Pipeline(PipelineKind::Styles),
        &[format!("{dev}/assets/{css_ext}/**/*")],
        &[],
    )?);

    let image_patterns: Vec<String> = cfg
        .watch
        .images
        .iter()
        .map(|ext| format!("{dev}/assets/images/**/*.{ext}"))
        .collect();
    profiles.push(profile(
        WatchTarget::Pipeline(PipelineKind::Images),
        &image_patterns,
        &[],
    )?);

    profiles.push(profile(
        WatchTarget::Pipeline(PipelineKind::Scripts),
        &[format!("{dev}/assets/js/**/*.js")],
        &[format!("{}/**/*.min.js", paths.scripts.dest.display())],
    )?);

    let reload_patterns: Vec<String> = cfg
        .watch
        .files
        .iter()
        .map(|ext| format!("{build}/**/*.{ext}"))
        .collect();
    profiles.push(profile(WatchTarget::Reload, &reload_patterns, &[])?);

    Ok(profiles)
}

fn profile(
    target: WatchTarget,
    watch: &[String],
    exclude: &[String],
) -> Result<WatchProfile> {
    let watch_set = build_globset(watch)
        .with_context(|| format!("building watch globset for {target:?}"))?;
    let exclude_set = if exclude.is_empty() {
        None
    } else {
        Some(
            build_globset(exclude)
                .with_context(|| format!("building exclude globset for {target:?}"))?,
        )
    };

    Ok(WatchProfile {
        target,
        watch_set,
        exclude_set,
    })
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profiles() -> Vec<WatchProfile> {
        let cfg = ConfigFile::default();
        let paths = ResolvedPaths::from_config(&cfg);
        build_watch_profiles(&cfg, &paths).unwrap()
    }

    fn target_for(path: &str) -> Vec<WatchTarget> {
        profiles()
            .iter()
            .filter(|p| p.matches(path))
            .map(|p| p.target())
            .collect()
    }

    #[test]
    fn style_changes_hit_the_styles_pipeline() {
        assert_eq!(
            target_for("dev/assets/scss/style.scss"),
            vec![WatchTarget::Pipeline(PipelineKind::Styles)]
        );
    }

    #[test]
    fn emitted_min_js_does_not_retrigger_scripts() {
        assert_eq!(
            target_for("dev/assets/js/app.js"),
            vec![WatchTarget::Pipeline(PipelineKind::Scripts)]
        );
        assert!(target_for("build/js/app.min.js").is_empty());
    }

    #[test]
    fn only_configured_image_extensions_match() {
        assert_eq!(
            target_for("dev/assets/images/icons/x.png"),
            vec![WatchTarget::Pipeline(PipelineKind::Images)]
        );
        assert!(target_for("dev/assets/images/notes.txt").is_empty());
    }

    #[test]
    fn build_tree_catch_all_requests_reload() {
        assert_eq!(target_for("build/data/site.json"), vec![WatchTarget::Reload]);
        assert!(target_for("build/css/style.min.css").is_empty());
    }
}
