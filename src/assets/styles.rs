// src/assets/styles.rs

//! Styles pipeline: preprocess, parse (fatal on error), prefix, minify,
//! `.min` rename, source map.
//!
//! The CSS-level work is done by `lightningcss` in a single pass: parsing
//! doubles as the fatal lint, and printing against a fixed browser-support
//! target performs vendor prefixing, property normalization and
//! minification together.

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use tracing::{debug, info};

use crate::config::{ResolvedPaths, StylePreprocessor};
use crate::errors::{PipelineError, PipelineResult};

use super::batch;
use super::{PipelineReport, scss, sourcemap};

/// Run the styles pipeline over the configured source glob.
pub fn run(paths: &ResolvedPaths, syntax: StylePreprocessor) -> PipelineResult<PipelineReport> {
    let files = batch::load_text_batch(&paths.styles.src)?;
    let mut report = PipelineReport::default();

    for file in &files {
        debug!(path = ?file.path, "styles: processing");

        let css = scss::compile(&file.contents, syntax).map_err(|message| {
            PipelineError::Compile {
                file: file.path.clone(),
                message,
            }
        })?;

        // Parse errors are the stylesheet lint and they are fatal.
        let optimized = optimize(&css).map_err(|message| PipelineError::Lint {
            file: file.path.clone(),
            message,
        })?;

        let base_name = css_name(file.file_name());
        let out_name = batch::min_name(&base_name);
        let map_link = sourcemap::write_css_map(
            &paths.styles.dest,
            &out_name,
            &file.path,
            &file.contents,
        )?;
        let out = batch::write_text(
            &paths.styles.dest,
            &out_name,
            &format!("{optimized}{map_link}"),
        )?;
        report.written.push(out);
    }

    info!(files = report.written.len(), "styles pipeline finished");
    Ok(report)
}

/// Parse, prefix and minify plain CSS for the fixed browser-support
/// target.
pub fn optimize(css: &str) -> Result<String, String> {
    let mut sheet =
        StyleSheet::parse(css, ParserOptions::default()).map_err(|e| e.to_string())?;

    sheet
        .minify(MinifyOptions {
            targets: Targets::from(browser_support()),
            ..Default::default()
        })
        .map_err(|e| e.to_string())?;

    let result = sheet
        .to_css(PrinterOptions {
            minify: true,
            targets: Targets::from(browser_support()),
            ..Default::default()
        })
        .map_err(|e| e.to_string())?;

    Ok(result.code)
}

/// The browser-support floor prefixes are generated for, roughly "the
/// last ten releases" of the majors at the time the set was fixed.
fn browser_support() -> Browsers {
    Browsers {
        chrome: Some(version(90)),
        edge: Some(version(90)),
        firefox: Some(version(88)),
        opera: Some(version(76)),
        safari: Some(version(13)),
        ios_saf: Some(version(13)),
        samsung: Some(version(14)),
        ..Browsers::default()
    }
}

/// Browser versions are packed as `major << 16 | minor << 8 | patch`.
fn version(major: u32) -> u32 {
    major << 16
}

/// Swap the preprocessor extension for `.css`.
fn css_name(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, _)) => format!("{stem}.css"),
        None => format!("{file_name}.css"),
    }
}
