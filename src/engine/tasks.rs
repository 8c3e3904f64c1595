// src/engine/tasks.rs

//! Named task compositions over the pipelines.
//!
//! - `assets`: clean images, then template, styles, scripts, images in
//!   sequence; the first error aborts the series.
//! - the `default` build: all four pipelines concurrently; each failure
//!   is logged on its own and never halts a sibling.

use std::sync::Arc;

use tracing::{error, info};

use crate::assets::{self, clean_images};
use crate::config::{ConfigFile, ResolvedPaths};
use crate::engine::runtime::PipelineKind;
use crate::errors::{PipelineError, PipelineResult};
use crate::server::ReloadHub;

/// Everything a task needs, resolved once at startup and shared by
/// reference from then on.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub config: ConfigFile,
    pub paths: ResolvedPaths,
    pub hub: ReloadHub,
}

impl TaskContext {
    pub fn new(config: ConfigFile, hub: ReloadHub) -> Self {
        let paths = ResolvedPaths::from_config(&config);
        Self { config, paths, hub }
    }
}

/// Run one pipeline to completion on the blocking pool, notifying the
/// reload channel on success.
///
/// Images are the exception: nothing in the catch-all reload set watches
/// them, so an image run completes silently.
pub async fn run_pipeline(ctx: Arc<TaskContext>, kind: PipelineKind) -> PipelineResult<()> {
    let run_ctx = Arc::clone(&ctx);
    let result = tokio::task::spawn_blocking(move || run_pipeline_blocking(&run_ctx, kind))
        .await
        .map_err(|e| PipelineError::Other(anyhow::anyhow!("pipeline task panicked: {e}")))?;

    result?;

    if kind != PipelineKind::Images {
        ctx.hub.notify();
    }
    Ok(())
}

fn run_pipeline_blocking(ctx: &TaskContext, kind: PipelineKind) -> PipelineResult<()> {
    match kind {
        PipelineKind::Scripts => {
            assets::scripts::run(&ctx.paths)?;
        }
        PipelineKind::Styles => {
            assets::styles::run(&ctx.paths, ctx.config.preprocessors.styles)?;
        }
        PipelineKind::Template => {
            assets::template::run(&ctx.paths, ctx.config.preprocessors.template)?;
        }
        PipelineKind::Images => {
            assets::images::run(&ctx.paths)?;
        }
    }
    Ok(())
}

/// The `assets` series: clean, then each pipeline in a fixed order.
pub async fn run_assets(ctx: Arc<TaskContext>) -> PipelineResult<()> {
    clean_images(&ctx.paths)?;

    for kind in [
        PipelineKind::Template,
        PipelineKind::Styles,
        PipelineKind::Scripts,
        PipelineKind::Images,
    ] {
        run_pipeline(Arc::clone(&ctx), kind).await?;
    }

    info!("assets series finished");
    Ok(())
}

/// The parallel build behind `default`: run everything, log failures,
/// report whether all pipelines succeeded.
pub async fn run_build_parallel(ctx: Arc<TaskContext>) -> bool {
    let (scripts, styles, template, images) = tokio::join!(
        run_pipeline(Arc::clone(&ctx), PipelineKind::Scripts),
        run_pipeline(Arc::clone(&ctx), PipelineKind::Styles),
        run_pipeline(Arc::clone(&ctx), PipelineKind::Template),
        run_pipeline(Arc::clone(&ctx), PipelineKind::Images),
    );

    let mut all_ok = true;
    for (kind, result) in [
        (PipelineKind::Scripts, scripts),
        (PipelineKind::Styles, styles),
        (PipelineKind::Template, template),
        (PipelineKind::Images, images),
    ] {
        if let Err(err) = result {
            error!(pipeline = %kind, error = %err, "pipeline failed");
            all_ok = false;
        }
    }
    all_ok
}
