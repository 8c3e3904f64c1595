// src/lib.rs

pub mod assets;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod server;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::{CliArgs, TaskName};
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::config::ResolvedPaths;
use crate::engine::{PipelineKind, Runtime, RuntimeEvent, TaskContext};
use crate::server::{spawn_server, ReloadHub};
use crate::watch::build_watch_profiles;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the one-shot pipelines and named compositions
/// - the live-reload server
/// - (for `default`) the file watcher
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let hub = ReloadHub::new();
    let ctx = Arc::new(TaskContext::new(cfg, hub.clone()));

    match args.task {
        TaskName::Scripts => {
            engine::run_pipeline(ctx, PipelineKind::Scripts).await?;
        }
        TaskName::Styles => {
            engine::run_pipeline(ctx, PipelineKind::Styles).await?;
        }
        TaskName::Template => {
            engine::run_pipeline(ctx, PipelineKind::Template).await?;
        }
        TaskName::Images => {
            engine::run_pipeline(ctx, PipelineKind::Images).await?;
        }
        TaskName::Cleanimg => {
            let removed = assets::clean_images(&ctx.paths)?;
            info!(removed, "images destination cleaned");
        }
        TaskName::Assets => {
            engine::run_assets(ctx).await?;
        }
        TaskName::Deploy => {
            assets::deploy::run(&ctx.config).await?;
        }
        TaskName::Browsersync => {
            serve_and_run(ctx, hub, false, &config_path).await?;
        }
        TaskName::Default => {
            let all_ok = engine::run_build_parallel(Arc::clone(&ctx)).await;
            if !all_ok {
                warn!("initial build had failures; watch mode will rebuild on change");
            }
            serve_and_run(ctx, hub, true, &config_path).await?;
        }
    }

    Ok(())
}

/// Start the live-reload server and the resident runtime loop, optionally
/// with the file watcher. Runs until Ctrl-C.
async fn serve_and_run(
    ctx: Arc<TaskContext>,
    hub: ReloadHub,
    with_watcher: bool,
    config_path: &Path,
) -> Result<()> {
    let _server = spawn_server(
        ctx.paths.build_dir.clone(),
        ctx.config.server.port,
        ctx.config.project.online,
        hub,
    )
    .await?;

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let _watcher_handle = if with_watcher {
        let profiles = build_watch_profiles(&ctx.config, &ctx.paths)?;
        let root_dir = config_root_dir(config_path);
        Some(watch::spawn_watcher(root_dir, profiles, rt_tx.clone())?)
    } else {
        None
    };

    // Ctrl-C -> graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let runtime = Runtime::new(ctx, rt_rx, rt_tx);
    runtime.run().await
}

/// Figure out a sensible project root for watching.
/// Currently: directory containing the config file, or `.`.
fn config_root_dir(config_path: &Path) -> PathBuf {
    let dir = config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_default();
    if dir.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        dir
    }
}

/// Simple dry-run output: print resolved paths and the task table.
fn print_dry_run(cfg: &ConfigFile) {
    let paths = ResolvedPaths::from_config(cfg);

    println!("assetpipe dry-run");
    println!("  project.dev_dir = {}", cfg.project.dev_dir);
    println!("  project.build_dir = {}", cfg.project.build_dir);
    println!("  project.online = {}", cfg.project.online);
    println!("  server.port = {}", cfg.server.port);
    println!();

    println!("pipelines:");
    for (name, asset) in [
        ("scripts", &paths.scripts),
        ("styles", &paths.styles),
        ("template", &paths.template),
        ("images", &paths.images),
    ] {
        println!("  - {name}");
        println!("      src: {:?}", asset.src);
        println!("      dest: {}", asset.dest.display());
    }
    println!();

    println!("watch:");
    println!("      files: {:?}", cfg.watch.files);
    println!("      images: {:?}", cfg.watch.images);
    println!();

    if cfg.deploy.hostname.is_empty() {
        println!("deploy: not configured");
    } else {
        println!("deploy:");
        println!("      hostname: {}", cfg.deploy.hostname);
        println!("      destination: {}", cfg.deploy.destination);
        if !cfg.deploy.include.is_empty() {
            println!("      include: {:?}", cfg.deploy.include);
        }
        if !cfg.deploy.exclude.is_empty() {
            println!("      exclude: {:?}", cfg.deploy.exclude);
        }
    }

    debug!("dry-run complete (no execution)");
}
