// src/engine/runtime.rs

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::engine::tasks::{TaskContext, run_pipeline};

/// The four build pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineKind {
    Scripts,
    Styles,
    Template,
    Images,
}

impl std::fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineKind::Scripts => "scripts",
            PipelineKind::Styles => "styles",
            PipelineKind::Template => "template",
            PipelineKind::Images => "images",
        };
        f.write_str(name)
    }
}

/// Outcome of one pipeline run in watch mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    Success,
    Failed,
}

/// Events sent into the runtime from the watcher, finished pipeline runs
/// and the Ctrl-C handler.
#[derive(Debug, Clone, Copy)]
pub enum RuntimeEvent {
    PipelineTriggered { kind: PipelineKind },
    PipelineFinished {
        kind: PipelineKind,
        outcome: PipelineOutcome,
    },
    ReloadRequested,
    ShutdownRequested,
}

/// The resident event loop behind the `default` and `browsersync` tasks.
///
/// Every trigger spawns a fresh pipeline run immediately: there is no
/// queueing, no debounce and no mutual exclusion between runs, so rapid
/// successive changes can overlap. A failed run is logged and the loop
/// keeps going; only shutdown stops it.
pub struct Runtime {
    ctx: Arc<TaskContext>,
    events_rx: mpsc::Receiver<RuntimeEvent>,
    events_tx: mpsc::Sender<RuntimeEvent>,
}

impl Runtime {
    pub fn new(
        ctx: Arc<TaskContext>,
        events_rx: mpsc::Receiver<RuntimeEvent>,
        events_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        Self {
            ctx,
            events_rx,
            events_tx,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        info!("assetpipe runtime started");

        while let Some(event) = self.events_rx.recv().await {
            debug!(?event, "runtime received event");

            match event {
                RuntimeEvent::PipelineTriggered { kind } => self.spawn_pipeline(kind),
                RuntimeEvent::PipelineFinished { kind, outcome } => match outcome {
                    PipelineOutcome::Success => {
                        debug!(pipeline = %kind, "pipeline finished");
                    }
                    PipelineOutcome::Failed => {
                        // Already logged with the error; watch mode keeps going.
                        debug!(pipeline = %kind, "pipeline failed");
                    }
                },
                RuntimeEvent::ReloadRequested => {
                    self.ctx.hub.notify();
                }
                RuntimeEvent::ShutdownRequested => {
                    info!("shutdown requested, stopping runtime");
                    break;
                }
            }
        }

        info!("assetpipe runtime exiting");
        Ok(())
    }

    /// Fire-and-forget one pipeline run.
    fn spawn_pipeline(&self, kind: PipelineKind) {
        let ctx = Arc::clone(&self.ctx);
        let events_tx = self.events_tx.clone();

        tokio::spawn(async move {
            info!(pipeline = %kind, "pipeline triggered");

            let outcome = match run_pipeline(ctx, kind).await {
                Ok(()) => PipelineOutcome::Success,
                Err(err) => {
                    error!(pipeline = %kind, error = %err, "pipeline run failed");
                    PipelineOutcome::Failed
                }
            };

            let _ = events_tx
                .send(RuntimeEvent::PipelineFinished { kind, outcome })
                .await;
        });
    }
}
