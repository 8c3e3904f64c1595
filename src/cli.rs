// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `assetpipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetpipe",
    version,
    about = "Build, watch and deploy front-end assets.",
    long_about = None
)]
pub struct CliArgs {
    /// Task to run.
    #[arg(value_enum, default_value = "default")]
    pub task: TaskName,

    /// Path to the config file (TOML).
    ///
    /// Default: `Assetpipe.toml` in the current working directory. A
    /// missing file falls back to the built-in project layout.
    #[arg(long, value_name = "PATH", default_value = "Assetpipe.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the resolved paths and task table, but
    /// don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Named entry points, mirroring the task-runner surface.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum TaskName {
    /// Build everything in parallel, then serve and watch.
    Default,
    /// Clean images, then build template, styles, scripts, images in
    /// sequence.
    Assets,
    Template,
    Styles,
    Scripts,
    Images,
    /// Delete the contents of the images destination directory.
    Cleanimg,
    /// Rsync the build directory to the configured remote.
    Deploy,
    /// Serve the build directory with live reload, without building.
    Browsersync,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
