// src/assets/deploy.rs

//! Deploy task: rsync the build directory to the configured remote.
//!
//! The transfer itself is delegated to the system `rsync`, authenticated
//! by the invoking user's existing remote-login setup. No retry: a failed
//! transfer surfaces as an error.

use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::ConfigFile;
use crate::errors::{PipelineError, PipelineResult};

/// Build the rsync argument vector for a configuration.
///
/// `--include` options come before `--exclude` options so configured
/// includes win over the exclude list.
pub fn rsync_args(cfg: &ConfigFile) -> Vec<String> {
    let mut args = vec![
        "--archive".to_string(),
        "--recursive".to_string(),
        "--compress".to_string(),
    ];

    for pat in &cfg.deploy.include {
        args.push(format!("--include={pat}"));
    }
    for pat in &cfg.deploy.exclude {
        args.push(format!("--exclude={pat}"));
    }

    args.push(format!("{}/", cfg.project.build_dir.trim_end_matches('/')));
    args.push(format!("{}:{}", cfg.deploy.hostname, cfg.deploy.destination));

    args
}

/// Run the deploy. Refuses to run without a configured target.
pub async fn run(cfg: &ConfigFile) -> PipelineResult<()> {
    if cfg.deploy.hostname.is_empty() || cfg.deploy.destination.is_empty() {
        return Err(PipelineError::DeployNotConfigured);
    }

    let args = rsync_args(cfg);
    info!(target = %cfg.deploy.hostname, "deploy: starting rsync");
    debug!(?args, "deploy: rsync arguments");

    let mut child = Command::new("rsync")
        .args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .context("spawning rsync")
        .map_err(PipelineError::Other)?;

    // Drain both pipes so rsync never blocks on a full buffer.
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!("rsync: {line}");
            }
        });
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!("rsync stderr: {line}");
            }
        });
    }

    let status = child
        .wait()
        .await
        .context("waiting for rsync")
        .map_err(PipelineError::Other)?;

    if !status.success() {
        return Err(PipelineError::Deploy {
            code: status.code().unwrap_or(-1),
        });
    }

    info!("deploy finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(toml_src: &str) -> ConfigFile {
        toml::from_str(toml_src).unwrap()
    }

    #[test]
    fn args_carry_flags_excludes_and_target() {
        let cfg = cfg(
            r#"
            [deploy]
            hostname = "login@yousite.com"
            destination = "yousite/public_html/"
            "#,
        );
        let args = rsync_args(&cfg);
        assert!(args.contains(&"--archive".to_string()));
        assert!(args.contains(&"--compress".to_string()));
        assert!(args.contains(&"--exclude=**/Thumbs.db".to_string()));
        assert_eq!(args.last().unwrap(), "login@yousite.com:yousite/public_html/");
        assert_eq!(&args[args.len() - 2], "build/");
    }

    #[test]
    fn includes_precede_excludes() {
        let cfg = cfg(
            r#"
            [deploy]
            hostname = "me@host"
            destination = "www/"
            include = ["special.file"]
            "#,
        );
        let args = rsync_args(&cfg);
        let inc = args.iter().position(|a| a.starts_with("--include")).unwrap();
        let exc = args.iter().position(|a| a.starts_with("--exclude")).unwrap();
        assert!(inc < exc);
    }

    #[tokio::test]
    async fn unconfigured_deploy_is_refused() {
        let err = run(&ConfigFile::default()).await.unwrap_err();
        assert!(matches!(err, PipelineError::DeployNotConfigured));
    }
}
