use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use assetpipe::config::ConfigFile;
use assetpipe::engine::{TaskContext, run_assets, run_build_parallel};
use assetpipe::server::ReloadHub;

type TestResult = Result<(), Box<dyn Error>>;

fn context(root: &Path) -> Arc<TaskContext> {
    let mut cfg = ConfigFile::default();
    cfg.project.dev_dir = root.join("dev").display().to_string();
    cfg.project.build_dir = root.join("build").display().to_string();
    Arc::new(TaskContext::new(cfg, ReloadHub::new()))
}

fn write(path: &Path, contents: &str) -> TestResult {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

#[tokio::test]
async fn parallel_build_failure_never_halts_siblings() -> TestResult {
    let dir = tempfile::tempdir()?;
    let ctx = context(dir.path());

    // Broken scripts, valid styles.
    write(
        &dir.path().join("dev/assets/js/app.js"),
        "function f() { return 1;\n",
    )?;
    write(
        &dir.path().join("dev/assets/scss/style.scss"),
        "body { color: red; }\n",
    )?;

    let all_ok = run_build_parallel(Arc::clone(&ctx)).await;
    assert!(!all_ok);

    // Styles still produced their artifact.
    assert!(dir.path().join("build/css/style.min.css").is_file());
    assert!(!dir.path().join("build/js/app.min.js").exists());

    Ok(())
}

#[tokio::test]
async fn parallel_build_succeeds_over_complete_tree() -> TestResult {
    let dir = tempfile::tempdir()?;
    let ctx = context(dir.path());

    write(&dir.path().join("dev/assets/js/app.js"), "const a = 1;\n")?;
    write(
        &dir.path().join("dev/assets/scss/style.scss"),
        "body { color: red; }\n",
    )?;
    write(
        &dir.path().join("dev/assets/pug/index.pug"),
        "doctype html\nhtml\n  body\n    p hi\n",
    )?;
    write(&dir.path().join("dev/assets/images/logo.svg"), "<svg/>")?;

    assert!(run_build_parallel(Arc::clone(&ctx)).await);
    assert!(dir.path().join("build/js/app.min.js").is_file());
    assert!(dir.path().join("build/css/style.min.css").is_file());
    assert!(dir.path().join("build/index.html").is_file());
    assert!(dir.path().join("build/images/logo.svg").is_file());

    Ok(())
}

#[tokio::test]
async fn assets_series_stops_at_first_failure() -> TestResult {
    let dir = tempfile::tempdir()?;
    let ctx = context(dir.path());

    // Template runs before styles in the series and fails to compile.
    write(
        &dir.path().join("dev/assets/pug/index.pug"),
        "each item in items\n  li item\n",
    )?;
    write(
        &dir.path().join("dev/assets/scss/style.scss"),
        "body { color: red; }\n",
    )?;

    assert!(run_assets(Arc::clone(&ctx)).await.is_err());
    assert!(!dir.path().join("build/css/style.min.css").exists());

    Ok(())
}

#[tokio::test]
async fn assets_series_cleans_stale_images_first() -> TestResult {
    let dir = tempfile::tempdir()?;
    let ctx = context(dir.path());

    write(&dir.path().join("build/images/stale.png"), "old")?;
    write(&dir.path().join("dev/assets/images/fresh.svg"), "<svg/>")?;

    run_assets(Arc::clone(&ctx)).await?;

    assert!(!dir.path().join("build/images/stale.png").exists());
    assert!(dir.path().join("build/images/fresh.svg").is_file());

    Ok(())
}

#[tokio::test]
async fn successful_pipelines_notify_reload_but_images_do_not() -> TestResult {
    let dir = tempfile::tempdir()?;
    let hub = ReloadHub::new();

    let mut cfg = ConfigFile::default();
    cfg.project.dev_dir = dir.path().join("dev").display().to_string();
    cfg.project.build_dir = dir.path().join("build").display().to_string();
    let ctx = Arc::new(TaskContext::new(cfg, hub.clone()));

    write(&dir.path().join("dev/assets/js/app.js"), "const a = 1;\n")?;
    write(&dir.path().join("dev/assets/images/logo.svg"), "<svg/>")?;

    let mut rx = hub.subscribe();

    assetpipe::engine::run_pipeline(Arc::clone(&ctx), assetpipe::engine::PipelineKind::Images)
        .await?;
    assert!(rx.try_recv().is_err());

    assetpipe::engine::run_pipeline(Arc::clone(&ctx), assetpipe::engine::PipelineKind::Scripts)
        .await?;
    assert!(rx.try_recv().is_ok());

    Ok(())
}
