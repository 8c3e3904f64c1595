use std::error::Error;
use std::fs;
use std::path::Path;

use assetpipe::assets::{scripts, styles, template};
use assetpipe::config::{ConfigFile, ResolvedPaths};

type TestResult = Result<(), Box<dyn Error>>;

/// Stock project layout rooted inside a temp directory.
fn project(root: &Path) -> (ConfigFile, ResolvedPaths) {
    let mut cfg = ConfigFile::default();
    cfg.project.dev_dir = root.join("dev").display().to_string();
    cfg.project.build_dir = root.join("build").display().to_string();
    let paths = ResolvedPaths::from_config(&cfg);
    (cfg, paths)
}

fn write(path: &Path, contents: &str) -> TestResult {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

#[test]
fn scripts_emit_min_js_with_source_map() -> TestResult {
    let dir = tempfile::tempdir()?;
    let (_cfg, paths) = project(dir.path());

    write(
        &dir.path().join("dev/assets/js/app.js"),
        "// entry\nconst greeting = 'hi';\nlet n = 1;\n",
    )?;

    let report = scripts::run(&paths)?;
    assert_eq!(report.written.len(), 1);

    let out = fs::read_to_string(dir.path().join("build/js/app.min.js"))?;
    assert!(out.starts_with("var greeting='hi';var n=1;"));
    assert!(out.contains("//# sourceMappingURL=app.min.js.map"));

    let map: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("build/js/app.min.js.map"))?)?;
    assert_eq!(map["version"], 3);
    assert_eq!(map["file"], "app.min.js");

    Ok(())
}

#[test]
fn script_lint_error_aborts_without_artifacts() -> TestResult {
    let dir = tempfile::tempdir()?;
    let (_cfg, paths) = project(dir.path());

    write(
        &dir.path().join("dev/assets/js/app.js"),
        "function f() { return 1;\n",
    )?;

    assert!(scripts::run(&paths).is_err());
    assert!(!dir.path().join("build/js/app.min.js").exists());

    Ok(())
}

#[test]
fn styles_compile_nested_scss_to_min_css() -> TestResult {
    let dir = tempfile::tempdir()?;
    let (cfg, paths) = project(dir.path());

    write(
        &dir.path().join("dev/assets/scss/style.scss"),
        "$main: red;\nbody {\n  color: $main;\n  a { color: green; }\n}\n",
    )?;

    let report = styles::run(&paths, cfg.preprocessors.styles)?;
    assert_eq!(report.written.len(), 1);

    let out = fs::read_to_string(dir.path().join("build/css/style.min.css"))?;
    assert!(out.contains("color:red"));
    assert!(out.contains("body a"));
    assert!(out.contains("color:green"));
    assert!(out.contains("/*# sourceMappingURL=style.min.css.map */"));
    assert!(dir.path().join("build/css/style.min.css.map").is_file());

    Ok(())
}

#[test]
fn style_compile_error_leaves_no_artifact() -> TestResult {
    let dir = tempfile::tempdir()?;
    let (cfg, paths) = project(dir.path());

    write(
        &dir.path().join("dev/assets/scss/style.scss"),
        "body { color: $missing; }\n",
    )?;

    assert!(styles::run(&paths, cfg.preprocessors.styles).is_err());
    assert!(!dir.path().join("build/css/style.min.css").exists());

    Ok(())
}

#[test]
fn template_emits_minified_index_html_at_build_root() -> TestResult {
    let dir = tempfile::tempdir()?;
    let (cfg, paths) = project(dir.path());

    write(
        &dir.path().join("dev/assets/pug/index.pug"),
        "doctype html\nhtml\n  head\n    title My Site\n  body\n    h1#top Hello\n    p some   text\n",
    )?;

    let report = template::run(&paths, cfg.preprocessors.template)?;
    assert_eq!(report.written.len(), 1);

    let out = fs::read_to_string(dir.path().join("build/index.html"))?;
    assert!(out.starts_with("<!DOCTYPE html>"));
    assert!(out.contains("<h1 id=\"top\">Hello</h1>"));
    assert!(out.contains("<p>some text</p>"));
    assert!(!out.contains('\n'));

    Ok(())
}

#[test]
fn empty_batch_is_a_no_op() -> TestResult {
    let dir = tempfile::tempdir()?;
    let (_cfg, paths) = project(dir.path());

    // No dev tree at all: nothing matches, nothing is written.
    let report = scripts::run(&paths)?;
    assert!(report.written.is_empty());
    assert!(!dir.path().join("build").exists());

    Ok(())
}
