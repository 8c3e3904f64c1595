// src/assets/sourcemap.rs

//! Minimal Source Map v3 side files.
//!
//! The maps produced here are identity maps: one segment pointing the
//! start of the output at the start of the original source, with the full
//! original embedded in `sourcesContent`. That is enough for devtools to
//! surface the original file next to the minified artifact; position-exact
//! mappings are out of scope.

use std::path::Path;

use serde_json::json;

use crate::errors::PipelineResult;

use super::batch;

/// Render the JSON body of a v3 source map for `output_name`.
pub fn identity_map(output_name: &str, source_path: &Path, source_contents: &str) -> String {
    let source = source_path.to_string_lossy().replace('\\', "/");
    let map = json!({
        "version": 3,
        "file": output_name,
        "sources": [source],
        "sourcesContent": [source_contents],
        "names": [],
        "mappings": "AAAA",
    });
    map.to_string()
}

/// Write `<output_name>.map` next to the artifact and return the comment
/// line that links the artifact to it.
pub fn write_js_map(
    dest_dir: &Path,
    output_name: &str,
    source_path: &Path,
    source_contents: &str,
) -> PipelineResult<String> {
    let map_name = format!("{output_name}.map");
    let body = identity_map(output_name, source_path, source_contents);
    batch::write_text(dest_dir, &map_name, &body)?;
    Ok(format!("\n//# sourceMappingURL={map_name}\n"))
}

/// CSS flavour of [`write_js_map`].
pub fn write_css_map(
    dest_dir: &Path,
    output_name: &str,
    source_path: &Path,
    source_contents: &str,
) -> PipelineResult<String> {
    let map_name = format!("{output_name}.map");
    let body = identity_map(output_name, source_path, source_contents);
    batch::write_text(dest_dir, &map_name, &body)?;
    Ok(format!("\n/*# sourceMappingURL={map_name} */\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn map_names_output_and_source() {
        let map = identity_map("app.min.js", &PathBuf::from("dev/assets/js/app.js"), "var x;");
        let parsed: serde_json::Value = serde_json::from_str(&map).unwrap();
        assert_eq!(parsed["version"], 3);
        assert_eq!(parsed["file"], "app.min.js");
        assert_eq!(parsed["sources"][0], "dev/assets/js/app.js");
        assert_eq!(parsed["sourcesContent"][0], "var x;");
    }

    #[test]
    fn js_map_link_comment_points_at_map_file() {
        let dir = tempfile::tempdir().unwrap();
        let comment =
            write_js_map(dir.path(), "app.min.js", &PathBuf::from("a.js"), "x").unwrap();
        assert!(comment.contains("sourceMappingURL=app.min.js.map"));
        assert!(dir.path().join("app.min.js.map").is_file());
    }
}
