// src/assets/template.rs

//! Template pipeline: compile, validate (advisory), minify.
//!
//! Validation findings never fail the run; they are logged and the
//! pipeline carries on to minification, matching the original chain where
//! only the compile step was fatal.

use tracing::{debug, info, warn};

use crate::config::{ResolvedPaths, TemplatePreprocessor};
use crate::errors::{PipelineError, PipelineResult};

use super::batch;
use super::{PipelineReport, pug};

/// Run the template pipeline over the configured entry file(s).
pub fn run(paths: &ResolvedPaths, syntax: TemplatePreprocessor) -> PipelineResult<PipelineReport> {
    let files = batch::load_text_batch(&paths.template.src)?;
    let mut report = PipelineReport::default();

    for file in &files {
        debug!(path = ?file.path, "template: processing");

        let html = match syntax {
            TemplatePreprocessor::Pug => {
                pug::compile(&file.contents).map_err(|message| PipelineError::Compile {
                    file: file.path.clone(),
                    message,
                })?
            }
            TemplatePreprocessor::Html => file.contents.clone(),
        };

        for finding in validate(&html) {
            warn!(file = %file.path.display(), "html: {finding}");
        }

        let minified = minify(&html);

        let out_name = html_name(file.file_name());
        let out = batch::write_text(&paths.template.dest, &out_name, &minified)?;
        report.written.push(out);
    }

    info!(files = report.written.len(), "template pipeline finished");
    Ok(report)
}

/// Advisory HTML checks: tag balance and duplicate `id` attributes.
pub fn validate(html: &str) -> Vec<String> {
    let mut findings = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut seen_ids: Vec<String> = Vec::new();

    for tag in tags(html) {
        match tag {
            Tag::Open { name, id, void } => {
                if let Some(id) = id {
                    if seen_ids.contains(&id) {
                        findings.push(format!("duplicate id \"{id}\""));
                    } else {
                        seen_ids.push(id);
                    }
                }
                if !void {
                    stack.push(name);
                }
            }
            Tag::Close { name } => match stack.iter().rposition(|t| *t == name) {
                Some(pos) if pos == stack.len() - 1 => {
                    stack.pop();
                }
                Some(_) => {
                    findings.push(format!("misnested closing tag </{name}>"));
                    while stack.last().is_some_and(|t| *t != name) {
                        stack.pop();
                    }
                    stack.pop();
                }
                None => findings.push(format!("closing tag </{name}> without opener")),
            },
        }
    }

    for unclosed in stack {
        findings.push(format!("unclosed <{unclosed}>"));
    }

    findings
}

enum Tag {
    Open {
        name: String,
        id: Option<String>,
        void: bool,
    },
    Close {
        name: String,
    },
}

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Crude tag scanner, good enough for advisory findings.
fn tags(html: &str) -> Vec<Tag> {
    let mut out = Vec::new();
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        rest = &rest[start + 1..];
        let Some(end) = rest.find('>') else { break };
        let inner = &rest[..end];
        rest = &rest[end + 1..];

        if inner.starts_with('!') || inner.starts_with('?') {
            continue;
        }

        if let Some(name) = inner.strip_prefix('/') {
            out.push(Tag::Close {
                name: name.trim().to_ascii_lowercase(),
            });
            continue;
        }

        let name: String = inner
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect::<String>()
            .to_ascii_lowercase();
        if name.is_empty() {
            continue;
        }

        let id = inner.split_whitespace().find_map(|attr| {
            attr.strip_prefix("id=\"")
                .and_then(|v| v.strip_suffix('"'))
                .map(|v| v.to_string())
        });

        let void = VOID_ELEMENTS.contains(&name.as_str()) || inner.ends_with('/');
        out.push(Tag::Open { name, id, void });
    }

    out
}

/// Collapse whitespace runs to single spaces, drop inter-tag whitespace
/// entirely, and strip `<!-- -->` comments (conditional comments are
/// kept).
pub fn minify(html: &str) -> String {
    let without_comments = strip_comments(html);

    let mut out = String::with_capacity(without_comments.len());
    let mut pending_space = false;

    for c in without_comments.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            let between_tags = out.ends_with('>') && c == '<';
            if !out.is_empty() && !between_tags {
                out.push(' ');
            }
            pending_space = false;
        }
        out.push(c);
    }

    out
}

fn strip_comments(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find("<!--") {
        let after = &rest[start + 4..];
        // Downlevel-revealed conditional comments still matter to old IE;
        // leave them alone.
        if after.trim_start().starts_with("[if") {
            match after.find("-->") {
                Some(end) => {
                    out.push_str(&rest[..start + 4 + end + 3]);
                    rest = &after[end + 3..];
                }
                None => break,
            }
            continue;
        }
        out.push_str(&rest[..start]);
        match after.find("-->") {
            Some(end) => rest = &after[end + 3..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Swap the preprocessor extension for `.html`.
fn html_name(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, _)) => format!("{stem}.html"),
        None => format!("{file_name}.html"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minify_collapses_whitespace_and_drops_comments() {
        let html = "<div>\n  <p>hello   world</p>\n  <!-- note -->\n</div>\n";
        assert_eq!(minify(html), "<div><p>hello world</p></div>");
    }

    #[test]
    fn minify_keeps_conditional_comments() {
        let html = "<!--[if IE]><link rel=\"x\"><![endif]-->";
        assert!(minify(html).contains("[if IE]"));
    }

    #[test]
    fn validate_flags_unclosed_and_duplicate_ids() {
        let findings = validate("<div id=\"a\"><p id=\"a\"></div>");
        assert!(findings.iter().any(|f| f.contains("duplicate id")));
        assert!(findings.iter().any(|f| f.contains("misnested") || f.contains("unclosed")));
    }

    #[test]
    fn validate_accepts_void_elements() {
        let findings = validate("<p><br><img src=\"x.png\"></p>");
        assert!(findings.is_empty());
    }

    #[test]
    fn html_name_swaps_extension() {
        assert_eq!(html_name("index.pug"), "index.html");
        assert_eq!(html_name("index.html"), "index.html");
    }
}
