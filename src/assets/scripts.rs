// src/assets/scripts.rs

//! Scripts pipeline: lint, transpile, minify, `.min` rename, source map.
//!
//! Mirrors the classic chain over JS entry files. Linting distinguishes
//! structural errors (fatal) from advisory findings (logged and dropped):
//! an unbalanced bracket aborts the run, a stray `debugger` does not.

use tracing::{debug, info, warn};

use crate::config::ResolvedPaths;
use crate::errors::{PipelineError, PipelineResult};

use super::batch::{self, SourceFile};
use super::{PipelineReport, sourcemap};

/// Run the scripts pipeline over the configured source globs.
pub fn run(paths: &ResolvedPaths) -> PipelineResult<PipelineReport> {
    let files = batch::load_text_batch(&paths.scripts.src)?;
    let mut report = PipelineReport::default();

    for file in &files {
        debug!(path = ?file.path, "scripts: processing");

        for finding in lint(file)? {
            warn!(
                file = %file.path.display(),
                line = finding.line,
                "lint: {}",
                finding.message
            );
        }

        let transpiled = transpile(&file.contents)
            .map_err(|message| PipelineError::Compile {
                file: file.path.clone(),
                message,
            })?;
        let minified = minify(&transpiled).map_err(|message| PipelineError::Transform {
            file: file.path.clone(),
            message,
        })?;

        let out_name = batch::min_name(file.file_name());
        let map_link = sourcemap::write_js_map(
            &paths.scripts.dest,
            &out_name,
            &file.path,
            &file.contents,
        )?;
        let out = batch::write_text(
            &paths.scripts.dest,
            &out_name,
            &format!("{minified}{map_link}"),
        )?;
        report.written.push(out);
    }

    info!(files = report.written.len(), "scripts pipeline finished");
    Ok(report)
}

/// One advisory lint finding.
#[derive(Debug, Clone)]
pub struct Finding {
    pub line: usize,
    pub message: String,
}

/// Lint a source file.
///
/// Returns advisory findings; structural problems (unbalanced brackets,
/// unterminated string or comment) are returned as a fatal
/// [`PipelineError::Lint`].
pub fn lint(file: &SourceFile) -> PipelineResult<Vec<Finding>> {
    let classified = classify(&file.contents).map_err(|message| PipelineError::Lint {
        file: file.path.clone(),
        message,
    })?;

    check_balance(&classified).map_err(|message| PipelineError::Lint {
        file: file.path.clone(),
        message,
    })?;

    Ok(advisories(&classified))
}

/// Rewrite `const` and `let` declarations to `var`, leaving strings,
/// template literals and comments untouched.
pub fn transpile(src: &str) -> Result<String, String> {
    let classified = classify(src)?;
    let mut out = String::with_capacity(src.len());
    let mut i = 0;

    while i < classified.len() {
        let (ch, class) = classified[i];
        if class == CharClass::Code && is_word_char(ch) && !prev_is_word(&classified, i) {
            let word: String = classified[i..]
                .iter()
                .take_while(|(c, cl)| *cl == CharClass::Code && is_word_char(*c))
                .map(|(c, _)| *c)
                .collect();
            if word == "const" || word == "let" {
                out.push_str("var");
            } else {
                out.push_str(&word);
            }
            i += word.chars().count();
            continue;
        }
        out.push(ch);
        i += 1;
    }

    Ok(out)
}

/// Minify JS: drop comments, collapse whitespace, keep string and
/// template-literal contents verbatim. A single space survives only where
/// dropping it would merge two word tokens, or fuse a sign operator pair
/// (`b - -c` must not become the decrement `b--c`).
pub fn minify(src: &str) -> Result<String, String> {
    let classified = classify(src)?;
    let mut out = String::with_capacity(src.len());
    let mut pending_space = false;

    for &(ch, class) in &classified {
        match class {
            CharClass::Comment => {
                // A comment is at least a token boundary.
                pending_space = true;
            }
            CharClass::Str => {
                out.push(ch);
            }
            CharClass::Code => {
                if ch.is_whitespace() {
                    pending_space = true;
                    continue;
                }
                if pending_space {
                    if let Some(prev) = out.chars().last() {
                        let word_join = is_word_char(prev) && is_word_char(ch);
                        let sign_join = (prev == '+' || prev == '-') && prev == ch;
                        if word_join || sign_join {
                            out.push(' ');
                        }
                    }
                    pending_space = false;
                }
                out.push(ch);
            }
        }
    }

    Ok(out)
}

/// Classification of one source character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    /// Executable code, subject to collapsing and rewriting.
    Code,
    /// Inside a string or template literal; kept verbatim (delimiters
    /// included).
    Str,
    /// Inside a `//` or `/* */` comment; dropped by the minifier.
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment,
    Str(char),
    /// Template literal; interpolation bodies are pushed as `Code` frames
    /// with a brace depth.
    Template,
}

/// Walk the source once, classifying every character.
///
/// Errors on an unterminated string, template literal or block comment.
/// Regex literals are not modeled; a `/` is always treated as code, which
/// is good enough for the declaration-level rewrites done here.
fn classify(src: &str) -> Result<Vec<(char, CharClass)>, String> {
    let chars: Vec<char> = src.chars().collect();
    let mut out = Vec::with_capacity(chars.len());
    let mut stack: Vec<State> = vec![State::Code];
    let mut brace_depths: Vec<usize> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        match *stack.last().unwrap() {
            State::Code => match c {
                '/' if next == Some('/') => {
                    stack.push(State::LineComment);
                    out.push((c, CharClass::Comment));
                }
                '/' if next == Some('*') => {
                    stack.push(State::BlockComment);
                    out.push((c, CharClass::Comment));
                }
                '\'' | '"' => {
                    stack.push(State::Str(c));
                    out.push((c, CharClass::Str));
                }
                '`' => {
                    stack.push(State::Template);
                    out.push((c, CharClass::Str));
                }
                '{' => {
                    if let Some(depth) = brace_depths.last_mut() {
                        *depth += 1;
                    }
                    out.push((c, CharClass::Code));
                }
                '}' => {
                    match brace_depths.last_mut() {
                        // Closing an interpolation body: back to the template.
                        Some(0) => {
                            brace_depths.pop();
                            stack.pop();
                            out.push((c, CharClass::Str));
                        }
                        Some(depth) => {
                            *depth -= 1;
                            out.push((c, CharClass::Code));
                        }
                        None => out.push((c, CharClass::Code)),
                    }
                }
                _ => out.push((c, CharClass::Code)),
            },
            State::LineComment => {
                if c == '\n' {
                    stack.pop();
                    out.push((c, CharClass::Code));
                } else {
                    out.push((c, CharClass::Comment));
                }
            }
            State::BlockComment => {
                if c == '*' && next == Some('/') {
                    out.push((c, CharClass::Comment));
                    out.push(('/', CharClass::Comment));
                    stack.pop();
                    i += 2;
                    continue;
                }
                out.push((c, CharClass::Comment));
            }
            State::Str(quote) => {
                out.push((c, CharClass::Str));
                if c == '\\' {
                    if let Some(escaped) = next {
                        out.push((escaped, CharClass::Str));
                        i += 2;
                        continue;
                    }
                } else if c == quote {
                    stack.pop();
                } else if c == '\n' {
                    return Err("unterminated string literal".to_string());
                }
            }
            State::Template => {
                if c == '\\' {
                    out.push((c, CharClass::Str));
                    if let Some(escaped) = next {
                        out.push((escaped, CharClass::Str));
                        i += 2;
                        continue;
                    }
                } else if c == '$' && next == Some('{') {
                    out.push((c, CharClass::Str));
                    out.push(('{', CharClass::Str));
                    stack.push(State::Code);
                    brace_depths.push(0);
                    i += 2;
                    continue;
                } else if c == '`' {
                    out.push((c, CharClass::Str));
                    stack.pop();
                } else {
                    out.push((c, CharClass::Str));
                }
            }
        }

        i += 1;
    }

    match stack.last().unwrap() {
        State::Code | State::LineComment => Ok(out),
        State::BlockComment => Err("unterminated block comment".to_string()),
        State::Str(_) => Err("unterminated string literal".to_string()),
        State::Template => Err("unterminated template literal".to_string()),
    }
}

/// Bracket balance over code characters only.
fn check_balance(classified: &[(char, CharClass)]) -> Result<(), String> {
    let mut stack = Vec::new();

    for &(c, class) in classified {
        if class != CharClass::Code {
            continue;
        }
        match c {
            '(' | '[' | '{' => stack.push(c),
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match stack.pop() {
                    Some(open) if open == expected => {}
                    _ => return Err(format!("unbalanced '{c}'")),
                }
            }
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed '{open}'"));
    }
    Ok(())
}

/// Advisory rules, evaluated on a projection of the source where string
/// and comment characters are blanked out (line structure preserved).
fn advisories(classified: &[(char, CharClass)]) -> Vec<Finding> {
    let code_only: String = classified
        .iter()
        .map(|&(c, class)| {
            if class == CharClass::Code || c == '\n' {
                c
            } else {
                ' '
            }
        })
        .collect();

    let rules: [(&str, &str); 3] = [
        (r"\bvar\b", "unexpected var, use let or const instead"),
        (r"\bdebugger\b", "unexpected debugger statement"),
        (r"[^=!<>]==[^=]|[^=!]!=[^=]", "expected === / !== instead of loose equality"),
    ];

    let mut findings = Vec::new();
    for (pattern, message) in rules {
        let re = regex::Regex::new(pattern).expect("advisory rule patterns are valid");
        for m in re.find_iter(&code_only) {
            let line = code_only[..m.start()].matches('\n').count() + 1;
            findings.push(Finding {
                line,
                message: message.to_string(),
            });
        }
    }

    findings.sort_by_key(|f| f.line);
    findings
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn prev_is_word(classified: &[(char, CharClass)], i: usize) -> bool {
    i > 0 && classified[i - 1].1 == CharClass::Code && is_word_char(classified[i - 1].0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn file(contents: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from("app.js"),
            contents: contents.to_string(),
        }
    }

    #[test]
    fn transpile_rewrites_declarations_only() {
        let out = transpile("const a = 1; let b = 'let x';").unwrap();
        assert_eq!(out, "var a = 1; var b = 'let x';");
    }

    #[test]
    fn transpile_ignores_identifiers_containing_keywords() {
        let out = transpile("letter(constant);").unwrap();
        assert_eq!(out, "letter(constant);");
    }

    #[test]
    fn minify_strips_comments_and_collapses_whitespace() {
        let out = minify("function f() {\n  // say hi\n  return  'a  b';\n}\n").unwrap();
        assert_eq!(out, "function f(){return'a  b';}");
    }

    #[test]
    fn minify_keeps_space_between_word_tokens() {
        let out = minify("return new Date();").unwrap();
        assert_eq!(out, "return new Date();");
    }

    #[test]
    fn minify_keeps_space_between_sign_operators() {
        // `b - -c` collapsed to `b--c` would turn negation into decrement.
        assert_eq!(minify("a = b - -c;").unwrap(), "a=b- -c;");
        assert_eq!(minify("a = b + +c;").unwrap(), "a=b+ +c;");
        // Mixed signs can still fuse safely.
        assert_eq!(minify("a = b + -c;").unwrap(), "a=b+-c;");
    }

    #[test]
    fn minify_preserves_template_interpolation() {
        let out = minify("const x = `a ${ 1 + 2 } b`;").unwrap();
        // Literal text is verbatim; the interpolation body is code and
        // collapses like any other code.
        assert_eq!(out, "const x=`a ${1+2} b`;");
    }

    #[test]
    fn unbalanced_brace_is_fatal() {
        let err = lint(&file("function f() { return 1;")).unwrap_err();
        assert!(matches!(err, crate::errors::PipelineError::Lint { .. }));
    }

    #[test]
    fn unterminated_string_is_fatal() {
        assert!(lint(&file("const a = 'oops;\n")).is_err());
    }

    #[test]
    fn debugger_and_var_are_advisory_only() {
        let findings = lint(&file("var a = 1;\ndebugger;\n")).unwrap();
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].line, 1);
        assert_eq!(findings[1].line, 2);
    }

    #[test]
    fn keywords_inside_strings_are_not_flagged() {
        let findings = lint(&file("const a = \"var debugger\";\n")).unwrap();
        assert!(findings.is_empty());
    }
}
