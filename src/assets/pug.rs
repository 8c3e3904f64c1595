// src/assets/pug.rs

//! Pug-to-HTML compilation.
//!
//! Covers the subset a typical landing-page template uses:
//! - nesting by indentation
//! - `tag#id.class.other(attr="value", flag)` shorthand, bare `.class` /
//!   `#id` implying `div`
//! - trailing inline text and `|` text lines
//! - `doctype html`
//! - `//` comments (kept as HTML comments) and `//-` comments (dropped),
//!   each swallowing its indented block
//!
//! Mixins, interpolation, conditionals and iteration are out of scope and
//! reported as compile errors.

use std::fmt::Write as _;

/// Elements that never take a closing tag.
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

#[derive(Debug)]
enum Node {
    Doctype(String),
    Element {
        tag: String,
        id: Option<String>,
        classes: Vec<String>,
        attrs: Vec<(String, Option<String>)>,
        inline_text: Option<String>,
        children: Vec<Node>,
    },
    Text(String),
    Comment {
        text: String,
        children: Vec<Node>,
    },
}

/// Compile Pug source into HTML.
pub fn compile(src: &str) -> Result<String, String> {
    let lines: Vec<(usize, &str)> = src
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| (l.len() - l.trim_start().len(), l.trim_end().trim_start()))
        .collect();

    let mut pos = 0;
    let nodes = parse_children(&lines, &mut pos, 0)?;
    if pos != lines.len() {
        return Err(format!(
            "unexpected indentation at line '{}'",
            lines[pos].1
        ));
    }

    let mut out = String::new();
    for node in &nodes {
        render(node, &mut out);
    }
    Ok(out)
}

/// Parse all consecutive lines indented at least `min_indent`, treating
/// the first line's indent as the level for this block.
fn parse_children(
    lines: &[(usize, &str)],
    pos: &mut usize,
    min_indent: usize,
) -> Result<Vec<Node>, String> {
    let mut nodes = Vec::new();
    let block_indent = match lines.get(*pos) {
        Some(&(indent, _)) if indent >= min_indent => indent,
        _ => return Ok(nodes),
    };

    while let Some(&(indent, text)) = lines.get(*pos) {
        if indent < block_indent {
            break;
        }
        if indent > block_indent {
            return Err(format!("unexpected indentation at line '{text}'"));
        }

        *pos += 1;

        if let Some(rest) = text.strip_prefix("//-") {
            // Dropped comment: skip its block entirely.
            let _ = rest;
            skip_block(lines, pos, block_indent);
            continue;
        }

        if let Some(rest) = text.strip_prefix("//") {
            let children = parse_children(lines, pos, block_indent + 1)?;
            nodes.push(Node::Comment {
                text: rest.trim().to_string(),
                children,
            });
            continue;
        }

        if let Some(rest) = text.strip_prefix('|') {
            nodes.push(Node::Text(rest.trim_start().to_string()));
            continue;
        }

        if let Some(rest) = text.strip_prefix("doctype") {
            let name = rest.trim();
            nodes.push(Node::Doctype(if name.is_empty() {
                "html".to_string()
            } else {
                name.to_string()
            }));
            continue;
        }

        reject_unsupported(text)?;

        let mut element = parse_element(text)?;
        if let Node::Element { children, .. } = &mut element {
            *children = parse_children(lines, pos, block_indent + 1)?;
        }
        nodes.push(element);
    }

    Ok(nodes)
}

fn skip_block(lines: &[(usize, &str)], pos: &mut usize, parent_indent: usize) {
    while let Some(&(indent, _)) = lines.get(*pos) {
        if indent <= parent_indent {
            break;
        }
        *pos += 1;
    }
}

/// Language constructs outside the supported subset.
fn reject_unsupported(line: &str) -> Result<(), String> {
    const KEYWORDS: [&str; 10] = [
        "each", "if", "else", "case", "when", "mixin", "extends", "block", "include", "while",
    ];

    if line.starts_with('-') || line.starts_with('=') {
        return Err(format!("inline code is not supported: '{line}'"));
    }

    let first = line.split_whitespace().next().unwrap_or_default();
    if KEYWORDS.contains(&first) {
        return Err(format!("'{first}' blocks are not supported: '{line}'"));
    }
    Ok(())
}

/// Parse one element line: `tag#id.class(attrs) inline text`.
fn parse_element(line: &str) -> Result<Node, String> {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    let mut tag = String::new();
    while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '-') {
        tag.push(chars[i]);
        i += 1;
    }

    let mut id = None;
    let mut classes = Vec::new();

    loop {
        match chars.get(i) {
            Some('#') => {
                i += 1;
                let mut name = String::new();
                while i < chars.len() && is_name_char(chars[i]) {
                    name.push(chars[i]);
                    i += 1;
                }
                if name.is_empty() {
                    return Err(format!("empty id in '{line}'"));
                }
                id = Some(name);
            }
            Some('.') => {
                i += 1;
                let mut name = String::new();
                while i < chars.len() && is_name_char(chars[i]) {
                    name.push(chars[i]);
                    i += 1;
                }
                if name.is_empty() {
                    return Err(format!("empty class in '{line}'"));
                }
                classes.push(name);
            }
            _ => break,
        }
    }

    if tag.is_empty() {
        if id.is_none() && classes.is_empty() {
            return Err(format!("unsupported syntax: '{line}'"));
        }
        tag = "div".to_string();
    }

    let mut attrs = Vec::new();
    if chars.get(i) == Some(&'(') {
        let close = find_closing_paren(&chars, i)
            .ok_or_else(|| format!("unclosed attribute list in '{line}'"))?;
        let attr_src: String = chars[i + 1..close].iter().collect();
        attrs = parse_attrs(&attr_src)?;
        i = close + 1;
    }

    let rest: String = chars[i..].iter().collect();
    let inline_text = {
        let t = rest.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    };

    Ok(Node::Element {
        tag,
        id,
        classes,
        attrs,
        inline_text,
        children: Vec::new(),
    })
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn find_closing_paren(chars: &[char], open: usize) -> Option<usize> {
    let mut in_quote: Option<char> = None;
    for (i, &c) in chars.iter().enumerate().skip(open + 1) {
        match in_quote {
            Some(q) if c == q => in_quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => in_quote = Some(c),
                ')' => return Some(i),
                _ => {}
            },
        }
    }
    None
}

/// Parse `a="1", b='2', checked` attribute lists.
fn parse_attrs(src: &str) -> Result<Vec<(String, Option<String>)>, String> {
    let mut attrs = Vec::new();

    for part in split_attrs(src) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.split_once('=') {
            Some((name, value)) => {
                let value = value.trim();
                let unquoted = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                    .unwrap_or(value);
                attrs.push((name.trim().to_string(), Some(unquoted.to_string())));
            }
            None => attrs.push((part.to_string(), None)),
        }
    }

    Ok(attrs)
}

/// Split on commas outside quotes.
fn split_attrs(src: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quote: Option<char> = None;

    for c in src.chars() {
        match in_quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    in_quote = None;
                }
            }
            None => match c {
                '\'' | '"' => {
                    in_quote = Some(c);
                    current.push(c);
                }
                ',' => {
                    parts.push(std::mem::take(&mut current));
                }
                _ => current.push(c),
            },
        }
    }
    parts.push(current);
    parts
}

fn render(node: &Node, out: &mut String) {
    match node {
        Node::Doctype(name) => {
            let _ = writeln!(out, "<!DOCTYPE {name}>");
        }
        Node::Text(text) => {
            out.push_str(text);
            out.push('\n');
        }
        Node::Comment { text, children } => {
            out.push_str("<!-- ");
            out.push_str(text);
            for child in children {
                out.push('\n');
                render(child, out);
            }
            out.push_str(" -->\n");
        }
        Node::Element {
            tag,
            id,
            classes,
            attrs,
            inline_text,
            children,
        } => {
            out.push('<');
            out.push_str(tag);
            if let Some(id) = id {
                let _ = write!(out, " id=\"{id}\"");
            }
            if !classes.is_empty() {
                let _ = write!(out, " class=\"{}\"", classes.join(" "));
            }
            for (name, value) in attrs {
                match value {
                    Some(v) => {
                        let _ = write!(out, " {name}=\"{v}\"");
                    }
                    None => {
                        let _ = write!(out, " {name}");
                    }
                }
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&tag.as_str()) {
                out.push('\n');
                return;
            }

            if let Some(text) = inline_text {
                out.push_str(text);
            }
            if !children.is_empty() {
                out.push('\n');
                for child in children {
                    render(child, out);
                }
            }
            let _ = writeln!(out, "</{tag}>");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_nested_document() {
        let src = "doctype html\nhtml\n  head\n    title My Site\n  body\n    h1.hero Welcome\n";
        let html = compile(src).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>My Site</title>"));
        assert!(html.contains("<h1 class=\"hero\">Welcome</h1>"));
        assert!(html.contains("</body>"));
        assert!(html.contains("</html>"));
    }

    #[test]
    fn id_class_shorthand_and_implicit_div() {
        let html = compile("#main.wrap.dark content").unwrap();
        assert!(html.contains("<div id=\"main\" class=\"wrap dark\">content</div>"));
    }

    #[test]
    fn attributes_are_rendered() {
        let html = compile("a(href=\"/about\", data-x='1') About").unwrap();
        assert!(html.contains("<a href=\"/about\" data-x=\"1\">About</a>"));
    }

    #[test]
    fn boolean_attribute_has_no_value() {
        let html = compile("input(type=\"checkbox\", checked)").unwrap();
        assert!(html.contains("<input type=\"checkbox\" checked>"));
        // Void element: no closing tag.
        assert!(!html.contains("</input>"));
    }

    #[test]
    fn pipe_lines_become_text() {
        let html = compile("p\n  | one\n  | two\n").unwrap();
        assert!(html.contains("one\ntwo"));
    }

    #[test]
    fn plain_comments_survive_silent_comments_do_not() {
        let html = compile("// visible\n//- secret\n  p hidden too\np shown\n").unwrap();
        assert!(html.contains("<!-- visible -->"));
        assert!(!html.contains("secret"));
        assert!(!html.contains("hidden too"));
        assert!(html.contains("<p>shown</p>"));
    }

    #[test]
    fn unclosed_attribute_list_is_an_error() {
        assert!(compile("a(href=\"/x\" About").is_err());
    }

    #[test]
    fn unsupported_syntax_is_an_error() {
        assert!(compile("each item in items\n  li= item\n").is_err());
    }
}
