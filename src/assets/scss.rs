// src/assets/scss.rs

//! SCSS/Sass-to-CSS compilation.
//!
//! Covers the subset the styles pipeline needs:
//! - `$variable` declarations and substitution in values
//! - nested rules, flattened with `&` parent references
//! - `//` and `/* */` comments (both stripped; the minifier downstream
//!   would drop them anyway)
//! - top-level at-rules with bodies (`@media`, ...) containing nested rules
//! - the indented `sass` syntax, accepted via brace inference
//!
//! Anything outside the subset (nested at-rules, `@import`, mixins) is a
//! compile error rather than silently broken output.

use std::collections::HashMap;

use regex::Regex;

use crate::config::StylePreprocessor;

/// Compile preprocessor source into plain CSS.
pub fn compile(src: &str, syntax: StylePreprocessor) -> Result<String, String> {
    let braced = match syntax {
        StylePreprocessor::Scss => src.to_string(),
        StylePreprocessor::Sass => indented_to_braced(src)?,
    };

    let cleaned = strip_line_comments(&strip_block_comments(&braced)?);

    let mut vars: HashMap<String, String> = HashMap::new();
    let mut parser = Parser::new(&cleaned);
    let rules = parser.parse_block(&mut vars)?;
    if !parser.at_end() {
        return Err("unexpected '}' at top level".to_string());
    }

    let mut out = String::new();
    for rule in &rules {
        render(rule, &[], &mut out)?;
    }
    Ok(out)
}

/// One parsed node: either a rule (selector + body) or a declaration.
#[derive(Debug, Clone)]
enum Node {
    Rule { selector: String, body: Vec<Node> },
    Declaration(String),
}

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    _src: &'a str,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
            _src: src,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    /// Parse nodes until a closing `}` or end of input. Variable
    /// declarations are folded into `vars` instead of becoming nodes.
    fn parse_block(&mut self, vars: &mut HashMap<String, String>) -> Result<Vec<Node>, String> {
        let mut nodes = Vec::new();

        loop {
            self.skip_ws();
            if self.at_end() {
                return Ok(nodes);
            }
            if self.peek() == '}' {
                return Ok(nodes);
            }

            let (text, terminator) = self.read_segment()?;
            let text = text.trim().to_string();

            match terminator {
                Terminator::OpenBrace => {
                    self.pos += 1;
                    let body = self.parse_block(vars)?;
                    if self.at_end() || self.peek() != '}' {
                        return Err(format!("unclosed block for selector '{text}'"));
                    }
                    self.pos += 1;
                    nodes.push(Node::Rule {
                        selector: text,
                        body,
                    });
                }
                Terminator::Semicolon => {
                    self.pos += 1;
                    if text.is_empty() {
                        continue;
                    }
                    if let Some(rest) = text.strip_prefix('$') {
                        let (name, value) = rest
                            .split_once(':')
                            .ok_or_else(|| format!("malformed variable declaration '${rest}'"))?;
                        let value = substitute_vars(value.trim(), vars)?;
                        vars.insert(name.trim().to_string(), value);
                    } else if text.starts_with('@') {
                        return Err(format!("unsupported at-rule '{text}'"));
                    } else {
                        if !text.contains(':') {
                            return Err(format!("malformed declaration '{text}'"));
                        }
                        nodes.push(Node::Declaration(substitute_vars(&text, vars)?));
                    }
                }
                Terminator::End => {
                    if !text.is_empty() {
                        return Err(format!("declaration '{text}' is missing a terminator"));
                    }
                    return Ok(nodes);
                }
            }
        }
    }

    fn peek(&self) -> char {
        self.chars[self.pos]
    }

    fn skip_ws(&mut self) {
        while !self.at_end() && self.peek().is_whitespace() {
            self.pos += 1;
        }
    }

    /// Read raw text up to (not including) the next structural `{`, `;`,
    /// `}` or end of input, honoring quotes and parentheses.
    fn read_segment(&mut self) -> Result<(String, Terminator), String> {
        let mut text = String::new();
        let mut paren_depth = 0usize;

        while !self.at_end() {
            let c = self.peek();
            match c {
                '\'' | '"' => {
                    text.push(c);
                    self.pos += 1;
                    let quote = c;
                    loop {
                        if self.at_end() {
                            return Err("unterminated string in stylesheet".to_string());
                        }
                        let s = self.peek();
                        text.push(s);
                        self.pos += 1;
                        if s == quote {
                            break;
                        }
                    }
                }
                '(' => {
                    paren_depth += 1;
                    text.push(c);
                    self.pos += 1;
                }
                ')' => {
                    paren_depth = paren_depth.saturating_sub(1);
                    text.push(c);
                    self.pos += 1;
                }
                '{' if paren_depth == 0 => return Ok((text, Terminator::OpenBrace)),
                ';' if paren_depth == 0 => return Ok((text, Terminator::Semicolon)),
                '}' if paren_depth == 0 => return Ok((text, Terminator::End)),
                _ => {
                    text.push(c);
                    self.pos += 1;
                }
            }
        }

        Ok((text, Terminator::End))
    }
}

enum Terminator {
    OpenBrace,
    Semicolon,
    End,
}

/// Render a node tree into flat CSS, resolving nesting against the parent
/// selector chain.
fn render(node: &Node, parents: &[String], out: &mut String) -> Result<(), String> {
    match node {
        Node::Declaration(text) => Err(format!(
            "declaration '{text}' outside of any rule"
        )),
        Node::Rule { selector, body } => {
            if selector.starts_with('@') {
                if !parents.is_empty() {
                    return Err(format!(
                        "nested at-rule '{selector}' is not supported"
                    ));
                }
                out.push_str(selector);
                out.push_str(" {\n");
                for child in body {
                    render(child, &[], out)?;
                }
                out.push_str("}\n");
                return Ok(());
            }

            let combined = combine_selectors(parents, selector);

            let decls: Vec<&String> = body
                .iter()
                .filter_map(|n| match n {
                    Node::Declaration(d) => Some(d),
                    _ => None,
                })
                .collect();

            if !decls.is_empty() {
                out.push_str(&combined.join(", "));
                out.push_str(" {\n");
                for d in decls {
                    out.push_str("  ");
                    out.push_str(d);
                    out.push_str(";\n");
                }
                out.push_str("}\n");
            }

            for child in body {
                if let Node::Rule { .. } = child {
                    render(child, &combined, out)?;
                }
            }
            Ok(())
        }
    }
}

/// Combine comma-separated parent and child selectors. A `&` in the child
/// splices the parent in place; otherwise the child is a descendant.
fn combine_selectors(parents: &[String], child: &str) -> Vec<String> {
    let children: Vec<&str> = child.split(',').map(str::trim).collect();

    if parents.is_empty() {
        return children.iter().map(|c| c.to_string()).collect();
    }

    let mut out = Vec::new();
    for parent in parents {
        for c in &children {
            if c.contains('&') {
                out.push(c.replace('&', parent));
            } else {
                out.push(format!("{parent} {c}"));
            }
        }
    }
    out
}

/// Replace `$name` references using the collected variables.
fn substitute_vars(text: &str, vars: &HashMap<String, String>) -> Result<String, String> {
    let re = Regex::new(r"\$([A-Za-z_][A-Za-z0-9_-]*)").expect("static pattern");

    let mut result = String::new();
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        let name = &caps[1];
        let value = vars
            .get(name)
            .ok_or_else(|| format!("undefined variable ${name}"))?;
        result.push_str(&text[last..whole.start()]);
        result.push_str(value);
        last = whole.end();
    }
    result.push_str(&text[last..]);
    Ok(result)
}

/// Drop `/* */` comments, leaving quoted strings alone.
fn strip_block_comments(src: &str) -> Result<String, String> {
    let mut out = String::with_capacity(src.len());
    let chars: Vec<char> = src.chars().collect();
    let mut i = 0;
    let mut in_quote: Option<char> = None;

    while i < chars.len() {
        let c = chars[i];
        match in_quote {
            Some(q) => {
                out.push(c);
                if c == q {
                    in_quote = None;
                }
                i += 1;
            }
            None => match c {
                '\'' | '"' => {
                    in_quote = Some(c);
                    out.push(c);
                    i += 1;
                }
                '/' if chars.get(i + 1) == Some(&'*') => {
                    i += 2;
                    let mut closed = false;
                    while i < chars.len() {
                        if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                            i += 2;
                            closed = true;
                            break;
                        }
                        i += 1;
                    }
                    if !closed {
                        return Err("unterminated comment".to_string());
                    }
                }
                _ => {
                    out.push(c);
                    i += 1;
                }
            },
        }
    }

    Ok(out)
}

/// Drop `//` comments, leaving quoted strings alone. Slashes inside
/// parentheses are function-argument text, not comments, so an unquoted
/// `url(http://...)` survives intact.
fn strip_line_comments(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    for line in src.lines() {
        let mut in_quote: Option<char> = None;
        let mut paren_depth = 0usize;
        let mut cut = line.len();
        let bytes: Vec<char> = line.chars().collect();
        let mut byte_pos = 0;
        for (i, c) in bytes.iter().enumerate() {
            match in_quote {
                Some(q) if *c == q => in_quote = None,
                Some(_) => {}
                None => match c {
                    '\'' | '"' => in_quote = Some(*c),
                    '(' => paren_depth += 1,
                    ')' => paren_depth = paren_depth.saturating_sub(1),
                    '/' if paren_depth == 0 && bytes.get(i + 1) == Some(&'/') => {
                        cut = byte_pos;
                        break;
                    }
                    _ => {}
                },
            }
            byte_pos += c.len_utf8();
        }
        out.push_str(&line[..cut]);
        out.push('\n');
    }
    out
}

/// Turn the indented `sass` syntax into braced `scss` by indentation
/// analysis: a line followed by a deeper line opens a block, any other
/// line is a statement.
fn indented_to_braced(src: &str) -> Result<String, String> {
    let lines: Vec<(usize, &str)> = src
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| (l.len() - l.trim_start().len(), l.trim()))
        .collect();

    let mut out = String::new();
    let mut stack: Vec<usize> = Vec::new();

    for (i, &(indent, text)) in lines.iter().enumerate() {
        while let Some(&top) = stack.last() {
            if indent <= top {
                stack.pop();
                out.push_str("}\n");
            } else {
                break;
            }
        }

        let next_indent = lines.get(i + 1).map(|&(n, _)| n);
        let opens_block = next_indent.is_some_and(|n| n > indent);

        if opens_block {
            stack.push(indent);
            out.push_str(text);
            out.push_str(" {\n");
        } else {
            out.push_str(text);
            out.push_str(";\n");
        }
    }

    for _ in stack {
        out.push_str("}\n");
    }

    Ok(out)
}
