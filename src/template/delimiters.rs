// ABOUTME: Configurable template delimiters and translation to native handlebars syntax
// ABOUTME: Lets templates use pairs like <% %> or << >> while the evaluator sees {{ }}

use std::fmt;
use std::str::FromStr;

use super::error::{Result, TemplateError};

const NATIVE_LEFT: &str = "{{";
const NATIVE_RIGHT: &str = "}}";

/// Left/right markers bounding template expressions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    left: String,
    right: String,
}

impl Delimiters {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Result<Self> {
        let left = left.into();
        let right = right.into();

        for side in [&left, &right] {
            if side.is_empty() || !side.chars().all(|c| c.is_ascii_graphic()) {
                return Err(TemplateError::InvalidDelimiters(format!(
                    "{}:{} (each side must be non-empty printable ASCII without spaces)",
                    left, right
                )));
            }
        }

        Ok(Self { left, right })
    }

    pub fn left(&self) -> &str {
        &self.left
    }

    pub fn right(&self) -> &str {
        &self.right
    }

    pub fn is_native(&self) -> bool {
        self.left == NATIVE_LEFT && self.right == NATIVE_RIGHT
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            left: NATIVE_LEFT.to_string(),
            right: NATIVE_RIGHT.to_string(),
        }
    }
}

impl FromStr for Delimiters {
    type Err = TemplateError;

    /// Parse `left:right`, splitting at the last colon that leaves both sides non-empty
    fn from_str(raw: &str) -> Result<Self> {
        let split = raw
            .char_indices()
            .rev()
            .filter(|&(_, c)| c == ':')
            .map(|(index, _)| index)
            .find(|&index| index > 0 && index + 1 < raw.len());

        match split {
            Some(index) => Self::new(&raw[..index], &raw[index + 1..]),
            None => Err(TemplateError::InvalidDelimiters(format!(
                "{} (expected \"left:right\")",
                raw
            ))),
        }
    }
}

impl fmt::Display for Delimiters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.left, self.right)
    }
}

/// Rewrite `source` so every expression uses the native `{{ }}` markers.
///
/// With custom delimiters, literal `{{` in plain text is escaped so it renders
/// verbatim, and backslashes next to a native marker are padded so the
/// evaluator's escape rule cannot consume them. Inside expressions, Go-style
/// `.Field` references and `-` trim markers are rewritten to their handlebars
/// equivalents.
pub fn translate(source: &str, delimiters: &Delimiters) -> Result<String> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    let mut consumed = 0;

    while let Some(start) = rest.find(delimiters.left()) {
        push_text(&mut out, &rest[..start], delimiters);
        if !delimiters.is_native() {
            pad_trailing_backslashes(&mut out);
        }

        let after_left = &rest[start + delimiters.left().len()..];
        let Some(end) = find_closing(after_left, delimiters.right()) else {
            let offset = consumed + start;
            return Err(TemplateError::UnclosedDelimiter {
                left: delimiters.left().to_string(),
                line: source[..offset].matches('\n').count() + 1,
            });
        };

        out.push_str(NATIVE_LEFT);
        out.push_str(&rewrite_expression(&after_left[..end]));
        out.push_str(NATIVE_RIGHT);

        let advanced = start + delimiters.left().len() + end + delimiters.right().len();
        consumed += advanced;
        rest = &rest[advanced..];
    }

    push_text(&mut out, rest, delimiters);
    Ok(out)
}

// The evaluator reads `\{{` as a literal `{{`, and a run of n >= 2
// backslashes before `{{` as n - 1 backslashes followed by an expression.
fn push_text(out: &mut String, text: &str, delimiters: &Delimiters) {
    if delimiters.is_native() {
        out.push_str(text);
        return;
    }

    let mut rest = text;
    while let Some(index) = rest.find(NATIVE_LEFT) {
        out.push_str(&rest[..index]);
        if out.ends_with('\\') {
            // Keep the backslashes, then let an empty comment absorb the escape
            out.push('\\');
            out.push_str("{{!}}");
        }
        out.push_str("\\{{");
        rest = &rest[index + NATIVE_LEFT.len()..];
    }
    out.push_str(rest);
}

/// One extra backslash so a run ending right before an emitted `{{` survives
fn pad_trailing_backslashes(out: &mut String) {
    if out.ends_with('\\') {
        out.push('\\');
    }
}

/// Byte offset of the first `right` in `after_left` outside string literals
fn find_closing(after_left: &str, right: &str) -> Option<usize> {
    let body = after_left.trim_start();
    let body = body.strip_prefix('-').unwrap_or(body).trim_start();
    if body.starts_with('!') {
        return after_left.find(right);
    }

    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (index, c) in after_left.char_indices() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == open {
                quote = None;
            }
            continue;
        }

        if c == '"' || c == '\'' {
            quote = Some(c);
        } else if after_left[index..].starts_with(right) {
            return Some(index);
        }
    }
    None
}

fn rewrite_expression(expr: &str) -> String {
    let mut body = expr;
    let mut trim_left = false;
    let mut trim_right = false;

    if let Some(stripped) = body.strip_prefix('-') {
        if stripped.starts_with(char::is_whitespace) {
            trim_left = true;
            body = stripped;
        }
    }
    if let Some(stripped) = body.strip_suffix('-') {
        if stripped.ends_with(char::is_whitespace) {
            trim_right = true;
            body = stripped;
        }
    }

    let mut rewritten = String::with_capacity(body.len() + 2);
    if trim_left {
        rewritten.push('~');
    }
    if body.trim_start().starts_with('!') {
        rewritten.push_str(body);
    } else {
        rewritten.push_str(&rewrite_field_references(body));
    }
    if trim_right {
        rewritten.push('~');
    }
    rewritten
}

/// `.Name` becomes `Name` and a lone `.` becomes `this`, outside string literals
fn rewrite_field_references(body: &str) -> String {
    let chars: Vec<char> = body.chars().collect();
    let mut out = String::with_capacity(body.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (index, &c) in chars.iter().enumerate() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == open {
                quote = None;
            }
            out.push(c);
            continue;
        }

        match c {
            '"' | '\'' => {
                quote = Some(c);
                out.push(c);
            }
            '.' => {
                let at_boundary = index == 0
                    || matches!(chars[index - 1], '(' | '=' | '#' | '/' | '^')
                    || chars[index - 1].is_whitespace();
                let next = chars.get(index + 1).copied();

                match next {
                    Some(n) if at_boundary && (n.is_alphabetic() || n == '_') => {}
                    None if at_boundary => out.push_str("this"),
                    Some(n) if at_boundary && (n.is_whitespace() || n == ')') => {
                        out.push_str("this")
                    }
                    _ => out.push(c),
                }
            }
            _ => out.push(c),
        }
    }

    out
}
