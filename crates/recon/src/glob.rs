//! Glob patterns for filter rules.
//!
//! Supported syntax, always case-sensitive and anchored at both ends:
//! - `*` any run of characters (including none)
//! - `?` exactly one character
//! - `[abc]`, `[a-z]`, `[!abc]` one character from (or not from) a class
//! - `\x` the literal character `x`
//!
//! Patterns are translated once into an anchored `regex::Regex`.

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GlobError {
    #[error("pattern is empty")]
    Empty,
    #[error("unterminated character class starting at offset {0}")]
    UnterminatedClass(usize),
    #[error("empty character class at offset {0}")]
    EmptyClass(usize),
    #[error("pattern ends with a dangling escape")]
    TrailingEscape,
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    regex: Regex,
}

impl GlobPattern {
    pub fn new(pattern: &str) -> Result<Self, GlobError> {
        let translated = translate(pattern)?;
        let regex = Regex::new(&translated).map_err(|e| GlobError::Invalid(e.to_string()))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl PartialEq for GlobPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Translate a glob into an anchored regex source string.
fn translate(pattern: &str) -> Result<String, GlobError> {
    if pattern.is_empty() {
        return Err(GlobError::Empty);
    }

    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2 + 8);
    out.push_str("^(?s:");

    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                // Collapse runs of stars
                while i + 1 < chars.len() && chars[i + 1] == '*' {
                    i += 1;
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '\\' => {
                let next = chars.get(i + 1).ok_or(GlobError::TrailingEscape)?;
                push_literal(&mut out, *next);
                i += 1;
            }
            '[' => {
                i = translate_class(&chars, i, &mut out)?;
            }
            c => push_literal(&mut out, c),
        }
        i += 1;
    }

    out.push_str(")$");
    Ok(out)
}

/// Translate `[...]` starting at `start`. Returns the index of the closing `]`.
fn translate_class(chars: &[char], start: usize, out: &mut String) -> Result<usize, GlobError> {
    let mut i = start + 1;
    let negated = chars.get(i) == Some(&'!');
    if negated {
        i += 1;
    }

    let body_start = i;
    let mut body = String::new();
    while i < chars.len() && chars[i] != ']' {
        let c = chars[i];
        let is_range = c == '-' && i > body_start && i + 1 < chars.len() && chars[i + 1] != ']';
        if is_range {
            body.push('-');
        } else if c == '\\' {
            let next = chars.get(i + 1).ok_or(GlobError::TrailingEscape)?;
            push_class_literal(&mut body, *next);
            i += 1;
        } else {
            push_class_literal(&mut body, c);
        }
        i += 1;
    }

    if i >= chars.len() {
        return Err(GlobError::UnterminatedClass(start));
    }
    if body.is_empty() {
        return Err(GlobError::EmptyClass(start));
    }

    out.push('[');
    if negated {
        out.push('^');
    }
    out.push_str(&body);
    out.push(']');
    Ok(i)
}

fn push_literal(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

fn push_class_literal(out: &mut String, c: char) {
    if matches!(c, '\\' | ']' | '[' | '^' | '-' | '&' | '~') {
        out.push('\\');
    }
    out.push(c);
}
