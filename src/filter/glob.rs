//! Anchored path globs
//!
//! A glob is translated into a regular expression anchored at both ends,
//! using the usual path-matcher syntax:
//!
//! - `*` matches within one path segment, `**` matches across segments
//!   (including `/`), `?` matches one non-separator character
//! - `[abc]`, `[a-z]`, `[!abc]` match one non-separator character
//! - `{a,b}` matches either alternative; groups do not nest
//! - `\` escapes the next character
//!
//! `/**/` needs at least one directory between its slashes, so
//! `/app/**/*.md` does not match `/app/readme.md`.

use crate::error::{LayerFilterError, LayerFilterResult};
use regex::Regex;

/// A compiled glob
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    glob: String,
    regex: Regex,
}

impl GlobMatcher {
    /// Compile a glob pattern
    pub fn new(glob: &str) -> LayerFilterResult<Self> {
        if glob.is_empty() {
            return Err(LayerFilterError::EmptyGlob);
        }

        let invalid = |reason: String| LayerFilterError::InvalidGlob {
            glob: glob.to_string(),
            reason,
        };

        let source = to_regex(glob).map_err(invalid)?;
        let regex = Regex::new(&source).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            glob: glob.to_string(),
            regex,
        })
    }

    /// Whether the full path matches
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// The pattern as written in the configuration
    pub fn as_str(&self) -> &str {
        &self.glob
    }
}

fn push_literal(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

/// Translate a glob into an anchored regular expression
fn to_regex(glob: &str) -> Result<String, String> {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::with_capacity(glob.len() * 2 + 2);
    let mut in_group = false;
    let mut i = 0;

    out.push('^');
    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '\\' => {
                let escaped = *chars
                    .get(i)
                    .ok_or_else(|| format!("no character to escape at position {}", i - 1))?;
                push_literal(&mut out, escaped);
                i += 1;
            }
            '*' if chars.get(i) == Some(&'*') => {
                out.push_str(".*");
                i += 1;
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '[' => i = push_class(&chars, i, &mut out)?,
            '{' if in_group => return Err(format!("nested '{{' at position {}", i - 1)),
            '{' => {
                out.push_str("(?:");
                in_group = true;
            }
            '}' if in_group => {
                out.push(')');
                in_group = false;
            }
            ',' if in_group => out.push('|'),
            c => push_literal(&mut out, c),
        }
    }

    if in_group {
        return Err("missing '}'".to_string());
    }
    out.push('$');
    Ok(out)
}

/// Translate the class whose body starts at `start` (just past `[`).
/// Returns the index after the closing `]`.
fn push_class(chars: &[char], start: usize, out: &mut String) -> Result<usize, String> {
    let mut i = start;
    let mut body = String::new();

    if chars.get(i) == Some(&'!') {
        body.push('^');
        i += 1;
    }
    let first = i;
    let mut last: Option<char> = None;

    loop {
        let c = *chars
            .get(i)
            .ok_or_else(|| format!("missing ']' for class at position {}", start - 1))?;
        i += 1;

        match c {
            ']' if i - 1 > first => break,
            ']' => return Err(format!("empty class at position {}", start - 1)),
            '/' => return Err("explicit path separator in class".to_string()),
            '-' if last.is_some() && chars.get(i).is_some_and(|&n| n != ']') => {
                let low = last.take().unwrap_or_default();
                let high = chars[i];
                if high < low {
                    return Err(format!("invalid range {}-{}", low, high));
                }
                body.push('-');
                push_literal(&mut body, high);
                i += 1;
            }
            c => {
                push_literal(&mut body, c);
                last = Some(c);
            }
        }
    }

    // Intersect with "not a separator" so ranges and negation stay in one segment
    out.push_str("[[^/]&&[");
    out.push_str(&body);
    out.push_str("]]");
    Ok(i)
}
