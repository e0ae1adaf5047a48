//! Include filter applied to each candidate's relative path.
//!
//! Patterns are written in dotted form (`com.example.*`). Before matching,
//! every `.` is rewritten to the separator of the filesystem being walked, so
//! `com.example.*` becomes `com/example/*` inside an archive. A leading
//! `glob:` or `regex:` selects the syntax; plain patterns are globs.
//!
//! The rewrite is purely textual, so in regex patterns `\.` and `.*` are
//! rewritten too. Use `\W` to match the dot of `.class`.
//!
//! Globs follow path-matcher rules: `*` stays within one path component and
//! `**` crosses components.

use glob::{MatchOptions, Pattern};
use regex::Regex;
use std::path::Path;

use crate::error::{Result, ScanError};

pub const MATCH_ALL: &str = "**";

#[derive(Debug, Clone)]
enum Matcher {
    Glob(Pattern),
    Regex(Regex),
}

#[derive(Debug, Clone)]
pub struct IncludeFilter {
    matcher: Matcher,
}

impl IncludeFilter {
    /// Compiles `pattern` for a filesystem whose separator is `separator`.
    pub fn new(pattern: &str, separator: &str) -> Result<Self> {
        let (syntax, body) = match pattern.split_once(':') {
            Some((s @ ("glob" | "regex"), rest)) => (s, rest),
            _ => ("glob", pattern),
        };
        let rewritten = body.replace('.', &escape_for(syntax, separator));

        let matcher = if syntax == "regex" {
            Regex::new(&format!("^(?:{rewritten})$"))
                .map(Matcher::Regex)
                .map_err(|e| ScanError::Filter {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })?
        } else {
            Pattern::new(&rewritten)
                .map(Matcher::Glob)
                .map_err(|e| ScanError::Filter {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })?
        };

        Ok(Self { matcher })
    }

    pub fn matches(&self, relative: &Path) -> bool {
        let text = relative.to_string_lossy();
        match &self.matcher {
            Matcher::Glob(p) => p.matches_with(
                &text,
                MatchOptions {
                    case_sensitive: true,
                    require_literal_separator: true,
                    require_literal_leading_dot: false,
                },
            ),
            Matcher::Regex(r) => r.is_match(&text),
        }
    }
}

fn escape_for(syntax: &str, separator: &str) -> String {
    match syntax {
        "regex" => regex::escape(separator),
        _ => Pattern::escape(separator),
    }
}
