//! Pattern matching on event summaries.
//!
//! The matching strategy is chosen from the pattern itself:
//!
//! - starts with `^`: regular expression
//! - contains any of `*?[`: glob, matched against the whole summary as a
//!   single path segment
//! - otherwise: case-sensitive prefix
//!
//! Globs use shell syntax: `*` and `?` never match `/`, `[^...]` negates a
//! class, and a backslash escapes the next character. There is no recursive
//! `**`; it is the same as `*`.

use std::iter::Peekable;
use std::str::Chars;

use glob::{MatchOptions, Pattern};
use regex::Regex;
use thiserror::Error;

/// Glob metacharacters that select glob matching.
const GLOB_META: &[char] = &['*', '?', '['];

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Characters that cannot be written freely inside a `glob` class, each with
/// its predecessor and successor.
const CLASS_SPECIAL: [(char, char, char); 3] = [
    ('!', ' ', '"'),
    ('-', ',', '.'),
    (']', '\\', '^'),
];

/// Errors building a matcher.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid regular expression {pattern:?}: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Tests whether a summary satisfies a pattern.
#[derive(Debug, Clone)]
pub enum Matcher {
    Regex(Regex),
    /// `None` if the glob is malformed; such a matcher never matches.
    Glob(Option<Pattern>),
    Prefix(String),
}

impl Matcher {
    /// Builds the matcher for `pattern`.
    ///
    /// An invalid regular expression is an error. A malformed glob is not:
    /// it yields a matcher that never matches.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        if pattern.starts_with('^') {
            return Regex::new(pattern)
                .map(Self::Regex)
                .map_err(|source| PatternError::Regex {
                    pattern: pattern.to_string(),
                    source,
                });
        }

        if pattern.contains(GLOB_META) {
            let glob = translate_glob(pattern).and_then(|p| Pattern::new(&p).ok());
            if glob.is_none() {
                tracing::warn!(pattern, "malformed glob pattern never matches");
            }
            return Ok(Self::Glob(glob));
        }

        Ok(Self::Prefix(pattern.to_string()))
    }

    pub fn matches(&self, summary: &str) -> bool {
        match self {
            Self::Regex(re) => re.is_match(summary),
            Self::Glob(glob) => glob
                .as_ref()
                .is_some_and(|g| g.matches_with(summary, GLOB_OPTIONS)),
            Self::Prefix(prefix) => summary.starts_with(prefix.as_str()),
        }
    }
}

/// Translates a shell pattern into the syntax of the `glob` crate.
///
/// Returns `None` if the pattern is malformed.
fn translate_glob(pattern: &str) -> Option<String> {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                while chars.next_if_eq(&'*').is_some() {}
                out.push('*');
            }
            '?' => out.push('?'),
            '\\' => push_literal(&mut out, chars.next()?),
            '[' => out.push_str(&translate_class(&mut chars)?),
            _ => push_literal(&mut out, c),
        }
    }
    Some(out)
}

fn push_literal(out: &mut String, c: char) {
    if matches!(c, '*' | '?' | '[' | ']') {
        out.push('[');
        out.push(c);
        out.push(']');
    } else {
        out.push(c);
    }
}

fn class_char(chars: &mut Peekable<Chars<'_>>) -> Option<char> {
    match chars.next()? {
        '-' | ']' => None,
        '\\' => chars.next(),
        c => Some(c),
    }
}

/// Translates a class whose opening `[` was already consumed.
fn translate_class(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    let negated = chars.next_if_eq(&'^').is_some();
    let mut ranges = Vec::new();
    loop {
        if !ranges.is_empty() && chars.next_if_eq(&']').is_some() {
            break;
        }
        let lo = class_char(chars)?;
        let hi = if chars.next_if_eq(&'-').is_some() {
            class_char(chars)?
        } else {
            lo
        };
        ranges.push((lo, hi));
    }
    Some(write_class(negated, &ranges))
}

/// Writes a class the `glob` crate reads unambiguously.
///
/// That syntax has no escapes: `]` is literal only in first position, a
/// leading `!` negates, and `x-y` is always a range. Every range is written
/// as `lo-hi` and the three special characters are split out of them.
fn write_class(negated: bool, ranges: &[(char, char)]) -> String {
    let mut spans = Vec::new();
    let mut special = [false; 3];
    for &(lo, hi) in ranges {
        let mut lo = lo;
        for (i, (c, before, after)) in CLASS_SPECIAL.into_iter().enumerate() {
            if lo <= c && c <= hi {
                special[i] = true;
                if lo < c {
                    spans.push((lo, before));
                }
                lo = after;
            }
        }
        if lo <= hi {
            spans.push((lo, hi));
        }
    }
    let [bang, dash, bracket] = special;

    let mut body = String::new();
    if bracket {
        body.push(']');
    }
    for (lo, hi) in spans {
        body.push(lo);
        body.push('-');
        body.push(hi);
    }
    if bang {
        body.push_str("!-!");
    }
    if dash {
        body.push('-');
    }

    if body.is_empty() {
        // Only inverted ranges, which match nothing
        return if negated {
            "?".to_string()
        } else {
            "[!\u{0}-\u{10FFFF}]".to_string()
        };
    }
    if !negated && body.starts_with('!') {
        if !dash {
            return "!".to_string();
        }
        body = format!("-{}", body.trim_end_matches('-'));
    }

    if negated {
        format!("[!{body}]")
    } else {
        format!("[{body}]")
    }
}

/// Maps a summary to a category name when its matcher succeeds.
#[derive(Debug, Clone)]
pub struct Mapper {
    matcher: Matcher,
    category: String,
}

impl Mapper {
    pub fn new(pattern: &str, category: impl Into<String>) -> Result<Self, PatternError> {
        Ok(Self {
            matcher: Matcher::new(pattern)?,
            category: category.into(),
        })
    }

    /// Returns the category name, or `None` if the summary does not match.
    ///
    /// A mapper with an empty category name never assigns anything.
    pub fn map(&self, summary: &str) -> Option<&str> {
        (!self.category.is_empty() && self.matcher.matches(summary))
            .then_some(self.category.as_str())
    }
}
