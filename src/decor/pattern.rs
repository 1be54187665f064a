//! Pattern compilation and caching
//!
//! Every consumer needs capture-group offsets, not just a yes/no answer, so
//! [`Matcher`] exposes captures rather than `is_match` alone.

use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::rc::Rc;

use regex::{Captures, CaptureMatches, Regex, RegexBuilder};
use tracing::{trace, warn};

use super::style::GroupId;
use crate::error::{Result, TintError};

/// Cache key: pattern text plus the flags it was compiled with
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatternKey {
    pub pattern: String,
    pub case_sensitive: bool,
    pub multiline: bool,
}

/// A compiled pattern
#[derive(Debug)]
pub struct Matcher {
    key: PatternKey,
    regex: Regex,
}

impl Matcher {
    /// Compile a pattern
    ///
    /// `multiline` makes `^` and `$` match at line boundaries (CRLF aware),
    /// which is what whole-document scans need.
    pub fn compile(pattern: &str, case_sensitive: bool, multiline: bool) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(!case_sensitive)
            .multi_line(multiline)
            .crlf(multiline)
            .build()
            .map_err(|source| TintError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self {
            key: PatternKey {
                pattern: pattern.to_string(),
                case_sensitive,
                multiline,
            },
            regex,
        })
    }

    /// Source text of the pattern
    pub fn pattern(&self) -> &str {
        &self.key.pattern
    }

    /// Check whether the pattern matches anywhere in text
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Iterate over successive non-overlapping matches
    pub fn captures_iter<'r, 't>(&'r self, text: &'t str) -> CaptureMatches<'r, 't> {
        self.regex.captures_iter(text)
    }

    /// Byte range of a group within a match, if it participated
    pub fn group_range(captures: &Captures<'_>, group: &GroupId) -> Option<Range<usize>> {
        let m = match group {
            GroupId::Index(idx) => captures.get(*idx),
            GroupId::Name(name) => captures.name(name),
        };
        m.map(|m| m.range())
    }
}

/// Compiled patterns, memoized by [`PatternKey`]
///
/// Lives as long as the controller that owns it; a key is never compiled twice.
/// Keys that failed to compile are remembered too, so each bad pattern is
/// reported once.
#[derive(Debug, Default)]
pub struct PatternCache {
    matchers: HashMap<PatternKey, Rc<Matcher>>,
    failed: HashSet<PatternKey>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached matcher for this key, compiling it on first use
    ///
    /// `None` means the pattern does not compile; the error is logged the
    /// first time only.
    pub fn get_or_compile(&mut self, pattern: &str, case_sensitive: bool, multiline: bool) -> Option<Rc<Matcher>> {
        let key = PatternKey {
            pattern: pattern.to_string(),
            case_sensitive,
            multiline,
        };
        if let Some(matcher) = self.matchers.get(&key) {
            return Some(Rc::clone(matcher));
        }
        if self.failed.contains(&key) {
            trace!(pattern, "pattern known not to compile");
            return None;
        }

        match Matcher::compile(pattern, case_sensitive, multiline) {
            Ok(matcher) => {
                let matcher = Rc::new(matcher);
                trace!(pattern, case_sensitive, multiline, "compiled pattern");
                self.matchers.insert(key, Rc::clone(&matcher));
                Some(matcher)
            }
            Err(err) => {
                warn!(error = %err, "skipping pattern");
                self.failed.insert(key);
                None
            }
        }
    }

    /// Number of cached matchers
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// Number of distinct keys that failed to compile
    pub fn failures(&self) -> usize {
        self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}
