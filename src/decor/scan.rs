//! Scan engine
//!
//! Turns a compiled pattern and its group bindings into styled spans over a
//! document, a set of lines, or a single line. Exhaustive rules re-scan each
//! line on a shrinking prefix so that matches hidden behind earlier ones are
//! also found.

use std::collections::{BTreeSet, HashSet};
use std::ops::Range;
use std::rc::Rc;

use tracing::warn;

use super::host::{StyleHandle, TextDocument};
use super::pattern::Matcher;
use super::span::Span;
use super::style::{GroupId, StyleRecord};

/// A style record together with the host handle it is drawn with
#[derive(Debug, PartialEq, Eq)]
pub struct BoundStyle {
    pub record: StyleRecord,
    pub handle: StyleHandle,
}

/// Capture group bindings of one pattern, in binding order
pub type GroupStyles = [(GroupId, Rc<BoundStyle>)];

/// One styled span produced by a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub span: Span,
    pub group: GroupId,
    pub style: Rc<BoundStyle>,
}

/// A line restriction, ready to evaluate
#[derive(Debug, Clone)]
pub enum LineFilter {
    /// Zero-based line
    Line(usize),
    /// Zero-based closed range
    Range(usize, usize),
    /// Lines whose text matches
    Pattern(Rc<Matcher>),
}

/// Which text a pattern is run against
#[derive(Debug, Clone)]
pub enum LineScope {
    /// The whole text as one buffer
    Document,
    /// The union of these filters, line by line
    Lines(Vec<LineFilter>),
}

/// Per-pattern scan settings
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub scope: LineScope,
    pub exhaustive: bool,
}

/// A styled group match: byte range within the scanned text and binding index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Hit {
    range: Range<usize>,
    binding: usize,
}

/// Scan a document with one pattern
pub fn scan<D>(document: &D, options: &ScanOptions, matcher: &Matcher, groups: &GroupStyles) -> Vec<Decoration>
where
    D: TextDocument + ?Sized,
{
    if groups.is_empty() {
        return Vec::new();
    }

    let lines: BTreeSet<usize> = match (&options.scope, options.exhaustive) {
        (LineScope::Document, false) => {
            let text = document.text();
            return match_text(matcher, &text, groups)
                .into_iter()
                .map(|hit| {
                    let span = Span::new(
                        document.offset_to_position(hit.range.start),
                        document.offset_to_position(hit.range.end),
                    );
                    decoration(span, hit.binding, groups)
                })
                .collect();
        }
        (LineScope::Document, true) => (0..document.line_count()).collect(),
        (LineScope::Lines(filters), _) => select_lines(document, filters),
    };

    let mut decorations = Vec::new();
    for idx in lines {
        if let Some(text) = document.line(idx) {
            decorations.extend(scan_line(idx, text, options.exhaustive, matcher, groups));
        }
    }
    decorations
}

/// Scan a single line; columns in the result are relative to `text`
pub fn scan_line(
    line: usize,
    text: &str,
    exhaustive: bool,
    matcher: &Matcher,
    groups: &GroupStyles,
) -> Vec<Decoration> {
    let hits = if exhaustive {
        match_exhaustive(matcher, text, groups)
    } else {
        match_text(matcher, text, groups)
    };

    hits.into_iter()
        .map(|hit| decoration(Span::on_line(line, hit.range.start, hit.range.end), hit.binding, groups))
        .collect()
}

/// Resolve line filters to ascending, distinct zero-based line indices
pub fn select_lines<D>(document: &D, filters: &[LineFilter]) -> BTreeSet<usize>
where
    D: TextDocument + ?Sized,
{
    let count = document.line_count();
    let mut lines = BTreeSet::new();
    if count == 0 {
        return lines;
    }

    for filter in filters {
        match filter {
            LineFilter::Line(line) => {
                if *line < count {
                    lines.insert(*line);
                }
            }
            LineFilter::Range(start, end) => {
                let end = (*end).min(count - 1);
                if *start <= end {
                    lines.extend(*start..=end);
                }
            }
            LineFilter::Pattern(selector) => {
                lines.extend(
                    (0..count).filter(|idx| document.line(*idx).is_some_and(|text| selector.is_match(text))),
                );
            }
        }
    }
    lines
}

fn decoration(span: Span, binding: usize, groups: &GroupStyles) -> Decoration {
    let (group, style) = &groups[binding];
    Decoration {
        span,
        group: group.clone(),
        style: Rc::clone(style),
    }
}

/// One left-to-right pass over `text`
///
/// Zero-length overall matches are discarded, as are zero-length groups.
fn match_text(matcher: &Matcher, text: &str, groups: &GroupStyles) -> Vec<Hit> {
    let mut hits = Vec::new();
    for captures in matcher.captures_iter(text) {
        let whole_empty = captures.get(0).map_or(true, |m| m.is_empty());
        if whole_empty {
            continue;
        }

        for (binding, (group, _)) in groups.iter().enumerate() {
            match Matcher::group_range(&captures, group) {
                Some(range) if !range.is_empty() => hits.push(Hit { range, binding }),
                _ => {}
            }
        }
    }
    hits
}

/// Repeated passes over a shrinking prefix of the line
///
/// After each pass the text is cut just before the frontier, the largest start
/// offset among every hit of that pass, seen before or not. Hits start inside
/// the current prefix, so the prefix strictly shrinks and the loop runs at
/// most `text.len()` times. Repeated hits are recorded once.
fn match_exhaustive(matcher: &Matcher, text: &str, groups: &GroupStyles) -> Vec<Hit> {
    let mut found: Vec<Hit> = Vec::new();
    let mut seen = HashSet::new();
    let mut end = text.len();
    let mut passes = 0;

    while end > 0 {
        if passes > text.len() {
            warn!(pattern = matcher.pattern(), "exhaustive scan did not converge");
            break;
        }
        passes += 1;

        let mut frontier = None;
        for hit in match_text(matcher, &text[..end], groups) {
            frontier = frontier.max(Some(hit.range.start));
            if seen.insert(hit.clone()) {
                found.push(hit);
            }
        }

        match frontier {
            Some(frontier) => end = frontier,
            None => break,
        }
    }

    found.sort_by_key(|hit| hit.range.start);
    found
}
