//! Decoration index
//!
//! Holds the decorations of one document's latest scan pass in two shapes:
//! grouped by style handle for applying to the view, and as an ordered list for
//! position lookups. Both are derived from the same entries, which are only
//! ever replaced wholesale.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use super::host::StyleHandle;
use super::scan::Decoration;
use super::span::{Position, Span};

/// Replace all spans drawn with one style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetSpans {
    pub handle: StyleHandle,
    pub spans: Vec<Span>,
}

/// Decorations of one document, in rule, pattern, then match order
#[derive(Debug, Default)]
pub struct DecorationIndex {
    entries: Vec<Decoration>,
}

impl DecorationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole index with a new scan pass
    pub fn rebuild(&mut self, decorations: Vec<Decoration>) {
        self.entries.clear();
        self.entries
            .extend(decorations.into_iter().filter(|decoration| !decoration.span.is_empty()));
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decoration> {
        self.entries.iter()
    }

    /// One instruction per handle, in the order given
    ///
    /// Handles without decorations get an empty span list so stale visuals
    /// are cleared.
    pub fn instructions(&self, handles: &[StyleHandle]) -> Vec<SetSpans> {
        let mut grouped: HashMap<StyleHandle, Vec<Span>> = HashMap::new();
        for decoration in &self.entries {
            grouped
                .entry(decoration.style.handle)
                .or_default()
                .push(decoration.span);
        }

        handles
            .iter()
            .map(|handle| SetSpans {
                handle: *handle,
                spans: grouped.remove(handle).unwrap_or_default(),
            })
            .collect()
    }

    /// First decoration containing `pos`, giving up as soon as `cancel` is set
    pub fn lookup(&self, pos: Position, cancel: &AtomicBool) -> Option<&Decoration> {
        for decoration in &self.entries {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            if decoration.span.contains(pos) {
                return Some(decoration);
            }
        }
        None
    }
}
