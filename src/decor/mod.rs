//! Decoration engine
//!
//! This module turns configured rules into styled spans:
//! - Pattern compilation and caching
//! - Style reference resolution and path filtering
//! - Scanning documents and lines for capture-group spans
//! - The per-document decoration index and the controller driving it

mod style;
mod span;
mod pattern;
mod resolve;
mod paths;
mod host;
mod scan;
mod index;
mod controller;

pub use style::{Color, GroupId, Style, StyleRecord};
pub use span::{Position, Span};
pub use pattern::{Matcher, PatternCache, PatternKey};
pub use resolve::resolve;
pub use paths::{applicable_rules, glob_for_entry, relative_path, PathFilter};
pub use host::{DecorationHost, DocumentId, StyleHandle, TextDocument};
pub use scan::{scan, scan_line, select_lines, BoundStyle, Decoration, GroupStyles, LineFilter, LineScope, ScanOptions};
pub use index::{DecorationIndex, SetSpans};
pub use controller::{Controller, HoverInfo, Phase};
