//! Interfaces the engine consumes from its host
//!
//! The host owns the documents and the view; the engine only reads text and
//! hands back styled spans.

use std::borrow::Cow;
use std::path::Path;

use super::span::{Position, Span};
use super::style::StyleRecord;

/// Identifies an open document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(pub u64);

/// Opaque host resource representing one applied visual style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleHandle(pub u64);

/// Read access to a document's text
pub trait TextDocument {
    fn id(&self) -> DocumentId;

    /// File path of the document
    fn path(&self) -> &Path;

    /// Full text, line terminators included
    fn text(&self) -> Cow<'_, str>;

    fn line_count(&self) -> usize;

    /// Text of a line without its terminator
    fn line(&self, idx: usize) -> Option<&str>;

    /// Map a byte offset into [`TextDocument::text`] to a position
    fn offset_to_position(&self, offset: usize) -> Position;
}

/// Style allocation and span application on the host's view
pub trait DecorationHost {
    /// Allocate a handle for a style
    fn create_style(&mut self, record: &StyleRecord) -> StyleHandle;

    /// Release a handle; its spans have already been cleared
    fn dispose_style(&mut self, handle: StyleHandle);

    /// Replace every span drawn with `handle` in `document`
    fn set_spans(&mut self, document: DocumentId, handle: StyleHandle, spans: &[Span]);
}
