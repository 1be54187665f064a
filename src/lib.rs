//! linetint - rule-driven text decoration
//!
//! Documents are matched against configured rules by path; each rule's
//! patterns are scanned for capture groups, and each group is drawn with the
//! style bound to it. The [`decor::Controller`] keeps every visible document's
//! spans current and answers hover queries.

pub mod config;
pub mod decor;
pub mod document;
pub mod error;
pub mod render;

pub use config::{Configuration, LineSelector, Rule, Settings, StyleRef};
pub use decor::{Controller, DecorationHost, DocumentId, Position, Span, StyleHandle, TextDocument};
pub use document::MemoryDocument;
pub use error::{Result, TintError};
