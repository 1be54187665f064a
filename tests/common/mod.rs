//! Shared test host

use std::collections::HashMap;

use linetint::decor::{DecorationHost, DocumentId, Span, StyleHandle, StyleRecord};

/// Host that records every call and checks handle discipline
#[derive(Debug, Default)]
pub struct RecordingHost {
    next: u64,
    /// Live handles and the record each was created from
    pub styles: Vec<(StyleHandle, StyleRecord)>,
    /// Spans currently drawn, per document and handle
    pub drawn: HashMap<(DocumentId, StyleHandle), Vec<Span>>,
    /// Number of `set_spans` calls
    pub set_calls: usize,
    /// Handles disposed while spans were still drawn with them
    pub leaked: Vec<StyleHandle>,
}

#[allow(dead_code)]
impl RecordingHost {
    /// Spans drawn in `document` with the style whose description matches
    pub fn spans_for(&self, document: DocumentId, description: &str) -> Vec<Span> {
        self.styles
            .iter()
            .filter(|(_, record)| record.description.as_deref() == Some(description))
            .flat_map(|(handle, _)| self.drawn.get(&(document, *handle)).cloned().unwrap_or_default())
            .collect()
    }

    /// Every span drawn in `document`
    pub fn all_spans(&self, document: DocumentId) -> Vec<Span> {
        let mut spans: Vec<Span> = self
            .drawn
            .iter()
            .filter(|((doc, _), _)| *doc == document)
            .flat_map(|(_, spans)| spans.iter().copied())
            .collect();
        spans.sort();
        spans
    }
}

impl DecorationHost for RecordingHost {
    fn create_style(&mut self, record: &StyleRecord) -> StyleHandle {
        self.next += 1;
        let handle = StyleHandle(self.next);
        self.styles.push((handle, record.clone()));
        handle
    }

    fn dispose_style(&mut self, handle: StyleHandle) {
        let still_drawn = self
            .drawn
            .iter()
            .any(|((_, drawn), spans)| *drawn == handle && !spans.is_empty());
        if still_drawn {
            self.leaked.push(handle);
        }
        self.styles.retain(|(live, _)| *live != handle);
        self.drawn.retain(|(_, drawn), _| *drawn != handle);
    }

    fn set_spans(&mut self, document: DocumentId, handle: StyleHandle, spans: &[Span]) {
        self.set_calls += 1;
        self.drawn.insert((document, handle), spans.to_vec());
    }
}
