//! Terminal view
//!
//! [`TerminalView`] is the host side of the engine for the command-line tool:
//! it hands out style handles, remembers the spans drawn with them, and prints
//! documents with those spans rendered as ANSI styles.

use std::collections::HashMap;
use std::io::Write;

use crossterm::queue;
use crossterm::style::{Attribute, Color as TermColor, ContentStyle, Print, PrintStyledContent};
use unicode_width::UnicodeWidthStr;

use crate::decor::{Color, DecorationHost, DocumentId, Span, Style, StyleHandle, StyleRecord, TextDocument};
use crate::error::Result;

/// Style handles and spans as the terminal will draw them
#[derive(Debug, Default)]
pub struct TerminalView {
    next_handle: u64,
    /// Live styles in creation order; later ones paint over earlier ones
    styles: Vec<(StyleHandle, Style)>,
    spans: HashMap<(DocumentId, StyleHandle), Vec<Span>>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live style handles
    pub fn style_count(&self) -> usize {
        self.styles.len()
    }

    /// Spans currently drawn with `handle` in `document`
    pub fn spans(&self, document: DocumentId, handle: StyleHandle) -> &[Span] {
        self.spans
            .get(&(document, handle))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resolve the style of every byte of a line
    fn line_styles(&self, document: DocumentId, line: usize, len: usize) -> Vec<Option<Style>> {
        let mut styles = vec![None; len];
        for (handle, style) in &self.styles {
            for span in self.spans(document, *handle) {
                if let Some((start, end)) = span_on_line(span, line, len) {
                    styles[start..end].fill(Some(*style));
                }
            }
        }
        styles
    }

    /// Print a document with its decorations
    pub fn render_document<D, W>(&self, document: &D, out: &mut W) -> Result<()>
    where
        D: TextDocument + ?Sized,
        W: Write,
    {
        for idx in 0..document.line_count() {
            let text = document.line(idx).unwrap_or("");
            let styles = self.line_styles(document.id(), idx, text.len());

            let mut start = 0;
            while start < text.len() {
                let style = styles[start];
                let end = (start..text.len())
                    .find(|pos| styles[*pos] != style)
                    .unwrap_or(text.len());
                let segment = &text[start..end];
                match style {
                    Some(style) => queue!(out, PrintStyledContent(content_style(&style).apply(segment)))?,
                    None => queue!(out, Print(segment))?,
                }
                start = end;
            }
            queue!(out, Print("\n"))?;
        }
        out.flush()?;
        Ok(())
    }
}

impl DecorationHost for TerminalView {
    fn create_style(&mut self, record: &StyleRecord) -> StyleHandle {
        self.next_handle += 1;
        let handle = StyleHandle(self.next_handle);
        self.styles.push((handle, record.style));
        handle
    }

    fn dispose_style(&mut self, handle: StyleHandle) {
        self.styles.retain(|(live, _)| *live != handle);
        self.spans.retain(|(_, live), _| *live != handle);
    }

    fn set_spans(&mut self, document: DocumentId, handle: StyleHandle, spans: &[Span]) {
        if spans.is_empty() {
            self.spans.remove(&(document, handle));
        } else {
            self.spans.insert((document, handle), spans.to_vec());
        }
    }
}

/// Byte columns a span covers on `line`, if any
fn span_on_line(span: &Span, line: usize, len: usize) -> Option<(usize, usize)> {
    if line < span.start.line || line > span.end.line {
        return None;
    }
    let start = if line == span.start.line { span.start.column } else { 0 };
    let end = if line == span.end.line { span.end.column } else { len };
    let (start, end) = (start.min(len), end.min(len));
    (start < end).then_some((start, end))
}

/// Caret marker under the part of `text` a span covers, by display width
pub fn caret_line(text: &str, span: &Span, line: usize) -> Option<String> {
    let (start, end) = span_on_line(span, line, text.len())?;
    let indent = text.get(..start).map_or(0, UnicodeWidthStr::width);
    let width = text.get(start..end).map_or(1, UnicodeWidthStr::width).max(1);
    Some(format!("{}{}", " ".repeat(indent), "^".repeat(width)))
}

fn term_color(color: Color) -> Option<TermColor> {
    match color {
        Color::Default => None,
        Color::Black => Some(TermColor::Black),
        Color::Red => Some(TermColor::DarkRed),
        Color::Green => Some(TermColor::DarkGreen),
        Color::Yellow => Some(TermColor::DarkYellow),
        Color::Blue => Some(TermColor::DarkBlue),
        Color::Magenta => Some(TermColor::DarkMagenta),
        Color::Cyan => Some(TermColor::DarkCyan),
        Color::White => Some(TermColor::Grey),
        Color::BrightBlack => Some(TermColor::DarkGrey),
        Color::BrightRed => Some(TermColor::Red),
        Color::BrightGreen => Some(TermColor::Green),
        Color::BrightYellow => Some(TermColor::Yellow),
        Color::BrightBlue => Some(TermColor::Blue),
        Color::BrightMagenta => Some(TermColor::Magenta),
        Color::BrightCyan => Some(TermColor::Cyan),
        Color::BrightWhite => Some(TermColor::White),
        Color::Rgb(r, g, b) => Some(TermColor::Rgb { r, g, b }),
    }
}

fn content_style(style: &Style) -> ContentStyle {
    let mut content = ContentStyle::new();
    content.foreground_color = term_color(style.fg);
    content.background_color = term_color(style.bg);
    if style.bold {
        content.attributes.set(Attribute::Bold);
    }
    if style.italic {
        content.attributes.set(Attribute::Italic);
    }
    if style.underline {
        content.attributes.set(Attribute::Underlined);
    }
    if style.reverse {
        content.attributes.set(Attribute::Reverse);
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decor::Position;
    use crate::document::MemoryDocument;

    fn render(view: &TerminalView, doc: &MemoryDocument) -> String {
        let mut out = Vec::new();
        view.render_document(doc, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_plain_render() {
        let view = TerminalView::new();
        let doc = MemoryDocument::new(DocumentId(1), "a.txt", "one\ntwo");
        assert_eq!(render(&view, &doc), "one\ntwo\n");
    }

    #[test]
    fn test_styled_render() {
        let mut view = TerminalView::new();
        let doc = MemoryDocument::new(DocumentId(1), "a.log", "ERROR: disk full");
        let handle = view.create_style(&StyleRecord::new(Style::fg(Color::Red).with_bold()));
        view.set_spans(doc.id(), handle, &[Span::on_line(0, 7, 16)]);

        let output = render(&view, &doc);
        assert!(output.starts_with("ERROR: \x1b["));
        assert!(output.contains("disk full"));
        assert!(output.ends_with('\n'));
    }

    #[test]
    fn test_dispose_forgets_spans() {
        let mut view = TerminalView::new();
        let doc = MemoryDocument::new(DocumentId(1), "a.log", "abc");
        let handle = view.create_style(&StyleRecord::new(Style::fg(Color::Green)));
        view.set_spans(doc.id(), handle, &[Span::on_line(0, 0, 1)]);
        assert_eq!(view.style_count(), 1);

        view.dispose_style(handle);
        assert_eq!(view.style_count(), 0);
        assert!(view.spans(doc.id(), handle).is_empty());
        assert_eq!(render(&view, &doc), "abc\n");
    }

    #[test]
    fn test_span_on_line() {
        let span = Span::new(Position::new(1, 4), Position::new(3, 2));
        assert_eq!(span_on_line(&span, 0, 10), None);
        assert_eq!(span_on_line(&span, 1, 10), Some((4, 10)));
        assert_eq!(span_on_line(&span, 2, 6), Some((0, 6)));
        assert_eq!(span_on_line(&span, 3, 10), Some((0, 2)));
        assert_eq!(span_on_line(&span, 1, 3), None);
    }

    #[test]
    fn test_caret_line_uses_display_width() {
        let text = "日本 ok";
        let span = Span::on_line(0, 7, 9);
        assert_eq!(caret_line(text, &span, 0).as_deref(), Some("     ^^"));
    }
}
