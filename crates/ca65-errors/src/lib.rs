use std::fmt::Display;

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
pub use text_size::{TextRange, TextSize};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    message: String,
    range: TextRange,
}

impl Diagnostic {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn error(message: impl Into<String>, range: TextRange) -> Self {
        Self { message: message.into(), range }
    }

    /// Moves the diagnostic along with a subtree that moved from `from` to `to`.
    #[must_use]
    pub fn moved(mut self, from: TextSize, to: TextSize) -> Self {
        self.range = TextRange::at(self.range.start() - from + to, self.range.len());
        self
    }

    pub fn render<'a>(
        &'a self,
        renderer: &'a Renderer,
        path: &'a str,
        text: &'a str,
    ) -> impl Display + 'a {
        let message = Level::Error.title(&self.message).snippet(
            Snippet::source(text)
                .origin(path)
                .annotation(Level::Error.span(snap(text, self.range)).label("here"))
                .fold(true),
        );
        renderer.render(message)
    }
}

/// Keeps the span inside `text` and on character boundaries; the text may be a lossy
/// decoding of the bytes the range was computed for.
fn snap(text: &str, range: TextRange) -> std::ops::Range<usize> {
    let floor = |mut offset: usize| {
        offset = offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    };

    floor(range.start().into())..floor(range.end().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::new(start), TextSize::new(end))
    }

    #[test]
    fn renders_plain() {
        let text = "lda $$\n";
        let diagnostic = Diagnostic::error("expected expression", range(4, 6));
        let rendered = diagnostic.render(&Renderer::plain(), "test.s", text).to_string();

        assert!(rendered.contains("error: expected expression"), "{rendered}");
        assert!(rendered.contains("test.s:1:5"), "{rendered}");
        assert!(rendered.contains("^^ here"), "{rendered}");
    }

    #[test]
    fn moves_with_subtree() {
        let diagnostic = Diagnostic::error("x", range(10, 12));
        let back = diagnostic.clone().moved(TextSize::new(8), TextSize::new(3));
        assert_eq!(back.range(), range(5, 7));
        assert_eq!(diagnostic.moved(TextSize::new(8), TextSize::new(20)).range(), range(22, 24));
    }

    #[test]
    fn spans_snap_to_text() {
        assert_eq!(snap("é", range(1, 9)), 0..2);
        assert_eq!(snap("abc", range(1, 2)), 1..2);
    }
}
