//! Source text plumbing: chunked input, size limits, and row/column positions.

use camino::{Utf8Path, Utf8PathBuf};
pub use line_index::{LineCol, LineIndex};
use text_size::TextSize;

/// Supplies the input in chunks.
///
/// Must be deterministic: asking twice for the same offset yields the same bytes.
pub trait TextSource {
    /// Returns bytes starting at `offset`. An empty chunk ends the input.
    fn chunk(&self, offset: usize) -> &[u8];
}

impl TextSource for [u8] {
    fn chunk(&self, offset: usize) -> &[u8] {
        self.get(offset..).unwrap_or_default()
    }
}

impl TextSource for Vec<u8> {
    fn chunk(&self, offset: usize) -> &[u8] {
        self.as_slice().chunk(offset)
    }
}

impl TextSource for str {
    fn chunk(&self, offset: usize) -> &[u8] {
        self.as_bytes().chunk(offset)
    }
}

impl TextSource for String {
    fn chunk(&self, offset: usize) -> &[u8] {
        self.as_bytes().chunk(offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("input of at least {len} bytes exceeds the limit of {limit} bytes")]
pub struct InputTooLarge {
    /// Bytes read before giving up.
    pub len: usize,
    pub limit: usize,
}

/// Reads the whole source, failing as soon as it grows past `limit`.
pub fn read_all(source: &dyn TextSource, limit: Option<usize>) -> Result<Vec<u8>, InputTooLarge> {
    let mut text = Vec::new();

    loop {
        let chunk = source.chunk(text.len());
        if chunk.is_empty() {
            return Ok(text);
        }

        text.extend_from_slice(chunk);
        if let Some(limit) = limit
            && text.len() > limit
        {
            return Err(InputTooLarge { len: text.len(), limit });
        }
    }
}

/// Zero-based row and byte column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub row: u32,
    pub column: u32,
}

impl Point {
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Position of `offset` in `text`. Only `\n` starts a new row.
    pub fn at(text: &[u8], offset: TextSize) -> Self {
        let offset = usize::from(offset).min(text.len());
        let before = &text[..offset];

        let row = before.iter().filter(|&&byte| byte == b'\n').count();
        let line_start = before.iter().rposition(|&byte| byte == b'\n').map_or(0, |it| it + 1);

        Self { row: row as u32, column: (offset - line_start) as u32 }
    }
}

/// A file loaded for parsing.
#[derive(Debug)]
pub struct SourceFile {
    path: Utf8PathBuf,
    text: Vec<u8>,
    line_index: Option<LineIndex>,
}

impl SourceFile {
    pub fn new(path: impl Into<Utf8PathBuf>, text: Vec<u8>) -> Self {
        let line_index = std::str::from_utf8(&text).ok().map(LineIndex::new);
        Self { path: path.into(), text, line_index }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// The text for display; invalid UTF-8 is replaced.
    pub fn display_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.text)
    }

    /// Present only for valid UTF-8 text.
    pub fn line_index(&self) -> Option<&LineIndex> {
        self.line_index.as_ref()
    }

    /// Line and UTF-8 column of `offset`, falling back to byte columns.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        match &self.line_index {
            Some(index) if offset <= TextSize::new(self.text.len() as u32) => {
                index.line_col(offset)
            }
            _ => {
                let point = Point::at(&self.text, offset);
                LineCol { line: point.row, col: point.column }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Chunks(Vec<&'static [u8]>);

    impl TextSource for Chunks {
        fn chunk(&self, offset: usize) -> &[u8] {
            let mut start = 0;
            for chunk in &self.0 {
                if offset < start + chunk.len() {
                    return &chunk[offset - start..];
                }
                start += chunk.len();
            }
            &[]
        }
    }

    #[test]
    fn reads_every_chunk() {
        let source = Chunks(vec![b"lda ", b"#1", b"\n"]);
        assert_eq!(read_all(&source, None).unwrap(), b"lda #1\n");
        assert_eq!(read_all(&source, Some(7)).unwrap(), b"lda #1\n");
        assert_eq!(read_all(&source, Some(5)), Err(InputTooLarge { len: 6, limit: 5 }));
        assert_eq!(read_all(&String::new(), Some(0)).unwrap(), b"");
    }

    #[test]
    fn points_count_bytes() {
        let text = b"nop\r\n  lda\n";
        assert_eq!(Point::at(text, TextSize::new(0)), Point::new(0, 0));
        assert_eq!(Point::at(text, TextSize::new(4)), Point::new(0, 4));
        assert_eq!(Point::at(text, TextSize::new(7)), Point::new(1, 2));
        assert_eq!(Point::at(text, TextSize::new(11)), Point::new(2, 0));
        assert_eq!(Point::at(text, TextSize::new(99)), Point::new(2, 0));
    }

    #[test]
    fn line_index_needs_utf8() {
        let file = SourceFile::new("a.s", b"nop\nlda".to_vec());
        assert!(file.line_index().is_some());
        assert_eq!(file.line_col(TextSize::new(5)), LineCol { line: 1, col: 1 });

        let file = SourceFile::new("b.s", b"\xff\nlda".to_vec());
        assert!(file.line_index().is_none());
        assert_eq!(file.line_col(TextSize::new(3)), LineCol { line: 1, col: 1 });
        assert_eq!(file.display_text(), "\u{fffd}\nlda");
    }
}
