use text_size::TextSize;

/// Byte cursor over the source text.
///
/// Tracks where the current token started so the tokenizer can cut ranges without
/// re-reading the text.
pub(crate) struct Cursor<'a> {
    text: &'a [u8],
    offset: usize,
    token_start: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a [u8], offset: usize) -> Self {
        let offset = offset.min(text.len());
        Self { text, offset, token_start: offset }
    }

    pub(crate) fn offset(&self) -> TextSize {
        TextSize::new(self.offset as u32)
    }

    pub(crate) fn token_start(&self) -> TextSize {
        TextSize::new(self.token_start as u32)
    }

    pub(crate) fn token_text(&self) -> &'a [u8] {
        &self.text[self.token_start..self.offset]
    }

    pub(crate) fn start_token(&mut self) {
        self.token_start = self.offset;
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.offset >= self.text.len()
    }

    pub(crate) fn first(&self) -> Option<u8> {
        self.text.get(self.offset).copied()
    }

    pub(crate) fn second(&self) -> Option<u8> {
        self.text.get(self.offset + 1).copied()
    }

    pub(crate) fn advance(&mut self) -> Option<u8> {
        let byte = self.first()?;
        self.offset += 1;
        Some(byte)
    }

    pub(crate) fn eat(&mut self, byte: u8) -> bool {
        if self.first() == Some(byte) {
            self.offset += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn advance_while(&mut self, f: impl Fn(u8) -> bool) {
        while let Some(byte) = self.first() {
            if !f(byte) {
                break;
            }
            self.offset += 1;
        }
    }

    /// `true` if the next bytes end the line: `\n` or `\r\n`.
    pub(crate) fn at_eol(&self) -> bool {
        match self.first() {
            Some(b'\n') => true,
            Some(b'\r') => self.second() == Some(b'\n'),
            _ => false,
        }
    }
}
