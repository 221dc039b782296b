mod classes;
mod cursor;

pub use ca65_syntax::SyntaxKind;
use ca65_syntax::SyntaxKind::*;
use ca65_syntax::{Keyword, Language};
use classes::{
    is_binary_digit, is_hex_digit, is_ident_continue, is_ident_start, is_punct, is_whitespace,
};
use cursor::Cursor;
use text_size::{TextRange, TextSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub range: TextRange,
}

/// Everything the tokenizer needs to continue from an offset.
///
/// The only context is whether the last significant token ended a line: at the start
/// of a line `:` is an unnamed label, elsewhere `:+` and `:-` runs are references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LexState {
    at_line_start: bool,
}

impl Default for LexState {
    fn default() -> Self {
        Self::LINE_START
    }
}

impl LexState {
    pub const LINE_START: Self = Self { at_line_start: true };

    pub fn at_line_start(self) -> bool {
        self.at_line_start
    }
}

pub struct Tokenizer<'a> {
    language: &'a Language,
    cursor: Cursor<'a>,
    state: LexState,
}

impl<'a> Tokenizer<'a> {
    pub fn new(language: &'a Language, text: &'a [u8]) -> Self {
        Self::resume(language, text, TextSize::new(0), LexState::default())
    }

    /// Continues scanning at `offset` with a state saved by [`Tokenizer::state`].
    pub fn resume(
        language: &'a Language,
        text: &'a [u8],
        offset: TextSize,
        state: LexState,
    ) -> Self {
        Self { language, cursor: Cursor::new(text, offset.into()), state }
    }

    pub fn state(&self) -> LexState {
        self.state
    }

    /// Offset of the next byte to scan.
    pub fn offset(&self) -> TextSize {
        self.cursor.offset()
    }

    /// Scans the next token. At the end of input this keeps returning empty `EOF` tokens.
    pub fn next_token(&mut self) -> Token {
        self.cursor.start_token();

        let kind = match self.cursor.advance() {
            Some(byte) => self.kind(byte),
            None => EOF,
        };

        if !kind.is_trivia() && kind != EOF {
            self.state.at_line_start = kind == EOL;
        }

        Token { kind, range: TextRange::new(self.cursor.token_start(), self.cursor.offset()) }
    }

    fn kind(&mut self, byte: u8) -> SyntaxKind {
        match byte {
            b'\n' => EOL,
            b'\r' if self.cursor.eat(b'\n') => EOL,
            byte if is_whitespace(byte) => {
                while self.cursor.first().is_some_and(is_whitespace) && !self.cursor.at_eol() {
                    self.cursor.advance();
                }
                WHITESPACE
            }
            b';' => {
                self.skip_to_eol();
                COMMENT
            }
            b'\\' if self.cursor.at_eol() => {
                self.cursor.eat(b'\r');
                self.cursor.eat(b'\n');
                LINE_CONTINUATION
            }
            b'#' => HASH,
            b',' => COMMA,
            b'(' => LEFT_PAREN,
            b')' => RIGHT_PAREN,
            b'{' => LEFT_BRACE,
            b'}' => RIGHT_BRACE,
            b'[' => LEFT_BRACKET,
            b']' => RIGHT_BRACKET,
            b'=' => EQ,
            b'+' => PLUS,
            b'-' => MINUS,
            b'*' => STAR,
            b'/' => SLASH,
            b'~' => TILDE,
            b'!' => BANG,
            b'^' => CARET,
            b':' => self.colon(),
            b'&' if self.cursor.eat(b'&') => AMP2,
            b'&' => AMP,
            b'|' if self.cursor.eat(b'|') => PIPE2,
            b'|' => PIPE,
            b'<' if self.cursor.eat(b'<') => SHL,
            b'<' if self.cursor.eat(b'=') => LT_EQ,
            b'<' if self.cursor.eat(b'>') => LT_GT,
            b'<' => LT,
            b'>' if self.cursor.eat(b'>') => SHR,
            b'>' if self.cursor.eat(b'=') => GT_EQ,
            b'>' => GT,
            b'$' if self.cursor.first().is_some_and(is_hex_digit) => {
                self.cursor.advance_while(is_hex_digit);
                NUMBER
            }
            b'%' if self.cursor.first().is_some_and(is_binary_digit) => {
                self.cursor.advance_while(is_binary_digit);
                NUMBER
            }
            b'0'..=b'9' => {
                // Trailing-`h` hex and junk suffixes stay in one token.
                self.cursor.advance_while(is_ident_continue);
                NUMBER
            }
            b'\'' => self.char_literal(),
            b'"' => self.string_literal(),
            b'@' if self.cursor.first().is_some_and(is_ident_start) => {
                self.cursor.advance_while(is_ident_continue);
                LOCAL_IDENT
            }
            b'.' if self.cursor.first().is_some_and(is_ident_start) => {
                self.cursor.advance_while(is_ident_continue);
                self.language
                    .keyword(self.cursor.token_text())
                    .map_or(DOT_IDENT, Keyword::syntax_kind)
            }
            byte if is_ident_start(byte) => {
                self.cursor.advance_while(is_ident_continue);
                match self.language.keyword(self.cursor.token_text()) {
                    Some(keyword @ (Keyword::Mnemonic | Keyword::Register)) => {
                        keyword.syntax_kind()
                    }
                    _ => IDENT,
                }
            }
            _ => self.error_run(),
        }
    }

    fn colon(&mut self) -> SyntaxKind {
        if self.state.at_line_start {
            return COLON;
        }

        if self.cursor.eat(b':') {
            return COLON2;
        }
        if self.cursor.eat(b'=') {
            return COLON_EQ;
        }

        match self.cursor.first() {
            Some(sign @ (b'+' | b'-')) => {
                self.cursor.advance_while(|byte| byte == sign);
                UNNAMED_REF
            }
            _ => COLON,
        }
    }

    /// `'x'`. Anything else starting with a quote is an error up to the next quote or
    /// the end of the line.
    fn char_literal(&mut self) -> SyntaxKind {
        let closed = self.cursor.second() == Some(b'\'');
        if closed && !self.cursor.at_eol() && self.cursor.first() != Some(b'\n') {
            self.cursor.advance();
            self.cursor.advance();
            return CHAR;
        }

        while !self.cursor.is_eof() && !self.cursor.at_eol() {
            if self.cursor.advance() == Some(b'\'') {
                break;
            }
        }
        ERROR_TOKEN
    }

    /// Strings have no escapes and end at the line.
    fn string_literal(&mut self) -> SyntaxKind {
        loop {
            if self.cursor.is_eof() || self.cursor.at_eol() {
                return ERROR_TOKEN;
            }
            if self.cursor.advance() == Some(b'"') {
                return STRING;
            }
        }
    }

    fn skip_to_eol(&mut self) {
        while !self.cursor.is_eof() && !self.cursor.at_eol() {
            self.cursor.advance();
        }
    }

    /// Glues unrecognized bytes into one token, up to the next byte that starts a
    /// valid token.
    fn error_run(&mut self) -> SyntaxKind {
        while let Some(byte) = self.cursor.first() {
            if starts_token(byte, self.cursor.second()) {
                break;
            }
            self.cursor.advance();
        }
        ERROR_TOKEN
    }
}

fn starts_token(byte: u8, next: Option<u8>) -> bool {
    match byte {
        b'$' => next.is_some_and(is_hex_digit),
        b'%' => next.is_some_and(is_binary_digit),
        b'.' | b'@' => next.is_some_and(is_ident_start),
        b'\\' => matches!(next, Some(b'\n' | b'\r')),
        b'\n' | b';' | b'\'' | b'"' => true,
        _ => is_whitespace(byte) || is_punct(byte) || is_ident_continue(byte),
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        (token.kind != EOF).then_some(token)
    }
}
