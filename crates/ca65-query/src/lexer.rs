//! Tokens of the pattern language.
//!
//! Runs of bytes no rule accepts are coalesced into one `Garbage` token, so a typo
//! produces one error instead of one per character.

use logos::Logos;
use text_size::{TextRange, TextSize};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[token("_")]
    Underscore,

    /// `@name`
    #[regex(r"@[A-Za-z_][A-Za-z0-9_.\-]*")]
    Capture,

    /// A kind name such as `instruction`.
    #[regex(r"[A-Za-z][A-Za-z0-9_]*")]
    Name,

    /// `"lda"`, matched against token text.
    #[regex(r#""[^"\n]*""#)]
    Text,

    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r";[^\n]*", allow_greedy = true)]
    Comment,

    Garbage,
}

impl TokenKind {
    fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) range: TextRange,
}

fn range(span: std::ops::Range<usize>) -> TextRange {
    TextRange::new(TextSize::new(span.start as u32), TextSize::new(span.end as u32))
}

/// Significant tokens of `source`; trivia are dropped.
pub(crate) fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);
    let mut error_start: Option<usize> = None;

    while let Some(result) = lexer.next() {
        match result {
            Ok(kind) => {
                if let Some(start) = error_start.take() {
                    let end = lexer.span().start;
                    tokens.push(Token { kind: TokenKind::Garbage, range: range(start..end) });
                }
                if !kind.is_trivia() {
                    tokens.push(Token { kind, range: range(lexer.span()) });
                }
            }
            Err(()) => {
                error_start.get_or_insert(lexer.span().start);
            }
        }
    }

    if let Some(start) = error_start {
        tokens.push(Token { kind: TokenKind::Garbage, range: range(start..source.len()) });
    }
    tokens
}

#[cfg(test)]
mod tests {
    use std::fmt::Write as _;

    use expect_test::expect;

    use super::*;

    fn dump(source: &str) -> String {
        let mut buf = String::new();
        for token in lex(source) {
            _ = writeln!(buf, "{:?} {:?}", token.kind, &source[token.range]);
        }
        buf
    }

    #[test]
    fn pattern_tokens() {
        expect![[r#"
            LeftParen "("
            Name "instruction"
            Text "\"lda\""
            LeftParen "("
            Underscore "_"
            RightParen ")"
            Capture "@operand"
            RightParen ")"
        "#]]
        .assert_eq(&dump("(instruction \"lda\" (_) @operand) ; trailing comment\n"));
    }

    #[test]
    fn garbage_is_coalesced() {
        expect![[r##"
            LeftParen "("
            Garbage "#$%"
            Name "line"
            Garbage "@"
        "##]]
        .assert_eq(&dump("( #$%line @"));
    }
}
