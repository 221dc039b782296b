use ca65_syntax::SyntaxKind;
use text_size::{TextRange, TextSize};

use crate::QueryError;
use crate::lexer::{Token, TokenKind, lex};

/// Patterns nested deeper than this are rejected instead of recursing further.
const MAX_DEPTH: usize = 64;

#[derive(Debug)]
pub(crate) struct Pattern {
    pub(crate) matcher: Matcher,
    pub(crate) children: Vec<Pattern>,
    pub(crate) capture: Option<u32>,
}

#[derive(Debug)]
pub(crate) enum Matcher {
    Kind(SyntaxKind),
    /// `(_)` accepts named elements only, a bare `_` anything significant.
    Any { named: bool },
    /// Token text, compared ignoring ASCII case.
    Text(Box<str>),
}

pub(crate) struct Compiled {
    pub(crate) patterns: Vec<Pattern>,
    pub(crate) capture_names: Vec<String>,
}

pub(crate) fn compile(source: &str) -> Result<Compiled, QueryError> {
    let mut parser = PatternParser {
        source,
        tokens: lex(source),
        pos: 0,
        capture_names: Vec::new(),
    };

    let mut patterns = Vec::new();
    while parser.peek().is_some() {
        patterns.push(parser.pattern(0)?);
    }

    Ok(Compiled { patterns, capture_names: parser.capture_names })
}

struct PatternParser<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    pos: usize,
    capture_names: Vec<String>,
}

impl<'s> PatternParser<'s> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Result<Token, QueryError> {
        let token = self.peek().ok_or_else(|| self.unexpected_end())?;
        self.pos += 1;
        Ok(token)
    }

    fn unexpected_end(&self) -> QueryError {
        QueryError::UnexpectedEnd { range: TextRange::empty(TextSize::of(self.source)) }
    }

    fn text(&self, token: Token) -> &'s str {
        &self.source[token.range]
    }

    fn unexpected(&self, token: Token) -> QueryError {
        QueryError::Unexpected { text: self.text(token).to_owned(), range: token.range }
    }

    fn pattern(&mut self, depth: usize) -> Result<Pattern, QueryError> {
        let token = self.bump()?;
        let mut pattern = match token.kind {
            TokenKind::LeftParen => {
                if depth > MAX_DEPTH {
                    return Err(QueryError::TooDeep { limit: MAX_DEPTH, range: token.range });
                }
                self.node(token, depth)?
            }
            TokenKind::Underscore => Pattern {
                matcher: Matcher::Any { named: false },
                children: Vec::new(),
                capture: None,
            },
            TokenKind::Text => {
                let text = self.text(token);
                let text = &text[1..text.len() - 1];
                Pattern { matcher: Matcher::Text(text.into()), children: Vec::new(), capture: None }
            }
            _ => return Err(self.unexpected(token)),
        };

        if let Some(token) = self.peek()
            && token.kind == TokenKind::Capture
        {
            self.pos += 1;
            let name = &self.text(token)[1..];
            pattern.capture = Some(self.intern(name));
        }

        Ok(pattern)
    }

    /// `(kind child*)` after the opening parenthesis.
    fn node(&mut self, open: Token, depth: usize) -> Result<Pattern, QueryError> {
        let head = self.bump()?;
        let matcher = match head.kind {
            TokenKind::Underscore => Matcher::Any { named: true },
            TokenKind::Name => {
                let name = self.text(head);
                let kind = SyntaxKind::from_name(name).ok_or_else(|| QueryError::UnknownKind {
                    name: name.to_owned(),
                    range: head.range,
                })?;
                Matcher::Kind(kind)
            }
            _ => return Err(self.unexpected(head)),
        };

        let mut children = Vec::new();
        loop {
            match self.peek() {
                None => return Err(QueryError::Unclosed { range: open.range }),
                Some(token) if token.kind == TokenKind::RightParen => {
                    self.pos += 1;
                    break;
                }
                Some(_) => children.push(self.pattern(depth + 1)?),
            }
        }

        Ok(Pattern { matcher, children, capture: None })
    }

    fn intern(&mut self, name: &str) -> u32 {
        let index = match self.capture_names.iter().position(|it| it == name) {
            Some(index) => index,
            None => {
                self.capture_names.push(name.to_owned());
                self.capture_names.len() - 1
            }
        };
        index as u32
    }
}
