use std::collections::VecDeque;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};

use ca65_errors::Diagnostic;
use ca65_syntax::SyntaxKind::{self, *};
use ca65_syntax::{Builder, Directive, GreenNode, Language, SyntaxSet};
use ca65_tokenizer::{LexState, Token, Tokenizer};
use drop_bomb::DropBomb;
use text_size::{TextRange, TextSize};

use crate::incremental::Reuse;

pub(crate) struct Parser<'a> {
    language: &'a Language,
    text: &'a [u8],
    tokenizer: Tokenizer<'a>,
    /// Scanned but not yet consumed tokens, trivia included. An `EOF` token, once
    /// scanned, stays at the back.
    lookahead: VecDeque<Token>,
    at_line_start: bool,
    last_end: TextSize,
    events: Vec<Event>,
    diagnostics: Vec<Diagnostic>,
    cancellation: Option<&'a AtomicBool>,
    cancelled: bool,
    reuse: Option<Reuse>,
}

pub(crate) struct Output {
    pub(crate) green: GreenNode,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) cancelled: bool,
    pub(crate) fresh_tokens: usize,
    pub(crate) reuse: Option<Reuse>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(
        language: &'a Language,
        text: &'a [u8],
        cancellation: Option<&'a AtomicBool>,
        reuse: Option<Reuse>,
    ) -> Self {
        Self {
            language,
            text,
            tokenizer: Tokenizer::new(language, text),
            lookahead: VecDeque::new(),
            at_line_start: true,
            last_end: TextSize::new(0),
            events: Vec::new(),
            diagnostics: Vec::new(),
            cancellation,
            cancelled: false,
            reuse,
        }
    }

    fn is_cancelled(&mut self) -> bool {
        if !self.cancelled {
            self.cancelled = self.cancellation.is_some_and(|flag| flag.load(Ordering::Relaxed));
        }
        self.cancelled
    }

    /// Scans one more token. A cancelled parse sees the end of input right here.
    fn pull(&mut self) -> Token {
        if self.is_cancelled() {
            return Token { kind: EOF, range: TextRange::empty(self.tokenizer.offset()) };
        }
        self.tokenizer.next_token()
    }

    /// The `n`-th significant token ahead, or `EOF`.
    pub(crate) fn nth(&mut self, n: usize) -> Token {
        let mut seen = 0;
        let mut index = 0;

        loop {
            if index == self.lookahead.len() {
                let token = self.pull();
                self.lookahead.push_back(token);
            }

            let token = self.lookahead[index];
            if token.kind == EOF {
                return token;
            }
            if !token.kind.is_trivia() {
                if seen == n {
                    return token;
                }
                seen += 1;
            }
            index += 1;
        }
    }

    /// Significant kinds from here through the end of the line, `EOL` or `EOF` last.
    pub(crate) fn rest_of_line(&mut self) -> Vec<SyntaxKind> {
        let mut kinds = Vec::new();
        let mut index = 0;

        loop {
            if index == self.lookahead.len() {
                let token = self.pull();
                self.lookahead.push_back(token);
            }

            let kind = self.lookahead[index].kind;
            if !kind.is_trivia() {
                kinds.push(kind);
            }
            if matches!(kind, EOL | EOF) {
                return kinds;
            }
            index += 1;
        }
    }

    pub(crate) fn nth_kind(&mut self, n: usize) -> SyntaxKind {
        self.nth(n).kind
    }

    pub(crate) fn peek_kind(&mut self) -> SyntaxKind {
        self.nth_kind(0)
    }

    pub(crate) fn nth_text(&mut self, n: usize) -> &'a [u8] {
        let range = self.nth(n).range;
        let text: &'a [u8] = self.text;
        &text[Range::<usize>::from(range)]
    }

    pub(crate) fn nth_directive(&mut self, n: usize) -> Option<Directive> {
        if self.nth_kind(n) != DIRECTIVE_KW {
            return None;
        }
        let word = self.nth_text(n);
        self.language.directive(word)
    }

    pub(crate) fn at(&mut self, kind: SyntaxKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn at_set(&mut self, set: SyntaxSet) -> bool {
        let kind = self.peek_kind();
        set.contains(kind)
    }

    pub(crate) fn at_line_end(&mut self) -> bool {
        matches!(self.peek_kind(), EOL | EOF)
    }

    /// Nothing is left to consume, not even trivia.
    pub(crate) fn at_end(&mut self) -> bool {
        self.nth(0);
        self.lookahead.front().is_some_and(|token| token.kind == EOF)
    }

    /// Offset of the first unconsumed byte.
    fn offset(&self) -> TextSize {
        self.lookahead.front().map_or_else(|| self.tokenizer.offset(), |token| token.range.start())
    }

    pub(crate) fn bump(&mut self) {
        if self.peek_kind() == EOF {
            return;
        }

        self.flush_trivia();
        if let Some(token) = self.lookahead.pop_front() {
            self.push_token(token);
        }
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if !self.at(kind) {
            return false;
        }
        self.bump();
        true
    }

    pub(crate) fn expect(&mut self, kind: SyntaxKind, message: &str) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error(message);
        false
    }

    /// Hands pending trivia to the builder, which decides where they land.
    pub(crate) fn flush_trivia(&mut self) {
        while let Some(&token) = self.lookahead.front() {
            if !token.kind.is_trivia() {
                break;
            }
            self.lookahead.pop_front();
            self.push_token(token);
        }
    }

    fn push_token(&mut self, token: Token) {
        if !token.kind.is_trivia() {
            self.at_line_start = token.kind == EOL;
            self.last_end = token.range.end();
        }
        self.events.push(Event::Token { kind: token.kind, len: token.range.len() });
    }

    /// Opens a node at the next significant token.
    pub(crate) fn start(&mut self) -> Marker {
        self.nth(0);
        self.flush_trivia();
        self.push_start()
    }

    fn push_start(&mut self) -> Marker {
        let pos = self.events.len() as u32;
        self.events.push(Event::TOMBSTONE);
        Marker::new(pos)
    }

    pub(crate) fn error(&mut self, message: impl Into<String>) {
        let range = self.nth(0).range;
        self.error_at(message, range);
    }

    pub(crate) fn error_at(&mut self, message: impl Into<String>, range: TextRange) {
        self.diagnostics.push(Diagnostic::error(message, range));
    }

    /// Wraps tokens into an `ERROR` node until a token from `stop` or the end of the
    /// line. Consumes at least one token unless the line is already over.
    pub(crate) fn err_recover(&mut self, message: impl Into<String>, stop: SyntaxSet) {
        if self.at_line_end() {
            self.error(message);
            return;
        }

        let start = self.nth(0).range.start();
        let m = self.start();
        loop {
            self.bump();
            if self.at_line_end() || self.at_set(stop) {
                break;
            }
        }
        m.complete(self, ERROR);
        self.error_at(message, TextRange::new(start, self.last_end));
    }

    /// Splices an unchanged subtree of the previous tree in at the current offset.
    ///
    /// Only called between top-level lines, so the scanner can restart after the
    /// subtree with a fresh line-start state.
    pub(crate) fn try_reuse(&mut self) -> bool {
        if self.reuse.is_none() || !self.at_line_start || self.is_cancelled() {
            return false;
        }

        let offset = self.offset();
        let text_len = TextSize::new(self.text.len() as u32);
        let Some(candidate) = self.reuse.as_mut().and_then(|reuse| reuse.take(offset, text_len))
        else {
            return false;
        };

        let end = offset + candidate.node.text_len();
        log::trace!("reusing {:?} at {:?}", candidate.node.kind(), TextRange::new(offset, end));

        self.lookahead.clear();
        self.tokenizer = Tokenizer::resume(self.language, self.text, end, LexState::default());
        self.last_end = end;
        self.diagnostics.extend(
            candidate.diagnostics.into_iter().map(|diag| diag.moved(candidate.old_start, offset)),
        );
        self.events.push(Event::Reused(candidate.node));
        true
    }

    pub(crate) fn finish(mut self) -> Output {
        self.flush_trivia();

        let Parser { mut events, mut diagnostics, cancelled, reuse, .. } = self;
        let mut builder = Builder::new();
        let mut forward_parents = Vec::new();
        let mut fresh_tokens = 0;

        builder.start_node(SOURCE_FILE);
        for i in 0..events.len() {
            match std::mem::replace(&mut events[i], Event::TOMBSTONE) {
                Event::Start { kind, forward_parent } => {
                    if kind == TOMBSTONE {
                        continue;
                    }

                    forward_parents.push(kind);
                    let mut idx = i;
                    let mut fp = forward_parent;
                    while let Some(fwd) = fp {
                        idx += fwd as usize;

                        fp = match std::mem::replace(&mut events[idx], Event::TOMBSTONE) {
                            Event::Start { kind, forward_parent } => {
                                if kind != TOMBSTONE {
                                    forward_parents.push(kind);
                                }
                                forward_parent
                            }
                            _ => unreachable!(),
                        };
                    }

                    for kind in forward_parents.drain(..).rev() {
                        builder.start_node(kind);
                    }
                }
                Event::Finish => builder.finish_node(),
                Event::Token { kind, len } => {
                    fresh_tokens += 1;
                    builder.token(kind, len);
                }
                Event::Reused(node) => builder.reuse_node(node),
            }
        }
        builder.finish_node();

        diagnostics.sort_by_key(|diag| diag.range().start());
        Output { green: builder.finish(), diagnostics, cancelled, fresh_tokens, reuse }
    }
}

enum Event {
    Start { kind: SyntaxKind, forward_parent: Option<u32> },
    Token { kind: SyntaxKind, len: TextSize },
    Finish,
    Reused(GreenNode),
}

impl Event {
    const TOMBSTONE: Self = Event::Start { kind: TOMBSTONE, forward_parent: None };
}

pub(crate) struct Marker {
    position: u32,
    bomb: DropBomb,
}

impl Marker {
    fn new(pos: u32) -> Marker {
        Marker {
            position: pos,
            bomb: DropBomb::new("Marker must be completed"),
        }
    }

    pub(crate) fn complete(mut self, p: &mut Parser<'_>, kind: SyntaxKind) -> CompletedMarker {
        self.bomb.defuse();

        match &mut p.events[self.position as usize] {
            Event::Start { kind: slot, .. } => {
                *slot = kind;
            }
            _ => unreachable!(),
        }

        p.events.push(Event::Finish);
        CompletedMarker::new(self.position)
    }
}

pub(crate) struct CompletedMarker {
    pos: u32,
}

impl CompletedMarker {
    fn new(pos: u32) -> Self {
        CompletedMarker { pos }
    }

    /// Opens a node that becomes the parent of this one. Trivia scanned so far stay
    /// where they are.
    pub(crate) fn precede(self, p: &mut Parser<'_>) -> Marker {
        let new_pos = p.push_start();

        match &mut p.events[self.pos as usize] {
            Event::Start { forward_parent, .. } => {
                *forward_parent = Some(new_pos.position - self.pos);
            }
            _ => unreachable!(),
        }

        new_pos
    }
}
