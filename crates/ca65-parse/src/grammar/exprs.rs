//! Expressions, by precedence climbing over an explicit frame stack.
//!
//! Binding powers, loosest to tightest: `!`/`.not` (1), `||` (2), `&&` (3),
//! comparisons (4), additive (5), multiplicative (6), other prefix operators (7).

use ca65_syntax::SyntaxKind::*;

use crate::parser::{CompletedMarker, Marker, Parser};

const UNARY: u8 = 7;
/// `!` and `.not` take everything to their right.
const NOT: u8 = 1;

const DOT_INFIX: &[(&str, u8)] = &[
    (".mod", 6),
    (".bitand", 6),
    (".bitxor", 6),
    (".shl", 6),
    (".shr", 6),
    (".bitor", 5),
    (".and", 3),
    (".xor", 3),
    (".or", 2),
];

const DOT_PREFIX: &[(&str, u8)] = &[(".bitnot", UNARY), (".not", NOT)];

enum Frame {
    /// A prefix operator waiting for its operand.
    Unary { m: Marker, power: u8 },
    /// `lhs op`, waiting for the right operand.
    Binary { m: Marker, power: u8 },
    Paren(Marker),
    /// A pseudo function call with `(` and possibly some arguments consumed.
    Call(Marker),
}

impl Frame {
    fn power(&self) -> u8 {
        match self {
            Frame::Unary { power, .. } | Frame::Binary { power, .. } => *power,
            Frame::Paren(_) | Frame::Call(_) => 0,
        }
    }
}

/// Parses one expression. Returns `None`, after reporting it, if nothing that could
/// start an expression was found; `EOL`, `,` and `)` are never consumed that way.
pub(crate) fn expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    let mut frames = Vec::new();

    'operand: loop {
        let mut lhs = operand(p, &mut frames);

        loop {
            let min = frames.last().map_or(0, Frame::power);
            if let Some(power) = infix_power(p).filter(|&power| power > min)
                && let Some(done) = lhs.take()
            {
                let m = done.precede(p);
                p.bump();
                frames.push(Frame::Binary { m, power });
                continue 'operand;
            }

            lhs = Some(match frames.pop() {
                None => return lhs,
                Some(Frame::Unary { m, .. }) => m.complete(p, UNARY_EXPR),
                Some(Frame::Binary { m, .. }) => m.complete(p, BINARY_EXPR),
                Some(Frame::Paren(m)) => {
                    p.expect(RIGHT_PAREN, "expected `)`");
                    m.complete(p, PAREN_EXPR)
                }
                Some(Frame::Call(m)) => {
                    if p.eat(COMMA) {
                        frames.push(Frame::Call(m));
                        continue 'operand;
                    }
                    p.expect(RIGHT_PAREN, "expected `)`");
                    m.complete(p, CALL_EXPR)
                }
            });
        }
    }
}

/// Consumes prefix operators, opening parentheses and call heads onto `frames`, then
/// parses the primary expression they apply to.
fn operand(p: &mut Parser<'_>, frames: &mut Vec<Frame>) -> Option<CompletedMarker> {
    loop {
        if let Some(power) = prefix_power(p) {
            let m = p.start();
            p.bump();
            frames.push(Frame::Unary { m, power });
            continue;
        }

        match p.peek_kind() {
            LEFT_PAREN => {
                let m = p.start();
                p.bump();
                frames.push(Frame::Paren(m));
            }
            PSEUDO_FN_KW => {
                let m = p.start();
                p.bump();
                if !p.expect(LEFT_PAREN, "expected `(`") || p.eat(RIGHT_PAREN) {
                    return Some(m.complete(p, CALL_EXPR));
                }
                frames.push(Frame::Call(m));
            }
            _ => {
                let in_call = matches!(frames.last(), Some(Frame::Call(_)));
                return primary(p, in_call);
            }
        }
    }
}

fn primary(p: &mut Parser<'_>, in_call: bool) -> Option<CompletedMarker> {
    if at_macro_call(p) {
        return Some(macro_call(p));
    }

    let kind = match p.peek_kind() {
        NUMBER => NUMBER_LITERAL,
        CHAR => CHAR_LITERAL,
        STRING => STRING_LITERAL,
        IDENT | COLON2 => return Some(name(p)),
        LOCAL_IDENT => LOCAL_LABEL_REF,
        UNNAMED_REF => UNNAMED_LABEL_REF,
        PSEUDO_VAR_KW | STAR => PSEUDO_VAR,
        // `.ismnemonic(lda)`
        MNEMONIC | REGISTER if in_call => IDENTIFIER,
        // `.match({a b}, ...)`
        LEFT_BRACE if in_call => return Some(braced(p)),
        EOL | EOF | COMMA | RIGHT_PAREN => {
            p.error("expected expression");
            return None;
        }
        _ => {
            let m = p.start();
            p.error("expected expression");
            p.bump();
            return Some(m.complete(p, ERROR));
        }
    };

    let m = p.start();
    p.bump();
    Some(m.complete(p, kind))
}

/// `name`, `scope::name` or `::name`.
fn name(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    let mut scoped = p.at(COLON2);

    if scoped {
        p.bump();
        p.expect(IDENT, "expected a name");
    } else {
        p.bump();
    }

    while p.at(COLON2) {
        scoped = true;
        p.bump();
        if !p.expect(IDENT, "expected a name") {
            break;
        }
    }

    m.complete(p, if scoped { MEMBER } else { IDENTIFIER })
}

fn at_macro_call(p: &mut Parser<'_>) -> bool {
    p.at(IDENT) && p.nth_kind(1) == LEFT_PAREN && p.nth(1).range.start() == p.nth(0).range.end()
}

/// `name(args)`: a `.define` macro with parameters. Like `.define` itself, the
/// parenthesis must follow the name without a space.
fn macro_call(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    p.bump();
    p.bump();

    loop {
        if !matches!(p.peek_kind(), COMMA | RIGHT_PAREN | EOL | EOF) {
            macro_arg(p);
        }
        if !p.eat(COMMA) {
            break;
        }
    }

    p.expect(RIGHT_PAREN, "expected `)`");
    m.complete(p, MACRO_CALL)
}

/// Raw tokens up to a `,` or `)` outside of nested parentheses and braces.
fn macro_arg(p: &mut Parser<'_>) {
    let m = p.start();
    let mut depth = 0u32;

    loop {
        match p.peek_kind() {
            EOL | EOF => break,
            COMMA | RIGHT_PAREN if depth == 0 => break,
            LEFT_PAREN | LEFT_BRACE => depth += 1,
            RIGHT_PAREN | RIGHT_BRACE => depth = depth.saturating_sub(1),
            _ => {}
        }
        p.bump();
    }

    m.complete(p, MACRO_ARG);
}

/// A braced token list, kept raw.
fn braced(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    let mut depth = 0u32;

    loop {
        match p.peek_kind() {
            EOL | EOF => {
                p.error("expected `}`");
                break;
            }
            LEFT_BRACE => depth += 1,
            RIGHT_BRACE => depth -= 1,
            _ => {}
        }
        p.bump();
        if depth == 0 {
            break;
        }
    }

    m.complete(p, MACRO_ARG)
}

fn prefix_power(p: &mut Parser<'_>) -> Option<u8> {
    match p.peek_kind() {
        PLUS | MINUS | TILDE | LT | GT | CARET => Some(UNARY),
        BANG => Some(NOT),
        DOT_OP_KW => lookup(DOT_PREFIX, p.nth_text(0)),
        _ => None,
    }
}

fn infix_power(p: &mut Parser<'_>) -> Option<u8> {
    match p.peek_kind() {
        STAR | SLASH | AMP | CARET | SHL | SHR => Some(6),
        PLUS | MINUS | PIPE => Some(5),
        EQ | LT_GT | LT | GT | LT_EQ | GT_EQ => Some(4),
        AMP2 => Some(3),
        PIPE2 => Some(2),
        DOT_OP_KW => lookup(DOT_INFIX, p.nth_text(0)),
        _ => None,
    }
}

fn lookup(table: &[(&str, u8)], word: &[u8]) -> Option<u8> {
    table
        .iter()
        .find(|(name, _)| word.eq_ignore_ascii_case(name.as_bytes()))
        .map(|&(_, power)| power)
}
