use ca65_syntax::SyntaxKind::{self, *};

use super::exprs;
use crate::parser::Parser;

/// Address size prefixes: `z:` zero page, `a:` absolute, `f:` far.
const SIZE_OVERRIDES: &[&str] = &["z", "a", "f"];

/// The operand of an instruction. The addressing mode is read off the token shape
/// later, the parser only keeps `#`, parentheses and index registers as direct
/// children.
pub(super) fn operand(p: &mut Parser<'_>) {
    if p.at_line_end() {
        return;
    }

    let m = p.start();
    let kind = p.peek_kind();
    let next = p.nth_kind(1);

    match kind {
        HASH => {
            p.bump();
            exprs::expr(p);
        }
        REGISTER if matches!(next, EOL | EOF) => p.bump(),
        _ => {
            if matches!(kind, IDENT | REGISTER) && next == COLON && is_size_override(p.nth_text(0))
            {
                p.bump();
                p.bump();
            }

            if p.at(LEFT_PAREN) && is_indirect(&p.rest_of_line()) {
                p.bump();
                exprs::expr(p);
                if p.eat(COMMA) {
                    p.expect(REGISTER, "expected `x`");
                }
                p.expect(RIGHT_PAREN, "expected `)`");
            } else {
                exprs::expr(p);
            }

            if p.eat(COMMA) {
                p.expect(REGISTER, "expected an index register");
            }
        }
    }

    m.complete(p, OPERAND);
}

fn is_size_override(word: &[u8]) -> bool {
    SIZE_OVERRIDES.iter().any(|size| word.eq_ignore_ascii_case(size.as_bytes()))
}

/// `kinds` starts at `(`. The parentheses are part of the addressing mode unless an
/// operator follows the matching `)`, as in `(base + 1) * 2`.
fn is_indirect(kinds: &[SyntaxKind]) -> bool {
    let mut depth = 0usize;

    for (i, &kind) in kinds.iter().enumerate() {
        match kind {
            LEFT_PAREN => depth += 1,
            RIGHT_PAREN => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return matches!(kinds.get(i + 1), None | Some(EOL | EOF | COMMA));
                }
            }
            COMMA if depth == 1 => return true,
            _ => {}
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parentheses_followed_by_operators_group() {
        assert!(is_indirect(&[LEFT_PAREN, IDENT, RIGHT_PAREN, EOL]));
        assert!(is_indirect(&[LEFT_PAREN, IDENT, RIGHT_PAREN, COMMA, REGISTER, EOL]));
        assert!(is_indirect(&[LEFT_PAREN, IDENT, COMMA, REGISTER, RIGHT_PAREN, EOF]));
        assert!(is_indirect(&[LEFT_PAREN, IDENT, EOL]));
        assert!(!is_indirect(&[LEFT_PAREN, NUMBER, RIGHT_PAREN, STAR, NUMBER, EOL]));
        assert!(!is_indirect(&[
            LEFT_PAREN, LEFT_PAREN, IDENT, RIGHT_PAREN, PLUS, NUMBER, RIGHT_PAREN, PLUS, IDENT,
            EOL
        ]));
    }
}
