use ca65_syntax::SyntaxKind::*;
use ca65_syntax::{BlockKind, BlockRole, DirectiveArgs, SyntaxSet};
use text_size::TextRange;

use super::{directives, exprs, operands};
use crate::parser::Parser;

/// Where statement-level error recovery stops on the same line.
const STATEMENT_SYNC: SyntaxSet = SyntaxSet::new([DIRECTIVE_KW, MNEMONIC]);

/// A line's effect on the block stack.
pub(super) struct BlockEdge {
    pub(super) role: BlockRole,
    pub(super) keyword: TextRange,
}

/// `label* statement? EOL`. `top` is the innermost open block.
pub(super) fn line(p: &mut Parser<'_>, top: Option<BlockKind>) -> Option<BlockEdge> {
    labels(p);
    let edge = statement(p, top);
    line_end(p);
    edge
}

fn labels(p: &mut Parser<'_>) {
    let mut first = true;

    loop {
        match p.peek_kind() {
            IDENT | LOCAL_IDENT if p.nth_kind(1) == COLON => {
                let m = p.start();
                p.bump();
                p.bump();
                m.complete(p, LABEL);
            }
            // The unnamed label only exists at the start of a line.
            COLON if first => {
                let m = p.start();
                p.bump();
                m.complete(p, LABEL);
            }
            _ => break,
        }
        first = false;
    }
}

fn statement(p: &mut Parser<'_>, top: Option<BlockKind>) -> Option<BlockEdge> {
    if top.is_some_and(BlockKind::has_fields) && field(p) {
        return None;
    }

    loop {
        match p.peek_kind() {
            EOL | EOF => return None,
            DIRECTIVE_KW => return directive(p, top),
            MNEMONIC => {
                let m = p.start();
                p.bump();
                operands::operand(p);
                m.complete(p, INSTRUCTION);
                return None;
            }
            IDENT | LOCAL_IDENT if is_assignment(p) => {
                assignment(p);
                return None;
            }
            IDENT => {
                macro_call(p);
                return None;
            }
            DOT_IDENT => {
                let word = String::from_utf8_lossy(p.nth_text(0)).into_owned();
                p.err_recover(format!("unknown directive `{word}`"), SyntaxSet::EMPTY);
                return None;
            }
            _ => {
                p.err_recover("expected a statement", STATEMENT_SYNC);
                if !p.at_set(STATEMENT_SYNC) {
                    return None;
                }
            }
        }
    }
}

fn directive(p: &mut Parser<'_>, top: Option<BlockKind>) -> Option<BlockEdge> {
    let keyword = p.nth(0).range;
    let Some(directive) = p.nth_directive(0) else {
        p.err_recover("unknown directive", SyntaxSet::EMPTY);
        return None;
    };

    let misplaced = match (directive.block, top) {
        (BlockRole::Close(kind), Some(open)) if kind != open => {
            Some(format!("expected `{}`, found `{}`", open.closer(), directive.name))
        }
        (BlockRole::Close(_), None) => Some(format!("`{}` without an open block", directive.name)),
        (BlockRole::Branch, top) if top != Some(BlockKind::Conditional) => {
            Some(format!("`{}` outside of a conditional block", directive.name))
        }
        _ => None,
    };
    if let Some(message) = misplaced {
        p.err_recover(message, SyntaxSet::EMPTY);
        return None;
    }

    directives::directive(p, directive);
    match directive.block {
        role @ (BlockRole::Open(_) | BlockRole::Close(_)) => Some(BlockEdge { role, keyword }),
        BlockRole::None | BlockRole::Branch => None,
    }
}

fn is_assignment(p: &mut Parser<'_>) -> bool {
    matches!(p.nth_kind(1), EQ | COLON_EQ)
        || p.nth_directive(1).is_some_and(|it| it.args == DirectiveArgs::Assignment)
}

/// `name = e`, `name := e` or `name .set e`.
fn assignment(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();
    p.bump();
    exprs::expr(p);
    m.complete(p, SYMBOL_ASSIGNMENT);
}

fn macro_call(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();

    if !p.at_line_end() {
        loop {
            if !p.at(COMMA) {
                macro_arg(p);
            }
            if !p.eat(COMMA) {
                break;
            }
        }
    }

    m.complete(p, MACRO_CALL);
}

/// Raw tokens up to the next comma outside of braces.
fn macro_arg(p: &mut Parser<'_>) {
    let m = p.start();
    let mut depth = 0u32;

    while !p.at_line_end() && !(depth == 0 && p.at(COMMA)) {
        match p.peek_kind() {
            LEFT_BRACE => depth += 1,
            RIGHT_BRACE => depth = depth.saturating_sub(1),
            _ => {}
        }
        p.bump();
    }

    m.complete(p, MACRO_ARG);
}

/// Members of `.struct`, `.union` and `.enum`: `name`, `name = e`, `name .res 2`, or a
/// bare storage directive. Block directives stay regular statements so nested blocks
/// and the closer still work.
fn field(p: &mut Parser<'_>) -> bool {
    match p.peek_kind() {
        DIRECTIVE_KW => {
            let Some(directive) = p.nth_directive(0) else { return false };
            if directive.block != BlockRole::None {
                return false;
            }

            let m = p.start();
            directives::directive(p, directive);
            m.complete(p, FIELD);
            true
        }
        IDENT => {
            let m = p.start();
            p.bump();

            match p.peek_kind() {
                EQ => {
                    p.bump();
                    exprs::expr(p);
                }
                DIRECTIVE_KW => {
                    if let Some(directive) = p.nth_directive(0)
                        && directive.block == BlockRole::None
                    {
                        directives::directive(p, directive);
                    }
                }
                _ => {}
            }

            m.complete(p, FIELD);
            true
        }
        _ => false,
    }
}

fn line_end(p: &mut Parser<'_>) {
    match p.peek_kind() {
        EOL => p.bump(),
        EOF => p.flush_trivia(),
        _ => {
            p.err_recover("expected end of line", SyntaxSet::EMPTY);
            if !p.eat(EOL) {
                p.flush_trivia();
            }
        }
    }
}
