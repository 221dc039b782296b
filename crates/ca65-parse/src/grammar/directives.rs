use ca65_syntax::SyntaxKind::*;
use ca65_syntax::{Directive, DirectiveArgs, SyntaxSet};

use super::exprs;
use crate::parser::Parser;

/// Parameters are plain words, even where they spell a register or a mnemonic.
const PARAM_NAMES: SyntaxSet = SyntaxSet::new([IDENT, REGISTER, MNEMONIC]);

/// A control command and its arguments, up to the end of the line.
pub(super) fn directive(p: &mut Parser<'_>, directive: Directive) {
    let m = p.start();
    p.bump();

    match directive.args {
        DirectiveArgs::None => {}
        DirectiveArgs::Exprs | DirectiveArgs::Assignment => expr_list(p),
        DirectiveArgs::Toggle => {
            if matches!(p.peek_kind(), IDENT | PLUS | MINUS) {
                p.bump();
            }
        }
        DirectiveArgs::Words => words(p),
        DirectiveArgs::MacroHeader => macro_header(p),
        DirectiveArgs::Define => define(p),
    }

    m.complete(p, DIRECTIVE);
}

/// `e (: size)?, ...`
fn expr_list(p: &mut Parser<'_>) {
    if p.at_line_end() {
        return;
    }

    loop {
        exprs::expr(p);
        if p.eat(COLON) {
            p.expect(IDENT, "expected an address size");
        }
        if !p.eat(COMMA) {
            break;
        }
    }
}

/// `.feature name +, name -` and `.macpack name`.
fn words(p: &mut Parser<'_>) {
    if p.at_line_end() {
        return;
    }

    loop {
        p.expect(IDENT, "expected a name");
        if matches!(p.peek_kind(), PLUS | MINUS) {
            p.bump();
        }
        if !p.eat(COMMA) {
            break;
        }
    }
}

fn macro_header(p: &mut Parser<'_>) {
    if !p.expect(IDENT, "expected a macro name") || p.at_line_end() {
        return;
    }

    loop {
        param(p);
        if !p.eat(COMMA) {
            break;
        }
    }
}

fn param(p: &mut Parser<'_>) {
    if p.at_set(PARAM_NAMES) {
        p.bump();
    } else {
        p.error("expected a parameter name");
    }
}

/// `.define name replacement` or `.define name(params) replacement`. The parameter
/// list must follow the name without a space.
fn define(p: &mut Parser<'_>) {
    let name_end = p.nth(0).range.end();
    if !p.expect(IDENT, "expected a name") {
        return;
    }

    if p.at(LEFT_PAREN) && p.nth(0).range.start() == name_end {
        p.bump();
        if !p.at(RIGHT_PAREN) {
            loop {
                param(p);
                if !p.eat(COMMA) {
                    break;
                }
            }
        }
        p.expect(RIGHT_PAREN, "expected `)`");
    }

    if !p.at_line_end() {
        let m = p.start();
        while !p.at_line_end() {
            p.bump();
        }
        m.complete(p, MACRO_ARG);
    }
}
