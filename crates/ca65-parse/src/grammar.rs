use ca65_syntax::SyntaxKind::*;
use ca65_syntax::{BlockKind, BlockRole};
use text_size::TextRange;

use crate::parser::{Marker, Parser};

mod directives;
mod exprs;
mod operands;
mod statements;

struct OpenBlock {
    kind: BlockKind,
    marker: Marker,
    /// The opening keyword, where an unterminated block is reported.
    keyword: TextRange,
}

/// Parses the whole input into lines and blocks.
///
/// Blocks live on an explicit stack: an opening line is wrapped into its block node
/// after the fact, a matching closing line completes it.
pub(crate) fn source_file(p: &mut Parser<'_>) {
    let mut blocks: Vec<OpenBlock> = Vec::new();

    loop {
        if blocks.is_empty() && p.try_reuse() {
            continue;
        }
        if p.at_end() {
            break;
        }

        let top = blocks.last().map(|block| block.kind);
        let m = p.start();
        let edge = statements::line(p, top);
        let line = m.complete(p, LINE);

        match edge {
            Some(statements::BlockEdge { role: BlockRole::Open(kind), keyword }) => {
                blocks.push(OpenBlock { kind, marker: line.precede(p), keyword });
            }
            Some(statements::BlockEdge { role: BlockRole::Close(_), .. }) => {
                if let Some(block) = blocks.pop() {
                    block.marker.complete(p, block.kind.syntax_kind());
                }
            }
            _ => {}
        }
    }

    while let Some(block) = blocks.pop() {
        p.error_at(
            format!("unterminated block, expected `{}`", block.kind.closer()),
            block.keyword,
        );
        block.marker.complete(p, block.kind.syntax_kind());
    }
}
