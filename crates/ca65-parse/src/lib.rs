//! Incremental parser for ca65 assembly.
//!
//! [`parse`] builds a lossless tree for any byte sequence. [`reparse`] builds the tree
//! for an edited text while sharing the unchanged top-level lines and blocks of a
//! previous parse.

use std::fmt::Write as _;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub use ca65_errors::Diagnostic;
use ca65_inputs::{InputTooLarge, TextSource};
use ca65_syntax::SyntaxKind::SOURCE_FILE;
use ca65_syntax::{GreenNode, Language, SyntaxNode, SyntaxTree, TextRange};
pub use edit::{Edit, Point};

mod edit;
mod grammar;
mod incremental;
mod parser;
#[cfg(test)]
mod tests;

use incremental::Reuse;
use parser::Parser;

/// The result of one parse: the tree, its diagnostics, and whether it was cut short.
#[derive(Debug)]
pub struct Parse {
    tree: SyntaxTree,
    diagnostics: Vec<Diagnostic>,
    cancelled: bool,
}

impl Parse {
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn root(&self) -> SyntaxNode<'_> {
        self.tree.root()
    }

    /// Sorted by start offset.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// A cancelled parse covers only a prefix of the input.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty() || self.root().has_error()
    }

    /// An empty, cancelled parse for input that was refused before scanning.
    fn rejected(err: &ParseError) -> Self {
        let green = GreenNode::new(SOURCE_FILE, Vec::new());
        Self {
            tree: SyntaxTree::new(Vec::new(), green),
            diagnostics: vec![Diagnostic::error(err.to_string(), TextRange::default())],
            cancelled: true,
        }
    }

    /// The tree followed by the diagnostics, one per line.
    pub fn debug_dump(&self) -> String {
        let mut buf = self.root().debug_tree();
        buf.push_str("Errors:\n");
        for diagnostic in &self.diagnostics {
            _ = writeln!(buf, "  {:?} {}", diagnostic.range(), diagnostic.message());
        }
        buf
    }
}

#[derive(Debug)]
pub enum ParseOutcome {
    Complete(Parse),
    /// The cancellation flag was raised; the tree covers the text scanned so far.
    Cancelled(Parse),
}

impl ParseOutcome {
    pub fn into_parse(self) -> Parse {
        match self {
            ParseOutcome::Complete(parse) | ParseOutcome::Cancelled(parse) => parse,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ParseOutcome::Cancelled(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("input of {len} bytes exceeds the limit of {limit} bytes")]
    InputTooLarge { len: usize, limit: usize },
}

impl From<InputTooLarge> for ParseError {
    fn from(err: InputTooLarge) -> Self {
        ParseError::InputTooLarge { len: err.len, limit: err.limit }
    }
}

/// Limits and cancellation for one parse. The default is unlimited and cannot be
/// cancelled.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub max_input_len: Option<usize>,
    pub cancellation: Option<Arc<AtomicBool>>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_input_len(mut self, limit: usize) -> Self {
        self.max_input_len = Some(limit);
        self
    }

    /// The parse stops at the next token once `flag` is set.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancellation = Some(flag);
        self
    }

    /// Tree offsets are 32-bit, so that is the hard limit.
    fn check(&self, len: usize) -> Result<(), ParseError> {
        let limit = self.max_input_len.unwrap_or(usize::MAX).min(u32::MAX as usize);
        if len > limit {
            return Err(ParseError::InputTooLarge { len, limit });
        }
        Ok(())
    }
}

/// Parses `text` from scratch.
///
/// Text of 4 GiB or more does not fit the tree's offsets; the result is then an empty,
/// cancelled parse whose only diagnostic says so. [`parse_with`] reports it as an error.
pub fn parse(language: &Language, text: &[u8]) -> Parse {
    match parse_with(language, text, &ParseOptions::default()) {
        Ok(outcome) => outcome.into_parse(),
        Err(err) => Parse::rejected(&err),
    }
}

pub fn parse_with(
    language: &Language,
    text: &[u8],
    options: &ParseOptions,
) -> Result<ParseOutcome, ParseError> {
    options.check(text.len())?;
    Ok(outcome(run(language, text, options.cancellation.as_deref(), None)))
}

/// Reads `source` chunk by chunk, then parses it.
pub fn parse_source(
    language: &Language,
    source: &dyn TextSource,
    options: &ParseOptions,
) -> Result<ParseOutcome, ParseError> {
    let text = ca65_inputs::read_all(source, options.max_input_len)?;
    parse_with(language, &text, options)
}

/// Parses `text`, the result of applying `edits` to the text of `old`.
///
/// The result is the same tree [`parse`] would build, but top-level lines and blocks
/// that no edit touched are shared with `old`.
///
/// Oversized text is rejected the same way as by [`parse`].
pub fn reparse(language: &Language, old: &Parse, text: &[u8], edits: &[Edit]) -> Parse {
    match reparse_with(language, old, text, edits, &ParseOptions::default()) {
        Ok(outcome) => outcome.into_parse(),
        Err(err) => Parse::rejected(&err),
    }
}

pub fn reparse_with(
    language: &Language,
    old: &Parse,
    text: &[u8],
    edits: &[Edit],
    options: &ParseOptions,
) -> Result<ParseOutcome, ParseError> {
    options.check(text.len())?;
    let reuse = Reuse::plan(old, edits);
    Ok(outcome(run(language, text, options.cancellation.as_deref(), Some(reuse))))
}

fn outcome(parse: Parse) -> ParseOutcome {
    if parse.cancelled { ParseOutcome::Cancelled(parse) } else { ParseOutcome::Complete(parse) }
}

fn run(
    language: &Language,
    text: &[u8],
    cancellation: Option<&AtomicBool>,
    reuse: Option<Reuse>,
) -> Parse {
    build(text, Parser::new(language, text, cancellation, reuse))
}

/// Runs the grammar to the end of `text`, or to where the parse was cancelled.
fn build(text: &[u8], mut parser: Parser<'_>) -> Parse {
    grammar::source_file(&mut parser);
    let output = parser.finish();

    if let Some(reuse) = &output.reuse {
        log::debug!(
            "reparse: reused {}/{} children ({} bytes), {} fresh tokens",
            reuse.reused,
            reuse.offered,
            reuse.reused_bytes,
            output.fresh_tokens,
        );
    }

    let len = u32::from(output.green.text_len()) as usize;
    Parse {
        tree: SyntaxTree::new(&text[..len], output.green),
        diagnostics: output.diagnostics,
        cancelled: output.cancelled,
    }
}
