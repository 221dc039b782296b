//! Lossless, immutable syntax trees for ca65 assembly.
//!
//! Trees are built from green nodes that can be shared between parses and navigated
//! through an index arena with lifetime-guided handles, without refcounting on
//! navigation.

/// Typed AST wrappers around the raw syntax tree.
pub mod ast;
mod builder;
mod cursor;
mod green;
mod language;
mod syntax;
mod syntax_kind;
mod syntax_set;
mod tree;

/// Incremental builder for constructing green trees.
pub use builder::Builder;
/// Stateful walker over a subtree.
pub use cursor::TreeCursor;
/// Position-independent, shareable tree layer.
pub use green::{GreenElement, GreenNode, GreenToken};
/// Keyword tables for the assembler dialect.
pub use language::{BlockKind, BlockRole, Directive, DirectiveArgs, Keyword, Language};
/// Primary syntax tree API types and adapters.
pub use syntax::{
    Children, ChildrenWithTokens, NodeOrToken, Preorder, PreorderWithTokens, SyntaxElement,
    SyntaxNode, SyntaxToken, TokenAtOffset, WalkEvent, WalkEventWithTokens,
};
/// Token and node kinds used throughout the tree.
pub use syntax_kind::SyntaxKind;
/// Compact set for grouping `SyntaxKind` values.
pub use syntax_set::SyntaxSet;
pub use text_size::{TextRange, TextSize};
pub use tree::SyntaxTree;
