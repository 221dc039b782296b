//! Builds green trees from a stream of start/token/finish calls.

use text_size::TextSize;

use crate::{GreenElement, GreenNode, GreenToken, NodeOrToken, SyntaxKind};

const DEFAULT_TREE_DEPTH: usize = 32;
const DEFAULT_CHILDREN_LEN: usize = 256;

/// Assembles a [`GreenNode`] from parser events.
///
/// Trivia tokens are held back until the next structural call decides where they
/// belong:
/// - a node that absorbs trivia (`LINE`, blocks, `SOURCE_FILE`) leaves them pending, so
///   the innermost absorbing node takes the trivia before its first token;
/// - any other node starts at its first significant token, the trivia go to its parent;
/// - a significant token or reused subtree gets the trivia in the innermost open node;
/// - an absorbing node takes pending trivia when it is finished.
///
/// Nodes that end up without children are dropped, so the finished tree never has
/// zero-width nodes below the root.
pub struct Builder {
    parents: Vec<(SyntaxKind, usize)>,
    children: Vec<GreenElement>,
    trivia: Vec<GreenToken>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self {
            parents: Vec::with_capacity(DEFAULT_TREE_DEPTH),
            children: Vec::with_capacity(DEFAULT_CHILDREN_LEN),
            trivia: Vec::new(),
        }
    }

    /// Starts a new node of the given kind.
    pub fn start_node(&mut self, kind: SyntaxKind) {
        if !kind.absorbs_trivia() {
            self.flush_trivia();
        }
        self.parents.push((kind, self.children.len()));
    }

    /// Adds a token of `len` bytes.
    pub fn token(&mut self, kind: SyntaxKind, len: TextSize) {
        let token = GreenToken::new(kind, len);
        if kind.is_trivia() {
            self.trivia.push(token);
        } else {
            self.flush_trivia();
            self.children.push(NodeOrToken::Token(token));
        }
    }

    /// Splices an existing subtree in as the next child.
    pub fn reuse_node(&mut self, node: GreenNode) {
        self.flush_trivia();
        self.children.push(NodeOrToken::Node(node));
    }

    /// Finishes the most recently started node.
    #[track_caller]
    pub fn finish_node(&mut self) {
        let &(kind, first_child) = self.parents.last().expect("no opened nodes?");
        if kind.absorbs_trivia() {
            self.flush_trivia();
        }
        self.parents.pop();

        let children = self.children.split_off(first_child);
        if children.is_empty() && !self.parents.is_empty() {
            return;
        }

        self.children.push(NodeOrToken::Node(GreenNode::new(kind, children)));
    }

    /// Returns the root node.
    #[track_caller]
    pub fn finish(mut self) -> GreenNode {
        assert!(self.parents.is_empty(), "you should finish every started node");
        assert!(self.trivia.is_empty(), "trivia outside of the root node");

        match (self.children.pop(), self.children.is_empty()) {
            (Some(NodeOrToken::Node(root)), true) => root,
            _ => panic!("expected exactly one root node"),
        }
    }

    fn flush_trivia(&mut self) {
        self.children.extend(self.trivia.drain(..).map(NodeOrToken::Token));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxKind::*;

    fn kinds(node: &GreenNode) -> Vec<SyntaxKind> {
        node.children().iter().map(GreenElement::kind).collect()
    }

    #[test]
    fn leading_trivia_goes_to_absorbing_nodes() {
        let mut builder = Builder::new();
        builder.start_node(SOURCE_FILE);
        builder.token(WHITESPACE, TextSize::new(2));
        builder.start_node(LINE);
        builder.start_node(INSTRUCTION);
        builder.token(MNEMONIC, TextSize::new(3));
        builder.finish_node();
        builder.token(WHITESPACE, TextSize::new(1));
        builder.token(COMMENT, TextSize::new(4));
        builder.token(EOL, TextSize::new(1));
        builder.finish_node();
        builder.finish_node();

        let root = builder.finish();
        assert_eq!(kinds(&root), [LINE]);
        let NodeOrToken::Node(line) = &root.children()[0] else { panic!("expected a line") };
        assert_eq!(kinds(line), [WHITESPACE, INSTRUCTION, WHITESPACE, COMMENT, EOL]);
        assert_eq!(root.text_len(), TextSize::new(11));
    }

    #[test]
    fn leading_trivia_stays_outside_plain_nodes() {
        let mut builder = Builder::new();
        builder.start_node(SOURCE_FILE);
        builder.start_node(LINE);
        builder.token(MNEMONIC, TextSize::new(3));
        builder.token(WHITESPACE, TextSize::new(1));
        builder.start_node(OPERAND);
        builder.token(HASH, TextSize::new(1));
        builder.finish_node();
        builder.finish_node();
        builder.finish_node();

        let root = builder.finish();
        let NodeOrToken::Node(line) = &root.children()[0] else { panic!("expected a line") };
        assert_eq!(kinds(line), [MNEMONIC, WHITESPACE, OPERAND]);
    }

    #[test]
    fn trailing_trivia_closes_into_line() {
        let mut builder = Builder::new();
        builder.start_node(SOURCE_FILE);
        builder.start_node(LINE);
        builder.token(MNEMONIC, TextSize::new(3));
        builder.token(WHITESPACE, TextSize::new(1));
        builder.finish_node();
        builder.finish_node();

        let root = builder.finish();
        let NodeOrToken::Node(line) = &root.children()[0] else { panic!("expected a line") };
        assert_eq!(kinds(line), [MNEMONIC, WHITESPACE]);
    }

    #[test]
    fn empty_nodes_are_dropped() {
        let mut builder = Builder::new();
        builder.start_node(SOURCE_FILE);
        builder.start_node(LINE);
        builder.start_node(OPERAND);
        builder.finish_node();
        builder.token(EOL, TextSize::new(1));
        builder.finish_node();
        builder.finish_node();

        let root = builder.finish();
        let NodeOrToken::Node(line) = &root.children()[0] else { panic!("expected a line") };
        assert_eq!(kinds(line), [EOL]);
    }

    #[test]
    fn empty_root_is_kept() {
        let mut builder = Builder::new();
        builder.start_node(SOURCE_FILE);
        builder.finish_node();

        let root = builder.finish();
        assert_eq!(root.kind(), SOURCE_FILE);
        assert!(root.children().is_empty());
    }
}
