//! Position-independent tree layer.
//!
//! Green nodes know their kind, length and children but not their offset, so an
//! unchanged subtree can be shared between the trees before and after an edit.

use std::fmt;

use text_size::TextSize;
use triomphe::Arc;

use crate::{NodeOrToken, SyntaxKind};

pub type GreenElement = NodeOrToken<GreenNode, GreenToken>;

impl GreenElement {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }

    pub fn text_len(&self) -> TextSize {
        match self {
            NodeOrToken::Node(node) => node.text_len(),
            NodeOrToken::Token(token) => token.text_len(),
        }
    }

    pub fn has_error(&self) -> bool {
        match self {
            NodeOrToken::Node(node) => node.has_error(),
            NodeOrToken::Token(token) => token.kind().is_error(),
        }
    }
}

/// A leaf: kind and length. The text lives in the tree's source buffer.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct GreenToken {
    kind: SyntaxKind,
    text_len: TextSize,
}

impl GreenToken {
    pub fn new(kind: SyntaxKind, text_len: TextSize) -> Self {
        Self { kind, text_len }
    }

    pub fn kind(self) -> SyntaxKind {
        self.kind
    }

    pub fn text_len(self) -> TextSize {
        self.text_len
    }
}

/// Reference-counted interior node.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct GreenNode {
    data: Arc<GreenNodeData>,
}

#[derive(Eq, Hash, PartialEq)]
struct GreenNodeData {
    kind: SyntaxKind,
    text_len: TextSize,
    has_error: bool,
    children: Box<[GreenElement]>,
}

impl GreenNode {
    pub fn new(kind: SyntaxKind, children: Vec<GreenElement>) -> Self {
        let text_len = children.iter().map(GreenElement::text_len).sum();
        let has_error = kind == SyntaxKind::ERROR || children.iter().any(GreenElement::has_error);

        Self {
            data: Arc::new(GreenNodeData {
                kind,
                text_len,
                has_error,
                children: children.into_boxed_slice(),
            }),
        }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data.kind
    }

    #[inline]
    pub fn text_len(&self) -> TextSize {
        self.data.text_len
    }

    /// `true` if this node is an `ERROR` node or contains an error anywhere below.
    #[inline]
    pub fn has_error(&self) -> bool {
        self.data.has_error
    }

    #[inline]
    pub fn children(&self) -> &[GreenElement] {
        &self.data.children
    }

    /// `true` if both handles point to the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Debug for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenNode")
            .field("kind", &self.kind())
            .field("text_len", &self.text_len())
            .field("children", &self.children().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxKind::*;

    fn token(kind: SyntaxKind, len: u32) -> GreenElement {
        NodeOrToken::Token(GreenToken::new(kind, len.into()))
    }

    #[test]
    fn lengths_and_errors_bubble_up() {
        let operand = GreenNode::new(OPERAND, vec![token(ERROR_TOKEN, 2)]);
        let instruction = GreenNode::new(
            INSTRUCTION,
            vec![token(MNEMONIC, 3), token(WHITESPACE, 1), NodeOrToken::Node(operand)],
        );

        assert_eq!(instruction.text_len(), TextSize::new(6));
        assert!(instruction.has_error());

        let clean = GreenNode::new(LINE, vec![token(EOL, 1)]);
        assert!(!clean.has_error());
    }

    #[test]
    fn clones_share_allocation() {
        let line = GreenNode::new(LINE, vec![token(EOL, 1)]);
        let same = line.clone();
        let equal = GreenNode::new(LINE, vec![token(EOL, 1)]);

        assert!(line.ptr_eq(&same));
        assert!(!line.ptr_eq(&equal));
        assert_eq!(line, equal);
    }
}
