use text_size::{TextRange, TextSize};

use crate::{NodeOrToken, SyntaxElement, SyntaxKind, SyntaxNode};

/// Stateful walker over the elements of a subtree.
///
/// Keeps only the current element and the root it may not leave, so moving around
/// needs no stack.
#[derive(Clone, Copy, Debug)]
pub struct TreeCursor<'a> {
    root: SyntaxNode<'a>,
    current: SyntaxElement<'a>,
}

impl<'a> TreeCursor<'a> {
    pub fn new(root: SyntaxNode<'a>) -> Self {
        Self { root, current: NodeOrToken::Node(root) }
    }

    #[inline]
    pub fn element(&self) -> SyntaxElement<'a> {
        self.current
    }

    /// The current node, or `None` when the cursor sits on a token.
    #[inline]
    pub fn node(&self) -> Option<SyntaxNode<'a>> {
        self.current.into_node()
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.current.kind()
    }

    #[inline]
    pub fn text_range(&self) -> TextRange {
        self.current.text_range()
    }

    /// Moves back to the root the cursor was created with.
    pub fn reset(&mut self) {
        self.current = NodeOrToken::Node(self.root);
    }

    pub fn goto_first_child(&mut self) -> bool {
        self.goto(|cursor| cursor.node()?.first_child_or_token())
    }

    pub fn goto_last_child(&mut self) -> bool {
        self.goto(|cursor| cursor.node()?.last_child_or_token())
    }

    /// Descends to the first child that covers or follows `offset`.
    pub fn goto_first_child_for_offset(&mut self, offset: TextSize) -> bool {
        self.goto(|cursor| {
            cursor.node()?.children_with_tokens().find(|child| child.text_range().end() > offset)
        })
    }

    pub fn goto_next_sibling(&mut self) -> bool {
        if self.at_root() {
            return false;
        }
        self.goto(|cursor| cursor.current.next_sibling_or_token())
    }

    pub fn goto_prev_sibling(&mut self) -> bool {
        if self.at_root() {
            return false;
        }
        self.goto(|cursor| cursor.current.prev_sibling_or_token())
    }

    /// Moves to the parent; never above the root.
    pub fn goto_parent(&mut self) -> bool {
        if self.at_root() {
            return false;
        }
        self.goto(|cursor| cursor.current.parent().map(NodeOrToken::Node))
    }

    /// Depth of the current element below the root.
    pub fn depth(&self) -> usize {
        let parent = match self.current {
            NodeOrToken::Node(node) if node == self.root => return 0,
            NodeOrToken::Node(node) => node.parent(),
            NodeOrToken::Token(token) => Some(token.parent()),
        };

        parent
            .into_iter()
            .flat_map(SyntaxNode::ancestors)
            .position(|node| node == self.root)
            .map_or(0, |depth| depth + 1)
    }

    fn at_root(&self) -> bool {
        matches!(self.current, NodeOrToken::Node(node) if node == self.root)
    }

    fn goto(&mut self, step: impl FnOnce(&Self) -> Option<SyntaxElement<'a>>) -> bool {
        match step(self) {
            Some(element) => {
                self.current = element;
                true
            }
            None => false,
        }
    }
}
