//! Borrowed handles into a [`SyntaxTree`].

use std::borrow::Cow;
use std::fmt::{self, Write as _};
use std::ops::Range;
use std::{iter, ptr, slice};

use text_size::{TextRange, TextSize};

use crate::tree::{ChildRef, NodeData, TokenData};
use crate::{GreenNode, SyntaxKind, SyntaxTree};

/// Node handle tied to the lifetime of the tree.
#[derive(Clone, Copy)]
pub struct SyntaxNode<'a> {
    pub(crate) tree: &'a SyntaxTree,
    pub(crate) id: u32,
}

/// Token handle tied to the lifetime of the tree.
#[derive(Clone, Copy)]
pub struct SyntaxToken<'a> {
    pub(crate) tree: &'a SyntaxTree,
    pub(crate) id: u32,
}

/// Node or token element inside the tree.
pub type SyntaxElement<'a> = NodeOrToken<SyntaxNode<'a>, SyntaxToken<'a>>;

fn element(tree: &SyntaxTree, child: ChildRef) -> SyntaxElement<'_> {
    match child {
        ChildRef::Node(id) => NodeOrToken::Node(SyntaxNode { tree, id }),
        ChildRef::Token(id) => NodeOrToken::Token(SyntaxToken { tree, id }),
    }
}

fn sibling(tree: &SyntaxTree, parent: u32, index: u32, delta: isize) -> Option<SyntaxElement<'_>> {
    let (start, end) = tree.nodes[parent as usize].children;
    let index = (index as usize).checked_add_signed(delta)?;
    let children = &tree.children[start as usize..end as usize];
    children.get(index).map(|&child| element(tree, child))
}

impl<'a> SyntaxNode<'a> {
    #[inline]
    fn data(self) -> &'a NodeData {
        &self.tree.nodes[self.id as usize]
    }

    #[inline]
    fn child_refs(self) -> &'a [ChildRef] {
        let (start, end) = self.data().children;
        &self.tree.children[start as usize..end as usize]
    }

    #[inline]
    fn token_refs(self) -> &'a [TokenData] {
        let (start, end) = self.data().tokens;
        &self.tree.tokens[start as usize..end as usize]
    }

    /// Returns the tree this node belongs to.
    #[inline]
    pub fn tree(self) -> &'a SyntaxTree {
        self.tree
    }

    /// Returns this node's kind.
    #[inline]
    pub fn kind(self) -> SyntaxKind {
        self.data().kind
    }

    /// Returns the byte range covered by this node.
    #[inline]
    pub fn text_range(self) -> TextRange {
        self.data().range
    }

    #[inline]
    pub fn range(self) -> TextRange {
        self.text_range()
    }

    /// Returns the bytes covered by this node.
    #[inline]
    pub fn bytes(self) -> &'a [u8] {
        &self.tree.text[Range::<usize>::from(self.text_range())]
    }

    /// Returns the text covered by this node, replacing invalid UTF-8.
    #[inline]
    pub fn text(self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.bytes())
    }

    /// `true` if this node is an error or contains one.
    #[inline]
    pub fn has_error(self) -> bool {
        self.data().green.has_error()
    }

    /// Returns the green node backing this handle.
    #[inline]
    pub fn green(self) -> &'a GreenNode {
        &self.data().green
    }

    #[inline]
    pub fn parent(self) -> Option<Self> {
        Some(Self { tree: self.tree, id: self.data().parent? })
    }

    /// Returns an iterator of ancestors starting from this node.
    #[inline]
    pub fn ancestors(self) -> impl Iterator<Item = SyntaxNode<'a>> + Clone {
        iter::successors(Some(self), |it| it.parent())
    }

    /// Position among the parent's children, tokens included.
    #[inline]
    pub fn index(self) -> usize {
        self.data().index as usize
    }

    /// Iterates children including tokens.
    #[inline]
    pub fn children_with_tokens(self) -> ChildrenWithTokens<'a> {
        ChildrenWithTokens { tree: self.tree, children: self.child_refs().iter() }
    }

    /// Iterates child nodes, skipping tokens.
    #[inline]
    pub fn children(self) -> Children<'a> {
        Children { inner: self.children_with_tokens() }
    }

    #[inline]
    pub fn first_child(self) -> Option<Self> {
        self.children().next()
    }

    #[inline]
    pub fn last_child(self) -> Option<Self> {
        self.children().next_back()
    }

    #[inline]
    pub fn first_child_or_token(self) -> Option<SyntaxElement<'a>> {
        self.children_with_tokens().next()
    }

    #[inline]
    pub fn last_child_or_token(self) -> Option<SyntaxElement<'a>> {
        self.children_with_tokens().next_back()
    }

    #[inline]
    pub fn next_sibling_or_token(self) -> Option<SyntaxElement<'a>> {
        let data = self.data();
        sibling(self.tree, data.parent?, data.index, 1)
    }

    #[inline]
    pub fn prev_sibling_or_token(self) -> Option<SyntaxElement<'a>> {
        let data = self.data();
        sibling(self.tree, data.parent?, data.index, -1)
    }

    /// Returns the next sibling node, skipping tokens.
    pub fn next_sibling(self) -> Option<Self> {
        iter::successors(self.next_sibling_or_token(), |it| it.next_sibling_or_token())
            .find_map(NodeOrToken::into_node)
    }

    /// Returns the previous sibling node, skipping tokens.
    pub fn prev_sibling(self) -> Option<Self> {
        iter::successors(self.prev_sibling_or_token(), |it| it.prev_sibling_or_token())
            .find_map(NodeOrToken::into_node)
    }

    /// Returns the first token spanned by this node.
    ///
    /// Only an empty root has no tokens.
    #[inline]
    pub fn first_token(self) -> Option<SyntaxToken<'a>> {
        let (start, end) = self.data().tokens;
        (start < end).then_some(SyntaxToken { tree: self.tree, id: start })
    }

    /// Returns the last token spanned by this node.
    #[inline]
    pub fn last_token(self) -> Option<SyntaxToken<'a>> {
        let (start, end) = self.data().tokens;
        (start < end).then_some(SyntaxToken { tree: self.tree, id: end - 1 })
    }

    /// Iterates every token below this node in text order.
    pub fn tokens(self) -> impl DoubleEndedIterator<Item = SyntaxToken<'a>> + Clone {
        let tree = self.tree;
        let (start, end) = self.data().tokens;
        (start..end).map(move |id| SyntaxToken { tree, id })
    }

    /// Returns the token at the given offset, if any.
    ///
    /// An offset on the boundary of two tokens yields both.
    pub fn token_at_offset(self, offset: TextSize) -> TokenAtOffset<SyntaxToken<'a>> {
        let range = self.text_range();
        if !(range.start() <= offset && offset <= range.end()) {
            return TokenAtOffset::None;
        }

        let first = self.data().tokens.0;
        let tokens = self.token_refs();
        let index = tokens.partition_point(|token| token.range.end() <= offset);

        let token = |index: usize| SyntaxToken { tree: self.tree, id: first + index as u32 };
        let left = index
            .checked_sub(1)
            .filter(|&prev| tokens[prev].range.end() == offset && offset > range.start())
            .map(token);
        let right = tokens.get(index).filter(|it| it.range.start() <= offset).map(|_| token(index));

        match (left, right) {
            (Some(left), Some(right)) => TokenAtOffset::Between(left, right),
            (Some(single), _) | (None, Some(single)) => TokenAtOffset::Single(single),
            (None, None) => TokenAtOffset::None,
        }
    }

    /// Returns the smallest element that fully covers `range`.
    pub fn covering_element(self, range: TextRange) -> SyntaxElement<'a> {
        let mut node = self;

        loop {
            let child = node
                .children_with_tokens()
                .find(|child| child.text_range().contains_range(range));

            match child {
                Some(NodeOrToken::Node(child)) => node = child,
                Some(NodeOrToken::Token(token)) => return NodeOrToken::Token(token),
                None => return NodeOrToken::Node(node),
            }
        }
    }

    /// Returns a preorder iterator over nodes.
    #[inline]
    pub fn preorder(self) -> Preorder<'a> {
        Preorder::new(self)
    }

    /// Returns a preorder iterator over nodes and tokens.
    #[inline]
    pub fn preorder_with_tokens(self) -> PreorderWithTokens<'a> {
        PreorderWithTokens::new(self)
    }

    /// Renders the subtree one element per line, tokens with their text.
    pub fn debug_tree(self) -> String {
        let mut buf = String::new();
        let mut indent = 0;

        for event in self.preorder_with_tokens() {
            match event {
                WalkEventWithTokens::EnterNode(node) => {
                    _ = writeln!(buf, "{:indent$}{node:?}", "");
                    indent += 2;
                }
                WalkEventWithTokens::LeaveNode(_) => indent -= 2,
                WalkEventWithTokens::Token(token) => {
                    _ = writeln!(buf, "{:indent$}{token:?} {:?}", "", token.text());
                }
            }
        }

        buf
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxNode<'_> {}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.text_range())
    }
}

impl fmt::Display for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl<'a> SyntaxToken<'a> {
    #[inline]
    fn data(self) -> &'a TokenData {
        &self.tree.tokens[self.id as usize]
    }

    /// Returns this token's kind.
    #[inline]
    pub fn kind(self) -> SyntaxKind {
        self.data().kind
    }

    /// Returns `true` if this token is trivia.
    #[inline]
    pub fn is_trivia(self) -> bool {
        self.kind().is_trivia()
    }

    #[inline]
    pub fn text_range(self) -> TextRange {
        self.data().range
    }

    #[inline]
    pub fn range(self) -> TextRange {
        self.text_range()
    }

    #[inline]
    pub fn bytes(self) -> &'a [u8] {
        &self.tree.text[Range::<usize>::from(self.text_range())]
    }

    /// Returns the token text, replacing invalid UTF-8.
    #[inline]
    pub fn text(self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.bytes())
    }

    /// Returns the parent node.
    #[inline]
    pub fn parent(self) -> SyntaxNode<'a> {
        SyntaxNode { tree: self.tree, id: self.data().parent }
    }

    /// Returns an iterator of parent nodes, starting from the immediate parent.
    #[inline]
    pub fn parent_ancestors(self) -> impl Iterator<Item = SyntaxNode<'a>> + Clone {
        self.parent().ancestors()
    }

    /// Returns the previous token in the whole tree, if any.
    #[inline]
    pub fn prev_token(self) -> Option<Self> {
        let id = self.id.checked_sub(1)?;
        Some(Self { tree: self.tree, id })
    }

    /// Returns the next token in the whole tree, if any.
    #[inline]
    pub fn next_token(self) -> Option<Self> {
        let id = self.id + 1;
        ((id as usize) < self.tree.tokens.len()).then_some(Self { tree: self.tree, id })
    }

    #[inline]
    pub fn next_sibling_or_token(self) -> Option<SyntaxElement<'a>> {
        let data = self.data();
        sibling(self.tree, data.parent, data.index, 1)
    }

    #[inline]
    pub fn prev_sibling_or_token(self) -> Option<SyntaxElement<'a>> {
        let data = self.data();
        sibling(self.tree, data.parent, data.index, -1)
    }
}

impl PartialEq for SyntaxToken<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxToken<'_> {}

impl fmt::Debug for SyntaxToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.text_range())
    }
}

impl fmt::Display for SyntaxToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl<'a> SyntaxElement<'a> {
    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }

    #[inline]
    pub fn text_range(&self) -> TextRange {
        match self {
            NodeOrToken::Node(node) => node.text_range(),
            NodeOrToken::Token(token) => token.text_range(),
        }
    }

    #[inline]
    pub fn text(&self) -> Cow<'a, str> {
        match self {
            NodeOrToken::Node(node) => node.text(),
            NodeOrToken::Token(token) => token.text(),
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<SyntaxNode<'a>> {
        match self {
            NodeOrToken::Node(node) => node.parent(),
            NodeOrToken::Token(token) => Some(token.parent()),
        }
    }

    #[inline]
    pub fn next_sibling_or_token(&self) -> Option<Self> {
        match self {
            NodeOrToken::Node(node) => node.next_sibling_or_token(),
            NodeOrToken::Token(token) => token.next_sibling_or_token(),
        }
    }

    #[inline]
    pub fn prev_sibling_or_token(&self) -> Option<Self> {
        match self {
            NodeOrToken::Node(node) => node.prev_sibling_or_token(),
            NodeOrToken::Token(token) => token.prev_sibling_or_token(),
        }
    }
}

/// Iterator over children including tokens.
#[derive(Clone)]
pub struct ChildrenWithTokens<'a> {
    tree: &'a SyntaxTree,
    children: slice::Iter<'a, ChildRef>,
}

impl<'a> Iterator for ChildrenWithTokens<'a> {
    type Item = SyntaxElement<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.children.next().map(|&child| element(self.tree, child))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.children.size_hint()
    }

    #[inline]
    fn last(mut self) -> Option<Self::Item>
    where
        Self: Sized,
    {
        self.next_back()
    }
}

impl DoubleEndedIterator for ChildrenWithTokens<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.children.next_back().map(|&child| element(self.tree, child))
    }
}

impl ExactSizeIterator for ChildrenWithTokens<'_> {
    #[inline]
    fn len(&self) -> usize {
        self.children.len()
    }
}

/// Iterator over child nodes only.
#[derive(Clone)]
pub struct Children<'a> {
    inner: ChildrenWithTokens<'a>,
}

impl<'a> Iterator for Children<'a> {
    type Item = SyntaxNode<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.find_map(NodeOrToken::into_node)
    }
}

impl DoubleEndedIterator for Children<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().rev().find_map(NodeOrToken::into_node)
    }
}

/// Preorder traversal over nodes.
#[derive(Clone)]
pub struct Preorder<'a> {
    inner: PreorderWithTokens<'a>,
}

impl<'a> Preorder<'a> {
    #[inline]
    fn new(start: SyntaxNode<'a>) -> Self {
        Self { inner: PreorderWithTokens::new(start) }
    }

    /// Skips the current subtree during traversal.
    #[inline]
    pub fn skip_subtree(&mut self) {
        self.inner.skip_subtree();
    }
}

impl<'a> Iterator for Preorder<'a> {
    type Item = WalkEvent<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.find_map(|item| match item {
            WalkEventWithTokens::EnterNode(it) => Some(WalkEvent::Enter(it)),
            WalkEventWithTokens::LeaveNode(it) => Some(WalkEvent::Leave(it)),
            WalkEventWithTokens::Token(_) => None,
        })
    }
}

/// Preorder walk event for nodes.
#[derive(Clone, Copy, Debug)]
pub enum WalkEvent<'a> {
    Enter(SyntaxNode<'a>),
    Leave(SyntaxNode<'a>),
}

/// Preorder traversal over nodes and tokens.
#[derive(Clone)]
pub struct PreorderWithTokens<'a> {
    stack: Vec<(SyntaxNode<'a>, ChildrenWithTokens<'a>)>,
    root: Option<SyntaxNode<'a>>,
}

impl<'a> PreorderWithTokens<'a> {
    #[inline]
    fn new(start: SyntaxNode<'a>) -> Self {
        Self { stack: Vec::with_capacity(32), root: Some(start) }
    }

    /// Skips the rest of the most recently entered node.
    ///
    /// Its `LeaveNode` event is not reported.
    #[inline]
    #[track_caller]
    pub fn skip_subtree(&mut self) {
        assert!(self.stack.pop().is_some(), "must have a subtree to skip");
    }
}

impl<'a> Iterator for PreorderWithTokens<'a> {
    type Item = WalkEventWithTokens<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let Some((_, active_node)) = self.stack.last_mut() else {
            let root = self.root.take()?;
            self.stack.push((root, root.children_with_tokens()));
            return Some(WalkEventWithTokens::EnterNode(root));
        };

        match active_node.next() {
            Some(NodeOrToken::Node(child)) => {
                self.stack.push((child, child.children_with_tokens()));
                Some(WalkEventWithTokens::EnterNode(child))
            }
            Some(NodeOrToken::Token(child)) => Some(WalkEventWithTokens::Token(child)),
            None => {
                let (exited_node, _) = self.stack.pop()?;
                Some(WalkEventWithTokens::LeaveNode(exited_node))
            }
        }
    }
}

/// Preorder walk event including tokens.
#[derive(Clone, Copy, Debug)]
pub enum WalkEventWithTokens<'a> {
    EnterNode(SyntaxNode<'a>),
    LeaveNode(SyntaxNode<'a>),
    Token(SyntaxToken<'a>),
}

/// Node-or-token wrapper used throughout the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeOrToken<N, T> {
    Node(N),
    Token(T),
}

impl<N, T> NodeOrToken<N, T> {
    /// Converts into the node variant, if any.
    pub fn into_node(self) -> Option<N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    /// Converts into the token variant, if any.
    pub fn into_token(self) -> Option<T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }

    pub fn as_node(&self) -> Option<&N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }
}

impl<N: fmt::Display, T: fmt::Display> fmt::Display for NodeOrToken<N, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeOrToken::Node(node) => fmt::Display::fmt(node, f),
            NodeOrToken::Token(token) => fmt::Display::fmt(token, f),
        }
    }
}

/// There might be zero, one or two tokens at a given offset.
#[derive(Clone, Debug)]
pub enum TokenAtOffset<T> {
    /// No tokens at offset.
    None,
    /// Only a single token at offset.
    Single(T),
    /// Offset is exactly between two tokens.
    Between(T, T),
}

impl<T> TokenAtOffset<T> {
    /// Maps tokens to a different type.
    pub fn map<F: Fn(T) -> U, U>(self, f: F) -> TokenAtOffset<U> {
        match self {
            TokenAtOffset::None => TokenAtOffset::None,
            TokenAtOffset::Single(it) => TokenAtOffset::Single(f(it)),
            TokenAtOffset::Between(l, r) => TokenAtOffset::Between(f(l), f(r)),
        }
    }

    /// Convert to option, preferring the right token in case of a tie.
    pub fn right_biased(self) -> Option<T> {
        match self {
            Self::None => None,
            Self::Single(node) => Some(node),
            Self::Between(_, right) => Some(right),
        }
    }

    /// Convert to option, preferring the left token in case of a tie.
    pub fn left_biased(self) -> Option<T> {
        match self {
            Self::None => None,
            Self::Single(node) => Some(node),
            Self::Between(left, _) => Some(left),
        }
    }
}

impl<T> Iterator for TokenAtOffset<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        match std::mem::replace(self, Self::None) {
            Self::None => None,
            Self::Single(node) => Some(node),
            Self::Between(left, right) => {
                *self = Self::Single(right);
                Some(left)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::None => (0, Some(0)),
            Self::Single(_) => (1, Some(1)),
            Self::Between(_, _) => (2, Some(2)),
        }
    }
}

impl<T> ExactSizeIterator for TokenAtOffset<T> {}
