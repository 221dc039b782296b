//! Arena index over a green tree.
//!
//! Every node and token gets a `u32` slot with its absolute range, its parent slot and
//! its position among its siblings. Handles are `(tree, index)` pairs, so navigation
//! never allocates and parent links never own anything.

use std::fmt;

use text_size::{TextRange, TextSize};

use crate::{GreenNode, NodeOrToken, SyntaxKind, SyntaxNode};

/// Immutable syntax tree for one source text.
pub struct SyntaxTree {
    pub(crate) text: Box<[u8]>,
    pub(crate) green: GreenNode,
    pub(crate) nodes: Box<[NodeData]>,
    pub(crate) tokens: Box<[TokenData]>,
    pub(crate) children: Box<[ChildRef]>,
}

pub(crate) struct NodeData {
    pub(crate) kind: SyntaxKind,
    pub(crate) range: TextRange,
    pub(crate) parent: Option<u32>,
    pub(crate) index: u32,
    pub(crate) children: (u32, u32),
    pub(crate) tokens: (u32, u32),
    pub(crate) green: GreenNode,
}

pub(crate) struct TokenData {
    pub(crate) kind: SyntaxKind,
    pub(crate) range: TextRange,
    pub(crate) parent: u32,
    pub(crate) index: u32,
}

#[derive(Clone, Copy)]
pub(crate) enum ChildRef {
    Node(u32),
    Token(u32),
}

struct Frame {
    node: u32,
    green: GreenNode,
    next_child: usize,
    offset: TextSize,
}

impl SyntaxTree {
    /// Indexes `green`, which must describe exactly `text`.
    #[track_caller]
    pub fn new(text: impl Into<Box<[u8]>>, green: GreenNode) -> Self {
        let text = text.into();
        assert_eq!(
            usize::from(green.text_len()),
            text.len(),
            "green tree does not match the text length"
        );

        let mut nodes = Vec::new();
        let mut tokens = Vec::new();
        let mut children = Vec::new();

        nodes.push(NodeData {
            kind: green.kind(),
            range: TextRange::at(TextSize::new(0), green.text_len()),
            parent: None,
            index: 0,
            children: alloc_children(&mut children, &green),
            tokens: (0, 0),
            green: green.clone(),
        });

        let mut stack =
            vec![Frame { node: 0, green: green.clone(), next_child: 0, offset: TextSize::new(0) }];

        while let Some(frame) = stack.last_mut() {
            let Some(child) = frame.green.children().get(frame.next_child).cloned() else {
                nodes[frame.node as usize].tokens.1 = tokens.len() as u32;
                stack.pop();
                continue;
            };

            let parent = frame.node;
            let index = frame.next_child as u32;
            let slot = nodes[parent as usize].children.0 as usize + frame.next_child;
            let range = TextRange::at(frame.offset, child.text_len());
            frame.next_child += 1;
            frame.offset = range.end();

            match &child {
                NodeOrToken::Token(token) => {
                    children[slot] = ChildRef::Token(tokens.len() as u32);
                    tokens.push(TokenData { kind: token.kind(), range, parent, index });
                }
                NodeOrToken::Node(node) => {
                    let id = nodes.len() as u32;
                    children[slot] = ChildRef::Node(id);
                    let first_token = tokens.len() as u32;
                    nodes.push(NodeData {
                        kind: node.kind(),
                        range,
                        parent: Some(parent),
                        index,
                        children: alloc_children(&mut children, node),
                        tokens: (first_token, first_token),
                        green: node.clone(),
                    });
                    stack.push(Frame {
                        node: id,
                        green: node.clone(),
                        next_child: 0,
                        offset: range.start(),
                    });
                }
            }
        }

        Self {
            text,
            green,
            nodes: nodes.into_boxed_slice(),
            tokens: tokens.into_boxed_slice(),
            children: children.into_boxed_slice(),
        }
    }

    /// Returns the root syntax node.
    #[inline]
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode { tree: self, id: 0 }
    }

    /// Returns the root green node.
    #[inline]
    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    /// Returns the source bytes this tree covers.
    #[inline]
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    #[inline]
    pub fn text_len(&self) -> TextSize {
        self.green.text_len()
    }

    /// Number of nodes, root included.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaves, trivia included.
    #[inline]
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Returns the smallest node whose range covers `offset`.
    ///
    /// The end of the text counts as covered by the nodes that end there.
    pub fn node_at_offset(&self, offset: TextSize) -> Option<SyntaxNode<'_>> {
        let end = self.text_len();
        let covers = |range: TextRange| {
            range.contains(offset) || (range.end() == offset && offset == end)
        };

        let mut node = self.root();
        if !covers(node.text_range()) {
            return None;
        }

        while let Some(child) = node.children().find(|child| covers(child.text_range())) {
            node = child;
        }

        Some(node)
    }
}

fn alloc_children(children: &mut Vec<ChildRef>, green: &GreenNode) -> (u32, u32) {
    let start = children.len();
    children.resize(start + green.children().len(), ChildRef::Token(0));
    (start as u32, children.len() as u32)
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("text_len", &self.text.len())
            .field("nodes", &self.nodes.len())
            .field("tokens", &self.tokens.len())
            .finish_non_exhaustive()
    }
}
