use ca65_syntax::{NodeOrToken, SyntaxElement, TreeCursor};

use crate::pattern::{Matcher, Pattern};
use crate::{Query, QueryCapture, QueryMatch};

/// Matches of a [`Query`] under one node, in preorder.
///
/// Computed lazily while walking the tree with a cursor; [`QueryMatches::reset`] starts
/// the walk over.
#[derive(Clone)]
pub struct QueryMatches<'q, 'a> {
    query: &'q Query,
    cursor: TreeCursor<'a>,
    /// The next pattern to try at the cursor.
    next_pattern: usize,
    done: bool,
}

impl<'q, 'a> QueryMatches<'q, 'a> {
    pub(crate) fn new(query: &'q Query, cursor: TreeCursor<'a>) -> Self {
        Self { query, cursor, next_pattern: 0, done: query.patterns.is_empty() }
    }

    pub fn reset(&mut self) {
        self.cursor.reset();
        self.next_pattern = 0;
        self.done = self.query.patterns.is_empty();
    }
}

impl<'a> Iterator for QueryMatches<'_, 'a> {
    type Item = QueryMatch<'a>;

    fn next(&mut self) -> Option<QueryMatch<'a>> {
        while !self.done {
            let element = self.cursor.element();
            if !element.kind().is_trivia() {
                while let Some(pattern) = self.query.patterns.get(self.next_pattern) {
                    let pattern_index = self.next_pattern;
                    self.next_pattern += 1;

                    let mut captures = Vec::new();
                    if pattern.matches(element, &mut captures) {
                        return Some(QueryMatch { pattern_index, captures });
                    }
                }
            }

            self.next_pattern = 0;
            self.done = !advance(&mut self.cursor);
        }
        None
    }
}

/// Moves to the next element in preorder; `false` once the walk is over.
fn advance(cursor: &mut TreeCursor<'_>) -> bool {
    if cursor.goto_first_child() {
        return true;
    }
    loop {
        if cursor.goto_next_sibling() {
            return true;
        }
        if !cursor.goto_parent() {
            return false;
        }
    }
}

impl Pattern {
    /// On failure `captures` is left as it was.
    fn matches<'a>(
        &self,
        element: SyntaxElement<'a>,
        captures: &mut Vec<QueryCapture<'a>>,
    ) -> bool {
        let accepted = match &self.matcher {
            Matcher::Kind(kind) => element.kind() == *kind,
            Matcher::Any { named } => !named || element.kind().is_named(),
            Matcher::Text(text) => {
                element.as_token().is_some_and(|token| token.text().eq_ignore_ascii_case(text))
            }
        };
        if !accepted {
            return false;
        }

        let mark = captures.len();
        if let Some(index) = self.capture {
            captures.push(QueryCapture { index, element });
        }
        if self.children.is_empty() {
            return true;
        }

        let NodeOrToken::Node(node) = element else {
            captures.truncate(mark);
            return false;
        };
        let mut children =
            node.children_with_tokens().filter(|child| !child.kind().is_trivia());
        if subsequence(&self.children, &mut children, captures) {
            return true;
        }
        captures.truncate(mark);
        false
    }
}

/// Matches `patterns` against an ordered subsequence of `elements`, leftmost first.
///
/// A pattern accepts an element regardless of its siblings, so the first accepting
/// element for each pattern in turn is a match whenever one exists.
fn subsequence<'a>(
    patterns: &[Pattern],
    elements: &mut impl Iterator<Item = SyntaxElement<'a>>,
    captures: &mut Vec<QueryCapture<'a>>,
) -> bool {
    patterns.iter().all(|pattern| elements.any(|element| pattern.matches(element, captures)))
}
