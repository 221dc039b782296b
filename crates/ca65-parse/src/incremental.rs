//! Reuse planning for incremental reparses.
//!
//! Only top-level children of the previous tree are reused. Each edit removes the
//! children it touches and shifts the ones after it; the parser then splices a
//! remaining child in whenever it reaches the child's start between two lines with no
//! block open.

use std::iter::Peekable;
use std::vec;

use ca65_errors::Diagnostic;
use ca65_syntax::{GreenNode, NodeOrToken};
use text_size::TextSize;

use crate::{Edit, Parse};

pub(crate) struct Candidate {
    /// Start in the new text.
    pub(crate) start: TextSize,
    /// Start in the previous text; diagnostics still use these coordinates.
    pub(crate) old_start: TextSize,
    pub(crate) node: GreenNode,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl Candidate {
    fn end(&self) -> TextSize {
        self.start + self.node.text_len()
    }
}

pub(crate) struct Reuse {
    candidates: Peekable<vec::IntoIter<Candidate>>,
    pub(crate) offered: usize,
    pub(crate) reused: usize,
    pub(crate) reused_bytes: u64,
}

impl Reuse {
    pub(crate) fn plan(old: &Parse, edits: &[Edit]) -> Self {
        let mut candidates = top_level_children(old);
        if old.is_cancelled() {
            // The last child stopped where the scan did, not where its text ends.
            candidates.pop();
        }

        for edit in edits {
            let (start, old_end, new_end) = edit.bounds();
            candidates.retain_mut(|candidate| {
                if candidate.end() < start {
                    return true;
                }
                if candidate.start > old_end {
                    candidate.start = candidate.start - old_end + new_end;
                    return true;
                }
                false
            });
        }

        Self {
            offered: candidates.len(),
            candidates: candidates.into_iter().peekable(),
            reused: 0,
            reused_bytes: 0,
        }
    }

    /// The candidate starting exactly at `offset`, if it still fits in the text.
    pub(crate) fn take(&mut self, offset: TextSize, text_len: TextSize) -> Option<Candidate> {
        while self.candidates.next_if(|candidate| candidate.start < offset).is_some() {}

        let candidate = self.candidates.next_if(|candidate| candidate.start == offset)?;
        if candidate.end() > text_len {
            return None;
        }

        self.reused += 1;
        self.reused_bytes += u64::from(u32::from(candidate.node.text_len()));
        Some(candidate)
    }
}

fn top_level_children(old: &Parse) -> Vec<Candidate> {
    let text_len = old.tree().text_len();
    let mut candidates = Vec::new();
    let mut offset = TextSize::new(0);

    for child in old.tree().green().children() {
        if let NodeOrToken::Node(node) = child {
            candidates.push(Candidate {
                start: offset,
                old_start: offset,
                node: node.clone(),
                diagnostics: Vec::new(),
            });
        }
        offset += child.text_len();
    }

    for diagnostic in old.diagnostics() {
        let at = diagnostic.range().start();
        let index = candidates.partition_point(|candidate| candidate.old_start <= at);
        let Some(candidate) = index.checked_sub(1).and_then(|index| candidates.get_mut(index))
        else {
            continue;
        };

        let end = candidate.end();
        if at < end || (at == end && end == text_len) {
            candidate.diagnostics.push(diagnostic.clone());
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use ca65_syntax::Language;
    use text_size::TextRange;

    use super::*;
    use crate::parse;

    fn starts(reuse: Reuse) -> Vec<u32> {
        reuse.candidates.map(|candidate| candidate.start.into()).collect()
    }

    #[test]
    fn edits_drop_touched_children_and_shift_the_rest() {
        let language = Language::ca65();
        let text = b"nop\nlda #1\nrts\n";
        let old = parse(&language, text);

        let edit = Edit::replace(text, TextRange::new(TextSize::new(5), TextSize::new(6)), b"lda");
        assert_eq!(starts(Reuse::plan(&old, &[edit])), [0, 13]);

        let append = Edit::replace(text, TextRange::empty(TextSize::new(15)), b"brk\n");
        assert_eq!(starts(Reuse::plan(&old, &[append])), [0, 4]);

        assert_eq!(starts(Reuse::plan(&old, &[])), [0, 4, 11]);
    }

    #[test]
    fn touching_an_end_invalidates() {
        let language = Language::ca65();
        let text = b"nop\nrts";
        let old = parse(&language, text);

        // Both lines touch offset 4.
        let edit = Edit::replace(text, TextRange::empty(TextSize::new(4)), b"x");
        assert!(starts(Reuse::plan(&old, &[edit])).is_empty());

        let edit = Edit::replace(text, TextRange::empty(TextSize::new(7)), b"\n");
        assert_eq!(starts(Reuse::plan(&old, &[edit])), [0]);
    }

    #[test]
    fn diagnostics_travel_with_their_child() {
        let language = Language::ca65();
        let old = parse(&language, b"nop\nlda #\n");
        assert_eq!(old.diagnostics().len(), 1);

        let reuse = Reuse::plan(&old, &[]);
        let counts: Vec<_> = reuse.candidates.map(|it| it.diagnostics.len()).collect();
        assert_eq!(counts, [0, 1]);
    }

    #[test]
    fn cancelled_parse_keeps_its_last_child_out() {
        let language = Language::ca65();
        let mut old = parse(&language, b"nop\nrts\n");
        old.cancelled = true;
        assert_eq!(starts(Reuse::plan(&old, &[])), [0]);
    }
}
