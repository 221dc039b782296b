//! Declarative pattern queries over ca65 syntax trees.
//!
//! A query is a list of patterns:
//!
//! ```text
//! (instruction "lda" (operand (_) @value (register) @index)) @load
//! (label) @label
//! ```
//!
//! `(kind child*)` matches an element of that kind whose children contain the child
//! patterns in order, not necessarily adjacent. `(_)` matches any named element, `_`
//! any element, and `"text"` a token with that text. `@name` captures the element the
//! preceding pattern matched.

use ca65_syntax::{SyntaxElement, SyntaxNode, TreeCursor};
use text_size::TextRange;

mod lexer;
mod matches;
mod pattern;

pub use matches::QueryMatches;
use pattern::Pattern;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("unexpected `{text}`")]
    Unexpected { text: String, range: TextRange },
    #[error("unexpected end of query")]
    UnexpectedEnd { range: TextRange },
    #[error("unknown node kind `{name}`")]
    UnknownKind { name: String, range: TextRange },
    #[error("unclosed `(`")]
    Unclosed { range: TextRange },
    #[error("patterns nest deeper than {limit} levels")]
    TooDeep { limit: usize, range: TextRange },
}

impl QueryError {
    /// Where in the query source the problem is.
    pub fn range(&self) -> TextRange {
        match self {
            QueryError::Unexpected { range, .. }
            | QueryError::UnexpectedEnd { range }
            | QueryError::UnknownKind { range, .. }
            | QueryError::Unclosed { range }
            | QueryError::TooDeep { range, .. } => *range,
        }
    }
}

/// A compiled query. Immutable and reusable across trees.
#[derive(Debug)]
pub struct Query {
    patterns: Vec<Pattern>,
    capture_names: Vec<String>,
}

impl Query {
    pub fn new(source: &str) -> Result<Self, QueryError> {
        let compiled = pattern::compile(source)?;
        log::debug!(
            "compiled query: {} patterns, {} captures",
            compiled.patterns.len(),
            compiled.capture_names.len()
        );
        Ok(Self { patterns: compiled.patterns, capture_names: compiled.capture_names })
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Capture names, indexed by [`QueryCapture::index`].
    pub fn capture_names(&self) -> &[String] {
        &self.capture_names
    }

    pub fn capture_index_for_name(&self, name: &str) -> Option<u32> {
        self.capture_names.iter().position(|it| it == name).map(|index| index as u32)
    }

    /// Every match in `node` and its descendants.
    pub fn matches<'q, 'a>(&'q self, node: SyntaxNode<'a>) -> QueryMatches<'q, 'a> {
        QueryMatches::new(self, TreeCursor::new(node))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMatch<'a> {
    pub pattern_index: usize,
    /// In pattern order, a parent before its children.
    pub captures: Vec<QueryCapture<'a>>,
}

impl<'a> QueryMatch<'a> {
    pub fn elements_for_capture_index(
        &self,
        index: u32,
    ) -> impl Iterator<Item = SyntaxElement<'a>> + '_ {
        self.captures.iter().filter(move |it| it.index == index).map(|it| it.element)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryCapture<'a> {
    pub index: u32,
    pub element: SyntaxElement<'a>,
}

#[cfg(test)]
mod tests {
    use ca65_parse::parse;
    use ca65_syntax::Language;
    use expect_test::expect;
    use text_size::TextSize;

    use super::*;

    const SOURCE: &[u8] = b"\
start:  lda #1
        sta $10,x
.proc main
        lda (ptr),y
.endproc
";

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::new(start), TextSize::new(end))
    }

    /// One line per match: pattern index, then `name=text` per capture.
    fn run(query: &str, text: &[u8]) -> String {
        let query = Query::new(query).unwrap();
        let parse = parse(&Language::ca65(), text);

        let mut buf = String::new();
        for m in query.matches(parse.root()) {
            buf.push_str(&m.pattern_index.to_string());
            for capture in &m.captures {
                let name = &query.capture_names()[capture.index as usize];
                buf.push_str(&format!(" {name}={:?}", capture.element.text()));
            }
            buf.push('\n');
        }
        buf
    }

    #[test]
    fn instructions_with_text() {
        expect![[r##"
            0 insn="lda #1" operand="#1"
            0 insn="lda (ptr),y" operand="(ptr),y"
        "##]]
        .assert_eq(&run(r#"(instruction "LDA" (operand) @operand) @insn"#, SOURCE));
    }

    #[test]
    fn children_are_a_subsequence() {
        expect![[r#"
            0 value="$10" index="x"
            0 value="ptr" index="y"
        "#]]
        .assert_eq(&run("(operand (_) @value (register) @index)", SOURCE));
    }

    #[test]
    fn wide_nodes_match_in_one_pass() {
        let text = "nop\n".repeat(5000);
        let parse = parse(&Language::ca65(), text.as_bytes());

        let missing = Query::new("(source_file (line) (line) (line) (line) (error))").unwrap();
        assert_eq!(missing.matches(parse.root()).count(), 0);

        let query = "(source_file (line) (line) @second (line) (line) @fourth)";
        let query = Query::new(query).unwrap();
        let matches: Vec<_> = query.matches(parse.root()).collect();
        assert_eq!(matches.len(), 1);
        let ranges: Vec<_> =
            matches[0].captures.iter().map(|it| it.element.text_range()).collect();
        assert_eq!(ranges, [range(4, 8), range(12, 16)]);
    }

    #[test]
    fn patterns_report_in_tree_order() {
        expect![[r#"
            0 label="start:"
            1 kw=".proc"
            1 kw=".endproc"
        "#]]
        .assert_eq(&run("(label) @label (directive_kw) @kw", SOURCE));
    }

    #[test]
    fn error_nodes_are_queryable() {
        expect![[r#"
            0 e="$$"
        "#]]
        .assert_eq(&run("(error) @e", b"lda $$\n"));
    }

    #[test]
    fn matches_restart() {
        let query = Query::new("(instruction) @i").unwrap();
        let parse = parse(&Language::ca65(), SOURCE);

        let all: Vec<_> = query.matches(parse.root()).collect();
        assert_eq!(all.len(), 3);

        let mut matches = query.matches(parse.root());
        let first = matches.next();
        let rest = matches.clone();
        matches.reset();
        assert_eq!(matches.next(), first);
        assert_eq!(rest.count(), 2);
        assert_eq!(query.matches(parse.root()).collect::<Vec<_>>(), all);
    }

    #[test]
    fn capture_names_are_shared() {
        let query = Query::new("(label) @name (macro_call (ident) @name)").unwrap();
        assert_eq!(query.pattern_count(), 2);
        assert_eq!(query.capture_names(), ["name"]);
        assert_eq!(query.capture_index_for_name("name"), Some(0));
        assert_eq!(query.capture_index_for_name("other"), None);

        let empty = Query::new("  ; nothing\n").unwrap();
        assert_eq!(empty.pattern_count(), 0);
        let parse = parse(&Language::ca65(), SOURCE);
        assert_eq!(empty.matches(parse.root()).count(), 0);
    }

    #[test]
    fn compile_errors() {
        assert_eq!(
            Query::new("(nope)").unwrap_err(),
            QueryError::UnknownKind { name: "nope".to_owned(), range: range(1, 5) }
        );
        assert_eq!(Query::new("(line").unwrap_err(), QueryError::Unclosed { range: range(0, 1) });
        assert_eq!(
            Query::new(")").unwrap_err(),
            QueryError::Unexpected { text: ")".to_owned(), range: range(0, 1) }
        );
        assert_eq!(
            Query::new("(line) @").unwrap_err(),
            QueryError::Unexpected { text: "@".to_owned(), range: range(7, 8) }
        );
        assert_eq!(
            Query::new("(").unwrap_err(),
            QueryError::UnexpectedEnd { range: TextRange::empty(TextSize::new(1)) }
        );

        let deep = "(line ".repeat(100);
        let err = Query::new(&deep).unwrap_err();
        assert!(matches!(err, QueryError::TooDeep { limit: 64, .. }), "{err:?}");
        assert_eq!(err.range(), range(390, 391));
        assert_eq!(err.to_string(), "patterns nest deeper than 64 levels");
    }
}
