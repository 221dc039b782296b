use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ca65_syntax::ast::{self, AddressingMode, Node, Statement};
use ca65_syntax::SyntaxKind::*;
use ca65_syntax::{GreenNode, Language, NodeOrToken, TextRange, TextSize};
use expect_test::{expect, expect_file};

use crate::parser::Parser;
use crate::{
    Edit, Parse, ParseError, ParseOptions, build, parse, parse_source, parse_with, reparse,
};

#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct TestCase {
    input: PathBuf,
    expected: PathBuf,
    text: Vec<u8>,
}

impl TestCase {
    fn list() -> Vec<Self> {
        let test_data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data");

        let mut cases = fs::read_dir(&test_data_dir)
            .unwrap_or_else(|err| {
                panic!("Cannot read directory {}: {err}", test_data_dir.display())
            })
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension()? == "s" {
                    let expected = path.with_extension("tree");
                    let text = fs::read(&path).ok()?;
                    Some(Self { input: path, expected, text })
                } else {
                    None
                }
            })
            .collect::<Vec<_>>();

        cases.sort();
        cases
    }
}

#[test]
fn parse_test_data() {
    let language = Language::ca65();
    let cases = TestCase::list();
    assert!(!cases.is_empty());

    for case in cases {
        let parse = parse(&language, &case.text);
        check_invariants(&case.text, &parse);
        expect_file![&case.expected].assert_eq(&parse.debug_dump());
    }
}

/// Lossless, sorted diagnostics, and only lines and blocks at the top.
fn check_invariants(text: &[u8], parse: &Parse) {
    let root = parse.root();
    assert_eq!(root.kind(), SOURCE_FILE);
    assert_eq!(root.range(), TextRange::up_to(TextSize::new(text.len() as u32)));

    let bytes: Vec<u8> = root.tokens().flat_map(|token| token.bytes().iter().copied()).collect();
    assert_eq!(bytes, text);

    assert!(parse.diagnostics().is_sorted_by_key(|diag| diag.range().start()));
    for diag in parse.diagnostics() {
        assert!(diag.range().end() <= root.range().end(), "{diag:?}");
    }

    for child in root.children_with_tokens() {
        let NodeOrToken::Node(child) = child else { panic!("token at the top level: {child:?}") };
        assert!(
            matches!(
                child.kind(),
                LINE | MACRO_DEFINITION
                    | CONDITIONAL
                    | SCOPE_BLOCK
                    | REPEAT_BLOCK
                    | STRUCT_BLOCK
                    | ENUM_BLOCK
            ),
            "{child:?}"
        );
    }
}

#[test]
fn macro_with_one_instruction() {
    let language = Language::ca65();
    let parse = parse(&language, b".macro foo\n        lda #1\n.endmacro\n");
    assert!(!parse.has_errors());

    let file = ast::SourceFile::cast(parse.root()).unwrap();
    let macros: Vec<_> = file.macros().collect();
    assert_eq!(macros.len(), 1);

    let def = macros[0];
    assert_eq!(def.name().unwrap().text(), "foo");
    assert_eq!(def.params().count(), 0);
    assert!(def.is_terminated());

    let body: Vec<_> = def.body().collect();
    assert_eq!(body.len(), 1);
    let line = ast::Line::cast(body[0]).unwrap();
    let Some(Statement::Instruction(instruction)) = line.statement() else {
        panic!("expected an instruction");
    };
    assert_eq!(instruction.mnemonic().unwrap().text(), "lda");
    assert_eq!(instruction.mode(), AddressingMode::Immediate);
}

#[test]
fn macro_params_may_spell_registers() {
    let language = Language::ca65();
    let parse = parse(&language, b".macro ld a, x, inc\n        lda a\n.endmacro\n");
    assert!(!parse.has_errors(), "{}", parse.debug_dump());

    let file = ast::SourceFile::cast(parse.root()).unwrap();
    let def = file.macros().next().unwrap();
    assert_eq!(def.name().unwrap().text(), "ld");
    let params: Vec<_> = def.params().map(|param| param.text()).collect();
    assert_eq!(params, ["a", "x", "inc"]);

    let define = crate::parse(&language, b".define pick(x, y) x\n");
    assert!(!define.has_errors(), "{}", define.debug_dump());

    let missing = crate::parse(&language, b".macro m 1\n.endmacro\n");
    assert_eq!(missing.diagnostics()[0].message(), "expected a parameter name");
}

#[test]
fn label_operand_and_comment() {
    let language = Language::ca65();
    let parse = parse(&language, b"loop:   lda $10,x ; read\n");
    assert!(!parse.has_errors());

    let file = ast::SourceFile::cast(parse.root()).unwrap();
    let lines: Vec<_> = file.lines().collect();
    assert_eq!(lines.len(), 1);

    let line = lines[0];
    let labels: Vec<_> = line.labels().collect();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].name().unwrap().text(), "loop");
    assert!(!labels[0].is_local());

    let Some(Statement::Instruction(instruction)) = line.statement() else {
        panic!("expected an instruction");
    };
    assert_eq!(instruction.mode(), AddressingMode::ZeroPageX);
    assert_eq!(instruction.operand().unwrap().index_register().unwrap().text(), "x");
    assert_eq!(line.comment().unwrap().text(), "; read");
}

#[test]
fn malformed_operand_is_an_error() {
    let language = Language::ca65();
    let parse = parse(&language, b"lda $$\n");
    assert!(parse.has_errors());
    assert_eq!(parse.diagnostics().len(), 1);
    assert_eq!(parse.diagnostics()[0].message(), "expected expression");

    let file = ast::SourceFile::cast(parse.root()).unwrap();
    let line = file.lines().next().unwrap();
    let Some(Statement::Instruction(instruction)) = line.statement() else {
        panic!("expected an instruction");
    };
    let operand = instruction.operand().unwrap();
    assert_eq!(operand.mode(), AddressingMode::Invalid);
    assert_eq!(operand.syntax().first_child().unwrap().kind(), ERROR);
}

#[test]
fn define_macros_are_called_in_operands() {
    let language = Language::ca65();
    let parse = parse(&language, b".define sq(v) v*v\n  lda #sq(3)\n  sta sq(4),x\n");
    assert!(!parse.has_errors(), "{}", parse.debug_dump());

    let file = ast::SourceFile::cast(parse.root()).unwrap();
    let instructions: Vec<_> = file
        .lines()
        .filter_map(|line| match line.statement() {
            Some(Statement::Instruction(instruction)) => Some(instruction),
            _ => None,
        })
        .collect();
    assert_eq!(instructions.len(), 2);
    assert_eq!(instructions[0].mode(), AddressingMode::Immediate);
    assert_eq!(instructions[1].mode(), AddressingMode::AbsoluteX);

    let Some(ast::Expr::Macro(call)) = instructions[0].operand().unwrap().expr() else {
        panic!("expected a macro call");
    };
    assert_eq!(call.name().unwrap().text(), "sq");
    let args: Vec<_> = call.args().map(|arg| arg.syntax().text()).collect();
    assert_eq!(args, ["3"]);

    // With a space the parenthesis no longer belongs to the name.
    let spaced = crate::parse(&language, b"  lda #sq (3)\n");
    assert!(spaced.has_errors());
}

#[test]
fn mismatched_closer() {
    let language = Language::ca65();
    let parse = parse(&language, b".proc main\n.endif\n.endproc\n");
    expect![[r#"
        SOURCE_FILE@0..27
          SCOPE_BLOCK@0..27
            LINE@0..11
              DIRECTIVE@0..10
                DIRECTIVE_KW@0..5 ".proc"
                WHITESPACE@5..6 " "
                IDENTIFIER@6..10
                  IDENT@6..10 "main"
              EOL@10..11 "\n"
            LINE@11..18
              ERROR@11..17
                DIRECTIVE_KW@11..17 ".endif"
              EOL@17..18 "\n"
            LINE@18..27
              DIRECTIVE@18..26
                DIRECTIVE_KW@18..26 ".endproc"
              EOL@26..27 "\n"
        Errors:
          11..17 expected `.endproc`, found `.endif`
    "#]]
    .assert_eq(&parse.debug_dump());
}

#[test]
fn unknown_directive_and_stray_tokens() {
    let language = Language::ca65();
    let parse = parse(&language, b".frob 1\n) lda\n");
    expect![[r#"
        SOURCE_FILE@0..14
          LINE@0..8
            ERROR@0..7
              DOT_IDENT@0..5 ".frob"
              WHITESPACE@5..6 " "
              NUMBER@6..7 "1"
            EOL@7..8 "\n"
          LINE@8..14
            ERROR@8..9
              RIGHT_PAREN@8..9 ")"
            WHITESPACE@9..10 " "
            INSTRUCTION@10..13
              MNEMONIC@10..13 "lda"
            EOL@13..14 "\n"
        Errors:
          0..7 unknown directive `.frob`
          8..9 expected a statement
    "#]]
    .assert_eq(&parse.debug_dump());
}

#[test]
fn extra_mnemonics() {
    let text = b"stz $10\n";

    let plain = parse(&Language::ca65(), text);
    let line = plain.root().first_child().unwrap();
    assert_eq!(line.first_child().unwrap().kind(), MACRO_CALL);

    let language = Language::ca65().with_extra_mnemonics(["stz"]);
    let extended = parse(&language, text);
    let line = extended.root().first_child().unwrap();
    assert_eq!(line.first_child().unwrap().kind(), INSTRUCTION);
}

struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }
}

const ALPHABET: &[u8] = b" \t\n\r;:,.#$%@()+-*<>={}\\\"'abcxyz019ldaifendprocmacro";

#[test]
fn any_input_parses() {
    let language = Language::ca65();
    let fixed: &[&[u8]] = &[
        b"",
        b"\n",
        b"   ",
        b"\xff\xfe lda\n",
        b".if",
        b".endif",
        b")))",
        b"lda (",
        b"lda (1,x",
        b"\"open",
        b":",
        b"::",
        b"{{{",
        b".macro\n.endproc",
        b"lda #\\\n1",
        b"\r\n\r\n",
    ];
    for text in fixed {
        check_invariants(text, &parse(&language, text));
    }

    let mut rng = XorShift(0x2545_f491_4f6c_dd1d);
    for _ in 0..500 {
        let len = rng.below(64);
        let text: Vec<u8> = (0..len)
            .map(|_| match rng.below(8) {
                0 => rng.next() as u8,
                _ => ALPHABET[rng.below(ALPHABET.len())],
            })
            .collect();
        check_invariants(&text, &parse(&language, &text));
    }
}

const SAMPLE: &str = "\
.macro push16 addr
        lda addr
        pha
.endmacro
start:  sei
        ldx #$ff ; stack
@loop:  lda table,x
        sta $0200,x
        dex
        bne @loop
.proc irq
        .if 1
        rti
        .else
        jmp (vector)
        .endif
.endproc
.struct Point
        xpos .word
.endstruct
value = (1 + 2) * 3
";

const FRAGMENTS: &[&[u8]] = &[
    b"",
    b"\n",
    b" ",
    b"lda #1",
    b".if 1\n",
    b".endif\n",
    b".proc p\n",
    b".endproc",
    b".endmacro\n",
    b":",
    b"(",
    b")",
    b",x",
    b"; c",
    b"\"",
    b"{",
    b"\\\n",
    b"@l:",
    b"\xff",
];

fn random_edit(rng: &mut XorShift, text: &[u8]) -> (Edit, Vec<u8>) {
    let start = rng.below(text.len() + 1);
    let end = start + rng.below((text.len() - start).min(8) + 1);
    let replacement = FRAGMENTS[rng.below(FRAGMENTS.len())];

    let range = TextRange::new(TextSize::new(start as u32), TextSize::new(end as u32));
    let edit = Edit::replace(text, range, replacement);

    let mut new_text = text[..start].to_vec();
    new_text.extend_from_slice(replacement);
    new_text.extend_from_slice(&text[end..]);
    (edit, new_text)
}

#[test]
fn reparse_matches_a_fresh_parse() {
    let language = Language::ca65();
    let mut rng = XorShift(0x9e37_79b9_7f4a_7c15);
    let mut text = SAMPLE.as_bytes().to_vec();
    let mut old = parse(&language, &text);

    for _ in 0..300 {
        let mut edits = Vec::new();
        let mut new_text = text.clone();
        for _ in 0..=rng.below(2) {
            let (edit, next) = random_edit(&mut rng, &new_text);
            edits.push(edit);
            new_text = next;
        }

        let reparsed = reparse(&language, &old, &new_text, &edits);
        let fresh = parse(&language, &new_text);
        assert_eq!(
            reparsed.debug_dump(),
            fresh.debug_dump(),
            "text: {:?}",
            String::from_utf8_lossy(&new_text)
        );
        check_invariants(&new_text, &reparsed);

        if new_text.len() > 4 * SAMPLE.len() {
            text = SAMPLE.as_bytes().to_vec();
            old = parse(&language, &text);
        } else {
            text = new_text;
            old = reparsed;
        }
    }
}

fn top_level(parse: &Parse) -> Vec<GreenNode> {
    parse
        .tree()
        .green()
        .children()
        .iter()
        .filter_map(|child| match child {
            NodeOrToken::Node(node) => Some(node.clone()),
            NodeOrToken::Token(_) => None,
        })
        .collect()
}

#[test]
fn reparse_without_edits_shares_everything() {
    let language = Language::ca65();
    let old = parse(&language, SAMPLE.as_bytes());
    let new = reparse(&language, &old, SAMPLE.as_bytes(), &[]);

    let (old_children, new_children) = (top_level(&old), top_level(&new));
    assert_eq!(old_children.len(), new_children.len());
    assert!(old_children.iter().zip(&new_children).all(|(old, new)| old.ptr_eq(new)));
}

#[test]
fn reparse_shares_untouched_lines() {
    let language = Language::ca65();
    let text = b"nop\nlda #1\nrts\n";
    let old = parse(&language, text);

    let range = TextRange::new(TextSize::new(9), TextSize::new(10));
    let edit = Edit::replace(text, range, b"$22");
    let new_text = b"nop\nlda #$22\nrts\n";
    let new = reparse(&language, &old, new_text, &[edit]);
    assert_eq!(new.debug_dump(), parse(&language, new_text).debug_dump());

    let (old_children, new_children) = (top_level(&old), top_level(&new));
    assert!(new_children[0].ptr_eq(&old_children[0]));
    assert!(!new_children[1].ptr_eq(&old_children[1]));
    assert!(new_children[2].ptr_eq(&old_children[2]));
}

#[test]
fn reparse_moves_diagnostics() {
    let language = Language::ca65();
    let text = b"nop\nlda #\n";
    let old = parse(&language, text);

    let edit = Edit::replace(text, TextRange::empty(TextSize::new(0)), b"clc\n");
    let new_text = b"clc\nnop\nlda #\n";
    let new = reparse(&language, &old, new_text, &[edit]);

    assert_eq!(new.diagnostics().len(), 1);
    assert_eq!(new.diagnostics()[0].range(), TextRange::new(TextSize::new(13), TextSize::new(14)));
    assert!(top_level(&new)[2].ptr_eq(&top_level(&old)[1]));
}

#[test]
fn cancelled_before_the_first_token() {
    let language = Language::ca65();
    let flag = Arc::new(AtomicBool::new(true));
    let options = ParseOptions::new().with_cancellation(flag);

    let outcome = parse_with(&language, b"nop\nrts\n", &options).unwrap();
    assert!(outcome.is_cancelled());

    let cancelled = outcome.into_parse();
    assert!(cancelled.is_cancelled());
    assert_eq!(cancelled.tree().text_len(), TextSize::new(0));
    assert_eq!(cancelled.root().children().count(), 0);

    let text = b"nop\nrts\n";
    let resumed = reparse(&language, &cancelled, text, &[]);
    assert!(!resumed.is_cancelled());
    assert_eq!(resumed.debug_dump(), parse(&language, text).debug_dump());
}

#[test]
fn cancelled_inside_a_block() {
    let language = Language::ca65();
    let text = b".proc main\nnop\nrts\n.endproc\n";
    let flag = AtomicBool::new(false);

    // `.proc main` and `nop` are already scanned when the flag goes up.
    let mut parser = Parser::new(&language, text, Some(&flag), None);
    assert_eq!(parser.nth_kind(4), EOL);
    flag.store(true, Ordering::Relaxed);

    let cancelled = build(text, parser);
    assert!(cancelled.is_cancelled());
    expect![[r#"
        SOURCE_FILE@0..15
          SCOPE_BLOCK@0..15
            LINE@0..11
              DIRECTIVE@0..10
                DIRECTIVE_KW@0..5 ".proc"
                WHITESPACE@5..6 " "
                IDENTIFIER@6..10
                  IDENT@6..10 "main"
              EOL@10..11 "\n"
            LINE@11..15
              INSTRUCTION@11..14
                MNEMONIC@11..14 "nop"
              EOL@14..15 "\n"
        Errors:
          0..5 unterminated block, expected `.endproc`
    "#]]
    .assert_eq(&cancelled.debug_dump());

    let resumed = reparse(&language, &cancelled, text, &[]);
    assert!(!resumed.is_cancelled());
    assert!(!resumed.has_errors());
    assert_eq!(resumed.debug_dump(), parse(&language, text).debug_dump());
}

#[test]
fn input_limits() {
    let language = Language::ca65();
    let options = ParseOptions::new().with_max_input_len(3);
    assert!(matches!(
        parse_with(&language, b"nop\n", &options),
        Err(ParseError::InputTooLarge { len: 4, limit: 3 })
    ));

    let source = String::from("nop\nrts\n");
    let options = ParseOptions::new().with_max_input_len(4);
    assert!(matches!(
        parse_source(&language, &source, &options),
        Err(ParseError::InputTooLarge { len: 8, limit: 4 })
    ));

    let rejected = Parse::rejected(&ParseError::InputTooLarge { len: 5, limit: 4 });
    assert!(rejected.is_cancelled());
    assert!(rejected.has_errors());
    expect![[r#"
        SOURCE_FILE@0..0
        Errors:
          0..0 input of 5 bytes exceeds the limit of 4 bytes
    "#]]
    .assert_eq(&rejected.debug_dump());

    let outcome = parse_source(&language, &source, &ParseOptions::new()).unwrap();
    assert!(!outcome.is_cancelled());
    assert_eq!(
        outcome.into_parse().debug_dump(),
        parse(&language, source.as_bytes()).debug_dump()
    );
}
