//! Keyword tables for the ca65 dialect.
//!
//! A [`Language`] is built once and shared by reference between the tokenizer and the
//! grammar. Lookups are case-insensitive and never allocate.

use rustc_hash::FxHashMap;

use crate::SyntaxKind;

/// What a word means to the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Mnemonic,
    Register,
    Directive(Directive),
    PseudoFunction,
    PseudoVariable,
    DotOperator,
}

impl Keyword {
    pub const fn syntax_kind(self) -> SyntaxKind {
        match self {
            Keyword::Mnemonic => SyntaxKind::MNEMONIC,
            Keyword::Register => SyntaxKind::REGISTER,
            Keyword::Directive(_) => SyntaxKind::DIRECTIVE_KW,
            Keyword::PseudoFunction => SyntaxKind::PSEUDO_FN_KW,
            Keyword::PseudoVariable => SyntaxKind::PSEUDO_VAR_KW,
            Keyword::DotOperator => SyntaxKind::DOT_OP_KW,
        }
    }
}

/// A control command and the shape of its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive {
    /// Canonical spelling, aliases resolve to it.
    pub name: &'static str,
    pub args: DirectiveArgs,
    pub block: BlockRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveArgs {
    None,
    /// Comma separated expressions, each optionally followed by `: addrsize`.
    Exprs,
    /// `on`, `off`, `+` or `-`, possibly omitted.
    Toggle,
    /// Comma separated words, each optionally followed by `+` or `-`.
    Words,
    /// `.macro name param, ...`
    MacroHeader,
    /// `.define name(params) replacement`
    Define,
    /// `name .set expr`, only valid after a symbol.
    Assignment,
}

/// How a directive takes part in block structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRole {
    None,
    Open(BlockKind),
    /// `.else` and `.elseif`.
    Branch,
    Close(BlockKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Macro,
    Conditional,
    Proc,
    Scope,
    Repeat,
    Struct,
    Union,
    Enum,
}

impl BlockKind {
    pub const fn syntax_kind(self) -> SyntaxKind {
        match self {
            Self::Macro => SyntaxKind::MACRO_DEFINITION,
            Self::Conditional => SyntaxKind::CONDITIONAL,
            Self::Proc | Self::Scope => SyntaxKind::SCOPE_BLOCK,
            Self::Repeat => SyntaxKind::REPEAT_BLOCK,
            Self::Struct | Self::Union => SyntaxKind::STRUCT_BLOCK,
            Self::Enum => SyntaxKind::ENUM_BLOCK,
        }
    }

    /// Lines of these blocks declare members rather than statements.
    pub const fn has_fields(self) -> bool {
        matches!(self, Self::Struct | Self::Union | Self::Enum)
    }

    pub const fn closer(self) -> &'static str {
        match self {
            Self::Macro => ".endmacro",
            Self::Conditional => ".endif",
            Self::Proc => ".endproc",
            Self::Scope => ".endscope",
            Self::Repeat => ".endrepeat",
            Self::Struct => ".endstruct",
            Self::Union => ".endunion",
            Self::Enum => ".endenum",
        }
    }
}

const MNEMONICS: &[&str] = &[
    "adc", "and", "asl", "bcc", "bcs", "beq", "bit", "bmi", "bne", "bpl", "brk", "bvc", "bvs",
    "clc", "cld", "cli", "clv", "cmp", "cpx", "cpy", "dec", "dex", "dey", "eor", "inc", "inx",
    "iny", "jmp", "jsr", "lda", "ldx", "ldy", "lsr", "nop", "ora", "pha", "php", "pla", "plp",
    "rol", "ror", "rti", "rts", "sbc", "sec", "sed", "sei", "sta", "stx", "sty", "tax", "tay",
    "tsx", "txa", "txs", "tya",
];

const REGISTERS: &[&str] = &["a", "x", "y"];

const PSEUDO_FUNCTIONS: &[&str] = &[
    ".addrsize",
    ".bank",
    ".bankbyte",
    ".blank",
    ".cap",
    ".capability",
    ".concat",
    ".const",
    ".def",
    ".defined",
    ".definedmacro",
    ".hibyte",
    ".hiword",
    ".ident",
    ".ismnem",
    ".ismnemonic",
    ".left",
    ".lobyte",
    ".loword",
    ".match",
    ".max",
    ".mid",
    ".min",
    ".ref",
    ".referenced",
    ".right",
    ".sizeof",
    ".sprintf",
    ".start",
    ".string",
    ".strlen",
    ".tcount",
    ".xmatch",
];

const PSEUDO_VARIABLES: &[&str] = &[".asize", ".cpu", ".isize", ".paramcount", ".time", ".version"];

const DOT_OPERATORS: &[&str] = &[
    ".mod", ".bitand", ".bitxor", ".shl", ".shr", ".bitor", ".and", ".or", ".xor", ".not",
    ".bitnot",
];

const ALIASES: &[(&str, &str)] = &[
    (".byt", ".byte"),
    (".delmac", ".delmacro"),
    (".endmac", ".endmacro"),
    (".exitmac", ".exitmacro"),
    (".fopt", ".fileopt"),
    (".mac", ".macro"),
    (".refto", ".referto"),
    (".undef", ".undefine"),
];

macro_rules! directives {
    ($($name:literal => $args:ident $(, $block:expr)?;)*) => {
        &[$(Directive {
            name: $name,
            args: DirectiveArgs::$args,
            block: directives!(@block $($block)?),
        },)*]
    };
    (@block) => { BlockRole::None };
    (@block $block:expr) => { $block };
}

use BlockKind::*;
use BlockRole::{Branch, Close, Open};

const DIRECTIVES: &[Directive] = directives! {
    ".a16" => None;
    ".a8" => None;
    ".addr" => Exprs;
    ".align" => Exprs;
    ".asciiz" => Exprs;
    ".assert" => Exprs;
    ".autoimport" => Toggle;
    ".bankbytes" => Exprs;
    ".bss" => None;
    ".byte" => Exprs;
    ".case" => Toggle;
    ".charmap" => Exprs;
    ".code" => None;
    ".condes" => Exprs;
    ".constructor" => Exprs;
    ".data" => None;
    ".dbg" => Exprs;
    ".dbyt" => Exprs;
    ".debuginfo" => Toggle;
    ".define" => Define;
    ".delmacro" => Exprs;
    ".destructor" => Exprs;
    ".dword" => Exprs;
    ".else" => None, Branch;
    ".elseif" => Exprs, Branch;
    ".end" => None;
    ".endenum" => None, Close(Enum);
    ".endif" => None, Close(Conditional);
    ".endmacro" => None, Close(Macro);
    ".endproc" => None, Close(Proc);
    ".endrepeat" => None, Close(Repeat);
    ".endscope" => None, Close(Scope);
    ".endstruct" => None, Close(Struct);
    ".endunion" => None, Close(Union);
    ".enum" => Exprs, Open(Enum);
    ".error" => Exprs;
    ".exitmacro" => None;
    ".export" => Exprs;
    ".exportzp" => Exprs;
    ".faraddr" => Exprs;
    ".fatal" => Exprs;
    ".feature" => Words;
    ".fileopt" => Exprs;
    ".forceimport" => Exprs;
    ".global" => Exprs;
    ".globalzp" => Exprs;
    ".hibytes" => Exprs;
    ".i16" => None;
    ".i8" => None;
    ".if" => Exprs, Open(Conditional);
    ".ifblank" => Exprs, Open(Conditional);
    ".ifconst" => Exprs, Open(Conditional);
    ".ifdef" => Exprs, Open(Conditional);
    ".ifnblank" => Exprs, Open(Conditional);
    ".ifndef" => Exprs, Open(Conditional);
    ".ifnref" => Exprs, Open(Conditional);
    ".ifp02" => None, Open(Conditional);
    ".ifp4510" => None, Open(Conditional);
    ".ifp816" => None, Open(Conditional);
    ".ifpc02" => None, Open(Conditional);
    ".ifpdtv" => None, Open(Conditional);
    ".ifpsc02" => None, Open(Conditional);
    ".ifref" => Exprs, Open(Conditional);
    ".import" => Exprs;
    ".importzp" => Exprs;
    ".incbin" => Exprs;
    ".include" => Exprs;
    ".interruptor" => Exprs;
    ".list" => Toggle;
    ".listbytes" => Exprs;
    ".literal" => Exprs;
    ".lobytes" => Exprs;
    ".local" => Exprs;
    ".localchar" => Exprs;
    ".macpack" => Words;
    ".macro" => MacroHeader, Open(Macro);
    ".org" => Exprs;
    ".out" => Exprs;
    ".p02" => None;
    ".p4510" => None;
    ".p816" => None;
    ".pagelen" => Exprs;
    ".pagelength" => Exprs;
    ".pc02" => None;
    ".pdtv" => None;
    ".popcharmap" => None;
    ".popcpu" => None;
    ".popseg" => None;
    ".proc" => Exprs, Open(Proc);
    ".psc02" => None;
    ".pushcharmap" => None;
    ".pushcpu" => None;
    ".pushseg" => None;
    ".referto" => Exprs;
    ".reloc" => None;
    ".repeat" => Exprs, Open(Repeat);
    ".res" => Exprs;
    ".rodata" => None;
    ".scope" => Exprs, Open(Scope);
    ".segment" => Exprs;
    ".set" => Assignment;
    ".setcpu" => Exprs;
    ".smart" => Toggle;
    ".struct" => Exprs, Open(Struct);
    ".tag" => Exprs;
    ".undefine" => Exprs;
    ".union" => Exprs, Open(Union);
    ".warning" => Exprs;
    ".word" => Exprs;
    ".zeropage" => None;
};

/// Longest keyword we look up; longer words are never keywords.
const MAX_KEYWORD_LEN: usize = 32;

/// Immutable keyword tables for one assembler dialect.
#[derive(Debug, Clone)]
pub struct Language {
    keywords: FxHashMap<Box<str>, Keyword>,
}

impl Default for Language {
    fn default() -> Self {
        Self::ca65()
    }
}

impl Language {
    /// The stock ca65 dialect with the 6502 instruction set.
    pub fn ca65() -> Self {
        let mut keywords = FxHashMap::default();

        let words = [
            (MNEMONICS, Keyword::Mnemonic),
            (REGISTERS, Keyword::Register),
            (PSEUDO_FUNCTIONS, Keyword::PseudoFunction),
            (PSEUDO_VARIABLES, Keyword::PseudoVariable),
            (DOT_OPERATORS, Keyword::DotOperator),
        ];
        for (names, keyword) in words {
            keywords.extend(names.iter().map(|&name| (Box::from(name), keyword)));
        }

        for &directive in DIRECTIVES {
            keywords.insert(Box::from(directive.name), Keyword::Directive(directive));
        }
        for &(alias, target) in ALIASES {
            if let Some(&keyword) = keywords.get(target) {
                keywords.insert(Box::from(alias), keyword);
            }
        }

        Self { keywords }
    }

    /// Adds mnemonics, e.g. for 65C02 or undocumented opcodes.
    ///
    /// Names longer than the lookup buffer are ignored.
    pub fn with_extra_mnemonics<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        for name in names {
            if !name.is_empty() && name.len() <= MAX_KEYWORD_LEN {
                self.keywords.insert(name.to_ascii_lowercase().into(), Keyword::Mnemonic);
            }
        }
        self
    }

    /// Classifies `word`, ignoring ASCII case. Dot words include the leading `.`.
    pub fn keyword(&self, word: &[u8]) -> Option<Keyword> {
        if word.is_empty() || word.len() > MAX_KEYWORD_LEN {
            return None;
        }

        let mut buf = [0u8; MAX_KEYWORD_LEN];
        let buf = &mut buf[..word.len()];
        buf.copy_from_slice(word);
        buf.make_ascii_lowercase();

        let word = std::str::from_utf8(buf).ok()?;
        self.keywords.get(word).copied()
    }

    pub fn directive(&self, word: &[u8]) -> Option<Directive> {
        match self.keyword(word)? {
            Keyword::Directive(directive) => Some(directive),
            _ => None,
        }
    }

    pub fn is_mnemonic(&self, word: &[u8]) -> bool {
        self.keyword(word) == Some(Keyword::Mnemonic)
    }
}
