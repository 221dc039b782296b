macro_rules! syntax_kinds {
    ($($kind:ident => $name:literal,)*) => {
        /// Closed set of token and node kinds.
        ///
        /// Tokens come first and end with `EOF`, nodes follow.
        #[allow(non_camel_case_types)]
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
        #[repr(u16)]
        pub enum SyntaxKind {
            $($kind,)*
        }

        impl SyntaxKind {
            /// Every kind in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$kind,)*];

            /// Lowercase name used by query patterns.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$kind => $name,)*
                }
            }
        }
    };
}

syntax_kinds! {
    WHITESPACE => "whitespace",
    COMMENT => "comment",
    LINE_CONTINUATION => "line_continuation",
    EOL => "eol",

    HASH => "hash",
    COMMA => "comma",
    COLON => "colon",
    COLON2 => "colon2",
    COLON_EQ => "colon_eq",
    EQ => "eq",
    LEFT_PAREN => "left_paren",
    RIGHT_PAREN => "right_paren",
    LEFT_BRACE => "left_brace",
    RIGHT_BRACE => "right_brace",
    LEFT_BRACKET => "left_bracket",
    RIGHT_BRACKET => "right_bracket",
    PLUS => "plus",
    MINUS => "minus",
    STAR => "star",
    SLASH => "slash",
    AMP => "amp",
    AMP2 => "amp2",
    PIPE => "pipe",
    PIPE2 => "pipe2",
    CARET => "caret",
    TILDE => "tilde",
    BANG => "bang",
    LT => "lt",
    GT => "gt",
    LT_EQ => "lt_eq",
    GT_EQ => "gt_eq",
    LT_GT => "lt_gt",
    SHL => "shl",
    SHR => "shr",

    IDENT => "ident",
    LOCAL_IDENT => "local_ident",
    MNEMONIC => "mnemonic",
    REGISTER => "register",
    DIRECTIVE_KW => "directive_kw",
    PSEUDO_FN_KW => "pseudo_fn_kw",
    PSEUDO_VAR_KW => "pseudo_var_kw",
    DOT_OP_KW => "dot_op_kw",
    DOT_IDENT => "dot_ident",
    NUMBER => "number",
    CHAR => "char",
    STRING => "string",
    UNNAMED_REF => "unnamed_ref",
    ERROR_TOKEN => "error_token",
    EOF => "eof",

    SOURCE_FILE => "source_file",
    LINE => "line",
    LABEL => "label",
    INSTRUCTION => "instruction",
    OPERAND => "operand",
    DIRECTIVE => "directive",
    FIELD => "field",
    SYMBOL_ASSIGNMENT => "symbol_assignment",
    MACRO_CALL => "macro_call",
    MACRO_ARG => "macro_arg",
    MACRO_DEFINITION => "macro_definition",
    CONDITIONAL => "conditional",
    SCOPE_BLOCK => "scope_block",
    REPEAT_BLOCK => "repeat_block",
    STRUCT_BLOCK => "struct_block",
    ENUM_BLOCK => "enum_block",
    BINARY_EXPR => "binary_expr",
    UNARY_EXPR => "unary_expr",
    PAREN_EXPR => "paren_expr",
    CALL_EXPR => "call_expr",
    NUMBER_LITERAL => "number_literal",
    CHAR_LITERAL => "char_literal",
    STRING_LITERAL => "string_literal",
    IDENTIFIER => "identifier",
    MEMBER => "member",
    LOCAL_LABEL_REF => "local_label_ref",
    UNNAMED_LABEL_REF => "unnamed_label_ref",
    PSEUDO_VAR => "pseudo_var",
    ERROR => "error",
    TOMBSTONE => "tombstone",
}

use SyntaxKind::*;

impl SyntaxKind {
    #[inline]
    pub const fn is_token(self) -> bool {
        self as u16 <= EOF as u16
    }

    #[inline]
    pub const fn is_node(self) -> bool {
        !self.is_token() && !matches!(self, TOMBSTONE)
    }

    #[inline]
    pub const fn is_trivia(self) -> bool {
        matches!(self, WHITESPACE | COMMENT | LINE_CONTINUATION)
    }

    /// Kinds that show up as children in query patterns. Punctuation, operators and
    /// layout tokens are anonymous.
    pub const fn is_named(self) -> bool {
        if self.is_node() {
            return true;
        }

        matches!(
            self,
            COMMENT
                | IDENT
                | LOCAL_IDENT
                | MNEMONIC
                | REGISTER
                | DIRECTIVE_KW
                | PSEUDO_FN_KW
                | PSEUDO_VAR_KW
                | DOT_OP_KW
                | DOT_IDENT
                | NUMBER
                | CHAR
                | STRING
                | UNNAMED_REF
                | ERROR_TOKEN
        )
    }

    /// Nodes that take the trivia preceding their first token.
    ///
    /// Every other node starts at its first significant token, the trivia before it
    /// stays with the enclosing node.
    pub const fn absorbs_trivia(self) -> bool {
        matches!(self, SOURCE_FILE | LINE) || self.is_block()
    }

    pub const fn is_block(self) -> bool {
        matches!(
            self,
            MACRO_DEFINITION | CONDITIONAL | SCOPE_BLOCK | REPEAT_BLOCK | STRUCT_BLOCK | ENUM_BLOCK
        )
    }

    #[inline]
    pub const fn is_error(self) -> bool {
        matches!(self, ERROR | ERROR_TOKEN)
    }

    /// Looks a kind up by its lowercase name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name && *kind != TOMBSTONE)
    }
}
