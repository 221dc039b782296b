use crate::SyntaxKind::{self, *};
use crate::{NodeOrToken, SyntaxElement, SyntaxNode, SyntaxToken};

pub trait Node<'a>: Copy {
    fn cast(syntax: SyntaxNode<'a>) -> Option<Self>;

    fn syntax(self) -> SyntaxNode<'a>;
}

macro_rules! ast_node {
    ($($(#[$attr:meta])* $name:ident => $kind:pat,)*) => {$(
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name<'a>(SyntaxNode<'a>);

        impl<'a> Node<'a> for $name<'a> {
            fn cast(syntax: SyntaxNode<'a>) -> Option<Self> {
                matches!(syntax.kind(), $kind).then_some(Self(syntax))
            }

            fn syntax(self) -> SyntaxNode<'a> {
                self.0
            }
        }
    )*};
}

ast_node! {
    SourceFile => SOURCE_FILE,
    /// One physical line, continuation lines included.
    Line => LINE,
    Label => LABEL,
    Instruction => INSTRUCTION,
    Operand => OPERAND,
    Directive => DIRECTIVE,
    Field => FIELD,
    SymbolAssignment => SYMBOL_ASSIGNMENT,
    MacroCall => MACRO_CALL,
    MacroArg => MACRO_ARG,
    MacroDefinition => MACRO_DEFINITION,
    /// Any `.if`, `.proc`, `.scope`, `.repeat`, `.struct`, `.union` or `.enum` block.
    Block => CONDITIONAL | SCOPE_BLOCK | REPEAT_BLOCK | STRUCT_BLOCK | ENUM_BLOCK,
    BinaryExpr => BINARY_EXPR,
    UnaryExpr => UNARY_EXPR,
    ParenExpr => PAREN_EXPR,
    CallExpr => CALL_EXPR,
    Literal => NUMBER_LITERAL | CHAR_LITERAL | STRING_LITERAL,
    Name => IDENTIFIER | MEMBER | LOCAL_LABEL_REF | UNNAMED_LABEL_REF | PSEUDO_VAR,
}

fn children<'a, N: Node<'a> + 'a>(node: SyntaxNode<'a>) -> impl Iterator<Item = N> + 'a {
    node.children().filter_map(N::cast)
}

fn child<'a, N: Node<'a> + 'a>(node: SyntaxNode<'a>) -> Option<N> {
    children(node).next()
}

fn significant<'a>(node: SyntaxNode<'a>) -> impl Iterator<Item = SyntaxElement<'a>> + 'a {
    node.children_with_tokens().filter(|element| !element.kind().is_trivia())
}

fn token<'a>(node: SyntaxNode<'a>, kinds: &[SyntaxKind]) -> Option<SyntaxToken<'a>> {
    node.children_with_tokens()
        .filter_map(NodeOrToken::into_token)
        .find(|token| kinds.contains(&token.kind()))
}

impl<'a> SourceFile<'a> {
    /// Every line in text order, including the lines inside blocks.
    pub fn lines(self) -> impl Iterator<Item = Line<'a>> + 'a {
        self.0.preorder().filter_map(|event| match event {
            crate::WalkEvent::Enter(node) => Line::cast(node),
            crate::WalkEvent::Leave(_) => None,
        })
    }

    pub fn macros(self) -> impl Iterator<Item = MacroDefinition<'a>> + 'a {
        self.0.preorder().filter_map(|event| match event {
            crate::WalkEvent::Enter(node) => MacroDefinition::cast(node),
            crate::WalkEvent::Leave(_) => None,
        })
    }
}

/// What a line does after its labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement<'a> {
    Instruction(Instruction<'a>),
    Directive(Directive<'a>),
    SymbolAssignment(SymbolAssignment<'a>),
    MacroCall(MacroCall<'a>),
    Field(Field<'a>),
}

impl<'a> Node<'a> for Statement<'a> {
    fn cast(syntax: SyntaxNode<'a>) -> Option<Self> {
        Some(match syntax.kind() {
            INSTRUCTION => Statement::Instruction(Instruction(syntax)),
            DIRECTIVE => Statement::Directive(Directive(syntax)),
            SYMBOL_ASSIGNMENT => Statement::SymbolAssignment(SymbolAssignment(syntax)),
            MACRO_CALL => Statement::MacroCall(MacroCall(syntax)),
            FIELD => Statement::Field(Field(syntax)),
            _ => return None,
        })
    }

    fn syntax(self) -> SyntaxNode<'a> {
        match self {
            Statement::Instruction(it) => it.0,
            Statement::Directive(it) => it.0,
            Statement::SymbolAssignment(it) => it.0,
            Statement::MacroCall(it) => it.0,
            Statement::Field(it) => it.0,
        }
    }
}

impl<'a> Line<'a> {
    pub fn labels(self) -> impl Iterator<Item = Label<'a>> + 'a {
        children(self.0)
    }

    pub fn statement(self) -> Option<Statement<'a>> {
        child(self.0)
    }

    pub fn comment(self) -> Option<SyntaxToken<'a>> {
        token(self.0, &[COMMENT])
    }
}

impl<'a> Label<'a> {
    /// `None` for the unnamed label `:`.
    pub fn name(self) -> Option<SyntaxToken<'a>> {
        token(self.0, &[IDENT, LOCAL_IDENT])
    }

    pub fn is_local(self) -> bool {
        self.name().is_some_and(|name| name.kind() == LOCAL_IDENT)
    }

    pub fn is_unnamed(self) -> bool {
        self.name().is_none()
    }
}

/// 6502 addressing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    /// `(zp,x)`
    IndexedIndirect,
    /// `(zp),y`
    IndirectIndexed,
    Relative,
    Invalid,
}

const BRANCHES: &[&str] = &["bcc", "bcs", "beq", "bmi", "bne", "bpl", "bvc", "bvs"];

/// Jumps have no zero-page form.
const JUMPS: &[&str] = &["jmp", "jsr"];

impl<'a> Instruction<'a> {
    pub fn mnemonic(self) -> Option<SyntaxToken<'a>> {
        token(self.0, &[MNEMONIC])
    }

    pub fn operand(self) -> Option<Operand<'a>> {
        child(self.0)
    }

    pub fn mode(self) -> AddressingMode {
        let Some(operand) = self.operand() else {
            return AddressingMode::Implied;
        };

        let mnemonic = self.mnemonic().map(|it| it.text().to_ascii_lowercase());
        let is = |table: &[&str]| mnemonic.as_deref().is_some_and(|it| table.contains(&it));

        match operand.mode() {
            AddressingMode::ZeroPage | AddressingMode::Absolute if is(BRANCHES) => {
                AddressingMode::Relative
            }
            AddressingMode::ZeroPage if is(JUMPS) => AddressingMode::Absolute,
            mode => mode,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum AddressSize {
    Auto,
    ZeroPage,
    Absolute,
}

impl<'a> Operand<'a> {
    /// The address expression, or the immediate value.
    pub fn expr(self) -> Option<Expr<'a>> {
        child(self.0)
    }

    /// Classifies the operand on its own; branches are refined by [`Instruction::mode`].
    pub fn mode(self) -> AddressingMode {
        use AddressingMode::*;

        let elements: Vec<_> = significant(self.0).collect();
        let (size, elements) = match elements.as_slice() {
            [NodeOrToken::Token(size), NodeOrToken::Token(colon), rest @ ..]
                if colon.kind() == COLON =>
            {
                match size.text().to_ascii_lowercase().as_str() {
                    "z" => (AddressSize::ZeroPage, rest),
                    "a" | "f" => (AddressSize::Absolute, rest),
                    _ => return Invalid,
                }
            }
            elements => (AddressSize::Auto, elements),
        };

        let register = |element: &SyntaxElement<'_>| match element {
            NodeOrToken::Token(token) if token.kind() == REGISTER => {
                Some(token.text().to_ascii_lowercase())
            }
            _ => None,
        };
        let expr = |element: &SyntaxElement<'a>| element.as_node().copied().and_then(Expr::cast);
        let zero_page = |expr: Expr<'a>| match size {
            AddressSize::ZeroPage => true,
            AddressSize::Absolute => false,
            AddressSize::Auto => expr.is_zero_page(),
        };
        let kinds: Vec<_> = elements.iter().map(SyntaxElement::kind).collect();

        match (kinds.as_slice(), elements) {
            ([REGISTER], [reg])
                if size == AddressSize::Auto && register(reg).as_deref() == Some("a") =>
            {
                Accumulator
            }
            ([HASH, _], [_, value]) if size == AddressSize::Auto && expr(value).is_some() => {
                Immediate
            }
            ([_], [value]) => match expr(value) {
                Some(value) if zero_page(value) => ZeroPage,
                Some(_) => Absolute,
                None => Invalid,
            },
            ([_, COMMA, REGISTER], [value, _, reg]) => {
                let Some(value) = expr(value) else { return Invalid };
                match (register(reg).as_deref(), zero_page(value)) {
                    (Some("x"), true) => ZeroPageX,
                    (Some("x"), false) => AbsoluteX,
                    (Some("y"), true) => ZeroPageY,
                    (Some("y"), false) => AbsoluteY,
                    _ => Invalid,
                }
            }
            ([LEFT_PAREN, _, COMMA, REGISTER, RIGHT_PAREN], [_, value, _, reg, _])
                if expr(value).is_some() && register(reg).as_deref() == Some("x") =>
            {
                IndexedIndirect
            }
            ([LEFT_PAREN, _, RIGHT_PAREN, COMMA, REGISTER], [_, value, _, _, reg])
                if expr(value).is_some() && register(reg).as_deref() == Some("y") =>
            {
                IndirectIndexed
            }
            ([LEFT_PAREN, _, RIGHT_PAREN], [_, value, _]) if expr(value).is_some() => Indirect,
            _ => Invalid,
        }
    }

    /// `x` or `y` for indexed forms.
    pub fn index_register(self) -> Option<SyntaxToken<'a>> {
        significant(self.0)
            .filter_map(NodeOrToken::into_token)
            .filter(|token| token.kind() == REGISTER)
            .last()
            .filter(|register| !register.text().eq_ignore_ascii_case("a"))
    }
}

impl<'a> Directive<'a> {
    pub fn keyword(self) -> Option<SyntaxToken<'a>> {
        token(self.0, &[DIRECTIVE_KW])
    }

    /// Lowercase spelling of the keyword as written, aliases included.
    pub fn name(self) -> Option<String> {
        self.keyword().map(|it| it.text().to_ascii_lowercase())
    }

    /// The symbol a directive declares: macro and `.define` names.
    pub fn declared_name(self) -> Option<SyntaxToken<'a>> {
        token(self.0, &[IDENT])
    }

    pub fn args(self) -> impl Iterator<Item = Expr<'a>> + 'a {
        children(self.0)
    }
}

impl<'a> Field<'a> {
    pub fn name(self) -> Option<SyntaxToken<'a>> {
        token(self.0, &[IDENT])
    }

    /// The storage directive of a struct member, like `.byte` or `.tag`.
    pub fn storage(self) -> Option<Directive<'a>> {
        child(self.0)
    }

    /// The explicit value of an enum member.
    pub fn value(self) -> Option<Expr<'a>> {
        child(self.0)
    }
}

impl<'a> SymbolAssignment<'a> {
    pub fn name(self) -> Option<SyntaxToken<'a>> {
        token(self.0, &[IDENT, LOCAL_IDENT])
    }

    /// `true` for `:=`, which also defines a label.
    pub fn is_label(self) -> bool {
        token(self.0, &[COLON_EQ]).is_some()
    }

    /// `true` for `.set`, which makes the symbol reassignable.
    pub fn is_variable(self) -> bool {
        token(self.0, &[DIRECTIVE_KW]).is_some()
    }

    pub fn value(self) -> Option<Expr<'a>> {
        child(self.0)
    }
}

impl<'a> MacroCall<'a> {
    pub fn name(self) -> Option<SyntaxToken<'a>> {
        token(self.0, &[IDENT])
    }

    pub fn args(self) -> impl Iterator<Item = MacroArg<'a>> + 'a {
        children(self.0)
    }
}

impl MacroArg<'_> {
    pub fn is_braced(self) -> bool {
        self.0.first_token().is_some_and(|token| token.kind() == LEFT_BRACE)
    }
}

fn opener<'a>(block: SyntaxNode<'a>) -> Option<Line<'a>> {
    block.first_child().and_then(Line::cast)
}

/// The closing line, present only if its directive closes this block.
fn closer<'a>(block: SyntaxNode<'a>) -> Option<Line<'a>> {
    let line = block.last_child().and_then(Line::cast)?;
    let opener = opener(block)?;
    if line == opener {
        return None;
    }

    match line.statement()? {
        Statement::Directive(directive) => {
            let name = directive.name()?;
            (name.starts_with(".end") && name != ".end").then_some(line)
        }
        _ => None,
    }
}

impl<'a> MacroDefinition<'a> {
    pub fn header(self) -> Option<Directive<'a>> {
        match opener(self.0)?.statement()? {
            Statement::Directive(directive) => Some(directive),
            _ => None,
        }
    }

    pub fn name(self) -> Option<SyntaxToken<'a>> {
        self.header()?.declared_name()
    }

    pub fn params(self) -> impl Iterator<Item = SyntaxToken<'a>> + 'a {
        self.header()
            .into_iter()
            .flat_map(|header| header.0.children_with_tokens())
            .filter_map(NodeOrToken::into_token)
            .filter(|token| matches!(token.kind(), IDENT | REGISTER | MNEMONIC))
            .skip(1)
    }

    /// Lines and nested blocks between the header and `.endmacro`.
    pub fn body(self) -> impl Iterator<Item = SyntaxNode<'a>> + 'a {
        let closer = closer(self.0).map(Line::syntax);
        self.0.children().skip(1).filter(move |node| Some(*node) != closer)
    }

    pub fn is_terminated(self) -> bool {
        closer(self.0).is_some()
    }
}

impl<'a> Block<'a> {
    pub fn kind(self) -> SyntaxKind {
        self.0.kind()
    }

    pub fn opener(self) -> Option<Directive<'a>> {
        match opener(self.0)?.statement()? {
            Statement::Directive(directive) => Some(directive),
            _ => None,
        }
    }

    /// `.proc` and `.scope` names, or the struct tag.
    pub fn name(self) -> Option<SyntaxToken<'a>> {
        let name = self.opener()?.args().next()?;
        match name {
            Expr::Name(name) if name.0.kind() == IDENTIFIER => name.0.first_token(),
            _ => None,
        }
    }

    pub fn body(self) -> impl Iterator<Item = SyntaxNode<'a>> + 'a {
        let closer = closer(self.0).map(Line::syntax);
        self.0.children().skip(1).filter(move |node| Some(*node) != closer)
    }

    pub fn is_terminated(self) -> bool {
        closer(self.0).is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expr<'a> {
    Binary(BinaryExpr<'a>),
    Unary(UnaryExpr<'a>),
    Paren(ParenExpr<'a>),
    Call(CallExpr<'a>),
    /// A `.define` macro with parameters, invoked as `name(args)`.
    Macro(MacroCall<'a>),
    Literal(Literal<'a>),
    Name(Name<'a>),
}

impl<'a> Node<'a> for Expr<'a> {
    fn cast(syntax: SyntaxNode<'a>) -> Option<Self> {
        Some(match syntax.kind() {
            BINARY_EXPR => Expr::Binary(BinaryExpr(syntax)),
            UNARY_EXPR => Expr::Unary(UnaryExpr(syntax)),
            PAREN_EXPR => Expr::Paren(ParenExpr(syntax)),
            CALL_EXPR => Expr::Call(CallExpr(syntax)),
            MACRO_CALL => Expr::Macro(MacroCall(syntax)),
            NUMBER_LITERAL | CHAR_LITERAL | STRING_LITERAL => Expr::Literal(Literal(syntax)),
            IDENTIFIER | MEMBER | LOCAL_LABEL_REF | UNNAMED_LABEL_REF | PSEUDO_VAR => {
                Expr::Name(Name(syntax))
            }
            _ => return None,
        })
    }

    fn syntax(self) -> SyntaxNode<'a> {
        match self {
            Expr::Binary(it) => it.0,
            Expr::Unary(it) => it.0,
            Expr::Paren(it) => it.0,
            Expr::Call(it) => it.0,
            Expr::Macro(it) => it.0,
            Expr::Literal(it) => it.0,
            Expr::Name(it) => it.0,
        }
    }
}

const MAX_FOLD_DEPTH: usize = 64;

impl<'a> Expr<'a> {
    /// Folds expressions made of literals and operators. Symbols are unknown.
    pub fn const_value(self) -> Option<i64> {
        self.fold(0)
    }

    /// Whether the operand selects a zero-page form on its own.
    pub fn is_zero_page(self) -> bool {
        match self {
            Expr::Unary(unary) => {
                matches!(unary.op().map(|op| op.kind()), Some(LT | GT | CARET))
                    || self.const_value().is_some_and(|value| (0..=0xFF).contains(&value))
            }
            Expr::Call(call) => {
                matches!(call.name().as_deref(), Some(".lobyte" | ".hibyte" | ".bankbyte"))
                    || self.const_value().is_some_and(|value| (0..=0xFF).contains(&value))
            }
            _ => self.const_value().is_some_and(|value| (0..=0xFF).contains(&value)),
        }
    }

    fn fold(self, depth: usize) -> Option<i64> {
        if depth > MAX_FOLD_DEPTH {
            return None;
        }

        match self {
            Expr::Literal(literal) => literal.value(),
            Expr::Name(_) | Expr::Macro(_) => None,
            Expr::Paren(paren) => paren.expr()?.fold(depth + 1),
            Expr::Unary(unary) => {
                let value = unary.operand()?.fold(depth + 1)?;
                let op = unary.op()?;
                Some(match op.kind() {
                    PLUS => value,
                    MINUS => value.wrapping_neg(),
                    TILDE => !value,
                    LT => value & 0xFF,
                    GT => (value >> 8) & 0xFF,
                    CARET => (value >> 16) & 0xFF,
                    BANG => i64::from(value == 0),
                    DOT_OP_KW => match op.text().to_ascii_lowercase().as_str() {
                        ".not" => i64::from(value == 0),
                        ".bitnot" => !value,
                        _ => return None,
                    },
                    _ => return None,
                })
            }
            Expr::Binary(binary) => {
                let lhs = binary.lhs()?.fold(depth + 1)?;
                let rhs = binary.rhs()?.fold(depth + 1)?;
                let op = binary.op()?;
                let op = match op.kind() {
                    DOT_OP_KW => op.text().to_ascii_lowercase(),
                    kind => kind.name().to_owned(),
                };
                binary_op(&op, lhs, rhs)
            }
            Expr::Call(call) => {
                let name = call.name()?;
                let mut args = call.args();
                let value = args.next()?.fold(depth + 1)?;
                if args.next().is_some() {
                    return None;
                }
                Some(match name.as_str() {
                    ".lobyte" => value & 0xFF,
                    ".hibyte" => (value >> 8) & 0xFF,
                    ".bankbyte" => (value >> 16) & 0xFF,
                    ".loword" => value & 0xFFFF,
                    ".hiword" => (value >> 16) & 0xFFFF,
                    _ => return None,
                })
            }
        }
    }
}

fn binary_op(op: &str, lhs: i64, rhs: i64) -> Option<i64> {
    let shift = |rhs: i64| u32::try_from(rhs).ok().filter(|&it| it < 64);

    Some(match op {
        "plus" => lhs.wrapping_add(rhs),
        "minus" => lhs.wrapping_sub(rhs),
        "star" => lhs.wrapping_mul(rhs),
        "slash" => lhs.checked_div(rhs)?,
        "amp" | ".bitand" => lhs & rhs,
        "pipe" | ".bitor" => lhs | rhs,
        "caret" | ".bitxor" => lhs ^ rhs,
        ".mod" => lhs.checked_rem(rhs)?,
        "shl" | ".shl" => lhs.wrapping_shl(shift(rhs)?),
        "shr" | ".shr" => lhs.wrapping_shr(shift(rhs)?),
        "eq" => i64::from(lhs == rhs),
        "lt_gt" => i64::from(lhs != rhs),
        "lt" => i64::from(lhs < rhs),
        "gt" => i64::from(lhs > rhs),
        "lt_eq" => i64::from(lhs <= rhs),
        "gt_eq" => i64::from(lhs >= rhs),
        "amp2" | ".and" => i64::from(lhs != 0 && rhs != 0),
        "pipe2" | ".or" => i64::from(lhs != 0 || rhs != 0),
        ".xor" => i64::from((lhs != 0) != (rhs != 0)),
        _ => return None,
    })
}

impl<'a> BinaryExpr<'a> {
    pub fn lhs(self) -> Option<Expr<'a>> {
        child(self.0)
    }

    pub fn op(self) -> Option<SyntaxToken<'a>> {
        significant(self.0).filter_map(NodeOrToken::into_token).next()
    }

    pub fn rhs(self) -> Option<Expr<'a>> {
        children(self.0).nth(1)
    }
}

impl<'a> UnaryExpr<'a> {
    pub fn op(self) -> Option<SyntaxToken<'a>> {
        significant(self.0).next()?.into_token()
    }

    pub fn operand(self) -> Option<Expr<'a>> {
        child(self.0)
    }
}

impl<'a> ParenExpr<'a> {
    pub fn expr(self) -> Option<Expr<'a>> {
        child(self.0)
    }
}

impl<'a> CallExpr<'a> {
    pub fn function(self) -> Option<SyntaxToken<'a>> {
        token(self.0, &[PSEUDO_FN_KW])
    }

    /// Lowercase function name with its leading dot.
    pub fn name(self) -> Option<String> {
        self.function().map(|it| it.text().to_ascii_lowercase())
    }

    pub fn args(self) -> impl Iterator<Item = Expr<'a>> + 'a {
        children(self.0)
    }
}

impl<'a> Literal<'a> {
    pub fn token(self) -> Option<SyntaxToken<'a>> {
        self.0.first_token()
    }

    /// Numeric value of number and character literals.
    pub fn value(self) -> Option<i64> {
        let token = self.token()?;
        match token.kind() {
            NUMBER => parse_number(token.bytes()),
            CHAR => match token.bytes() {
                [b'\'', byte, b'\''] => Some(i64::from(*byte)),
                _ => None,
            },
            _ => None,
        }
    }
}

impl<'a> Name<'a> {
    pub fn kind(self) -> SyntaxKind {
        self.0.kind()
    }

    /// The name as written, `::` separators included.
    pub fn text(self) -> String {
        significant(self.0).map(|element| element.text()).collect()
    }
}

/// Parses `$hex`, `%binary`, `0FFh` and decimal numbers.
pub fn parse_number(text: &[u8]) -> Option<i64> {
    let text = std::str::from_utf8(text).ok()?;
    let (digits, radix) = if let Some(hex) = text.strip_prefix('$') {
        (hex, 16)
    } else if let Some(binary) = text.strip_prefix('%') {
        (binary, 2)
    } else if let Some(hex) = text.strip_suffix(['h', 'H']) {
        (hex, 16)
    } else {
        (text, 10)
    };

    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    i64::from_str_radix(digits, radix).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers() {
        assert_eq!(parse_number(b"$FF"), Some(255));
        assert_eq!(parse_number(b"%1010"), Some(10));
        assert_eq!(parse_number(b"0FFh"), Some(255));
        assert_eq!(parse_number(b"0ffH"), Some(255));
        assert_eq!(parse_number(b"1234"), Some(1234));
        assert_eq!(parse_number(b"$"), None);
        assert_eq!(parse_number(b"$-1"), None);
        assert_eq!(parse_number(b"12ab"), None);
        assert_eq!(parse_number(b"%102"), None);
    }

    #[test]
    fn binary_operators() {
        assert_eq!(binary_op("shl", 1, 8), Some(256));
        assert_eq!(binary_op(".mod", 7, 3), Some(1));
        assert_eq!(binary_op("slash", 1, 0), None);
        assert_eq!(binary_op("shr", 1, 64), None);
        assert_eq!(binary_op("lt_gt", 1, 2), Some(1));
        assert_eq!(binary_op(".xor", 1, 1), Some(0));
    }
}
