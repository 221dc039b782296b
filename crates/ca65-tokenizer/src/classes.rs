pub(crate) fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

pub(crate) fn is_ident_continue(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Horizontal whitespace. A `\r` not followed by `\n` counts as well.
pub(crate) fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | 0x0b | 0x0c | b'\r')
}

pub(crate) fn is_hex_digit(byte: u8) -> bool {
    byte.is_ascii_hexdigit()
}

pub(crate) fn is_binary_digit(byte: u8) -> bool {
    matches!(byte, b'0' | b'1')
}

pub(crate) fn is_punct(byte: u8) -> bool {
    matches!(
        byte,
        b'#' | b','
            | b':'
            | b'='
            | b'('
            | b')'
            | b'{'
            | b'}'
            | b'['
            | b']'
            | b'+'
            | b'-'
            | b'*'
            | b'/'
            | b'&'
            | b'|'
            | b'^'
            | b'~'
            | b'!'
            | b'<'
            | b'>'
    )
}
