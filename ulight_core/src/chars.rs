//! Character classification predicates for every supported language.
//!
//! Each function here is a plain, pure, side-effect-free predicate over a
//! byte or `char`, suitable for feeding into
//! [`crate::charset::Charset256::from_predicate`] to get an O(1) lookup
//! table, or for calling directly when a scanner only needs one answer.

#[must_use]
pub const fn is_ascii_digit(b: u8) -> bool {
    matches!(b, b'0'..=b'9')
}

#[must_use]
pub const fn is_ascii_hex_digit(b: u8) -> bool {
    matches!(b, b'0'..=b'9' | b'a'..=b'f' | b'A'..=b'F')
}

#[must_use]
pub const fn is_ascii_octal_digit(b: u8) -> bool {
    matches!(b, b'0'..=b'7')
}

#[must_use]
pub const fn is_ascii_alpha(b: u8) -> bool {
    matches!(b, b'a'..=b'z' | b'A'..=b'Z')
}

#[must_use]
pub const fn is_ascii_alphanumeric(b: u8) -> bool {
    is_ascii_alpha(b) || is_ascii_digit(b)
}

#[must_use]
pub const fn is_ascii_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0B | 0x0C)
}

/// Whether `c` (a Unicode scalar value) is allowed to continue an
/// identifier under the common "Unicode letters and digits plus
/// underscore" rule most of the C-family languages use loosely.
#[must_use]
pub fn is_unicode_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

#[must_use]
pub fn is_unicode_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

pub mod c_cpp {
    #[must_use]
    pub const fn is_identifier_start(b: u8) -> bool {
        super::is_ascii_alpha(b) || b == b'_'
    }

    #[must_use]
    pub const fn is_identifier_continue(b: u8) -> bool {
        is_identifier_start(b) || super::is_ascii_digit(b)
    }

    /// `digit | . digit`: the first two code points of a pp-number.
    #[must_use]
    pub const fn starts_pp_number(b: u8, next: u8) -> bool {
        super::is_ascii_digit(b) || (b == b'.' && super::is_ascii_digit(next))
    }

    #[must_use]
    pub const fn is_pp_number_continue(b: u8) -> bool {
        is_identifier_continue(b) || b == b'.'
    }
}

pub mod css {
    #[must_use]
    pub const fn is_whitespace(b: u8) -> bool {
        matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0C)
    }

    #[must_use]
    pub const fn is_newline(b: u8) -> bool {
        matches!(b, b'\n' | b'\r' | 0x0C)
    }

    #[must_use]
    pub fn is_identifier_start(c: char) -> bool {
        c == '_' || c == '-' || c.is_alphabetic() || (c as u32) >= 0x80
    }

    #[must_use]
    pub fn is_identifier(c: char) -> bool {
        is_identifier_start(c) || c.is_ascii_digit()
    }
}

pub mod html {
    #[must_use]
    pub const fn is_whitespace(b: u8) -> bool {
        matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0C)
    }

    #[must_use]
    pub const fn is_tag_name_continue(b: u8) -> bool {
        super::is_ascii_alphanumeric(b) || b == b'-'
    }

    #[must_use]
    pub const fn is_attribute_name_continue(b: u8) -> bool {
        !matches!(
            b,
            b' ' | b'\t' | b'\n' | b'\r' | 0x0C | b'"' | b'\'' | b'>' | b'/' | b'='
        )
    }

    #[must_use]
    pub const fn is_unquoted_attribute_value_continue(b: u8) -> bool {
        !matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0C | b'>' | b'\'' | b'"' | b'`' | b'=' | b'<')
    }
}

pub mod xml {
    #[must_use]
    pub const fn is_name_start(b: u8) -> bool {
        super::is_ascii_alpha(b) || b == b'_' || b == b':'
    }

    #[must_use]
    pub const fn is_name_continue(b: u8) -> bool {
        is_name_start(b) || super::is_ascii_digit(b) || b == b'-' || b == b'.'
    }
}

pub mod js {
    #[must_use]
    pub fn is_identifier_start(c: char) -> bool {
        c == '_' || c == '$' || super::is_unicode_ident_start(c)
    }

    #[must_use]
    pub fn is_identifier_continue(c: char) -> bool {
        c == '$' || super::is_unicode_ident_continue(c)
    }

    /// JSX identifiers permit `-` after the first character (`data-foo`).
    #[must_use]
    pub fn is_jsx_identifier_continue(c: char) -> bool {
        c == '-' || is_identifier_continue(c)
    }
}

pub mod kotlin {
    #[must_use]
    pub fn is_identifier_start(c: char) -> bool {
        super::is_unicode_ident_start(c)
    }

    #[must_use]
    pub fn is_identifier_continue(c: char) -> bool {
        super::is_unicode_ident_continue(c)
    }
}

pub mod python {
    #[must_use]
    pub fn is_identifier_start(c: char) -> bool {
        super::is_unicode_ident_start(c)
    }

    #[must_use]
    pub fn is_identifier_continue(c: char) -> bool {
        super::is_unicode_ident_continue(c)
    }
}

pub mod rust_lang {
    #[must_use]
    pub fn is_identifier_start(c: char) -> bool {
        super::is_unicode_ident_start(c)
    }

    #[must_use]
    pub fn is_identifier_continue(c: char) -> bool {
        super::is_unicode_ident_continue(c)
    }
}

pub mod nasm {
    #[must_use]
    pub const fn is_identifier_start(b: u8) -> bool {
        super::is_ascii_alpha(b) || matches!(b, b'_' | b'.' | b'?' | b'@' | b'$')
    }

    #[must_use]
    pub const fn is_identifier_continue(b: u8) -> bool {
        is_identifier_start(b) || super::is_ascii_digit(b) || b == b'#' || b == b'~'
    }
}

pub mod llvm {
    #[must_use]
    pub const fn is_identifier_continue(b: u8) -> bool {
        super::is_ascii_alphanumeric(b) || matches!(b, b'_' | b'.' | b'$')
    }
}

pub mod lua {
    #[must_use]
    pub const fn is_identifier_start(b: u8) -> bool {
        super::is_ascii_alpha(b) || b == b'_'
    }

    #[must_use]
    pub const fn is_identifier_continue(b: u8) -> bool {
        is_identifier_start(b) || super::is_ascii_digit(b)
    }
}

pub mod tex {
    #[must_use]
    pub const fn is_command_name_continue(b: u8) -> bool {
        super::is_ascii_alpha(b)
    }
}

pub mod mmml {
    #[must_use]
    pub const fn is_directive_name_continue(b: u8) -> bool {
        super::is_ascii_alphanumeric(b) || b == b'-'
    }
}

pub mod bash {
    #[must_use]
    pub const fn is_identifier_start(b: u8) -> bool {
        super::is_ascii_alpha(b) || b == b'_'
    }

    #[must_use]
    pub const fn is_identifier_continue(b: u8) -> bool {
        is_identifier_start(b) || super::is_ascii_digit(b)
    }
}

pub mod ebnf {
    #[must_use]
    pub const fn is_identifier_continue(b: u8) -> bool {
        super::is_ascii_alphanumeric(b) || matches!(b, b'_' | b'-')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn c_identifier_start_excludes_digits() {
        assert!(!c_cpp::is_identifier_start(b'5'));
        assert!(c_cpp::is_identifier_start(b'_'));
        assert!(c_cpp::is_identifier_start(b'x'));
    }

    #[test]
    fn css_newline_set_matches_spec() {
        assert!(css::is_newline(b'\n'));
        assert!(css::is_newline(b'\r'));
        assert!(css::is_newline(0x0C));
        assert!(!css::is_newline(b' '));
    }

    #[test]
    fn xml_name_start_allows_colon() {
        assert!(xml::is_name_start(b':'));
        assert!(!xml::is_name_start(b'-'));
    }

    #[test]
    fn js_identifier_allows_dollar() {
        assert!(js::is_identifier_start('$'));
        assert!(js::is_identifier_continue('$'));
    }

    #[test]
    fn all_ascii_digit_bytes_classified() {
        for b in 0..=255u8 {
            assert_eq!(is_ascii_digit(b), b.is_ascii_digit());
        }
    }
}
