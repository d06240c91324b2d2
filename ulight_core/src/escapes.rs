//! A generic escape-sequence matcher shared by every language's string and
//! character literal scanner.
//!
//! The original implementation this is generalised from specialises a
//! template per [`CommonEscape`] variant; here the kind is a runtime enum
//! parameter instead, since the branch is not on a hot path (see the
//! design notes on template-specialised escape kinds).

/// The result of matching one escape sequence: `length == 0` means "no
/// escape here".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EscapeResult {
    pub length: usize,
    pub erroneous: bool,
}

impl EscapeResult {
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.length != 0
    }
}

/// Which shape of escape body `match_common_escape` should recognise.
/// Each variant has a fixed min/max digit count (braced variants have
/// none, since their length is bounded only by the closing brace).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommonEscape {
    /// One or two octal digits.
    Octal1To2,
    /// One to three octal digits.
    Octal1To3,
    /// Exactly three octal digits.
    Octal3,
    /// Nonempty octal digit sequence in braces.
    OctalBraced,
    /// One or two hex digits.
    Hex1To2,
    /// At least one hex digit, unbounded.
    Hex1ToInf,
    /// Exactly two hex digits.
    Hex2,
    /// Exactly four hex digits.
    Hex4,
    /// Exactly eight hex digits.
    Hex8,
    /// Nonempty character sequence in braces (any bytes, `\N{name}`-style).
    NonemptyBraced,
    /// Nonempty hex digit sequence in braces (`\u{...}`-style).
    HexBraced,
    /// LF, CR, or CRLF line-continuation escape.
    LfCrCrlf,
}

fn is_octal_digit(b: u8) -> bool {
    matches!(b, b'0'..=b'7')
}

fn is_hex_digit(b: u8) -> bool {
    b.is_ascii_hexdigit()
}

fn match_braced(bytes: &[u8], digit_pred: impl Fn(u8) -> bool) -> EscapeResult {
    if bytes.first() != Some(&b'{') {
        return EscapeResult {
            length: 0,
            erroneous: true,
        };
    }
    let length_without_brace = crate::ascii::length_before(bytes, b'}', 1);
    let digits = &bytes[1..length_without_brace.max(1)];
    let erroneous = length_without_brace <= 1 || !crate::ascii::all_of(digits, digit_pred);
    let length = if length_without_brace == bytes.len() || bytes.get(length_without_brace) != Some(&b'}')
    {
        length_without_brace
    } else {
        length_without_brace + 1
    };
    EscapeResult { length, erroneous }
}

/// Matches the escape body (everything after the introducing `\`) against
/// `kind`. Returns `length == 0` if the required shape is entirely absent.
#[must_use]
pub fn match_common_escape(bytes: &[u8], kind: CommonEscape) -> EscapeResult {
    use CommonEscape::{
        Hex1To2, Hex1ToInf, Hex2, Hex4, Hex8, HexBraced, LfCrCrlf, NonemptyBraced, Octal1To2,
        Octal1To3, Octal3, OctalBraced,
    };
    match kind {
        Octal1To2 | Octal1To3 => {
            let max = if kind == Octal1To2 { 2 } else { 3 };
            let slice = &bytes[..bytes.len().min(max)];
            let length = crate::ascii::length_if(slice, is_octal_digit);
            EscapeResult {
                length,
                erroneous: length == 0,
            }
        }
        Octal3 => {
            let slice = &bytes[..bytes.len().min(3)];
            let length = crate::ascii::length_if(slice, is_octal_digit);
            EscapeResult {
                length,
                erroneous: length != 3,
            }
        }
        OctalBraced => match_braced(bytes, is_octal_digit),
        Hex1To2 => {
            let slice = &bytes[..bytes.len().min(2)];
            let length = crate::ascii::length_if(slice, is_hex_digit);
            EscapeResult {
                length,
                erroneous: length == 0,
            }
        }
        Hex1ToInf => {
            let length = crate::ascii::length_if(bytes, is_hex_digit);
            EscapeResult {
                length,
                erroneous: length == 0,
            }
        }
        Hex2 | Hex4 | Hex8 => {
            let min_length = match kind {
                Hex2 => 2,
                Hex4 => 4,
                Hex8 => 8,
                _ => unreachable!(),
            };
            let slice = &bytes[..bytes.len().min(min_length)];
            if slice.len() < min_length {
                return EscapeResult {
                    length: slice.len(),
                    erroneous: true,
                };
            }
            let all_hex = crate::ascii::all_of(slice, is_hex_digit);
            EscapeResult {
                length: slice.len(),
                erroneous: !all_hex,
            }
        }
        NonemptyBraced => {
            if bytes.first() != Some(&b'{') {
                return EscapeResult {
                    length: 0,
                    erroneous: true,
                };
            }
            match memchr::memchr(b'}', &bytes[1..]) {
                Some(idx) => EscapeResult {
                    length: idx + 2,
                    erroneous: false,
                },
                None => EscapeResult {
                    length: bytes.len(),
                    erroneous: true,
                },
            }
        }
        HexBraced => match_braced(bytes, is_hex_digit),
        LfCrCrlf => {
            let length = if bytes.starts_with(b"\r\n") {
                2
            } else if bytes.first() == Some(&b'\r') || bytes.first() == Some(&b'\n') {
                1
            } else {
                0
            };
            EscapeResult {
                length,
                erroneous: length == 0,
            }
        }
    }
}

/// Like [`match_common_escape`], but matches within `bytes[prefix_len..]`
/// and adds `prefix_len` to the result length. Useful when part of the
/// escape (e.g. the introducing letter `u` in `ሴ`) has already been
/// consumed by the caller.
#[must_use]
pub fn match_common_escape_with_prefix(
    bytes: &[u8],
    prefix_len: usize,
    kind: CommonEscape,
) -> EscapeResult {
    let mut result = match_common_escape(&bytes[prefix_len..], kind);
    if result.length > 0 {
        result.length += prefix_len;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hex4_requires_four_digits() {
        let r = match_common_escape(b"1234rest", CommonEscape::Hex4);
        assert_eq!(r.length, 4);
        assert!(!r.erroneous);
    }

    #[test]
    fn hex4_errors_on_short_input() {
        let r = match_common_escape(b"12", CommonEscape::Hex4);
        assert_eq!(r.length, 2);
        assert!(r.erroneous);
    }

    #[test]
    fn hex_braced_matches_body_and_brace() {
        let r = match_common_escape(b"{1f600}rest", CommonEscape::HexBraced);
        assert_eq!(r.length, 7);
        assert!(!r.erroneous);
    }

    #[test]
    fn hex_braced_errors_on_empty_body() {
        let r = match_common_escape(b"{}rest", CommonEscape::HexBraced);
        assert!(r.erroneous);
    }

    #[test]
    fn lf_cr_crlf_matches_crlf_as_two_bytes() {
        let r = match_common_escape(b"\r\nrest", CommonEscape::LfCrCrlf);
        assert_eq!(r.length, 2);
    }

    #[test]
    fn lf_cr_crlf_matches_lone_lf() {
        let r = match_common_escape(b"\nrest", CommonEscape::LfCrCrlf);
        assert_eq!(r.length, 1);
    }

    #[test]
    fn octal_1_to_3_stops_after_three_digits() {
        let r = match_common_escape(b"1234", CommonEscape::Octal1To3);
        assert_eq!(r.length, 3);
    }

    #[test]
    fn deterministic_for_repeated_calls() {
        let a = match_common_escape(b"1f600}", CommonEscape::HexBraced);
        let b = match_common_escape(b"1f600}", CommonEscape::HexBraced);
        assert_eq!(a, b);
    }

    #[test]
    fn with_prefix_adds_offset() {
        let r = match_common_escape_with_prefix(b"\\u1234", 2, CommonEscape::Hex4);
        assert_eq!(r.length, 6);
    }
}
