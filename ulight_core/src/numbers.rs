//! A numeric-literal matcher parameterised by prefix/suffix/separator/
//! exponent policy, shared across every language scanner's number grammar.

/// A literal prefix or exponent-separator spelling tied to the base it
/// selects (e.g. `("0x", 16)`).
#[derive(Clone, Copy, Debug)]
pub struct StringAndBase {
    pub text: &'static str,
    pub base: u32,
}

/// How a number's optional suffix is recognised.
#[derive(Clone, Copy)]
pub enum SuffixMatcher {
    /// No suffix is ever matched.
    None,
    /// Match the longest of a fixed list of literal suffixes.
    List(&'static [&'static str]),
}

/// Options controlling [`match_common_number`].
pub struct CommonNumberOptions {
    pub prefixes: &'static [StringAndBase],
    pub exponent_separators: &'static [StringAndBase],
    pub suffixes: SuffixMatcher,
    pub default_base: u32,
    pub default_leading_zero_base: u32,
    pub digit_separator: Option<u8>,
    pub nonempty_integer: bool,
    pub nonempty_fraction: bool,
}

impl Default for CommonNumberOptions {
    fn default() -> Self {
        Self {
            prefixes: &[],
            exponent_separators: &[],
            suffixes: SuffixMatcher::None,
            default_base: 10,
            default_leading_zero_base: 10,
            digit_separator: None,
            nonempty_integer: false,
            nonempty_fraction: false,
        }
    }
}

/// The result of [`match_digits`]: a run length plus whether the digit
/// sequence obeys separator placement rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DigitsResult {
    pub length: usize,
    pub erroneous: bool,
}

impl DigitsResult {
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.length != 0
    }
}

fn digit_value(b: u8, base: u32) -> Option<u32> {
    let v = match b {
        b'0'..=b'9' => u32::from(b - b'0'),
        b'a'..=b'z' => u32::from(b - b'a') + 10,
        b'A'..=b'Z' => u32::from(b - b'A') + 10,
        _ => return None,
    };
    (v < base).then_some(v)
}

/// Length of the run of digits (of `base`) at the start of `bytes`,
/// ignoring any digit-separator policy.
#[must_use]
pub fn match_digits(bytes: &[u8], base: u32) -> usize {
    let mut n = 0;
    while n < bytes.len() && digit_value(bytes[n], base).is_some() {
        n += 1;
    }
    n
}

/// Like [`match_digits`], but a `separator` byte is accepted between
/// digits; it must not lead, trail, or repeat.
#[must_use]
pub fn match_separated_digits(bytes: &[u8], base: u32, separator: u8) -> DigitsResult {
    let mut length = 0usize;
    let mut erroneous = false;
    let mut last_was_digit = false;
    let mut any_digit = false;

    while length < bytes.len() {
        let b = bytes[length];
        if digit_value(b, base).is_some() {
            any_digit = true;
            last_was_digit = true;
            length += 1;
        } else if b == separator {
            if !last_was_digit {
                erroneous = true;
            }
            last_was_digit = false;
            length += 1;
        } else {
            break;
        }
    }
    if length > 0 && bytes[length - 1] == separator {
        erroneous = true;
    }
    if !any_digit {
        length = 0;
    }
    DigitsResult { length, erroneous }
}

fn match_digit_part(bytes: &[u8], base: u32, separator: Option<u8>) -> DigitsResult {
    match separator {
        Some(sep) => match_separated_digits(bytes, base, sep),
        None => DigitsResult {
            length: match_digits(bytes, base),
            erroneous: false,
        },
    }
}

/// Full breakdown of a matched numeric literal; the six named parts sum to
/// `length`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommonNumberResult {
    pub length: usize,
    pub prefix: usize,
    pub integer: usize,
    pub radix_point: usize,
    pub fractional: usize,
    pub exponent_sep: usize,
    pub exponent_digits: usize,
    pub suffix: usize,
    pub erroneous: bool,
}

impl CommonNumberResult {
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.length != 0
    }
}

/// Matches `prefix? integer (.fractional)? (exponent_sep exponent_digits)? suffix?`
/// against `bytes`, per `options`.
#[must_use]
pub fn match_common_number(bytes: &[u8], options: &CommonNumberOptions) -> CommonNumberResult {
    if bytes.is_empty() || !bytes[0].is_ascii_digit() && bytes[0] != b'.' {
        return CommonNumberResult::default();
    }

    let mut base = options.default_base;
    let mut prefix_len = 0usize;
    for candidate in options.prefixes {
        if bytes
            .get(..candidate.text.len())
            .is_some_and(|s| s.eq_ignore_ascii_case(candidate.text.as_bytes()))
        {
            prefix_len = candidate.text.len();
            base = candidate.base;
            break;
        }
    }
    if prefix_len == 0 && bytes[0] == b'0' {
        base = options.default_leading_zero_base;
    }

    let mut erroneous = false;
    let rest = &bytes[prefix_len..];
    let integer_digits = match_digit_part(rest, base, options.digit_separator);
    erroneous |= integer_digits.erroneous;
    let mut cursor = prefix_len + integer_digits.length;

    if options.nonempty_integer && integer_digits.length == 0 {
        erroneous = true;
    }

    let mut radix_point = 0usize;
    let mut fractional_digits = DigitsResult {
        length: 0,
        erroneous: false,
    };
    if bytes.get(cursor) == Some(&b'.') {
        let after_dot = &bytes[cursor + 1..];
        let candidate = match_digit_part(after_dot, base, options.digit_separator);
        if candidate.length > 0 || !options.nonempty_fraction {
            radix_point = 1;
            fractional_digits = candidate;
            erroneous |= fractional_digits.erroneous;
            if options.nonempty_fraction && fractional_digits.length == 0 {
                erroneous = true;
            }
            cursor += 1 + fractional_digits.length;
        }
    }

    if prefix_len == 0 && integer_digits.length == 0 && radix_point == 0 {
        return CommonNumberResult::default();
    }

    let mut exponent_sep_len = 0usize;
    let mut exponent_base = base;
    for candidate in options.exponent_separators {
        if candidate.base != base {
            continue;
        }
        let slice = &bytes[cursor..];
        if slice
            .get(..candidate.text.len())
            .is_some_and(|s| s.eq_ignore_ascii_case(candidate.text.as_bytes()))
        {
            exponent_sep_len = candidate.text.len();
            exponent_base = candidate.base;
            break;
        }
    }

    let mut exponent_digits = 0usize;
    if exponent_sep_len > 0 {
        let after_sep = &bytes[cursor + exponent_sep_len..];
        let (sign_len, digits_start) = match after_sep.first() {
            Some(b'+' | b'-') => (1, 1),
            _ => (0, 0),
        };
        let digit_count = match_digits(&after_sep[digits_start..], exponent_base);
        if digit_count == 0 {
            // Not actually an exponent; leave the separator unconsumed.
            exponent_sep_len = 0;
        } else {
            exponent_digits = sign_len + digit_count;
            cursor += exponent_sep_len + exponent_digits;
        }
    }

    let mut suffix_len = 0usize;
    if let SuffixMatcher::List(suffixes) = options.suffixes {
        let slice = &bytes[cursor..];
        suffix_len = suffixes
            .iter()
            .filter(|s| slice.get(..s.len()).is_some_and(|p| p.eq_ignore_ascii_case(s.as_bytes())))
            .map(str::len)
            .max()
            .unwrap_or(0);
    }

    let length = prefix_len
        + integer_digits.length
        + radix_point
        + fractional_digits.length
        + exponent_sep_len
        + exponent_digits
        + suffix_len;

    CommonNumberResult {
        length,
        prefix: prefix_len,
        integer: integer_digits.length,
        radix_point,
        fractional: fractional_digits.length,
        exponent_sep: exponent_sep_len,
        exponent_digits,
        suffix: suffix_len,
        erroneous,
    }
}

/// Options for [`match_suffix_number`]: numbers whose base is given by a
/// trailing letter rather than a leading prefix (NASM-style `0ffh`).
pub struct SuffixNumberOptions {
    pub suffixes: &'static [StringAndBase],
    pub default_base: u32,
    pub digit_separator: Option<u8>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SuffixNumberResult {
    pub digits: usize,
    pub suffix: usize,
    pub erroneous: bool,
}

impl SuffixNumberResult {
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.digits != 0
    }
}

/// Matches an integer whose base is identified by a trailing letter, e.g.
/// `ff_ffh`. Tries each suffix against the widest base it could imply,
/// since digits valid in a wider base (e.g. hex) may otherwise be
/// swallowed by a narrower one.
#[must_use]
pub fn match_suffix_number(bytes: &[u8], options: &SuffixNumberOptions) -> SuffixNumberResult {
    if bytes.is_empty() || !bytes[0].is_ascii_alphanumeric() {
        return SuffixNumberResult::default();
    }
    let mut best: Option<SuffixNumberResult> = None;
    for candidate in options.suffixes {
        let digits_result = match_digit_part(bytes, candidate.base, options.digit_separator);
        if digits_result.length == 0 {
            continue;
        }
        let rest = &bytes[digits_result.length..];
        if rest
            .get(..candidate.text.len())
            .is_some_and(|s| s.eq_ignore_ascii_case(candidate.text.as_bytes()))
        {
            let result = SuffixNumberResult {
                digits: digits_result.length,
                suffix: candidate.text.len(),
                erroneous: digits_result.erroneous,
            };
            let better = match best {
                Some(b) => result.digits + result.suffix > b.digits + b.suffix,
                None => true,
            };
            if better {
                best = Some(result);
            }
        }
    }
    if let Some(result) = best {
        return result;
    }
    let plain = match_digit_part(bytes, options.default_base, options.digit_separator);
    SuffixNumberResult {
        digits: plain.length,
        suffix: 0,
        erroneous: plain.erroneous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const C_PREFIXES: &[StringAndBase] = &[
        StringAndBase { text: "0x", base: 16 },
        StringAndBase { text: "0b", base: 2 },
    ];
    const C_EXP: &[StringAndBase] = &[
        StringAndBase { text: "e", base: 10 },
        StringAndBase { text: "p", base: 16 },
    ];
    const C_SUFFIXES: &[&str] = &["u", "U", "l", "L", "ul", "UL"];

    fn c_options() -> CommonNumberOptions {
        CommonNumberOptions {
            prefixes: C_PREFIXES,
            exponent_separators: C_EXP,
            suffixes: SuffixMatcher::List(C_SUFFIXES),
            default_base: 10,
            default_leading_zero_base: 8,
            digit_separator: None,
            nonempty_integer: false,
            nonempty_fraction: false,
        }
    }

    #[test]
    fn plain_decimal_integer() {
        let r = match_common_number(b"123", &c_options());
        assert_eq!(r.length, 3);
        assert_eq!(r.integer, 3);
        assert!(!r.erroneous);
    }

    #[test]
    fn hex_with_suffix() {
        let r = match_common_number(b"0xFFu", &c_options());
        assert_eq!(r.prefix, 2);
        assert_eq!(r.integer, 2);
        assert_eq!(r.suffix, 1);
        assert_eq!(r.length, 5);
    }

    #[test]
    fn parts_sum_to_length() {
        let r = match_common_number(b"3.14e+10f", &c_options());
        let sum = r.prefix
            + r.integer
            + r.radix_point
            + r.fractional
            + r.exponent_sep
            + r.exponent_digits
            + r.suffix;
        assert_eq!(sum, r.length);
    }

    #[test]
    fn empty_on_non_digit() {
        let r = match_common_number(b"abc", &c_options());
        assert_eq!(r.length, 0);
        assert!(!r.is_match());
    }

    #[test]
    fn leading_dot_with_digit_matches() {
        let r = match_common_number(b".5f", &c_options());
        assert_eq!(r.radix_point, 1);
        assert_eq!(r.fractional, 1);
    }

    #[test]
    fn digit_separator_errors_on_trailing_underscore() {
        let options = CommonNumberOptions {
            digit_separator: Some(b'_'),
            ..c_options()
        };
        let r = match_common_number(b"1_000_", &options);
        assert!(r.erroneous);
    }

    #[test]
    fn suffix_number_nasm_hex() {
        let options = SuffixNumberOptions {
            suffixes: &[StringAndBase { text: "h", base: 16 }],
            default_base: 10,
            digit_separator: Some(b'_'),
        };
        let r = match_suffix_number(b"ff_ffh", &options);
        assert_eq!(r.digits, 5);
        assert_eq!(r.suffix, 1);
    }

    #[test]
    fn suffix_number_plain_decimal_falls_back() {
        let options = SuffixNumberOptions {
            suffixes: &[StringAndBase { text: "h", base: 16 }],
            default_base: 10,
            digit_separator: None,
        };
        let r = match_suffix_number(b"123", &options);
        assert_eq!(r.digits, 3);
        assert_eq!(r.suffix, 0);
    }
}
