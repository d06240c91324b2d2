//! Low-level building blocks for lexical syntax highlighters: character
//! predicates, a bitset-256 character-set engine, UTF-8 helpers, a
//! sentinel-terminated cursor, the numeric-literal and escape-sequence
//! matchers, and the token-emission buffer.
//!
//! This crate has no dependency on the per-language scanners in `ulight`
//! and never will: external tools (an LSP, a formatter, another
//! highlighter front-end) can depend on it directly.
//!
//! # Stability
//!
//! [`Category`](token::Category) is `#[non_exhaustive]`: new categories
//! may be appended in later versions. [`HighlightToken`](token::HighlightToken)'s
//! fields are stable. [`Cursor`](cursor::Cursor) and
//! [`SourceBuffer`](source_buffer::SourceBuffer)'s public APIs are stable.

pub mod ascii;
pub mod charset;
pub mod chars;
pub mod cursor;
pub mod emit;
pub mod escapes;
pub mod numbers;
pub mod source_buffer;
pub mod token;
pub mod utf8;

pub use charset::Charset256;
pub use cursor::Cursor;
pub use emit::{Coalescing, EmissionBuffer};
pub use escapes::{match_common_escape, match_common_escape_with_prefix, CommonEscape, EscapeResult};
pub use numbers::{
    match_common_number, match_digits, match_separated_digits, match_suffix_number,
    CommonNumberOptions, CommonNumberResult, DigitsResult, StringAndBase, SuffixMatcher,
    SuffixNumberOptions, SuffixNumberResult,
};
pub use source_buffer::{EncodingIssue, EncodingIssueKind, SourceBuffer};
pub use token::{Category, HighlightToken};

#[cfg(test)]
mod proptests {
    use crate::{
        escapes::{match_common_escape, CommonEscape},
        numbers::{match_common_number, CommonNumberOptions, StringAndBase, SuffixMatcher},
    };
    use proptest::prelude::*;

    fn c_number_options() -> CommonNumberOptions {
        CommonNumberOptions {
            prefixes: &[
                StringAndBase { text: "0x", base: 16 },
                StringAndBase { text: "0b", base: 2 },
            ],
            exponent_separators: &[StringAndBase { text: "e", base: 10 }, StringAndBase { text: "E", base: 10 }],
            suffixes: SuffixMatcher::List(&["u", "l", "ul", "lu"]),
            default_base: 10,
            default_leading_zero_base: 8,
            digit_separator: Some(b'\''),
            nonempty_integer: false,
            nonempty_fraction: false,
        }
    }

    proptest! {
        /// The six named parts of a `CommonNumberResult` always sum to its
        /// `length`, for any byte input (testable property 8).
        #[test]
        fn number_match_parts_sum_to_length(bytes in proptest::collection::vec(any::<u8>(), 0..32)) {
            let opts = c_number_options();
            let r = match_common_number(&bytes, &opts);
            let sum = r.prefix + r.integer + r.radix_point + r.fractional + r.exponent_sep + r.exponent_digits + r.suffix;
            prop_assert_eq!(sum, r.length);
        }

        /// Matching is a pure function of its input: calling it twice on the
        /// same slice gives the same result (testable property 9, extended
        /// to the number matcher as well as escapes).
        #[test]
        fn number_match_is_deterministic(bytes in proptest::collection::vec(any::<u8>(), 0..32)) {
            let opts = c_number_options();
            let a = match_common_number(&bytes, &opts);
            let b = match_common_number(&bytes, &opts);
            prop_assert_eq!(a, b);
        }

        /// `match_common_escape` called twice on the same slice returns the
        /// same result (testable property 9).
        #[test]
        fn escape_match_is_deterministic(bytes in proptest::collection::vec(any::<u8>(), 0..16)) {
            for kind in [
                CommonEscape::Octal1To2,
                CommonEscape::Octal1To3,
                CommonEscape::Hex1To2,
                CommonEscape::Hex2,
                CommonEscape::Hex4,
                CommonEscape::Hex8,
                CommonEscape::HexBraced,
                CommonEscape::NonemptyBraced,
                CommonEscape::LfCrCrlf,
            ] {
                let a = match_common_escape(&bytes, kind);
                let b = match_common_escape(&bytes, kind);
                prop_assert_eq!(a, b);
            }
        }
    }
}
