//! Kotlin scanner.
//!
//! Triple-quoted strings have no escapes but keep interpolation active;
//! `${…}` substitutions recurse into the ordinary token stream and must
//! balance their own braces before returning control to the string scan.

use ulight_core::{chars::kotlin as kt_chars, Category, Coalescing};

use crate::keywords::lookup_length_bucketed;
use crate::scanner::{Options, ScannerBase};

// `super` and `super@` are both recognised as the same keyword; the
// lexeme is authoritative, the surrounding `@` is tokenised separately
// as punctuation rather than folded into the keyword's own lexeme.
const KEYWORDS: &[(&str, Category)] = &[
    ("as", Category::Keyword),
    ("break", Category::KeywordControl),
    ("class", Category::Keyword),
    ("continue", Category::KeywordControl),
    ("do", Category::KeywordControl),
    ("else", Category::KeywordControl),
    ("false", Category::Bool),
    ("for", Category::KeywordControl),
    ("fun", Category::Keyword),
    ("if", Category::KeywordControl),
    ("in", Category::KeywordControl),
    ("interface", Category::Keyword),
    ("is", Category::Keyword),
    ("null", Category::Null),
    ("object", Category::Keyword),
    ("package", Category::Keyword),
    ("return", Category::KeywordControl),
    ("super", Category::KeywordThis),
    ("this", Category::KeywordThis),
    ("throw", Category::KeywordControl),
    ("true", Category::Bool),
    ("try", Category::KeywordControl),
    ("typealias", Category::Keyword),
    ("typeof", Category::Keyword),
    ("val", Category::Keyword),
    ("var", Category::Keyword),
    ("when", Category::KeywordControl),
    ("while", Category::KeywordControl),
    ("import", Category::Keyword),
    ("data", Category::Keyword),
    ("sealed", Category::Keyword),
    ("enum", Category::Keyword),
    ("companion", Category::Keyword),
    ("override", Category::Keyword),
    ("private", Category::Keyword),
    ("protected", Category::Keyword),
    ("public", Category::Keyword),
    ("internal", Category::Keyword),
    ("open", Category::Keyword),
    ("abstract", Category::Keyword),
    ("final", Category::Keyword),
    ("suspend", Category::Keyword),
    ("inline", Category::Keyword),
    ("vararg", Category::Keyword),
    ("out", Category::Keyword),
    ("by", Category::Keyword),
];

const BUILTIN_TYPES: &[(&str, Category)] = &[
    ("Int", Category::NameTypeBuiltin),
    ("Long", Category::NameTypeBuiltin),
    ("Short", Category::NameTypeBuiltin),
    ("Byte", Category::NameTypeBuiltin),
    ("Float", Category::NameTypeBuiltin),
    ("Double", Category::NameTypeBuiltin),
    ("Boolean", Category::NameTypeBuiltin),
    ("Char", Category::NameTypeBuiltin),
    ("String", Category::NameTypeBuiltin),
    ("Unit", Category::NameTypeBuiltin),
    ("Any", Category::NameTypeBuiltin),
    ("Nothing", Category::NameTypeBuiltin),
];

pub struct Scanner<'a> {
    base: ScannerBase<'a>,
    /// Depth of `${…}` substitution nesting the scanner is currently
    /// inside, so a top-level dispatch of `}` can tell whether it closes
    /// a substitution or an ordinary block.
    substitution_depth: u32,
    brace_depth_at_substitution: Vec<u32>,
    block_depth: u32,
}

impl<'a> Scanner<'a> {
    #[must_use]
    pub fn new(cursor: ulight_core::Cursor<'a>, options: Options) -> Self {
        Self {
            base: ScannerBase::new(cursor, options),
            substitution_depth: 0,
            brace_depth_at_substitution: Vec::new(),
            block_depth: 0,
        }
    }

    pub fn run(mut self) -> Vec<ulight_core::HighlightToken> {
        while !self.base.eof() {
            if self.dispatch_one() {
                continue;
            }
            self.base.emit_error_one_code_point();
        }
        self.base.finish()
    }

    fn dispatch_one(&mut self) -> bool {
        self.try_whitespace()
            || self.try_line_comment()
            || self.try_block_comment()
            || self.try_triple_quoted_string()
            || self.try_string()
            || self.try_char_literal()
            || self.try_number()
            || self.try_identifier_or_keyword()
            || self.try_punctuation()
    }

    fn try_whitespace(&mut self) -> bool {
        if !matches!(self.base.cursor().current(), b' ' | b'\t' | b'\r' | b'\n') {
            return false;
        }
        self.base.cursor_mut().eat_whitespace();
        true
    }

    fn try_line_comment(&mut self) -> bool {
        if !self.base.remainder().starts_with(b"//") {
            return false;
        }
        let begin = self.base.index();
        self.base.emit(begin, 2, Category::CommentDelim, Coalescing::Normal);
        self.base.advance(2);
        let text_begin = self.base.index();
        let n = self.base.cursor_mut().eat_until_newline_or_eof();
        if n > 0 {
            self.base.emit(text_begin, n, Category::Comment, Coalescing::Normal);
        }
        true
    }

    fn try_block_comment(&mut self) -> bool {
        if !self.base.remainder().starts_with(b"/*") {
            return false;
        }
        let start = self.base.index();
        self.base.emit(start, 2, Category::CommentDelim, Coalescing::Normal);
        self.base.advance(2);
        let mut depth = 1u32;
        let text_begin = self.base.index();
        loop {
            let rest = self.base.remainder();
            if rest.is_empty() {
                let end = self.base.index();
                if end > text_begin {
                    self.base.emit(text_begin, end - text_begin, Category::Comment, Coalescing::Normal);
                }
                return true;
            }
            if rest.starts_with(b"/*") {
                depth += 1;
                self.base.advance(2);
                continue;
            }
            if rest.starts_with(b"*/") {
                depth -= 1;
                if depth == 0 {
                    let end = self.base.index();
                    if end > text_begin {
                        self.base.emit(text_begin, end - text_begin, Category::Comment, Coalescing::Normal);
                    }
                    self.base.emit_and_advance(2, Category::CommentDelim, Coalescing::Normal);
                    return true;
                }
                self.base.advance(2);
                continue;
            }
            self.base.advance(1);
        }
    }

    fn try_triple_quoted_string(&mut self) -> bool {
        if !self.base.remainder().starts_with(b"\"\"\"") {
            return false;
        }
        let begin = self.base.index();
        self.base.emit(begin, 3, Category::StringDelim, Coalescing::Normal);
        self.base.advance(3);
        self.scan_triple_quoted_body();
        true
    }

    /// Scans content up to the terminator (3+ consecutive `"`, of which
    /// the final three close the literal) or up to an interpolation
    /// start.
    fn scan_triple_quoted_body(&mut self) {
        let mut flush_start = self.base.index();
        loop {
            let rest = self.base.remainder();
            if rest.is_empty() {
                let end = self.base.index();
                if end > flush_start {
                    self.base.emit(flush_start, end - flush_start, Category::String, Coalescing::Normal);
                }
                return;
            }
            if rest.starts_with(b"\"\"\"") {
                let quote_run = ulight_core::ascii::length_if(rest, |b| b == b'"');
                let end = self.base.index();
                if end > flush_start {
                    self.base.emit(flush_start, end - flush_start, Category::String, Coalescing::Normal);
                }
                // Content quotes (if more than 3 in a row) belong to the
                // literal body; only the final three close it.
                if quote_run > 3 {
                    let extra = quote_run - 3;
                    self.base.emit(self.base.index(), extra as u32, Category::String, Coalescing::Normal);
                    self.base.advance(extra as u32);
                }
                let close = self.base.index();
                self.base.emit(close, 3, Category::StringDelim, Coalescing::Normal);
                self.base.advance(3);
                return;
            }
            if rest.starts_with(b"${") {
                let delim_begin = self.base.index();
                self.base.emit(delim_begin, 2, Category::StringInterpolationDelim, Coalescing::Normal);
                self.base.advance(2);
                self.scan_braced_interpolation();
                flush_start = self.base.index();
                continue;
            }
            if rest[0] == b'$' {
                if let Some(len) = match_simple_interpolation(rest) {
                    let end = self.base.index();
                    if end > flush_start {
                        self.base.emit(flush_start, end - flush_start, Category::String, Coalescing::Normal);
                    }
                    let dollar_begin = self.base.index();
                    self.base.emit(dollar_begin, 1, Category::StringInterpolationDelim, Coalescing::Normal);
                    self.base.emit(dollar_begin + 1, len - 1, Category::Name, Coalescing::Normal);
                    self.base.advance(len);
                    flush_start = self.base.index();
                    continue;
                }
            }
            self.base.advance(1);
        }
    }

    fn try_string(&mut self) -> bool {
        if self.base.cursor().current() != b'"' {
            return false;
        }
        let begin = self.base.index();
        self.base.emit(begin, 1, Category::StringDelim, Coalescing::Normal);
        self.base.advance(1);
        let mut flush_start = self.base.index();
        loop {
            let rest = self.base.remainder();
            let Some(&b) = rest.first() else {
                let end = self.base.index();
                if end > flush_start {
                    self.base.emit(flush_start, end - flush_start, Category::String, Coalescing::Normal);
                }
                return true;
            };
            match b {
                b'\n' => {
                    let end = self.base.index();
                    if end > flush_start {
                        self.base.emit(flush_start, end - flush_start, Category::String, Coalescing::Normal);
                    }
                    return true;
                }
                b'"' => {
                    let end = self.base.index();
                    if end > flush_start {
                        self.base.emit(flush_start, end - flush_start, Category::String, Coalescing::Normal);
                    }
                    self.base.emit_and_advance(1, Category::StringDelim, Coalescing::Normal);
                    return true;
                }
                b'\\' => {
                    let end = self.base.index();
                    if end > flush_start {
                        self.base.emit(flush_start, end - flush_start, Category::String, Coalescing::Normal);
                    }
                    let esc = escape_length(rest);
                    self.base.emit(end, esc, Category::StringEscape, Coalescing::Normal);
                    self.base.advance(esc);
                    flush_start = self.base.index();
                }
                b'$' if rest.starts_with(b"${") => {
                    let end = self.base.index();
                    if end > flush_start {
                        self.base.emit(flush_start, end - flush_start, Category::String, Coalescing::Normal);
                    }
                    self.base.emit(end, 2, Category::StringInterpolationDelim, Coalescing::Normal);
                    self.base.advance(2);
                    self.scan_braced_interpolation();
                    flush_start = self.base.index();
                }
                b'$' => {
                    if let Some(len) = match_simple_interpolation(rest) {
                        let end = self.base.index();
                        if end > flush_start {
                            self.base.emit(flush_start, end - flush_start, Category::String, Coalescing::Normal);
                        }
                        self.base.emit(end, 1, Category::StringInterpolationDelim, Coalescing::Normal);
                        self.base.emit(end + 1, len - 1, Category::Name, Coalescing::Normal);
                        self.base.advance(len);
                        flush_start = self.base.index();
                    } else {
                        self.base.advance(1);
                    }
                }
                _ => self.base.advance(1),
            }
        }
    }

    fn try_char_literal(&mut self) -> bool {
        if self.base.cursor().current() != b'\'' {
            return false;
        }
        let rest = self.base.remainder();
        let body = &rest[1..];
        let (esc_len, content_len) = if body.first() == Some(&b'\\') {
            let e = escape_length(body);
            (e, e)
        } else {
            let w = ulight_core::utf8::sequence_length(body.first().copied().unwrap_or(0)).max(1);
            (0, w)
        };
        if body.get(content_len as usize) != Some(&b'\'') {
            return false;
        }
        let begin = self.base.index();
        self.base.emit(begin, 1, Category::StringDelim, Coalescing::Normal);
        self.base.advance(1);
        let content_begin = self.base.index();
        if esc_len > 0 {
            self.base.emit(content_begin, esc_len, Category::StringEscape, Coalescing::Normal);
        } else {
            self.base.emit(content_begin, content_len, Category::String, Coalescing::Normal);
        }
        self.base.advance(content_len);
        let close = self.base.index();
        self.base.emit(close, 1, Category::StringDelim, Coalescing::Normal);
        self.base.advance(1);
        true
    }

    fn try_number(&mut self) -> bool {
        let rest = self.base.remainder();
        if rest.is_empty() || !rest[0].is_ascii_digit() {
            return false;
        }
        let opts = ulight_core::CommonNumberOptions {
            prefixes: &[
                ulight_core::StringAndBase { text: "0x", base: 16 },
                ulight_core::StringAndBase { text: "0b", base: 2 },
            ],
            exponent_separators: &[ulight_core::StringAndBase { text: "e", base: 10 }],
            suffixes: ulight_core::SuffixMatcher::List(&["f", "F", "L", "u", "U", "uL", "UL"]),
            default_base: 10,
            default_leading_zero_base: 10,
            digit_separator: Some(b'_'),
            nonempty_integer: true,
            nonempty_fraction: false,
        };
        let r = ulight_core::match_common_number(rest, &opts);
        if r.length == 0 {
            return false;
        }
        let begin = self.base.index();
        self.base.emit(begin, r.length as u32, Category::Number, Coalescing::Normal);
        self.base.advance(r.length as u32);
        true
    }

    fn try_identifier_or_keyword(&mut self) -> bool {
        let rest = self.base.remainder();
        if rest.first() == Some(&b'`') {
            // Backtick-escaped identifiers accept nearly any byte until
            // the closing backtick.
            let len = 1 + ulight_core::ascii::length_before(&rest[1..], b'`', 1) as u32;
            let close_present = rest.get(len as usize).is_some();
            let total = if close_present { len + 1 } else { len };
            self.base.emit_and_advance(total, Category::Name, Coalescing::Normal);
            return true;
        }
        let (cp, _) = ulight_core::utf8::decode_and_length_or_replacement(rest);
        if !kt_chars::is_identifier_start(cp) {
            return false;
        }
        let len = ulight_core::utf8::length_if(rest, kt_chars::is_identifier_continue) as u32;
        let word = &rest[..len as usize];
        let category = lookup_length_bucketed(KEYWORDS, word)
            .or_else(|| lookup_length_bucketed(BUILTIN_TYPES, word))
            .unwrap_or(Category::Name);
        self.base.emit_and_advance(len, category, Coalescing::Normal);
        true
    }

    fn try_punctuation(&mut self) -> bool {
        let rest = self.base.remainder();
        let Some(&c) = rest.first() else { return false };
        if c == b'}' {
            if self.substitution_depth > 0 && self.block_depth == *self.brace_depth_at_substitution.last().unwrap_or(&0) {
                self.brace_depth_at_substitution.pop();
                self.substitution_depth -= 1;
                let begin = self.base.index();
                self.base.emit(begin, 1, Category::StringInterpolationDelim, Coalescing::Normal);
                self.base.advance(1);
                return true;
            }
            self.block_depth = self.block_depth.saturating_sub(1);
            self.base.emit_and_advance(1, Category::SymBrace, Coalescing::Normal);
            return true;
        }
        let (len, category) = match c {
            b'(' | b')' => (1, Category::SymParens),
            b'[' | b']' => (1, Category::SymSquare),
            b'{' => {
                self.block_depth += 1;
                (1, Category::SymBrace)
            }
            b';' | b',' => (1, Category::SymPunc),
            b'@' => (1, Category::SymPunc),
            b'.' if rest.starts_with(b"..") => (2, Category::SymOp),
            b':' if rest.starts_with(b"::") => (2, Category::SymOp),
            b'-' if rest.starts_with(b"->") => (2, Category::SymOp),
            _ if is_op_byte(c) => (ulight_core::ascii::length_if(rest, is_op_byte).min(3) as u32, Category::SymOp),
            _ => return false,
        };
        self.base.emit_and_advance(len, category, Coalescing::Normal);
        true
    }

    /// Recurses into the ordinary dispatch loop for a `${…}` body, which
    /// may itself contain arbitrary nested braces that must balance
    /// before the matching `}` closes the interpolation.
    fn scan_braced_interpolation(&mut self) {
        self.substitution_depth += 1;
        self.brace_depth_at_substitution.push(self.block_depth);
        while !self.base.eof() {
            let closed_here = self.substitution_depth == self.brace_depth_at_substitution.len() as u32
                && self.base.cursor().current() == b'}'
                && self.block_depth == *self.brace_depth_at_substitution.last().unwrap_or(&self.block_depth);
            if closed_here {
                self.try_punctuation();
                return;
            }
            if !self.dispatch_one() {
                self.base.emit_error_one_code_point();
            }
            if self.brace_depth_at_substitution.len() < self.substitution_depth as usize {
                // A nested substitution consumed its own closing brace and
                // popped itself; nothing further to do here.
                return;
            }
        }
    }
}

fn match_simple_interpolation(rest: &[u8]) -> Option<u32> {
    debug_assert_eq!(rest.first(), Some(&b'$'));
    let body = &rest[1..];
    let (cp, _) = ulight_core::utf8::decode_and_length_or_replacement(body);
    if !kt_chars::is_identifier_start(cp) {
        return None;
    }
    let len = ulight_core::utf8::length_if(body, kt_chars::is_identifier_continue) as u32;
    Some(1 + len)
}

fn is_op_byte(b: u8) -> bool {
    matches!(
        b,
        b'+' | b'-' | b'*' | b'/' | b'%' | b'=' | b'<' | b'>' | b'!' | b'&' | b'|' | b'^' | b'~' | b'.' | b':' | b'?'
    )
}

fn escape_length(rest: &[u8]) -> u32 {
    debug_assert_eq!(rest.first(), Some(&b'\\'));
    let body = &rest[1..];
    let result = match body.first() {
        Some(b'u') => ulight_core::match_common_escape_with_prefix(body, 1, ulight_core::CommonEscape::Hex4).length as u32,
        Some(_) => 1,
        None => 0,
    };
    1 + result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ulight_core::SourceBuffer;

    fn run(source: &str) -> Vec<ulight_core::HighlightToken> {
        let buf = SourceBuffer::new(source.as_bytes());
        Scanner::new(buf.cursor(), Options { coalescing: true, strict: false }).run()
    }

    #[test]
    fn triple_quoted_string_with_interpolation() {
        let toks = run(r#""""hi ${name}!""""#);
        let categories: Vec<_> = toks.iter().map(|t| t.category).collect();
        assert_eq!(
            categories,
            vec![
                Category::StringDelim,
                Category::String,
                Category::StringInterpolationDelim,
                Category::Name,
                Category::StringInterpolationDelim,
                Category::String,
                Category::StringDelim,
            ]
        );
    }

    #[test]
    fn simple_dollar_interpolation_splits_name() {
        let toks = run(r#""val $x end""#);
        assert!(toks.iter().any(|t| t.category == Category::StringInterpolationDelim));
        assert!(toks.iter().any(|t| t.category == Category::Name));
    }

    #[test]
    fn super_keyword_recognised_regardless_of_at_suffix() {
        let toks = run("super@Outer");
        assert_eq!(toks[0].category, Category::KeywordThis);
    }

    #[test]
    fn nested_braces_inside_interpolation_balance() {
        let toks = run(r#""x${ if (a) { 1 } else { 2 } }y""#);
        let brace_count = toks.iter().filter(|t| t.category == Category::SymBrace).count();
        assert_eq!(brace_count, 4);
    }

    #[test]
    fn backtick_identifier_is_a_single_name_token() {
        let toks = run("val `my var` = 1");
        assert!(toks.iter().any(|t| t.category == Category::Name));
    }
}
