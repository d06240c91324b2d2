//! Python scanner.
//!
//! String prefixes combine `u`/`r`/`b`/`f` (case-insensitive, `rb`/`br`
//! and `rf`/`fr` orderings) into a closed set classified up front so the
//! body scan knows whether escapes or interpolation apply. `>>>` is
//! tokenised as a single operator lexeme regardless of which REPL-prompt
//! label a caller might attach to it.

use ulight_core::{chars::python as py_chars, Category, Coalescing};

use crate::keywords::lookup_length_bucketed;
use crate::scanner::{Options, ScannerBase};

const KEYWORDS: &[(&str, Category)] = &[
    ("and", Category::Keyword),
    ("as", Category::Keyword),
    ("assert", Category::Keyword),
    ("async", Category::Keyword),
    ("await", Category::KeywordControl),
    ("break", Category::KeywordControl),
    ("class", Category::Keyword),
    ("continue", Category::KeywordControl),
    ("def", Category::Keyword),
    ("del", Category::Keyword),
    ("elif", Category::KeywordControl),
    ("else", Category::KeywordControl),
    ("except", Category::KeywordControl),
    ("False", Category::Bool),
    ("finally", Category::KeywordControl),
    ("for", Category::KeywordControl),
    ("from", Category::Keyword),
    ("global", Category::Keyword),
    ("if", Category::KeywordControl),
    ("import", Category::Keyword),
    ("in", Category::KeywordControl),
    ("is", Category::Keyword),
    ("lambda", Category::Keyword),
    ("None", Category::Null),
    ("nonlocal", Category::Keyword),
    ("not", Category::Keyword),
    ("or", Category::Keyword),
    ("pass", Category::Keyword),
    ("raise", Category::KeywordControl),
    ("return", Category::KeywordControl),
    ("self", Category::KeywordThis),
    ("cls", Category::KeywordThis),
    ("True", Category::Bool),
    ("try", Category::KeywordControl),
    ("while", Category::KeywordControl),
    ("with", Category::Keyword),
    ("yield", Category::KeywordControl),
];

/// Closed set of Python string-prefix combinations. The label names the
/// semantics; `lexeme` is what's actually matched and is authoritative
/// whenever the two might otherwise disagree.
#[derive(Clone, Copy, PartialEq, Eq)]
enum StringPrefix {
    Plain,
    Unicode,
    Raw,
    Bytes,
    RawBytes,
    Format,
    RawFormat,
}

impl StringPrefix {
    fn is_raw(self) -> bool {
        matches!(self, Self::Raw | Self::RawBytes | Self::RawFormat)
    }
    fn is_bytes(self) -> bool {
        matches!(self, Self::Bytes | Self::RawBytes)
    }
    fn is_format(self) -> bool {
        matches!(self, Self::Format | Self::RawFormat)
    }
}

/// Matches a prefix lexeme (0-2 bytes) against the closed combination
/// set, case-insensitively. Returns the byte length consumed.
fn classify_string_prefix(rest: &[u8]) -> Option<(usize, StringPrefix)> {
    if rest.len() >= 2 && !matches!(rest[1], b'"' | b'\'') {
        let pair = [rest[0].to_ascii_lowercase(), rest[1].to_ascii_lowercase()];
        let kind = match &pair {
            b"rb" | b"br" => Some(StringPrefix::RawBytes),
            b"rf" | b"fr" => Some(StringPrefix::RawFormat),
            _ => None,
        };
        if let Some(k) = kind {
            return Some((2, k));
        }
    }
    match rest.first().map(|b| b.to_ascii_lowercase()) {
        Some(b'u') => Some((1, StringPrefix::Unicode)),
        Some(b'r') => Some((1, StringPrefix::Raw)),
        Some(b'b') => Some((1, StringPrefix::Bytes)),
        Some(b'f') => Some((1, StringPrefix::Format)),
        _ => None,
    }
}

pub struct Scanner<'a> {
    base: ScannerBase<'a>,
}

impl<'a> Scanner<'a> {
    #[must_use]
    pub fn new(cursor: ulight_core::Cursor<'a>, options: Options) -> Self {
        Self {
            base: ScannerBase::new(cursor, options),
        }
    }

    pub fn run(mut self) -> Vec<ulight_core::HighlightToken> {
        while !self.base.eof() {
            if self.try_whitespace_or_line_continuation()
                || self.try_comment()
                || self.try_string_with_optional_prefix()
                || self.try_number()
                || self.try_identifier_or_keyword()
                || self.try_punctuation()
            {
                continue;
            }
            self.base.emit_error_one_code_point();
        }
        self.base.finish()
    }

    fn try_whitespace_or_line_continuation(&mut self) -> bool {
        let rest = self.base.remainder();
        if rest.starts_with(b"\\\n") {
            self.base.emit_and_advance(2, Category::Escape, Coalescing::Normal);
            return true;
        }
        if rest.starts_with(b"\\\r\n") {
            self.base.emit_and_advance(3, Category::Escape, Coalescing::Normal);
            return true;
        }
        if !matches!(self.base.cursor().current(), b' ' | b'\t' | b'\r' | b'\n') {
            return false;
        }
        self.base.cursor_mut().eat_whitespace();
        true
    }

    fn try_comment(&mut self) -> bool {
        if self.base.cursor().current() != b'#' {
            return false;
        }
        let begin = self.base.index();
        self.base.emit(begin, 1, Category::CommentDelim, Coalescing::Normal);
        self.base.advance(1);
        let text_begin = self.base.index();
        let n = self.base.cursor_mut().eat_until_newline_or_eof();
        if n > 0 {
            self.base.emit(text_begin, n, Category::Comment, Coalescing::Normal);
        }
        true
    }

    fn try_string_with_optional_prefix(&mut self) -> bool {
        let rest = self.base.remainder();
        if rest.first() == Some(&b'"') || rest.first() == Some(&b'\'') {
            return self.scan_string(StringPrefix::Plain);
        }
        let Some((prefix_len, kind)) = classify_string_prefix(rest) else {
            return false;
        };
        if rest.get(prefix_len) != Some(&b'"') && rest.get(prefix_len) != Some(&b'\'') {
            return false;
        }
        if prefix_len > 0 {
            let begin = self.base.index();
            self.base.emit(begin, prefix_len as u32, Category::StringDecor, Coalescing::Normal);
            self.base.advance(prefix_len as u32);
        }
        self.scan_string(kind)
    }

    fn scan_string(&mut self, kind: StringPrefix) -> bool {
        let quote = self.base.cursor().current();
        let rest = self.base.remainder();
        let triple = rest.len() >= 3 && rest[1] == quote && rest[2] == quote;
        let open_len = if triple { 3 } else { 1 };
        let begin = self.base.index();
        self.base.emit(begin, open_len, Category::StringDelim, Coalescing::Normal);
        self.base.advance(open_len);
        let mut flush_start = self.base.index();
        loop {
            let rest = self.base.remainder();
            let Some(&b) = rest.first() else {
                flush(&mut self.base, flush_start, Category::String);
                return true;
            };
            if !triple && b == b'\n' {
                flush(&mut self.base, flush_start, Category::String);
                return true;
            }
            if b == quote && (!triple || rest.starts_with(&[quote, quote, quote])) {
                flush(&mut self.base, flush_start, Category::String);
                let close_len = if triple { 3 } else { 1 };
                let close = self.base.index();
                self.base.emit(close, close_len, Category::StringDelim, Coalescing::Normal);
                self.base.advance(close_len);
                return true;
            }
            if b == b'\\' && !kind.is_raw() {
                flush(&mut self.base, flush_start, Category::String);
                let esc_begin = self.base.index();
                let esc = escape_length(rest, kind.is_bytes());
                self.base.emit(esc_begin, esc, Category::StringEscape, Coalescing::Normal);
                self.base.advance(esc);
                flush_start = self.base.index();
                continue;
            }
            if b == b'\\' && kind.is_raw() {
                // Raw strings disable escapes, except the line-continuation
                // form, which still absorbs the following newline.
                if rest.starts_with(b"\\\n") {
                    flush(&mut self.base, flush_start, Category::String);
                    let begin = self.base.index();
                    self.base.emit(begin, 2, Category::Escape, Coalescing::Normal);
                    self.base.advance(2);
                    flush_start = self.base.index();
                    continue;
                }
                self.base.advance(1);
                continue;
            }
            if kind.is_format() && b == b'{' {
                if rest.get(1) == Some(&b'{') {
                    self.base.advance(2);
                    continue;
                }
                flush(&mut self.base, flush_start, Category::String);
                let delim_begin = self.base.index();
                self.base.emit(delim_begin, 1, Category::StringInterpolationDelim, Coalescing::Normal);
                self.base.advance(1);
                self.scan_format_field();
                flush_start = self.base.index();
                continue;
            }
            self.base.advance(1);
        }
    }

    /// Scans an f-string replacement field body up to the matching `}`,
    /// which may be preceded by a `!conversion` or `:format_spec` suffix.
    fn scan_format_field(&mut self) {
        let mut depth = 1u32;
        while !self.base.eof() {
            let rest = self.base.remainder();
            match rest.first() {
                Some(b'{') => {
                    depth += 1;
                    self.base.advance(1);
                }
                Some(b'}') => {
                    depth -= 1;
                    if depth == 0 {
                        self.base.emit_and_advance(1, Category::StringInterpolationDelim, Coalescing::Normal);
                        return;
                    }
                    self.base.advance(1);
                }
                Some(b'\'') | Some(b'"') => {
                    self.scan_string(StringPrefix::Plain);
                }
                Some(_) => {
                    if !(self.try_number() || self.try_identifier_or_keyword() || self.try_punctuation()) {
                        self.base.advance_one_unhighlighted();
                    }
                }
                None => return,
            }
        }
    }

    fn try_number(&mut self) -> bool {
        let rest = self.base.remainder();
        if rest.is_empty() || !(rest[0].is_ascii_digit() || (rest[0] == b'.' && rest.get(1).is_some_and(u8::is_ascii_digit))) {
            return false;
        }
        let opts = ulight_core::CommonNumberOptions {
            prefixes: &[
                ulight_core::StringAndBase { text: "0x", base: 16 },
                ulight_core::StringAndBase { text: "0X", base: 16 },
                ulight_core::StringAndBase { text: "0o", base: 8 },
                ulight_core::StringAndBase { text: "0O", base: 8 },
                ulight_core::StringAndBase { text: "0b", base: 2 },
                ulight_core::StringAndBase { text: "0B", base: 2 },
            ],
            exponent_separators: &[
                ulight_core::StringAndBase { text: "e", base: 10 },
                ulight_core::StringAndBase { text: "E", base: 10 },
            ],
            suffixes: ulight_core::SuffixMatcher::List(&["j", "J"]),
            default_base: 10,
            default_leading_zero_base: 10,
            digit_separator: Some(b'_'),
            nonempty_integer: false,
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
        let (cp, _) = ulight_core::utf8::decode_and_length_or_replacement(rest);
        if !py_chars::is_identifier_start(cp) {
            return false;
        }
        let len = ulight_core::utf8::length_if(rest, py_chars::is_identifier_continue) as u32;
        let word = &rest[..len as usize];
        let category = lookup_length_bucketed(KEYWORDS, word).unwrap_or(Category::Name);
        self.base.emit_and_advance(len, category, Coalescing::Normal);
        true
    }

    fn try_punctuation(&mut self) -> bool {
        let rest = self.base.remainder();
        let Some(&c) = rest.first() else { return false };
        let (len, category) = match c {
            b'(' | b')' => (1, Category::SymParens),
            b'[' | b']' => (1, Category::SymSquare),
            b'{' | b'}' => (1, Category::SymBrace),
            b':' | b';' | b',' => (1, Category::SymPunc),
            // `>>>` is a single operator lexeme regardless of which REPL
            // label ("primary prompt") a caller attaches to it.
            b'>' if rest.starts_with(b">>>") => (3, Category::SymOp),
            b'*' if rest.starts_with(b"**=") => (3, Category::SymOp),
            b'/' if rest.starts_with(b"//=") => (3, Category::SymOp),
            b'.' if rest.starts_with(b"...") => (3, Category::SymOp),
            _ if is_op_byte(c) => (ulight_core::ascii::length_if(rest, is_op_byte).min(2) as u32, Category::SymOp),
            _ => return false,
        };
        self.base.emit_and_advance(len, category, Coalescing::Normal);
        true
    }
}

fn flush(base: &mut ScannerBase<'_>, start: u32, category: Category) {
    let end = base.index();
    if end > start {
        base.emit(start, end - start, category, Coalescing::Normal);
    }
}

fn is_op_byte(b: u8) -> bool {
    matches!(
        b,
        b'+' | b'-' | b'*' | b'/' | b'%' | b'=' | b'<' | b'>' | b'!' | b'&' | b'|' | b'^' | b'~' | b'@'
    )
}

fn escape_length(rest: &[u8], is_bytes: bool) -> u32 {
    debug_assert_eq!(rest.first(), Some(&b'\\'));
    let body = &rest[1..];
    let result = match body.first() {
        Some(b'x') => ulight_core::match_common_escape_with_prefix(body, 1, ulight_core::CommonEscape::Hex1To2).length as u32,
        // Byte strings forbid the Unicode-only escape forms; treat them
        // as a single consumed byte rather than a multi-byte escape.
        Some(b'u') if !is_bytes => ulight_core::match_common_escape_with_prefix(body, 1, ulight_core::CommonEscape::Hex4).length as u32,
        Some(b'U') if !is_bytes => ulight_core::match_common_escape_with_prefix(body, 1, ulight_core::CommonEscape::Hex8).length as u32,
        Some(b'N') if !is_bytes && body.get(1) == Some(&b'{') => {
            ulight_core::match_common_escape_with_prefix(body, 1, ulight_core::CommonEscape::NonemptyBraced).length as u32
        }
        Some(b'\r') | Some(b'\n') => ulight_core::match_common_escape(body, ulight_core::CommonEscape::LfCrCrlf).length as u32,
        Some(d) if d.is_ascii_digit() => ulight_core::match_common_escape(body, ulight_core::CommonEscape::Octal1To3).length as u32,
        Some(_) => 1,
        None => 0,
    };
    1 + result
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ulight_core::SourceBuffer;

    fn run(source: &str) -> Vec<ulight_core::HighlightToken> {
        let buf = SourceBuffer::new(source.as_bytes());
        Scanner::new(buf.cursor(), Options { coalescing: true, strict: false }).run()
    }

    #[test]
    fn raw_byte_string_prefix_disables_escapes() {
        let toks = run(r#"rb"a\nb""#);
        assert!(!toks.iter().any(|t| t.category == Category::StringEscape));
        assert!(toks.iter().any(|t| t.category == Category::StringDecor));
    }

    #[test]
    fn format_string_field_is_scanned_as_code() {
        let toks = run(r#"f"hi {name!r}""#);
        let categories: Vec<_> = toks.iter().map(|t| t.category).collect();
        assert!(categories.contains(&Category::StringInterpolationDelim));
        assert!(categories.contains(&Category::Name));
    }

    #[test]
    fn triple_quoted_string_spans_newlines() {
        let toks = run("\"\"\"a\nb\"\"\"");
        assert_eq!(toks[0].category, Category::StringDelim);
        assert_eq!(toks[0].length, 3);
    }

    #[test]
    fn shift_right_triple_is_one_operator_token() {
        let toks = run("x >>> y");
        let op = toks.iter().find(|t| t.category == Category::SymOp).unwrap();
        assert_eq!(op.length, 3);
    }

    #[test]
    fn byte_string_disallows_unicode_escape_form() {
        let toks = run(r#"b"\u0041""#);
        // `\u` is not special in a byte string: treated as a one-byte escape,
        // not the four-hex-digit Unicode escape.
        let esc = toks.iter().find(|t| t.category == Category::StringEscape).unwrap();
        assert_eq!(esc.length, 2);
    }
}
