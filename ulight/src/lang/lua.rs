//! Lua scanner. Long brackets (`[[…]]`, `[=[…]=]`, …) are shared between
//! long strings and long comments; the bracket's `=`-run length must
//! match between opener and closer.

use ulight_core::{chars::lua as lua_chars, Category, Coalescing};

use crate::keywords::lookup_length_bucketed;
use crate::scanner::{Options, ScannerBase};

const KEYWORDS: &[(&str, Category)] = &[
    ("and", Category::Keyword),
    ("break", Category::KeywordControl),
    ("do", Category::KeywordControl),
    ("else", Category::KeywordControl),
    ("elseif", Category::KeywordControl),
    ("end", Category::KeywordControl),
    ("false", Category::Bool),
    ("for", Category::KeywordControl),
    ("function", Category::Keyword),
    ("goto", Category::KeywordControl),
    ("if", Category::KeywordControl),
    ("in", Category::KeywordControl),
    ("local", Category::Keyword),
    ("nil", Category::Null),
    ("not", Category::Keyword),
    ("or", Category::Keyword),
    ("repeat", Category::KeywordControl),
    ("return", Category::KeywordControl),
    ("self", Category::KeywordThis),
    ("then", Category::KeywordControl),
    ("true", Category::Bool),
    ("until", Category::KeywordControl),
    ("while", Category::KeywordControl),
];

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
            if self.try_whitespace()
                || self.try_long_comment()
                || self.try_line_comment()
                || self.try_long_string()
                || self.try_short_string()
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

    fn try_whitespace(&mut self) -> bool {
        if !matches!(self.base.cursor().current(), b' ' | b'\t' | b'\r' | b'\n') {
            return false;
        }
        self.base.cursor_mut().eat_whitespace();
        true
    }

    fn try_long_comment(&mut self) -> bool {
        let rest = self.base.remainder();
        if !rest.starts_with(b"--[") {
            return false;
        }
        let Some(level) = long_bracket_level(&rest[2..]) else {
            return false;
        };
        self.base.advance(2);
        let bracket_begin = self.base.index();
        self.scan_long_bracket(bracket_begin, level, Category::Comment);
        true
    }

    fn try_line_comment(&mut self) -> bool {
        if !self.base.remainder().starts_with(b"--") {
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

    fn try_long_string(&mut self) -> bool {
        let rest = self.base.remainder();
        if rest.first() != Some(&b'[') {
            return false;
        }
        let Some(level) = long_bracket_level(rest) else {
            return false;
        };
        let begin = self.base.index();
        self.scan_long_bracket(begin, level, Category::String);
        true
    }

    /// Scans from `[`-run start (`begin`) to the matching closer whose
    /// `=`-run length equals `level`. The opener/closer get `*Delim`;
    /// everything between is `category`.
    fn scan_long_bracket(&mut self, begin: u32, level: usize, category: Category) {
        let delim_category = if category == Category::Comment { Category::CommentDelim } else { Category::StringDelim };
        let open_len = 2 + level as u32;
        self.base.emit(begin, open_len, delim_category, Coalescing::Normal);
        self.base.advance(open_len);
        let closer: Vec<u8> = std::iter::once(b']').chain(std::iter::repeat(b'=').take(level)).chain(std::iter::once(b']')).collect();
        let content_begin = self.base.index();
        let rest = self.base.remainder();
        let (content_len, terminated) = match find_subslice(rest, &closer) {
            Some(idx) => (idx, true),
            None => (rest.len() as u32, false),
        };
        if content_len > 0 {
            self.base.emit(content_begin, content_len, category, Coalescing::Normal);
        }
        self.base.advance(content_len);
        if terminated {
            let close_begin = self.base.index();
            self.base.emit(close_begin, closer.len() as u32, delim_category, Coalescing::Normal);
            self.base.advance(closer.len() as u32);
        }
    }

    fn try_short_string(&mut self) -> bool {
        let quote = self.base.cursor().current();
        if quote != b'"' && quote != b'\'' {
            return false;
        }
        let begin = self.base.index();
        self.base.emit(begin, 1, Category::StringDelim, Coalescing::Normal);
        self.base.advance(1);
        let mut flush_start = self.base.index();
        loop {
            let found = self.base.cursor_mut().skip_to_string_delim(quote);
            let end = self.base.index();
            if end > flush_start {
                self.base.emit(flush_start, end - flush_start, Category::String, Coalescing::Normal);
            }
            match found {
                0 | b'\n' => return true,
                b'\\' => {
                    let esc_begin = self.base.index();
                    let esc = escape_length(self.base.remainder());
                    self.base.emit(esc_begin, esc, Category::StringEscape, Coalescing::Normal);
                    self.base.advance(esc);
                    flush_start = self.base.index();
                }
                _ => {
                    let close = self.base.index();
                    self.base.emit(close, 1, Category::StringDelim, Coalescing::Normal);
                    self.base.advance(1);
                    return true;
                }
            }
        }
    }

    fn try_number(&mut self) -> bool {
        let rest = self.base.remainder();
        if rest.is_empty() || !(rest[0].is_ascii_digit() || (rest[0] == b'.' && rest.get(1).is_some_and(u8::is_ascii_digit))) {
            return false;
        }
        let opts = ulight_core::CommonNumberOptions {
            prefixes: &[ulight_core::StringAndBase { text: "0x", base: 16 }, ulight_core::StringAndBase { text: "0X", base: 16 }],
            exponent_separators: &[
                ulight_core::StringAndBase { text: "e", base: 10 },
                ulight_core::StringAndBase { text: "E", base: 10 },
                ulight_core::StringAndBase { text: "p", base: 16 },
                ulight_core::StringAndBase { text: "P", base: 16 },
            ],
            suffixes: ulight_core::SuffixMatcher::None,
            default_base: 10,
            default_leading_zero_base: 10,
            digit_separator: None,
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
        let Some(&first) = rest.first() else { return false };
        if !lua_chars::is_identifier_start(first) {
            return false;
        }
        let len = ulight_core::ascii::length_if(rest, lua_chars::is_identifier_continue) as u32;
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
            b',' | b';' => (1, Category::SymPunc),
            b'.' if rest.starts_with(b"...") => (3, Category::SymOp),
            b'.' if rest.starts_with(b"..") => (2, Category::SymOp),
            b':' if rest.starts_with(b"::") => (2, Category::SymOp),
            b'=' if rest.starts_with(b"==") => (2, Category::SymOp),
            b'~' if rest.starts_with(b"~=") => (2, Category::SymOp),
            b'<' if rest.starts_with(b"<=") => (2, Category::SymOp),
            b'>' if rest.starts_with(b">=") => (2, Category::SymOp),
            _ if is_op_byte(c) => (1, Category::SymOp),
            _ => return false,
        };
        self.base.emit_and_advance(len, category, Coalescing::Normal);
        true
    }
}

fn is_op_byte(b: u8) -> bool {
    matches!(b, b'+' | b'-' | b'*' | b'/' | b'%' | b'^' | b'#' | b'<' | b'>' | b'=' | b'~' | b':' | b'.')
}

/// `[`, then N `=`, then `[`. Returns the `=`-run length, or `None` if
/// the bytes don't form a long bracket opener.
fn long_bracket_level(rest: &[u8]) -> Option<usize> {
    if rest.first() != Some(&b'[') {
        return None;
    }
    let level = ulight_core::ascii::length_if(&rest[1..], |b| b == b'=');
    if rest.get(1 + level) == Some(&b'[') {
        Some(level)
    } else {
        None
    }
}

fn escape_length(rest: &[u8]) -> u32 {
    debug_assert_eq!(rest.first(), Some(&b'\\'));
    let body = &rest[1..];
    let result = match body.first() {
        Some(b'z') => 1 + ulight_core::ascii::length_if(&body[1..], |b| matches!(b, b' ' | b'\t' | b'\n' | b'\r')) as u32,
        Some(b'x') => ulight_core::match_common_escape_with_prefix(body, 1, ulight_core::CommonEscape::Hex2).length as u32,
        Some(d) if d.is_ascii_digit() => ulight_core::match_common_escape(body, ulight_core::CommonEscape::Octal1To3).length as u32,
        Some(b'\n') | Some(b'\r') => ulight_core::match_common_escape(body, ulight_core::CommonEscape::LfCrCrlf).length as u32,
        Some(_) => 1,
        None => 0,
    };
    1 + result
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<u32> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle).map(|i| i as u32)
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
    fn long_bracket_string_with_equals_level() {
        let toks = run("[==[hi]==]");
        let categories: Vec<_> = toks.iter().map(|t| t.category).collect();
        assert_eq!(categories, vec![Category::StringDelim, Category::String, Category::StringDelim]);
        assert_eq!(toks[0].length, 4);
        assert_eq!(toks[2].length, 4);
    }

    #[test]
    fn mismatched_level_does_not_close_early() {
        let toks = run("[==[a]=]b]==]");
        let categories: Vec<_> = toks.iter().map(|t| t.category).collect();
        assert_eq!(categories, vec![Category::StringDelim, Category::String, Category::StringDelim]);
    }

    #[test]
    fn long_comment_recognised() {
        let toks = run("--[[ block comment ]]");
        assert_eq!(toks[0].category, Category::CommentDelim);
        assert!(toks.iter().any(|t| t.category == Category::Comment));
    }

    #[test]
    fn self_is_keyword_this() {
        let toks = run("self.x = 1");
        assert_eq!(toks[0].category, Category::KeywordThis);
    }
}
