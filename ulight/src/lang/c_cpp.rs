//! C and C++ scanner.
//!
//! Models C++ translation-phase tokenisation approximately: whitespace,
//! comments, string/char literals (with raw strings and prefixes),
//! preprocessing numbers, identifiers/keywords, and punctuation, in that
//! order, per construct order.

use ulight_core::{Category, Coalescing, CommonEscape};

use crate::keywords::lookup_length_bucketed;
use crate::scanner::{Options, ScannerBase};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    C,
    Cpp,
}

const C_KEYWORDS: &[(&str, Category)] = &[
    ("auto", Category::Keyword),
    ("break", Category::KeywordControl),
    ("case", Category::KeywordControl),
    ("char", Category::KeywordType),
    ("const", Category::Keyword),
    ("continue", Category::KeywordControl),
    ("default", Category::KeywordControl),
    ("do", Category::KeywordControl),
    ("double", Category::KeywordType),
    ("else", Category::KeywordControl),
    ("enum", Category::Keyword),
    ("extern", Category::Keyword),
    ("float", Category::KeywordType),
    ("for", Category::KeywordControl),
    ("goto", Category::KeywordControl),
    ("if", Category::KeywordControl),
    ("inline", Category::Keyword),
    ("int", Category::KeywordType),
    ("long", Category::KeywordType),
    ("register", Category::Keyword),
    ("restrict", Category::Keyword),
    ("return", Category::KeywordControl),
    ("short", Category::KeywordType),
    ("signed", Category::KeywordType),
    ("sizeof", Category::Keyword),
    ("static", Category::Keyword),
    ("struct", Category::Keyword),
    ("switch", Category::KeywordControl),
    ("typedef", Category::Keyword),
    ("union", Category::Keyword),
    ("unsigned", Category::KeywordType),
    ("void", Category::KeywordType),
    ("volatile", Category::Keyword),
    ("while", Category::KeywordControl),
    ("_Bool", Category::KeywordType),
    ("true", Category::Bool),
    ("false", Category::Bool),
    ("NULL", Category::Null),
];

const CPP_EXTRA_KEYWORDS: &[(&str, Category)] = &[
    ("alignas", Category::Keyword),
    ("alignof", Category::Keyword),
    ("and", Category::Keyword),
    ("asm", Category::Keyword),
    ("bool", Category::KeywordType),
    ("catch", Category::KeywordControl),
    ("char8_t", Category::KeywordType),
    ("char16_t", Category::KeywordType),
    ("char32_t", Category::KeywordType),
    ("class", Category::Keyword),
    ("concept", Category::Keyword),
    ("const_cast", Category::Keyword),
    ("consteval", Category::Keyword),
    ("constexpr", Category::Keyword),
    ("constinit", Category::Keyword),
    ("decltype", Category::Keyword),
    ("delete", Category::KeywordControl),
    ("dynamic_cast", Category::Keyword),
    ("explicit", Category::Keyword),
    ("export", Category::Keyword),
    ("false", Category::Bool),
    ("friend", Category::Keyword),
    ("namespace", Category::Keyword),
    ("new", Category::KeywordControl),
    ("noexcept", Category::Keyword),
    ("nullptr", Category::Null),
    ("operator", Category::Keyword),
    ("private", Category::Keyword),
    ("protected", Category::Keyword),
    ("public", Category::Keyword),
    ("reinterpret_cast", Category::Keyword),
    ("requires", Category::Keyword),
    ("static_assert", Category::Keyword),
    ("static_cast", Category::Keyword),
    ("template", Category::Keyword),
    ("this", Category::KeywordThis),
    ("thread_local", Category::Keyword),
    ("throw", Category::KeywordControl),
    ("true", Category::Bool),
    ("try", Category::KeywordControl),
    ("typeid", Category::Keyword),
    ("typename", Category::Keyword),
    ("using", Category::Keyword),
    ("virtual", Category::Keyword),
    ("wchar_t", Category::KeywordType),
];

fn keyword_category(word: &[u8], dialect: Dialect) -> Option<Category> {
    lookup_length_bucketed(C_KEYWORDS, word)
        .or_else(|| (dialect == Dialect::Cpp).then(|| lookup_length_bucketed(CPP_EXTRA_KEYWORDS, word)).flatten())
}

pub struct Scanner<'a> {
    base: ScannerBase<'a>,
    dialect: Dialect,
    fresh_line: bool,
}

impl<'a> Scanner<'a> {
    #[must_use]
    pub fn new(cursor: ulight_core::Cursor<'a>, options: Options, dialect: Dialect) -> Self {
        Self {
            base: ScannerBase::new(cursor, options),
            dialect,
            fresh_line: true,
        }
    }

    pub fn run(mut self) -> Vec<ulight_core::HighlightToken> {
        while !self.base.eof() {
            if self.try_whitespace()
                || self.try_line_comment()
                || self.try_block_comment()
                || self.try_preprocessing_directive()
                || self.try_string_or_char()
                || self.try_pp_number()
                || self.try_identifier_or_keyword()
                || self.try_punctuation()
            {
                continue;
            }
            self.base.emit_error_one_code_point();
            self.fresh_line = false;
        }
        self.base.finish()
    }

    fn try_whitespace(&mut self) -> bool {
        let before = self.base.index();
        let c = self.base.cursor().current();
        if !matches!(c, b' ' | b'\t' | 0x0C | b'\r' | b'\n') {
            return false;
        }
        let n = self.base.cursor_mut().eat_whitespace();
        if self.base.cursor().slice(before, before + n).contains(&b'\n') {
            self.fresh_line = true;
        }
        true
    }

    fn try_line_comment(&mut self) -> bool {
        if self.base.remainder().starts_with(b"//") {
            let begin = self.base.index();
            self.base.emit(begin, 2, Category::CommentDelim, Coalescing::Normal);
            self.base.advance(2);
            let text_begin = self.base.index();
            let n = self.base.cursor_mut().eat_until_newline_or_eof();
            if n > 0 {
                self.base.emit(text_begin, n, Category::Comment, Coalescing::Normal);
            }
            self.fresh_line = false;
            true
        } else {
            false
        }
    }

    fn try_block_comment(&mut self) -> bool {
        if !self.base.remainder().starts_with(b"/*") {
            return false;
        }
        let start = self.base.index();
        self.base.advance(2);
        let text_begin = self.base.index();
        let rest = self.base.remainder();
        let (content_len, terminated) = match find_subslice(rest, b"*/") {
            Some(idx) => (idx, true),
            None => (rest.len() as u32, false),
        };
        self.base.emit(start, 2, Category::CommentDelim, Coalescing::Normal);
        if content_len > 0 {
            self.base.emit(text_begin, content_len, Category::Comment, Coalescing::Normal);
        }
        self.base.advance(content_len);
        if terminated {
            let end_begin = self.base.index();
            self.base.emit(end_begin, 2, Category::CommentDelim, Coalescing::Normal);
            self.base.advance(2);
        }
        self.fresh_line = false;
        true
    }

    fn try_preprocessing_directive(&mut self) -> bool {
        if !self.fresh_line {
            return false;
        }
        let rest = self.base.remainder();
        if !(rest.starts_with(b"#") || rest.starts_with(b"%:")) {
            return false;
        }
        let hash_len = if rest.starts_with(b"%:") { 2 } else { 1 };
        let begin = self.base.index();
        let mut len = hash_len;
        loop {
            let tail = &rest[len as usize..];
            match find_line_end(tail) {
                LineEnd::Eof => {
                    len += tail.len() as u32;
                    break;
                }
                LineEnd::CommentStart(at) => {
                    len += at;
                    break;
                }
                LineEnd::Newline(at, continued) => {
                    len += at + 1;
                    if !continued {
                        break;
                    }
                }
            }
        }
        self.base.emit(begin, len, Category::NameMacro, Coalescing::Normal);
        self.base.advance(len);
        self.fresh_line = false;
        true
    }

    fn try_string_or_char(&mut self) -> bool {
        let rest = self.base.remainder();
        let (prefix_len, is_char, is_raw) = match classify_literal_prefix(rest) {
            Some(v) => v,
            None => return false,
        };
        self.fresh_line = false;
        if is_raw {
            self.scan_raw_string(prefix_len)
        } else if is_char {
            self.scan_quoted(prefix_len, b'\'', Category::String)
        } else {
            self.scan_quoted(prefix_len, b'"', Category::String)
        }
    }

    fn scan_quoted(&mut self, prefix_len: u32, quote: u8, default_category: Category) -> bool {
        let begin = self.base.index();
        if prefix_len > 0 {
            self.base.emit(begin, prefix_len, Category::StringDecor, Coalescing::Normal);
        }
        self.base.advance(prefix_len);
        let open = self.base.index();
        self.base.emit(open, 1, Category::StringDelim, Coalescing::Normal);
        self.base.advance(1);

        let mut flush_start = open + 1;
        loop {
            let found = self.base.cursor_mut().skip_to_string_delim(quote);
            let content_end = self.base.index();
            if content_end > flush_start {
                self.base.emit(flush_start, content_end - flush_start, default_category, Coalescing::Normal);
            }
            match found {
                0 => return true,
                b'\\' => {
                    let esc_begin = self.base.index();
                    let rest = self.base.remainder();
                    let esc = escape_length(rest);
                    self.base.emit(
                        esc_begin,
                        esc,
                        if rest.len() as u32 > esc { Category::StringEscape } else { Category::Error },
                        Coalescing::Normal,
                    );
                    self.base.advance(esc);
                    flush_start = self.base.index();
                }
                q if q == quote => {
                    let close = self.base.index();
                    self.base.emit(close, 1, Category::StringDelim, Coalescing::Normal);
                    self.base.advance(1);
                    return true;
                }
                _ => return true,
            }
        }
    }

    fn scan_raw_string(&mut self, prefix_len: u32) -> bool {
        let begin = self.base.index();
        let rest = self.base.remainder();
        let open_quote_idx = prefix_len as usize + 1; // R"
        let delim_len = ulight_core::ascii::length_before(
            &rest[open_quote_idx..],
            b'(',
            1,
        ) as u32;
        let open_len = prefix_len + 2 + delim_len + 1; // prefix + R" + d-seq + (
        if rest.len() < open_len as usize {
            return false;
        }
        self.base.emit(begin, open_len, Category::StringDelim, Coalescing::Normal);
        self.base.advance(open_len);

        let delim = self.base.cursor().slice(
            begin + prefix_len + 2,
            begin + prefix_len + 2 + delim_len,
        );
        let mut closer = Vec::with_capacity(delim.len() + 3);
        closer.push(b')');
        closer.extend_from_slice(delim);
        closer.push(b'"');

        let content_begin = self.base.index();
        let body = self.base.remainder();
        let (content_len, found) = match find_subslice(body, &closer) {
            Some(idx) => (idx, true),
            None => (body.len() as u32, false),
        };
        if content_len > 0 {
            self.base.emit(content_begin, content_len, Category::String, Coalescing::Normal);
        }
        self.base.advance(content_len);
        if found {
            let close_begin = self.base.index();
            self.base.emit(close_begin, closer.len() as u32, Category::StringDelim, Coalescing::Normal);
            self.base.advance(closer.len() as u32);
            let suffix_len = self
                .base
                .cursor()
                .remainder()
                .iter()
                .take_while(|&&b| c_cpp_ident_continue(b))
                .count() as u32;
            if suffix_len > 0 {
                let suffix_begin = self.base.index();
                self.base.emit(suffix_begin, suffix_len, Category::StringDecor, Coalescing::Normal);
                self.base.advance(suffix_len);
            }
        }
        true
    }

    fn try_pp_number(&mut self) -> bool {
        let rest = self.base.remainder();
        if rest.is_empty() || !ulight_core::chars::c_cpp::starts_pp_number(rest[0], rest.get(1).copied().unwrap_or(0)) {
            return false;
        }
        self.fresh_line = false;
        let len = pp_number_length(rest);
        let begin = self.base.index();
        emit_pp_number_parts(&mut self.base, begin, &rest[..len as usize]);
        self.base.advance(len);
        true
    }

    fn try_identifier_or_keyword(&mut self) -> bool {
        let rest = self.base.remainder();
        if rest.is_empty() || !ulight_core::chars::c_cpp::is_identifier_start(rest[0]) {
            return false;
        }
        self.fresh_line = false;
        let len = rest
            .iter()
            .take_while(|&&b| ulight_core::chars::c_cpp::is_identifier_continue(b))
            .count() as u32;
        let word = &rest[..len as usize];
        let category = if self.base.options.strict {
            lookup_length_bucketed(C_KEYWORDS, word)
        } else {
            keyword_category(word, self.dialect)
        }
        .unwrap_or(Category::Name);
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
            b';' | b',' => (1, Category::SymPunc),
            b'#' if rest.starts_with(b"##") => (2, Category::SymOp),
            b'%' if rest.starts_with(b"%:%:") => (4, Category::SymOp),
            b'-' if rest.starts_with(b"->") => (2, Category::SymOp),
            b':' if rest.starts_with(b"::") => (2, Category::SymPunc),
            b'.' if rest.starts_with(b"...") => (3, Category::SymOp),
            _ if is_op_byte(c) => (1, Category::SymOp),
            _ => return false,
        };
        self.fresh_line = false;
        self.base.emit_and_advance(len, category, Coalescing::Normal);
        true
    }
}

fn is_op_byte(b: u8) -> bool {
    matches!(
        b,
        b'+' | b'-' | b'*' | b'/' | b'%' | b'=' | b'<' | b'>' | b'!' | b'&' | b'|' | b'^' | b'~' | b'.' | b':' | b'?' | b'#'
    )
}

fn c_cpp_ident_continue(b: u8) -> bool {
    ulight_core::chars::c_cpp::is_identifier_continue(b)
}

fn classify_literal_prefix(rest: &[u8]) -> Option<(u32, bool, bool)> {
    const PREFIXES: &[&str] = &["u8", "u", "U", "L"];
    for &prefix in PREFIXES {
        let p = prefix.as_bytes();
        if rest.starts_with(p) {
            let after = &rest[p.len()..];
            if after.first() == Some(&b'R') && after.get(1) == Some(&b'"') {
                return Some((p.len() as u32 + 1, false, true));
            }
            if after.first() == Some(&b'"') {
                return Some((p.len() as u32, false, false));
            }
            if after.first() == Some(&b'\'') {
                return Some((p.len() as u32, true, false));
            }
        }
    }
    if rest.first() == Some(&b'R') && rest.get(1) == Some(&b'"') {
        return Some((1, false, true));
    }
    match rest.first() {
        Some(b'"') => Some((0, false, false)),
        Some(b'\'') => Some((0, true, false)),
        _ => None,
    }
}

fn escape_length(rest: &[u8]) -> u32 {
    debug_assert_eq!(rest.first(), Some(&b'\\'));
    let body = &rest[1..];
    let result = match body.first() {
        Some(b'x') => ulight_core::match_common_escape_with_prefix(body, 1, CommonEscape::Hex1ToInf).length as u32,
        Some(b'u') => ulight_core::match_common_escape_with_prefix(body, 1, CommonEscape::Hex4).length as u32,
        Some(b'U') => ulight_core::match_common_escape_with_prefix(body, 1, CommonEscape::Hex8).length as u32,
        Some(b'0'..=b'7') => {
            let r = ulight_core::match_common_escape(body, CommonEscape::Octal1To3);
            r.length as u32
        }
        Some(b'\n') | Some(b'\r') => {
            let r = ulight_core::match_common_escape(body, CommonEscape::LfCrCrlf);
            r.length as u32
        }
        Some(_) => 1,
        None => 0,
    };
    1 + result
}

enum LineEnd {
    Eof,
    Newline(u32, bool),
    CommentStart(u32),
}

fn find_line_end(bytes: &[u8]) -> LineEnd {
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if i + 1 < bytes.len() && bytes[i + 1] == b'\n' => return LineEnd::Newline(i as u32 + 1, true),
            b'\\' if bytes[i..].starts_with(b"\\\r\n") => return LineEnd::Newline(i as u32 + 2, true),
            b'\n' => return LineEnd::Newline(i as u32, false),
            b'/' if bytes[i..].starts_with(b"//") || bytes[i..].starts_with(b"/*") => {
                return LineEnd::CommentStart(i as u32)
            }
            _ => i += 1,
        }
    }
    LineEnd::Eof
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<u32> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i as u32)
}

fn pp_number_length(bytes: &[u8]) -> u32 {
    let mut len = 1u32;
    while (len as usize) < bytes.len() {
        let b = bytes[len as usize];
        if matches!(b, b'e' | b'E' | b'p' | b'P')
            && matches!(bytes.get(len as usize + 1), Some(b'+') | Some(b'-'))
        {
            len += 2;
            continue;
        }
        if ulight_core::chars::c_cpp::is_pp_number_continue(b) || b == b'\'' {
            len += 1;
        } else {
            break;
        }
    }
    len
}

fn emit_pp_number_parts(base: &mut ScannerBase<'_>, begin: u32, text: &[u8]) {
    let mut i = 0usize;
    let mut run_start = 0usize;
    let mut run_category = Category::Number;
    let flush = |base: &mut ScannerBase<'_>, start: usize, end: usize, category: Category| {
        if end > start {
            base.emit(begin + start as u32, (end - start) as u32, category, Coalescing::Normal);
        }
    };
    if text.len() >= 2 && text[0] == b'0' && matches!(text[1], b'x' | b'X') {
        flush(base, 0, 2, Category::NumberDecor);
        i = 2;
        run_start = 2;
    }
    while i < text.len() {
        let b = text[i];
        let category = match b {
            b'\'' => Category::NumberDelim,
            b'e' | b'E' | b'p' | b'P' if matches!(text.get(i + 1), Some(b'+') | Some(b'-')) => {
                Category::NumberDelim
            }
            b'+' | b'-' if i > 0 && matches!(text[i - 1], b'e' | b'E' | b'p' | b'P') => Category::NumberDelim,
            _ if ulight_core::chars::c_cpp::is_identifier_continue(b) && !b.is_ascii_digit() => {
                Category::NumberDecor
            }
            _ => Category::Number,
        };
        if category != run_category {
            flush(base, run_start, i, run_category);
            run_start = i;
            run_category = category;
        }
        i += 1;
    }
    flush(base, run_start, text.len(), run_category);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ulight_core::SourceBuffer;

    fn run(source: &str, dialect: Dialect) -> Vec<ulight_core::HighlightToken> {
        let buf = SourceBuffer::new(source.as_bytes());
        Scanner::new(buf.cursor(), Options { coalescing: true, strict: false }, dialect).run()
    }

    #[test]
    fn keyword_and_identifier() {
        let toks = run("int x;", Dialect::C);
        assert_eq!(toks[0].category, Category::KeywordType);
        assert_eq!(toks[1].category, Category::Name);
    }

    #[test]
    fn hex_integer_with_suffix_splits_into_parts() {
        let toks = run("0xFFu;", Dialect::C);
        let categories: Vec<_> = toks.iter().map(|t| t.category).collect();
        assert_eq!(
            categories,
            vec![
                Category::NumberDecor,
                Category::Number,
                Category::NumberDecor,
                Category::SymPunc,
            ]
        );
    }

    #[test]
    fn raw_string_literal() {
        let toks = run(r#"R"x(hi)x"_s;"#, Dialect::Cpp);
        let categories: Vec<_> = toks.iter().map(|t| t.category).collect();
        assert_eq!(
            categories,
            vec![
                Category::StringDelim,
                Category::String,
                Category::StringDelim,
                Category::StringDecor,
                Category::SymPunc,
            ]
        );
    }

    #[test]
    fn line_comment_has_delimiter_and_text() {
        let toks = run("// hi\n", Dialect::C);
        assert_eq!(toks[0].category, Category::CommentDelim);
        assert_eq!(toks[1].category, Category::Comment);
    }

    #[test]
    fn preprocessing_directive_on_fresh_line() {
        let toks = run("#define X 1\n", Dialect::C);
        assert_eq!(toks[0].category, Category::NameMacro);
    }

    #[test]
    fn preprocessing_directive_absorbs_line_continuation() {
        let toks = run("#define X \\\n1\n", Dialect::C);
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].category, Category::NameMacro);
    }

    #[test]
    fn string_content_after_escape_is_not_reemitted() {
        let toks = run(r#""ab\ncd";"#, Dialect::C);
        let categories: Vec<_> = toks.iter().map(|t| t.category).collect();
        assert_eq!(
            categories,
            vec![
                Category::StringDelim,
                Category::String,
                Category::StringEscape,
                Category::String,
                Category::StringDelim,
                Category::SymPunc,
            ]
        );
        let total: u32 = toks.iter().map(|t| t.length).sum();
        assert_eq!(total, r#""ab\ncd";"#.len() as u32);
    }

    #[test]
    fn progress_guarantee_on_garbage() {
        let toks = run("\u{0}\u{1}", Dialect::C);
        assert!(!toks.is_empty());
    }
}
