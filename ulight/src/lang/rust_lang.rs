//! Rust scanner.
//!
//! Lifetimes and character literals share a leading `'`, so the scanner
//! first attempts a char/byte literal (pessimistic: requires a closing
//! quote) before falling back to a lifetime/label token.

use ulight_core::{chars::rust_lang as rust_chars, Category, Coalescing, CommonEscape};

use crate::keywords::lookup_length_bucketed;
use crate::scanner::{Options, ScannerBase};

const KEYWORDS: &[(&str, Category)] = &[
    ("as", Category::Keyword),
    ("break", Category::KeywordControl),
    ("const", Category::Keyword),
    ("continue", Category::KeywordControl),
    ("crate", Category::Keyword),
    ("dyn", Category::Keyword),
    ("else", Category::KeywordControl),
    ("enum", Category::Keyword),
    ("extern", Category::Keyword),
    ("false", Category::Bool),
    ("fn", Category::Keyword),
    ("for", Category::KeywordControl),
    ("if", Category::KeywordControl),
    ("impl", Category::Keyword),
    ("in", Category::KeywordControl),
    ("let", Category::Keyword),
    ("loop", Category::KeywordControl),
    ("match", Category::KeywordControl),
    ("mod", Category::Keyword),
    ("move", Category::Keyword),
    ("mut", Category::Keyword),
    ("pub", Category::Keyword),
    ("ref", Category::Keyword),
    ("return", Category::KeywordControl),
    ("self", Category::KeywordThis),
    ("Self", Category::KeywordThis),
    ("static", Category::Keyword),
    ("struct", Category::Keyword),
    ("super", Category::Keyword),
    ("trait", Category::Keyword),
    ("true", Category::Bool),
    ("type", Category::Keyword),
    ("unsafe", Category::Keyword),
    ("use", Category::Keyword),
    ("where", Category::Keyword),
    ("while", Category::KeywordControl),
    ("async", Category::Keyword),
    ("await", Category::KeywordControl),
    ("union", Category::Keyword),
];

const BUILTIN_TYPES: &[(&str, Category)] = &[
    ("i8", Category::NameTypeBuiltin),
    ("i16", Category::NameTypeBuiltin),
    ("i32", Category::NameTypeBuiltin),
    ("i64", Category::NameTypeBuiltin),
    ("i128", Category::NameTypeBuiltin),
    ("isize", Category::NameTypeBuiltin),
    ("u8", Category::NameTypeBuiltin),
    ("u16", Category::NameTypeBuiltin),
    ("u32", Category::NameTypeBuiltin),
    ("u64", Category::NameTypeBuiltin),
    ("u128", Category::NameTypeBuiltin),
    ("usize", Category::NameTypeBuiltin),
    ("f32", Category::NameTypeBuiltin),
    ("f64", Category::NameTypeBuiltin),
    ("bool", Category::NameTypeBuiltin),
    ("char", Category::NameTypeBuiltin),
    ("str", Category::NameTypeBuiltin),
];

/// Raw identifiers that name keywords the grammar forbids even as `r#...`.
const ILLEGAL_RAW_IDENTS: &[&str] = &["crate", "self", "super", "Self", "_"];

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
                || self.try_line_comment()
                || self.try_block_comment()
                || self.try_char_or_lifetime()
                || self.try_string()
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
        let mut depth = 0u32;
        let start = self.base.index();
        self.base.advance(2);
        depth += 1;
        let text_begin = self.base.index();
        while depth > 0 && !self.base.eof() {
            let rest = self.base.remainder();
            if rest.starts_with(b"/*") {
                self.base.advance(2);
                depth += 1;
            } else if rest.starts_with(b"*/") {
                self.base.advance(2);
                depth -= 1;
            } else {
                self.base.cursor_mut().advance_char();
            }
        }
        let end = self.base.index();
        self.base.emit(start, 2, Category::CommentDelim, Coalescing::Normal);
        if end > text_begin + 2 {
            self.base.emit(text_begin, end - text_begin - 2, Category::Comment, Coalescing::Normal);
        }
        true
    }

    /// Tries a char/byte literal first (pessimistic, requires a closing
    /// quote); on failure, backtracks and tries a lifetime or label.
    fn try_char_or_lifetime(&mut self) -> bool {
        let rest = self.base.remainder();
        let (prefix_len, is_byte) = match rest.first() {
            Some(b'\'') => (0, false),
            Some(b'b') if rest.get(1) == Some(&b'\'') => (1, true),
            _ => return false,
        };
        if prefix_len + 1 >= rest.len() as u32 {
            return false;
        }
        if let Some(len) = match_char_literal(&rest[prefix_len as usize..]) {
            let begin = self.base.index();
            if prefix_len > 0 {
                self.base.emit(begin, prefix_len, Category::StringDecor, Coalescing::Normal);
            }
            self.emit_char_literal(begin + prefix_len, &rest[prefix_len as usize..(prefix_len + len) as usize]);
            self.base.advance(prefix_len + len);
            return true;
        }
        if prefix_len > 0 {
            return false;
        }
        self.try_lifetime_or_label()
    }

    fn emit_char_literal(&mut self, begin: u32, text: &[u8]) {
        self.base.emit(begin, 1, Category::StringDelim, Coalescing::Normal);
        let body = &text[1..text.len() - 1];
        if !body.is_empty() {
            if body[0] == b'\\' {
                let esc = escape_length(body);
                self.base.emit(begin + 1, esc, Category::StringEscape, Coalescing::Normal);
            } else {
                let width = ulight_core::cursor::Cursor::utf8_char_width(body[0]).min(body.len() as u32);
                self.base.emit(begin + 1, width, Category::String, Coalescing::Normal);
            }
        }
        self.base.emit(begin + text.len() as u32 - 1, 1, Category::StringDelim, Coalescing::Normal);
    }

    fn try_lifetime_or_label(&mut self) -> bool {
        let rest = self.base.remainder();
        debug_assert_eq!(rest.first(), Some(&b'\''));
        let is_raw = rest.starts_with(b"'r#");
        let name_start = if is_raw { 3 } else { 1 };
        let Some(&first) = rest.get(name_start) else { return false };
        if !first.is_ascii_alphabetic() && first != b'_' {
            return false;
        }
        let name_len = rest[name_start as usize..]
            .iter()
            .take_while(|&&b| b.is_ascii_alphanumeric() || b == b'_')
            .count() as u32;
        if name_len == 0 {
            return false;
        }
        let begin = self.base.index();
        self.base.emit(begin, 1, Category::NameLifetimeDelim, Coalescing::Normal);
        let name_begin = begin + 1;
        let total_name_len = name_start - 1 + name_len;
        let is_label = rest.get((name_start + name_len) as usize) == Some(&b':')
            && rest.get((name_start + name_len + 1) as usize) != Some(&b':');
        let category = if is_label { Category::NameLabel } else { Category::NameLifetime };
        self.base.emit(name_begin, total_name_len, category, Coalescing::Normal);
        self.base.advance(1 + total_name_len);
        if is_label {
            self.base.emit_and_advance(1, Category::NameLabelDelim, Coalescing::Normal);
        }
        true
    }

    fn try_string(&mut self) -> bool {
        let rest = self.base.remainder();
        let Some((prefix_len, hashes, quote_byte)) = classify_string_prefix(rest) else {
            return false;
        };
        if let Some(hash_count) = hashes {
            // Raw strings fold the `b`/`c` prefix, `r`, hashes and opening
            // quote into a single delimiter token, mirroring how a raw
            // C++ string's whole `prefix R"delim(` opener is one token.
            self.scan_raw_string(prefix_len, hash_count);
        } else {
            let begin = self.base.index();
            if prefix_len > 0 {
                self.base.emit(begin, prefix_len, Category::StringDecor, Coalescing::Normal);
            }
            self.scan_quoted_string(begin + prefix_len, quote_byte);
        }
        true
    }

    fn scan_quoted_string(&mut self, begin: u32, quote: u8) {
        self.base.advance(begin - self.base.index());
        self.base.emit(begin, 1, Category::StringDelim, Coalescing::Normal);
        self.base.advance(1);
        let mut flush_start = begin + 1;
        loop {
            let found = self.base.cursor_mut().skip_to_string_delim(quote);
            let content_end = self.base.index();
            if content_end > flush_start {
                self.base.emit(flush_start, content_end - flush_start, Category::String, Coalescing::Normal);
            }
            match found {
                0 => return,
                b'\\' => {
                    let esc_begin = self.base.index();
                    let esc = escape_length(self.base.remainder());
                    self.base.emit(esc_begin, esc, Category::StringEscape, Coalescing::Normal);
                    self.base.advance(esc);
                    flush_start = self.base.index();
                }
                q if q == quote => {
                    let close = self.base.index();
                    self.base.emit(close, 1, Category::StringDelim, Coalescing::Normal);
                    self.base.advance(1);
                    return;
                }
                _ => return,
            }
        }
    }

    /// `string_prefix_len` covers an optional leading `b`/`c` before the
    /// `r` of the raw marker.
    fn scan_raw_string(&mut self, string_prefix_len: u32, hash_count: u32) {
        let begin = self.base.index();
        let open_len = string_prefix_len + 1 + hash_count + 1; // prefix + r + hashes + quote
        self.base.emit(begin, open_len, Category::StringDelim, Coalescing::Normal);
        self.base.advance(open_len);
        let mut closer = Vec::with_capacity(1 + hash_count as usize);
        closer.push(b'"');
        closer.extend(std::iter::repeat(b'#').take(hash_count as usize));
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
        }
    }

    fn try_number(&mut self) -> bool {
        let rest = self.base.remainder();
        let Some(&first) = rest.first() else { return false };
        if !first.is_ascii_digit() {
            return false;
        }
        let r = ulight_core::match_common_number(rest, &number_options());
        if r.length == 0 {
            return false;
        }
        emit_number_parts(&mut self.base, &r);
        true
    }

    fn try_identifier_or_keyword(&mut self) -> bool {
        let rest = self.base.remainder();
        if rest.starts_with(b"r#") {
            let name_start = 2;
            let name_len = rest[name_start..]
                .iter()
                .take_while(|&&b| rust_chars::is_identifier_continue(b as char))
                .count() as u32;
            if name_len == 0 {
                return false;
            }
            let name = &rest[name_start..(name_start as u32 + name_len) as usize];
            let begin = self.base.index();
            let total = name_start as u32 + name_len;
            let category = if ILLEGAL_RAW_IDENTS.iter().any(|s| s.as_bytes() == name) {
                Category::Error
            } else {
                Category::Name
            };
            self.base.emit_and_advance(total, category, Coalescing::Normal);
            return true;
        }
        if rest.is_empty() || !rust_chars::is_identifier_start(decode_first_char(rest)) {
            return false;
        }
        let len = identifier_len(rest);
        let word = &rest[..len as usize];
        if rest.get(len as usize) == Some(&b'!') {
            let begin = self.base.index();
            self.base.emit(begin, len, Category::NameMacro, Coalescing::Normal);
            self.base.advance(len);
            self.base.emit_and_advance(1, Category::NameMacroDelim, Coalescing::Normal);
            return true;
        }
        let category = lookup_length_bucketed(KEYWORDS, word)
            .or_else(|| lookup_length_bucketed(BUILTIN_TYPES, word))
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
            b':' if rest.starts_with(b"::") => (2, Category::SymPunc),
            b':' => (1, Category::SymPunc),
            b'-' if rest.starts_with(b"->") => (2, Category::SymOp),
            b'=' if rest.starts_with(b"=>") => (2, Category::SymOp),
            b'.' if rest.starts_with(b"..=") => (3, Category::SymOp),
            b'.' if rest.starts_with(b"..") => (2, Category::SymOp),
            _ if is_op_byte(c) => (1, Category::SymOp),
            _ => return false,
        };
        self.base.emit_and_advance(len, category, Coalescing::Normal);
        true
    }
}

fn is_op_byte(b: u8) -> bool {
    matches!(
        b,
        b'+' | b'-' | b'*' | b'/' | b'%' | b'=' | b'<' | b'>' | b'!' | b'&' | b'|' | b'^' | b'~' | b'.' | b'?' | b'@'
    )
}

fn decode_first_char(rest: &[u8]) -> char {
    ulight_core::utf8::decode_and_length_or_replacement(rest).0
}

fn identifier_len(rest: &[u8]) -> u32 {
    ulight_core::utf8::length_if(rest, rust_chars::is_identifier_continue) as u32
}

/// `'` followed by (escape | one code point) followed by `'`. `None` if no
/// closing quote is found within a short bound (pessimistic match).
fn match_char_literal(rest: &[u8]) -> Option<u32> {
    debug_assert_eq!(rest.first(), Some(&b'\''));
    let body = &rest[1..];
    if body.first() == Some(&b'\\') {
        let esc = escape_length(body);
        if body.get(esc as usize) == Some(&b'\'') {
            return Some(1 + esc + 1);
        }
        return None;
    }
    let &first = body.first()?;
    let width = ulight_core::cursor::Cursor::utf8_char_width(first).min(body.len() as u32);
    if body.get(width as usize) == Some(&b'\'') {
        Some(1 + width + 1)
    } else {
        None
    }
}

fn escape_length(rest: &[u8]) -> u32 {
    debug_assert_eq!(rest.first(), Some(&b'\\'));
    let body = &rest[1..];
    let result = match body.first() {
        Some(b'x') => ulight_core::match_common_escape_with_prefix(body, 1, CommonEscape::Hex2).length as u32,
        Some(b'u') => ulight_core::match_common_escape_with_prefix(body, 1, CommonEscape::HexBraced).length as u32,
        Some(_) => 1,
        None => 0,
    };
    1 + result
}

/// Classifies a string literal's leading `b`/`c` prefix and, if raw, its
/// hash count. Returns `(prefix_len, raw_hash_count, quote_byte)`.
fn classify_string_prefix(rest: &[u8]) -> Option<(u32, Option<u32>, u8)> {
    let prefix_len: u32 = match rest.first() {
        Some(b'b' | b'c') => 1,
        _ => 0,
    };
    let after = &rest[prefix_len as usize..];
    if after.first() == Some(&b'"') {
        return Some((prefix_len, None, b'"'));
    }
    if after.first() == Some(&b'r') {
        let hashes = ulight_core::ascii::length_if(&after[1..], |b| b == b'#') as u32;
        if after.get(1 + hashes as usize) == Some(&b'"') {
            return Some((prefix_len, Some(hashes), b'"'));
        }
    }
    None
}

const NUMBER_PREFIXES: &[ulight_core::StringAndBase] = &[
    ulight_core::StringAndBase { text: "0x", base: 16 },
    ulight_core::StringAndBase { text: "0o", base: 8 },
    ulight_core::StringAndBase { text: "0b", base: 2 },
];

const NUMBER_EXPONENTS: &[ulight_core::StringAndBase] = &[
    ulight_core::StringAndBase { text: "e", base: 10 },
    ulight_core::StringAndBase { text: "E", base: 10 },
];

const NUMBER_SUFFIXES: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize", "f32", "f64",
];

fn number_options() -> ulight_core::CommonNumberOptions {
    ulight_core::CommonNumberOptions {
        prefixes: NUMBER_PREFIXES,
        exponent_separators: NUMBER_EXPONENTS,
        suffixes: ulight_core::SuffixMatcher::List(NUMBER_SUFFIXES),
        default_base: 10,
        default_leading_zero_base: 10,
        digit_separator: Some(b'_'),
        nonempty_integer: true,
        nonempty_fraction: false,
    }
}

fn emit_number_parts(base: &mut ScannerBase<'_>, r: &ulight_core::CommonNumberResult) {
    let mut offset = 0u32;
    let begin = base.index();
    let mut emit_part = |len: usize, category: Category| {
        let len = len as u32;
        if len > 0 {
            base.emit(begin + offset, len, category, Coalescing::Normal);
            offset += len;
        }
    };
    emit_part(r.prefix, Category::NumberDecor);
    emit_part(r.integer, Category::Number);
    emit_part(r.radix_point, Category::NumberDelim);
    emit_part(r.fractional, Category::Number);
    emit_part(r.exponent_sep, Category::NumberDelim);
    emit_part(r.exponent_digits, Category::Number);
    emit_part(r.suffix, Category::NumberDecor);
    base.advance(r.length as u32);
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
    fn let_binding_with_lifetime_reference() {
        let toks = run("let s: &'a str;");
        let categories: Vec<_> = toks.iter().map(|t| t.category).collect();
        assert_eq!(
            categories,
            vec![
                Category::Keyword,
                Category::Name,
                Category::SymPunc,
                Category::SymOp,
                Category::NameLifetimeDelim,
                Category::NameLifetime,
                Category::NameTypeBuiltin,
                Category::SymPunc,
            ]
        );
    }

    #[test]
    fn char_literal_not_confused_with_lifetime() {
        let toks = run("'a'");
        assert_eq!(toks[0].category, Category::StringDelim);
        assert_eq!(toks[1].category, Category::String);
        assert_eq!(toks[2].category, Category::StringDelim);
    }

    #[test]
    fn loop_label_uses_label_categories() {
        let toks = run("'outer: loop {}");
        assert_eq!(toks[0].category, Category::NameLifetimeDelim);
        assert_eq!(toks[1].category, Category::NameLabel);
        assert_eq!(toks[2].category, Category::NameLabelDelim);
    }

    #[test]
    fn macro_invocation_splits_name_and_delim() {
        let toks = run("println!(x);");
        assert_eq!(toks[0].category, Category::NameMacro);
        assert_eq!(toks[1].category, Category::NameMacroDelim);
    }

    #[test]
    fn raw_string_with_hashes() {
        let toks = run(r###"r#"hi"#"###);
        let categories: Vec<_> = toks.iter().map(|t| t.category).collect();
        assert_eq!(categories, vec![Category::StringDelim, Category::String, Category::StringDelim]);
    }

    #[test]
    fn illegal_raw_identifier_is_error() {
        let toks = run("r#crate");
        assert_eq!(toks[0].category, Category::Error);
    }
}
