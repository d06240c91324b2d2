//! JavaScript / TypeScript / JSX scanner.
//!
//! One scanner covers all three dialects; `Feature` masks which parts of
//! the symbol table and grammar apply. Template literals open a nested
//! brace-balanced substitution scan; JSX tags are scanned permissively
//! since JSX sits outside the lexical grammar proper.

use ulight_core::{chars::js as js_chars, Category, Coalescing};

use crate::keywords::lookup_length_bucketed;
use crate::scanner::{Options, ScannerBase};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Js,
    Ts,
    Jsx,
}

const JS_KEYWORDS: &[(&str, Category)] = &[
    ("break", Category::KeywordControl),
    ("case", Category::KeywordControl),
    ("catch", Category::KeywordControl),
    ("class", Category::Keyword),
    ("const", Category::Keyword),
    ("continue", Category::KeywordControl),
    ("debugger", Category::Keyword),
    ("default", Category::KeywordControl),
    ("delete", Category::Keyword),
    ("do", Category::KeywordControl),
    ("else", Category::KeywordControl),
    ("export", Category::Keyword),
    ("extends", Category::Keyword),
    ("false", Category::Bool),
    ("finally", Category::KeywordControl),
    ("for", Category::KeywordControl),
    ("function", Category::Keyword),
    ("if", Category::KeywordControl),
    ("import", Category::Keyword),
    ("in", Category::KeywordControl),
    ("instanceof", Category::Keyword),
    ("let", Category::Keyword),
    ("new", Category::Keyword),
    ("null", Category::Null),
    ("return", Category::KeywordControl),
    ("super", Category::KeywordThis),
    ("switch", Category::KeywordControl),
    ("this", Category::KeywordThis),
    ("throw", Category::KeywordControl),
    ("true", Category::Bool),
    ("try", Category::KeywordControl),
    ("typeof", Category::Keyword),
    ("undefined", Category::Null),
    ("var", Category::Keyword),
    ("void", Category::Keyword),
    ("while", Category::KeywordControl),
    ("with", Category::Keyword),
    ("yield", Category::KeywordControl),
    ("async", Category::Keyword),
    ("await", Category::KeywordControl),
    ("static", Category::Keyword),
    ("get", Category::Keyword),
    ("set", Category::Keyword),
];

const TS_EXTRA_KEYWORDS: &[(&str, Category)] = &[
    ("interface", Category::Keyword),
    ("type", Category::Keyword),
    ("enum", Category::Keyword),
    ("namespace", Category::Keyword),
    ("declare", Category::Keyword),
    ("implements", Category::Keyword),
    ("private", Category::Keyword),
    ("protected", Category::Keyword),
    ("public", Category::Keyword),
    ("readonly", Category::Keyword),
    ("abstract", Category::Keyword),
    ("as", Category::Keyword),
    ("is", Category::Keyword),
    ("keyof", Category::Keyword),
    ("infer", Category::Keyword),
    ("satisfies", Category::Keyword),
    ("any", Category::NameTypeBuiltin),
    ("unknown", Category::NameTypeBuiltin),
    ("never", Category::NameTypeBuiltin),
    ("string", Category::NameTypeBuiltin),
    ("number", Category::NameTypeBuiltin),
    ("boolean", Category::NameTypeBuiltin),
    ("object", Category::NameTypeBuiltin),
    ("symbol", Category::NameTypeBuiltin),
    ("bigint", Category::NameTypeBuiltin),
];

fn keyword_category(word: &[u8], feature: Feature) -> Option<Category> {
    lookup_length_bucketed(JS_KEYWORDS, word)
        .or_else(|| (feature == Feature::Ts).then(|| lookup_length_bucketed(TS_EXTRA_KEYWORDS, word)).flatten())
}

pub struct Scanner<'a> {
    base: ScannerBase<'a>,
    feature: Feature,
    brace_stack: Vec<BraceContext>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum BraceContext {
    Block,
    TemplateSubstitution,
}

impl<'a> Scanner<'a> {
    #[must_use]
    pub fn new(cursor: ulight_core::Cursor<'a>, options: Options, feature: Feature) -> Self {
        Self {
            base: ScannerBase::new(cursor, options),
            feature,
            brace_stack: Vec::new(),
        }
    }

    pub fn run(mut self) -> Vec<ulight_core::HighlightToken> {
        if self.base.index() == 0 && self.base.remainder().starts_with(b"#!") {
            let n = self.base.cursor_mut().eat_until_newline_or_eof();
            self.base.emit(0, n, Category::Comment, Coalescing::Normal);
        }
        while !self.base.eof() {
            if self.try_whitespace()
                || self.try_line_comment()
                || self.try_block_comment()
                || self.try_template_literal()
                || self.try_string()
                || (self.feature == Feature::Jsx && self.try_jsx_tag())
                || self.try_punctuation()
                || self.try_number()
                || self.try_private_identifier()
                || self.try_identifier_or_keyword()
            {
                continue;
            }
            self.base.emit_error_one_code_point();
        }
        self.base.finish()
    }

    fn try_whitespace(&mut self) -> bool {
        if !matches!(self.base.cursor().current(), b' ' | b'\t' | b'\r' | b'\n' | 0x0C) {
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
        true
    }

    fn try_string(&mut self) -> bool {
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
            let content_end = self.base.index();
            if content_end > flush_start {
                self.base.emit(flush_start, content_end - flush_start, Category::String, Coalescing::Normal);
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

    /// Template literals nest: `${` opens a substitution, tracked on
    /// `brace_stack` so a bare `}` inside the substitution (e.g. from an
    /// object literal) doesn't prematurely close it.
    fn try_template_literal(&mut self) -> bool {
        if self.base.cursor().current() != b'`' {
            return false;
        }
        self.scan_template_from_backtick();
        true
    }

    fn scan_template_from_backtick(&mut self) {
        let begin = self.base.index();
        self.base.emit(begin, 1, Category::StringDelim, Coalescing::Normal);
        self.base.advance(1);
        self.scan_template_body();
    }

    /// Scans template content up to (and consuming) the closing backtick,
    /// or up to (and not consuming) a `${` that opens a substitution.
    fn scan_template_body(&mut self) {
        let mut flush_start = self.base.index();
        loop {
            let found = self.base.cursor_mut().skip_to_template_delim(b'`');
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
                b'{' if self.base.remainder().starts_with(b"${") => {
                    let delim_begin = self.base.index();
                    self.base.emit(delim_begin, 2, Category::StringInterpolationDelim, Coalescing::Normal);
                    self.base.advance(2);
                    self.brace_stack.push(BraceContext::TemplateSubstitution);
                    return;
                }
                b'{' => {
                    self.base.advance(1);
                    flush_start = self.base.index();
                }
                b'`' => {
                    let close = self.base.index();
                    self.base.emit(close, 1, Category::StringDelim, Coalescing::Normal);
                    self.base.advance(1);
                    return;
                }
                _ => return,
            }
        }
    }

    /// JSX tags live on top of the expression grammar: whitespace and
    /// comments may appear anywhere between `<`, `/`, the name, and the
    /// attribute list, so this scans permissively rather than via the
    /// strict XML tag grammar.
    fn try_jsx_tag(&mut self) -> bool {
        let rest = self.base.remainder();
        if rest.first() != Some(&b'<') {
            return false;
        }
        let after_slash = rest.get(1) == Some(&b'/');
        let name_start = if after_slash { 2 } else { 1 };
        let (cp, _) = ulight_core::utf8::decode_and_length_or_replacement(&rest[name_start.min(rest.len())..]);
        let is_fragment = rest.get(name_start) == Some(&b'>');
        if !js_chars::is_identifier_start(cp) && !is_fragment {
            return false;
        }
        let open_len = if after_slash { 2 } else { 1 };
        self.base.emit_and_advance(open_len, Category::SymOp, Coalescing::Normal);
        if !is_fragment {
            let name_begin = self.base.index();
            let name_len = ulight_core::utf8::length_if(self.base.remainder(), js_chars::is_jsx_identifier_continue) as u32;
            self.base.emit(name_begin, name_len, Category::MarkupTag, Coalescing::Normal);
            self.base.advance(name_len);
        }
        loop {
            if self.try_whitespace() || self.try_line_comment() || self.try_block_comment() {
                continue;
            }
            let rest = self.base.remainder();
            if rest.starts_with(b"/>") {
                self.base.emit_and_advance(2, Category::SymOp, Coalescing::Normal);
                return true;
            }
            if rest.first() == Some(&b'>') {
                self.base.emit_and_advance(1, Category::SymOp, Coalescing::Normal);
                return true;
            }
            if self.base.eof() {
                return true;
            }
            let (cp, _) = ulight_core::utf8::decode_and_length_or_replacement(rest);
            if js_chars::is_jsx_identifier_continue(cp) {
                let attr_begin = self.base.index();
                let len = ulight_core::utf8::length_if(rest, js_chars::is_jsx_identifier_continue) as u32;
                self.base.emit(attr_begin, len, Category::MarkupAttr, Coalescing::Normal);
                self.base.advance(len);
                continue;
            }
            if rest.first() == Some(&b'=') {
                self.base.emit_and_advance(1, Category::SymOp, Coalescing::Normal);
                continue;
            }
            if rest.first() == Some(&b'{') {
                self.brace_stack.push(BraceContext::Block);
                self.base.emit_and_advance(1, Category::SymBrace, Coalescing::Normal);
                continue;
            }
            if self.try_string() {
                continue;
            }
            self.base.advance_one_unhighlighted();
        }
    }

    fn try_punctuation(&mut self) -> bool {
        let rest = self.base.remainder();
        let Some(&c) = rest.first() else { return false };
        if c == b'}' {
            if self.brace_stack.last() == Some(&BraceContext::TemplateSubstitution) {
                self.brace_stack.pop();
                let begin = self.base.index();
                self.base.emit(begin, 1, Category::StringInterpolationDelim, Coalescing::Normal);
                self.base.advance(1);
                self.scan_template_body();
                return true;
            }
            self.brace_stack.pop();
            self.base.emit_and_advance(1, Category::SymBrace, Coalescing::Normal);
            return true;
        }
        let (len, category) = match c {
            b'(' | b')' => (1, Category::SymParens),
            b'[' | b']' => (1, Category::SymSquare),
            b'{' => {
                self.brace_stack.push(BraceContext::Block);
                (1, Category::SymBrace)
            }
            b';' | b',' => (1, Category::SymPunc),
            b'?' if rest.starts_with(b"?.") => (2, Category::SymOp),
            b'?' if rest.starts_with(b"??") => (2, Category::SymOp),
            b'=' if rest.starts_with(b"=>") => (2, Category::SymOp),
            b'.' if rest.starts_with(b"...") => (3, Category::SymOp),
            _ if is_op_byte(c) => (op_run_len(rest), Category::SymOp),
            _ => return false,
        };
        self.base.emit_and_advance(len, category, Coalescing::Normal);
        true
    }

    fn try_number(&mut self) -> bool {
        let rest = self.base.remainder();
        if rest.is_empty() || !(rest[0].is_ascii_digit() || (rest[0] == b'.' && rest.get(1).is_some_and(u8::is_ascii_digit))) {
            return false;
        }
        let opts = ulight_core::CommonNumberOptions {
            prefixes: NUMBER_PREFIXES,
            exponent_separators: NUMBER_EXPONENTS,
            suffixes: ulight_core::SuffixMatcher::List(&["n"]),
            default_base: 10,
            default_leading_zero_base: 8,
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

    fn try_private_identifier(&mut self) -> bool {
        let rest = self.base.remainder();
        if rest.first() != Some(&b'#') {
            return false;
        }
        let (cp, _) = ulight_core::utf8::decode_and_length_or_replacement(&rest[1..]);
        if !js_chars::is_identifier_start(cp) {
            return false;
        }
        let name_len = 1 + ulight_core::utf8::length_if(&rest[1..], js_chars::is_identifier_continue) as u32;
        self.base.emit_and_advance(name_len, Category::Id, Coalescing::Normal);
        true
    }

    fn try_identifier_or_keyword(&mut self) -> bool {
        let rest = self.base.remainder();
        let (cp, _) = ulight_core::utf8::decode_and_length_or_replacement(rest);
        let continue_pred = if self.feature == Feature::Jsx { js_chars::is_jsx_identifier_continue } else { js_chars::is_identifier_continue };
        if !js_chars::is_identifier_start(cp) {
            return false;
        }
        let len = ulight_core::utf8::length_if(rest, continue_pred) as u32;
        let word = &rest[..len as usize];
        let category = keyword_category(word, self.feature).unwrap_or(Category::Name);
        self.base.emit_and_advance(len, category, Coalescing::Normal);
        true
    }
}

const NUMBER_PREFIXES: &[ulight_core::StringAndBase] = &[
    ulight_core::StringAndBase { text: "0x", base: 16 },
    ulight_core::StringAndBase { text: "0o", base: 8 },
    ulight_core::StringAndBase { text: "0b", base: 2 },
];

const NUMBER_EXPONENTS: &[ulight_core::StringAndBase] = &[ulight_core::StringAndBase { text: "e", base: 10 }];

fn is_op_byte(b: u8) -> bool {
    matches!(
        b,
        b'+' | b'-' | b'*' | b'/' | b'%' | b'=' | b'<' | b'>' | b'!' | b'&' | b'|' | b'^' | b'~' | b'.' | b':' | b'?'
    )
}

fn op_run_len(rest: &[u8]) -> u32 {
    ulight_core::ascii::length_if(rest, is_op_byte).min(3) as u32
}

fn escape_length(rest: &[u8]) -> u32 {
    debug_assert_eq!(rest.first(), Some(&b'\\'));
    let body = &rest[1..];
    let result = match body.first() {
        Some(b'x') => ulight_core::match_common_escape_with_prefix(body, 1, ulight_core::CommonEscape::Hex2).length as u32,
        Some(b'u') => {
            if body.get(1) == Some(&b'{') {
                ulight_core::match_common_escape_with_prefix(body, 1, ulight_core::CommonEscape::HexBraced).length as u32
            } else {
                ulight_core::match_common_escape_with_prefix(body, 1, ulight_core::CommonEscape::Hex4).length as u32
            }
        }
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

    fn run(source: &str, feature: Feature) -> Vec<ulight_core::HighlightToken> {
        let buf = SourceBuffer::new(source.as_bytes());
        Scanner::new(buf.cursor(), Options { coalescing: true, strict: false }, feature).run()
    }

    #[test]
    fn hashbang_only_recognised_at_start() {
        let toks = run("#!/usr/bin/env node\nlet x;", Feature::Js);
        assert_eq!(toks[0].category, Category::Comment);
    }

    #[test]
    fn template_literal_with_substitution() {
        let toks = run("`a${x}b`", Feature::Js);
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
    fn private_identifier_recognised() {
        let toks = run("this.#field", Feature::Js);
        assert_eq!(toks[0].category, Category::KeywordThis);
        assert!(toks.iter().any(|t| t.category == Category::Id));
    }

    #[test]
    fn typescript_builtin_type_keyword() {
        let toks = run("let x: string;", Feature::Ts);
        assert!(toks.iter().any(|t| t.category == Category::NameTypeBuiltin));
    }

    #[test]
    fn jsx_tag_with_hyphenated_attribute() {
        let toks = run(r#"<div data-id="x" />"#, Feature::Jsx);
        let categories: Vec<_> = toks.iter().map(|t| t.category).collect();
        assert_eq!(
            categories,
            vec![
                Category::SymOp,
                Category::MarkupTag,
                Category::MarkupAttr,
                Category::SymOp,
                Category::StringDelim,
                Category::String,
                Category::StringDelim,
                Category::SymOp,
            ]
        );
    }

    #[test]
    fn nested_braces_inside_template_substitution_balance() {
        let toks = run("`${ { a: 1 } }`", Feature::Js);
        // Inner object-literal braces must not be mistaken for the
        // substitution's closing brace.
        let brace_count = toks.iter().filter(|t| t.category == Category::SymBrace).count();
        assert_eq!(brace_count, 2);
    }
}
