//! CSS scanner, implementing CSS Syntax Level 3 tokenisation.
//!
//! Tracks a [`Context`] that decides what plain identifiers mean:
//! selector components at `top_level`, at-rule names in `at_prelude`,
//! property names in `block`, values in `value`.
//!
//! Note on `consume_string_token`: the construct this is grounded on has
//! a string-scanning loop that does not advance on an ordinary content
//! byte (neither the quote, a backslash, nor a newline), which is a
//! latent infinite loop. This scanner advances explicitly in that case.

use ulight_core::{chars::css as css_chars, Category, Coalescing};

use crate::scanner::{Options, ScannerBase};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Context {
    TopLevel,
    AtPrelude,
    Block,
    Value,
}

const SELECTOR_CATEGORY: Category = Category::MarkupTag;

pub struct Scanner<'a> {
    base: ScannerBase<'a>,
    context: Context,
    brace_level: u32,
}

impl<'a> Scanner<'a> {
    #[must_use]
    pub fn new(cursor: ulight_core::Cursor<'a>, options: Options) -> Self {
        Self {
            base: ScannerBase::new(cursor, options),
            context: Context::TopLevel,
            brace_level: 0,
        }
    }

    pub fn run(mut self) -> Vec<ulight_core::HighlightToken> {
        while !self.base.eof() {
            self.consume_comments();
            if self.base.eof() {
                break;
            }

            let contextual = match self.context {
                Context::TopLevel => SELECTOR_CATEGORY,
                Context::AtPrelude => Category::Macro,
                Context::Block => Category::MarkupAttr,
                Context::Value => Category::Id,
            };

            let c = self.base.cursor().current();
            match c {
                b' ' | b'\t' | b'\r' | b'\n' | 0x0C => {
                    let n = self.base.cursor_mut().eat_while(css_chars::is_whitespace);
                    debug_assert!(n > 0);
                }
                b'"' | b'\'' => self.consume_string_token(c),
                b'#' => {
                    let rest = self.base.remainder();
                    if rest.len() > 1
                        && (rest[1].is_ascii_alphanumeric()
                            || rest[1] == b'-'
                            || rest[1] == b'_'
                            || starts_with_valid_escape(&rest[1..]))
                    {
                        let t = if self.context == Context::Value { Category::Value } else { contextual };
                        self.base.emit_and_advance(1, t, Coalescing::Normal);
                        self.consume_ident_like_token(t);
                    } else {
                        self.base.advance(1);
                    }
                }
                b'(' | b')' => self.base.emit_and_advance(1, Category::SymParens, Coalescing::Normal),
                b'.' => {
                    if starts_with_number(self.base.remainder()) {
                        self.consume_numeric_token();
                    } else if self.context == Context::TopLevel {
                        self.base.emit_and_advance(1, SELECTOR_CATEGORY, Coalescing::Forced);
                    } else {
                        self.base.advance(1);
                    }
                }
                b'+' | b'-' => {
                    if starts_with_number(self.base.remainder()) {
                        self.consume_numeric_token();
                    } else if c == b'-' {
                        if self.base.remainder().starts_with(b"-->") {
                            self.base.emit_and_advance(3, Category::CommentDelim, Coalescing::Normal);
                        } else if starts_with_ident_sequence(&self.base.remainder()[1..]) {
                            self.consume_ident_like_token(Category::Id);
                        } else {
                            self.base.advance(1);
                        }
                    } else {
                        self.base.emit_and_advance(1, Category::Error, Coalescing::Forced);
                    }
                }
                b',' => self.base.emit_and_advance(1, Category::SymPunc, Coalescing::Normal),
                b':' => {
                    if self.context == Context::TopLevel {
                        self.base.emit_and_advance(1, SELECTOR_CATEGORY, Coalescing::Forced);
                    } else {
                        if self.context == Context::Block {
                            self.context = Context::Value;
                        }
                        self.base.emit_and_advance(1, Category::SymPunc, Coalescing::Normal);
                    }
                }
                b';' => {
                    if self.context == Context::Value {
                        self.context = Context::Block;
                    } else if self.context == Context::AtPrelude {
                        self.context = Context::TopLevel;
                    }
                    self.base.emit_and_advance(1, Category::SymPunc, Coalescing::Normal);
                }
                b'<' => {
                    if self.base.remainder().starts_with(b"<!--") {
                        self.base.emit_and_advance(4, Category::CommentDelim, Coalescing::Normal);
                    } else {
                        self.base.emit_and_advance(1, Category::SymOp, Coalescing::Normal);
                    }
                }
                b'>' | b'~' | b'*' => {
                    if self.context == Context::TopLevel {
                        self.base.emit_and_advance(1, SELECTOR_CATEGORY, Coalescing::Forced);
                    } else {
                        self.base.emit_and_advance(1, Category::SymOp, Coalescing::Normal);
                    }
                }
                b'@' => {
                    self.context = Context::AtPrelude;
                    if starts_with_ident_sequence(&self.base.remainder()[1..]) {
                        self.base.emit_and_advance(1, Category::Macro, Coalescing::Normal);
                        self.consume_ident_like_token(Category::Macro);
                    } else {
                        self.base.emit_and_advance(1, Category::Error, Coalescing::Forced);
                    }
                }
                b'!' => self.consume_important(),
                b'[' | b']' => self.base.emit_and_advance(1, Category::SymSquare, Coalescing::Normal),
                b'\\' => {
                    if starts_with_valid_escape(self.base.remainder()) {
                        self.consume_ident_like_token(contextual);
                    } else {
                        self.base.emit_and_advance(1, Category::Error, Coalescing::Forced);
                    }
                }
                b'{' => {
                    self.brace_level += 1;
                    self.context = Context::Block;
                    self.base.emit_and_advance(1, Category::SymBrace, Coalescing::Normal);
                }
                b'}' => {
                    if self.brace_level != 0 {
                        self.brace_level -= 1;
                    }
                    if self.brace_level == 0 {
                        self.context = Context::TopLevel;
                    }
                    self.base.emit_and_advance(1, Category::SymBrace, Coalescing::Normal);
                }
                b'0'..=b'9' => self.consume_numeric_token(),
                _ => {
                    let (cp, _) = ulight_core::utf8::decode_and_length_or_replacement(self.base.remainder());
                    if css_chars::is_identifier_start(cp) {
                        self.consume_ident_like_token(contextual);
                    } else {
                        self.base.advance_one_unhighlighted();
                    }
                }
            }
        }
        self.base.finish()
    }

    fn consume_comments(&mut self) {
        while self.base.remainder().starts_with(b"/*") {
            let start = self.base.index();
            self.base.advance(2);
            let rest = self.base.remainder();
            let (content_len, terminated) = match find_subslice(rest, b"*/") {
                Some(idx) => (idx, true),
                None => (rest.len() as u32, false),
            };
            self.base.emit(start, 2, Category::CommentDelim, Coalescing::Normal);
            if content_len > 0 {
                self.base.emit(start + 2, content_len, Category::Comment, Coalescing::Normal);
            }
            self.base.advance(content_len);
            if terminated {
                let close = self.base.index();
                self.base.emit(close, 2, Category::CommentDelim, Coalescing::Normal);
                self.base.advance(2);
            }
        }
    }

    fn consume_numeric_token(&mut self) {
        let len = match_number(self.base.remainder());
        debug_assert!(len > 0);
        self.base.emit_and_advance(len, Category::Number, Coalescing::Normal);
        if starts_with_ident_sequence(self.base.remainder()) {
            self.consume_ident_like_token(Category::NumberDecor);
        } else if self.base.remainder().first() == Some(&b'%') {
            self.base.emit_and_advance(1, Category::NumberDecor, Coalescing::Normal);
        }
    }

    fn consume_string_token(&mut self, quote: u8) {
        let begin = self.base.index();
        self.base.advance(1);
        let mut flush_start = begin;
        loop {
            let rest = self.base.remainder();
            let Some(&b) = rest.first() else { break };
            if b == quote {
                flush(&mut self.base, flush_start, self.base.index(), Category::String);
                let close = self.base.index();
                self.base.emit(close, 1, Category::String, Coalescing::Normal);
                self.base.advance(1);
                return;
            }
            if css_chars::is_newline(b) {
                break;
            }
            if b == b'\\' {
                flush(&mut self.base, flush_start, self.base.index(), Category::String);
                let esc_begin = self.base.index();
                let esc_len = match_escaped_code_point(&rest[1..]) + 1;
                self.base.emit(esc_begin, esc_len, Category::Escape, Coalescing::Normal);
                self.base.advance(esc_len);
                flush_start = self.base.index();
                continue;
            }
            // Explicit advance: the grounding source's loop body has no
            // increment on this branch, which never terminates on a
            // string with ordinary content bytes.
            self.base.advance(1);
        }
        flush(&mut self.base, flush_start, self.base.index(), Category::String);
    }

    fn consume_important(&mut self) {
        const IMPORTANT: &[u8] = b"important";
        let rest = self.base.remainder();
        let white_len = ulight_core::ascii::length_if(&rest[1..], css_chars::is_whitespace) as u32;
        let name_start = 1 + white_len;
        let name_len = match_ident_sequence(&rest[name_start as usize..]);
        if name_len > 0
            && ulight_core::ascii::starts_with_ignore_case(
                &rest[name_start as usize..(name_start + name_len) as usize],
                IMPORTANT,
            )
        {
            let begin = self.base.index();
            self.base.emit(begin, 1 + white_len + IMPORTANT.len() as u32, Category::Keyword, Coalescing::Normal);
            self.base.advance(1 + white_len + IMPORTANT.len() as u32);
            return;
        }
        self.base.advance(1);
    }

    fn consume_ident_like_token(&mut self, default_category: Category) {
        let mut flush_start = self.base.index();
        loop {
            let rest = self.base.remainder();
            if starts_with_valid_escape(rest) {
                flush(&mut self.base, flush_start, self.base.index(), default_category);
                let esc_begin = self.base.index();
                let esc_len = match_escaped_code_point(&rest[1..]) + 1;
                self.base.emit(esc_begin, esc_len, Category::Escape, Coalescing::Normal);
                self.base.advance(esc_len);
                flush_start = self.base.index();
                continue;
            }
            let (cp, len) = ulight_core::utf8::decode_and_length_or_replacement(rest);
            if len > 0 && css_chars::is_identifier(cp) {
                self.base.advance(len);
            } else {
                break;
            }
        }
        flush(&mut self.base, flush_start, self.base.index(), default_category);
    }
}

fn flush(base: &mut ScannerBase<'_>, start: u32, end: u32, category: Category) {
    if end > start {
        base.emit(start, end - start, category, Coalescing::Forced);
    }
}

fn starts_with_number(rest: &[u8]) -> bool {
    let rest = if matches!(rest.first(), Some(b'+') | Some(b'-')) { &rest[1..] } else { rest };
    !rest.is_empty() && (rest[0].is_ascii_digit() || (rest.len() > 1 && rest[0] == b'.' && rest[1].is_ascii_digit()))
}

fn starts_with_valid_escape(rest: &[u8]) -> bool {
    rest.len() >= 2 && rest[0] == b'\\' && !css_chars::is_newline(rest[1])
}

fn starts_with_ident_sequence(rest: &[u8]) -> bool {
    if rest.is_empty() {
        return false;
    }
    if rest[0] == b'-' {
        let (cp, len) = ulight_core::utf8::decode_and_length_or_replacement(&rest[1..]);
        return (len > 0 && css_chars::is_identifier_start(cp)) || starts_with_valid_escape(&rest[1..]);
    }
    let (cp, len) = ulight_core::utf8::decode_and_length_or_replacement(rest);
    (len > 0 && css_chars::is_identifier_start(cp)) || starts_with_valid_escape(rest)
}

fn match_number(rest: &[u8]) -> u32 {
    let mut len = 0u32;
    let consume_digits = |rest: &[u8], len: &mut u32| {
        while (*len as usize) < rest.len() && rest[*len as usize].is_ascii_digit() {
            *len += 1;
        }
    };
    if matches!(rest.first(), Some(b'+') | Some(b'-')) {
        len += 1;
    }
    consume_digits(rest, &mut len);
    if (len as usize) + 1 < rest.len() && rest[len as usize] == b'.' && rest[len as usize + 1].is_ascii_digit() {
        len += 2;
        consume_digits(rest, &mut len);
    }
    if (len as usize) + 1 < rest.len() && matches!(rest[len as usize], b'e' | b'E') {
        let after = len as usize + 1;
        if matches!(rest.get(after), Some(b'+') | Some(b'-')) && after + 1 < rest.len() && rest[after + 1].is_ascii_digit() {
            len += 3;
        } else if rest.get(after).is_some_and(u8::is_ascii_digit) {
            len += 2;
        } else {
            return len.max(1);
        }
        consume_digits(rest, &mut len);
    }
    len.max(1)
}

fn match_escaped_code_point(rest: &[u8]) -> u32 {
    if rest.is_empty() {
        return 0;
    }
    let mut len = 0u32;
    while (len as usize) < rest.len() && (len as usize) < 6 && rest[len as usize].is_ascii_hexdigit() {
        len += 1;
    }
    if len != 0 {
        if (len as usize) < rest.len() && css_chars::is_whitespace(rest[len as usize]) {
            len += 1;
        }
        return len;
    }
    ulight_core::utf8::sequence_length(rest[0]).max(1)
}

fn match_ident_sequence(rest: &[u8]) -> u32 {
    let mut len = 0u32;
    while (len as usize) < rest.len() {
        let tail = &rest[len as usize..];
        if starts_with_valid_escape(tail) {
            len += 1;
            len += match_escaped_code_point(&tail[1..]);
        } else {
            let (cp, cplen) = ulight_core::utf8::decode_and_length_or_replacement(tail);
            if cplen > 0 && css_chars::is_identifier(cp) {
                len += cplen;
            } else {
                break;
            }
        }
    }
    len
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
    fn simple_rule_set() {
        let toks = run("a { color: red; }");
        let categories: Vec<_> = toks.iter().map(|t| t.category).collect();
        assert_eq!(
            categories,
            vec![
                Category::MarkupTag,
                Category::SymBrace,
                Category::MarkupAttr,
                Category::SymPunc,
                Category::Id,
                Category::SymPunc,
                Category::SymBrace,
            ]
        );
    }

    #[test]
    fn string_with_interior_text_terminates() {
        let toks = run(r#"a { content: "hello world"; }"#);
        assert!(toks.iter().any(|t| t.category == Category::String));
    }

    #[test]
    fn important_is_keyword() {
        let toks = run("a { color: red !important; }");
        assert!(toks.iter().any(|t| t.category == Category::Keyword));
    }

    #[test]
    fn unterminated_comment_does_not_hang() {
        let toks = run("/* never closes");
        assert!(!toks.is_empty());
    }
}
