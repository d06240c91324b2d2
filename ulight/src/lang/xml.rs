//! XML scanner. Separate from HTML: comments may not contain `--` at all
//! (not even the one exception HTML allows), and name grammar allows `:`
//! (namespace separator) but no element-specific raw-text handling.

use ulight_core::{chars::xml as xml_chars, Category, Coalescing};

use crate::scanner::{Options, ScannerBase};

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
            if self.try_comment() || self.try_pi_or_doctype() || self.try_cdata() || self.try_tag() {
                continue;
            }
            if self.base.cursor().current() == b'&' {
                if let Some(len) = match_char_reference(self.base.remainder()) {
                    self.base.emit_and_advance(len, Category::Escape, Coalescing::Normal);
                    continue;
                }
            }
            self.base.advance_one_unhighlighted();
        }
        self.base.finish()
    }

    fn try_comment(&mut self) -> bool {
        if !self.base.remainder().starts_with(b"<!--") {
            return false;
        }
        let begin = self.base.index();
        self.base.emit(begin, 4, Category::CommentDelim, Coalescing::Normal);
        self.base.advance(4);
        let content_begin = self.base.index();
        let rest = self.base.remainder();
        // XML comments must not contain `--` anywhere, including the
        // closing sequence's own leading bytes.
        let (content_len, terminated) = match find_subslice(rest, b"-->") {
            Some(idx) => (idx, true),
            None => (rest.len() as u32, false),
        };
        if content_len > 0 {
            self.base.emit(content_begin, content_len, Category::Comment, Coalescing::Normal);
        }
        self.base.advance(content_len);
        if terminated {
            let close = self.base.index();
            self.base.emit(close, 3, Category::CommentDelim, Coalescing::Normal);
            self.base.advance(3);
        }
        true
    }

    fn try_pi_or_doctype(&mut self) -> bool {
        let rest = self.base.remainder();
        if rest.starts_with(b"<?") {
            let begin = self.base.index();
            let len = find_subslice(rest, b"?>").map_or(rest.len() as u32, |i| i + 2);
            self.base.emit(begin, len, Category::MarkupTag, Coalescing::Normal);
            self.base.advance(len);
            return true;
        }
        if rest.starts_with(b"<!DOCTYPE") || rest.starts_with(b"<!doctype") {
            let begin = self.base.index();
            let len = ulight_core::ascii::length_before(rest, b'>', 1) as u32 + 1;
            self.base.emit(begin, len.min(rest.len() as u32), Category::MarkupTag, Coalescing::Normal);
            self.base.advance(len.min(rest.len() as u32));
            return true;
        }
        false
    }

    fn try_cdata(&mut self) -> bool {
        let rest = self.base.remainder();
        if !rest.starts_with(b"<![CDATA[") {
            return false;
        }
        let begin = self.base.index();
        self.base.emit(begin, 9, Category::CommentDelim, Coalescing::Normal);
        self.base.advance(9);
        let content_begin = self.base.index();
        let r = self.base.remainder();
        let (len, terminated) = match find_subslice(r, b"]]>") {
            Some(idx) => (idx, true),
            None => (r.len() as u32, false),
        };
        if len > 0 {
            self.base.emit(content_begin, len, Category::String, Coalescing::Normal);
        }
        self.base.advance(len);
        if terminated {
            let close = self.base.index();
            self.base.emit(close, 3, Category::CommentDelim, Coalescing::Normal);
            self.base.advance(3);
        }
        true
    }

    fn try_tag(&mut self) -> bool {
        let rest = self.base.remainder();
        if !rest.starts_with(b"<") {
            return false;
        }
        let is_end_tag = rest.get(1) == Some(&b'/');
        let name_start = if is_end_tag { 2 } else { 1 };
        let name_ok = rest.get(name_start).map_or(false, |&b| xml_chars::is_name_start(b));
        if !name_ok {
            return false;
        }
        let open_len = if is_end_tag { 2 } else { 1 };
        self.base.emit_and_advance(open_len, Category::SymPunc, Coalescing::Normal);

        let name_begin = self.base.index();
        let name_len = self.base.cursor_mut().eat_while(xml_chars::is_name_continue);
        self.base.emit(name_begin, name_len, Category::MarkupTag, Coalescing::Normal);

        loop {
            self.base.cursor_mut().eat_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'));
            let c = self.base.cursor().current();
            if c == b'>' {
                self.base.emit_and_advance(1, Category::SymPunc, Coalescing::Normal);
                break;
            }
            if c == b'/' && self.base.cursor().peek() == b'>' {
                self.base.emit_and_advance(2, Category::SymPunc, Coalescing::Normal);
                break;
            }
            if self.base.eof() {
                break;
            }
            if !self.try_attribute() {
                self.base.advance_one_unhighlighted();
            }
        }
        true
    }

    fn try_attribute(&mut self) -> bool {
        let rest = self.base.remainder();
        if rest.is_empty() || !xml_chars::is_name_start(rest[0]) {
            return false;
        }
        let name_begin = self.base.index();
        let name_len = self.base.cursor_mut().eat_while(xml_chars::is_name_continue);
        self.base.emit(name_begin, name_len, Category::MarkupAttr, Coalescing::Normal);
        self.base.cursor_mut().eat_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'));
        if self.base.cursor().current() != b'=' {
            return true;
        }
        self.base.emit_and_advance(1, Category::SymOp, Coalescing::Normal);
        self.base.cursor_mut().eat_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'));
        let quote = self.base.cursor().current();
        if quote == b'"' || quote == b'\'' {
            self.consume_quoted_value(quote);
        }
        true
    }

    fn consume_quoted_value(&mut self, quote: u8) {
        let begin = self.base.index();
        self.base.emit(begin, 1, Category::String, Coalescing::Normal);
        self.base.advance(1);
        let mut flush_start = self.base.index();
        loop {
            let Some(&b) = self.base.remainder().first() else { break };
            if b == quote {
                flush(&mut self.base, flush_start, self.base.index(), Category::String);
                self.base.emit_and_advance(1, Category::String, Coalescing::Normal);
                return;
            }
            if b == b'&' {
                if let Some(len) = match_char_reference(self.base.remainder()) {
                    flush(&mut self.base, flush_start, self.base.index(), Category::String);
                    self.base.emit_and_advance(len, Category::Escape, Coalescing::Normal);
                    flush_start = self.base.index();
                    continue;
                }
            }
            self.base.advance(1);
        }
        flush(&mut self.base, flush_start, self.base.index(), Category::String);
    }
}

fn flush(base: &mut ScannerBase<'_>, start: u32, end: u32, category: Category) {
    if end > start {
        base.emit(start, end - start, category, Coalescing::Normal);
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<u32> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle).map(|i| i as u32)
}

fn match_char_reference(rest: &[u8]) -> Option<u32> {
    debug_assert_eq!(rest.first(), Some(&b'&'));
    let body = &rest[1..];
    let digits_len = if body.first() == Some(&b'#') {
        let hex = matches!(body.get(1), Some(b'x') | Some(b'X'));
        let start = if hex { 2 } else { 1 };
        let n = ulight_core::ascii::length_if(&body[start..], |b| {
            if hex { b.is_ascii_hexdigit() } else { b.is_ascii_digit() }
        });
        if n == 0 { 0 } else { start + n }
    } else {
        ulight_core::ascii::length_if(body, u8::is_ascii_alphanumeric)
    };
    if digits_len == 0 {
        return None;
    }
    if body.get(digits_len) == Some(&b';') {
        Some(1 + digits_len as u32 + 1)
    } else {
        None
    }
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
    fn namespaced_tag_name() {
        let toks = run("<ns:tag/>");
        assert_eq!(toks[1].category, Category::MarkupTag);
    }

    #[test]
    fn comment_does_not_allow_embedded_double_dash() {
        let toks = run("<!-- a -- b -->");
        // First `--` terminates; trailing ` b -->` falls to fallback bytes.
        assert_eq!(toks[0].category, Category::CommentDelim);
        assert!(toks.iter().any(|t| t.category == Category::Comment));
    }

    #[test]
    fn self_closing_tag_with_attribute() {
        let toks = run(r#"<a href="x"/>"#);
        let categories: Vec<_> = toks.iter().map(|t| t.category).collect();
        assert_eq!(
            categories,
            vec![
                Category::SymPunc,
                Category::MarkupTag,
                Category::MarkupAttr,
                Category::SymOp,
                Category::String,
                Category::SymPunc,
            ]
        );
    }
}
