//! HTML scanner: tags, attributes, comments, character references, and
//! raw-text / escapable-raw-text elements (`script`, `style`, `textarea`,
//! `title`).

use ulight_core::{chars::html as html_chars, Category, Coalescing};

use crate::scanner::{Options, ScannerBase};

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];
const ESCAPABLE_RAW_TEXT_ELEMENTS: &[&str] = &["textarea", "title"];

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
        if self.base.remainder().starts_with(&[0xEF, 0xBB, 0xBF]) {
            self.base.advance(3);
        }
        while !self.base.eof() {
            if self.try_comment() || self.try_doctype_or_cdata() || self.try_tag() {
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
        // Reject the degenerate opens `<!-->` and `<!--->`.
        if self.base.remainder().starts_with(b"<!-->") || self.base.remainder().starts_with(b"<!--->") {
            self.base.advance_one_unhighlighted();
            return true;
        }
        let rest = self.base.remainder();
        let Some((content_len, closing_len)) = find_comment_end(&rest[4..]) else {
            self.base.advance_one_unhighlighted();
            return true;
        };
        self.base.emit(begin, 4, Category::CommentDelim, Coalescing::Normal);
        self.base.advance(4);
        let content_begin = self.base.index();
        if content_len > 0 {
            self.base.emit(content_begin, content_len, Category::Comment, Coalescing::Normal);
        }
        self.base.advance(content_len);
        if closing_len > 0 {
            let close = self.base.index();
            self.base.emit(close, closing_len, Category::CommentDelim, Coalescing::Normal);
            self.base.advance(closing_len);
        }
        true
    }

    fn try_doctype_or_cdata(&mut self) -> bool {
        let rest = self.base.remainder();
        if ulight_core::ascii::starts_with_ignore_case(rest, b"<!doctype") {
            let begin = self.base.index();
            let len = ulight_core::ascii::length_before(rest, b'>', 1) as u32 + 1;
            self.base.emit(begin, len.min(rest.len() as u32), Category::MarkupTag, Coalescing::Normal);
            self.base.advance(len.min(rest.len() as u32));
            return true;
        }
        if rest.starts_with(b"<![CDATA[") {
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
            return true;
        }
        false
    }

    fn try_tag(&mut self) -> bool {
        let rest = self.base.remainder();
        if !rest.starts_with(b"<") {
            return false;
        }
        let is_end_tag = rest.get(1) == Some(&b'/');
        let name_start = if is_end_tag { 2 } else { 1 };
        if rest.get(name_start).is_none_or(|&b| !b.is_ascii_alphabetic()) {
            return false;
        }
        let open_len = if is_end_tag { 2 } else { 1 };
        let begin = self.base.index();
        self.base.emit(begin, open_len, Category::SymPunc, Coalescing::Normal);
        self.base.advance(open_len);

        let name_begin = self.base.index();
        let name_len = self
            .base
            .cursor_mut()
            .eat_while(html_chars::is_tag_name_continue);
        let name = self.base.cursor().slice(name_begin, name_begin + name_len);
        let tag_name_lower: Vec<u8> = name.iter().map(u8::to_ascii_lowercase).collect();
        self.base.emit(name_begin, name_len, Category::MarkupTag, Coalescing::Normal);

        if is_end_tag {
            self.skip_to_tag_close();
            return true;
        }

        loop {
            let ws = self.base.cursor_mut().eat_while(html_chars::is_whitespace);
            let _ = ws;
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

        if let Some(&raw) = RAW_TEXT_ELEMENTS.iter().find(|n| n.as_bytes() == tag_name_lower.as_slice()) {
            self.consume_raw_text(raw, false);
        } else if let Some(&raw) = ESCAPABLE_RAW_TEXT_ELEMENTS
            .iter()
            .find(|n| n.as_bytes() == tag_name_lower.as_slice())
        {
            self.consume_raw_text(raw, true);
        }
        true
    }

    fn skip_to_tag_close(&mut self) {
        loop {
            let c = self.base.cursor().current();
            if c == b'>' {
                self.base.emit_and_advance(1, Category::SymPunc, Coalescing::Normal);
                return;
            }
            if self.base.eof() {
                return;
            }
            self.base.advance_one_unhighlighted();
        }
    }

    fn try_attribute(&mut self) -> bool {
        let rest = self.base.remainder();
        if rest.is_empty() || !html_chars::is_attribute_name_continue(rest[0]) {
            return false;
        }
        let name_begin = self.base.index();
        let name_len = self.base.cursor_mut().eat_while(html_chars::is_attribute_name_continue);
        self.base.emit(name_begin, name_len, Category::MarkupAttr, Coalescing::Normal);

        self.base.cursor_mut().eat_while(html_chars::is_whitespace);
        if self.base.cursor().current() != b'=' {
            return true;
        }
        let eq_begin = self.base.index();
        self.base.emit(eq_begin, 1, Category::SymOp, Coalescing::Normal);
        self.base.advance(1);
        self.base.cursor_mut().eat_while(html_chars::is_whitespace);

        let c = self.base.cursor().current();
        if c == b'"' || c == b'\'' {
            self.consume_quoted_value(c);
        } else {
            self.consume_unquoted_value();
        }
        true
    }

    fn consume_quoted_value(&mut self, quote: u8) {
        let begin = self.base.index();
        self.base.emit(begin, 1, Category::String, Coalescing::Normal);
        self.base.advance(1);
        let mut flush_start = self.base.index();
        loop {
            let Some(&b) = self.base.remainder().first() else {
                break;
            };
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

    fn consume_unquoted_value(&mut self) {
        let begin = self.base.index();
        let len = self.base.cursor_mut().eat_while(html_chars::is_unquoted_attribute_value_continue);
        if len > 0 {
            self.base.emit(begin, len, Category::String, Coalescing::Normal);
        }
    }

    fn consume_raw_text(&mut self, name: &str, escapable: bool) {
        loop {
            if self.base.eof() {
                break;
            }
            let rest = self.base.remainder();
            if rest.first() == Some(&b'<')
                && rest.get(1) == Some(&b'/')
                && ulight_core::ascii::starts_with_ignore_case(&rest[2..], name.as_bytes())
                && rest
                    .get(2 + name.len())
                    .is_some_and(|&b| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0C | b'/' | b'>'))
            {
                break;
            }
            if escapable && rest.first() == Some(&b'&') {
                if let Some(len) = match_char_reference(rest) {
                    self.base.emit_and_advance(len, Category::Escape, Coalescing::Normal);
                    continue;
                }
            }
            self.base.advance_one_unhighlighted();
        }
    }
}

fn flush(base: &mut ScannerBase<'_>, start: u32, end: u32, category: Category) {
    if end > start {
        base.emit(start, end - start, category, Coalescing::Normal);
    }
}

/// Matches comment content (everything after the opening `<!--`).
/// `None` means the whole `<!--` fails to open a comment at all: an
/// embedded `<!--` not immediately followed by the degenerate close
/// `<!-->`, or an embedded `--!>`, both abort the match per the HTML
/// comment grammar. `Some((len, terminated))` gives the content length
/// and whether a closing `-->` was found; `terminated == false` means
/// the comment ran to the end of input unclosed (content is still
/// highlighted, just with no closing delimiter to emit).
/// Returns `(content_len, closing_len)`: the content runs for
/// `content_len` bytes, then a closing delimiter of `closing_len` bytes
/// follows (`closing_len == 0` means the comment ran off the end of
/// input unclosed). `None` means the whole `<!--` fails to open a
/// comment at all.
fn find_comment_end(rest: &[u8]) -> Option<(u32, u32)> {
    let mut i = 0usize;
    while i < rest.len() {
        let b = rest[i];
        if b != b'<' && b != b'-' {
            i += 1;
            continue;
        }
        let tail = &rest[i..];
        if tail.starts_with(b"-->") {
            return Some((i as u32, 3));
        }
        if tail.starts_with(b"<!--") {
            return if tail.starts_with(b"<!-->") {
                Some((i as u32, 5))
            } else {
                None
            };
        }
        if tail.starts_with(b"--!>") {
            return None;
        }
        i += 1;
    }
    Some((rest.len() as u32, 0))
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
    fn tag_with_attribute_and_entity() {
        let toks = run(r#"<p class="a">&amp;</p>"#);
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
                Category::Escape,
                Category::SymPunc,
                Category::MarkupTag,
                Category::SymPunc,
            ]
        );
    }

    #[test]
    fn degenerate_comment_open_is_not_a_comment() {
        let toks = run("<!-->x");
        assert!(!toks.iter().any(|t| t.category == Category::CommentDelim));
    }

    #[test]
    fn embedded_double_dash_allowed() {
        let toks = run("<!--<!--> -->");
        assert_eq!(toks[0].category, Category::CommentDelim);
    }

    #[test]
    fn script_raw_text_is_opaque() {
        let toks = run("<script>if (a < b) {}</script>");
        // No keyword/operator tokens from inside the script body; only
        // the tag punctuation/names are emitted.
        assert!(toks.iter().all(|t| matches!(
            t.category,
            Category::SymPunc | Category::MarkupTag
        )));
    }
}
