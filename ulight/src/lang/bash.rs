//! Bash scanner. Variable expansion (`$name`, `${...}`, `$(...)`, and
//! backtick command substitution) is recognised inside double-quoted
//! strings as well as in bare code, since both contexts expand it.

use ulight_core::{chars::bash as bash_chars, Category, Coalescing};

use crate::keywords::lookup_length_bucketed;
use crate::scanner::{Options, ScannerBase};

const KEYWORDS: &[(&str, Category)] = &[
    ("if", Category::KeywordControl),
    ("then", Category::KeywordControl),
    ("elif", Category::KeywordControl),
    ("else", Category::KeywordControl),
    ("fi", Category::KeywordControl),
    ("for", Category::KeywordControl),
    ("while", Category::KeywordControl),
    ("until", Category::KeywordControl),
    ("do", Category::KeywordControl),
    ("done", Category::KeywordControl),
    ("case", Category::KeywordControl),
    ("esac", Category::KeywordControl),
    ("function", Category::Keyword),
    ("in", Category::KeywordControl),
    ("select", Category::KeywordControl),
    ("time", Category::Keyword),
    ("local", Category::Keyword),
    ("export", Category::Keyword),
    ("readonly", Category::Keyword),
    ("return", Category::KeywordControl),
    ("break", Category::KeywordControl),
    ("continue", Category::KeywordControl),
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
                || self.try_comment()
                || self.try_single_quoted_string()
                || self.try_double_quoted_string()
                || self.try_variable_expansion()
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

    fn try_single_quoted_string(&mut self) -> bool {
        if self.base.cursor().current() != b'\'' {
            return false;
        }
        // Single-quoted strings have no escapes at all; the only
        // terminator is the next `'`.
        let begin = self.base.index();
        self.base.emit(begin, 1, Category::StringDelim, Coalescing::Normal);
        self.base.advance(1);
        let content_begin = self.base.index();
        let rest = self.base.remainder();
        let len = ulight_core::ascii::length_if(rest, |b| b != b'\'') as u32;
        if len > 0 {
            self.base.emit(content_begin, len, Category::String, Coalescing::Normal);
        }
        self.base.advance(len);
        if self.base.cursor().current() == b'\'' {
            self.base.emit_and_advance(1, Category::StringDelim, Coalescing::Normal);
        }
        true
    }

    fn try_double_quoted_string(&mut self) -> bool {
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
                flush(&mut self.base, flush_start, Category::String);
                return true;
            };
            match b {
                b'"' => {
                    flush(&mut self.base, flush_start, Category::String);
                    self.base.emit_and_advance(1, Category::StringDelim, Coalescing::Normal);
                    return true;
                }
                b'\\' => {
                    flush(&mut self.base, flush_start, Category::String);
                    let len = if matches!(rest.get(1), Some(b'$') | Some(b'`') | Some(b'"') | Some(b'\\') | Some(b'\n')) { 2 } else { 1 };
                    let begin = self.base.index();
                    self.base.emit(begin, len, Category::StringEscape, Coalescing::Normal);
                    self.base.advance(len);
                    flush_start = self.base.index();
                }
                b'$' | b'`' if self.try_variable_expansion() => {
                    flush_start = self.base.index();
                }
                _ => self.base.advance(1),
            }
        }
    }

    /// `$name`, `${...}`, `$(...)`, and backtick command substitution.
    /// All four are recognised both in bare code and inside double
    /// quotes.
    fn try_variable_expansion(&mut self) -> bool {
        let rest = self.base.remainder();
        match rest.first() {
            Some(b'$') if rest.get(1) == Some(&b'{') => {
                let begin = self.base.index();
                self.base.emit(begin, 2, Category::StringInterpolationDelim, Coalescing::Normal);
                self.base.advance(2);
                self.scan_balanced(b'{', b'}');
                true
            }
            Some(b'$') if rest.get(1) == Some(&b'(') => {
                let begin = self.base.index();
                self.base.emit(begin, 2, Category::StringInterpolationDelim, Coalescing::Normal);
                self.base.advance(2);
                self.scan_balanced(b'(', b')');
                true
            }
            Some(b'$') => {
                let (cp, _) = ulight_core::utf8::decode_and_length_or_replacement(&rest[1..]);
                if bash_chars::is_identifier_start(rest.get(1).copied().unwrap_or(0)) || cp.is_ascii_digit() || matches!(rest.get(1), Some(b'@') | Some(b'*') | Some(b'#') | Some(b'?') | Some(b'!')) {
                    let begin = self.base.index();
                    self.base.emit(begin, 1, Category::StringInterpolationDelim, Coalescing::Normal);
                    self.base.advance(1);
                    let name_len = ulight_core::ascii::length_if(self.base.remainder(), bash_chars::is_identifier_continue).max(1) as u32;
                    let name_begin = self.base.index();
                    self.base.emit(name_begin, name_len, Category::Name, Coalescing::Normal);
                    self.base.advance(name_len);
                    true
                } else {
                    false
                }
            }
            Some(b'`') => {
                let begin = self.base.index();
                self.base.emit(begin, 1, Category::StringInterpolationDelim, Coalescing::Normal);
                self.base.advance(1);
                let content_begin = self.base.index();
                let rest = self.base.remainder();
                let len = ulight_core::ascii::length_if(rest, |b| b != b'`') as u32;
                if len > 0 {
                    self.base.emit(content_begin, len, Category::String, Coalescing::Normal);
                }
                self.base.advance(len);
                if self.base.cursor().current() == b'`' {
                    self.base.emit_and_advance(1, Category::StringInterpolationDelim, Coalescing::Normal);
                }
                true
            }
            _ => false,
        }
    }

    /// Scans up to the matching `close`, tracking nesting depth so an
    /// inner `${...}` or `$(...)` doesn't end the outer one early.
    fn scan_balanced(&mut self, open: u8, close: u8) {
        let mut depth = 1u32;
        while !self.base.eof() {
            let rest = self.base.remainder();
            match rest.first() {
                Some(&b) if b == open => {
                    depth += 1;
                    self.base.advance(1);
                }
                Some(&b) if b == close => {
                    depth -= 1;
                    if depth == 0 {
                        self.base.emit_and_advance(1, Category::StringInterpolationDelim, Coalescing::Normal);
                        return;
                    }
                    self.base.advance(1);
                }
                Some(b'\'') => {
                    self.try_single_quoted_string();
                }
                Some(b'"') => {
                    self.try_double_quoted_string();
                }
                Some(_) => {
                    if !(self.try_variable_expansion() || self.try_identifier_or_keyword() || self.try_number() || self.try_punctuation()) {
                        self.base.advance_one_unhighlighted();
                    }
                }
                None => return,
            }
        }
    }

    fn try_number(&mut self) -> bool {
        let rest = self.base.remainder();
        if rest.is_empty() || !rest[0].is_ascii_digit() {
            return false;
        }
        let len = ulight_core::ascii::length_if(rest, |b| b.is_ascii_digit()) as u32;
        let begin = self.base.index();
        self.base.emit(begin, len, Category::Number, Coalescing::Normal);
        self.base.advance(len);
        true
    }

    fn try_identifier_or_keyword(&mut self) -> bool {
        let rest = self.base.remainder();
        let Some(&first) = rest.first() else { return false };
        if !bash_chars::is_identifier_start(first) {
            return false;
        }
        let len = ulight_core::ascii::length_if(rest, bash_chars::is_identifier_continue) as u32;
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
            b';' => (1, Category::SymPunc),
            b'|' if rest.starts_with(b"||") => (2, Category::SymOp),
            b'&' if rest.starts_with(b"&&") => (2, Category::SymOp),
            b'>' if rest.starts_with(b">>") => (2, Category::SymOp),
            b'|' | b'&' | b'>' | b'<' | b'=' => (1, Category::SymOp),
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
    fn variable_expansion_inside_double_quotes() {
        let toks = run(r#""hi $name""#);
        let categories: Vec<_> = toks.iter().map(|t| t.category).collect();
        assert_eq!(
            categories,
            vec![Category::StringDelim, Category::String, Category::StringInterpolationDelim, Category::Name, Category::StringDelim]
        );
    }

    #[test]
    fn single_quoted_string_has_no_escapes() {
        let toks = run(r#"'a\nb'"#);
        assert!(!toks.iter().any(|t| t.category == Category::StringEscape));
    }

    #[test]
    fn braced_expansion_balances_nested_braces() {
        let toks = run(r"${a:-${b}}");
        let delim_count = toks.iter().filter(|t| t.category == Category::StringInterpolationDelim).count();
        assert_eq!(delim_count, 4);
    }

    #[test]
    fn if_then_fi_are_control_keywords() {
        let toks = run("if true; then :; fi");
        assert_eq!(toks[0].category, Category::KeywordControl);
    }
}
