//! EBNF scanner (ISO 14977 style). Rule definitions are `name = ...;`;
//! comments are `(* ... *)` and may nest.

use ulight_core::{chars::ebnf as ebnf_chars, Category, Coalescing};

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
            if self.try_whitespace() || self.try_comment() || self.try_string() || self.try_identifier() || self.try_punctuation() {
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

    /// `(* ... *)`, which may nest.
    fn try_comment(&mut self) -> bool {
        if !self.base.remainder().starts_with(b"(*") {
            return false;
        }
        let begin = self.base.index();
        self.base.emit(begin, 2, Category::CommentDelim, Coalescing::Normal);
        self.base.advance(2);
        let mut depth = 1u32;
        let mut flush_start = self.base.index();
        loop {
            let rest = self.base.remainder();
            if rest.starts_with(b"(*") {
                flush(&mut self.base, flush_start, Category::Comment);
                self.base.emit_and_advance(2, Category::CommentDelim, Coalescing::Normal);
                depth += 1;
                flush_start = self.base.index();
            } else if rest.starts_with(b"*)") {
                flush(&mut self.base, flush_start, Category::Comment);
                self.base.emit_and_advance(2, Category::CommentDelim, Coalescing::Normal);
                depth -= 1;
                if depth == 0 {
                    return true;
                }
                flush_start = self.base.index();
            } else if rest.is_empty() {
                flush(&mut self.base, flush_start, Category::Comment);
                return true;
            } else {
                self.base.advance(1);
            }
        }
    }

    /// Terminal strings, quoted with either `'` or `"`; no escapes.
    fn try_string(&mut self) -> bool {
        let quote = self.base.cursor().current();
        if quote != b'\'' && quote != b'"' {
            return false;
        }
        let begin = self.base.index();
        self.base.emit(begin, 1, Category::StringDelim, Coalescing::Normal);
        self.base.advance(1);
        let content_begin = self.base.index();
        let found = self.base.cursor_mut().skip_to_string_delim(quote);
        let end = self.base.index();
        if end > content_begin {
            self.base.emit(content_begin, end - content_begin, Category::String, Coalescing::Normal);
        }
        if found == quote {
            self.base.emit_and_advance(1, Category::StringDelim, Coalescing::Normal);
        }
        true
    }

    /// Rule names and nonterminal references are both plain
    /// identifiers; there is no closed keyword set.
    fn try_identifier(&mut self) -> bool {
        let rest = self.base.remainder();
        let Some(&first) = rest.first() else { return false };
        if !(first.is_ascii_alphabetic() || first == b'_') {
            return false;
        }
        let len = ulight_core::ascii::length_if(rest, ebnf_chars::is_identifier_continue) as u32;
        let begin = self.base.index();
        self.base.emit(begin, len, Category::Name, Coalescing::Normal);
        self.base.advance(len);
        true
    }

    fn try_punctuation(&mut self) -> bool {
        let rest = self.base.remainder();
        let Some(&c) = rest.first() else { return false };
        let (len, category) = match c {
            b'=' => (1, Category::SymOp),
            b';' | b'.' => (1, Category::SymPunc),
            b'|' => (1, Category::SymOp),
            b',' => (1, Category::SymPunc),
            b'-' => (1, Category::SymOp),
            b'(' if rest.starts_with(b"(/") => (2, Category::SymParens),
            b'/' if rest.starts_with(b"/)") => (2, Category::SymParens),
            b'(' | b')' => (1, Category::SymParens),
            b'[' | b']' => (1, Category::SymSquare),
            b'{' | b'}' => (1, Category::SymBrace),
            b'?' => (1, Category::SymOp),
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
    fn rule_definition_splits_name_operator_and_terminator() {
        let toks = run(r#"digit = "0" | "1" ;"#);
        assert_eq!(toks[0].category, Category::Name);
        assert_eq!(toks[1].category, Category::SymOp);
        assert_eq!(toks[2].category, Category::StringDelim);
    }

    #[test]
    fn nested_comments_balance() {
        let toks = run("(* outer (* inner *) still outer *) x");
        let delim_count = toks.iter().filter(|t| t.category == Category::CommentDelim).count();
        assert_eq!(delim_count, 4);
        assert_eq!(toks.last().unwrap().category, Category::Name);
    }

    #[test]
    fn grouping_and_repetition_symbols_recognised() {
        let toks = run("x = { a } , [ b ] , ( c | d ) ;");
        assert!(toks.iter().any(|t| t.category == Category::SymBrace));
        assert!(toks.iter().any(|t| t.category == Category::SymSquare));
        assert!(toks.iter().any(|t| t.category == Category::SymParens));
    }
}
