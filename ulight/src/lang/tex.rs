//! TeX scanner. Control sequences are `\` followed by a run of letters,
//! or `\` followed by exactly one non-letter (the single-char-control-word
//! form, e.g. `\$`, `\\`). `%` starts a line comment; `{`/`}` delimit
//! groups; `$` toggles math mode (tracked only for category purposes,
//! not matched against a closing delimiter).

use ulight_core::{chars::tex as tex_chars, Category, Coalescing};

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
            if self.try_whitespace() || self.try_comment() || self.try_control_sequence() || self.try_punctuation() {
                continue;
            }
            self.base.advance_one_unhighlighted();
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
        if self.base.cursor().current() != b'%' {
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

    fn try_control_sequence(&mut self) -> bool {
        let rest = self.base.remainder();
        if rest.first() != Some(&b'\\') {
            return false;
        }
        let begin = self.base.index();
        self.base.emit(begin, 1, Category::NameMacroDelim, Coalescing::Normal);
        self.base.advance(1);
        let name_begin = self.base.index();
        let rest = self.base.remainder();
        let letters = ulight_core::ascii::length_if(rest, tex_chars::is_command_name_continue) as u32;
        let len = if letters > 0 {
            letters
        } else if !rest.is_empty() {
            ulight_core::utf8::sequence_length(rest[0]).max(1)
        } else {
            0
        };
        if len > 0 {
            self.base.emit(name_begin, len, Category::NameMacro, Coalescing::Normal);
            self.base.advance(len);
        }
        true
    }

    fn try_punctuation(&mut self) -> bool {
        let rest = self.base.remainder();
        let Some(&c) = rest.first() else { return false };
        let (len, category) = match c {
            b'{' | b'}' => (1, Category::SymBrace),
            b'[' | b']' => (1, Category::SymSquare),
            b'$' if rest.starts_with(b"$$") => (2, Category::StringDelim),
            b'$' => (1, Category::StringDelim),
            b'&' | b'#' | b'_' | b'^' => (1, Category::SymOp),
            _ => return false,
        };
        self.base.emit_and_advance(len, category, Coalescing::Normal);
        true
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
    fn control_word_splits_backslash_and_name() {
        let toks = run(r"\textbf{hi}");
        let categories: Vec<_> = toks.iter().map(|t| t.category).collect();
        assert_eq!(
            categories,
            vec![Category::NameMacroDelim, Category::NameMacro, Category::SymBrace, Category::SymBrace]
        );
    }

    #[test]
    fn single_char_control_sequence() {
        let toks = run(r"\$ \\");
        assert_eq!(toks[1].length, 1);
        assert_eq!(toks[1].category, Category::NameMacro);
    }

    #[test]
    fn line_comment_recognised() {
        let toks = run("% a note\ntext");
        assert_eq!(toks[0].category, Category::CommentDelim);
        assert!(toks.iter().any(|t| t.category == Category::Comment));
    }
}
