//! MMML/COWEL scanner. Directives open with `\name`, optionally followed
//! by a `[...]` argument list and a `{...}` block; both nest and may
//! contain further directives, so blocks are scanned recursively rather
//! than matched by a flat bracket count.

use ulight_core::{chars::mmml as mmml_chars, Category, Coalescing};

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
            if self.dispatch_one() {
                continue;
            }
            self.base.advance_one_unhighlighted();
        }
        self.base.finish()
    }

    fn dispatch_one(&mut self) -> bool {
        self.try_escape() || self.try_directive() || self.try_brace()
    }

    fn try_escape(&mut self) -> bool {
        let rest = self.base.remainder();
        if rest.first() != Some(&b'\\') {
            return false;
        }
        if rest.get(1).is_some_and(|&b| matches!(b, b'\\' | b'{' | b'}' | b'[' | b']')) {
            self.base.emit_and_advance(2, Category::Escape, Coalescing::Normal);
            return true;
        }
        false
    }

    fn try_directive(&mut self) -> bool {
        let rest = self.base.remainder();
        if rest.first() != Some(&b'\\') {
            return false;
        }
        let name_len = ulight_core::ascii::length_if(&rest[1..], mmml_chars::is_directive_name_continue) as u32;
        if name_len == 0 {
            return false;
        }
        let begin = self.base.index();
        self.base.emit(begin, 1, Category::NameMacroDelim, Coalescing::Normal);
        self.base.advance(1);
        let name_begin = self.base.index();
        self.base.emit(name_begin, name_len, Category::NameMacro, Coalescing::Normal);
        self.base.advance(name_len);
        while self.try_argument_list() || self.try_block() {}
        true
    }

    /// `[...]`: directive arguments, scanned recursively so nested
    /// directives and braces inside the argument list highlight too.
    fn try_argument_list(&mut self) -> bool {
        if self.base.cursor().current() != b'[' {
            return false;
        }
        self.base.emit_and_advance(1, Category::SymSquare, Coalescing::Normal);
        loop {
            if self.base.cursor().current() == b']' {
                self.base.emit_and_advance(1, Category::SymSquare, Coalescing::Normal);
                return true;
            }
            if self.base.eof() {
                return true;
            }
            if !self.dispatch_one() {
                self.base.advance_one_unhighlighted();
            }
        }
    }

    /// `{...}`: directive content block, also recursive.
    fn try_block(&mut self) -> bool {
        self.try_brace_as(Category::SymBrace)
    }

    fn try_brace(&mut self) -> bool {
        self.try_brace_as(Category::SymBrace)
    }

    fn try_brace_as(&mut self, category: Category) -> bool {
        if self.base.cursor().current() != b'{' {
            return false;
        }
        self.base.emit_and_advance(1, category, Coalescing::Normal);
        loop {
            if self.base.cursor().current() == b'}' {
                self.base.emit_and_advance(1, category, Coalescing::Normal);
                return true;
            }
            if self.base.eof() {
                return true;
            }
            if !self.dispatch_one() {
                self.base.advance_one_unhighlighted();
            }
        }
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
    fn directive_with_argument_list_and_block() {
        let toks = run(r"\b[lang=c]{code}");
        let categories: Vec<_> = toks.iter().map(|t| t.category).collect();
        assert_eq!(
            categories,
            vec![
                Category::NameMacroDelim,
                Category::NameMacro,
                Category::SymSquare,
                Category::SymSquare,
                Category::SymBrace,
                Category::SymBrace,
            ]
        );
    }

    #[test]
    fn nested_directive_inside_block() {
        let toks = run(r"\outer{\inner{x}}");
        let macro_count = toks.iter().filter(|t| t.category == Category::NameMacro).count();
        assert_eq!(macro_count, 2);
    }

    #[test]
    fn escaped_brace_is_not_a_block_delimiter() {
        let toks = run(r"\b{\{}");
        assert!(toks.iter().any(|t| t.category == Category::Escape));
    }
}
