//! LLVM IR scanner. Local and global identifiers are distinguished by
//! their `%`/`@` sigil; both accept a quoted form (`%"weird name"`) for
//! arbitrary bytes.

use ulight_core::{chars::llvm as llvm_chars, Category, Coalescing};

use crate::keywords::lookup_length_bucketed;
use crate::scanner::{Options, ScannerBase};

const KEYWORDS: &[(&str, Category)] = &[
    ("define", Category::Keyword),
    ("declare", Category::Keyword),
    ("ret", Category::KeywordControl),
    ("br", Category::KeywordControl),
    ("switch", Category::KeywordControl),
    ("call", Category::Keyword),
    ("invoke", Category::KeywordControl),
    ("unreachable", Category::KeywordControl),
    ("alloca", Category::Keyword),
    ("load", Category::Keyword),
    ("store", Category::Keyword),
    ("getelementptr", Category::Keyword),
    ("add", Category::Keyword),
    ("sub", Category::Keyword),
    ("mul", Category::Keyword),
    ("udiv", Category::Keyword),
    ("sdiv", Category::Keyword),
    ("icmp", Category::Keyword),
    ("fcmp", Category::Keyword),
    ("phi", Category::Keyword),
    ("select", Category::Keyword),
    ("bitcast", Category::Keyword),
    ("trunc", Category::Keyword),
    ("zext", Category::Keyword),
    ("sext", Category::Keyword),
    ("global", Category::Keyword),
    ("constant", Category::Keyword),
    ("private", Category::Keyword),
    ("internal", Category::Keyword),
    ("external", Category::Keyword),
    ("true", Category::Bool),
    ("false", Category::Bool),
    ("null", Category::Null),
    ("to", Category::Keyword),
    ("nuw", Category::Keyword),
    ("nsw", Category::Keyword),
    ("align", Category::Keyword),
];

const BUILTIN_TYPES: &[(&str, Category)] = &[
    ("void", Category::NameTypeBuiltin),
    ("i1", Category::NameTypeBuiltin),
    ("i8", Category::NameTypeBuiltin),
    ("i16", Category::NameTypeBuiltin),
    ("i32", Category::NameTypeBuiltin),
    ("i64", Category::NameTypeBuiltin),
    ("i128", Category::NameTypeBuiltin),
    ("float", Category::NameTypeBuiltin),
    ("double", Category::NameTypeBuiltin),
    ("ptr", Category::NameTypeBuiltin),
    ("label", Category::NameTypeBuiltin),
    ("metadata", Category::NameTypeBuiltin),
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
                || self.try_string()
                || self.try_sigil_identifier()
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
        if self.base.cursor().current() != b';' {
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

    fn try_string(&mut self) -> bool {
        if self.base.cursor().current() != b'"' {
            return false;
        }
        let begin = self.base.index();
        self.base.emit(begin, 1, Category::StringDelim, Coalescing::Normal);
        self.base.advance(1);
        let flush_start = self.base.index();
        let found = self.base.cursor_mut().skip_to_string_delim(b'"');
        let end = self.base.index();
        if end > flush_start {
            self.base.emit(flush_start, end - flush_start, Category::String, Coalescing::Normal);
        }
        if found == b'"' {
            self.base.emit_and_advance(1, Category::StringDelim, Coalescing::Normal);
        }
        true
    }

    /// `%name`, `@name`, `%42`, `%"quoted name"` — the sigil is a
    /// separate token from the name it introduces.
    fn try_sigil_identifier(&mut self) -> bool {
        let rest = self.base.remainder();
        let Some(&sigil) = rest.first() else { return false };
        if sigil != b'%' && sigil != b'@' {
            return false;
        }
        let begin = self.base.index();
        self.base.emit(begin, 1, Category::SymPunc, Coalescing::Normal);
        self.base.advance(1);
        if self.base.cursor().current() == b'"' {
            self.try_string();
            return true;
        }
        let body = self.base.remainder();
        let len = ulight_core::ascii::length_if(body, llvm_chars::is_identifier_continue) as u32;
        if len == 0 {
            return true;
        }
        let name_begin = self.base.index();
        self.base.emit(name_begin, len, Category::Name, Coalescing::Normal);
        self.base.advance(len);
        true
    }

    fn try_number(&mut self) -> bool {
        let rest = self.base.remainder();
        let negative = rest.first() == Some(&b'-');
        let digits_start = if negative { 1 } else { 0 };
        if !rest.get(digits_start).is_some_and(u8::is_ascii_digit) {
            return false;
        }
        let opts = ulight_core::CommonNumberOptions {
            prefixes: &[ulight_core::StringAndBase { text: "0x", base: 16 }],
            exponent_separators: &[ulight_core::StringAndBase { text: "e", base: 10 }, ulight_core::StringAndBase { text: "E", base: 10 }],
            suffixes: ulight_core::SuffixMatcher::None,
            default_base: 10,
            default_leading_zero_base: 10,
            digit_separator: None,
            nonempty_integer: true,
            nonempty_fraction: false,
        };
        let body = &rest[digits_start..];
        let r = ulight_core::match_common_number(body, &opts);
        if r.length == 0 {
            return false;
        }
        let len = (digits_start + r.length) as u32;
        let begin = self.base.index();
        self.base.emit(begin, len, Category::Number, Coalescing::Normal);
        self.base.advance(len);
        true
    }

    fn try_identifier_or_keyword(&mut self) -> bool {
        let rest = self.base.remainder();
        let Some(&first) = rest.first() else { return false };
        if !(first.is_ascii_alphabetic() || first == b'_') {
            return false;
        }
        let len = ulight_core::ascii::length_if(rest, llvm_chars::is_identifier_continue) as u32;
        let word = &rest[..len as usize];
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
            b',' => (1, Category::SymPunc),
            b'=' | b'*' => (1, Category::SymOp),
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
    fn global_identifier_splits_sigil_and_name() {
        let toks = run("@main");
        assert_eq!(toks[0].category, Category::SymPunc);
        assert_eq!(toks[1].category, Category::Name);
        assert_eq!(toks[1].length, 4);
    }

    #[test]
    fn builtin_type_recognised() {
        let toks = run("define i32 @f()");
        assert!(toks.iter().any(|t| t.category == Category::NameTypeBuiltin));
    }

    #[test]
    fn local_numbered_identifier() {
        let toks = run("%1 = load i32, ptr %0");
        assert_eq!(toks[0].category, Category::SymPunc);
        assert_eq!(toks[1].category, Category::Name);
    }
}
