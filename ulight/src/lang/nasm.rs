//! NASM assembly scanner. Registers and mnemonics are looked up
//! case-insensitively against a closed table; numeric literals may carry
//! a trailing radix letter (`0ffh`, `101b`) handled by
//! [`ulight_core::match_suffix_number`].

use ulight_core::{chars::nasm as nasm_chars, Category, Coalescing};

use crate::scanner::{Options, ScannerBase};

const REGISTERS: &[&str] = &[
    "al", "ah", "ax", "eax", "rax", "bl", "bh", "bx", "ebx", "rbx", "cl", "ch", "cx", "ecx", "rcx", "dl", "dh", "dx",
    "edx", "rdx", "si", "esi", "rsi", "di", "edi", "rdi", "sp", "esp", "rsp", "bp", "ebp", "rbp", "cs", "ds", "es",
    "fs", "gs", "ss", "r8", "r9", "r10", "r11", "r12", "r13", "r14", "r15",
];

const INSTRUCTIONS: &[&str] = &[
    "mov", "push", "pop", "add", "sub", "mul", "imul", "div", "idiv", "and", "or", "xor", "not", "neg", "shl", "shr",
    "jmp", "je", "jne", "jz", "jnz", "jg", "jl", "jge", "jle", "call", "ret", "nop", "lea", "cmp", "test", "int",
    "syscall", "inc", "dec", "loop", "cdq", "cqo",
];

const DIRECTIVES: &[&str] = &["section", "global", "extern", "db", "dw", "dd", "dq", "resb", "resw", "resd", "equ", "times", "bits", "default"];

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
                || self.try_number()
                || self.try_identifier()
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
        let quote = self.base.cursor().current();
        if quote != b'"' && quote != b'\'' && quote != b'`' {
            return false;
        }
        let begin = self.base.index();
        self.base.emit(begin, 1, Category::StringDelim, Coalescing::Normal);
        self.base.advance(1);
        let flush_start = self.base.index();
        let found = self.base.cursor_mut().skip_to_string_delim(quote);
        let end = self.base.index();
        if end > flush_start {
            self.base.emit(flush_start, end - flush_start, Category::String, Coalescing::Normal);
        }
        if found == quote {
            self.base.emit_and_advance(1, Category::StringDelim, Coalescing::Normal);
        }
        true
    }

    fn try_number(&mut self) -> bool {
        let rest = self.base.remainder();
        if rest.is_empty() || !rest[0].is_ascii_digit() {
            return false;
        }
        if rest.starts_with(b"0x") || rest.starts_with(b"0X") {
            let hex_len = 2 + ulight_core::ascii::length_if(&rest[2..], |b| b.is_ascii_hexdigit()) as u32;
            let begin = self.base.index();
            self.base.emit(begin, hex_len, Category::Number, Coalescing::Normal);
            self.base.advance(hex_len);
            return true;
        }
        let opts = ulight_core::SuffixNumberOptions {
            suffixes: &[
                ulight_core::StringAndBase { text: "h", base: 16 },
                ulight_core::StringAndBase { text: "q", base: 8 },
                ulight_core::StringAndBase { text: "o", base: 8 },
                ulight_core::StringAndBase { text: "b", base: 2 },
                ulight_core::StringAndBase { text: "d", base: 10 },
            ],
            default_base: 10,
            digit_separator: Some(b'_'),
        };
        let r = ulight_core::match_suffix_number(rest, &opts);
        if !r.is_match() {
            return false;
        }
        let len = (r.digits + r.suffix) as u32;
        let begin = self.base.index();
        self.base.emit(begin, len, Category::Number, Coalescing::Normal);
        self.base.advance(len);
        true
    }

    fn try_identifier(&mut self) -> bool {
        let rest = self.base.remainder();
        let Some(&first) = rest.first() else { return false };
        if !nasm_chars::is_identifier_start(first) {
            return false;
        }
        let len = ulight_core::ascii::length_if(rest, nasm_chars::is_identifier_continue) as u32;
        let word = &rest[..len as usize];
        let lower: Vec<u8> = word.iter().map(u8::to_ascii_lowercase).collect();
        let followed_by_colon = rest.get(len as usize) == Some(&b':');
        let category = if followed_by_colon {
            Category::NameLabel
        } else if REGISTERS.iter().any(|r| r.as_bytes() == lower.as_slice()) {
            Category::NameTypeBuiltin
        } else if INSTRUCTIONS.iter().any(|i| i.as_bytes() == lower.as_slice()) {
            Category::Keyword
        } else if DIRECTIVES.iter().any(|d| d.as_bytes() == lower.as_slice()) {
            Category::KeywordControl
        } else {
            Category::Name
        };
        self.base.emit_and_advance(len, category, Coalescing::Normal);
        if followed_by_colon {
            self.base.emit_and_advance(1, Category::NameLabelDelim, Coalescing::Normal);
        }
        true
    }

    fn try_punctuation(&mut self) -> bool {
        let rest = self.base.remainder();
        let Some(&c) = rest.first() else { return false };
        let (len, category) = match c {
            b'[' | b']' => (1, Category::SymSquare),
            b'(' | b')' => (1, Category::SymParens),
            b',' | b':' => (1, Category::SymPunc),
            b'+' | b'-' | b'*' | b'/' | b'%' | b'|' | b'&' | b'^' | b'~' => (1, Category::SymOp),
            _ => return false,
        };
        self.base.emit_and_advance(len, category, Coalescing::Normal);
        true
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
    fn register_recognised_case_insensitively() {
        let toks = run("MOV RAX, 1");
        assert_eq!(toks[0].category, Category::Keyword);
        assert_eq!(toks[1].category, Category::NameTypeBuiltin);
    }

    #[test]
    fn hex_suffix_number() {
        let toks = run("mov al, 0ffh");
        let num = toks.iter().find(|t| t.category == Category::Number).unwrap();
        assert_eq!(num.length, 4);
    }

    #[test]
    fn label_definition_splits_name_and_colon() {
        let toks = run("start:");
        let categories: Vec<_> = toks.iter().map(|t| t.category).collect();
        assert_eq!(categories, vec![Category::NameLabel, Category::NameLabelDelim]);
    }
}
