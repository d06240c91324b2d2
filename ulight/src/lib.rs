//! Multi-language lexical syntax highlighter.
//!
//! `ulight` turns source bytes into a flat list of non-overlapping
//! `(offset, length, category)` highlight tokens for one of nineteen
//! supported languages. Nothing here builds a syntax tree or resolves
//! names; every scanner is a single forward pass over the byte stream.
//!
//! # Architecture
//!
//! `ulight` is the "cooked" half of a two-layer split (modeled after
//! Rust's `rustc_lexer` / `rustc_parse::lexer` separation):
//!
//! - **`ulight_core`**: zero-dependency primitives (`SourceBuffer`,
//!   `Cursor`, `Category`, escape/number matchers, per-language
//!   character classifiers). No scanning logic.
//! - **`ulight`** (this crate): one `Scanner` per language built on top
//!   of those primitives, plus the [`Lang`] dispatcher.
//!
//! # Usage
//!
//! ```
//! use ulight::{highlight, Lang, Options};
//!
//! let tokens = highlight(Lang::Rust, b"let x = 1;", Options::default());
//! assert!(tokens.iter().any(|t| t.category == ulight_core::Category::Keyword));
//! ```

mod keywords;
pub mod lang;
mod scanner;

use ulight_core::{Category, Cursor, HighlightToken, SourceBuffer};

pub use scanner::Options;

/// A supported source language. Some variants share a scanner with a
/// dialect flag (`c`/`cpp`, `js`/`ts`/`jsx`, `mmml`/`cowel`).
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lang {
    C,
    Cpp,
    Css,
    Html,
    Xml,
    Js,
    Ts,
    Jsx,
    Kotlin,
    Python,
    Rust,
    Nasm,
    Llvm,
    Lua,
    Tex,
    Mmml,
    Cowel,
    Bash,
    Ebnf,
}

impl Lang {
    /// Parses the short language tag used by callers (e.g. a fenced
    /// code block's info string). Returns `None` for unrecognised tags.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let lang = Self::from_tag_inner(tag);
        if lang.is_none() {
            tracing::debug!(tag, "unrecognised language tag");
        }
        lang
    }

    fn from_tag_inner(tag: &str) -> Option<Self> {
        Some(match tag {
            "c" => Self::C,
            "cpp" | "c++" => Self::Cpp,
            "css" => Self::Css,
            "html" => Self::Html,
            "xml" => Self::Xml,
            "js" | "javascript" => Self::Js,
            "ts" | "typescript" => Self::Ts,
            "jsx" => Self::Jsx,
            "kotlin" | "kt" => Self::Kotlin,
            "python" | "py" => Self::Python,
            "rust" | "rs" => Self::Rust,
            "nasm" | "asm" => Self::Nasm,
            "llvm" => Self::Llvm,
            "lua" => Self::Lua,
            "tex" | "latex" => Self::Tex,
            "mmml" => Self::Mmml,
            "cowel" => Self::Cowel,
            "bash" | "sh" | "shell" => Self::Bash,
            "ebnf" => Self::Ebnf,
            _ => return None,
        })
    }
}

/// Highlights `source`, returning the emitted tokens in ascending,
/// non-overlapping order.
///
/// Encoding issues in `source` (invalid UTF-8, a stray NUL byte) never
/// cause a panic: scanners fall back to one-byte-at-a-time error
/// tokens and always make progress, so this always terminates and
/// always returns a (possibly partial) token list.
#[must_use]
pub fn highlight(language: Lang, source: &[u8], options: Options) -> Vec<HighlightToken> {
    let _span = tracing::trace_span!("highlight", ?language, len = source.len()).entered();
    let buffer = SourceBuffer::new(source);
    let cursor = buffer.cursor();
    run_scanner(language, cursor, options)
}

fn run_scanner(language: Lang, cursor: Cursor<'_>, options: Options) -> Vec<HighlightToken> {
    use lang::{bash, c_cpp, css, ebnf, html, js, kotlin, llvm, lua, mmml, nasm, python, rust_lang, tex, xml};

    match language {
        Lang::C => c_cpp::Scanner::new(cursor, options, c_cpp::Dialect::C).run(),
        Lang::Cpp => c_cpp::Scanner::new(cursor, options, c_cpp::Dialect::Cpp).run(),
        Lang::Css => css::Scanner::new(cursor, options).run(),
        Lang::Html => html::Scanner::new(cursor, options).run(),
        Lang::Xml => xml::Scanner::new(cursor, options).run(),
        Lang::Js => js::Scanner::new(cursor, options, js::Feature::Js).run(),
        Lang::Ts => js::Scanner::new(cursor, options, js::Feature::Ts).run(),
        Lang::Jsx => js::Scanner::new(cursor, options, js::Feature::Jsx).run(),
        Lang::Kotlin => kotlin::Scanner::new(cursor, options).run(),
        Lang::Python => python::Scanner::new(cursor, options).run(),
        Lang::Rust => rust_lang::Scanner::new(cursor, options).run(),
        Lang::Nasm => nasm::Scanner::new(cursor, options).run(),
        Lang::Llvm => llvm::Scanner::new(cursor, options).run(),
        Lang::Lua => lua::Scanner::new(cursor, options).run(),
        Lang::Tex => tex::Scanner::new(cursor, options).run(),
        Lang::Mmml | Lang::Cowel => mmml::Scanner::new(cursor, options).run(),
        Lang::Bash => bash::Scanner::new(cursor, options).run(),
        Lang::Ebnf => ebnf::Scanner::new(cursor, options).run(),
    }
}

/// Tokens are emitted in strictly ascending, non-overlapping order:
/// every main-loop iteration of every scanner advances the cursor by at
/// least one byte, and no scanner ever emits a span starting before the
/// cursor position it started at.
#[must_use]
pub fn tokens_are_well_formed(tokens: &[HighlightToken]) -> bool {
    let mut end = 0u32;
    for tok in tokens {
        if tok.begin < end || tok.length == 0 {
            return false;
        }
        end = tok.begin + tok.length;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn dispatches_by_tag() {
        assert_eq!(Lang::from_tag("rust"), Some(Lang::Rust));
        assert_eq!(Lang::from_tag("c++"), Some(Lang::Cpp));
        assert_eq!(Lang::from_tag("unknown-language"), None);
    }

    #[test]
    fn highlight_produces_well_formed_tokens_for_every_language() {
        let samples: &[(Lang, &[u8])] = &[
            (Lang::C, b"int main(void) { return 0; }"),
            (Lang::Cpp, b"auto f() -> int { return 1; }"),
            (Lang::Css, b".a { color: red; }"),
            (Lang::Html, b"<p class=\"x\">hi</p>"),
            (Lang::Xml, b"<root a=\"1\"/>"),
            (Lang::Js, b"const x = `hi ${1 + 1}`;"),
            (Lang::Ts, b"let x: number = 1;"),
            (Lang::Jsx, b"const e = <div a-b=\"1\" />;"),
            (Lang::Kotlin, b"val x = \"hi $name\""),
            (Lang::Python, b"x = f\"hi {1 + 1}\""),
            (Lang::Rust, b"fn main() { let x = 1; }"),
            (Lang::Nasm, b"mov rax, 1\nlabel: ret"),
            (Lang::Llvm, b"%1 = add i32 %0, 1"),
            (Lang::Lua, b"local x = 1 -- comment"),
            (Lang::Tex, b"\\textbf{hi} % comment"),
            (Lang::Mmml, br"\b[lang=c]{code}"),
            (Lang::Cowel, br"\b{text}"),
            (Lang::Bash, b"if true; then echo \"$x\"; fi"),
            (Lang::Ebnf, b"digit = \"0\" | \"1\" ;"),
        ];
        for &(lang, source) in samples {
            let tokens = highlight(lang, source, Options::default());
            assert!(tokens_are_well_formed(&tokens), "{lang:?} produced overlapping/empty tokens");
        }
    }
}

#[cfg(test)]
const ALL_LANGS: &[Lang] = &[
    Lang::C,
    Lang::Cpp,
    Lang::Css,
    Lang::Html,
    Lang::Xml,
    Lang::Js,
    Lang::Ts,
    Lang::Jsx,
    Lang::Kotlin,
    Lang::Python,
    Lang::Rust,
    Lang::Nasm,
    Lang::Llvm,
    Lang::Lua,
    Lang::Tex,
    Lang::Mmml,
    Lang::Cowel,
    Lang::Bash,
    Lang::Ebnf,
];

#[cfg(test)]
mod proptests {
    use super::{highlight, tokens_are_well_formed, Options, ALL_LANGS};
    use proptest::prelude::*;

    proptest! {
        /// Every scanner, run on arbitrary bytes, produces a well-formed
        /// token stream (non-overlapping, non-decreasing `begin`, every
        /// span within bounds and nonempty) and terminates — testable
        /// properties 1 through 4.
        #[test]
        fn highlight_is_well_formed_for_every_language(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            for &lang in ALL_LANGS {
                let tokens = highlight(lang, &bytes, Options::default());
                prop_assert!(tokens_are_well_formed(&tokens));
                for tok in &tokens {
                    prop_assert!((tok.begin + tok.length) as usize <= bytes.len());
                }
            }
        }

        /// Highlighting is a pure function of its input: running the same
        /// call twice gives byte-identical token streams.
        #[test]
        fn highlight_is_deterministic(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
            for &lang in ALL_LANGS {
                let a = highlight(lang, &bytes, Options::default());
                let b = highlight(lang, &bytes, Options::default());
                prop_assert_eq!(a, b);
            }
        }
    }
}
