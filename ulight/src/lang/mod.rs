//! One module per supported language. Each exposes a `Scanner::new(cursor,
//! options).run()` that returns the language's highlight tokens; the
//! top-level dispatcher in `crate::lib` picks the module by `Lang`.

pub mod bash;
pub mod c_cpp;
pub mod css;
pub mod ebnf;
pub mod html;
pub mod js;
pub mod kotlin;
pub mod llvm;
pub mod lua;
pub mod mmml;
pub mod nasm;
pub mod python;
pub mod rust_lang;
pub mod tex;
pub mod xml;
