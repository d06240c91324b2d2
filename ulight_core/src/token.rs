//! The highlight token and its category enumeration.
//!
//! `Category` answers the visual role a span of source plays ("this is a
//! keyword", "this is string content"), never a language-specific
//! construct name. It is `#[non_exhaustive]`: new categories may be
//! appended in later versions without being a breaking change for
//! matchers that already handle a wildcard arm.

/// A closed set of visual roles a highlighted span can have.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum Category {
    Comment = 0,
    CommentDelim = 1,

    String = 8,
    StringDelim = 9,
    StringEscape = 10,
    StringDecor = 11,
    StringInterpolation = 12,
    StringInterpolationDelim = 13,

    Number = 20,
    NumberDelim = 21,
    NumberDecor = 22,

    Keyword = 32,
    KeywordControl = 33,
    KeywordType = 34,
    KeywordThis = 35,
    Bool = 36,
    Null = 37,

    Name = 44,
    NameType = 45,
    NameTypeBuiltin = 46,
    NameMacro = 47,
    NameMacroDelim = 48,
    NameLabel = 49,
    NameLabelDelim = 50,
    NameLifetime = 51,
    NameLifetimeDelim = 52,

    Id = 60,
    IdFunctionUse = 61,
    Macro = 62,

    MarkupTag = 70,
    MarkupAttr = 71,

    Escape = 80,

    SymOp = 88,
    SymPunc = 89,
    SymParens = 90,
    SymSquare = 91,
    SymBrace = 92,

    Value = 100,

    Error = 255,
}

impl Category {
    /// A short machine-readable name, stable across versions, suitable for
    /// a CSS class or a serialised token stream.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::CommentDelim => "comment_delim",
            Self::String => "string",
            Self::StringDelim => "string_delim",
            Self::StringEscape => "string_escape",
            Self::StringDecor => "string_decor",
            Self::StringInterpolation => "string_interpolation",
            Self::StringInterpolationDelim => "string_interpolation_delim",
            Self::Number => "number",
            Self::NumberDelim => "number_delim",
            Self::NumberDecor => "number_decor",
            Self::Keyword => "keyword",
            Self::KeywordControl => "keyword_control",
            Self::KeywordType => "keyword_type",
            Self::KeywordThis => "keyword_this",
            Self::Bool => "bool",
            Self::Null => "null",
            Self::Name => "name",
            Self::NameType => "name_type",
            Self::NameTypeBuiltin => "name_type_builtin",
            Self::NameMacro => "name_macro",
            Self::NameMacroDelim => "name_macro_delim",
            Self::NameLabel => "name_label",
            Self::NameLabelDelim => "name_label_delim",
            Self::NameLifetime => "name_lifetime",
            Self::NameLifetimeDelim => "name_lifetime_delim",
            Self::Id => "id",
            Self::IdFunctionUse => "id_function_use",
            Self::Macro => "macro",
            Self::MarkupTag => "markup_tag",
            Self::MarkupAttr => "markup_attr",
            Self::Escape => "escape",
            Self::SymOp => "sym_op",
            Self::SymPunc => "sym_punc",
            Self::SymParens => "sym_parens",
            Self::SymSquare => "sym_square",
            Self::SymBrace => "sym_brace",
            Self::Value => "value",
            Self::Error => "error",
        }
    }
}

/// `(begin, length, category)`: one highlighted span of the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HighlightToken {
    pub begin: u32,
    pub length: u32,
    pub category: Category,
}

impl HighlightToken {
    #[must_use]
    pub fn end(&self) -> u32 {
        self.begin + self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn end_is_begin_plus_length() {
        let tok = HighlightToken {
            begin: 4,
            length: 3,
            category: Category::Keyword,
        };
        assert_eq!(tok.end(), 7);
    }

    #[test]
    fn every_category_has_a_distinct_name() {
        let names = [
            Category::Comment.name(),
            Category::String.name(),
            Category::Number.name(),
            Category::Keyword.name(),
            Category::Error.name(),
        ];
        let mut sorted = names.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), names.len());
    }
}
