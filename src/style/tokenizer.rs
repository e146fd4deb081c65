//! logos-based recogniser for utility-class tag words.
//!
//! Each whitespace-separated word is lexed on its own and only counts as a
//! tag when a single token spans the entire word. This keeps `xp-4` from
//! being read as an `x` error followed by a `p-4` padding tag.

use logos::Logos;

/// The shape of a single style tag.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagToken {
    /// `p-4`, `px-2`, `pt-1`, ...
    #[regex(r"p[xytrbl]?-[0-9]+")]
    Padding,

    /// `m-4`, `my-2`, `ml-1`, ...
    #[regex(r"m[xytrbl]?-[0-9]+")]
    Margin,

    /// `gap-3`
    #[regex(r"gap-[0-9]+")]
    Gap,

    /// `bg-primary`, `bg-red-500`, `bg-white/50`
    #[regex(r"bg-[a-z]+(-[0-9]+)?(/[0-9]+)?")]
    Background,

    /// `text-muted`, `text-slate-700`
    #[regex(r"text-[a-z]+(-[0-9]+)?(/[0-9]+)?")]
    TextColor,

    /// `rounded`, `rounded-lg`, `rounded-full`
    #[regex(r"rounded(-[a-z0-9]+)?")]
    Rounded,

    /// `shadow`, `shadow-md`, `shadow-none`
    #[regex(r"shadow(-[a-z0-9]+)?")]
    Shadow,

    /// `grow`, `grow-2`
    #[regex(r"grow(-[0-9]+)?")]
    Grow,

    /// `shrink`, `shrink-0`
    #[regex(r"shrink(-[0-9]+)?")]
    Shrink,

    /// `basis-50`
    #[regex(r"basis-[0-9]+")]
    Basis,

    #[token("hover-effect")]
    HoverEffect,

    #[token("focus-ring")]
    FocusRing,
}

/// Classify one tag word. Returns `None` when the word is not a recognised
/// tag shape.
pub fn classify(word: &str) -> Option<TagToken> {
    let mut lexer = TagToken::lexer(word);
    let token = lexer.next()?.ok()?;
    if lexer.span() != (0..word.len()) || lexer.next().is_some() {
        return None;
    }
    Some(token)
}

/// Split a class string into `(token, word)` pairs. Unrecognised words are
/// reported with `None` so callers can keep them as unknown tags.
pub fn tokenize(input: &str) -> Vec<(Option<TagToken>, &str)> {
    input.split_whitespace().map(|word| (classify(word), word)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spacing_shapes() {
        assert_eq!(classify("p-4"), Some(TagToken::Padding));
        assert_eq!(classify("px-2"), Some(TagToken::Padding));
        assert_eq!(classify("pl-10"), Some(TagToken::Padding));
        assert_eq!(classify("my-3"), Some(TagToken::Margin));
        assert_eq!(classify("gap-2"), Some(TagToken::Gap));
    }

    #[test]
    fn color_shapes() {
        assert_eq!(classify("bg-primary"), Some(TagToken::Background));
        assert_eq!(classify("bg-red-500"), Some(TagToken::Background));
        assert_eq!(classify("bg-white/50"), Some(TagToken::Background));
        assert_eq!(classify("text-slate-700"), Some(TagToken::TextColor));
    }

    #[test]
    fn effect_and_flex_shapes() {
        assert_eq!(classify("rounded"), Some(TagToken::Rounded));
        assert_eq!(classify("rounded-lg"), Some(TagToken::Rounded));
        assert_eq!(classify("shadow-md"), Some(TagToken::Shadow));
        assert_eq!(classify("grow"), Some(TagToken::Grow));
        assert_eq!(classify("shrink-0"), Some(TagToken::Shrink));
        assert_eq!(classify("basis-50"), Some(TagToken::Basis));
        assert_eq!(classify("hover-effect"), Some(TagToken::HoverEffect));
        assert_eq!(classify("focus-ring"), Some(TagToken::FocusRing));
    }

    #[test]
    fn partial_matches_are_rejected() {
        assert_eq!(classify("xp-4"), None);
        assert_eq!(classify("p-4x"), None);
        assert_eq!(classify("p-"), None);
        assert_eq!(classify("rounded-"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn tokenize_keeps_unknown_words() {
        let words = tokenize("  p-4 fancy\tbg-primary \n");
        assert_eq!(
            words,
            vec![
                (Some(TagToken::Padding), "p-4"),
                (None, "fancy"),
                (Some(TagToken::Background), "bg-primary"),
            ]
        );
    }
}
