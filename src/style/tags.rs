//! Typed style tags and the unordered tag set attached to elements.

use std::collections::BTreeSet;
use std::fmt;

use super::tokenizer::{tokenize, TagToken};

/// Which sides a spacing tag applies to.
///
/// The declaration order doubles as specificity: `All` is least specific,
/// single sides are most specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Side {
    All,
    X,
    Y,
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    fn from_letter(letter: Option<char>) -> Option<Side> {
        Some(match letter {
            None => Side::All,
            Some('x') => Side::X,
            Some('y') => Side::Y,
            Some('t') => Side::Top,
            Some('r') => Side::Right,
            Some('b') => Side::Bottom,
            Some('l') => Side::Left,
            Some(_) => return None,
        })
    }

    /// Resolution rank: sides applied later override earlier ones.
    pub fn rank(self) -> u8 {
        match self {
            Side::All => 0,
            Side::X | Side::Y => 1,
            Side::Top | Side::Right | Side::Bottom | Side::Left => 2,
        }
    }
}

/// A colour reference as written in a tag: `primary`, `red-500`, `white/50`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColorRef {
    pub name: String,
    pub shade: Option<u16>,
    pub opacity: Option<u8>,
}

impl ColorRef {
    /// Parse the part after `bg-` / `text-`.
    fn parse(body: &str) -> Option<ColorRef> {
        let (color, opacity) = match body.split_once('/') {
            Some((color, pct)) => (color, Some(pct.parse::<u8>().ok()?.min(100))),
            None => (body, None),
        };
        let (name, shade) = match color.split_once('-') {
            Some((name, shade)) => (name, Some(shade.parse::<u16>().ok()?)),
            None => (color, None),
        };
        Some(ColorRef { name: name.to_owned(), shade, opacity })
    }

    /// Table key: `red-500` or `white`.
    pub fn key(&self) -> String {
        match self.shade {
            Some(shade) => format!("{}-{shade}", self.name),
            None => self.name.clone(),
        }
    }
}

/// A single parsed style tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StyleTag {
    Padding(Side, i32),
    Margin(Side, i32),
    Gap(i32),
    Background(ColorRef),
    TextColor(ColorRef),
    /// Radius preset name; empty for bare `rounded`.
    Rounded(String),
    /// Shadow preset name; empty for bare `shadow`.
    Shadow(String),
    Grow(u32),
    Shrink(u32),
    Basis(u32),
    HoverEffect,
    FocusRing,
    /// Anything the tokenizer did not recognise. Kept so callers can still
    /// query and remove it, but it never affects resolution.
    Unknown(String),
}

impl StyleTag {
    /// Parse one tag word.
    pub fn parse(word: &str) -> StyleTag {
        super::tokenizer::classify(word)
            .and_then(|token| Self::from_token(token, word))
            .unwrap_or_else(|| StyleTag::Unknown(word.to_owned()))
    }

    fn from_token(token: TagToken, word: &str) -> Option<StyleTag> {
        let suffix = |prefix: &str| word.strip_prefix(prefix);
        let trailing_number = |word: &str| -> Option<u32> {
            match word.split_once('-') {
                Some((_, n)) => n.parse().ok(),
                None => Some(1),
            }
        };
        Some(match token {
            TagToken::Padding | TagToken::Margin => {
                let (head, value) = word.split_once('-')?;
                let side = Side::from_letter(head.chars().nth(1))?;
                let value = value.parse().ok()?;
                if token == TagToken::Padding {
                    StyleTag::Padding(side, value)
                } else {
                    StyleTag::Margin(side, value)
                }
            }
            TagToken::Gap => StyleTag::Gap(suffix("gap-")?.parse().ok()?),
            TagToken::Background => StyleTag::Background(ColorRef::parse(suffix("bg-")?)?),
            TagToken::TextColor => StyleTag::TextColor(ColorRef::parse(suffix("text-")?)?),
            TagToken::Rounded => {
                StyleTag::Rounded(suffix("rounded-").unwrap_or_default().to_owned())
            }
            TagToken::Shadow => StyleTag::Shadow(suffix("shadow-").unwrap_or_default().to_owned()),
            TagToken::Grow => StyleTag::Grow(trailing_number(word)?),
            TagToken::Shrink => StyleTag::Shrink(trailing_number(word)?),
            TagToken::Basis => StyleTag::Basis(suffix("basis-")?.parse().ok()?),
            TagToken::HoverEffect => StyleTag::HoverEffect,
            TagToken::FocusRing => StyleTag::FocusRing,
        })
    }
}

impl fmt::Display for StyleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn side_letter(side: Side) -> &'static str {
            match side {
                Side::All => "",
                Side::X => "x",
                Side::Y => "y",
                Side::Top => "t",
                Side::Right => "r",
                Side::Bottom => "b",
                Side::Left => "l",
            }
        }
        fn color(f: &mut fmt::Formatter<'_>, prefix: &str, c: &ColorRef) -> fmt::Result {
            write!(f, "{prefix}-{}", c.key())?;
            if let Some(op) = c.opacity {
                write!(f, "/{op}")?;
            }
            Ok(())
        }
        fn dashed(f: &mut fmt::Formatter<'_>, head: &str, name: &str) -> fmt::Result {
            if name.is_empty() {
                write!(f, "{head}")
            } else {
                write!(f, "{head}-{name}")
            }
        }
        match self {
            StyleTag::Padding(side, v) => write!(f, "p{}-{v}", side_letter(*side)),
            StyleTag::Margin(side, v) => write!(f, "m{}-{v}", side_letter(*side)),
            StyleTag::Gap(v) => write!(f, "gap-{v}"),
            StyleTag::Background(c) => color(f, "bg", c),
            StyleTag::TextColor(c) => color(f, "text", c),
            StyleTag::Rounded(name) => dashed(f, "rounded", name),
            StyleTag::Shadow(name) => dashed(f, "shadow", name),
            StyleTag::Grow(w) => write!(f, "grow-{w}"),
            StyleTag::Shrink(w) => write!(f, "shrink-{w}"),
            StyleTag::Basis(v) => write!(f, "basis-{v}"),
            StyleTag::HoverEffect => write!(f, "hover-effect"),
            StyleTag::FocusRing => write!(f, "focus-ring"),
            StyleTag::Unknown(word) => write!(f, "{word}"),
        }
    }
}

/// An unordered set of style tags.
///
/// Insertion order is irrelevant: two sets holding the same tags resolve to
/// the same computed style.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: BTreeSet<StyleTag>,
}

impl TagSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a whitespace-separated class string.
    pub fn parse(input: &str) -> Self {
        let mut set = Self::new();
        set.extend_str(input);
        set
    }

    /// Add every tag from a class string.
    pub fn extend_str(&mut self, input: &str) {
        for (_, word) in tokenize(input) {
            self.tags.insert(StyleTag::parse(word));
        }
    }

    /// Insert a tag. Returns `false` if it was already present.
    pub fn insert(&mut self, tag: StyleTag) -> bool {
        self.tags.insert(tag)
    }

    /// Remove a tag. Returns `false` if it was absent.
    pub fn remove(&mut self, tag: &StyleTag) -> bool {
        self.tags.remove(tag)
    }

    pub fn contains(&self, tag: &StyleTag) -> bool {
        self.tags.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StyleTag> {
        self.tags.iter()
    }
}

impl FromIterator<StyleTag> for TagSet {
    fn from_iter<I: IntoIterator<Item = StyleTag>>(iter: I) -> Self {
        Self { tags: iter.into_iter().collect() }
    }
}
