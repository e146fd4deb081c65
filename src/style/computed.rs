//! Computed style snapshot and the tag resolver.

use serde::Deserialize;

use super::table::StyleTable;
use super::tags::{ColorRef, Side, StyleTag, TagSet};
use crate::geometry::Spacing;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// An 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(0xff, 0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::new(0, 0, 0, 0xff);
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque colour from a packed `0xRRGGBB` value.
    pub const fn from_rgb(rgb: u32) -> Self {
        Self::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 0xff)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        match digits.len() {
            3 => {
                let mut it = digits.chars().filter_map(|c| c.to_digit(16)).map(|d| (d * 17) as u8);
                Some(Self::new(it.next()?, it.next()?, it.next()?, 0xff))
            }
            6 => Some(Self::new(byte(0)?, byte(2)?, byte(4)?, 0xff)),
            8 => Some(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// Scale alpha by a percentage in `0..=100`.
    pub fn with_opacity(self, percent: u8) -> Self {
        let percent = u16::from(percent.min(100));
        Self { a: (u16::from(self.a) * percent / 100) as u8, ..self }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid colour `{value}`"))
    }
}

/// Drop shadow descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Shadow {
    pub color: Color,
    pub blur: i32,
    pub offset_x: i32,
    pub offset_y: i32,
}

// ---------------------------------------------------------------------------
// ComputedStyle
// ---------------------------------------------------------------------------

/// Concrete values resolved from an element's tag set.
///
/// Replaced wholesale on recomputation, never patched in place.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub padding: Spacing,
    pub margin: Spacing,
    pub background: Color,
    pub text_color: Color,
    pub border_radius: i32,
    pub gap: i32,
    pub shadow: Option<Shadow>,
    pub flex_grow: f32,
    pub flex_shrink: f32,
    /// Raw basis: `<= 0` natural size, `(0, 100]` percent, above that pixels.
    pub flex_basis: f32,
    pub has_hover_effect: bool,
    pub has_focus_ring: bool,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            padding: Spacing::ZERO,
            margin: Spacing::ZERO,
            background: Color::WHITE,
            text_color: Color::BLACK,
            border_radius: 0,
            gap: 0,
            shadow: None,
            flex_grow: 0.0,
            flex_shrink: 0.0,
            flex_basis: 0.0,
            has_hover_effect: false,
            has_focus_ring: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

fn set_side(spacing: &mut Spacing, side: Side, value: i32) {
    match side {
        Side::All => *spacing = Spacing::all(value),
        Side::X => {
            spacing.left = value;
            spacing.right = value;
        }
        Side::Y => {
            spacing.top = value;
            spacing.bottom = value;
        }
        Side::Top => spacing.top = value,
        Side::Right => spacing.right = value,
        Side::Bottom => spacing.bottom = value,
        Side::Left => spacing.left = value,
    }
}

/// Look a colour reference up and rank it: semantic tone 2, palette 1,
/// opacity-only 0. Unknown names yield `None`.
fn lookup_color(color: &ColorRef, table: &StyleTable) -> Option<(u8, Color)> {
    let (rank, base) = match table.tones.get(&color.key()) {
        Some(tone) => (2, *tone),
        None => {
            let base = *table.colors.get(&color.key())?;
            (if color.opacity.is_some() { 0 } else { 1 }, base)
        }
    };
    let resolved = match color.opacity {
        Some(pct) => base.with_opacity(pct),
        None => base,
    };
    Some((rank, resolved))
}

/// Resolve a tag set against a table.
///
/// Tags are visited in the set's sorted order. [`Side`] sorts by
/// specificity, so `p-4` is applied before `px-2` before `pl-1`, and equal
/// sides apply smaller values first. The last write wins. Unknown tags and unknown table keys are ignored.
pub fn resolve(tags: &TagSet, table: &StyleTable) -> ComputedStyle {
    let mut style = ComputedStyle::default();
    let mut background: Option<(u8, Color)> = None;
    let mut text: Option<(u8, Color)> = None;

    for tag in tags.iter() {
        match tag {
            StyleTag::Padding(side, steps) => set_side(&mut style.padding, *side, table.spacing(*steps)),
            StyleTag::Margin(side, steps) => set_side(&mut style.margin, *side, table.spacing(*steps)),
            StyleTag::Gap(steps) => style.gap = table.spacing(*steps),
            StyleTag::Background(color) => merge_color(&mut background, color, table),
            StyleTag::TextColor(color) => merge_color(&mut text, color, table),
            StyleTag::Rounded(name) => {
                if let Some(radius) = table.radii.get(name) {
                    style.border_radius = *radius;
                }
            }
            StyleTag::Shadow(name) if name == "none" => style.shadow = None,
            StyleTag::Shadow(name) => {
                if let Some(shadow) = table.shadows.get(name) {
                    style.shadow = Some(*shadow);
                }
            }
            StyleTag::Grow(w) => style.flex_grow = *w as f32,
            StyleTag::Shrink(w) => style.flex_shrink = *w as f32,
            StyleTag::Basis(v) => style.flex_basis = *v as f32,
            StyleTag::HoverEffect => style.has_hover_effect = true,
            StyleTag::FocusRing => style.has_focus_ring = true,
            StyleTag::Unknown(_) => {}
        }
    }

    if let Some((_, color)) = background {
        style.background = color;
    }
    if let Some((_, color)) = text {
        style.text_color = color;
    }
    style
}

fn merge_color(current: &mut Option<(u8, Color)>, color: &ColorRef, table: &StyleTable) {
    if let Some((rank, resolved)) = lookup_color(color, table) {
        match current {
            Some((held, _)) if *held > rank => {}
            _ => *current = Some((rank, resolved)),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
