//! The style value table: colours, spacing scale, radius and shadow presets.
//!
//! This is data, not algorithm. The built-in table mirrors a small
//! Tailwind-like palette; hosts can swap or extend it by loading TOML.
//!
//! ```toml
//! spacing_unit = 4
//!
//! [tones]
//! primary = "#2563eb"
//!
//! [radii]
//! lg = 10
//!
//! [shadows.md]
//! color = "#00000040"
//! blur = 6
//! offset_y = 4
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use super::computed::{Color, Shadow};
use crate::error::EngineError;

/// Lookup table consulted by the resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleTable {
    /// Pixels per spacing step (`p-4` → `4 * spacing_unit`).
    pub spacing_unit: i32,
    /// Raw palette colours keyed `name` or `name-shade`.
    pub colors: BTreeMap<String, Color>,
    /// Semantic tones (`primary`, `danger`, ...). These outrank palette
    /// colours when several background tags compete.
    pub tones: BTreeMap<String, Color>,
    /// Corner radius presets. The empty key is bare `rounded`.
    pub radii: BTreeMap<String, i32>,
    /// Shadow presets. The empty key is bare `shadow`; `none` is implicit.
    pub shadows: BTreeMap<String, Shadow>,
}

/// On-disk form: every section optional, merged over the built-in table.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct StyleTableFile {
    spacing_unit: Option<i32>,
    colors: BTreeMap<String, Color>,
    tones: BTreeMap<String, Color>,
    radii: BTreeMap<String, i32>,
    shadows: BTreeMap<String, Shadow>,
}

const PALETTE: &[(&str, [u32; 5])] = &[
    ("slate", [0xf1f5f9, 0xcbd5e1, 0x64748b, 0x334155, 0x0f172a]),
    ("red", [0xfee2e2, 0xfca5a5, 0xef4444, 0xb91c1c, 0x7f1d1d]),
    ("amber", [0xfef3c7, 0xfcd34d, 0xf59e0b, 0xb45309, 0x78350f]),
    ("green", [0xdcfce7, 0x86efac, 0x22c55e, 0x15803d, 0x14532d]),
    ("blue", [0xdbeafe, 0x93c5fd, 0x3b82f6, 0x1d4ed8, 0x1e3a8a]),
];
const SHADES: [u16; 5] = [100, 300, 500, 700, 900];

impl StyleTable {
    /// The built-in table.
    pub fn builtin() -> Self {
        let mut colors = BTreeMap::new();
        colors.insert("white".to_owned(), Color::WHITE);
        colors.insert("black".to_owned(), Color::BLACK);
        colors.insert("transparent".to_owned(), Color::TRANSPARENT);
        for (name, values) in PALETTE {
            for (shade, rgb) in SHADES.iter().zip(values) {
                colors.insert(format!("{name}-{shade}"), Color::from_rgb(*rgb));
            }
        }

        let tones = [
            ("primary", 0x3b82f6),
            ("secondary", 0x64748b),
            ("success", 0x22c55e),
            ("warning", 0xf59e0b),
            ("danger", 0xef4444),
            ("surface", 0xf8fafc),
            ("muted", 0x94a3b8),
        ]
        .into_iter()
        .map(|(name, rgb)| (name.to_owned(), Color::from_rgb(rgb)))
        .collect();

        let radii = [("", 4), ("none", 0), ("sm", 2), ("md", 6), ("lg", 8), ("xl", 12), ("full", 9999)]
            .into_iter()
            .map(|(name, r)| (name.to_owned(), r))
            .collect();

        let shade = Color::new(0, 0, 0, 0x40);
        let shadows = [
            ("sm", Shadow { color: shade, blur: 2, offset_x: 0, offset_y: 1 }),
            ("", Shadow { color: shade, blur: 3, offset_x: 0, offset_y: 1 }),
            ("md", Shadow { color: shade, blur: 6, offset_x: 0, offset_y: 4 }),
            ("lg", Shadow { color: shade, blur: 15, offset_x: 0, offset_y: 10 }),
            ("xl", Shadow { color: shade, blur: 25, offset_x: 0, offset_y: 20 }),
        ]
        .into_iter()
        .map(|(name, s)| (name.to_owned(), s))
        .collect();

        Self { spacing_unit: 4, colors, tones, radii, shadows }
    }

    /// Parse a TOML table and merge it over the built-in values.
    pub fn from_toml(input: &str) -> Result<Self, EngineError> {
        let file: StyleTableFile = toml::from_str(input)?;
        let mut table = Self::builtin();
        if let Some(unit) = file.spacing_unit {
            table.spacing_unit = unit.max(0);
        }
        table.colors.extend(file.colors);
        table.tones.extend(file.tones);
        table.radii.extend(file.radii);
        table.shadows.extend(file.shadows);
        Ok(table)
    }

    /// Pixels for a spacing step.
    pub fn spacing(&self, step: i32) -> i32 {
        step.saturating_mul(self.spacing_unit)
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::builtin()
    }
}
