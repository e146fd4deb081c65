//! Style resolution: utility-class tags → concrete computed style.
//!
//! Elements carry an unordered set of symbolic tags (`p-4`, `bg-primary`,
//! `rounded-lg`, `grow`). The [`tokenizer`] recognises tag shapes, [`tags`]
//! turns them into typed [`StyleTag`]s, and [`computed`] resolves a tag set
//! against a swappable [`StyleTable`] into a [`ComputedStyle`] snapshot.

pub mod computed;
pub mod table;
pub mod tags;
pub mod tokenizer;

pub use computed::{resolve, Color, ComputedStyle, Shadow};
pub use table::StyleTable;
pub use tags::{ColorRef, Side, StyleTag, TagSet};
