//! # panelkit
//!
//! A retained-mode panel composition engine: an element tree styled with
//! utility-class tags, laid out with flexbox, list and grid containers,
//! clipped with optionally rounded bounds, and driven by a hit-testing
//! input dispatcher with focus, hover and drag-to-scroll.
//!
//! The engine produces no pixels and shapes no text. Hosts plug in a
//! [`paint::Surface`] and a [`text::TextMeasure`] and feed
//! [`event::InputEvent`]s; everything in between is here.
//!
//! ## Core Systems
//!
//! - **[`geometry`]**: Offset, Size, Region, Spacing and clip bounds
//! - **[`style`]**: Utility-class tokenizer, style tags, style table, computed style
//! - **[`element`]**: Slotmap-backed element arena with dirty/generation tracking
//! - **[`layout`]**: Flex, list, grid and absolute layout, plus the layout pass
//! - **[`text`]**: Text measurement boundary and per-frame memo
//! - **[`paint`]**: Paint-order pass over a host surface
//! - **[`event`]**: Input events, key bindings, notifications, dispatcher
//! - **[`engine`]**: Frame driver tying everything together
//! - **[`testing`]**: Headless pilot and snapshot helpers

// Foundation
pub mod config;
pub mod error;
pub mod geometry;

// Core systems
pub mod element;
pub mod layout;
pub mod style;
pub mod text;

// Input and output
pub mod event;
pub mod paint;

// Driver
pub mod engine;
pub mod testing;

pub use config::EngineConfig;
pub use element::{ElementData, ElementId, ElementTree};
pub use engine::Engine;
pub use error::EngineError;
