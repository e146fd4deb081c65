//! Element tree: nodes, ownership, dirty tracking, behaviors and scrolling.

pub mod behavior;
pub mod node;
pub mod scroll;
pub mod tree;

pub use behavior::{Behavior, PaintContext, PointerContext};
pub use node::{Constraints, ElementData, ElementId, ElementKind, Layer, TextContent, ZIndex};
pub use scroll::{DragOutcome, Gesture, ScrollAxes, ScrollState, ScrollbarState};
pub use tree::ElementTree;
