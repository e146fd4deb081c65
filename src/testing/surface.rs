//! A [`Surface`] that records what it was asked to draw.

use crate::geometry::{ClipBounds, Region};
use crate::paint::{BoxState, Surface};
use crate::style::{Color, ComputedStyle};

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    PushClip(ClipBounds),
    PopClip,
    Box { bounds: Region, background: Color },
    Text { bounds: Region, lines: Vec<String>, color: Color },
}

/// Records every call in order, and the box states seen along the way.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
    /// Box state of each `draw_box` call, parallel to the `Box` ops.
    pub states: Vec<BoxState>,
    depth: usize,
    max_depth: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clip nesting.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Deepest clip nesting reached.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Bounds of every box drawn, in paint order.
    pub fn boxes(&self) -> Vec<Region> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Box { bounds, .. } => Some(*bounds),
                _ => None,
            })
            .collect()
    }

    /// Every text line drawn, in paint order.
    pub fn text(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { lines, .. } => Some(lines.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
        self.states.clear();
        self.depth = 0;
        self.max_depth = 0;
    }
}

impl Surface for RecordingSurface {
    fn push_clip(&mut self, clip: ClipBounds) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        self.ops.push(DrawOp::PushClip(clip));
    }

    fn pop_clip(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.ops.push(DrawOp::PopClip);
    }

    fn draw_box(&mut self, bounds: Region, style: &ComputedStyle, state: BoxState) {
        self.ops.push(DrawOp::Box { bounds, background: style.background });
        self.states.push(state);
    }

    fn draw_text(&mut self, bounds: Region, lines: &[String], color: Color) {
        self.ops.push(DrawOp::Text { bounds, lines: lines.to_vec(), color });
    }
}
