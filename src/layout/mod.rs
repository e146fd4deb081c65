//! Layout: per-container algorithms and the pass that drives them.
//!
//! [`flex`] is the row/column flexbox with wrapping, [`list`] and [`grid`]
//! are the simpler scroll-viewport variants, and [`engine`] walks the element
//! tree, resolves constraints and text sizes, and commits calculated boxes,
//! clips and effective z-indices.

pub mod engine;
pub mod flex;
pub mod grid;
pub mod list;

pub use engine::LayoutEngine;
pub use flex::{layout_flex, FlexItem};

// ---------------------------------------------------------------------------
// Container parameters
// ---------------------------------------------------------------------------

/// A layout axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    Horizontal,
    #[default]
    Vertical,
}

/// Main-axis distribution of leftover space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justify {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Cross-axis placement of items within a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    Start,
    Center,
    End,
    #[default]
    Stretch,
}

/// Line wrapping mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexWrap {
    #[default]
    NoWrap,
    Wrap,
    /// Lines stack from the far cross edge backwards.
    WrapReverse,
}

impl FlexWrap {
    pub fn wraps(self) -> bool {
        !matches!(self, FlexWrap::NoWrap)
    }
}

/// Flex container parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlexLayout {
    /// `Horizontal` is a row, `Vertical` a column.
    pub axis: Axis,
    /// Mirror the main axis (row-reverse / column-reverse).
    pub reverse: bool,
    pub wrap: FlexWrap,
    pub justify: Justify,
    pub align: Align,
}

impl FlexLayout {
    pub fn row() -> Self {
        Self { axis: Axis::Horizontal, ..Self::default() }
    }

    pub fn column() -> Self {
        Self { axis: Axis::Vertical, ..Self::default() }
    }

    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }

    pub fn with_wrap(mut self, wrap: FlexWrap) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn with_justify(mut self, justify: Justify) -> Self {
        self.justify = justify;
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

/// How a container arranges its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Flex(FlexLayout),
    /// Sequential stacking along one axis, full cross extent.
    List(Axis),
    /// Equal-width columns, rows as tall as their tallest member.
    Grid { columns: u16 },
    /// Children keep their requested position relative to the content box.
    Absolute,
}

impl Default for LayoutKind {
    fn default() -> Self {
        LayoutKind::Flex(FlexLayout::default())
    }
}
