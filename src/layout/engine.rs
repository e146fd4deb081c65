//! The layout pass.
//!
//! [`LayoutEngine`] walks the element tree from the root, assigning every
//! visible element its calculated box, clip and effective z-index. Clean
//! subtrees whose box and clip did not move are skipped. Scroll containers
//! are always revisited so their content size tracks their children.

use tracing::trace;

use super::flex::{flex_content_extent, layout_flex, FlexContainer, FlexItem};
use super::grid::layout_grid;
use super::list::{layout_list, ListItem};
use super::{Axis, LayoutKind};
use crate::element::{ElementId, ElementKind, ElementTree, Layer, ScrollAxes, ZIndex};
use crate::geometry::{ClipBounds, Offset, Region, Size, Spacing};
use crate::style::ComputedStyle;
use crate::text::{TextCache, TextMeasure};

/// Counters from the last pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutStats {
    /// Elements whose box was (re)committed.
    pub placed: usize,
    /// Clean elements whose subtree was skipped.
    pub skipped: usize,
}

/// Drives layout over an [`ElementTree`].
#[derive(Debug, Default)]
pub struct LayoutEngine {
    cache: TextCache,
    last: LayoutStats,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The text memo shared with the paint pass for this frame.
    pub fn text_cache(&mut self) -> &mut TextCache {
        &mut self.cache
    }

    /// Counters from the most recent [`run`](Self::run).
    pub fn last_stats(&self) -> LayoutStats {
        self.last
    }

    /// Lay out the tree inside `viewport`.
    ///
    /// The root takes its requested size, or the viewport's on any axis
    /// where it requested nothing, positioned relative to the viewport.
    pub fn run(
        &mut self,
        tree: &mut ElementTree,
        viewport: Region,
        measure: &dyn TextMeasure,
    ) -> LayoutStats {
        self.cache.begin_frame();
        let mut pass = Pass { tree, measure, cache: &mut self.cache, stats: LayoutStats::default() };
        if let Some(root) = pass.tree.root() {
            if let Some(data) = pass.tree.get(root) {
                let req = data.requested();
                let size = Size::new(
                    if req.width > 0 { req.width } else { viewport.width },
                    if req.height > 0 { req.height } else { viewport.height },
                );
                let size = data.constraints().apply(size, viewport.size());
                let rect = Region::from_parts(viewport.origin() + req.origin(), size);
                let floor = ZIndex::new(Layer::Background, i32::MIN);
                pass.place(root, rect, ClipBounds::rect(viewport), floor);
            }
        }
        self.last = pass.stats;
        trace!(placed = self.last.placed, skipped = self.last.skipped, "layout pass");
        self.last
    }
}

// ---------------------------------------------------------------------------
// Pass
// ---------------------------------------------------------------------------

struct Pass<'a> {
    tree: &'a mut ElementTree,
    measure: &'a dyn TextMeasure,
    cache: &'a mut TextCache,
    stats: LayoutStats,
}

/// Scroll parameters of a container being laid out.
#[derive(Debug, Clone, Copy)]
struct Scrolled {
    offset: Offset,
    axes: ScrollAxes,
}

impl Pass<'_> {
    fn style(&self, id: ElementId) -> std::rc::Rc<ComputedStyle> {
        self.tree.style(id).unwrap_or_default()
    }

    /// Commit `rect` to `id` and lay out its children if anything changed.
    ///
    /// An element lying wholly inside its inherited clip keeps its own
    /// rounded box as clip; otherwise the two are intersected.
    fn place(&mut self, id: ElementId, rect: Region, inherited: ClipBounds, parent_z: ZIndex) {
        let style = self.style(id);
        let Some(data) = self.tree.get(id) else {
            return;
        };
        let own = ClipBounds::rounded(rect, style.border_radius);
        let clip = if !inherited.is_invalid() && inherited.region.intersection(rect) == rect {
            own
        } else {
            own.intersect(&inherited)
        };
        let z = data.z_index().within(parent_z);
        let is_scroll = data.kind.scroll().is_some();
        let needs = data.is_dirty()
            || data.child_dirty
            || data.calculated() != rect
            || data.clip() != clip
            || data.effective_z() != z
            || is_scroll;
        if !needs {
            self.stats.skipped += 1;
            return;
        }
        self.stats.placed += 1;

        let layout = data.kind.layout();
        if let Some(d) = self.tree.get_mut(id) {
            d.calculated = rect;
            d.clip = clip;
            d.effective_z = z;
        }
        if let Some(layout) = layout {
            self.place_children(id, layout, rect.shrink(style.padding), &style, clip, z);
        }
        self.tree.mark_laid_out(id);
    }

    fn place_children(
        &mut self,
        id: ElementId,
        layout: LayoutKind,
        content: Region,
        style: &ComputedStyle,
        clip: ClipBounds,
        z: ZIndex,
    ) {
        let children = self.tree.children(id).to_vec();
        let mut visible = Vec::with_capacity(children.len());
        for child in children {
            debug_assert_eq!(
                self.tree.parent(child),
                Some(id),
                "container lays out a child it does not own"
            );
            if self.tree.get(child).is_some_and(|d| d.is_visible()) {
                visible.push(child);
            } else {
                self.hide_subtree(child);
            }
        }
        if visible.is_empty() {
            if let Some(state) = self.tree.get_mut(id).and_then(|d| d.kind.scroll_mut()) {
                state.set_viewport_size(content.size());
                state.set_content_size(Size::ZERO);
            }
            return;
        }

        let scrolled = self.tree.get(id).and_then(|d| d.kind.scroll()).map(|s| Scrolled {
            offset: s.offset,
            axes: s.axes,
        });
        let Some(scroll) = scrolled else {
            let boxes = self.child_boxes(layout, content, content.size(), style.gap, &visible, None);
            for (child, rect) in visible.iter().zip(boxes) {
                self.place(*child, rect, clip, z);
            }
            return;
        };

        // Scroll container: lay out in content coordinates shifted by the
        // offset, then measure and re-clamp. A clamp that moves the offset
        // needs one more placement round.
        let mut offset = scroll.offset;
        for _ in 0..2 {
            let area = content.translate(-offset);
            let boxes =
                self.child_boxes(layout, area, content.size(), style.gap, &visible, Some(scroll.axes));
            let extent = boxes.iter().fold(Size::ZERO, |acc, r| {
                Size::new(acc.width.max(r.right() - area.x), acc.height.max(r.bottom() - area.y))
            });
            for (child, rect) in visible.iter().zip(boxes) {
                self.place(*child, rect, clip, z);
            }
            let Some(state) = self.tree.get_mut(id).and_then(|d| d.kind.scroll_mut()) else {
                return;
            };
            state.set_viewport_size(content.size());
            state.set_content_size(extent);
            if state.offset == offset {
                return;
            }
            trace!(?id, from = ?offset, to = ?state.offset, "scroll offset clamped");
            offset = state.offset;
        }
    }

    fn hide_subtree(&mut self, id: ElementId) {
        for e in self.tree.walk_depth_first(id) {
            if let Some(d) = self.tree.get_mut(e) {
                d.clip = ClipBounds::INVALID;
            }
            self.tree.mark_laid_out(e);
        }
    }

    /// Boxes for `children` inside `area` according to `layout`.
    fn child_boxes(
        &mut self,
        layout: LayoutKind,
        area: Region,
        avail: Size,
        gap: i32,
        children: &[ElementId],
        scroll: Option<ScrollAxes>,
    ) -> Vec<Region> {
        let area = Region::from_parts(area.origin(), avail);
        match layout {
            LayoutKind::Flex(flex) => {
                let mut items: Vec<FlexItem> =
                    children.iter().map(|c| self.flex_item(*c, flex.axis, avail)).collect();
                let (scroll_main, scroll_cross) = match (scroll, flex.axis) {
                    (None, _) => (false, false),
                    (Some(a), Axis::Horizontal) => (a.x, a.y),
                    (Some(a), Axis::Vertical) => (a.y, a.x),
                };
                let container = FlexContainer { layout: flex, bounds: area, gap, scroll_main, scroll_cross };
                let boxes = layout_flex(&container, &items);
                if self.rewrap_text(children, flex.axis, &boxes, &mut items, avail) {
                    layout_flex(&container, &items)
                } else {
                    boxes
                }
            }
            LayoutKind::List(axis) => {
                let items: Vec<ListItem> = children
                    .iter()
                    .map(|c| ListItem::new(self.natural_size(*c, avail)).with_margin(self.style(*c).margin))
                    .collect();
                layout_list(axis, area, gap, &items)
            }
            LayoutKind::Grid { columns } => {
                let items: Vec<(Size, Spacing)> = children
                    .iter()
                    .map(|c| (self.natural_size(*c, avail), self.style(*c).margin))
                    .collect();
                layout_grid(columns, area, gap, &items)
            }
            LayoutKind::Absolute => children
                .iter()
                .map(|c| {
                    let origin = self.tree.get(*c).map_or(Offset::ZERO, |d| d.requested().origin());
                    Region::from_parts(area.origin() + origin, self.natural_size(*c, avail))
                })
                .collect(),
        }
    }

    /// Wrapped text is measured at the container's width before flex has
    /// sized it. Re-measure each one at the width it was actually given and
    /// update its height in `items`. Returns whether anything changed.
    fn rewrap_text(
        &mut self,
        children: &[ElementId],
        axis: Axis,
        boxes: &[Region],
        items: &mut [FlexItem],
        avail: Size,
    ) -> bool {
        let mut changed = false;
        for ((child, rect), item) in children.iter().zip(boxes).zip(items.iter_mut()) {
            let Some(height) = self.wrapped_height(*child, rect.width, avail) else {
                continue;
            };
            let slot = match axis {
                Axis::Horizontal => &mut item.cross,
                Axis::Vertical if self.style(*child).flex_basis <= 0.0 => &mut item.basis,
                Axis::Vertical => continue,
            };
            if *slot != height {
                trace!(id = ?child, from = *slot, to = height, "wrapped text re-measured");
                *slot = height;
                changed = true;
            }
        }
        changed
    }

    /// Height of a wrapping text leaf laid out `width` wide, or `None` if
    /// `id` is not wrapping text or has a requested height.
    fn wrapped_height(&mut self, id: ElementId, width: i32, avail: Size) -> Option<i32> {
        let style = self.style(id);
        let data = self.tree.get(id)?;
        let ElementKind::Text(text) = &data.kind else {
            return None;
        };
        if !text.wrap || data.requested().height > 0 {
            return None;
        }
        let text = text.text.clone();
        let constraints = data.constraints();
        let inner = (width - style.padding.width()).max(0);
        let lines = self.cache.layout(self.measure, &text, Some(inner)).size.height;
        let size = Size::new(width, lines + style.padding.height());
        Some(constraints.apply(size, avail).height)
    }

    /// Resolve a child's flex basis and natural cross size.
    ///
    /// A raw basis at or below zero means natural size, `(0, 100]` is a
    /// percentage of the container's main extent, anything larger is pixels.
    fn flex_item(&mut self, id: ElementId, axis: Axis, container: Size) -> FlexItem {
        let style = self.style(id);
        let natural = self.natural_size(id, container);
        let (main, cross, extent) = match axis {
            Axis::Horizontal => (natural.width, natural.height, container.width),
            Axis::Vertical => (natural.height, natural.width, container.height),
        };
        let raw = style.flex_basis;
        let basis = if raw <= 0.0 {
            main
        } else if raw <= 100.0 {
            (f64::from(extent) * f64::from(raw) / 100.0).floor() as i32
        } else {
            raw as i32
        };
        FlexItem {
            basis,
            cross,
            margin: style.margin,
            grow: style.flex_grow,
            shrink: style.flex_shrink,
        }
    }

    /// Requested size, falling back per axis to measured content, then
    /// constrained against the parent's content size.
    fn natural_size(&mut self, id: ElementId, avail: Size) -> Size {
        let style = self.style(id);
        let Some(data) = self.tree.get(id) else {
            return Size::ZERO;
        };
        let req = data.requested().size();
        let constraints = data.constraints();
        let measured = if req.width > 0 && req.height > 0 {
            req
        } else {
            match data.kind.clone() {
                ElementKind::Leaf => Size::ZERO,
                ElementKind::Text(text) => {
                    let width = if req.width > 0 { req.width } else { avail.width };
                    let inner = (width - style.padding.width()).max(0);
                    let wrap = text.wrap.then_some(inner);
                    let size = self.cache.layout(self.measure, &text.text, wrap).size;
                    Size::new(size.width + style.padding.width(), size.height + style.padding.height())
                }
                ElementKind::Container(layout) | ElementKind::Scroll { layout, .. } => {
                    self.intrinsic_size(id, layout, avail, &style)
                }
            }
        };
        let size = Size::new(
            if req.width > 0 { req.width } else { measured.width },
            if req.height > 0 { req.height } else { measured.height },
        );
        constraints.apply(size, avail)
    }

    /// Content-derived size of a container with no requested size.
    fn intrinsic_size(
        &mut self,
        id: ElementId,
        layout: LayoutKind,
        avail: Size,
        style: &ComputedStyle,
    ) -> Size {
        let inner = Size::new(
            (avail.width - style.padding.width()).max(0),
            (avail.height - style.padding.height()).max(0),
        );
        let children: Vec<ElementId> = self
            .tree
            .children(id)
            .iter()
            .copied()
            .filter(|c| self.tree.get(*c).is_some_and(|d| d.is_visible()))
            .collect();
        let mut outer = Vec::with_capacity(children.len());
        for child in &children {
            let size = self.natural_size(*child, inner);
            let m = self.style(*child).margin;
            let origin = self.tree.get(*child).map_or(Offset::ZERO, |d| d.requested().origin());
            outer.push((Size::new(size.width + m.width(), size.height + m.height()), origin));
        }
        let gaps = style.gap * (outer.len() as i32 - 1).max(0);
        let stack = |axis: Axis| {
            let main: i32 = outer
                .iter()
                .map(|(s, _)| if axis == Axis::Horizontal { s.width } else { s.height })
                .sum();
            let cross = outer
                .iter()
                .map(|(s, _)| if axis == Axis::Horizontal { s.height } else { s.width })
                .max()
                .unwrap_or(0);
            match axis {
                Axis::Horizontal => Size::new(main + gaps, cross),
                Axis::Vertical => Size::new(cross, main + gaps),
            }
        };
        let content = match layout {
            LayoutKind::Flex(flex) if flex.wrap.wraps() => {
                let items: Vec<FlexItem> =
                    children.iter().map(|c| self.flex_item(*c, flex.axis, inner)).collect();
                let main_extent = match flex.axis {
                    Axis::Horizontal => inner.width,
                    Axis::Vertical => inner.height,
                };
                let (main, cross) = flex_content_extent(flex, main_extent, style.gap, &items);
                match flex.axis {
                    Axis::Horizontal => Size::new(main, cross),
                    Axis::Vertical => Size::new(cross, main),
                }
            }
            LayoutKind::Flex(flex) => stack(flex.axis),
            LayoutKind::List(axis) => stack(axis),
            LayoutKind::Grid { columns } => {
                let columns = usize::from(columns.max(1));
                let widest = outer.iter().map(|(s, _)| s.width).max().unwrap_or(0);
                let rows: Vec<i32> = outer
                    .chunks(columns)
                    .map(|row| row.iter().map(|(s, _)| s.height).max().unwrap_or(0))
                    .collect();
                let row_gaps = style.gap * (rows.len() as i32 - 1).max(0);
                let col_gaps = style.gap * (columns.min(outer.len()) as i32 - 1).max(0);
                Size::new(
                    widest * columns.min(outer.len()) as i32 + col_gaps,
                    rows.iter().sum::<i32>() + row_gaps,
                )
            }
            LayoutKind::Absolute => outer.iter().fold(Size::ZERO, |acc, (s, o)| {
                Size::new(acc.width.max(o.x + s.width), acc.height.max(o.y + s.height))
            }),
        };
        Size::new(
            content.width + style.padding.width(),
            content.height + style.padding.height(),
        )
    }
}

// ===========================================================================
// Tests
// ===========================================================================
