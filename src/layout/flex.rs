//! Row/column flexbox with wrapping.
//!
//! [`layout_flex`] is a pure function: it takes a container's content box and
//! per-child measurements with bases already resolved to pixels, and returns
//! one box per child. It runs in six steps:
//!
//! 1. measure each item's outer main size and break into lines (if wrapping);
//! 2. if wrapped content still overflows, scale everything down uniformly
//!    once and rebuild the lines;
//! 3. grow or shrink items within each line, floor-rounded, then nudge by
//!    single pixels left to right until the line is exactly full;
//! 4. justify along the main axis, mirroring for reversed containers;
//! 5. align within each line on the cross axis;
//! 6. advance the cross cursor, backwards for wrap-reverse.

use tracing::trace;

use super::{Align, Axis, FlexLayout, Justify};
use crate::geometry::{Region, Spacing};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// One child as seen by the flex algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlexItem {
    /// Resolved main-axis content size before grow/shrink.
    pub basis: i32,
    /// Natural cross-axis content size.
    pub cross: i32,
    pub margin: Spacing,
    pub grow: f32,
    pub shrink: f32,
}

impl FlexItem {
    /// An item with the given basis and cross size, no margin and no weights.
    pub fn new(basis: i32, cross: i32) -> Self {
        Self { basis, cross, margin: Spacing::ZERO, grow: 0.0, shrink: 0.0 }
    }

    pub fn with_grow(mut self, grow: f32) -> Self {
        self.grow = grow;
        self
    }

    pub fn with_shrink(mut self, shrink: f32) -> Self {
        self.shrink = shrink;
        self
    }

    pub fn with_margin(mut self, margin: Spacing) -> Self {
        self.margin = margin;
        self
    }
}

/// Container-level inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlexContainer {
    pub layout: FlexLayout,
    /// The container's content box (inside padding).
    pub bounds: Region,
    pub gap: i32,
    /// Scroll-enabled main axis: overflow is scrolled, never downscaled.
    pub scroll_main: bool,
    pub scroll_cross: bool,
}

impl FlexContainer {
    pub fn new(layout: FlexLayout, bounds: Region) -> Self {
        Self { layout, bounds, gap: 0, scroll_main: false, scroll_cross: false }
    }

    pub fn with_gap(mut self, gap: i32) -> Self {
        self.gap = gap;
        self
    }
}

// ---------------------------------------------------------------------------
// Axis mapping
// ---------------------------------------------------------------------------

/// An item translated into main/cross terms.
#[derive(Debug, Clone, Copy)]
struct Item {
    basis: i32,
    cross: i32,
    main_before: i32,
    main_after: i32,
    cross_before: i32,
    cross_after: i32,
    grow: f64,
    shrink: f64,
}

impl Item {
    fn from_flex(item: &FlexItem, axis: Axis) -> Self {
        let m = item.margin;
        let (main_before, main_after, cross_before, cross_after) = match axis {
            Axis::Horizontal => (m.left, m.right, m.top, m.bottom),
            Axis::Vertical => (m.top, m.bottom, m.left, m.right),
        };
        Self {
            basis: item.basis.max(0),
            cross: item.cross.max(0),
            main_before,
            main_after,
            cross_before,
            cross_after,
            grow: f64::from(item.grow.max(0.0)),
            shrink: f64::from(item.shrink.max(0.0)),
        }
    }

    fn scaled(&self, k: f64) -> Self {
        let s = |v: i32| (f64::from(v) * k).floor() as i32;
        Self {
            basis: s(self.basis),
            cross: s(self.cross),
            main_before: s(self.main_before),
            main_after: s(self.main_after),
            cross_before: s(self.cross_before),
            cross_after: s(self.cross_after),
            ..*self
        }
    }

    fn main_margins(&self) -> i32 {
        self.main_before + self.main_after
    }

    fn outer_main(&self) -> i32 {
        self.basis + self.main_margins()
    }

    fn outer_cross(&self) -> i32 {
        self.cross + self.cross_before + self.cross_after
    }
}

/// A run of consecutive items sharing a cross band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Line {
    start: usize,
    end: usize,
    /// Outer main size of the members plus gaps.
    used: i32,
    cross: i32,
}

// ---------------------------------------------------------------------------
// Algorithm
// ---------------------------------------------------------------------------

/// Lay out `items` inside `container`. Returns one box per item, in order.
pub fn layout_flex(container: &FlexContainer, items: &[FlexItem]) -> Vec<Region> {
    if items.is_empty() {
        return Vec::new();
    }
    let layout = container.layout;
    let b = container.bounds;
    let (main_extent, cross_extent) = match layout.axis {
        Axis::Horizontal => (b.width.max(0), b.height.max(0)),
        Axis::Vertical => (b.height.max(0), b.width.max(0)),
    };

    let mut items: Vec<Item> = items.iter().map(|i| Item::from_flex(i, layout.axis)).collect();
    let mut gap = container.gap.max(0);

    // Step 1
    let mut lines = build_lines(&items, gap, main_extent, cross_extent, layout.wrap.wraps());

    // Step 2
    if layout.wrap.wraps() {
        let needed_main = lines.iter().map(|l| l.used).max().unwrap_or(0);
        let needed_cross = lines.iter().map(|l| l.cross).sum::<i32>()
            + gap * (lines.len() as i32 - 1);
        let mut k: f64 = 1.0;
        if !container.scroll_main && needed_main > main_extent {
            k = k.min(f64::from(main_extent) / f64::from(needed_main));
        }
        if !container.scroll_cross && needed_cross > cross_extent {
            k = k.min(f64::from(cross_extent) / f64::from(needed_cross));
        }
        if k < 1.0 {
            trace!(k, needed_main, needed_cross, "flex uniform downscale");
            items = items.iter().map(|i| i.scaled(k)).collect();
            gap = (f64::from(gap) * k).floor() as i32;
            lines = build_lines(&items, gap, main_extent, cross_extent, true);
        }
    }

    // Steps 3-6
    let mut sizes: Vec<i32> = items.iter().map(|i| i.basis).collect();
    let mut out = vec![Region::EMPTY; items.len()];
    let reverse_lines = matches!(layout.wrap, super::FlexWrap::WrapReverse);
    let mut cross_cursor = if reverse_lines { cross_extent } else { 0 };

    for line in &lines {
        let members = &items[line.start..line.end];
        let line_sizes = &mut sizes[line.start..line.end];
        distribute(members, line_sizes, main_extent - line.used);

        let count = members.len() as i32;
        let used: i32 = members
            .iter()
            .zip(line_sizes.iter())
            .map(|(item, size)| size + item.main_margins())
            .sum::<i32>()
            + gap * (count - 1);
        let leftover = (main_extent - used).max(0);

        let line_origin = if reverse_lines { cross_cursor - line.cross } else { cross_cursor };
        let mut main_cursor = 0;
        for (i, (item, &size)) in members.iter().zip(line_sizes.iter()).enumerate() {
            let main_pos = main_cursor + justify_offset(layout.justify, leftover, i as i32, count)
                + item.main_before;
            main_cursor += item.outer_main() - item.basis + size + gap;

            let (cross_pos, cross_size) = align(layout.align, item, line_origin, line.cross);
            let main_pos = if layout.reverse { main_extent - main_pos - size } else { main_pos };
            out[line.start + i] = match layout.axis {
                Axis::Horizontal => Region::new(b.x + main_pos, b.y + cross_pos, size, cross_size),
                Axis::Vertical => Region::new(b.x + cross_pos, b.y + main_pos, cross_size, size),
            };
        }

        if reverse_lines {
            cross_cursor -= line.cross + gap;
        } else {
            cross_cursor += line.cross + gap;
        }
    }
    out
}

/// Main and cross extent `items` need when lines may be at most
/// `main_extent` long. Returned as `(main, cross)`.
///
/// A wrapping layout stacks its lines, so the cross extent is the sum of the
/// line cross sizes plus the gaps between lines. Without wrapping everything
/// sits on one line.
pub fn flex_content_extent(
    layout: FlexLayout,
    main_extent: i32,
    gap: i32,
    items: &[FlexItem],
) -> (i32, i32) {
    if items.is_empty() {
        return (0, 0);
    }
    let items: Vec<Item> = items.iter().map(|i| Item::from_flex(i, layout.axis)).collect();
    let gap = gap.max(0);
    if !layout.wrap.wraps() {
        let main = items.iter().map(Item::outer_main).sum::<i32>() + gap * (items.len() as i32 - 1);
        let cross = items.iter().map(Item::outer_cross).max().unwrap_or(0);
        return (main, cross);
    }
    let lines = build_lines(&items, gap, main_extent.max(0), 0, true);
    let main = lines.iter().map(|l| l.used).max().unwrap_or(0);
    let cross = lines.iter().map(|l| l.cross).sum::<i32>() + gap * (lines.len() as i32 - 1);
    (main, cross)
}

/// Step 1: break items into lines.
fn build_lines(items: &[Item], gap: i32, main_extent: i32, cross_extent: i32, wrap: bool) -> Vec<Line> {
    let mut lines: Vec<Line> = Vec::new();
    let mut current = Line { start: 0, end: 0, used: 0, cross: 0 };
    for (i, item) in items.iter().enumerate() {
        let outer = item.outer_main();
        let empty = current.end == current.start;
        if wrap && !empty && current.used + gap + outer > main_extent {
            lines.push(current);
            current = Line { start: i, end: i, used: 0, cross: 0 };
        }
        let empty = current.end == current.start;
        current.used += if empty { outer } else { gap + outer };
        current.cross = current.cross.max(item.outer_cross());
        current.end = i + 1;
    }
    lines.push(current);
    if !wrap {
        for line in &mut lines {
            line.cross = cross_extent;
        }
    }
    lines
}

/// Step 3: grow into `remaining` space or shrink out of a deficit.
fn distribute(items: &[Item], sizes: &mut [i32], remaining: i32) {
    if remaining > 0 {
        let total: f64 = items.iter().map(|i| i.grow).sum();
        if total <= 0.0 {
            return;
        }
        let mut given = 0;
        for (item, size) in items.iter().zip(sizes.iter_mut()) {
            let delta = (f64::from(remaining) * item.grow / total).floor() as i32;
            *size += delta;
            given += delta;
        }
        let mut left = remaining - given;
        while left > 0 {
            for (item, size) in items.iter().zip(sizes.iter_mut()) {
                if left == 0 {
                    break;
                }
                if item.grow > 0.0 {
                    *size += 1;
                    left -= 1;
                }
            }
        }
    } else if remaining < 0 {
        let deficit = -remaining;
        let weight = |item: &Item| item.shrink * f64::from(item.basis);
        let total: f64 = items.iter().map(weight).sum();
        if total <= 0.0 {
            return;
        }
        let mut taken = 0;
        for (item, size) in items.iter().zip(sizes.iter_mut()) {
            let delta = ((f64::from(deficit) * weight(item) / total).floor() as i32).min(*size);
            *size -= delta;
            taken += delta;
        }
        let mut left = deficit - taken;
        while left > 0 {
            let mut progressed = false;
            for (item, size) in items.iter().zip(sizes.iter_mut()) {
                if left == 0 {
                    break;
                }
                if weight(item) > 0.0 && *size > 0 {
                    *size -= 1;
                    left -= 1;
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }
    }
}

/// Step 4: extra main offset before item `i` of `n`.
fn justify_offset(justify: Justify, leftover: i32, i: i32, n: i32) -> i32 {
    let share = |num: i32, den: i32| -> i32 {
        if den <= 0 {
            0
        } else {
            (i64::from(leftover) * i64::from(num) / i64::from(den)) as i32
        }
    };
    match justify {
        Justify::Start => 0,
        Justify::End => leftover,
        Justify::Center => leftover / 2,
        Justify::SpaceBetween => share(i, n - 1),
        Justify::SpaceAround => share(2 * i + 1, 2 * n),
        Justify::SpaceEvenly => share(i + 1, n + 1),
    }
}

/// Step 5: cross position and size of `item` within a line.
fn align(align: Align, item: &Item, line_origin: i32, line_cross: i32) -> (i32, i32) {
    match align {
        Align::Stretch => (
            line_origin + item.cross_before,
            (line_cross - item.cross_before - item.cross_after).max(0),
        ),
        Align::Start => (line_origin + item.cross_before, item.cross),
        Align::End => (line_origin + line_cross - item.cross_after - item.cross, item.cross),
        Align::Center => (
            line_origin + item.cross_before + (line_cross - item.outer_cross()) / 2,
            item.cross,
        ),
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::FlexWrap;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn row(width: i32, height: i32) -> FlexContainer {
        FlexContainer::new(FlexLayout::row(), Region::new(0, 0, width, height))
    }

    fn widths(boxes: &[Region]) -> Vec<i32> {
        boxes.iter().map(|r| r.width).collect()
    }

    fn xs(boxes: &[Region]) -> Vec<i32> {
        boxes.iter().map(|r| r.x).collect()
    }

    // -----------------------------------------------------------------------
    // Worked examples
    // -----------------------------------------------------------------------

    #[test]
    fn fixed_bases_fill_with_gaps() {
        let items = [FlexItem::new(100, 20); 3];
        let out = layout_flex(&row(300, 40).with_gap(10), &items);
        assert_eq!(widths(&out), vec![100, 100, 100]);
        assert_eq!(xs(&out), vec![0, 110, 220]);
    }

    #[test]
    fn grow_splits_remaining_evenly() {
        let items = [FlexItem::new(50, 20).with_grow(1.0); 3];
        let out = layout_flex(&row(300, 40), &items);
        assert_eq!(widths(&out), vec![100, 100, 100]);
        assert_eq!(xs(&out), vec![0, 100, 200]);
    }

    #[test]
    fn shrink_weighted_by_basis() {
        let items = [FlexItem::new(60, 20).with_shrink(1.0); 2];
        let out = layout_flex(&row(100, 40), &items);
        assert_eq!(widths(&out), vec![50, 50]);
        assert_eq!(xs(&out), vec![0, 50]);
    }

    // -----------------------------------------------------------------------
    // Distribution
    // -----------------------------------------------------------------------

    #[test]
    fn zero_weights_keep_basis() {
        let items = [FlexItem::new(40, 10), FlexItem::new(70, 10)];
        assert_eq!(widths(&layout_flex(&row(300, 10), &items)), vec![40, 70]);
        assert_eq!(widths(&layout_flex(&row(50, 10), &items)), vec![40, 70]);
    }

    #[test]
    fn pixel_correction_goes_left_to_right() {
        // 100 / 3 = 33 each, one pixel left over.
        let items = [FlexItem::new(0, 10).with_grow(1.0); 3];
        assert_eq!(widths(&layout_flex(&row(100, 10), &items)), vec![34, 33, 33]);
    }

    #[test]
    fn unequal_grow_weights() {
        let items = [
            FlexItem::new(0, 10).with_grow(1.0),
            FlexItem::new(0, 10).with_grow(2.0),
            FlexItem::new(0, 10),
        ];
        assert_eq!(widths(&layout_flex(&row(90, 10), &items)), vec![30, 60, 0]);
    }

    #[test]
    fn shrink_never_goes_below_zero_content() {
        let items = [
            FlexItem::new(10, 10).with_shrink(1.0),
            FlexItem::new(100, 10).with_shrink(1.0),
        ];
        let out = layout_flex(&row(20, 10), &items);
        assert!(out.iter().all(|r| r.width >= 0));
        assert_eq!(out.iter().map(|r| r.width).sum::<i32>(), 20);
    }

    #[test]
    fn margins_count_against_space() {
        let m = Spacing::new(0, 5, 0, 5);
        let items = [FlexItem::new(0, 10).with_grow(1.0).with_margin(m); 2];
        let out = layout_flex(&row(100, 10), &items);
        assert_eq!(widths(&out), vec![40, 40]);
        assert_eq!(xs(&out), vec![5, 55]);
    }

    // -----------------------------------------------------------------------
    // Justify and reverse
    // -----------------------------------------------------------------------

    #[test]
    fn justify_modes() {
        let items = [FlexItem::new(20, 10); 3];
        let cases = [
            (Justify::Start, vec![0, 20, 40]),
            (Justify::End, vec![40, 60, 80]),
            (Justify::Center, vec![20, 40, 60]),
            (Justify::SpaceBetween, vec![0, 40, 80]),
            (Justify::SpaceAround, vec![6, 40, 73]),
            (Justify::SpaceEvenly, vec![10, 40, 70]),
        ];
        for (justify, expected) in cases {
            let mut c = row(100, 10);
            c.layout = c.layout.with_justify(justify);
            assert_eq!(xs(&layout_flex(&c, &items)), expected, "{justify:?}");
        }
    }

    #[test]
    fn reverse_mirrors_positions() {
        let items = [FlexItem::new(20, 10), FlexItem::new(30, 10)];
        let mut c = row(100, 10).with_gap(5);
        c.layout = c.layout.reversed();
        let out = layout_flex(&c, &items);
        assert_eq!(xs(&out), vec![80, 45]);

        c.layout = c.layout.with_justify(Justify::End);
        assert_eq!(xs(&layout_flex(&c, &items)), vec![35, 0]);
    }

    #[test]
    fn column_uses_vertical_main_axis() {
        let c = FlexContainer::new(FlexLayout::column(), Region::new(10, 20, 50, 100));
        let items = [FlexItem::new(30, 0), FlexItem::new(0, 0).with_grow(1.0)];
        let out = layout_flex(&c, &items);
        assert_eq!(out, vec![Region::new(10, 20, 50, 30), Region::new(10, 50, 50, 70)]);
    }

    // -----------------------------------------------------------------------
    // Cross axis and wrapping
    // -----------------------------------------------------------------------

    #[test]
    fn align_modes_in_single_line() {
        let items = [FlexItem::new(10, 10)];
        let cases = [
            (Align::Stretch, (0, 40)),
            (Align::Start, (0, 10)),
            (Align::End, (30, 10)),
            (Align::Center, (15, 10)),
        ];
        for (mode, (y, h)) in cases {
            let mut c = row(100, 40);
            c.layout = c.layout.with_align(mode);
            let out = layout_flex(&c, &items);
            assert_eq!((out[0].y, out[0].height), (y, h), "{mode:?}");
        }
    }

    #[test]
    fn wrap_breaks_lines_and_stacks() {
        let mut c = row(100, 100).with_gap(10);
        c.layout = c.layout.with_wrap(FlexWrap::Wrap).with_align(Align::Start);
        let items = [FlexItem::new(40, 20), FlexItem::new(40, 30), FlexItem::new(40, 10)];
        let out = layout_flex(&c, &items);
        assert_eq!(
            out,
            vec![
                Region::new(0, 0, 40, 20),
                Region::new(50, 0, 40, 30),
                Region::new(0, 40, 40, 10),
            ]
        );
    }

    #[test]
    fn wrap_reverse_stacks_from_far_edge() {
        let mut c = row(100, 100);
        c.layout = c.layout.with_wrap(FlexWrap::WrapReverse);
        let items = [FlexItem::new(60, 20), FlexItem::new(60, 30)];
        let out = layout_flex(&c, &items);
        assert_eq!(out, vec![Region::new(0, 80, 60, 20), Region::new(0, 50, 60, 30)]);
    }

    #[test]
    fn wrap_downscales_when_lines_overflow_cross() {
        let mut c = row(100, 50);
        c.layout = c.layout.with_wrap(FlexWrap::Wrap).with_align(Align::Start);
        // Two lines of height 50 need 100 of cross space; k = 0.5.
        let items = [FlexItem::new(80, 50), FlexItem::new(80, 50)];
        let out = layout_flex(&c, &items);
        // Scaled to 40 wide, both fit on one line.
        assert_eq!(out, vec![Region::new(0, 0, 40, 25), Region::new(40, 0, 40, 25)]);
    }

    #[test]
    fn scroll_cross_axis_skips_downscale() {
        let mut c = row(100, 50);
        c.layout = c.layout.with_wrap(FlexWrap::Wrap).with_align(Align::Start);
        c.scroll_cross = true;
        let items = [FlexItem::new(80, 50), FlexItem::new(80, 50)];
        let out = layout_flex(&c, &items);
        assert_eq!(out, vec![Region::new(0, 0, 80, 50), Region::new(0, 50, 80, 50)]);
    }

    #[test]
    fn empty_and_degenerate_containers() {
        assert!(layout_flex(&row(100, 10), &[]).is_empty());
        let out = layout_flex(&row(-5, 0), &[FlexItem::new(10, 10).with_shrink(1.0)]);
        assert_eq!(out[0].width, 0);
    }

    #[test]
    fn content_extent_stacks_wrapped_lines() {
        let items = [FlexItem::new(120, 30); 3];
        let wrapping = FlexLayout::row().with_wrap(FlexWrap::Wrap);
        assert_eq!(flex_content_extent(wrapping, 300, 0, &items), (240, 60));
        assert_eq!(flex_content_extent(wrapping, 300, 5, &items), (245, 65));
        assert_eq!(flex_content_extent(FlexLayout::row(), 300, 0, &items), (360, 30));
        assert_eq!(flex_content_extent(wrapping, 300, 0, &[]), (0, 0));
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    fn item() -> impl Strategy<Value = FlexItem> {
        (0..200i32, 0u8..4, 0u8..4).prop_map(|(basis, grow, shrink)| {
            FlexItem::new(basis, 10).with_grow(f32::from(grow)).with_shrink(f32::from(shrink))
        })
    }

    proptest! {
        #[test]
        fn no_wrap_row_fills_extent(
            width in 0..600i32,
            gap in 0..20i32,
            items in prop::collection::vec(item(), 1..8),
        ) {
            let out = layout_flex(&row(width, 10).with_gap(gap), &items);
            let gaps = gap * (items.len() as i32 - 1);
            let used: i32 = items.iter().map(|i| i.basis).sum::<i32>() + gaps;
            let total: i32 = out.iter().map(|r| r.width).sum::<i32>() + gaps;
            let growers = items.iter().any(|i| i.grow > 0.0);
            let shrinkers = items.iter().any(|i| i.shrink > 0.0 && i.basis > 0);

            if used < width && growers {
                prop_assert_eq!(total, width);
            } else if used > width && shrinkers {
                let floored = items
                    .iter()
                    .zip(&out)
                    .filter(|(i, _)| i.shrink > 0.0 && i.basis > 0)
                    .all(|(_, r)| r.width == 0);
                prop_assert!(total == width || floored);
            } else {
                prop_assert_eq!(widths(&out), items.iter().map(|i| i.basis).collect::<Vec<_>>());
            }
            prop_assert!(out.iter().all(|r| r.width >= 0));
        }
    }
}
