//! Linear list layout.
//!
//! Children are stacked along one axis from the viewport origin. Margins of
//! neighbouring children are summed, not collapsed, and every child spans the
//! full cross extent of the viewport minus its own cross margins.

use super::Axis;
use crate::geometry::{Region, Size, Spacing};

/// One list child: its natural size and margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListItem {
    pub size: Size,
    pub margin: Spacing,
}

impl ListItem {
    pub fn new(size: Size) -> Self {
        Self { size, margin: Spacing::ZERO }
    }

    pub fn with_margin(mut self, margin: Spacing) -> Self {
        self.margin = margin;
        self
    }
}

/// Place `items` along `axis` inside `viewport`, separated by `gap`.
pub fn layout_list(axis: Axis, viewport: Region, gap: i32, items: &[ListItem]) -> Vec<Region> {
    let mut cursor = 0;
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            cursor += gap.max(0);
        }
        let m = item.margin;
        let region = match axis {
            Axis::Vertical => {
                cursor += m.top;
                let r = Region::new(
                    viewport.x + m.left,
                    viewport.y + cursor,
                    (viewport.width - m.width()).max(0),
                    item.size.height.max(0),
                );
                cursor += r.height + m.bottom;
                r
            }
            Axis::Horizontal => {
                cursor += m.left;
                let r = Region::new(
                    viewport.x + cursor,
                    viewport.y + m.top,
                    item.size.width.max(0),
                    (viewport.height - m.height()).max(0),
                );
                cursor += r.width + m.right;
                r
            }
        };
        out.push(region);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn vertical_stack_sums_margins() {
        let items = [
            ListItem::new(Size::new(10, 20)).with_margin(Spacing::new(0, 0, 5, 0)),
            ListItem::new(Size::new(10, 30)).with_margin(Spacing::new(3, 4, 0, 2)),
        ];
        let out = layout_list(Axis::Vertical, Region::new(0, 0, 100, 200), 0, &items);
        assert_eq!(out, vec![Region::new(0, 0, 100, 20), Region::new(2, 28, 94, 30)]);
    }

    #[test]
    fn horizontal_with_gap() {
        let items = [ListItem::new(Size::new(15, 1)), ListItem::new(Size::new(25, 1))];
        let out = layout_list(Axis::Horizontal, Region::new(5, 5, 100, 40), 10, &items);
        assert_eq!(out, vec![Region::new(5, 5, 15, 40), Region::new(30, 5, 25, 40)]);
    }

    #[test]
    fn overflow_runs_past_viewport() {
        let items = [ListItem::new(Size::new(0, 80)); 3];
        let out = layout_list(Axis::Vertical, Region::new(0, 0, 10, 100), 0, &items);
        assert_eq!(out[2].y, 160);
    }
}
