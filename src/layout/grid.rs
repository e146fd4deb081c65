//! Equal-column grid layout.

use crate::geometry::{Region, Size, Spacing};

/// Place children left to right, top to bottom, in `columns` equal columns.
///
/// Each child takes the column width minus its horizontal margins and keeps
/// its natural height. A row is as tall as its tallest outer child.
pub fn layout_grid(
    columns: u16,
    viewport: Region,
    gap: i32,
    items: &[(Size, Spacing)],
) -> Vec<Region> {
    let columns = i32::from(columns.max(1));
    let gap = gap.max(0);
    let column_width = ((viewport.width - gap * (columns - 1)) / columns).max(0);

    let mut out = Vec::with_capacity(items.len());
    let mut y = viewport.y;
    let mut row_height = 0;
    for (i, (size, margin)) in items.iter().enumerate() {
        let column = i as i32 % columns;
        if column == 0 && i > 0 {
            y += row_height + gap;
            row_height = 0;
        }
        let x = viewport.x + column * (column_width + gap);
        let height = size.height.max(0);
        out.push(Region::new(
            x + margin.left,
            y + margin.top,
            (column_width - margin.width()).max(0),
            height,
        ));
        row_height = row_height.max(height + margin.height());
    }
    out
}
