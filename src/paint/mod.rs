//! Paint boundary and the paint-order pass.
//!
//! The engine does not produce pixels. It walks the laid-out tree in
//! stacking order and drives a host [`Surface`]: push the element's clip,
//! draw its box, its text and whatever its behavior paints, pop the clip.
//! Every element drawn is marked "rendered this frame"; the dispatcher only
//! routes keys to elements the user could actually see.

use tracing::trace;

use crate::element::{ElementId, ElementKind, ElementTree, PaintContext};
use crate::geometry::{ClipBounds, Region};
use crate::style::{Color, ComputedStyle};
use crate::text::{TextCache, TextMeasure};

/// Interaction state passed along with a box so backends can draw hover
/// effects and focus rings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoxState {
    pub hovered: bool,
    pub focused: bool,
}

/// Drawing target supplied by the host.
pub trait Surface {
    /// Restrict drawing to `clip` until the matching [`pop_clip`](Self::pop_clip).
    fn push_clip(&mut self, clip: ClipBounds);

    fn pop_clip(&mut self);

    /// Draw an element's background, radius and shadow.
    fn draw_box(&mut self, bounds: Region, style: &ComputedStyle, state: BoxState);

    /// Draw pre-wrapped lines of text starting at the top-left of `bounds`.
    fn draw_text(&mut self, bounds: Region, lines: &[String], color: Color);
}

/// Visible elements with a non-empty clip, in paint order: effective z-index
/// ascending, ties in depth-first tree order.
pub fn paint_order(tree: &ElementTree) -> Vec<ElementId> {
    let mut order = Vec::new();
    let Some(root) = tree.root() else {
        return order;
    };
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let Some(data) = tree.get(id) else {
            continue;
        };
        if !data.is_visible() {
            continue;
        }
        if !data.clip().is_invalid() {
            order.push(id);
        }
        stack.extend(tree.children(id).iter().rev().copied());
    }
    // Stable: equal z keeps tree order, so parents paint under children.
    order.sort_by_key(|id| tree.get(*id).map(|d| d.effective_z()));
    order
}

/// Paint the whole tree. Returns the number of elements drawn.
pub fn paint(
    tree: &mut ElementTree,
    surface: &mut dyn Surface,
    cache: &mut TextCache,
    measure: &dyn TextMeasure,
) -> usize {
    for id in tree.walk() {
        if let Some(data) = tree.get_mut(id) {
            data.rendered = false;
        }
    }

    let order = paint_order(tree);
    for &id in &order {
        let Some(style) = tree.style(id) else {
            continue;
        };
        let Some(data) = tree.get(id) else {
            continue;
        };
        let bounds = data.calculated();
        let state = BoxState { hovered: data.is_hovered(), focused: data.is_focused() };

        surface.push_clip(data.clip());
        surface.draw_box(bounds, &style, state);
        if let ElementKind::Text(text) = &data.kind {
            let inner = bounds.shrink(style.padding);
            let layout = cache.layout(measure, &text.text, text.wrap.then_some(inner.width));
            surface.draw_text(inner, &layout.lines, style.text_color);
        }
        if let Some(behavior) = data.behavior() {
            let ctx = PaintContext {
                id,
                bounds,
                clip: data.clip(),
                style: &style,
                hovered: state.hovered,
                focused: state.focused,
            };
            behavior.paint(surface, &ctx);
        }
        surface.pop_clip();

        if let Some(data) = tree.get_mut(id) {
            data.rendered = true;
        }
    }
    trace!(count = order.len(), "paint pass");
    order.len()
}
