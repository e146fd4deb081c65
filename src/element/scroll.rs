//! Scroll state and the drag gesture state machine.
//!
//! `ScrollState` tracks the scroll position of a scroll container, clamping
//! per enabled axis, and interprets press/move/release as either a click or a
//! drag-scroll. `ScrollbarState` provides the data needed to paint an
//! indicator.

use tracing::trace;

use crate::geometry::{Offset, Region, Size};

// ---------------------------------------------------------------------------
// Axes and gesture
// ---------------------------------------------------------------------------

/// Which axes may scroll. A disabled axis is pinned at offset 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollAxes {
    pub x: bool,
    pub y: bool,
}

impl ScrollAxes {
    pub const VERTICAL: ScrollAxes = ScrollAxes { x: false, y: true };
    pub const HORIZONTAL: ScrollAxes = ScrollAxes { x: true, y: false };
    pub const BOTH: ScrollAxes = ScrollAxes { x: true, y: true };
}

impl Default for ScrollAxes {
    fn default() -> Self {
        Self::VERTICAL
    }
}

/// Pointer gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Pointer is down but has not moved past the drag threshold.
    Pressed { origin: Offset },
    /// Pointer is dragging the content; `last` is the previous position.
    Dragging { last: Offset },
}

/// What a pointer move did to the gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// No gesture in progress, or still below the threshold.
    Ignored,
    /// The threshold was crossed on this move. No scrolling yet.
    Started,
    /// Already dragging; the offset moved by this much.
    Scrolled(Offset),
}

// ---------------------------------------------------------------------------
// ScrollState
// ---------------------------------------------------------------------------

/// Tracks the scroll position for a scroll container.
///
/// The offset on each enabled axis is always clamped to
/// `[0, max(0, content - viewport)]`; a disabled axis is forced to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollState {
    /// Current scroll offset.
    pub offset: Offset,
    /// Bounding size of the visible children, refreshed every frame.
    pub content_size: Size,
    /// Size of the visible viewport.
    pub viewport_size: Size,
    pub axes: ScrollAxes,
    /// Whether press-and-drag scrolls the content.
    pub drag_enabled: bool,
    gesture: Gesture,
}

impl ScrollState {
    /// Create a vertical scroll state with zero offset and drag enabled.
    pub fn new(content_size: Size, viewport_size: Size) -> Self {
        Self {
            offset: Offset::ZERO,
            content_size,
            viewport_size,
            axes: ScrollAxes::default(),
            drag_enabled: true,
            gesture: Gesture::Idle,
        }
    }

    /// Builder: choose the scrollable axes.
    pub fn with_axes(mut self, axes: ScrollAxes) -> Self {
        self.axes = axes;
        self.clamp();
        self
    }

    /// Builder: enable or disable drag scrolling.
    pub fn with_drag(mut self, enabled: bool) -> Self {
        self.drag_enabled = enabled;
        self
    }

    /// The maximum scroll offset for each axis. Zero on disabled axes.
    pub fn max_scroll(&self) -> Offset {
        let axis = |enabled: bool, content: i32, viewport: i32| {
            if enabled {
                (content - viewport).max(0)
            } else {
                0
            }
        };
        Offset::new(
            axis(self.axes.x, self.content_size.width, self.viewport_size.width),
            axis(self.axes.y, self.content_size.height, self.viewport_size.height),
        )
    }

    /// Scroll to an absolute position, clamping to the valid range.
    /// Returns `true` if the offset changed.
    pub fn scroll_to(&mut self, x: i32, y: i32) -> bool {
        let max = self.max_scroll();
        let next = Offset::new(x.clamp(0, max.x), y.clamp(0, max.y));
        let changed = next != self.offset;
        self.offset = next;
        changed
    }

    /// Scroll by a relative delta, clamping to the valid range.
    pub fn scroll_by(&mut self, dx: i32, dy: i32) -> bool {
        self.scroll_to(
            self.offset.x.saturating_add(dx),
            self.offset.y.saturating_add(dy),
        )
    }

    /// Apply wheel notches. Positive deltas scroll content back towards the
    /// origin, so the offset moves by `-delta * step`.
    pub fn wheel(&mut self, delta: Offset, step: i32) -> bool {
        let changed = self.scroll_by(
            delta.x.saturating_mul(step).saturating_neg(),
            delta.y.saturating_mul(step).saturating_neg(),
        );
        trace!(offset = ?self.offset, "wheel scroll");
        changed
    }

    fn clamp(&mut self) {
        self.scroll_to(self.offset.x, self.offset.y);
    }

    /// Current gesture state.
    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    /// Pointer pressed inside the viewport. Does not consume the press.
    pub fn press(&mut self, at: Offset) {
        if self.drag_enabled {
            self.gesture = Gesture::Pressed { origin: at };
        }
    }

    /// Pointer moved while a gesture may be active.
    ///
    /// While pressed, movement below `threshold` (Chebyshev distance from the
    /// press point) is ignored. Crossing it starts the drag without scrolling;
    /// later moves scroll opposite to the pointer delta.
    pub fn drag_to(&mut self, at: Offset, threshold: i32) -> DragOutcome {
        match self.gesture {
            Gesture::Idle => DragOutcome::Ignored,
            Gesture::Pressed { origin } => {
                if origin.chebyshev_distance(at) >= threshold {
                    self.gesture = Gesture::Dragging { last: at };
                    trace!(?origin, ?at, "drag started");
                    DragOutcome::Started
                } else {
                    DragOutcome::Ignored
                }
            }
            Gesture::Dragging { last } => {
                let before = self.offset;
                let delta = at - last;
                self.scroll_by(-delta.x, -delta.y);
                self.gesture = Gesture::Dragging { last: at };
                DragOutcome::Scrolled(self.offset - before)
            }
        }
    }

    /// Pointer released. Returns `true` if the gesture was a drag, so the
    /// caller can suppress the trailing click.
    pub fn release(&mut self) -> bool {
        let was_drag = matches!(self.gesture, Gesture::Dragging { .. });
        self.gesture = Gesture::Idle;
        was_drag
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging { .. })
    }

    /// Whether the content is wider than the viewport on an enabled axis.
    pub fn is_scrollable_x(&self) -> bool {
        self.max_scroll().x > 0
    }

    /// Whether the content is taller than the viewport on an enabled axis.
    pub fn is_scrollable_y(&self) -> bool {
        self.max_scroll().y > 0
    }

    /// The currently visible region within the content.
    pub fn visible_region(&self) -> Region {
        Region::from_parts(self.offset, self.viewport_size)
    }

    /// Update the content size and re-clamp the offset.
    pub fn set_content_size(&mut self, size: Size) {
        self.content_size = size;
        self.clamp();
    }

    /// Update the viewport size and re-clamp the offset.
    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport_size = size;
        self.clamp();
    }
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new(Size::ZERO, Size::ZERO)
    }
}

// ---------------------------------------------------------------------------
// ScrollbarState
// ---------------------------------------------------------------------------

/// Data needed to paint a scrollbar indicator.
///
/// Both fields are fractions in `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollbarState {
    /// 0.0 = top/left, 1.0 = bottom/right.
    pub thumb_position: f32,
    /// Viewport / content ratio.
    pub thumb_size: f32,
}

impl ScrollbarState {
    /// Compute scrollbar state for one axis.
    pub fn from_scroll_state(state: &ScrollState, vertical: bool) -> Self {
        let (content, viewport, offset, max) = if vertical {
            (
                state.content_size.height,
                state.viewport_size.height,
                state.offset.y,
                state.max_scroll().y,
            )
        } else {
            (
                state.content_size.width,
                state.viewport_size.width,
                state.offset.x,
                state.max_scroll().x,
            )
        };

        if content <= 0 || viewport <= 0 {
            return ScrollbarState { thumb_position: 0.0, thumb_size: 1.0 };
        }

        let thumb_size = (viewport as f32 / content as f32).clamp(0.0, 1.0);
        let thumb_position = if max > 0 { offset as f32 / max as f32 } else { 0.0 };

        ScrollbarState {
            thumb_position: thumb_position.clamp(0.0, 1.0),
            thumb_size,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tall() -> ScrollState {
        ScrollState::new(Size::new(100, 200), Size::new(40, 30)).with_axes(ScrollAxes::BOTH)
    }

    // -----------------------------------------------------------------------
    // Clamping
    // -----------------------------------------------------------------------

    #[test]
    fn max_scroll_normal() {
        assert_eq!(tall().max_scroll(), Offset::new(60, 170));
    }

    #[test]
    fn max_scroll_content_smaller() {
        let state = ScrollState::new(Size::new(10, 10), Size::new(40, 30));
        assert_eq!(state.max_scroll(), Offset::ZERO);
    }

    #[test]
    fn disabled_axis_is_pinned() {
        let mut state = ScrollState::new(Size::new(500, 500), Size::new(40, 30));
        assert_eq!(state.max_scroll(), Offset::new(0, 470));
        state.scroll_to(100, 100);
        assert_eq!(state.offset, Offset::new(0, 100));
    }

    #[test]
    fn scroll_to_clamps_both_ends() {
        let mut state = tall();
        state.scroll_to(999, 999);
        assert_eq!(state.offset, Offset::new(60, 170));
        state.scroll_to(-10, -5);
        assert_eq!(state.offset, Offset::ZERO);
    }

    #[test]
    fn shrinking_content_reclamps() {
        let mut state = tall();
        state.scroll_to(50, 150);
        state.set_content_size(Size::new(50, 50));
        assert_eq!(state.offset, Offset::new(10, 20));
    }

    #[test]
    fn wheel_moves_by_step() {
        let mut state = tall();
        assert!(state.wheel(Offset::new(0, -2), 16));
        assert_eq!(state.offset, Offset::new(0, 32));
        assert!(state.wheel(Offset::new(0, 1), 16));
        assert_eq!(state.offset, Offset::new(0, 16));
        assert!(!state.wheel(Offset::new(0, 0), 16));
    }

    // -----------------------------------------------------------------------
    // Gesture
    // -----------------------------------------------------------------------

    #[test]
    fn drag_below_threshold_does_not_scroll() {
        let mut state = tall();
        state.press(Offset::new(10, 10));
        assert_eq!(state.drag_to(Offset::new(12, 7), 4), DragOutcome::Ignored);
        assert_eq!(state.offset, Offset::ZERO);
        assert!(!state.release());
    }

    #[test]
    fn drag_at_threshold_starts_then_scrolls_inverted() {
        let mut state = tall();
        state.press(Offset::new(10, 20));
        assert_eq!(state.drag_to(Offset::new(10, 16), 4), DragOutcome::Started);
        assert_eq!(state.offset, Offset::ZERO);
        assert_eq!(
            state.drag_to(Offset::new(10, 6), 4),
            DragOutcome::Scrolled(Offset::new(0, 10))
        );
        assert_eq!(state.offset, Offset::new(0, 10));
        assert!(state.release());
        assert_eq!(state.gesture(), Gesture::Idle);
    }

    #[test]
    fn press_ignored_when_drag_disabled() {
        let mut state = tall().with_drag(false);
        state.press(Offset::new(0, 0));
        assert_eq!(state.gesture(), Gesture::Idle);
        assert_eq!(state.drag_to(Offset::new(0, 50), 4), DragOutcome::Ignored);
    }

    // -----------------------------------------------------------------------
    // ScrollbarState
    // -----------------------------------------------------------------------

    #[test]
    fn scrollbar_thumb() {
        let mut state = ScrollState::new(Size::new(10, 100), Size::new(10, 25));
        state.scroll_to(0, 75);
        let bar = ScrollbarState::from_scroll_state(&state, true);
        assert_eq!(bar.thumb_size, 0.25);
        assert_eq!(bar.thumb_position, 1.0);
    }

    #[test]
    fn scrollbar_empty_content() {
        let bar = ScrollbarState::from_scroll_state(&ScrollState::default(), false);
        assert_eq!(bar, ScrollbarState { thumb_position: 0.0, thumb_size: 1.0 });
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    #[derive(Debug, Clone)]
    enum Op {
        Wheel(i32, i32),
        Press(i32, i32),
        Move(i32, i32),
        Release,
        Content(i32, i32),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (-5..5, -5..5).prop_map(|(x, y)| Op::Wheel(x, y)),
            (-50..150, -50..150).prop_map(|(x, y)| Op::Press(x, y)),
            (-300..300, -300..300).prop_map(|(x, y)| Op::Move(x, y)),
            Just(Op::Release),
            (0..400, 0..400).prop_map(|(w, h)| Op::Content(w, h)),
        ]
    }

    proptest! {
        #[test]
        fn offset_stays_in_bounds(
            axes in prop_oneof![
                Just(ScrollAxes::VERTICAL),
                Just(ScrollAxes::HORIZONTAL),
                Just(ScrollAxes::BOTH),
            ],
            ops in prop::collection::vec(op(), 0..40),
        ) {
            let mut state = ScrollState::new(Size::new(300, 300), Size::new(80, 60)).with_axes(axes);
            for op in ops {
                match op {
                    Op::Wheel(x, y) => { state.wheel(Offset::new(x, y), 16); }
                    Op::Press(x, y) => state.press(Offset::new(x, y)),
                    Op::Move(x, y) => { state.drag_to(Offset::new(x, y), 4); }
                    Op::Release => { state.release(); }
                    Op::Content(w, h) => state.set_content_size(Size::new(w, h)),
                }
                let max = state.max_scroll();
                prop_assert!(state.offset.x >= 0 && state.offset.x <= max.x);
                prop_assert!(state.offset.y >= 0 && state.offset.y <= max.y);
                if !axes.x { prop_assert_eq!(state.offset.x, 0); }
                if !axes.y { prop_assert_eq!(state.offset.y, 0); }
            }
        }
    }
}
