//! Behavior trait: paint, pointer, keyboard, hover/focus and tick hooks.
//!
//! Geometry, style and tree membership live in [`ElementData`]; a
//! `Behavior` is the optional capability object attached to an element that
//! reacts to input and draws content on top of the element's box. Concrete
//! widgets (buttons, sliders, text fields) implement it outside this crate.
//!
//! [`ElementData`]: super::ElementData

use std::any::Any;
use std::time::Duration;

use super::node::ElementId;
use crate::event::input::KeyEvent;
use crate::geometry::{ClipBounds, Offset, Region};
use crate::paint::Surface;
use crate::style::ComputedStyle;

// ---------------------------------------------------------------------------
// Contexts
// ---------------------------------------------------------------------------

/// What a behavior sees when asked to paint.
#[derive(Debug)]
pub struct PaintContext<'a> {
    pub id: ElementId,
    pub bounds: Region,
    pub clip: ClipBounds,
    pub style: &'a ComputedStyle,
    pub hovered: bool,
    pub focused: bool,
}

/// Pointer position delivered to a behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerContext {
    pub id: ElementId,
    /// Absolute pointer position.
    pub position: Offset,
    /// The element's calculated box.
    pub bounds: Region,
}

impl PointerContext {
    /// Pointer position relative to the element's origin.
    pub fn local(&self) -> Offset {
        self.position - self.bounds.origin()
    }
}

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

/// Hooks an element exposes to the dispatcher and the paint pass.
///
/// Every method has a no-op default except the `Any` downcasts, so an
/// implementor only overrides what it reacts to.
pub trait Behavior {
    /// Short type name for debugging and layout dumps.
    fn name(&self) -> &str {
        "behavior"
    }

    /// Draw content inside `ctx.bounds`. The surface is already clipped to
    /// `ctx.clip` and the element's background has been drawn.
    fn paint(&self, _surface: &mut dyn Surface, _ctx: &PaintContext<'_>) {}

    /// Pointer pressed over this element. Return `false` to decline the
    /// click so it falls through to the next candidate.
    fn on_click(&mut self, _ctx: &PointerContext) -> bool {
        true
    }

    /// Pointer released after a click this element accepted.
    fn on_release(&mut self, _ctx: &PointerContext) {}

    /// Pointer moved while this element holds the press.
    fn on_drag(&mut self, _ctx: &PointerContext) {}

    /// Key pressed while focused. Return `true` if consumed.
    fn on_key(&mut self, _key: &KeyEvent) -> bool {
        false
    }

    /// Character typed while focused. Return `true` if consumed.
    fn on_char(&mut self, _ch: char) -> bool {
        false
    }

    /// Pointer entered (`true`) or left (`false`).
    fn on_hover(&mut self, _hovered: bool) {}

    /// Gained (`true`) or lost (`false`) focus.
    fn on_focus(&mut self, _focused: bool) {}

    /// Advance animations. Return `true` if geometry or tags changed so the
    /// element needs a new layout pass.
    fn tick(&mut self, _dt: Duration) -> bool {
        false
    }

    /// Downcast to `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Downcast to `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[derive(Debug, Default)]
    struct Counter {
        clicks: u32,
        hovered: bool,
    }

    impl Behavior for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        fn on_click(&mut self, _ctx: &PointerContext) -> bool {
            self.clicks += 1;
            true
        }

        fn on_hover(&mut self, hovered: bool) {
            self.hovered = hovered;
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn some_id() -> ElementId {
        let mut map: SlotMap<ElementId, ()> = SlotMap::with_key();
        map.insert(())
    }

    #[test]
    fn defaults_are_inert() {
        let mut b = Counter::default();
        let ctx = PointerContext {
            id: some_id(),
            position: Offset::new(15, 25),
            bounds: Region::new(10, 20, 30, 30),
        };
        assert!(!b.on_key(&KeyEvent::new(
            crate::event::input::Key::Enter,
            crate::event::input::Modifiers::NONE
        )));
        assert!(!b.on_char('x'));
        assert!(!b.tick(Duration::from_millis(16)));
        assert_eq!(ctx.local(), Offset::new(5, 5));
    }

    #[test]
    fn downcast_through_trait_object() {
        let mut boxed: Box<dyn Behavior> = Box::new(Counter::default());
        let ctx = PointerContext { id: some_id(), position: Offset::ZERO, bounds: Region::EMPTY };
        assert!(boxed.on_click(&ctx));
        boxed.on_hover(true);
        let counter = boxed.as_any().downcast_ref::<Counter>().unwrap();
        assert_eq!(counter.clicks, 1);
        assert!(counter.hovered);
        assert_eq!(boxed.name(), "counter");
    }
}
