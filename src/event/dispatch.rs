//! Interaction dispatcher: hit-testing, focus, hover, keyboard routing.
//!
//! [`HitMap`] snapshots the interactable elements and scroll containers
//! after each layout pass. [`Interaction`] owns the focus and hover
//! references plus the in-flight pointer press, and routes every
//! [`InputEvent`] to the element (or scroll container) that should see it.
//!
//! Elements are referenced by [`ElementId`] only. Anything that may have been
//! removed or hidden since the last frame is re-validated against the tree
//! before use, so a stale id can never be delivered to.

use std::cmp::Reverse;
use std::collections::HashSet;

use tracing::{debug, trace};

use super::binding::{BindingAction, KeyBindingRegistry};
use super::input::{Button, InputEvent, KeyEvent};
use super::message::{EventQueue, UiEvent};
use crate::config::EngineConfig;
use crate::element::{DragOutcome, ElementId, ElementTree, PointerContext, ZIndex};
use crate::geometry::{ClipBounds, Offset};

// ---------------------------------------------------------------------------
// HitMap
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct HitEntry {
    id: ElementId,
    clip: ClipBounds,
    z: ZIndex,
    area: i64,
    /// Depth-first position; later entries paint on top of earlier ones.
    order: usize,
}

/// Hit-test snapshot taken after layout.
///
/// Holds every shown, interactable element with a valid clip, and every
/// shown scroll container, each with the clip and effective z-index it had
/// when the snapshot was taken.
#[derive(Debug, Default)]
pub struct HitMap {
    entries: Vec<HitEntry>,
    scrollers: Vec<HitEntry>,
}

impl HitMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from the current tree.
    pub fn rebuild(&mut self, tree: &ElementTree) {
        self.entries.clear();
        self.scrollers.clear();
        let Some(root) = tree.root() else {
            return;
        };
        let mut order = 0;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(data) = tree.get(id) else {
                continue;
            };
            if !data.is_visible() {
                continue;
            }
            stack.extend(tree.children(id).iter().rev().copied());
            let clip = data.clip();
            if clip.is_invalid() {
                continue;
            }
            let entry = HitEntry {
                id,
                clip,
                z: data.effective_z(),
                area: data.calculated().area(),
                order,
            };
            order += 1;
            if data.kind.scroll().is_some() {
                self.scrollers.push(entry);
            }
            if data.is_interactable() {
                self.entries.push(entry);
            }
        }
        trace!(entries = self.entries.len(), scrollers = self.scrollers.len(), "hit map rebuilt");
    }

    /// Elements whose clip contains `point`, best candidate first: higher
    /// z-index, then the focused element, then smaller area, then later in
    /// paint order.
    pub fn hit_test(&self, point: Offset, focused: Option<ElementId>) -> Vec<ElementId> {
        let mut hits: Vec<&HitEntry> =
            self.entries.iter().filter(|e| e.clip.contains(point.x, point.y)).collect();
        hits.sort_by_key(|e| (Reverse(e.z), Some(e.id) != focused, e.area, Reverse(e.order)));
        hits.into_iter().map(|e| e.id).collect()
    }

    /// Scroll containers under `point`, innermost and topmost first.
    pub fn scrollers_at(&self, point: Offset) -> Vec<ElementId> {
        let mut hits: Vec<&HitEntry> =
            self.scrollers.iter().filter(|e| e.clip.contains(point.x, point.y)).collect();
        hits.sort_by_key(|e| (Reverse(e.z), Reverse(e.order)));
        hits.into_iter().map(|e| e.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Interaction
// ---------------------------------------------------------------------------

/// An in-flight pointer press.
#[derive(Debug, Clone, Copy)]
struct Press {
    /// Element that accepted the click.
    target: Option<ElementId>,
    /// Scroll container tracking the gesture.
    scroller: Option<ElementId>,
}

/// Focus, hover and pointer routing over an [`ElementTree`].
#[derive(Debug)]
pub struct Interaction {
    map: HitMap,
    focused: Option<ElementId>,
    hovered: Option<ElementId>,
    press: Option<Press>,
    bindings: KeyBindingRegistry,
    drag_threshold: i32,
    wheel_step: i32,
}

impl Default for Interaction {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl Interaction {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            map: HitMap::new(),
            focused: None,
            hovered: None,
            press: None,
            bindings: KeyBindingRegistry::with_defaults(),
            drag_threshold: config.drag_threshold,
            wheel_step: config.wheel_step,
        }
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    pub fn hovered(&self) -> Option<ElementId> {
        self.hovered
    }

    pub fn bindings(&self) -> &KeyBindingRegistry {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindingRegistry {
        &mut self.bindings
    }

    pub fn hit_map(&self) -> &HitMap {
        &self.map
    }

    /// Refresh the hit map after layout and drop references to elements that
    /// can no longer be interacted with.
    pub fn rebuild(&mut self, tree: &mut ElementTree, events: &mut EventQueue) {
        self.map.rebuild(tree);
        self.prune(tree, events);
    }

    /// Candidates at `point` in delivery order.
    pub fn hit_test(&self, point: Offset) -> Vec<ElementId> {
        self.map.hit_test(point, self.focused)
    }

    /// The single topmost interactable element at `point`.
    pub fn target_at(&self, point: Offset) -> Option<ElementId> {
        self.hit_test(point).first().copied()
    }

    /// Clear focus, hover or press references to elements that were removed,
    /// hidden or disabled.
    pub fn prune(&mut self, tree: &mut ElementTree, events: &mut EventQueue) {
        if let Some(id) = self.focused {
            if !is_live(tree, id) {
                debug!(?id, "focus target gone, clearing focus");
                self.set_focus(tree, None, events);
            }
        }
        if let Some(id) = self.hovered {
            if !is_live(tree, id) {
                self.set_hover(tree, None, events);
            }
        }
        if let Some(press) = &mut self.press {
            if press.target.is_some_and(|t| !tree.contains(t)) {
                press.target = None;
            }
            if press.scroller.is_some_and(|s| !tree.contains(s)) {
                press.scroller = None;
            }
        }
    }

    /// Forget every reference to the given elements. Used when they are
    /// removed from the tree, so no notification is sent to them.
    pub fn forget(&mut self, removed: &[ElementId], events: &mut EventQueue) {
        if let Some(id) = self.focused.filter(|id| removed.contains(id)) {
            self.focused = None;
            debug!(?id, "focused element removed");
            events.push(UiEvent::FocusChanged { from: Some(id), to: None });
        }
        if let Some(id) = self.hovered.filter(|id| removed.contains(id)) {
            self.hovered = None;
            events.push(UiEvent::HoverChanged { from: Some(id), to: None });
        }
        if let Some(press) = &mut self.press {
            if press.target.is_some_and(|t| removed.contains(&t)) {
                press.target = None;
            }
            if press.scroller.is_some_and(|s| removed.contains(&s)) {
                press.scroller = None;
            }
        }
        self.map.entries.retain(|e| !removed.contains(&e.id));
        self.map.scrollers.retain(|e| !removed.contains(&e.id));
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Route one input event. Returns `true` if something consumed it.
    pub fn dispatch(
        &mut self,
        tree: &mut ElementTree,
        event: &InputEvent,
        events: &mut EventQueue,
    ) -> bool {
        match *event {
            InputEvent::PointerMove { x, y } => self.pointer_move(tree, Offset::new(x, y), events),
            InputEvent::PointerDown { x, y, button: Button::Primary } => {
                self.pointer_down(tree, Offset::new(x, y), events)
            }
            InputEvent::PointerUp { x, y, button: Button::Primary } => {
                self.pointer_up(tree, Offset::new(x, y), events)
            }
            // Secondary and middle buttons neither click, focus nor drag.
            InputEvent::PointerDown { .. } | InputEvent::PointerUp { .. } => false,
            InputEvent::Wheel { x, y, dx, dy } => {
                self.wheel(tree, Offset::new(x, y), Offset::new(dx, dy), events)
            }
            InputEvent::Key(key) => self.key(tree, key, events),
            InputEvent::Char(ch) => self.char(tree, ch, events),
            InputEvent::Resize { .. } => false,
        }
    }

    fn pointer_move(&mut self, tree: &mut ElementTree, point: Offset, events: &mut EventQueue) -> bool {
        let mut consumed = false;
        if let Some(press) = self.press {
            let mut dragging = false;
            if let Some(scroller) = press.scroller {
                let threshold = self.drag_threshold;
                if let Ok(Some((outcome, offset))) =
                    tree.with_scroll(scroller, |s| (s.drag_to(point, threshold), s.offset))
                {
                    dragging = outcome != DragOutcome::Ignored;
                    if let DragOutcome::Scrolled(delta) = outcome {
                        if delta != Offset::ZERO {
                            events.push(UiEvent::Scrolled { id: scroller, offset });
                        }
                    }
                }
            }
            if !dragging {
                if let Some(target) = press.target {
                    if let Some(ctx) = pointer_context(tree, target, point) {
                        if let Some(behavior) = tree.behavior_mut(target) {
                            behavior.on_drag(&ctx);
                        }
                    }
                }
            }
            consumed = dragging;
        }

        let top = self.target_at(point);
        if top != self.hovered {
            self.set_hover(tree, top, events);
        }
        consumed
    }

    fn pointer_down(&mut self, tree: &mut ElementTree, point: Offset, events: &mut EventQueue) -> bool {
        let hits = self.hit_test(point);
        let mut tried = HashSet::new();
        let mut accepted = None;
        for &candidate in &hits {
            if let Some(id) = self.try_click(tree, &hits, candidate, point, &mut tried) {
                accepted = Some(id);
                break;
            }
        }

        match accepted {
            Some(id) => {
                trace!(?id, "click accepted");
                events.push(UiEvent::Pressed(id));
                self.set_focus(tree, Some(id), events);
            }
            None => self.set_focus(tree, None, events),
        }

        let scroller = self.map.scrollers_at(point).into_iter().find(|&s| {
            tree.scroll_state(s).is_some_and(|state| state.drag_enabled)
        });
        if let Some(s) = scroller {
            if let Err(err) = tree.with_scroll(s, |state| state.press(point)) {
                debug!(?s, %err, "scroller vanished before press");
            }
        }

        self.press = Some(Press { target: accepted, scroller });
        accepted.is_some()
    }

    fn pointer_up(&mut self, tree: &mut ElementTree, point: Offset, events: &mut EventQueue) -> bool {
        let Some(press) = self.press.take() else {
            return false;
        };
        let was_drag = press
            .scroller
            .and_then(|s| tree.with_scroll(s, |state| state.release()).ok().flatten())
            .unwrap_or(false);

        let Some(target) = press.target else {
            return was_drag;
        };
        let Some(ctx) = pointer_context(tree, target, point) else {
            return was_drag;
        };
        let over = tree.get(target).is_some_and(|d| d.clip().contains(point.x, point.y));
        if let Some(behavior) = tree.behavior_mut(target) {
            behavior.on_release(&ctx);
        }
        if over && !was_drag {
            events.push(UiEvent::Activated(target));
        }
        true
    }

    fn wheel(
        &mut self,
        tree: &mut ElementTree,
        point: Offset,
        delta: Offset,
        events: &mut EventQueue,
    ) -> bool {
        let step = self.wheel_step;
        for id in self.map.scrollers_at(point) {
            if let Ok(Some((moved, offset))) = tree.with_scroll(id, |s| (s.wheel(delta, step), s.offset)) {
                if moved {
                    events.push(UiEvent::Scrolled { id, offset });
                    return true;
                }
            }
        }
        false
    }

    fn key(&mut self, tree: &mut ElementTree, key: KeyEvent, events: &mut EventQueue) -> bool {
        if let Some(action) = self.bindings.resolve(&key).cloned() {
            match action {
                BindingAction::FocusNext => {
                    self.focus_next(tree, events);
                }
                BindingAction::FocusPrevious => {
                    self.focus_previous(tree, events);
                }
                BindingAction::ClearFocus => self.set_focus(tree, None, events),
                BindingAction::Custom(name) => events.push(UiEvent::Action(name)),
            }
            return true;
        }

        let Some(id) = self.keyboard_target(tree, events) else {
            return false;
        };
        let consumed = tree.behavior_mut(id).is_some_and(|b| b.on_key(&key));
        if consumed {
            events.push(UiEvent::KeyDelivered { id, key });
        }
        consumed
    }

    fn char(&mut self, tree: &mut ElementTree, ch: char, events: &mut EventQueue) -> bool {
        let Some(id) = self.keyboard_target(tree, events) else {
            return false;
        };
        tree.behavior_mut(id).is_some_and(|b| b.on_char(ch))
    }

    /// The focused element, if it is still visible and was rendered in the
    /// last paint pass. Otherwise focus is cleared.
    fn keyboard_target(&mut self, tree: &mut ElementTree, events: &mut EventQueue) -> Option<ElementId> {
        let id = self.focused?;
        let ok = tree
            .get(id)
            .is_some_and(|d| d.is_interactable() && d.was_rendered())
            && tree.is_shown(id);
        if ok {
            Some(id)
        } else {
            debug!(?id, "focus target not rendered, clearing focus");
            self.set_focus(tree, None, events);
            None
        }
    }

    /// Offer the click to `id`, or first to its topmost child under the
    /// pointer when `id` is a container. Returns the element that accepted.
    fn try_click(
        &self,
        tree: &mut ElementTree,
        hits: &[ElementId],
        id: ElementId,
        point: Offset,
        tried: &mut HashSet<ElementId>,
    ) -> Option<ElementId> {
        if !tried.insert(id) {
            return None;
        }
        let is_container = tree.get(id).is_some_and(|d| d.kind.is_container());
        if is_container {
            let child = hits.iter().copied().find(|&h| tree.parent(h) == Some(id));
            if let Some(child) = child {
                if let Some(hit) = self.try_click(tree, hits, child, point, tried) {
                    return Some(hit);
                }
            }
        }
        accepts_click(tree, id, point).then_some(id)
    }

    // -----------------------------------------------------------------------
    // Focus & hover
    // -----------------------------------------------------------------------

    /// Focus `id` directly. Fails if it is not an interactable, shown element.
    pub fn focus(&mut self, tree: &mut ElementTree, id: ElementId, events: &mut EventQueue) -> bool {
        let ok = is_live(tree, id);
        if ok {
            self.set_focus(tree, Some(id), events);
        }
        ok
    }

    pub fn clear_focus(&mut self, tree: &mut ElementTree, events: &mut EventQueue) {
        self.set_focus(tree, None, events);
    }

    /// Focusable elements that were rendered in the last paint pass, in tab
    /// order: z-index ascending, ties in depth-first order.
    pub fn tab_order(&self, tree: &ElementTree) -> Vec<ElementId> {
        let mut order: Vec<ElementId> = tree
            .walk()
            .into_iter()
            .filter(|&id| {
                tree.get(id).is_some_and(|d| {
                    d.is_focusable() && d.is_interactable() && d.was_rendered()
                }) && tree.is_shown(id)
            })
            .collect();
        order.sort_by_key(|&id| tree.get(id).map(|d| d.effective_z()));
        order
    }

    /// Move focus forward in tab order, wrapping. Returns the new focus.
    pub fn focus_next(&mut self, tree: &mut ElementTree, events: &mut EventQueue) -> Option<ElementId> {
        let order = self.tab_order(tree);
        let next = match self.focused.and_then(|f| order.iter().position(|&id| id == f)) {
            Some(i) => order.get((i + 1) % order.len()).copied(),
            None => order.first().copied(),
        };
        self.set_focus(tree, next, events);
        next
    }

    /// Move focus backward in tab order, wrapping. Returns the new focus.
    pub fn focus_previous(
        &mut self,
        tree: &mut ElementTree,
        events: &mut EventQueue,
    ) -> Option<ElementId> {
        let order = self.tab_order(tree);
        let prev = match self.focused.and_then(|f| order.iter().position(|&id| id == f)) {
            Some(0) => order.last().copied(),
            Some(i) => order.get(i - 1).copied(),
            None => order.last().copied(),
        };
        self.set_focus(tree, prev, events);
        prev
    }

    fn set_focus(&mut self, tree: &mut ElementTree, to: Option<ElementId>, events: &mut EventQueue) {
        let from = self.focused;
        if from == to {
            return;
        }
        if let Some(old) = from {
            if let Some(data) = tree.get_mut(old) {
                data.focused = false;
            }
            if let Some(b) = tree.behavior_mut(old) {
                b.on_focus(false);
            }
        }
        if let Some(new) = to {
            if let Some(data) = tree.get_mut(new) {
                data.focused = true;
            }
            if let Some(b) = tree.behavior_mut(new) {
                b.on_focus(true);
            }
        }
        self.focused = to;
        debug!(?from, ?to, "focus changed");
        events.push(UiEvent::FocusChanged { from, to });
    }

    fn set_hover(&mut self, tree: &mut ElementTree, to: Option<ElementId>, events: &mut EventQueue) {
        let from = self.hovered;
        if from == to {
            return;
        }
        if let Some(old) = from {
            if let Some(data) = tree.get_mut(old) {
                data.hovered = false;
            }
            if let Some(b) = tree.behavior_mut(old) {
                b.on_hover(false);
            }
        }
        if let Some(new) = to {
            if let Some(data) = tree.get_mut(new) {
                data.hovered = true;
            }
            if let Some(b) = tree.behavior_mut(new) {
                b.on_hover(true);
            }
        }
        self.hovered = to;
        trace!(?from, ?to, "hover changed");
        events.push(UiEvent::HoverChanged { from, to });
    }
}

fn is_live(tree: &ElementTree, id: ElementId) -> bool {
    tree.get(id).is_some_and(|d| d.is_interactable()) && tree.is_shown(id)
}

fn pointer_context(tree: &ElementTree, id: ElementId, point: Offset) -> Option<PointerContext> {
    let data = tree.get(id)?;
    Some(PointerContext { id, position: point, bounds: data.calculated() })
}

/// An element with a behavior asks the behavior; a bare focusable element
/// always accepts.
fn accepts_click(tree: &mut ElementTree, id: ElementId, point: Offset) -> bool {
    let Some(data) = tree.get(id) else {
        return false;
    };
    if !data.is_interactable() {
        return false;
    }
    let focusable = data.is_focusable();
    let ctx = PointerContext { id, position: point, bounds: data.calculated() };
    match tree.behavior_mut(id) {
        Some(behavior) => behavior.on_click(&ctx),
        None => focusable,
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use std::any::Any;

    use super::*;
    use crate::element::{Behavior, ElementData, Layer, ScrollState};
    use crate::event::input::{Key, Modifiers};
    use crate::geometry::{Region, Size};
    use crate::layout::{LayoutEngine, LayoutKind};
    use crate::paint::paint;
    use crate::testing::{MonoMeasure, RecordingSurface};
    use crate::text::TextCache;

    #[derive(Debug, Default)]
    struct Recorder {
        accept: bool,
        clicks: u32,
        releases: u32,
        drags: u32,
        keys: Vec<Key>,
        chars: String,
        hovered: bool,
        focused: bool,
    }

    impl Recorder {
        fn accepting() -> Self {
            Self { accept: true, ..Self::default() }
        }
    }

    impl Behavior for Recorder {
        fn on_click(&mut self, _ctx: &PointerContext) -> bool {
            self.clicks += 1;
            self.accept
        }
        fn on_release(&mut self, _ctx: &PointerContext) {
            self.releases += 1;
        }
        fn on_drag(&mut self, _ctx: &PointerContext) {
            self.drags += 1;
        }
        fn on_key(&mut self, key: &KeyEvent) -> bool {
            self.keys.push(key.code);
            true
        }
        fn on_char(&mut self, ch: char) -> bool {
            self.chars.push(ch);
            true
        }
        fn on_hover(&mut self, hovered: bool) {
            self.hovered = hovered;
        }
        fn on_focus(&mut self, focused: bool) {
            self.focused = focused;
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn frame(tree: &mut ElementTree, ix: &mut Interaction, events: &mut EventQueue) {
        let measure = MonoMeasure::new(8, 16);
        LayoutEngine::new().run(tree, Region::new(0, 0, 200, 200), &measure);
        ix.rebuild(tree, events);
        paint(tree, &mut RecordingSurface::default(), &mut TextCache::new(), &measure);
    }

    fn root(tree: &mut ElementTree) -> ElementId {
        tree.insert(ElementData::container(LayoutKind::Absolute))
    }

    fn button(tree: &mut ElementTree, parent: ElementId, rect: Region) -> ElementId {
        tree.insert_child(
            parent,
            ElementData::leaf().with_rect(rect).focusable(true).with_behavior(Recorder::accepting()),
        )
        .unwrap()
    }

    fn recorder(tree: &ElementTree, id: ElementId) -> &Recorder {
        tree.behavior_as::<Recorder>(id).unwrap()
    }

    fn down(x: i32, y: i32) -> InputEvent {
        InputEvent::PointerDown { x, y, button: Button::Primary }
    }

    fn up(x: i32, y: i32) -> InputEvent {
        InputEvent::PointerUp { x, y, button: Button::Primary }
    }

    // ── Hit ordering ─────────────────────────────────────────────────

    #[test]
    fn higher_priority_wins_regardless_of_order() {
        let mut tree = ElementTree::new();
        let r = root(&mut tree);
        let high = tree
            .insert_child(
                r,
                ElementData::leaf()
                    .with_rect(Region::new(0, 0, 50, 50))
                    .with_z(ZIndex::new(Layer::Content, 5))
                    .with_behavior(Recorder::accepting()),
            )
            .unwrap();
        let low = button(&mut tree, r, Region::new(0, 0, 50, 50));
        let (mut ix, mut ev) = (Interaction::default(), EventQueue::new());
        frame(&mut tree, &mut ix, &mut ev);

        assert_eq!(ix.hit_test(Offset::new(10, 10)), vec![high, low]);
        ix.dispatch(&mut tree, &down(10, 10), &mut ev);
        assert_eq!(recorder(&tree, high).clicks, 1);
        assert_eq!(recorder(&tree, low).clicks, 0);
    }

    #[test]
    fn smaller_area_wins_at_equal_z() {
        let mut tree = ElementTree::new();
        let r = root(&mut tree);
        let big = button(&mut tree, r, Region::new(0, 0, 100, 100));
        let small = button(&mut tree, r, Region::new(10, 10, 10, 10));
        let (mut ix, mut ev) = (Interaction::default(), EventQueue::new());
        frame(&mut tree, &mut ix, &mut ev);
        assert_eq!(ix.hit_test(Offset::new(15, 15)), vec![small, big]);
    }

    #[test]
    fn focused_element_wins_ties() {
        let mut tree = ElementTree::new();
        let r = root(&mut tree);
        let a = button(&mut tree, r, Region::new(0, 0, 20, 20));
        let b = button(&mut tree, r, Region::new(0, 0, 20, 20));
        let (mut ix, mut ev) = (Interaction::default(), EventQueue::new());
        frame(&mut tree, &mut ix, &mut ev);
        assert_eq!(ix.target_at(Offset::new(5, 5)), Some(b));
        ix.focus(&mut tree, a, &mut ev);
        assert_eq!(ix.target_at(Offset::new(5, 5)), Some(a));
    }

    #[test]
    fn declined_click_falls_through() {
        let mut tree = ElementTree::new();
        let r = root(&mut tree);
        let under = button(&mut tree, r, Region::new(0, 0, 40, 40));
        let over = tree
            .insert_child(
                r,
                ElementData::leaf()
                    .with_rect(Region::new(0, 0, 20, 20))
                    .with_behavior(Recorder::default()),
            )
            .unwrap();
        let (mut ix, mut ev) = (Interaction::default(), EventQueue::new());
        frame(&mut tree, &mut ix, &mut ev);
        ix.dispatch(&mut tree, &down(5, 5), &mut ev);
        assert_eq!(recorder(&tree, over).clicks, 1);
        assert_eq!(recorder(&tree, under).clicks, 1);
        assert_eq!(ix.focused(), Some(under));
    }

    #[test]
    fn container_delegates_to_child_first() {
        let mut tree = ElementTree::new();
        let r = root(&mut tree);
        let panel = tree
            .insert_child(
                r,
                ElementData::container(LayoutKind::Absolute)
                    .with_rect(Region::new(0, 0, 100, 100))
                    .with_z(ZIndex::new(Layer::Overlay, 0))
                    .with_behavior(Recorder::accepting()),
            )
            .unwrap();
        let inner = button(&mut tree, panel, Region::new(10, 10, 20, 20));
        let (mut ix, mut ev) = (Interaction::default(), EventQueue::new());
        frame(&mut tree, &mut ix, &mut ev);

        ix.dispatch(&mut tree, &down(15, 15), &mut ev);
        assert_eq!(recorder(&tree, inner).clicks, 1);
        assert_eq!(recorder(&tree, panel).clicks, 0);

        ix.dispatch(&mut tree, &up(15, 15), &mut ev);
        ix.dispatch(&mut tree, &down(80, 80), &mut ev);
        ix.dispatch(&mut tree, &up(80, 80), &mut ev);
        assert_eq!(recorder(&tree, panel).clicks, 1);
        assert_eq!(ix.focused(), Some(panel));

        // The focused panel now sorts first, but still hands the click down.
        assert_eq!(ix.hit_test(Offset::new(15, 15)), vec![panel, inner]);
        ix.dispatch(&mut tree, &down(15, 15), &mut ev);
        assert_eq!(recorder(&tree, inner).clicks, 2);
        assert_eq!(recorder(&tree, panel).clicks, 1);
    }

    #[test]
    fn disabled_and_clipped_out_are_not_hit() {
        let mut tree = ElementTree::new();
        let r = root(&mut tree);
        let disabled = button(&mut tree, r, Region::new(0, 0, 20, 20));
        tree.set_enabled(disabled, false).unwrap();
        let clipper = tree
            .insert_child(r, ElementData::container(LayoutKind::Absolute).with_rect(Region::new(50, 0, 10, 10)))
            .unwrap();
        let _overflowing = button(&mut tree, clipper, Region::new(0, 0, 40, 40));
        let (mut ix, mut ev) = (Interaction::default(), EventQueue::new());
        frame(&mut tree, &mut ix, &mut ev);
        assert!(ix.hit_test(Offset::new(5, 5)).is_empty());
        assert!(ix.hit_test(Offset::new(75, 30)).is_empty());
        assert_eq!(ix.hit_test(Offset::new(55, 5)).len(), 1);
    }

    // ── Focus ────────────────────────────────────────────────────────

    #[test]
    fn click_focuses_and_empty_click_clears() {
        let mut tree = ElementTree::new();
        let r = root(&mut tree);
        let a = button(&mut tree, r, Region::new(0, 0, 20, 20));
        let (mut ix, mut ev) = (Interaction::default(), EventQueue::new());
        frame(&mut tree, &mut ix, &mut ev);

        ix.dispatch(&mut tree, &down(5, 5), &mut ev);
        assert_eq!(ix.focused(), Some(a));
        assert!(tree.get(a).unwrap().is_focused());
        assert!(recorder(&tree, a).focused);
        ix.dispatch(&mut tree, &up(5, 5), &mut ev);

        ix.dispatch(&mut tree, &down(150, 150), &mut ev);
        assert_eq!(ix.focused(), None);
        assert!(!recorder(&tree, a).focused);
        let drained = ev.drain();
        assert!(drained.contains(&UiEvent::Pressed(a)));
        assert!(drained.contains(&UiEvent::Activated(a)));
        assert!(drained.contains(&UiEvent::FocusChanged { from: Some(a), to: None }));
    }

    #[test]
    fn tab_cycles_and_wraps() {
        let mut tree = ElementTree::new();
        let r = root(&mut tree);
        let a = button(&mut tree, r, Region::new(0, 0, 10, 10));
        let top = tree
            .insert_child(
                r,
                ElementData::leaf()
                    .with_rect(Region::new(20, 0, 10, 10))
                    .focusable(true)
                    .with_z(ZIndex::new(Layer::Overlay, 0)),
            )
            .unwrap();
        let b = button(&mut tree, r, Region::new(40, 0, 10, 10));
        let _plain = tree.insert_child(r, ElementData::leaf().with_rect(Region::new(60, 0, 10, 10))).unwrap();
        let (mut ix, mut ev) = (Interaction::default(), EventQueue::new());
        frame(&mut tree, &mut ix, &mut ev);

        assert_eq!(ix.tab_order(&tree), vec![a, b, top]);
        let tab = InputEvent::Key(KeyEvent::plain(Key::Tab));
        let mut seen = Vec::new();
        for _ in 0..4 {
            ix.dispatch(&mut tree, &tab, &mut ev);
            seen.push(ix.focused().unwrap());
        }
        assert_eq!(seen, vec![a, b, top, a]);

        let back = InputEvent::Key(KeyEvent::new(Key::BackTab, Modifiers::SHIFT));
        ix.dispatch(&mut tree, &back, &mut ev);
        assert_eq!(ix.focused(), Some(top));

        ix.dispatch(&mut tree, &InputEvent::Key(KeyEvent::plain(Key::Escape)), &mut ev);
        assert_eq!(ix.focused(), None);
    }

    #[test]
    fn unrendered_elements_are_skipped_by_tab() {
        let mut tree = ElementTree::new();
        let r = root(&mut tree);
        let _offscreen = button(&mut tree, r, Region::new(500, 500, 10, 10));
        let on = button(&mut tree, r, Region::new(0, 0, 10, 10));
        let (mut ix, mut ev) = (Interaction::default(), EventQueue::new());
        frame(&mut tree, &mut ix, &mut ev);
        assert_eq!(ix.tab_order(&tree), vec![on]);
    }

    // ── Keyboard ─────────────────────────────────────────────────────

    #[test]
    fn keys_reach_focused_element_only_while_rendered() {
        let mut tree = ElementTree::new();
        let r = root(&mut tree);
        let a = button(&mut tree, r, Region::new(0, 0, 10, 10));
        let (mut ix, mut ev) = (Interaction::default(), EventQueue::new());
        frame(&mut tree, &mut ix, &mut ev);

        let enter = InputEvent::Key(KeyEvent::plain(Key::Enter));
        assert!(!ix.dispatch(&mut tree, &enter, &mut ev));

        ix.focus(&mut tree, a, &mut ev);
        assert!(ix.dispatch(&mut tree, &enter, &mut ev));
        assert!(ix.dispatch(&mut tree, &InputEvent::Char('q'), &mut ev));
        assert_eq!(recorder(&tree, a).keys, vec![Key::Enter]);
        assert_eq!(recorder(&tree, a).chars, "q");

        // Moved off-screen: no longer rendered after the next frame.
        tree.set_position(a, 900, 900).unwrap();
        let measure = MonoMeasure::new(8, 16);
        LayoutEngine::new().run(&mut tree, Region::new(0, 0, 200, 200), &measure);
        paint(&mut tree, &mut RecordingSurface::default(), &mut TextCache::new(), &measure);
        assert!(!ix.dispatch(&mut tree, &enter, &mut ev));
        assert_eq!(ix.focused(), None);
        assert_eq!(recorder(&tree, a).keys.len(), 1);
    }

    #[test]
    fn custom_binding_becomes_action() {
        let mut tree = ElementTree::new();
        root(&mut tree);
        let (mut ix, mut ev) = (Interaction::default(), EventQueue::new());
        ix.bindings_mut().bind(Key::Char('s'), Modifiers::CTRL, BindingAction::Custom("save".into()));
        let ctrl_s = InputEvent::Key(KeyEvent::new(Key::Char('s'), Modifiers::CTRL));
        assert!(ix.dispatch(&mut tree, &ctrl_s, &mut ev));
        assert_eq!(ev.drain(), vec![UiEvent::Action("save".into())]);
    }

    // ── Hover ────────────────────────────────────────────────────────

    #[test]
    fn hover_transitions_only_on_change() {
        let mut tree = ElementTree::new();
        let r = root(&mut tree);
        let a = button(&mut tree, r, Region::new(0, 0, 20, 20));
        let b = button(&mut tree, r, Region::new(30, 0, 20, 20));
        let (mut ix, mut ev) = (Interaction::default(), EventQueue::new());
        frame(&mut tree, &mut ix, &mut ev);

        let mv = |x, y| InputEvent::PointerMove { x, y };
        ix.dispatch(&mut tree, &mv(5, 5), &mut ev);
        ix.dispatch(&mut tree, &mv(6, 6), &mut ev);
        assert_eq!(ix.hovered(), Some(a));
        assert!(recorder(&tree, a).hovered);
        ix.dispatch(&mut tree, &mv(35, 5), &mut ev);
        assert!(!recorder(&tree, a).hovered);
        assert!(recorder(&tree, b).hovered);
        ix.dispatch(&mut tree, &mv(150, 150), &mut ev);
        assert_eq!(ix.hovered(), None);

        let hovers: Vec<UiEvent> =
            ev.drain().into_iter().filter(|e| matches!(e, UiEvent::HoverChanged { .. })).collect();
        assert_eq!(
            hovers,
            vec![
                UiEvent::HoverChanged { from: None, to: Some(a) },
                UiEvent::HoverChanged { from: Some(a), to: Some(b) },
                UiEvent::HoverChanged { from: Some(b), to: None },
            ]
        );
    }

    // ── Scrolling ────────────────────────────────────────────────────

    fn scroll_fixture() -> (ElementTree, ElementId, ElementId, Interaction, EventQueue) {
        let mut tree = ElementTree::new();
        let r = root(&mut tree);
        let scroller = tree
            .insert_child(
                r,
                ElementData::scroll(LayoutKind::Absolute, ScrollState::new(Size::ZERO, Size::ZERO))
                    .with_rect(Region::new(0, 0, 100, 100)),
            )
            .unwrap();
        let item = button(&mut tree, scroller, Region::new(0, 0, 100, 400));
        let (mut ix, mut ev) = (Interaction::default(), EventQueue::new());
        frame(&mut tree, &mut ix, &mut ev);
        (tree, scroller, item, ix, ev)
    }

    #[test]
    fn wheel_scrolls_and_clamps() {
        let (mut tree, scroller, _item, mut ix, mut ev) = scroll_fixture();
        let wheel_down = InputEvent::Wheel { x: 50, y: 50, dx: 0, dy: -1 };
        assert!(ix.dispatch(&mut tree, &wheel_down, &mut ev));
        assert_eq!(tree.scroll_state(scroller).unwrap().offset, Offset::new(0, 16));
        for _ in 0..40 {
            ix.dispatch(&mut tree, &wheel_down, &mut ev);
        }
        assert_eq!(tree.scroll_state(scroller).unwrap().offset, Offset::new(0, 300));
        assert!(!ix.dispatch(&mut tree, &wheel_down, &mut ev));
    }

    #[test]
    fn small_motion_is_a_click_large_motion_is_a_drag() {
        let (mut tree, scroller, item, mut ix, mut ev) = scroll_fixture();

        ix.dispatch(&mut tree, &down(50, 50), &mut ev);
        ix.dispatch(&mut tree, &InputEvent::PointerMove { x: 50, y: 47 }, &mut ev);
        ix.dispatch(&mut tree, &up(50, 47), &mut ev);
        assert_eq!(tree.scroll_state(scroller).unwrap().offset, Offset::ZERO);
        assert_eq!(recorder(&tree, item).drags, 1);
        assert!(ev.drain().contains(&UiEvent::Activated(item)));

        ix.dispatch(&mut tree, &down(50, 50), &mut ev);
        ix.dispatch(&mut tree, &InputEvent::PointerMove { x: 50, y: 46 }, &mut ev);
        assert_eq!(tree.scroll_state(scroller).unwrap().offset, Offset::ZERO);
        ix.dispatch(&mut tree, &InputEvent::PointerMove { x: 50, y: 26 }, &mut ev);
        assert_eq!(tree.scroll_state(scroller).unwrap().offset, Offset::new(0, 20));
        ix.dispatch(&mut tree, &up(50, 26), &mut ev);
        let drained = ev.drain();
        assert!(!drained.contains(&UiEvent::Activated(item)));
        assert!(drained.contains(&UiEvent::Scrolled { id: scroller, offset: Offset::new(0, 20) }));
        assert_eq!(recorder(&tree, item).releases, 2);
    }

    #[test]
    fn secondary_button_neither_focuses_nor_drags() {
        let (mut tree, scroller, item, mut ix, mut ev) = scroll_fixture();
        ev.drain();
        let press = |x, y| InputEvent::PointerDown { x, y, button: Button::Secondary };
        let release = |x, y| InputEvent::PointerUp { x, y, button: Button::Secondary };

        assert!(!ix.dispatch(&mut tree, &press(50, 50), &mut ev));
        ix.dispatch(&mut tree, &InputEvent::PointerMove { x: 50, y: 10 }, &mut ev);
        assert!(!ix.dispatch(&mut tree, &release(50, 10), &mut ev));

        assert_eq!(ix.focused(), None);
        assert_eq!(tree.scroll_state(scroller).unwrap().offset, Offset::ZERO);
        assert_eq!(recorder(&tree, item).clicks, 0);
        assert_eq!(recorder(&tree, item).drags, 0);
        assert!(ev.drain().iter().all(|e| matches!(e, UiEvent::HoverChanged { .. })));
    }

    #[test]
    fn secondary_release_keeps_primary_press_alive() {
        let (mut tree, _scroller, item, mut ix, mut ev) = scroll_fixture();
        ix.dispatch(&mut tree, &down(50, 50), &mut ev);
        ix.dispatch(&mut tree, &InputEvent::PointerUp { x: 50, y: 50, button: Button::Middle }, &mut ev);
        assert_eq!(recorder(&tree, item).releases, 0);
        ix.dispatch(&mut tree, &up(50, 50), &mut ev);
        assert_eq!(recorder(&tree, item).releases, 1);
        assert!(ev.drain().contains(&UiEvent::Activated(item)));
    }

    // ── Pruning ──────────────────────────────────────────────────────

    #[test]
    fn forget_clears_removed_focus_and_hover() {
        let mut tree = ElementTree::new();
        let r = root(&mut tree);
        let a = button(&mut tree, r, Region::new(0, 0, 20, 20));
        let (mut ix, mut ev) = (Interaction::default(), EventQueue::new());
        frame(&mut tree, &mut ix, &mut ev);
        ix.dispatch(&mut tree, &InputEvent::PointerMove { x: 5, y: 5 }, &mut ev);
        ix.focus(&mut tree, a, &mut ev);

        let removed = tree.remove(a).unwrap();
        ix.forget(&removed, &mut ev);
        assert_eq!(ix.focused(), None);
        assert_eq!(ix.hovered(), None);
        assert!(ix.hit_test(Offset::new(5, 5)).is_empty());
    }

    #[test]
    fn hiding_the_focus_target_clears_it_on_rebuild() {
        let mut tree = ElementTree::new();
        let r = root(&mut tree);
        let a = button(&mut tree, r, Region::new(0, 0, 20, 20));
        let (mut ix, mut ev) = (Interaction::default(), EventQueue::new());
        frame(&mut tree, &mut ix, &mut ev);
        ix.focus(&mut tree, a, &mut ev);
        tree.set_visible(a, false).unwrap();
        frame(&mut tree, &mut ix, &mut ev);
        assert_eq!(ix.focused(), None);
        assert!(!tree.get(a).unwrap().is_focused());
    }
}
