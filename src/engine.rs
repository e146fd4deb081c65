//! The frame driver.
//!
//! [`Engine`] owns the element tree, the interaction state, the layout pass
//! and the host's text backend, and runs one frame in a fixed order:
//! tick behaviors, lay out dirty subtrees, dispatch queued input, paint.
//! Input pushed between frames is held until the dispatch step.

use std::collections::VecDeque;
use std::time::Duration;

use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::element::{ElementId, ElementTree};
use crate::error::EngineError;
use crate::event::{EventQueue, InputEvent, Interaction, UiEvent};
use crate::geometry::Region;
use crate::layout::engine::LayoutStats;
use crate::layout::LayoutEngine;
use crate::paint::{paint, Surface};
use crate::style::StyleTable;
use crate::text::TextMeasure;

/// Counters from one [`Engine::frame`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Behaviors whose tick requested a new layout.
    pub ticked: usize,
    pub layout: LayoutStats,
    /// Input events that something consumed.
    pub dispatched: usize,
    /// Elements drawn.
    pub painted: usize,
}

/// Retained-mode engine: tree + layout + interaction + paint.
pub struct Engine {
    tree: ElementTree,
    interaction: Interaction,
    layout: LayoutEngine,
    config: EngineConfig,
    measure: Box<dyn TextMeasure>,
    viewport: Region,
    pending: VecDeque<InputEvent>,
    events: EventQueue,
    frames: u64,
}

impl Engine {
    pub fn new(config: EngineConfig, measure: impl TextMeasure + 'static) -> Self {
        Self {
            tree: ElementTree::new(),
            interaction: Interaction::new(&config),
            layout: LayoutEngine::new(),
            viewport: config.viewport(),
            config,
            measure: Box::new(measure),
            pending: VecDeque::new(),
            events: EventQueue::new(),
            frames: 0,
        }
    }

    /// Replace the style table (builder).
    pub fn with_style_table(mut self, table: StyleTable) -> Self {
        self.tree.set_style_table(table);
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    /// Mutable tree access for building and editing the UI between frames.
    ///
    /// Use [`remove`](Self::remove) rather than `tree_mut().remove()` so
    /// focus and hover references are dropped with the element.
    pub fn tree_mut(&mut self) -> &mut ElementTree {
        &mut self.tree
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn interaction_mut(&mut self) -> &mut Interaction {
        &mut self.interaction
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn viewport(&self) -> Region {
        self.viewport
    }

    /// Frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.interaction.focused()
    }

    pub fn hovered(&self) -> Option<ElementId> {
        self.interaction.hovered()
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Remove an element and its subtree, dropping any focus, hover or press
    /// reference to them in the same step.
    pub fn remove(&mut self, id: ElementId) -> Result<Vec<ElementId>, EngineError> {
        let removed = self.tree.remove(id)?;
        self.interaction.forget(&removed, &mut self.events);
        Ok(removed)
    }

    /// Focus an element directly. Returns `false` if it cannot take focus.
    pub fn focus(&mut self, id: ElementId) -> bool {
        self.interaction.focus(&mut self.tree, id, &mut self.events)
    }

    pub fn clear_focus(&mut self) {
        self.interaction.clear_focus(&mut self.tree, &mut self.events);
    }

    /// Change the viewport. The root is re-laid out on the next frame.
    pub fn resize(&mut self, width: i32, height: i32) {
        let viewport = Region::new(self.viewport.x, self.viewport.y, width.max(0), height.max(0));
        if viewport != self.viewport {
            self.viewport = viewport;
            debug!(width, height, "viewport resized");
            if let Some(root) = self.tree.root() {
                self.tree.mark_dirty(root);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Frame
    // -----------------------------------------------------------------------

    /// Queue input for the next frame's dispatch step. Resizes apply
    /// immediately.
    pub fn push_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Resize { width, height } => self.resize(width, height),
            other => self.pending.push_back(other),
        }
    }

    /// Input waiting for the next frame.
    pub fn pending_input(&self) -> usize {
        self.pending.len()
    }

    /// Run one frame: tick, layout, dispatch, paint.
    pub fn frame(&mut self, dt: Duration, surface: &mut dyn Surface) -> FrameStats {
        self.frames += 1;
        let ticked = self.tick(dt);
        let layout = self.layout_now();

        let mut dispatched = 0;
        while let Some(event) = self.pending.pop_front() {
            if self.interaction.dispatch(&mut self.tree, &event, &mut self.events) {
                dispatched += 1;
            }
        }

        let painted = paint(&mut self.tree, surface, self.layout.text_cache(), self.measure.as_ref());
        let stats = FrameStats { ticked, layout, dispatched, painted };
        trace!(frame = self.frames, ?stats, "frame done");
        stats
    }

    /// Run the layout pass and refresh the hit map without painting.
    pub fn layout_now(&mut self) -> LayoutStats {
        let stats = self.layout.run(&mut self.tree, self.viewport, self.measure.as_ref());
        self.interaction.rebuild(&mut self.tree, &mut self.events);
        stats
    }

    /// Advance every behavior's animations; those that report a change are
    /// marked dirty.
    fn tick(&mut self, dt: Duration) -> usize {
        let mut changed = Vec::new();
        for id in self.tree.walk() {
            if let Some(behavior) = self.tree.behavior_mut(id) {
                if behavior.tick(dt) {
                    changed.push(id);
                }
            }
        }
        for &id in &changed {
            self.tree.mark_dirty(id);
        }
        changed.len()
    }

    /// Take every notification produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<UiEvent> {
        self.events.drain()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("elements", &self.tree.len())
            .field("viewport", &self.viewport)
            .field("frames", &self.frames)
            .field("pending", &self.pending.len())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use std::any::Any;

    use super::*;
    use crate::element::{Behavior, ElementData};
    use crate::event::input::{Button, Key, KeyEvent};
    use crate::layout::{FlexLayout, LayoutKind};
    use crate::testing::{MonoMeasure, RecordingSurface};

    #[derive(Debug, Default)]
    struct Grower {
        ticks: u32,
    }

    impl Behavior for Grower {
        fn tick(&mut self, _dt: Duration) -> bool {
            self.ticks += 1;
            self.ticks == 1
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn engine() -> Engine {
        Engine::new(EngineConfig::new().with_viewport(200, 100), MonoMeasure::new(8, 16))
    }

    #[test]
    fn frame_runs_all_phases() {
        let mut eng = engine();
        let root = eng.tree_mut().insert(ElementData::container(LayoutKind::Flex(FlexLayout::row())));
        let a = eng
            .tree_mut()
            .insert_child(root, ElementData::leaf().with_size(50, 20).focusable(true))
            .unwrap();
        let mut surface = RecordingSurface::default();
        let stats = eng.frame(Duration::from_millis(16), &mut surface);
        assert_eq!(stats.layout.placed, 2);
        assert_eq!(stats.painted, 2);
        assert_eq!(eng.frame_count(), 1);
        assert!(eng.tree().get(a).unwrap().was_rendered());

        let again = eng.frame(Duration::from_millis(16), &mut surface);
        assert_eq!(again.layout.placed, 0);
    }

    #[test]
    fn input_waits_for_dispatch_step() {
        let mut eng = engine();
        let root = eng.tree_mut().insert(ElementData::container(LayoutKind::Absolute));
        let a = eng
            .tree_mut()
            .insert_child(root, ElementData::leaf().with_rect(Region::new(0, 0, 20, 20)).focusable(true))
            .unwrap();
        eng.push_input(InputEvent::PointerDown { x: 5, y: 5, button: Button::Primary });
        assert_eq!(eng.pending_input(), 1);
        assert_eq!(eng.focused(), None);

        let stats = eng.frame(Duration::ZERO, &mut RecordingSurface::default());
        assert_eq!(stats.dispatched, 1);
        assert_eq!(eng.focused(), Some(a));
        assert_eq!(
            eng.drain_events(),
            vec![UiEvent::Pressed(a), UiEvent::FocusChanged { from: None, to: Some(a) }]
        );
    }

    #[test]
    fn ticking_behavior_marks_dirty() {
        let mut eng = engine();
        let root = eng.tree_mut().insert(ElementData::container(LayoutKind::Absolute));
        eng.tree_mut()
            .insert_child(root, ElementData::leaf().with_size(10, 10).with_behavior(Grower::default()))
            .unwrap();
        let mut surface = RecordingSurface::default();
        let first = eng.frame(Duration::from_millis(16), &mut surface);
        assert_eq!(first.ticked, 1);
        let second = eng.frame(Duration::from_millis(16), &mut surface);
        assert_eq!(second.ticked, 0);
        assert_eq!(second.layout.placed, 0);
    }

    #[test]
    fn remove_clears_focus() {
        let mut eng = engine();
        let root = eng.tree_mut().insert(ElementData::container(LayoutKind::Absolute));
        let a = eng
            .tree_mut()
            .insert_child(root, ElementData::leaf().with_size(10, 10).focusable(true))
            .unwrap();
        eng.frame(Duration::ZERO, &mut RecordingSurface::default());
        assert!(eng.focus(a));
        eng.remove(a).unwrap();
        assert_eq!(eng.focused(), None);
        assert!(eng.remove(a).is_err());

        eng.push_input(InputEvent::Key(KeyEvent::plain(Key::Enter)));
        let stats = eng.frame(Duration::ZERO, &mut RecordingSurface::default());
        assert_eq!(stats.dispatched, 0);
    }

    #[test]
    fn resize_relayouts_root() {
        let mut eng = engine();
        let root = eng.tree_mut().insert(ElementData::container(LayoutKind::Absolute));
        eng.frame(Duration::ZERO, &mut RecordingSurface::default());
        assert_eq!(eng.tree().get(root).unwrap().calculated(), Region::new(0, 0, 200, 100));

        eng.push_input(InputEvent::Resize { width: 320, height: 240 });
        assert_eq!(eng.pending_input(), 0);
        eng.frame(Duration::ZERO, &mut RecordingSurface::default());
        assert_eq!(eng.tree().get(root).unwrap().calculated(), Region::new(0, 0, 320, 240));
    }
}
