//! Pilot: drive an [`Engine`] headlessly.
//!
//! The `Pilot` owns an engine with a [`MonoMeasure`] text backend and a
//! [`RecordingSurface`], and turns high-level gestures (click, drag, type)
//! into input events followed by a frame.

use std::time::Duration;

use crate::config::EngineConfig;
use crate::element::{ElementId, ElementTree};
use crate::engine::{Engine, FrameStats};
use crate::event::input::{Button, InputEvent, Key, KeyEvent, Modifiers};
use crate::event::UiEvent;

use super::measure::MonoMeasure;
use super::snapshot::dump_layout;
use super::surface::RecordingSurface;

/// Fixed frame step used by the pilot.
pub const FRAME: Duration = Duration::from_millis(16);

/// A headless engine driver for testing.
///
/// ```ignore
/// use panelkit::testing::Pilot;
///
/// let mut pilot = Pilot::new(320, 200);
/// let root = pilot.tree_mut().insert(ElementData::container(LayoutKind::Absolute));
/// pilot.frame();
/// pilot.click(10, 10);
/// ```
pub struct Pilot {
    engine: Engine,
    surface: RecordingSurface,
}

impl Pilot {
    /// Headless engine with the given viewport and an 8x16 monospace backend.
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_config(EngineConfig::new().with_viewport(width, height))
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { engine: Engine::new(config, MonoMeasure::new(8, 16)), surface: RecordingSurface::new() }
    }

    // ── Access ───────────────────────────────────────────────────────

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn tree(&self) -> &ElementTree {
        self.engine.tree()
    }

    pub fn tree_mut(&mut self) -> &mut ElementTree {
        self.engine.tree_mut()
    }

    /// What the last frame drew.
    pub fn surface(&self) -> &RecordingSurface {
        &self.surface
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.engine.focused()
    }

    pub fn hovered(&self) -> Option<ElementId> {
        self.engine.hovered()
    }

    /// Plain-text dump of the current layout.
    pub fn layout_dump(&self) -> String {
        dump_layout(self.engine.tree())
    }

    /// Take the engine's queued notifications.
    pub fn events(&mut self) -> Vec<UiEvent> {
        self.engine.drain_events()
    }

    // ── Frames ───────────────────────────────────────────────────────

    /// Run one frame, replacing the recorded drawing.
    pub fn frame(&mut self) -> FrameStats {
        self.surface.clear();
        self.engine.frame(FRAME, &mut self.surface)
    }

    /// Queue `event` and run a frame to deliver it.
    pub fn send(&mut self, event: InputEvent) -> FrameStats {
        self.engine.push_input(event);
        self.frame()
    }

    // ── Input simulation ─────────────────────────────────────────────

    pub fn press_key(&mut self, key: Key) -> FrameStats {
        self.send(InputEvent::Key(KeyEvent::plain(key)))
    }

    pub fn press_key_with(&mut self, key: Key, modifiers: Modifiers) -> FrameStats {
        self.send(InputEvent::Key(KeyEvent::new(key, modifiers)))
    }

    /// Type each character of `text` in a single frame.
    pub fn type_text(&mut self, text: &str) -> FrameStats {
        for ch in text.chars() {
            self.engine.push_input(InputEvent::Char(ch));
        }
        self.frame()
    }

    pub fn move_to(&mut self, x: i32, y: i32) -> FrameStats {
        self.send(InputEvent::PointerMove { x, y })
    }

    /// Press and release at (x, y) within one frame.
    pub fn click(&mut self, x: i32, y: i32) -> FrameStats {
        self.engine.push_input(InputEvent::PointerDown { x, y, button: Button::Primary });
        self.engine.push_input(InputEvent::PointerUp { x, y, button: Button::Primary });
        self.frame()
    }

    /// Press at `from`, move to `to` in `steps` equal moves, release at `to`.
    pub fn drag(&mut self, from: (i32, i32), to: (i32, i32), steps: i32) -> FrameStats {
        let steps = steps.max(1);
        self.engine.push_input(InputEvent::PointerDown { x: from.0, y: from.1, button: Button::Primary });
        for i in 1..=steps {
            let x = from.0 + (to.0 - from.0) * i / steps;
            let y = from.1 + (to.1 - from.1) * i / steps;
            self.engine.push_input(InputEvent::PointerMove { x, y });
        }
        self.engine.push_input(InputEvent::PointerUp { x: to.0, y: to.1, button: Button::Primary });
        self.frame()
    }

    /// Wheel `notches` at (x, y); positive scrolls up.
    pub fn wheel(&mut self, x: i32, y: i32, notches: i32) -> FrameStats {
        self.send(InputEvent::Wheel { x, y, dx: 0, dy: notches })
    }

    pub fn resize(&mut self, width: i32, height: i32) -> FrameStats {
        self.send(InputEvent::Resize { width, height })
    }
}

// ===========================================================================
// Tests
// ===========================================================================
