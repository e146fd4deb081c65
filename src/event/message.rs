//! Outbound notifications.
//!
//! The dispatcher records what happened during a frame as [`UiEvent`]s in an
//! [`EventQueue`]; the host drains it after the frame.

use std::collections::VecDeque;

use crate::element::ElementId;
use crate::geometry::Offset;

use super::input::KeyEvent;

/// Something the host may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// An element accepted a pointer press.
    Pressed(ElementId),
    /// Press and release landed on the same element without a scroll drag.
    Activated(ElementId),
    /// Focus moved. Either side may be `None`.
    FocusChanged { from: Option<ElementId>, to: Option<ElementId> },
    /// The hovered element changed.
    HoverChanged { from: Option<ElementId>, to: Option<ElementId> },
    /// A scroll container's offset moved.
    Scrolled { id: ElementId, offset: Offset },
    /// A key reached the focused element and it consumed it.
    KeyDelivered { id: ElementId, key: KeyEvent },
    /// A custom key binding fired.
    Action(String),
}

impl UiEvent {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            UiEvent::Pressed(_) => "pressed",
            UiEvent::Activated(_) => "activated",
            UiEvent::FocusChanged { .. } => "focus-changed",
            UiEvent::HoverChanged { .. } => "hover-changed",
            UiEvent::Scrolled { .. } => "scrolled",
            UiEvent::KeyDelivered { .. } => "key-delivered",
            UiEvent::Action(_) => "action",
        }
    }
}

/// FIFO of [`UiEvent`]s.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<UiEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: UiEvent) {
        self.events.push_back(event);
    }

    pub fn pop(&mut self) -> Option<UiEvent> {
        self.events.pop_front()
    }

    /// Take every queued event, oldest first.
    pub fn drain(&mut self) -> Vec<UiEvent> {
        self.events.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UiEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
