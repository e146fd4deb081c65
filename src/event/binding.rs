//! Key binding registry.
//!
//! [`KeyBindingRegistry`] maps key+modifier combinations to focus-navigation
//! [`BindingAction`]s. The dispatcher consults it before delivering a key to
//! the focused element; a bound key never reaches the element.

use std::collections::HashMap;

use super::input::{Key, KeyEvent, Modifiers};

// ---------------------------------------------------------------------------
// BindingAction
// ---------------------------------------------------------------------------

/// Action taken when a key binding matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingAction {
    /// Move focus to the next element in tab order.
    FocusNext,
    /// Move focus to the previous element in tab order.
    FocusPrevious,
    /// Drop focus entirely.
    ClearFocus,
    /// A named action surfaced to the host as a [`UiEvent::Action`].
    ///
    /// [`UiEvent::Action`]: super::message::UiEvent::Action
    Custom(String),
}

// ---------------------------------------------------------------------------
// KeyBindingRegistry
// ---------------------------------------------------------------------------

/// Registry of key bindings, mapping (Key, Modifiers) -> BindingAction.
#[derive(Debug, Clone, Default)]
pub struct KeyBindingRegistry {
    bindings: HashMap<(Key, Modifiers), BindingAction>,
}

impl KeyBindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the standard navigation bindings.
    ///
    /// - `Tab` -> FocusNext
    /// - `BackTab` (with or without Shift) -> FocusPrevious
    /// - `Escape` -> ClearFocus
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.bind(Key::Tab, Modifiers::NONE, BindingAction::FocusNext);
        registry.bind(Key::BackTab, Modifiers::NONE, BindingAction::FocusPrevious);
        registry.bind(Key::BackTab, Modifiers::SHIFT, BindingAction::FocusPrevious);
        registry.bind(Key::Escape, Modifiers::NONE, BindingAction::ClearFocus);
        registry
    }

    /// Register a binding, replacing any existing one for the same combination.
    pub fn bind(&mut self, key: Key, modifiers: Modifiers, action: BindingAction) {
        self.bindings.insert((key, modifiers), action);
    }

    /// Remove a binding. Returns the removed action, if any.
    pub fn unbind(&mut self, key: Key, modifiers: Modifiers) -> Option<BindingAction> {
        self.bindings.remove(&(key, modifiers))
    }

    /// Exact match on key + modifiers.
    pub fn resolve(&self, event: &KeyEvent) -> Option<&BindingAction> {
        self.bindings.get(&(event.code, event.modifiers))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
