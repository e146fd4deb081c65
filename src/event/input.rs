//! Host input events.
//!
//! [`InputEvent`] is what the dispatcher consumes: pointer move/press/release,
//! wheel, key and typed character, all in engine coordinates. A crossterm
//! adapter is provided so terminal hosts can feed events straight through;
//! everything past this module is independent of crossterm.

use std::ops::{BitAnd, BitOr};

use crate::geometry::Offset;

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// Keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

/// Modifier key bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(pub u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(1);
    pub const CTRL: Modifiers = Modifiers(2);
    pub const ALT: Modifiers = Modifiers(4);

    /// Check whether `self` contains all the bits in `other`.
    pub fn contains(self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;
    fn bitor(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 | rhs.0)
    }
}

impl BitAnd for Modifiers {
    type Output = Modifiers;
    fn bitand(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 & rhs.0)
    }
}

// ---------------------------------------------------------------------------
// KeyEvent
// ---------------------------------------------------------------------------

/// A key press with modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(code: Key, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// Shorthand for a key with no modifiers.
    pub fn plain(code: Key) -> Self {
        Self::new(code, Modifiers::NONE)
    }
}

// ---------------------------------------------------------------------------
// Pointer
// ---------------------------------------------------------------------------

/// Pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Button {
    #[default]
    Primary,
    Secondary,
    Middle,
}

// ---------------------------------------------------------------------------
// InputEvent
// ---------------------------------------------------------------------------

/// One unit of host input.
///
/// Wheel deltas are in notches; positive `dy` means "wheel up", which moves
/// content down (the offset decreases).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    PointerMove { x: i32, y: i32 },
    PointerDown { x: i32, y: i32, button: Button },
    PointerUp { x: i32, y: i32, button: Button },
    Wheel { x: i32, y: i32, dx: i32, dy: i32 },
    Key(KeyEvent),
    Char(char),
    Resize { width: i32, height: i32 },
}

impl InputEvent {
    /// Pointer position carried by the event, if any.
    pub fn position(&self) -> Option<Offset> {
        match *self {
            InputEvent::PointerMove { x, y }
            | InputEvent::PointerDown { x, y, .. }
            | InputEvent::PointerUp { x, y, .. }
            | InputEvent::Wheel { x, y, .. } => Some(Offset::new(x, y)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// crossterm conversions
// ---------------------------------------------------------------------------

fn convert_modifiers(m: crossterm::event::KeyModifiers) -> Modifiers {
    let mut out = Modifiers::NONE;
    if m.contains(crossterm::event::KeyModifiers::SHIFT) {
        out = out | Modifiers::SHIFT;
    }
    if m.contains(crossterm::event::KeyModifiers::CONTROL) {
        out = out | Modifiers::CTRL;
    }
    if m.contains(crossterm::event::KeyModifiers::ALT) {
        out = out | Modifiers::ALT;
    }
    out
}

fn convert_key(code: crossterm::event::KeyCode) -> Option<Key> {
    use crossterm::event::KeyCode;
    let key = match code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::F(n) => Key::F(n),
        _ => return None,
    };
    Some(key)
}

fn convert_button(b: crossterm::event::MouseButton) -> Button {
    match b {
        crossterm::event::MouseButton::Left => Button::Primary,
        crossterm::event::MouseButton::Right => Button::Secondary,
        crossterm::event::MouseButton::Middle => Button::Middle,
    }
}

impl TryFrom<crossterm::event::KeyEvent> for KeyEvent {
    type Error = ();

    /// Fails for key codes with no [`Key`] counterpart (media keys, lone
    /// modifiers, ...).
    fn try_from(ct: crossterm::event::KeyEvent) -> Result<Self, Self::Error> {
        let code = convert_key(ct.code).ok_or(())?;
        Ok(KeyEvent { code, modifiers: convert_modifiers(ct.modifiers) })
    }
}

/// Translate a crossterm event into engine input.
///
/// Printable characters without Ctrl/Alt become [`InputEvent::Char`]; key
/// releases, terminal focus changes and pastes are dropped. Terminal cells
/// are used directly as engine coordinates.
pub fn from_crossterm(event: crossterm::event::Event) -> Option<InputEvent> {
    use crossterm::event::{Event, KeyCode, KeyEventKind, MouseEventKind};
    match event {
        Event::Key(ke) => {
            if ke.kind == KeyEventKind::Release {
                return None;
            }
            let mods = convert_modifiers(ke.modifiers);
            if let KeyCode::Char(c) = ke.code {
                if !mods.contains(Modifiers::CTRL) && !mods.contains(Modifiers::ALT) {
                    return Some(InputEvent::Char(c));
                }
            }
            KeyEvent::try_from(ke).ok().map(InputEvent::Key)
        }
        Event::Mouse(me) => {
            let (x, y) = (i32::from(me.column), i32::from(me.row));
            let ev = match me.kind {
                MouseEventKind::Down(b) => InputEvent::PointerDown { x, y, button: convert_button(b) },
                MouseEventKind::Up(b) => InputEvent::PointerUp { x, y, button: convert_button(b) },
                MouseEventKind::Drag(_) | MouseEventKind::Moved => InputEvent::PointerMove { x, y },
                MouseEventKind::ScrollUp => InputEvent::Wheel { x, y, dx: 0, dy: 1 },
                MouseEventKind::ScrollDown => InputEvent::Wheel { x, y, dx: 0, dy: -1 },
                MouseEventKind::ScrollLeft => InputEvent::Wheel { x, y, dx: 1, dy: 0 },
                MouseEventKind::ScrollRight => InputEvent::Wheel { x, y, dx: -1, dy: 0 },
            };
            Some(ev)
        }
        Event::Resize(w, h) => Some(InputEvent::Resize { width: i32::from(w), height: i32::from(h) }),
        Event::FocusGained | Event::FocusLost | Event::Paste(_) => None,
    }
}

// ===========================================================================
// Tests
// ===========================================================================
