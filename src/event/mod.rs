//! Event system: host input, key bindings, outbound notifications, dispatch.

pub mod binding;
pub mod dispatch;
pub mod input;
pub mod message;

pub use binding::{BindingAction, KeyBindingRegistry};
pub use dispatch::{HitMap, Interaction};
pub use input::{from_crossterm, Button, InputEvent, Key, KeyEvent, Modifiers};
pub use message::{EventQueue, UiEvent};
