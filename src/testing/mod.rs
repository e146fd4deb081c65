//! Headless testing helpers: Pilot, a monospace text backend, a recording
//! surface and layout dumps.
//!
//! Use the [`Pilot`] to drive an [`Engine`](crate::engine::Engine) without a
//! host. Use [`dump_layout`] to capture a laid-out tree as plain text for
//! snapshot assertions.

pub mod measure;
pub mod pilot;
pub mod snapshot;
pub mod surface;

pub use measure::MonoMeasure;
pub use pilot::Pilot;
pub use snapshot::dump_layout;
pub use surface::{DrawOp, RecordingSurface};
