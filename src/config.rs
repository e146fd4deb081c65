//! Engine configuration.
//!
//! [`EngineConfig`] holds the tunables of the interaction layer and the
//! initial viewport. Build it in code with the `with_*` methods or load it
//! from TOML; missing keys keep their defaults.

use serde::Deserialize;

use crate::error::EngineError;
use crate::geometry::Region;

/// Default pointer travel, in pixels, before a press becomes a drag.
pub const DEFAULT_DRAG_THRESHOLD: i32 = 4;

/// Default scroll distance per wheel notch, in pixels.
pub const DEFAULT_WHEEL_STEP: i32 = 16;

/// Configuration for an [`Engine`](crate::engine::Engine).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Chebyshev distance from the press point at which a drag starts.
    pub drag_threshold: i32,
    /// Pixels scrolled per wheel notch.
    pub wheel_step: i32,
    /// Initial viewport width.
    pub width: i32,
    /// Initial viewport height.
    pub height: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            wheel_step: DEFAULT_WHEEL_STEP,
            width: 800,
            height: 600,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document such as:
    ///
    /// ```toml
    /// drag_threshold = 6
    /// wheel_step = 24
    /// width = 1024
    /// height = 768
    /// ```
    pub fn from_toml(source: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = toml::from_str(source)?;
        Ok(config.sanitized())
    }

    pub fn with_drag_threshold(mut self, px: i32) -> Self {
        self.drag_threshold = px.max(0);
        self
    }

    pub fn with_wheel_step(mut self, px: i32) -> Self {
        self.wheel_step = px.max(0);
        self
    }

    pub fn with_viewport(mut self, width: i32, height: i32) -> Self {
        self.width = width.max(0);
        self.height = height.max(0);
        self
    }

    /// The viewport as a region at the origin.
    pub fn viewport(&self) -> Region {
        Region::new(0, 0, self.width, self.height)
    }

    fn sanitized(self) -> Self {
        Self {
            drag_threshold: self.drag_threshold.max(0),
            wheel_step: self.wheel_step.max(0),
            width: self.width.max(0),
            height: self.height.max(0),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
