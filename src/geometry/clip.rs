//! Clip bounds: a rectangle with an optional uniform corner radius.
//!
//! The same containment test gates hit-testing and is handed to the paint
//! backend, so what the user can click always matches what they can see.
//! Intersection keeps the smaller of the two radii instead of computing an
//! exact rounded-rectangle overlap.

use super::Region;

/// A clip rectangle with a non-negative corner radius.
///
/// Any zero-area clip is treated as [`ClipBounds::INVALID`], meaning nothing
/// inside it is visible or hittable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClipBounds {
    pub region: Region,
    pub radius: i32,
}

impl ClipBounds {
    /// The "nothing visible" sentinel.
    pub const INVALID: ClipBounds = ClipBounds { region: Region::EMPTY, radius: 0 };

    /// A square-cornered clip.
    pub fn rect(region: Region) -> Self {
        Self::rounded(region, 0)
    }

    /// A clip with rounded corners. Negative radii clamp to zero and any
    /// zero-area region collapses to [`ClipBounds::INVALID`].
    pub fn rounded(region: Region, radius: i32) -> Self {
        if region.is_empty() {
            return Self::INVALID;
        }
        Self { region, radius: radius.max(0) }
    }

    /// Whether this clip hides everything.
    #[inline]
    pub fn is_invalid(&self) -> bool {
        self.region.is_empty()
    }

    /// Overlap of two clips.
    ///
    /// Returns [`ClipBounds::INVALID`] when either operand is invalid or the
    /// rectangles do not overlap; otherwise the overlap rectangle with the
    /// smaller radius.
    pub fn intersect(&self, other: &ClipBounds) -> ClipBounds {
        if self.is_invalid() || other.is_invalid() {
            return Self::INVALID;
        }
        let overlap = self.region.intersection(other.region);
        if overlap.is_empty() {
            return Self::INVALID;
        }
        ClipBounds { region: overlap, radius: self.radius.min(other.radius) }
    }

    /// Whether the point lies inside the clip, honouring rounded corners.
    pub fn contains(&self, px: i32, py: i32) -> bool {
        if self.is_invalid() || !self.region.contains(px, py) {
            return false;
        }
        let r = self.effective_radius();
        if r == 0 {
            return true;
        }

        let Region { x, y, .. } = self.region;
        let right = self.region.right();
        let bottom = self.region.bottom();

        let center_x = if px < x + r {
            x + r
        } else if px >= right - r {
            right - r
        } else {
            return true;
        };
        let center_y = if py < y + r {
            y + r
        } else if py >= bottom - r {
            bottom - r
        } else {
            return true;
        };

        let dx = i64::from(px - center_x);
        let dy = i64::from(py - center_y);
        dx * dx + dy * dy <= i64::from(r) * i64::from(r)
    }

    /// Radius clamped so opposite corners never overlap.
    pub fn effective_radius(&self) -> i32 {
        let half = self.region.width.min(self.region.height) / 2;
        self.radius.min(half).max(0)
    }
}

impl Default for ClipBounds {
    fn default() -> Self {
        Self::INVALID
    }
}

impl From<Region> for ClipBounds {
    fn from(region: Region) -> Self {
        Self::rect(region)
    }
}
