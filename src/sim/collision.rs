//! Axis-aligned overlap tests and one-way platform resolution
//!
//! Every entity collides through a box smaller than its sprite so that
//! grazing contacts don't count.

use glam::Vec2;

/// Axis-aligned bounding box stored as center + half extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half: size * 0.5,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.center.y - self.half.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.center.y + self.half.y
    }

    /// Strict overlap; touching edges do not count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let d = (self.center - other.center).abs();
        let reach = self.half + other.half;
        d.x < reach.x && d.y < reach.y
    }

    /// Horizontal extents overlap
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        (self.center.x - other.center.x).abs() < self.half.x + other.half.x
    }
}

/// Result of resolving the player against one platform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    /// Corrected player center y
    pub y: f32,
}

/// Small allowance so a player resting on a platform stays grounded
const LANDING_SLOP: f32 = 0.5;

/// One-way platform check. The player lands only when moving down and its
/// feet were at or above the platform top on the previous tick.
pub fn land_on_platform(
    prev_bottom: f32,
    player: &Aabb,
    vel_y: f32,
    platform: &Aabb,
) -> Option<Landing> {
    if vel_y < 0.0 || !player.overlaps_x(platform) {
        return None;
    }
    let top = platform.top();
    if prev_bottom <= top + LANDING_SLOP && player.bottom() >= top {
        Some(Landing {
            y: top - player.half.y,
        })
    } else {
        None
    }
}

/// Clamp a box inside `[min, max]`; returns which axes were blocked.
pub fn clamp_to_bounds(center: &mut Vec2, half: Vec2, min: Vec2, max: Vec2) -> (bool, bool) {
    let lo = min + half;
    let hi = max - half;
    let clamped = center.clamp(lo, hi);
    let blocked = (clamped.x != center.x, clamped.y != center.y);
    *center = clamped;
    blocked
}
