//! Player avatar: physics body plus status flags
//!
//! Shielded, boosted and invincible are independent flags layered over
//! "alive"; any combination can be active at once. Transitions are driven
//! by collision outcomes and timer expiries in `tick`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::{PLAYER_HITBOX, SPEED_BOOST_MULTIPLIER};
use crate::size_vec;

/// Outcome of a primary-action press in the platformer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Ground,
    Double,
}

/// Snapshot of the independent status flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerStatus {
    pub shielded: bool,
    pub boosted: bool,
    pub invincible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub is_shielded: bool,
    pub is_speed_boosted: bool,
    /// Post-hit grace window
    pub is_invincible: bool,
    pub can_double_jump: bool,
    pub has_double_jumped: bool,
    /// Standing on a platform this tick
    pub grounded: bool,
    /// Id of the platform being stood on
    pub standing_on: Option<u32>,
    pub facing_left: bool,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            is_shielded: false,
            is_speed_boosted: false,
            is_invincible: false,
            can_double_jump: false,
            has_double_jumped: false,
            grounded: false,
            standing_on: None,
            facing_left: false,
        }
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::new(self.pos, size_vec(PLAYER_HITBOX))
    }

    pub fn status(&self) -> PlayerStatus {
        PlayerStatus {
            shielded: self.is_shielded,
            boosted: self.is_speed_boosted,
            invincible: self.is_invincible,
        }
    }

    /// Swimmer: every press is a fresh upward impulse, no continuous thrust
    pub fn swim(&mut self, impulse: f32) {
        self.vel.y = impulse;
    }

    /// Platformer jump. Ground jump when standing; otherwise one air jump per
    /// airborne period.
    pub fn jump(&mut self, impulse: f32, double_impulse: f32) -> Option<JumpKind> {
        if self.grounded {
            self.vel.y = impulse;
            self.grounded = false;
            self.standing_on = None;
            self.can_double_jump = true;
            self.has_double_jumped = false;
            Some(JumpKind::Ground)
        } else if self.can_double_jump && !self.has_double_jumped {
            self.vel.y = double_impulse;
            self.has_double_jumped = true;
            Some(JumpKind::Double)
        } else {
            None
        }
    }

    /// Landing restores the air jump
    pub fn land(&mut self, platform_id: u32, y: f32) {
        self.pos.y = y;
        self.vel.y = 0.0;
        self.grounded = true;
        self.standing_on = Some(platform_id);
        self.can_double_jump = true;
        self.has_double_jumped = false;
    }

    /// Horizontal run velocity from held direction keys
    pub fn steer(&mut self, direction: f32, player_speed: f32) {
        let multiplier = if self.is_speed_boosted {
            SPEED_BOOST_MULTIPLIER
        } else {
            1.0
        };
        if direction < 0.0 {
            self.vel.x = -player_speed * 0.5 * multiplier;
            self.facing_left = true;
        } else if direction > 0.0 {
            self.vel.x = player_speed * 0.5 * multiplier;
            self.facing_left = false;
        } else {
            self.vel.x = 0.0;
        }
    }

    /// Returns false if already shielded (re-collection is a no-op)
    pub fn activate_shield(&mut self) -> bool {
        if self.is_shielded {
            return false;
        }
        self.is_shielded = true;
        true
    }

    /// Returns false if already boosted (boosts do not stack)
    pub fn activate_speed_boost(&mut self) -> bool {
        if self.is_speed_boosted {
            return false;
        }
        self.is_speed_boosted = true;
        true
    }

    /// Start the post-hit grace window and knock the player back
    pub fn take_hit(&mut self, knockback: Vec2) {
        self.is_invincible = true;
        self.vel = knockback;
        self.grounded = false;
        self.standing_on = None;
    }
}
