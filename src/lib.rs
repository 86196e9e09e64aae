//! Reef Arcade - simulation core for the Ocean Dash and Coral Reef Quest games
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, physics, collisions, player state)
//! - `game`: Run lifecycle controller wrapping the simulation
//! - `renderer`: Sprite instance generation, parallax and cosmetic tweens
//! - `highscores`: In-memory high score registry
//! - `settings`: Player preferences
//! - `web`: wasm-bindgen host surface (wasm32 only)

pub mod game;
pub mod highscores;
pub mod renderer;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use game::{GameSimulation, InputEvent, SimConfig};
pub use highscores::HighScores;
pub use settings::{Settings, SettingsError};
pub use sim::{Difficulty, GameMode, RunSummary};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Simulation rate (ticks per second)
    pub const SIM_HZ: u32 = 120;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / SIM_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World dimensions (both games share the 800x500 canvas)
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 500.0;

    /// Scaled mermaid sprite and its forgiving hitbox
    pub const PLAYER_SIZE: (f32, f32) = (94.0, 94.0);
    pub const PLAYER_HITBOX: (f32, f32) = (65.0, 75.0);

    /// Shield stays up for its duration plus the fade-out
    pub const SHIELD_FADE_SECS: f32 = 0.5;
    pub const SPEED_BOOST_SECS: f32 = 5.0;
    pub const SPEED_BOOST_MULTIPLIER: f32 = 1.5;
    /// Post-hit blink: 16 yoyo cycles of 100ms each way
    pub const INVINCIBLE_SECS: f32 = 3.2;
    pub const KNOCKBACK: (f32, f32) = (-100.0, -200.0);

    /// Delay between the hit and the summary hand-off
    pub const GAME_OVER_ANIM_SECS: f32 = 0.5;
}

/// Convert a millisecond duration to whole simulation ticks (at least one)
#[inline]
pub fn ms_to_ticks(ms: u32) -> u32 {
    ((ms as u64 * consts::SIM_HZ as u64 + 500) / 1000).max(1) as u32
}

/// Convert seconds to whole simulation ticks (at least one)
#[inline]
pub fn secs_to_ticks(secs: f32) -> u32 {
    ((secs * consts::SIM_HZ as f32).round() as u32).max(1)
}

/// Size of a `(w, h)` constant as a vector
#[inline]
pub fn size_vec(size: (f32, f32)) -> Vec2 {
    Vec2::new(size.0, size.1)
}

/// Cheap deterministic hash in [0, 1) for cosmetic jitter that must not
/// consume the gameplay RNG
#[inline]
pub fn hash01(a: u32, b: u32) -> f32 {
    let hash = a.wrapping_mul(2654435761).wrapping_add(b.wrapping_mul(31337));
    let hash = hash ^ (hash >> 15);
    (hash % 1000) as f32 / 1000.0
}
