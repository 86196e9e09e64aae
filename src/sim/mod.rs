//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (pool order, then spawn order)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod difficulty;
pub mod entity;
pub mod player;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod timers;

pub use collision::Aabb;
pub use difficulty::{Cadence, Difficulty, DifficultyProfile, GameMode, Progression};
pub use entity::{
    Category, DespawnStyle, Entity, EntityKind, HazardKind, ObstacleKind, PoolKind, Pools, Species,
};
pub use player::{Player, PlayerStatus};
pub use state::{
    CameraFx, FloatingText, GameEvent, GameOverCause, GamePhase, GameState, Particle, RunStats,
    RunSummary,
};
pub use tick::{TickInput, tick};
pub use timers::{TimerEvent, TimerWheel};
