//! Game state and core simulation types
//!
//! Everything a run mutates lives in `GameState`. Only `tick` and the
//! spawner write to it.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::{Difficulty, DifficultyProfile, GameMode, Progression};
use super::entity::{Entity, EntityKind, Pools, Species};
use super::player::Player;
use super::spawner;
use super::timers::{TimerEvent, TimerId, TimerWheel};
use crate::consts::WORLD_HEIGHT;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// World built, timers armed, waiting for `start`
    Ready,
    /// Active gameplay
    Playing,
    /// Frozen by the player
    Paused,
    /// Terminal animation running; no more gameplay mutation
    GameOver,
    /// Summary handed off
    Ended,
}

/// Why the run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverCause {
    /// Swimmer touched an obstacle without a shield
    Hazard,
    /// Platformer lost its last life
    OutOfLives,
    /// Platformer dropped below the world
    FellOut,
}

/// Gameplay notifications for the host (audio, HUD pops, floating text)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    Swam,
    Jumped,
    DoubleJumped,
    PearlCollected { total: u32 },
    ShellCollected { total: u32 },
    GoldenShellCollected { total: u32 },
    ShieldActivated,
    ShieldExpired,
    SpeedBoostActivated,
    SpeedBoostExpired,
    HazardAbsorbed,
    PlayerHit { lives_left: u8 },
    InvincibilityEnded,
    BabyRescued { species: Species },
    FamilyReunited { species: Species },
    SpeedTierUp { tier: u32, speed: f32 },
    GameOver { cause: GameOverCause },
    RunFinished,
}

/// Per-run counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Swimmer distance (exact; reported floored)
    pub distance: f32,
    /// Platformer score
    pub score: u64,
    /// Fractional time score not yet credited
    #[serde(skip)]
    pub time_score_carry: f32,
    pub pearls_collected: u32,
    pub shells_collected: u32,
    pub golden_shells_collected: u32,
    pub babies_reunited: u32,
    pub lives: u8,
    pub lives_lost: u8,
}

/// Final results of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    /// Distance for Ocean Dash, points for Coral Reef Quest
    pub score: u64,
    /// Pearls (Ocean Dash) or shells + pearls (Coral Reef Quest)
    pub currency: u32,
    pub pearls: u32,
    pub shells: u32,
    /// Families reunited (Coral Reef Quest only)
    pub babies_reunited: Option<u32>,
    pub lives_lost: u8,
    pub cause: GameOverCause,
    pub is_new_high_score: bool,
    pub previous_best: u64,
}

/// Camera flash request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    pub color: [u8; 3],
    pub duration: f32,
    pub remaining: f32,
}

/// Cosmetic camera effects (never gameplay-affecting)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CameraFx {
    pub flash: Option<Flash>,
    /// Shake intensity (fraction of the viewport)
    pub shake: f32,
    pub shake_remaining: f32,
}

impl CameraFx {
    pub fn flash(&mut self, color: [u8; 3], duration: f32) {
        self.flash = Some(Flash {
            color,
            duration,
            remaining: duration,
        });
    }

    pub fn shake(&mut self, intensity: f32, duration: f32) {
        self.shake = intensity;
        self.shake_remaining = duration;
    }

    pub fn decay(&mut self, dt: f32) {
        if let Some(flash) = &mut self.flash {
            flash.remaining -= dt;
            if flash.remaining <= 0.0 {
                self.flash = None;
            }
        }
        self.shake_remaining = (self.shake_remaining - dt).max(0.0);
        if self.shake_remaining == 0.0 {
            self.shake = 0.0;
        }
    }
}

/// Floating feedback text ("OUCH!", "Rescued!")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingText {
    pub text: String,
    pub pos: Vec2,
    pub color: [u8; 3],
    pub age: f32,
    pub lifetime: f32,
    /// Total upward drift over the lifetime
    pub rise: f32,
}

/// A bubble particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 1 at birth, 0 at death
    pub life: f32,
    /// Life lost per second
    pub decay: f32,
    pub size: f32,
}

/// Maximum particles
pub const MAX_PARTICLES: usize = 128;

/// Complete state of a run
#[derive(Debug, Clone)]
pub struct GameState {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub profile: &'static DifficultyProfile,
    pub progression: Progression,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub player: Player,
    pub pools: Pools,
    /// Rescued babies in rescue order
    pub following: Vec<u32>,
    pub stats: RunStats,
    /// Current world scroll speed
    pub game_speed: f32,
    /// Number of progression quanta crossed
    pub speed_tier: u32,
    pub timers: TimerWheel,
    /// Timer events waiting to be processed this tick
    pub timer_queue: VecDeque<TimerEvent>,
    /// Primary obstacle/hazard timer (re-armed on tier changes)
    pub hazard_timer: Option<TimerId>,
    /// Platform timer (platformer only)
    pub platform_timer: Option<TimerId>,
    /// Pending shield expiry (drives the fade-out)
    pub shield_timer: Option<TimerId>,
    pub game_over_cause: Option<GameOverCause>,
    /// Seconds since the run ended (drives the terminal animation)
    pub game_over_elapsed: f32,
    /// Events since the host last drained them
    pub events: Vec<GameEvent>,
    pub camera: CameraFx,
    pub texts: Vec<FloatingText>,
    pub particles: Vec<Particle>,
    next_id: u32,
}

impl GameState {
    /// Build a fresh run: world populated, timers armed, phase `Ready`
    pub fn new(mode: GameMode, difficulty: Difficulty, seed: u64) -> Self {
        let profile = DifficultyProfile::lookup(mode, difficulty);
        let player_start = match mode {
            GameMode::OceanDash => Vec2::new(100.0, WORLD_HEIGHT / 2.0),
            GameMode::CoralReef => Vec2::new(120.0, WORLD_HEIGHT - 120.0),
        };
        let mut state = Self {
            mode,
            difficulty,
            profile,
            progression: Progression::for_mode(mode),
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Ready,
            time_ticks: 0,
            player: Player::new(player_start),
            pools: Pools::default(),
            following: Vec::new(),
            stats: RunStats {
                lives: profile.starting_lives.unwrap_or(0),
                ..Default::default()
            },
            game_speed: profile.travel_speed,
            speed_tier: 0,
            timers: TimerWheel::new(),
            timer_queue: VecDeque::new(),
            hazard_timer: None,
            platform_timer: None,
            shield_timer: None,
            game_over_cause: None,
            game_over_elapsed: 0.0,
            events: Vec::new(),
            camera: CameraFx::default(),
            texts: Vec::new(),
            particles: Vec::new(),
            next_id: 1,
        };

        spawner::populate_start(&mut state);
        spawner::arm_timers(&mut state);

        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Create an entity and place it in its pool; returns its id
    pub fn spawn(&mut self, kind: EntityKind, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        let mut entity = Entity::new(id, kind, pos, self.time_ticks);
        entity.vel = Vec2::new(-self.game_speed * entity.speed_multiplier(), 0.0);
        self.pools.insert(entity);
        id
    }

    /// Once true, nothing may change score, currency or lives
    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver | GamePhase::Ended)
    }

    /// Progress value that drives speed tiers
    pub fn progress(&self) -> u64 {
        match self.mode {
            GameMode::OceanDash => self.distance(),
            GameMode::CoralReef => self.stats.score,
        }
    }

    /// Whole distance units travelled
    pub fn distance(&self) -> u64 {
        self.stats.distance.max(0.0) as u64
    }

    /// Primary score reported to the host
    pub fn final_score(&self) -> u64 {
        self.progress()
    }

    /// Currency credited to the player's account
    pub fn currency(&self) -> u32 {
        match self.mode {
            GameMode::OceanDash => self.stats.pearls_collected,
            GameMode::CoralReef => self.stats.shells_collected + self.stats.pearls_collected,
        }
    }

    pub fn push_text(&mut self, text: impl Into<String>, pos: Vec2, color: [u8; 3], lifetime: f32) {
        self.texts.push(FloatingText {
            text: text.into(),
            pos,
            color,
            age: 0.0,
            lifetime,
            rise: 30.0,
        });
    }

    /// Drain gameplay events for the host
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
