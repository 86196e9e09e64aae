//! Difficulty tiers and per-mode tuning tables
//!
//! Profiles are `const` data; nothing here mutates after startup.

use serde::{Deserialize, Serialize};

/// Which of the two arcade games is being simulated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Endless swimmer: tap to swim, first hit ends the run
    #[default]
    OceanDash,
    /// Side-scrolling platformer with lives and creature rescue
    CoralReef,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::OceanDash => "ocean_dash",
            GameMode::CoralReef => "coral_reef",
        }
    }

    /// Parse a mode key, falling back to Ocean Dash
    pub fn from_key(key: &str) -> Self {
        match key.to_lowercase().replace(['-', ' '], "_").as_str() {
            "ocean_dash" | "oceandash" | "swimmer" => GameMode::OceanDash,
            "coral_reef" | "coralreef" | "coral_reef_quest" | "platformer" => GameMode::CoralReef,
            other => {
                log::warn!("Unknown game mode '{}', defaulting to ocean_dash", other);
                GameMode::OceanDash
            }
        }
    }

    /// Label of the run's primary score on results screens
    pub fn score_unit(&self) -> &'static str {
        match self {
            GameMode::OceanDash => "m",
            GameMode::CoralReef => "points",
        }
    }
}

/// Named difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Parse a tier key. Unknown keys fall back to `Easy` rather than
    /// failing the run.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "medium" | "med" => Difficulty::Medium,
            "hard" => Difficulty::Hard,
            other => {
                log::warn!("Unknown difficulty '{}', defaulting to easy", other);
                Difficulty::Easy
            }
        }
    }

    /// Index into the tuning tables
    fn index(self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }
}

/// Tunable physics and spawn constants for one mode/tier pair.
///
/// Forces are in px/s (negative = up), intervals in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DifficultyProfile {
    pub label: &'static str,
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Swim or jump impulse
    pub primary_impulse: f32,
    /// Double-jump impulse (platformer only)
    pub secondary_impulse: Option<f32>,
    /// Base world scroll speed
    pub travel_speed: f32,
    /// Player run speed (platformer only)
    pub player_speed: Option<f32>,
    /// Obstacle (swimmer) or hazard (platformer) spawn interval
    pub obstacle_interval_ms: u32,
    /// Platform spawn interval (platformer only)
    pub platform_interval_ms: Option<u32>,
    pub collectible_interval_ms: u32,
    /// Baby creature spawn interval (platformer only)
    pub creature_interval_ms: Option<u32>,
    /// Life pool (platformer only; the swimmer ends on first hit)
    pub starting_lives: Option<u8>,
}

const OCEAN_DASH: [DifficultyProfile; 3] = [
    DifficultyProfile {
        label: "Easy (Ages 5-6)",
        gravity: 150.0,
        primary_impulse: -280.0,
        secondary_impulse: None,
        travel_speed: 120.0,
        player_speed: None,
        obstacle_interval_ms: 3000,
        platform_interval_ms: None,
        collectible_interval_ms: 800,
        creature_interval_ms: None,
        starting_lives: None,
    },
    DifficultyProfile {
        label: "Medium (Ages 7-8)",
        gravity: 200.0,
        primary_impulse: -320.0,
        secondary_impulse: None,
        travel_speed: 180.0,
        player_speed: None,
        obstacle_interval_ms: 2200,
        platform_interval_ms: None,
        collectible_interval_ms: 800,
        creature_interval_ms: None,
        starting_lives: None,
    },
    DifficultyProfile {
        label: "Hard (Ages 9-10)",
        gravity: 250.0,
        primary_impulse: -360.0,
        secondary_impulse: None,
        travel_speed: 240.0,
        player_speed: None,
        obstacle_interval_ms: 1600,
        platform_interval_ms: None,
        collectible_interval_ms: 800,
        creature_interval_ms: None,
        starting_lives: None,
    },
];

const CORAL_REEF: [DifficultyProfile; 3] = [
    DifficultyProfile {
        label: "Easy (Ages 5-6)",
        gravity: 800.0,
        primary_impulse: -400.0,
        secondary_impulse: Some(-350.0),
        travel_speed: 80.0,
        player_speed: Some(200.0),
        obstacle_interval_ms: 4000,
        platform_interval_ms: Some(2000),
        collectible_interval_ms: 1500,
        creature_interval_ms: Some(8000),
        starting_lives: Some(3),
    },
    DifficultyProfile {
        label: "Medium (Ages 7-8)",
        gravity: 900.0,
        primary_impulse: -450.0,
        secondary_impulse: Some(-380.0),
        travel_speed: 120.0,
        player_speed: Some(250.0),
        obstacle_interval_ms: 2500,
        platform_interval_ms: Some(1600),
        collectible_interval_ms: 1200,
        creature_interval_ms: Some(10000),
        starting_lives: Some(3),
    },
    DifficultyProfile {
        label: "Hard (Ages 9-10)",
        gravity: 1000.0,
        primary_impulse: -500.0,
        secondary_impulse: Some(-420.0),
        travel_speed: 160.0,
        player_speed: Some(300.0),
        obstacle_interval_ms: 1800,
        platform_interval_ms: Some(1200),
        collectible_interval_ms: 1000,
        creature_interval_ms: Some(12000),
        starting_lives: Some(3),
    },
];

impl DifficultyProfile {
    /// Look up the profile for a mode and tier
    pub fn lookup(mode: GameMode, difficulty: Difficulty) -> &'static DifficultyProfile {
        let table = match mode {
            GameMode::OceanDash => &OCEAN_DASH,
            GameMode::CoralReef => &CORAL_REEF,
        };
        &table[difficulty.index()]
    }
}

/// Step-function acceleration of a repeating spawn timer.
///
/// Each time progress crosses another `quantum`, the delay drops by
/// `step_ms`, never going below `floor_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Constant,
    Stepped { step_ms: u32, floor_ms: u32 },
}

impl Cadence {
    /// Delay for the given speed tier (number of quanta crossed)
    pub fn delay_ms(&self, base_ms: u32, tier: u32) -> u32 {
        match *self {
            Cadence::Constant => base_ms,
            Cadence::Stepped { step_ms, floor_ms } => base_ms
                .saturating_sub(step_ms.saturating_mul(tier))
                .max(floor_ms.min(base_ms)),
        }
    }
}

/// Per-mode progression rules (not tier dependent)
#[derive(Debug, Clone, Copy)]
pub struct Progression {
    /// Progress units per speed tier (distance for swimmer, score for platformer)
    pub quantum: u64,
    /// Scroll speed added per tier
    pub speed_step: f32,
    /// Primary obstacle/hazard timer cadence
    pub obstacle_cadence: Cadence,
    /// Platform timer cadence (platformer only)
    pub platform_cadence: Cadence,
}

impl Progression {
    pub fn for_mode(mode: GameMode) -> Self {
        match mode {
            GameMode::OceanDash => Self {
                quantum: 500,
                speed_step: 20.0,
                obstacle_cadence: Cadence::Constant,
                platform_cadence: Cadence::Constant,
            },
            GameMode::CoralReef => Self {
                quantum: 100,
                speed_step: 10.0,
                obstacle_cadence: Cadence::Stepped {
                    step_ms: 150,
                    floor_ms: 900,
                },
                platform_cadence: Cadence::Stepped {
                    step_ms: 100,
                    floor_ms: 800,
                },
            },
        }
    }

    /// Speed tier for a progress value
    pub fn tier(&self, progress: u64) -> u32 {
        (progress / self.quantum).min(u32::MAX as u64) as u32
    }

    /// World scroll speed for a tier
    pub fn game_speed(&self, base: f32, tier: u32) -> f32 {
        base + tier as f32 * self.speed_step
    }
}
