//! Entity spawning
//!
//! Each category has its own repeating timer. Timer events are routed here
//! by the tick; every spawn re-checks the game-over guard at invocation.

use glam::Vec2;
use rand::Rng;

use super::difficulty::GameMode;
use super::entity::{EntityKind, HazardKind, ObstacleKind, PoolKind, Species};
use super::state::GameState;
use super::timers::TimerEvent;
use crate::consts::WORLD_HEIGHT;
use crate::ms_to_ticks;

/// Swimmer pearl/golden shell/shield cadence
pub const PEARL_INTERVAL_MS: u32 = 800;
pub const GOLDEN_SHELL_INTERVAL_MS: u32 = 8000;
pub const SHIELD_INTERVAL_MS: u32 = 15000;
/// Platformer power-up cadence
pub const POWER_UP_INTERVAL_MS: u32 = 12000;
/// One-shot openers so the first obstacle doesn't wait a full period
pub const FIRST_OBSTACLE_MS: u32 = 2000;
pub const FIRST_HAZARD_MS: u32 = 3000;
/// Delay between a baby and its parent
pub const PARENT_DELAY_MS: u32 = 3000;

/// Probability a pearl spawn becomes a cluster
const PEARL_CLUSTER_CHANCE: f64 = 0.4;
const PEARL_CLUSTER_SPACING: f32 = 25.0;
const PEARL_CLUSTER_JITTER: f32 = 20.0;

const PLATFORM_COLLECTIBLE_CHANCE: f64 = 0.5;
const PLATFORM_SHELL_CHANCE: f64 = 0.7;
const COLLECTIBLE_SHELL_CHANCE: f64 = 0.6;

/// Uniform in `[lo, hi)`, tolerating an empty range
fn band(state: &mut GameState, lo: f32, hi: f32) -> f32 {
    if hi <= lo {
        lo
    } else {
        state.rng.random_range(lo..hi)
    }
}

/// `base - [0, span)`
fn below(state: &mut GameState, base: f32, span: f32) -> f32 {
    base - band(state, 0.0, span)
}

/// Build the starting world (platformer ground and starter platforms)
pub fn populate_start(state: &mut GameState) {
    if state.mode != GameMode::CoralReef {
        return;
    }
    let h = WORLD_HEIGHT;
    state.spawn(EntityKind::Platform { anchored: true }, Vec2::new(150.0, h - 50.0));
    for i in 0..4 {
        let x = 350.0 + i as f32 * 180.0;
        let y = below(state, h - 100.0, 150.0);
        place_platform(state, Vec2::new(x, y));
    }
}

/// Arm the repeating spawn timers for the run's mode
pub fn arm_timers(state: &mut GameState) {
    let profile = state.profile;
    state.timers.clear();
    match state.mode {
        GameMode::OceanDash => {
            state.hazard_timer = Some(
                state
                    .timers
                    .every(ms_to_ticks(profile.obstacle_interval_ms), TimerEvent::SpawnHazard),
            );
            state.platform_timer = None;
            state
                .timers
                .every(ms_to_ticks(PEARL_INTERVAL_MS), TimerEvent::SpawnPearl);
            state
                .timers
                .every(ms_to_ticks(GOLDEN_SHELL_INTERVAL_MS), TimerEvent::SpawnGoldenShell);
            state
                .timers
                .every(ms_to_ticks(SHIELD_INTERVAL_MS), TimerEvent::SpawnShield);
            state
                .timers
                .after(ms_to_ticks(FIRST_OBSTACLE_MS), TimerEvent::SpawnHazard);
        }
        GameMode::CoralReef => {
            let platform_ms = profile.platform_interval_ms.unwrap_or(2000);
            let creature_ms = profile.creature_interval_ms.unwrap_or(8000);
            state.platform_timer = Some(
                state
                    .timers
                    .every(ms_to_ticks(platform_ms), TimerEvent::SpawnPlatform),
            );
            state.timers.every(
                ms_to_ticks(profile.collectible_interval_ms),
                TimerEvent::SpawnCollectible,
            );
            state
                .timers
                .every(ms_to_ticks(creature_ms), TimerEvent::SpawnBaby);
            state
                .timers
                .every(ms_to_ticks(POWER_UP_INTERVAL_MS), TimerEvent::SpawnPowerUp);
            state.hazard_timer = Some(
                state
                    .timers
                    .every(ms_to_ticks(profile.obstacle_interval_ms), TimerEvent::SpawnHazard),
            );
            state
                .timers
                .after(ms_to_ticks(FIRST_HAZARD_MS), TimerEvent::SpawnHazard);
        }
    }
    log::debug!(
        "Armed {} timers for {} ({})",
        state.timers.len(),
        state.mode.as_str(),
        state.difficulty.as_str()
    );
}

/// Run a spawn event. Returns false if the event was dropped.
pub fn handle_spawn(state: &mut GameState, event: TimerEvent) -> bool {
    if state.is_game_over() {
        return false;
    }
    match (state.mode, event) {
        (GameMode::OceanDash, TimerEvent::SpawnHazard) => spawn_obstacle(state),
        (GameMode::OceanDash, TimerEvent::SpawnPearl) => spawn_pearls(state),
        (GameMode::OceanDash, TimerEvent::SpawnGoldenShell) => spawn_golden_shell(state),
        (GameMode::OceanDash, TimerEvent::SpawnShield) => spawn_shield(state),
        (GameMode::CoralReef, TimerEvent::SpawnHazard) => spawn_hazard(state),
        (GameMode::CoralReef, TimerEvent::SpawnPlatform) => spawn_platform(state),
        (GameMode::CoralReef, TimerEvent::SpawnCollectible) => spawn_collectible(state),
        (GameMode::CoralReef, TimerEvent::SpawnBaby) => spawn_baby(state),
        (GameMode::CoralReef, TimerEvent::SpawnPowerUp) => spawn_power_up(state),
        (GameMode::CoralReef, TimerEvent::SpawnParent { baby_id, species }) => {
            return spawn_parent(state, baby_id, species);
        }
        (mode, event) => {
            log::warn!("Ignoring {:?} in {}", event, mode.as_str());
            return false;
        }
    }
    true
}

fn spawn_obstacle(state: &mut GameState) {
    let kind = ObstacleKind::ALL[state.rng.random_range(0..ObstacleKind::ALL.len())];
    let y = match kind {
        ObstacleKind::Jellyfish => band(state, 60.0, WORLD_HEIGHT - 100.0),
        ObstacleKind::Seaweed => WORLD_HEIGHT - 60.0,
        ObstacleKind::Coral => WORLD_HEIGHT - 40.0,
    };
    let entity = EntityKind::Obstacle(kind);
    let id = state.spawn(entity, Vec2::new(entity.spawn_x(), y));
    log::debug!("Spawned obstacle {:?} #{} at y={:.0}", kind, id, y);
}

fn spawn_pearls(state: &mut GameState) {
    let x = EntityKind::Pearl.spawn_x();
    let y = band(state, 60.0, WORLD_HEIGHT - 80.0);
    state.spawn(EntityKind::Pearl, Vec2::new(x, y));

    if state.rng.random_bool(PEARL_CLUSTER_CHANCE) {
        for i in 1..4 {
            let jitter = band(state, -PEARL_CLUSTER_JITTER, PEARL_CLUSTER_JITTER);
            state.spawn(
                EntityKind::Pearl,
                Vec2::new(x + i as f32 * PEARL_CLUSTER_SPACING, y + jitter),
            );
        }
    }
}

fn spawn_golden_shell(state: &mut GameState) {
    let y = band(state, 80.0, WORLD_HEIGHT - 100.0);
    state.spawn(
        EntityKind::GoldenShell,
        Vec2::new(EntityKind::GoldenShell.spawn_x(), y),
    );
}

fn spawn_shield(state: &mut GameState) {
    let y = band(state, 80.0, WORLD_HEIGHT - 100.0);
    state.spawn(EntityKind::Shield, Vec2::new(EntityKind::Shield.spawn_x(), y));
}

/// Place a scrolling platform, maybe with a collectible resting above it
fn place_platform(state: &mut GameState, pos: Vec2) {
    state.spawn(EntityKind::Platform { anchored: false }, pos);
    if state.rng.random_bool(PLATFORM_COLLECTIBLE_CHANCE) {
        let kind = if state.rng.random_bool(PLATFORM_SHELL_CHANCE) {
            EntityKind::Shell
        } else {
            EntityKind::Pearl
        };
        state.spawn(kind, Vec2::new(pos.x, pos.y - 25.0));
    }
}

fn spawn_platform(state: &mut GameState) {
    let kind = EntityKind::Platform { anchored: false };
    let y = below(state, WORLD_HEIGHT - 80.0, 200.0);
    place_platform(state, Vec2::new(kind.spawn_x(), y));
}

fn spawn_collectible(state: &mut GameState) {
    let y = below(state, WORLD_HEIGHT - 100.0, 250.0);
    let kind = if state.rng.random_bool(COLLECTIBLE_SHELL_CHANCE) {
        EntityKind::Shell
    } else {
        EntityKind::Pearl
    };
    state.spawn(kind, Vec2::new(kind.spawn_x(), y));
}

fn spawn_baby(state: &mut GameState) {
    let species = Species::ALL[state.rng.random_range(0..Species::ALL.len())];
    let kind = EntityKind::Baby(species);
    let y = below(state, WORLD_HEIGHT - 100.0, 200.0);
    let baby_id = state.spawn(kind, Vec2::new(kind.spawn_x(), y));
    state.timers.after(
        ms_to_ticks(PARENT_DELAY_MS),
        TimerEvent::SpawnParent { baby_id, species },
    );
    log::debug!("Spawned baby {:?} #{}", species, baby_id);
}

/// Parent follows its baby unless the baby is already trailing the player
fn spawn_parent(state: &mut GameState, baby_id: u32, species: Species) -> bool {
    let rescued = state
        .pools
        .find(PoolKind::Babies, baby_id)
        .is_some_and(|baby| baby.is_following);
    if rescued {
        log::debug!("Baby #{} already rescued, skipping parent", baby_id);
        return false;
    }
    let kind = EntityKind::Parent(species);
    let y = below(state, WORLD_HEIGHT - 120.0, 150.0);
    let id = state.spawn(kind, Vec2::new(kind.spawn_x(), y));
    log::debug!("Spawned parent {:?} #{} for baby #{}", species, id, baby_id);
    true
}

fn spawn_power_up(state: &mut GameState) {
    let kind = if state.rng.random_bool(0.5) {
        EntityKind::SpeedBoost
    } else {
        EntityKind::Shield
    };
    let y = below(state, WORLD_HEIGHT - 150.0, 200.0);
    state.spawn(kind, Vec2::new(kind.spawn_x(), y));
}

fn spawn_hazard(state: &mut GameState) {
    let variant = HazardKind::ALL[state.rng.random_range(0..HazardKind::ALL.len())];
    let h = WORLD_HEIGHT;
    let y = match variant {
        HazardKind::Jellyfish => below(state, h - 150.0, 200.0),
        HazardKind::SeaUrchin => below(state, h - 80.0, 150.0),
        HazardKind::TrashBottle => below(state, h - 100.0, 250.0),
        HazardKind::TrashCan => below(state, h - 120.0, 200.0),
        HazardKind::TrashBag => below(state, h - 80.0, 180.0),
    };
    let kind = EntityKind::Hazard(variant);
    let id = state.spawn(kind, Vec2::new(kind.spawn_x(), y));
    log::debug!("Spawned hazard {:?} #{} at y={:.0}", variant, id, y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::difficulty::Difficulty;
    use crate::sim::entity::Category;
    use crate::consts::WORLD_WIDTH;
    use crate::sim::state::GamePhase;

    #[test]
    fn test_ground_platform_is_anchored() {
        let state = GameState::new(GameMode::CoralReef, Difficulty::Easy, 5);
        let ground = &state.pools.platforms[0];
        assert_eq!(ground.kind, EntityKind::Platform { anchored: true });
        assert_eq!(ground.vel, Vec2::ZERO);
        assert_eq!(ground.pos, Vec2::new(150.0, 450.0));
        for (i, p) in state.pools.platforms[1..].iter().enumerate() {
            assert_eq!(p.pos.x, 350.0 + i as f32 * 180.0);
            assert!(p.pos.y <= 400.0 && p.pos.y > 250.0);
        }
    }

    #[test]
    fn test_spawns_enter_from_the_right() {
        let mut state = GameState::new(GameMode::CoralReef, Difficulty::Hard, 11);
        state.pools.clear();
        for event in [
            TimerEvent::SpawnHazard,
            TimerEvent::SpawnPlatform,
            TimerEvent::SpawnCollectible,
            TimerEvent::SpawnBaby,
            TimerEvent::SpawnPowerUp,
        ] {
            for _ in 0..20 {
                assert!(handle_spawn(&mut state, event));
            }
        }
        for entity in state.pools.iter() {
            assert!(entity.pos.x > WORLD_WIDTH, "{:?}", entity.kind);
            assert!(entity.pos.y > 0.0 && entity.pos.y < WORLD_HEIGHT);
        }
    }

    #[test]
    fn test_pearl_clusters() {
        let mut state = GameState::new(GameMode::OceanDash, Difficulty::Easy, 2);
        for _ in 0..200 {
            state.pools.clear();
            handle_spawn(&mut state, TimerEvent::SpawnPearl);
            let n = state.pools.pearls.len();
            assert!(n == 1 || n == 4, "pearl spawn produced {n}");
        }
    }

    #[test]
    fn test_obstacle_variants_uniform_enough() {
        let mut state = GameState::new(GameMode::OceanDash, Difficulty::Easy, 9);
        for _ in 0..300 {
            handle_spawn(&mut state, TimerEvent::SpawnHazard);
        }
        for kind in ObstacleKind::ALL {
            let count = state
                .pools
                .hazards
                .iter()
                .filter(|e| e.kind == EntityKind::Obstacle(kind))
                .count();
            assert!(count > 50, "{kind:?} spawned {count} times");
        }
        assert!(state
            .pools
            .hazards
            .iter()
            .all(|e| e.behavior().category == Category::Hazard));
    }

    #[test]
    fn test_spawns_dropped_after_game_over() {
        let mut state = GameState::new(GameMode::OceanDash, Difficulty::Easy, 1);
        state.phase = GamePhase::GameOver;
        assert!(!handle_spawn(&mut state, TimerEvent::SpawnHazard));
        assert!(state.pools.is_empty());
    }

    #[test]
    fn test_baby_arms_parent_timer() {
        let mut state = GameState::new(GameMode::CoralReef, Difficulty::Easy, 4);
        let before = state.timers.len();
        handle_spawn(&mut state, TimerEvent::SpawnBaby);
        assert_eq!(state.timers.len(), before + 1);
        assert_eq!(state.pools.babies.len(), 1);
    }

    #[test]
    fn test_parent_skipped_when_baby_following() {
        let mut state = GameState::new(GameMode::CoralReef, Difficulty::Easy, 4);
        handle_spawn(&mut state, TimerEvent::SpawnBaby);
        let baby = &mut state.pools.babies[0];
        baby.is_following = true;
        let (baby_id, species) = (baby.id, baby.kind.species().unwrap());
        assert!(!handle_spawn(
            &mut state,
            TimerEvent::SpawnParent { baby_id, species }
        ));
        assert!(state.pools.parents.is_empty());

        state.pools.babies[0].is_following = false;
        assert!(handle_spawn(
            &mut state,
            TimerEvent::SpawnParent { baby_id, species }
        ));
        assert_eq!(state.pools.parents[0].kind, EntityKind::Parent(species));
    }

    #[test]
    fn test_mode_mismatch_is_ignored() {
        let mut state = GameState::new(GameMode::OceanDash, Difficulty::Easy, 1);
        assert!(!handle_spawn(&mut state, TimerEvent::SpawnBaby));
    }
}
