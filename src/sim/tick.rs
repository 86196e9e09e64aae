//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. One tick runs,
//! in order: timer events, input, integration, platform landing, collisions,
//! progression and sweep, the fall-out check, then cosmetics.

use glam::Vec2;

use super::autopilot;
use super::collision::{Aabb, clamp_to_bounds, land_on_platform};
use super::difficulty::{Cadence, GameMode};
use super::entity::{Category, DespawnStyle, EntityKind, PoolKind};
use super::player::JumpKind;
use super::spawner;
use super::state::{GameEvent, GameOverCause, GamePhase, GameState, MAX_PARTICLES, Particle};
use super::timers::TimerEvent;
use crate::consts::*;
use crate::{hash01, ms_to_ticks, secs_to_ticks, size_vec};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Swim / jump (pointer down, space, up arrow); edge-triggered
    pub primary: bool,
    /// Held direction keys (platformer)
    pub left: bool,
    pub right: bool,
    /// Pause toggle
    pub pause: bool,
    /// Idle/demo mode - AI plays the game
    pub idle_mode: bool,
}

/// Platformer horizontal limits for the player center
pub const PLAYER_MIN_X: f32 = 50.0;
pub const PLAYER_MAX_X: f32 = 300.0;
/// Fell-out line below the bottom edge
pub const FALL_OUT_MARGIN: f32 = 50.0;
/// Coral Reef time score
pub const TIME_SCORE_PER_SEC: f32 = 10.0;

pub const SHELL_POINTS: u64 = 10;
pub const PEARL_POINTS: u64 = 5;
pub const REUNION_POINTS: u64 = 50;
pub const GOLDEN_SHELL_PEARLS: u32 = 5;

/// Shield duration before its fade starts
fn shield_secs(mode: GameMode) -> f32 {
    match mode {
        GameMode::OceanDash => 5.0,
        GameMode::CoralReef => 6.0,
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                log::info!("Paused");
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                log::info!("Resumed");
            }
            _ => {}
        }
    }

    match state.phase {
        GamePhase::Ready | GamePhase::Paused | GamePhase::Ended => return,
        GamePhase::Playing | GamePhase::GameOver => {}
    }

    state.time_ticks += 1;

    // Timers fire into the queue; the queue drains before physics
    state.timers.advance(&mut state.timer_queue);
    while let Some(event) = state.timer_queue.pop_front() {
        handle_timer(state, event);
    }

    if state.phase == GamePhase::Playing {
        let input = if input.idle_mode {
            autopilot::drive(state)
        } else {
            input.clone()
        };
        apply_input(state, &input);

        let prev_bottom = state.player.hitbox().bottom();
        integrate(state, dt);
        if state.mode == GameMode::CoralReef {
            resolve_platforms(state, prev_bottom);
        }
        resolve_collisions(state);
    }

    if state.phase == GamePhase::Playing {
        advance_progress(state, dt);
        sweep(state);
        if state.mode == GameMode::CoralReef
            && state.player.pos.y > WORLD_HEIGHT + FALL_OUT_MARGIN
        {
            game_over(state, GameOverCause::FellOut);
        }
    }

    update_cosmetics(state, dt);
}

fn handle_timer(state: &mut GameState, event: TimerEvent) {
    if event.is_spawn() {
        spawner::handle_spawn(state, event);
        return;
    }
    match event {
        TimerEvent::ShieldExpired => {
            state.shield_timer = None;
            if state.player.is_shielded && !state.is_game_over() {
                state.player.is_shielded = false;
                state.events.push(GameEvent::ShieldExpired);
            }
        }
        TimerEvent::SpeedBoostExpired => {
            if state.player.is_speed_boosted && !state.is_game_over() {
                state.player.is_speed_boosted = false;
                state.events.push(GameEvent::SpeedBoostExpired);
            }
        }
        TimerEvent::InvincibilityExpired => {
            if state.player.is_invincible && !state.is_game_over() {
                state.player.is_invincible = false;
                state.events.push(GameEvent::InvincibilityEnded);
            }
        }
        TimerEvent::GameOverAnimationDone => {
            if state.phase == GamePhase::GameOver {
                state.phase = GamePhase::Ended;
                state.events.push(GameEvent::RunFinished);
            }
        }
        _ => {}
    }
}

fn apply_input(state: &mut GameState, input: &TickInput) {
    let profile = state.profile;
    match state.mode {
        GameMode::OceanDash => {
            if input.primary {
                state.player.swim(profile.primary_impulse);
                state.events.push(GameEvent::Swam);
            }
        }
        GameMode::CoralReef => {
            if input.primary {
                let double = profile.secondary_impulse.unwrap_or(profile.primary_impulse);
                match state.player.jump(profile.primary_impulse, double) {
                    Some(JumpKind::Ground) => state.events.push(GameEvent::Jumped),
                    Some(JumpKind::Double) => {
                        state.events.push(GameEvent::DoubleJumped);
                        bubble_burst(state);
                    }
                    None => {}
                }
            }
            let direction = match (input.left, input.right) {
                (true, false) => -1.0,
                (false, true) => 1.0,
                _ => 0.0,
            };
            state
                .player
                .steer(direction, profile.player_speed.unwrap_or(0.0));
        }
    }
}

fn integrate(state: &mut GameState, dt: f32) {
    let gravity = state.profile.gravity;
    let player = &mut state.player;

    // A grounded player rides its platform
    if let Some(platform) = player
        .standing_on
        .and_then(|id| state.pools.find(PoolKind::Platforms, id))
    {
        player.pos.x += platform.vel.x * dt;
    }

    player.vel.y += gravity * dt;
    player.pos += player.vel * dt;

    let half = size_vec(PLAYER_HITBOX) * 0.5;
    match state.mode {
        GameMode::OceanDash => {
            let (_, blocked_y) = clamp_to_bounds(
                &mut player.pos,
                half,
                Vec2::ZERO,
                Vec2::new(WORLD_WIDTH, WORLD_HEIGHT),
            );
            if blocked_y {
                player.vel.y = 0.0;
            }
        }
        GameMode::CoralReef => {
            // Bottom stays open so the player can fall out
            player.pos.x = player.pos.x.clamp(PLAYER_MIN_X, PLAYER_MAX_X);
            if player.pos.y - half.y < 0.0 {
                player.pos.y = half.y;
                player.vel.y = player.vel.y.max(0.0);
            }
        }
    }

    // Entities scroll and float; following babies trail the player instead
    let follow_factor = 1.0 - 0.9f32.powf(dt * 60.0);
    let anchor = state.player.pos;
    let now = state.time_ticks;
    for kind in PoolKind::ORDER {
        for entity in state.pools.pool_mut(kind).iter_mut() {
            if entity.despawn.is_none() && !entity.is_following {
                entity.pos += entity.vel * dt;
                let age = now.saturating_sub(entity.born_tick) as f32 * dt;
                entity.bob = entity.kind.bob_offset(age);
            }
        }
    }
    for (index, &id) in state.following.iter().enumerate() {
        if let Some(baby) = state.pools.find_mut(PoolKind::Babies, id) {
            if !baby.active {
                continue;
            }
            let target = anchor + Vec2::new(-30.0 - index as f32 * 25.0, 10.0);
            baby.pos += (target - baby.pos) * follow_factor;
        }
    }
}

/// One-way platforms: land on the highest platform fallen onto this tick
fn resolve_platforms(state: &mut GameState, prev_bottom: f32) {
    let player = &mut state.player;
    player.grounded = false;
    player.standing_on = None;
    if player.vel.y < 0.0 {
        return;
    }
    let hitbox = player.hitbox();
    let landing = state
        .pools
        .platforms
        .iter()
        .filter(|p| p.active)
        .filter_map(|p| {
            let aabb = Aabb::new(p.pos, p.behavior().hitbox);
            land_on_platform(prev_bottom, &hitbox, player.vel.y, &aabb).map(|l| (p.id, l.y))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((id, y)) = landing {
        player.land(id, y);
    }
}

fn resolve_collisions(state: &mut GameState) {
    // Stable snapshot; outcomes may despawn entities mid-iteration
    let snapshot: Vec<(PoolKind, u32)> = PoolKind::ORDER
        .into_iter()
        .filter(|&k| k != PoolKind::Platforms)
        .flat_map(|k| {
            state
                .pools
                .pool(k)
                .iter()
                .filter(|e| e.active && e.despawn.is_none())
                .map(move |e| (k, e.id))
        })
        .collect();

    for (pool, id) in snapshot {
        if state.is_game_over() {
            break;
        }
        let player_box = state.player.hitbox();
        let Some(entity) = state.pools.find(pool, id) else {
            continue;
        };
        if !entity.active || entity.is_following {
            continue;
        }
        let kind = entity.kind;
        if !player_box.overlaps(&entity.hitbox()) {
            continue;
        }
        match kind.behavior().category {
            Category::Collectible => collect(state, pool, id, kind),
            Category::PowerUp => power_up(state, pool, id, kind),
            Category::Hazard => hit_hazard(state, pool, id),
            Category::Creature => meet_creature(state, pool, id, kind),
            Category::Platform => {}
        }
    }
}

fn despawn(state: &mut GameState, pool: PoolKind, id: u32, style: DespawnStyle) {
    if let Some(entity) = state.pools.find_mut(pool, id) {
        entity.begin_despawn(style);
    }
}

fn collect(state: &mut GameState, pool: PoolKind, id: u32, kind: EntityKind) {
    let style = match state.mode {
        GameMode::OceanDash => DespawnStyle::FlyToHud,
        GameMode::CoralReef => DespawnStyle::RiseFade,
    };
    despawn(state, pool, id, style);
    let stats = &mut state.stats;
    match kind {
        EntityKind::Pearl => {
            stats.pearls_collected += 1;
            if state.mode == GameMode::CoralReef {
                stats.score += PEARL_POINTS;
            }
            state.events.push(GameEvent::PearlCollected {
                total: stats.pearls_collected,
            });
        }
        EntityKind::Shell => {
            stats.shells_collected += 1;
            stats.score += SHELL_POINTS;
            state.events.push(GameEvent::ShellCollected {
                total: stats.shells_collected,
            });
        }
        EntityKind::GoldenShell => {
            stats.golden_shells_collected += 1;
            stats.pearls_collected += GOLDEN_SHELL_PEARLS;
            state.events.push(GameEvent::GoldenShellCollected {
                total: stats.pearls_collected,
            });
            state.camera.flash([244, 164, 96], 0.2);
        }
        _ => {}
    }
}

fn power_up(state: &mut GameState, pool: PoolKind, id: u32, kind: EntityKind) {
    // Consumed whether or not it takes effect
    despawn(state, pool, id, DespawnStyle::ShrinkFade);
    let above = state.player.pos - Vec2::new(0.0, 40.0);
    match kind {
        EntityKind::Shield => {
            if !state.player.activate_shield() {
                return;
            }
            let secs = shield_secs(state.mode) + SHIELD_FADE_SECS;
            let expiry = state
                .timers
                .after(secs_to_ticks(secs), TimerEvent::ShieldExpired);
            state.shield_timer = Some(expiry);
            state.camera.flash([93, 211, 195], 0.15);
            if state.mode == GameMode::CoralReef {
                state.push_text("🛡️ Bubble Shield!", above, [93, 211, 195], 1.0);
            }
            state.events.push(GameEvent::ShieldActivated);
        }
        EntityKind::SpeedBoost => {
            if !state.player.activate_speed_boost() {
                return;
            }
            state
                .timers
                .after(secs_to_ticks(SPEED_BOOST_SECS), TimerEvent::SpeedBoostExpired);
            state.camera.flash([255, 215, 0], 0.15);
            state.push_text("⚡ Speed Boost!", above, [255, 215, 0], 1.0);
            state.events.push(GameEvent::SpeedBoostActivated);
        }
        _ => {}
    }
}

fn hit_hazard(state: &mut GameState, pool: PoolKind, id: u32) {
    if state.player.is_shielded {
        despawn(state, pool, id, DespawnStyle::ShrinkFade);
        state.events.push(GameEvent::HazardAbsorbed);
        return;
    }
    if state.player.is_invincible {
        return;
    }
    match state.mode {
        GameMode::OceanDash => game_over(state, GameOverCause::Hazard),
        GameMode::CoralReef => {
            state.stats.lives = state.stats.lives.saturating_sub(1);
            state.stats.lives_lost += 1;
            state.events.push(GameEvent::PlayerHit {
                lives_left: state.stats.lives,
            });
            state.camera.shake(0.015, 0.2);
            state.camera.flash([255, 50, 50], 0.15);
            let above = state.player.pos - Vec2::new(0.0, 40.0);
            state.push_text("OUCH!", above, [255, 68, 68], 0.8);

            if state.stats.lives == 0 {
                game_over(state, GameOverCause::OutOfLives);
            } else {
                state.player.take_hit(size_vec(KNOCKBACK));
                state
                    .timers
                    .after(secs_to_ticks(INVINCIBLE_SECS), TimerEvent::InvincibilityExpired);
                log::debug!("Player hit, {} lives left", state.stats.lives);
            }
        }
    }
}

fn meet_creature(state: &mut GameState, pool: PoolKind, id: u32, kind: EntityKind) {
    match kind {
        EntityKind::Baby(species) => {
            let Some(baby) = state.pools.find_mut(pool, id) else {
                return;
            };
            baby.is_following = true;
            baby.vel = Vec2::ZERO;
            baby.pos = baby.body_pos();
            baby.bob = 0.0;
            let at = baby.pos - Vec2::new(0.0, 20.0);
            state.following.push(id);
            state.camera.flash([93, 211, 195], 0.15);
            state.push_text("Rescued!", at, [184, 240, 232], 1.0);
            state.events.push(GameEvent::BabyRescued { species });
            log::debug!("Rescued {:?} #{}", species, id);
        }
        EntityKind::Parent(species) => {
            let pools = &state.pools;
            let matching = state.following.iter().position(|&baby_id| {
                pools
                    .find(PoolKind::Babies, baby_id)
                    .is_some_and(|b| b.active && b.kind == EntityKind::Baby(species))
            });
            let Some(index) = matching else {
                return;
            };
            let baby_id = state.following.remove(index);
            let Some(parent_pos) = state.pools.find(pool, id).map(|p| p.body_pos()) else {
                return;
            };
            despawn(
                state,
                PoolKind::Babies,
                baby_id,
                DespawnStyle::Reunite { target: parent_pos },
            );
            despawn(state, pool, id, DespawnStyle::SwimAway);

            state.stats.babies_reunited += 1;
            state.stats.score += REUNION_POINTS;
            state.camera.flash([244, 164, 96], 0.2);
            state.push_text(
                "+50 Family Reunited!",
                parent_pos - Vec2::new(0.0, 30.0),
                [255, 153, 102],
                1.2,
            );
            state.events.push(GameEvent::FamilyReunited { species });
            log::debug!("Reunited {:?} family (baby #{}, parent #{})", species, baby_id, id);
        }
        _ => {}
    }
}

/// Accrue distance or time score and step the speed tier
fn advance_progress(state: &mut GameState, dt: f32) {
    match state.mode {
        GameMode::OceanDash => {
            state.stats.distance += state.game_speed * dt;
        }
        GameMode::CoralReef => {
            state.stats.time_score_carry += TIME_SCORE_PER_SEC * dt;
            let whole = state.stats.time_score_carry.floor();
            state.stats.score += whole as u64;
            state.stats.time_score_carry -= whole;
        }
    }

    let tier = state.progression.tier(state.progress());
    if tier == state.speed_tier {
        return;
    }
    state.speed_tier = tier;
    state.game_speed = state
        .progression
        .game_speed(state.profile.travel_speed, tier);
    rearm_spawn_timers(state);
    state.events.push(GameEvent::SpeedTierUp {
        tier,
        speed: state.game_speed,
    });
    log::debug!("Speed tier {} -> game speed {:.0}", tier, state.game_speed);
}

/// Re-arm stepped timers with the delay for the current tier
fn rearm_spawn_timers(state: &mut GameState) {
    let progression = state.progression;
    let profile = state.profile;
    let tier = state.speed_tier;

    if let (Cadence::Stepped { .. }, Some(id)) = (progression.obstacle_cadence, state.hazard_timer) {
        let delay = progression
            .obstacle_cadence
            .delay_ms(profile.obstacle_interval_ms, tier);
        state.hazard_timer = state.timers.rearm(id, ms_to_ticks(delay));
    }
    if let (Cadence::Stepped { .. }, Some(id), Some(base)) = (
        progression.platform_cadence,
        state.platform_timer,
        profile.platform_interval_ms,
    ) {
        let delay = progression.platform_cadence.delay_ms(base, tier);
        state.platform_timer = state.timers.rearm(id, ms_to_ticks(delay));
    }
}

/// Cull entities past their trailing edge and refresh scroll velocities
fn sweep(state: &mut GameState) {
    let speed = state.game_speed;
    for kind in PoolKind::ORDER {
        let pool = state.pools.pool_mut(kind);
        pool.retain(|e| e.despawn.is_some() || e.is_following || e.pos.x >= e.behavior().cull_x);
        for entity in pool.iter_mut() {
            if entity.despawn.is_none() {
                entity.vel.x = -speed * entity.speed_multiplier();
            }
            if !entity.passed && entity.pos.x < state.player.pos.x {
                entity.passed = true;
            }
        }
    }
    let pools = &state.pools;
    state
        .following
        .retain(|&id| pools.find(PoolKind::Babies, id).is_some());
}

/// Enter the terminal state. Idempotent.
pub fn game_over(state: &mut GameState, cause: GameOverCause) {
    if state.is_game_over() {
        return;
    }
    state.phase = GamePhase::GameOver;
    state.game_over_cause = Some(cause);
    state.game_over_elapsed = 0.0;

    state.timers.clear();
    state.timer_queue.clear();
    state.hazard_timer = None;
    state.platform_timer = None;
    state.shield_timer = None;
    state.pools.freeze();
    state.player.vel = Vec2::ZERO;
    state
        .timers
        .after(secs_to_ticks(GAME_OVER_ANIM_SECS), TimerEvent::GameOverAnimationDone);

    state.camera.shake(0.02, 0.3);
    state.camera.flash([255, 100, 100], 0.2);
    state.events.push(GameEvent::GameOver { cause });
    log::info!(
        "Game over ({:?}) in {}: score {} currency {}",
        cause,
        state.mode.as_str(),
        state.final_score(),
        state.currency()
    );
}

/// Radial bubbles on a double jump
fn bubble_burst(state: &mut GameState) {
    let origin = state.player.pos + Vec2::new(0.0, 30.0);
    let t = state.time_ticks as u32;
    for i in 0..8u32 {
        let angle = i as f32 / 8.0 * std::f32::consts::TAU;
        let speed = 60.0 + hash01(t, i) * 40.0;
        let particle = Particle {
            pos: origin,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            life: 1.0,
            decay: 2.0,
            size: 4.0 + hash01(i, t) * 3.0,
        };
        push_particle(state, particle);
    }
}

fn push_particle(state: &mut GameState, particle: Particle) {
    if state.particles.len() >= MAX_PARTICLES {
        state.particles.remove(0);
    }
    state.particles.push(particle);
}

/// Animations and effects. Never touches gameplay counters.
fn update_cosmetics(state: &mut GameState, dt: f32) {
    if state.phase == GamePhase::GameOver || state.phase == GamePhase::Ended {
        state.game_over_elapsed += dt;
    }

    for kind in PoolKind::ORDER {
        let pool = state.pools.pool_mut(kind);
        for entity in pool.iter_mut() {
            if let Some(despawn) = &mut entity.despawn {
                despawn.elapsed += dt;
            }
        }
        pool.retain(|e| !e.despawn.is_some_and(|d| d.finished()));
    }

    // Trailing bubbles while swimming
    if state.phase == GamePhase::Playing && state.time_ticks % 15 == 0 {
        let t = state.time_ticks as u32;
        let particle = Particle {
            pos: state.player.pos + Vec2::new(-30.0, (hash01(t, 7) - 0.5) * 20.0),
            vel: Vec2::new(-20.0, -40.0 - hash01(t, 11) * 20.0),
            life: 1.0,
            decay: 0.8,
            size: 3.0 + hash01(t, 3) * 4.0,
        };
        push_particle(state, particle);
    }
    for particle in &mut state.particles {
        particle.pos += particle.vel * dt;
        particle.life -= particle.decay * dt;
    }
    state.particles.retain(|p| p.life > 0.0);

    for text in &mut state.texts {
        text.age += dt;
    }
    state.texts.retain(|t| t.age < t.lifetime);

    state.camera.decay(dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::difficulty::Difficulty;
    use crate::sim::entity::{Entity, HazardKind, ObstacleKind, Species};
    use proptest::prelude::*;

    fn playing(mode: GameMode, difficulty: Difficulty) -> GameState {
        let mut state = GameState::new(mode, difficulty, 42);
        state.phase = GamePhase::Playing;
        state
    }

    /// Empty world with no timers, so only what the test places exists
    fn bare(mode: GameMode) -> GameState {
        let mut state = playing(mode, Difficulty::Easy);
        state.pools.clear();
        state.timers.clear();
        state.hazard_timer = None;
        state.platform_timer = None;
        state
    }

    fn step(state: &mut GameState) {
        tick(state, &TickInput::default(), SIM_DT);
    }

    /// Place a motionless entity on top of the player
    fn place_on_player(state: &mut GameState, kind: EntityKind) -> u32 {
        let id = state.next_entity_id();
        let entity = Entity::new(id, kind, state.player.pos, state.time_ticks);
        state.pools.insert(entity);
        id
    }

    /// Stop the world from scrolling so placed entities stay put
    fn hold_still(state: &mut GameState) {
        state.game_speed = 0.0;
        state.player.vel = Vec2::ZERO;
    }

    #[test]
    fn test_ready_phase_does_not_advance() {
        let mut state = GameState::new(GameMode::OceanDash, Difficulty::Easy, 1);
        step(&mut state);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_pause_toggle() {
        let mut state = playing(GameMode::OceanDash, Difficulty::Easy);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);
        let y = state.player.pos.y;
        step(&mut state);
        assert_eq!(state.player.pos.y, y);
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_swim_impulse_and_gravity() {
        let mut state = bare(GameMode::OceanDash);
        let swim = TickInput {
            primary: true,
            ..Default::default()
        };
        tick(&mut state, &swim, SIM_DT);
        // impulse then one tick of gravity
        assert!((state.player.vel.y - (-280.0 + 150.0 * SIM_DT)).abs() < 1e-3);
        assert!(state.take_events().contains(&GameEvent::Swam));
    }

    #[test]
    fn test_swimmer_clamped_to_floor() {
        let mut state = bare(GameMode::OceanDash);
        for _ in 0..2000 {
            step(&mut state);
        }
        let half = PLAYER_HITBOX.1 / 2.0;
        assert!((state.player.pos.y - (WORLD_HEIGHT - half)).abs() < 1e-3);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_platformer_lands_on_ground() {
        let mut state = playing(GameMode::CoralReef, Difficulty::Easy);
        for _ in 0..120 {
            step(&mut state);
        }
        assert!(state.player.grounded);
        assert!(state.player.can_double_jump);
        // ground top is 438
        let bottom = state.player.hitbox().bottom();
        assert!((bottom - 438.0).abs() < 0.1, "bottom {bottom}");
    }

    #[test]
    fn test_platformer_falls_out_without_platforms() {
        let mut state = bare(GameMode::CoralReef);
        for _ in 0..600 {
            step(&mut state);
            if state.is_game_over() {
                break;
            }
        }
        assert_eq!(state.game_over_cause, Some(GameOverCause::FellOut));
    }

    #[test]
    fn test_collectible_counted_once() {
        let mut state = bare(GameMode::CoralReef);
        hold_still(&mut state);
        place_on_player(&mut state, EntityKind::Shell);
        for _ in 0..5 {
            step(&mut state);
            state.player.vel = Vec2::ZERO;
        }
        assert_eq!(state.stats.shells_collected, 1);
        // five ticks of time score stay under one point
        assert_eq!(state.stats.score, SHELL_POINTS);
    }

    #[test]
    fn test_golden_shell_adds_five_pearls() {
        let mut state = bare(GameMode::OceanDash);
        hold_still(&mut state);
        place_on_player(&mut state, EntityKind::GoldenShell);
        step(&mut state);
        assert_eq!(state.stats.pearls_collected, 5);
        assert!(state.camera.flash.is_some());
    }

    #[test]
    fn test_shield_absorbs_hazard_and_expires() {
        let mut state = bare(GameMode::OceanDash);
        hold_still(&mut state);
        place_on_player(&mut state, EntityKind::Shield);
        step(&mut state);
        assert!(state.player.is_shielded);

        let hazard = place_on_player(&mut state, EntityKind::Obstacle(ObstacleKind::Coral));
        step(&mut state);
        assert!(!state.is_game_over());
        assert!(state.player.is_shielded);
        let absorbed = state.pools.find(PoolKind::Hazards, hazard);
        assert!(absorbed.is_none_or(|h| !h.active));

        // 5 s + 0.5 s fade
        for _ in 0..secs_to_ticks(5.5) {
            state.player.vel = Vec2::ZERO;
            step(&mut state);
        }
        assert!(!state.player.is_shielded);
    }

    #[test]
    fn test_unshielded_swimmer_hit_ends_run() {
        let mut state = bare(GameMode::OceanDash);
        let pearl = state.spawn(EntityKind::Pearl, Vec2::new(600.0, 100.0));
        assert!(state.pools.find(PoolKind::Pearls, pearl).is_some_and(|p| p.vel.x < 0.0));
        place_on_player(&mut state, EntityKind::Obstacle(ObstacleKind::Jellyfish));
        step(&mut state);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.pools.iter().all(|e| e.vel == Vec2::ZERO));
        assert_eq!(state.timers.len(), 1);

        for _ in 0..secs_to_ticks(GAME_OVER_ANIM_SECS) {
            step(&mut state);
        }
        assert_eq!(state.phase, GamePhase::Ended);
        assert!(state.take_events().contains(&GameEvent::RunFinished));
    }

    #[test]
    fn test_platformer_hit_grants_invincibility() {
        let mut state = bare(GameMode::CoralReef);
        hold_still(&mut state);
        place_on_player(&mut state, EntityKind::Hazard(HazardKind::SeaUrchin));
        step(&mut state);
        assert_eq!(state.stats.lives, 2);
        assert!(state.player.is_invincible);
        assert_eq!(state.player.vel.y, KNOCKBACK.1);
        assert_eq!(state.texts.last().map(|t| t.text.as_str()), Some("OUCH!"));
    }

    #[test]
    fn test_rescue_then_reunite_matching_species() {
        let mut state = bare(GameMode::CoralReef);
        hold_still(&mut state);
        let far = state.spawn(EntityKind::Baby(Species::Fish), Vec2::new(700.0, 100.0));
        let baby = place_on_player(&mut state, EntityKind::Baby(Species::Seahorse));
        step(&mut state);
        assert_eq!(state.following, vec![baby]);
        assert!(state.pools.find(PoolKind::Babies, far).is_some_and(|b| !b.is_following));
        let rescued = state.pools.find(PoolKind::Babies, baby).unwrap();
        assert_eq!(rescued.vel, Vec2::ZERO);

        // wrong species: no effect
        place_on_player(&mut state, EntityKind::Parent(Species::Turtle));
        state.player.vel = Vec2::ZERO;
        step(&mut state);
        assert_eq!(state.stats.babies_reunited, 0);

        place_on_player(&mut state, EntityKind::Parent(Species::Seahorse));
        state.player.vel = Vec2::ZERO;
        step(&mut state);
        assert_eq!(state.stats.babies_reunited, 1);
        assert!(state.following.is_empty());
        assert!(state.stats.score >= REUNION_POINTS);
    }

    #[test]
    fn test_parent_reunites_only_its_own_species() {
        let mut state = bare(GameMode::CoralReef);
        hold_still(&mut state);
        let turtle = place_on_player(&mut state, EntityKind::Baby(Species::Turtle));
        step(&mut state);
        state.player.vel = Vec2::ZERO;
        let fish = place_on_player(&mut state, EntityKind::Baby(Species::Fish));
        step(&mut state);
        assert_eq!(state.following, vec![turtle, fish]);

        state.player.vel = Vec2::ZERO;
        place_on_player(&mut state, EntityKind::Parent(Species::Fish));
        step(&mut state);

        assert_eq!(state.following, vec![turtle]);
        assert_eq!(state.stats.babies_reunited, 1);
        let kept = state.pools.find(PoolKind::Babies, turtle).unwrap();
        assert!(kept.is_following && kept.active);
        let reunited = state.pools.find(PoolKind::Babies, fish).unwrap();
        assert!(matches!(
            reunited.despawn.map(|d| d.style),
            Some(DespawnStyle::Reunite { .. })
        ));
    }

    /// Jellyfish placed so the float decides contact: age hits the top of
    /// the float (-40) on the next tick
    fn floated_jellyfish(state: &mut GameState, offset_y: f32) -> u32 {
        state.time_ticks = 1000;
        let born = state.time_ticks + 1 - secs_to_ticks(1.5) as u64;
        let id = state.next_entity_id();
        let kind = EntityKind::Obstacle(ObstacleKind::Jellyfish);
        let pos = state.player.pos + Vec2::new(0.0, offset_y);
        state.pools.insert(Entity::new(id, kind, pos, born));
        id
    }

    #[test]
    fn test_hazard_hitbox_follows_its_float() {
        // Base height clear of the player, floated body overlapping
        let mut state = bare(GameMode::OceanDash);
        hold_still(&mut state);
        floated_jellyfish(&mut state, 90.0);
        step(&mut state);
        assert_eq!(state.game_over_cause, Some(GameOverCause::Hazard));

        // Base height overlapping, floated body clear
        let mut state = bare(GameMode::OceanDash);
        hold_still(&mut state);
        let id = floated_jellyfish(&mut state, -40.0);
        step(&mut state);
        assert!(!state.is_game_over());
        let jelly = state.pools.find(PoolKind::Hazards, id).unwrap();
        assert!((jelly.bob + 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_tier_change_rearms_hazard_timer() {
        let mut state = playing(GameMode::CoralReef, Difficulty::Hard);
        let old = state.hazard_timer;
        state.stats.score = 250;
        step(&mut state);
        assert_eq!(state.speed_tier, 2);
        assert_eq!(state.game_speed, 160.0 + 20.0);
        let new = state.hazard_timer.unwrap();
        assert_ne!(Some(new), old);
        assert_eq!(state.timers.period(new), Some(ms_to_ticks(1800 - 300)));
    }

    #[test]
    fn test_swimmer_distance_accrues() {
        let mut state = bare(GameMode::OceanDash);
        for _ in 0..SIM_HZ {
            step(&mut state);
        }
        assert!((state.stats.distance - 120.0).abs() < 0.01);
    }

    #[test]
    fn test_cull_past_trailing_edge() {
        let mut state = bare(GameMode::OceanDash);
        state.spawn(EntityKind::Pearl, Vec2::new(-39.0, 100.0));
        for _ in 0..10 {
            step(&mut state);
        }
        assert!(state.pools.pearls.is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_scroll_velocity_matches_game_speed(seed in any::<u64>(), ticks in 1u32..2400) {
            let mut state = GameState::new(GameMode::CoralReef, Difficulty::Medium, seed);
            state.phase = GamePhase::Playing;
            let input = TickInput { idle_mode: true, ..Default::default() };
            for _ in 0..ticks {
                tick(&mut state, &input, SIM_DT);
                if state.is_game_over() {
                    break;
                }
            }
            if !state.is_game_over() {
                for e in state.pools.iter().filter(|e| e.despawn.is_none()) {
                    let expected = -state.game_speed * e.speed_multiplier();
                    prop_assert!((e.vel.x - expected).abs() < 1e-3, "{:?}", e.kind);
                }
            }
        }

        #[test]
        fn prop_lives_never_underflow(hits in 1usize..10) {
            let mut state = bare(GameMode::CoralReef);
            hold_still(&mut state);
            for _ in 0..hits {
                state.player.is_invincible = false;
                place_on_player(&mut state, EntityKind::Hazard(HazardKind::TrashCan));
                step(&mut state);
                state.player.vel = Vec2::ZERO;
            }
            prop_assert_eq!(state.stats.lives as usize, 3usize.saturating_sub(hits));
            prop_assert_eq!(state.is_game_over(), hits >= 3);
        }
    }
}
