//! Frame assembly
//!
//! Turns a `GameState` into sprite instances, overlays and a HUD snapshot.
//! Everything here is cosmetic: tweens are derived from the tick counter so
//! a replayed run draws identically, and nothing is written back to the
//! simulation.

use std::f32::consts::PI;

use glam::Vec2;
use serde::Serialize;

use super::parallax::Parallax;
use super::vertex::{SpriteId, SpriteInstance, colors, pack_rgb};
use crate::consts::{GAME_OVER_ANIM_SECS, PLAYER_SIZE, SHIELD_FADE_SECS, SIM_DT, WORLD_WIDTH};
use crate::settings::Settings;
use crate::sim::entity::Despawn;
use crate::sim::{
    DespawnStyle, Entity, EntityKind, GameMode, GamePhase, GameState, HazardKind, ObstacleKind,
    PlayerStatus,
};
use crate::{hash01, secs_to_ticks};

/// Where collected items fly to (the currency counter)
const HUD_TARGET: Vec2 = Vec2::new(WORLD_WIDTH - 180.0, 30.0);
/// Reunited parents swim off to here
const SWIM_AWAY_X: f32 = -100.0;
/// Invincibility blink half-period
const BLINK_SECS: f32 = 0.1;
const BLINK_MIN_ALPHA: f32 = 0.3;

/// Data the page draws as DOM/HUD text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub mode: GameMode,
    /// Distance (Ocean Dash) or points (Coral Reef Quest)
    pub score: u64,
    pub unit: &'static str,
    pub pearls: u32,
    pub shells: Option<u32>,
    pub babies: Option<u32>,
    pub lives: Option<u8>,
    pub speed_tier: u32,
    pub status: PlayerStatus,
    pub paused: bool,
    pub game_over: bool,
}

impl HudSnapshot {
    pub fn from_state(state: &GameState) -> Self {
        let platformer = state.mode == GameMode::CoralReef;
        Self {
            mode: state.mode,
            score: state.final_score(),
            unit: state.mode.score_unit(),
            pearls: state.stats.pearls_collected,
            shells: platformer.then_some(state.stats.shells_collected),
            babies: platformer.then_some(state.stats.babies_reunited),
            lives: platformer.then_some(state.stats.lives),
            speed_tier: state.speed_tier,
            status: state.player.status(),
            paused: state.phase == GamePhase::Paused,
            game_over: state.is_game_over(),
        }
    }
}

/// Floating text ready to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextInstance {
    pub text: String,
    pub position: [f32; 2],
    pub color: u32,
    pub alpha: f32,
}

/// Full-screen color flash
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlashOverlay {
    pub color: u32,
    pub alpha: f32,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone)]
pub struct Frame {
    /// Back to front
    pub instances: Vec<SpriteInstance>,
    /// Background tile offsets, far to near
    pub parallax: Vec<f32>,
    pub flash: Option<FlashOverlay>,
    /// Camera offset in pixels
    pub shake: [f32; 2],
    pub texts: Vec<TextInstance>,
    pub hud: HudSnapshot,
}

/// Builds frames from simulation state and owns the purely visual state
/// (parallax scroll) that the simulation doesn't track
#[derive(Debug, Clone)]
pub struct Presenter {
    parallax: Parallax,
    avatar_tint: u32,
    shake: bool,
    flashes: bool,
    particles: bool,
}

impl Presenter {
    pub fn new(mode: GameMode, avatar_tint: Option<u32>, settings: &Settings) -> Self {
        let mut presenter = Self {
            parallax: Parallax::for_mode(mode),
            avatar_tint: avatar_tint.unwrap_or(colors::WHITE),
            shake: true,
            flashes: true,
            particles: true,
        };
        presenter.apply_settings(settings);
        presenter
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.shake = settings.effective_screen_shake();
        self.flashes = settings.effective_flashes();
        self.particles = settings.particles;
    }

    /// Start over with fresh background scroll (new run or mode switch)
    pub fn reset(&mut self, mode: GameMode, avatar_tint: Option<u32>) {
        self.parallax = Parallax::for_mode(mode);
        self.avatar_tint = avatar_tint.unwrap_or(colors::WHITE);
    }

    pub fn build(&mut self, state: &GameState, dt: f32) -> Frame {
        if state.phase == GamePhase::Playing {
            self.parallax.advance(state.game_speed, dt);
        }

        let mut instances = Vec::with_capacity(state.pools.len() + state.particles.len() + 2);
        instances.extend(state.pools.iter().map(|e| entity_instance(e, state.time_ticks)));
        instances.push(self.player_instance(state));
        if let Some(shield) = shield_instance(state) {
            instances.push(shield);
        }
        if self.particles {
            instances.extend(state.particles.iter().map(|p| {
                let mut bubble = SpriteInstance::new(SpriteId::Bubble, p.pos.to_array(), [p.size; 2]);
                bubble.alpha = p.life.clamp(0.0, 1.0) * 0.8;
                bubble.tint = colors::BUBBLE;
                bubble
            }));
        }

        let texts = state
            .texts
            .iter()
            .map(|t| {
                let p = (t.age / t.lifetime).clamp(0.0, 1.0);
                TextInstance {
                    text: t.text.clone(),
                    position: [t.pos.x, t.pos.y - t.rise * p],
                    color: pack_rgb(t.color),
                    alpha: 1.0 - p,
                }
            })
            .collect();

        Frame {
            instances,
            parallax: self.parallax.offsets().to_vec(),
            flash: self.flash_overlay(state),
            shake: self.shake_offset(state),
            texts,
            hud: HudSnapshot::from_state(state),
        }
    }

    fn player_instance(&self, state: &GameState) -> SpriteInstance {
        let player = &state.player;
        let mut sprite = SpriteInstance::new(SpriteId::Player, player.pos.to_array(), [PLAYER_SIZE.0, PLAYER_SIZE.1]);
        if player.facing_left {
            sprite.size[0] = -sprite.size[0];
        }
        sprite.tint = if player.is_speed_boosted {
            colors::BOOST_GLOW
        } else {
            self.avatar_tint
        };

        if state.mode == GameMode::OceanDash {
            // Nose follows vertical speed
            sprite.rotation = (player.vel.y / 800.0).clamp(-0.35, 0.35);
        }

        if state.is_game_over() {
            let p = (state.game_over_elapsed / GAME_OVER_ANIM_SECS).clamp(0.0, 1.0);
            sprite.rotation = PI * p;
            sprite.alpha = 1.0 - 0.3 * p;
        } else if player.is_invincible {
            sprite.alpha = blink_alpha(state.time_ticks);
        }
        sprite
    }

    fn flash_overlay(&self, state: &GameState) -> Option<FlashOverlay> {
        if !self.flashes {
            return None;
        }
        state.camera.flash.map(|f| FlashOverlay {
            color: pack_rgb(f.color),
            alpha: (f.remaining / f.duration).clamp(0.0, 1.0) * 0.5,
        })
    }

    fn shake_offset(&self, state: &GameState) -> [f32; 2] {
        if !self.shake || state.camera.shake <= 0.0 {
            return [0.0, 0.0];
        }
        let magnitude = state.camera.shake * WORLD_WIDTH;
        let tick = state.time_ticks as u32;
        [
            (hash01(tick, 1) * 2.0 - 1.0) * magnitude,
            (hash01(tick, 2) * 2.0 - 1.0) * magnitude,
        ]
    }
}

/// Triangle wave between full and dim, one half-period per `BLINK_SECS`
fn blink_alpha(time_ticks: u64) -> f32 {
    let cycles = time_ticks as f32 * SIM_DT / BLINK_SECS;
    let frac = cycles.fract();
    let level = if (cycles as u64) % 2 == 0 { 1.0 - frac } else { frac };
    BLINK_MIN_ALPHA + (1.0 - BLINK_MIN_ALPHA) * level
}

fn shield_instance(state: &GameState) -> Option<SpriteInstance> {
    let player = &state.player;
    if !player.is_shielded {
        return None;
    }
    let t = state.time_ticks as f32 * SIM_DT;
    let pulse = 1.0 + 0.08 * (t * 2.0 * PI).sin();
    let side = PLAYER_SIZE.0 * 1.2 * pulse;

    let fade_ticks = secs_to_ticks(SHIELD_FADE_SECS);
    let remaining = state
        .shield_timer
        .and_then(|id| state.timers.remaining(id))
        .unwrap_or(fade_ticks);
    let fade = (remaining as f32 / fade_ticks as f32).min(1.0);

    let mut bubble = SpriteInstance::new(SpriteId::ShieldBubble, player.pos.to_array(), [side, side]);
    bubble.tint = colors::SHIELD;
    bubble.alpha = 0.6 * fade;
    Some(bubble)
}

/// Idle spin and pulse for a live entity: (rotation, scale). The vertical
/// float is part of the body position and comes from the simulation.
fn idle_tween(entity: &Entity, age: f32) -> (f32, f32) {
    // Sine ease in/out between 0 and 1 over `half_period`
    let swing = |half_period: f32| 0.5 * (1.0 - (age * PI / half_period).cos());
    match entity.kind {
        EntityKind::GoldenShell => (age * PI, 1.0 + 0.2 * swing(0.5)),
        EntityKind::Shield | EntityKind::SpeedBoost => (0.0, 1.0 + 0.15 * swing(0.4)),
        EntityKind::Obstacle(ObstacleKind::Seaweed) => ((swing(1.0) * 2.0 - 1.0) * 5f32.to_radians(), 1.0),
        EntityKind::Hazard(HazardKind::SeaUrchin) => (age * 2.0 * PI / 3.0, 1.0),
        EntityKind::Hazard(HazardKind::TrashBottle) => ((swing(0.8) * 2.0 - 1.0) * 20f32.to_radians(), 1.0),
        EntityKind::Hazard(HazardKind::TrashCan) => (swing(1.0) * 15f32.to_radians(), 1.0),
        _ => (0.0, 1.0),
    }
}

/// Exit animation: (position, scale, alpha, facing left)
fn despawn_tween(despawn: &Despawn) -> (Vec2, f32, f32, bool) {
    let p = despawn.progress();
    match despawn.style {
        DespawnStyle::FlyToHud => (despawn.from.lerp(HUD_TARGET, p), 1.0 - 0.5 * p, 1.0 - p, false),
        DespawnStyle::RiseFade => (despawn.from + Vec2::new(0.0, -30.0 * p), 1.0 + 0.5 * p, 1.0 - p, false),
        DespawnStyle::ShrinkFade => (despawn.from, 1.0 - 0.5 * p, 1.0 - p, false),
        DespawnStyle::Reunite { target } => (despawn.from.lerp(target, p), 1.0, 1.0 - p, false),
        DespawnStyle::SwimAway => {
            let x = despawn.from.x + (SWIM_AWAY_X - despawn.from.x) * p;
            (Vec2::new(x, despawn.from.y), 1.0, 1.0, true)
        }
    }
}

fn entity_instance(entity: &Entity, time_ticks: u64) -> SpriteInstance {
    let size = entity.behavior().size;
    let mut sprite = SpriteInstance::new(
        SpriteId::for_kind(entity.kind),
        entity.body_pos().to_array(),
        size.to_array(),
    );

    match &entity.despawn {
        Some(despawn) => {
            let (pos, scale, alpha, flip) = despawn_tween(despawn);
            sprite.position = pos.to_array();
            sprite.size = (size * scale).to_array();
            sprite.alpha = alpha.clamp(0.0, 1.0);
            if flip {
                sprite.size[0] = -sprite.size[0];
            }
        }
        None => {
            let age = time_ticks.saturating_sub(entity.born_tick) as f32 * SIM_DT;
            let (rotation, scale) = idle_tween(entity, age);
            sprite.rotation = rotation;
            sprite.size = (size * scale).to_array();
        }
    }
    sprite
}
