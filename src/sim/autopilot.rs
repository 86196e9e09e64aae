//! Idle/demo mode input generator
//!
//! Reads the state and produces the input a cautious player would. Purely a
//! function of state, so demo runs stay deterministic for a given seed.

use super::difficulty::GameMode;
use super::entity::{Category, Entity};
use super::state::GameState;
use super::tick::TickInput;
use crate::consts::WORLD_HEIGHT;

/// How far ahead the autopilot looks for threats
const LOOKAHEAD: f32 = 260.0;
/// Preferred platformer x for the player center
const HOME_X: f32 = 160.0;

pub fn drive(state: &GameState) -> TickInput {
    let mut input = match state.mode {
        GameMode::OceanDash => swim(state),
        GameMode::CoralReef => platform(state),
    };
    input.idle_mode = true;
    input
}

/// Nearest live entity of a category in front of the player
fn nearest_ahead(state: &GameState, category: Category, range: f32) -> Option<&Entity> {
    let px = state.player.pos.x;
    state
        .pools
        .iter()
        .filter(|e| e.active && e.despawn.is_none() && !e.is_following)
        .filter(|e| e.behavior().category == category)
        .filter(|e| {
            let reach = e.behavior().hitbox.x * 0.5;
            e.pos.x + reach >= px - 20.0 && e.pos.x - reach - px <= range
        })
        .min_by(|a, b| a.pos.x.total_cmp(&b.pos.x))
}

fn swim(state: &GameState) -> TickInput {
    let player = &state.player;
    let mid = WORLD_HEIGHT / 2.0;

    // Steer to whichever side of the threat has more room; otherwise chase
    // the next pearl or hold mid-water
    let target_y = if let Some(threat) =
        nearest_ahead(state, Category::Hazard, LOOKAHEAD).filter(|_| !player.is_shielded)
    {
        let aabb = threat.hitbox();
        let above = aabb.top() - 60.0;
        let below = aabb.bottom() + 60.0;
        if above > 60.0 && (aabb.center.y >= mid || below > WORLD_HEIGHT - 60.0) {
            above
        } else {
            below
        }
    } else if let Some(pearl) = nearest_ahead(state, Category::Collectible, LOOKAHEAD) {
        pearl.body_pos().y
    } else {
        mid
    };

    TickInput {
        primary: player.pos.y > target_y && player.vel.y >= 0.0,
        ..Default::default()
    }
}

fn platform(state: &GameState) -> TickInput {
    let player = &state.player;
    let hitbox = player.hitbox();

    let threat = nearest_ahead(state, Category::Hazard, 120.0)
        .filter(|_| !player.is_shielded && !player.is_invincible)
        .filter(|h| {
            let aabb = h.hitbox();
            aabb.bottom() > hitbox.top() && aabb.top() < hitbox.bottom()
        });

    // Jump before the platform underfoot scrolls away
    let edge_ahead = player
        .standing_on
        .and_then(|id| state.pools.platforms.iter().find(|p| p.id == id))
        .is_some_and(|p| p.pos.x + p.behavior().hitbox.x * 0.5 < player.pos.x + 20.0);

    // Nothing below to land on: spend the air jump near the apex
    let nothing_below = !player.grounded
        && player.vel.y > 0.0
        && !state.pools.platforms.iter().any(|p| {
            let half = p.behavior().hitbox * 0.5;
            (p.pos.x - player.pos.x).abs() < half.x + hitbox.half.x
                && p.pos.y - half.y >= hitbox.bottom()
        });

    let primary = if player.grounded {
        threat.is_some() || edge_ahead
    } else {
        nothing_below && !player.has_double_jumped
    };

    let (left, right) = if player.pos.x < HOME_X - 10.0 {
        (false, true)
    } else if player.pos.x > HOME_X + 10.0 {
        (true, false)
    } else {
        (false, false)
    };

    TickInput {
        primary,
        left,
        right,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::difficulty::Difficulty;
    use crate::sim::entity::{EntityKind, ObstacleKind};
    use crate::sim::state::GamePhase;
    use crate::sim::tick::tick;
    use crate::consts::SIM_DT;
    use glam::Vec2;

    #[test]
    fn test_swims_up_when_sinking() {
        let mut state = GameState::new(GameMode::OceanDash, Difficulty::Easy, 3);
        state.player.pos.y = 420.0;
        state.player.vel.y = 10.0;
        assert!(drive(&state).primary);
        state.player.pos.y = 100.0;
        assert!(!drive(&state).primary);
    }

    #[test]
    fn test_avoids_obstacle_in_lane() {
        let mut state = GameState::new(GameMode::OceanDash, Difficulty::Easy, 3);
        state.player.pos.y = 150.0;
        state.player.vel.y = 5.0;
        state.spawn(
            EntityKind::Obstacle(ObstacleKind::Jellyfish),
            Vec2::new(250.0, 170.0),
        );
        // threat sits high, so the autopilot dives under it instead of swimming
        assert!(!drive(&state).primary);
    }

    #[test]
    fn test_platformer_heads_home() {
        let mut state = GameState::new(GameMode::CoralReef, Difficulty::Easy, 3);
        state.player.pos.x = 280.0;
        let input = drive(&state);
        assert!(input.left && !input.right);
    }

    #[test]
    fn test_autopilot_survives_opening_seconds() {
        let mut state = GameState::new(GameMode::OceanDash, Difficulty::Easy, 17);
        state.phase = GamePhase::Playing;
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..240 {
            tick(&mut state, &input, SIM_DT);
        }
        assert!(state.stats.distance > 200.0);
    }
}
