//! Run lifecycle controller
//!
//! `GameSimulation` owns one run at a time. The host feeds it real frame
//! time and input events; it runs fixed ticks, watches for the end of the
//! run, settles high scores and hands the summary to the configured
//! callback exactly once.

use std::fmt;

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::highscores::HighScores;
use crate::settings::Settings;
use crate::sim::{
    Difficulty, GameEvent, GameMode, GameOverCause, GamePhase, GameState, RunSummary, TickInput,
    tick,
};

/// Invoked once per run with the final results
pub type GameOverCallback = Box<dyn FnMut(&RunSummary)>;

/// Everything needed to start a run
pub struct SimConfig {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    /// Avatar tint as 0xRRGGBB
    pub avatar_tint: Option<u32>,
    /// RNG seed for the first run; later runs derive theirs from it
    pub seed: u64,
    pub on_game_over: Option<GameOverCallback>,
}

impl SimConfig {
    pub fn new(mode: GameMode, difficulty: Difficulty, seed: u64) -> Self {
        Self {
            mode,
            difficulty,
            avatar_tint: None,
            seed,
            on_game_over: None,
        }
    }

    pub fn from_settings(settings: &Settings, seed: u64) -> Self {
        Self {
            avatar_tint: settings.avatar_tint,
            ..Self::new(settings.mode, settings.difficulty, seed)
        }
    }

    pub fn with_callback(mut self, callback: impl FnMut(&RunSummary) + 'static) -> Self {
        self.on_game_over = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for SimConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimConfig")
            .field("mode", &self.mode)
            .field("difficulty", &self.difficulty)
            .field("avatar_tint", &self.avatar_tint)
            .field("seed", &self.seed)
            .field("on_game_over", &self.on_game_over.is_some())
            .finish()
    }
}

/// Host input, already mapped from pointer/keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Pointer down, space or up arrow
    PrimaryAction,
    /// Left key pressed (true) or released (false)
    Left(bool),
    Right(bool),
    Pause,
}

pub struct GameSimulation {
    config: SimConfig,
    state: GameState,
    high_scores: HighScores,
    accumulator: f32,
    input: TickInput,
    /// Runs started so far (seed derivation)
    run_index: u64,
    summary: Option<RunSummary>,
    summary_emitted: bool,
    events: Vec<GameEvent>,
}

impl GameSimulation {
    pub fn new(config: SimConfig, high_scores: HighScores) -> Self {
        log::info!(
            "Reef arcade: {} ({}), seed {}",
            config.mode.as_str(),
            config.difficulty.as_str(),
            config.seed
        );
        let state = GameState::new(config.mode, config.difficulty, config.seed);
        Self {
            config,
            state,
            high_scores,
            accumulator: 0.0,
            input: TickInput::default(),
            run_index: 0,
            summary: None,
            summary_emitted: false,
            events: Vec::new(),
        }
    }

    /// Begin play on a freshly built run
    pub fn start(&mut self) {
        if self.state.phase == GamePhase::Ready {
            self.state.phase = GamePhase::Playing;
            log::info!("Run {} started", self.run_index + 1);
        }
    }

    /// Abandon the run without a summary
    pub fn stop(&mut self) {
        if self.state.phase == GamePhase::Ended {
            return;
        }
        self.state.timers.clear();
        self.state.timer_queue.clear();
        self.state.phase = GamePhase::Ended;
        self.summary_emitted = true;
        log::info!("Run stopped");
    }

    pub fn pause(&mut self) {
        if self.state.phase == GamePhase::Playing {
            self.state.phase = GamePhase::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state.phase == GamePhase::Paused {
            self.state.phase = GamePhase::Playing;
        }
    }

    /// Fresh run with the current mode and difficulty, already playing.
    /// A run still in its game-over animation is settled first.
    pub fn restart(&mut self) {
        if self.state.phase == GamePhase::GameOver && !self.summary_emitted {
            self.finish_run();
        }
        self.run_index += 1;
        let seed = self.config.seed.wrapping_add(self.run_index);
        self.state = GameState::new(self.config.mode, self.config.difficulty, seed);
        self.state.phase = GamePhase::Playing;
        self.accumulator = 0.0;
        let idle_mode = self.input.idle_mode;
        self.input = TickInput {
            idle_mode,
            ..Default::default()
        };
        self.summary = None;
        self.summary_emitted = false;
        self.events.clear();
        log::info!("Run {} started (seed {})", self.run_index + 1, seed);
    }

    /// Changing difficulty always starts over
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.config.difficulty = difficulty;
        self.restart();
    }

    /// Switching games always starts over
    pub fn set_mode(&mut self, mode: GameMode) {
        self.config.mode = mode;
        self.restart();
    }

    /// Let the autopilot play (attract/demo mode)
    pub fn set_idle_mode(&mut self, idle: bool) {
        self.input.idle_mode = idle;
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PrimaryAction => {
                if self.state.phase == GamePhase::Ready {
                    self.start();
                }
                self.input.primary = true;
            }
            InputEvent::Left(down) => self.input.left = down,
            InputEvent::Right(down) => self.input.right = down,
            InputEvent::Pause => self.input.pause = true,
        }
    }

    /// Advance by real elapsed time (seconds)
    pub fn update(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, 0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = self.input.clone();
            tick(&mut self.state, &input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.primary = false;
            self.input.pause = false;
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog rather than spiral
            self.accumulator = self.accumulator.min(SIM_DT);
        }

        self.events.extend(self.state.take_events());

        if self.state.phase == GamePhase::Ended && !self.summary_emitted {
            self.finish_run();
        }
    }

    /// Settle high scores and emit the summary. Runs once per run.
    fn finish_run(&mut self) {
        self.summary_emitted = true;

        let mode = self.state.mode;
        let score = self.state.final_score();
        let currency = self.state.currency();
        let previous_best = self.high_scores.best(mode);
        let is_new_high_score = score > previous_best;
        self.high_scores
            .record(mode, score, currency, self.state.difficulty);

        let stats = &self.state.stats;
        let summary = RunSummary {
            mode,
            difficulty: self.state.difficulty,
            score,
            currency,
            pearls: stats.pearls_collected,
            shells: stats.shells_collected,
            babies_reunited: match mode {
                GameMode::OceanDash => None,
                GameMode::CoralReef => Some(stats.babies_reunited),
            },
            lives_lost: stats.lives_lost,
            cause: self.state.game_over_cause.unwrap_or(GameOverCause::Hazard),
            is_new_high_score,
            previous_best,
        };

        log::info!(
            "Run over: {} {} ({} currency), best was {}{}",
            summary.score,
            mode.score_unit(),
            summary.currency,
            previous_best,
            if is_new_high_score { " - new high score!" } else { "" }
        );

        if let Some(callback) = self.config.on_game_over.as_mut() {
            callback(&summary);
        }
        self.summary = Some(summary);
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    /// Summary of the finished run, once emitted
    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Drain gameplay events since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use proptest::prelude::*;

    use super::*;
    use crate::consts::{GAME_OVER_ANIM_SECS, INVINCIBLE_SECS};
    use crate::sim::{Entity, EntityKind, HazardKind, ObstacleKind, PoolKind, Species};

    fn recorder() -> (Rc<RefCell<Vec<RunSummary>>>, impl FnMut(&RunSummary) + 'static) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        (log, move |s: &RunSummary| sink.borrow_mut().push(s.clone()))
    }

    /// Playing run with spawn timers off so only placed entities exist
    fn quiet(mode: GameMode, callback: impl FnMut(&RunSummary) + 'static) -> GameSimulation {
        let config = SimConfig::new(mode, Difficulty::Easy, 7).with_callback(callback);
        let mut sim = GameSimulation::new(config, HighScores::new());
        sim.start();
        sim.state.timers.clear();
        sim.state.hazard_timer = None;
        sim.state.platform_timer = None;
        sim
    }

    fn place_on_player(sim: &mut GameSimulation, kind: EntityKind) -> u32 {
        let id = sim.state.next_entity_id();
        let pos = sim.state.player.pos;
        let born = sim.state.time_ticks;
        sim.state.pools.insert(Entity::new(id, kind, pos, born));
        id
    }

    fn run_for(sim: &mut GameSimulation, secs: f32) {
        let frames = (secs / SIM_DT).ceil() as u32 + 1;
        for _ in 0..frames {
            sim.update(SIM_DT);
        }
    }

    /// Let the platformer settle onto the starting ground
    fn settle(sim: &mut GameSimulation) {
        run_for(sim, 0.5);
        assert!(sim.state.player.grounded);
    }

    #[test]
    fn test_platformer_three_hits_end_the_run() {
        let (log, callback) = recorder();
        let mut sim = quiet(GameMode::CoralReef, callback);
        settle(&mut sim);

        for hit in 0..3u8 {
            place_on_player(&mut sim, EntityKind::Hazard(HazardKind::Jellyfish));
            sim.update(SIM_DT);
            assert_eq!(sim.state.stats.lives, 2 - hit);
            if hit < 2 {
                assert!(sim.state.player.is_invincible);
                run_for(&mut sim, INVINCIBLE_SECS + 0.1);
                assert!(!sim.state.player.is_invincible);
                assert!(!sim.state.is_game_over());
            }
        }
        assert_eq!(sim.phase(), GamePhase::GameOver);
        assert!(log.borrow().is_empty(), "summary waits for the animation");

        run_for(&mut sim, GAME_OVER_ANIM_SECS + 0.1);
        run_for(&mut sim, 1.0);
        let summaries = log.borrow();
        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.cause, GameOverCause::OutOfLives);
        assert_eq!(summary.lives_lost, 3);
        assert_eq!(summary.babies_reunited, Some(0));
        assert!(summary.score > 0);
        assert!(summary.is_new_high_score);
        assert_eq!(summary.previous_best, 0);
        assert_eq!(sim.high_scores().best(GameMode::CoralReef), summary.score);
    }

    #[test]
    fn test_shield_absorbs_four_hazards() {
        let (log, callback) = recorder();
        let mut sim = quiet(GameMode::CoralReef, callback);
        settle(&mut sim);

        place_on_player(&mut sim, EntityKind::Shield);
        sim.update(SIM_DT);
        assert!(sim.state.player.is_shielded);

        let hazards: Vec<u32> = HazardKind::ALL[..4]
            .iter()
            .map(|&h| place_on_player(&mut sim, EntityKind::Hazard(h)))
            .collect();
        sim.update(SIM_DT);

        assert_eq!(sim.state.stats.lives, 3);
        assert!(sim.state.player.is_shielded);
        for id in hazards {
            assert!(
                sim.state
                    .pools
                    .find(PoolKind::Hazards, id)
                    .is_none_or(|h| !h.active)
            );
        }
        assert!(log.borrow().is_empty());
        assert_eq!(
            sim.take_events()
                .iter()
                .filter(|e| **e == GameEvent::HazardAbsorbed)
                .count(),
            4
        );
    }

    #[test]
    fn test_swimmer_single_hit_freezes_world() {
        let (log, callback) = recorder();
        let mut sim = quiet(GameMode::OceanDash, callback);
        run_for(&mut sim, 1.0);
        sim.state.spawn(EntityKind::Pearl, Vec2::new(700.0, 100.0));
        place_on_player(&mut sim, EntityKind::Obstacle(ObstacleKind::Seaweed));
        sim.update(SIM_DT);

        assert_eq!(sim.phase(), GamePhase::GameOver);
        assert!(sim.state.pools.iter().all(|e| e.vel == Vec2::ZERO));
        let distance = sim.state.distance();
        let pearl_x = sim.state.pools.pearls[0].pos.x;

        run_for(&mut sim, GAME_OVER_ANIM_SECS + 0.1);
        assert_eq!(sim.state.distance(), distance);
        assert_eq!(sim.state.pools.pearls[0].pos.x, pearl_x);

        let summaries = log.borrow();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].score, distance);
        assert_eq!(summaries[0].babies_reunited, None);
        assert_eq!(summaries[0].cause, GameOverCause::Hazard);
    }

    #[test]
    fn test_restart_during_game_over_animation_settles_run() {
        let (log, callback) = recorder();
        let mut sim = quiet(GameMode::OceanDash, callback);
        run_for(&mut sim, 0.5);
        sim.state.stats.pearls_collected = 12;
        place_on_player(&mut sim, EntityKind::Obstacle(ObstacleKind::Coral));
        sim.update(SIM_DT);
        assert_eq!(sim.phase(), GamePhase::GameOver);
        assert!(log.borrow().is_empty());

        sim.set_difficulty(Difficulty::Hard);
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0].currency, 12);
        assert_eq!(log.borrow()[0].difficulty, Difficulty::Easy);
        assert_eq!(sim.state.stats.pearls_collected, 0);

        // The new run reports only for itself
        run_for(&mut sim, 2.0);
        assert_eq!(log.borrow().len(), 1);
        assert!(sim.summary().is_none());
    }

    #[test]
    fn test_restart_after_stop_emits_nothing() {
        let (log, callback) = recorder();
        let mut sim = quiet(GameMode::CoralReef, callback);
        run_for(&mut sim, 0.2);
        sim.stop();
        sim.restart();
        run_for(&mut sim, 0.2);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_reunion_requires_matching_species() {
        let mut sim = quiet(GameMode::CoralReef, |_: &RunSummary| {});
        settle(&mut sim);
        place_on_player(&mut sim, EntityKind::Baby(Species::Turtle));
        sim.update(SIM_DT);
        assert_eq!(sim.state.following.len(), 1);

        place_on_player(&mut sim, EntityKind::Parent(Species::Fish));
        sim.update(SIM_DT);
        assert_eq!(sim.state.stats.babies_reunited, 0);
        assert_eq!(sim.state.following.len(), 1);

        let score_before = sim.state.stats.score;
        place_on_player(&mut sim, EntityKind::Parent(Species::Turtle));
        sim.update(SIM_DT);
        assert_eq!(sim.state.stats.babies_reunited, 1);
        assert!(sim.state.stats.score >= score_before + 50);
        assert!(sim.state.following.is_empty());
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let mut sim = quiet(GameMode::OceanDash, |_: &RunSummary| {});
        run_for(&mut sim, 0.2);
        sim.handle_input(InputEvent::Pause);
        sim.update(SIM_DT);
        assert_eq!(sim.phase(), GamePhase::Paused);
        let ticks = sim.state.time_ticks;
        run_for(&mut sim, 1.0);
        assert_eq!(sim.state.time_ticks, ticks);
        sim.resume();
        run_for(&mut sim, 0.1);
        assert!(sim.state.time_ticks > ticks);
    }

    #[test]
    fn test_primary_action_starts_ready_run() {
        let config = SimConfig::new(GameMode::OceanDash, Difficulty::Easy, 1);
        let mut sim = GameSimulation::new(config, HighScores::new());
        sim.update(SIM_DT * 3.0);
        assert_eq!(sim.state.time_ticks, 0);
        sim.handle_input(InputEvent::PrimaryAction);
        sim.update(SIM_DT);
        assert_eq!(sim.phase(), GamePhase::Playing);
        assert!(sim.take_events().contains(&GameEvent::Swam));
    }

    #[test]
    fn test_restart_zeroes_counters_and_rearms() {
        let mut sim = quiet(GameMode::CoralReef, |_: &RunSummary| {});
        settle(&mut sim);
        place_on_player(&mut sim, EntityKind::Shell);
        sim.update(SIM_DT);
        assert_eq!(sim.state.stats.shells_collected, 1);
        assert!(sim.state.timers.is_empty());

        sim.restart();
        assert_eq!(sim.phase(), GamePhase::Playing);
        assert_eq!(sim.state.stats.shells_collected, 0);
        assert_eq!(sim.state.stats.score, 0);
        assert_eq!(sim.state.stats.lives, 3);
        assert!(sim.state.hazard_timer.is_some());
        assert!(!sim.state.timers.is_empty());
        assert!(sim.summary().is_none());
    }

    #[test]
    fn test_set_difficulty_restarts() {
        let mut sim = quiet(GameMode::OceanDash, |_: &RunSummary| {});
        run_for(&mut sim, 1.0);
        assert!(sim.state.distance() > 0);
        sim.set_difficulty(Difficulty::Hard);
        assert_eq!(sim.state.distance(), 0);
        assert_eq!(sim.state.difficulty, Difficulty::Hard);
        assert_eq!(sim.state.game_speed, 240.0);
    }

    #[test]
    fn test_stop_never_emits() {
        let (log, callback) = recorder();
        let mut sim = quiet(GameMode::OceanDash, callback);
        run_for(&mut sim, 0.5);
        sim.stop();
        run_for(&mut sim, 1.0);
        assert!(log.borrow().is_empty());
        assert!(sim.summary().is_none());
    }

    #[test]
    fn test_same_seed_same_run() {
        let play = || {
            let config = SimConfig::new(GameMode::CoralReef, Difficulty::Medium, 99);
            let mut sim = GameSimulation::new(config, HighScores::new());
            sim.set_idle_mode(true);
            sim.start();
            run_for(&mut sim, 20.0);
            let s = sim.state();
            (
                s.stats.score,
                s.stats.shells_collected,
                s.stats.lives,
                s.pools.len(),
                s.player.pos,
                s.phase,
            )
        };
        assert_eq!(play(), play());
    }

    #[test]
    fn test_previous_best_reported() {
        let mut scores = HighScores::new();
        scores.record(GameMode::OceanDash, 1_000_000, 0, Difficulty::Easy);
        let (log, callback) = recorder();
        let config = SimConfig::new(GameMode::OceanDash, Difficulty::Easy, 3).with_callback(callback);
        let mut sim = GameSimulation::new(config, scores);
        sim.start();
        run_for(&mut sim, 0.5);
        place_on_player(&mut sim, EntityKind::Obstacle(ObstacleKind::Coral));
        run_for(&mut sim, 1.0);
        let summaries = log.borrow();
        assert_eq!(summaries.len(), 1);
        assert!(!summaries[0].is_new_high_score);
        assert_eq!(summaries[0].previous_best, 1_000_000);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(12))]

        #[test]
        fn prop_nothing_changes_after_game_over(seed in any::<u64>(), taps in 0usize..20) {
            let config = SimConfig::new(GameMode::CoralReef, Difficulty::Easy, seed);
            let mut sim = GameSimulation::new(config, HighScores::new());
            sim.start();
            run_for(&mut sim, 0.5);
            crate::sim::tick::game_over(&mut sim.state, GameOverCause::FellOut);
            let frozen = (
                sim.state.stats.score,
                sim.state.stats.lives,
                sim.state.currency(),
                sim.state.stats.babies_reunited,
            );
            for _ in 0..taps {
                sim.handle_input(InputEvent::PrimaryAction);
                let pos = sim.state.player.pos;
                let id = sim.state.next_entity_id();
                sim.state.pools.insert(Entity::new(id, EntityKind::Shell, pos, 0));
                sim.update(SIM_DT);
            }
            run_for(&mut sim, 1.0);
            prop_assert_eq!(
                frozen,
                (
                    sim.state.stats.score,
                    sim.state.stats.lives,
                    sim.state.currency(),
                    sim.state.stats.babies_reunited,
                )
            );
            prop_assert!(sim.summary().is_some());
        }
    }
}
