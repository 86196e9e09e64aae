//! Browser host surface
//!
//! `WebGame` wraps a `GameSimulation` for JavaScript. The page owns the
//! canvas, the animation frame loop and the DOM listeners; it forwards key
//! codes and pointer presses here, calls `update` once per frame, then
//! reads the sprite buffer and HUD JSON back out.

use js_sys::Function;
use wasm_bindgen::prelude::*;

use crate::game::{GameSimulation, InputEvent, SimConfig};
use crate::highscores::HighScores;
use crate::renderer::{Frame, Presenter};
use crate::settings::{Settings, parse_tint};
use crate::sim::{Difficulty, GameMode};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Reef Arcade loaded");
}

#[wasm_bindgen]
pub struct WebGame {
    sim: GameSimulation,
    presenter: Presenter,
    settings: Settings,
    frame: Option<Frame>,
    scores_saved: bool,
}

#[wasm_bindgen]
impl WebGame {
    /// `on_game_over` receives the run summary as a JSON string
    #[wasm_bindgen(constructor)]
    pub fn new(seed: f64, on_game_over: Option<Function>) -> WebGame {
        let settings = Settings::load();
        let mut config = SimConfig::from_settings(&settings, seed as u64);
        if let Some(callback) = on_game_over {
            config = config.with_callback(move |summary| match serde_json::to_string(summary) {
                Ok(json) => {
                    if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                        log::warn!("Game over callback threw: {:?}", e);
                    }
                }
                Err(e) => log::warn!("Could not serialize run summary: {}", e),
            });
        }

        let presenter = Presenter::new(config.mode, config.avatar_tint, &settings);
        log::info!("{:?}", config);
        WebGame {
            sim: GameSimulation::new(config, HighScores::load()),
            presenter,
            settings,
            frame: None,
            scores_saved: false,
        }
    }

    pub fn start(&mut self) {
        self.sim.start();
    }

    pub fn stop(&mut self) {
        self.sim.stop();
    }

    pub fn pause(&mut self) {
        self.sim.pause();
    }

    pub fn resume(&mut self) {
        self.sim.resume();
    }

    pub fn restart(&mut self) {
        self.sim.restart();
        self.reset_presentation();
    }

    pub fn set_mode(&mut self, key: &str) {
        let mode = GameMode::from_key(key);
        self.settings.mode = mode;
        self.settings.save();
        self.sim.set_mode(mode);
        self.reset_presentation();
    }

    pub fn set_difficulty(&mut self, key: &str) {
        let difficulty = Difficulty::from_key(key);
        self.settings.difficulty = difficulty;
        self.settings.save();
        self.sim.set_difficulty(difficulty);
        self.reset_presentation();
    }

    /// Accepts "#rrggbb", "rrggbb" or "0xrrggbb"; applies from the next run
    pub fn set_avatar_tint(&mut self, tint: &str) -> Result<(), JsValue> {
        let tint = parse_tint(tint).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.settings.avatar_tint = Some(tint);
        self.settings.save();
        Ok(())
    }

    pub fn set_reduced_motion(&mut self, on: bool) {
        self.settings.reduced_motion = on;
        self.settings.save();
        self.presenter.apply_settings(&self.settings);
    }

    pub fn set_idle_mode(&mut self, idle: bool) {
        self.sim.set_idle_mode(idle);
    }

    /// Returns true when the key was consumed (caller should preventDefault)
    pub fn key_down(&mut self, code: &str) -> bool {
        let event = match code {
            "Space" | "ArrowUp" | "KeyW" => InputEvent::PrimaryAction,
            "ArrowLeft" | "KeyA" => InputEvent::Left(true),
            "ArrowRight" | "KeyD" => InputEvent::Right(true),
            "Escape" | "KeyP" => InputEvent::Pause,
            _ => return false,
        };
        self.sim.handle_input(event);
        true
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        let event = match code {
            "ArrowLeft" | "KeyA" => InputEvent::Left(false),
            "ArrowRight" | "KeyD" => InputEvent::Right(false),
            _ => return false,
        };
        self.sim.handle_input(event);
        true
    }

    pub fn pointer_down(&mut self) {
        self.sim.handle_input(InputEvent::PrimaryAction);
    }

    /// Advance by `dt` seconds of wall time and rebuild the frame
    pub fn update(&mut self, dt: f32) {
        self.sim.update(dt);

        if self.sim.summary().is_some() && !self.scores_saved {
            self.sim.high_scores().save();
            self.scores_saved = true;
        }

        self.frame = Some(self.presenter.build(self.sim.state(), dt));
    }

    /// Sprite instances of the last frame as raw bytes (32 per instance)
    pub fn sprite_buffer(&self) -> Vec<u8> {
        self.frame
            .as_ref()
            .map(|f| bytemuck::cast_slice(&f.instances).to_vec())
            .unwrap_or_default()
    }

    pub fn sprite_count(&self) -> usize {
        self.frame.as_ref().map_or(0, |f| f.instances.len())
    }

    pub fn parallax_offsets(&self) -> Vec<f32> {
        self.frame
            .as_ref()
            .map(|f| f.parallax.clone())
            .unwrap_or_default()
    }

    /// Camera shake offset as [x, y]
    pub fn shake_offset(&self) -> Vec<f32> {
        self.frame
            .as_ref()
            .map_or_else(|| vec![0.0, 0.0], |f| f.shake.to_vec())
    }

    pub fn hud_json(&self) -> String {
        self.frame_json(|f| serde_json::to_string(&f.hud))
    }

    pub fn texts_json(&self) -> String {
        self.frame_json(|f| serde_json::to_string(&f.texts))
    }

    pub fn flash_json(&self) -> String {
        self.frame_json(|f| serde_json::to_string(&f.flash))
    }

    /// Gameplay events since the last call (audio cues, HUD pops)
    pub fn events_json(&mut self) -> String {
        serde_json::to_string(&self.sim.take_events()).unwrap_or_else(|e| {
            log::warn!("Could not serialize events: {}", e);
            "[]".to_string()
        })
    }

    pub fn high_scores_json(&self) -> String {
        serde_json::to_string(self.sim.high_scores()).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn settings_json(&self) -> String {
        self.settings.to_json().unwrap_or_else(|_| "{}".to_string())
    }
}

impl WebGame {
    fn reset_presentation(&mut self) {
        // A run cut short by a restart may have been settled without an update
        if !self.scores_saved {
            self.sim.high_scores().save();
        }
        let tint = self.settings.avatar_tint;
        self.presenter.reset(self.sim.config().mode, tint);
        self.frame = None;
        self.scores_saved = false;
    }

    fn frame_json(&self, to_json: impl Fn(&Frame) -> serde_json::Result<String>) -> String {
        match self.frame.as_ref().map(to_json) {
            Some(Ok(json)) => json,
            Some(Err(e)) => {
                log::warn!("Could not serialize frame data: {}", e);
                "null".to_string()
            }
            None => "null".to_string(),
        }
    }
}
