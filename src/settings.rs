//! Player preferences
//!
//! Persisted separately from high scores in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::sim::{Difficulty, GameMode};

/// Errors from reading or validating stored settings
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("Settings JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Avatar tint {0:#x} is not a 24-bit RGB color")]
    TintOutOfRange(u32),

    #[error("Unparseable avatar tint: {0}")]
    BadTint(String),
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Last game played
    pub mode: GameMode,
    pub difficulty: Difficulty,
    /// Avatar tint as 0xRRGGBB
    pub avatar_tint: Option<u32>,

    // === Visual Effects ===
    /// Camera shake on hits
    pub screen_shake: bool,
    /// Camera flash on pickups
    pub flashes: bool,
    /// Bubble particles
    pub particles: bool,

    // === Audio ===
    pub sound_enabled: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, no flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: GameMode::OceanDash,
            difficulty: Difficulty::Easy,
            avatar_tint: None,

            screen_shake: true,
            flashes: true,
            particles: true,

            sound_enabled: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective camera flash (respects reduced_motion)
    pub fn effective_flashes(&self) -> bool {
        self.flashes && !self.reduced_motion
    }

    /// Parse and validate stored settings. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        match self.avatar_tint {
            Some(tint) if tint > 0xFF_FFFF => Err(SettingsError::TintOutOfRange(tint)),
            _ => Ok(()),
        }
    }

    /// LocalStorage key
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    const STORAGE_KEY: &'static str = "reef_arcade_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("{}, using defaults", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match self.to_json() {
                Ok(json) => {
                    let _ = storage.set_item(Self::STORAGE_KEY, &json);
                    log::info!("Settings saved");
                }
                Err(e) => log::warn!("Settings not saved: {}", e),
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// Parse a CSS-style tint ("#5dd3c3", "5DD3C3", "0x5dd3c3")
pub fn parse_tint(s: &str) -> Result<u32, SettingsError> {
    let trimmed = s.trim();
    let hex = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .unwrap_or(trimmed);
    if hex.len() != 6 {
        return Err(SettingsError::BadTint(s.to_string()));
    }
    u32::from_str_radix(hex, 16).map_err(|_| SettingsError::BadTint(s.to_string()))
}
