//! High score registry
//!
//! One top-10 leaderboard per game mode. Held in memory by the run
//! controller; the wasm host persists it to LocalStorage.

use serde::{Deserialize, Serialize};

use crate::sim::{Difficulty, GameMode};

/// Maximum number of high scores to keep per mode
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Distance (Ocean Dash) or points (Coral Reef Quest)
    pub score: u64,
    /// Pearls/shells banked on that run
    pub currency: u32,
    pub difficulty: Difficulty,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Descending leaderboard for one mode
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<HighScoreEntry>,
}

impl Leaderboard {
    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert an entry if it qualifies; returns the rank achieved
    pub fn add(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }
        let rank = match self.entries.iter().position(|e| entry.score > e.score) {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

/// Per-mode leaderboards
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighScores {
    pub ocean_dash: Leaderboard,
    pub coral_reef: Leaderboard,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    const STORAGE_KEY: &'static str = "reef_arcade_highscores";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn board(&self, mode: GameMode) -> &Leaderboard {
        match mode {
            GameMode::OceanDash => &self.ocean_dash,
            GameMode::CoralReef => &self.coral_reef,
        }
    }

    pub fn board_mut(&mut self, mode: GameMode) -> &mut Leaderboard {
        match mode {
            GameMode::OceanDash => &mut self.ocean_dash,
            GameMode::CoralReef => &mut self.coral_reef,
        }
    }

    /// Best score for a mode (0 when nothing recorded)
    pub fn best(&self, mode: GameMode) -> u64 {
        self.board(mode).top_score().unwrap_or(0)
    }

    /// Record a finished run; returns the rank achieved
    pub fn record(
        &mut self,
        mode: GameMode,
        score: u64,
        currency: u32,
        difficulty: Difficulty,
    ) -> Option<usize> {
        let rank = self.board_mut(mode).add(HighScoreEntry {
            score,
            currency,
            difficulty,
            timestamp: now_ms(),
        });
        if let Some(rank) = rank {
            log::info!("New {} high score #{}: {}", mode.as_str(), rank, score);
        }
        rank
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<HighScores>(&json) {
                    Ok(scores) => {
                        log::info!(
                            "Loaded high scores ({} ocean dash, {} coral reef)",
                            scores.ocean_dash.entries.len(),
                            scores.coral_reef.entries.len()
                        );
                        return scores;
                    }
                    Err(e) => log::warn!("Discarding unreadable high scores: {}", e),
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High scores saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(target_arch = "wasm32")]
fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boards_are_per_mode() {
        let mut scores = HighScores::new();
        scores.record(GameMode::OceanDash, 900, 12, Difficulty::Easy);
        assert_eq!(scores.best(GameMode::OceanDash), 900);
        assert_eq!(scores.best(GameMode::CoralReef), 0);
    }

    #[test]
    fn test_leaderboard_sorted_and_capped() {
        let mut scores = HighScores::new();
        for s in 1..=15u64 {
            scores.record(GameMode::CoralReef, s * 10, 0, Difficulty::Hard);
        }
        let board = scores.board(GameMode::CoralReef);
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(board.top_score(), Some(150));
        assert!(board.entries.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(!board.qualifies(50));
        assert_eq!(board.potential_rank(145), Some(2));
    }

    #[test]
    fn test_zero_never_qualifies() {
        let mut board = Leaderboard::default();
        assert_eq!(
            board.add(HighScoreEntry {
                score: 0,
                currency: 3,
                difficulty: Difficulty::Easy,
                timestamp: 0.0,
            }),
            None
        );
        assert!(board.is_empty());
    }

    #[test]
    fn test_json_round_trip_keeps_entries() {
        let mut scores = HighScores::new();
        scores.record(GameMode::OceanDash, 1234, 40, Difficulty::Medium);
        let json = serde_json::to_string(&scores).unwrap();
        let back: HighScores = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ocean_dash.entries, scores.ocean_dash.entries);
    }
}
