//! Scrolling background layers

use crate::consts::WORLD_WIDTH;
use crate::sim::GameMode;

/// Horizontal offsets for tiled background layers, far to near
#[derive(Debug, Clone)]
pub struct Parallax {
    factors: &'static [f32],
    offsets: Vec<f32>,
}

impl Parallax {
    pub fn for_mode(mode: GameMode) -> Self {
        let factors: &'static [f32] = match mode {
            GameMode::OceanDash => &[0.1, 0.3, 0.6],
            GameMode::CoralReef => &[0.15, 0.4],
        };
        Self {
            factors,
            offsets: vec![0.0; factors.len()],
        }
    }

    /// Scroll every layer by its share of the world speed
    pub fn advance(&mut self, game_speed: f32, dt: f32) {
        for (offset, factor) in self.offsets.iter_mut().zip(self.factors) {
            *offset = (*offset + game_speed * factor * dt).rem_euclid(WORLD_WIDTH);
        }
    }

    /// Tile offsets in pixels, wrapped to one tile width
    pub fn offsets(&self) -> &[f32] {
        &self.offsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_near_layers_move_faster() {
        let mut parallax = Parallax::for_mode(GameMode::OceanDash);
        parallax.advance(200.0, 1.0);
        let o = parallax.offsets();
        assert_eq!(o.len(), 3);
        assert!(o[0] < o[1] && o[1] < o[2]);
        assert!((o[2] - 120.0).abs() < 1e-3);
    }

    #[test]
    fn test_offsets_wrap() {
        let mut parallax = Parallax::for_mode(GameMode::CoralReef);
        for _ in 0..100 {
            parallax.advance(400.0, 1.0);
        }
        assert!(parallax.offsets().iter().all(|&o| (0.0..WORLD_WIDTH).contains(&o)));
    }
}
