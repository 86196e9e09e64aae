//! Instance types for 2D sprite rendering

use bytemuck::{Pod, Zeroable};

use crate::sim::{EntityKind, HazardKind, ObstacleKind, Species};

/// One textured quad, laid out for a GPU instance buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Center in world pixels
    pub position: [f32; 2],
    /// Width/height; negative width mirrors horizontally
    pub size: [f32; 2],
    /// Radians, clockwise
    pub rotation: f32,
    pub alpha: f32,
    /// `SpriteId` discriminant
    pub sprite: u32,
    /// 0xRRGGBB multiply tint (white = untinted)
    pub tint: u32,
}

impl SpriteInstance {
    pub fn new(sprite: SpriteId, position: [f32; 2], size: [f32; 2]) -> Self {
        Self {
            position,
            size,
            rotation: 0.0,
            alpha: 1.0,
            sprite: sprite as u32,
            tint: colors::WHITE,
        }
    }
}

/// Texture atlas slots
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteId {
    Player = 0,
    ShieldBubble,
    Pearl,
    Shell,
    GoldenShell,
    ShieldPowerUp,
    SpeedBoost,
    Jellyfish,
    Seaweed,
    Coral,
    SeaUrchin,
    TrashBottle,
    TrashCan,
    TrashBag,
    BabyTurtle,
    BabySeahorse,
    BabyFish,
    ParentTurtle,
    ParentSeahorse,
    ParentFish,
    Platform,
    Ground,
    Bubble,
}

impl SpriteId {
    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Obstacle(ObstacleKind::Jellyfish) => SpriteId::Jellyfish,
            EntityKind::Obstacle(ObstacleKind::Seaweed) => SpriteId::Seaweed,
            EntityKind::Obstacle(ObstacleKind::Coral) => SpriteId::Coral,
            EntityKind::Hazard(HazardKind::Jellyfish) => SpriteId::Jellyfish,
            EntityKind::Hazard(HazardKind::SeaUrchin) => SpriteId::SeaUrchin,
            EntityKind::Hazard(HazardKind::TrashBottle) => SpriteId::TrashBottle,
            EntityKind::Hazard(HazardKind::TrashCan) => SpriteId::TrashCan,
            EntityKind::Hazard(HazardKind::TrashBag) => SpriteId::TrashBag,
            EntityKind::Pearl => SpriteId::Pearl,
            EntityKind::Shell => SpriteId::Shell,
            EntityKind::GoldenShell => SpriteId::GoldenShell,
            EntityKind::Shield => SpriteId::ShieldPowerUp,
            EntityKind::SpeedBoost => SpriteId::SpeedBoost,
            EntityKind::Baby(Species::Turtle) => SpriteId::BabyTurtle,
            EntityKind::Baby(Species::Seahorse) => SpriteId::BabySeahorse,
            EntityKind::Baby(Species::Fish) => SpriteId::BabyFish,
            EntityKind::Parent(Species::Turtle) => SpriteId::ParentTurtle,
            EntityKind::Parent(Species::Seahorse) => SpriteId::ParentSeahorse,
            EntityKind::Parent(Species::Fish) => SpriteId::ParentFish,
            EntityKind::Platform { anchored: false } => SpriteId::Platform,
            EntityKind::Platform { anchored: true } => SpriteId::Ground,
        }
    }
}

/// Pack an RGB triple into 0xRRGGBB
pub const fn pack_rgb(rgb: [u8; 3]) -> u32 {
    ((rgb[0] as u32) << 16) | ((rgb[1] as u32) << 8) | rgb[2] as u32
}

/// Colors for game elements
pub mod colors {
    pub const WHITE: u32 = 0xFFFFFF;
    pub const SHIELD: u32 = 0x5DD3C3;
    pub const BUBBLE: u32 = 0xB8F0E8;
    pub const BOOST_GLOW: u32 = 0xFFD700;
    pub const WATER_DEEP: [f32; 4] = [0.04, 0.22, 0.38, 1.0];
    pub const WATER_SHALLOW: [f32; 4] = [0.18, 0.55, 0.7, 1.0];
}
