//! Entity kinds, their behaviour table, and the per-category pools

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::WORLD_WIDTH;

/// Ocean Dash obstacle variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Jellyfish,
    Seaweed,
    Coral,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 3] = [ObstacleKind::Jellyfish, ObstacleKind::Seaweed, ObstacleKind::Coral];
}

/// Coral Reef hazard variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardKind {
    Jellyfish,
    SeaUrchin,
    TrashBottle,
    TrashCan,
    TrashBag,
}

impl HazardKind {
    pub const ALL: [HazardKind; 5] = [
        HazardKind::Jellyfish,
        HazardKind::SeaUrchin,
        HazardKind::TrashBottle,
        HazardKind::TrashCan,
        HazardKind::TrashBag,
    ];
}

/// Creature species; the reunion match key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Turtle,
    Seahorse,
    Fish,
}

impl Species {
    pub const ALL: [Species; 3] = [Species::Turtle, Species::Seahorse, Species::Fish];
}

/// What an entity is. Sub-type and species travel with the variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Obstacle(ObstacleKind),
    Hazard(HazardKind),
    Pearl,
    Shell,
    GoldenShell,
    Shield,
    SpeedBoost,
    Baby(Species),
    Parent(Species),
    /// Anchored platforms (the starting ground) never scroll
    Platform { anchored: bool },
}

/// How the player interacts with an entity on overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Hazard,
    Collectible,
    PowerUp,
    Creature,
    Platform,
}

/// Which pool an entity lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    Platforms,
    Hazards,
    Pearls,
    Shells,
    GoldenShells,
    Shields,
    SpeedBoosts,
    Babies,
    Parents,
}

impl PoolKind {
    /// Sweep/collision order. Platforms first so landings resolve before
    /// anything else touches the player.
    pub const ORDER: [PoolKind; 9] = [
        PoolKind::Platforms,
        PoolKind::Pearls,
        PoolKind::Shells,
        PoolKind::GoldenShells,
        PoolKind::Babies,
        PoolKind::Parents,
        PoolKind::SpeedBoosts,
        PoolKind::Shields,
        PoolKind::Hazards,
    ];
}

/// Static per-kind behaviour
#[derive(Debug, Clone, Copy)]
pub struct Behavior {
    pub category: Category,
    pub pool: PoolKind,
    /// Scale applied to the world scroll speed
    pub speed_multiplier: f32,
    /// Entity is destroyed once its center passes this x
    pub cull_x: f32,
    /// Drawn size
    pub size: Vec2,
    /// Collision box, centered on the entity
    pub hitbox: Vec2,
}

const fn behavior(
    category: Category,
    pool: PoolKind,
    speed_multiplier: f32,
    cull_x: f32,
    size: (f32, f32),
    hitbox: (f32, f32),
) -> Behavior {
    Behavior {
        category,
        pool,
        speed_multiplier,
        cull_x,
        size: Vec2::new(size.0, size.1),
        hitbox: Vec2::new(hitbox.0, hitbox.1),
    }
}

impl EntityKind {
    /// The behaviour table
    pub fn behavior(&self) -> Behavior {
        use Category as C;
        use PoolKind as P;
        match *self {
            EntityKind::Obstacle(ObstacleKind::Jellyfish) => {
                behavior(C::Hazard, P::Hazards, 1.0, -100.0, (48.0, 60.0), (36.0, 48.0))
            }
            EntityKind::Obstacle(ObstacleKind::Seaweed) => {
                behavior(C::Hazard, P::Hazards, 1.0, -100.0, (30.0, 120.0), (22.0, 108.0))
            }
            EntityKind::Obstacle(ObstacleKind::Coral) => {
                behavior(C::Hazard, P::Hazards, 1.0, -100.0, (72.0, 96.0), (56.0, 80.0))
            }
            EntityKind::Hazard(HazardKind::Jellyfish) => {
                behavior(C::Hazard, P::Hazards, 1.1, -60.0, (44.0, 55.0), (33.0, 38.5))
            }
            EntityKind::Hazard(HazardKind::SeaUrchin) => {
                behavior(C::Hazard, P::Hazards, 1.1, -60.0, (43.2, 43.2), (33.6, 33.6))
            }
            EntityKind::Hazard(HazardKind::TrashBottle) => {
                behavior(C::Hazard, P::Hazards, 1.1, -60.0, (16.0, 32.0), (12.0, 28.0))
            }
            EntityKind::Hazard(HazardKind::TrashCan) => {
                behavior(C::Hazard, P::Hazards, 1.1, -60.0, (14.0, 24.0), (11.0, 20.0))
            }
            EntityKind::Hazard(HazardKind::TrashBag) => {
                behavior(C::Hazard, P::Hazards, 1.1, -60.0, (28.0, 24.0), (22.0, 19.0))
            }
            EntityKind::Pearl => behavior(C::Collectible, P::Pearls, 1.0, -40.0, (16.0, 16.0), (16.0, 16.0)),
            EntityKind::Shell => behavior(C::Collectible, P::Shells, 1.0, -30.0, (20.0, 18.0), (20.0, 18.0)),
            EntityKind::GoldenShell => {
                behavior(C::Collectible, P::GoldenShells, 1.0, -50.0, (30.0, 27.0), (30.0, 27.0))
            }
            EntityKind::Shield => behavior(C::PowerUp, P::Shields, 1.0, -50.0, (40.0, 40.0), (36.0, 36.0)),
            EntityKind::SpeedBoost => {
                behavior(C::PowerUp, P::SpeedBoosts, 1.0, -30.0, (24.0, 24.0), (24.0, 24.0))
            }
            EntityKind::Baby(species) => {
                let size = match species {
                    Species::Turtle => (24.0, 20.0),
                    Species::Seahorse => (16.0, 24.0),
                    Species::Fish => (24.0, 14.0),
                };
                behavior(C::Creature, P::Babies, 0.8, -50.0, size, size)
            }
            EntityKind::Parent(species) => {
                let size = match species {
                    Species::Turtle => (48.0, 36.0),
                    Species::Seahorse => (28.0, 48.0),
                    Species::Fish => (44.0, 28.0),
                };
                behavior(C::Creature, P::Parents, 0.6, -100.0, size, size)
            }
            EntityKind::Platform { anchored: false } => {
                behavior(C::Platform, P::Platforms, 1.0, -150.0, (120.0, 24.0), (120.0, 24.0))
            }
            EntityKind::Platform { anchored: true } => {
                behavior(C::Platform, P::Platforms, 0.0, -150.0, (240.0, 24.0), (240.0, 24.0))
            }
        }
    }

    pub fn species(&self) -> Option<Species> {
        match *self {
            EntityKind::Baby(s) | EntityKind::Parent(s) => Some(s),
            _ => None,
        }
    }

    /// Idle float as `(travel, half_period_secs)`: the body eases from its
    /// base height to `base + travel` and back. Moves the hitbox too.
    pub fn bob(&self) -> Option<(f32, f32)> {
        match *self {
            EntityKind::Obstacle(ObstacleKind::Jellyfish) | EntityKind::Hazard(HazardKind::Jellyfish) => {
                Some((-40.0, 1.5))
            }
            EntityKind::Hazard(HazardKind::TrashBottle) => Some((-15.0, 0.8)),
            EntityKind::Hazard(HazardKind::TrashCan) => Some((-20.0, 1.0)),
            EntityKind::Hazard(HazardKind::TrashBag) => Some((30.0, 2.0)),
            EntityKind::Pearl | EntityKind::Shell => Some((-10.0, 0.5)),
            EntityKind::Baby(_) => Some((-15.0, 0.8)),
            EntityKind::Parent(_) => Some((-20.0, 1.0)),
            _ => None,
        }
    }

    /// Bob offset after `age` seconds (sine ease in/out, starts at 0)
    pub fn bob_offset(&self, age: f32) -> f32 {
        match self.bob() {
            Some((travel, half_period)) => {
                travel * 0.5 * (1.0 - (age * std::f32::consts::PI / half_period).cos())
            }
            None => 0.0,
        }
    }

    /// Spawn x just past the leading (right) edge
    pub fn spawn_x(&self) -> f32 {
        let margin = match *self {
            EntityKind::Obstacle(ObstacleKind::Coral) | EntityKind::Parent(_) => 40.0,
            EntityKind::Obstacle(_) | EntityKind::Hazard(HazardKind::Jellyfish | HazardKind::SeaUrchin) => 30.0,
            EntityKind::Hazard(HazardKind::TrashBag) => 25.0,
            EntityKind::Platform { .. } => 60.0,
            _ => 20.0,
        };
        WORLD_WIDTH + margin
    }
}

/// Cosmetic exit animation for an entity removed from play
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DespawnStyle {
    /// Collected item flies to the HUD counter
    FlyToHud,
    /// Collected item floats up and fades
    RiseFade,
    /// Hazard popped by a shield
    ShrinkFade,
    /// Baby swims into its parent
    Reunite { target: Vec2 },
    /// Reunited parent swims off the left edge
    SwimAway,
}

impl DespawnStyle {
    pub fn duration(&self) -> f32 {
        match self {
            DespawnStyle::FlyToHud => 0.3,
            DespawnStyle::RiseFade => 0.3,
            DespawnStyle::ShrinkFade => 0.2,
            DespawnStyle::Reunite { .. } => 0.5,
            DespawnStyle::SwimAway => 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Despawn {
    pub style: DespawnStyle,
    /// Position when the animation started
    pub from: Vec2,
    pub elapsed: f32,
}

impl Despawn {
    /// Animation progress 0..=1
    pub fn progress(&self) -> f32 {
        (self.elapsed / self.style.duration()).clamp(0.0, 1.0)
    }

    pub fn finished(&self) -> bool {
        self.elapsed >= self.style.duration()
    }
}

/// A transient world entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    /// Center position
    pub pos: Vec2,
    pub vel: Vec2,
    /// Eligible for collision. Cleared on first contact.
    pub active: bool,
    /// Player has already scrolled past this entity
    pub passed: bool,
    /// Rescued baby trailing the player
    pub is_following: bool,
    /// Vertical idle float added to `pos`
    #[serde(default)]
    pub bob: f32,
    pub despawn: Option<Despawn>,
    /// Tick the entity spawned on (cosmetic phase offset)
    pub born_tick: u64,
}

impl Entity {
    pub fn new(id: u32, kind: EntityKind, pos: Vec2, born_tick: u64) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            active: true,
            passed: false,
            is_following: false,
            bob: 0.0,
            despawn: None,
            born_tick,
        }
    }

    pub fn behavior(&self) -> Behavior {
        self.kind.behavior()
    }

    /// Where the body actually is: scroll position plus idle float
    pub fn body_pos(&self) -> Vec2 {
        self.pos + Vec2::new(0.0, self.bob)
    }

    /// Collision box around the body
    pub fn hitbox(&self) -> Aabb {
        Aabb::new(self.body_pos(), self.behavior().hitbox)
    }

    /// Current multiplier on the world scroll speed. Following babies hold
    /// their own position and do not scroll.
    pub fn speed_multiplier(&self) -> f32 {
        if self.is_following {
            0.0
        } else {
            self.behavior().speed_multiplier
        }
    }

    /// Take the entity out of play and start its exit animation
    pub fn begin_despawn(&mut self, style: DespawnStyle) {
        self.active = false;
        self.vel = Vec2::ZERO;
        self.pos = self.body_pos();
        self.bob = 0.0;
        self.despawn = Some(Despawn {
            style,
            from: self.pos,
            elapsed: 0.0,
        });
    }
}

/// Per-category entity pools. Each entity is owned by exactly one pool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pools {
    pub platforms: Vec<Entity>,
    pub hazards: Vec<Entity>,
    pub pearls: Vec<Entity>,
    pub shells: Vec<Entity>,
    pub golden_shells: Vec<Entity>,
    pub shields: Vec<Entity>,
    pub speed_boosts: Vec<Entity>,
    pub babies: Vec<Entity>,
    pub parents: Vec<Entity>,
}

impl Pools {
    pub fn pool(&self, kind: PoolKind) -> &Vec<Entity> {
        match kind {
            PoolKind::Platforms => &self.platforms,
            PoolKind::Hazards => &self.hazards,
            PoolKind::Pearls => &self.pearls,
            PoolKind::Shells => &self.shells,
            PoolKind::GoldenShells => &self.golden_shells,
            PoolKind::Shields => &self.shields,
            PoolKind::SpeedBoosts => &self.speed_boosts,
            PoolKind::Babies => &self.babies,
            PoolKind::Parents => &self.parents,
        }
    }

    pub fn pool_mut(&mut self, kind: PoolKind) -> &mut Vec<Entity> {
        match kind {
            PoolKind::Platforms => &mut self.platforms,
            PoolKind::Hazards => &mut self.hazards,
            PoolKind::Pearls => &mut self.pearls,
            PoolKind::Shells => &mut self.shells,
            PoolKind::GoldenShells => &mut self.golden_shells,
            PoolKind::Shields => &mut self.shields,
            PoolKind::SpeedBoosts => &mut self.speed_boosts,
            PoolKind::Babies => &mut self.babies,
            PoolKind::Parents => &mut self.parents,
        }
    }

    /// Insert into the pool the kind belongs to
    pub fn insert(&mut self, entity: Entity) {
        let pool = entity.behavior().pool;
        self.pool_mut(pool).push(entity);
    }

    pub fn find(&self, kind: PoolKind, id: u32) -> Option<&Entity> {
        self.pool(kind).iter().find(|e| e.id == id)
    }

    pub fn find_mut(&mut self, kind: PoolKind, id: u32) -> Option<&mut Entity> {
        self.pool_mut(kind).iter_mut().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        PoolKind::ORDER.into_iter().flat_map(move |k| self.pool(k).iter())
    }

    pub fn len(&self) -> usize {
        PoolKind::ORDER.iter().map(|&k| self.pool(k).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        for kind in PoolKind::ORDER {
            self.pool_mut(kind).clear();
        }
    }

    /// Zero every entity's velocity (game over freeze)
    pub fn freeze(&mut self) {
        for kind in PoolKind::ORDER {
            for entity in self.pool_mut(kind).iter_mut() {
                entity.vel = Vec2::ZERO;
            }
        }
    }
}
