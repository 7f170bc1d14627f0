//! Entities as reported by the engine each tick

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::types::{PlayerId, Role, Shape, SpiritId, StructureId};
use crate::geometry::{Energetic, Located};

fn default_move_speed() -> f32 {
    20.0
}

fn default_hp() -> f32 {
    1.0
}

fn default_size() -> u32 {
    1
}

/// Which spirits a unit can currently see or reach
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Sight {
    pub enemies: Vec<SpiritId>,
    /// Enemies within energize range
    pub enemies_beamable: Vec<SpiritId>,
    pub friends: Vec<SpiritId>,
    /// Friends within energize range
    pub friends_beamable: Vec<SpiritId>,
    pub structures: Vec<StructureId>,
}

/// A mobile unit, friendly or hostile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spirit {
    pub id: SpiritId,
    pub player_id: PlayerId,
    pub position: Vec2,
    pub energy: f32,
    pub energy_capacity: f32,
    /// Supply cost and per-tick transfer cap
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default = "default_hp")]
    pub hp: f32,
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
    #[serde(default)]
    pub shape: Shape,
    /// Role tag carried over from the previous tick
    #[serde(default)]
    pub mark: Role,
    #[serde(default)]
    pub sight: Sight,
    /// Predicted to die this tick from energize damage already committed
    #[serde(skip)]
    pub doomed: bool,
}

impl Spirit {
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Energy this unit can send in one energize: `min(size, energy)`
    pub fn power(&self) -> f32 {
        (self.size as f32).min(self.energy).max(0.0)
    }

    /// Missing capacity
    pub fn vacancy(&self) -> f32 {
        (self.energy_capacity - self.energy).max(0.0)
    }
}

/// A player's home structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Base {
    pub id: StructureId,
    pub player_id: PlayerId,
    pub position: Vec2,
    /// May go negative while under attack
    pub energy: f32,
    pub energy_capacity: f32,
    #[serde(default = "default_hp")]
    pub hp: f32,
    #[serde(default)]
    pub shape: Shape,
}

/// A regenerating energy source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub id: StructureId,
    pub position: Vec2,
    pub energy: f32,
    pub energy_capacity: f32,
    /// Ticks until the star becomes harvestable; zero once active
    #[serde(default)]
    pub active_in: u32,
}

impl Star {
    pub fn is_active(&self) -> bool {
        self.active_in == 0
    }

    /// Energy the star regenerates next tick
    pub fn energy_per_tick(&self) -> f32 {
        (3.0 + self.energy / 100.0).round()
    }
}

/// The contested territory structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outpost {
    pub id: StructureId,
    pub position: Vec2,
    pub energy: f32,
    pub energy_capacity: f32,
    /// Owning player; `None` while neutral
    #[serde(default)]
    pub control: Option<PlayerId>,
}

macro_rules! impl_entity {
    ($($ty:ty),*) => {
        $(
            impl Located for $ty {
                fn position(&self) -> Vec2 {
                    self.position
                }
            }

            impl Energetic for $ty {
                fn energy(&self) -> f32 {
                    self.energy
                }

                fn energy_capacity(&self) -> f32 {
                    self.energy_capacity
                }
            }
        )*
    };
}

impl_entity!(Spirit, Base, Star, Outpost);
