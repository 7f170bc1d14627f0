//! Versioned state carried from one tick to the next
//!
//! The driver loads [`Memory`] at tick start and persists it at tick end.
//! Components receive it explicitly; nothing reaches it through a global.
//! A blob written by a different version, or one that no longer decodes,
//! is discarded and rebuilt from scratch rather than migrated.

pub mod loci;
pub mod store;

use serde::{Deserialize, Serialize};

use crate::core::config::TacticsConfig;
use crate::core::types::{Strategy, StructureId};
use crate::geometry::{dist, nearest};
use crate::world::{Star, World};

pub use loci::Loci;
pub use store::{InMemoryStore, JsonFileStore, MemoryStore};

/// Version marker; bump whenever the memory layout or its meaning changes
pub const BOT_VERSION: &str = "spirit-swarm 2.1";

/// Cross-tick state of the bot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub version: String,
    pub strategy: Strategy,
    /// Rally and refuel at the center star instead of the home star
    pub refuel_center: bool,
    /// An outpost retake is in progress
    pub retake_active: bool,
    /// Attackers hold formation at the rally point instead of chasing
    pub force_group: bool,
    pub home_star: StructureId,
    pub enemy_star: StructureId,
    pub center_star: StructureId,
    /// Size of our units at game start
    pub my_size: u32,
    pub loci: Loci,
}

impl Memory {
    /// Build fresh memory from the fixed structure layout
    pub fn initialize(world: &World, config: &TacticsConfig) -> Self {
        let home_star = nearest(world.base.position, world.stars.iter())
            .unwrap_or(&world.stars[0]);
        let enemy_star = nearest(world.enemy_base.position, world.stars.iter())
            .unwrap_or(&world.stars[0]);
        let center_star = find_center_star(world).unwrap_or(home_star);

        let my_size = world.friendly_spirits().next().map_or(1, |s| s.size);

        Self {
            version: BOT_VERSION.to_string(),
            strategy: Strategy::Economic,
            refuel_center: false,
            retake_active: false,
            force_group: false,
            home_star: home_star.id.clone(),
            enemy_star: enemy_star.id.clone(),
            center_star: center_star.id.clone(),
            my_size: my_size.max(1),
            loci: Loci::compute(
                &world.base,
                home_star,
                center_star,
                &world.outpost,
                config.ranges.energize_range,
            ),
        }
    }

    pub fn is_current(&self) -> bool {
        self.version == BOT_VERSION
    }

    /// Decode a stored blob, rebuilding when it is missing, stale or corrupt
    pub fn restore(blob: Option<&str>, world: &World, config: &TacticsConfig) -> Self {
        let Some(blob) = blob else {
            tracing::info!("No stored memory, initialising {}", BOT_VERSION);
            return Self::initialize(world, config);
        };

        match serde_json::from_str::<Memory>(blob) {
            Ok(memory) if memory.is_current() => memory,
            Ok(memory) => {
                tracing::warn!(
                    "Memory version {} does not match {}, reinitialising",
                    memory.version,
                    BOT_VERSION
                );
                Self::initialize(world, config)
            }
            Err(e) => {
                tracing::warn!("Stored memory is unreadable ({}), reinitialising", e);
                Self::initialize(world, config)
            }
        }
    }

    pub fn encode(&self) -> crate::core::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn home_star<'a>(&self, world: &'a World) -> &'a Star {
        world.star(&self.home_star).unwrap_or(&world.stars[0])
    }

    pub fn enemy_star<'a>(&self, world: &'a World) -> &'a Star {
        world.star(&self.enemy_star).unwrap_or(&world.stars[0])
    }

    pub fn center_star<'a>(&self, world: &'a World) -> &'a Star {
        world.star(&self.center_star).unwrap_or(&world.stars[0])
    }
}

/// The star farthest from whichever base is nearer to it
fn find_center_star(world: &World) -> Option<&Star> {
    let mut best: Option<(&Star, f32)> = None;
    for star in &world.stars {
        let reach = dist(star, &world.base).min(dist(star, &world.enemy_base));
        if best.map_or(true, |(_, d)| reach > d) {
            best = Some((star, reach));
        }
    }
    best.map(|(star, _)| star)
}
