//! The per-tick working snapshot
//!
//! [`Snapshot`] is the read-only view handed over by the engine. [`World`]
//! is the mutable copy the decision engine works on: energize decisions
//! are applied to it immediately (see [`ledger`]) so that every later
//! decision in the same tick sees the predicted post-energize state. The
//! predictions are speculative; the engine resolves the real outcome.

pub mod entity;
pub mod ledger;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SwarmError};
use crate::core::types::{PlayerId, SpiritId, StructureId, Tick};

pub use entity::{Base, Outpost, Sight, Spirit, Star};
pub use ledger::EnergizeTarget;

/// Read-only state of the game at the start of a tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: Tick,
    pub this_player_id: PlayerId,
    /// Every spirit in the game, both players, in engine order
    pub spirits: Vec<Spirit>,
    pub base: Base,
    pub enemy_base: Base,
    pub stars: Vec<Star>,
    pub outpost: Outpost,
}

/// Mutable working copy of a snapshot for one tick
#[derive(Debug, Clone)]
pub struct World {
    pub tick: Tick,
    pub me: PlayerId,
    pub spirits: Vec<Spirit>,
    /// Living friendly spirits, in engine order
    pub friendly: Vec<usize>,
    /// Living enemy spirits, in engine order
    pub enemies: Vec<usize>,
    pub base: Base,
    pub enemy_base: Base,
    pub stars: Vec<Star>,
    pub outpost: Outpost,
    index: AHashMap<SpiritId, usize>,
    /// Units whose energize decision is already made this tick
    acted: Vec<bool>,
}

impl World {
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        if snapshot.stars.is_empty() {
            return Err(SwarmError::Snapshot("snapshot contains no stars".into()));
        }

        let me = snapshot.this_player_id;
        let mut index = AHashMap::with_capacity(snapshot.spirits.len());
        let mut friendly = Vec::new();
        let mut enemies = Vec::new();

        for (i, spirit) in snapshot.spirits.iter().enumerate() {
            index.insert(spirit.id.clone(), i);
            if !spirit.is_alive() {
                continue;
            }
            if spirit.player_id == me {
                friendly.push(i);
            } else {
                enemies.push(i);
            }
        }

        let acted = vec![false; snapshot.spirits.len()];
        Ok(Self {
            tick: snapshot.tick,
            me,
            spirits: snapshot.spirits,
            friendly,
            enemies,
            base: snapshot.base,
            enemy_base: snapshot.enemy_base,
            stars: snapshot.stars,
            outpost: snapshot.outpost,
            index,
            acted,
        })
    }

    pub fn spirit(&self, idx: usize) -> &Spirit {
        &self.spirits[idx]
    }

    pub fn spirit_mut(&mut self, idx: usize) -> &mut Spirit {
        &mut self.spirits[idx]
    }

    pub fn index_of(&self, id: &SpiritId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn mark_acted(&mut self, idx: usize) {
        self.acted[idx] = true;
    }

    pub fn has_acted(&self, idx: usize) -> bool {
        self.acted[idx]
    }

    pub fn is_friendly(&self, idx: usize) -> bool {
        self.spirits[idx].player_id == self.me
    }

    /// Resolve sight ids to living spirit indices, skipping unknown ids
    pub fn resolve(&self, ids: &[SpiritId]) -> Vec<usize> {
        ids.iter()
            .filter_map(|id| self.index_of(id))
            .filter(|&i| self.spirits[i].is_alive())
            .collect()
    }

    pub fn friendly_spirits(&self) -> impl Iterator<Item = &Spirit> + '_ {
        self.friendly.iter().map(move |&i| &self.spirits[i])
    }

    pub fn enemy_spirits(&self) -> impl Iterator<Item = &Spirit> + '_ {
        self.enemies.iter().map(move |&i| &self.spirits[i])
    }

    pub fn star(&self, id: &StructureId) -> Option<&Star> {
        self.stars.iter().find(|s| &s.id == id)
    }

    pub fn star_mut(&mut self, id: &StructureId) -> Option<&mut Star> {
        self.stars.iter_mut().find(|s| &s.id == id)
    }

    /// The outpost is controlled by us
    pub fn allied_outpost(&self) -> bool {
        self.outpost.control.as_ref() == Some(&self.me)
    }

    /// The outpost is held by the opponent and still charged
    pub fn enemy_outpost(&self) -> bool {
        self.outpost_is_hostile() && self.outpost.energy > 0.0
    }

    /// Owned by the opponent regardless of charge; neutral counts as friendly
    pub fn outpost_is_hostile(&self) -> bool {
        self.outpost
            .control
            .as_ref()
            .is_some_and(|owner| owner != &self.me)
    }

    /// Our shape, taken from our base
    pub fn my_shape(&self) -> crate::core::types::Shape {
        self.base.shape
    }

    /// The opponent's shape, taken from their base
    pub fn enemy_shape(&self) -> crate::core::types::Shape {
        self.enemy_base.shape
    }
}
