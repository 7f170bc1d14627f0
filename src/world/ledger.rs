//! Speculative energy bookkeeping
//!
//! The engine applies every energize before any move, so each decision has
//! to see the energy that earlier decisions in the same tick will move.
//! These functions mirror the engine's transfer rules on the working
//! snapshot:
//!
//! - the source spends its power, `min(size, energy)`
//! - a friendly spirit gains that power, capped at its capacity
//! - a hostile spirit loses twice that power, floored at zero; a hit that
//!   would take it below zero marks it doomed
//! - our base and a friendly or neutral outpost gain the power, capped
//! - the enemy base and a charged enemy outpost lose twice the power and
//!   may go negative; a drained enemy outpost is recharged like our own
//! - a self-energize harvests 1:1 from the nearest star in range, bounded
//!   by the unit's size, its missing capacity and the star's stock

use serde::{Deserialize, Serialize};

use crate::core::types::{SpiritId, StructureId};
use crate::geometry::{dist, in_range};

use super::World;

/// Multiplier applied to power sent into hostile targets
pub const HOSTILE_FACTOR: f32 = 2.0;

/// What a unit energizes this tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum EnergizeTarget {
    /// Another spirit, or the unit itself for a harvest
    Spirit(SpiritId),
    Base(StructureId),
    Outpost(StructureId),
}

impl World {
    /// Nearest active star with energy within `range` of the unit
    pub fn harvestable_star(&self, unit: usize, range: f32) -> Option<usize> {
        let position = self.spirits[unit].position;
        let candidates = self
            .stars
            .iter()
            .enumerate()
            .filter(|(_, star)| star.is_active() && star.energy > 0.0)
            .filter(|(_, star)| in_range(position, star.position, range));
        candidates
            .min_by(|(_, a), (_, b)| dist(position, *a).total_cmp(&dist(position, *b)))
            .map(|(i, _)| i)
    }

    /// Apply a harvest from `star` into `unit`; returns the energy gained
    pub fn apply_harvest(&mut self, unit: usize, star: usize) -> f32 {
        let spirit = &self.spirits[unit];
        let amount = (spirit.size as f32)
            .min(spirit.vacancy())
            .min(self.stars[star].energy)
            .max(0.0);
        self.spirits[unit].energy += amount;
        self.stars[star].energy -= amount;
        amount
    }

    /// Apply `source` energizing `target`; returns the power spent.
    ///
    /// A self target is treated as a harvest from the nearest star within
    /// `range`, returning zero if there is none.
    pub fn apply_energize(&mut self, source: usize, target: &EnergizeTarget, range: f32) -> f32 {
        match target {
            EnergizeTarget::Spirit(id) if *id == self.spirits[source].id => {
                match self.harvestable_star(source, range) {
                    Some(star) => self.apply_harvest(source, star),
                    None => 0.0,
                }
            }
            EnergizeTarget::Spirit(id) => {
                let Some(receiver) = self.index_of(id) else {
                    return 0.0;
                };
                let power = self.spend(source);
                let hostile = self.spirits[receiver].player_id != self.spirits[source].player_id;
                let spirit = &mut self.spirits[receiver];
                if hostile {
                    let predicted = spirit.energy - power * HOSTILE_FACTOR;
                    if predicted < 0.0 {
                        spirit.doomed = true;
                    }
                    spirit.energy = predicted.max(0.0);
                } else {
                    spirit.energy = (spirit.energy + power).min(spirit.energy_capacity);
                }
                power
            }
            EnergizeTarget::Base(id) => {
                let power = self.spend(source);
                if *id == self.enemy_base.id {
                    self.enemy_base.energy -= power * HOSTILE_FACTOR;
                } else {
                    let base = &mut self.base;
                    base.energy = (base.energy + power).min(base.energy_capacity);
                }
                power
            }
            EnergizeTarget::Outpost(_) => {
                let power = self.spend(source);
                if self.enemy_outpost() {
                    self.outpost.energy -= power * HOSTILE_FACTOR;
                } else {
                    let outpost = &mut self.outpost;
                    outpost.energy = (outpost.energy + power).min(outpost.energy_capacity);
                }
                power
            }
        }
    }

    fn spend(&mut self, source: usize) -> f32 {
        let spirit = &mut self.spirits[source];
        let power = spirit.power();
        spirit.energy -= power;
        power
    }
}
