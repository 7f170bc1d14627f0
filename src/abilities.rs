//! Merge and divide for the circle archetype
//!
//! Circles can fold into one larger unit and split again. Against triangles,
//! whose explosions hit every unit in range, a few large units take less
//! total damage than many small ones, so attackers merge once they are
//! massed at the rally point or committed to the all-in. Any merged unit
//! that no longer holds at least one energy per size divides.

use serde::{Deserialize, Serialize};

use crate::assessment::WorldContext;
use crate::core::config::TacticsConfig;
use crate::core::types::{Role, Shape, SpiritId, Strategy};
use crate::geometry::{dist, in_range, nearest};
use crate::world::World;

/// Archetype ability used by one unit this tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "into", rename_all = "lowercase")]
pub enum Ability {
    /// Fold into the given unit
    Merge(SpiritId),
    Divide,
}

fn should_merge(world: &World, ctx: &WorldContext, config: &TacticsConfig, unit: usize) -> bool {
    let s = world.spirit(unit);
    s.mark == Role::Attack
        && ctx.enemy_shape == Shape::Triangles
        && (dist(s, ctx.rally_position) < config.abilities.merge_rally_radius
            || ctx.strategy == Strategy::AllIn)
}

/// Merge and divide decisions in input order, indexed by spirit slot.
///
/// A merge adds the unit's size to its partner in the working snapshot, so
/// later units see the grown partner and the size cap holds. A unit that
/// folded away is no longer a merge partner.
pub fn plan_abilities(
    world: &mut World,
    ctx: &WorldContext,
    config: &TacticsConfig,
) -> Vec<Option<Ability>> {
    let mut decisions = vec![None; world.spirits.len()];
    if ctx.my_shape != Shape::Circles {
        return decisions;
    }

    let mut absorbed = vec![false; world.spirits.len()];
    let friendly = world.friendly.clone();
    for &unit in &friendly {
        if absorbed[unit] {
            continue;
        }

        if !should_merge(world, ctx, config, unit) {
            let s = world.spirit(unit);
            if s.size > 1 && s.energy < s.size as f32 {
                tracing::trace!("{} divide (size {}, energy {})", s.id, s.size, s.energy);
                decisions[unit] = Some(Ability::Divide);
            }
            continue;
        }

        let s = world.spirit(unit);
        let partners = friendly
            .iter()
            .copied()
            .filter(|&t| t != unit && !absorbed[t])
            .map(|t| (t, world.spirit(t)))
            .filter(|(_, t)| {
                t.mark == s.mark
                    && t.size + s.size <= config.abilities.max_merge_size
                    && in_range(s, *t, config.ranges.merge_range)
            });
        let Some((partner, _)) = nearest(s, partners) else {
            continue;
        };

        let size = s.size;
        let partner_id = world.spirit(partner).id.clone();
        tracing::trace!("{} merge into {}", world.spirit(unit).id, partner_id);
        world.spirit_mut(partner).size += size;
        absorbed[unit] = true;
        decisions[unit] = Some(Ability::Merge(partner_id));
    }
    decisions
}
