//! Per-tick situational assessment
//!
//! [`assess`] reads the working snapshot once at the start of a tick and
//! produces the [`WorldContext`] every later component consults: totals for
//! both sides, threat around our economy, pressure on the outpost, derived
//! staging positions and the macro strategy after this tick's transition.
//! Units are never touched here; only the strategy fields of memory change.

pub mod strategy;
pub mod threat;

use glam::Vec2;

use crate::core::config::TacticsConfig;
use crate::core::types::{Shape, Strategy, StructureId, Tick};
use crate::geometry::{dist, energy_ratio, in_range, next_position};
use crate::memory::Memory;
use crate::world::World;

pub use strategy::{StrategySignals, StrategyTransition};
pub use threat::{classify_invaders, invader_supply, outpost_enemy_power, InvaderBands};

/// Energy and supply sums for one side
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub count: usize,
    pub energy: f32,
    pub capacity: f32,
    /// Sum of unit sizes
    pub supply: f32,
}

impl Totals {
    fn accumulate<'a>(spirits: impl Iterator<Item = &'a crate::world::Spirit>) -> Self {
        spirits.fold(Self::default(), |mut totals, spirit| {
            totals.count += 1;
            totals.energy += spirit.energy.max(0.0);
            totals.capacity += spirit.energy_capacity;
            totals.supply += spirit.size as f32;
            totals
        })
    }
}

/// Read-only summary of the tick, shared by roles, energize and movement
#[derive(Debug, Clone)]
pub struct WorldContext {
    pub tick: Tick,
    pub mine: Totals,
    pub theirs: Totals,
    pub my_shape: Shape,
    pub enemy_shape: Shape,
    /// Combat efficiency applied to raw enemy energy
    pub enemy_multiplier: f32,
    pub invaders: InvaderBands,
    pub outpost_enemy_power: f32,
    /// Transfer power of enemies guarding their own base
    pub enemy_base_supply: f32,
    /// Friendly energy over shape-scaled enemy energy; `f32::MAX` with no enemies
    pub power_ratio: f32,
    pub can_beat_base: bool,
    pub can_beat_all: bool,
    pub ready_to_attack: bool,
    pub can_harvest_center: bool,
    pub enemy_outpost: bool,
    /// Most enemy supply is already inside our far band
    pub enemy_all_in: bool,
    /// Their army is closer to our base than ours is to theirs
    pub counter_attack_risk: bool,
    /// Defenders the current threat calls for, before any bonus
    pub threat_defenders: u32,
    pub strategy: Strategy,
    pub transition: Option<StrategyTransition>,
    /// Star attackers refuel at while staging
    pub rally_star: StructureId,
    pub rally_position: Vec2,
    pub idle_position: Vec2,
}

impl WorldContext {
    pub fn is_attacking(&self) -> bool {
        self.strategy.is_attacking()
    }
}

/// Defenders needed to absorb `threat`, one per `share * size` of it
pub fn threat_defenders(threat: f32, my_size: u32, config: &TacticsConfig) -> u32 {
    let absorb = my_size.max(1) as f32 * config.roles.defender_threat_share;
    (threat / absorb).ceil().max(0.0) as u32
}

/// Assess the world and advance the strategy machine once
pub fn assess(world: &World, memory: &mut Memory, config: &TacticsConfig) -> WorldContext {
    let energize_range = config.ranges.energize_range;
    let mine = Totals::accumulate(world.friendly_spirits());
    let theirs = Totals::accumulate(world.enemy_spirits());
    let enemy_shape = world.enemy_shape();
    let enemy_multiplier = config.shapes.profile(enemy_shape).combat_multiplier;

    let home_star = memory.home_star(world).position;
    let invaders = classify_invaders(world, home_star, &config.threat);
    let outpost_power = outpost_enemy_power(world, &config.threat);
    let enemy_base_supply: f32 = world
        .enemy_spirits()
        .filter(|s| in_range(*s, &world.enemy_base, energize_range))
        .map(|s| s.power())
        .sum();

    let scaled_enemy = theirs.energy * enemy_multiplier;
    let power_ratio = if scaled_enemy > 0.0 {
        mine.energy / scaled_enemy
    } else {
        f32::MAX
    };

    let can_beat_base = mine.energy * 2.0 > world.enemy_base.energy + enemy_base_supply;
    let can_beat_all =
        mine.capacity > world.enemy_base.energy + theirs.capacity * enemy_multiplier * 2.0;
    let ready_to_attack = mine.supply >= config.economy.attack_supply as f32 || can_beat_all;

    let center = memory.center_star(world);
    let can_harvest_center = center.energy > 0.0 && world.allied_outpost();
    let enemy_outpost = world.enemy_outpost();
    let defenders = threat_defenders(invaders.threat, memory.my_size, config);

    let (rally_star, rally_position) = rally_point(world, memory, config);
    let rally_star_energy = world.star(&rally_star).map_or(0.0, |s| s.energy);
    let (grouped_supply, grouped_energy_ratio) =
        grouped_at(world, rally_position, config.economy.rally_group_radius);

    let signals = StrategySignals {
        ready_to_attack,
        can_beat_base,
        power_ratio,
        can_harvest_center,
        center_covers_vacancy: center.energy >= mine.capacity - mine.energy,
        grouped_supply,
        committed_supply: mine.supply - (defenders * memory.my_size) as f32,
        grouped_energy_ratio,
        rally_star_energy,
        enemy_outpost,
        can_retake: enemy_outpost
            && mine.supply >= config.economy.retake_supply as f32
            && mine.energy
                > (outpost_power * enemy_multiplier + world.outpost.energy)
                    * config.economy.retake_margin,
    };
    let transition = strategy::advance(memory, &signals, &config.economy);

    // Flags may have changed with the transition
    let (rally_star, rally_position) = rally_point(world, memory, config);
    let idle_position = if enemy_outpost && world.outpost.energy > config.movement.empowered_energy {
        memory.loci.base_to_star
    } else {
        next_position(memory.loci.base_to_center, home_star, energize_range)
    };

    let band_supply: f32 = invaders.far.iter().map(|&i| world.spirit(i).size as f32).sum();
    let enemy_all_in =
        theirs.supply > 0.0 && band_supply >= theirs.supply * config.roles.enemy_all_in_fraction;

    WorldContext {
        tick: world.tick,
        mine,
        theirs,
        my_shape: world.my_shape(),
        enemy_shape,
        enemy_multiplier,
        invaders,
        outpost_enemy_power: outpost_power,
        enemy_base_supply,
        power_ratio,
        can_beat_base,
        can_beat_all,
        ready_to_attack,
        can_harvest_center,
        enemy_outpost,
        enemy_all_in,
        counter_attack_risk: memory.strategy.is_attacking() && counter_attack_risk(world),
        threat_defenders: defenders,
        strategy: memory.strategy,
        transition,
        rally_star,
        rally_position,
        idle_position,
    }
}

/// Rally star and staging point for the current flags
fn rally_point(world: &World, memory: &Memory, config: &TacticsConfig) -> (StructureId, Vec2) {
    if memory.refuel_center {
        (memory.center_star.clone(), memory.loci.center_to_outpost)
    } else {
        let position = next_position(
            &world.base,
            memory.loci.outpost_antipode,
            config.ranges.energize_range,
        );
        (memory.home_star.clone(), position)
    }
}

/// Supply and mean energy ratio of attackers standing near `point`
fn grouped_at(world: &World, point: Vec2, radius: f32) -> (f32, f32) {
    let mut supply = 0.0;
    let mut ratio_sum = 0.0;
    let mut count = 0usize;
    for spirit in world.friendly_spirits() {
        if spirit.mark != crate::core::types::Role::Attack || !in_range(spirit, point, radius) {
            continue;
        }
        supply += spirit.size as f32;
        ratio_sum += energy_ratio(spirit);
        count += 1;
    }
    let mean = if count == 0 { 0.0 } else { ratio_sum / count as f32 };
    (supply, mean)
}

/// Mean enemy distance to our base is shorter than our attackers' to theirs
fn counter_attack_risk(world: &World) -> bool {
    let mean = |distances: Vec<f32>| -> Option<f32> {
        (!distances.is_empty()).then(|| distances.iter().sum::<f32>() / distances.len() as f32)
    };

    let theirs = mean(world.enemy_spirits().map(|s| dist(s, &world.base)).collect());
    let ours = mean(
        world
            .friendly_spirits()
            .filter(|s| s.mark == crate::core::types::Role::Attack)
            .map(|s| dist(s, &world.enemy_base))
            .collect(),
    );
    matches!((theirs, ours), (Some(t), Some(o)) if t < o)
}
