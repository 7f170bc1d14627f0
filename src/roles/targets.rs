//! Desired role counts, recomputed every tick

use serde::Serialize;

use crate::assessment::WorldContext;
use crate::core::config::TacticsConfig;
use crate::memory::Memory;
use crate::world::World;

/// How many units each managed role should hold this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleTargets {
    pub defenders: u32,
    pub scouts: u32,
    /// Haulers and relays combined
    pub workers: u32,
}

impl RoleTargets {
    pub fn compute(world: &World, ctx: &WorldContext, memory: &Memory, config: &TacticsConfig) -> Self {
        Self {
            defenders: ideal_defenders(ctx, config),
            scouts: ideal_scouts(ctx, memory, config),
            workers: max_workers(world, ctx, memory, config),
        }
    }
}

/// Threat-derived defenders, plus a reserve while our army is away and
/// theirs is closer to home
pub fn ideal_defenders(ctx: &WorldContext, config: &TacticsConfig) -> u32 {
    let reserve = if ctx.counter_attack_risk {
        config.roles.counter_attack_defenders
    } else {
        0
    };
    ctx.threat_defenders + reserve
}

pub fn ideal_scouts(ctx: &WorldContext, memory: &Memory, config: &TacticsConfig) -> u32 {
    let roles = &config.roles;
    let floor = (roles.scout_floor / memory.my_size.max(1) as f32).ceil() as u32;
    let per_units = ctx.mine.count.div_ceil(roles.units_per_scout.max(1) as usize) as u32;
    let contest = if ctx.outpost_enemy_power > 0.0 {
        roles.contest_scout_bonus
    } else {
        0
    };
    floor + per_units + contest
}

/// Workers the home star can feed, given its regeneration and the
/// haul:relay ratio
pub fn max_workers(world: &World, ctx: &WorldContext, memory: &Memory, config: &TacticsConfig) -> u32 {
    let economy = &config.economy;
    let star = memory.home_star(world);

    let mut regen = star.energy_per_tick();
    if star.energy < economy.star_low_energy {
        regen -= 1.0;
    } else if star.energy > economy.star_high_energy {
        regen += 1.0;
    }
    let mut workers = (regen.max(0.0) * (economy.haul_relay_ratio + 1.0)).floor() as u32;

    let attack_supply = economy.attack_supply as f32;
    let window = config.roles.near_supply_window as f32;
    if ctx.mine.supply < attack_supply && ctx.mine.supply >= attack_supply - window {
        workers += config.roles.over_harvest_bonus;
    }
    if ctx.enemy_all_in {
        workers = workers.min(config.roles.siege_worker_cap);
    }
    workers
}
