//! Phase B: where each role wants to stand

use glam::Vec2;

use crate::assessment::WorldContext;
use crate::core::config::TacticsConfig;
use crate::core::types::{Role, Strategy};
use crate::geometry::{energy_ratio, in_range, midpoint, nearest, next_position};
use crate::memory::Memory;
use crate::roles::RoleRegister;
use crate::world::{Spirit, World};

/// A role destination and whether it must respect the denial zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub target: Vec2,
    pub guarded: bool,
}

impl Waypoint {
    fn guarded(target: Vec2) -> Self {
        Self { target, guarded: true }
    }

    fn direct(target: Vec2) -> Self {
        Self { target, guarded: false }
    }
}

/// Scouts considered as one squad
#[derive(Debug, Clone, Copy)]
pub struct ScoutSquad {
    pub power: f32,
    pub rally: Vec2,
}

impl ScoutSquad {
    pub fn gather(world: &World, register: &RoleRegister) -> Self {
        let scouts = register.members(Role::Scout).iter().map(|&i| world.spirit(i));
        Self {
            power: scouts.clone().map(|s| s.energy.max(0.0)).sum(),
            rally: midpoint(scouts).unwrap_or(world.outpost.position),
        }
    }
}

/// Destination for the unit's role, before denial-zone steering
pub fn role_waypoint(
    world: &World,
    ctx: &WorldContext,
    memory: &Memory,
    config: &TacticsConfig,
    squad: &ScoutSquad,
    s: &Spirit,
    group_power: f32,
) -> Waypoint {
    let range = config.ranges.energize_range;
    let loci = &memory.loci;
    let ratio = energy_ratio(s);

    match s.mark {
        Role::Attack => match ctx.strategy {
            Strategy::AllIn => Waypoint::guarded(next_position(&world.enemy_base, s, range)),
            Strategy::Retake => Waypoint::direct(next_position(&world.outpost, s, range)),
            _ => {
                let rally_star = world.star(&ctx.rally_star);
                match rally_star {
                    Some(star) if ratio < 1.0 && star.energy > 0.0 => {
                        Waypoint::guarded(next_position(star, ctx.rally_position, range))
                    }
                    _ => Waypoint::guarded(ctx.rally_position),
                }
            }
        },
        Role::Defend => {
            let close = ctx.invaders.med.iter().map(|&i| world.spirit(i));
            match nearest(s, close) {
                Some(invader) => Waypoint::guarded(next_position(&world.base, invader, range)),
                None => Waypoint::guarded(ctx.idle_position),
            }
        }
        Role::Scout => scout_waypoint(world, ctx, memory, config, squad, s, group_power),
        Role::Relay => Waypoint::direct(loci.base_to_star),
        Role::Haul => {
            let relays_waiting = world
                .resolve(&s.sight.friends_beamable)
                .into_iter()
                .map(|i| world.spirit(i))
                .any(|t| t.mark == Role::Relay && energy_ratio(t) < 1.0);
            if ratio >= 1.0 || (ratio > 0.0 && relays_waiting) {
                Waypoint::direct(next_position(loci.base_to_star, memory.home_star(world), range))
            } else {
                Waypoint::direct(loci.star_to_base)
            }
        }
        Role::Refuel => {
            let home = memory.home_star(world);
            let center = memory.center_star(world);
            let enemy = memory.enemy_star(world);
            let mut stars = vec![home];
            if ctx.can_harvest_center {
                stars.push(center);
            }
            if in_range(s, enemy, config.movement.enemy_star_refuel_radius) {
                stars.push(enemy);
            }
            let star = nearest(s, stars).unwrap_or(home);
            Waypoint::guarded(next_position(star, s, range))
        }
        Role::Idle => {
            if ctx.can_harvest_center {
                if ratio >= 1.0 || (ratio > 0.0 && in_range(s, &world.base, range)) {
                    Waypoint::guarded(loci.base_to_center)
                } else {
                    Waypoint::guarded(loci.center_to_base)
                }
            } else {
                Waypoint::guarded(ctx.idle_position)
            }
        }
    }
}

/// Contest the outpost when it is lost, otherwise harass the enemy base
fn scout_waypoint(
    world: &World,
    ctx: &WorldContext,
    memory: &Memory,
    config: &TacticsConfig,
    squad: &ScoutSquad,
    s: &Spirit,
    group_power: f32,
) -> Waypoint {
    let range = config.ranges.energize_range;
    let movement = &config.movement;
    let outpost = &world.outpost;
    // One unit clear of the denial ring
    let ring = movement.denial_radius + 2.0;

    if ctx.enemy_outpost {
        let can_retake = squad.power > ctx.outpost_enemy_power + outpost.energy;
        if !can_retake {
            let enemy_star = memory.enemy_star(world);
            return Waypoint::guarded(next_position(
                &world.enemy_base,
                enemy_star,
                -(movement.scout_standoff - 2.0),
            ));
        }
        if group_power * movement.scout_group_share >= squad.power {
            return Waypoint::direct(next_position(outpost, s, range));
        }
        return Waypoint::guarded(next_position(outpost, squad.rally, ring));
    }

    let outpost_low = outpost.energy < config.energize.outpost_low_floor.max(ctx.outpost_enemy_power);
    if outpost_low {
        Waypoint::direct(next_position(outpost, s, range))
    } else if ctx.outpost_enemy_power > squad.power + outpost.energy {
        Waypoint::direct(next_position(outpost, s, ring))
    } else if ctx.outpost_enemy_power > squad.power {
        Waypoint::direct(memory.loci.center_to_outpost)
    } else {
        Waypoint::direct(next_position(&world.enemy_base, outpost, movement.scout_standoff))
    }
}
