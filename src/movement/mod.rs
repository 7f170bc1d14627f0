//! Movement and positioning
//!
//! Each unit's move is decided in three phases:
//!
//! - **A** [`threat`]: explosion avoidance, flee when locally outmatched,
//!   chase weak enemies when not. A response here skips phase B.
//! - **B** [`positioning`]: the role's waypoint.
//! - **C** [`safe`]: steer around a hostile outpost's denial zone.
//!
//! Moves are decided after every energize, on the post-energize snapshot.

pub mod positioning;
pub mod safe;
pub mod threat;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::assessment::WorldContext;
use crate::core::config::TacticsConfig;
use crate::memory::Memory;
use crate::roles::RoleRegister;
use crate::world::World;

pub use positioning::{role_waypoint, ScoutSquad, Waypoint};
pub use safe::{deflect, safe_move, DenialZone};
pub use threat::{local_balance, respond, LocalBalance, ThreatResponse};

/// Where a unit moves this tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveDecision {
    pub destination: Option<Vec2>,
    /// Debug broadcast describing the decision
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shout: Option<String>,
}

/// Decide the move of one friendly unit
pub fn find_move(
    world: &World,
    ctx: &WorldContext,
    memory: &Memory,
    register: &RoleRegister,
    config: &TacticsConfig,
    unit: usize,
) -> MoveDecision {
    let squad = ScoutSquad::gather(world, register);
    decide(world, ctx, memory, config, &squad, unit)
}

/// Moves for every friendly unit in input order, indexed by spirit slot
pub fn move_all(
    world: &World,
    ctx: &WorldContext,
    memory: &Memory,
    register: &RoleRegister,
    config: &TacticsConfig,
) -> Vec<Option<MoveDecision>> {
    let squad = ScoutSquad::gather(world, register);
    let mut moves = vec![None; world.spirits.len()];
    for &unit in &world.friendly {
        moves[unit] = Some(decide(world, ctx, memory, config, &squad, unit));
    }
    moves
}

fn decide(
    world: &World,
    ctx: &WorldContext,
    memory: &Memory,
    config: &TacticsConfig,
    squad: &ScoutSquad,
    unit: usize,
) -> MoveDecision {
    let s = world.spirit(unit);
    let shout = |label: String| config.debug.then_some(label);

    if let Some(response) = threat::respond(world, ctx, config, s, memory.force_group) {
        tracing::trace!("{} {} to {}", s.id, response.label(), response.destination());
        return MoveDecision {
            destination: Some(response.destination()),
            shout: shout(response.label().to_string()),
        };
    }

    let balance = threat::local_balance(world, ctx, config, s);
    let waypoint = role_waypoint(world, ctx, memory, config, squad, s, balance.group_power);
    let destination = if waypoint.guarded {
        safe_move(world, &config.movement, unit, waypoint.target)
    } else {
        waypoint.target
    };
    tracing::trace!("{} {} to {}", s.id, s.mark, destination);

    MoveDecision {
        destination: Some(destination),
        shout: shout(s.mark.to_string()),
    }
}
