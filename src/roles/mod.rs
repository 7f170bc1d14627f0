//! Role assignment
//!
//! Every living friendly unit carries exactly one [`Role`] in its mark.
//! [`update`] rebalances marks once per tick against the targets in
//! [`RoleTargets`], in four ordered passes:
//!
//! 1. forced energy transitions (low units refuel, refuelled units idle)
//! 2. evictions from over-staffed roles back to idle
//! 3. promotions from idle (and, for defence, from workers and attackers)
//! 4. haul/relay balance
//!
//! Every loop draws from a finite candidate pool and stops when the pool
//! runs dry, even if its target is still unmet.

mod rebalance;
pub mod targets;

use serde::Serialize;

use crate::assessment::WorldContext;
use crate::core::config::TacticsConfig;
use crate::core::types::Role;
use crate::geometry::{farthest, nearest, Vec2};
use crate::memory::Memory;
use crate::world::World;

pub use targets::RoleTargets;

/// Living friendly units grouped by role, in input order within a role
#[derive(Debug, Clone, Default)]
pub struct RoleRegister {
    members: [Vec<usize>; Role::ALL.len()],
    pub targets: RoleTargets,
}

impl RoleRegister {
    /// Group units by the mark they carried into this tick
    pub fn from_world(world: &World) -> Self {
        let mut register = Self::default();
        for &i in &world.friendly {
            register.members[world.spirit(i).mark.index()].push(i);
        }
        register
    }

    pub fn members(&self, role: Role) -> &[usize] {
        &self.members[role.index()]
    }

    pub fn count(&self, role: Role) -> usize {
        self.members[role.index()].len()
    }

    pub fn workers(&self) -> usize {
        self.count(Role::Haul) + self.count(Role::Relay)
    }

    pub fn total(&self) -> usize {
        self.members.iter().map(Vec::len).sum()
    }

    /// Counts per role, in `Role::ALL` order
    pub fn counts(&self) -> RoleCounts {
        let mut counts = RoleCounts::default();
        for role in Role::ALL {
            counts.0[role.index()] = self.count(role);
        }
        counts
    }

    /// Move `unit` into `role`, updating its mark in the working snapshot
    pub fn set_role(&mut self, world: &mut World, unit: usize, role: Role, reason: &str) {
        let spirit = world.spirit_mut(unit);
        let from = spirit.mark;
        if from == role {
            return;
        }
        let bucket = &mut self.members[from.index()];
        if let Some(slot) = bucket.iter().position(|&i| i == unit) {
            bucket.remove(slot);
        }
        let bucket = &mut self.members[role.index()];
        let slot = bucket.partition_point(|&i| i < unit);
        bucket.insert(slot, unit);
        spirit.mark = role;
        tracing::debug!("{} {} -> {} ({})", spirit.id, from, role, reason);
    }

    /// Member of `role` nearest `from` that passes `filter`
    fn nearest_member(
        &self,
        world: &World,
        role: Role,
        from: Vec2,
        filter: impl Fn(&crate::world::Spirit) -> bool,
    ) -> Option<usize> {
        let pool = self
            .members(role)
            .iter()
            .map(|&i| (i, world.spirit(i)))
            .filter(|(_, s)| filter(s));
        nearest(from, pool).map(|(i, _)| i)
    }

    /// Member of `role` farthest from `from`
    fn farthest_member(&self, world: &World, role: Role, from: Vec2) -> Option<usize> {
        let pool = self.members(role).iter().map(|&i| (i, world.spirit(i)));
        farthest(from, pool).map(|(i, _)| i)
    }
}

/// Units per role, in `Role::ALL` order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleCounts(pub [usize; Role::ALL.len()]);

impl std::fmt::Display for RoleCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (n, role) in Role::ALL.iter().enumerate() {
            if n > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}={}", role, self.0[n])?;
        }
        Ok(())
    }
}

/// Rebalance roles for this tick; marks in `world` are updated in place
pub fn update(
    world: &mut World,
    ctx: &WorldContext,
    memory: &Memory,
    config: &TacticsConfig,
) -> RoleRegister {
    let mut register = RoleRegister::from_world(world);
    register.targets = RoleTargets::compute(world, ctx, memory, config);

    rebalance::force_energy_transitions(&mut register, world, config);
    rebalance::remove_extras(&mut register, world, ctx, config);
    rebalance::assign_roles(&mut register, world, ctx, memory, config);
    if !ctx.is_attacking() {
        rebalance::optimize_workers(&mut register, world, memory, config);
    }
    register
}
