//! Energize target selection
//!
//! Each friendly unit picks at most one target through a fixed priority
//! cascade; the first rule that yields a target wins. The chosen transfer
//! is applied to the working snapshot before the next unit decides, so
//! later units see the energy earlier ones have already moved.

use std::cmp::Reverse;

use derive_more::Display;

use crate::assessment::{invader_supply, WorldContext};
use crate::core::config::TacticsConfig;
use crate::core::types::{Role, Strategy};
use crate::geometry::{energy_ratio, highest_energy, in_range, lowest_energy};
use crate::memory::Memory;
use crate::world::ledger::HOSTILE_FACTOR;
use crate::world::{EnergizeTarget, Spirit, World};

/// Which cascade rule produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EnergizeReason {
    #[display(fmt = "harvest")]
    Harvest,
    #[display(fmt = "attack")]
    Attack,
    #[display(fmt = "siege")]
    Siege,
    #[display(fmt = "defend base")]
    DefendBase,
    #[display(fmt = "outpost")]
    Outpost,
    #[display(fmt = "support")]
    Support,
    #[display(fmt = "feed")]
    Feed,
    #[display(fmt = "equalize")]
    Equalize,
    #[display(fmt = "deposit")]
    Deposit,
}

/// Pick and apply the energize target of one unit
pub fn pick_target(
    world: &mut World,
    ctx: &WorldContext,
    memory: &Memory,
    config: &TacticsConfig,
    unit: usize,
) -> Option<EnergizeTarget> {
    let choice = choose(world, ctx, memory, config, unit);
    world.mark_acted(unit);
    let (target, reason) = choice?;
    let spent = world.apply_energize(unit, &target, config.ranges.energize_range);
    tracing::trace!("{} energize {:?} ({}, {:.1})", world.spirit(unit).id, target, reason, spent);
    Some(target)
}

/// Energize for every friendly unit, largest first, ties in input order.
///
/// The result is indexed by spirit slot; enemies and idle beams are `None`.
pub fn energize_all(
    world: &mut World,
    ctx: &WorldContext,
    memory: &Memory,
    config: &TacticsConfig,
) -> Vec<Option<EnergizeTarget>> {
    let mut order = world.friendly.clone();
    order.sort_by_key(|&i| Reverse(world.spirit(i).size));

    let mut decisions = vec![None; world.spirits.len()];
    for unit in order {
        decisions[unit] = pick_target(world, ctx, memory, config, unit);
    }
    decisions
}

fn choose(
    world: &World,
    ctx: &WorldContext,
    memory: &Memory,
    config: &TacticsConfig,
    unit: usize,
) -> Option<(EnergizeTarget, EnergizeReason)> {
    let range = config.ranges.energize_range;
    let s = world.spirit(unit);
    let own = || EnergizeTarget::Spirit(s.id.clone());

    if s.energy <= 0.0 {
        return world
            .harvestable_star(unit, range)
            .map(|_| (own(), EnergizeReason::Harvest));
    }

    if let Some(enemy) = most_vulnerable(world, s) {
        return Some((EnergizeTarget::Spirit(enemy.id.clone()), EnergizeReason::Attack));
    }

    if in_range(s, &world.enemy_base, range) && confirms_kill(world, ctx, config) {
        return Some((EnergizeTarget::Base(world.enemy_base.id.clone()), EnergizeReason::Siege));
    }

    if in_range(s, &world.base, range)
        && world.base.energy - invader_supply(world, range) * HOSTILE_FACTOR <= 0.0
    {
        return Some((EnergizeTarget::Base(world.base.id.clone()), EnergizeReason::DefendBase));
    }

    if in_range(s, &world.outpost, range) && feeds_outpost(world, ctx, memory, config, s) {
        return Some((EnergizeTarget::Outpost(world.outpost.id.clone()), EnergizeReason::Outpost));
    }

    if let Some(choice) = support_ally(world, ctx, config, s) {
        return Some(choice);
    }

    if s.mark.is_worker() && in_range(s, &world.base, range) {
        return Some((EnergizeTarget::Base(world.base.id.clone()), EnergizeReason::Deposit));
    }

    if energy_ratio(s) < 1.0 && world.harvestable_star(unit, range).is_some() {
        return Some((own(), EnergizeReason::Harvest));
    }

    None
}

/// Kill the largest enemy this unit can finish off, else chip the weakest
fn most_vulnerable<'a>(world: &'a World, s: &Spirit) -> Option<&'a Spirit> {
    let targets: Vec<&Spirit> = world
        .resolve(&s.sight.enemies_beamable)
        .into_iter()
        .filter(|&i| !world.is_friendly(i))
        .map(|i| world.spirit(i))
        .filter(|t| !t.doomed && t.energy >= 0.0)
        .collect();

    let lethal = s.power() * HOSTILE_FACTOR;
    let killable = targets
        .iter()
        .copied()
        .filter(|t| t.energy.min(t.energy_capacity) < lethal);
    highest_energy(killable).or_else(|| lowest_energy(targets.iter().copied()))
}

/// The enemy base is still standing and the siege still to come this tick
/// takes it below zero.
///
/// Only units that have not decided yet and have no enemy spirit to shoot
/// count towards the siege. Shots already fired are in the base's energy,
/// so every unit in the pledge sees the same verdict.
fn confirms_kill(world: &World, ctx: &WorldContext, config: &TacticsConfig) -> bool {
    let remaining = world.enemy_base.energy + ctx.enemy_base_supply;
    if remaining < 0.0 {
        return false;
    }
    let range = config.ranges.energize_range;
    let pledged: f32 = world
        .friendly
        .iter()
        .filter(|&&i| !world.has_acted(i))
        .map(|&i| world.spirit(i))
        .filter(|f| f.energy > 0.0 && in_range(*f, &world.enemy_base, range))
        .filter(|f| most_vulnerable(world, f).is_none())
        .map(|f| f.power() * HOSTILE_FACTOR)
        .sum();
    pledged > remaining
}

fn feeds_outpost(
    world: &World,
    ctx: &WorldContext,
    memory: &Memory,
    config: &TacticsConfig,
    s: &Spirit,
) -> bool {
    let cfg = &config.energize;
    let outpost = &world.outpost;

    if ctx.strategy == Strategy::Retake {
        return s.mark == Role::Attack && world.enemy_outpost();
    }
    if energy_ratio(s) < cfg.outpost_min_ratio {
        return false;
    }

    if ctx.is_attacking() {
        let center = memory.center_star(world).energy;
        let star_has_energy = center > ctx.mine.capacity - ctx.mine.energy;
        let near_empower =
            outpost.energy > cfg.empower_window_low && outpost.energy < cfg.empower_window_high;
        let timely = center > outpost.energy || near_empower;
        star_has_energy && timely && ctx.strategy != Strategy::AllIn
    } else {
        let low = outpost.energy < cfg.outpost_low_floor.max(ctx.outpost_enemy_power);
        ctx.enemy_outpost || low
    }
}

/// Ally-support rules, most urgent first
fn support_ally(
    world: &World,
    ctx: &WorldContext,
    config: &TacticsConfig,
    s: &Spirit,
) -> Option<(EnergizeTarget, EnergizeReason)> {
    let allies: Vec<&Spirit> = world
        .resolve(&s.sight.friends_beamable)
        .into_iter()
        .filter(|&i| world.is_friendly(i))
        .map(|i| world.spirit(i))
        .filter(|t| energy_ratio(*t) < 1.0)
        .collect();
    if allies.is_empty() {
        return None;
    }

    if !config.shapes.profile(ctx.enemy_shape).overkills {
        let under_fire = matching(&allies, |t| {
            world
                .resolve(&t.sight.enemies_beamable)
                .into_iter()
                .any(|i| !world.is_friendly(i) && !world.spirit(i).doomed)
        });
        if let Some(choice) = weakest(under_fire, EnergizeReason::Support) {
            return Some(choice);
        }
    }

    let priority = s.mark.support_priority();
    let outranking = matching(&allies, |t| t.mark.support_priority() > priority);
    if let Some(choice) = weakest(outranking, EnergizeReason::Feed) {
        return Some(choice);
    }

    if s.mark == Role::Haul {
        let relays = matching(&allies, |t| t.mark == Role::Relay);
        if let Some(choice) = weakest(relays, EnergizeReason::Feed) {
            return Some(choice);
        }
    }

    if s.mark.is_worker() {
        return None;
    }
    let power = s.power();
    let own_after = (s.energy - power) / s.energy_capacity.max(1.0);
    let trailing = matching(&allies, |t| {
        t.mark.support_priority() >= priority
            && (t.energy + power) / t.energy_capacity.max(1.0) <= own_after
    });
    weakest(trailing, EnergizeReason::Equalize)
}

fn matching<'a>(allies: &[&'a Spirit], keep: impl Fn(&Spirit) -> bool) -> Vec<&'a Spirit> {
    allies.iter().copied().filter(|t| keep(*t)).collect()
}

fn weakest(pool: Vec<&Spirit>, reason: EnergizeReason) -> Option<(EnergizeTarget, EnergizeReason)> {
    lowest_energy(pool).map(|t| (EnergizeTarget::Spirit(t.id.clone()), reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::assess;
    use crate::scenario::{SnapshotBuilder, THEM};
    use glam::Vec2;

    struct Fixture {
        world: World,
        memory: Memory,
        config: TacticsConfig,
        ctx: WorldContext,
    }

    fn fixture(builder: SnapshotBuilder) -> Fixture {
        let world = World::from_snapshot(builder.build()).unwrap();
        let config = TacticsConfig::default();
        let mut memory = Memory::initialize(&world, &config);
        let ctx = assess(&world, &mut memory, &config);
        Fixture { world, memory, config, ctx }
    }

    impl Fixture {
        fn pick(&mut self, unit: usize) -> Option<EnergizeTarget> {
            pick_target(&mut self.world, &self.ctx, &self.memory, &self.config, unit)
        }

        fn id(&self, unit: usize) -> EnergizeTarget {
            EnergizeTarget::Spirit(self.world.spirit(unit).id.clone())
        }
    }

    // Open ground between the bases, away from every structure
    fn field() -> Vec2 {
        Vec2::new(2500.0, 800.0)
    }

    #[test]
    fn test_kill_confirm_against_larger_enemy() {
        let mut fx = fixture(
            SnapshotBuilder::standard()
                .friendly_sized(field(), 3.0, 30.0, 3)
                .enemy(field() + Vec2::new(100.0, 0.0), 5.0, 1),
        );
        let target = fx.pick(0);
        assert_eq!(target, Some(fx.id(1)));
        assert_eq!(fx.world.spirit(1).energy, 0.0);
        assert!(fx.world.spirit(1).doomed);
    }

    #[test]
    fn test_prefers_biggest_killable_then_weakest() {
        let mut fx = fixture(
            SnapshotBuilder::standard()
                .friendly_sized(field(), 3.0, 30.0, 3)
                .enemy(field() + Vec2::new(100.0, 0.0), 2.0, 1)
                .enemy(field() + Vec2::new(0.0, 100.0), 5.0, 1)
                .enemy(field() + Vec2::new(-100.0, 0.0), 9.0, 1),
        );
        assert_eq!(fx.pick(0), Some(fx.id(2)));

        let mut fx = fixture(
            SnapshotBuilder::standard()
                .friendly(field(), 10.0, 1)
                .enemy(field() + Vec2::new(100.0, 0.0), 8.0, 1)
                .enemy(field() + Vec2::new(0.0, 100.0), 6.0, 1),
        );
        assert_eq!(fx.pick(0), Some(fx.id(2)));
    }

    #[test]
    fn test_doomed_enemy_is_skipped() {
        let mut fx = fixture(
            SnapshotBuilder::standard()
                .friendly_sized(field(), 3.0, 30.0, 3)
                .friendly_sized(field() + Vec2::new(10.0, 0.0), 3.0, 30.0, 3)
                .enemy(field() + Vec2::new(100.0, 0.0), 5.0, 1)
                .enemy(field() + Vec2::new(0.0, 100.0), 4.0, 1),
        );
        assert_eq!(fx.pick(0), Some(fx.id(2)));
        assert_eq!(fx.pick(1), Some(fx.id(3)));
    }

    #[test]
    fn test_empty_unit_harvests_in_star_range() {
        let star = Vec2::new(1000.0, 1000.0);
        let mut fx = fixture(
            SnapshotBuilder::standard()
                .friendly(star + Vec2::new(100.0, 0.0), 0.0, 1)
                .friendly(field(), 0.0, 1),
        );
        assert_eq!(fx.pick(0), Some(fx.id(0)));
        assert_eq!(fx.world.spirit(0).energy, 1.0);
        assert_eq!(fx.pick(1), None);
    }

    #[test]
    fn test_base_under_siege_is_topped_up() {
        let base = Vec2::new(1600.0, 700.0);
        let mut fx = fixture(
            SnapshotBuilder::standard()
                .base_energy(10.0)
                .friendly_role(base + Vec2::new(-150.0, 0.0), 10.0, 1, Role::Defend)
                .enemy(base + Vec2::new(0.0, -150.0), 10.0, 5),
        );
        // Enemy is out of the defender's beam, sitting on our base
        assert_eq!(fx.pick(0), Some(EnergizeTarget::Base(fx.world.base.id.clone())));
        assert_eq!(fx.world.base.energy, 11.0);
    }

    #[test]
    fn test_enemy_base_needs_kill_confirm() {
        let enemy_base = Vec2::new(2600.0, 1700.0);
        let near = enemy_base + Vec2::new(-150.0, 0.0);

        // One unit cannot finish a 100-energy base
        let mut fx = fixture(
            SnapshotBuilder::standard()
                .enemy_base_energy(100.0)
                .friendly_role(near, 10.0, 1, Role::Attack),
        );
        let target = fx.pick(0);
        assert_ne!(target, Some(EnergizeTarget::Base(fx.world.enemy_base.id.clone())));

        // Three units together can finish a 5-energy base
        let mut fx = fixture(
            SnapshotBuilder::standard()
                .enemy_base_energy(5.0)
                .friendly_role(near, 10.0, 1, Role::Attack)
                .friendly_role(near + Vec2::new(0.0, 10.0), 10.0, 1, Role::Attack)
                .friendly_role(near + Vec2::new(0.0, 20.0), 10.0, 1, Role::Attack),
        );
        let base_target = EnergizeTarget::Base(fx.world.enemy_base.id.clone());
        assert_eq!(fx.pick(0), Some(base_target.clone()));
        assert_eq!(fx.pick(1), Some(base_target.clone()));
        assert_eq!(fx.pick(2), Some(base_target));
        assert_eq!(fx.world.enemy_base.energy, -1.0);
    }

    #[test]
    fn test_partial_siege_is_held_back() {
        let enemy_base = Vec2::new(2600.0, 1700.0);
        let near = enemy_base + Vec2::new(-150.0, 0.0);
        let mut fx = fixture(
            SnapshotBuilder::standard()
                .enemy_base_energy(5.0)
                .friendly_role(near, 10.0, 1, Role::Attack)
                .friendly_role(near + Vec2::new(0.0, 10.0), 10.0, 1, Role::Attack)
                .friendly_role(near + Vec2::new(0.0, 20.0), 10.0, 1, Role::Attack)
                // In beam of the second and third unit only
                .enemy(near + Vec2::new(0.0, 205.0), 10.0, 1),
        );
        let decisions = energize_all(&mut fx.world, &fx.ctx, &fx.memory, &fx.config);
        let base_target = EnergizeTarget::Base(fx.world.enemy_base.id.clone());
        assert!(!decisions.contains(&Some(base_target)));
        assert_eq!(decisions[1], Some(fx.id(3)));
        assert_eq!(decisions[2], Some(fx.id(3)));
        assert_eq!(fx.world.enemy_base.energy, 5.0);
    }

    #[test]
    fn test_all_in_does_not_fire_blind() {
        let enemy_base = Vec2::new(2600.0, 1700.0);
        let mut fx = fixture(
            SnapshotBuilder::standard()
                .enemy_base_energy(400.0)
                .friendly_role(enemy_base + Vec2::new(-150.0, 0.0), 10.0, 1, Role::Attack),
        );
        fx.ctx.strategy = Strategy::AllIn;
        let target = fx.pick(0);
        assert_ne!(target, Some(EnergizeTarget::Base(fx.world.enemy_base.id.clone())));
        assert_eq!(fx.world.enemy_base.energy, 400.0);
    }

    #[test]
    fn test_base_defence_ignores_invaders_already_killed() {
        let base = Vec2::new(1600.0, 700.0);
        let mut fx = fixture(
            SnapshotBuilder::standard()
                .base_energy(10.0)
                .friendly_role(base + Vec2::new(-150.0, 0.0), 10.0, 1, Role::Defend)
                .friendly_sized(base + Vec2::new(0.0, -300.0), 100.0, 100.0, 10)
                .enemy(base + Vec2::new(0.0, -150.0), 10.0, 5),
        );
        assert_eq!(fx.pick(1), Some(fx.id(2)));
        assert!(fx.world.spirit(2).doomed);
        assert_eq!(fx.pick(0), None);
        assert_eq!(fx.world.base.energy, 10.0);
    }

    #[test]
    fn test_hostile_outpost_is_drained_when_not_attacking() {
        let outpost = Vec2::new(2200.0, 1100.0);
        let mut fx = fixture(
            SnapshotBuilder::standard()
                .outpost(Some(THEM), 100.0)
                .friendly_role(outpost + Vec2::new(0.0, -150.0), 10.0, 1, Role::Scout),
        );
        assert_eq!(fx.pick(0), Some(EnergizeTarget::Outpost(fx.world.outpost.id.clone())));
        assert_eq!(fx.world.outpost.energy, 98.0);
    }

    #[test]
    fn test_retake_attackers_drain_enemy_outpost() {
        let outpost = Vec2::new(2200.0, 1100.0);
        let mut fx = fixture(
            SnapshotBuilder::standard()
                .outpost(Some(THEM), 100.0)
                .friendly_role(outpost + Vec2::new(0.0, -150.0), 10.0, 1, Role::Attack)
                .friendly_role(outpost + Vec2::new(0.0, 150.0), 10.0, 1, Role::Relay),
        );
        fx.ctx.strategy = Strategy::Retake;
        assert_eq!(fx.pick(0), Some(EnergizeTarget::Outpost(fx.world.outpost.id.clone())));
        assert_eq!(fx.world.outpost.energy, 98.0);
        // Only attackers join the retake
        assert_ne!(fx.pick(1), Some(EnergizeTarget::Outpost(fx.world.outpost.id.clone())));
        assert_eq!(fx.world.outpost.energy, 98.0);
    }

    #[test]
    fn test_worker_feeds_combat_ally_first() {
        let spot = Vec2::new(1400.0, 900.0);
        let mut fx = fixture(
            SnapshotBuilder::standard()
                .friendly_role(spot, 10.0, 1, Role::Haul)
                .friendly_role(spot + Vec2::new(50.0, 0.0), 4.0, 1, Role::Relay)
                .friendly_role(spot + Vec2::new(0.0, 50.0), 6.0, 1, Role::Defend),
        );
        assert_eq!(fx.pick(0), Some(fx.id(2)));
        assert_eq!(fx.world.spirit(2).energy, 7.0);
    }

    #[test]
    fn test_haul_feeds_relay() {
        let spot = Vec2::new(1400.0, 900.0);
        let mut fx = fixture(
            SnapshotBuilder::standard()
                .friendly_role(spot, 10.0, 1, Role::Haul)
                .friendly_role(spot + Vec2::new(50.0, 0.0), 4.0, 1, Role::Relay)
                .friendly_role(spot + Vec2::new(0.0, 50.0), 2.0, 1, Role::Haul),
        );
        assert_eq!(fx.pick(0), Some(fx.id(1)));
    }

    #[test]
    fn test_workers_deposit_at_base() {
        let base = Vec2::new(1600.0, 700.0);
        let mut fx = fixture(
            SnapshotBuilder::standard().friendly_role(base + Vec2::new(100.0, 0.0), 10.0, 1, Role::Relay),
        );
        assert_eq!(fx.pick(0), Some(EnergizeTarget::Base(fx.world.base.id.clone())));
        assert_eq!(fx.world.base.energy, 401.0);
    }

    #[test]
    fn test_equalize_only_when_ally_still_trails() {
        let spot = field();
        let mut fx = fixture(
            SnapshotBuilder::standard()
                .friendly_role(spot, 10.0, 1, Role::Scout)
                .friendly_role(spot + Vec2::new(50.0, 0.0), 5.0, 1, Role::Scout),
        );
        assert_eq!(fx.pick(0), Some(fx.id(1)));

        let mut fx = fixture(
            SnapshotBuilder::standard()
                .friendly_role(spot, 6.0, 1, Role::Scout)
                .friendly_role(spot + Vec2::new(50.0, 0.0), 5.0, 1, Role::Scout),
        );
        assert_eq!(fx.pick(0), None);
    }

    #[test]
    fn test_energize_all_runs_largest_first() {
        let mut fx = fixture(
            SnapshotBuilder::standard()
                .friendly(field(), 1.0, 1)
                .friendly_sized(field() + Vec2::new(10.0, 0.0), 3.0, 30.0, 3)
                .enemy(field() + Vec2::new(100.0, 0.0), 5.0, 1),
        );
        let decisions = energize_all(&mut fx.world, &fx.ctx, &fx.memory, &fx.config);
        // The big unit kills the enemy first; the small one has nothing left to shoot
        assert_eq!(decisions[1], Some(EnergizeTarget::Spirit("them_1".into())));
        assert_ne!(decisions[0], Some(EnergizeTarget::Spirit("them_1".into())));
        assert_eq!(decisions[2], None);
    }
}
