use crate::assessment::WorldContext;
use crate::core::config::TacticsConfig;
use crate::core::types::Role;
use glam::Vec2;

use crate::geometry::{energy_ratio, nearest};
use crate::memory::Memory;
use crate::world::World;

use super::RoleRegister;

/// Low-energy units go refuel; refuelled units are released to idle
pub(super) fn force_energy_transitions(
    register: &mut RoleRegister,
    world: &mut World,
    config: &TacticsConfig,
) {
    let roles = &config.roles;
    for i in world.friendly.clone() {
        let mark = world.spirit(i).mark;
        let ratio = energy_ratio(world.spirit(i));
        if mark.is_refuelable() && ratio <= roles.low_energy_ratio {
            register.set_role(world, i, Role::Refuel, "low energy");
        } else if mark == Role::Refuel && ratio >= roles.refuel_release_ratio {
            register.set_role(world, i, Role::Idle, "refuelled");
        }
    }
}

/// Where defenders are measured from: the med-band invader closest to our
/// base, or the base itself on a quiet map
fn defence_anchor(world: &World, ctx: &WorldContext) -> Vec2 {
    let base = world.base.position;
    let invaders = ctx.invaders.med.iter().map(|&i| world.spirit(i));
    nearest(base, invaders).map_or(base, |s| s.position)
}

/// Return units in over-staffed roles to idle
pub(super) fn remove_extras(
    register: &mut RoleRegister,
    world: &mut World,
    ctx: &WorldContext,
    config: &TacticsConfig,
) {
    let base = world.base.position;
    let anchor = defence_anchor(world, ctx);
    let targets = register.targets;

    if !ctx.is_attacking() {
        for i in register.members(Role::Attack).to_vec() {
            register.set_role(world, i, Role::Idle, "attack called off");
        }
    }

    while register.count(Role::Defend) > targets.defenders as usize {
        let Some(i) = register.farthest_member(world, Role::Defend, anchor) else {
            break;
        };
        register.set_role(world, i, Role::Idle, "threat eased");
    }

    while register.count(Role::Scout) > targets.scouts as usize {
        let Some(i) = register.nearest_member(world, Role::Scout, base, |_| true) else {
            break;
        };
        register.set_role(world, i, Role::Idle, "too many scouts");
    }

    let ratio = config.economy.haul_relay_ratio;
    while register.workers() > targets.workers as usize {
        let haul = register.count(Role::Haul) as f32;
        let relay = register.count(Role::Relay) as f32;
        let role = if haul > (relay - 1.0) * ratio {
            Role::Haul
        } else {
            Role::Relay
        };
        let Some(i) = register
            .nearest_member(world, role, base, |_| true)
            .or_else(|| register.nearest_member(world, other_worker(role), base, |_| true))
        else {
            break;
        };
        register.set_role(world, i, Role::Idle, "star overworked");
    }
}

/// Fill defenders, then scouts and workers from the idle pool
pub(super) fn assign_roles(
    register: &mut RoleRegister,
    world: &mut World,
    ctx: &WorldContext,
    memory: &Memory,
    config: &TacticsConfig,
) {
    let roles = &config.roles;
    let base = world.base.position;
    let anchor = defence_anchor(world, ctx);
    let targets = register.targets;

    if ctx.is_attacking() {
        for role in [Role::Idle, Role::Haul, Role::Relay, Role::Scout] {
            for i in register.members(role).to_vec() {
                register.set_role(world, i, Role::Attack, "joining assault");
            }
        }
    }

    while register.count(Role::Defend) < targets.defenders as usize {
        let candidate = register
            .nearest_member(world, Role::Idle, anchor, |s| {
                energy_ratio(s) >= roles.defender_min_ratio
            })
            .or_else(|| {
                [Role::Haul, Role::Relay]
                    .into_iter()
                    .filter_map(|role| {
                        register.nearest_member(world, role, anchor, |s| {
                            energy_ratio(s) > roles.defender_min_ratio
                        })
                    })
                    .min_by(|&a, &b| {
                        let da = world.spirit(a).position.distance(anchor);
                        let db = world.spirit(b).position.distance(anchor);
                        da.total_cmp(&db)
                    })
            })
            .or_else(|| {
                register.nearest_member(world, Role::Attack, anchor, |s| {
                    energy_ratio(s) >= 1.0
                        && s.size == memory.my_size
                        && s.position.distance(base) < roles.attacker_recall_radius
                })
            });
        let Some(i) = candidate else {
            break;
        };
        register.set_role(world, i, Role::Defend, "threat at home");
    }

    if ctx.is_attacking() {
        return;
    }

    let center = memory.center_star(world).position;
    while register.count(Role::Scout) < targets.scouts as usize {
        let Some(i) = register.nearest_member(world, Role::Idle, center, |_| true) else {
            break;
        };
        register.set_role(world, i, Role::Scout, "scouting");
    }

    let home_star = memory.home_star(world).position;
    let ratio = config.economy.haul_relay_ratio;
    while register.workers() < targets.workers as usize {
        let haul = register.count(Role::Haul) as f32;
        let relay = register.count(Role::Relay) as f32;
        let (role, anchor) = if haul + 1.0 <= relay * ratio {
            (Role::Haul, home_star)
        } else {
            (Role::Relay, base)
        };
        let Some(i) = register.nearest_member(world, Role::Idle, anchor, |_| true) else {
            break;
        };
        register.set_role(world, i, role, "star has capacity");
    }
}

/// Keep haulers and relays near the configured ratio
pub(super) fn optimize_workers(
    register: &mut RoleRegister,
    world: &mut World,
    memory: &Memory,
    config: &TacticsConfig,
) {
    let ratio = config.economy.haul_relay_ratio;
    let home_star = memory.home_star(world).position;
    let base_to_star = memory.loci.base_to_star;

    loop {
        let haul = register.count(Role::Haul) as f32;
        let relay = register.count(Role::Relay) as f32;
        if haul + 1.0 > (relay - 1.0) * ratio {
            break;
        }
        let Some(i) = register.nearest_member(world, Role::Relay, home_star, |_| true) else {
            break;
        };
        register.set_role(world, i, Role::Haul, "too few haulers");
    }

    loop {
        let haul = register.count(Role::Haul) as f32;
        let relay = register.count(Role::Relay) as f32;
        if haul - 1.0 <= (relay + 1.0) * ratio {
            break;
        }
        let Some(i) = register.nearest_member(world, Role::Haul, base_to_star, |_| true) else {
            break;
        };
        register.set_role(world, i, Role::Relay, "too few relays");
    }
}

fn other_worker(role: Role) -> Role {
    match role {
        Role::Haul => Role::Relay,
        _ => Role::Haul,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::assess;
    use crate::core::types::{Shape, Strategy};
    use crate::scenario::SnapshotBuilder;
    use glam::Vec2;

    struct Fixture {
        world: World,
        memory: Memory,
        config: TacticsConfig,
    }

    impl Fixture {
        fn new(builder: SnapshotBuilder) -> Self {
            let world = World::from_snapshot(builder.build()).unwrap();
            let config = TacticsConfig::default();
            let memory = Memory::initialize(&world, &config);
            Self { world, memory, config }
        }

        fn update(&mut self) -> RoleRegister {
            let ctx = assess(&self.world, &mut self.memory, &self.config);
            super::super::update(&mut self.world, &ctx, &self.memory, &self.config)
        }
    }

    fn home() -> Vec2 {
        Vec2::new(1100.0, 1000.0)
    }

    #[test]
    fn test_low_energy_forces_refuel() {
        let mut fx = Fixture::new(
            SnapshotBuilder::standard()
                .friendly_role(home(), 2.0, 1, Role::Scout)
                .friendly_role(home(), 2.0, 1, Role::Haul)
                .friendly_role(home(), 9.0, 1, Role::Refuel),
        );
        let mut register = RoleRegister::from_world(&fx.world);
        force_energy_transitions(&mut register, &mut fx.world, &fx.config);

        assert_eq!(fx.world.spirit(0).mark, Role::Refuel);
        assert_eq!(fx.world.spirit(1).mark, Role::Haul);
        assert_eq!(fx.world.spirit(2).mark, Role::Idle);
    }

    #[test]
    fn test_low_energy_beats_promotion() {
        // A low idle unit is never promoted to defend in the same tick
        let mut fx = Fixture::new(
            SnapshotBuilder::standard()
                .friendly_role(home(), 1.0, 1, Role::Idle)
                .enemy(Vec2::new(1600.0, 450.0), 10.0, 1),
        );
        let register = fx.update();
        assert_eq!(register.count(Role::Refuel), 1);
        assert_eq!(register.count(Role::Defend), 0);
    }

    #[test]
    fn test_haul_heavy_split_is_corrected() {
        let mut builder = SnapshotBuilder::standard();
        for i in 0..10 {
            builder = builder.friendly_role(home() + Vec2::new(i as f32 * 5.0, 0.0), 10.0, 1, Role::Haul);
        }
        for _ in 0..2 {
            builder = builder.friendly_role(Vec2::new(1400.0, 800.0), 10.0, 1, Role::Relay);
        }
        let mut fx = Fixture::new(builder);
        let mut register = RoleRegister::from_world(&fx.world);
        optimize_workers(&mut register, &mut fx.world, &fx.memory, &fx.config);

        assert!(register.count(Role::Relay) >= 3);
        assert_eq!(register.workers(), 12);
        let haul = register.count(Role::Haul) as f32;
        let relay = register.count(Role::Relay) as f32;
        assert!(haul - 1.0 <= (relay + 1.0) * fx.config.economy.haul_relay_ratio);
    }

    #[test]
    fn test_relay_heavy_split_is_corrected() {
        let mut builder = SnapshotBuilder::standard();
        for _ in 0..6 {
            builder = builder.friendly_role(Vec2::new(1400.0, 800.0), 10.0, 1, Role::Relay);
        }
        let mut fx = Fixture::new(builder);
        let mut register = RoleRegister::from_world(&fx.world);
        optimize_workers(&mut register, &mut fx.world, &fx.memory, &fx.config);

        // 4 haul / 2 relay: one more haul would need (2 - 1) * 2.6 >= 5
        assert_eq!(register.count(Role::Haul), 4);
        assert_eq!(register.count(Role::Relay), 2);
    }

    #[test]
    fn test_workers_fill_relay_first() {
        let mut builder = SnapshotBuilder::standard();
        for i in 0..4 {
            builder = builder.friendly(home() + Vec2::new(0.0, i as f32 * 10.0), 10.0, 1);
        }
        let mut fx = Fixture::new(builder);
        let register = fx.update();

        // Four scouts wanted before any worker on a quiet map
        assert_eq!(register.count(Role::Scout), 4);

        let mut builder = SnapshotBuilder::standard();
        for i in 0..8 {
            builder = builder.friendly(home() + Vec2::new(0.0, i as f32 * 10.0), 10.0, 1);
        }
        let mut fx = Fixture::new(builder);
        let register = fx.update();
        assert_eq!(register.count(Role::Scout), 4);
        // relay, haul, haul, relay
        assert_eq!(register.count(Role::Relay), 2);
        assert_eq!(register.count(Role::Haul), 2);
        assert_eq!(register.count(Role::Idle), 0);
    }

    #[test]
    fn test_defenders_prefer_idle_then_workers() {
        let base = Vec2::new(1600.0, 700.0);
        let mut fx = Fixture::new(
            SnapshotBuilder::standard()
                .friendly_role(base + Vec2::new(50.0, 0.0), 10.0, 1, Role::Haul)
                .friendly_role(base + Vec2::new(300.0, 0.0), 10.0, 1, Role::Idle)
                // 10 energy at 250 from base: threat 20, two defenders
                .enemy(base + Vec2::new(0.0, -250.0), 10.0, 1),
        );
        let register = fx.update();
        assert_eq!(register.targets.defenders, 2);
        assert_eq!(fx.world.spirit(1).mark, Role::Defend);
        assert_eq!(fx.world.spirit(0).mark, Role::Defend);
    }

    #[test]
    fn test_defenders_evicted_farthest_first() {
        let base = Vec2::new(1600.0, 700.0);
        let mut fx = Fixture::new(
            SnapshotBuilder::standard()
                .friendly_role(base + Vec2::new(50.0, 0.0), 10.0, 1, Role::Defend)
                .friendly_role(base + Vec2::new(500.0, 0.0), 10.0, 1, Role::Defend),
        );
        let ctx = fx.ctx();
        let mut register = fx.targets_only();
        remove_extras(&mut register, &mut fx.world, &ctx, &fx.config);
        assert_eq!(register.count(Role::Defend), 0);

        // With one defender wanted, the far one goes
        let mut register = RoleRegister::from_world(&fx.world);
        for i in [0, 1] {
            register.set_role(&mut fx.world, i, Role::Defend, "test");
        }
        register.targets.defenders = 1;
        remove_extras(&mut register, &mut fx.world, &ctx, &fx.config);
        assert_eq!(register.members(Role::Defend), &[0]);
    }

    #[test]
    fn test_defender_promotion_nearest_invader() {
        let base = Vec2::new(1600.0, 700.0);
        let mut fx = Fixture::new(
            SnapshotBuilder::standard()
                .friendly_role(base + Vec2::new(100.0, 0.0), 10.0, 1, Role::Idle)
                .friendly_role(base + Vec2::new(-250.0, -250.0), 10.0, 1, Role::Idle)
                .enemy(base + Vec2::new(0.0, -300.0), 10.0, 1),
        );
        let ctx = fx.ctx();
        assert_eq!(ctx.invaders.med, vec![2]);
        let mut register = fx.targets_only();
        register.targets.defenders = 1;
        assign_roles(&mut register, &mut fx.world, &ctx, &fx.memory, &fx.config);
        // The unit closer to the invader answers, not the one closer to base
        assert_eq!(register.members(Role::Defend), &[1]);
    }

    #[test]
    fn test_workers_evicted_nearest_base() {
        let base = Vec2::new(1600.0, 700.0);
        let mut fx = Fixture::new(
            SnapshotBuilder::standard()
                .friendly_role(home(), 10.0, 1, Role::Relay)
                .friendly_role(base + Vec2::new(100.0, 0.0), 10.0, 1, Role::Relay),
        );
        let ctx = fx.ctx();
        let mut register = fx.targets_only();
        register.targets.workers = 1;
        remove_extras(&mut register, &mut fx.world, &ctx, &fx.config);
        assert_eq!(register.members(Role::Relay), &[0]);
        assert_eq!(fx.world.spirit(1).mark, Role::Idle);
    }

    #[test]
    fn test_full_size_attackers_recalled_to_defend() {
        let base = Vec2::new(1600.0, 700.0);
        let mut builder = SnapshotBuilder::standard().shapes(Shape::Squares, Shape::Circles);
        for i in 0..4 {
            let at = base + Vec2::new(100.0 + i as f32 * 20.0, 0.0);
            builder = builder.friendly_role(at, 100.0, 10, Role::Attack);
        }
        let mut fx = Fixture::new(builder.enemy(base + Vec2::new(0.0, -250.0), 10.0, 1));
        assert_eq!(fx.memory.my_size, 10);

        let mut ctx = fx.ctx();
        ctx.strategy = Strategy::AllIn;
        let mut register = fx.targets_only();
        register.targets.defenders = 2;
        assign_roles(&mut register, &mut fx.world, &ctx, &fx.memory, &fx.config);
        assert_eq!(register.count(Role::Defend), 2);
        assert_eq!(register.count(Role::Attack), 2);
    }

    #[test]
    fn test_attacking_converts_everyone_but_defenders() {
        let base = Vec2::new(1600.0, 700.0);
        let mut fx = Fixture::new(
            SnapshotBuilder::standard()
                .friendly_role(base + Vec2::new(50.0, 0.0), 10.0, 1, Role::Defend)
                .friendly_role(home(), 10.0, 1, Role::Haul)
                .friendly_role(home(), 10.0, 1, Role::Scout)
                .friendly_role(home(), 1.0, 1, Role::Refuel)
                .enemy(base + Vec2::new(0.0, -250.0), 5.0, 1),
        );
        fx.memory.strategy = Strategy::AllIn;
        let register = fx.update();

        assert_eq!(fx.world.spirit(0).mark, Role::Defend);
        assert_eq!(fx.world.spirit(1).mark, Role::Attack);
        assert_eq!(fx.world.spirit(2).mark, Role::Attack);
        assert_eq!(fx.world.spirit(3).mark, Role::Refuel);
        assert_eq!(register.count(Role::Scout), 0);
    }

    impl Fixture {
        fn ctx(&mut self) -> WorldContext {
            assess(&self.world, &mut self.memory, &self.config)
        }

        fn targets_only(&mut self) -> RoleRegister {
            let ctx = self.ctx();
            let mut register = RoleRegister::from_world(&self.world);
            register.targets =
                super::super::RoleTargets::compute(&self.world, &ctx, &self.memory, &self.config);
            register
        }
    }
}
