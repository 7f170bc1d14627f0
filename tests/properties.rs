//! Property tests over generated skirmishes
//!
//! Every case builds a seeded mid-game snapshot and runs the real
//! pipeline on it, then checks an invariant that must hold for any input.

use std::collections::HashSet;

use proptest::prelude::*;
use spirit_swarm::assessment::assess;
use spirit_swarm::core::config::TacticsConfig;
use spirit_swarm::core::types::Role;
use spirit_swarm::energize::energize_all;
use spirit_swarm::geometry::{farthest, lowest_energy, nearest, Vec2};
use spirit_swarm::memory::Memory;
use spirit_swarm::roles;
use spirit_swarm::scenario::random_skirmish;
use spirit_swarm::tick::run_tick;
use spirit_swarm::world::World;

fn prepared(seed: u64, per_side: usize) -> (World, Memory, TacticsConfig) {
    let world = World::from_snapshot(random_skirmish(seed, per_side)).unwrap();
    let config = TacticsConfig::default();
    let memory = Memory::initialize(&world, &config);
    (world, memory, config)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_energy_stays_within_capacity(seed in 0u64..10_000, per_side in 1usize..40) {
        let (mut world, mut memory, config) = prepared(seed, per_side);
        let ctx = assess(&world, &mut memory, &config);
        roles::update(&mut world, &ctx, &memory, &config);
        energize_all(&mut world, &ctx, &memory, &config);

        for s in &world.spirits {
            prop_assert!(s.energy >= 0.0, "{} went negative: {}", s.id, s.energy);
            prop_assert!(s.energy <= s.energy_capacity + 1e-3, "{} overfilled: {}", s.id, s.energy);
        }
        for star in &world.stars {
            prop_assert!(star.energy >= 0.0);
        }
    }

    #[test]
    fn prop_every_unit_has_one_role(seed in 0u64..10_000, per_side in 0usize..40) {
        let (mut world, mut memory, config) = prepared(seed, per_side);
        let ctx = assess(&world, &mut memory, &config);
        let register = roles::update(&mut world, &ctx, &memory, &config);

        prop_assert_eq!(register.total(), world.friendly.len());
        let mut seen = HashSet::new();
        for role in Role::ALL {
            for &unit in register.members(role) {
                prop_assert!(seen.insert(unit), "unit {} listed twice", unit);
                prop_assert_eq!(world.spirit(unit).mark, role);
            }
        }
    }

    #[test]
    fn prop_one_order_per_friendly_unit(seed in 0u64..10_000, per_side in 0usize..40) {
        let (world, mut memory, config) = prepared(seed, per_side);
        let snapshot = random_skirmish(seed, per_side);
        let outcome = run_tick(snapshot, &mut memory, &config).unwrap();

        prop_assert_eq!(outcome.orders.len(), world.friendly.len());
        let ids: HashSet<_> = outcome.orders.units.iter().map(|o| o.id.clone()).collect();
        prop_assert_eq!(ids.len(), outcome.orders.len());
        for orders in &outcome.orders.units {
            let to = orders.move_to.unwrap_or(Vec2::ZERO);
            prop_assert!(to.is_finite());
        }
    }

    #[test]
    fn prop_selectors_are_pure(
        points in prop::collection::vec((0.0f32..4000.0, 0.0f32..2000.0), 0..30),
        fx in 0.0f32..4000.0,
        fy in 0.0f32..2000.0,
    ) {
        let from = Vec2::new(fx, fy);
        let points: Vec<Vec2> = points.into_iter().map(|(x, y)| Vec2::new(x, y)).collect();

        prop_assert_eq!(nearest(from, points.iter()), nearest(from, points.iter()));
        prop_assert_eq!(farthest(from, points.iter()), farthest(from, points.iter()));
        if points.is_empty() {
            prop_assert_eq!(nearest(from, points.iter()), None);
        }
    }

    #[test]
    fn prop_lowest_energy_is_stable(seed in 0u64..10_000, per_side in 0usize..40) {
        let (world, _, _) = prepared(seed, per_side);
        let first = lowest_energy(world.friendly_spirits()).map(|s| s.id.clone());
        let second = lowest_energy(world.friendly_spirits()).map(|s| s.id.clone());
        prop_assert_eq!(first, second);
    }
}
