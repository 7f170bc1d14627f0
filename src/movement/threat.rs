//! Phase A: react to enemies in sight before any role movement

use glam::Vec2;

use crate::assessment::WorldContext;
use crate::core::config::TacticsConfig;
use crate::core::types::Role;
use crate::geometry::{dist, energy_ratio, lowest_energy, midpoint, normalize, vector_to};
use crate::world::{Spirit, World};

/// Outcome of the threat check for one unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThreatResponse {
    /// Step away from enemies that can blow up next to us
    Avoid(Vec2),
    /// Outmatched: step away from the local enemy mass
    Flee(Vec2),
    /// Close on the weakest enemy in beam range
    Chase(Vec2),
}

impl ThreatResponse {
    pub fn destination(self) -> Vec2 {
        match self {
            ThreatResponse::Avoid(p) | ThreatResponse::Flee(p) | ThreatResponse::Chase(p) => p,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ThreatResponse::Avoid(_) => "avoid",
            ThreatResponse::Flee(_) => "flee",
            ThreatResponse::Chase(_) => "chase",
        }
    }
}

/// Local balance of power around one unit
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocalBalance {
    /// Shape-scaled energy of visible enemies within the danger radius
    pub danger: f32,
    /// Energy of this unit and the friends packed around it
    pub group_power: f32,
}

fn hostile<'a>(world: &'a World, ids: &[crate::core::types::SpiritId]) -> Vec<&'a Spirit> {
    world
        .resolve(ids)
        .into_iter()
        .filter(|&i| !world.is_friendly(i))
        .map(|i| world.spirit(i))
        .filter(|t| !t.doomed)
        .collect()
}

pub fn local_balance(world: &World, ctx: &WorldContext, config: &TacticsConfig, s: &Spirit) -> LocalBalance {
    let movement = &config.movement;
    let danger: f32 = hostile(world, &s.sight.enemies)
        .into_iter()
        .filter(|t| t.energy > 0.0 && dist(*t, s) <= movement.danger_radius)
        .map(|t| t.energy)
        .sum();

    let friends: f32 = world
        .resolve(&s.sight.friends_beamable)
        .into_iter()
        .filter(|&i| world.is_friendly(i))
        .map(|i| world.spirit(i))
        .filter(|f| dist(*f, s) <= movement.group_radius)
        .map(|f| f.energy.max(0.0))
        .sum();

    LocalBalance {
        danger: danger * ctx.enemy_multiplier,
        group_power: friends + s.energy.max(0.0),
    }
}

/// Evaluate phase A; `None` lets role movement decide
pub fn respond(
    world: &World,
    ctx: &WorldContext,
    config: &TacticsConfig,
    s: &Spirit,
    force_group: bool,
) -> Option<ThreatResponse> {
    let movement = &config.movement;
    let balance = local_balance(world, ctx, config, s);
    let beamable = hostile(world, &s.sight.enemies_beamable);

    if config.shapes.profile(ctx.enemy_shape).area_damage {
        let bombers: Vec<&Spirit> = beamable
            .iter()
            .copied()
            .filter(|t| t.sight.enemies_beamable.len() >= movement.explode_min_targets)
            .collect();
        if !bombers.is_empty()
            && s.energy <= bombers.len() as f32 * config.abilities.explode_damage
        {
            let away = midpoint(bombers.iter().map(|t| normalize(vector_to(*t, s), 1.0)))
                .unwrap_or(Vec2::ZERO);
            return Some(ThreatResponse::Avoid(
                s.position + normalize(away, movement.step_length),
            ));
        }
    }

    if balance.group_power < balance.danger {
        let away = midpoint(
            hostile(world, &s.sight.enemies)
                .into_iter()
                .filter(|t| t.energy > 0.0 && dist(*t, s) <= movement.danger_radius)
                .map(|t| normalize(vector_to(t, s), t.energy)),
        )
        .unwrap_or(Vec2::ZERO);
        return Some(ThreatResponse::Flee(
            s.position + normalize(away, movement.step_length),
        ));
    }

    let holding = force_group && s.mark == Role::Attack;
    if balance.danger > 0.0 && energy_ratio(s) > 0.0 && !holding {
        if let Some(prey) = lowest_energy(beamable) {
            return Some(ThreatResponse::Chase(prey.position));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::assess;
    use crate::core::types::Shape;
    use crate::memory::Memory;
    use crate::scenario::SnapshotBuilder;

    fn evaluate(builder: SnapshotBuilder, unit: usize, force_group: bool) -> Option<ThreatResponse> {
        let world = World::from_snapshot(builder.build()).unwrap();
        let config = TacticsConfig::default();
        let mut memory = Memory::initialize(&world, &config);
        let ctx = assess(&world, &mut memory, &config);
        respond(&world, &ctx, &config, world.spirit(unit), force_group)
    }

    fn field() -> Vec2 {
        Vec2::new(2500.0, 800.0)
    }

    #[test]
    fn test_outnumbered_unit_flees_directly_away() {
        let response = evaluate(
            SnapshotBuilder::standard()
                .friendly(field(), 5.0, 1)
                .enemy(field() + Vec2::new(150.0, 0.0), 10.0, 1),
            0,
            false,
        );
        let Some(ThreatResponse::Flee(to)) = response else {
            panic!("expected flee, got {:?}", response);
        };
        assert!((to - (field() - Vec2::new(21.0, 0.0))).length() < 1e-3);
    }

    #[test]
    fn test_group_stands_and_chases() {
        let response = evaluate(
            SnapshotBuilder::standard()
                .friendly(field(), 5.0, 1)
                .friendly(field() + Vec2::new(10.0, 0.0), 8.0, 1)
                .enemy(field() + Vec2::new(150.0, 0.0), 10.0, 1)
                .enemy(field() + Vec2::new(150.0, 30.0), 2.0, 1),
            0,
            false,
        );
        // 13 of ours against 12 of theirs: go for the 2-energy straggler
        assert_eq!(response, Some(ThreatResponse::Chase(field() + Vec2::new(150.0, 30.0))));
    }

    #[test]
    fn test_grouping_attackers_hold_position() {
        let builder = SnapshotBuilder::standard()
            .friendly_role(field(), 10.0, 1, Role::Attack)
            .enemy(field() + Vec2::new(150.0, 0.0), 3.0, 1);
        assert_eq!(evaluate(builder.clone(), 0, true), None);
        assert!(matches!(evaluate(builder, 0, false), Some(ThreatResponse::Chase(_))));
    }

    #[test]
    fn test_squares_count_for_less() {
        // 10 squares-energy is worth 6 against our 8
        let response = evaluate(
            SnapshotBuilder::standard()
                .shapes(Shape::Circles, Shape::Squares)
                .friendly(field(), 8.0, 1)
                .enemy(field() + Vec2::new(150.0, 0.0), 10.0, 1),
            0,
            false,
        );
        assert!(matches!(response, Some(ThreatResponse::Chase(_))));
    }

    #[test]
    fn test_triangle_bomber_is_avoided() {
        // The triangle sees three of ours in beam range and we hold too little
        // to survive three explosions
        let bomber = field() + Vec2::new(0.0, 100.0);
        let response = evaluate(
            SnapshotBuilder::standard()
                .shapes(Shape::Circles, Shape::Triangles)
                .friendly(field(), 10.0, 1)
                .friendly(field() + Vec2::new(5.0, 0.0), 10.0, 1)
                .friendly(field() + Vec2::new(-5.0, 0.0), 10.0, 1)
                .enemy(bomber, 1.0, 1),
            0,
            false,
        );
        let Some(ThreatResponse::Avoid(to)) = response else {
            panic!("expected avoid, got {:?}", response);
        };
        assert!(to.y < field().y);
        assert!((dist(to, field()) - 21.0).abs() < 1e-3);
    }
}
