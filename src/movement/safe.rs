//! Steering around a hostile outpost's denial zone
//!
//! A hostile charged outpost damages anything inside its radius. Moves are
//! checked one step ahead: if the next step would clip the circle, the unit
//! steps along whichever tangent ends closer to its target instead; a unit
//! already inside is pushed back out, leaning toward its target where that
//! still points outward. Nothing is remembered between ticks.

use glam::Vec2;

use crate::core::config::MovementConfig;
use crate::geometry::{dist, in_range, normalize, perpendicular, segment_distance, vector_to};
use crate::world::World;

/// Circle a unit must not enter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DenialZone {
    pub center: Vec2,
    pub radius: f32,
}

impl DenialZone {
    /// The zone of the outpost if it is hostile and charged
    pub fn of(world: &World, config: &MovementConfig) -> Option<Self> {
        if !world.enemy_outpost() {
            return None;
        }
        let radius = if world.outpost.energy > config.empowered_energy {
            config.empowered_denial_radius
        } else {
            config.denial_radius
        };
        Some(Self {
            center: world.outpost.position,
            radius,
        })
    }

    pub fn contains(&self, point: Vec2) -> bool {
        in_range(point, self.center, self.radius)
    }
}

/// Destination that reaches toward `target` without entering `zone` this step
pub fn deflect(
    position: Vec2,
    move_speed: f32,
    target: Vec2,
    zone: DenialZone,
    config: &MovementConfig,
) -> Vec2 {
    let step = (target - position).clamp_length_max(move_speed);

    if zone.contains(position) {
        let outward = normalize(vector_to(zone.center, position), 1.0);
        let intended = normalize(step, 1.0);
        let heading = if intended.dot(outward) <= 0.0 {
            outward
        } else {
            normalize(
                outward * config.outward_blend + intended * (1.0 - config.outward_blend),
                1.0,
            )
        };
        // Dead center: any direction is outward
        let heading = if heading == Vec2::ZERO { Vec2::X } else { heading };
        return position + heading * config.step_length;
    }

    if segment_distance(position, position + step, zone.center) >= zone.radius {
        return target;
    }

    let to_center = normalize(vector_to(position, zone.center), config.step_length);
    let cw = position + perpendicular(to_center);
    let ccw = position - perpendicular(to_center);
    if dist(target, cw) < dist(target, ccw) {
        cw
    } else {
        ccw
    }
}

/// Phase C: apply denial-zone steering for `unit` if the outpost is hostile
pub fn safe_move(world: &World, config: &MovementConfig, unit: usize, target: Vec2) -> Vec2 {
    let spirit = world.spirit(unit);
    match DenialZone::of(world, config) {
        Some(zone) => deflect(spirit.position, spirit.move_speed, target, zone, config),
        None => target,
    }
}
