use glam::Vec2;

use super::{Energetic, Located};

const EPSILON: f32 = 1e-4;

/// Distance between two positions or entities
pub fn dist(from: impl Located, to: impl Located) -> f32 {
    from.position().distance(to.position())
}

/// Vector from `start` to `target` (i.e. `target - start`)
pub fn vector_to(start: impl Located, target: impl Located) -> Vec2 {
    target.position() - start.position()
}

/// Scale `vec` to length `mag`; a negative `mag` flips the direction.
///
/// A zero-length input stays zero rather than turning into NaN.
pub fn normalize(vec: Vec2, mag: f32) -> Vec2 {
    let length = vec.length();
    if length < EPSILON {
        Vec2::ZERO
    } else {
        vec * (mag / length)
    }
}

/// Counter-clockwise perpendicular of `vec`
pub fn perpendicular(vec: Vec2) -> Vec2 {
    Vec2::new(-vec.y, vec.x)
}

/// True if the two positions are strictly closer than `range`
pub fn in_range(from: impl Located, to: impl Located, range: f32) -> bool {
    dist(from, to) < range
}

/// Point between `from` and `to`; `bias` 0 is `from`, 1 is `to`, values
/// outside [0, 1] extrapolate.
pub fn lerp(from: impl Located, to: impl Located, bias: f32) -> Vec2 {
    from.position().lerp(to.position(), bias)
}

/// Balancing point of the given positions, `None` for an empty list
pub fn midpoint<I>(entries: I) -> Option<Vec2>
where
    I: IntoIterator,
    I::Item: Located,
{
    let mut sum = Vec2::ZERO;
    let mut count = 0usize;
    for entry in entries {
        sum += entry.position();
        count += 1;
    }
    (count > 0).then(|| sum / count as f32)
}

/// The point `range - 1` away from `tether` in the direction of `target`:
/// the closest point to `target` that is still strictly inside a `range`
/// radius around `tether`. A negative range steps away from `target`.
pub fn next_position(tether: impl Located, target: impl Located, range: f32) -> Vec2 {
    let tether = tether.position();
    tether + normalize(target.position() - tether, range - 1.0)
}

/// Shortest distance from `point` to the segment `start..end`
pub fn segment_distance(start: impl Located, end: impl Located, point: impl Located) -> f32 {
    let (a, b, p) = (start.position(), end.position(), point.position());
    let along = b - a;
    let length_sq = along.length_squared();
    if length_sq < EPSILON {
        return a.distance(p);
    }
    let t = ((p - a).dot(along) / length_sq).clamp(0.0, 1.0);
    (a + along * t).distance(p)
}

/// Energy over capacity; a capacity-less entity counts as full
pub fn energy_ratio(entity: impl Energetic) -> f32 {
    let capacity = entity.energy_capacity();
    if capacity <= 0.0 {
        1.0
    } else {
        entity.energy() / capacity
    }
}
