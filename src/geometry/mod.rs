//! Geometry helpers - vectors, distances and extremal selection
//!
//! Positions are `glam::Vec2` values. Whether a value is a free vector or a
//! point on the map is up to the caller; the helpers here never assume.
//! Anything with a position implements [`Located`], so entities and raw
//! points can be passed interchangeably and normalised once at the boundary.

mod select;
mod vector;

pub use glam::Vec2;
pub use select::{farthest, highest_energy, lowest_energy, nearest};
pub use vector::{
    dist, energy_ratio, in_range, lerp, midpoint, next_position, normalize, perpendicular,
    segment_distance, vector_to,
};

/// Anything that occupies a point on the map
pub trait Located {
    fn position(&self) -> Vec2;
}

impl Located for Vec2 {
    fn position(&self) -> Vec2 {
        *self
    }
}

impl<T: Located + ?Sized> Located for &T {
    fn position(&self) -> Vec2 {
        (**self).position()
    }
}

/// Anything holding transferable energy
pub trait Energetic {
    fn energy(&self) -> f32;
    fn energy_capacity(&self) -> f32;
}

impl<T: Energetic + ?Sized> Energetic for &T {
    fn energy(&self) -> f32 {
        (**self).energy()
    }

    fn energy_capacity(&self) -> f32 {
        (**self).energy_capacity()
    }
}

/// Indexed candidates, so selectors can report which slot won
impl<T: Located> Located for (usize, T) {
    fn position(&self) -> Vec2 {
        self.1.position()
    }
}

impl<T: Energetic> Energetic for (usize, T) {
    fn energy(&self) -> f32 {
        self.1.energy()
    }

    fn energy_capacity(&self) -> f32 {
        self.1.energy_capacity()
    }
}
