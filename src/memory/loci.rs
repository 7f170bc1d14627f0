//! Fixed reference positions derived once per game from structure layout

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::{midpoint, next_position, vector_to, Located};

/// Named waypoints shared by every role
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Loci {
    /// Base side of the home star run, just inside base energize range
    pub base_to_star: Vec2,
    /// Base side of the center star run
    pub base_to_center: Vec2,
    /// Star side of the home star run
    pub star_to_base: Vec2,
    /// Star side of the center star run
    pub center_to_base: Vec2,
    /// Halfway between the center star and the outpost
    pub center_to_outpost: Vec2,
    /// The center star reflected away from the outpost
    pub outpost_antipode: Vec2,
}

impl Loci {
    pub fn compute(
        base: impl Located,
        home_star: impl Located,
        center_star: impl Located,
        outpost: impl Located,
        energize_range: f32,
    ) -> Self {
        let base = base.position();
        let home_star = home_star.position();
        let center = center_star.position();
        let outpost = outpost.position();

        Self {
            base_to_star: next_position(base, home_star, energize_range),
            base_to_center: next_position(base, center, energize_range),
            star_to_base: next_position(home_star, base, energize_range),
            center_to_base: next_position(center, base, energize_range),
            center_to_outpost: midpoint([center, outpost]).unwrap_or(center),
            outpost_antipode: vector_to(outpost, center) + center,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{dist, in_range};

    #[test]
    fn test_loci_geometry() {
        let base = Vec2::new(1600.0, 700.0);
        let star = Vec2::new(1000.0, 1000.0);
        let center = Vec2::new(2000.0, 1300.0);
        let outpost = Vec2::new(2200.0, 1100.0);
        let loci = Loci::compute(base, star, center, outpost, 200.0);

        assert!(in_range(loci.base_to_star, base, 200.0));
        assert!(in_range(loci.star_to_base, star, 200.0));
        assert_eq!(loci.center_to_outpost, Vec2::new(2100.0, 1200.0));
        assert_eq!(loci.outpost_antipode, Vec2::new(1800.0, 1500.0));
        assert!((dist(loci.outpost_antipode, center) - dist(outpost, center)).abs() < 1e-3);
    }
}
