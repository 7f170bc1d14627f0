//! Distance-weighted threat scoring

use glam::Vec2;

use crate::core::config::ThreatConfig;
use crate::geometry::dist;
use crate::world::World;

/// Weight of an enemy `distance` away from our base or home star.
///
/// Zero beyond the cutoff, otherwise `numerator / (max(d, floor) - offset) - bias`,
/// which is flat inside the floor distance and falls off like `1/d` beyond it.
pub fn threat_factor(distance: f32, config: &ThreatConfig) -> f32 {
    if distance > config.cutoff {
        return 0.0;
    }
    let denominator = (distance.max(config.floor_distance) - config.offset).max(f32::EPSILON);
    (config.numerator / denominator - config.bias).max(0.0)
}

/// Weight of an enemy `distance` away from the outpost, linear falloff
pub fn outpost_factor(distance: f32, config: &ThreatConfig) -> f32 {
    if distance > config.outpost_cutoff {
        return 0.0;
    }
    ((config.outpost_top - distance.max(config.outpost_floor)) / config.outpost_divisor).max(0.0)
}

/// Enemy spirits bucketed by distance from home; `far` contains `med`
/// which contains `near`
#[derive(Debug, Clone, Default)]
pub struct InvaderBands {
    pub near: Vec<usize>,
    pub med: Vec<usize>,
    pub far: Vec<usize>,
    /// Sum of `energy * threat_factor(distance)` over every invader
    pub threat: f32,
}

impl InvaderBands {
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.near.len(), self.med.len(), self.far.len())
    }
}

/// Classify every living enemy against our base and home star
pub fn classify_invaders(world: &World, home_star: Vec2, config: &ThreatConfig) -> InvaderBands {
    let mut bands = InvaderBands::default();

    for &i in &world.enemies {
        let enemy = world.spirit(i);
        let base_dist = dist(enemy, &world.base);
        let home_dist = base_dist.min(dist(enemy, home_star));
        if home_dist > config.cutoff {
            continue;
        }

        bands.far.push(i);
        if home_dist <= config.med_band {
            bands.med.push(i);
        }
        if home_dist <= config.near_band {
            bands.near.push(i);
        }
        bands.threat += enemy.energy.max(0.0) * threat_factor(home_dist, config);
    }

    bands
}

/// Transfer power of enemies inside our base's energize range that are not
/// already doomed this tick
pub fn invader_supply(world: &World, energize_range: f32) -> f32 {
    world
        .enemy_spirits()
        .filter(|enemy| !enemy.doomed && dist(*enemy, &world.base) < energize_range)
        .map(|enemy| enemy.power())
        .sum()
}

/// Distance-weighted enemy energy around the outpost
pub fn outpost_enemy_power(world: &World, config: &ThreatConfig) -> f32 {
    world
        .enemy_spirits()
        .map(|enemy| enemy.energy.max(0.0) * outpost_factor(dist(enemy, &world.outpost), config))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::SnapshotBuilder;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_threat_curve_samples() {
        let config = ThreatConfig::default();
        assert!(close(threat_factor(200.0, &config), 2.0));
        assert!(close(threat_factor(300.0, &config), 2.0));
        assert!(close(threat_factor(400.0, &config), 400.0 / 260.0 - 0.5));
        assert!(close(threat_factor(600.0, &config), 400.0 / 460.0 - 0.5));
        assert!(close(threat_factor(800.0, &config), 400.0 / 660.0 - 0.5));
        assert_eq!(threat_factor(801.0, &config), 0.0);
    }

    #[test]
    fn test_threat_curve_is_monotonic() {
        let config = ThreatConfig::default();
        let mut previous = f32::MAX;
        for d in (0..=800).step_by(25) {
            let factor = threat_factor(d as f32, &config);
            assert!(factor <= previous);
            previous = factor;
        }
    }

    #[test]
    fn test_outpost_curve_samples() {
        let config = ThreatConfig::default();
        assert!(close(outpost_factor(100.0, &config), 1.25));
        assert!(close(outpost_factor(400.0, &config), 0.75));
        assert!(close(outpost_factor(600.0, &config), 0.25));
        assert_eq!(outpost_factor(650.0, &config), 0.0);
    }

    #[test]
    fn test_single_invader_threat() {
        // 300 north of our base, well away from the home star
        let base = Vec2::new(1600.0, 700.0);
        let snapshot = SnapshotBuilder::standard()
            .enemy_sized(base + Vec2::new(0.0, -300.0), 100.0, 100.0, 1)
            .build();
        let world = World::from_snapshot(snapshot).unwrap();
        let config = ThreatConfig::default();
        let bands = classify_invaders(&world, Vec2::new(1000.0, 1000.0), &config);

        assert_eq!(bands.counts(), (1, 1, 1));
        assert!(close(bands.threat, 100.0 * threat_factor(300.0, &config)));
        assert_eq!(invader_supply(&world, 200.0), 0.0);
    }

    #[test]
    fn test_bands_are_nested() {
        let base = Vec2::new(1600.0, 700.0);
        let snapshot = SnapshotBuilder::standard()
            .enemy(base + Vec2::new(0.0, -150.0), 10.0, 1)
            .enemy(base + Vec2::new(0.0, -500.0), 10.0, 1)
            .enemy(base + Vec2::new(0.0, -700.0), 10.0, 1)
            .enemy(base + Vec2::new(0.0, -900.0), 10.0, 1)
            .build();
        let world = World::from_snapshot(snapshot).unwrap();
        let bands = classify_invaders(&world, Vec2::new(1000.0, 1000.0), &ThreatConfig::default());

        assert_eq!(bands.counts(), (1, 2, 3));
        assert!(bands.near.iter().all(|i| bands.med.contains(i)));
        assert!(bands.med.iter().all(|i| bands.far.contains(i)));
        assert_eq!(invader_supply(&world, 200.0), 1.0);
    }
}
