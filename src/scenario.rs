//! Snapshot construction for tests, benchmarks and offline replay
//!
//! [`SnapshotBuilder`] lays out the classic two-base map and fills in the
//! sight lists the engine would compute, so scenarios can be described by
//! positions and energies alone. [`random_skirmish`] produces seeded
//! mid-game snapshots.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::types::{PlayerId, Role, Shape, SpiritId, Tick};
use crate::geometry::in_range;
use crate::world::{Base, Outpost, Sight, Snapshot, Spirit, Star};

pub const ME: &str = "me";
pub const THEM: &str = "them";

/// Engine vision and beam ranges used to fill sight lists
const SIGHT_RANGE: f32 = 400.0;
const BEAM_RANGE: f32 = 200.0;

/// Fluent builder for snapshots on the classic map
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    tick: Tick,
    spirits: Vec<Spirit>,
    base: Base,
    enemy_base: Base,
    stars: Vec<Star>,
    outpost: Outpost,
    friendly_count: usize,
    enemy_count: usize,
}

impl SnapshotBuilder {
    /// Classic layout: our base north-west, theirs south-east, one star
    /// behind each base, a center star beside the outpost
    pub fn standard() -> Self {
        Self {
            tick: 1,
            spirits: Vec::new(),
            base: Base {
                id: "base_me".into(),
                player_id: ME.into(),
                position: Vec2::new(1600.0, 700.0),
                energy: 400.0,
                energy_capacity: 1000.0,
                hp: 1.0,
                shape: Shape::Circles,
            },
            enemy_base: Base {
                id: "base_them".into(),
                player_id: THEM.into(),
                position: Vec2::new(2600.0, 1700.0),
                energy: 400.0,
                energy_capacity: 1000.0,
                hp: 1.0,
                shape: Shape::Circles,
            },
            stars: vec![
                star("star_zxq", Vec2::new(1000.0, 1000.0), 800.0, 0),
                star("star_a2c", Vec2::new(3200.0, 1400.0), 800.0, 0),
                star("star_p89", Vec2::new(2000.0, 1300.0), 300.0, 0),
            ],
            outpost: Outpost {
                id: "outpost_mdo".into(),
                position: Vec2::new(2200.0, 1100.0),
                energy: 0.0,
                energy_capacity: 1000.0,
                control: None,
            },
            friendly_count: 0,
            enemy_count: 0,
        }
    }

    pub fn tick(mut self, tick: Tick) -> Self {
        self.tick = tick;
        self
    }

    pub fn shapes(mut self, mine: Shape, theirs: Shape) -> Self {
        self.base.shape = mine;
        self.enemy_base.shape = theirs;
        self
    }

    /// Friendly spirit with capacity `10 * size`, idle
    pub fn friendly(self, position: Vec2, energy: f32, size: u32) -> Self {
        self.friendly_with(position, energy, 10.0 * size as f32, size, Role::Idle)
    }

    pub fn friendly_sized(self, position: Vec2, energy: f32, capacity: f32, size: u32) -> Self {
        self.friendly_with(position, energy, capacity, size, Role::Idle)
    }

    /// Friendly spirit carrying `role` from the previous tick
    pub fn friendly_role(self, position: Vec2, energy: f32, size: u32, role: Role) -> Self {
        self.friendly_with(position, energy, 10.0 * size as f32, size, role)
    }

    pub fn friendly_with(
        mut self,
        position: Vec2,
        energy: f32,
        capacity: f32,
        size: u32,
        role: Role,
    ) -> Self {
        self.friendly_count += 1;
        let id = format!("{}_{}", ME, self.friendly_count);
        let shape = self.base.shape;
        self.spirits
            .push(spirit(&id, ME, position, energy, capacity, size, role, shape));
        self
    }

    /// Enemy spirit with capacity `10 * size`
    pub fn enemy(self, position: Vec2, energy: f32, size: u32) -> Self {
        self.enemy_sized(position, energy, 10.0 * size as f32, size)
    }

    pub fn enemy_sized(mut self, position: Vec2, energy: f32, capacity: f32, size: u32) -> Self {
        self.enemy_count += 1;
        let id = format!("{}_{}", THEM, self.enemy_count);
        let shape = self.enemy_base.shape;
        self.spirits
            .push(spirit(&id, THEM, position, energy, capacity, size, Role::Idle, shape));
        self
    }

    pub fn base_energy(mut self, energy: f32) -> Self {
        self.base.energy = energy;
        self
    }

    pub fn enemy_base_energy(mut self, energy: f32) -> Self {
        self.enemy_base.energy = energy;
        self
    }

    pub fn outpost(mut self, control: Option<&str>, energy: f32) -> Self {
        self.outpost.control = control.map(PlayerId::from);
        self.outpost.energy = energy;
        self
    }

    /// Set a star's stock by index (0 home, 1 enemy, 2 center)
    pub fn star_energy(mut self, index: usize, energy: f32) -> Self {
        if let Some(star) = self.stars.get_mut(index) {
            star.energy = energy;
        }
        self
    }

    pub fn build(mut self) -> Snapshot {
        fill_sight(&mut self.spirits, &self.stars, &self.outpost, &self.base, &self.enemy_base);
        Snapshot {
            tick: self.tick,
            this_player_id: ME.into(),
            spirits: self.spirits,
            base: self.base,
            enemy_base: self.enemy_base,
            stars: self.stars,
            outpost: self.outpost,
        }
    }
}

fn star(id: &str, position: Vec2, energy: f32, active_in: u32) -> Star {
    Star {
        id: id.into(),
        position,
        energy,
        energy_capacity: 1000.0,
        active_in,
    }
}

#[allow(clippy::too_many_arguments)]
fn spirit(
    id: &str,
    player: &str,
    position: Vec2,
    energy: f32,
    capacity: f32,
    size: u32,
    mark: Role,
    shape: Shape,
) -> Spirit {
    Spirit {
        id: SpiritId::from(id),
        player_id: player.into(),
        position,
        energy,
        energy_capacity: capacity,
        size,
        hp: 1.0,
        move_speed: 20.0,
        shape,
        mark,
        sight: Sight::default(),
        doomed: false,
    }
}

/// Compute the sight lists the engine would report
fn fill_sight(spirits: &mut [Spirit], stars: &[Star], outpost: &Outpost, base: &Base, enemy_base: &Base) {
    let snapshot: Vec<(SpiritId, PlayerId, Vec2)> = spirits
        .iter()
        .map(|s| (s.id.clone(), s.player_id.clone(), s.position))
        .collect();

    for spirit in spirits.iter_mut() {
        let mut sight = Sight::default();
        for (id, owner, position) in &snapshot {
            if *id == spirit.id || !in_range(spirit.position, *position, SIGHT_RANGE) {
                continue;
            }
            let beamable = in_range(spirit.position, *position, BEAM_RANGE);
            if *owner == spirit.player_id {
                sight.friends.push(id.clone());
                if beamable {
                    sight.friends_beamable.push(id.clone());
                }
            } else {
                sight.enemies.push(id.clone());
                if beamable {
                    sight.enemies_beamable.push(id.clone());
                }
            }
        }

        let structures = stars
            .iter()
            .map(|s| (&s.id, s.position))
            .chain([
                (&outpost.id, outpost.position),
                (&base.id, base.position),
                (&enemy_base.id, enemy_base.position),
            ]);
        for (id, position) in structures {
            if in_range(spirit.position, position, SIGHT_RANGE) {
                sight.structures.push(id.clone());
            }
        }
        spirit.sight = sight;
    }
}

/// A seeded mid-game skirmish: both sides spread around their economy with
/// a few raiders near the middle of the map
pub fn random_skirmish(seed: u64, per_side: usize) -> Snapshot {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut builder = SnapshotBuilder::standard().tick(rng.gen_range(50..2000));

    let roles = [Role::Idle, Role::Haul, Role::Relay, Role::Scout, Role::Defend];
    let my_anchor = [Vec2::new(1600.0, 700.0), Vec2::new(1000.0, 1000.0), Vec2::new(2000.0, 1300.0)];
    let their_anchor = [Vec2::new(2600.0, 1700.0), Vec2::new(3200.0, 1400.0), Vec2::new(2200.0, 1100.0)];

    for _ in 0..per_side {
        let anchor = my_anchor[rng.gen_range(0..my_anchor.len())];
        let position = anchor + jitter(&mut rng, 250.0);
        let energy = rng.gen_range(0..=10) as f32;
        let role = roles[rng.gen_range(0..roles.len())];
        builder = builder.friendly_role(position, energy, 1, role);
    }
    for _ in 0..per_side {
        let anchor = their_anchor[rng.gen_range(0..their_anchor.len())];
        let position = anchor + jitter(&mut rng, 250.0);
        let energy = rng.gen_range(0..=10) as f32;
        builder = builder.enemy(position, energy, 1);
    }

    let outpost_owner = match rng.gen_range(0..3) {
        0 => None,
        1 => Some(ME),
        _ => Some(THEM),
    };
    let outpost_energy = if outpost_owner.is_some() { rng.gen_range(1.0..700.0) } else { 0.0 };

    builder
        .outpost(outpost_owner, outpost_energy)
        .star_energy(0, rng.gen_range(100.0..1000.0))
        .star_energy(2, rng.gen_range(0.0..600.0))
        .base_energy(rng.gen_range(50.0..1000.0))
        .enemy_base_energy(rng.gen_range(50.0..1000.0))
        .build()
}

fn jitter(rng: &mut StdRng, radius: f32) -> Vec2 {
    Vec2::new(rng.gen_range(-radius..radius), rng.gen_range(-radius..radius))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_fills_sight() {
        let snapshot = SnapshotBuilder::standard()
            .friendly(Vec2::new(2000.0, 1000.0), 10.0, 1)
            .friendly(Vec2::new(2300.0, 1000.0), 10.0, 1)
            .enemy(Vec2::new(2150.0, 1000.0), 10.0, 1)
            .build();

        let first = &snapshot.spirits[0];
        assert_eq!(first.sight.friends, vec![SpiritId::from("me_2")]);
        assert!(first.sight.friends_beamable.is_empty());
        assert_eq!(first.sight.enemies_beamable, vec![SpiritId::from("them_1")]);
        assert!(first.sight.structures.contains(&"outpost_mdo".into()));
    }

    #[test]
    fn test_random_skirmish_is_deterministic() {
        let a = random_skirmish(7, 12);
        let b = random_skirmish(7, 12);
        assert_eq!(a.spirits.len(), 24);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
