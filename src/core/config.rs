//! Tactics configuration with documented constants
//!
//! Every threshold the heuristics use lives here. The defaults are the
//! values the bot was tuned with against live opponents; none of them is a
//! law of the game and most are opponent-specific.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SwarmError};
use crate::core::types::Shape;

/// Engine distances that bound what a unit can do
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    /// Maximum energize distance (exclusive)
    pub energize_range: f32,
    /// Maximum distance for a merge
    pub merge_range: f32,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            energize_range: 200.0,
            merge_range: 10.0,
        }
    }
}

/// Macro-economy and strategy thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Own supply at which the army is considered ready to attack
    pub attack_supply: u32,
    /// Target haulers per relay
    pub haul_relay_ratio: f32,
    /// Power ratio below which an assault is abandoned
    pub losing_power_ratio: f32,
    /// Radius around the rally point counted as "grouped"
    pub rally_group_radius: f32,
    /// Share of attack supply that must be grouped before going all-in
    pub rally_group_fraction: f32,
    /// Mean attacker energy ratio considered "full" for the all-in check
    pub rally_full_energy_ratio: f32,
    /// Rally star energy below which waiting for refuel is pointless
    pub rally_star_depleted: f32,
    /// Own supply required before a retake is attempted
    pub retake_supply: u32,
    /// Safety margin on own energy versus outpost defence for a retake
    pub retake_margin: f32,
    /// Home star stock below which one less worker is kept
    pub star_low_energy: f32,
    /// Home star stock above which one more worker is kept
    pub star_high_energy: f32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            attack_supply: 51,
            haul_relay_ratio: 2.6,
            losing_power_ratio: 1.0,
            rally_group_radius: 50.0,
            rally_group_fraction: 0.6,
            rally_full_energy_ratio: 0.9,
            rally_star_depleted: 50.0,
            retake_supply: 20,
            retake_margin: 1.2,
            star_low_energy: 500.0,
            star_high_energy: 900.0,
        }
    }
}

/// Distance falloff curves used by threat and outpost scoring
///
/// Base threat: `numerator / (max(d, floor_distance) - offset) - bias` for
/// `d <= cutoff`. With the defaults this is 2.0 at 300 and closer, ~1.04 at
/// 400, ~0.37 at 600 and ~0.11 at 800.
///
/// Outpost power: `(outpost_top - max(d, outpost_floor)) / outpost_divisor`
/// for `d <= outpost_cutoff`, i.e. 1.25 at 200 falling linearly to 0.25 at 600.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreatConfig {
    pub near_band: f32,
    pub med_band: f32,
    /// Outer edge of the far band and of threat scoring
    pub cutoff: f32,
    pub numerator: f32,
    pub floor_distance: f32,
    pub offset: f32,
    pub bias: f32,
    pub outpost_cutoff: f32,
    pub outpost_top: f32,
    pub outpost_floor: f32,
    pub outpost_divisor: f32,
}

impl Default for ThreatConfig {
    fn default() -> Self {
        Self {
            near_band: 400.0,
            med_band: 600.0,
            cutoff: 800.0,
            numerator: 400.0,
            floor_distance: 300.0,
            offset: 140.0,
            bias: 0.5,
            outpost_cutoff: 600.0,
            outpost_top: 700.0,
            outpost_floor: 200.0,
            outpost_divisor: 400.0,
        }
    }
}

/// Role target counts and transition cutoffs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleConfig {
    /// Threat absorbed per defender, in multiples of unit size
    pub defender_threat_share: f32,
    /// Extra defenders while attacking into a likely counter-attack
    pub counter_attack_defenders: u32,
    /// Scout floor, divided by unit size
    pub scout_floor: f32,
    /// One extra scout per this many living units
    pub units_per_scout: u32,
    /// Extra scouts while enemies crowd the outpost
    pub contest_scout_bonus: u32,
    /// Energy ratio at or below which non-workers are sent to refuel
    pub low_energy_ratio: f32,
    /// Energy ratio at which refuelling units are released
    pub refuel_release_ratio: f32,
    /// Minimum ratio for idle/worker units promoted to defence
    pub defender_min_ratio: f32,
    /// Attackers closer than this to the base may be recalled to defend
    pub attacker_recall_radius: f32,
    /// Supply distance below the attack threshold that allows over-harvesting
    pub near_supply_window: u32,
    /// Extra workers while close to the attack threshold
    pub over_harvest_bonus: u32,
    /// Worker cap while the enemy is all-in on our base
    pub siege_worker_cap: u32,
    /// Share of enemy supply inside the far band that counts as all-in
    pub enemy_all_in_fraction: f32,
}

impl Default for RoleConfig {
    fn default() -> Self {
        Self {
            defender_threat_share: 10.0,
            counter_attack_defenders: 2,
            scout_floor: 3.0,
            units_per_scout: 8,
            contest_scout_bonus: 1,
            low_energy_ratio: 0.2,
            refuel_release_ratio: 0.9,
            defender_min_ratio: 0.5,
            attacker_recall_radius: 800.0,
            near_supply_window: 6,
            over_harvest_bonus: 2,
            siege_worker_cap: 4,
            enemy_all_in_fraction: 0.6,
        }
    }
}

/// Energize cascade thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergizeConfig {
    /// Minimum own ratio before feeding the outpost
    pub outpost_min_ratio: f32,
    /// Outpost energy considered low regardless of enemy pressure
    pub outpost_low_floor: f32,
    /// Outpost energy window around the empower threshold
    pub empower_window_low: f32,
    pub empower_window_high: f32,
}

impl Default for EnergizeConfig {
    fn default() -> Self {
        Self {
            outpost_min_ratio: 0.5,
            outpost_low_floor: 25.0,
            empower_window_low: 450.0,
            empower_window_high: 550.0,
        }
    }
}

/// Movement and positioning constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Radius in which visible enemies count toward danger
    pub danger_radius: f32,
    /// Radius in which friends (and self) count toward group power
    pub group_radius: f32,
    /// Length of one flee/avoid/deflection step
    pub step_length: f32,
    /// Beamable targets an enemy triangle needs before it is an explode threat
    pub explode_min_targets: usize,
    /// Harassment standoff from the enemy base
    pub scout_standoff: f32,
    /// Share of scout power that must be grouped before pressing the outpost
    pub scout_group_share: f32,
    /// Denial radius of a hostile outpost
    pub denial_radius: f32,
    /// Denial radius of a hostile empowered outpost
    pub empowered_denial_radius: f32,
    /// Outpost energy above which it is empowered
    pub empowered_energy: f32,
    /// Weight of the radial escape when already inside the denial zone
    pub outward_blend: f32,
    /// The enemy star is considered for refuelling within this distance
    pub enemy_star_refuel_radius: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            danger_radius: 240.0,
            group_radius: 50.0,
            step_length: 21.0,
            explode_min_targets: 3,
            scout_standoff: 400.0,
            scout_group_share: 0.75,
            denial_radius: 400.0,
            empowered_denial_radius: 600.0,
            empowered_energy: 400.0,
            outward_blend: 0.7,
            enemy_star_refuel_radius: 600.0,
        }
    }
}

/// Merge/divide and explosion constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityConfig {
    /// Largest size a merged circle may reach
    pub max_merge_size: u32,
    /// Attackers this close to the rally point may merge
    pub merge_rally_radius: f32,
    /// Damage dealt by one triangle explosion
    pub explode_damage: f32,
}

impl Default for AbilityConfig {
    fn default() -> Self {
        Self {
            max_merge_size: 10,
            merge_rally_radius: 50.0,
            explode_damage: 10.0,
        }
    }
}

/// Combat traits of one opponent archetype
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeProfile {
    /// Relative combat efficiency applied to raw enemy energy
    pub combat_multiplier: f32,
    /// Overkills its targets, making ally support wasted
    pub overkills: bool,
    /// Can destroy nearby units with an area explosion
    pub area_damage: bool,
}

/// Per-archetype profiles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeConfig {
    pub circles: ShapeProfile,
    pub squares: ShapeProfile,
    pub triangles: ShapeProfile,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            circles: ShapeProfile {
                combat_multiplier: 1.0,
                overkills: false,
                area_damage: false,
            },
            squares: ShapeProfile {
                combat_multiplier: 0.6,
                overkills: true,
                area_damage: false,
            },
            triangles: ShapeProfile {
                combat_multiplier: 0.85,
                overkills: false,
                area_damage: true,
            },
        }
    }
}

impl ShapeConfig {
    pub fn profile(&self, shape: Shape) -> &ShapeProfile {
        match shape {
            Shape::Circles => &self.circles,
            Shape::Squares => &self.squares,
            Shape::Triangles => &self.triangles,
        }
    }
}

/// Complete tactics configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TacticsConfig {
    /// Emit per-unit debug shouts
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub ranges: RangeConfig,
    #[serde(default)]
    pub economy: EconomyConfig,
    #[serde(default)]
    pub threat: ThreatConfig,
    #[serde(default)]
    pub roles: RoleConfig,
    #[serde(default)]
    pub energize: EnergizeConfig,
    #[serde(default)]
    pub movement: MovementConfig,
    #[serde(default)]
    pub abilities: AbilityConfig,
    #[serde(default)]
    pub shapes: ShapeConfig,
}

impl TacticsConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: TacticsConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.ranges.energize_range <= 1.0 || self.ranges.merge_range <= 0.0 {
            return Err(SwarmError::InvalidConfig(format!(
                "ranges must be positive (energize {}, merge {})",
                self.ranges.energize_range, self.ranges.merge_range
            )));
        }

        if self.roles.low_energy_ratio >= self.roles.refuel_release_ratio {
            return Err(SwarmError::InvalidConfig(format!(
                "low_energy_ratio ({}) should be < refuel_release_ratio ({})",
                self.roles.low_energy_ratio, self.roles.refuel_release_ratio
            )));
        }

        if self.economy.haul_relay_ratio <= 0.0 {
            return Err(SwarmError::InvalidConfig(
                "haul_relay_ratio must be positive".into(),
            ));
        }

        if self.threat.floor_distance <= self.threat.offset {
            return Err(SwarmError::InvalidConfig(format!(
                "threat floor_distance ({}) must exceed offset ({})",
                self.threat.floor_distance, self.threat.offset
            )));
        }

        let bands = [self.threat.near_band, self.threat.med_band, self.threat.cutoff];
        if bands.windows(2).any(|w| w[0] > w[1]) {
            return Err(SwarmError::InvalidConfig(format!(
                "threat bands must be nested (near {}, med {}, cutoff {})",
                bands[0], bands[1], bands[2]
            )));
        }

        if self.threat.outpost_divisor <= 0.0 || self.roles.defender_threat_share <= 0.0 {
            return Err(SwarmError::InvalidConfig(
                "outpost_divisor and defender_threat_share must be positive".into(),
            ));
        }

        if self.movement.step_length <= 0.0
            || self.movement.denial_radius <= 0.0
            || self.movement.empowered_denial_radius < self.movement.denial_radius
        {
            return Err(SwarmError::InvalidConfig(
                "movement step and denial radii must be positive and ordered".into(),
            ));
        }

        Ok(())
    }
}

/// Load a tactics config from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<TacticsConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    TacticsConfig::from_toml_str(&contents)
}
