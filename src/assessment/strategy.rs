//! Macro strategy state machine
//!
//! ```text
//!   economic --ready & base beatable--> rally --grouped & (full | star dry)--> all-in
//!      ^  \                               |                                     |
//!      |   \--outpost retakeable--> retake|                                     |
//!      |                              |   |                                     |
//!      +----- secured / losing -------+   +---------- losing & base safe -------+
//! ```
//!
//! The machine advances at most one edge per evaluation. Every signal it
//! reads is computed by the assessment before the call, so the transition
//! rules can be exercised without a world.

use serde::{Deserialize, Serialize};

use crate::core::config::EconomyConfig;
use crate::core::types::Strategy;
use crate::memory::Memory;

/// Inputs of one strategy evaluation
#[derive(Debug, Clone, Default)]
pub struct StrategySignals {
    /// Supply threshold reached or the capacity-advantage test passes
    pub ready_to_attack: bool,
    /// Our energy gives at least even odds against the enemy base
    pub can_beat_base: bool,
    /// Friendly energy over shape-scaled enemy energy
    pub power_ratio: f32,
    /// Center star has energy and the outpost is ours
    pub can_harvest_center: bool,
    /// The center star holds enough to top up every unit
    pub center_covers_vacancy: bool,
    /// Supply standing within the group radius of the rally point
    pub grouped_supply: f32,
    /// Supply expected to take part in the assault
    pub committed_supply: f32,
    /// Mean energy ratio of the grouped units
    pub grouped_energy_ratio: f32,
    /// Remaining energy of the star the army refuels at
    pub rally_star_energy: f32,
    /// Outpost is enemy-held and charged
    pub enemy_outpost: bool,
    /// Enough supply and energy to take the outpost back
    pub can_retake: bool,
}

/// A strategy edge taken during one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyTransition {
    pub from: Strategy,
    pub to: Strategy,
}

/// Evaluate the machine once, updating strategy and flags in `memory`
pub fn advance(
    memory: &mut Memory,
    signals: &StrategySignals,
    config: &EconomyConfig,
) -> Option<StrategyTransition> {
    let from = memory.strategy;
    let losing = signals.power_ratio < config.losing_power_ratio;

    let to = match from {
        Strategy::Economic if signals.ready_to_attack && signals.can_beat_base => {
            memory.refuel_center = signals.can_harvest_center && signals.center_covers_vacancy;
            memory.force_group = true;
            Strategy::Rally
        }
        Strategy::Economic if signals.can_retake => {
            memory.retake_active = true;
            Strategy::Retake
        }
        Strategy::Rally | Strategy::AllIn if losing && !signals.can_beat_base => {
            memory.refuel_center = false;
            memory.force_group = false;
            Strategy::Economic
        }
        Strategy::Rally if is_grouped(signals, config) => {
            memory.force_group = false;
            Strategy::AllIn
        }
        Strategy::Retake if !signals.enemy_outpost || losing => {
            memory.retake_active = false;
            Strategy::Economic
        }
        _ => return None,
    };

    memory.strategy = to;
    tracing::info!("Strategy {} -> {} (power ratio {:.2})", from, to, signals.power_ratio);
    Some(StrategyTransition { from, to })
}

fn is_grouped(signals: &StrategySignals, config: &EconomyConfig) -> bool {
    let gathered = signals.committed_supply > 0.0
        && signals.grouped_supply > signals.committed_supply * config.rally_group_fraction;
    let topped_up = signals.grouped_energy_ratio >= config.rally_full_energy_ratio;
    let star_dry = signals.rally_star_energy < config.rally_star_depleted;
    gathered && (topped_up || star_dry)
}
