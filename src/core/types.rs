//! Core type definitions used throughout the codebase

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Simulation tick counter as reported by the engine
pub type Tick = u64;

/// Engine identifier of a spirit (e.g. `"alice_7"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[serde(transparent)]
pub struct SpiritId(pub String);

impl From<&str> for SpiritId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Engine identifier of a structure (base, star or outpost)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[serde(transparent)]
pub struct StructureId(pub String);

impl From<&str> for StructureId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Player identifier (account name on the platform)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Unit archetype chosen by a player at game start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Default)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    #[display(fmt = "circles")]
    Circles,
    #[display(fmt = "squares")]
    Squares,
    #[display(fmt = "triangles")]
    Triangles,
}

/// Behavioural tag carried by every friendly spirit between ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    #[display(fmt = "idle")]
    Idle,
    #[serde(alias = "harvest", alias = "deposit")]
    #[display(fmt = "haul")]
    Haul,
    #[display(fmt = "relay")]
    Relay,
    #[display(fmt = "attack")]
    Attack,
    #[display(fmt = "defend")]
    Defend,
    #[display(fmt = "scout")]
    Scout,
    #[serde(alias = "retreat")]
    #[display(fmt = "refuel")]
    Refuel,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Idle,
        Role::Haul,
        Role::Relay,
        Role::Attack,
        Role::Defend,
        Role::Scout,
        Role::Refuel,
    ];

    /// Stable index used by the role register
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_worker(self) -> bool {
        matches!(self, Role::Haul | Role::Relay)
    }

    /// Roles that are pulled back to refuel when energy runs low
    pub fn is_refuelable(self) -> bool {
        matches!(self, Role::Idle | Role::Attack | Role::Defend | Role::Scout)
    }

    /// Ally-support priority: combat > refuelling/idle > worker
    pub fn support_priority(self) -> u8 {
        match self {
            Role::Attack | Role::Defend | Role::Scout => 2,
            Role::Idle | Role::Refuel => 1,
            Role::Haul | Role::Relay => 0,
        }
    }
}

/// Macro strategy state persisted across ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Harvest, defend and scout
    #[default]
    #[display(fmt = "economic")]
    Economic,
    /// Mass attackers at the rally point while keeping defenders home
    #[display(fmt = "rally")]
    Rally,
    /// Commit every non-defender to the enemy base
    #[display(fmt = "all-in")]
    AllIn,
    /// Commit every non-defender to recapturing the outpost
    #[display(fmt = "retake")]
    Retake,
}

impl Strategy {
    /// Strategies in which every non-defender carries the attack role
    pub fn is_attacking(self) -> bool {
        matches!(self, Strategy::Rally | Strategy::AllIn | Strategy::Retake)
    }
}
