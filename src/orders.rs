//! Per-unit commands issued back to the engine

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::abilities::Ability;
use crate::core::types::{Role, SpiritId, Strategy, Tick};
use crate::world::EnergizeTarget;

/// Everything one friendly unit is told to do this tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitOrders {
    pub id: SpiritId,
    /// Role tag written back to the unit's mark
    pub mark: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_to: Option<Vec2>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energize: Option<EnergizeTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ability: Option<Ability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shout: Option<String>,
}

impl UnitOrders {
    pub fn new(id: SpiritId, mark: Role) -> Self {
        Self {
            id,
            mark,
            move_to: None,
            energize: None,
            ability: None,
            shout: None,
        }
    }
}

/// Orders for every living friendly unit, in input order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickOrders {
    pub tick: Tick,
    pub strategy: Strategy,
    pub units: Vec<UnitOrders>,
}

impl TickOrders {
    pub fn get(&self, id: &SpiritId) -> Option<&UnitOrders> {
        self.units.iter().find(|o| &o.id == id)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
