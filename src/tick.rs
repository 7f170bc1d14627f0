//! Per-tick driver
//!
//! [`run_tick`] is the single entry point the engine loop calls. [`Agent`]
//! wraps it with a [`MemoryStore`] so memory is loaded before and persisted
//! after every tick.

use serde::Serialize;

use crate::abilities::plan_abilities;
use crate::assessment::{assess, StrategyTransition, WorldContext};
use crate::core::config::TacticsConfig;
use crate::core::error::Result;
use crate::core::types::{Shape, Strategy, Tick};
use crate::energize::energize_all;
use crate::memory::{Memory, MemoryStore, BOT_VERSION};
use crate::movement::move_all;
use crate::orders::{TickOrders, UnitOrders};
use crate::roles::{self, RoleCounts, RoleRegister, RoleTargets};
use crate::world::{Snapshot, World};

/// Operator-facing digest of one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickSummary {
    pub tick: Tick,
    pub strategy: Strategy,
    pub transition: Option<StrategyTransition>,
    pub my_shape: Shape,
    pub enemy_shape: Shape,
    pub my_units: usize,
    pub enemy_units: usize,
    pub my_energy: f32,
    pub my_capacity: f32,
    pub enemy_energy: f32,
    pub enemy_capacity: f32,
    pub power_ratio: f32,
    pub threat: f32,
    /// Invaders in the near, med and far bands
    pub bands: (usize, usize, usize),
    pub roles: RoleCounts,
    pub targets: RoleTargets,
}

impl TickSummary {
    fn new(ctx: &WorldContext, register: &RoleRegister) -> Self {
        Self {
            tick: ctx.tick,
            strategy: ctx.strategy,
            transition: ctx.transition,
            my_shape: ctx.my_shape,
            enemy_shape: ctx.enemy_shape,
            my_units: ctx.mine.count,
            enemy_units: ctx.theirs.count,
            my_energy: ctx.mine.energy,
            my_capacity: ctx.mine.capacity,
            enemy_energy: ctx.theirs.energy,
            enemy_capacity: ctx.theirs.capacity,
            power_ratio: ctx.power_ratio,
            threat: ctx.invaders.threat,
            bands: ctx.invaders.counts(),
            roles: register.counts(),
            targets: register.targets,
        }
    }

    fn log(&self, me: &str) {
        let (near, med, far) = self.bands;
        tracing::info!(
            "{} [{}] tick {} strategy {} | units {} {} vs {} {} | energy {:.0}/{:.0} vs {:.0}/{:.0} | ratio {:.2} | threat {:.1} [{}/{}/{}]",
            me,
            BOT_VERSION,
            self.tick,
            self.strategy,
            self.my_units,
            self.my_shape,
            self.enemy_units,
            self.enemy_shape,
            self.my_energy,
            self.my_capacity,
            self.enemy_energy,
            self.enemy_capacity,
            self.power_ratio,
            self.threat,
            near,
            med,
            far
        );
        tracing::info!(
            "roles {} | targets defend={} scout={} workers={}",
            self.roles,
            self.targets.defenders,
            self.targets.scouts,
            self.targets.workers
        );
    }
}

/// Orders and digest produced by one tick
#[derive(Debug, Clone, Serialize)]
pub struct TickOutcome {
    pub orders: TickOrders,
    pub summary: TickSummary,
}

/// Run one decision tick on an engine snapshot
///
/// Phases, each seeing the effects of the previous ones:
/// 1. Build the working snapshot
/// 2. Assess the world and advance the strategy (updates `memory`)
/// 3. Rebalance roles
/// 4. Energize, largest units first, debiting the working snapshot
/// 5. Move, in input order, on the post-energize snapshot
/// 6. Merge/divide
pub fn run_tick(snapshot: Snapshot, memory: &mut Memory, config: &TacticsConfig) -> Result<TickOutcome> {
    let mut world = World::from_snapshot(snapshot)?;

    let ctx = assess(&world, memory, config);
    let register = roles::update(&mut world, &ctx, memory, config);

    let summary = TickSummary::new(&ctx, &register);
    summary.log(&world.me.0);

    let energize = energize_all(&mut world, &ctx, memory, config);
    let moves = move_all(&world, &ctx, memory, &register, config);
    let abilities = plan_abilities(&mut world, &ctx, config);

    let units = world
        .friendly
        .iter()
        .map(|&i| {
            let s = world.spirit(i);
            let mut orders = UnitOrders::new(s.id.clone(), s.mark);
            orders.energize = energize[i].clone();
            if let Some(decision) = &moves[i] {
                orders.move_to = decision.destination;
                orders.shout = decision.shout.clone();
            }
            orders.ability = abilities[i].clone();
            orders
        })
        .collect();

    Ok(TickOutcome {
        orders: TickOrders {
            tick: world.tick,
            strategy: ctx.strategy,
            units,
        },
        summary,
    })
}

/// A bot bound to a persistent store
pub struct Agent<S: MemoryStore> {
    store: S,
    config: TacticsConfig,
}

impl<S: MemoryStore> Agent<S> {
    pub fn new(store: S, config: TacticsConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &TacticsConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load memory, run one tick and persist the updated memory
    pub fn tick(&mut self, snapshot: Snapshot) -> Result<TickOutcome> {
        let blob = self.store.load(BOT_VERSION)?;
        let layout = World::from_snapshot(snapshot.clone())?;
        let mut memory = Memory::restore(blob.as_deref(), &layout, &self.config);

        let outcome = run_tick(snapshot, &mut memory, &self.config)?;
        self.store.save(BOT_VERSION, &memory.encode()?)?;
        Ok(outcome)
    }

    /// Memory as it will be seen by the next tick, if any was saved
    pub fn memory(&self) -> Result<Option<Memory>> {
        let Some(blob) = self.store.load(BOT_VERSION)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&blob)?))
    }
}
