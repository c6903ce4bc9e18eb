//! Snapshot types.
//!
//! `BattleSnapshot` is a serializable view of the whole battle at a tick
//! boundary, suitable for handing to a visualizer or writing to disk.

use crate::components::*;
use crate::hazard::HazardField;
use crate::registry::UnitRegistry;
use crate::spatial::BattleGrid;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Snapshot of a single unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: u32,
    pub fraction: Fraction,
    pub archetype: ArchetypeKind,
    pub status: Status,
    pub x: i32,
    pub y: i32,
    pub health: f32,
    pub health_max: f32,
    pub damage_dealt: f32,
    pub healing_done: f32,
    pub movement: MovementMode,
}

/// Remaining hazards on one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardSnapshot {
    pub x: i32,
    pub y: i32,
    pub count: u32,
}

/// Complete battle state at a tick boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    /// Ticks completed so far.
    pub tick: u64,
    pub width: i32,
    pub height: i32,
    /// Every registered unit, dead ones included, in registration order.
    pub units: Vec<UnitSnapshot>,
    /// Non-empty hazard cells in coordinate order.
    pub hazards: Vec<HazardSnapshot>,
}

impl BattleSnapshot {
    /// Create a snapshot from the ECS world.
    pub fn from_world(world: &mut World, tick: u64) -> Self {
        let mut query = world.query::<(
            &UnitId,
            &Fraction,
            &Archetype,
            &Health,
            &BattleRecord,
            &Movement,
        )>();

        let registry = world.resource::<UnitRegistry>();
        let grid = world.resource::<BattleGrid>();
        let mut units = Vec::with_capacity(registry.len());
        for &id in registry.ids() {
            let Some(entity) = registry.entity(id) else {
                continue;
            };
            let Ok((_, fraction, archetype, health, record, movement)) = query.get(world, entity)
            else {
                continue;
            };
            let (x, y) = grid.position_of(id).unwrap_or((-1, -1));
            units.push(UnitSnapshot {
                id: id.0,
                fraction: *fraction,
                archetype: archetype.kind(),
                status: health.status,
                x,
                y,
                health: health.current,
                health_max: health.max,
                damage_dealt: record.damage_dealt,
                healing_done: record.healing_done,
                movement: movement.mode,
            });
        }

        let hazards = world
            .resource::<HazardField>()
            .iter()
            .map(|((x, y), count)| HazardSnapshot { x, y, count })
            .collect();

        Self {
            tick,
            width: grid.width(),
            height: grid.height(),
            units,
            hazards,
        }
    }

    pub fn unit(&self, id: UnitId) -> Option<&UnitSnapshot> {
        self.units.iter().find(|unit| unit.id == id.0)
    }
}
