//! Unit registry: id allocation and id-to-entity lookup.
//!
//! Ids are handed out in batches. Each batch takes `count` consecutive ids
//! and then skips one, so a run's ids are strictly increasing but not
//! dense (`1..=3`, then `5..`, ...). Skipped ids are never used.

use crate::components::*;
use crate::config::BattleConfig;
use crate::error::{SimError, SimResult};
use crate::rng::SimRng;
use crate::spatial::{BattleGrid, Cell};
use bevy_ecs::prelude::*;
use std::collections::HashMap;
use tracing::debug;

/// Owns the id counter and remembers every unit ever registered.
#[derive(Resource, Debug, Default)]
pub struct UnitRegistry {
    /// Highest id reserved so far, including the skipped one.
    max_id: u32,
    /// Registration order.
    order: Vec<UnitId>,
    entities: HashMap<UnitId, Entity>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve ids for a batch of `count` units.
    pub fn allocate(&mut self, count: u32) -> Vec<UnitId> {
        let first = self.max_id + 1;
        let ids = (first..first + count).map(UnitId).collect();
        self.max_id += count + 1;
        ids
    }

    pub fn register(&mut self, id: UnitId, entity: Entity) {
        if self.entities.insert(id, entity).is_none() {
            self.order.push(id);
        }
    }

    pub fn entity(&self, id: UnitId) -> Option<Entity> {
        self.entities.get(&id).copied()
    }

    /// Every registered id, in registration order.
    pub fn ids(&self) -> &[UnitId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn max_id(&self) -> u32 {
        self.max_id
    }
}

/// A fully resolved placement request.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitBatch {
    pub count: u32,
    pub kind: ArchetypeKind,
    pub fraction: Fraction,
    pub movement: MovementMode,
    pub route: Vec<Cell>,
    /// `None` scatters each unit on a uniformly random cell.
    pub position: Option<Cell>,
}

impl UnitBatch {
    /// Check the position and every waypoint against the grid. Random
    /// placement needs at least one cell.
    pub fn validate(&self, grid: &BattleGrid) -> SimResult<()> {
        match self.position {
            Some(cell) => grid.check_bounds(cell)?,
            None if self.count > 0 && (grid.width() == 0 || grid.height() == 0) => {
                return Err(SimError::EmptyGrid {
                    width: grid.width(),
                    height: grid.height(),
                });
            }
            None => {}
        }
        for &waypoint in &self.route {
            grid.check_bounds(waypoint)?;
        }
        Ok(())
    }
}

/// Spawn a batch of units into the world and onto the grid.
///
/// Each unit receives its own copy of the archetype template. Returns the
/// ids assigned, in order.
pub fn spawn_batch(world: &mut World, batch: &UnitBatch) -> SimResult<Vec<UnitId>> {
    batch.validate(world.resource::<BattleGrid>())?;

    let template = *world.resource::<BattleConfig>().catalog.template(batch.kind);
    let ids = world.resource_mut::<UnitRegistry>().allocate(batch.count);

    for &id in &ids {
        let cell = match batch.position {
            Some(cell) => cell,
            None => {
                let (width, height) = {
                    let grid = world.resource::<BattleGrid>();
                    (grid.width(), grid.height())
                };
                let mut rng = world.resource_mut::<SimRng>();
                let x = rng.below(width);
                let y = rng.below(height);
                (x, y)
            }
        };

        world.resource_mut::<BattleGrid>().place(id, cell)?;
        let entity = world
            .spawn(UnitBundle {
                id,
                fraction: batch.fraction,
                archetype: template.archetype,
                health: Health::new(template.max_health),
                stats: template.stats(),
                movement: Movement::new(batch.movement, batch.route.clone()),
                cooldown: Cooldown::default(),
                engagement: Engagement::default(),
                record: BattleRecord::default(),
            })
            .id();
        world.resource_mut::<UnitRegistry>().register(id, entity);
    }

    debug!(
        count = batch.count,
        kind = batch.kind.as_str(),
        fraction = batch.fraction.as_str(),
        first_id = ?ids.first(),
        "Placed batch"
    );
    Ok(ids)
}

/// Resolve a unit id to its entity if it is registered and not dead.
pub fn living_entity(world: &World, id: UnitId) -> Option<Entity> {
    let entity = world.resource::<UnitRegistry>().entity(id)?;
    match world.get::<Health>(entity) {
        Some(health) if !health.is_dead() => Some(entity),
        _ => None,
    }
}
