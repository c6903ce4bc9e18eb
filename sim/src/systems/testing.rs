//! Helpers for building small battle worlds in unit tests.

use crate::components::*;
use crate::config::BattleConfig;
use crate::hazard::HazardField;
use crate::registry::{spawn_batch, UnitBatch, UnitRegistry};
use crate::rng::SimRng;
use crate::spatial::{BattleGrid, Cell};
use crate::systems::stats::BattleStats;
use crate::terrain::TerrainGrid;
use bevy_ecs::prelude::*;

/// Flat, hazard-free world of the given size.
pub fn battle_world(width: i32, height: i32, tweak: impl FnOnce(&mut BattleConfig)) -> World {
    let mut config = BattleConfig::with_size(width, height).with_seed(7);
    tweak(&mut config);
    let mut world = World::new();
    world.insert_resource(BattleGrid::new(width, height));
    world.insert_resource(TerrainGrid::flat(width, height, 0.0));
    world.insert_resource(HazardField::new());
    world.insert_resource(UnitRegistry::new());
    world.insert_resource(SimRng::from_seed(config.seed));
    world.insert_resource(BattleStats::default());
    world.insert_resource(config);
    world
}

pub fn spawn(world: &mut World, archetype: &str, fraction: Fraction, cell: Cell) -> Entity {
    spawn_with(world, archetype, fraction, cell, MovementMode::Stay, Vec::new())
}

pub fn spawn_routed(
    world: &mut World,
    archetype: &str,
    fraction: Fraction,
    cell: Cell,
    route: Vec<Cell>,
) -> Entity {
    spawn_with(world, archetype, fraction, cell, MovementMode::Route, route)
}

fn spawn_with(
    world: &mut World,
    archetype: &str,
    fraction: Fraction,
    cell: Cell,
    movement: MovementMode,
    route: Vec<Cell>,
) -> Entity {
    let batch = UnitBatch {
        count: 1,
        kind: archetype.parse().unwrap(),
        fraction,
        movement,
        route,
        position: Some(cell),
    };
    let ids = spawn_batch(world, &batch).unwrap();
    world.resource::<UnitRegistry>().entity(ids[0]).unwrap()
}
