//! Tick scheduler: one activation per living unit, in random order.
//!
//! The activation order is drawn once per tick from the registry as it
//! stands when the tick begins. Units spawned during the tick (projectiles)
//! are not part of it and first act on the next tick. A unit killed before
//! its slot comes up is skipped.

use crate::registry::{living_entity, UnitRegistry};
use crate::rng::SimRng;
use crate::systems::combat::combat_phase;
use crate::systems::movement::movement_phase;
use bevy_ecs::prelude::*;

/// Exclusive system that runs every unit's turn against the live world.
pub fn activation_system(world: &mut World) {
    let mut order = world.resource::<UnitRegistry>().ids().to_vec();
    world.resource_mut::<SimRng>().shuffle(&mut order);
    for id in order {
        if let Some(entity) = living_entity(world, id) {
            unit_turn(world, entity);
        }
    }
}

/// Combat phase, then movement phase.
pub fn unit_turn(world: &mut World, entity: Entity) {
    combat_phase(world, entity);
    movement_phase(world, entity);
}
