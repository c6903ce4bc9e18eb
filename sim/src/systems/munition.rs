//! Mortar reload and projectile launch.
//!
//! Mortars never hit anything directly. Each engagement advances the
//! reload counter; once it reaches the threshold the next engagement
//! launches a projectile from the mortar's own cell toward the target's
//! current cell. The projectile is an ordinary unit, registered with its
//! own id, and first acts on the following tick.

use crate::components::*;
use crate::config::BattleConfig;
use crate::registry::{spawn_batch, UnitBatch};
use crate::spatial::BattleGrid;
use crate::systems::combat::Actor;
use bevy_ecs::prelude::*;
use tracing::{debug, warn};

/// Advance the reload counter, or launch when it is full.
pub fn fire_mortar(world: &mut World, mortar: &Actor, target: Entity) {
    let threshold = world.resource::<BattleConfig>().reload_threshold;
    let ready = {
        let Some(mut archetype) = world.get_mut::<Archetype>(mortar.entity) else {
            return;
        };
        let Archetype::Mortar(tube) = &mut *archetype else {
            return;
        };
        if tube.steps_after_shot < threshold {
            tube.steps_after_shot += 1;
            false
        } else {
            tube.steps_after_shot = 0;
            true
        }
    };
    if !ready {
        return;
    }

    let Some(target_id) = world.get::<UnitId>(target).copied() else {
        return;
    };
    let Some(impact) = world.resource::<BattleGrid>().position_of(target_id) else {
        return;
    };

    let shell = UnitBatch {
        count: 1,
        kind: ArchetypeKind::Projectile,
        fraction: mortar.fraction,
        movement: MovementMode::Route,
        route: vec![mortar.cell, impact],
        position: Some(mortar.cell),
    };
    match spawn_batch(world, &shell) {
        Ok(ids) => debug!(
            mortar = %mortar.id,
            target = %target_id,
            projectile = ?ids.first(),
            ?impact,
            "Projectile launched"
        ),
        Err(err) => warn!(mortar = %mortar.id, %err, "Projectile launch failed"),
    }

    if let Some(mut cooldown) = world.get_mut::<Cooldown>(mortar.entity) {
        cooldown.steps_after_attack = 0;
    }
}
