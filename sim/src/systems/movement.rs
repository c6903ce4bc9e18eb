//! Movement phase: micro-moves, cooldown gating and hazard triggers.
//!
//! A unit gets `speed` micro-moves per turn. Every micro-move first checks
//! the cooldowns: a medic still waiting to heal, or any non-projectile that
//! attacked recently, spends the micro-move ticking its counters instead of
//! moving.

use crate::components::*;
use crate::config::BattleConfig;
use crate::hazard::HazardField;
use crate::rng::SimRng;
use crate::spatial::{BattleGrid, Cell};
use crate::systems::combat::{attack, is_dead, Actor};
use bevy_ecs::prelude::*;
use tracing::debug;

/// Outcome of a single micro-move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// The unit is finished for this turn.
    Halt,
}

/// Spend the unit's micro-moves for this turn.
pub fn movement_phase(world: &mut World, entity: Entity) {
    let speed = world.get::<CombatStats>(entity).map_or(0, |stats| stats.speed);
    for _ in 0..speed {
        if is_dead(world, entity) || move_once(world, entity) == Step::Halt {
            break;
        }
    }
}

/// One step along each axis toward `waypoint`.
pub fn step_toward((x, y): Cell, (wx, wy): Cell) -> Cell {
    (x + (wx - x).signum(), y + (wy - y).signum())
}

/// Tick the cooldown counters. Returns `true` if the unit is held in place.
fn held_by_cooldown(world: &mut World, entity: Entity, kind: ArchetypeKind) -> bool {
    let (attack_cooldown, heal_cooldown) = {
        let config = world.resource::<BattleConfig>();
        (config.attack_cooldown, config.heal_cooldown)
    };

    let medic_waiting = match world.get_mut::<Archetype>(entity) {
        Some(mut archetype) => match &mut *archetype {
            Archetype::Medic(kit) if kit.steps_after_healing < heal_cooldown => {
                kit.steps_after_healing += 1;
                true
            }
            _ => false,
        },
        None => false,
    };

    let Some(mut cooldown) = world.get_mut::<Cooldown>(entity) else {
        return medic_waiting;
    };
    if medic_waiting {
        cooldown.steps_after_attack += 1;
        return true;
    }
    if kind != ArchetypeKind::Projectile && cooldown.steps_after_attack < attack_cooldown {
        cooldown.steps_after_attack += 1;
        return true;
    }
    false
}

/// Perform a single micro-move.
pub fn move_once(world: &mut World, entity: Entity) -> Step {
    let Some(me) = Actor::load(world, entity) else {
        return Step::Halt;
    };
    if held_by_cooldown(world, entity, me.kind) {
        return Step::Continue;
    }
    let Some(mode) = world.get::<Movement>(entity).map(|movement| movement.mode) else {
        return Step::Halt;
    };

    let destination = match mode {
        MovementMode::Stay => None,
        MovementMode::Random => {
            let options = world.resource::<BattleGrid>().neighborhood(me.cell, 1, false);
            world.resource_mut::<SimRng>().choose(&options).copied()
        }
        MovementMode::Route => follow_route(world, entity, me.cell),
    };

    let mut cell = me.cell;
    if let Some(next) = destination.filter(|&next| next != me.cell) {
        if world.resource_mut::<BattleGrid>().move_to(me.id, next) {
            cell = next;
            if me.kind != ArchetypeKind::Projectile {
                trigger_hazard(world, &me, cell);
            }
        }
    }

    if me.kind == ArchetypeKind::Projectile && mode == MovementMode::Route {
        let at_impact = world
            .get::<Movement>(entity)
            .and_then(Movement::final_waypoint)
            == Some(cell);
        if at_impact {
            attack(world, entity);
            if let Some(mut health) = world.get_mut::<Health>(entity) {
                health.kill();
            }
            debug!(projectile = %me.id, impact = ?cell, "Projectile detonated");
            return Step::Halt;
        }
    }
    Step::Continue
}

/// Step toward the current waypoint, advancing the cursor on arrival.
fn follow_route(world: &mut World, entity: Entity, from: Cell) -> Option<Cell> {
    let mut movement = world.get_mut::<Movement>(entity)?;
    let waypoint = movement.current_waypoint()?;
    let next = step_toward(from, waypoint);
    if next == waypoint {
        movement.cursor += 1;
    }
    Some(next)
}

fn trigger_hazard(world: &mut World, me: &Actor, cell: Cell) {
    if !world.resource_mut::<HazardField>().trigger(cell) {
        return;
    }
    let damage = world.resource::<BattleConfig>().hazard_damage;
    let Some(mut health) = world.get_mut::<Health>(me.entity) else {
        return;
    };
    health.damage(damage);
    debug!(unit = %me.id, ?cell, killed = health.is_dead(), "Hazard triggered");
}
