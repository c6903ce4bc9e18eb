//! Combat resolver - target acquisition, direct attacks and healing.
//!
//! Units act one at a time against the live world, so a unit killed earlier
//! in a tick is already invisible to the scans of later units.
//!
//! ## Target acquisition
//!
//! A remembered target that is still alive is re-engaged without a range
//! check. Otherwise the unit scans its Chebyshev neighborhood cell by cell;
//! in each cell the occupants are shuffled and the first eligible one is
//! engaged. Every cell in range gets its own engagement, so a unit without
//! a sticky target may strike several cells in one turn.

use crate::components::*;
use crate::config::BattleConfig;
use crate::registry::{living_entity, UnitRegistry};
use crate::rng::SimRng;
use crate::spatial::{BattleGrid, Cell};
use crate::systems::munition::fire_mortar;
use crate::terrain::TerrainGrid;
use bevy_ecs::prelude::*;
use tracing::debug;

/// The acting unit's identity and location at the start of an action.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub entity: Entity,
    pub id: UnitId,
    pub fraction: Fraction,
    pub kind: ArchetypeKind,
    pub cell: Cell,
}

impl Actor {
    pub fn load(world: &World, entity: Entity) -> Option<Self> {
        let id = *world.get::<UnitId>(entity)?;
        Some(Self {
            entity,
            id,
            fraction: *world.get::<Fraction>(entity)?,
            kind: world.get::<Archetype>(entity)?.kind(),
            cell: world.resource::<BattleGrid>().position_of(id)?,
        })
    }
}

pub(crate) fn is_dead(world: &World, entity: Entity) -> bool {
    world.get::<Health>(entity).map_or(true, Health::is_dead)
}

/// Opposing, living, non-projectile unit.
fn is_hostile(world: &World, candidate: Entity, fraction: Fraction) -> bool {
    let Some(&other) = world.get::<Fraction>(candidate) else {
        return false;
    };
    other != fraction
        && !is_dead(world, candidate)
        && !world.get::<Archetype>(candidate).map_or(true, Archetype::is_projectile)
}

/// Wounded, non-projectile ally other than the medic itself.
fn is_patient(world: &World, candidate: Entity, medic: &Actor) -> bool {
    candidate != medic.entity
        && world.get::<Fraction>(candidate) == Some(&medic.fraction)
        && world.get::<Health>(candidate).map_or(false, Health::is_wounded)
        && !world.get::<Archetype>(candidate).map_or(true, Archetype::is_projectile)
}

/// Shuffle the occupants of `cell` and return the first one accepted by
/// `eligible`.
fn pick_in_cell(
    world: &mut World,
    cell: Cell,
    eligible: impl Fn(&World, Entity) -> bool,
) -> Option<Entity> {
    let mut occupants = world.resource::<BattleGrid>().occupants_at(cell).to_vec();
    if occupants.is_empty() {
        return None;
    }
    world.resource_mut::<SimRng>().shuffle(&mut occupants);
    let registry = world.resource::<UnitRegistry>();
    occupants
        .into_iter()
        .filter_map(|id| registry.entity(id))
        .find(|&candidate| eligible(world, candidate))
}

/// Combat phase of a turn. Medics try to heal first and fall back to
/// attacking when no heal happened; everyone else attacks.
pub fn combat_phase(world: &mut World, entity: Entity) {
    if is_dead(world, entity) {
        return;
    }
    let is_medic = matches!(world.get::<Archetype>(entity), Some(Archetype::Medic(_)));
    if is_medic && heal(world, entity) {
        return;
    }
    attack(world, entity);
}

/// Attack the sticky target, or scan for new ones.
pub fn attack(world: &mut World, entity: Entity) {
    let Some(me) = Actor::load(world, entity) else {
        return;
    };

    let sticky = world
        .get::<Engagement>(entity)
        .and_then(|engagement| engagement.target)
        .and_then(|id| living_entity(world, id));
    if let Some(target) = sticky {
        engage(world, &me, target);
        return;
    }

    let Some(range) = world.get::<CombatStats>(entity).map(|stats| stats.damage_range) else {
        return;
    };
    let cells = world.resource::<BattleGrid>().neighborhood(me.cell, range, true);
    for cell in cells {
        // A projectile is spent after its single attack.
        if is_dead(world, entity) {
            break;
        }
        if let Some(target) = pick_in_cell(world, cell, |w, c| is_hostile(w, c, me.fraction)) {
            engage(world, &me, target);
            // One reload step or launch per attack phase.
            if me.kind == ArchetypeKind::Mortar {
                break;
            }
        }
    }
}

fn engage(world: &mut World, me: &Actor, target: Entity) {
    match me.kind {
        ArchetypeKind::Mortar => fire_mortar(world, me, target),
        _ => resolve_attack(world, me, target),
    }
}

/// Direct attack: roll to hit, scale by elevation difference, apply.
pub fn resolve_attack(world: &mut World, me: &Actor, target: Entity) {
    if me.kind == ArchetypeKind::Projectile {
        let at_impact = world
            .get::<Movement>(me.entity)
            .and_then(Movement::final_waypoint)
            == Some(me.cell);
        if !at_impact {
            return;
        }
    }

    let Some(stats) = world.get::<CombatStats>(me.entity).copied() else {
        return;
    };
    let Some(target_id) = world.get::<UnitId>(target).copied() else {
        return;
    };
    let Some(target_cell) = world.resource::<BattleGrid>().position_of(target_id) else {
        return;
    };

    let hit = world.resource_mut::<SimRng>().roll(stats.hit_chance);
    let elevation_factor = world.resource::<BattleConfig>().elevation_factor;
    let terrain = world.resource::<TerrainGrid>();
    // Unclamped: a hit from far enough below can turn negative.
    let modifier =
        1.0 + elevation_factor * (terrain.elevation_at(me.cell) - terrain.elevation_at(target_cell));
    let amount = if hit { stats.damage * modifier } else { 0.0 };

    if let Some(mut health) = world.get_mut::<Health>(target) {
        health.take_hit(amount);
        if health.is_dead() {
            debug!(attacker = %me.id, target = %target_id, "Unit killed");
        }
    }
    if let Some(mut record) = world.get_mut::<BattleRecord>(me.entity) {
        record.damage_dealt += amount;
    }
    if me.kind == ArchetypeKind::Projectile {
        if let Some(mut health) = world.get_mut::<Health>(me.entity) {
            health.kill();
        }
    }
    if let Some(mut cooldown) = world.get_mut::<Cooldown>(me.entity) {
        cooldown.steps_after_attack = 0;
    }
    if let Some(mut engagement) = world.get_mut::<Engagement>(me.entity) {
        engagement.target = Some(target_id);
    }
}

/// Medic heal action. Returns `true` when a heal was attempted.
///
/// The sticky patient is treated regardless of cooldown. Otherwise a new
/// scan only happens once the heal cooldown has elapsed; until then the
/// counter ticks up and the medic is free to attack instead.
pub fn heal(world: &mut World, entity: Entity) -> bool {
    let Some(me) = Actor::load(world, entity) else {
        return false;
    };
    let Some(&Archetype::Medic(kit)) = world.get::<Archetype>(entity) else {
        return false;
    };

    let sticky = world
        .get::<Engagement>(entity)
        .and_then(|engagement| engagement.heal_target)
        .and_then(|id| living_entity(world, id));
    if let Some(patient) = sticky {
        apply_heal(world, &me, &kit, patient);
        return true;
    }

    let heal_cooldown = world.resource::<BattleConfig>().heal_cooldown;
    if kit.steps_after_healing < heal_cooldown {
        if let Some(mut archetype) = world.get_mut::<Archetype>(entity) {
            if let Archetype::Medic(kit) = &mut *archetype {
                kit.steps_after_healing += 1;
            }
        }
        return false;
    }

    let cells = world
        .resource::<BattleGrid>()
        .neighborhood(me.cell, kit.healing_range, true);
    for cell in cells {
        if let Some(patient) = pick_in_cell(world, cell, |w, c| is_patient(w, c, &me)) {
            apply_heal(world, &me, &kit, patient);
            return true;
        }
    }
    false
}

fn apply_heal(world: &mut World, me: &Actor, kit: &MedicKit, patient: Entity) {
    let Some(patient_id) = world.get::<UnitId>(patient).copied() else {
        return;
    };
    let success = world.resource_mut::<SimRng>().roll(kit.healing_chance);
    let amount = if success { kit.healing } else { 0.0 };

    if let Some(mut health) = world.get_mut::<Health>(patient) {
        health.heal(amount);
    }
    if let Some(mut record) = world.get_mut::<BattleRecord>(me.entity) {
        record.healing_done += amount;
    }
    if let Some(mut archetype) = world.get_mut::<Archetype>(me.entity) {
        if let Archetype::Medic(kit) = &mut *archetype {
            kit.steps_after_healing = 0;
        }
    }
    if let Some(mut engagement) = world.get_mut::<Engagement>(me.entity) {
        engagement.heal_target = Some(patient_id);
    }
}
