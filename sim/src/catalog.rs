//! Archetype templates.
//!
//! Each placement deep-copies the template for its archetype, so counters
//! such as the mortar reload or the medic heal cooldown are per unit.

use crate::components::*;
use serde::{Deserialize, Serialize};

/// Attribute template for one archetype.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitTemplate {
    pub max_health: f32,
    pub speed: u32,
    pub damage: f32,
    pub damage_range: i32,
    pub hit_chance: f64,
    /// Archetype variant with its initial per-unit state.
    pub archetype: Archetype,
}

impl UnitTemplate {
    pub fn stats(&self) -> CombatStats {
        CombatStats {
            speed: self.speed,
            damage: self.damage,
            damage_range: self.damage_range,
            hit_chance: self.hit_chance,
        }
    }
}

/// The four fixed archetype templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchetypeCatalog {
    pub infantry: UnitTemplate,
    pub medic: UnitTemplate,
    pub mortar: UnitTemplate,
    pub projectile: UnitTemplate,
}

impl ArchetypeCatalog {
    pub fn template(&self, kind: ArchetypeKind) -> &UnitTemplate {
        match kind {
            ArchetypeKind::Infantry => &self.infantry,
            ArchetypeKind::Medic => &self.medic,
            ArchetypeKind::Mortar => &self.mortar,
            ArchetypeKind::Projectile => &self.projectile,
        }
    }

    pub fn template_mut(&mut self, kind: ArchetypeKind) -> &mut UnitTemplate {
        match kind {
            ArchetypeKind::Infantry => &mut self.infantry,
            ArchetypeKind::Medic => &mut self.medic,
            ArchetypeKind::Mortar => &mut self.mortar,
            ArchetypeKind::Projectile => &mut self.projectile,
        }
    }
}

impl Default for ArchetypeCatalog {
    fn default() -> Self {
        Self {
            infantry: UnitTemplate {
                max_health: 100.0,
                speed: 1,
                damage: 10.0,
                damage_range: 6,
                hit_chance: 0.4,
                archetype: Archetype::Infantry,
            },
            medic: UnitTemplate {
                max_health: 70.0,
                speed: 1,
                damage: 5.0,
                damage_range: 3,
                hit_chance: 0.2,
                archetype: Archetype::Medic(MedicKit {
                    healing: 5.0,
                    healing_chance: 0.8,
                    healing_range: 1,
                    steps_after_healing: 0,
                }),
            },
            // Mortars never hit directly; they launch projectiles instead.
            mortar: UnitTemplate {
                max_health: 30.0,
                speed: 1,
                damage: 0.0,
                damage_range: 99,
                hit_chance: 0.0,
                archetype: Archetype::Mortar(MortarTube { steps_after_shot: 25 }),
            },
            projectile: UnitTemplate {
                max_health: 10.0,
                speed: 10,
                damage: 80.0,
                damage_range: 1,
                hit_chance: 0.05,
                archetype: Archetype::Projectile,
            },
        }
    }
}
