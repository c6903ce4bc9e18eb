//! ECS Components for the battle simulation.
//!
//! Components are pure data containers attached to unit entities.
//! All behavior lives in the systems that operate on them.

use crate::error::SimError;
use crate::spatial::Cell;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// IDENTITY COMPONENTS
// ============================================================================

/// Run-wide unit identifier. Allocated by the registry, never reused.
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Side of the battle a unit fights for.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fraction {
    Ally,
    Enemy,
}

impl Fraction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Fraction::Ally => "ally",
            Fraction::Enemy => "enemy",
        }
    }
}

// ============================================================================
// ARCHETYPE COMPONENTS
// ============================================================================

/// Behavioral class of a unit, without any per-unit state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchetypeKind {
    Infantry,
    Medic,
    Mortar,
    Projectile,
}

impl ArchetypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchetypeKind::Infantry => "infantry",
            ArchetypeKind::Medic => "medic",
            ArchetypeKind::Mortar => "mortar",
            ArchetypeKind::Projectile => "projectile",
        }
    }
}

impl FromStr for ArchetypeKind {
    type Err = SimError;

    /// Accepts the plain names plus caliber-qualified projectile names
    /// such as `projectile_120mm`.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "infantry" => Ok(ArchetypeKind::Infantry),
            "medic" => Ok(ArchetypeKind::Medic),
            "mortar" => Ok(ArchetypeKind::Mortar),
            "projectile" | "projectile_120mm" => Ok(ArchetypeKind::Projectile),
            other => Err(SimError::UnknownArchetype(other.to_string())),
        }
    }
}

/// Medic-only parameters and heal cooldown counter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MedicKit {
    /// Health restored by a successful heal.
    pub healing: f32,
    /// Probability that a heal attempt succeeds.
    pub healing_chance: f64,
    /// Chebyshev radius scanned for wounded allies.
    pub healing_range: i32,
    /// Ticks since the last heal.
    pub steps_after_healing: u32,
}

/// Mortar-only reload counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MortarTube {
    /// Engagements since the last launch. Fires once it reaches the
    /// configured reload threshold.
    pub steps_after_shot: u32,
}

/// Archetype with the state only that archetype carries.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Archetype {
    Infantry,
    Medic(MedicKit),
    Mortar(MortarTube),
    Projectile,
}

impl Archetype {
    pub fn kind(&self) -> ArchetypeKind {
        match self {
            Archetype::Infantry => ArchetypeKind::Infantry,
            Archetype::Medic(_) => ArchetypeKind::Medic,
            Archetype::Mortar(_) => ArchetypeKind::Mortar,
            Archetype::Projectile => ArchetypeKind::Projectile,
        }
    }

    pub fn is_projectile(&self) -> bool {
        matches!(self, Archetype::Projectile)
    }
}

// ============================================================================
// COMBAT COMPONENTS
// ============================================================================

/// Condition of a unit. `Dead` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Alive,
    Wounded,
    Dead,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Alive => "alive",
            Status::Wounded => "wounded",
            Status::Dead => "dead",
        }
    }
}

/// Health pool together with the status it drives.
///
/// Invariant: `0 <= current <= max`, and once `status` is `Dead` neither
/// field changes again.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
    pub status: Status,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            max,
            status: Status::Alive,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.status == Status::Dead
    }

    pub fn is_wounded(&self) -> bool {
        self.status == Status::Wounded
    }

    /// Apply an incoming hit. The unit is marked wounded even when `amount`
    /// is zero; a negative amount raises health, capped at `max`.
    pub fn take_hit(&mut self, amount: f32) {
        if self.is_dead() {
            return;
        }
        self.current = (self.current - amount).min(self.max);
        self.status = Status::Wounded;
        if self.current <= 0.0 {
            self.kill();
        }
    }

    /// Apply environmental damage. Status only changes when it is lethal.
    pub fn damage(&mut self, amount: f32) {
        if self.is_dead() {
            return;
        }
        self.current = (self.current - amount).min(self.max);
        if self.current <= 0.0 {
            self.kill();
        }
    }

    /// Restore health, capped at `max`. A unit restored to full health is
    /// alive again; a partially healed one stays wounded.
    pub fn heal(&mut self, amount: f32) {
        if self.is_dead() {
            return;
        }
        self.current += amount;
        if amount > 0.0 && self.current >= self.max {
            self.current = self.max;
            self.status = Status::Alive;
        }
    }

    pub fn kill(&mut self) {
        self.current = 0.0;
        self.status = Status::Dead;
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// Per-unit attack and movement attributes copied from the catalog.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    /// Micro-moves attempted per turn.
    pub speed: u32,
    /// Damage dealt by a successful direct hit on level ground.
    pub damage: f32,
    /// Chebyshev engagement radius.
    pub damage_range: i32,
    /// Probability that a direct attack connects.
    pub hit_chance: f64,
}

/// Ticks elapsed since the unit last attacked.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cooldown {
    pub steps_after_attack: u32,
}

/// Remembered opponent and patient.
///
/// Both are lookups by id only: the referent may have died since it was
/// stored, so every use re-checks it through the registry.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub target: Option<UnitId>,
    pub heal_target: Option<UnitId>,
}

/// Cumulative totals reported in the per-unit statistics.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleRecord {
    pub damage_dealt: f32,
    pub healing_done: f32,
}

// ============================================================================
// MOVEMENT COMPONENTS
// ============================================================================

/// How a unit spends its micro-moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementMode {
    /// Step to a random adjacent cell.
    Random,
    /// Hold position.
    #[default]
    #[serde(alias = "stop")]
    Stay,
    /// Walk the waypoint list in order.
    Route,
}

/// Movement mode plus route progress.
#[derive(Component, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub mode: MovementMode,
    pub route: Vec<Cell>,
    /// Index of the waypoint currently being approached.
    pub cursor: usize,
}

impl Movement {
    pub fn new(mode: MovementMode, route: Vec<Cell>) -> Self {
        Self {
            mode,
            route,
            cursor: 0,
        }
    }

    pub fn current_waypoint(&self) -> Option<Cell> {
        self.route.get(self.cursor).copied()
    }

    pub fn final_waypoint(&self) -> Option<Cell> {
        self.route.last().copied()
    }
}

// ============================================================================
// BUNDLE HELPERS
// ============================================================================

/// Bundle for spawning a complete unit entity.
#[derive(Bundle)]
pub struct UnitBundle {
    pub id: UnitId,
    pub fraction: Fraction,
    pub archetype: Archetype,
    pub health: Health,
    pub stats: CombatStats,
    pub movement: Movement,
    pub cooldown: Cooldown,
    pub engagement: Engagement,
    pub record: BattleRecord,
}
