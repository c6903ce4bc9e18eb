//! Per-tick statistics.
//!
//! The stats system runs at the start of every tick, before any unit acts,
//! so row `n` of the history describes the world as tick `n` found it.

use crate::components::*;
use crate::registry::UnitRegistry;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Living non-projectile units and their summed health, per side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ForceTotals {
    pub alive_allies: u32,
    pub alive_enemies: u32,
    pub allies_health: f32,
    pub enemies_health: f32,
}

impl ForceTotals {
    /// Sum up a census. Dead units and projectiles do not count.
    pub fn tally<'a>(units: impl IntoIterator<Item = &'a UnitRecord>) -> Self {
        let mut totals = Self::default();
        for unit in units {
            if unit.status == Status::Dead || unit.archetype == ArchetypeKind::Projectile {
                continue;
            }
            match unit.fraction {
                Fraction::Ally => {
                    totals.alive_allies += 1;
                    totals.allies_health += unit.health;
                }
                Fraction::Enemy => {
                    totals.alive_enemies += 1;
                    totals.enemies_health += unit.health;
                }
            }
        }
        totals
    }

    /// One side has no living units left.
    pub fn is_decided(&self) -> bool {
        self.alive_allies == 0 || self.alive_enemies == 0
    }
}

/// One unit's row in the per-tick table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub id: UnitId,
    pub fraction: Fraction,
    pub archetype: ArchetypeKind,
    pub status: Status,
    pub health: f32,
    pub damage_dealt: f32,
    pub healing_done: f32,
}

impl UnitRecord {
    pub fn new(
        id: UnitId,
        fraction: Fraction,
        archetype: &Archetype,
        health: &Health,
        record: &BattleRecord,
    ) -> Self {
        Self {
            id,
            fraction,
            archetype: archetype.kind(),
            status: health.status,
            health: health.current,
            damage_dealt: record.damage_dealt,
            healing_done: record.healing_done,
        }
    }
}

/// Recorded history, one entry per completed stats pass.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleStats {
    totals: Vec<ForceTotals>,
    units: Vec<Vec<UnitRecord>>,
}

impl BattleStats {
    pub fn record(&mut self, totals: ForceTotals, units: Vec<UnitRecord>) {
        self.totals.push(totals);
        self.units.push(units);
    }

    pub fn latest(&self) -> Option<&ForceTotals> {
        self.totals.last()
    }

    /// Unit table of the most recent row; empty before the first tick.
    pub fn latest_units(&self) -> &[UnitRecord] {
        self.units.last().map_or(&[], Vec::as_slice)
    }

    pub fn totals(&self) -> &[ForceTotals] {
        &self.totals
    }

    pub fn unit_history(&self) -> &[Vec<UnitRecord>] {
        &self.units
    }

    pub fn rows(&self) -> usize {
        self.totals.len()
    }

    /// `false` until at least one row exists.
    pub fn is_decided(&self) -> bool {
        self.latest().is_some_and(ForceTotals::is_decided)
    }

    /// Summary of the last recorded row; all zeros before the first tick.
    pub fn final_stats(&self) -> FinalStats {
        self.latest().copied().map(FinalStats::from).unwrap_or_default()
    }
}

/// End-of-battle summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FinalStats {
    pub allies_alive: u32,
    pub enemies_alive: u32,
    pub allies_health: f32,
    pub enemies_health: f32,
}

impl From<ForceTotals> for FinalStats {
    fn from(totals: ForceTotals) -> Self {
        Self {
            allies_alive: totals.alive_allies,
            enemies_alive: totals.alive_enemies,
            allies_health: totals.allies_health,
            enemies_health: totals.enemies_health,
        }
    }
}

pub type CensusQuery<'w, 's> = Query<
    'w,
    's,
    (
        &'static UnitId,
        &'static Fraction,
        &'static Archetype,
        &'static Health,
        &'static BattleRecord,
    ),
>;

/// Collect one row per registered unit, in registration order.
pub fn take_census(
    registry: &UnitRegistry,
    lookup: impl FnMut(Entity) -> Option<UnitRecord>,
) -> Vec<UnitRecord> {
    registry
        .ids()
        .iter()
        .filter_map(|&id| registry.entity(id))
        .filter_map(lookup)
        .collect()
}

/// Record the state of the world as this tick finds it.
pub fn stats_system(
    mut stats: ResMut<BattleStats>,
    registry: Res<UnitRegistry>,
    units: CensusQuery,
) {
    let census = take_census(&registry, |entity| {
        units
            .get(entity)
            .ok()
            .map(|(id, fraction, archetype, health, record)| {
                UnitRecord::new(*id, *fraction, archetype, health, record)
            })
    });
    let totals = ForceTotals::tally(&census);
    trace!(
        row = stats.rows(),
        alive_allies = totals.alive_allies,
        alive_enemies = totals.alive_enemies,
        allies_health = totals.allies_health,
        enemies_health = totals.enemies_health,
        "Recorded tick statistics"
    );
    stats.record(totals, census);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        id: u32,
        fraction: Fraction,
        archetype: ArchetypeKind,
        status: Status,
        health: f32,
    ) -> UnitRecord {
        UnitRecord {
            id: UnitId(id),
            fraction,
            archetype,
            status,
            health,
            damage_dealt: 0.0,
            healing_done: 0.0,
        }
    }

    #[test]
    fn test_tally_skips_dead_and_projectiles() {
        let census = vec![
            row(1, Fraction::Ally, ArchetypeKind::Infantry, Status::Alive, 100.0),
            row(2, Fraction::Ally, ArchetypeKind::Medic, Status::Wounded, 40.0),
            row(3, Fraction::Ally, ArchetypeKind::Projectile, Status::Alive, 10.0),
            row(5, Fraction::Enemy, ArchetypeKind::Infantry, Status::Dead, 0.0),
            row(6, Fraction::Enemy, ArchetypeKind::Mortar, Status::Alive, 30.0),
        ];
        let totals = ForceTotals::tally(&census);
        assert_eq!(totals.alive_allies, 2);
        assert_eq!(totals.allies_health, 140.0);
        assert_eq!(totals.alive_enemies, 1);
        assert_eq!(totals.enemies_health, 30.0);
        assert!(!totals.is_decided());
    }

    #[test]
    fn test_empty_history_is_neutral() {
        let stats = BattleStats::default();
        assert!(stats.latest().is_none());
        assert!(stats.latest_units().is_empty());
        assert!(!stats.is_decided());
        assert_eq!(stats.final_stats(), FinalStats::default());
    }

    #[test]
    fn test_decided_once_a_side_is_gone() {
        let mut stats = BattleStats::default();
        let census = vec![row(1, Fraction::Ally, ArchetypeKind::Infantry, Status::Alive, 100.0)];
        stats.record(ForceTotals::tally(&census), census);
        assert!(stats.is_decided());
        assert_eq!(stats.final_stats().allies_alive, 1);
        assert_eq!(stats.final_stats().enemies_alive, 0);
        assert_eq!(stats.rows(), 1);
    }
}
