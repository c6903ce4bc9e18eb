//! Public API for the simulation.
//!
//! `SimWorld` owns the ECS world and the tick schedule and is the only
//! thing a caller needs: build it from a config (plus optional terrain and
//! hazards), place units, then `step` or `run`.
//!
//! ## Tick
//!
//! Each tick runs the stats system first, so statistics describe the world
//! before anyone acts, then the exclusive activation system, which gives
//! every living unit one turn in a freshly shuffled order.

use crate::components::*;
use crate::config::BattleConfig;
use crate::error::SimResult;
use crate::hazard::HazardField;
use crate::registry::{spawn_batch, UnitBatch, UnitRegistry};
use crate::rng::SimRng;
use crate::scenario::{PlacementDirective, Scenario};
use crate::serialization::snapshot_to_json_string;
use crate::spatial::{BattleGrid, Cell};
use crate::systems::stats::{take_census, BattleStats, FinalStats, ForceTotals, UnitRecord};
use crate::systems::{activation_system, stats_system};
use crate::terrain::TerrainGrid;
use crate::world::BattleSnapshot;
use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Outcome of [`SimWorld::run`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Ticks executed by this call.
    pub ticks: u64,
    /// Whether the run stopped because a side was eliminated.
    pub decided: bool,
    pub final_stats: FinalStats,
}

/// The main simulation world container.
pub struct SimWorld {
    world: World,
    schedule: Schedule,
    tick: u64,
}

impl SimWorld {
    /// Flat terrain, no hazards.
    pub fn new(config: BattleConfig) -> Self {
        let terrain = TerrainGrid::flat(config.width, config.height, 0.0);
        Self::build(config, terrain, HazardField::new())
    }

    /// Create a world over the given terrain and hazard field. The grid must
    /// not be too large, the terrain must match its dimensions and every
    /// hazard must be on it.
    pub fn with_environment(
        config: BattleConfig,
        terrain: TerrainGrid,
        hazards: HazardField,
    ) -> SimResult<Self> {
        config.cell_count()?;
        terrain.check_dimensions(config.width, config.height)?;
        let grid = BattleGrid::new(config.width, config.height);
        for (cell, _) in hazards.iter() {
            grid.check_bounds(cell)?;
        }
        Ok(Self::build(config, terrain, hazards))
    }

    fn build(config: BattleConfig, terrain: TerrainGrid, hazards: HazardField) -> Self {
        let mut world = World::new();
        world.insert_resource(BattleGrid::new(config.width, config.height));
        world.insert_resource(terrain);
        world.insert_resource(hazards);
        world.insert_resource(UnitRegistry::new());
        world.insert_resource(SimRng::from_seed(config.seed));
        world.insert_resource(BattleStats::default());
        world.insert_resource(config);

        let mut schedule = Schedule::default();
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        schedule.add_systems((stats_system, activation_system).chain());

        Self {
            world,
            schedule,
            tick: 0,
        }
    }

    /// Place one batch of units. Returns the ids assigned.
    pub fn place(&mut self, directive: &PlacementDirective) -> SimResult<Vec<UnitId>> {
        let batch = directive.resolve()?;
        self.spawn(&batch)
    }

    /// Place every batch of a scenario. All batches are checked before any
    /// unit is registered, so a bad scenario leaves the world untouched.
    pub fn place_scenario(&mut self, scenario: &Scenario) -> SimResult<Vec<UnitId>> {
        let batches = scenario.resolve()?;
        {
            let grid = self.world.resource::<BattleGrid>();
            for batch in &batches {
                batch.validate(grid)?;
            }
        }
        let mut ids = Vec::new();
        for batch in &batches {
            ids.extend(self.spawn(batch)?);
        }
        Ok(ids)
    }

    /// Place an already resolved batch.
    pub fn spawn(&mut self, batch: &UnitBatch) -> SimResult<Vec<UnitId>> {
        spawn_batch(&mut self.world, batch)
    }

    /// Advance the battle by one tick.
    pub fn step(&mut self) {
        self.schedule.run(&mut self.world);
        self.tick += 1;
    }

    /// Step until `max_ticks` have run or the latest statistics show a side
    /// eliminated.
    pub fn run(&mut self, max_ticks: u64) -> RunSummary {
        info!(
            max_ticks,
            units = self.registry().len(),
            seed = self.config().seed,
            "Battle started"
        );

        let mut ticks = 0;
        while ticks < max_ticks && !self.stats().is_decided() {
            self.step();
            ticks += 1;
        }

        let summary = RunSummary {
            ticks,
            decided: self.stats().is_decided(),
            final_stats: self.final_stats(),
        };
        info!(
            ticks,
            decided = summary.decided,
            allies_alive = summary.final_stats.allies_alive,
            enemies_alive = summary.final_stats.enemies_alive,
            "Battle finished"
        );
        summary
    }

    /// Ticks completed so far.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &BattleConfig {
        self.world.resource::<BattleConfig>()
    }

    pub fn stats(&self) -> &BattleStats {
        self.world.resource::<BattleStats>()
    }

    /// Aggregate of the most recent statistics row.
    pub fn latest_totals(&self) -> Option<ForceTotals> {
        self.stats().latest().copied()
    }

    /// Per-unit table of the most recent statistics row.
    pub fn latest_units(&self) -> &[UnitRecord] {
        self.stats().latest_units()
    }

    pub fn final_stats(&self) -> FinalStats {
        self.stats().final_stats()
    }

    /// Per-unit table of the world as it is right now.
    pub fn census(&mut self) -> Vec<UnitRecord> {
        let mut query = self
            .world
            .query::<(&UnitId, &Fraction, &Archetype, &Health, &BattleRecord)>();
        let world = &self.world;
        take_census(world.resource::<UnitRegistry>(), |entity| {
            query
                .get(world, entity)
                .ok()
                .map(|(id, fraction, archetype, health, record)| {
                    UnitRecord::new(*id, *fraction, archetype, health, record)
                })
        })
    }

    /// Look up a component of a registered unit.
    pub fn unit<C: Component>(&self, id: UnitId) -> Option<&C> {
        let entity = self.registry().entity(id)?;
        self.world.get::<C>(entity)
    }

    pub fn unit_mut<C: Component>(&mut self, id: UnitId) -> Option<Mut<'_, C>> {
        let entity = self.registry().entity(id)?;
        self.world.get_mut::<C>(entity)
    }

    pub fn position_of(&self, id: UnitId) -> Option<Cell> {
        self.grid().position_of(id)
    }

    pub fn registry(&self) -> &UnitRegistry {
        self.world.resource::<UnitRegistry>()
    }

    pub fn grid(&self) -> &BattleGrid {
        self.world.resource::<BattleGrid>()
    }

    pub fn hazards(&self) -> &HazardField {
        self.world.resource::<HazardField>()
    }

    pub fn terrain(&self) -> &TerrainGrid {
        self.world.resource::<TerrainGrid>()
    }

    /// Get a snapshot of the current simulation state.
    pub fn snapshot(&mut self) -> BattleSnapshot {
        BattleSnapshot::from_world(&mut self.world, self.tick)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> String {
        snapshot_to_json_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Get a reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get a mutable reference to the ECS world.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new(BattleConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::serialization::stats_to_json_string;
    use std::collections::HashSet;

    fn sure_shot_config(width: i32, height: i32) -> BattleConfig {
        let mut config = BattleConfig::with_size(width, height).with_seed(1);
        config.catalog.template_mut(ArchetypeKind::Infantry).hit_chance = 1.0;
        config
    }

    fn place_one(sim: &mut SimWorld, archetype: &str, fraction: Fraction, cell: Cell) -> UnitId {
        sim.place(&PlacementDirective::new(1, archetype, fraction).at(cell))
            .unwrap()[0]
    }

    fn projectile_ids(sim: &mut SimWorld) -> Vec<UnitId> {
        sim.census()
            .into_iter()
            .filter(|unit| unit.archetype == ArchetypeKind::Projectile)
            .map(|unit| unit.id)
            .collect()
    }

    #[test]
    fn test_new_world() {
        let mut sim = SimWorld::default();
        assert_eq!(sim.current_tick(), 0);
        assert!(sim.latest_totals().is_none());
        assert!(sim.latest_units().is_empty());
        assert_eq!(sim.final_stats(), FinalStats::default());
        assert!(sim.snapshot().units.is_empty());
    }

    #[test]
    fn test_step_advances_tick_and_records_stats() {
        let mut sim = SimWorld::new(BattleConfig::with_size(10, 10));
        sim.step();
        assert_eq!(sim.current_tick(), 1);
        sim.step();
        assert_eq!(sim.current_tick(), 2);
        assert_eq!(sim.stats().rows(), 2);
    }

    #[test]
    fn test_adjacent_infantry_trade_fixed_damage() {
        let mut sim = SimWorld::new(sure_shot_config(20, 20));
        let ally = place_one(&mut sim, "infantry", Fraction::Ally, (5, 5));
        let enemy = place_one(&mut sim, "infantry", Fraction::Enemy, (6, 5));

        for tick in 1..=9 {
            sim.step();
            let expected = 100.0 - 10.0 * tick as f32;
            assert_eq!(sim.unit::<Health>(ally).unwrap().current, expected);
            assert_eq!(sim.unit::<Health>(enemy).unwrap().current, expected);
        }

        sim.step();
        let ally_health = *sim.unit::<Health>(ally).unwrap();
        let enemy_health = *sim.unit::<Health>(enemy).unwrap();
        assert!(ally_health.is_dead() ^ enemy_health.is_dead());
        let survivor = if ally_health.is_dead() { enemy_health } else { ally_health };
        assert_eq!(survivor.current, 10.0);
        assert_eq!(survivor.status, Status::Wounded);
    }

    #[test]
    fn test_medic_heals_after_cooldown_then_every_tick() {
        let mut config = BattleConfig::with_size(20, 20).with_seed(3);
        if let Archetype::Medic(kit) = &mut config.catalog.medic.archetype {
            kit.healing_chance = 1.0;
        }
        let mut sim = SimWorld::new(config);
        let medic = place_one(&mut sim, "medic", Fraction::Ally, (5, 5));
        let patient = place_one(&mut sim, "infantry", Fraction::Ally, (6, 5));
        sim.unit_mut::<Health>(patient).unwrap().take_hit(20.0);

        // Heal phase and movement phase each tick the counter, so the
        // cooldown of 10 has run out after five ticks.
        for _ in 0..5 {
            sim.step();
            assert_eq!(sim.unit::<Health>(patient).unwrap().current, 80.0);
        }

        let mut expected = 80.0;
        for _ in 0..4 {
            sim.step();
            expected += 5.0;
            assert_eq!(sim.unit::<Health>(patient).unwrap().current, expected);
        }
        let health = sim.unit::<Health>(patient).unwrap();
        assert_eq!(health.current, 100.0);
        assert_eq!(health.status, Status::Alive);
        assert_eq!(sim.unit::<BattleRecord>(medic).unwrap().healing_done, 20.0);

        sim.step();
        assert_eq!(sim.unit::<Health>(patient).unwrap().current, 100.0);
    }

    #[test]
    fn test_mortar_reload_launch_and_impact() {
        let mut config = BattleConfig::with_size(60, 60).with_seed(5);
        config.catalog.projectile.hit_chance = 1.0;
        let mut sim = SimWorld::new(config);
        let mortar = place_one(&mut sim, "mortar", Fraction::Ally, (2, 2));
        let enemy = place_one(&mut sim, "infantry", Fraction::Enemy, (50, 50));

        // Counter starts at 25 and launches on the engagement after it
        // reaches 30.
        for _ in 0..5 {
            sim.step();
            assert!(projectile_ids(&mut sim).is_empty());
        }
        sim.step();
        let shells = projectile_ids(&mut sim);
        assert_eq!(shells.len(), 1);
        let shell = shells[0];
        assert_eq!(shell, UnitId(5));
        assert_eq!(sim.position_of(shell), Some((2, 2)));
        assert_eq!(
            sim.unit::<Movement>(shell).unwrap().route,
            vec![(2, 2), (50, 50)]
        );
        assert!(matches!(
            sim.unit::<Archetype>(mortar),
            Some(Archetype::Mortar(MortarTube { steps_after_shot: 0 }))
        ));

        // Projectiles are not counted as fighting units.
        sim.step();
        let totals = sim.latest_totals().unwrap();
        assert_eq!(totals.alive_allies, 1);

        let mut ticks = 0;
        while !sim.unit::<Health>(shell).unwrap().is_dead() {
            assert_ne!(sim.position_of(shell), Some((50, 50)));
            sim.step();
            ticks += 1;
            assert!(ticks < 10);
        }
        assert_eq!(sim.position_of(shell), Some((50, 50)));
        let health = sim.unit::<Health>(enemy).unwrap();
        assert_eq!(health.current, 20.0);
        assert_eq!(health.status, Status::Wounded);
        assert_eq!(projectile_ids(&mut sim).len(), 1);
    }

    #[test]
    fn test_hazard_detonates_on_entry() {
        let config = BattleConfig::with_size(20, 20).with_seed(9);
        let terrain = TerrainGrid::flat(20, 20, 0.0);
        let hazards = HazardField::from_counts([((6, 5), 3)]);
        let mut sim = SimWorld::with_environment(config, terrain, hazards).unwrap();
        let unit = sim
            .place(
                &PlacementDirective::new(1, "infantry", Fraction::Ally)
                    .at((5, 5))
                    .along(vec![(6, 5)]),
            )
            .unwrap()[0];

        // Fresh units sit out the attack cooldown first.
        for _ in 0..10 {
            sim.step();
        }
        assert_eq!(sim.position_of(unit), Some((5, 5)));

        sim.step();
        assert_eq!(sim.position_of(unit), Some((6, 5)));
        let health = sim.unit::<Health>(unit).unwrap();
        assert_eq!(health.current, 20.0);
        assert_eq!(health.status, Status::Alive);
        assert_eq!(sim.hazards().count_at((6, 5)), 2);

        // Standing still on the cell does not set off another one.
        sim.step();
        assert_eq!(sim.hazards().count_at((6, 5)), 2);
    }

    #[test]
    fn test_id_allocation_leaves_gaps() {
        let mut sim = SimWorld::new(BattleConfig::with_size(10, 10));
        let first = sim
            .place(&PlacementDirective::new(3, "infantry", Fraction::Ally))
            .unwrap();
        let second = sim
            .place(&PlacementDirective::new(2, "medic", Fraction::Enemy))
            .unwrap();
        assert_eq!(first, vec![UnitId(1), UnitId(2), UnitId(3)]);
        assert_eq!(second, vec![UnitId(5), UnitId(6)]);
        assert_eq!(sim.registry().len(), 5);
        assert_eq!(sim.grid().occupancy_sum(), 5);
    }

    #[test]
    fn test_bad_scenario_registers_nothing() {
        let mut sim = SimWorld::new(BattleConfig::with_size(10, 10));
        let scenario = Scenario::new()
            .with(PlacementDirective::new(3, "infantry", Fraction::Ally).at((1, 1)))
            .with(PlacementDirective::new(1, "infantry", Fraction::Enemy).at((10, 3)));
        assert!(matches!(
            sim.place_scenario(&scenario),
            Err(SimError::OutOfBounds { .. })
        ));

        let scenario = Scenario::new()
            .with(PlacementDirective::new(3, "infantry", Fraction::Ally))
            .with(PlacementDirective::new(1, "dragoon", Fraction::Enemy));
        assert!(matches!(
            sim.place_scenario(&scenario),
            Err(SimError::UnknownArchetype(_))
        ));

        let route_off_grid = PlacementDirective::new(1, "infantry", Fraction::Ally)
            .at((0, 0))
            .along(vec![(3, 3), (3, 12)]);
        assert!(sim.place(&route_off_grid).is_err());

        assert!(sim.registry().is_empty());
        assert_eq!(sim.registry().max_id(), 0);
    }

    #[test]
    fn test_environment_checked() {
        let config = BattleConfig::with_size(10, 10);
        let err = SimWorld::with_environment(
            config.clone(),
            TerrainGrid::flat(10, 12, 0.0),
            HazardField::new(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, SimError::TerrainMismatch { .. }));

        let err = SimWorld::with_environment(
            config,
            TerrainGrid::flat(10, 10, 0.0),
            HazardField::from_counts([((10, 0), 1)]),
        )
        .err()
        .unwrap();
        assert!(matches!(err, SimError::OutOfBounds { .. }));
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let err = SimWorld::with_environment(
            BattleConfig::with_size(i32::MAX, 2),
            TerrainGrid::flat(1, 1, 0.0),
            HazardField::new(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, SimError::GridTooLarge { height: 2, .. }));
    }

    #[test]
    fn test_run_stops_once_decided() {
        let mut config = sure_shot_config(10, 10);
        config.catalog.infantry.damage = 150.0;
        let mut sim = SimWorld::new(config);
        place_one(&mut sim, "infantry", Fraction::Ally, (4, 4));
        place_one(&mut sim, "infantry", Fraction::Enemy, (5, 4));

        let summary = sim.run(500);

        // Tick 1 records both sides then one dies; tick 2 records the result.
        assert_eq!(summary.ticks, 2);
        assert!(summary.decided);
        let stats = summary.final_stats;
        assert_eq!(stats.allies_alive + stats.enemies_alive, 1);
        assert_eq!(stats.allies_health + stats.enemies_health, 100.0);

        // A decided battle does not step again.
        assert_eq!(sim.run(500).ticks, 0);
    }

    #[test]
    fn test_run_respects_tick_limit() {
        let mut sim = SimWorld::new(BattleConfig::with_size(50, 50));
        place_one(&mut sim, "infantry", Fraction::Ally, (0, 0));
        place_one(&mut sim, "infantry", Fraction::Enemy, (49, 49));
        let summary = sim.run(25);
        assert_eq!(summary.ticks, 25);
        assert!(!summary.decided);
        assert_eq!(sim.current_tick(), 25);
    }

    #[test]
    fn test_same_seed_same_battle() {
        fn play(seed: u64) -> (String, BattleSnapshot) {
            let config = BattleConfig::default().with_seed(seed);
            let mut hazard_rng = SimRng::from_seed(seed);
            let hazards = HazardField::scatter((0, 30), (100, 50), 1, &mut hazard_rng);
            let terrain = TerrainGrid::from_fn(100, 100, |x, y| ((x + y) % 7) as f32 / 7.0);
            let mut sim = SimWorld::with_environment(config, terrain, hazards).unwrap();
            sim.place_scenario(&Scenario::small_battle(20, 4, 2)).unwrap();
            sim.place(
                &PlacementDirective::new(10, "infantry", Fraction::Enemy)
                    .moving(MovementMode::Random),
            )
            .unwrap();
            sim.run(60);
            (stats_to_json_string(sim.stats()).unwrap(), sim.snapshot())
        }

        let (stats_a, snapshot_a) = play(42);
        let (stats_b, snapshot_b) = play(42);
        assert_eq!(stats_a, stats_b);
        assert_eq!(snapshot_a, snapshot_b);
    }

    #[test]
    fn test_invariants_hold_through_a_melee() {
        let mut config = BattleConfig::with_size(30, 30).with_seed(77);
        config.attack_cooldown = 2;
        config.reload_threshold = 3;
        let mut hazard_rng = SimRng::from_seed(78);
        let hazards = HazardField::scatter((0, 10), (30, 20), 2, &mut hazard_rng);
        let terrain = TerrainGrid::from_fn(30, 30, |x, _| x as f32 / 30.0);
        let mut sim = SimWorld::with_environment(config, terrain, hazards).unwrap();
        for (archetype, fraction, count) in [
            ("infantry", Fraction::Ally, 15),
            ("medic", Fraction::Ally, 4),
            ("mortar", Fraction::Ally, 2),
            ("infantry", Fraction::Enemy, 15),
            ("medic", Fraction::Enemy, 4),
            ("mortar", Fraction::Enemy, 2),
        ] {
            let directive =
                PlacementDirective::new(count, archetype, fraction).moving(MovementMode::Random);
            sim.place(&directive).unwrap();
        }

        let mut dead = HashSet::new();
        let mut hazards_left = sim.hazards().total();
        for _ in 0..120 {
            sim.step();
            assert_eq!(sim.grid().occupancy_sum(), sim.registry().len());
            assert!(sim.hazards().total() <= hazards_left);
            hazards_left = sim.hazards().total();

            for unit in sim.census() {
                let health = sim.unit::<Health>(unit.id).unwrap();
                assert!(health.current >= 0.0 && health.current <= health.max);
                if dead.contains(&unit.id) {
                    assert_eq!(unit.status, Status::Dead);
                    assert_eq!(unit.health, 0.0);
                }
                if unit.status == Status::Dead {
                    dead.insert(unit.id);
                }
                let cell = sim.position_of(unit.id).unwrap();
                assert!(sim.grid().in_bounds(cell));
            }
        }
    }

    #[test]
    fn test_snapshot_lists_units_and_hazards() {
        let config = BattleConfig::with_size(10, 10);
        let hazards = HazardField::from_counts([((2, 3), 4)]);
        let mut sim =
            SimWorld::with_environment(config, TerrainGrid::flat(10, 10, 0.2), hazards).unwrap();
        let id = place_one(&mut sim, "medic", Fraction::Enemy, (7, 8));

        let snapshot = sim.snapshot();
        let unit = snapshot.unit(id).unwrap();
        assert_eq!((unit.x, unit.y), (7, 8));
        assert_eq!(unit.archetype, ArchetypeKind::Medic);
        assert_eq!(unit.health_max, 70.0);
        assert_eq!(snapshot.hazards.len(), 1);
        assert_eq!(snapshot.hazards[0].count, 4);

        let json = sim.snapshot_json();
        assert!(json.contains("\"fraction\":\"enemy\""));
    }
}
