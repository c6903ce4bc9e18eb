//! Battlesim - Simulation Core
//!
//! A deterministic, tick-based battle between two fractions on a bounded
//! grid. Infantry, medics and mortars fight over terrain with elevation and
//! mine fields; mortars launch projectiles that fly their own routes.
//! Uses `bevy_ecs` for the entity-component-system architecture, and a
//! single seeded generator so one seed reproduces a whole battle.

pub mod api;
pub mod catalog;
pub mod components;
pub mod config;
pub mod error;
pub mod hazard;
pub mod registry;
pub mod rng;
pub mod scenario;
pub mod serialization;
pub mod spatial;
pub mod systems;
pub mod terrain;
pub mod world;

pub use api::{RunSummary, SimWorld};
pub use catalog::{ArchetypeCatalog, UnitTemplate};
pub use components::*;
pub use config::BattleConfig;
pub use error::{SimError, SimResult};
pub use hazard::HazardField;
pub use registry::{UnitBatch, UnitRegistry};
pub use rng::SimRng;
pub use scenario::{PlacementDirective, Scenario};
pub use spatial::{BattleGrid, Cell};
pub use systems::stats::{BattleStats, FinalStats, ForceTotals, UnitRecord};
pub use terrain::TerrainGrid;
pub use world::{BattleSnapshot, HazardSnapshot, UnitSnapshot};
