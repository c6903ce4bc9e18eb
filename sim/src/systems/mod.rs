//! ECS systems for the battle simulation.
//!
//! A tick runs two systems in order:
//!
//! - `stats_system` records the world as the tick finds it.
//! - `activation_system` is exclusive: it shuffles the registered units and
//!   gives each living one a turn, reading and writing the world directly
//!   so later units see the effects of earlier ones.
//!
//! A turn is a combat phase (`combat`, with mortar launches in `munition`)
//! followed by a movement phase (`movement`).

pub mod combat;
pub mod movement;
pub mod munition;
pub mod stats;
pub mod turn;

#[cfg(test)]
pub(crate) mod testing;

pub use combat::{attack, combat_phase, heal, resolve_attack, Actor};
pub use movement::{move_once, movement_phase, step_toward, Step};
pub use munition::fire_mortar;
pub use stats::{stats_system, BattleStats, FinalStats, ForceTotals, UnitRecord};
pub use turn::{activation_system, unit_turn};
