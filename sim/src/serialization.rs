//! JSON helpers for snapshots and recorded statistics.

use crate::systems::stats::BattleStats;
use crate::world::BattleSnapshot;

/// Serialize a snapshot to JSON bytes.
pub fn snapshot_to_json(snapshot: &BattleSnapshot) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(snapshot)
}

/// Serialize a snapshot to a JSON string.
pub fn snapshot_to_json_string(snapshot: &BattleSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(snapshot)
}

/// Deserialize a snapshot from JSON bytes.
pub fn snapshot_from_json(data: &[u8]) -> Result<BattleSnapshot, serde_json::Error> {
    serde_json::from_slice(data)
}

/// Deserialize a snapshot from a JSON string.
pub fn snapshot_from_json_string(data: &str) -> Result<BattleSnapshot, serde_json::Error> {
    serde_json::from_str(data)
}

/// Serialize the full statistics history.
pub fn stats_to_json_string(stats: &BattleStats) -> Result<String, serde_json::Error> {
    serde_json::to_string(stats)
}

pub fn stats_from_json_string(data: &str) -> Result<BattleStats, serde_json::Error> {
    serde_json::from_str(data)
}
