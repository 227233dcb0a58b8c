//! Versioned JSON save and restore.
//!
//! Snapshots are the persisted form of a `GameState` and double as regression
//! fixtures. Older documents are migrated on load:
//! - v1 has no `version` field and no `pot_flipped` on players
//! - v2 is the current schema

use crate::game::GameState;
use serde_json::{Map, Value};
use thiserror::Error;

/// Schema version written by this crate
pub const CURRENT_VERSION: u32 = 2;

/// Errors that can occur when decoding a snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot version {0} is newer than this engine supports")]
    UnsupportedVersion(u32),

    #[error("Malformed snapshot: {0}")]
    Malformed(String),
}

/// Serialize a state to compact JSON
pub fn to_json(state: &GameState) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(state)?)
}

/// Serialize a state to indented JSON, for fixtures and reports
pub fn to_json_pretty(state: &GameState) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string_pretty(state)?)
}

/// Load a state, migrating older schemas first
pub fn from_json(json: &str) -> Result<GameState, SnapshotError> {
    let value: Value = serde_json::from_str(json)?;
    from_value(value)
}

/// Load a state from an already parsed document. Every tree is checked
/// before the state is handed out.
pub fn from_value(value: Value) -> Result<GameState, SnapshotError> {
    let migrated = migrate(value)?;
    let state: GameState = serde_json::from_value(migrated)?;
    for player in &state.players {
        player
            .tree
            .validate()
            .map_err(|e| SnapshotError::Malformed(format!("player {}: {}", player.id, e)))?;
    }
    Ok(state)
}

/// Bring a document up to [`CURRENT_VERSION`]
pub fn migrate(mut value: Value) -> Result<Value, SnapshotError> {
    let document = value
        .as_object_mut()
        .ok_or_else(|| SnapshotError::Malformed("expected a JSON object".into()))?;

    let version = match document.get("version") {
        None => 1,
        Some(v) => v
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| SnapshotError::Malformed(format!("bad version {}", v)))?,
    };

    if version > CURRENT_VERSION {
        return Err(SnapshotError::UnsupportedVersion(version));
    }
    if version < 2 {
        migrate_v1(document)?;
    }
    Ok(value)
}

fn migrate_v1(document: &mut Map<String, Value>) -> Result<(), SnapshotError> {
    let players = document
        .get_mut("players")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| SnapshotError::Malformed("missing players".into()))?;

    for player in players.iter_mut() {
        let player = player
            .as_object_mut()
            .ok_or_else(|| SnapshotError::Malformed("player is not an object".into()))?;
        player
            .entry("pot_flipped")
            .or_insert(Value::Bool(false));
    }

    document.insert("version".into(), Value::from(2u32));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameOptions, PlayerSeat};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn state() -> GameState {
        let seats = [PlayerSeat::new(4, 0), PlayerSeat::new(9, 3)];
        let mut rng = StdRng::seed_from_u64(21);
        GameState::new_with_rng(&seats, GameOptions::default(), &mut rng).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let state = state();
        let json = to_json(&state).unwrap();
        assert_eq!(from_json(&json).unwrap(), state);

        let pretty = to_json_pretty(&state).unwrap();
        assert_eq!(from_json(&pretty).unwrap(), state);
    }

    #[test]
    fn test_v1_document_is_migrated() {
        let state = state();
        let mut value = serde_json::to_value(&state).unwrap();
        let document = value.as_object_mut().unwrap();
        document.remove("version");
        for player in document["players"].as_array_mut().unwrap() {
            player.as_object_mut().unwrap().remove("pot_flipped");
        }

        let loaded = from_value(value).unwrap();
        assert_eq!(loaded.version, CURRENT_VERSION);
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_newer_version_rejected() {
        let mut value = serde_json::to_value(state()).unwrap();
        value["version"] = Value::from(3);
        assert!(matches!(
            from_value(value),
            Err(SnapshotError::UnsupportedVersion(3))
        ));
    }

    #[test]
    fn test_tree_with_misplaced_key_rejected() {
        let mut value = serde_json::to_value(state()).unwrap();
        value["players"][1]["tree"]["9,9"] =
            serde_json::json!({"type": "Leaf", "x": 0, "y": 1, "rotation": 0});

        assert!(matches!(from_value(value), Err(SnapshotError::Malformed(_))));
    }

    #[test]
    fn test_tree_without_bud_rejected() {
        let mut value = serde_json::to_value(state()).unwrap();
        value["players"][0]["tree"] = serde_json::json!({});

        let err = from_value(value).unwrap_err();
        assert!(matches!(err, SnapshotError::Malformed(ref msg) if msg.contains("player 4")));
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(from_json("[]"), Err(SnapshotError::Malformed(_))));
        assert!(matches!(from_json("{"), Err(SnapshotError::Json(_))));
        assert!(matches!(
            from_json(r#"{"version": "two"}"#),
            Err(SnapshotError::Malformed(_))
        ));
    }
}
