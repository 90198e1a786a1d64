//! JSON encoding of [`UserProgress`].
//!
//! Decoding is field-by-field: each top-level field that is missing or
//! malformed falls back to its fresh default while the rest of the record is
//! kept. Only a blob that is not JSON at all, or not a JSON object, is an error.

use chrono::{DateTime, Utc};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::progress::errors::ProgressError;
use crate::progress::table::GameProgress;
use crate::progress::types::GameType;
use crate::progress::user::{
    UserProgress, MAX_ENERGY_LEVEL, MAX_STAGE, MIN_ENERGY_LEVEL, MIN_STAGE,
};

const FIELD_ONBOARDING: &str = "hasCompletedOnboarding";
const FIELD_GAMES: &str = "gameProgress";
const FIELD_ACHIEVEMENTS: &str = "achievements";
const FIELD_GAMES_PLAYED: &str = "totalGamesPlayed";
const FIELD_ENERGY: &str = "energyLevel";
const FIELD_STAGE: &str = "currentStage";

const ACH_ID: &str = "id";
const ACH_UNLOCKED: &str = "unlocked";
const ACH_UNLOCKED_DATE: &str = "unlockedDate";

pub fn encode(progress: &UserProgress) -> Result<Vec<u8>, ProgressError> {
    let mut games = Map::new();
    for (game, table) in progress.games() {
        games.insert(game.display_name().to_string(), serde_json::to_value(table)?);
    }

    let doc = json!({
        FIELD_ONBOARDING: progress.has_completed_onboarding,
        FIELD_GAMES: games,
        FIELD_ACHIEVEMENTS: progress.achievements,
        FIELD_GAMES_PLAYED: progress.total_games_played,
        FIELD_ENERGY: progress.energy_level,
        FIELD_STAGE: progress.current_stage,
    });
    Ok(serde_json::to_vec(&doc)?)
}

pub fn decode(bytes: &[u8]) -> Result<UserProgress, ProgressError> {
    let value: Value = serde_json::from_slice(bytes)?;
    let fields = match value {
        Value::Object(fields) => fields,
        other => {
            return Err(ProgressError::Corrupt(format!(
                "expected object, found {}",
                json_kind(&other)
            )))
        }
    };

    let mut progress = UserProgress::new();

    if let Some(done) = field::<bool>(&fields, FIELD_ONBOARDING) {
        progress.has_completed_onboarding = done;
    }
    if let Some(games) = fields.get(FIELD_GAMES) {
        decode_games(games, &mut progress);
    }
    if let Some(achievements) = fields.get(FIELD_ACHIEVEMENTS) {
        decode_achievements(achievements, &mut progress);
    }
    if let Some(played) = field::<u32>(&fields, FIELD_GAMES_PLAYED) {
        progress.total_games_played = played;
    }
    if let Some(energy) = field::<u8>(&fields, FIELD_ENERGY)
        .filter(|v| (MIN_ENERGY_LEVEL..=MAX_ENERGY_LEVEL).contains(v))
    {
        progress.energy_level = energy;
    }
    if let Some(stage) =
        field::<u8>(&fields, FIELD_STAGE).filter(|v| (MIN_STAGE..=MAX_STAGE).contains(v))
    {
        progress.current_stage = stage;
    }

    Ok(progress)
}

fn field<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str) -> Option<T> {
    let value = fields.get(key)?;
    match T::deserialize(value) {
        Ok(v) => Some(v),
        Err(e) => {
            debug!("progress decode: field '{}' malformed, using default: {}", key, e);
            None
        }
    }
}

/// Games missing from the object, or whose table fails to decode, keep a fresh table.
fn decode_games(value: &Value, progress: &mut UserProgress) {
    let Some(games) = value.as_object() else {
        debug!("progress decode: '{}' is not an object", FIELD_GAMES);
        return;
    };
    for (name, table) in games {
        let Ok(game) = name.parse::<GameType>() else {
            debug!("progress decode: ignoring unknown game '{}'", name);
            continue;
        };
        match GameProgress::deserialize(table) {
            Ok(table) => *progress.game_mut(game) = table,
            Err(e) => debug!("progress decode: table for {} malformed: {}", game, e),
        }
    }
}

/// Definitions always come from the catalog; only unlock state is read back,
/// matched by id. Unknown ids are dropped. A malformed `unlockedDate` loses the
/// date but keeps the unlock.
fn decode_achievements(value: &Value, progress: &mut UserProgress) {
    let Some(entries) = value.as_array() else {
        debug!("progress decode: '{}' is not an array", FIELD_ACHIEVEMENTS);
        return;
    };

    for entry in entries {
        let Some(fields) = entry.as_object() else {
            debug!("progress decode: skipping non-object achievement entry");
            continue;
        };
        let Some(id) = fields.get(ACH_ID).and_then(Value::as_str) else {
            debug!("progress decode: skipping achievement entry without id");
            continue;
        };
        let Some(slot) = progress.achievements.iter_mut().find(|a| a.id == id) else {
            debug!("progress decode: dropping unknown achievement '{}'", id);
            continue;
        };
        if !field::<bool>(fields, ACH_UNLOCKED).unwrap_or(false) {
            continue;
        }
        slot.unlocked = true;
        slot.unlocked_date =
            field::<Option<DateTime<Utc>>>(fields, ACH_UNLOCKED_DATE).flatten();
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::achievement::CATALOG;
    use crate::progress::types::Difficulty;

    fn played() -> UserProgress {
        let mut p = UserProgress::new();
        p.complete_onboarding();
        let now = Utc::now();
        p.complete_level(GameType::PrecisionPath, Difficulty::Calm, 1, 80, now);
        p.complete_level(GameType::PatternFlow, Difficulty::Calm, 1, 12, now);
        p.add_attempt(GameType::BalanceTrial, Difficulty::Intense, 3, now);
        p
    }

    #[test]
    fn encode_uses_storage_field_names() {
        let bytes = encode(&played()).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["hasCompletedOnboarding"], true);
        assert_eq!(value["totalGamesPlayed"], 3);
        assert_eq!(
            value["gameProgress"]["Precision Path"]["Calm"]["1"]["bestScore"],
            80
        );
        assert_eq!(value["achievements"][0]["id"], "first_step");
        assert_eq!(value["achievements"][0]["unlocked"], true);
        assert!(value["achievements"][0]["unlockedDate"].is_string());
    }

    #[test]
    fn round_trip_is_exact() {
        let p = played();
        let decoded = decode(&encode(&p).unwrap()).unwrap();
        assert_eq!(decoded, p);
    }

    #[test]
    fn empty_object_decodes_to_fresh() {
        assert_eq!(decode(b"{}").unwrap(), UserProgress::new());
    }

    #[test]
    fn non_object_is_corrupt() {
        assert!(matches!(decode(b"[1,2]"), Err(ProgressError::Corrupt(_))));
        assert!(matches!(decode(b"not json"), Err(ProgressError::Json(_))));
    }

    #[test]
    fn malformed_field_keeps_the_rest() {
        let json = br#"{
            "hasCompletedOnboarding": "yes",
            "totalGamesPlayed": 12,
            "energyLevel": 42,
            "currentStage": 3,
            "gameProgress": {
                "Pattern Flow": {"Calm": {"1": {"completed": true, "bestScore": 5, "attempts": 2}}},
                "Balance Trial": "garbage",
                "Chess": {}
            }
        }"#;
        let p = decode(json).unwrap();
        assert!(!p.has_completed_onboarding());
        assert_eq!(p.total_games_played(), 12);
        assert_eq!(p.energy_level(), 1);
        assert_eq!(p.current_stage(), 3);
        assert_eq!(p.completed_levels(GameType::PatternFlow, Difficulty::Calm), 1);
        assert_eq!(p.game(GameType::BalanceTrial), &GameProgress::new());
        assert_eq!(p.achievements().len(), CATALOG.len());
    }

    #[test]
    fn achievements_reconcile_with_catalog() {
        let json = br#"{
            "achievements": [
                {"id": "dedication", "title": "Old Title", "description": "", "unlocked": true,
                 "unlockedDate": "2025-12-13T10:00:00Z"},
                {"id": "retired_badge", "title": "Gone", "description": "", "unlocked": true},
                {"bogus": 1}
            ]
        }"#;
        let p = decode(json).unwrap();
        assert_eq!(p.achievements().len(), CATALOG.len());
        let dedication = p.achievement("dedication").unwrap();
        assert!(dedication.unlocked);
        assert_eq!(dedication.title, "Dedication");
        assert!(dedication.unlocked_date.is_some());
        assert!(p.achievement("retired_badge").is_none());
        assert_eq!(p.unlocked_achievement_count(), 1);
    }

    #[test]
    fn unlock_survives_missing_catalog_text() {
        let json = br#"{"achievements": [
            {"id": "dedication", "unlocked": true, "unlockedDate": "2025-01-01T00:00:00Z"}
        ]}"#;
        let p = decode(json).unwrap();
        let dedication = p.achievement("dedication").unwrap();
        assert!(dedication.unlocked);
        assert_eq!(dedication.title, "Dedication");
        assert_eq!(
            dedication.unlocked_date.map(|d| d.to_rfc3339()),
            Some("2025-01-01T00:00:00+00:00".to_string())
        );
    }

    #[test]
    fn bad_unlock_date_keeps_the_unlock() {
        let json = br#"{"achievements": [
            {"id": "dedication", "title": "Dedication", "description": "Play 50 levels total",
             "unlocked": true, "unlockedDate": "bad"},
            {"id": "first_step", "unlocked": "yes"}
        ]}"#;
        let p = decode(json).unwrap();
        let dedication = p.achievement("dedication").unwrap();
        assert!(dedication.unlocked);
        assert_eq!(dedication.unlocked_date, None);
        assert!(!p.achievement("first_step").unwrap().unlocked);
        assert_eq!(p.unlocked_achievement_count(), 1);
    }
}
