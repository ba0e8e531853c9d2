use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::types::RuntimeEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredLogLine {
    pub timestamp: String,
    pub level: LogLevel,
    pub event: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick: Option<u64>,
    pub details: Value,
}

pub fn build_log_line(
    level: LogLevel,
    event: &str,
    session_id: &str,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) -> StructuredLogLine {
    StructuredLogLine {
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        level,
        event: event.to_string(),
        session_id: session_id.to_string(),
        seed,
        tick,
        details,
    }
}

pub fn emit_log(
    level: LogLevel,
    event: &str,
    session_id: &str,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let line = build_log_line(level, event, session_id, seed, tick, details);
    match serde_json::to_string(&line) {
        Ok(text) => eprintln!("{text}"),
        Err(error) => eprintln!("{{\"level\":\"error\",\"event\":\"log_serialize_failed\",\"error\":\"{error}\"}}"),
    }
}

pub fn log_runtime_event(session_id: &str, seed: u32, tick: u64, event: &RuntimeEvent) {
    let name = match event {
        RuntimeEvent::RoomActivated { .. } => "room_activated",
        RuntimeEvent::RoomCleared { .. } => "room_cleared",
        RuntimeEvent::LevelUp { .. } => "level_up",
        RuntimeEvent::UpgradeSelected { .. } => "upgrade_selected",
        RuntimeEvent::FloorEntered { .. } => "floor_entered",
        RuntimeEvent::PlayerRevived => "player_revived",
        RuntimeEvent::GameOver { .. } => "game_over",
        RuntimeEvent::WeaponEquipped { .. } => "weapon_equipped",
        RuntimeEvent::EnemyDefeated { .. }
        | RuntimeEvent::EchoesSummoned { .. }
        | RuntimeEvent::ItemPickedUp { .. } => return,
    };
    let details = serde_json::to_value(event).unwrap_or_else(|_| json!({}));
    emit_log(LogLevel::Info, name, session_id, Some(seed), Some(tick), details);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_line_omits_missing_seed_and_tick() {
        let line = build_log_line(LogLevel::Warn, "anomaly", "sim-1", None, None, json!({}));
        let value = serde_json::to_value(&line).expect("log line serializes");
        assert_eq!(value["level"], "warn");
        assert_eq!(value["sessionId"], "sim-1");
        assert!(value.get("seed").is_none());
        assert!(value.get("tick").is_none());
    }

    #[test]
    fn timestamp_is_rfc3339_utc() {
        let line = build_log_line(LogLevel::Info, "x", "s", Some(1), Some(2), json!(null));
        assert!(line.timestamp.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&line.timestamp).is_ok());
    }
}
