use std::collections::BTreeSet;

use serde_json::Value;

use crate::types::{Action, InputSnapshot, ItemId};

#[derive(Debug)]
pub enum ParsedClientMessage {
    Input {
        held: BTreeSet<Action>,
        pointer_x: f32,
        pointer_y: f32,
    },
    SelectUpgrade {
        item: ItemId,
    },
    Restart,
    TogglePause,
    Ping {
        t: f64,
    },
}

impl ParsedClientMessage {
    pub fn into_input(self) -> Option<InputSnapshot> {
        match self {
            Self::Input {
                held,
                pointer_x,
                pointer_y,
            } => Some(InputSnapshot {
                held,
                pointer_x,
                pointer_y,
            }),
            _ => None,
        }
    }
}

pub fn parse_client_message(raw: &str) -> Option<ParsedClientMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let message_type = object.get("type")?.as_str()?;

    match message_type {
        "input" => {
            let held = match object.get("held") {
                None => BTreeSet::new(),
                Some(value) => parse_actions(value)?,
            };
            let pointer_x = parse_optional_coordinate(object.get("pointerX"))?;
            let pointer_y = parse_optional_coordinate(object.get("pointerY"))?;
            Some(ParsedClientMessage::Input {
                held,
                pointer_x,
                pointer_y,
            })
        }
        "select_upgrade" => {
            let item = ItemId::parse(object.get("item")?.as_str()?)?;
            Some(ParsedClientMessage::SelectUpgrade { item })
        }
        "restart" => Some(ParsedClientMessage::Restart),
        "toggle_pause" => Some(ParsedClientMessage::TogglePause),
        "ping" => {
            let t = object.get("t")?.as_f64()?;
            if !t.is_finite() {
                return None;
            }
            Some(ParsedClientMessage::Ping { t })
        }
        _ => None,
    }
}

fn parse_actions(value: &Value) -> Option<BTreeSet<Action>> {
    value
        .as_array()?
        .iter()
        .map(|entry| Action::parse(entry.as_str()?))
        .collect()
}

fn parse_optional_coordinate(value: Option<&Value>) -> Option<f32> {
    let Some(value) = value else {
        return Some(0.0);
    };
    let number = value.as_f64()?;
    if !number.is_finite() || number.abs() > f64::from(f32::MAX) {
        return None;
    }
    Some(number as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_input_message() {
        let parsed = parse_client_message(
            r#"{"type":"input","held":["move_up","left_mouse"],"pointerX":120.5,"pointerY":-4}"#,
        )
        .expect("input message should parse");
        match parsed {
            ParsedClientMessage::Input {
                held,
                pointer_x,
                pointer_y,
            } => {
                assert!(held.contains(&Action::MoveUp));
                assert!(held.contains(&Action::LeftMouse));
                assert_eq!(held.len(), 2);
                assert_eq!(pointer_x, 120.5);
                assert_eq!(pointer_y, -4.0);
            }
            _ => panic!("expected input message"),
        }
    }

    #[test]
    fn parse_input_defaults_missing_fields() {
        let input = parse_client_message(r#"{"type":"input"}"#)
            .and_then(ParsedClientMessage::into_input)
            .expect("bare input should parse");
        assert_eq!(input, InputSnapshot::default());
    }

    #[test]
    fn parse_input_rejects_unknown_action() {
        let parsed = parse_client_message(r#"{"type":"input","held":["move_up","jump"]}"#);
        assert!(parsed.is_none());
    }

    #[test]
    fn parse_input_rejects_non_numeric_pointer() {
        let parsed = parse_client_message(r#"{"type":"input","pointerX":"12"}"#);
        assert!(parsed.is_none());

        let parsed = parse_client_message(r#"{"type":"input","pointerY":1e300}"#);
        assert!(parsed.is_none());
    }

    #[test]
    fn parse_select_upgrade_message() {
        let parsed = parse_client_message(r#"{"type":"select_upgrade","item":"void_core"}"#);
        assert!(matches!(
            parsed,
            Some(ParsedClientMessage::SelectUpgrade {
                item: ItemId::VoidCore
            })
        ));
    }

    #[test]
    fn parse_select_upgrade_rejects_unknown_item() {
        let parsed = parse_client_message(r#"{"type":"select_upgrade","item":"excalibur"}"#);
        assert!(parsed.is_none());
    }

    #[test]
    fn parse_control_messages() {
        assert!(matches!(
            parse_client_message(r#"{"type":"restart"}"#),
            Some(ParsedClientMessage::Restart)
        ));
        assert!(matches!(
            parse_client_message(r#"{"type":"toggle_pause"}"#),
            Some(ParsedClientMessage::TogglePause)
        ));
        assert!(parse_client_message(r#"{"type":"teleport"}"#).is_none());
        assert!(parse_client_message("not json").is_none());
    }

    #[test]
    fn parse_ping_requires_finite_number() {
        let parsed = parse_client_message(r#"{"type":"ping","t":12.5}"#);
        assert!(matches!(parsed, Some(ParsedClientMessage::Ping { .. })));

        let parsed = parse_client_message(r#"{"type":"ping","t":"soon"}"#);
        assert!(parsed.is_none());
    }
}
