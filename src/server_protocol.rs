use serde_json::Value;

use crate::types::Direction;

#[derive(Debug, PartialEq)]
pub enum ParsedClientMessage {
    Start,
    Key { key: String },
    Ping { t: f64 },
}

impl ParsedClientMessage {
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Self::Key { key } => Direction::from_key(key),
            _ => None,
        }
    }
}

pub fn parse_client_message(raw: &str) -> Option<ParsedClientMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let message_type = object.get("type")?.as_str()?;

    match message_type {
        "start" => Some(ParsedClientMessage::Start),
        "key" => {
            let key = object.get("key")?.as_str()?.to_string();
            Some(ParsedClientMessage::Key { key })
        }
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
