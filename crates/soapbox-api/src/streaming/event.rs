use serde::Deserialize;
use serde_json::Value;

use crate::ApiError;

/// Raw frame: `{"stream": ["user"], "event": "update", "payload": "{...}"}`.
/// Payloads are JSON documents encoded as strings.
#[derive(Debug, Deserialize)]
struct WsFrame {
    event: String,
    #[serde(default)]
    payload: Value,
    #[serde(default)]
    stream: Vec<String>,
}

/// One streaming event with the stream it was delivered on.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamMessage {
    pub stream: Vec<String>,
    pub event: StreamEvent,
}

/// Server-pushed change. Entity payloads stay raw JSON until imported.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Update(Value),
    StatusUpdate(Value),
    Delete(String),
    Notification(Value),
    Announcement(Value),
    AnnouncementReaction {
        announcement_id: String,
        name: String,
        count: u64,
    },
    AnnouncementDelete(String),
    ChatUpdate(Value),
    Other(String),
}

impl StreamEvent {
    pub fn name(&self) -> &str {
        match self {
            Self::Update(_) => "update",
            Self::StatusUpdate(_) => "status.update",
            Self::Delete(_) => "delete",
            Self::Notification(_) => "notification",
            Self::Announcement(_) => "announcement",
            Self::AnnouncementReaction { .. } => "announcement.reaction",
            Self::AnnouncementDelete(_) => "announcement.delete",
            Self::ChatUpdate(_) => "chat_update",
            Self::Other(name) => name,
        }
    }
}

impl StreamMessage {
    pub fn parse(text: &str) -> Result<Self, ApiError> {
        let frame: WsFrame = serde_json::from_str(text)?;
        let event = match frame.event.as_str() {
            "update" => StreamEvent::Update(decode(frame.payload)?),
            "status.update" => StreamEvent::StatusUpdate(decode(frame.payload)?),
            "delete" => StreamEvent::Delete(plain_id(&frame.payload)?),
            "notification" => StreamEvent::Notification(decode(frame.payload)?),
            "announcement" => StreamEvent::Announcement(decode(frame.payload)?),
            "announcement.reaction" => {
                let payload = decode(frame.payload)?;
                let field = |name: &str| payload.get(name).cloned().unwrap_or(Value::Null);
                StreamEvent::AnnouncementReaction {
                    announcement_id: plain_id(&field("announcement_id"))?,
                    name: field("name").as_str().unwrap_or_default().to_string(),
                    count: field("count").as_u64().unwrap_or(0),
                }
            }
            "announcement.delete" => StreamEvent::AnnouncementDelete(plain_id(&frame.payload)?),
            "chat_update" | "pleroma:chat_update" => StreamEvent::ChatUpdate(decode(frame.payload)?),
            other => StreamEvent::Other(other.to_string()),
        };
        Ok(Self {
            stream: frame.stream,
            event,
        })
    }
}

/// Unwrap a string-encoded JSON payload. Some servers send the object as-is.
fn decode(payload: Value) -> Result<Value, ApiError> {
    match payload {
        Value::String(text) => Ok(serde_json::from_str(&text)?),
        Value::Object(_) => Ok(payload),
        other => Err(ApiError::Streaming(format!("unexpected payload: {other}"))),
    }
}

/// Ids arrive as bare strings and must not be decoded: `"109"` is a string id,
/// not the number 109.
fn plain_id(payload: &Value) -> Result<String, ApiError> {
    match payload {
        Value::String(id) if !id.is_empty() => Ok(id.clone()),
        Value::Number(id) => Ok(id.to_string()),
        _ => Err(ApiError::Streaming("missing id".into())),
    }
}
