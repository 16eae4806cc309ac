use entity_store::{Entities, Entity, RelatedEntity};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Normalize;
use crate::account::Account;
use crate::chat::ChatMessage;
use crate::lenient::{self, id, or_default};
use crate::status::Status;

/// Notification kinds this crate knows how to render. Other kinds are kept
/// as-is in [`Notification::kind`].
pub const KNOWN_KINDS: &[&str] = &[
    "follow",
    "follow_request",
    "mention",
    "reblog",
    "favourite",
    "poll",
    "status",
    "move",
    "update",
    "pleroma:chat_mention",
    "pleroma:emoji_reaction",
    "pleroma:event_reminder",
    "pleroma:participation_request",
    "pleroma:participation_accepted",
    "admin.sign_up",
    "admin.report",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawNotification")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: String,
    pub account: Option<Account>,
    /// New account of a `move` notification.
    pub target: Option<Account>,
    pub status: Option<Status>,
    pub chat_message: Option<ChatMessage>,
    /// Reaction of a `pleroma:emoji_reaction` notification.
    pub emoji: Option<String>,
    pub emoji_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Notification {
    pub fn is_known_kind(&self) -> bool {
        KNOWN_KINDS.contains(&self.kind.as_str())
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawNotification {
    #[serde(deserialize_with = "id")]
    id: String,
    #[serde(rename = "type", deserialize_with = "or_default")]
    kind: String,
    #[serde(deserialize_with = "or_default")]
    created_at: String,
    #[serde(deserialize_with = "or_default")]
    account: Option<Account>,
    #[serde(deserialize_with = "or_default")]
    target: Option<Account>,
    #[serde(deserialize_with = "or_default")]
    status: Option<Status>,
    #[serde(deserialize_with = "or_default")]
    chat_message: Option<ChatMessage>,
    #[serde(deserialize_with = "or_default")]
    emoji: Option<String>,
    #[serde(deserialize_with = "or_default")]
    emoji_url: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawNotification> for Notification {
    fn from(raw: RawNotification) -> Self {
        Self {
            id: raw.id,
            kind: raw.kind,
            created_at: lenient::datetime_or_now(raw.created_at),
            account: raw.account.filter(|account| !account.id.is_empty()),
            target: raw.target.filter(|account| !account.id.is_empty()),
            status: raw.status.filter(|status| !status.id.is_empty()),
            chat_message: raw.chat_message.filter(|message| !message.id.is_empty()),
            emoji: lenient::non_empty(raw.emoji),
            emoji_url: lenient::non_empty(raw.emoji_url),
            extra: raw.extra,
        }
    }
}

impl Default for Notification {
    fn default() -> Self {
        RawNotification::default().into()
    }
}

impl Normalize for Notification {
    const NAME: &'static str = "notification";
}

impl Entity for Notification {
    const ENTITY: Entities = Entities::Notifications;

    fn id(&self) -> &str {
        &self.id
    }

    fn related(&self) -> Vec<RelatedEntity> {
        let mut related = Vec::new();
        related.extend(self.account.iter().map(RelatedEntity::new));
        related.extend(self.target.iter().map(RelatedEntity::new));
        related.extend(self.status.iter().map(RelatedEntity::new));
        related.extend(self.chat_message.iter().map(RelatedEntity::new));
        related
    }
}
