use entity_store::{Entities, Entity, RelatedEntity};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Normalize;
use crate::account::Account;
use crate::attachment::Attachment;
use crate::card::Card;
use crate::emoji::{CustomEmoji, EmojiReaction, emojify, make_emoji_map};
use crate::lenient::{self, count, filtered, flag_or_true, id, non_empty_or, or_default};

/// Direct conversation between the viewer and one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawChat")]
pub struct Chat {
    pub id: String,
    pub account: Account,
    pub accepted: bool,
    pub chat_type: String,
    pub created_at: String,
    pub created_by_account: String,
    pub discarded_at: Option<String>,
    pub last_message: Option<ChatMessage>,
    pub latest_read_message_created_at: Option<String>,
    pub message_expiration: Option<u64>,
    pub unread: u64,
    pub updated_at: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(default)]
struct RawChat {
    #[serde(deserialize_with = "id")]
    id: String,
    #[serde(deserialize_with = "or_default")]
    account: Account,
    #[serde(deserialize_with = "flag_or_true")]
    accepted: bool,
    #[serde(deserialize_with = "or_default")]
    chat_type: String,
    #[serde(deserialize_with = "or_default")]
    created_at: String,
    #[serde(deserialize_with = "id")]
    created_by_account: String,
    #[serde(deserialize_with = "or_default")]
    discarded_at: Option<String>,
    #[serde(deserialize_with = "or_default")]
    last_message: Option<ChatMessage>,
    #[serde(deserialize_with = "or_default")]
    latest_read_message_created_at: Option<String>,
    #[serde(deserialize_with = "or_default")]
    message_expiration: Option<u64>,
    #[serde(deserialize_with = "count")]
    unread: u64,
    #[serde(deserialize_with = "or_default")]
    updated_at: String,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Default for RawChat {
    fn default() -> Self {
        Self {
            id: String::new(),
            account: Account::default(),
            accepted: true,
            chat_type: String::new(),
            created_at: String::new(),
            created_by_account: String::new(),
            discarded_at: None,
            last_message: None,
            latest_read_message_created_at: None,
            message_expiration: None,
            unread: 0,
            updated_at: String::new(),
            extra: Map::new(),
        }
    }
}

impl From<RawChat> for Chat {
    fn from(raw: RawChat) -> Self {
        // Pleroma chats only carry `updated_at`.
        let created_at = lenient::datetime_or_now(non_empty_or(raw.created_at, &raw.updated_at));
        let updated_at = if raw.updated_at.is_empty() {
            created_at.clone()
        } else {
            lenient::datetime_or_now(raw.updated_at)
        };
        Self {
            id: raw.id,
            account: raw.account,
            accepted: raw.accepted,
            chat_type: non_empty_or(raw.chat_type, "direct"),
            created_at,
            created_by_account: raw.created_by_account,
            discarded_at: lenient::valid_datetime(raw.discarded_at),
            last_message: raw.last_message,
            latest_read_message_created_at: lenient::valid_datetime(
                raw.latest_read_message_created_at,
            ),
            message_expiration: raw.message_expiration,
            unread: raw.unread,
            updated_at,
            extra: raw.extra,
        }
    }
}

impl Default for Chat {
    fn default() -> Self {
        RawChat::default().into()
    }
}

impl Normalize for Chat {
    const NAME: &'static str = "chat";
}

impl Entity for Chat {
    const ENTITY: Entities = Entities::Chats;

    fn id(&self) -> &str {
        &self.id
    }

    fn related(&self) -> Vec<RelatedEntity> {
        let mut related = vec![RelatedEntity::new(&self.account)];
        if let Some(message) = &self.last_message {
            related.push(RelatedEntity::new(message));
        }
        related
    }
}

const MESSAGE_DERIVED: &[&str] = &["content_html"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawChatMessage")]
pub struct ChatMessage {
    pub id: String,
    pub account_id: String,
    pub chat_id: String,
    pub content: String,
    pub created_at: String,
    pub emojis: Vec<CustomEmoji>,
    pub attachment: Option<Attachment>,
    pub card: Option<Card>,
    pub emoji_reactions: Vec<EmojiReaction>,
    pub unread: bool,
    /// Sent locally and not yet confirmed by the server.
    pub pending: bool,

    pub content_html: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawChatMessage {
    #[serde(deserialize_with = "id")]
    id: String,
    #[serde(deserialize_with = "id")]
    account_id: String,
    #[serde(deserialize_with = "id")]
    chat_id: String,
    #[serde(deserialize_with = "or_default")]
    content: String,
    #[serde(deserialize_with = "or_default")]
    created_at: String,
    #[serde(deserialize_with = "filtered")]
    emojis: Vec<CustomEmoji>,
    #[serde(deserialize_with = "or_default")]
    attachment: Option<Attachment>,
    #[serde(deserialize_with = "filtered")]
    media_attachments: Vec<Attachment>,
    #[serde(deserialize_with = "or_default")]
    card: Option<Card>,
    #[serde(deserialize_with = "filtered")]
    emoji_reactions: Vec<EmojiReaction>,
    #[serde(deserialize_with = "or_default")]
    unread: bool,
    #[serde(deserialize_with = "or_default")]
    pending: bool,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawChatMessage> for ChatMessage {
    fn from(mut raw: RawChatMessage) -> Self {
        lenient::strip(&mut raw.extra, MESSAGE_DERIVED);
        let emoji_map = make_emoji_map(&raw.emojis);
        // TruthSocial sends a list; Pleroma a single attachment.
        let attachment = raw.attachment.or_else(|| raw.media_attachments.into_iter().next());
        Self {
            content_html: emojify(&raw.content, &emoji_map),
            id: raw.id,
            account_id: raw.account_id,
            chat_id: raw.chat_id,
            content: raw.content,
            created_at: lenient::datetime_or_now(raw.created_at),
            emojis: raw.emojis,
            attachment,
            card: raw.card,
            emoji_reactions: raw.emoji_reactions,
            unread: raw.unread,
            pending: raw.pending,
            extra: raw.extra,
        }
    }
}

impl Default for ChatMessage {
    fn default() -> Self {
        RawChatMessage::default().into()
    }
}

impl Normalize for ChatMessage {
    const NAME: &'static str = "chat message";
}

impl Entity for ChatMessage {
    const ENTITY: Entities = Entities::ChatMessages;

    fn id(&self) -> &str {
        &self.id
    }
}
