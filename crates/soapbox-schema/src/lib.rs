//! Normalizers for Mastodon-compatible API entities.
//!
//! Every record type accepts loosely typed server JSON and produces a fully
//! defaulted value. A malformed field falls back to its default on its own;
//! the record as a whole is only rejected by [`Normalize::parse`] when it is
//! not an object or lacks its identifying field.
//!
//! Server dialect quirks (Pleroma quote posts, Mastodon self-replies, Mitra
//! attachments, TruthSocial groups) are handled by named transforms inside the
//! relevant record module.

pub mod account;
pub mod announcement;
pub mod attachment;
pub mod card;
pub mod chat;
pub mod dialect;
pub mod emoji;
pub mod group;
pub mod html;
pub mod instance;
mod lenient;
pub mod mention;
pub mod notification;
pub mod poll;
pub mod relationship;
pub mod status;
pub mod tag;
#[cfg(test)]
mod tests;

pub use account::{Account, Field};
pub use announcement::Announcement;
pub use attachment::{Attachment, AttachmentType};
pub use card::{Card, CardType};
pub use chat::{Chat, ChatMessage};
pub use dialect::{Backend, Dialect, Features, Version};
pub use emoji::{CustomEmoji, EmojiMap, EmojiReaction, emojify, make_emoji_map};
pub use group::{Group, GroupMember, GroupRelationship, GroupRole, GroupTag};
pub use instance::Instance;
pub use mention::Mention;
pub use notification::Notification;
pub use poll::{Poll, PollOption};
pub use relationship::Relationship;
pub use status::{Status, Visibility};
pub use tag::{History, Tag};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Placeholder image used when an account or group has no avatar.
pub const AVATAR_MISSING: &str = "/images/avatar-missing.png";
/// Placeholder image used when an account or group has no header.
pub const HEADER_MISSING: &str = "/images/header-missing.png";

/// Schema error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("{entity} payload is not a JSON object")]
    NotAnObject { entity: &'static str },

    #[error("{entity} payload has no `{field}`")]
    MissingId {
        entity: &'static str,
        field: &'static str,
    },
}

/// Conversion from raw server JSON into a canonical record.
///
/// `normalize` never fails and is idempotent: feeding the serialized output
/// back in yields an equal record.
pub trait Normalize: DeserializeOwned + Default {
    /// Name used in error messages.
    const NAME: &'static str;

    /// Field that identifies the record.
    const ID_FIELD: &'static str = "id";

    /// Normalize any JSON value. Non-objects produce the default record.
    fn normalize(raw: &Value) -> Self {
        Self::deserialize(raw).unwrap_or_default()
    }

    /// Normalize a payload that must identify a record: it has to be an
    /// object with a non-empty string or numeric id.
    fn parse(raw: &Value) -> Result<Self, SchemaError> {
        let object = raw.as_object().ok_or(SchemaError::NotAnObject { entity: Self::NAME })?;
        let has_id = match object.get(Self::ID_FIELD) {
            Some(Value::String(id)) => !id.is_empty(),
            Some(Value::Number(_)) => true,
            _ => false,
        };
        if !has_id {
            return Err(SchemaError::MissingId {
                entity: Self::NAME,
                field: Self::ID_FIELD,
            });
        }
        Ok(Self::normalize(raw))
    }
}

pub fn normalize_account(raw: &Value) -> Account {
    Account::normalize(raw)
}

pub fn normalize_status(raw: &Value) -> Status {
    Status::normalize(raw)
}

pub fn normalize_notification(raw: &Value) -> Notification {
    Notification::normalize(raw)
}

pub fn normalize_poll(raw: &Value) -> Poll {
    Poll::normalize(raw)
}

pub fn normalize_attachment(raw: &Value) -> Attachment {
    Attachment::normalize(raw)
}

pub fn normalize_relationship(raw: &Value) -> Relationship {
    Relationship::normalize(raw)
}

pub fn normalize_group(raw: &Value) -> Group {
    Group::normalize(raw)
}

pub fn normalize_chat(raw: &Value) -> Chat {
    Chat::normalize(raw)
}

pub fn normalize_chat_message(raw: &Value) -> ChatMessage {
    ChatMessage::normalize(raw)
}
