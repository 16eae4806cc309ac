use entity_store::{Entities, Entity};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Normalize;
use crate::emoji::{CustomEmoji, EmojiReaction, attach_reaction_urls, emojify, make_emoji_map};
use crate::lenient::{self, filtered, id, or_default};
use crate::mention::Mention;
use crate::tag::Tag;

const DERIVED: &[&str] = &["content_html"];

/// Instance-wide announcement shown above the home timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAnnouncement")]
pub struct Announcement {
    pub id: String,
    pub content: String,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
    pub all_day: bool,
    pub read: bool,
    pub published_at: String,
    pub updated_at: Option<String>,
    pub reactions: Vec<EmojiReaction>,
    pub mentions: Vec<Mention>,
    pub tags: Vec<Tag>,
    pub emojis: Vec<CustomEmoji>,

    pub content_html: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawAnnouncement {
    #[serde(deserialize_with = "id")]
    id: String,
    #[serde(deserialize_with = "or_default")]
    content: String,
    #[serde(deserialize_with = "or_default")]
    starts_at: Option<String>,
    #[serde(deserialize_with = "or_default")]
    ends_at: Option<String>,
    #[serde(deserialize_with = "or_default")]
    all_day: bool,
    #[serde(deserialize_with = "or_default")]
    read: bool,
    #[serde(deserialize_with = "or_default")]
    published_at: String,
    #[serde(deserialize_with = "or_default")]
    updated_at: Option<String>,
    #[serde(deserialize_with = "filtered")]
    reactions: Vec<EmojiReaction>,
    #[serde(deserialize_with = "filtered")]
    mentions: Vec<Mention>,
    #[serde(deserialize_with = "filtered")]
    tags: Vec<Tag>,
    #[serde(deserialize_with = "filtered")]
    emojis: Vec<CustomEmoji>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawAnnouncement> for Announcement {
    fn from(mut raw: RawAnnouncement) -> Self {
        lenient::strip(&mut raw.extra, DERIVED);
        let emoji_map = make_emoji_map(&raw.emojis);
        attach_reaction_urls(&mut raw.reactions, &emoji_map);
        Self {
            content_html: emojify(&raw.content, &emoji_map),
            id: raw.id,
            content: raw.content,
            starts_at: lenient::valid_datetime(raw.starts_at),
            ends_at: lenient::valid_datetime(raw.ends_at),
            all_day: raw.all_day,
            read: raw.read,
            published_at: lenient::datetime_or_now(raw.published_at),
            updated_at: lenient::valid_datetime(raw.updated_at),
            reactions: raw.reactions,
            mentions: raw.mentions,
            tags: raw.tags,
            emojis: raw.emojis,
            extra: raw.extra,
        }
    }
}

impl Default for Announcement {
    fn default() -> Self {
        RawAnnouncement::default().into()
    }
}

impl Announcement {
    /// Apply a streamed reaction update: set the count, dropping the reaction
    /// when it reaches zero. `me` is kept since the stream does not carry it.
    pub fn update_reaction(&mut self, name: &str, count: u64) {
        match self.reactions.iter().position(|reaction| reaction.name == name) {
            Some(index) if count == 0 => {
                self.reactions.remove(index);
            }
            Some(index) => self.reactions[index].count = count,
            None if count > 0 => {
                let mut reaction = EmojiReaction {
                    name: name.to_string(),
                    count,
                    ..EmojiReaction::default()
                };
                attach_reaction_urls(
                    std::slice::from_mut(&mut reaction),
                    &make_emoji_map(&self.emojis),
                );
                self.reactions.push(reaction);
            }
            None => {}
        }
    }
}

impl Normalize for Announcement {
    const NAME: &'static str = "announcement";
}

impl Entity for Announcement {
    const ENTITY: Entities = Entities::Announcements;

    fn id(&self) -> &str {
        &self.id
    }
}
