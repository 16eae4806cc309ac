use entity_store::{Entities, Entity};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Normalize;
use crate::emoji::{CustomEmoji, emojify, make_emoji_map};
use crate::html::escape_html;
use crate::lenient::{self, count, filtered, id, or_default};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPoll")]
pub struct Poll {
    pub id: String,
    pub emojis: Vec<CustomEmoji>,
    pub expired: bool,
    pub expires_at: Option<String>,
    pub multiple: bool,
    pub options: Vec<PollOption>,
    pub voters_count: u64,
    pub votes_count: u64,
    /// Indexes the viewer voted for. `None` when the viewer has not voted.
    pub own_votes: Option<Vec<u64>>,
    pub voted: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollOption {
    #[serde(deserialize_with = "or_default")]
    pub title: String,
    #[serde(deserialize_with = "count")]
    pub votes_count: u64,
    #[serde(skip_deserializing)]
    pub title_emojified: String,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawPoll {
    #[serde(deserialize_with = "id")]
    id: String,
    #[serde(deserialize_with = "filtered")]
    emojis: Vec<CustomEmoji>,
    #[serde(deserialize_with = "or_default")]
    expired: bool,
    #[serde(deserialize_with = "or_default")]
    expires_at: Option<String>,
    #[serde(deserialize_with = "or_default")]
    multiple: bool,
    #[serde(deserialize_with = "filtered")]
    options: Vec<PollOption>,
    #[serde(deserialize_with = "count")]
    voters_count: u64,
    #[serde(deserialize_with = "count")]
    votes_count: u64,
    #[serde(deserialize_with = "or_default")]
    own_votes: Option<Vec<u64>>,
    #[serde(deserialize_with = "or_default")]
    voted: bool,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawPoll> for Poll {
    fn from(raw: RawPoll) -> Self {
        let emoji_map = make_emoji_map(&raw.emojis);
        let options = raw
            .options
            .into_iter()
            .map(|option| PollOption {
                title_emojified: emojify(&escape_html(&option.title), &emoji_map),
                ..option
            })
            .collect();
        Self {
            id: raw.id,
            emojis: raw.emojis,
            expired: raw.expired,
            expires_at: lenient::valid_datetime(raw.expires_at),
            multiple: raw.multiple,
            options,
            voters_count: raw.voters_count,
            votes_count: raw.votes_count,
            own_votes: raw.own_votes.filter(|votes| !votes.is_empty()),
            voted: raw.voted,
            extra: raw.extra,
        }
    }
}

impl Default for Poll {
    fn default() -> Self {
        RawPoll::default().into()
    }
}

impl Normalize for Poll {
    const NAME: &'static str = "poll";
}

impl Entity for Poll {
    const ENTITY: Entities = Entities::Polls;

    fn id(&self) -> &str {
        &self.id
    }
}
