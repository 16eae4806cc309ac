use entity_store::{Entities, Entity, RelatedEntity};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::emoji::{CustomEmoji, EmojiMap, emojify, make_emoji_map};
use crate::html::{escape_html, unescape_html};
use crate::lenient::{self, count, filtered, id, map_flag, map_str, non_empty_or, or_default};
use crate::relationship::Relationship;
use crate::{AVATAR_MISSING, HEADER_MISSING, Normalize};

/// Keys computed during normalization. They are dropped from the passthrough
/// map when a normalized account is fed back in.
const DERIVED: &[&str] = &[
    "display_name_html",
    "note_emojified",
    "note_plain",
    "domain",
    "admin",
    "moderator",
    "staff",
    "local",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAccount")]
pub struct Account {
    pub id: String,
    pub acct: String,
    pub username: String,
    pub display_name: String,
    pub note: String,
    pub url: String,
    pub uri: String,
    pub avatar: String,
    pub avatar_static: String,
    pub header: String,
    pub header_static: String,
    pub locked: bool,
    pub bot: bool,
    pub discoverable: bool,
    pub group: bool,
    pub suspended: bool,
    pub verified: bool,
    pub created_at: String,
    pub last_status_at: Option<String>,
    pub mute_expires_at: Option<String>,
    pub followers_count: u64,
    pub following_count: u64,
    pub statuses_count: u64,
    pub emojis: Vec<CustomEmoji>,
    pub fields: Vec<Field>,
    pub moved: Option<Box<Account>>,
    pub birthday: Option<String>,
    pub location: String,
    pub website: String,
    pub fqn: String,
    pub pleroma: Map<String, Value>,
    pub source: Option<Value>,
    pub relationship: Option<Relationship>,

    pub display_name_html: String,
    pub note_emojified: String,
    pub note_plain: String,
    pub domain: String,
    pub admin: bool,
    pub moderator: bool,
    pub staff: bool,
    pub local: bool,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Profile metadata row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Field {
    #[serde(deserialize_with = "or_default")]
    pub name: String,
    #[serde(deserialize_with = "or_default")]
    pub value: String,
    #[serde(deserialize_with = "or_default")]
    pub verified_at: Option<String>,
    #[serde(skip_deserializing)]
    pub name_emojified: String,
    #[serde(skip_deserializing)]
    pub value_emojified: String,
    #[serde(skip_deserializing)]
    pub value_plain: String,
}

impl Field {
    fn derive(mut self, emojis: &EmojiMap) -> Self {
        self.name_emojified = emojify(&escape_html(&self.name), emojis);
        self.value_emojified = emojify(&self.value, emojis);
        self.value_plain = unescape_html(&self.value);
        self.verified_at = lenient::valid_datetime(self.verified_at);
        self
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawAccount {
    #[serde(deserialize_with = "id")]
    id: String,
    #[serde(deserialize_with = "or_default")]
    acct: String,
    #[serde(deserialize_with = "or_default")]
    username: String,
    #[serde(deserialize_with = "or_default")]
    display_name: String,
    #[serde(deserialize_with = "or_default")]
    note: String,
    #[serde(deserialize_with = "or_default")]
    url: String,
    #[serde(deserialize_with = "or_default")]
    uri: String,
    #[serde(deserialize_with = "or_default")]
    avatar: String,
    #[serde(deserialize_with = "or_default")]
    avatar_static: String,
    #[serde(deserialize_with = "or_default")]
    header: String,
    #[serde(deserialize_with = "or_default")]
    header_static: String,
    #[serde(deserialize_with = "or_default")]
    locked: bool,
    #[serde(deserialize_with = "or_default")]
    bot: bool,
    #[serde(deserialize_with = "or_default")]
    discoverable: bool,
    #[serde(deserialize_with = "or_default")]
    group: bool,
    #[serde(deserialize_with = "or_default")]
    suspended: bool,
    #[serde(deserialize_with = "or_default")]
    verified: bool,
    #[serde(deserialize_with = "or_default")]
    created_at: String,
    #[serde(deserialize_with = "or_default")]
    last_status_at: Option<String>,
    #[serde(deserialize_with = "or_default")]
    mute_expires_at: Option<String>,
    #[serde(deserialize_with = "count")]
    followers_count: u64,
    #[serde(deserialize_with = "count")]
    following_count: u64,
    #[serde(deserialize_with = "count")]
    statuses_count: u64,
    #[serde(deserialize_with = "filtered")]
    emojis: Vec<CustomEmoji>,
    #[serde(deserialize_with = "filtered")]
    fields: Vec<Field>,
    #[serde(deserialize_with = "or_default")]
    moved: Option<Box<Account>>,
    #[serde(deserialize_with = "or_default")]
    birthday: Option<String>,
    #[serde(deserialize_with = "or_default")]
    location: String,
    #[serde(deserialize_with = "or_default")]
    website: String,
    #[serde(deserialize_with = "or_default")]
    fqn: String,
    #[serde(deserialize_with = "or_default")]
    pleroma: Map<String, Value>,
    #[serde(deserialize_with = "or_default")]
    source: Option<Value>,
    #[serde(deserialize_with = "or_default")]
    relationship: Option<Relationship>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawAccount> for Account {
    fn from(mut raw: RawAccount) -> Self {
        lenient::strip(&mut raw.extra, DERIVED);

        let relationship = raw.relationship.or_else(|| {
            raw.pleroma
                .remove("relationship")
                .filter(Value::is_object)
                .map(|value| Relationship::normalize(&value))
        });

        let emoji_map = make_emoji_map(&raw.emojis);
        let fields = raw
            .fields
            .into_iter()
            .map(|field| field.derive(&emoji_map))
            .collect();

        let display_name = if raw.display_name.trim().is_empty() {
            raw.username.clone()
        } else {
            raw.display_name
        };
        let fqn = if raw.fqn.is_empty() {
            raw.acct.clone()
        } else {
            raw.fqn
        };
        let domain = fqn.split_once('@').map(|(_, domain)| domain.to_string()).unwrap_or_default();

        let admin = map_flag(&raw.pleroma, "is_admin").unwrap_or(false);
        let moderator = map_flag(&raw.pleroma, "is_moderator").unwrap_or(false);
        let local = map_flag(&raw.pleroma, "is_local").unwrap_or_else(|| !raw.acct.contains('@'));
        let verified = raw.verified || pleroma_tagged(&raw.pleroma, "verified");
        let suspended = raw.suspended || map_flag(&raw.pleroma, "deactivated").unwrap_or(false);
        let discoverable = raw.discoverable
            || raw
                .source
                .as_ref()
                .and_then(|source| source.pointer("/pleroma/discoverable"))
                .and_then(Value::as_bool)
                .unwrap_or(false);
        let location = if raw.location.is_empty() {
            map_str(&raw.pleroma, "location").unwrap_or_default().to_string()
        } else {
            raw.location
        };

        let avatar = non_empty_or(raw.avatar, AVATAR_MISSING);
        let avatar_static = non_empty_or(raw.avatar_static, &avatar);
        let header = non_empty_or(raw.header, HEADER_MISSING);
        let header_static = non_empty_or(raw.header_static, &header);

        Self {
            display_name_html: emojify(&escape_html(&display_name), &emoji_map),
            note_emojified: emojify(&raw.note, &emoji_map),
            note_plain: unescape_html(&raw.note),
            id: raw.id,
            acct: raw.acct,
            username: raw.username,
            display_name,
            note: raw.note,
            url: raw.url,
            uri: raw.uri,
            avatar,
            avatar_static,
            header,
            header_static,
            locked: raw.locked,
            bot: raw.bot,
            discoverable,
            group: raw.group,
            suspended,
            verified,
            created_at: lenient::datetime_or_now(raw.created_at),
            last_status_at: raw.last_status_at,
            mute_expires_at: lenient::valid_datetime(raw.mute_expires_at),
            followers_count: raw.followers_count,
            following_count: raw.following_count,
            statuses_count: raw.statuses_count,
            emojis: raw.emojis,
            fields,
            moved: raw.moved,
            birthday: lenient::non_empty(raw.birthday),
            location,
            website: raw.website,
            fqn,
            pleroma: raw.pleroma,
            source: raw.source,
            relationship,
            domain,
            admin,
            moderator,
            staff: admin || moderator,
            local,
            extra: raw.extra,
        }
    }
}

impl Default for Account {
    fn default() -> Self {
        RawAccount::default().into()
    }
}

impl Normalize for Account {
    const NAME: &'static str = "account";
}

impl Entity for Account {
    const ENTITY: Entities = Entities::Accounts;

    fn id(&self) -> &str {
        &self.id
    }

    fn related(&self) -> Vec<RelatedEntity> {
        let mut related = Vec::new();
        if let Some(relationship) = &self.relationship {
            related.push(RelatedEntity::new(relationship));
        }
        if let Some(moved) = &self.moved {
            related.push(RelatedEntity::new(moved.as_ref()));
        }
        related
    }
}

fn pleroma_tagged(pleroma: &Map<String, Value>, tag: &str) -> bool {
    pleroma
        .get("tags")
        .and_then(Value::as_array)
        .is_some_and(|tags| tags.iter().any(|t| t.as_str() == Some(tag)))
}
