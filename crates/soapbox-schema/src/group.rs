//! TruthSocial groups.

use entity_store::{Entities, Entity, RelatedEntity};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::account::Account;
use crate::emoji::{CustomEmoji, emojify, make_emoji_map};
use crate::html::{escape_html, unescape_html};
use crate::lenient::{self, count, filtered, flag_or_true, id, non_empty_or, or_default};
use crate::{AVATAR_MISSING, HEADER_MISSING, Normalize};

const DERIVED: &[&str] = &["display_name_html", "note_emojified", "note_plain"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    Owner,
    Admin,
    #[default]
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawGroup")]
pub struct Group {
    pub id: String,
    pub display_name: String,
    pub note: String,
    pub avatar: String,
    pub avatar_static: String,
    pub header: String,
    pub header_static: String,
    pub created_at: String,
    pub deleted_at: Option<String>,
    pub emojis: Vec<CustomEmoji>,
    pub group_visibility: String,
    pub locked: bool,
    pub membership_required: bool,
    pub members_count: u64,
    pub owner: Option<GroupOwner>,
    pub slug: String,
    pub source: Option<Value>,
    pub statuses_visibility: String,
    pub tags: Vec<GroupTag>,
    pub uri: String,
    pub url: String,
    pub relationship: Option<GroupRelationship>,

    pub display_name_html: String,
    pub note_emojified: String,
    pub note_plain: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupOwner {
    #[serde(deserialize_with = "id")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupTag {
    #[serde(deserialize_with = "id")]
    pub id: String,
    #[serde(deserialize_with = "or_default")]
    pub name: String,
    #[serde(deserialize_with = "count")]
    pub groups: u64,
    #[serde(deserialize_with = "or_default")]
    pub url: String,
    #[serde(deserialize_with = "count")]
    pub uses: u64,
    #[serde(deserialize_with = "or_default")]
    pub pinned: bool,
    #[serde(deserialize_with = "flag_or_true")]
    pub visible: bool,
}

impl Default for GroupTag {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            groups: 0,
            url: String::new(),
            uses: 0,
            pinned: false,
            visible: true,
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawGroup {
    #[serde(deserialize_with = "id")]
    id: String,
    #[serde(deserialize_with = "or_default")]
    display_name: String,
    #[serde(deserialize_with = "or_default")]
    note: String,
    #[serde(deserialize_with = "or_default")]
    avatar: String,
    #[serde(deserialize_with = "or_default")]
    avatar_static: String,
    #[serde(deserialize_with = "or_default")]
    header: String,
    #[serde(deserialize_with = "or_default")]
    header_static: String,
    #[serde(deserialize_with = "or_default")]
    created_at: String,
    #[serde(deserialize_with = "or_default")]
    deleted_at: Option<String>,
    #[serde(deserialize_with = "filtered")]
    emojis: Vec<CustomEmoji>,
    #[serde(deserialize_with = "or_default")]
    group_visibility: String,
    #[serde(deserialize_with = "or_default")]
    locked: bool,
    #[serde(deserialize_with = "or_default")]
    membership_required: bool,
    #[serde(deserialize_with = "count")]
    members_count: u64,
    #[serde(deserialize_with = "or_default")]
    owner: Option<GroupOwner>,
    #[serde(deserialize_with = "or_default")]
    slug: String,
    #[serde(deserialize_with = "or_default")]
    source: Option<Value>,
    #[serde(deserialize_with = "or_default")]
    statuses_visibility: String,
    #[serde(deserialize_with = "filtered")]
    tags: Vec<GroupTag>,
    #[serde(deserialize_with = "or_default")]
    uri: String,
    #[serde(deserialize_with = "or_default")]
    url: String,
    #[serde(deserialize_with = "or_default")]
    relationship: Option<GroupRelationship>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawGroup> for Group {
    fn from(mut raw: RawGroup) -> Self {
        lenient::strip(&mut raw.extra, DERIVED);
        let emoji_map = make_emoji_map(&raw.emojis);
        let avatar = non_empty_or(raw.avatar, AVATAR_MISSING);
        let avatar_static = non_empty_or(raw.avatar_static, &avatar);
        let header = non_empty_or(raw.header, HEADER_MISSING);
        let header_static = non_empty_or(raw.header_static, &header);
        let group_visibility = non_empty_or(raw.group_visibility, "everyone");
        // TruthSocial marks private groups through visibility only.
        let locked = raw.locked || group_visibility == "members_only";
        let note = if raw.note == "<p></p>" {
            String::new()
        } else {
            raw.note
        };
        let statuses_visibility = non_empty_or(raw.statuses_visibility, "public");

        Self {
            display_name_html: emojify(&escape_html(&raw.display_name), &emoji_map),
            note_emojified: emojify(&note, &emoji_map),
            note_plain: unescape_html(&note),
            id: raw.id,
            display_name: raw.display_name,
            note,
            avatar,
            avatar_static,
            header,
            header_static,
            created_at: lenient::datetime_or_now(raw.created_at),
            deleted_at: lenient::valid_datetime(raw.deleted_at),
            emojis: raw.emojis,
            group_visibility,
            locked,
            membership_required: raw.membership_required,
            members_count: raw.members_count,
            owner: raw.owner,
            slug: raw.slug,
            source: raw.source,
            statuses_visibility,
            tags: raw.tags,
            uri: raw.uri,
            url: raw.url,
            relationship: raw.relationship,
            extra: raw.extra,
        }
    }
}

impl Default for Group {
    fn default() -> Self {
        RawGroup::default().into()
    }
}

impl Normalize for Group {
    const NAME: &'static str = "group";
}

impl Entity for Group {
    const ENTITY: Entities = Entities::Groups;

    fn id(&self) -> &str {
        &self.id
    }

    fn related(&self) -> Vec<RelatedEntity> {
        self.relationship.iter().map(RelatedEntity::new).collect()
    }
}

/// The viewer's standing in a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupRelationship {
    #[serde(deserialize_with = "id")]
    pub id: String,
    #[serde(deserialize_with = "or_default")]
    pub blocked_by: bool,
    #[serde(deserialize_with = "or_default")]
    pub member: bool,
    #[serde(deserialize_with = "or_default")]
    pub muting: bool,
    #[serde(deserialize_with = "or_default")]
    pub notifying: Option<bool>,
    #[serde(deserialize_with = "or_default")]
    pub pending_requests: bool,
    #[serde(deserialize_with = "or_default")]
    pub requested: bool,
    #[serde(deserialize_with = "or_default")]
    pub role: GroupRole,
}

impl Normalize for GroupRelationship {
    const NAME: &'static str = "group relationship";
}

impl Entity for GroupRelationship {
    const ENTITY: Entities = Entities::GroupRelationships;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Membership of an account in a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupMember {
    #[serde(deserialize_with = "id")]
    pub id: String,
    #[serde(deserialize_with = "or_default")]
    pub account: Account,
    #[serde(deserialize_with = "or_default")]
    pub role: GroupRole,
}

impl Normalize for GroupMember {
    const NAME: &'static str = "group member";
}

impl Entity for GroupMember {
    const ENTITY: Entities = Entities::GroupMemberships;

    fn id(&self) -> &str {
        &self.id
    }

    fn related(&self) -> Vec<RelatedEntity> {
        vec![RelatedEntity::new(&self.account)]
    }
}
