use entity_store::{Entities, Entity, RelatedEntity};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Normalize;
use crate::account::Account;
use crate::attachment::Attachment;
use crate::card::Card;
use crate::emoji::{CustomEmoji, EmojiReaction, emojify, make_emoji_map};
use crate::group::Group;
use crate::html::{escape_html, unescape_html};
use crate::lenient::{self, count, filtered, id, opt_id, or_default};
use crate::mention::{Mention, sort_mentions};
use crate::poll::Poll;
use crate::tag::Tag;

const DERIVED: &[&str] = &["content_html", "spoiler_html", "search_index", "hidden"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Unlisted,
    Private,
    Direct,
    /// Pleroma local-only posts.
    Local,
    /// Pleroma list-scoped posts.
    List,
    /// TruthSocial group posts.
    Group,
    #[serde(rename = "self")]
    SelfOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawStatus")]
pub struct Status {
    pub id: String,
    pub account: Account,
    pub application: Option<Value>,
    pub bookmarked: bool,
    pub card: Option<Card>,
    pub content: String,
    pub created_at: String,
    pub edited_at: Option<String>,
    pub emojis: Vec<CustomEmoji>,
    pub favourited: bool,
    pub favourites_count: u64,
    pub group: Option<Group>,
    pub in_reply_to_account_id: Option<String>,
    pub in_reply_to_id: Option<String>,
    pub language: Option<String>,
    pub media_attachments: Vec<Attachment>,
    pub mentions: Vec<Mention>,
    pub muted: bool,
    pub pinned: bool,
    pub pleroma: Map<String, Value>,
    pub poll: Option<Poll>,
    pub quote: Option<Box<Status>>,
    pub quotes_count: u64,
    pub reactions: Vec<EmojiReaction>,
    pub reblog: Option<Box<Status>>,
    pub reblogged: bool,
    pub reblogs_count: u64,
    pub replies_count: u64,
    pub sensitive: bool,
    pub spoiler_text: String,
    pub tags: Vec<Tag>,
    pub uri: String,
    pub url: String,
    pub visibility: Visibility,

    pub content_html: String,
    pub spoiler_html: String,
    pub search_index: String,
    /// Whether the text starts collapsed: always behind a content warning,
    /// and for sensitive statuses that have no media to blur instead.
    pub hidden: bool,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawStatus {
    #[serde(deserialize_with = "id")]
    id: String,
    #[serde(deserialize_with = "or_default")]
    account: Account,
    #[serde(deserialize_with = "or_default")]
    application: Option<Value>,
    #[serde(deserialize_with = "or_default")]
    bookmarked: bool,
    #[serde(deserialize_with = "or_default")]
    card: Option<Card>,
    #[serde(deserialize_with = "or_default")]
    content: String,
    #[serde(deserialize_with = "or_default")]
    created_at: String,
    #[serde(deserialize_with = "or_default")]
    edited_at: Option<String>,
    #[serde(deserialize_with = "filtered")]
    emojis: Vec<CustomEmoji>,
    #[serde(deserialize_with = "or_default")]
    favourited: bool,
    #[serde(deserialize_with = "count")]
    favourites_count: u64,
    #[serde(deserialize_with = "or_default")]
    group: Option<Group>,
    #[serde(deserialize_with = "opt_id")]
    in_reply_to_account_id: Option<String>,
    #[serde(deserialize_with = "opt_id")]
    in_reply_to_id: Option<String>,
    #[serde(deserialize_with = "or_default")]
    language: Option<String>,
    #[serde(deserialize_with = "filtered")]
    media_attachments: Vec<Attachment>,
    #[serde(deserialize_with = "filtered")]
    mentions: Vec<Mention>,
    #[serde(deserialize_with = "or_default")]
    muted: bool,
    #[serde(deserialize_with = "or_default")]
    pinned: bool,
    #[serde(deserialize_with = "or_default")]
    pleroma: Map<String, Value>,
    #[serde(deserialize_with = "or_default")]
    poll: Option<Poll>,
    #[serde(deserialize_with = "or_default")]
    quote: Option<Box<Status>>,
    #[serde(deserialize_with = "count")]
    quotes_count: u64,
    #[serde(deserialize_with = "filtered")]
    reactions: Vec<EmojiReaction>,
    #[serde(deserialize_with = "or_default")]
    reblog: Option<Box<Status>>,
    #[serde(deserialize_with = "or_default")]
    reblogged: bool,
    #[serde(deserialize_with = "count")]
    reblogs_count: u64,
    #[serde(deserialize_with = "count")]
    replies_count: u64,
    #[serde(deserialize_with = "or_default")]
    sensitive: bool,
    #[serde(deserialize_with = "or_default")]
    spoiler_text: String,
    #[serde(deserialize_with = "filtered")]
    tags: Vec<Tag>,
    #[serde(deserialize_with = "or_default")]
    uri: String,
    #[serde(deserialize_with = "or_default")]
    url: String,
    #[serde(deserialize_with = "or_default")]
    visibility: Visibility,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawStatus> for Status {
    fn from(mut raw: RawStatus) -> Self {
        lenient::strip(&mut raw.extra, DERIVED);

        let quote = lift_pleroma_quote(&mut raw.pleroma, raw.quote.take());
        let reactions = if raw.reactions.is_empty() {
            pleroma_reactions(&raw.pleroma)
        } else {
            raw.reactions
        };
        let reply_to = raw.in_reply_to_account_id.as_deref();
        backfill_reply_mention(&mut raw.mentions, &raw.account, reply_to);
        sort_mentions(&mut raw.mentions, &raw.content, reply_to);
        let sensitive = raw.sensitive || !raw.spoiler_text.is_empty();

        let emoji_map = make_emoji_map(&raw.emojis);
        let content_html = emojify(&raw.content, &emoji_map);
        let spoiler_html = emojify(&escape_html(&raw.spoiler_text), &emoji_map);
        let search_index = build_search_index(&raw.spoiler_text, &raw.content, raw.poll.as_ref());
        let hidden =
            !raw.spoiler_text.is_empty() || (sensitive && raw.media_attachments.is_empty());

        Self {
            id: raw.id,
            account: raw.account,
            application: raw.application,
            bookmarked: raw.bookmarked,
            card: raw.card,
            content: raw.content,
            created_at: lenient::datetime_or_now(raw.created_at),
            edited_at: lenient::valid_datetime(raw.edited_at),
            emojis: raw.emojis,
            favourited: raw.favourited,
            favourites_count: raw.favourites_count,
            group: raw.group,
            in_reply_to_account_id: raw.in_reply_to_account_id,
            in_reply_to_id: raw.in_reply_to_id,
            language: lenient::non_empty(raw.language),
            media_attachments: raw.media_attachments,
            mentions: raw.mentions,
            muted: raw.muted,
            pinned: raw.pinned,
            pleroma: raw.pleroma,
            poll: raw.poll,
            quote,
            quotes_count: raw.quotes_count,
            reactions,
            reblog: raw.reblog,
            reblogged: raw.reblogged,
            reblogs_count: raw.reblogs_count,
            replies_count: raw.replies_count,
            sensitive,
            spoiler_text: raw.spoiler_text,
            tags: raw.tags,
            uri: raw.uri,
            url: raw.url,
            visibility: raw.visibility,
            content_html,
            spoiler_html,
            search_index,
            hidden,
            extra: raw.extra,
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        RawStatus::default().into()
    }
}

impl Status {
    /// The status whose content is displayed: the reblogged one for reblogs.
    pub fn displayed(&self) -> &Status {
        self.reblog.as_deref().unwrap_or(self)
    }
}

impl Normalize for Status {
    const NAME: &'static str = "status";
}

impl Entity for Status {
    const ENTITY: Entities = Entities::Statuses;

    fn id(&self) -> &str {
        &self.id
    }

    fn related(&self) -> Vec<RelatedEntity> {
        let mut related = vec![RelatedEntity::new(&self.account)];
        if let Some(reblog) = &self.reblog {
            related.push(RelatedEntity::new(reblog.as_ref()));
        }
        if let Some(quote) = &self.quote {
            related.push(RelatedEntity::new(quote.as_ref()));
        }
        if let Some(poll) = &self.poll {
            related.push(RelatedEntity::new(poll));
        }
        if let Some(group) = &self.group {
            related.push(RelatedEntity::new(group));
        }
        related
    }
}

/// Pleroma nests quoted posts under `pleroma.quote`. Move them to the top
/// level; a top-level quote wins when both are present.
fn lift_pleroma_quote(
    pleroma: &mut Map<String, Value>,
    quote: Option<Box<Status>>,
) -> Option<Box<Status>> {
    let nested = pleroma.remove("quote").filter(Value::is_object);
    quote.or_else(|| nested.map(|value| Box::new(Status::normalize(&value))))
}

/// Pleroma reports reactions as `pleroma.emoji_reactions`.
fn pleroma_reactions(pleroma: &Map<String, Value>) -> Vec<EmojiReaction> {
    match pleroma.get("emoji_reactions") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| EmojiReaction::deserialize(item).ok())
            .filter(|reaction| !reaction.name.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Make sure the replied-to account is mentioned. Mastodon leaves the author
/// out of `mentions` on self-replies, which would render as a reply to nobody.
/// Other missing targets get an id-only mention.
fn backfill_reply_mention(
    mentions: &mut Vec<Mention>,
    account: &Account,
    in_reply_to_account_id: Option<&str>,
) {
    let Some(target) = in_reply_to_account_id.filter(|id| !id.is_empty()) else {
        return;
    };
    if mentions.iter().any(|mention| mention.id == target) {
        return;
    }
    if account.id == target {
        mentions.push(Mention::from(account));
    } else {
        mentions.push(Mention::unresolved(target));
    }
}

/// Plain text a status is matched against when filtering.
fn build_search_index(spoiler_text: &str, content: &str, poll: Option<&Poll>) -> String {
    let mut parts = vec![spoiler_text.to_string(), unescape_html(content)];
    if let Some(poll) = poll {
        parts.extend(poll.options.iter().map(|option| option.title.clone()));
    }
    parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
