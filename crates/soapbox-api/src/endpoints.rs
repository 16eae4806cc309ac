//! Endpoint catalogue.
//!
//! Each list endpoint is paired with the list key its results are stored
//! under, so paginated fetches and streamed events land in the same list.

use entity_store::{Entities, ListDirection};

use crate::fetcher::EntityRequest;

pub const INSTANCE: &str = "/api/v1/instance";

pub const HOME_KEY: &str = "home";
pub const PUBLIC_KEY: &str = "public";
pub const LOCAL_KEY: &str = "public:local";
pub const BOOKMARKS_KEY: &str = "bookmarks";
pub const NOTIFICATIONS_KEY: &str = "notifications";
pub const CHATS_KEY: &str = "chats";
pub const ANNOUNCEMENTS_KEY: &str = "announcements";

/// Status timelines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timeline {
    Home,
    Public,
    Local,
    Hashtag(String),
    List(String),
    Bookmarks,
}

impl Timeline {
    /// Parse a timeline name such as `home`, `public:local` or `hashtag:rust`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            HOME_KEY => Some(Self::Home),
            PUBLIC_KEY => Some(Self::Public),
            LOCAL_KEY => Some(Self::Local),
            BOOKMARKS_KEY => Some(Self::Bookmarks),
            _ => match name.split_once(':') {
                Some(("hashtag", tag)) if !tag.is_empty() => Some(Self::Hashtag(tag.to_string())),
                Some(("list", id)) if !id.is_empty() => Some(Self::List(id.to_string())),
                _ => None,
            },
        }
    }

    pub fn list_key(&self) -> String {
        match self {
            Self::Home => HOME_KEY.to_string(),
            Self::Public => PUBLIC_KEY.to_string(),
            Self::Local => LOCAL_KEY.to_string(),
            Self::Hashtag(tag) => hashtag_key(tag),
            Self::List(id) => list_timeline_key(id),
            Self::Bookmarks => BOOKMARKS_KEY.to_string(),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Home => "/api/v1/timelines/home".to_string(),
            Self::Public => "/api/v1/timelines/public".to_string(),
            Self::Local => "/api/v1/timelines/public?local=true".to_string(),
            Self::Hashtag(tag) => format!("/api/v1/timelines/tag/{}", encode(tag)),
            Self::List(id) => format!("/api/v1/timelines/list/{}", encode(id)),
            Self::Bookmarks => "/api/v1/bookmarks".to_string(),
        }
    }

    pub fn request(&self) -> EntityRequest {
        EntityRequest::new(Entities::Statuses, self.list_key(), self.path())
    }
}

pub fn hashtag_key(tag: &str) -> String {
    format!("hashtag:{}", tag.to_lowercase())
}

pub fn list_timeline_key(id: &str) -> String {
    format!("list:{id}")
}

pub fn chat_messages_key(chat_id: &str) -> String {
    format!("chat:{chat_id}")
}

pub fn notifications(types: &[&str]) -> EntityRequest {
    let query: String = types
        .iter()
        .map(|kind| format!("types[]={}", encode(kind)))
        .collect::<Vec<_>>()
        .join("&");
    let path = if query.is_empty() {
        "/api/v1/notifications".to_string()
    } else {
        format!("/api/v1/notifications?{query}")
    };
    EntityRequest::new(Entities::Notifications, NOTIFICATIONS_KEY, path)
}

pub fn blocks() -> EntityRequest {
    EntityRequest::new(Entities::Accounts, "blocks", "/api/v1/blocks")
}

pub fn mutes() -> EntityRequest {
    EntityRequest::new(Entities::Accounts, "mutes", "/api/v1/mutes")
}

pub fn followers(account_id: &str) -> EntityRequest {
    EntityRequest::new(
        Entities::Accounts,
        format!("followers:{account_id}"),
        format!("/api/v1/accounts/{}/followers", encode(account_id)),
    )
}

pub fn following(account_id: &str) -> EntityRequest {
    EntityRequest::new(
        Entities::Accounts,
        format!("following:{account_id}"),
        format!("/api/v1/accounts/{}/following", encode(account_id)),
    )
}

pub fn groups() -> EntityRequest {
    EntityRequest::new(Entities::Groups, "groups", "/api/v1/groups")
}

pub fn group(group_id: &str) -> String {
    format!("/api/v1/groups/{}", encode(group_id))
}

pub fn group_members(group_id: &str, role: &str) -> EntityRequest {
    EntityRequest::new(
        Entities::GroupMemberships,
        format!("group_members:{group_id}:{role}"),
        format!("/api/v1/groups/{}/memberships?role={}", encode(group_id), encode(role)),
    )
}

pub fn chats() -> EntityRequest {
    EntityRequest::new(Entities::Chats, CHATS_KEY, "/api/v1/pleroma/chats")
}

/// Chat logs read oldest first; older pages go on top.
pub fn chat_messages(chat_id: &str) -> EntityRequest {
    EntityRequest::new(
        Entities::ChatMessages,
        chat_messages_key(chat_id),
        format!("/api/v1/pleroma/chats/{}/messages", encode(chat_id)),
    )
    .direction(ListDirection::OldestFirst)
}

pub fn announcements() -> EntityRequest {
    EntityRequest::new(Entities::Announcements, ANNOUNCEMENTS_KEY, "/api/v1/announcements")
}

/// Relationships are fetched in batches keyed by the requested ids.
pub fn relationships(account_ids: &[&str]) -> EntityRequest {
    let query = account_ids
        .iter()
        .map(|id| format!("id[]={}", encode(id)))
        .collect::<Vec<_>>()
        .join("&");
    EntityRequest::new(
        Entities::Relationships,
        format!("relationships:{}", account_ids.join(",")),
        format!("/api/v1/accounts/relationships?{query}"),
    )
    .enabled(!account_ids.is_empty())
}

pub fn status(status_id: &str) -> String {
    format!("/api/v1/statuses/{}", encode(status_id))
}

pub fn account(account_id: &str) -> String {
    format!("/api/v1/accounts/{}", encode(account_id))
}

fn encode(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeline_names_round_trip_through_list_keys() {
        for name in ["home", "public", "public:local", "bookmarks", "hashtag:rust", "list:12"] {
            let timeline = Timeline::parse(name).unwrap();
            assert_eq!(timeline.list_key(), name);
        }
        assert_eq!(Timeline::parse("hashtag:"), None);
        assert_eq!(Timeline::parse("federated"), None);
    }

    #[test]
    fn paths_encode_user_supplied_segments() {
        assert_eq!(
            Timeline::Hashtag("c#".into()).path(),
            "/api/v1/timelines/tag/c%23"
        );
        assert_eq!(
            notifications(&["mention", "follow"]).path,
            "/api/v1/notifications?types[]=mention&types[]=follow"
        );
    }

    #[test]
    fn relationships_request_is_disabled_without_ids() {
        assert!(!relationships(&[]).enabled);
        let request = relationships(&["1", "2"]);
        assert!(request.enabled);
        assert_eq!(request.path, "/api/v1/accounts/relationships?id[]=1&id[]=2");
    }

    #[test]
    fn chat_messages_are_oldest_first() {
        assert_eq!(chat_messages("9").direction, ListDirection::OldestFirst);
        assert_eq!(Timeline::Home.request().direction, ListDirection::NewestFirst);
    }
}
