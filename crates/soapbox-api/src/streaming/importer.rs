use entity_store::{Entities, Entity, EntityStore};
use soapbox_schema::{Announcement, Chat, Normalize, Notification, Status};

use crate::ApiError;
use crate::endpoints::{
    ANNOUNCEMENTS_KEY, CHATS_KEY, HOME_KEY, LOCAL_KEY, NOTIFICATIONS_KEY, PUBLIC_KEY,
    chat_messages_key, hashtag_key, list_timeline_key,
};

use super::{StreamEvent, StreamMessage};

/// List key of the timeline a stream feeds, if any.
pub fn timeline_key(stream: &[String]) -> Option<String> {
    match stream {
        [name, ..] if name == "user" => Some(HOME_KEY.to_string()),
        [name, ..] if name == "public" => Some(PUBLIC_KEY.to_string()),
        [name, ..] if name == "public:local" => Some(LOCAL_KEY.to_string()),
        [name, tag, ..] if name == "hashtag" => Some(hashtag_key(tag)),
        [name, list, ..] if name == "list" => Some(list_timeline_key(list)),
        _ => None,
    }
}

/// Applies streaming events to the store.
///
/// Records are only inserted into lists that already exist; a list nobody has
/// fetched stays absent so its first fetch starts from a clean page.
#[derive(Clone)]
pub struct StreamImporter {
    store: EntityStore,
}

impl StreamImporter {
    pub fn new(store: EntityStore) -> Self {
        Self { store }
    }

    /// Apply one event. Returns whether the store changed.
    pub fn apply(&self, message: &StreamMessage) -> Result<bool, ApiError> {
        let changed = match &message.event {
            StreamEvent::Update(payload) => {
                let Some(status) = parse::<Status>(payload) else {
                    return Ok(false);
                };
                match timeline_key(&message.stream) {
                    Some(key) => {
                        self.store.insert_streamed(&key, status)?;
                    }
                    None => {
                        self.store.import(status)?;
                    }
                }
                true
            }
            StreamEvent::StatusUpdate(payload) => match parse::<Status>(payload) {
                Some(status) => {
                    self.store.import(status)?;
                    true
                }
                None => false,
            },
            StreamEvent::Delete(id) => self.store.invalidate(Entities::Statuses, id)?,
            StreamEvent::Notification(payload) => match parse::<Notification>(payload) {
                Some(notification) => {
                    self.store.insert_streamed(NOTIFICATIONS_KEY, notification)?;
                    true
                }
                None => false,
            },
            StreamEvent::Announcement(payload) => match parse::<Announcement>(payload) {
                Some(announcement) => {
                    self.store.insert_streamed(ANNOUNCEMENTS_KEY, announcement)?;
                    true
                }
                None => false,
            },
            StreamEvent::AnnouncementReaction {
                announcement_id,
                name,
                count,
            } => match self.store.get::<Announcement>(announcement_id)? {
                Some(current) => {
                    let mut announcement = current.as_ref().clone();
                    announcement.update_reaction(name, *count);
                    self.store.import(announcement)?;
                    true
                }
                None => false,
            },
            StreamEvent::AnnouncementDelete(id) => {
                self.store.invalidate(Entities::Announcements, id)?
            }
            StreamEvent::ChatUpdate(payload) => match parse::<Chat>(payload) {
                Some(chat) => {
                    let last_message = chat.last_message.clone();
                    self.store.insert_streamed(CHATS_KEY, chat)?;
                    if let Some(message) = last_message.filter(|m| !m.id.is_empty()) {
                        let key = chat_messages_key(&message.chat_id);
                        self.store.insert_streamed(&key, message)?;
                    }
                    true
                }
                None => false,
            },
            StreamEvent::Other(name) => {
                tracing::trace!(event = %name, "Ignoring streaming event");
                false
            }
        };
        Ok(changed)
    }
}

fn parse<E: Entity + Normalize>(payload: &serde_json::Value) -> Option<E> {
    E::parse(payload)
        .inspect_err(|e| tracing::warn!(entity = %E::ENTITY, "Dropping streamed record: {e}"))
        .ok()
}
