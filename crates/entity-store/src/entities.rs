use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub(crate) type Record = Arc<dyn Any + Send + Sync>;

/// Every record type kept in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entities {
    Accounts,
    Announcements,
    Chats,
    ChatMessages,
    Groups,
    GroupMemberships,
    GroupRelationships,
    Notifications,
    Polls,
    Relationships,
    Statuses,
    Tags,
}

impl Entities {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accounts => "accounts",
            Self::Announcements => "announcements",
            Self::Chats => "chats",
            Self::ChatMessages => "chat_messages",
            Self::Groups => "groups",
            Self::GroupMemberships => "group_memberships",
            Self::GroupRelationships => "group_relationships",
            Self::Notifications => "notifications",
            Self::Polls => "polls",
            Self::Relationships => "relationships",
            Self::Statuses => "statuses",
            Self::Tags => "tags",
        }
    }
}

impl fmt::Display for Entities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized record that can live in the store.
///
/// Records are immutable once stored; an update is a wholesale replacement
/// under the same id.
pub trait Entity: Clone + Send + Sync + 'static {
    /// The store partition this type lives in.
    const ENTITY: Entities;

    fn id(&self) -> &str;

    /// Records embedded in this one that are also stored under their own type
    /// (e.g. the author of a status).
    fn related(&self) -> Vec<RelatedEntity> {
        Vec::new()
    }
}

/// A type-erased record queued for insertion alongside its parent.
pub struct RelatedEntity {
    pub(crate) entity: Entities,
    pub(crate) id: String,
    pub(crate) record: Record,
    pub(crate) related: Vec<RelatedEntity>,
}

impl RelatedEntity {
    pub fn new<E: Entity>(record: &E) -> Self {
        Self {
            entity: E::ENTITY,
            id: record.id().to_string(),
            related: record.related(),
            record: Arc::new(record.clone()),
        }
    }

    pub(crate) fn from_arc<E: Entity>(record: Arc<E>) -> Self {
        Self {
            entity: E::ENTITY,
            id: record.id().to_string(),
            related: record.related(),
            record,
        }
    }

    pub fn entity(&self) -> Entities {
        self.entity
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Records embedded in this one.
    pub fn related(&self) -> &[RelatedEntity] {
        &self.related
    }
}

impl fmt::Debug for RelatedEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelatedEntity")
            .field("entity", &self.entity)
            .field("id", &self.id)
            .field("related", &self.related)
            .finish()
    }
}

/// Downcast a stored record to its concrete type.
pub(crate) fn downcast<E: Entity>(record: &Record) -> Option<Arc<E>> {
    record.clone().downcast::<E>().ok()
}
