use entity_store::{Entities, Entity};
use serde::{Deserialize, Serialize};

use crate::Normalize;
use crate::lenient::{id, or_default};

/// The viewer's relationship to another account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Relationship {
    #[serde(deserialize_with = "id")]
    pub id: String,
    #[serde(deserialize_with = "or_default")]
    pub blocked_by: bool,
    #[serde(deserialize_with = "or_default")]
    pub blocking: bool,
    #[serde(deserialize_with = "or_default")]
    pub domain_blocking: bool,
    #[serde(deserialize_with = "or_default")]
    pub endorsed: bool,
    #[serde(deserialize_with = "or_default")]
    pub followed_by: bool,
    #[serde(deserialize_with = "or_default")]
    pub following: bool,
    #[serde(deserialize_with = "or_default")]
    pub muting: bool,
    #[serde(deserialize_with = "or_default")]
    pub muting_notifications: bool,
    #[serde(deserialize_with = "or_default")]
    pub note: String,
    #[serde(deserialize_with = "or_default")]
    pub notifying: bool,
    #[serde(deserialize_with = "or_default")]
    pub requested: bool,
    #[serde(deserialize_with = "or_default")]
    pub showing_reblogs: bool,
    #[serde(deserialize_with = "or_default")]
    pub subscribing: bool,
}

impl Normalize for Relationship {
    const NAME: &'static str = "relationship";
}

impl Entity for Relationship {
    const ENTITY: Entities = Entities::Relationships;

    fn id(&self) -> &str {
        &self.id
    }
}
