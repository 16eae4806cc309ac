use entity_store::{Entities, Entity};
use serde::{Deserialize, Serialize};

use crate::Normalize;
use crate::lenient::{count, or_default};

/// Hashtag, identified by its name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    #[serde(deserialize_with = "or_default")]
    pub name: String,
    #[serde(deserialize_with = "or_default")]
    pub url: String,
    #[serde(deserialize_with = "or_default")]
    pub history: Option<Vec<History>>,
    #[serde(deserialize_with = "or_default")]
    pub following: bool,
}

impl Tag {
    /// Total uses over the reported history window.
    pub fn uses(&self) -> u64 {
        self.history.iter().flatten().map(|h| h.uses).sum()
    }
}

/// Daily usage counts. Mastodon sends them as numeric strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct History {
    #[serde(deserialize_with = "count")]
    pub day: u64,
    #[serde(deserialize_with = "count")]
    pub accounts: u64,
    #[serde(deserialize_with = "count")]
    pub uses: u64,
}

impl Normalize for Tag {
    const NAME: &'static str = "tag";
    const ID_FIELD: &'static str = "name";
}

impl Entity for Tag {
    const ENTITY: Entities = Entities::Tags;

    fn id(&self) -> &str {
        &self.name
    }
}
