use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Normalize;
use crate::dialect::{Backend, Features};
use crate::lenient::{count, non_empty_or, or_default};

/// Server metadata from `/api/v1/instance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawInstance")]
pub struct Instance {
    pub uri: String,
    pub title: String,
    pub short_description: String,
    pub description: String,
    pub email: String,
    pub version: String,
    pub languages: Vec<String>,
    pub registrations: bool,
    pub approval_required: bool,
    pub invites_enabled: bool,
    pub feature_quote: bool,
    pub configuration: Configuration,
    pub pleroma: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    #[serde(deserialize_with = "or_default")]
    pub statuses: StatusLimits,
    #[serde(deserialize_with = "or_default")]
    pub polls: PollLimits,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusLimits {
    #[serde(deserialize_with = "count")]
    pub max_characters: u64,
    #[serde(deserialize_with = "count")]
    pub max_media_attachments: u64,
    #[serde(deserialize_with = "count")]
    pub characters_reserved_per_url: u64,
}

impl Default for StatusLimits {
    fn default() -> Self {
        Self {
            max_characters: 500,
            max_media_attachments: 4,
            characters_reserved_per_url: 23,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollLimits {
    #[serde(deserialize_with = "count")]
    pub max_options: u64,
    #[serde(deserialize_with = "count")]
    pub max_characters_per_option: u64,
    #[serde(deserialize_with = "count")]
    pub min_expiration: u64,
    #[serde(deserialize_with = "count")]
    pub max_expiration: u64,
}

impl Default for PollLimits {
    fn default() -> Self {
        Self {
            max_options: 4,
            max_characters_per_option: 25,
            min_expiration: 300,
            max_expiration: 2_629_746,
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawInstance {
    #[serde(deserialize_with = "or_default")]
    uri: String,
    #[serde(deserialize_with = "or_default")]
    title: String,
    #[serde(deserialize_with = "or_default")]
    short_description: String,
    #[serde(deserialize_with = "or_default")]
    description: String,
    #[serde(deserialize_with = "or_default")]
    email: String,
    #[serde(deserialize_with = "or_default")]
    version: String,
    #[serde(deserialize_with = "or_default")]
    languages: Vec<String>,
    #[serde(deserialize_with = "or_default")]
    registrations: bool,
    #[serde(deserialize_with = "or_default")]
    approval_required: bool,
    #[serde(deserialize_with = "or_default")]
    invites_enabled: bool,
    #[serde(deserialize_with = "or_default")]
    feature_quote: bool,
    #[serde(deserialize_with = "or_default")]
    configuration: Configuration,
    #[serde(deserialize_with = "or_default")]
    max_toot_chars: Option<u64>,
    #[serde(deserialize_with = "or_default")]
    poll_limits: Option<Value>,
    #[serde(deserialize_with = "or_default")]
    pleroma: Map<String, Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawInstance> for Instance {
    fn from(raw: RawInstance) -> Self {
        let mut configuration = raw.configuration;
        // Pleroma reports its limits outside `configuration`.
        if let Some(max) = raw.max_toot_chars {
            configuration.statuses.max_characters = max;
        }
        if let Some(limits) = raw.poll_limits {
            if let Ok(polls) = PollLimits::deserialize(&limits) {
                configuration.polls = polls;
            }
        }
        Self {
            uri: raw.uri,
            title: raw.title,
            short_description: raw.short_description,
            description: raw.description,
            email: raw.email,
            version: non_empty_or(raw.version, "0.0.0"),
            languages: raw.languages,
            registrations: raw.registrations,
            approval_required: raw.approval_required,
            invites_enabled: raw.invites_enabled,
            feature_quote: raw.feature_quote,
            configuration,
            pleroma: raw.pleroma,
            extra: raw.extra,
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        RawInstance::default().into()
    }
}

impl Instance {
    /// Feature names advertised under `pleroma.metadata.features`.
    pub fn pleroma_features(&self) -> Vec<&str> {
        self.pleroma
            .get("metadata")
            .and_then(|metadata| metadata.get("features"))
            .and_then(Value::as_array)
            .map(|features| features.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn backend(&self) -> Backend {
        Backend::parse(&self.version)
    }

    pub fn features(&self) -> Features {
        Features::detect(self)
    }
}

impl Normalize for Instance {
    const NAME: &'static str = "instance";
    const ID_FIELD: &'static str = "uri";
}
