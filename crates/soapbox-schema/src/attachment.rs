use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Normalize;
use crate::lenient::{self, id, or_default};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentType {
    Image,
    Gifv,
    Video,
    Audio,
    #[default]
    Unknown,
}

/// Media attached to a status or chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAttachment")]
pub struct Attachment {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AttachmentType,
    pub url: String,
    pub preview_url: String,
    pub remote_url: Option<String>,
    pub description: String,
    pub blurhash: Option<String>,
    pub meta: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pleroma: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Attachment {
    /// MIME type reported by Pleroma-family servers.
    pub fn mime_type(&self) -> Option<&str> {
        self.pleroma.as_ref().and_then(|p| lenient::map_str(p, "mime_type"))
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawAttachment {
    #[serde(deserialize_with = "id")]
    id: String,
    #[serde(rename = "type", deserialize_with = "or_default")]
    kind: AttachmentType,
    #[serde(deserialize_with = "or_default")]
    url: String,
    #[serde(deserialize_with = "or_default")]
    preview_url: String,
    #[serde(deserialize_with = "or_default")]
    remote_url: Option<String>,
    #[serde(deserialize_with = "or_default")]
    description: String,
    #[serde(deserialize_with = "or_default")]
    blurhash: Option<String>,
    #[serde(deserialize_with = "or_default")]
    meta: Map<String, Value>,
    #[serde(deserialize_with = "or_default")]
    pleroma: Option<Map<String, Value>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawAttachment> for Attachment {
    fn from(raw: RawAttachment) -> Self {
        let remote_url = lenient::non_empty(raw.remote_url);
        // Some servers only send one of the urls.
        let url = [&raw.url, &raw.preview_url]
            .into_iter()
            .chain(remote_url.as_ref())
            .find(|url| !url.is_empty())
            .cloned()
            .unwrap_or_default();
        let preview_url = if raw.preview_url.is_empty() {
            url.clone()
        } else {
            raw.preview_url
        };
        Self {
            id: raw.id,
            kind: raw.kind,
            url,
            preview_url,
            remote_url,
            description: raw.description,
            blurhash: lenient::non_empty(raw.blurhash),
            meta: raw.meta,
            pleroma: raw.pleroma,
            extra: raw.extra,
        }
    }
}

impl Default for Attachment {
    fn default() -> Self {
        RawAttachment::default().into()
    }
}

impl Normalize for Attachment {
    const NAME: &'static str = "attachment";
}
