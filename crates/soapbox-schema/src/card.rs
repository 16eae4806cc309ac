use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::Normalize;
use crate::lenient::{self, count, or_default};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    #[default]
    Link,
    Photo,
    Video,
    Rich,
}

/// Link preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCard")]
pub struct Card {
    pub url: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: CardType,
    pub author_name: String,
    pub author_url: String,
    pub provider_name: String,
    pub provider_url: String,
    pub html: String,
    pub width: u64,
    pub height: u64,
    pub image: Option<String>,
    pub embed_url: String,
    pub blurhash: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawCard {
    #[serde(deserialize_with = "or_default")]
    url: String,
    #[serde(deserialize_with = "or_default")]
    title: String,
    #[serde(deserialize_with = "or_default")]
    description: String,
    #[serde(rename = "type", deserialize_with = "or_default")]
    kind: CardType,
    #[serde(deserialize_with = "or_default")]
    author_name: String,
    #[serde(deserialize_with = "or_default")]
    author_url: String,
    #[serde(deserialize_with = "or_default")]
    provider_name: String,
    #[serde(deserialize_with = "or_default")]
    provider_url: String,
    #[serde(deserialize_with = "or_default")]
    html: String,
    #[serde(deserialize_with = "count")]
    width: u64,
    #[serde(deserialize_with = "count")]
    height: u64,
    #[serde(deserialize_with = "or_default")]
    image: Option<String>,
    #[serde(deserialize_with = "or_default")]
    embed_url: String,
    #[serde(deserialize_with = "or_default")]
    blurhash: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawCard> for Card {
    fn from(raw: RawCard) -> Self {
        let provider_url = if raw.provider_url.is_empty() {
            origin_of(&raw.url).unwrap_or_default()
        } else {
            raw.provider_url
        };
        Self {
            url: raw.url,
            title: raw.title,
            description: raw.description,
            kind: raw.kind,
            author_name: raw.author_name,
            author_url: raw.author_url,
            provider_name: raw.provider_name,
            provider_url,
            html: raw.html,
            width: raw.width,
            height: raw.height,
            image: lenient::non_empty(raw.image),
            embed_url: raw.embed_url,
            blurhash: lenient::non_empty(raw.blurhash),
            extra: raw.extra,
        }
    }
}

impl Default for Card {
    fn default() -> Self {
        RawCard::default().into()
    }
}

impl Normalize for Card {
    const NAME: &'static str = "card";
    const ID_FIELD: &'static str = "url";
}

/// Scheme and host of a url, e.g. `https://soapbox.pub`.
fn origin_of(url: &str) -> Option<String> {
    let origin = Url::parse(url).ok()?.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}
