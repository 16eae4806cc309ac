use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::html::escape_html;
use crate::lenient::{count, flag_or_true, non_empty, or_default, yes};

/// Server-defined emoji referenced in content as `:shortcode:`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCustomEmoji")]
pub struct CustomEmoji {
    pub shortcode: String,
    pub url: String,
    pub static_url: String,
    pub visible_in_picker: bool,
    pub category: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawCustomEmoji {
    #[serde(deserialize_with = "or_default")]
    shortcode: String,
    #[serde(deserialize_with = "or_default")]
    url: String,
    #[serde(deserialize_with = "or_default")]
    static_url: String,
    #[serde(default = "yes", deserialize_with = "flag_or_true")]
    visible_in_picker: bool,
    #[serde(deserialize_with = "or_default")]
    category: Option<String>,
}

impl TryFrom<RawCustomEmoji> for CustomEmoji {
    type Error = String;

    fn try_from(raw: RawCustomEmoji) -> Result<Self, Self::Error> {
        if raw.shortcode.is_empty() || raw.url.is_empty() {
            return Err("custom emoji needs a shortcode and a url".into());
        }
        let static_url = if raw.static_url.is_empty() {
            raw.url.clone()
        } else {
            raw.static_url
        };
        Ok(Self {
            shortcode: raw.shortcode,
            url: raw.url,
            static_url,
            visible_in_picker: raw.visible_in_picker,
            category: non_empty(raw.category),
        })
    }
}

/// Reaction attached to a status, chat message or announcement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmojiReaction {
    #[serde(deserialize_with = "or_default")]
    pub name: String,
    #[serde(deserialize_with = "count")]
    pub count: u64,
    #[serde(deserialize_with = "or_default")]
    pub me: bool,
    #[serde(deserialize_with = "or_default")]
    pub url: Option<String>,
    #[serde(deserialize_with = "or_default")]
    pub static_url: Option<String>,
}

impl Default for EmojiReaction {
    fn default() -> Self {
        Self {
            name: String::new(),
            count: 1,
            me: false,
            url: None,
            static_url: None,
        }
    }
}

/// Shortcode to emoji lookup.
pub type EmojiMap = HashMap<String, CustomEmoji>;

pub fn make_emoji_map(emojis: &[CustomEmoji]) -> EmojiMap {
    emojis
        .iter()
        .map(|emoji| (emoji.shortcode.clone(), emoji.clone()))
        .collect()
}

/// Replace `:shortcode:` occurrences in HTML text with image tags. Markup is
/// copied through untouched, so shortcodes inside attributes are left alone.
pub fn emojify(html: &str, emojis: &EmojiMap) -> String {
    if emojis.is_empty() || !html.contains(':') {
        return html.to_string();
    }

    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(pos) = rest.find(['<', ':']) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        if rest.starts_with('<') {
            let end = rest.find('>').map_or(rest.len(), |i| i + 1);
            out.push_str(&rest[..end]);
            rest = &rest[end..];
            continue;
        }

        let candidate = &rest[1..];
        let len = candidate
            .find(|c: char| c.is_whitespace() || matches!(c, ':' | '<' | '>'))
            .unwrap_or(candidate.len());
        if len > 0 && candidate[len..].starts_with(':') {
            if let Some(emoji) = emojis.get(&candidate[..len]) {
                out.push_str(&emoji_tag(emoji));
                rest = &candidate[len + 1..];
                continue;
            }
        }
        // Not a known shortcode; the next colon may still open one.
        out.push(':');
        rest = candidate;
    }
    out.push_str(rest);
    out
}

fn emoji_tag(emoji: &CustomEmoji) -> String {
    let alt = format!(":{}:", escape_html(&emoji.shortcode));
    format!(
        r#"<img draggable="false" class="emojione" alt="{alt}" title="{alt}" src="{}" />"#,
        escape_html(&emoji.url)
    )
}

/// Fill in image urls for reactions that use a custom emoji.
pub(crate) fn attach_reaction_urls(reactions: &mut [EmojiReaction], emojis: &EmojiMap) {
    for reaction in reactions {
        if reaction.url.is_some() {
            continue;
        }
        if let Some(emoji) = emojis.get(&reaction.name) {
            reaction.url = Some(emoji.url.clone());
            reaction.static_url = Some(emoji.static_url.clone());
        }
    }
}
