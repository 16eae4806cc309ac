use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::lenient::{id, or_default};

/// Account mentioned in a status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawMention")]
pub struct Mention {
    pub id: String,
    pub acct: String,
    pub username: String,
    pub url: String,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawMention {
    #[serde(deserialize_with = "id")]
    id: String,
    #[serde(deserialize_with = "or_default")]
    acct: String,
    #[serde(deserialize_with = "or_default")]
    username: String,
    #[serde(deserialize_with = "or_default")]
    url: String,
}

impl From<RawMention> for Mention {
    fn from(raw: RawMention) -> Self {
        let username = if raw.username.is_empty() {
            raw.acct.split('@').next().unwrap_or_default().to_string()
        } else {
            raw.username
        };
        Self {
            id: raw.id,
            acct: raw.acct,
            username,
            url: raw.url,
        }
    }
}

impl From<&Account> for Mention {
    fn from(account: &Account) -> Self {
        RawMention {
            id: account.id.clone(),
            acct: account.acct.clone(),
            username: account.username.clone(),
            url: account.url.clone(),
        }
        .into()
    }
}

impl Mention {
    /// Placeholder for a replied-to account the server left out of `mentions`.
    pub(crate) fn unresolved(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }
}

/// Order mentions the way they read: the account being replied to first,
/// then by where each mention appears in the content. Mentions that cannot
/// be located keep their relative order at the end.
pub(crate) fn sort_mentions(
    mentions: &mut [Mention],
    content: &str,
    in_reply_to_account_id: Option<&str>,
) {
    mentions.sort_by_cached_key(|mention| {
        let replied_to = in_reply_to_account_id.is_some_and(|id| id == mention.id);
        (!replied_to, position_in(content, mention))
    });
}

fn position_in(content: &str, mention: &Mention) -> usize {
    let by_url = (!mention.url.is_empty())
        .then(|| content.find(&format!("\"{}\"", mention.url)))
        .flatten();
    by_url
        .or_else(|| {
            (!mention.username.is_empty())
                .then(|| content.find(&format!("@{}", mention.username)))
                .flatten()
        })
        .unwrap_or(usize::MAX)
}
