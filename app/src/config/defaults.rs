//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

type DefTuple = (&'static str, &'static str, bool, bool, &'static str);

const DEFS: &[DefTuple] = &[
    ("SOAPBOX_BASE_URL", "", false, true, "Server URL, e.g. https://gleasonator.com"),
    ("SOAPBOX_ACCESS_TOKEN", "", true, false, "OAuth access token; empty for logged-out mode"),
    ("SOAPBOX_TIMELINE", "home", false, false, "Timeline to sync: home, public, public:local, bookmarks"),
    ("SOAPBOX_PAGES", "3", false, false, "Number of pages to load (1-20)"),
    ("SOAPBOX_STREAMING", "false", false, false, "Follow the streaming API after the initial sync"),
    ("SOAPBOX_REQUEST_TIMEOUT", "30", false, false, "HTTP request timeout in seconds (1-300)"),
];

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub secret: bool,
    pub required: bool,
    pub description: &'static str,
}

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEFS.iter()
        .map(|&(key, default, secret, required, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    secret,
                    required,
                    description,
                },
            )
        })
        .collect()
});

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.get(key).map(|d| d.default)
}

/// Setting keys in definition order.
pub fn keys() -> impl Iterator<Item = &'static str> {
    DEFS.iter().map(|&(key, ..)| key)
}
