//! Server software detection from the instance version string.
//!
//! Mastodon reports a plain version (`4.1.2`). Other servers advertise
//! Mastodon API compatibility and name themselves in parentheses:
//! `2.7.2 (compatible; Pleroma 2.4.52+soapbox)`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::instance::Instance;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\w+.-]*)(?: \(compatible; ([\w ]+?) (.+)\))?$").unwrap());
static SEMVER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(?:\.(\d+))?(?:\.(\d+))?(?:-[0-9A-Za-z.-]+)?(?:\+([0-9A-Za-z.-]+))?").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Mastodon,
    Pleroma,
    GoToSocial,
    Friendica,
    Mitra,
    TruthSocial,
    Unknown,
}

impl Dialect {
    fn from_software(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "mastodon" => Self::Mastodon,
            "pleroma" | "akkoma" | "rebased" => Self::Pleroma,
            "gotosocial" => Self::GoToSocial,
            "friendica" => Self::Friendica,
            "mitra" => Self::Mitra,
            "truthsocial" | "truth social" => Self::TruthSocial,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mastodon => "Mastodon",
            Self::Pleroma => "Pleroma",
            Self::GoToSocial => "GoToSocial",
            Self::Friendica => "Friendica",
            Self::Mitra => "Mitra",
            Self::TruthSocial => "TruthSocial",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch }
    }

    /// Parse a loose semantic version. Missing minor or patch parts read as
    /// zero; the build suffix after `+` is returned separately.
    pub fn parse(text: &str) -> Option<(Self, Option<String>)> {
        let caps = SEMVER_RE.captures(text.trim())?;
        let part = |i: usize| caps.get(i).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
        let build = caps.get(4).map(|m| m.as_str().to_string());
        Some((Self::new(part(1), part(2), part(3)), build))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Parsed server identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Backend {
    pub dialect: Dialect,
    /// Version of the server software itself.
    pub version: Version,
    /// Mastodon API version the server claims compatibility with.
    pub compat_version: Version,
    /// Build or fork name, e.g. `soapbox` in `2.4.52+soapbox`.
    pub build: Option<String>,
}

impl Backend {
    pub fn parse(version: &str) -> Self {
        let unknown = Self {
            dialect: Dialect::Unknown,
            version: Version::default(),
            compat_version: Version::default(),
            build: None,
        };
        let Some(caps) = VERSION_RE.captures(version.trim()) else {
            return unknown;
        };
        let Some((compat_version, compat_build)) = Version::parse(&caps[1]) else {
            return unknown;
        };
        match (caps.get(2), caps.get(3)) {
            (Some(software), Some(software_version)) => {
                let (version, build) = Version::parse(software_version.as_str()).unwrap_or_default();
                Self {
                    dialect: Dialect::from_software(software.as_str()),
                    version,
                    compat_version,
                    build,
                }
            }
            _ => Self {
                dialect: Dialect::Mastodon,
                version: compat_version,
                compat_version,
                build: compat_build,
            },
        }
    }

    fn is(&self, dialect: Dialect) -> bool {
        self.dialect == dialect
    }

    fn at_least(&self, dialect: Dialect, version: Version) -> bool {
        self.dialect == dialect && self.version >= version
    }
}

/// Capabilities the client can use against a server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Features {
    pub bookmarks: bool,
    pub chats: bool,
    pub groups: bool,
    pub quote_posts: bool,
    pub emoji_reactions: bool,
    pub account_notes: bool,
    pub announcements: bool,
    pub streaming: bool,
}

impl Features {
    pub fn detect(instance: &Instance) -> Self {
        let backend = instance.backend();
        let features = instance.pleroma_features();
        let has = |name: &str| features.contains(&name);
        let v = Version::new;

        Self {
            bookmarks: backend.at_least(Dialect::Mastodon, v(3, 1, 0))
                || backend.at_least(Dialect::Pleroma, v(0, 9, 9))
                || backend.is(Dialect::Friendica)
                || backend.is(Dialect::GoToSocial)
                || backend.is(Dialect::Mitra)
                || backend.is(Dialect::TruthSocial),
            chats: backend.is(Dialect::TruthSocial) || has("pleroma_chat_messages"),
            groups: backend.is(Dialect::TruthSocial),
            quote_posts: has("quote_posting") || instance.feature_quote,
            emoji_reactions: backend.at_least(Dialect::Pleroma, v(2, 0, 0))
                || has("pleroma_emoji_reactions"),
            account_notes: backend.at_least(Dialect::Mastodon, v(3, 2, 0))
                || backend.at_least(Dialect::Pleroma, v(2, 4, 50)),
            announcements: backend.at_least(Dialect::Mastodon, v(3, 1, 0))
                || backend.at_least(Dialect::Pleroma, v(2, 2, 0))
                || backend.is(Dialect::TruthSocial),
            streaming: matches!(
                backend.dialect,
                Dialect::Mastodon | Dialect::Pleroma | Dialect::GoToSocial | Dialect::TruthSocial
            ),
        }
    }
}
