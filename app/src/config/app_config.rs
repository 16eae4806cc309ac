//! Runtime application configuration loaded from the environment.

use std::time::Duration;

use soapbox_api::Timeline;

use super::defaults::{self, DEFAULT_SETTINGS};
use super::validation::validate_setting;
use super::{ConfigStatus, SettingInfo, SettingType};

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub base_url: String,
    pub access_token: Option<String>,
    pub timeline: Timeline,
    pub pages: u32,
    pub streaming: bool,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            access_token: None,
            timeline: Timeline::Home,
            pages: 3,
            streaming: false,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn load() -> (Self, ConfigStatus) {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`. Invalid values fall back to their
    /// default with a warning; missing required keys are reported in the
    /// returned status.
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> (Self, ConfigStatus) {
        let mut status = ConfigStatus::default();
        let mut g = |key: &str| -> String {
            let default = defaults::get_default(key).unwrap_or_default();
            let required = DEFAULT_SETTINGS.get(key).is_some_and(|d| d.required);
            let value = lookup(key).map(|v| v.trim().to_string()).unwrap_or_default();
            if value.is_empty() {
                if required {
                    status.missing_settings.push(key.to_string());
                }
                return default.to_string();
            }
            match validate_setting(key, &value) {
                Ok(()) => value,
                Err(e) => {
                    tracing::warn!(key, "Invalid setting, using default: {e}");
                    status.warnings.push(format!("{key} {e}; using default"));
                    default.to_string()
                }
            }
        };

        let base_url = g("SOAPBOX_BASE_URL");
        let access_token = Some(g("SOAPBOX_ACCESS_TOKEN")).filter(|t| !t.is_empty());
        let timeline = Timeline::parse(&g("SOAPBOX_TIMELINE")).unwrap_or(Timeline::Home);
        let pages = g("SOAPBOX_PAGES").parse().unwrap_or(3);
        let streaming = g("SOAPBOX_STREAMING") == "true";
        let request_timeout = Duration::from_secs(g("SOAPBOX_REQUEST_TIMEOUT").parse().unwrap_or(30));

        if access_token.is_none() {
            status
                .warnings
                .push("SOAPBOX_ACCESS_TOKEN is empty - running logged out".into());
            if timeline == Timeline::Home || timeline == Timeline::Bookmarks {
                status
                    .warnings
                    .push("home and bookmarks require an access token".into());
            }
        }

        let config = Self {
            base_url,
            access_token,
            timeline,
            pages,
            streaming,
            request_timeout,
        };
        (config, status)
    }

    /// All settings with secrets masked, in definition order.
    pub fn settings_info(lookup: impl Fn(&str) -> Option<String>) -> Vec<SettingInfo> {
        defaults::keys()
            .filter_map(|key| DEFAULT_SETTINGS.get(key))
            .map(|def| {
                let raw = lookup(def.key).unwrap_or_default();
                let has_value = !raw.is_empty();
                let value = match (def.secret, has_value) {
                    (true, true) => "********".to_string(),
                    (_, false) => def.default.to_string(),
                    (false, true) => raw,
                };
                SettingInfo {
                    key: def.key.to_string(),
                    value,
                    setting_type: if def.secret {
                        SettingType::Secret
                    } else {
                        SettingType::Normal
                    },
                    required: def.required,
                    description: def.description.to_string(),
                    has_value,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn loads_valid_settings() {
        let (config, status) = AppConfig::load_from(env(&[
            ("SOAPBOX_BASE_URL", "https://gleasonator.com"),
            ("SOAPBOX_ACCESS_TOKEN", "abc123"),
            ("SOAPBOX_TIMELINE", "hashtag:rust"),
            ("SOAPBOX_PAGES", "5"),
            ("SOAPBOX_STREAMING", "true"),
            ("SOAPBOX_REQUEST_TIMEOUT", "10"),
        ]));
        assert!(status.is_ready());
        assert!(status.warnings.is_empty());
        assert_eq!(config.base_url, "https://gleasonator.com");
        assert_eq!(config.access_token.as_deref(), Some("abc123"));
        assert_eq!(config.timeline, Timeline::Hashtag("rust".into()));
        assert_eq!(config.pages, 5);
        assert!(config.streaming);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn missing_base_url_is_reported() {
        let (_, status) = AppConfig::load_from(env(&[]));
        assert_eq!(status.missing_settings, ["SOAPBOX_BASE_URL"]);
        assert!(!status.is_ready());
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let (config, status) = AppConfig::load_from(env(&[
            ("SOAPBOX_BASE_URL", "https://example.com"),
            ("SOAPBOX_ACCESS_TOKEN", "t"),
            ("SOAPBOX_PAGES", "500"),
            ("SOAPBOX_STREAMING", "maybe"),
        ]));
        assert_eq!(config.pages, 3);
        assert!(!config.streaming);
        assert_eq!(status.warnings.len(), 2);
    }

    #[test]
    fn logged_out_home_timeline_warns() {
        let (config, status) =
            AppConfig::load_from(env(&[("SOAPBOX_BASE_URL", "https://example.com")]));
        assert_eq!(config.access_token, None);
        assert!(status.warnings.iter().any(|w| w.contains("require an access token")));
    }

    #[test]
    fn settings_info_masks_secrets() {
        let info = AppConfig::settings_info(env(&[("SOAPBOX_ACCESS_TOKEN", "secret")]));
        let token = info.iter().find(|i| i.key == "SOAPBOX_ACCESS_TOKEN").unwrap();
        assert_eq!(token.value, "********");
        assert_eq!(token.setting_type, SettingType::Secret);
        let pages = info.iter().find(|i| i.key == "SOAPBOX_PAGES").unwrap();
        assert_eq!(pages.value, "3");
        assert!(!pages.has_value);
        assert_eq!(info.first().map(|i| i.key.as_str()), Some("SOAPBOX_BASE_URL"));
    }
}
