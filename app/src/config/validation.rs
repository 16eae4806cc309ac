//! Setting value validation.

use regex::Regex;
use std::sync::LazyLock;

static RE_HTTP_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/?#]+(?:/[^\s]*)?$").unwrap());
static RE_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\-.~+/=]+$").unwrap());
static RE_TIMELINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(home|public|public:local|bookmarks|hashtag:\w+|list:[\w-]+)$").unwrap()
});

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "SOAPBOX_BASE_URL" => {
            if !RE_HTTP_URL.is_match(value) {
                return Err("must be an http(s) URL".into());
            }
        }
        "SOAPBOX_ACCESS_TOKEN" => {
            if !value.is_empty() && !RE_TOKEN.is_match(value) {
                return Err("contains characters not allowed in a bearer token".into());
            }
        }
        "SOAPBOX_TIMELINE" => {
            if !RE_TIMELINE.is_match(value) {
                return Err(
                    "must be home, public, public:local, bookmarks, hashtag:<tag> or list:<id>"
                        .into(),
                );
            }
        }
        "SOAPBOX_PAGES" => validate_int_range(value, 1, 20)?,
        "SOAPBOX_REQUEST_TIMEOUT" => validate_int_range(value, 1, 300)?,
        // Boolean settings
        k if is_boolean_setting(k) => {
            if value != "true" && value != "false" {
                return Err("must be 'true' or 'false'".into());
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i32, max: i32) -> Result<(), String> {
    let v: i32 = value.parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}

fn is_boolean_setting(key: &str) -> bool {
    matches!(key, "SOAPBOX_STREAMING")
}
