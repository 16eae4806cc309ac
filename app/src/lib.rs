//! Headless Soapbox client: configuration, session lifecycle and timeline sync.

pub mod config;
pub mod session;
pub mod sync;
#[cfg(test)]
mod tests;

use config::AppConfig;
use config::ConfigStatus;

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// Load .env and the runtime config. Fails when a required setting is
/// missing; other problems are logged as warnings.
pub fn init_config() -> Result<(AppConfig, ConfigStatus), anyhow::Error> {
    load_dotenv();

    let (config, status) = AppConfig::load();
    for setting in AppConfig::settings_info(|key| std::env::var(key).ok()) {
        tracing::debug!(key = %setting.key, value = %setting.value, "Setting");
    }
    if !status.warnings.is_empty() {
        tracing::warn!("Config warnings: {:?}", status.warnings);
    }
    if !status.is_ready() {
        anyhow::bail!("Missing settings: {:?}", status.missing_settings);
    }

    tracing::info!(base_url = %config.base_url, timeline = %config.timeline.list_key(), "Settings loaded");
    Ok((config, status))
}
