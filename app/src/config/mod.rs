//! Configuration management: defaults, validation, loading from the environment.

pub mod app_config;
pub mod defaults;
pub mod validation;

pub use app_config::AppConfig;

use serde::{Deserialize, Serialize};

/// Setting type: normal or secret (masked when listed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingType {
    Normal,
    Secret,
}

/// A setting as shown in the startup overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingInfo {
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub setting_type: SettingType,
    pub required: bool,
    pub description: String,
    pub has_value: bool,
}

/// Outcome of loading the configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigStatus {
    pub missing_settings: Vec<String>,
    pub warnings: Vec<String>,
}

impl ConfigStatus {
    pub fn is_ready(&self) -> bool {
        self.missing_settings.is_empty()
    }
}
