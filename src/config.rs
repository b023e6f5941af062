//! Configuration handling for the profile form

use crate::directory::HttpUserDirectory;
use crate::state::forms::FormSettings;
use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the directory address
pub const DIRECTORY_URL_ENV: &str = "PROFILE_FORM_DIRECTORY_URL";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// User configuration for the profile form
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FormConfig {
    /// User directory base URL
    pub directory_url: Option<String>,
    /// Directory id of the user seeding the email field
    pub seed_user_id: Option<u32>,
    /// Username the form starts with
    pub default_username: Option<String>,
    /// Email address that may not be used
    pub reserved_email: Option<String>,
    /// Email domain suffix that is not supported
    pub blocked_domain: Option<String>,
    /// Directory request timeout in seconds
    pub request_timeout_secs: Option<u64>,
}

impl FormConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "profile-form", "profile-form-tui")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if let Some(path) = path {
            if path.exists() {
                let content = fs::read_to_string(&path)?;
                let config: FormConfig = serde_json::from_str(&content)?;
                tracing::debug!("Loaded config from {}", path.display());
                return Ok(config);
            }
        }

        Ok(Self::default())
    }

    /// Directory address: environment first, then file, then the public default
    pub fn directory_url(&self) -> String {
        std::env::var(DIRECTORY_URL_ENV)
            .ok()
            .or_else(|| self.directory_url.clone())
            .unwrap_or_else(|| crate::directory::DEFAULT_ADDRESS.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Form settings with defaults filled in
    pub fn form_settings(&self) -> FormSettings {
        let defaults = FormSettings::default();
        FormSettings {
            seed_user_id: self.seed_user_id.unwrap_or(defaults.seed_user_id),
            default_username: self
                .default_username
                .clone()
                .unwrap_or(defaults.default_username),
            reserved_email: self
                .reserved_email
                .clone()
                .unwrap_or(defaults.reserved_email),
            blocked_domain: self
                .blocked_domain
                .clone()
                .unwrap_or(defaults.blocked_domain),
        }
    }

    /// Build the HTTP directory client described by this config
    pub fn directory(&self) -> Result<HttpUserDirectory> {
        let url = self.directory_url();
        tracing::info!("Using user directory at {url}");
        Ok(HttpUserDirectory::new(&url, self.request_timeout())?)
    }
}
