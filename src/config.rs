use anyhow::{Context, Result};

use crate::cms::VersionMode;
use crate::i18n::LanguageOptions;
use crate::routing::TranslationMode;

#[derive(Debug, Clone)]
pub struct Config {
    // Backend
    pub api_url: String,
    pub access_token: String,
    pub timeout_secs: u64,

    // Content
    pub languages: Vec<LanguageOptions>,
    pub version: VersionMode,
    pub mode: TranslationMode,
    pub max_pages: u32,

    // Diagnostics
    pub with_console: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Backend
            api_url: std::env::var("CMS_API_URL")
                .unwrap_or_else(|_| "https://api.storyblok.com/v2".to_string()),
            access_token: std::env::var("CMS_ACCESS_TOKEN")
                .context("CMS_ACCESS_TOKEN not set")?,
            timeout_secs: std::env::var("CMS_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),

            // Content
            languages: match std::env::var("CMS_LANGUAGES") {
                Ok(raw) => serde_json::from_str(&raw)
                    .context("CMS_LANGUAGES must be a JSON array of language entries")?,
                Err(_) => vec![LanguageOptions::new("en").default_language()],
            },
            version: match std::env::var("CMS_VERSION") {
                Ok(raw) => raw.parse().context("Invalid CMS_VERSION")?,
                Err(_) => VersionMode::default(),
            },
            mode: if env_flag("CMS_FIELD_LEVEL") {
                TranslationMode::FieldLevel
            } else {
                TranslationMode::TreeLevel
            },
            max_pages: std::env::var("CMS_MAX_PAGES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),

            // Diagnostics
            with_console: env_flag("CMS_WITH_CONSOLE"),
        })
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
