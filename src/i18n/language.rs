//! Language type: a single configured content language.
//!
//! Languages are created once from [`LanguageOptions`] when the registry is
//! built and never change afterwards.

use crate::error::{CmsError, Result};
use serde::{Deserialize, Serialize};

/// Raw language entry as supplied by configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageOptions {
    /// Language code used in story paths (e.g., "en", "de")
    #[serde(default)]
    pub code: Option<String>,

    /// ISO code of the language (e.g., "en-US")
    #[serde(default)]
    pub iso: Option<String>,

    /// Whether the code is elided from public paths
    #[serde(default)]
    pub is_default: bool,

    /// Whether this language serves content missing in other languages
    #[serde(default)]
    pub is_fallback: bool,
}

impl LanguageOptions {
    pub fn new(code: &str) -> Self {
        Self {
            code: Some(code.to_string()),
            ..Self::default()
        }
    }

    pub fn with_iso(mut self, iso: &str) -> Self {
        self.iso = Some(iso.to_string());
        self
    }

    pub fn default_language(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn fallback_language(mut self) -> Self {
        self.is_fallback = true;
        self
    }
}

/// A validated content language.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    code: String,
    iso: Option<String>,
    is_default: bool,
    is_fallback: bool,
}

impl Language {
    /// Create a language from its configuration entry.
    ///
    /// # Returns
    /// * `Err(CmsError::InvalidArgument)` if the code is missing or blank
    pub fn new(options: &LanguageOptions) -> Result<Language> {
        let code = options
            .code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .ok_or_else(|| CmsError::invalid("code must be passed as parameter"))?;

        Ok(Language {
            code: code.to_string(),
            iso: options.iso.clone(),
            is_default: options.is_default,
            is_fallback: options.is_fallback,
        })
    }

    /// Language code as used in story paths.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn iso(&self) -> Option<&str> {
        self.iso.as_deref()
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn is_fallback(&self) -> bool {
        self.is_fallback
    }

    /// Whether `token` names this language by code or iso.
    pub fn matches(&self, token: &str) -> bool {
        self.code == token || self.iso.as_deref() == Some(token)
    }
}

/// Reference to a language, resolved against a registry at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageRef {
    /// Matches a code, or an iso when no code matches
    Code(String),
    /// Matches an iso only
    Iso(String),
    /// An already resolved language, matched by its code
    Resolved(Language),
}

impl From<&str> for LanguageRef {
    fn from(value: &str) -> Self {
        LanguageRef::Code(value.to_string())
    }
}

impl From<String> for LanguageRef {
    fn from(value: String) -> Self {
        LanguageRef::Code(value)
    }
}

impl From<Language> for LanguageRef {
    fn from(value: Language) -> Self {
        LanguageRef::Resolved(value)
    }
}

impl From<&Language> for LanguageRef {
    fn from(value: &Language) -> Self {
        LanguageRef::Resolved(value.clone())
    }
}
