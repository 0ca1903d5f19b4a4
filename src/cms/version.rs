//! Content version selection (draft vs. published).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CmsError;

/// Configured version policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionMode {
    #[default]
    Published,
    Draft,
    /// Draft inside the visual editor or when a draft marker was persisted.
    Auto,
}

impl FromStr for VersionMode {
    type Err = CmsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "published" => Ok(VersionMode::Published),
            "draft" => Ok(VersionMode::Draft),
            "auto" => Ok(VersionMode::Auto),
            other => Err(CmsError::invalid(format!(
                "unknown version mode {:?}, expected published, draft or auto",
                other
            ))),
        }
    }
}

/// Version sent as the `version` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Version {
    Draft,
    Published,
}

impl Version {
    pub fn as_str(self) -> &'static str {
        match self {
            Version::Draft => "draft",
            Version::Published => "published",
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pure version decision.
pub fn select_version(mode: VersionMode, editor_mode: bool, draft_marker: bool) -> Version {
    match mode {
        VersionMode::Published => Version::Published,
        VersionMode::Draft => Version::Draft,
        VersionMode::Auto if editor_mode || draft_marker => Version::Draft,
        VersionMode::Auto => Version::Published,
    }
}

/// Reports the host environment's preview state to the client.
pub trait EnvironmentProbe: Send + Sync {
    /// Whether the page is rendered inside the CMS visual editor.
    fn is_editor_mode(&self) -> bool;

    /// Whether a draft-mode marker was persisted by an earlier editor session.
    fn has_draft_marker(&self) -> bool;
}

/// Probe with fixed answers; the default reports a plain visitor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaticProbe {
    pub editor_mode: bool,
    pub draft_marker: bool,
}

impl EnvironmentProbe for StaticProbe {
    fn is_editor_mode(&self) -> bool {
        self.editor_mode
    }

    fn has_draft_marker(&self) -> bool {
        self.draft_marker
    }
}
