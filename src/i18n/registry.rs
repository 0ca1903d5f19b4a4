//! Language registry: lookup collection over the configured languages.
//!
//! Unlike a global singleton, every client owns its registry so tests can
//! swap in any language set.

use crate::error::{CmsError, Result};
use crate::i18n::{Language, LanguageOptions, LanguageRef};

/// Ordered collection of configured languages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Languages {
    items: Vec<Language>,
}

impl Languages {
    /// Build the registry from configuration entries.
    ///
    /// # Returns
    /// * `Err(CmsError::InvalidArgument)` if an entry has no code, or if more
    ///   than one entry claims to be the default or the fallback language
    pub fn new(options: &[LanguageOptions]) -> Result<Self> {
        let items = options
            .iter()
            .map(Language::new)
            .collect::<Result<Vec<_>>>()?;

        let defaults = items.iter().filter(|lang| lang.is_default()).count();
        if defaults > 1 {
            return Err(CmsError::invalid(format!(
                "{} languages are flagged as default, at most one is allowed",
                defaults
            )));
        }

        let fallbacks = items.iter().filter(|lang| lang.is_fallback()).count();
        if fallbacks > 1 {
            return Err(CmsError::invalid(format!(
                "{} languages are flagged as fallback, at most one is allowed",
                fallbacks
            )));
        }

        Ok(Self { items })
    }

    /// All languages in configuration order.
    pub fn items(&self) -> &[Language] {
        &self.items
    }

    /// All language codes in configuration order.
    pub fn codes(&self) -> Vec<String> {
        self.items.iter().map(|lang| lang.code().to_string()).collect()
    }

    /// Find a language by code or iso.
    pub fn find_by_str(&self, token: &str) -> Option<&Language> {
        self.items.iter().find(|lang| lang.matches(token))
    }

    /// Find a language by reference.
    pub fn find(&self, language: &LanguageRef) -> Option<&Language> {
        match language {
            LanguageRef::Code(token) => self.find_by_str(token),
            LanguageRef::Iso(iso) => self
                .items
                .iter()
                .find(|lang| lang.iso() == Some(iso.as_str())),
            LanguageRef::Resolved(resolved) => self
                .items
                .iter()
                .find(|lang| lang.code() == resolved.code()),
        }
    }

    pub fn is_valid(&self, language: &LanguageRef) -> bool {
        self.find(language).is_some()
    }

    /// Whether a raw path segment names a configured language.
    pub fn is_language_token(&self, token: &str) -> bool {
        self.find_by_str(token).is_some()
    }

    /// The language whose code is elided from public paths.
    pub fn default(&self) -> Option<&Language> {
        self.items.iter().find(|lang| lang.is_default())
    }

    pub fn fallback(&self) -> Option<&Language> {
        self.items.iter().find(|lang| lang.is_fallback())
    }
}
