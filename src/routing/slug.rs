//! Slug algebra: a story path as an ordered list of language-aware fragments.
//!
//! A [`Slug`] is parsed once. [`Slug::create`] hands out a [`SlugPath`]
//! snapshot and every transform consumes that snapshot and returns a new one,
//! so chains never share state:
//!
//! ```rust,ignore
//! let to = slug
//!     .create()
//!     .without_fragment("index")
//!     .without_language()
//!     .add_leading_slash()
//!     .to_string();
//! ```

use std::fmt;

use crate::error::{CmsError, Result};
use crate::i18n::{Language, LanguageRef, Languages};

/// Path segment rendered in place of the default language's code.
pub const DEFAULT_LANGUAGE_PLACEHOLDER: &str = "[default]";

/// One `/`-delimited segment of a slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugFragment {
    pub path: String,
    pub is_language: bool,
    pub language: Option<Language>,
}

impl SlugFragment {
    fn content(path: &str) -> Self {
        Self {
            path: path.to_string(),
            is_language: false,
            language: None,
        }
    }

    fn language(path: &str, language: &Language) -> Self {
        Self {
            path: path.to_string(),
            is_language: true,
            language: Some(language.clone()),
        }
    }
}

/// How the language fragment is rendered by [`SlugPath::with_language`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LanguageFormat {
    /// Always the language token.
    #[default]
    Code,
    /// `[default]` for the default language, the token otherwise.
    DefaultAsPlaceholder,
}

/// A parsed story path.
///
/// Invariant: exactly one fragment is a language fragment and it sits at
/// index 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slug {
    fragments: Vec<SlugFragment>,
    language: Language,
}

impl Slug {
    /// Parse `path` against the registry.
    ///
    /// The language is the explicit one when given, else the first segment
    /// naming a configured language, else the registry default. Fails when
    /// none of those resolves.
    pub fn parse(path: &str, languages: &Languages, language: Option<&LanguageRef>) -> Result<Self> {
        let mut segments: Vec<&str> = path
            .split('/')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .collect();

        let token_index = segments
            .iter()
            .position(|segment| languages.is_language_token(segment));
        let token_language = token_index.and_then(|index| languages.find_by_str(segments[index]));

        let resolved = match language {
            Some(reference) => languages.find(reference).ok_or_else(|| {
                CmsError::invalid(format!("unknown language {:?}", reference))
            })?,
            None => token_language
                .or_else(|| languages.default())
                .ok_or_else(|| {
                    CmsError::invalid(format!(
                        "no language found in path {:?} and no default language configured",
                        path
                    ))
                })?,
        };

        let language_fragment = match token_index {
            Some(index) => {
                let token = segments.remove(index);
                // an explicit language overrides a conflicting token
                if token_language.map(Language::code) == Some(resolved.code()) {
                    SlugFragment::language(token, resolved)
                } else {
                    SlugFragment::language(resolved.code(), resolved)
                }
            }
            None => SlugFragment::language(resolved.code(), resolved),
        };

        let mut fragments = Vec::with_capacity(segments.len() + 1);
        fragments.push(language_fragment);
        fragments.extend(segments.into_iter().map(SlugFragment::content));

        Ok(Self {
            fragments,
            language: resolved.clone(),
        })
    }

    pub fn fragments(&self) -> &[SlugFragment] {
        &self.fragments
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// True when the slug holds nothing but its language fragment.
    pub fn is_root(&self) -> bool {
        self.fragments.len() < 2
    }

    /// Snapshot the fragments into a transformable path.
    pub fn create(&self) -> SlugPath {
        SlugPath {
            fragments: self.fragments.clone(),
            language: self.fragments[0].clone(),
            leading_slash: false,
            trailing_slash: false,
        }
    }
}

/// Immutable working copy of a slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugPath {
    fragments: Vec<SlugFragment>,
    language: SlugFragment,
    leading_slash: bool,
    trailing_slash: bool,
}

impl SlugPath {
    pub fn add_leading_slash(mut self) -> Self {
        self.leading_slash = true;
        self
    }

    pub fn remove_leading_slash(mut self) -> Self {
        self.leading_slash = false;
        self
    }

    pub fn add_trailing_slash(mut self) -> Self {
        self.trailing_slash = true;
        self
    }

    pub fn remove_trailing_slash(mut self) -> Self {
        self.trailing_slash = false;
        self
    }

    /// Put the language fragment back in front, rendered per `format`.
    pub fn with_language(mut self, format: LanguageFormat) -> Self {
        self.fragments.retain(|fragment| !fragment.is_language);

        let mut fragment = self.language.clone();
        let is_default = fragment
            .language
            .as_ref()
            .map(Language::is_default)
            .unwrap_or(false);
        if format == LanguageFormat::DefaultAsPlaceholder && is_default {
            fragment.path = DEFAULT_LANGUAGE_PLACEHOLDER.to_string();
        }

        self.fragments.insert(0, fragment);
        self
    }

    pub fn without_language(mut self) -> Self {
        self.fragments.retain(|fragment| !fragment.is_language);
        self
    }

    /// Append a literal fragment. `None` and empty values append nothing.
    pub fn with_fragment(mut self, fragment: Option<&str>) -> Self {
        if let Some(path) = fragment.map(str::trim).filter(|path| !path.is_empty()) {
            self.fragments.push(SlugFragment::content(path));
        }
        self
    }

    /// Remove every content fragment equal to `fragment`.
    pub fn without_fragment(mut self, fragment: &str) -> Self {
        self.fragments
            .retain(|existing| existing.is_language || existing.path != fragment);
        self
    }
}

impl fmt::Display for SlugPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = self
            .fragments
            .iter()
            .map(|fragment| fragment.path.trim())
            .collect::<Vec<_>>()
            .join("/");

        if body.is_empty() {
            if self.leading_slash || self.trailing_slash {
                f.write_str("/")?;
            }
            return Ok(());
        }

        if self.leading_slash {
            f.write_str("/")?;
        }
        f.write_str(&body)?;
        if self.trailing_slash {
            f.write_str("/")?;
        }
        Ok(())
    }
}
