//! Path/route resolver.
//!
//! Turns a story path into the navigational route a web router consumes and
//! into the CMS query descriptors that fetch the story behind it.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::i18n::{Language, LanguageRef, Languages};
use crate::query::Query;
use crate::routing::slug::{LanguageFormat, Slug};

/// Fragment naming a container's own page.
pub const INDEX_FRAGMENT: &str = "index";

/// Suffix fragment of field-level list queries.
pub const WILDCARD_FRAGMENT: &str = "*";

/// Separator between the path part and the language code of a route name.
pub const ROUTE_NAME_SEPARATOR: &str = "___";

static WHITESPACE_REGEX: OnceLock<Regex> = OnceLock::new();
static NON_SLUG_REGEX: OnceLock<Regex> = OnceLock::new();

/// Where the backend keeps translations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranslationMode {
    /// One folder per language at the root of the content tree.
    #[default]
    TreeLevel,
    /// Translations live inside each record; the default language is
    /// addressed as `[default]`.
    FieldLevel,
}

impl TranslationMode {
    pub fn is_field_level(self) -> bool {
        self == TranslationMode::FieldLevel
    }

    fn language_format(self) -> LanguageFormat {
        match self {
            TranslationMode::TreeLevel => LanguageFormat::Code,
            TranslationMode::FieldLevel => LanguageFormat::DefaultAsPlaceholder,
        }
    }
}

/// Input of [`Route::resolve`].
#[derive(Debug, Clone)]
pub struct RouteOptions<'a> {
    pub path: &'a str,
    pub languages: &'a Languages,
    pub language: Option<LanguageRef>,
    pub id: Option<u64>,
    pub uuid: Option<String>,
    pub mode: TranslationMode,
}

impl<'a> RouteOptions<'a> {
    pub fn new(path: &'a str, languages: &'a Languages) -> Self {
        Self {
            path,
            languages,
            language: None,
            id: None,
            uuid: None,
            mode: TranslationMode::default(),
        }
    }

    pub fn language(mut self, language: impl Into<LanguageRef>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn id(mut self, id: Option<u64>) -> Self {
        self.id = id;
        self
    }

    pub fn uuid(mut self, uuid: Option<String>) -> Self {
        self.uuid = uuid;
        self
    }

    pub fn mode(mut self, mode: TranslationMode) -> Self {
        self.mode = mode;
        self
    }
}

/// List query variants of a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListApi {
    /// `starts_with` with the wildcard fragment in field-level mode.
    pub default: Query,
    /// `starts_with` without wildcard, for counting one language bucket.
    pub wildcard_disabled: Query,
}

impl ListApi {
    pub fn variant(&self, wildcard: bool) -> &Query {
        if wildcard {
            &self.default
        } else {
            &self.wildcard_disabled
        }
    }
}

/// CMS query descriptors of a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteApi {
    pub single: Query,
    pub list: ListApi,
}

/// A resolved, language-aware route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Public navigational path.
    pub to: String,
    /// Language-prefixed form of `to`, when it differs.
    pub alias: Option<Vec<String>>,
    /// Flat identifier usable as a routing-table key.
    pub route_name: String,
    pub language: Language,
    pub id: Option<u64>,
    pub uuid: Option<String>,
    pub api: RouteApi,
}

impl Route {
    pub fn resolve(options: RouteOptions<'_>) -> Result<Route> {
        let slug = Slug::parse(options.path, options.languages, options.language.as_ref())?;
        let language = slug.language().clone();
        let mode = options.mode;

        let without_index = slug.create().without_fragment(INDEX_FRAGMENT);

        let localized = if language.is_default() {
            without_index.clone().without_language()
        } else {
            without_index.clone().with_language(LanguageFormat::Code)
        };
        let to = localized.add_leading_slash().to_string().replace("::", "?");

        let alias = without_index
            .clone()
            .with_language(LanguageFormat::Code)
            .add_leading_slash()
            .to_string();

        let route_name = route_name(&without_index.without_language().to_string(), &language);

        let format = mode.language_format();
        let needs_index = slug.is_root() && mode.is_field_level();
        let single_path = slug
            .create()
            .with_language(format)
            .with_fragment(needs_index.then_some(INDEX_FRAGMENT))
            .to_string();

        let has_identifier = options.id.is_some() || options.uuid.is_some();
        let single = Query::new()
            .with("path", single_path)
            .with("id", options.id.map(Value::from).unwrap_or(Value::Null))
            .with("uuid", options.uuid.clone().map(Value::from).unwrap_or(Value::Null))
            .with(
                "language",
                if has_identifier {
                    Value::from(language.code())
                } else {
                    Value::Null
                },
            );

        let list = ListApi {
            default: Query::new().with(
                "starts_with",
                slug.create()
                    .with_language(format)
                    .with_fragment(mode.is_field_level().then_some(WILDCARD_FRAGMENT))
                    .to_string(),
            ),
            wildcard_disabled: Query::new().with(
                "starts_with",
                slug.create().with_language(format).to_string(),
            ),
        };

        Ok(Route {
            alias: (alias != to).then(|| vec![alias]),
            to,
            route_name,
            language,
            id: options.id,
            uuid: options.uuid,
            api: RouteApi { single, list },
        })
    }

    /// Whether this route points at the default-language variant.
    pub fn is_default_language(&self) -> bool {
        self.language.is_default()
    }
}

/// Resolve `path` in tree-level mode with language detection.
pub fn resolve_route(path: &str, languages: &Languages) -> Result<Route> {
    Route::resolve(RouteOptions::new(path, languages))
}

fn route_name(path_without_language: &str, language: &Language) -> String {
    let base = if path_without_language.is_empty() {
        INDEX_FRAGMENT
    } else {
        path_without_language
    };

    let spaced = base.replace("::", "-o-").replace(':', "-p-").replace('/', " ");
    format!("{}{}{}", slugify(&spaced), ROUTE_NAME_SEPARATOR, language.code())
}

fn slugify(text: &str) -> String {
    let whitespace = WHITESPACE_REGEX.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"));
    let non_slug = NON_SLUG_REGEX.get_or_init(|| Regex::new(r"[^\w-]+").expect("valid slug regex"));

    let lowered = text.trim().to_lowercase();
    let dashed = whitespace.replace_all(&lowered, "-");
    non_slug.replace_all(&dashed, "").into_owned()
}
