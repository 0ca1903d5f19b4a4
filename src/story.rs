//! Story projection.
//!
//! Decorates raw CMS records with their [`Route`], alternate-language routes
//! and routes on every story link inside `content`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{CmsError, Result};
use crate::i18n::Languages;
use crate::routing::{Route, RouteOptions, TranslationMode};

/// Keys a projected [`Story`] serializes from its own fields.
const PROJECTED_KEYS: &[&str] = &["route", "alternates"];

/// One translated variant listed on a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedSlug {
    pub path: String,
    #[serde(default)]
    pub name: Option<String>,
    pub lang: String,
}

/// A record as delivered by the CMS. Unknown fields are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryRecord {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub full_slug: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub parent_id: Option<u64>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub is_startpage: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub first_published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sort_by_date: Option<String>,
    #[serde(default)]
    pub tag_list: Vec<String>,
    #[serde(default)]
    pub meta_data: Value,
    #[serde(default)]
    pub translated_slugs: Option<Vec<TranslatedSlug>>,
    #[serde(default)]
    pub default_full_slug: Option<String>,
    #[serde(default)]
    pub content: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A projected record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Story {
    #[serde(flatten)]
    pub record: StoryRecord,
    pub route: Route,
    pub alternates: Vec<Route>,
}

impl Story {
    /// Project a record against the registry.
    ///
    /// Raw `route` and `alternates` entries of the record are dropped; the
    /// projected ones replace them.
    ///
    /// # Returns
    /// * `Err(CmsError::InvalidArgument)` if the record has none of `uuid`,
    ///   `id`, `full_slug`, or has no `full_slug` to build its route from
    pub fn project(mut record: StoryRecord, languages: &Languages, mode: TranslationMode) -> Result<Story> {
        if record.uuid.is_none() && record.id.is_none() && record.full_slug.is_none() {
            return Err(CmsError::invalid(
                "one identifier must be provided. either uuid, id or full_slug",
            ));
        }
        let full_slug = record
            .full_slug
            .as_deref()
            .ok_or_else(|| CmsError::invalid("full_slug is required to resolve a story route"))?;

        let route = Route::resolve(
            RouteOptions::new(full_slug, languages)
                .id(record.id)
                .uuid(record.uuid.clone())
                .mode(mode),
        )?;

        let alternates = alternates(&record, &route, languages, mode)?;
        record.content = rewrite_links(&record.content, languages, mode)?;
        for key in PROJECTED_KEYS {
            record.extra.remove(*key);
        }

        Ok(Story {
            record,
            route,
            alternates,
        })
    }

    /// Deserialize a raw JSON record and project it.
    pub fn from_value(value: Value, languages: &Languages, mode: TranslationMode) -> Result<Story> {
        let record: StoryRecord = serde_json::from_value(value)?;
        Story::project(record, languages, mode)
    }

    pub fn id(&self) -> Option<u64> {
        self.record.id
    }

    pub fn uuid(&self) -> Option<&str> {
        self.record.uuid.as_deref()
    }

    pub fn full_slug(&self) -> Option<&str> {
        self.record.full_slug.as_deref()
    }

    pub fn content(&self) -> &Value {
        &self.record.content
    }
}

fn alternates(
    record: &StoryRecord,
    route: &Route,
    languages: &Languages,
    mode: TranslationMode,
) -> Result<Vec<Route>> {
    let mut alternates = Vec::new();

    for translated in record.translated_slugs.iter().flatten() {
        let Some(language) = languages.find_by_str(&translated.lang) else {
            debug!(
                "Skipping alternate {:?}: language {:?} is not configured",
                translated.path, translated.lang
            );
            continue;
        };
        if language.code() == route.language.code() {
            continue;
        }

        let path = format!("{}/{}", translated.lang, translated.path);
        alternates.push(Route::resolve(
            RouteOptions::new(&path, languages)
                .language(language)
                .mode(mode),
        )?);
    }

    // translated slugs never list the default language
    if !route.language.is_default() {
        if let Some(default_full_slug) = record.default_full_slug.as_deref() {
            let default_route = match languages.default() {
                Some(default) => RouteOptions::new(default_full_slug, languages).language(default),
                None => RouteOptions::new(default_full_slug, languages),
            };
            alternates.push(Route::resolve(default_route.mode(mode))?);
        }
    }

    Ok(alternates)
}

/// Return a copy of `content` where every story link carries a `route`.
///
/// Story links are multilink objects with `linktype = "story"` and resolved
/// story objects (carrying `alternates` and `uuid`). The root node itself is
/// never decorated.
pub fn rewrite_links(content: &Value, languages: &Languages, mode: TranslationMode) -> Result<Value> {
    match content {
        Value::Object(map) => Ok(Value::Object(rewrite_children(map, languages, mode)?)),
        other => rewrite_node(other, languages, mode),
    }
}

fn rewrite_node(value: &Value, languages: &Languages, mode: TranslationMode) -> Result<Value> {
    match value {
        Value::Object(map) => {
            let mut rewritten = rewrite_children(map, languages, mode)?;
            if let Some(route) = link_route(&rewritten, languages, mode)? {
                rewritten.insert("route".to_string(), serde_json::to_value(route)?);
            }
            Ok(Value::Object(rewritten))
        }
        Value::Array(items) => items
            .iter()
            .map(|item| rewrite_node(item, languages, mode))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        scalar => Ok(scalar.clone()),
    }
}

fn rewrite_children(
    map: &Map<String, Value>,
    languages: &Languages,
    mode: TranslationMode,
) -> Result<Map<String, Value>> {
    let mut rewritten = Map::with_capacity(map.len());
    for (key, child) in map {
        rewritten.insert(key.clone(), rewrite_node(child, languages, mode)?);
    }
    Ok(rewritten)
}

fn link_route(
    node: &Map<String, Value>,
    languages: &Languages,
    mode: TranslationMode,
) -> Result<Option<Route>> {
    let is_story_link = node.get("fieldtype").and_then(Value::as_str) == Some("multilink")
        && node.get("linktype").and_then(Value::as_str) == Some("story");

    if is_story_link {
        let path = node
            .get("story")
            .and_then(|story| story.get("full_slug"))
            .and_then(Value::as_str)
            .or_else(|| node.get("cached_url").and_then(Value::as_str));

        return match path {
            Some(path) => Route::resolve(RouteOptions::new(path, languages).mode(mode)).map(Some),
            None => Ok(None),
        };
    }

    if node.contains_key("alternates") && node.contains_key("uuid") {
        let Some(path) = node.get("full_slug").and_then(Value::as_str) else {
            return Ok(None);
        };
        return Route::resolve(
            RouteOptions::new(path, languages)
                .id(node.get("id").and_then(Value::as_u64))
                .uuid(node.get("uuid").and_then(Value::as_str).map(str::to_string))
                .mode(mode),
        )
        .map(Some);
    }

    Ok(None)
}
