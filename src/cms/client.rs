//! CMS client: query construction, pagination and story read operations.

use std::sync::Arc;

use futures::future::join_all;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cms::transport::{ApiResponse, HttpTransport, Transport};
use crate::cms::version::{select_version, EnvironmentProbe, StaticProbe, Version, VersionMode};
use crate::config::Config;
use crate::error::{CmsError, Result};
use crate::i18n::{LanguageOptions, LanguageRef, Languages};
use crate::query::Query;
use crate::routing::{Route, RouteOptions, TranslationMode};
use crate::story::{Story, StoryRecord};

/// Endpoint of story requests; identifiers are appended as path segments.
pub const STORIES_ENDPOINT: &str = "cdn/stories";

/// Endpoint describing the current space.
pub const SPACE_ENDPOINT: &str = "cdn/spaces/me";

/// Page size used by [`CmsClient::list`].
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Upper bound on pages fetched by one [`CmsClient::list`] call.
pub const DEFAULT_MAX_PAGES: u32 = 1000;

pub const DEFAULT_SETTINGS_SLUG: &str = "settings";

/// Construction options of [`CmsClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub languages: Vec<LanguageOptions>,
    pub version: VersionMode,
    pub mode: TranslationMode,
    /// Initial cache-version token, usually set by [`CmsClient::init_cache_version`]
    pub cache_version: Option<String>,
    pub max_pages: u32,
}

impl ClientOptions {
    pub fn new(languages: Vec<LanguageOptions>) -> Self {
        Self {
            languages,
            version: VersionMode::default(),
            mode: TranslationMode::default(),
            cache_version: None,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            languages: config.languages.clone(),
            version: config.version,
            mode: config.mode,
            cache_version: None,
            max_pages: config.max_pages,
        }
    }
}

/// One page of a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub stories: Vec<Story>,
    pub total: u64,
}

/// Parameters of [`CmsClient::get_dimensions`].
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionQuery {
    /// Language codes to fetch; all configured languages when `None`
    pub languages: Option<Vec<String>>,
    pub slug: String,
    pub wildcard: bool,
    pub query: Query,
}

impl Default for DimensionQuery {
    fn default() -> Self {
        Self {
            languages: None,
            slug: "/".to_string(),
            wildcard: true,
            query: Query::new(),
        }
    }
}

/// One page of a collection, as delivered by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPage {
    pub records: Vec<StoryRecord>,
    pub total: u64,
}

enum Fetched {
    Single(StoryRecord),
    Collection {
        records: Vec<StoryRecord>,
        total: Option<u64>,
    },
}

pub struct CmsClient {
    transport: Arc<dyn Transport>,
    languages: Languages,
    version: VersionMode,
    mode: TranslationMode,
    probe: Arc<dyn EnvironmentProbe>,
    cache_version: RwLock<Option<String>>,
    max_pages: u32,
}

impl CmsClient {
    /// # Returns
    /// * `Err(CmsError::InvalidArgument)` if the language list is invalid
    pub fn new(transport: Arc<dyn Transport>, options: ClientOptions) -> Result<Self> {
        Ok(Self {
            transport,
            languages: Languages::new(&options.languages)?,
            version: options.version,
            mode: options.mode,
            probe: Arc::new(StaticProbe::default()),
            cache_version: RwLock::new(options.cache_version),
            max_pages: options.max_pages.max(1),
        })
    }

    /// Client talking HTTP to the configured backend.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpTransport::from_config(config)?;
        Self::new(Arc::new(transport), ClientOptions::from_config(config))
    }

    pub fn with_probe(mut self, probe: Arc<dyn EnvironmentProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn languages(&self) -> &Languages {
        &self.languages
    }

    pub fn mode(&self) -> TranslationMode {
        self.mode
    }

    /// Version used for the next request.
    pub fn version(&self) -> Version {
        select_version(
            self.version,
            self.probe.is_editor_mode(),
            self.probe.has_draft_marker(),
        )
    }

    pub async fn cache_version(&self) -> Option<String> {
        self.cache_version.read().await.clone()
    }

    /// Resolve a route against this client's languages and mode.
    pub fn route(&self, slug: &str, language: Option<LanguageRef>) -> Result<Route> {
        let mut options = RouteOptions::new(slug, &self.languages).mode(self.mode);
        options.language = language;
        Route::resolve(options)
    }

    /// Default query skeleton merged with `overrides`.
    pub async fn build_query(&self, overrides: &Query) -> Query {
        let cache_version = self
            .cache_version()
            .await
            .map(Value::from)
            .unwrap_or(Value::Null);

        Query::new()
            .with("path", Value::Null)
            .with("id", Value::Null)
            .with("uuid", Value::Null)
            .with("starts_with", Value::Null)
            .with("is_startpage", Value::Null)
            .with("version", self.version().as_str())
            .with("cv", cache_version)
            .with("filter_query", Value::Null)
            .with("sort_by", Value::Null)
            .with("by_uuids", Value::Null)
            .with("per_page", DEFAULT_PER_PAGE)
            .with("page", Value::Null)
            .with("resolve_links", "url")
            .with("meta", Value::Object(Map::new()))
            .merge(overrides)
    }

    /// Fetch a single story by the `path`, `id` or `uuid` in `query`.
    pub async fn find(&self, query: &Query) -> Result<Story> {
        let record = self.find_raw(query).await?;
        self.project(record)
    }

    /// Like [`CmsClient::find`], without route projection.
    pub async fn find_raw(&self, query: &Query) -> Result<StoryRecord> {
        match self.request(query).await? {
            Fetched::Single(record) => Ok(record),
            Fetched::Collection { .. } => Err(CmsError::Decode(
                "expected a single story, received a collection".to_string(),
            )),
        }
    }

    /// Fetch one page of a collection.
    pub async fn page(&self, query: &Query, per_page: u32, page: u32) -> Result<Page> {
        let RawPage { records, total } = self.page_raw(query, per_page, page).await?;
        let stories = records
            .into_iter()
            .map(|record| self.project(record))
            .collect::<Result<Vec<_>>>()?;
        Ok(Page { stories, total })
    }

    /// Like [`CmsClient::page`], without route projection.
    ///
    /// Folders and other records without a routable `full_slug` come back
    /// as they are.
    pub async fn page_raw(&self, query: &Query, per_page: u32, page: u32) -> Result<RawPage> {
        let mut query = query.clone();
        if let Some(path) = query.remove("path").filter(|path| !path.is_null()) {
            query.insert("starts_with", path);
        }
        let query = query.with("per_page", per_page).with("page", page);

        match self.request(&query).await? {
            Fetched::Collection {
                records,
                total: Some(total),
            } => Ok(RawPage { records, total }),
            Fetched::Collection { total: None, .. } => Err(CmsError::Decode(
                "collection response without total".to_string(),
            )),
            Fetched::Single(_) => Err(CmsError::Decode(
                "expected a collection, received a single story".to_string(),
            )),
        }
    }

    /// The untouched backend response for `query`, `total` included.
    pub async fn response(&self, query: &Query) -> Result<ApiResponse> {
        let (response, _) = self.send(query).await?;
        Ok(response)
    }

    /// Fetch every page of a collection.
    ///
    /// Stops once the reported total is covered. Fails with
    /// `CmsError::Pagination` when the total changes between pages or more
    /// than `max_pages` pages would be needed.
    pub async fn list(&self, query: &Query) -> Result<Vec<Story>> {
        let per_page = DEFAULT_PER_PAGE;
        let mut stories = Vec::new();
        let mut expected_total: Option<u64> = None;
        let mut current: u32 = 0;

        loop {
            current += 1;
            if current > self.max_pages {
                return Err(CmsError::Pagination(format!(
                    "more than {} pages requested",
                    self.max_pages
                )));
            }

            let page = self.page(query, per_page, current).await?;
            if let Some(expected) = expected_total {
                if expected != page.total {
                    return Err(CmsError::Pagination(format!(
                        "total changed from {} to {} on page {}",
                        expected, page.total, current
                    )));
                }
            }
            expected_total = Some(page.total);
            stories.extend(page.stories);

            if page.total == 0 || page.total <= u64::from(current) * u64::from(per_page) {
                break;
            }
        }

        debug!("Fetched {} stories in {} pages", stories.len(), current);
        Ok(stories)
    }

    /// All stories of one route's language bucket.
    pub async fn dimension(&self, route: &Route, wildcard: bool, query: &Query) -> Result<Vec<Story>> {
        let list_query = route.api.list.variant(wildcard).clone().merge(query);
        self.list(&list_query).await
    }

    pub async fn get_story(&self, slug: &str, language: Option<LanguageRef>, query: &Query) -> Result<Story> {
        let route = self.route(slug, language)?;
        self.find(&route.api.single.clone().merge(query)).await
    }

    /// Settings story of a language; unknown or missing languages use the default.
    pub async fn get_settings(&self, language: Option<&str>, slug: Option<&str>, query: &Query) -> Result<Story> {
        let language = language
            .and_then(|code| self.languages.find_by_str(code))
            .or_else(|| self.languages.default())
            .map(LanguageRef::from);

        self.get_story(slug.unwrap_or(DEFAULT_SETTINGS_SLUG), language, query)
            .await
    }

    pub async fn get_stories(&self, slug: &str, language: Option<LanguageRef>, query: &Query) -> Result<Vec<Story>> {
        let route = self.route(slug, language)?;
        self.list(&route.api.list.default.clone().merge(query)).await
    }

    /// Stories of several language buckets, fetched concurrently.
    ///
    /// Results are concatenated in the order of the requested languages.
    pub async fn get_dimensions(&self, request: &DimensionQuery) -> Result<Vec<Story>> {
        let codes = request
            .languages
            .clone()
            .unwrap_or_else(|| self.languages.codes());

        let routes = codes
            .iter()
            .map(|code| self.route(&request.slug, Some(LanguageRef::from(code.as_str()))))
            .collect::<Result<Vec<_>>>()?;

        let results = join_all(
            routes
                .iter()
                .map(|route| self.dimension(route, request.wildcard, &request.query)),
        )
        .await;

        let mut stories = Vec::new();
        for result in results {
            stories.extend(result?);
        }

        info!(
            "Fetched {} stories across {} language dimensions",
            stories.len(),
            codes.len()
        );
        Ok(stories)
    }

    /// Raw space metadata.
    pub async fn me(&self) -> Result<Value> {
        let response = self.transport.get(SPACE_ENDPOINT, &[]).await?;
        if response.data.get("space").is_none() {
            return Err(CmsError::Decode("space response without space".to_string()));
        }
        Ok(response.data)
    }

    /// Seed the cache-version token from the space metadata.
    pub async fn init_cache_version(&self) -> Result<String> {
        let data = self.me().await?;
        let token = match data.pointer("/space/version") {
            Some(Value::String(token)) => token.clone(),
            Some(Value::Number(number)) => number.to_string(),
            _ => {
                return Err(CmsError::Decode(
                    "space response without version".to_string(),
                ))
            }
        };

        *self.cache_version.write().await = Some(token.clone());
        info!("Cache version initialized: {}", token);
        Ok(token)
    }

    async fn request(&self, overrides: &Query) -> Result<Fetched> {
        let (response, meta) = self.send(overrides).await?;
        decode_response(response, &meta)
    }

    /// Prepare `overrides` and hand them to the transport.
    ///
    /// Returns the response with the `meta` fields to merge into its records.
    async fn send(&self, overrides: &Query) -> Result<(ApiResponse, Map<String, Value>)> {
        let mut query = self.build_query(overrides).await;

        let meta = match query.remove("meta") {
            Some(Value::Object(meta)) => meta,
            _ => Map::new(),
        };
        let path = query.remove("path");

        let identifier = [query.get("id"), query.get("uuid"), path.as_ref()]
            .into_iter()
            .flatten()
            .find_map(identifier_segment);
        let endpoint = match identifier {
            Some(identifier) => format!("{}/{}", STORIES_ENDPOINT, identifier),
            None => STORIES_ENDPOINT.to_string(),
        };

        debug!("Requesting {} with {:?}", endpoint, query);
        let response = self.transport.get(&endpoint, &query.to_params()).await?;
        Ok((response, meta))
    }

    /// A record the backend delivered but that cannot be routed is a bad
    /// payload, not a caller mistake.
    fn project(&self, record: StoryRecord) -> Result<Story> {
        Story::project(record, &self.languages, self.mode).map_err(|e| match e {
            CmsError::InvalidArgument(message) => {
                CmsError::Decode(format!("story cannot be projected: {}", message))
            }
            other => other,
        })
    }
}

fn decode_response(response: ApiResponse, meta: &Map<String, Value>) -> Result<Fetched> {
    let ApiResponse { data, total } = response;

    if let Some(Value::Array(records)) = data.get("stories") {
        let records = records
            .iter()
            .map(|record| decode_record(record, meta))
            .collect::<Result<Vec<_>>>()?;
        return Ok(Fetched::Collection { records, total });
    }

    if let Some(record @ Value::Object(_)) = data.get("story") {
        return Ok(Fetched::Single(decode_record(record, meta)?));
    }

    Err(CmsError::Decode(
        "response holds neither a story nor a story collection".to_string(),
    ))
}

fn decode_record(record: &Value, meta: &Map<String, Value>) -> Result<StoryRecord> {
    let mut record = record.clone();
    if let Value::Object(fields) = &mut record {
        for (key, value) in meta {
            fields.insert(key.clone(), value.clone());
        }
    }
    Ok(serde_json::from_value(record)?)
}

fn identifier_segment(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
