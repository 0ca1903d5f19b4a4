//! Integration tests for the story router
//!
//! These tests run the CMS client against a mocked backend over real HTTP and
//! check the route projection of what comes back.

use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use story_router::{
    cms::{HttpTransport, VersionMode},
    config::Config,
    retry::RetryConfig,
    ClientOptions, CmsClient, CmsError, DimensionQuery, LanguageOptions, Query, TranslationMode,
};

// ==================== Test Helpers ====================

/// Create a test config pointing at the mock server
fn create_test_config(api_url: &str) -> Config {
    Config {
        api_url: api_url.to_string(),
        access_token: "test-token".to_string(),
        timeout_secs: 5,
        languages: vec![
            LanguageOptions::new("en").default_language(),
            LanguageOptions::new("de"),
        ],
        version: VersionMode::Published,
        mode: TranslationMode::TreeLevel,
        max_pages: 10,
        with_console: false,
    }
}

fn create_client(server: &MockServer) -> CmsClient {
    let config = create_test_config(&server.uri());
    let transport = HttpTransport::from_config(&config)
        .expect("Should build transport")
        .with_retry(RetryConfig::no_retry());
    CmsClient::new(Arc::new(transport), ClientOptions::from_config(&config))
        .expect("Should build client")
}

/// Records `first..=last` under `prefix`
fn create_stories(prefix: &str, first: u64, last: u64) -> Vec<Value> {
    (first..=last)
        .map(|i| {
            json!({
                "id": i,
                "uuid": format!("uuid-{}", i),
                "name": format!("Story {}", i),
                "full_slug": format!("{}/story-{}", prefix, i),
                "content": {"component": "page"}
            })
        })
        .collect()
}

async fn mount_space(server: &MockServer, version: u64) {
    Mock::given(method("GET"))
        .and(path("/cdn/spaces/me"))
        .and(query_param("token", "test-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"space": {"id": 1, "name": "Site", "version": version}})),
        )
        .mount(server)
        .await;
}

// ==================== Single Story Tests ====================

#[tokio::test]
async fn test_get_story_end_to_end() {
    let server = MockServer::start().await;
    mount_space(&server, 1700000000).await;

    Mock::given(method("GET"))
        .and(path("/cdn/stories/de/ueber-uns"))
        .and(query_param("token", "test-token"))
        .and(query_param("version", "published"))
        .and(query_param("cv", "1700000000"))
        .and(query_param("resolve_links", "url"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "story": {
                "id": 12,
                "uuid": "uuid-12",
                "name": "Über uns",
                "full_slug": "de/ueber-uns",
                "default_full_slug": "about",
                "translated_slugs": [{"path": "ueber-uns", "name": "Über uns", "lang": "de"}],
                "published_at": "2024-03-01T08:00:00.000Z",
                "content": {
                    "component": "page",
                    "body": [{
                        "component": "cta",
                        "link": {
                            "fieldtype": "multilink",
                            "linktype": "story",
                            "cached_url": "de/kontakt"
                        }
                    }]
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    client.init_cache_version().await.expect("Should read cache version");

    let story = client
        .get_story("ueber-uns", Some("de".into()), &Query::new())
        .await
        .expect("Should fetch story");

    assert_eq!(story.route.to, "/de/ueber-uns");
    assert_eq!(story.route.route_name, "ueber-uns___de");
    assert_eq!(story.alternates.len(), 1);
    assert_eq!(story.alternates[0].to, "/about");
    assert_eq!(story.content()["body"][0]["link"]["route"]["to"], "/de/kontakt");
    assert!(story.record.published_at.is_some());
}

#[tokio::test]
async fn test_missing_story_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cdn/stories/en/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!(["This record could not be found"])))
        .mount(&server)
        .await;

    let client = create_client(&server);
    let err = client
        .get_story("missing", None, &Query::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CmsError::NotFound(_)));
    assert!(err.is_resource_unavailable());
}

#[tokio::test]
async fn test_settings_for_unknown_language_use_default() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cdn/stories/en/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "story": {"id": 3, "full_slug": "settings", "content": {"component": "settings"}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let settings = client
        .get_settings(Some("it"), None, &Query::new())
        .await
        .expect("Should fetch settings");

    assert_eq!(settings.content()["component"], "settings");
    assert_eq!(settings.route.language.code(), "en");
}

// ==================== Pagination Tests ====================

#[tokio::test]
async fn test_get_stories_follows_total_header() {
    let server = MockServer::start().await;

    for (page, first, last) in [("1", 1, 100), ("2", 101, 150)] {
        Mock::given(method("GET"))
            .and(path("/cdn/stories"))
            .and(query_param("starts_with", "en/blog"))
            .and(query_param("per_page", "100"))
            .and(query_param("page", page))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("total", "150")
                    .set_body_json(json!({"stories": create_stories("en/blog", first, last)})),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = create_client(&server);
    let stories = client
        .get_stories("blog", None, &Query::new())
        .await
        .expect("Should fetch all pages");

    assert_eq!(stories.len(), 150);
    assert_eq!(stories[0].route.to, "/blog/story-1");
    assert_eq!(stories[149].id(), Some(150));
}

#[tokio::test]
async fn test_failed_page_aborts_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cdn/stories"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("total", "250")
                .set_body_json(json!({"stories": create_stories("en", 1, 100)})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cdn/stories"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream failure"))
        .mount(&server)
        .await;

    let client = create_client(&server);
    let err = client.list(&Query::new()).await.unwrap_err();

    assert!(matches!(err, CmsError::Status { status: 500, .. }));
}

// ==================== Dimension Tests ====================

#[tokio::test]
async fn test_get_dimensions_keeps_language_order() {
    let server = MockServer::start().await;

    for (prefix, first, last) in [("en", 1, 2), ("de", 3, 5)] {
        Mock::given(method("GET"))
            .and(path("/cdn/stories"))
            .and(query_param("starts_with", prefix))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("total", (last - first + 1).to_string())
                    .set_body_json(json!({"stories": create_stories(prefix, first, last)})),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = create_client(&server);
    let stories = client
        .get_dimensions(&DimensionQuery::default())
        .await
        .expect("Should fetch dimensions");

    let ids: Vec<_> = stories.iter().filter_map(|story| story.id()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    assert_eq!(stories[0].route.to, "/story-1");
    assert_eq!(stories[2].route.to, "/de/story-3");
}

#[tokio::test]
async fn test_client_from_config() {
    let server = MockServer::start().await;
    mount_space(&server, 42).await;

    let config = create_test_config(&server.uri());
    let client = CmsClient::from_config(&config).expect("Should build client");

    assert_eq!(client.init_cache_version().await.unwrap(), "42");
    assert_eq!(client.languages().codes(), vec!["en", "de"]);

    let space = client.me().await.unwrap();
    assert_eq!(space["space"]["name"], "Site");
}
