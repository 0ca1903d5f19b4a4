//! Resolve one story and print its route and alternates.
//!
//! Usage:
//!   story-router <slug> [language]
//!
//! Required environment variables:
//! - CMS_ACCESS_TOKEN
//!
//! Optional:
//! - CMS_API_URL (defaults to https://api.storyblok.com/v2)
//! - CMS_LANGUAGES (JSON array, defaults to a single default "en")
//! - CMS_VERSION, CMS_FIELD_LEVEL, CMS_MAX_PAGES, CMS_TIMEOUT_SECS
//! - CMS_WITH_CONSOLE (log progress at info level)

use anyhow::{Context, Result};
use serde_json::json;
use story_router::{config::Config, CmsClient, LanguageRef, Query};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    let directive = if config.with_console {
        "story_router=info"
    } else {
        "story_router=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let slug = args
        .next()
        .context("Usage: story-router <slug> [language]")?;
    let language = args.next().map(LanguageRef::from);

    let client = CmsClient::from_config(&config)?;
    client
        .init_cache_version()
        .await
        .context("Failed to read space cache version")?;

    info!("Fetching story {:?}", slug);
    let story = client
        .get_story(&slug, language, &Query::new())
        .await
        .with_context(|| format!("Failed to fetch story {:?}", slug))?;

    let output = json!({
        "route": story.route,
        "alternates": story.alternates,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
