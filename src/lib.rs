//! Language-aware routing and story fetching for a headless CMS.

pub mod cms;
pub mod config;
pub mod error;
pub mod i18n;
pub mod query;
pub mod retry;
pub mod routing;
pub mod story;

pub use cms::{CmsClient, ClientOptions, DimensionQuery};
pub use error::{CmsError, Result};
pub use i18n::{Language, LanguageOptions, LanguageRef, Languages};
pub use query::Query;
pub use routing::{resolve_route, Route, RouteOptions, TranslationMode};
pub use story::Story;
