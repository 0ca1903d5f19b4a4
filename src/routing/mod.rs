//! Story paths to routes: the slug algebra and the resolver built on it.

mod route;
mod slug;

pub use route::{
    resolve_route, ListApi, Route, RouteApi, RouteOptions, TranslationMode, INDEX_FRAGMENT,
    ROUTE_NAME_SEPARATOR, WILDCARD_FRAGMENT,
};
pub use slug::{LanguageFormat, Slug, SlugFragment, SlugPath, DEFAULT_LANGUAGE_PLACEHOLDER};
