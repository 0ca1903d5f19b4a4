//! Content languages.
//!
//! # Architecture
//!
//! - `language`: a single configured language and the `LanguageRef` lookup key
//! - `registry`: the ordered collection every route is resolved against
//!
//! # Example
//!
//! ```rust,ignore
//! use story_router::i18n::{LanguageOptions, Languages};
//!
//! let languages = Languages::new(&[
//!     LanguageOptions::new("en").default_language(),
//!     LanguageOptions::new("de"),
//! ])?;
//!
//! assert_eq!(languages.default().map(|l| l.code()), Some("en"));
//! ```

mod language;
mod registry;

pub use language::{Language, LanguageOptions, LanguageRef};
pub use registry::Languages;
