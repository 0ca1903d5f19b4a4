//! CMS access: version selection, transport and the story client.

pub mod client;
pub mod transport;
pub mod version;

pub use client::{CmsClient, ClientOptions, DimensionQuery, Page, RawPage};
pub use transport::{ApiResponse, HttpTransport, Transport};
pub use version::{select_version, EnvironmentProbe, StaticProbe, Version, VersionMode};
