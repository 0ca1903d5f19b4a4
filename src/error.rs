//! Error types shared by routing, projection and the CMS client.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CmsError>;

/// Errors raised by the router and the CMS client.
///
/// `InvalidArgument` is raised synchronously for missing input. Every other
/// variant means the requested resource could not be delivered; use
/// [`CmsError::is_resource_unavailable`] when the cause does not matter.
#[derive(Debug, Error)]
pub enum CmsError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("pagination aborted: {0}")]
    Pagination(String),
}

impl CmsError {
    pub fn invalid(message: impl Into<String>) -> Self {
        CmsError::InvalidArgument(message.into())
    }

    /// Everything except `InvalidArgument`.
    pub fn is_resource_unavailable(&self) -> bool {
        !matches!(self, CmsError::InvalidArgument(_))
    }

    /// Whether repeating the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            CmsError::Transport(_) => true,
            CmsError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for CmsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CmsError::Decode(err.to_string())
        } else {
            CmsError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CmsError {
    fn from(err: serde_json::Error) -> Self {
        CmsError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CmsError::invalid("path not passed as parameter");
        assert_eq!(err.to_string(), "invalid argument: path not passed as parameter");

        let err = CmsError::NotFound("cdn/stories/en/missing".to_string());
        assert!(err.to_string().contains("cdn/stories/en/missing"));
    }

    #[test]
    fn test_resource_unavailable_grouping() {
        assert!(!CmsError::invalid("x").is_resource_unavailable());
        assert!(CmsError::NotFound("x".into()).is_resource_unavailable());
        assert!(CmsError::Transport("x".into()).is_resource_unavailable());
        assert!(CmsError::Decode("x".into()).is_resource_unavailable());
        assert!(CmsError::Pagination("x".into()).is_resource_unavailable());
    }

    #[test]
    fn test_only_transport_errors_are_retryable() {
        assert!(CmsError::Transport("connection reset".into()).is_retryable());
        assert!(CmsError::Status { status: 503, body: String::new() }.is_retryable());
        assert!(CmsError::Status { status: 429, body: String::new() }.is_retryable());
        assert!(!CmsError::Status { status: 401, body: String::new() }.is_retryable());
        assert!(!CmsError::NotFound("x".into()).is_retryable());
        assert!(!CmsError::Decode("x".into()).is_retryable());
        assert!(!CmsError::invalid("x").is_retryable());
    }

    #[test]
    fn test_serde_json_error_maps_to_decode() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(CmsError::from(err), CmsError::Decode(_)));
    }
}
