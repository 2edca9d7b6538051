use thiserror::Error;

/// Failure modes of one refresh attempt. Configuration problems surface to
/// the user and are not retried; transient failures are picked up again by
/// the next scheduled cycle. An empty-but-valid playlist is not an error and
/// is represented as `Ok(None)` by the resolver.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("YouTube API key not configured")]
    MissingApiKey,
    #[error("live playlist needs a device name or a playlist id")]
    MissingTarget,
    #[error("no playlist found matching device name '{0}'")]
    PlaylistNotFound(String),
    #[error("YouTube API error: {0}")]
    Api(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl RefreshError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, RefreshError::MissingApiKey | RefreshError::MissingTarget)
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, RefreshError::Api(_) | RefreshError::Http(_))
    }
}
