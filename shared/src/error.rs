use thiserror::Error;

/// Failures coming from the upstream stats and race feeds.
///
/// None of these are fatal: the boards keep their last good state and the
/// caller logs the error. An undefined ratio is not an error at all, it is a
/// NaN share (see [`crate::format::format_share`]).
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}
