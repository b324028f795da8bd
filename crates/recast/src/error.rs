use thiserror::Error;

/// Errors produced while turning a LOAD request into a playable
/// configuration.
///
/// Resolution has exactly one hard failure: a request with no media
/// payload. Everything else (missing URL, malformed DRM keys, unusable
/// header entries) degrades to a safe fallback instead of erroring.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The request carried no media object. Reported back to the sender
    /// as a load failure with an invalid-parameter reason; playback is
    /// never attempted.
    #[error("load request carries no media information")]
    MissingMedia,

    #[error("malformed load request: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors from rewriting and re-issuing a redirected player request.
///
/// These propagate to the player's own retry machinery; the rewrite
/// helper never retries internally.
#[derive(Debug, Error)]
pub enum RedirectError {
    #[error("redirected request has no uri to resolve against")]
    MissingUri,

    #[error("invalid redirect target: {0}")]
    InvalidLocation(#[from] url::ParseError),

    #[error("re-issued request failed: {0}")]
    Http(#[from] reqwest::Error),
}
