use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("load error: {0}")]
    Load(#[from] recast::LoadError),

    #[error("resolved URL is not absolute: {0}")]
    ProbeUrl(#[from] url::ParseError),

    #[error("probe failed: {0}")]
    Probe(#[from] recast::RedirectError),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
