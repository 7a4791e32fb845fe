use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchError {
    /// The embedder never got a working model. Any score it produced
    /// would silently mis-rank the pool, so the whole run is refused.
    #[error("embedding model unavailable")]
    ModelUnavailable,

    #[error("embedding failed: {0}")]
    Embedding(anyhow::Error),
}

impl From<anyhow::Error> for MatchError {
    fn from(err: anyhow::Error) -> Self {
        MatchError::Embedding(err)
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;
