pub type CitizenResult<T> = Result<T, CitizenError>;

#[derive(thiserror::Error, Debug)]
pub enum CitizenError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("metadata error: {0}")]
    Metadata(String),

    #[error("chain error: {0}")]
    Chain(String),

    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CitizenError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn metadata(msg: impl Into<String>) -> Self {
        Self::Metadata(msg.into())
    }

    pub fn chain(msg: impl Into<String>) -> Self {
        Self::Chain(msg.into())
    }

    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    /// True for errors caused by bad caller input rather than by the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Metadata(_))
    }
}
