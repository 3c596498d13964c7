use thiserror::Error;

/// Result type for controller, upstream and request-handling operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache operation timed out: {0}")]
    Timeout(String),
    #[error("cache initialization failed: {0}")]
    Initialization(String),
    #[error("cache operation failed: {0}")]
    Operation(String),
}

/// Errors surfaced while resolving a legacy request.
///
/// Every variant carries its HTTP status explicitly, see [`Error::status`].
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Client input was malformed: a bad or non-positive ID, or a body that
    /// did not decode.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// A bulk request carried no IDs.
    #[error("missing ids")]
    MissingIds,
    /// The upstream reports that the resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The upstream failed with a status of its own.
    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// The HTTP status code this error is reported with.
    pub fn status(&self) -> u16 {
        match self {
            Error::BadRequest(_) | Error::MissingIds => 400,
            Error::NotFound(_) => 404,
            Error::Upstream { status, .. } => *status,
            Error::Cache(_) | Error::Internal(_) => 500,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
