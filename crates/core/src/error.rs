//! Error types for s3p
//!
//! Only provider validation, profile storage, and local path handling fail
//! locally. Anything reported by the storage service or the SDK travels in
//! [`Error::Client`] untouched.

use thiserror::Error;

use crate::provider::Provider;

/// Boxed error as produced by the underlying storage client
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for s3p operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by s3p
#[derive(Debug, Error)]
pub enum Error {
    /// Provider identifier is not in the registry
    #[error("Unsupported provider: {provider}. Supported providers: {}", Provider::supported_list())]
    UnsupportedProvider { provider: String },

    /// Failure reported by the underlying storage client, carried verbatim
    #[error(transparent)]
    Client(BoxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),
}

impl Error {
    /// Wrap an error raised by the storage client
    pub fn client<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Client(Box::new(err))
    }

    /// Borrow the underlying client error, if this is one
    pub fn client_source(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Client(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Self::Config(e.to_string())
    }
}
