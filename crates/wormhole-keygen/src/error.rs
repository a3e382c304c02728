use crate::key::Key;
use thiserror::Error;
use tonic::{Code, Status};

/// Result type for key draws.
pub type Result<T> = std::result::Result<T, KeyGenError>;

/// Invalid construction parameters. Fatal to the construction attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid buffer size {0}; expected a positive integer")]
    InvalidBufferSize(i64),
    #[error("invalid key generation service endpoint: {0}")]
    InvalidEndpoint(String),
}

/// A remote fetch failed. No keys were delivered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("key service unreachable: {0}")]
    Transport(String),
    #[error("key service request failed: {0}")]
    Remote(String),
    #[error("key service has no keys left: {0}")]
    Exhausted(String),
    #[error("key fetch timed out: {0}")]
    Timeout(String),
}

impl From<Status> for FetchError {
    fn from(status: Status) -> Self {
        let message = status.message().to_string();
        match status.code() {
            Code::DeadlineExceeded | Code::Cancelled => FetchError::Timeout(message),
            Code::ResourceExhausted => FetchError::Exhausted(message),
            Code::Unavailable => FetchError::Transport(message),
            code => FetchError::Remote(format!("{code:?}: {message}")),
        }
    }
}

/// The buffer refused a batch. The buffer is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("batch of {incoming} keys does not fit: {occupied}/{capacity} slots taken")]
    Overflow {
        capacity: usize,
        occupied: usize,
        incoming: usize,
    },
    #[error("duplicate key in batch: {0}")]
    DuplicateKey(Key),
}

/// Errors returned when drawing a key.
///
/// Every variant means no key was issued, and callers should handle them
/// alike: fail the enclosing operation and never substitute a locally
/// generated identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyGenError {
    #[error("failed to fetch keys: {0}")]
    Fetch(#[from] FetchError),
    #[error("key service returned {received} keys, {requested} requested")]
    ShortBatch { requested: usize, received: usize },
    #[error("rejected key batch: {0}")]
    Buffer(#[from] BufferError),
}
