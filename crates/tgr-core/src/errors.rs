use std::path::PathBuf;

/// Core error type for the relay.
///
/// Adapter crates map their transport-specific errors into this type. Only
/// `Config`, `Auth` and `Storage` are expected to end the process; the rest are
/// per-event failures the router recovers from.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("auth error: {0}")]
    Auth(String),

    #[error("session storage error: {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sender resolution failed: {0}")]
    Resolution(String),

    #[error("forward failed: {0}")]
    Forward(String),

    #[error("malformed event: {0}")]
    MalformedEvent(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
