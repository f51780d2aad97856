use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: String },

    #[error("failed to parse config: {0}")]
    ParseError(String),

    #[error("invalid config value: {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("scan root does not exist or is not a directory: {path}")]
    InvalidRoot { path: String },

    #[error("invalid filter pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum StateError {
    #[error("sqlite error: {0}")]
    Sqlite(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StateError {
    /// Convenience constructor for SQLite errors, for `.map_err(StateError::sqlite)`.
    pub fn sqlite<E: std::fmt::Display>(e: E) -> Self {
        Self::Sqlite(e.to_string())
    }
}

/// Errors raised by a downstream collaborator (embedding or graph service).
///
/// These never abort a sync pass: dispatchers catch them per file, log, and
/// keep going. They are a distinct type so the degrade-to-zero path is a
/// typed branch rather than a stringly-typed one.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("{service} service unavailable: {reason}")]
    Unavailable { service: String, reason: String },

    #[error("{service} request failed: {reason}")]
    RequestFailed { service: String, reason: String },

    #[error("{service} returned malformed response: {reason}")]
    MalformedResponse { service: String, reason: String },
}

impl DispatchError {
    pub fn unavailable(service: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            service: service.into(),
            reason: reason.to_string(),
        }
    }

    pub fn request_failed(service: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::RequestFailed {
            service: service.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed_response(service: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::MalformedResponse {
            service: service.into(),
            reason: reason.to_string(),
        }
    }
}

/// Fatal errors for a whole sync pass.
///
/// Anything recoverable (unreadable file, unavailable collaborator, stale
/// cache read) is handled below this level and never becomes a `SyncError`.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
