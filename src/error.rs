//! Error types for Ruby Chat.
//!
//! Validation failures (too-short description, empty contact field) are not
//! errors — the flow machine recovers from those by re-prompting. The enums
//! here cover configuration, persistence, and the two outbound collaborators.

/// Top-level error type for the backend.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Reply error: {0}")]
    Reply(#[from] ReplyError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

/// Reply source errors (hosted model or local matcher).
#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Notification dispatch errors.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Failed to build notification: {0}")]
    BuildFailed(String),

    #[error("Notification send failed via {backend}: {reason}")]
    SendFailed { backend: String, reason: String },
}

/// Result type alias for the backend.
pub type Result<T> = std::result::Result<T, Error>;
