use thiserror::Error;

/// Rejected configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be finite")]
    NotFinite { field: &'static str },
    #[error("{field} range is inverted: min {min} > max {max}")]
    InvertedRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{field} must lie in [0, 1], got {value}")]
    OutsideUnit { field: &'static str, value: f64 },
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{field} decay {value} must lie strictly between 0 and 1")]
    Decay { field: &'static str, value: f64 },
    #[error("unknown preset `{0}`")]
    UnknownPreset(String),
    #[error("config overlay is not valid: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures reported by a [`crate::persist::KeyValueStore`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is unavailable: {0}")]
    Unavailable(String),
    #[error("storage quota exceeded")]
    QuotaExceeded,
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Errors raised while saving or loading a snapshot.
///
/// These never escape [`crate::persist::Persistence`]; they exist so the
/// failure reason can be logged in one place.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("snapshot json: {0}")]
    Json(#[from] serde_json::Error),
}
