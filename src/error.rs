//! Error types for fingerprint extraction and matching

use thiserror::Error;

use crate::models::SongId;

/// Result type alias for fingerprinting operations
pub type Result<T> = std::result::Result<T, FingerprintError>;

/// Errors raised while extracting, hashing or matching fingerprints
#[derive(Error, Debug)]
pub enum FingerprintError {
    /// A scanned frequency bin does not fall into any configured band
    #[error("frequency bin {freq} is outside the configured bands (upper limit {limit})")]
    OutOfRange { freq: u64, limit: u64 },

    /// Too few band peaks to build a hash
    #[error("hashing needs {required} band peaks, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// A quantized band peak is too large for its decimal hash field
    #[error("band {band} peak {peak} does not fit its hash field")]
    HashFieldOverflow { band: usize, peak: u64 },

    /// A spectral frame does not cover the scanned bins
    #[error("spectral frame {frame} holds {len} values, {required} are needed")]
    FrameTooShort {
        frame: usize,
        len: usize,
        required: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to decode audio: {0}")]
    Decode(#[from] hound::Error),

    /// Lookup failure reported by a custom reference index
    #[error("reference index lookup failed: {0}")]
    Index(String),

    #[error("no song registered with id {0}")]
    UnknownSong(SongId),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "redis")]
    #[error(transparent)]
    Redis(#[from] redis::RedisError),
}
