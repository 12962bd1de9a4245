//! Band-peak audio fingerprinting
//!
//! Identifies an audio clip by matching it against a library of reference
//! songs. Each time slice of a spectrogram is reduced to the strongest bin of
//! five frequency bands, four of those peaks are folded into a fuzz-tolerant
//! hash, and the hashes vote on the time offset between the clip and every
//! reference song that shares them.
//!
//! ```text
//! audio bytes -> FrequencyTransform -> band peaks -> hashes -> offset votes -> ranked matches
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod hashing;
pub mod index;
pub mod matcher;
pub mod models;
pub mod peaks;
pub mod ranker;
pub mod storage;

pub use audio::WavTransform;
pub use config::FingerprintConfig;
pub use error::{FingerprintError, Result};
pub use fingerprint::AudioFingerprinter;
pub use index::{FrequencyTransform, SongIndex};
pub use models::{BandPeaks, DataPoint, Match, SongId, SongInfo, SpectralFrame};
pub use storage::MemoryIndex;

#[cfg(feature = "redis")]
pub use storage::RedisIndex;
