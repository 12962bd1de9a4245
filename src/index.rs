//! Collaborator interfaces the matching engine depends on
//!
//! The engine never decodes audio or stores fingerprints itself. Both
//! concerns are injected through these traits so that storage backends and
//! test doubles can be swapped freely.

use crate::error::Result;
use crate::models::{DataPoint, SongId, SpectralFrame};

/// Converts raw audio bytes into a spectrogram, one frame per time slice
pub trait FrequencyTransform {
    fn spectrogram(&self, audio: &[u8]) -> Result<Vec<SpectralFrame>>;

    /// Complex bins carried by every frame, when known ahead of time
    fn bins_per_frame(&self) -> Option<usize> {
        None
    }
}

/// Read-only access to the reference fingerprint index
pub trait SongIndex {
    /// All occurrences of `hash` across the reference songs.
    /// Unknown hashes yield an empty list.
    fn matching_points(&self, hash: u64) -> Result<Vec<DataPoint>>;

    /// Display name of a reference song
    fn song_name(&self, song_id: SongId) -> Result<String>;
}

impl<T: FrequencyTransform + ?Sized> FrequencyTransform for &T {
    fn spectrogram(&self, audio: &[u8]) -> Result<Vec<SpectralFrame>> {
        (**self).spectrogram(audio)
    }

    fn bins_per_frame(&self) -> Option<usize> {
        (**self).bins_per_frame()
    }
}

impl<T: SongIndex + ?Sized> SongIndex for &T {
    fn matching_points(&self, hash: u64) -> Result<Vec<DataPoint>> {
        (**self).matching_points(hash)
    }

    fn song_name(&self, song_id: SongId) -> Result<String> {
        (**self).song_name(song_id)
    }
}
