use tracing::{debug, info};

use std::fs;
use std::path::Path;

use crate::config::FingerprintConfig;
use crate::error::{FingerprintError, Result};
use crate::hashing::hash_with_fuzz;
use crate::index::{FrequencyTransform, SongIndex};
use crate::matcher::vote;
use crate::models::{BandPeaks, Match, SpectralFrame};
use crate::peaks::extract_band_peaks;
use crate::ranker::rank;

/// Main fingerprinting engine that handles fingerprint generation and matching
/// This struct drives the whole recognition pipeline:
/// 1. Converts audio to a spectrogram through the injected transform
/// 2. Extracts the strongest bin of each frequency band per time slice
/// 3. Hashes the band peaks of every slice into a lookup key
/// 4. Votes on time offsets against the injected reference index and ranks the songs
#[derive(Debug)]
pub struct AudioFingerprinter<T, D> {
    transform: T,
    index: D,
    config: FingerprintConfig,
}

impl<T: FrequencyTransform, D: SongIndex> AudioFingerprinter<T, D> {
    /// Creates a fingerprinter with the default configuration
    ///
    /// # Arguments
    /// * `transform` - Turns raw audio bytes into spectral frames
    /// * `index` - Reference index the queries are matched against
    pub fn new(transform: T, index: D) -> Result<Self> {
        Self::with_config(transform, index, FingerprintConfig::default())
    }

    /// Creates a fingerprinter with a custom, validated configuration
    ///
    /// # Errors
    /// `InvalidConfig` when the configuration is inconsistent or the
    /// transform's frames stop short of the last band limit.
    pub fn with_config(transform: T, index: D, config: FingerprintConfig) -> Result<Self> {
        config.validate()?;
        if let Some(bins) = transform.bins_per_frame() {
            if (bins as u64) < config.scan_end() {
                return Err(FingerprintError::InvalidConfig(format!(
                    "transform frames carry {} bins, band limits need {}",
                    bins,
                    config.scan_end()
                )));
            }
        }
        Ok(AudioFingerprinter {
            transform,
            index,
            config,
        })
    }

    pub fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    pub fn index(&self) -> &D {
        &self.index
    }

    /// Mutable access to the index, used to ingest reference songs
    pub fn index_mut(&mut self) -> &mut D {
        &mut self.index
    }

    /// Extracts the band peaks of every frame using the configured bands
    pub fn key_points(&self, spectrogram: &[SpectralFrame]) -> Result<Vec<BandPeaks>> {
        extract_band_peaks(spectrogram, &self.config.band_limits)
    }

    /// Hashes each slice's band peaks, preserving time order
    pub fn hashes(&self, key_points: &[BandPeaks]) -> Result<Vec<u64>> {
        key_points
            .iter()
            .map(|peaks| hash_with_fuzz(peaks.as_slice(), self.config.fuzz_factor))
            .collect()
    }

    /// Generates the per-slice fingerprint hashes of an audio clip
    ///
    /// The position of each hash is its time slice, which is what a
    /// reference index records when a song is ingested.
    pub fn generate_fingerprint(&self, audio: &[u8]) -> Result<Vec<u64>> {
        let spectrogram = self.transform.spectrogram(audio)?;
        let hashes = self.hashes(&self.key_points(&spectrogram)?)?;
        debug!("Generated {} hashes", hashes.len());
        Ok(hashes)
    }

    /// Identifies an audio clip against the reference index
    ///
    /// # Returns
    /// Matches sorted by score, highest first. An empty list means no song
    /// shared a single hash with the clip.
    pub fn recognize(&self, audio: &[u8]) -> Result<Vec<Match>> {
        let spectrogram = self.transform.spectrogram(audio)?;
        self.recognize_spectrogram(&spectrogram)
    }

    /// Reads an audio file and identifies it like [`recognize`](Self::recognize)
    ///
    /// # Errors
    /// `Io` when the file cannot be read, otherwise the errors of `recognize`.
    pub fn recognize_file(&self, path: impl AsRef<Path>) -> Result<Vec<Match>> {
        let path = path.as_ref();
        let audio = fs::read(path)?;
        debug!("Read {} bytes from {}", audio.len(), path.display());
        self.recognize(&audio)
    }

    /// Same as [`recognize`](Self::recognize) for an already computed spectrogram
    pub fn recognize_spectrogram(&self, spectrogram: &[SpectralFrame]) -> Result<Vec<Match>> {
        let hashes = self.hashes(&self.key_points(spectrogram)?)?;
        self.recognize_hashes(&hashes)
    }

    /// Votes on time offsets for query hashes given in time order and ranks the candidates
    pub fn recognize_hashes(&self, hashes: &[u64]) -> Result<Vec<Match>> {
        let table = vote(hashes, &self.index)?;
        let matches = rank(&table.best_scores(), &self.index)?;

        match matches.first() {
            Some(best) => info!(
                "Best match for {} slices: '{}' with {} aligned hashes ({} candidates)",
                hashes.len(),
                best.song_name,
                best.score,
                matches.len()
            ),
            None => info!("No matches found for {} slices", hashes.len()),
        }
        Ok(matches)
    }
}
