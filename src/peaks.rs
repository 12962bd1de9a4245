//! Spectral peak extraction
//!
//! Every time slice is scanned over bins `LOWEST_BIN..last band limit`. The
//! scanned range is split into five contiguous bands and the loudest bin of
//! each band becomes that band's keypoint for the slice.

use tracing::debug;

use crate::error::{FingerprintError, Result};
use crate::models::{BandPeaks, SpectralFrame, NUM_BANDS};

/// First frequency bin considered during extraction
pub const LOWEST_BIN: u64 = 30;

/// Returns the band a frequency bin belongs to
///
/// The band index is the number of limits `<= freq`, so a bin equal to a
/// limit belongs to the band above it.
///
/// # Errors
/// `OutOfRange` when `freq` is at or above the last limit.
pub fn band_index(freq: u64, limits: &[u64; NUM_BANDS]) -> Result<usize> {
    limits
        .iter()
        .position(|&limit| freq < limit)
        .ok_or(FingerprintError::OutOfRange {
            freq,
            limit: limits[NUM_BANDS - 1],
        })
}

/// Finds the strongest bin of each band in every frame
///
/// # Arguments
/// * `spectrogram` - Frames in time order, interleaved re/im per bin
/// * `limits` - Ascending exclusive upper bounds of the five bands
///
/// # Returns
/// One `BandPeaks` per frame, in the same order. A band whose bins all have
/// zero magnitude reports bin 0.
///
/// # Errors
/// `FrameTooShort` if a frame does not cover the scanned range, `OutOfRange`
/// if a scanned bin escapes the band limits.
pub fn extract_band_peaks(
    spectrogram: &[SpectralFrame],
    limits: &[u64; NUM_BANDS],
) -> Result<Vec<BandPeaks>> {
    let scan_end = limits[NUM_BANDS - 1];
    let required = 2 * scan_end as usize;

    let mut key_points = Vec::with_capacity(spectrogram.len());
    for (time, frame) in spectrogram.iter().enumerate() {
        if frame.len() < required {
            return Err(FingerprintError::FrameTooShort {
                frame: time,
                len: frame.len(),
                required,
            });
        }

        let mut high_scores = [0.0f64; NUM_BANDS];
        let mut peaks = BandPeaks::default();

        for freq in LOWEST_BIN..scan_end {
            let magnitude = frame.log_magnitude(freq as usize);
            let band = band_index(freq, limits)?;

            // strict comparison keeps the lowest bin on ties
            if magnitude > high_scores[band] {
                high_scores[band] = magnitude;
                peaks.0[band] = freq;
            }
        }
        key_points.push(peaks);
    }

    debug!("Extracted band peaks for {} frames", key_points.len());
    Ok(key_points)
}
