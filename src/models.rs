use std::fmt;

use rustfft::num_complex::Complex;
use serde::{Deserialize, Serialize};

/// Number of frequency bands a time slice is split into
pub const NUM_BANDS: usize = 5;

/// Identifier of a reference song in the index
pub type SongId = u32;

/// Represents metadata for a song
/// This structure is serializable/deserializable for index snapshots
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SongInfo {
    pub name: String,   // Display name used in match results
    pub singer: String, // Name of the artist/singer
}

/// Frequency-domain samples of one time slice
///
/// Values are interleaved: bin `k` lives at `[2k]` (real) and `[2k + 1]`
/// (imaginary).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpectralFrame {
    values: Vec<f64>,
}

impl SpectralFrame {
    pub fn from_interleaved(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Builds a frame from complex FFT bins
    pub fn from_complex(bins: &[Complex<f64>]) -> Self {
        let values = bins.iter().flat_map(|c| [c.re, c.im]).collect();
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of complete (re, im) bins in the frame
    pub fn bin_count(&self) -> usize {
        self.values.len() / 2
    }

    /// Log magnitude `ln(|X[bin]| + 1)` of one bin
    ///
    /// Callers check `bin < bin_count()` beforehand.
    pub fn log_magnitude(&self, bin: usize) -> f64 {
        let re = self.values[2 * bin];
        let im = self.values[2 * bin + 1];
        ((re * re + im * im).sqrt() + 1.0).ln()
    }
}

/// Strongest frequency bin of each band for one time slice
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BandPeaks(pub [u64; NUM_BANDS]);

impl BandPeaks {
    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }
}

/// One occurrence of a hash inside a reference song
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DataPoint {
    pub song_id: SongId,
    /// Time slice index inside the reference song
    pub time: u32,
}

impl DataPoint {
    /// Packs the point into a single integer: song id in the high 32 bits,
    /// time slice in the low 32 bits
    pub fn pack(self) -> u64 {
        (u64::from(self.song_id) << 32) | u64::from(self.time)
    }

    pub fn unpack(packed: u64) -> Self {
        Self {
            song_id: (packed >> 32) as SongId,
            time: packed as u32,
        }
    }
}

/// A candidate song and its best-aligned vote count
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Match {
    pub song_id: SongId,
    pub song_name: String,
    pub score: u32,
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.song_name, self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_from_complex_interleaves() {
        let frame = SpectralFrame::from_complex(&[Complex::new(1.0, 2.0), Complex::new(3.0, 4.0)]);
        assert_eq!(frame.len(), 4);
        assert_eq!(frame.bin_count(), 2);
        assert!((frame.log_magnitude(1) - 6.0f64.ln()).abs() < 1e-12);
        assert_eq!(frame.log_magnitude(0), (5.0f64.sqrt() + 1.0).ln());
    }

    #[test]
    fn test_silent_bin_has_zero_magnitude() {
        let frame = SpectralFrame::from_interleaved(vec![0.0, 0.0]);
        assert_eq!(frame.log_magnitude(0), 0.0);
    }

    #[test]
    fn test_data_point_packing() {
        let point = DataPoint {
            song_id: 7,
            time: u32::MAX,
        };
        assert_eq!(DataPoint::unpack(point.pack()), point);
        assert_eq!(DataPoint { song_id: 1, time: 2 }.pack(), (1 << 32) | 2);
    }

    #[test]
    fn test_match_display() {
        let m = Match {
            song_id: 3,
            song_name: "505".to_string(),
            score: 12,
        };
        assert_eq!(m.to_string(), "505 12");
    }
}
