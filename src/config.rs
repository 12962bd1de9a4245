use serde::{Deserialize, Serialize};

use crate::error::{FingerprintError, Result};
use crate::hashing::FIELD_CAPACITY;
use crate::models::NUM_BANDS;
use crate::peaks::LOWEST_BIN;

/// Tunable parameters of the fingerprinting pipeline
///
/// Changing `band_limits` or `fuzz_factor` changes every hash, so an index
/// must be queried with the same values it was built with.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct FingerprintConfig {
    /// Ascending upper bounds (exclusive) of the five frequency bands.
    /// The last one is also the end of the scanned bin range.
    pub band_limits: [u64; NUM_BANDS],
    /// Quantization step applied to peak bins before hashing
    pub fuzz_factor: u64,
    /// Samples per analysis chunk in the WAV transform
    pub chunk_size: usize,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            band_limits: [40, 80, 120, 180, 300],
            fuzz_factor: crate::hashing::FUZZ_FACTOR,
            chunk_size: 4096,
        }
    }
}

impl FingerprintConfig {
    /// Parses a JSON document, filling missing fields with defaults, and validates it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Last band limit, i.e. the exclusive end of the scanned bins
    pub fn scan_end(&self) -> u64 {
        self.band_limits[NUM_BANDS - 1]
    }

    pub fn validate(&self) -> Result<()> {
        if self.band_limits.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(FingerprintError::InvalidConfig(format!(
                "band limits must be strictly ascending: {:?}",
                self.band_limits
            )));
        }
        if self.band_limits[0] <= LOWEST_BIN {
            return Err(FingerprintError::InvalidConfig(format!(
                "first band limit {} must be above bin {}",
                self.band_limits[0], LOWEST_BIN
            )));
        }
        let fields = self.band_limits.iter().zip(&FIELD_CAPACITY);
        for (band, (&limit, &capacity)) in fields.enumerate() {
            if limit > capacity {
                return Err(FingerprintError::InvalidConfig(format!(
                    "band {band} limit {limit} exceeds the hash field capacity {capacity}"
                )));
            }
        }
        if self.fuzz_factor == 0 {
            return Err(FingerprintError::InvalidConfig(
                "fuzz factor must be at least 1".to_string(),
            ));
        }
        if ((self.chunk_size / 2) as u64) < self.scan_end() {
            return Err(FingerprintError::InvalidConfig(format!(
                "chunk size {} yields {} bins, band limits need {}",
                self.chunk_size,
                self.chunk_size / 2,
                self.scan_end()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = FingerprintConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scan_end(), 300);
        assert_eq!(config.fuzz_factor, 2);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = FingerprintConfig::from_json(r#"{ "chunk_size": 1024 }"#).unwrap();
        assert_eq!(config.chunk_size, 1024);
        assert_eq!(config.band_limits, [40, 80, 120, 180, 300]);
    }

    #[test]
    fn test_rejects_unordered_limits() {
        let err = FingerprintConfig::from_json(r#"{ "band_limits": [40, 120, 80, 180, 300] }"#)
            .unwrap_err();
        assert!(matches!(err, FingerprintError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_small_chunk_and_zero_fuzz() {
        let small = FingerprintConfig {
            chunk_size: 512,
            ..Default::default()
        };
        assert!(small.validate().is_err());

        let no_fuzz = FingerprintConfig {
            fuzz_factor: 0,
            ..Default::default()
        };
        assert!(no_fuzz.validate().is_err());
    }

    #[test]
    fn test_rejects_limits_wider_than_hash_fields() {
        let config = FingerprintConfig {
            band_limits: [210, 400, 600, 1000, 2000],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FingerprintError::InvalidConfig(_))
        ));

        let widest = FingerprintConfig {
            band_limits: [100, 1000, 1001, 1500, 2000],
            ..Default::default()
        };
        assert!(widest.validate().is_err());

        let fits = FingerprintConfig {
            band_limits: [100, 900, 1000, 1500, 2000],
            ..Default::default()
        };
        assert!(fits.validate().is_ok());
    }

    #[test]
    fn test_rejects_first_band_below_scan_start() {
        let config = FingerprintConfig {
            band_limits: [30, 80, 120, 180, 300],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FingerprintError::InvalidConfig(_))
        ));
    }
}
