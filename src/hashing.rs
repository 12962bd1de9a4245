use crate::error::{FingerprintError, Result};

/// Default quantization step: peaks are rounded down to an even bin
pub const FUZZ_FACTOR: u64 = 2;

/// Number of band peaks folded into one hash. The fifth band is extracted
/// but never hashed, which existing indexes depend on.
pub const HASHED_BANDS: usize = 4;

/// Decimal weight of each hashed band
const WEIGHTS: [u64; HASHED_BANDS] = [1, 100, 100_000, 100_000_000];

/// Exclusive upper bound on the quantized peak of bands 0..3, so a field
/// never spills into the next one. Band 3 is only bounded by `u64`.
pub const FIELD_CAPACITY: [u64; HASHED_BANDS - 1] = [100, 1000, 1000];

/// Hashes the first four band peaks of a time slice with the default fuzz factor
pub fn hash(points: &[u64]) -> Result<u64> {
    hash_with_fuzz(points, FUZZ_FACTOR)
}

/// Combines the first four band peaks into one integer key
///
/// # Hash Structure (decimal fields)
/// - Band 3 peak × 100 000 000
/// - Band 2 peak × 100 000
/// - Band 1 peak × 100
/// - Band 0 peak × 1
///
/// Each peak is first rounded down to a multiple of `fuzz_factor`, so small
/// jitter in peak detection lands on the same key.
///
/// # Errors
/// `HashFieldOverflow` when a quantized peak does not fit its field.
pub fn hash_with_fuzz(points: &[u64], fuzz_factor: u64) -> Result<u64> {
    if points.len() < HASHED_BANDS {
        return Err(FingerprintError::InsufficientData {
            required: HASHED_BANDS,
            actual: points.len(),
        });
    }
    if fuzz_factor == 0 {
        return Err(FingerprintError::InvalidConfig(
            "fuzz factor must be at least 1".to_string(),
        ));
    }

    let mut hash = 0u64;
    for (band, (&peak, weight)) in points.iter().zip(WEIGHTS).enumerate() {
        let quantized = peak - (peak % fuzz_factor);
        let overflow = FingerprintError::HashFieldOverflow { band, peak };
        if FIELD_CAPACITY.get(band).is_some_and(|&cap| quantized >= cap) {
            return Err(overflow);
        }
        hash = quantized
            .checked_mul(weight)
            .and_then(|field| hash.checked_add(field))
            .ok_or(overflow)?;
    }
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_hash() {
        assert_eq!(hash(&[40, 80, 120, 180, 300]).unwrap(), 18_012_008_040);
    }

    #[test]
    fn test_odd_peaks_collapse_to_even() {
        let even = hash(&[40, 80, 120, 180, 300]).unwrap();
        let jittered = hash(&[41, 81, 121, 181, 301]).unwrap();
        assert_eq!(even, jittered);
    }

    #[test]
    fn test_fifth_band_ignored() {
        assert_eq!(
            hash(&[32, 50, 90, 130, 200]).unwrap(),
            hash(&[32, 50, 90, 130, 290]).unwrap()
        );
        assert_eq!(hash(&[32, 50, 90, 130]).unwrap(), hash(&[32, 50, 90, 130, 0]).unwrap());
    }

    #[test]
    fn test_crossing_even_boundary_changes_hash() {
        assert_ne!(hash(&[41, 80, 120, 180]).unwrap(), hash(&[42, 80, 120, 180]).unwrap());
    }

    #[test]
    fn test_positions_are_weighted() {
        assert_ne!(hash(&[40, 80, 0, 0]).unwrap(), hash(&[80, 40, 0, 0]).unwrap());
    }

    #[test]
    fn test_repeatable() {
        let points = [37, 61, 99, 177, 250];
        assert_eq!(hash(&points).unwrap(), hash(&points).unwrap());
    }

    #[test]
    fn test_custom_fuzz() {
        assert_eq!(
            hash_with_fuzz(&[33, 41, 82, 123], 4).unwrap(),
            hash_with_fuzz(&[32, 40, 80, 120], 4).unwrap()
        );
        assert_eq!(hash_with_fuzz(&[33, 41, 82, 123], 1).unwrap(), 12_308_204_133);
    }

    #[test]
    fn test_peaks_too_wide_for_their_field() {
        // 210 in band 0 would otherwise read as 10 in band 0 plus 2 in band 1
        assert!(matches!(
            hash(&[210, 400, 600, 1000]),
            Err(FingerprintError::HashFieldOverflow { band: 0, peak: 210 })
        ));
        assert!(matches!(
            hash(&[98, 1000, 600, 1000]),
            Err(FingerprintError::HashFieldOverflow { band: 1, peak: 1000 })
        ));
        assert!(hash(&[99, 999, 999, 5000]).is_ok());
    }

    #[test]
    fn test_band_three_overflow_is_an_error() {
        assert!(matches!(
            hash(&[0, 0, 0, u64::MAX]),
            Err(FingerprintError::HashFieldOverflow { band: 3, .. })
        ));
    }

    #[test]
    fn test_zero_fuzz_rejected() {
        assert!(matches!(
            hash_with_fuzz(&[1, 2, 3, 4], 0),
            Err(FingerprintError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_insufficient_points() {
        let err = hash(&[1, 2, 3]).unwrap_err();
        assert!(matches!(
            err,
            FingerprintError::InsufficientData {
                required: 4,
                actual: 3
            }
        ));
    }
}
