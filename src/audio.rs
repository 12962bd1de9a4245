use std::io::Cursor;

use rustfft::{num_complex::Complex, FftPlanner};
use tracing::debug;

use crate::config::FingerprintConfig;
use crate::error::{FingerprintError, Result};
use crate::index::FrequencyTransform;
use crate::models::SpectralFrame;

/// Decodes WAV audio and turns it into a chunked spectrogram
///
/// # Processing Steps
/// 1. Decodes the WAV bytes and normalizes samples to [-1.0, 1.0]
/// 2. Averages all channels down to mono
/// 3. Splits the signal into consecutive, non-overlapping chunks
/// 4. Runs a forward FFT over each chunk and keeps the positive bins
pub struct WavTransform {
    chunk_size: usize,
}

impl WavTransform {
    /// Creates a transform producing one frame per `chunk_size` samples
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size < 2 {
            return Err(FingerprintError::InvalidConfig(format!(
                "chunk size {chunk_size} is too small for a spectrum"
            )));
        }
        Ok(WavTransform { chunk_size })
    }

    /// Creates a transform using the chunk size of a validated configuration
    pub fn from_config(config: &FingerprintConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.chunk_size)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Loads mono samples and the sample rate from WAV bytes
    ///
    /// # Returns
    /// * `Result<(Vec<f32>, u32)>` - Tuple containing:
    ///   - Vector of normalized mono samples (-1.0 to 1.0)
    ///   - Sample rate in Hz
    pub fn decode(audio: &[u8]) -> Result<(Vec<f32>, u32)> {
        let mut reader = hound::WavReader::new(Cursor::new(audio))?;

        let spec = reader.spec();
        debug!(
            "Audio specs - Sample rate: {}Hz, Channels: {}, Bits: {}",
            spec.sample_rate, spec.channels, spec.bits_per_sample
        );

        // Convert samples to floating point format based on the WAV file's format
        let samples: std::result::Result<Vec<f32>, hound::Error> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect(),
            hound::SampleFormat::Int => match spec.bits_per_sample {
                8 => reader
                    .samples::<i8>()
                    .map(|s| s.map(|s| s as f32 / i8::MAX as f32))
                    .collect(),
                16 => reader
                    .samples::<i16>()
                    .map(|s| s.map(|s| s as f32 / i16::MAX as f32))
                    .collect(),
                24 => reader
                    .samples::<i32>()
                    .map(|s| s.map(|s| s as f32 / ((1 << 23) as f32)))
                    .collect(),
                32 => reader
                    .samples::<i32>()
                    .map(|s| s.map(|s| s as f32 / i32::MAX as f32))
                    .collect(),
                bits => {
                    return Err(FingerprintError::UnsupportedFormat(format!(
                        "{bits}-bit integer samples"
                    )));
                }
            },
        };

        let mut audio_samples = samples?;

        // Average interleaved channels down to mono
        if spec.channels > 1 {
            audio_samples = audio_samples
                .chunks(spec.channels as usize)
                .map(|chunk| chunk.iter().sum::<f32>() / chunk.len() as f32)
                .collect();
        }

        Ok((audio_samples, spec.sample_rate))
    }

    /// Computes one frame per complete chunk of samples
    pub fn spectrogram_from_samples(&self, samples: &[f32]) -> Vec<SpectralFrame> {
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(self.chunk_size);

        samples
            .chunks_exact(self.chunk_size)
            .map(|chunk| {
                let mut buffer: Vec<Complex<f64>> = chunk
                    .iter()
                    .map(|&x| Complex::new(f64::from(x), 0.0))
                    .collect();
                fft.process(&mut buffer);
                SpectralFrame::from_complex(&buffer[..self.chunk_size / 2])
            })
            .collect()
    }
}

impl FrequencyTransform for WavTransform {
    fn spectrogram(&self, audio: &[u8]) -> Result<Vec<SpectralFrame>> {
        let (samples, sample_rate) = Self::decode(audio)?;
        let frames = self.spectrogram_from_samples(&samples);
        debug!(
            "Loaded {} samples ({:.2} seconds) into {} frames",
            samples.len(),
            samples.len() as f32 / sample_rate as f32,
            frames.len()
        );
        Ok(frames)
    }

    fn bins_per_frame(&self) -> Option<usize> {
        Some(self.chunk_size / 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(channels: u16, samples: &[i16]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_decode_mixes_stereo_to_mono() {
        let bytes = wav_bytes(2, &[i16::MAX, 0, 0, i16::MAX, i16::MAX, i16::MAX]);
        let (samples, rate) = WavTransform::decode(&bytes).unwrap();
        assert_eq!(rate, 8000);
        assert_eq!(samples, vec![0.5, 0.5, 1.0]);
    }

    #[test]
    fn test_partial_chunk_dropped() {
        let transform = WavTransform::new(8).unwrap();
        let frames = transform.spectrogram_from_samples(&[0.0; 20]);
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f.len() == 8));
    }

    #[test]
    fn test_tone_lands_in_its_bin() {
        let chunk = 64;
        let samples: Vec<f32> = (0..chunk)
            .map(|n| (2.0 * std::f32::consts::PI * 5.0 * n as f32 / chunk as f32).cos())
            .collect();
        let frames = WavTransform::new(chunk).unwrap().spectrogram_from_samples(&samples);
        let frame = &frames[0];
        let loudest = (0..frame.bin_count())
            .max_by(|&a, &b| frame.log_magnitude(a).total_cmp(&frame.log_magnitude(b)))
            .unwrap();
        assert_eq!(loudest, 5);
    }

    #[test]
    fn test_empty_audio_has_no_frames() {
        let transform = WavTransform::new(4096).unwrap();
        assert!(transform.spectrogram(&wav_bytes(1, &[])).unwrap().is_empty());
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let transform = WavTransform::new(4096).unwrap();
        let err = transform.spectrogram(b"not a wav file").unwrap_err();
        assert!(matches!(err, FingerprintError::Decode(_)));
    }

    #[test]
    fn test_from_config_uses_chunk_size() {
        let config = FingerprintConfig {
            chunk_size: 1024,
            ..Default::default()
        };
        let transform = WavTransform::from_config(&config).unwrap();
        assert_eq!(transform.chunk_size(), 1024);
        assert_eq!(transform.bins_per_frame(), Some(512));

        let too_small = FingerprintConfig {
            chunk_size: 512,
            ..Default::default()
        };
        assert!(matches!(
            WavTransform::from_config(&too_small),
            Err(FingerprintError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_tiny_chunk() {
        assert!(WavTransform::new(1).is_err());
    }
}
