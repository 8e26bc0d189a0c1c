//! # Upload Audio Decoding
//!
//! Converts uploaded audio bytes into the 16 kHz mono f32 samples the
//! transcription engine expects.
//!
//! ## Decode Pipeline:
//! 1. **Container detection**: RIFF/WAVE header → WAV decode; anything else
//!    is treated as raw 16-bit little-endian PCM at the target rate
//! 2. **Downmix**: interleaved multi-channel audio is averaged to mono
//! 3. **Resample**: linear interpolation to 16 kHz
//! 4. **Scale**: integer samples scaled into [-1.0, 1.0]
//! 5. **DC-offset removal**: center the signal around zero

use anyhow::{anyhow, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

/// Sample rate expected by the Whisper models.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Decode uploaded audio bytes into 16 kHz mono f32 samples.
pub fn decode_audio(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.is_empty() {
        return Err(anyhow!("Audio upload is empty"));
    }

    let samples = if bytes.len() >= 4 && &bytes[..4] == b"RIFF" {
        decode_wav(bytes)?
    } else {
        decode_raw_pcm(bytes)?
    };

    if samples.is_empty() {
        return Err(anyhow!("Audio upload contained no samples"));
    }

    Ok(remove_dc_offset(samples))
}

/// Decode a RIFF/WAVE container, downmixing and resampling as needed.
fn decode_wav(bytes: &[u8]) -> Result<Vec<f32>> {
    let mut cursor = Cursor::new(bytes);
    let (header, data) = wav::read(&mut cursor).map_err(|e| anyhow!("Invalid WAV data: {}", e))?;

    let interleaved: Vec<f32> = match data {
        wav::BitDepth::Eight(samples) => samples
            .iter()
            .map(|&sample| (sample as f32 - 128.0) / 128.0)
            .collect(),
        wav::BitDepth::Sixteen(samples) => samples
            .iter()
            .map(|&sample| sample as f32 / 32768.0)
            .collect(),
        wav::BitDepth::TwentyFour(samples) => samples
            .iter()
            .map(|&sample| sample as f32 / 8_388_608.0)
            .collect(),
        wav::BitDepth::ThirtyTwoFloat(samples) => samples,
        wav::BitDepth::Empty => Vec::new(),
    };

    let mono = downmix_to_mono(&interleaved, header.channel_count as usize);
    Ok(resample_linear(
        &mono,
        header.sampling_rate,
        TARGET_SAMPLE_RATE,
    ))
}

/// Decode headerless bytes as raw 16-bit little-endian PCM, mono, already at
/// the target rate. An odd byte count means the payload cannot be 16-bit
/// samples.
fn decode_raw_pcm(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % 2 != 0 {
        return Err(anyhow!(
            "Raw PCM length must be even for 16-bit samples (got {} bytes)",
            bytes.len()
        ));
    }

    let mut cursor = Cursor::new(bytes);
    let mut samples = Vec::with_capacity(bytes.len() / 2);
    while let Ok(sample) = cursor.read_i16::<LittleEndian>() {
        samples.push(sample as f32 / 32768.0);
    }

    Ok(samples)
}

/// Average interleaved channels down to mono.
fn downmix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Linear-interpolation resampling between sample rates. Speech content
/// tolerates this well and it keeps the pipeline dependency-free.
fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = ((samples.len() as f64) / ratio).round() as usize;

    (0..output_len)
        .map(|i| {
            let position = i as f64 * ratio;
            let lower = position.floor() as usize;
            let upper = (lower + 1).min(samples.len() - 1);
            let lower = lower.min(samples.len() - 1);
            let fraction = (position - lower as f64) as f32;
            samples[lower] + (samples[upper] - samples[lower]) * fraction
        })
        .collect()
}

/// Remove the DC offset so the signal is centered around zero; an offset
/// wastes dynamic range and degrades transcription quality.
fn remove_dc_offset(mut samples: Vec<f32>) -> Vec<f32> {
    let offset = samples.iter().sum::<f32>() / samples.len() as f32;
    for sample in &mut samples {
        *sample -= offset;
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_pcm_bytes(samples: &[i16]) -> Vec<u8> {
        samples
            .iter()
            .flat_map(|sample| sample.to_le_bytes())
            .collect()
    }

    #[test]
    fn test_empty_upload_is_rejected() {
        assert!(decode_audio(&[]).is_err());
    }

    #[test]
    fn test_odd_length_raw_pcm_is_rejected() {
        assert!(decode_audio(&[0u8; 15]).is_err());
    }

    #[test]
    fn test_raw_pcm_scaling() {
        let bytes = raw_pcm_bytes(&[0, 16384, -16384, 32767]);
        let samples = decode_audio(&bytes).unwrap();
        assert_eq!(samples.len(), 4);
        // DC offset removal shifts all samples by the same amount
        let spread = samples[1] - samples[2];
        assert!((spread - 1.0).abs() < 1e-3, "expected ~1.0 spread, got {spread}");
    }

    #[test]
    fn test_downmix_averages_channels() {
        let mono = downmix_to_mono(&[1.0, 0.0, 0.5, 0.5], 2);
        assert_eq!(mono, vec![0.5, 0.5]);
    }

    #[test]
    fn test_resample_halves_length() {
        let samples: Vec<f32> = (0..32000).map(|i| (i % 100) as f32 / 100.0).collect();
        let resampled = resample_linear(&samples, 32000, 16000);
        assert_eq!(resampled.len(), 16000);
    }

    #[test]
    fn test_resample_same_rate_is_identity() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(resample_linear(&samples, 16000, 16000), samples);
    }

    #[test]
    fn test_dc_offset_is_removed() {
        let centered = remove_dc_offset(vec![0.5, 0.5, 0.5, 0.5]);
        assert!(centered.iter().all(|sample| sample.abs() < 1e-6));
    }
}
