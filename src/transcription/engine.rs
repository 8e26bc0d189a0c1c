//! # Transcription Engine
//!
//! High-level speech-to-text coordination: owns the loaded Whisper model,
//! windows long uploads into model-sized segments, and attaches a
//! confidence estimate to every result.
//!
//! ## Resource Management:
//! The model is loaded once and cached behind an `Arc<RwLock<...>>`; every
//! subsequent request reuses it. Loading a different size replaces the
//! cached model.

use crate::transcription::model::{ModelSize, WhisperModel};
use anyhow::{anyhow, Result};
use candle_core::Device;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

/// Sample rate the engine (and Whisper) operates at.
const SAMPLE_RATE: usize = 16_000;

/// Configuration for transcription behavior.
#[derive(Debug, Clone)]
pub struct TranscriptionConfig {
    /// Target language (ISO 639-1 code like "en")
    pub language: Option<String>,

    /// Minimum audio duration to accept (seconds)
    pub min_audio_duration: f64,

    /// Window length for long uploads (seconds); Whisper works best with
    /// segments under 30 s
    pub segment_duration: f64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            language: Some("en".to_string()),
            min_audio_duration: 0.5,
            segment_duration: 30.0,
        }
    }
}

/// Result of a transcription operation, shaped for the API response.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TranscriptionResult {
    /// The transcribed text
    pub text: String,

    /// Heuristic confidence score (0.0 to 1.0)
    pub confidence: f32,

    /// Duration of audio processed (seconds)
    pub audio_duration: f64,

    /// Time taken for transcription (milliseconds)
    pub processing_time_ms: u64,

    /// Language used for decoding
    pub language: String,

    /// Model that produced the transcript
    pub model_name: String,

    /// Unix timestamp of completion
    pub timestamp: u64,
}

/// Transcription engine holding the cached model.
pub struct TranscriptionEngine {
    /// RwLock allows status reads while a transcription holds the write lock
    model: Arc<RwLock<Option<WhisperModel>>>,
    config: TranscriptionConfig,
    device: Device,
}

impl TranscriptionEngine {
    pub fn new(config: TranscriptionConfig, device: Device) -> Self {
        Self {
            model: Arc::new(RwLock::new(None)),
            config,
            device,
        }
    }

    /// Ensure a model of the requested size is loaded, loading or replacing
    /// the cached model if needed.
    pub async fn ensure_model(&self, size: ModelSize) -> Result<()> {
        {
            let model_guard = self.model.read().await;
            if let Some(model) = model_guard.as_ref() {
                if model.size() == size {
                    return Ok(());
                }
                tracing::info!(
                    "Replacing cached {} model with {}",
                    model.size(),
                    size
                );
            }
        }

        let new_model = WhisperModel::load(size, self.device.clone()).await?;
        let mut model_guard = self.model.write().await;
        *model_guard = Some(new_model);
        Ok(())
    }

    /// Check if a model is currently loaded and ready.
    pub async fn is_model_loaded(&self) -> bool {
        self.model.read().await.is_some()
    }

    /// Name of the currently loaded model, if any.
    pub async fn current_model(&self) -> Option<String> {
        self.model
            .read()
            .await
            .as_ref()
            .map(|model| model.size().to_string())
    }

    /// Transcribe decoded audio samples, windowing uploads longer than the
    /// configured segment duration and concatenating the window transcripts.
    pub async fn transcribe(&self, audio_data: &[f32]) -> Result<TranscriptionResult> {
        let start_time = Instant::now();

        if audio_data.is_empty() {
            return Err(anyhow!("Audio data is empty"));
        }

        let audio_duration = audio_data.len() as f64 / SAMPLE_RATE as f64;
        if audio_duration < self.config.min_audio_duration {
            return Err(anyhow!(
                "Audio too short: {:.2}s (minimum: {:.2}s)",
                audio_duration,
                self.config.min_audio_duration
            ));
        }

        let segment_samples = (self.config.segment_duration * SAMPLE_RATE as f64) as usize;
        let language = self.config.language.as_deref();

        tracing::debug!(
            "Transcribing {:.2}s of audio in {} window(s)",
            audio_duration,
            audio_data.len().div_ceil(segment_samples)
        );

        let text = {
            let mut model_guard = self.model.write().await;
            let model = model_guard
                .as_mut()
                .ok_or_else(|| anyhow!("No model loaded for transcription"))?;

            let mut parts: Vec<String> = Vec::new();
            for window in audio_data.chunks(segment_samples) {
                let part = model.transcribe(window, language)?;
                if !part.is_empty() {
                    parts.push(part);
                }
            }
            parts.join(" ")
        };

        let processing_time_ms = start_time.elapsed().as_millis() as u64;
        let confidence = estimate_confidence(&text, audio_duration);
        let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

        let result = TranscriptionResult {
            text: text.trim().to_string(),
            confidence,
            audio_duration,
            processing_time_ms,
            language: self.config.language.clone().unwrap_or_else(|| "en".to_string()),
            model_name: self.current_model().await.unwrap_or_else(|| "unknown".to_string()),
            timestamp,
        };

        tracing::info!(
            "Transcription completed: {:.2}s audio -> {} chars in {}ms (confidence: {:.2})",
            audio_duration,
            result.text.len(),
            processing_time_ms,
            confidence
        );

        Ok(result)
    }
}

/// Estimate a confidence score for a transcript.
///
/// A simplified heuristic over surface features; a model-backed approach
/// would use attention weights and output probabilities instead.
fn estimate_confidence(text: &str, audio_duration: f64) -> f32 {
    if text.trim().is_empty() {
        return 0.2;
    }

    let mut confidence = 0.5f32;

    // Factor 1: characters per second within a plausible speaking pace
    let chars_per_second = text.len() as f64 / audio_duration;
    if chars_per_second > 10.0 && chars_per_second < 100.0 {
        confidence += 0.2;
    } else {
        confidence -= 0.1;
    }

    // Factor 2: presence of common English words
    let common_words = ["the", "and", "to", "of", "a", "in", "is", "it", "you", "that"];
    let text_lower = text.to_lowercase();
    let common_word_count = common_words
        .iter()
        .filter(|&&word| text_lower.contains(word))
        .count();
    if common_word_count > 0 {
        confidence += 0.1 * (common_word_count as f32 / common_words.len() as f32);
    }

    // Factor 3: capitalization and single terminal punctuation
    if text.chars().next().map_or(false, |c| c.is_uppercase()) {
        confidence += 0.1;
    }
    if (text.contains('.') && !text.contains(".."))
        || (text.contains('?') && !text.contains("??"))
        || (text.contains('!') && !text.contains("!!"))
    {
        confidence += 0.1;
    }

    // Factor 4: garbled-output indicators
    if text.contains("...") || text.contains("???") {
        confidence -= 0.2;
    } else {
        confidence += 0.1;
    }

    confidence.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcription_config_default() {
        let config = TranscriptionConfig::default();
        assert_eq!(config.language, Some("en".to_string()));
        assert_eq!(config.min_audio_duration, 0.5);
        assert_eq!(config.segment_duration, 30.0);
    }

    #[test]
    fn test_confidence_reasonable_transcript() {
        let confidence = estimate_confidence("Hello, how are you doing today.", 2.0);
        assert!(confidence > 0.5);
    }

    #[test]
    fn test_confidence_empty_transcript() {
        assert!(estimate_confidence("", 2.0) < 0.5);
        assert!(estimate_confidence("   ", 2.0) < 0.5);
    }

    #[test]
    fn test_confidence_garbled_transcript() {
        let confidence = estimate_confidence("zzz... ??? qqq", 2.0);
        assert!(confidence < 0.5);
    }

    #[tokio::test]
    async fn test_engine_starts_without_model() {
        let engine = TranscriptionEngine::new(TranscriptionConfig::default(), Device::Cpu);
        assert!(!engine.is_model_loaded().await);
        assert_eq!(engine.current_model().await, None);
    }

    #[tokio::test]
    async fn test_transcribe_without_model_fails() {
        let engine = TranscriptionEngine::new(TranscriptionConfig::default(), Device::Cpu);
        let audio = vec![0.0f32; SAMPLE_RATE];
        assert!(engine.transcribe(&audio).await.is_err());
    }

    #[tokio::test]
    async fn test_transcribe_rejects_short_audio() {
        let engine = TranscriptionEngine::new(TranscriptionConfig::default(), Device::Cpu);
        // 0.1 s is below the 0.5 s minimum
        let audio = vec![0.0f32; SAMPLE_RATE / 10];
        let error = engine.transcribe(&audio).await.unwrap_err();
        assert!(error.to_string().contains("too short"));
    }
}
