//! # Whisper Model
//!
//! Loads and runs Whisper speech-recognition models through Candle.
//!
//! ## Loading Process:
//! 1. Download model files from HuggingFace (cached locally by hf-hub)
//! 2. Load tokenizer and configuration
//! 3. Initialize weights on the selected device
//!
//! ## Audio Requirements:
//! 16 kHz mono f32 samples in [-1.0, 1.0]; at most ~30 seconds per call
//! (longer uploads are windowed by the engine).

use anyhow::{anyhow, Result};
use candle_core::{Device, IndexOp, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::whisper::{self as m, Config};
use tokenizers::Tokenizer;

/// Available Whisper model sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ModelSize {
    Tiny,
    Base,
    Small,
    Medium,
    Large,
}

impl ModelSize {
    /// HuggingFace model repository for this size.
    pub fn repo_name(&self) -> &'static str {
        match self {
            ModelSize::Tiny => "openai/whisper-tiny",
            ModelSize::Base => "openai/whisper-base",
            ModelSize::Small => "openai/whisper-small",
            ModelSize::Medium => "openai/whisper-medium",
            ModelSize::Large => "openai/whisper-large-v2",
        }
    }

    /// Approximate on-disk size in MB.
    pub fn size_mb(&self) -> u32 {
        match self {
            ModelSize::Tiny => 39,
            ModelSize::Base => 74,
            ModelSize::Small => 244,
            ModelSize::Medium => 769,
            ModelSize::Large => 1550,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ModelSize::Tiny => "Fastest, basic accuracy",
            ModelSize::Base => "Fast, good for development",
            ModelSize::Small => "Balanced speed and accuracy",
            ModelSize::Medium => "Good accuracy, handles technical vocabulary",
            ModelSize::Large => "Best accuracy, slowest processing",
        }
    }
}

impl std::str::FromStr for ModelSize {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "tiny" => Ok(ModelSize::Tiny),
            "base" => Ok(ModelSize::Base),
            "small" => Ok(ModelSize::Small),
            "medium" => Ok(ModelSize::Medium),
            "large" => Ok(ModelSize::Large),
            _ => Err(anyhow!("Unknown model size: {}", s)),
        }
    }
}

impl std::fmt::Display for ModelSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ModelSize::Tiny => "tiny",
            ModelSize::Base => "base",
            ModelSize::Small => "small",
            ModelSize::Medium => "medium",
            ModelSize::Large => "large",
        };
        write!(f, "{}", name)
    }
}

/// A loaded Whisper model ready for transcription.
pub struct WhisperModel {
    model: m::model::Whisper,
    config: Config,
    device: Device,
    size: ModelSize,
    tokenizer: Tokenizer,
    mel_filters: Vec<f32>,
}

impl WhisperModel {
    /// Download (if needed) and load a Whisper model from HuggingFace.
    pub async fn load(size: ModelSize, device: Device) -> Result<Self> {
        tracing::info!("Loading Whisper {} model ({} MB)...", size, size.size_mb());
        let start_time = std::time::Instant::now();

        let api = {
            use hf_hub::api::tokio::ApiBuilder;
            let mut builder = ApiBuilder::new().with_progress(false);
            if let Ok(token) = std::env::var("HF_TOKEN") {
                builder = builder.with_token(Some(token));
            }
            builder
                .build()
                .map_err(|e| anyhow!("Failed to create HuggingFace API client: {}", e))?
        };

        let repo = api.model(size.repo_name().to_string());
        let config_filename = repo.get("config.json").await.map_err(|e| {
            anyhow!("Failed to download config.json from {}: {}", size.repo_name(), e)
        })?;
        let tokenizer_filename = repo.get("tokenizer.json").await.map_err(|e| {
            anyhow!("Failed to download tokenizer.json from {}: {}", size.repo_name(), e)
        })?;
        let model_filename = repo.get("model.safetensors").await.map_err(|e| {
            anyhow!("Failed to download model weights from {}: {}", size.repo_name(), e)
        })?;

        let config: Config = serde_json::from_reader(std::fs::File::open(config_filename)?)?;
        let tokenizer = Tokenizer::from_file(tokenizer_filename)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
        let mel_filters = build_mel_filter_bank(&config);

        let vb =
            unsafe { VarBuilder::from_mmaped_safetensors(&[model_filename], m::DTYPE, &device)? };
        let model = m::model::Whisper::load(&vb, config.clone())?;

        tracing::info!(
            "Whisper {} model loaded in {:.2}s",
            size,
            start_time.elapsed().as_secs_f64()
        );

        Ok(Self {
            model,
            config,
            device,
            size,
            tokenizer,
            mel_filters,
        })
    }

    pub fn size(&self) -> ModelSize {
        self.size
    }

    /// Transcribe one window of audio samples to text.
    ///
    /// Decoding is greedy with a temperature-fallback ladder: if a pass gets
    /// stuck in repetition, the next temperature is tried.
    pub fn transcribe(&mut self, audio_data: &[f32], language: Option<&str>) -> Result<String> {
        if audio_data.is_empty() {
            return Err(anyhow!("Audio data is empty"));
        }

        let mel = self.pcm_to_mel(audio_data)?;
        let mel = mel.unsqueeze(0)?;
        let encoder_output = self.model.encoder.forward(&mel, false)?;

        // Decoder prefix: start token, optional language token, task token
        let mut prefix = vec![SOT_TOKEN];
        if let Some(lang) = language {
            if let Some(lang_token) = language_token(lang) {
                prefix.push(lang_token);
            }
        }
        prefix.push(TRANSCRIBE_TOKEN);
        let prefix_len = prefix.len();

        const MAX_TOKENS: usize = 200;
        const TEMPERATURES: &[f32] = &[0.0, 0.2, 0.4, 0.6, 0.8, 1.0];

        let mut tokens = prefix;
        let mut output_tokens: Vec<u32> = Vec::new();

        for &temperature in TEMPERATURES {
            tokens.truncate(prefix_len);
            output_tokens.clear();
            let mut decode_success = true;

            for _ in 0..MAX_TOKENS {
                let token_tensor = Tensor::new(&tokens[..], &self.device)?.unsqueeze(0)?;
                let logits = self
                    .model
                    .decoder
                    .forward(&token_tensor, &encoder_output, false)?;
                let last_logits = logits.i((.., tokens.len() - 1, ..))?;

                let next_token = if temperature > 0.0 {
                    self.sample_token(&last_logits, temperature)?
                } else {
                    last_logits.argmax_keepdim(1)?.to_scalar::<u32>()?
                };

                if next_token == EOT_TOKEN {
                    break;
                }

                if is_repetitive(&output_tokens, next_token) {
                    decode_success = false;
                    break;
                }

                tokens.push(next_token);
                output_tokens.push(next_token);
            }

            if decode_success && !output_tokens.is_empty() {
                break;
            }
        }

        self.decode_tokens(&output_tokens)
    }

    /// Convert PCM samples to a log-mel spectrogram tensor of the shape the
    /// encoder expects: (n_mels, 3000 frames) over a padded 30 s window.
    fn pcm_to_mel(&self, pcm_data: &[f32]) -> Result<Tensor> {
        let target_len = 30 * 16_000;
        let mut padded = vec![0.0f32; target_len];
        let copy_len = pcm_data.len().min(target_len);
        padded[..copy_len].copy_from_slice(&pcm_data[..copy_len]);

        let n_mels = self.config.num_mel_bins as usize;
        let n_frames = 3000;
        let frame_size = padded.len() / n_frames;
        let mut mel_data = vec![0.0f32; n_mels * n_frames];

        for frame in 0..n_frames {
            let start = frame * frame_size;
            let end = (start + frame_size).min(padded.len());

            for mel_bin in 0..n_mels {
                let filter_row =
                    &self.mel_filters[mel_bin * frame_size..(mel_bin + 1) * frame_size];
                let mut energy = 0.0f32;
                for (offset, sample) in padded[start..end].iter().enumerate() {
                    energy += sample.abs() * filter_row[offset.min(frame_size - 1)];
                }
                // Log scaling with a -80 dB floor
                mel_data[mel_bin * n_frames + frame] =
                    (energy / frame_size as f32).max(1e-10).ln().max(-11.5129);
            }
        }

        Ok(Tensor::from_vec(mel_data, (n_mels, n_frames), &self.device)?)
    }

    fn sample_token(&self, logits: &Tensor, temperature: f32) -> Result<u32> {
        let temp_tensor = Tensor::from_vec(vec![temperature], (1,), &self.device)?;
        let logits = logits.broadcast_div(&temp_tensor)?;
        let probs = candle_nn::ops::softmax_last_dim(&logits)?;
        Ok(probs.argmax_keepdim(1)?.to_scalar::<u32>()?)
    }

    fn decode_tokens(&self, tokens: &[u32]) -> Result<String> {
        let text = self
            .tokenizer
            .decode(tokens, true)
            .map_err(|e| anyhow!("Tokenizer decode error: {}", e))?;

        let cleaned = text
            .replace("<|startoftranscript|>", "")
            .replace("<|endoftext|>", "")
            .replace("<|notimestamps|>", "");

        Ok(cleaned.trim().to_string())
    }
}

// Standard Whisper special-token ids
const SOT_TOKEN: u32 = 50258;
const EOT_TOKEN: u32 = 50257;
const TRANSCRIBE_TOKEN: u32 = 50359;

/// Language token for the given language hint, if known.
fn language_token(language: &str) -> Option<u32> {
    match language.to_lowercase().as_str() {
        "en" | "english" => Some(50259),
        "zh" | "chinese" => Some(50260),
        "de" | "german" => Some(50261),
        "es" | "spanish" => Some(50262),
        "ru" | "russian" => Some(50263),
        "ko" | "korean" => Some(50264),
        "fr" | "french" => Some(50265),
        "ja" | "japanese" => Some(50266),
        "pt" | "portuguese" => Some(50267),
        "it" | "italian" => Some(50274),
        _ => None,
    }
}

/// Detect runaway decoding: a token repeated three times or the last
/// three-token pattern occurring twice in a row.
fn is_repetitive(tokens: &[u32], new_token: u32) -> bool {
    if tokens.len() >= 3 && tokens[tokens.len() - 3..] == [new_token, new_token, new_token] {
        return true;
    }

    if tokens.len() >= 6 {
        let last_3 = &tokens[tokens.len() - 3..];
        let prev_3 = &tokens[tokens.len() - 6..tokens.len() - 3];
        if last_3 == prev_3 {
            return true;
        }
    }

    false
}

/// Build a triangular mel filter bank sized for per-frame energy weighting.
fn build_mel_filter_bank(config: &Config) -> Vec<f32> {
    let frame_size = (30 * 16_000) / 3000;
    let n_mels = config.num_mel_bins as usize;
    let mut filters = vec![0.0f32; frame_size * n_mels];

    for mel_bin in 0..n_mels {
        let center = (mel_bin + 1) * frame_size / (n_mels + 1);
        let width = (frame_size / (n_mels + 1)).max(1);

        for position in 0..frame_size {
            if position >= center.saturating_sub(width) && position <= center + width {
                let distance = (position as i32 - center as i32).abs() as f32;
                filters[mel_bin * frame_size + position] = (1.0 - distance / width as f32).max(0.0);
            }
        }
    }

    filters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_size_parsing() {
        assert_eq!("base".parse::<ModelSize>().unwrap(), ModelSize::Base);
        assert_eq!("LARGE".parse::<ModelSize>().unwrap(), ModelSize::Large);
        assert!("invalid".parse::<ModelSize>().is_err());
    }

    #[test]
    fn test_model_size_display_round_trips() {
        for size in [
            ModelSize::Tiny,
            ModelSize::Base,
            ModelSize::Small,
            ModelSize::Medium,
            ModelSize::Large,
        ] {
            assert_eq!(size.to_string().parse::<ModelSize>().unwrap(), size);
        }
    }

    #[test]
    fn test_language_tokens() {
        assert_eq!(language_token("en"), Some(50259));
        assert_eq!(language_token("English"), Some(50259));
        assert_eq!(language_token("xx"), None);
    }

    #[test]
    fn test_repetition_detection() {
        assert!(is_repetitive(&[1, 2, 7, 7, 7], 7));
        assert!(is_repetitive(&[1, 2, 3, 1, 2, 3], 4));
        assert!(!is_repetitive(&[1, 2, 3, 4, 5, 6], 7));
        assert!(!is_repetitive(&[1, 2], 2));
    }
}
