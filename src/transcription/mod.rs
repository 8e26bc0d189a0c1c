//! # Transcription Module
//!
//! Speech-to-text via Whisper models running on Candle, pure Rust with no
//! FFI bindings.
//!
//! ## Key Components:
//! - **Model loading**: download-and-cache through hf-hub, weights via
//!   safetensors
//! - **Engine**: model caching, upload windowing, confidence estimation
//!
//! ## Model Sizes:
//! tiny (~39MB) → large (~1550MB); `base` is the default and a good
//! development trade-off, `medium` handles technical vocabulary well.

pub mod engine;
pub mod model;

pub use engine::{TranscriptionConfig, TranscriptionEngine, TranscriptionResult};
pub use model::ModelSize;
