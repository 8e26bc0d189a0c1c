//! # Audio Handling
//!
//! Decoding of uploaded audio into the sample format the transcription
//! engine consumes (16 kHz, mono, f32 in [-1.0, 1.0]).

pub mod decoder;

pub use decoder::decode_audio;
