//! # Transcription Endpoints
//!
//! Multipart audio upload → transcript, optionally continuing into topic
//! extraction and summarization.
//!
//! ## Available Endpoints:
//! - `POST /api/v1/transcribe` — transcript only
//! - `POST /api/v1/transcribe-summarise` — transcript + topics + summary

use crate::audio::decode_audio;
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::summary::generate_summary;
use crate::topics::extract_topics;
use crate::transcription::{ModelSize, TranscriptionResult};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use serde_json::json;

/// Transcribe an uploaded audio file.
pub async fn transcribe(
    state: web::Data<AppState>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let config = state.get_config();
    let audio_bytes = read_audio_upload(payload, config.limits.max_upload_bytes).await?;

    state.increment_active_sessions();
    let result = run_transcription(&state, &config, &audio_bytes).await;
    state.decrement_active_sessions();
    let result = result?;

    Ok(HttpResponse::Ok().json(json!({
        "transcript": result.text,
        "confidence": result.confidence,
        "audio_duration": result.audio_duration,
        "processing_time_ms": result.processing_time_ms,
        "model": result.model_name
    })))
}

/// Transcribe an uploaded audio file, then extract topics and generate a
/// summary in one round trip.
pub async fn transcribe_and_summarise(
    state: web::Data<AppState>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let config = state.get_config();
    let audio_bytes = read_audio_upload(payload, config.limits.max_upload_bytes).await?;

    state.increment_active_sessions();
    let result = run_transcription(&state, &config, &audio_bytes).await;
    state.decrement_active_sessions();
    let result = result?;

    let topics = extract_topics(&result.text, config.summary.topics_top_n);
    let summary = generate_summary(&result.text, &topics);

    Ok(HttpResponse::Ok().json(json!({
        "transcript": result.text,
        "topics": topics,
        "summary": summary
    })))
}

/// Decode the upload and run it through the transcription engine, loading
/// the configured model first if it is not already cached.
async fn run_transcription(
    state: &web::Data<AppState>,
    config: &AppConfig,
    audio_bytes: &[u8],
) -> AppResult<TranscriptionResult> {
    let samples = decode_audio(audio_bytes)
        .map_err(|e| AppError::BadRequest(format!("Could not decode audio: {}", e)))?;

    let model_size = config
        .models
        .whisper_model
        .parse::<ModelSize>()
        .map_err(|e| AppError::ConfigError(e.to_string()))?;

    state.engine.ensure_model(model_size).await?;
    state
        .engine
        .transcribe(&samples)
        .await
        .map_err(|e| AppError::Internal(format!("Transcription failed: {}", e)))
}

/// Collect the first non-empty multipart field as the audio payload,
/// enforcing the upload size limit while streaming.
async fn read_audio_upload(mut payload: Multipart, max_bytes: usize) -> AppResult<Vec<u8>> {
    let mut audio_bytes: Vec<u8> = Vec::new();

    while let Some(field) = payload.next().await {
        let mut field =
            field.map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {}", e)))?;

        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;

            if audio_bytes.len() + chunk.len() > max_bytes {
                return Err(AppError::ValidationError(format!(
                    "Upload exceeds the {} byte limit",
                    max_bytes
                )));
            }
            audio_bytes.extend_from_slice(&chunk);
        }

        if !audio_bytes.is_empty() {
            break;
        }
    }

    if audio_bytes.is_empty() {
        return Err(AppError::BadRequest(
            "No audio file found in the upload".to_string(),
        ));
    }

    Ok(audio_bytes)
}
