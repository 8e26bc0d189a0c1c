//! # Summarisation Endpoint
//!
//! `POST /api/v1/summarise`: extract topics from a transcript and generate a
//! topic-guided single-sentence summary.

use crate::error::AppResult;
use crate::state::AppState;
use crate::summary::generate_summary;
use crate::topics::extract_topics;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SummariseRequest {
    pub transcript: String,
}

#[derive(Debug, Serialize)]
pub struct SummariseResponse {
    pub topics: Vec<String>,
    pub summary: String,
}

/// Extract topics and generate a summary from a transcript. The summarizer
/// is total: short or empty transcripts echo back unchanged.
pub async fn summarise(
    state: web::Data<AppState>,
    body: web::Json<SummariseRequest>,
) -> AppResult<HttpResponse> {
    let config = state.get_config();

    let topics = extract_topics(&body.transcript, config.summary.topics_top_n);
    let summary = generate_summary(&body.transcript, &topics);

    Ok(HttpResponse::Ok().json(SummariseResponse { topics, summary }))
}
