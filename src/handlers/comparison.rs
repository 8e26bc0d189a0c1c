//! # Topic-Extraction Comparison Endpoint
//!
//! Benchmarks the available topic-extraction methods against the same
//! transcript, timing each one, so their output quality and cost can be
//! compared side by side.
//!
//! ## Available Endpoints:
//! - `POST /api/v1/topic-comparison` — run all methods and report results
//! - `GET /api/v1/topic-comparison/methods` — static method catalog

use crate::error::{AppError, AppResult};
use crate::topics::{extract_topics, extract_topics_rake, extract_topics_textrank};
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;

#[derive(Debug, Deserialize)]
pub struct TopicComparisonRequest {
    pub transcript: String,

    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    5
}

#[derive(Debug, Serialize)]
pub struct MethodResult {
    pub method: String,
    pub topics: Vec<String>,
    pub time_sec: f64,
}

/// Run every extraction method over the same transcript and time each one.
pub async fn compare_methods(body: web::Json<TopicComparisonRequest>) -> AppResult<HttpResponse> {
    if body.transcript.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Transcript must not be empty".to_string(),
        ));
    }

    let methods: [(&str, fn(&str, usize) -> Vec<String>); 3] = [
        ("TF-IDF", extract_topics),
        ("RAKE", extract_topics_rake),
        ("TextRank", extract_topics_textrank),
    ];

    let mut results = Vec::with_capacity(methods.len());
    for (name, extract) in methods {
        let start = Instant::now();
        let topics = extract(&body.transcript, body.top_n);
        let time_sec = round3(start.elapsed().as_secs_f64());

        results.push(MethodResult {
            method: name.to_string(),
            topics,
            time_sec,
        });
    }

    let total_time: f64 = results.iter().map(|r| r.time_sec).sum();
    let fastest = results
        .iter()
        .min_by(|a, b| {
            a.time_sec
                .partial_cmp(&b.time_sec)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|r| r.method.clone());

    Ok(HttpResponse::Ok().json(json!({
        "results": results,
        "summary": {
            "total_methods": results.len(),
            "total_time_sec": round3(total_time),
            "fastest_method": fastest,
            "transcript_length": body.transcript.len(),
            "top_n": body.top_n
        }
    })))
}

/// Static catalog of the available methods with their trade-offs.
pub async fn list_methods() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "methods": [
            {
                "name": "TF-IDF",
                "description": "Statistical scoring by term frequency against inverse document frequency over the transcript's sentences",
                "output_type": "Single keywords",
                "pros": ["Very fast", "Low memory usage", "Deterministic"],
                "cons": ["May select trivial words", "Ignores semantic context"]
            },
            {
                "name": "RAKE",
                "description": "Rapid Automatic Keyword Extraction over contiguous non-stop-word phrases",
                "output_type": "Keywords and multi-word phrases",
                "pros": ["Surfaces multi-word topics", "Fast"],
                "cons": ["Sensitive to punctuation quality", "No semantic model"]
            },
            {
                "name": "TextRank",
                "description": "Graph-based ranking over word co-occurrence, PageRank-style",
                "output_type": "Single keywords",
                "pros": ["Robust on longer transcripts", "No training data needed"],
                "cons": ["Slower than frequency methods", "Still purely statistical"]
            }
        ]
    }))
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
