//! # User Matching Endpoint
//!
//! `POST /api/v1/match`: compatibility score between two users from the
//! static user store, optionally blended with a shared topic set.
//!
//! Request-level validation lives here (unknown ids, weight ceiling); the
//! structural preconditions (missing data, negative weights) belong to the
//! scoring core and surface through `MatchError`.

use crate::error::{AppError, AppResult};
use crate::matching::compute_compatibility;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub user1_id: String,
    pub user2_id: String,

    /// Optional shared topic set for context-aware matching
    #[serde(default)]
    pub topics: Option<Vec<String>>,

    #[serde(default = "default_topic_weight")]
    pub topic_weight: f64,

    #[serde(default = "default_psych_weight")]
    pub psych_weight: f64,
}

fn default_topic_weight() -> f64 {
    0.5
}

fn default_psych_weight() -> f64 {
    1.0
}

/// Compute the compatibility score between two users.
pub async fn match_users(
    state: web::Data<AppState>,
    body: web::Json<MatchRequest>,
) -> AppResult<HttpResponse> {
    let config = state.get_config();

    let user1 = state
        .users
        .get(&body.user1_id)
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", body.user1_id)))?;
    let user2 = state
        .users
        .get(&body.user2_id)
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", body.user2_id)))?;

    let max_weight = config.matching.max_weight;
    if body.topic_weight > max_weight || body.psych_weight > max_weight {
        return Err(AppError::ValidationError(format!(
            "Weights too high (max {})",
            max_weight
        )));
    }

    let result = compute_compatibility(
        user1.psychometrics.as_deref(),
        user2.psychometrics.as_deref(),
        body.user1_id == body.user2_id,
        body.topics.as_deref(),
        body.topic_weight,
        body.psych_weight,
    )?;

    Ok(HttpResponse::Ok().json(result))
}
