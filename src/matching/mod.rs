//! # User Compatibility Matching
//!
//! The multi-source compatibility scorer and its numeric utilities.
//!
//! ## Key Components:
//! - **vector**: normalization, resampling, fusion, cosine similarity
//! - **score**: precondition validation, fallback decision table, scoring,
//!   interpretation bands

pub mod score;
pub mod vector;

pub use score::{compute_compatibility, interpret_score, CompatibilityResult, MatchError};
