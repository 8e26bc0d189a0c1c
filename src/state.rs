//! # Application State Management
//!
//! Shared state accessed by every HTTP request handler. All mutable pieces
//! use the `Arc<RwLock<T>>` pattern: many concurrent readers or one writer,
//! with the lock held only long enough to copy data out.
//!
//! The transcription engine manages its own interior locking (it caches a
//! loaded model), and the user store is immutable after startup, so both are
//! shared behind plain `Arc`.

use crate::config::AppConfig;
use crate::transcription::TranscriptionEngine;
use crate::users::UserStore;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;

/// State shared across all HTTP request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration (updatable at runtime)
    pub config: Arc<RwLock<AppConfig>>,

    /// Request/error counters, updated by middleware on every request
    pub metrics: Arc<RwLock<AppMetrics>>,

    /// When the server started (immutable, no lock needed)
    pub start_time: Instant,

    /// Speech recognizer; owns its model cache
    pub engine: Arc<TranscriptionEngine>,

    /// Static user profiles, loaded once at startup
    pub users: Arc<UserStore>,
}

/// Performance metrics collected across all HTTP requests.
#[derive(Debug, Default)]
pub struct AppMetrics {
    /// Total requests processed since server start
    pub request_count: u64,

    /// Total errors since server start
    pub error_count: u64,

    /// Currently running transcription/analysis requests
    pub active_sessions: u32,

    /// Per-endpoint statistics, keyed by "METHOD /path"
    pub endpoint_metrics: HashMap<String, EndpointMetric>,
}

/// Detailed metrics for one endpoint.
#[derive(Debug, Default, Clone)]
pub struct EndpointMetric {
    pub request_count: u64,
    pub total_duration_ms: u64,
    pub error_count: u64,
}

impl AppState {
    pub fn new(config: AppConfig, engine: TranscriptionEngine, users: UserStore) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            metrics: Arc::new(RwLock::new(AppMetrics::default())),
            start_time: Instant::now(),
            engine: Arc::new(engine),
            users: Arc::new(users),
        }
    }

    /// Get a copy of the current configuration. Cloning releases the read
    /// lock immediately so other requests are never blocked on it.
    pub fn get_config(&self) -> AppConfig {
        self.config.read().unwrap().clone()
    }

    /// Replace the configuration after validating the new value.
    pub fn update_config(&self, new_config: AppConfig) -> Result<(), String> {
        match new_config.validate() {
            Ok(_) => {
                *self.config.write().unwrap() = new_config;
                Ok(())
            }
            Err(e) => Err(e.to_string()),
        }
    }

    /// Increment the total request counter (middleware, every request).
    pub fn increment_request_count(&self) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.request_count += 1;
    }

    /// Increment the total error counter (any 4xx/5xx response).
    pub fn increment_error_count(&self) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.error_count += 1;
    }

    /// Record per-endpoint statistics for one completed request.
    pub fn record_endpoint_request(&self, endpoint: &str, duration_ms: u64, is_error: bool) {
        let mut metrics = self.metrics.write().unwrap();
        let endpoint_metric = metrics.endpoint_metrics.entry(endpoint.to_string()).or_default();

        endpoint_metric.request_count += 1;
        endpoint_metric.total_duration_ms += duration_ms;
        if is_error {
            endpoint_metric.error_count += 1;
        }
    }

    /// Track the start of a long-running analysis request.
    pub fn increment_active_sessions(&self) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.active_sessions += 1;
    }

    /// Track the end of a long-running analysis request. Guards against
    /// underflow so unbalanced calls cannot panic.
    pub fn decrement_active_sessions(&self) {
        let mut metrics = self.metrics.write().unwrap();
        if metrics.active_sessions > 0 {
            metrics.active_sessions -= 1;
        }
    }

    /// Consistent snapshot of current metrics for the metrics endpoint.
    pub fn get_metrics_snapshot(&self) -> AppMetrics {
        let metrics = self.metrics.read().unwrap();
        AppMetrics {
            request_count: metrics.request_count,
            error_count: metrics.error_count,
            active_sessions: metrics.active_sessions,
            endpoint_metrics: metrics.endpoint_metrics.clone(),
        }
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl EndpointMetric {
    /// Average response time for this endpoint in milliseconds.
    pub fn average_duration_ms(&self) -> f64 {
        if self.request_count > 0 {
            self.total_duration_ms as f64 / self.request_count as f64
        } else {
            0.0
        }
    }

    /// Error rate for this endpoint in [0.0, 1.0].
    pub fn error_rate(&self) -> f64 {
        if self.request_count > 0 {
            self.error_count as f64 / self.request_count as f64
        } else {
            0.0
        }
    }
}
