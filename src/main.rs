//! # Conversation Insights Backend - Main Application Entry Point
//!
//! Sets up an Actix-web HTTP server exposing audio transcription, topic
//! extraction, extractive summarization, and user-compatibility scoring as
//! REST endpoints.
//!
//! ## Application Architecture:
//! - **config**: layered configuration (TOML file + environment variables)
//! - **state**: shared application state and request metrics
//! - **health**: health and metrics endpoints
//! - **middleware**: request logging and metrics collection
//! - **handlers**: HTTP request handlers for the API endpoints
//! - **error**: error types and their HTTP responses
//! - **audio / transcription / device**: upload decoding and the Whisper
//!   speech recognizer
//! - **topics / summary / matching**: the analysis engines
//! - **users**: the static user store backing the match endpoint

mod audio;
mod config;
mod device;
mod error;
mod handlers;
mod health;
mod matching;
mod middleware;
mod state;
mod summary;
mod topics;
mod transcription;
mod users;

use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, middleware::Logger};
use anyhow::Result;
use config::AppConfig;
use state::AppState;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transcription::{TranscriptionConfig, TranscriptionEngine};
use users::UserStore;

/// Global shutdown flag set by the signal handler task and polled by the
/// main task to stop the server gracefully.
static SHUTDOWN_SIGNAL: AtomicBool = AtomicBool::new(false);

#[actix_web::main]
async fn main() -> Result<()> {
    // Optional .env file; absence is fine
    dotenv::dotenv().ok();

    init_tracing()?;

    let config = AppConfig::load()?;
    config.validate()?;

    info!(
        "Starting conversation-insights-backend v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!(
        "Configuration loaded: {}:{}",
        config.server.host, config.server.port
    );

    // The transcription engine owns the model cache; the model itself loads
    // lazily on the first transcription request
    let inference_device = device::create_device_from_string(&config.models.device);
    let engine = TranscriptionEngine::new(
        TranscriptionConfig {
            language: Some(config.models.language.clone()),
            ..TranscriptionConfig::default()
        },
        inference_device,
    );

    // A missing user file disables matching but not the other endpoints
    let users = match UserStore::load(&config.matching.users_file) {
        Ok(store) => store,
        Err(e) => {
            warn!("Could not load user store: {:#}. Match requests will find no users", e);
            UserStore::default()
        }
    };
    if users.is_empty() {
        warn!("User store is empty; the match endpoint will return 404 for every id");
    }

    let app_state = AppState::new(config.clone(), engine, users);
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    setup_signal_handlers();

    info!("Starting HTTP server on {}", bind_addr);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(middleware::MetricsMiddleware)
            .wrap(middleware::RequestLogging)
            .service(
                web::scope("/api/v1")
                    .route("/health", web::get().to(health::health_check))
                    .route("/metrics", web::get().to(health::detailed_metrics))
                    .route("/config", web::get().to(handlers::get_config))
                    .route("/config", web::put().to(handlers::update_config))
                    .route("/transcribe", web::post().to(handlers::transcribe))
                    .route(
                        "/transcribe-summarise",
                        web::post().to(handlers::transcribe_and_summarise),
                    )
                    .route("/summarise", web::post().to(handlers::summarise))
                    .route("/match", web::post().to(handlers::match_users))
                    .route("/topic-comparison", web::post().to(handlers::compare_methods))
                    .route(
                        "/topic-comparison/methods",
                        web::get().to(handlers::list_methods),
                    ),
            )
            // Root-level conveniences: banner and health alias
            .route("/", web::get().to(root_banner))
            .route("/health", web::get().to(health::health_check))
    })
    .bind(&bind_addr)?
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    // Whichever happens first wins: server exit (usually an error) or a
    // shutdown signal
    tokio::select! {
        result = server_task => {
            match result {
                Ok(server_result) => {
                    if let Err(e) = server_result {
                        error!("Server error: {}", e);
                    }
                }
                Err(e) => {
                    error!("Server task error: {}", e);
                }
            }
        }
        _ = wait_for_shutdown() => {
            info!("Shutdown signal received, stopping server...");
            server_handle.stop(true).await;
        }
    }

    info!("Server stopped gracefully");
    Ok(())
}

/// Service banner at the root path.
async fn root_banner() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Conversation Insights API is running",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Initialize structured logging. `RUST_LOG` controls the filter; the
/// default keeps this crate at debug and actix at info.
fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conversation_insights_backend=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

/// Install SIGTERM/SIGINT handlers that flip the global shutdown flag.
fn setup_signal_handlers() {
    tokio::spawn(async {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler");
        let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
            .expect("Failed to install SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
        }

        SHUTDOWN_SIGNAL.store(true, Ordering::SeqCst);
    });
}

/// Poll the shutdown flag; 100 ms granularity is plenty for a shutdown path.
async fn wait_for_shutdown() {
    while !SHUTDOWN_SIGNAL.load(Ordering::SeqCst) {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }
}
