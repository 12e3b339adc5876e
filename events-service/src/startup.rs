//! Application startup and lifecycle management.

use crate::config::EventsConfig;
use crate::handlers::{health_check, list_events, readiness_check};
use crate::middleware::cors_middleware;
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::TextProvider;
use crate::services::{Clock, SystemClock};
use axum::{middleware::from_fn, routing::get, Router};
use service_core::error::AppError;
use service_core::middleware::tracing::request_id_middleware;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state. Immutable after construction.
#[derive(Clone)]
pub struct AppState {
    pub config: EventsConfig,
    pub text_provider: Arc<dyn TextProvider>,
    pub clock: Arc<dyn Clock>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/api/events", get(list_events))
        .layer(from_fn(cors_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(service_core::middleware::tracing::REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the Gemini provider and the wall clock.
    pub async fn build(config: EventsConfig) -> Result<Self, AppError> {
        let text_provider = GeminiTextProvider::new(GeminiConfig {
            base_url: config.upstream.base_url.clone(),
            timeout: Duration::from_secs(config.upstream.timeout_secs),
        })
        .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?;

        tracing::info!(
            model = %config.upstream.model,
            search_grounding = config.upstream.search_grounding,
            "Initialized Gemini text provider"
        );

        let clock = SystemClock::with_offset_hours(config.prompt.utc_offset_hours).ok_or_else(|| {
            AppError::ConfigError(anyhow::anyhow!(
                "EVENTS_UTC_OFFSET_HOURS out of range: {}",
                config.prompt.utc_offset_hours
            ))
        })?;

        Self::build_with(config, Arc::new(text_provider), Arc::new(clock)).await
    }

    /// Build the application around an explicit provider and clock.
    pub async fn build_with(
        config: EventsConfig,
        text_provider: Arc<dyn TextProvider>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        // Port 0 = random port for testing
        let address = format!("{}:{}", config.common.host, config.common.port);
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Events service: HTTP on port {}", port);

        Ok(Self {
            port,
            listener,
            state: AppState {
                config,
                text_provider,
                clock,
            },
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
