#![allow(dead_code)]

use chrono::NaiveDate;
use events_service::config::{EventsConfig, PromptConfig, UpstreamConfig};
use events_service::models::Locale;
use events_service::services::providers::mock::MockTextProvider;
use events_service::services::FixedClock;
use events_service::startup::{build_router, AppState, Application};
use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
}

pub fn test_config(api_key: Option<&str>, base_url: &str) -> EventsConfig {
    EventsConfig {
        common: CoreConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        upstream: UpstreamConfig {
            api_key: api_key.map(|key| Secret::new(key.to_string())),
            model: "gemini-2.5-flash".to_string(),
            base_url: base_url.to_string(),
            timeout_secs: 5,
            search_grounding: true,
        },
        prompt: PromptConfig {
            utc_offset_hours: 8,
            search_until: "December 2026".to_string(),
            default_locale: Locale::ZhTw,
        },
    }
}

/// Router wired to `provider`, a fixed clock, and an optional key.
pub fn router_with(provider: Arc<MockTextProvider>, api_key: Option<&str>) -> axum::Router {
    let state = AppState {
        config: test_config(api_key, "http://upstream.invalid"),
        text_provider: provider,
        clock: Arc::new(FixedClock(today())),
    };
    build_router(state)
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    pub async fn spawn(config: EventsConfig, provider: Arc<MockTextProvider>) -> Self {
        let app = Application::build_with(config, provider, Arc::new(FixedClock(today())))
            .await
            .expect("Failed to build test application");

        Self::run(app).await
    }

    pub async fn run(app: Application) -> Self {
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address, port }
    }
}
