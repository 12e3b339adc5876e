use crate::models::Locale;
use crate::services::providers::ProviderError;
use crate::services::ExtractError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub const MISSING_CREDENTIAL_ERROR: &str = "Server Error: Upstream API key not configured.";
pub const UPSTREAM_FAILURE_ERROR: &str = "Failed to process request due to internal error.";
pub const PARSE_FAILURE_ERROR: &str = "Upstream response parsing failed.";

/// Failures of the events endpoint. Every variant answers with 500.
#[derive(Debug, Error)]
pub enum EventsError {
    #[error("Upstream API key not configured")]
    MissingCredential { locale: Locale },

    #[error("Upstream call failed: {0}")]
    Upstream(#[from] ProviderError),

    #[error("Upstream returned no text")]
    EmptyUpstreamResponse,

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),
}

fn remediation_message(locale: Locale) -> &'static str {
    match locale {
        Locale::ZhTw => "請確認您已在伺服器環境變數中設定 UPSTREAM_API_KEY。",
        Locale::En => "Make sure UPSTREAM_API_KEY is set in the server environment.",
    }
}

impl IntoResponse for EventsError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
            #[serde(skip_serializing_if = "Option::is_none")]
            message: Option<&'static str>,
        }

        let status = StatusCode::INTERNAL_SERVER_ERROR;

        let body = match self {
            EventsError::MissingCredential { locale } => ErrorResponse {
                error: MISSING_CREDENTIAL_ERROR,
                message: Some(remediation_message(locale)),
            },
            EventsError::Upstream(_) => ErrorResponse {
                error: UPSTREAM_FAILURE_ERROR,
                message: None,
            },
            // Bare empty array, unlike the other failures; browser clients
            // already treat it as "no events".
            EventsError::EmptyUpstreamResponse
            | EventsError::Extraction(ExtractError::NoArrayFound) => {
                return (status, Json(Vec::<serde_json::Value>::new())).into_response();
            }
            EventsError::Extraction(ExtractError::MalformedJson { .. }) => ErrorResponse {
                error: PARSE_FAILURE_ERROR,
                message: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
