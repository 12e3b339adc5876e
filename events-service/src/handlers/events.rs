use crate::error::EventsError;
use crate::models::{Locale, UpstreamQuery};
use crate::services::providers::GenerationOptions;
use crate::services::{extract, ExtractError};
use crate::startup::AppState;
use axum::{extract::State, http::HeaderMap, Json};
use serde_json::Value;

/// Ask the upstream for upcoming events and return the array embedded in its answer.
pub async fn list_events(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Value>>, EventsError> {
    let Some(api_key) = state.config.upstream.api_key.as_ref() else {
        tracing::error!("Upstream API key not configured; rejecting events request");
        return Err(EventsError::MissingCredential {
            locale: Locale::negotiate(&headers, state.config.prompt.default_locale),
        });
    };

    let query = UpstreamQuery::for_date(state.clock.today(), &state.config.prompt.search_until);
    let options = GenerationOptions {
        model: state.config.upstream.model.clone(),
        search_grounding: state.config.upstream.search_grounding,
    };

    let response = state
        .text_provider
        .generate(api_key, &query.text, &options)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, model = %options.model, "Upstream call failed");
            EventsError::from(e)
        })?;

    tracing::debug!(
        date = %query.date,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        finish_reason = ?response.finish_reason,
        "Upstream call completed"
    );

    let Some(text) = response.text.filter(|text| !text.is_empty()) else {
        tracing::error!("Upstream response contained no text");
        return Err(EventsError::EmptyUpstreamResponse);
    };

    match extract(&text) {
        Ok(events) => {
            tracing::info!(count = events.len(), date = %query.date, "Returning events");
            Ok(Json(events))
        }
        Err(err) => {
            match &err {
                ExtractError::NoArrayFound => {
                    tracing::error!(raw_text = %text, "Upstream response does not contain a JSON array");
                }
                ExtractError::MalformedJson { candidate, source } => {
                    tracing::error!(error = %source, raw_text = %candidate, "Failed to parse upstream JSON array");
                }
            }
            Err(err.into())
        }
    }
}
