use crate::models::Locale;
use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;

const DEFAULT_UPSTREAM_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default upstream request timeout. Grounded search answers are slow.
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 120;

/// Taipei time; "today" in the prompt is the audience's calendar day.
const DEFAULT_UTC_OFFSET_HOURS: i32 = 8;

#[derive(Debug, Clone)]
pub struct EventsConfig {
    pub common: core_config::Config,
    pub upstream: UpstreamConfig,
    pub prompt: PromptConfig,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// `None` when no key is configured. The service still starts and
    /// answers every events request with a configuration error.
    pub api_key: Option<Secret<String>>,
    /// Model identifier (e.g., gemini-2.5-flash)
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Enables the live web search tool on every upstream call.
    pub search_grounding: bool,
}

#[derive(Debug, Clone)]
pub struct PromptConfig {
    pub utc_offset_hours: i32,
    /// Upper bound of the event search window, as written into the prompt.
    pub search_until: String,
    /// Locale used for caller-facing messages when Accept-Language is absent or unsupported.
    pub default_locale: Locale,
}

impl EventsConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        Self::from_lookup(common, |key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup instead of the
    /// process environment.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_prod = lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()) == "prod";
        let get = |key: &str, default: Option<&str>| get_env(&lookup, key, default, is_prod);

        let api_key = lookup("UPSTREAM_API_KEY")
            .or_else(|| lookup("GEMINI_API_KEY"))
            .filter(|key| !key.trim().is_empty())
            .map(Secret::new);

        if api_key.is_none() {
            tracing::warn!("UPSTREAM_API_KEY is not set; events requests will fail until it is configured");
        }

        Ok(EventsConfig {
            common,
            upstream: UpstreamConfig {
                api_key,
                model: get("UPSTREAM_MODEL", Some("gemini-2.5-flash"))?,
                base_url: get("UPSTREAM_BASE_URL", Some(DEFAULT_UPSTREAM_BASE_URL))?,
                timeout_secs: parse_value(
                    "UPSTREAM_TIMEOUT_SECS",
                    &get(
                        "UPSTREAM_TIMEOUT_SECS",
                        Some(&DEFAULT_UPSTREAM_TIMEOUT_SECS.to_string()),
                    )?,
                )?,
                search_grounding: parse_bool(
                    "UPSTREAM_SEARCH_GROUNDING",
                    &get("UPSTREAM_SEARCH_GROUNDING", Some("true"))?,
                )?,
            },
            prompt: PromptConfig {
                utc_offset_hours: parse_value(
                    "EVENTS_UTC_OFFSET_HOURS",
                    &get(
                        "EVENTS_UTC_OFFSET_HOURS",
                        Some(&DEFAULT_UTC_OFFSET_HOURS.to_string()),
                    )?,
                )?,
                search_until: get("EVENTS_SEARCH_UNTIL", Some("December 2026"))?,
                default_locale: parse_value(
                    "EVENTS_DEFAULT_LOCALE",
                    &get("EVENTS_DEFAULT_LOCALE", Some("zh-TW"))?,
                )?,
            },
        })
    }

    pub fn has_credential(&self) -> bool {
        self.upstream.api_key.is_some()
    }
}

fn get_env<F>(lookup: &F, key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => Ok(val),
        None => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| {
        AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
    })
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} must be a boolean, got '{}'",
            key,
            raw
        ))),
    }
}
