//! Caller display locale.

use axum::http::{header, HeaderMap};
use std::str::FromStr;

/// Locales the service can write caller-facing messages in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    /// Traditional Chinese (Taiwan).
    ZhTw,
    En,
}

impl Locale {
    /// Resolve the caller's locale from `Accept-Language`, honoring the
    /// header's order and ignoring quality weights.
    pub fn negotiate(headers: &HeaderMap, fallback: Locale) -> Locale {
        headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| {
                value
                    .split(',')
                    .filter_map(|tag| tag.split(';').next())
                    .find_map(|tag| tag.trim().parse().ok())
            })
            .unwrap_or(fallback)
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let primary = s
            .split(|c: char| c == '-' || c == '_')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match primary.as_str() {
            "zh" => Ok(Locale::ZhTw),
            "en" => Ok(Locale::En),
            _ => Err(format!("unsupported locale '{}'", s)),
        }
    }
}
