//! The instruction sent upstream for each events request.

use chrono::{Datelike, NaiveDate};

/// A natural-language instruction parameterized only by the calendar date it
/// was built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamQuery {
    pub date: NaiveDate,
    pub text: String,
}

impl UpstreamQuery {
    pub fn for_date(date: NaiveDate, search_until: &str) -> Self {
        let today = format_long_date(date);
        let text = format!(
            "You are a trendy lifestyle editor for \"Weekend Vibes North\".\n\
             CURRENT DATE: {today}\n\
             SEARCH RANGE: From NOW until {search_until}.\n\
             TASK: Search for REAL, CONFIRMED events in Northern Taiwan (Taipei, New Taipei, Keelung, Taoyuan). \
             CRITICAL: ONLY return events happening ON or AFTER today ({today}).\n\
             OUTPUT REQUIREMENTS: Return a valid JSON array. DO NOT include any conversational text, \
             markdown formatting, or introductory phrases. Just the raw JSON array."
        );

        Self { date, text }
    }
}

/// Long-form Taiwanese date, e.g. `2026年10月14日`.
pub fn format_long_date(date: NaiveDate) -> String {
    format!("{}年{}月{}日", date.year(), date.month(), date.day())
}
