pub mod locale;
pub mod query;

pub use locale::Locale;
pub use query::UpstreamQuery;
