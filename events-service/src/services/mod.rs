pub mod clock;
pub mod extractor;
pub mod providers;

pub use clock::{Clock, FixedClock, SystemClock};
pub use extractor::{extract, ExtractError};
