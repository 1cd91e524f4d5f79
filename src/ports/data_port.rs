//! Price-data access port trait.

use crate::domain::bar::Bar;
use crate::domain::error::SigevalError;
use chrono::NaiveDateTime;

/// Boundary to the price-bar store. Implementations return bars sorted by
/// timestamp, inclusive of both window ends. An empty result is not an error;
/// the engine treats it as a missing forward window and drops the signal.
pub trait DataPort {
    fn fetch_bars(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Bar>, SigevalError>;
}
