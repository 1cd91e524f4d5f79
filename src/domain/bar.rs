//! Minute-level OHLC bar representation.

use chrono::{NaiveDateTime, NaiveTime};

/// One price bar. Timestamps are unique and monotonically increasing within a
/// series; the engine never mutates bars.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<i64>,
}

/// Keep only bars whose time-of-day falls inside the trading session window
/// (inclusive on both ends).
pub fn session_filter(bars: &[Bar], start: NaiveTime, end: NaiveTime) -> Vec<Bar> {
    bars.iter()
        .filter(|b| {
            let t = b.timestamp.time();
            t >= start && t <= end
        })
        .cloned()
        .collect()
}
