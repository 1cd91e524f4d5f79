//! Signal/price alignment.
//!
//! Signals arrive on an irregular (coarser) timeline than the minute bars they
//! are traded against. Alignment carries the last known signal forward onto the
//! bar timeline: a signal holds until superseded by a newer one, and bars before
//! the first signal map to `None`.

use chrono::NaiveDateTime;

use super::bar::Bar;
use super::signal::{SignalDirection, VariantSeries};

/// One bar annotated with the signal state in force at its timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedBar {
    pub timestamp: NaiveDateTime,
    pub close: f64,
    pub direction: SignalDirection,
}

/// Align one variant's signal series onto the bar timeline by carry-forward.
/// Both inputs are sorted by timestamp; the output has one entry per bar.
pub fn align(bars: &[Bar], series: &VariantSeries) -> Vec<AlignedBar> {
    let mut out = Vec::with_capacity(bars.len());
    let mut cursor = 0usize;
    let mut current = SignalDirection::None;

    for bar in bars {
        while cursor < series.signals.len() && series.signals[cursor].timestamp <= bar.timestamp {
            current = series.signals[cursor].direction;
            cursor += 1;
        }
        out.push(AlignedBar {
            timestamp: bar.timestamp,
            close: bar.close,
            direction: current,
        });
    }

    out
}
