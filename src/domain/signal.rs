//! Directional signals and per-variant signal series.
//!
//! Each variant ("pattern" in the source data) is an independently evaluated
//! signal rule sharing the same price series. The combined series sums every
//! variant's direction value per timestamp for whole-portfolio runs.

use chrono::NaiveDateTime;

/// Direction carried by a raw signal: {1, -1, 0} in the source encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalDirection {
    Buy,
    Sell,
    None,
}

impl SignalDirection {
    pub fn from_value(value: i64) -> Self {
        match value {
            v if v > 0 => SignalDirection::Buy,
            v if v < 0 => SignalDirection::Sell,
            _ => SignalDirection::None,
        }
    }

    pub fn value(&self) -> i64 {
        match self {
            SignalDirection::Buy => 1,
            SignalDirection::Sell => -1,
            SignalDirection::None => 0,
        }
    }
}

/// One timestamped signal observation. `close` is the price the signal was
/// generated against (the aggregate bar close), used as the entry price.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub timestamp: NaiveDateTime,
    pub direction: SignalDirection,
    pub close: f64,
}

/// All signals for one variant, sorted by timestamp.
#[derive(Debug, Clone)]
pub struct VariantSeries {
    pub variant_id: usize,
    pub name: String,
    pub signals: Vec<Signal>,
}

impl VariantSeries {
    /// Signals with a non-`None` direction, preserving order.
    pub fn active_signals(&self) -> impl Iterator<Item = &Signal> {
        self.signals
            .iter()
            .filter(|s| s.direction != SignalDirection::None)
    }
}

/// The full signal input: one series per variant plus the combined aggregate.
#[derive(Debug, Clone)]
pub struct SignalSet {
    pub variants: Vec<VariantSeries>,
    pub combined: VariantSeries,
}

impl SignalSet {
    /// Build from per-variant series; the combined series sums direction values
    /// across variants at each timestamp of the first series' timeline.
    pub fn new(variants: Vec<VariantSeries>) -> Self {
        let combined = combine(&variants);
        SignalSet { variants, combined }
    }
}

fn combine(variants: &[VariantSeries]) -> VariantSeries {
    let timeline: &[Signal] = variants.first().map(|v| v.signals.as_slice()).unwrap_or(&[]);

    let signals = timeline
        .iter()
        .enumerate()
        .map(|(i, base)| {
            let sum: i64 = variants
                .iter()
                .filter_map(|v| v.signals.get(i))
                .map(|s| s.direction.value())
                .sum();
            Signal {
                timestamp: base.timestamp,
                direction: SignalDirection::from_value(sum),
                close: base.close,
            }
        })
        .collect();

    VariantSeries {
        variant_id: usize::MAX,
        name: "combined".to_string(),
        signals,
    }
}
