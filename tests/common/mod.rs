#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use sigeval::domain::bar::Bar;
use sigeval::domain::config::{ConcurrencyPolicy, EngineConfig, SizingMode};
use sigeval::domain::error::SigevalError;
use sigeval::domain::signal::{Signal, SignalDirection, VariantSeries};
use sigeval::ports::data_port::DataPort;

pub struct MockDataPort {
    pub bars: Vec<Bar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            bars: Vec::new(),
            error: None,
        }
    }

    pub fn with_bars(mut self, bars: Vec<Bar>) -> Self {
        self.bars = bars;
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Bar>, SigevalError> {
        if let Some(reason) = &self.error {
            return Err(SigevalError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .bars
            .iter()
            .filter(|b| b.timestamp >= start && b.timestamp <= end)
            .cloned()
            .collect())
    }
}

pub fn ts(hh: u32, mm: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(hh, mm, 0)
        .unwrap()
}

pub fn make_bar(hh: u32, mm: u32, close: f64) -> Bar {
    Bar {
        timestamp: ts(hh, mm),
        open: close,
        high: close,
        low: close,
        close,
        volume: Some(1000),
    }
}

/// Minute bars following the given close path, starting at `hh:mm`.
pub fn bar_path(hh: u32, mm: u32, closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(hh, mm + i as u32, close))
        .collect()
}

pub fn make_series(variant_id: usize, name: &str, signals: Vec<(u32, u32, i64, f64)>) -> VariantSeries {
    VariantSeries {
        variant_id,
        name: name.to_string(),
        signals: signals
            .into_iter()
            .map(|(hh, mm, value, close)| Signal {
                timestamp: ts(hh, mm),
                direction: SignalDirection::from_value(value),
                close,
            })
            .collect(),
    }
}

/// Fixed-quantity, zero-cost exclusive-hold config with immediate entries.
pub fn forward_config() -> EngineConfig {
    EngineConfig {
        sizing: SizingMode::FixedQuantity(2.0),
        transaction_cost_rate: 0.0,
        stop_loss_pct: 0.01,
        take_profit_pct: 0.015,
        max_holding_minutes: 60,
        policy: ConcurrencyPolicy::ExclusiveHold,
        signal_timeframe_minutes: 0,
        ..EngineConfig::default()
    }
}

pub fn streaming_config() -> EngineConfig {
    EngineConfig {
        policy: ConcurrencyPolicy::Reversal,
        transaction_cost_rate: 0.001,
        ..EngineConfig::default()
    }
}
