//! CSV file data adapters for price bars and signal series.
//!
//! Bar files carry `datetime,open,high,low,close[,volume]` rows at minute
//! granularity. Signal files carry `datetime,close` followed by one column per
//! variant holding direction values in {-1, 0, 1}. Malformed rows are dropped
//! and parsing continues; a missing file is an error.

use crate::domain::bar::Bar;
use crate::domain::error::SigevalError;
use crate::domain::signal::{Signal, SignalDirection, SignalSet, VariantSeries};
use crate::ports::data_port::DataPort;
use chrono::NaiveDateTime;
use std::fs::File;
use std::path::Path;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Price-bar store backed by a single CSV file, loaded once and served from
/// memory so per-signal window fetches stay cheap.
pub struct CsvBarAdapter {
    bars: Vec<Bar>,
}

impl CsvBarAdapter {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SigevalError> {
        let file = open(path.as_ref())?;
        let mut rdr = csv::Reader::from_reader(file);
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| SigevalError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let parsed = (|| {
                let timestamp =
                    NaiveDateTime::parse_from_str(record.get(0)?, DATETIME_FORMAT).ok()?;
                let open: f64 = record.get(1)?.parse().ok()?;
                let high: f64 = record.get(2)?.parse().ok()?;
                let low: f64 = record.get(3)?.parse().ok()?;
                let close: f64 = record.get(4)?.parse().ok()?;
                let volume = record.get(5).and_then(|v| v.parse().ok());
                Some(Bar { timestamp, open, high, low, close, volume })
            })();

            // Unparseable rows are dropped, not fatal.
            if let Some(bar) = parsed {
                if bar.close.is_finite() && bar.close > 0.0 {
                    bars.push(bar);
                }
            }
        }

        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);
        Ok(Self { bars })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

impl DataPort for CsvBarAdapter {
    fn fetch_bars(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Bar>, SigevalError> {
        let lo = self.bars.partition_point(|b| b.timestamp < start);
        let hi = self.bars.partition_point(|b| b.timestamp <= end);
        Ok(self.bars[lo..hi].to_vec())
    }
}

/// Load all variant series from a signal CSV: columns after `datetime,close`
/// are variants, named by their headers, in column order.
pub fn load_signal_set<P: AsRef<Path>>(path: P) -> Result<SignalSet, SigevalError> {
    let file = open(path.as_ref())?;
    let mut rdr = csv::Reader::from_reader(file);

    let headers = rdr
        .headers()
        .map_err(|e| SigevalError::Data {
            reason: format!("CSV parse error: {}", e),
        })?
        .clone();
    if headers.len() < 3 {
        return Err(SigevalError::Data {
            reason: format!(
                "signal file {} needs datetime, close, and at least one variant column",
                path.as_ref().display()
            ),
        });
    }

    let names: Vec<String> = headers.iter().skip(2).map(str::to_string).collect();
    let mut variants: Vec<VariantSeries> = names
        .iter()
        .enumerate()
        .map(|(variant_id, name)| VariantSeries {
            variant_id,
            name: name.clone(),
            signals: Vec::new(),
        })
        .collect();

    for result in rdr.records() {
        let record = result.map_err(|e| SigevalError::Data {
            reason: format!("CSV parse error: {}", e),
        })?;

        let Some(timestamp) = record
            .get(0)
            .and_then(|s| NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).ok())
        else {
            continue;
        };
        let Some(close) = record.get(1).and_then(|s| s.parse::<f64>().ok()) else {
            continue;
        };
        if !close.is_finite() || close <= 0.0 {
            continue;
        }

        for (i, variant) in variants.iter_mut().enumerate() {
            let value: i64 = record
                .get(i + 2)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(0);
            variant.signals.push(Signal {
                timestamp,
                direction: SignalDirection::from_value(value),
                close,
            });
        }
    }

    Ok(SignalSet::new(variants))
}

fn open(path: &Path) -> Result<File, SigevalError> {
    File::open(path).map_err(|e| SigevalError::Data {
        reason: format!("failed to read {}: {}", path.display(), e),
    })
}
