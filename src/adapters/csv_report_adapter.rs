//! CSV report adapter: one trades file and one metrics file per variant.

use crate::domain::config::EngineConfig;
use crate::domain::engine::{BacktestReport, VariantOutcome};
use crate::domain::error::SigevalError;
use crate::domain::metrics::Metrics;
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::Path;

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    fn write_variant(
        &self,
        outcome: &VariantOutcome,
        config: &EngineConfig,
        output_dir: &Path,
    ) -> Result<(), SigevalError> {
        let slug = slugify(&outcome.name);
        write_trades(outcome, &output_dir.join(format!("trades_{}.csv", slug)))?;
        write_metrics(outcome, config, &output_dir.join(format!("metrics_{}.csv", slug)))?;
        Ok(())
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        report: &BacktestReport,
        config: &EngineConfig,
        output_dir: &str,
    ) -> Result<(), SigevalError> {
        let dir = Path::new(output_dir);
        fs::create_dir_all(dir)?;

        for outcome in &report.variants {
            self.write_variant(outcome, config, dir)?;
        }
        self.write_variant(&report.combined, config, dir)?;
        Ok(())
    }
}

fn write_trades(outcome: &VariantOutcome, path: &Path) -> Result<(), SigevalError> {
    let mut wtr = csv::Writer::from_path(path).map_err(report_error)?;
    wtr.write_record([
        "variant",
        "direction",
        "entry_time",
        "entry_price",
        "exit_time",
        "exit_price",
        "quantity",
        "gross_pnl",
        "transaction_cost",
        "net_pnl",
        "exit_reason",
        "holding_minutes",
    ])
    .map_err(report_error)?;

    for trade in &outcome.ledger.trades {
        wtr.write_record([
            outcome.name.as_str(),
            trade.direction.as_str(),
            &trade.entry_time.format("%Y-%m-%d %H:%M:%S").to_string(),
            &format!("{:.4}", trade.entry_price),
            &trade.exit_time.format("%Y-%m-%d %H:%M:%S").to_string(),
            &format!("{:.4}", trade.exit_price),
            &format!("{:.4}", trade.quantity),
            &format!("{:.4}", trade.gross_pnl),
            &format!("{:.4}", trade.transaction_cost),
            &format!("{:.4}", trade.net_pnl),
            trade.exit_reason.as_str(),
            &trade.holding_minutes().to_string(),
        ])
        .map_err(report_error)?;
    }

    wtr.flush().map_err(|e| SigevalError::Report {
        reason: format!("failed to flush {}: {}", path.display(), e),
    })
}

fn write_metrics(
    outcome: &VariantOutcome,
    config: &EngineConfig,
    path: &Path,
) -> Result<(), SigevalError> {
    let metrics = Metrics::compute(&outcome.ledger, config);

    let mut wtr = csv::Writer::from_path(path).map_err(report_error)?;
    wtr.write_record(["metric", "value"]).map_err(report_error)?;
    wtr.write_record(["variant", outcome.name.as_str()])
        .map_err(report_error)?;
    wtr.write_record(["buy_signals", &outcome.buy_signals.to_string()])
        .map_err(report_error)?;
    wtr.write_record(["sell_signals", &outcome.sell_signals.to_string()])
        .map_err(report_error)?;

    for (key, value) in metrics.to_rows(config) {
        wtr.write_record([key.as_str(), value.as_str()])
            .map_err(report_error)?;
    }
    if let Some(fault) = &outcome.fault {
        wtr.write_record(["fault", fault.as_str()]).map_err(report_error)?;
    }

    wtr.flush().map_err(|e| SigevalError::Report {
        reason: format!("failed to flush {}: {}", path.display(), e),
    })
}

fn report_error(e: csv::Error) -> SigevalError {
    SigevalError::Report {
        reason: e.to_string(),
    }
}

fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::Ledger;
    use crate::domain::position::{ExitReason, Trade, TradeDirection};
    use chrono::{NaiveDate, NaiveDateTime};
    use tempfile::TempDir;

    fn ts(mm: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, mm, 0)
            .unwrap()
    }

    fn outcome(name: &str, trades: Vec<Trade>, fault: Option<String>) -> VariantOutcome {
        let mut ledger = Ledger::new(100_000.0);
        for t in trades {
            ledger.record_trade(t);
        }
        VariantOutcome {
            variant_id: 0,
            name: name.to_string(),
            buy_signals: 1,
            sell_signals: 0,
            ledger,
            fault,
        }
    }

    fn trade() -> Trade {
        Trade {
            variant_id: 0,
            direction: TradeDirection::Long,
            entry_time: ts(0),
            entry_price: 100.0,
            exit_time: ts(30),
            exit_price: 101.5,
            quantity: 2.0,
            gross_pnl: 3.0,
            transaction_cost: 0.4,
            net_pnl: 2.6,
            exit_reason: ExitReason::TakeProfit,
        }
    }

    fn report(variants: Vec<VariantOutcome>) -> BacktestReport {
        BacktestReport {
            variants,
            combined: outcome("combined", vec![], None),
        }
    }

    #[test]
    fn writes_trades_and_metrics_per_variant() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvReportAdapter::new();
        let report = report(vec![outcome("Doji Star", vec![trade()], None)]);

        adapter
            .write(&report, &EngineConfig::default(), dir.path().to_str().unwrap())
            .unwrap();

        let trades = fs::read_to_string(dir.path().join("trades_doji_star.csv")).unwrap();
        assert!(trades.contains("Take Profit"));
        assert!(trades.contains("LONG"));
        assert!(trades.contains("2.6000"));

        let metrics = fs::read_to_string(dir.path().join("metrics_doji_star.csv")).unwrap();
        assert!(metrics.contains("total_trades,1"));
        assert!(metrics.contains("config.policy,exclusive-hold"));

        assert!(dir.path().join("trades_combined.csv").exists());
    }

    #[test]
    fn fault_appears_in_metrics_file() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvReportAdapter::new();
        let report = report(vec![outcome(
            "hammer",
            vec![],
            Some("data error: store unavailable".to_string()),
        )]);

        adapter
            .write(&report, &EngineConfig::default(), dir.path().to_str().unwrap())
            .unwrap();

        let metrics = fs::read_to_string(dir.path().join("metrics_hammer.csv")).unwrap();
        assert!(metrics.contains("fault,"));
        assert!(metrics.contains("store unavailable"));
    }

    #[test]
    fn creates_missing_output_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("out/reports");
        let adapter = CsvReportAdapter::new();

        adapter
            .write(&report(vec![]), &EngineConfig::default(), nested.to_str().unwrap())
            .unwrap();
        assert!(nested.join("metrics_combined.csv").exists());
    }
}
