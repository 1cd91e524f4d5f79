//! Report output port trait.

use crate::domain::config::EngineConfig;
use crate::domain::engine::BacktestReport;
use crate::domain::error::SigevalError;

/// Port for persisting backtest results: per-trade records and the flat
/// metrics table, one pair of outputs per variant plus the combined series.
pub trait ReportPort {
    fn write(
        &self,
        report: &BacktestReport,
        config: &EngineConfig,
        output_dir: &str,
    ) -> Result<(), SigevalError>;
}
