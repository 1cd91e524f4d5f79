//! Engine configuration loading and validation.
//!
//! Builds an [`EngineConfig`] from the config port, checking every field
//! before any data is touched. Configuration faults are the only fatal error
//! class; everything downstream degrades per signal or per variant.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::ports::config_port::ConfigPort;

use super::config::{ConcurrencyPolicy, EngineConfig, SizingMode};
use super::error::SigevalError;

/// Assemble and validate the full engine configuration. Missing keys fall
/// back to the defaults in [`EngineConfig::default`].
pub fn load_engine_config(config: &dyn ConfigPort) -> Result<EngineConfig, SigevalError> {
    let defaults = EngineConfig::default();
    let engine_config = EngineConfig {
        initial_capital: config.get_double(
            "backtest",
            "initial_capital",
            defaults.initial_capital,
        ),
        sizing: load_sizing(config),
        transaction_cost_rate: config.get_double(
            "strategy",
            "transaction_cost_rate",
            defaults.transaction_cost_rate,
        ),
        stop_loss_pct: config.get_double("strategy", "stop_loss_pct", defaults.stop_loss_pct),
        take_profit_pct: config.get_double(
            "strategy",
            "take_profit_pct",
            defaults.take_profit_pct,
        ),
        max_holding_minutes: config.get_int(
            "strategy",
            "max_holding_minutes",
            defaults.max_holding_minutes,
        ),
        policy: load_policy(config)?,
        signal_timeframe_minutes: config.get_int(
            "strategy",
            "signal_timeframe_minutes",
            defaults.signal_timeframe_minutes,
        ),
        session_start: load_time(config, "session_start", defaults.session_start)?,
        session_end: load_time(config, "session_end", defaults.session_end)?,
        risk_free_rate: config.get_double("backtest", "risk_free_rate", defaults.risk_free_rate),
    };
    engine_config.validate()?;
    Ok(engine_config)
}

/// `fixed_quantity`, when present, wins over the capital-fraction
/// `position_size`.
fn load_sizing(config: &dyn ConfigPort) -> SizingMode {
    let default_fraction = match EngineConfig::default().sizing {
        SizingMode::FractionOfCapital(f) => f,
        SizingMode::FixedQuantity(_) => 0.1,
    };

    let fixed = config.get_double("strategy", "fixed_quantity", 0.0);
    if fixed > 0.0 {
        SizingMode::FixedQuantity(fixed)
    } else {
        SizingMode::FractionOfCapital(config.get_double(
            "strategy",
            "position_size",
            default_fraction,
        ))
    }
}

fn load_policy(config: &dyn ConfigPort) -> Result<ConcurrencyPolicy, SigevalError> {
    match config.get_string("strategy", "position_concurrency_policy") {
        None => Ok(ConcurrencyPolicy::ExclusiveHold),
        Some(s) => ConcurrencyPolicy::parse(s.trim()).ok_or_else(|| SigevalError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "position_concurrency_policy".to_string(),
            reason: format!("unknown policy '{}', expected exclusive-hold or reversal", s.trim()),
        }),
    }
}

fn load_time(
    config: &dyn ConfigPort,
    key: &str,
    default: NaiveTime,
) -> Result<NaiveTime, SigevalError> {
    match config.get_string("session", key) {
        None => Ok(default),
        Some(s) => NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|_| {
            SigevalError::ConfigInvalid {
                section: "session".to_string(),
                key: key.to_string(),
                reason: format!("invalid {} format, expected HH:MM", key),
            }
        }),
    }
}

/// The backtest date range, required and validated as `start < end`. The end
/// date is inclusive: it extends to the final second of that day.
pub fn load_backtest_range(
    config: &dyn ConfigPort,
) -> Result<(NaiveDateTime, NaiveDateTime), SigevalError> {
    let start = parse_date(config.get_string("backtest", "start_date").as_deref(), "start_date")?;
    let end = parse_date(config.get_string("backtest", "end_date").as_deref(), "end_date")?;

    if start >= end {
        return Err(SigevalError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must be before end_date".to_string(),
        });
    }

    let start_time = start.and_hms_opt(0, 0, 0).unwrap_or_default();
    let end_time = end.and_hms_opt(23, 59, 59).unwrap_or_default();
    Ok((start_time, end_time))
}

fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, SigevalError> {
    match value {
        None => Err(SigevalError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
                SigevalError::ConfigInvalid {
                    section: "backtest".to_string(),
                    key: field.to_string(),
                    reason: format!("invalid {} format, expected YYYY-MM-DD", field),
                }
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn defaults_fill_missing_keys() {
        let config = make_config("[backtest]\ninitial_capital = 50000\n");
        let engine = load_engine_config(&config).unwrap();
        assert!((engine.initial_capital - 50_000.0).abs() < f64::EPSILON);
        assert_eq!(engine.sizing, SizingMode::FractionOfCapital(0.1));
        assert_eq!(engine.policy, ConcurrencyPolicy::ExclusiveHold);
        assert_eq!(engine.max_holding_minutes, 60);
    }

    #[test]
    fn fixed_quantity_overrides_position_size() {
        let config = make_config("[strategy]\nposition_size = 0.5\nfixed_quantity = 2\n");
        let engine = load_engine_config(&config).unwrap();
        assert_eq!(engine.sizing, SizingMode::FixedQuantity(2.0));
    }

    #[test]
    fn reversal_policy_parsed() {
        let config = make_config("[strategy]\nposition_concurrency_policy = reversal\n");
        let engine = load_engine_config(&config).unwrap();
        assert_eq!(engine.policy, ConcurrencyPolicy::Reversal);
    }

    #[test]
    fn unknown_policy_fails() {
        let config = make_config("[strategy]\nposition_concurrency_policy = martingale\n");
        let err = load_engine_config(&config).unwrap_err();
        assert!(matches!(
            err,
            SigevalError::ConfigInvalid { key, .. } if key == "position_concurrency_policy"
        ));
    }

    #[test]
    fn session_times_parsed() {
        let config = make_config("[session]\nsession_start = 09:30\nsession_end = 16:00\n");
        let engine = load_engine_config(&config).unwrap();
        assert_eq!(engine.session_start, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(engine.session_end, NaiveTime::from_hms_opt(16, 0, 0).unwrap());
    }

    #[test]
    fn bad_session_time_fails() {
        let config = make_config("[session]\nsession_start = 9h30\n");
        let err = load_engine_config(&config).unwrap_err();
        assert!(matches!(
            err,
            SigevalError::ConfigInvalid { key, .. } if key == "session_start"
        ));
    }

    #[test]
    fn negative_capital_fails_validation() {
        let config = make_config("[backtest]\ninitial_capital = -1\n");
        assert!(load_engine_config(&config).is_err());
    }

    #[test]
    fn range_parsed_and_inclusive() {
        let config =
            make_config("[backtest]\nstart_date = 2024-01-01\nend_date = 2024-06-30\n");
        let (start, end) = load_backtest_range(&config).unwrap();
        assert_eq!(start.date(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(end.date(), NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
        assert_eq!(end.time(), NaiveTime::from_hms_opt(23, 59, 59).unwrap());
    }

    #[test]
    fn missing_end_date_fails() {
        let config = make_config("[backtest]\nstart_date = 2024-01-01\n");
        let err = load_backtest_range(&config).unwrap_err();
        assert!(matches!(err, SigevalError::ConfigMissing { key, .. } if key == "end_date"));
    }

    #[test]
    fn inverted_range_fails() {
        let config =
            make_config("[backtest]\nstart_date = 2024-06-30\nend_date = 2024-01-01\n");
        let err = load_backtest_range(&config).unwrap_err();
        assert!(matches!(err, SigevalError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn bad_date_format_fails() {
        let config =
            make_config("[backtest]\nstart_date = 01/01/2024\nend_date = 2024-06-30\n");
        let err = load_backtest_range(&config).unwrap_err();
        assert!(matches!(err, SigevalError::ConfigInvalid { key, .. } if key == "start_date"));
    }
}
