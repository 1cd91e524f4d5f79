//! Engine configuration.
//!
//! The source system read these as module-level constants; here they form one
//! explicit value object handed to the engine at construction, validated up
//! front so a bad configuration aborts before any data is touched.

use chrono::NaiveTime;

use super::error::SigevalError;

/// How the entry quantity is computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizingMode {
    /// quantity = cash × fraction / entry_price
    FractionOfCapital(f64),
    /// Constant quantity per trade, independent of the capital base.
    FixedQuantity(f64),
}

/// Whether an open position blocks or reverses on a new signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrencyPolicy {
    /// One trade at a time; new signals are skipped until the position closes.
    /// Exits come from a bounded forward scan (stop / target / timeout).
    ExclusiveHold,
    /// An opposing signal closes the position and reopens the other way in the
    /// same step; exits are driven purely by the signal stream.
    Reversal,
}

impl ConcurrencyPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "exclusive-hold" => Some(ConcurrencyPolicy::ExclusiveHold),
            "reversal" => Some(ConcurrencyPolicy::Reversal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConcurrencyPolicy::ExclusiveHold => "exclusive-hold",
            ConcurrencyPolicy::Reversal => "reversal",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub initial_capital: f64,
    pub sizing: SizingMode,
    pub transaction_cost_rate: f64,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    pub max_holding_minutes: i64,
    pub policy: ConcurrencyPolicy,
    /// Source signal timeframe in minutes: a signal observed on a K-minute
    /// aggregate is actionable only after that aggregate bar closes, so entry
    /// evaluation starts K minutes after the nominal signal time.
    pub signal_timeframe_minutes: i64,
    pub session_start: NaiveTime,
    pub session_end: NaiveTime,
    /// Annual risk-free rate, pro-rated to the observed trade/bar frequency
    /// when computing Sharpe and Sortino.
    pub risk_free_rate: f64,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), SigevalError> {
        let invalid = |key: &str, reason: &str| SigevalError::ConfigInvalid {
            section: "engine".to_string(),
            key: key.to_string(),
            reason: reason.to_string(),
        };

        if self.initial_capital <= 0.0 {
            return Err(invalid("initial_capital", "must be positive"));
        }
        match self.sizing {
            SizingMode::FractionOfCapital(f) if !(f > 0.0 && f <= 1.0) => {
                return Err(invalid("position_size", "fraction must be in (0, 1]"));
            }
            SizingMode::FixedQuantity(q) if q <= 0.0 => {
                return Err(invalid("fixed_quantity", "must be positive"));
            }
            _ => {}
        }
        if self.transaction_cost_rate < 0.0 {
            return Err(invalid("transaction_cost_rate", "must be non-negative"));
        }
        if self.stop_loss_pct < 0.0 {
            return Err(invalid("stop_loss_pct", "must be non-negative"));
        }
        if self.take_profit_pct < 0.0 {
            return Err(invalid("take_profit_pct", "must be non-negative"));
        }
        if self.max_holding_minutes <= 0 {
            return Err(invalid("max_holding_minutes", "must be positive"));
        }
        if self.signal_timeframe_minutes < 0 {
            return Err(invalid("signal_timeframe_minutes", "must be non-negative"));
        }
        if self.session_start >= self.session_end {
            return Err(invalid("trading_session", "session start must precede end"));
        }
        if self.risk_free_rate < 0.0 || self.risk_free_rate >= 1.0 {
            return Err(invalid("risk_free_rate", "must be between 0 and 1"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            initial_capital: 100_000.0,
            sizing: SizingMode::FractionOfCapital(0.1),
            transaction_cost_rate: 0.001,
            stop_loss_pct: 0.01,
            take_profit_pct: 0.015,
            max_holding_minutes: 60,
            policy: ConcurrencyPolicy::ExclusiveHold,
            signal_timeframe_minutes: 5,
            session_start: NaiveTime::from_hms_opt(9, 20, 0).unwrap(),
            session_end: NaiveTime::from_hms_opt(15, 25, 0).unwrap(),
            risk_free_rate: 0.06,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn negative_capital_rejected() {
        let config = EngineConfig {
            initial_capital: -1.0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SigevalError::ConfigInvalid { key, .. }) if key == "initial_capital"
        ));
    }

    #[test]
    fn negative_cost_rate_rejected() {
        let config = EngineConfig {
            transaction_cost_rate: -0.001,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn fraction_outside_unit_interval_rejected() {
        let config = EngineConfig {
            sizing: SizingMode::FractionOfCapital(1.5),
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_fixed_quantity_rejected() {
        let config = EngineConfig {
            sizing: SizingMode::FixedQuantity(0.0),
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_session_rejected() {
        let config = EngineConfig {
            session_start: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn policy_parse_roundtrip() {
        for policy in [ConcurrencyPolicy::ExclusiveHold, ConcurrencyPolicy::Reversal] {
            assert_eq!(ConcurrencyPolicy::parse(policy.as_str()), Some(policy));
        }
        assert_eq!(ConcurrencyPolicy::parse("martingale"), None);
    }

    #[test]
    fn zero_cost_and_disabled_levels_are_valid() {
        let config = EngineConfig {
            transaction_cost_rate: 0.0,
            stop_loss_pct: 0.0,
            take_profit_pct: 0.0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
