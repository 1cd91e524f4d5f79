//! Performance metrics, computed on demand from a ledger.
//!
//! Pure and deterministic: the same ledger always yields the same values.
//! Period returns come from whichever curve the run produced: per-bar equity
//! changes in streaming mode, or per-trade net P&L over initial capital in
//! forward-simulation mode. Every division guards its zero case; the only
//! non-finite output is a `+inf` profit factor when there are wins and no
//! losses.

use super::config::{EngineConfig, SizingMode};
use super::ledger::{CurvePoint, Ledger};

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_trades: usize,
    pub profitable_trades: usize,
    pub losing_trades: usize,
    pub breakeven_trades: usize,
    pub win_rate_pct: f64,
    pub total_gross_pnl: f64,
    pub total_net_pnl: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub total_transaction_costs: f64,
    pub avg_trade_pnl: f64,
    pub best_trade_pnl: f64,
    pub worst_trade_pnl: f64,
    pub avg_win_pnl: f64,
    pub avg_loss_pnl: f64,
    pub total_return_pct: f64,
    pub annualized_return_pct: f64,
    pub volatility_pct: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub calmar_ratio: f64,
    pub max_drawdown: f64,
    pub max_drawdown_pct: f64,
    pub profit_factor: f64,
    pub recovery_factor: f64,
    pub trades_per_month: f64,
    pub avg_holding_minutes: f64,
    pub skipped_signals: usize,
    pub dropped_signals: usize,
}

const DAYS_PER_YEAR: f64 = 365.25;
const DAYS_PER_MONTH: f64 = 30.44;
/// Fallback period frequency when the curve spans a single instant.
const DEFAULT_PERIODS_PER_YEAR: f64 = 252.0;

impl Metrics {
    pub fn compute(ledger: &Ledger, config: &EngineConfig) -> Self {
        let trades = &ledger.trades;
        let total_trades = trades.len();

        let wins: Vec<f64> = trades.iter().filter(|t| t.net_pnl > 0.0).map(|t| t.net_pnl).collect();
        let losses: Vec<f64> = trades.iter().filter(|t| t.net_pnl < 0.0).map(|t| t.net_pnl).collect();

        let total_gross_pnl: f64 = trades.iter().map(|t| t.gross_pnl).sum();
        let total_net_pnl: f64 = trades.iter().map(|t| t.net_pnl).sum();
        let total_transaction_costs: f64 = trades.iter().map(|t| t.transaction_cost).sum();

        let win_rate_pct = ratio(wins.len() as f64, total_trades as f64) * 100.0;
        let avg_trade_pnl = ratio(total_net_pnl, total_trades as f64);
        let best_trade_pnl = trades.iter().map(|t| t.net_pnl).fold(f64::NEG_INFINITY, f64::max);
        let worst_trade_pnl = trades.iter().map(|t| t.net_pnl).fold(f64::INFINITY, f64::min);
        let best_trade_pnl = if total_trades == 0 { 0.0 } else { best_trade_pnl };
        let worst_trade_pnl = if total_trades == 0 { 0.0 } else { worst_trade_pnl };
        let avg_win_pnl = ratio(wins.iter().sum(), wins.len() as f64);
        let avg_loss_pnl = ratio(losses.iter().sum(), losses.len() as f64);

        // Period returns and the curve drawdown is measured against.
        let streaming = !ledger.equity_curve.is_empty();
        let (curve, returns): (Vec<CurvePoint>, Vec<f64>) = if streaming {
            let returns = ledger
                .equity_curve
                .windows(2)
                .map(|w| {
                    if w[0].value.abs() > f64::EPSILON {
                        (w[1].value - w[0].value) / w[0].value
                    } else {
                        0.0
                    }
                })
                .collect();
            (ledger.equity_curve.clone(), returns)
        } else {
            let returns = trades.iter().map(|t| t.net_pnl / ledger.initial_capital).collect();
            (ledger.cumulative_pnl_curve(), returns)
        };

        let span_years = curve_span_years(&curve);
        let periods_per_year = if span_years > 0.0 {
            returns.len() as f64 / span_years
        } else {
            DEFAULT_PERIODS_PER_YEAR
        };

        let return_std = population_std(&returns);
        let volatility_pct = return_std * periods_per_year.sqrt() * 100.0;

        let (sharpe_ratio, sortino_ratio) = if returns.len() > 1 && return_std > 0.0 {
            let mean = returns.iter().sum::<f64>() / returns.len() as f64;
            let risk_free_per_period = config.risk_free_rate / periods_per_year;
            let excess = mean - risk_free_per_period;

            let negatives: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
            let downside_std = population_std(&negatives);
            let sortino = if downside_std > 0.0 { excess / downside_std } else { 0.0 };

            (excess / return_std, sortino)
        } else {
            (0.0, 0.0)
        };

        let max_drawdown = max_drawdown(&curve);
        let max_drawdown_pct = ratio(max_drawdown, ledger.initial_capital) * 100.0;

        let breakeven_trades = total_trades - wins.len() - losses.len();
        let gross_profit: f64 = wins.iter().sum();
        let gross_loss: f64 = losses.iter().sum::<f64>().abs();
        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else if gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let recovery_factor = if max_drawdown != 0.0 {
            (total_net_pnl / max_drawdown).abs()
        } else {
            0.0
        };

        let total_return_pct = ratio(total_net_pnl, ledger.initial_capital) * 100.0;
        let annualized_return_pct = ratio(total_return_pct, span_years);
        let calmar_ratio = if max_drawdown_pct < 0.0 {
            annualized_return_pct / max_drawdown_pct.abs()
        } else {
            0.0
        };

        let trades_per_month = trade_span_days(ledger)
            .map(|days| total_trades as f64 / days * DAYS_PER_MONTH)
            .unwrap_or(0.0);

        let avg_holding_minutes = ratio(
            trades.iter().map(|t| t.holding_minutes() as f64).sum(),
            total_trades as f64,
        );

        Metrics {
            total_trades,
            profitable_trades: wins.len(),
            losing_trades: losses.len(),
            breakeven_trades,
            win_rate_pct,
            total_gross_pnl,
            total_net_pnl,
            gross_profit,
            gross_loss,
            total_transaction_costs,
            avg_trade_pnl,
            best_trade_pnl,
            worst_trade_pnl,
            avg_win_pnl,
            avg_loss_pnl,
            total_return_pct,
            annualized_return_pct,
            volatility_pct,
            sharpe_ratio,
            sortino_ratio,
            calmar_ratio,
            max_drawdown,
            max_drawdown_pct,
            profit_factor,
            recovery_factor,
            trades_per_month,
            avg_holding_minutes,
            skipped_signals: ledger.skipped_signals,
            dropped_signals: ledger.dropped_signals,
        }
    }

    /// Flat key→value rows for the report writer, followed by the
    /// configuration echo.
    pub fn to_rows(&self, config: &EngineConfig) -> Vec<(String, String)> {
        let mut rows = vec![
            row("total_trades", self.total_trades.to_string()),
            row("profitable_trades", self.profitable_trades.to_string()),
            row("losing_trades", self.losing_trades.to_string()),
            row("breakeven_trades", self.breakeven_trades.to_string()),
            row("win_rate_pct", fmt(self.win_rate_pct)),
            row("total_gross_pnl", fmt(self.total_gross_pnl)),
            row("total_net_pnl", fmt(self.total_net_pnl)),
            row("gross_profit", fmt(self.gross_profit)),
            row("gross_loss", fmt(self.gross_loss)),
            row("total_transaction_costs", fmt(self.total_transaction_costs)),
            row("avg_trade_pnl", fmt(self.avg_trade_pnl)),
            row("best_trade_pnl", fmt(self.best_trade_pnl)),
            row("worst_trade_pnl", fmt(self.worst_trade_pnl)),
            row("avg_win_pnl", fmt(self.avg_win_pnl)),
            row("avg_loss_pnl", fmt(self.avg_loss_pnl)),
            row("total_return_pct", fmt(self.total_return_pct)),
            row("annualized_return_pct", fmt(self.annualized_return_pct)),
            row("volatility_pct", fmt(self.volatility_pct)),
            row("sharpe_ratio", fmt(self.sharpe_ratio)),
            row("sortino_ratio", fmt(self.sortino_ratio)),
            row("calmar_ratio", fmt(self.calmar_ratio)),
            row("max_drawdown", fmt(self.max_drawdown)),
            row("max_drawdown_pct", fmt(self.max_drawdown_pct)),
            row("profit_factor", fmt(self.profit_factor)),
            row("recovery_factor", fmt(self.recovery_factor)),
            row("trades_per_month", fmt(self.trades_per_month)),
            row("avg_holding_minutes", fmt(self.avg_holding_minutes)),
            row("skipped_signals", self.skipped_signals.to_string()),
            row("dropped_signals", self.dropped_signals.to_string()),
        ];

        let sizing = match config.sizing {
            SizingMode::FractionOfCapital(f) => format!("fraction:{f}"),
            SizingMode::FixedQuantity(q) => format!("fixed:{q}"),
        };
        rows.extend([
            row("config.initial_capital", fmt(config.initial_capital)),
            row("config.position_sizing", sizing),
            row("config.transaction_cost_rate", fmt(config.transaction_cost_rate)),
            row("config.stop_loss_pct", fmt(config.stop_loss_pct)),
            row("config.take_profit_pct", fmt(config.take_profit_pct)),
            row("config.max_holding_minutes", config.max_holding_minutes.to_string()),
            row("config.policy", config.policy.as_str().to_string()),
        ]);
        rows
    }
}

fn row(key: &str, value: String) -> (String, String) {
    (key.to_string(), value)
}

fn fmt(value: f64) -> String {
    if value.is_infinite() {
        if value > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else {
        format!("{value:.4}")
    }
}

/// numerator / denominator, or 0 when the denominator is 0.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator != 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

fn population_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn curve_span_years(curve: &[CurvePoint]) -> f64 {
    match (curve.first(), curve.last()) {
        (Some(first), Some(last)) if last.timestamp > first.timestamp => {
            (last.timestamp - first.timestamp).num_seconds() as f64
                / (DAYS_PER_YEAR * 86_400.0)
        }
        _ => 0.0,
    }
}

fn trade_span_days(ledger: &Ledger) -> Option<f64> {
    let first = ledger.trades.iter().map(|t| t.entry_time).min()?;
    let last = ledger.trades.iter().map(|t| t.entry_time).max()?;
    let days = (last - first).num_days() as f64;
    (days > 0.0).then_some(days)
}

/// Minimum of (curve − running maximum); 0 for a curve that never declines.
fn max_drawdown(curve: &[CurvePoint]) -> f64 {
    let mut running_max = f64::NEG_INFINITY;
    let mut worst = 0.0f64;
    for point in curve {
        running_max = running_max.max(point.value);
        worst = worst.min(point.value - running_max);
    }
    worst
}
