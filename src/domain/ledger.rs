//! Per-variant trade ledger.
//!
//! Owns cash, the (at most one) open position, the append-only trade history,
//! and whichever performance curve the active mode records: a per-bar
//! mark-to-market equity curve in streaming mode, or a trade-indexed cumulative
//! P&L curve derived on demand in forward-simulation mode.

use chrono::NaiveDateTime;

use super::position::{Position, Trade};

#[derive(Debug, Clone, PartialEq)]
pub struct CurvePoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

#[derive(Debug, Clone)]
pub struct Ledger {
    pub initial_capital: f64,
    pub cash: f64,
    pub open_position: Option<Position>,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<CurvePoint>,
    /// Signals ignored because a position was open or cash could not cover the
    /// entry cost.
    pub skipped_signals: usize,
    /// Signals discarded because no price data covered the forward window.
    pub dropped_signals: usize,
}

impl Ledger {
    pub fn new(initial_capital: f64) -> Self {
        Ledger {
            initial_capital,
            cash: initial_capital,
            open_position: None,
            trades: Vec::new(),
            equity_curve: Vec::new(),
            skipped_signals: 0,
            dropped_signals: 0,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.open_position.is_none()
    }

    pub fn record_trade(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    /// Mark-to-market portfolio value at a bar: cash plus the open position's
    /// unrealized P&L at the given price.
    pub fn mark_to_market(&mut self, timestamp: NaiveDateTime, price: f64) {
        let unrealized = self
            .open_position
            .as_ref()
            .map(|p| p.unrealized_pnl(price))
            .unwrap_or(0.0);
        self.equity_curve.push(CurvePoint {
            timestamp,
            value: self.cash + unrealized,
        });
    }

    /// Running sum of net P&L over trades ordered by entry time; one point per
    /// closed trade, no intermediate marks.
    pub fn cumulative_pnl_curve(&self) -> Vec<CurvePoint> {
        let mut ordered: Vec<&Trade> = self.trades.iter().collect();
        ordered.sort_by_key(|t| t.entry_time);

        let mut running = 0.0;
        ordered
            .into_iter()
            .map(|t| {
                running += t.net_pnl;
                CurvePoint {
                    timestamp: t.entry_time,
                    value: running,
                }
            })
            .collect()
    }

    pub fn total_net_pnl(&self) -> f64 {
        self.trades.iter().map(|t| t.net_pnl).sum()
    }
}
