//! Position tracking and closed-trade records.

use chrono::{Duration, NaiveDateTime};

/// Direction of an open position or closed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeDirection {
    Long,
    Short,
}

impl TradeDirection {
    pub fn sign(&self) -> f64 {
        match self {
            TradeDirection::Long => 1.0,
            TradeDirection::Short => -1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeDirection::Long => "LONG",
            TradeDirection::Short => "SHORT",
        }
    }
}

/// Why a position closed.
///
/// `Timeout` covers both the forward-scan deadline expiring and the forced
/// close of a still-open position when the data stream ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    Timeout,
    OppositeSignal,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::StopLoss => "Stop Loss",
            ExitReason::TakeProfit => "Take Profit",
            ExitReason::Timeout => "Timeout",
            ExitReason::OppositeSignal => "Opposite Signal",
        }
    }
}

/// An open position. At most one exists per variant at any instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub variant_id: usize,
    pub direction: TradeDirection,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub quantity: f64,
    pub stop_loss_price: f64,
    pub take_profit_price: f64,
    pub deadline_time: NaiveDateTime,
    pub entry_cost: f64,
}

impl Position {
    /// Build entry terms: stop below / target above entry for longs, mirrored
    /// for shorts; a zero percentage disables the level.
    pub fn open(
        variant_id: usize,
        direction: TradeDirection,
        entry_time: NaiveDateTime,
        entry_price: f64,
        quantity: f64,
        stop_loss_pct: f64,
        take_profit_pct: f64,
        max_holding_minutes: i64,
        entry_cost: f64,
    ) -> Self {
        let (stop_loss_price, take_profit_price) = match direction {
            TradeDirection::Long => (
                if stop_loss_pct > 0.0 { entry_price * (1.0 - stop_loss_pct) } else { 0.0 },
                if take_profit_pct > 0.0 { entry_price * (1.0 + take_profit_pct) } else { 0.0 },
            ),
            TradeDirection::Short => (
                if stop_loss_pct > 0.0 { entry_price * (1.0 + stop_loss_pct) } else { 0.0 },
                if take_profit_pct > 0.0 { entry_price * (1.0 - take_profit_pct) } else { 0.0 },
            ),
        };

        Position {
            variant_id,
            direction,
            entry_time,
            entry_price,
            quantity,
            stop_loss_price,
            take_profit_price,
            deadline_time: entry_time + Duration::minutes(max_holding_minutes),
            entry_cost,
        }
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.direction.sign() * (price - self.entry_price) * self.quantity
    }

    pub fn should_stop_loss(&self, price: f64) -> bool {
        if self.stop_loss_price == 0.0 {
            return false;
        }
        match self.direction {
            TradeDirection::Long => price <= self.stop_loss_price,
            TradeDirection::Short => price >= self.stop_loss_price,
        }
    }

    pub fn should_take_profit(&self, price: f64) -> bool {
        if self.take_profit_price == 0.0 {
            return false;
        }
        match self.direction {
            TradeDirection::Long => price >= self.take_profit_price,
            TradeDirection::Short => price <= self.take_profit_price,
        }
    }
}

/// Immutable record of a completed round-trip. Append-only; never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub variant_id: usize,
    pub direction: TradeDirection,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub exit_time: NaiveDateTime,
    pub exit_price: f64,
    pub quantity: f64,
    pub gross_pnl: f64,
    pub transaction_cost: f64,
    pub net_pnl: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn holding_minutes(&self) -> i64 {
        (self.exit_time - self.entry_time).num_minutes()
    }
}
