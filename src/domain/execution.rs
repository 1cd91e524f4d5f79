//! Order sizing, transaction costs, and open/close accounting.
//!
//! Cash accounting is cost-based: opening deducts only the entry transaction
//! cost, closing credits gross P&L minus the exit cost, so a round trip moves
//! cash by exactly the trade's net P&L in both sizing modes.

use chrono::NaiveDateTime;

use super::config::{EngineConfig, SizingMode};
use super::ledger::Ledger;
use super::position::{ExitReason, Position, Trade, TradeDirection};

/// price × quantity × cost_rate
pub fn transaction_cost(price: f64, quantity: f64, cost_rate: f64) -> f64 {
    price * quantity * cost_rate
}

pub fn compute_quantity(sizing: SizingMode, cash: f64, entry_price: f64) -> f64 {
    match sizing {
        SizingMode::FractionOfCapital(fraction) => cash * fraction / entry_price,
        SizingMode::FixedQuantity(quantity) => quantity,
    }
}

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Opened,
    /// Cash cannot cover the entry transaction cost (or sizing produced a
    /// non-positive quantity); the signal is refused, not retried.
    InsufficientCash,
}

/// Open a position for a signal. Entry cost is deducted from cash immediately;
/// a refused open leaves the ledger untouched.
pub fn open_position(
    ledger: &mut Ledger,
    variant_id: usize,
    direction: TradeDirection,
    entry_time: NaiveDateTime,
    entry_price: f64,
    config: &EngineConfig,
) -> EntryResult {
    debug_assert!(ledger.is_flat());

    let quantity = compute_quantity(config.sizing, ledger.cash, entry_price);
    if quantity <= 0.0 {
        return EntryResult::InsufficientCash;
    }

    let entry_cost = transaction_cost(entry_price, quantity, config.transaction_cost_rate);
    if ledger.cash < entry_cost {
        return EntryResult::InsufficientCash;
    }

    ledger.cash -= entry_cost;
    ledger.open_position = Some(Position::open(
        variant_id,
        direction,
        entry_time,
        entry_price,
        quantity,
        config.stop_loss_pct,
        config.take_profit_pct,
        config.max_holding_minutes,
        entry_cost,
    ));

    EntryResult::Opened
}

/// Close the open position at the given price, realizing a `Trade`.
/// Returns `None` when the ledger is flat.
pub fn close_position(
    ledger: &mut Ledger,
    exit_time: NaiveDateTime,
    exit_price: f64,
    exit_reason: ExitReason,
    cost_rate: f64,
) -> Option<Trade> {
    let position = ledger.open_position.take()?;

    let exit_cost = transaction_cost(exit_price, position.quantity, cost_rate);
    let gross_pnl =
        position.direction.sign() * (exit_price - position.entry_price) * position.quantity;
    let net_pnl = gross_pnl - position.entry_cost - exit_cost;

    ledger.cash += gross_pnl - exit_cost;

    let trade = Trade {
        variant_id: position.variant_id,
        direction: position.direction,
        entry_time: position.entry_time,
        entry_price: position.entry_price,
        exit_time,
        exit_price,
        quantity: position.quantity,
        gross_pnl,
        transaction_cost: position.entry_cost + exit_cost,
        net_pnl,
        exit_reason,
    };

    ledger.record_trade(trade.clone());
    Some(trade)
}
