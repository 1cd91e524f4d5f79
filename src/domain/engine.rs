//! Backtest runners: one ledger per variant, two exit-evaluation modes.
//!
//! Exclusive-hold runs a bounded forward scan per signal: the stop is tested
//! before the target on each bar close, and the deadline closes the trade at
//! the last scanned bar. Reversal runs the aligned bar stream and lets
//! opposing signals drive every exit. Variants never share state; one
//! variant's fault is recorded in its outcome without aborting the rest.

use chrono::{Duration, NaiveDateTime};

use crate::ports::data_port::DataPort;

use super::align::align;
use super::bar::{session_filter, Bar};
use super::config::{ConcurrencyPolicy, EngineConfig};
use super::error::SigevalError;
use super::execution::{close_position, open_position, EntryResult};
use super::ledger::Ledger;
use super::position::{ExitReason, Position, TradeDirection};
use super::signal::{SignalDirection, SignalSet, VariantSeries};

/// Everything one variant produced: its ledger, signal counts, and the fault
/// that stopped it early, if any.
#[derive(Debug, Clone)]
pub struct VariantOutcome {
    pub variant_id: usize,
    pub name: String,
    pub buy_signals: usize,
    pub sell_signals: usize,
    pub ledger: Ledger,
    pub fault: Option<String>,
}

/// Results for every variant plus the combined series.
#[derive(Debug, Clone)]
pub struct BacktestReport {
    pub variants: Vec<VariantOutcome>,
    pub combined: VariantOutcome,
}

/// Run every variant independently, then the combined series, over
/// `[start, end]`. Only configuration faults abort the whole run.
pub fn run_variants(
    data: &dyn DataPort,
    set: &SignalSet,
    config: &EngineConfig,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<BacktestReport, SigevalError> {
    config.validate()?;

    // Reversal mode walks the full bar stream; fetch it once and restrict it
    // to the trading session. Exclusive-hold fetches per-signal windows.
    let bars = match config.policy {
        ConcurrencyPolicy::Reversal => session_filter(
            &data.fetch_bars(start, end)?,
            config.session_start,
            config.session_end,
        ),
        ConcurrencyPolicy::ExclusiveHold => Vec::new(),
    };

    let variants = set
        .variants
        .iter()
        .map(|series| run_variant(data, &bars, series, config))
        .collect();
    let combined = run_variant(data, &bars, &set.combined, config);

    Ok(BacktestReport { variants, combined })
}

fn run_variant(
    data: &dyn DataPort,
    bars: &[Bar],
    series: &VariantSeries,
    config: &EngineConfig,
) -> VariantOutcome {
    match config.policy {
        ConcurrencyPolicy::ExclusiveHold => run_forward_simulation(data, series, config),
        ConcurrencyPolicy::Reversal => run_streaming(bars, series, config),
    }
}

/// Exclusive-hold evaluation. Signals arriving while a position is open are
/// skipped against the nominal signal time; signals whose forward window has
/// no price data are dropped. Entry is at the signal's own close, delayed by
/// the signal timeframe so the aggregate bar has actually completed.
fn run_forward_simulation(
    data: &dyn DataPort,
    series: &VariantSeries,
    config: &EngineConfig,
) -> VariantOutcome {
    let mut ledger = Ledger::new(config.initial_capital);
    let mut buy_signals = 0;
    let mut sell_signals = 0;
    let mut fault = None;
    let mut busy_until: Option<NaiveDateTime> = None;

    for signal in series.active_signals() {
        if let Some(until) = busy_until {
            if signal.timestamp < until {
                ledger.skipped_signals += 1;
                continue;
            }
            busy_until = None;
        }

        let direction = match signal.direction {
            SignalDirection::Buy => {
                buy_signals += 1;
                TradeDirection::Long
            }
            SignalDirection::Sell => {
                sell_signals += 1;
                TradeDirection::Short
            }
            SignalDirection::None => continue,
        };

        let entry_time = signal.timestamp + Duration::minutes(config.signal_timeframe_minutes);
        let window_end = entry_time + Duration::minutes(config.max_holding_minutes);

        let window = match data.fetch_bars(entry_time, window_end) {
            Ok(bars) => bars,
            Err(err) => {
                fault = Some(
                    SigevalError::Variant {
                        variant_id: series.variant_id,
                        name: series.name.clone(),
                        reason: err.to_string(),
                    }
                    .to_string(),
                );
                break;
            }
        };
        if window.is_empty() {
            ledger.dropped_signals += 1;
            continue;
        }

        match open_position(
            &mut ledger,
            series.variant_id,
            direction,
            entry_time,
            signal.close,
            config,
        ) {
            EntryResult::Opened => {}
            EntryResult::InsufficientCash => {
                ledger.skipped_signals += 1;
                continue;
            }
        }

        let Some(position) = ledger.open_position.clone() else {
            continue;
        };
        let (exit_idx, exit_reason) = scan_exit(&position, &window);
        let exit_bar = &window[exit_idx];
        close_position(
            &mut ledger,
            exit_bar.timestamp,
            exit_bar.close,
            exit_reason,
            config.transaction_cost_rate,
        );

        // A timeout occupies the full holding window even when the data runs
        // short; triggered exits free the slot at the breaching bar.
        busy_until = Some(match exit_reason {
            ExitReason::Timeout => position.deadline_time,
            _ => exit_bar.timestamp,
        });
    }

    VariantOutcome {
        variant_id: series.variant_id,
        name: series.name.clone(),
        buy_signals,
        sell_signals,
        ledger,
        fault,
    }
}

/// Forward scan over a signal's window: stop before target on each bar close,
/// deadline exit at the last scanned bar. The exit price is always the
/// breaching bar's close, never the level itself.
fn scan_exit(position: &Position, window: &[Bar]) -> (usize, ExitReason) {
    for (i, bar) in window.iter().enumerate() {
        if position.should_stop_loss(bar.close) {
            return (i, ExitReason::StopLoss);
        }
        if position.should_take_profit(bar.close) {
            return (i, ExitReason::TakeProfit);
        }
    }
    (window.len() - 1, ExitReason::Timeout)
}

/// Reversal evaluation over the aligned bar stream. Every bar is marked to
/// market before its signal is acted on, so the equity curve never anticipates
/// the action taken at that bar. A position still open at the end of the data
/// is force-closed at the final bar.
fn run_streaming(bars: &[Bar], series: &VariantSeries, config: &EngineConfig) -> VariantOutcome {
    let mut ledger = Ledger::new(config.initial_capital);
    let mut buy_signals = 0;
    let mut sell_signals = 0;

    let aligned = align(bars, series);

    for ab in &aligned {
        ledger.mark_to_market(ab.timestamp, ab.close);

        let wanted = match ab.direction {
            SignalDirection::Buy => TradeDirection::Long,
            SignalDirection::Sell => TradeDirection::Short,
            SignalDirection::None => continue,
        };

        match ledger.open_position.as_ref().map(|p| p.direction) {
            Some(held) if held == wanted => {}
            Some(_) => {
                close_position(
                    &mut ledger,
                    ab.timestamp,
                    ab.close,
                    ExitReason::OppositeSignal,
                    config.transaction_cost_rate,
                );
                try_open(
                    &mut ledger,
                    series.variant_id,
                    wanted,
                    ab.timestamp,
                    ab.close,
                    config,
                    &mut buy_signals,
                    &mut sell_signals,
                );
            }
            None => try_open(
                &mut ledger,
                series.variant_id,
                wanted,
                ab.timestamp,
                ab.close,
                config,
                &mut buy_signals,
                &mut sell_signals,
            ),
        }
    }

    if !ledger.is_flat() {
        if let Some(last) = aligned.last() {
            close_position(
                &mut ledger,
                last.timestamp,
                last.close,
                ExitReason::Timeout,
                config.transaction_cost_rate,
            );
        }
    }

    VariantOutcome {
        variant_id: series.variant_id,
        name: series.name.clone(),
        buy_signals,
        sell_signals,
        ledger,
        fault: None,
    }
}

#[allow(clippy::too_many_arguments)]
fn try_open(
    ledger: &mut Ledger,
    variant_id: usize,
    direction: TradeDirection,
    timestamp: NaiveDateTime,
    price: f64,
    config: &EngineConfig,
    buy_signals: &mut usize,
    sell_signals: &mut usize,
) {
    match open_position(ledger, variant_id, direction, timestamp, price, config) {
        EntryResult::Opened => match direction {
            TradeDirection::Long => *buy_signals += 1,
            TradeDirection::Short => *sell_signals += 1,
        },
        EntryResult::InsufficientCash => ledger.skipped_signals += 1,
    }
}
