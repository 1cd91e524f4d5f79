//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::{load_signal_set, CsvBarAdapter};
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{load_backtest_range, load_engine_config};
use crate::domain::engine::run_variants;
use crate::domain::error::SigevalError;
use crate::domain::metrics::Metrics;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "sigeval", about = "Trading-signal backtest engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over every signal variant
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Price-bar CSV; overrides [data] bars_file
        #[arg(long)]
        bars: Option<PathBuf>,
        /// Signal CSV; overrides [data] signals_file
        #[arg(long)]
        signals: Option<PathBuf>,
        /// Report directory; overrides [report] output_dir
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration without touching any data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            bars,
            signals,
            output,
        } => run_backtest(&config, bars.as_ref(), signals.as_ref(), output.as_ref()),
        Command::Validate { config } => run_validate(&config),
    }
}

fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

fn resolve_path(
    override_path: Option<&PathBuf>,
    config: &dyn ConfigPort,
    key: &str,
) -> Result<PathBuf, SigevalError> {
    match override_path {
        Some(p) => Ok(p.clone()),
        None => config
            .get_string("data", key)
            .map(PathBuf::from)
            .ok_or_else(|| SigevalError::ConfigMissing {
                section: "data".to_string(),
                key: key.to_string(),
            }),
    }
}

fn run_backtest(
    config_path: &PathBuf,
    bars_override: Option<&PathBuf>,
    signals_override: Option<&PathBuf>,
    output_override: Option<&PathBuf>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let engine_config = match load_engine_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let (start, end) = match load_backtest_range(&adapter) {
        Ok(range) => range,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let bars_path = match resolve_path(bars_override, &adapter, "bars_file") {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let signals_path = match resolve_path(signals_override, &adapter, "signals_file") {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("Loading bars from {}", bars_path.display());
    let data_port = match CsvBarAdapter::load(&bars_path) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("  {} bars loaded", data_port.len());

    eprintln!("Loading signals from {}", signals_path.display());
    let signal_set = match load_signal_set(&signals_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("  {} variants found", signal_set.variants.len());

    eprintln!(
        "Running backtest ({}): {} to {}",
        engine_config.policy.as_str(),
        start.date(),
        end.date(),
    );
    let report = match run_variants(&data_port, &signal_set, &engine_config, start, end) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\n=== Variant Results ===");
    for outcome in report.variants.iter().chain(std::iter::once(&report.combined)) {
        let metrics = Metrics::compute(&outcome.ledger, &engine_config);
        eprintln!(
            "  {}: {} trades, {:.1}% win rate, net {:+.2}, {} skipped, {} dropped",
            outcome.name,
            metrics.total_trades,
            metrics.win_rate_pct,
            metrics.total_net_pnl,
            metrics.skipped_signals,
            metrics.dropped_signals,
        );
        if let Some(fault) = &outcome.fault {
            eprintln!("    warning: stopped early ({fault})");
        }
    }

    let output_dir = output_override
        .cloned()
        .or_else(|| adapter.get_string("report", "output_dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("reports"));

    let report_port = CsvReportAdapter::new();
    match report_port.write(&report, &engine_config, &output_dir.display().to_string()) {
        Ok(()) => {
            eprintln!("\nReports written to: {}", output_dir.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let engine_config = match load_engine_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let (start, end) = match load_backtest_range(&adapter) {
        Ok(range) => range,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\nEngine configuration:");
    eprintln!("  policy:              {}", engine_config.policy.as_str());
    eprintln!("  initial capital:     {:.2}", engine_config.initial_capital);
    eprintln!("  stop loss:           {:.4}", engine_config.stop_loss_pct);
    eprintln!("  take profit:         {:.4}", engine_config.take_profit_pct);
    eprintln!("  max holding minutes: {}", engine_config.max_holding_minutes);
    eprintln!(
        "  session:             {} to {}",
        engine_config.session_start, engine_config.session_end
    );
    eprintln!("  range:               {} to {}", start.date(), end.date());

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
