//! CLI definition and dispatch.

use chrono::{NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_market::{
    load_positions_file, CsvCandleAdapter, CsvQuoteAdapter, PositionRecord,
};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::batch::{evaluate_symbols, parse_symbols};
use crate::domain::candles::CandleSeries;
use crate::domain::config::EngineConfig;
use crate::domain::error::EngineError;
use crate::domain::indicator::IndicatorKind;
use crate::domain::performance::PerformanceReport;
use crate::domain::portfolio::Portfolio;
use crate::domain::position::PositionRequest;
use crate::domain::signal::{Recommendation, Signal};
use crate::domain::strategy::StrategyKind;
use crate::ports::candle_port::CandleRequest;

#[derive(Parser, Debug)]
#[command(name = "tradesignal", about = "Technical trading signals and portfolio P&L")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate one strategy against a candle CSV file
    Signal {
        #[arg(short, long)]
        strategy: String,
        #[arg(long)]
        candles: PathBuf,
        /// Symbol label; defaults to the candle file stem
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Evaluate one strategy across many symbols from a candle directory
    Screen {
        #[arg(short, long)]
        strategy: String,
        /// Comma-separated symbol list
        #[arg(long)]
        symbols: String,
        /// Directory holding <SYMBOL>.csv candle files
        #[arg(long)]
        data_dir: PathBuf,
        /// Only use bars on or after this date
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Only use bars on or before this date
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Compute a technical indicator over a candle CSV file
    Indicator {
        /// sma, ema, rsi, williams, macd or bollinger
        #[arg(short, long)]
        name: String,
        #[arg(short, long, default_value_t = 20)]
        period: usize,
        #[arg(long)]
        candles: PathBuf,
    },
    /// Portfolio performance report from a position snapshot
    Performance {
        #[arg(long)]
        positions: PathBuf,
        /// CSV quote table for marking open positions
        #[arg(long)]
        quotes: PathBuf,
        #[arg(long)]
        initial_capital: f64,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Equal-weight rebalancing plan for open positions
    Rebalance {
        #[arg(long)]
        positions: PathBuf,
        #[arg(long)]
        initial_capital: f64,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate an engine configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Signal {
            strategy,
            candles,
            symbol,
            config,
        } => run_signal(&strategy, &candles, symbol.as_deref(), config.as_deref()),
        Command::Screen {
            strategy,
            symbols,
            data_dir,
            from,
            to,
            config,
        } => run_screen(
            &strategy,
            &symbols,
            data_dir,
            from,
            to,
            config.as_deref(),
        ),
        Command::Indicator {
            name,
            period,
            candles,
        } => run_indicator(&name, period, &candles),
        Command::Performance {
            positions,
            quotes,
            initial_capital,
            config,
        } => run_performance(&positions, &quotes, initial_capital, config.as_deref()),
        Command::Rebalance {
            positions,
            initial_capital,
            config,
        } => run_rebalance(&positions, initial_capital, config.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(err: &EngineError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

fn load_engine_config(path: Option<&std::path::Path>) -> Result<EngineConfig, EngineError> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let adapter = FileConfigAdapter::from_file(path).map_err(|e| EngineError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;
    EngineConfig::from_port(&adapter)
}

fn parse_strategy(name: &str) -> Result<StrategyKind, EngineError> {
    name.parse::<StrategyKind>()
        .map_err(|e| EngineError::MarketData {
            reason: e.to_string(),
        })
}

fn load_series(path: &std::path::Path) -> Result<Option<CandleSeries>, EngineError> {
    Ok(CsvCandleAdapter::load_file(path)?.into_series())
}

fn print_json(value: &impl serde::Serialize) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize output: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_signal(
    strategy_name: &str,
    candles: &std::path::Path,
    symbol: Option<&str>,
    config_path: Option<&std::path::Path>,
) -> ExitCode {
    let config = match load_engine_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let strategy = match parse_strategy(strategy_name) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let symbol = symbol
        .map(str::to_uppercase)
        .or_else(|| {
            candles
                .file_stem()
                .map(|s| s.to_string_lossy().to_uppercase())
        })
        .unwrap_or_else(|| "UNKNOWN".to_string());

    let signal = match load_series(candles) {
        Ok(Some(series)) => strategy.evaluate(&series),
        Ok(None) => Signal::insufficient_data("Insufficient data"),
        Err(e) => return fail(&e),
    };
    let recommendation = Recommendation::from_signal(
        &symbol,
        strategy,
        &signal,
        config.actionable_confidence,
        Utc::now(),
    );

    print_json(&serde_json::json!({
        "symbol": symbol,
        "strategy": strategy,
        "signal": signal,
        "recommendation": recommendation,
    }))
}

fn run_screen(
    strategy_name: &str,
    symbol_list: &str,
    data_dir: PathBuf,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    config_path: Option<&std::path::Path>,
) -> ExitCode {
    let config = match load_engine_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let strategy = match parse_strategy(strategy_name) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let symbols = match parse_symbols(symbol_list) {
        Ok(s) => s,
        Err(e) => {
            return fail(&EngineError::MarketData {
                reason: e.to_string(),
            });
        }
    };

    let now = Utc::now();
    let request = CandleRequest {
        resolution: "D".to_string(),
        from: from
            .map(|d| d.and_time(NaiveTime::MIN).and_utc().timestamp())
            .unwrap_or(0),
        to: to
            .map(|d| d.and_time(NaiveTime::MIN).and_utc().timestamp())
            .unwrap_or_else(|| now.timestamp()),
    };

    let adapter = CsvCandleAdapter::new(data_dir);
    let outcome = evaluate_symbols(&adapter, &symbols, strategy, &request, &config, now);
    print_json(&outcome)
}

fn run_indicator(name: &str, period: usize, candles: &std::path::Path) -> ExitCode {
    let Some(kind) = IndicatorKind::from_name(name, period) else {
        eprintln!("error: unknown indicator: {name}");
        return ExitCode::FAILURE;
    };

    let series = match load_series(candles) {
        Ok(Some(series)) => series,
        Ok(None) => {
            return fail(&EngineError::InsufficientData {
                symbol: candles.display().to_string(),
                bars: 0,
                minimum: period,
            });
        }
        Err(e) => return fail(&e),
    };

    print_json(&serde_json::json!({
        "indicator": kind.to_string(),
        "values": kind.compute(&series),
    }))
}

/// Replay a position snapshot into a portfolio, applying the risk gate on
/// entry and the configured commission on exit.
fn build_portfolio(
    records: Vec<PositionRecord>,
    initial_capital: f64,
    config: &EngineConfig,
) -> Result<Portfolio, EngineError> {
    let mut portfolio = Portfolio::new(initial_capital);
    for record in records {
        let id = portfolio
            .open_position(
                PositionRequest {
                    symbol: record.symbol,
                    side: record.side,
                    quantity: record.quantity,
                    entry_price: record.entry_price,
                    stop_loss: None,
                    take_profit: None,
                },
                &config.risk,
                record.opened_at,
            )?
            .id;
        if let Some((exit_price, closed_at)) = record.exit {
            portfolio.close_position(id, exit_price, closed_at, config.commission_rate)?;
        }
    }
    Ok(portfolio)
}

fn run_performance(
    positions: &std::path::Path,
    quotes: &std::path::Path,
    initial_capital: f64,
    config_path: Option<&std::path::Path>,
) -> ExitCode {
    let config = match load_engine_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    let portfolio = match load_positions_file(positions)
        .and_then(|records| build_portfolio(records, initial_capital, &config))
    {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    let quote_adapter = match CsvQuoteAdapter::from_file(quotes) {
        Ok(q) => q,
        Err(e) => return fail(&e),
    };

    let report = PerformanceReport::compute(&portfolio, &quote_adapter);
    print_json(&report)
}

fn run_rebalance(
    positions: &std::path::Path,
    initial_capital: f64,
    config_path: Option<&std::path::Path>,
) -> ExitCode {
    let config = match load_engine_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    let portfolio = match load_positions_file(positions)
        .and_then(|records| build_portfolio(records, initial_capital, &config))
    {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    print_json(&serde_json::json!({
        "rebalancing_recommendations": portfolio.rebalance_plan(),
    }))
}

fn run_validate(config_path: &std::path::Path) -> ExitCode {
    match load_engine_config(Some(config_path)) {
        Ok(config) => {
            println!("config OK");
            println!("  risk.max_position_pct = {}", config.risk.max_position_pct);
            println!("  risk.max_exposure_pct = {}", config.risk.max_exposure_pct);
            println!("  trading.commission_rate = {}", config.commission_rate);
            println!(
                "  trading.actionable_confidence = {}",
                config.actionable_confidence
            );
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
