//! End-to-end tests: CSV candles -> signal -> recommendation -> position ->
//! performance report, wired through the adapters.

use chrono::{TimeZone, Utc};
use std::io::Write;
use tempfile::TempDir;

use tradesignal::adapters::csv_market::{load_positions_file, CsvCandleAdapter, CsvQuoteAdapter};
use tradesignal::adapters::file_config_adapter::FileConfigAdapter;
use tradesignal::domain::batch::{evaluate_symbols, parse_symbols, SkipReason};
use tradesignal::domain::config::EngineConfig;
use tradesignal::domain::performance::PerformanceReport;
use tradesignal::domain::portfolio::Portfolio;
use tradesignal::domain::position::{PositionRequest, Side};
use tradesignal::domain::signal::Action;
use tradesignal::domain::strategy::StrategyKind;
use tradesignal::ports::candle_port::{CandlePort, CandleRequest};
use tradesignal::ports::quote_port::QuotePort;

fn write_candles(dir: &TempDir, symbol: &str, closes: &[f64], volumes: &[f64]) {
    let path = dir.path().join(format!("{symbol}.csv"));
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "date,open,high,low,close,volume").unwrap();
    // One bar per day starting 2024-01-01; close doubles as open/high/low.
    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    for (i, (close, volume)) in closes.iter().zip(volumes).enumerate() {
        let date = start + chrono::Duration::days(i as i64);
        writeln!(
            file,
            "{},{close},{close},{close},{close},{volume}",
            date.format("%Y-%m-%d")
        )
        .unwrap();
    }
}

/// 40 flat bars then a 2%-per-bar breakout with a volume spike on the close.
fn breakout_closes() -> (Vec<f64>, Vec<f64>) {
    let mut closes = vec![100.0; 40];
    let mut last = 100.0;
    for _ in 0..20 {
        last *= 1.02;
        closes.push(last);
    }
    let mut volumes = vec![1000.0; 59];
    volumes.push(1500.0);
    (closes, volumes)
}

fn full_range_request() -> CandleRequest {
    CandleRequest {
        resolution: "D".to_string(),
        from: 0,
        to: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap().timestamp(),
    }
}

#[test]
fn csv_candles_to_actionable_signal() {
    let dir = TempDir::new().unwrap();
    let (closes, volumes) = breakout_closes();
    write_candles(&dir, "UPUP", &closes, &volumes);

    let adapter = CsvCandleAdapter::new(dir.path().to_path_buf());
    let series = adapter
        .fetch_candles("UPUP", &full_range_request())
        .unwrap()
        .into_series()
        .unwrap();

    let signal = StrategyKind::Livermore.evaluate(&series);
    assert_eq!(signal.action, Action::Buy);
    assert!(signal.is_actionable(0.7));
}

#[test]
fn batch_screen_survives_missing_and_short_symbols() {
    let dir = TempDir::new().unwrap();
    let (closes, volumes) = breakout_closes();
    write_candles(&dir, "GOOD", &closes, &volumes);
    write_candles(&dir, "SHORT", &vec![100.0; 10], &vec![1000.0; 10]);
    // MISSING has no file at all.

    let adapter = CsvCandleAdapter::new(dir.path().to_path_buf());
    let symbols = parse_symbols("good,short,missing").unwrap();
    let now = Utc::now();
    let outcome = evaluate_symbols(
        &adapter,
        &symbols,
        StrategyKind::Livermore,
        &full_range_request(),
        &EngineConfig::default(),
        now,
    );

    assert_eq!(outcome.signals.len(), 1);
    assert_eq!(outcome.signals[0].symbol, "GOOD");
    let rec = outcome.signals[0].recommendation.as_ref().unwrap();
    assert_eq!(rec.action, Action::Buy);
    assert!(rec.expires_at > now);

    assert_eq!(outcome.skipped.len(), 2);
    assert!(outcome
        .skipped
        .iter()
        .any(|s| s.symbol == "SHORT" && matches!(s.reason, SkipReason::InsufficientBars { .. })));
    assert!(outcome
        .skipped
        .iter()
        .any(|s| s.symbol == "MISSING" && matches!(s.reason, SkipReason::FetchFailed { .. })));
}

#[test]
fn signal_to_position_to_performance_round_trip() {
    let dir = TempDir::new().unwrap();
    let (closes, volumes) = breakout_closes();
    write_candles(&dir, "UPUP", &closes, &volumes);

    let adapter = CsvCandleAdapter::new(dir.path().to_path_buf());
    let series = adapter
        .fetch_candles("UPUP", &full_range_request())
        .unwrap()
        .into_series()
        .unwrap();
    let signal = StrategyKind::Livermore.evaluate(&series);
    let entry = signal.entry_price.unwrap();
    let target = signal.target_price.unwrap();

    let config = EngineConfig::default();
    let mut portfolio = Portfolio::new(1_000_000.0);
    let opened_at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let id = portfolio
        .open_position(
            PositionRequest {
                symbol: "UPUP".into(),
                side: Side::Long,
                quantity: 10.0,
                entry_price: entry,
                stop_loss: signal.stop_loss,
                take_profit: signal.target_price,
            },
            &config.risk,
            opened_at,
        )
        .unwrap()
        .id;

    let closed_at = Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap();
    let receipt = portfolio
        .close_position(id, target, closed_at, config.commission_rate)
        .unwrap();

    // Commission is 10 bps of the round-trip notional and realized P&L is
    // the gross move minus exactly that.
    let gross = (target - entry) * 10.0;
    let expected_commission = (entry * 10.0 + target * 10.0) * 0.001;
    assert!((receipt.commission - expected_commission).abs() < 1e-9);
    assert!((receipt.realized_pnl - (gross - expected_commission)).abs() < 1e-9);

    struct NoQuotes;
    impl QuotePort for NoQuotes {
        fn quote(&self, symbol: &str) -> Result<f64, tradesignal::domain::error::EngineError> {
            Err(tradesignal::domain::error::EngineError::QuoteUnavailable {
                symbol: symbol.to_string(),
            })
        }
    }

    let report = PerformanceReport::compute(&portfolio, &NoQuotes);
    assert_eq!(report.total_trades, 1);
    assert_eq!(report.winning_trades, 1);
    assert_eq!(report.win_rate, 100.0);
    assert!(report.profit_factor.is_infinite());
    assert!((report.realized_pnl - receipt.realized_pnl).abs() < 1e-9);
    assert_eq!(report.monthly_returns.len(), 1);
    assert_eq!(report.monthly_returns[0].month, "2024-03");
}

#[test]
fn position_snapshot_to_report_via_csv() {
    let dir = TempDir::new().unwrap();

    let positions_path = dir.path().join("positions.csv");
    let mut file = std::fs::File::create(&positions_path).unwrap();
    write!(
        file,
        "symbol,side,quantity,entry_price,opened_at,exit_price,closed_at\n\
         AAPL,long,9,100.0,2024-01-01,110.0,2024-01-11\n\
         MSFT,short,2,400.0,2024-02-01,,\n"
    )
    .unwrap();

    let quotes_path = dir.path().join("quotes.csv");
    let mut file = std::fs::File::create(&quotes_path).unwrap();
    write!(file, "symbol,price\nMSFT,390.0\n").unwrap();

    let config = EngineConfig::default();
    let mut portfolio = Portfolio::new(10_000.0);
    for record in load_positions_file(&positions_path).unwrap() {
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
            )
            .unwrap()
            .id;
        if let Some((exit_price, closed_at)) = record.exit {
            portfolio
                .close_position(id, exit_price, closed_at, config.commission_rate)
                .unwrap();
        }
    }

    let quotes = CsvQuoteAdapter::from_file(&quotes_path).unwrap();
    let report = PerformanceReport::compute(&portfolio, &quotes);

    assert_eq!(report.total_trades, 1);
    assert_eq!(report.open_positions, 1);
    // Short MSFT from 400 to 390 on 2 shares.
    assert!((report.unrealized_pnl - 20.0).abs() < 1e-9);
    // Long AAPL 100 -> 110 on 9 shares, minus 10 bps round-trip commission.
    let expected_realized = 90.0 - (900.0 + 990.0) * 0.001;
    assert!((report.realized_pnl - expected_realized).abs() < 1e-9);
    assert!((report.current_value - (10_000.0 + report.total_pnl)).abs() < 1e-9);
}

#[test]
fn risk_gate_enforced_when_replaying_snapshot() {
    let config = EngineConfig::default();
    let mut portfolio = Portfolio::new(10_000.0);

    // 11% of capital: rejected outright.
    let result = portfolio.open_position(
        PositionRequest {
            symbol: "BIG".into(),
            side: Side::Long,
            quantity: 11.0,
            entry_price: 100.0,
            stop_loss: None,
            take_profit: None,
        },
        &config.risk,
        Utc::now(),
    );
    assert!(result.is_err());
    assert_eq!(portfolio.positions().len(), 0);
}

#[test]
fn config_file_drives_risk_gate() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("engine.ini");
    let mut file = std::fs::File::create(&config_path).unwrap();
    write!(
        file,
        "[risk]\nmax_position_pct = 0.5\nmax_exposure_pct = 1.0\n\n\
         [trading]\ncommission_rate = 0.0\nactionable_confidence = 0.8\n"
    )
    .unwrap();

    let adapter = FileConfigAdapter::from_file(&config_path).unwrap();
    let config = EngineConfig::from_port(&adapter).unwrap();
    assert_eq!(config.risk.max_position_pct, 0.5);
    assert_eq!(config.actionable_confidence, 0.8);

    // A 40% position passes under the widened limit.
    let mut portfolio = Portfolio::new(10_000.0);
    assert!(portfolio
        .open_position(
            PositionRequest {
                symbol: "AAPL".into(),
                side: Side::Long,
                quantity: 40.0,
                entry_price: 100.0,
                stop_loss: None,
                take_profit: None,
            },
            &config.risk,
            Utc::now(),
        )
        .is_ok());
}
