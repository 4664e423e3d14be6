//! CSV-backed market data adapters.
//!
//! File formats:
//! - candles: `date,open,high,low,close,volume` (one file per symbol,
//!   `<SYMBOL>.csv` under the adapter's base directory)
//! - quotes: `symbol,price`
//! - positions: `symbol,side,quantity,entry_price,opened_at[,exit_price,closed_at]`

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::candles::CandleResponse;
use crate::domain::error::EngineError;
use crate::domain::position::Side;
use crate::ports::candle_port::{CandlePort, CandleRequest};
use crate::ports::quote_port::QuotePort;

#[derive(Debug, Deserialize)]
struct CandleRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Serves candle files from a directory, one file per symbol.
pub struct CsvCandleAdapter {
    base_path: PathBuf,
}

impl CsvCandleAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    /// Read a single candle file into the provider wire shape, unfiltered.
    pub fn load_file(path: &Path) -> Result<CandleResponse, EngineError> {
        Self::load_rows(path, None)
    }

    fn load_rows(path: &Path, window: Option<(i64, i64)>) -> Result<CandleResponse, EngineError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| EngineError::MarketData {
            reason: format!("failed to open {}: {}", path.display(), e),
        })?;

        let mut rows: Vec<CandleRow> = Vec::new();
        for record in reader.deserialize() {
            let row: CandleRow = record.map_err(|e| EngineError::MarketData {
                reason: format!("bad candle row in {}: {}", path.display(), e),
            })?;
            if let Some((from, to)) = window {
                let ts = midnight_utc(row.date).timestamp();
                if ts < from || ts > to {
                    continue;
                }
            }
            rows.push(row);
        }
        rows.sort_by_key(|r| r.date);

        if rows.is_empty() {
            return Ok(CandleResponse {
                s: "no_data".into(),
                o: vec![],
                h: vec![],
                l: vec![],
                c: vec![],
                v: vec![],
                t: None,
            });
        }

        Ok(CandleResponse {
            s: "ok".into(),
            o: rows.iter().map(|r| r.open).collect(),
            h: rows.iter().map(|r| r.high).collect(),
            l: rows.iter().map(|r| r.low).collect(),
            c: rows.iter().map(|r| r.close).collect(),
            v: rows.iter().map(|r| r.volume).collect(),
            t: Some(
                rows.iter()
                    .map(|r| midnight_utc(r.date).timestamp())
                    .collect(),
            ),
        })
    }
}

impl CandlePort for CsvCandleAdapter {
    fn fetch_candles(
        &self,
        symbol: &str,
        request: &CandleRequest,
    ) -> Result<CandleResponse, EngineError> {
        Self::load_rows(&self.csv_path(symbol), Some((request.from, request.to)))
    }
}

#[derive(Debug, Deserialize)]
struct QuoteRow {
    symbol: String,
    price: f64,
}

/// Quote table loaded once from a CSV file.
pub struct CsvQuoteAdapter {
    quotes: HashMap<String, f64>,
}

impl CsvQuoteAdapter {
    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| EngineError::MarketData {
            reason: format!("failed to open {}: {}", path.display(), e),
        })?;

        let mut quotes = HashMap::new();
        for record in reader.deserialize() {
            let row: QuoteRow = record.map_err(|e| EngineError::MarketData {
                reason: format!("bad quote row in {}: {}", path.display(), e),
            })?;
            quotes.insert(row.symbol.to_uppercase(), row.price);
        }

        Ok(Self { quotes })
    }
}

impl QuotePort for CsvQuoteAdapter {
    fn quote(&self, symbol: &str) -> Result<f64, EngineError> {
        self.quotes
            .get(&symbol.to_uppercase())
            .copied()
            .ok_or_else(|| EngineError::QuoteUnavailable {
                symbol: symbol.to_string(),
            })
    }
}

#[derive(Debug, Deserialize)]
struct PositionRow {
    symbol: String,
    side: String,
    quantity: f64,
    entry_price: f64,
    opened_at: NaiveDate,
    exit_price: Option<f64>,
    closed_at: Option<NaiveDate>,
}

/// One parsed line of a position snapshot file.
#[derive(Debug, Clone)]
pub struct PositionRecord {
    pub symbol: String,
    pub side: Side,
    pub quantity: f64,
    pub entry_price: f64,
    pub opened_at: DateTime<Utc>,
    /// Present together when the row describes a closed position.
    pub exit: Option<(f64, DateTime<Utc>)>,
}

/// Load a position snapshot. Rows with an exit price but no close date (or
/// the reverse) are rejected.
pub fn load_positions_file(path: &Path) -> Result<Vec<PositionRecord>, EngineError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| EngineError::MarketData {
        reason: format!("failed to open {}: {}", path.display(), e),
    })?;

    let mut records = Vec::new();
    for record in reader.deserialize() {
        let row: PositionRow = record.map_err(|e| EngineError::MarketData {
            reason: format!("bad position row in {}: {}", path.display(), e),
        })?;

        let side: Side = row
            .side
            .parse()
            .map_err(|e: crate::domain::position::UnknownSide| EngineError::MarketData {
                reason: format!("bad position row in {}: {}", path.display(), e),
            })?;

        let exit = match (row.exit_price, row.closed_at) {
            (Some(price), Some(date)) => Some((price, midnight_utc(date))),
            (None, None) => None,
            _ => {
                return Err(EngineError::MarketData {
                    reason: format!(
                        "position row for {} must set exit_price and closed_at together",
                        row.symbol
                    ),
                });
            }
        };

        records.push(PositionRecord {
            symbol: row.symbol.to_uppercase(),
            side,
            quantity: row.quantity,
            entry_price: row.entry_price,
            opened_at: midnight_utc(row.opened_at),
            exit,
        });
    }

    Ok(records)
}
