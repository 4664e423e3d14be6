//! Portfolio performance report.
//!
//! A derived, recomputed-on-demand view over a portfolio's positions: trade
//! statistics, drawdown over realized P&L, annualized Sharpe from per-trade
//! daily returns, and unrealized P&L marked against live quotes.

use serde::Serialize;
use tracing::warn;

use crate::domain::portfolio::Portfolio;
use crate::domain::position::Position;
use crate::ports::quote_port::QuotePort;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Serialize)]
pub struct OpenPositionDetail {
    pub id: u64,
    pub symbol: String,
    pub current_price: f64,
    pub unrealized_pnl: f64,
}

/// Realized P&L aggregated per close month.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReturn {
    /// Month key, `YYYY-MM`.
    pub month: String,
    pub pnl: f64,
    pub trades: usize,
    pub winning_trades: usize,
    /// Percent of trades closed in the month that won.
    pub win_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    pub total_trades: usize,
    pub open_positions: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Percent of closed trades that won; 0 with no closed trades.
    pub win_rate: f64,
    pub total_pnl: f64,
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
    pub current_value: f64,
    /// Total P&L as a percent of initial capital.
    pub total_return: f64,
    pub sharpe_ratio: f64,
    /// Worst peak-to-trough decline of running realized capital, percent.
    pub max_drawdown: f64,
    pub average_win: f64,
    pub average_loss: f64,
    /// Gross wins / gross losses; infinity when there are wins and no
    /// losses, 0 when there are neither.
    pub profit_factor: f64,
    pub monthly_returns: Vec<MonthlyReturn>,
    pub open_position_detail: Vec<OpenPositionDetail>,
}

impl PerformanceReport {
    pub fn compute(portfolio: &Portfolio, quotes: &dyn QuotePort) -> Self {
        // Drawdown and Sharpe both walk closed positions in open order.
        let mut closed: Vec<&Position> = portfolio.closed_positions().collect();
        closed.sort_by_key(|p| p.opened_at);

        let mut winning_trades = 0usize;
        let mut losing_trades = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut realized_pnl = 0.0_f64;

        for position in &closed {
            let pnl = position.realized_pnl.unwrap_or(0.0);
            realized_pnl += pnl;
            if pnl > 0.0 {
                winning_trades += 1;
                total_wins += pnl;
            } else if pnl < 0.0 {
                losing_trades += 1;
                total_losses += pnl.abs();
            }
        }

        let total_trades = closed.len();
        let win_rate = if total_trades > 0 {
            winning_trades as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let average_win = if winning_trades > 0 {
            total_wins / winning_trades as f64
        } else {
            0.0
        };
        let average_loss = if losing_trades > 0 {
            total_losses / losing_trades as f64
        } else {
            0.0
        };

        let max_drawdown = compute_drawdown(portfolio.initial_capital, &closed);
        let sharpe_ratio = compute_sharpe(&closed);
        let monthly_returns = compute_monthly_returns(&closed);

        // One quote per open position; a missing quote degrades that
        // position to a flat mark instead of failing the whole report.
        let mut unrealized_pnl = 0.0_f64;
        let mut open_position_detail = Vec::new();
        for position in portfolio.open_positions() {
            let current_price = match quotes.quote(&position.symbol) {
                Ok(price) => price,
                Err(e) => {
                    warn!(symbol = %position.symbol, error = %e, "quote unavailable, marking at entry");
                    position.entry_price
                }
            };
            let pnl = position.pnl(current_price);
            unrealized_pnl += pnl;
            open_position_detail.push(OpenPositionDetail {
                id: position.id,
                symbol: position.symbol.clone(),
                current_price,
                unrealized_pnl: pnl,
            });
        }

        let total_pnl = realized_pnl + unrealized_pnl;
        let current_value = portfolio.initial_capital + total_pnl;
        let total_return = if portfolio.initial_capital > 0.0 {
            total_pnl / portfolio.initial_capital * 100.0
        } else {
            0.0
        };

        PerformanceReport {
            total_trades,
            open_positions: open_position_detail.len(),
            winning_trades,
            losing_trades,
            win_rate,
            total_pnl,
            realized_pnl,
            unrealized_pnl,
            current_value,
            total_return,
            sharpe_ratio,
            max_drawdown,
            average_win,
            average_loss,
            profit_factor,
            monthly_returns,
            open_position_detail,
        }
    }
}

/// Walk realized P&L in trade order, tracking running capital against its
/// peak. Returns the worst drawdown in percent.
fn compute_drawdown(initial_capital: f64, closed: &[&Position]) -> f64 {
    let mut peak = initial_capital;
    let mut running = initial_capital;
    let mut max_drawdown = 0.0_f64;

    for position in closed {
        running += position.realized_pnl.unwrap_or(0.0);
        if running > peak {
            peak = running;
        }
        if peak > 0.0 {
            let drawdown = (peak - running) / peak * 100.0;
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
            }
        }
    }

    max_drawdown
}

/// Annualized Sharpe over per-trade daily returns:
/// return = realized / notional / holding_days. Zero with fewer than two
/// usable returns or zero variance. Same-instant round trips are skipped.
fn compute_sharpe(closed: &[&Position]) -> f64 {
    let returns: Vec<f64> = closed
        .iter()
        .filter_map(|p| {
            let days = p.holding_days()?;
            if days <= 0.0 || p.notional() == 0.0 {
                return None;
            }
            Some(p.realized_pnl.unwrap_or(0.0) / p.notional() / days)
        })
        .collect();

    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        mean * TRADING_DAYS_PER_YEAR / (stddev * TRADING_DAYS_PER_YEAR.sqrt())
    } else {
        0.0
    }
}

fn compute_monthly_returns(closed: &[&Position]) -> Vec<MonthlyReturn> {
    use std::collections::BTreeMap;

    let mut months: BTreeMap<String, (f64, usize, usize)> = BTreeMap::new();
    for position in closed {
        let Some(closed_at) = position.closed_at else {
            continue;
        };
        let pnl = position.realized_pnl.unwrap_or(0.0);
        let entry = months
            .entry(closed_at.format("%Y-%m").to_string())
            .or_insert((0.0, 0, 0));
        entry.0 += pnl;
        entry.1 += 1;
        if pnl > 0.0 {
            entry.2 += 1;
        }
    }

    months
        .into_iter()
        .map(|(month, (pnl, trades, winning_trades))| MonthlyReturn {
            month,
            pnl,
            trades,
            winning_trades,
            win_rate: if trades > 0 {
                winning_trades as f64 / trades as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect()
}
