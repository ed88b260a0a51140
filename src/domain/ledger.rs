//! Paper-trading ledger: single-position state machine, settlement and bookkeeping.
//!
//! Transitions per `execute(action, price)`:
//! - open position + (CLOSE or any action other than the held side) → settle, go Flat
//! - Flat + LONG/SHORT → open at `price`
//! - anything else → no change
//!
//! Settling never re-opens in the same call: an opposite-side signal only
//! closes, and the flip needs a later call.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::decision::Action;
use super::position::{pnl_percent, Position, Side, TradeRecord, TradeResult};

/// Settlements losing more than this percentage ask the oracle for a lesson.
pub const REFLECTION_THRESHOLD_PCT: f64 = -0.5;
pub const WIN_REWARD: i64 = 1;
pub const LOSS_PENALTY: i64 = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEvent {
    Opened { side: Side, price: f64 },
    Settled(TradeRecord),
    Unchanged,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome {
    pub message: String,
    pub needs_reflection: bool,
    pub event: LedgerEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionLedger {
    pub balance: f64,
    pub position: Position,
    pub strategy_score: i64,
    pub trade_history: Vec<TradeRecord>,
}

impl PositionLedger {
    pub fn new(initial_balance: f64, initial_score: i64) -> Self {
        PositionLedger {
            balance: initial_balance,
            position: Position::Flat,
            strategy_score: initial_score,
            trade_history: Vec::new(),
        }
    }

    pub fn execute(&mut self, action: Action, price: f64, reason: &str) -> ExecutionOutcome {
        self.execute_at(action, price, reason, Utc::now())
    }

    pub fn execute_at(
        &mut self,
        action: Action,
        price: f64,
        reason: &str,
        now: DateTime<Utc>,
    ) -> ExecutionOutcome {
        debug!(%action, price, reason, "executing decision");

        if let Position::Open {
            side, entry_price, ..
        } = self.position
        {
            if action == Action::Close || !action_matches(action, side) {
                return self.settle(side, entry_price, price);
            }
        }

        let open_side = match action {
            Action::Long => Some(Side::Long),
            Action::Short => Some(Side::Short),
            Action::Close | Action::Hold => None,
        };

        match (self.position, open_side) {
            (Position::Flat, Some(side)) => {
                self.position = Position::Open {
                    side,
                    entry_price: price,
                    entry_time: now,
                };
                info!(%side, price, "opened position");
                ExecutionOutcome {
                    message: format!("Opened {side} @ {price}"),
                    needs_reflection: false,
                    event: LedgerEvent::Opened { side, price },
                }
            }
            _ => ExecutionOutcome {
                message: "Holding position".to_string(),
                needs_reflection: false,
                event: LedgerEvent::Unchanged,
            },
        }
    }

    fn settle(&mut self, side: Side, entry_price: f64, price: f64) -> ExecutionOutcome {
        let pnl = pnl_percent(side, entry_price, price);
        self.balance *= 1.0 + pnl / 100.0;

        let result = if pnl > 0.0 {
            self.strategy_score += WIN_REWARD;
            TradeResult::Win
        } else {
            self.strategy_score -= LOSS_PENALTY;
            TradeResult::Loss
        };

        let record = TradeRecord {
            side,
            entry_price,
            exit_price: price,
            pnl_percent: pnl,
            result,
        };
        self.trade_history.push(record.clone());
        self.position = Position::Flat;

        info!(
            %side,
            entry_price,
            exit_price = price,
            pnl_pct = pnl,
            balance = self.balance,
            score = self.strategy_score,
            "settled position"
        );

        ExecutionOutcome {
            message: format!("Position closed! PnL: {pnl:.2}% ({result})"),
            needs_reflection: pnl < REFLECTION_THRESHOLD_PCT,
            event: LedgerEvent::Settled(record),
        }
    }

    /// Unrealized return of the open position at `price`, zero when flat.
    pub fn floating_pnl(&self, price: f64) -> f64 {
        self.position.floating_pnl(price)
    }

    pub fn win_count(&self) -> usize {
        self.trade_history
            .iter()
            .filter(|t| t.result == TradeResult::Win)
            .count()
    }

    pub fn loss_count(&self) -> usize {
        self.trade_history.len() - self.win_count()
    }

    /// Fraction of settled trades that won, `None` before the first settlement.
    pub fn win_rate(&self) -> Option<f64> {
        if self.trade_history.is_empty() {
            None
        } else {
            Some(self.win_count() as f64 / self.trade_history.len() as f64)
        }
    }
}

fn action_matches(action: Action, side: Side) -> bool {
    matches!(
        (action, side),
        (Action::Long, Side::Long) | (Action::Short, Side::Short)
    )
}
