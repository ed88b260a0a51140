//! Single-slot position state and settled trade records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Long,
    Short,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
            Side::Short => write!(f, "SHORT"),
        }
    }
}

/// Percent return of a move from `entry_price` to `price` for the given side.
pub fn pnl_percent(side: Side, entry_price: f64, price: f64) -> f64 {
    match side {
        Side::Long => (price - entry_price) / entry_price * 100.0,
        Side::Short => (entry_price - price) / entry_price * 100.0,
    }
}

/// The ledger holds at most one position; an entry price exists only while open.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum Position {
    #[default]
    Flat,
    Open {
        side: Side,
        entry_price: f64,
        entry_time: DateTime<Utc>,
    },
}

impl Position {
    pub fn side(&self) -> Option<Side> {
        match self {
            Position::Flat => None,
            Position::Open { side, .. } => Some(*side),
        }
    }

    pub fn entry_price(&self) -> Option<f64> {
        match self {
            Position::Flat => None,
            Position::Open { entry_price, .. } => Some(*entry_price),
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, Position::Flat)
    }

    /// Unrealized return in percent; zero when flat.
    pub fn floating_pnl(&self, price: f64) -> f64 {
        match self {
            Position::Flat => 0.0,
            Position::Open {
                side, entry_price, ..
            } => pnl_percent(*side, *entry_price, price),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Flat => write!(f, "EMPTY"),
            Position::Open { side, .. } => write!(f, "{side}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TradeResult {
    Win,
    Loss,
}

impl fmt::Display for TradeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeResult::Win => write!(f, "WIN"),
            TradeResult::Loss => write!(f, "LOSS"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    pub side: Side,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl_percent: f64,
    pub result: TradeResult,
}
