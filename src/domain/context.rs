//! Oracle-facing snapshot of market, account and memory state.

use serde::Serialize;
use std::fmt;

use super::indicator::{BandPosition, IndicatorSnapshot};
use super::ledger::PositionLedger;
use super::position::Position;
use super::reflection::{Lesson, ReflectionMemory};

/// Number of lessons handed to the oracle each cycle.
pub const DEFAULT_LESSON_CONTEXT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionContext {
    pub symbol: String,
    pub price: f64,
    pub indicators: IndicatorSnapshot,
    pub band_position: BandPosition,
    pub balance: f64,
    pub position: Position,
    pub floating_pnl: f64,
    pub strategy_score: i64,
    pub lessons: Vec<Lesson>,
    pub news: String,
}

/// Assembles the context without touching any of its inputs.
pub fn build_context(
    symbol: &str,
    price: f64,
    indicators: &IndicatorSnapshot,
    ledger: &PositionLedger,
    memory: &ReflectionMemory,
    lesson_count: usize,
    news: &str,
) -> DecisionContext {
    DecisionContext {
        symbol: symbol.to_string(),
        price,
        indicators: *indicators,
        band_position: indicators.band_position(price),
        balance: ledger.balance,
        position: ledger.position,
        floating_pnl: ledger.floating_pnl(price),
        strategy_score: ledger.strategy_score,
        lessons: memory.latest(lesson_count).into_iter().cloned().collect(),
        news: news.to_string(),
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

impl fmt::Display for DecisionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== MACRO NEWS (Sentiment Analysis) ===")?;
        writeln!(f, "{}", self.news)?;
        writeln!(f)?;
        writeln!(f, "=== ACCOUNT HEALTH (Simulation) ===")?;
        writeln!(f, "Balance: {:.2} USDT", self.balance)?;
        writeln!(f, "Current Position: {}", self.position)?;
        writeln!(f, "Entry Price: {}", self.position.entry_price().unwrap_or(0.0))?;
        writeln!(f, "Floating PnL: {:.2}%", self.floating_pnl)?;
        writeln!(f, "Strategy Score: {}/100", self.strategy_score)?;
        writeln!(f)?;
        writeln!(f, "=== STRATEGY MEMORY (Lessons from Past Mistakes) ===")?;
        if self.lessons.is_empty() {
            writeln!(f, "No lessons yet. Starting fresh.")?;
        } else {
            for lesson in &self.lessons {
                writeln!(f, "{lesson}")?;
            }
        }
        writeln!(f)?;
        writeln!(f, "=== TECHNICAL DATA ===")?;
        writeln!(f, "Symbol: {}", self.symbol)?;
        writeln!(f, "Price: {:.2}", self.price)?;
        writeln!(f, "EMA7: {}", fmt_opt(self.indicators.ema7))?;
        writeln!(f, "EMA25: {}", fmt_opt(self.indicators.ema25))?;
        writeln!(f, "SMA20: {}", fmt_opt(self.indicators.sma20))?;
        writeln!(f, "RSI: {}", fmt_opt(self.indicators.rsi))?;
        writeln!(f, "ATR: {}", fmt_opt(self.indicators.atr))?;
        write!(f, "Bollinger: {}", self.band_position)
    }
}
