//! Polling loop: fetch → indicators → context → oracle → ledger → memory → report.
//!
//! Each cycle runs strictly in sequence. The ledger and memory are only touched
//! after candles were fetched and a decision (real or fallback) is in hand, so
//! a failed external call never leaves partial state behind.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::context::build_context;
use super::decision::Decision;
use super::error::TraderError;
use super::indicator::{IndicatorEngine, IndicatorSnapshot};
use super::ledger::{ExecutionOutcome, LedgerEvent, PositionLedger};
use super::reflection::{Lesson, ReflectionMemory};
use super::settings::TraderConfig;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::news_port::NewsPort;
use crate::ports::oracle_port::OraclePort;
use crate::ports::report_port::ReportPort;

const PAUSE_SLICE: Duration = Duration::from_millis(200);

/// Read-only view of one completed cycle, handed to the reporter.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub price: f64,
    pub indicators: IndicatorSnapshot,
    pub news: String,
    pub news_degraded: bool,
    pub decision: Decision,
    pub oracle_failed: bool,
    pub execution: ExecutionOutcome,
    pub ledger: PositionLedger,
    pub floating_pnl: f64,
    pub latest_lesson: Option<Lesson>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub cycles: usize,
    pub failures: usize,
}

pub struct DecisionLoop<'c> {
    config: &'c TraderConfig,
    market: Box<dyn MarketDataPort + 'c>,
    news: Box<dyn NewsPort + 'c>,
    oracle: Box<dyn OraclePort + 'c>,
    reporter: Box<dyn ReportPort + 'c>,
    engine: IndicatorEngine,
    ledger: PositionLedger,
    memory: ReflectionMemory,
}

impl<'c> DecisionLoop<'c> {
    pub fn new(
        config: &'c TraderConfig,
        market: Box<dyn MarketDataPort + 'c>,
        news: Box<dyn NewsPort + 'c>,
        oracle: Box<dyn OraclePort + 'c>,
        reporter: Box<dyn ReportPort + 'c>,
    ) -> Self {
        let memory = match config.loop_settings.max_lessons {
            0 => ReflectionMemory::new(),
            limit => ReflectionMemory::with_limit(limit),
        };

        DecisionLoop {
            config,
            market,
            news,
            oracle,
            reporter,
            engine: IndicatorEngine::new(),
            ledger: PositionLedger::new(config.initial_balance, config.initial_score),
            memory,
        }
    }

    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    pub fn memory(&self) -> &ReflectionMemory {
        &self.memory
    }

    /// Runs one cycle. Only [`TraderError::DataUnavailable`] (or another
    /// market-side failure) escapes; news and oracle failures degrade in place.
    pub fn run_cycle(&mut self) -> Result<CycleReport, TraderError> {
        let config = self.config;

        let series = self
            .market
            .fetch_candles(&config.symbol, &config.timeframe, config.candle_limit)?;
        let Some(latest) = series.latest() else {
            return Err(TraderError::DataUnavailable {
                reason: "no candles returned".to_string(),
            });
        };
        let price = latest.close;

        let (news, news_degraded) = match self.news.fetch_headlines() {
            Ok(text) if !text.trim().is_empty() => (text, false),
            Ok(_) => (config.news_placeholder.clone(), false),
            Err(e) => {
                warn!(error = %e, "news fetch failed, using placeholder");
                (config.news_placeholder.clone(), true)
            }
        };

        let rows = self.engine.compute(&series);
        let indicators = rows.last().map(|r| r.indicators).unwrap_or_default();

        let context = build_context(
            &config.symbol,
            price,
            &indicators,
            &self.ledger,
            &self.memory,
            config.loop_settings.lesson_context,
            &news,
        );
        debug!(context = %context, "decision context");

        let now = Utc::now();
        let (decision, execution, oracle_failed) = match self.oracle.decide(&context) {
            Ok(decision) => {
                let execution =
                    self.ledger.execute_at(decision.action, price, &decision.reason, now);
                (decision, execution, false)
            }
            Err(e) => {
                warn!(error = %e, "oracle failed, holding");
                // The fallback HOLD leaves the ledger untouched, open position included.
                let execution = ExecutionOutcome {
                    message: "Holding position".to_string(),
                    needs_reflection: false,
                    event: LedgerEvent::Unchanged,
                };
                (Decision::fallback(&e), execution, true)
            }
        };

        if let Some(reflection) = &decision.reflection {
            self.memory.record(reflection.clone(), now);
        }

        info!(
            symbol = %config.symbol,
            price,
            action = %decision.action,
            sentiment = %decision.news_sentiment,
            balance = self.ledger.balance,
            score = self.ledger.strategy_score,
            "{}",
            execution.message
        );

        let report = CycleReport {
            timestamp: now,
            symbol: config.symbol.clone(),
            price,
            indicators,
            news,
            news_degraded,
            floating_pnl: self.ledger.floating_pnl(price),
            decision,
            oracle_failed,
            execution,
            ledger: self.ledger.clone(),
            latest_lesson: self.memory.last().cloned(),
        };
        self.reporter.report(&report);
        Ok(report)
    }

    /// Cycles until `stop` is raised or `max_cycles` successful cycles have run.
    /// Failed cycles wait `retry_delay` and try again; nothing here is fatal.
    pub fn run(&mut self, stop: &AtomicBool, max_cycles: Option<usize>) -> LoopSummary {
        let mut summary = LoopSummary::default();
        let config = self.config;
        let settings = &config.loop_settings;
        info!(
            symbol = %config.symbol,
            balance = self.ledger.balance,
            "trader online"
        );

        let budget_spent = |cycles: usize| max_cycles.is_some_and(|max| cycles >= max);
        while !stop.load(Ordering::SeqCst) && !budget_spent(summary.cycles) {
            match self.run_cycle() {
                Ok(_) => {
                    summary.cycles += 1;
                    if budget_spent(summary.cycles) {
                        break;
                    }
                    pause(settings.poll_interval, stop);
                }
                Err(TraderError::DataUnavailable { reason }) => {
                    summary.failures += 1;
                    warn!(%reason, retry_in = ?settings.retry_delay, "market data unavailable");
                    pause(settings.retry_delay, stop);
                }
                Err(e) => {
                    summary.failures += 1;
                    error!(error = %e, "cycle failed");
                    pause(settings.retry_delay, stop);
                }
            }
        }

        info!(cycles = summary.cycles, failures = summary.failures, "trader stopped");
        summary
    }
}

/// Sleeps for `duration`, waking early once `stop` is raised.
fn pause(duration: Duration, stop: &AtomicBool) {
    let deadline = Instant::now() + duration;
    while !stop.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep((deadline - now).min(PAUSE_SLICE));
    }
}
