#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use evotrader::domain::candle::{Candle, CandleSeries};
use evotrader::domain::context::DecisionContext;
use evotrader::domain::decision::{Action, Decision, Sentiment};
use evotrader::domain::decision_loop::CycleReport;
use evotrader::domain::error::{OracleError, TraderError};
use evotrader::domain::settings::{
    LoopSettings, MarketSource, NewsSource, OracleProvider, TraderConfig,
};
use evotrader::ports::market_data_port::MarketDataPort;
use evotrader::ports::news_port::NewsPort;
use evotrader::ports::oracle_port::OraclePort;
use evotrader::ports::report_port::ReportPort;

pub const BASE_TS: i64 = 1_700_000_000_000;
pub const FIVE_MIN_MS: i64 = 300_000;

pub fn make_candle(i: usize, close: f64) -> Candle {
    Candle {
        timestamp: BASE_TS + i as i64 * FIVE_MIN_MS,
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 10.0,
    }
}

/// 30 flat candles at `close`.
pub fn flat_series(close: f64) -> CandleSeries {
    CandleSeries::from_candles((0..30).map(|i| make_candle(i, close)))
}

pub fn series_from_closes(closes: &[f64]) -> CandleSeries {
    CandleSeries::from_candles(closes.iter().enumerate().map(|(i, &c)| make_candle(i, c)))
}

/// Zero delays, offline sources.
pub fn test_config() -> TraderConfig {
    TraderConfig {
        market_source: MarketSource::Csv {
            path: "unused.csv".into(),
        },
        news_source: NewsSource::Static,
        oracle: OracleProvider::Rule,
        loop_settings: LoopSettings {
            poll_interval: Duration::ZERO,
            retry_delay: Duration::ZERO,
            ..LoopSettings::default()
        },
        ..TraderConfig::default()
    }
}

pub fn decision(action: Action, reflection: Option<&str>) -> Decision {
    Decision {
        news_sentiment: Sentiment::Neutral,
        action,
        reason: format!("scripted {action}"),
        reflection: reflection.map(str::to_string),
    }
}

/// Serves scripted series in order; `None` entries and an exhausted script
/// report the market as unavailable.
pub struct ScriptedMarket {
    script: RefCell<VecDeque<Option<CandleSeries>>>,
    pub calls: Rc<RefCell<usize>>,
}

impl ScriptedMarket {
    pub fn new(script: Vec<Option<CandleSeries>>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            calls: Rc::new(RefCell::new(0)),
        }
    }

    pub fn prices(prices: &[f64]) -> Self {
        Self::new(prices.iter().map(|&p| Some(flat_series(p))).collect())
    }
}

impl MarketDataPort for ScriptedMarket {
    fn fetch_candles(
        &self,
        _symbol: &str,
        _timeframe: &str,
        _limit: usize,
    ) -> Result<CandleSeries, TraderError> {
        *self.calls.borrow_mut() += 1;
        match self.script.borrow_mut().pop_front() {
            Some(Some(series)) => Ok(series),
            Some(None) => Err(TraderError::DataUnavailable {
                reason: "scripted outage".into(),
            }),
            None => Err(TraderError::DataUnavailable {
                reason: "script exhausted".into(),
            }),
        }
    }
}

pub struct FailingNews;

impl NewsPort for FailingNews {
    fn fetch_headlines(&self) -> Result<String, TraderError> {
        Err(TraderError::NewsUnavailable {
            reason: "feed down".into(),
        })
    }
}

/// Pops scripted replies and records every context it was shown.
/// An exhausted script answers HOLD.
pub struct ScriptedOracle {
    script: RefCell<VecDeque<Result<Decision, OracleError>>>,
    pub seen: Rc<RefCell<Vec<DecisionContext>>>,
}

impl ScriptedOracle {
    pub fn new(script: Vec<Result<Decision, OracleError>>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            seen: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn actions(actions: &[Action]) -> Self {
        Self::new(actions.iter().map(|&a| Ok(decision(a, None))).collect())
    }
}

impl OraclePort for ScriptedOracle {
    fn decide(&self, context: &DecisionContext) -> Result<Decision, OracleError> {
        self.seen.borrow_mut().push(context.clone());
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(decision(Action::Hold, None)))
    }
}

#[derive(Clone, Default)]
pub struct RecordingReporter {
    pub reports: Rc<RefCell<Vec<CycleReport>>>,
}

impl ReportPort for RecordingReporter {
    fn report(&mut self, report: &CycleReport) {
        self.reports.borrow_mut().push(report.clone());
    }
}
