//! OKX public REST candle feed.

use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::domain::candle::{Candle, CandleSeries};
use crate::domain::error::TraderError;
use crate::ports::market_data_port::MarketDataPort;

pub struct OkxAdapter {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout: Duration,
}

/// OKX response envelope; `code` is "0" on success.
#[derive(Debug, Deserialize)]
struct OkxResponse {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Vec<Vec<String>>,
}

fn unavailable(reason: impl Into<String>) -> TraderError {
    TraderError::DataUnavailable {
        reason: reason.into(),
    }
}

/// `BTC/USDT` → `BTC-USDT`.
pub fn inst_id(symbol: &str) -> String {
    symbol.replace('/', "-").to_uppercase()
}

/// OKX spells hour and day bars in upper case (`1H`, `1D`); minutes stay lower.
pub fn bar(timeframe: &str) -> String {
    match timeframe.chars().last() {
        Some('h') | Some('d') | Some('w') => timeframe.to_uppercase(),
        _ => timeframe.to_string(),
    }
}

/// Decodes a candles response into an oldest-first series.
pub fn parse_candles(body: &str) -> Result<CandleSeries, TraderError> {
    let response: OkxResponse =
        serde_json::from_str(body).map_err(|e| unavailable(format!("invalid OKX response: {e}")))?;
    if response.code != "0" {
        return Err(unavailable(format!(
            "OKX error {}: {}",
            response.code, response.msg
        )));
    }
    if response.data.is_empty() {
        return Err(unavailable("OKX returned no candles"));
    }

    let mut candles = Vec::with_capacity(response.data.len());
    for row in &response.data {
        if row.len() < 6 {
            return Err(unavailable(format!("short OKX candle row: {row:?}")));
        }
        let num = |i: usize| -> Result<f64, TraderError> {
            row[i]
                .parse::<f64>()
                .map_err(|e| unavailable(format!("invalid OKX field `{}`: {e}", row[i])))
        };
        candles.push(Candle {
            timestamp: row[0]
                .parse::<i64>()
                .map_err(|e| unavailable(format!("invalid OKX timestamp `{}`: {e}", row[0])))?,
            open: num(1)?,
            high: num(2)?,
            low: num(3)?,
            close: num(4)?,
            volume: num(5)?,
        });
    }

    // OKX answers newest first.
    candles.sort_by_key(|c| c.timestamp);
    Ok(CandleSeries::from_candles(candles))
}

impl OkxAdapter {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
            timeout,
        }
    }
}

impl MarketDataPort for OkxAdapter {
    fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<CandleSeries, TraderError> {
        let url = format!("{}/api/v5/market/candles", self.base_url);
        let inst = inst_id(symbol);
        let bar = bar(timeframe);
        debug!(%url, %inst, %bar, limit, "fetching candles");

        let body = self
            .client
            .get(&url)
            .query(&[
                ("instId", inst.as_str()),
                ("bar", bar.as_str()),
                ("limit", &limit.to_string()),
            ])
            .timeout(self.timeout)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| unavailable(format!("OKX request failed: {e}")))?;

        parse_candles(&body)
    }
}
