//! Gemini `generateContent` oracle.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::domain::context::DecisionContext;
use crate::domain::decision::{parse_decision, Decision};
use crate::domain::error::{DecisionParseError, OracleError, TraderError};
use crate::ports::oracle_port::OraclePort;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiOracle {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// Full prompt: role, tasks, the rendered context and the reply schema.
pub fn build_prompt(context: &DecisionContext) -> String {
    format!(
        r#"Role: You are an Evolutionary AI Trader. You learn from your own PnL.

Task 1 (News Impact): Briefly evaluate if the news is Bullish/Bearish/Neutral for Crypto.
Task 2 (Decision): Decide to LONG, SHORT, CLOSE, or HOLD.
Task 3 (Self-Correction):
- If you are losing money (Floating PnL < -0.5%), admit your strategy was wrong and write a "Lesson".
- If you are making money (Floating PnL > 1%), confirm your strategy is stable.

Input Data:
{context}

Output Format:
{{
    "news_sentiment": "Bullish/Bearish/Neutral",
    "action": "LONG/SHORT/CLOSE/HOLD",
    "reason": "Detailed technical + news reasoning...",
    "reflection": "If PnL is bad, write what you did wrong. If good, write what worked. If neutral, leave empty."
}}
"#
    )
}

/// Text of the first candidate part, or `Empty` when the reply carries none.
fn reply_text(body: &str) -> Result<String, OracleError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| DecisionParseError::Json {
            reason: e.to_string(),
        })?;
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .map(|p| p.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or(OracleError::Malformed(DecisionParseError::Empty))
}

impl GeminiOracle {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: GEMINI_BASE_URL.to_string(),
            model: model.into(),
            client: reqwest::blocking::Client::new(),
            timeout,
        }
    }

    /// Reads the API key from the environment variable `api_key_env`.
    pub fn from_env(
        api_key_env: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, TraderError> {
        let api_key = std::env::var(api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| TraderError::ConfigMissing {
                section: "oracle".to_string(),
                key: format!("${api_key_env}"),
            })?;
        Ok(Self::new(api_key, model, timeout))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl OraclePort for GeminiOracle {
    fn decide(&self, context: &DecisionContext) -> Result<Decision, OracleError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(context),
                }],
            }],
        };
        debug!(model = %self.model, "querying oracle");

        let body = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .timeout(self.timeout)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout
                } else {
                    OracleError::Transport {
                        reason: e.without_url().to_string(),
                    }
                }
            })?;

        let text = reply_text(&body)?;
        Ok(parse_decision(&text)?)
    }
}
