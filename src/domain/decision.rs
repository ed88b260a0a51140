//! Oracle decision and its strict schema decoder.
//!
//! The oracle answers with a JSON object carrying `news_sentiment`, `action`,
//! `reason` and `reflection`. [`parse_decision`] accepts exactly that shape
//! (optionally wrapped in a Markdown code fence) and nothing looser.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::DecisionParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Action {
    Long,
    Short,
    Close,
    Hold,
}

impl FromStr for Action {
    type Err = DecisionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LONG" => Ok(Action::Long),
            "SHORT" => Ok(Action::Short),
            "CLOSE" => Ok(Action::Close),
            "HOLD" => Ok(Action::Hold),
            _ => Err(DecisionParseError::InvalidAction {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Long => write!(f, "LONG"),
            Action::Short => write!(f, "SHORT"),
            Action::Close => write!(f, "CLOSE"),
            Action::Hold => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
    #[default]
    Unknown,
}

impl FromStr for Sentiment {
    type Err = DecisionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bullish" => Ok(Sentiment::Bullish),
            "bearish" => Ok(Sentiment::Bearish),
            "neutral" => Ok(Sentiment::Neutral),
            "unknown" => Ok(Sentiment::Unknown),
            _ => Err(DecisionParseError::InvalidSentiment {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Bullish => write!(f, "Bullish"),
            Sentiment::Bearish => write!(f, "Bearish"),
            Sentiment::Neutral => write!(f, "Neutral"),
            Sentiment::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub news_sentiment: Sentiment,
    pub action: Action,
    pub reason: String,
    pub reflection: Option<String>,
}

impl Decision {
    /// The no-op decision used when the oracle fails or answers off-schema.
    pub fn fallback(error: impl fmt::Display) -> Self {
        Decision {
            news_sentiment: Sentiment::Unknown,
            action: Action::Hold,
            reason: format!("AI Error: {error}"),
            reflection: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawDecision {
    #[serde(default)]
    news_sentiment: Option<String>,
    action: Option<String>,
    reason: Option<String>,
    #[serde(default)]
    reflection: Option<String>,
}

/// Removes a surrounding ```json ... ``` fence if present.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

pub fn parse_decision(text: &str) -> Result<Decision, DecisionParseError> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(DecisionParseError::Empty);
    }

    let raw: RawDecision = serde_json::from_str(body).map_err(|e| DecisionParseError::Json {
        reason: e.to_string(),
    })?;

    let action = raw
        .action
        .ok_or(DecisionParseError::MissingField { field: "action" })?
        .parse::<Action>()?;
    let reason = raw
        .reason
        .ok_or(DecisionParseError::MissingField { field: "reason" })?;
    let news_sentiment = match raw.news_sentiment {
        Some(s) => s.parse::<Sentiment>()?,
        None => Sentiment::Unknown,
    };
    let reflection = raw
        .reflection
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    Ok(Decision {
        news_sentiment,
        action,
        reason,
        reflection,
    })
}
