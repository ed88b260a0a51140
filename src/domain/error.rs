//! Domain error types.

/// Why an oracle reply could not be decoded into a decision.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecisionParseError {
    #[error("empty response")]
    Empty,

    #[error("invalid JSON: {reason}")]
    Json { reason: String },

    #[error("missing field `{field}`")]
    MissingField { field: &'static str },

    #[error("invalid action `{value}`")]
    InvalidAction { value: String },

    #[error("invalid news sentiment `{value}`")]
    InvalidSentiment { value: String },
}

/// Failure of the decision oracle collaborator.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("oracle transport error: {reason}")]
    Transport { reason: String },

    #[error("oracle call timed out")]
    Timeout,

    #[error("malformed oracle response: {0}")]
    Malformed(#[from] DecisionParseError),
}

/// Top-level error type for evotrader.
#[derive(Debug, thiserror::Error)]
pub enum TraderError {
    #[error("market data unavailable: {reason}")]
    DataUnavailable { reason: String },

    #[error("news unavailable: {reason}")]
    NewsUnavailable { reason: String },

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TraderError> for std::process::ExitCode {
    fn from(err: &TraderError) -> Self {
        let code: u8 = match err {
            TraderError::Io(_) => 1,
            TraderError::ConfigParse { .. }
            | TraderError::ConfigMissing { .. }
            | TraderError::ConfigInvalid { .. } => 2,
            TraderError::DataUnavailable { .. } => 3,
            TraderError::Oracle(_) => 4,
            TraderError::NewsUnavailable { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = TraderError::ConfigMissing {
            section: "market".into(),
            key: "csv_path".into(),
        };
        assert_eq!(err.to_string(), "missing config key [market] csv_path");

        let err = TraderError::DataUnavailable {
            reason: "connection refused".into(),
        };
        assert_eq!(err.to_string(), "market data unavailable: connection refused");
    }

    #[test]
    fn parse_error_wraps_into_trader_error() {
        let parse = DecisionParseError::MissingField { field: "action" };
        let err: TraderError = OracleError::from(parse).into();
        assert_eq!(
            err.to_string(),
            "malformed oracle response: missing field `action`"
        );
    }
}
