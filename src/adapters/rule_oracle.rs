//! Deterministic offline oracle.
//!
//! Lets the loop run without model credentials. Entries follow the EMA7/EMA25
//! cross filtered by RSI; exits are a fixed stop and target on floating PnL.

use crate::domain::context::DecisionContext;
use crate::domain::decision::{Action, Decision, Sentiment};
use crate::domain::error::OracleError;
use crate::domain::position::{Position, Side};
use crate::ports::oracle_port::OraclePort;

#[derive(Debug, Clone, PartialEq)]
pub struct RuleOracle {
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
}

impl Default for RuleOracle {
    fn default() -> Self {
        RuleOracle {
            stop_loss_pct: 1.0,
            take_profit_pct: 2.0,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
        }
    }
}

impl RuleOracle {
    fn entry(&self, ctx: &DecisionContext) -> (Action, String) {
        let ind = &ctx.indicators;
        let (Some(fast), Some(slow), Some(rsi)) = (ind.ema7, ind.ema25, ind.rsi) else {
            return (Action::Hold, "Indicators still warming up".to_string());
        };

        if fast > slow && rsi < self.rsi_overbought {
            (
                Action::Long,
                format!("EMA7 {fast:.2} above EMA25 {slow:.2}, RSI {rsi:.1} not overbought"),
            )
        } else if fast < slow && rsi > self.rsi_oversold {
            (
                Action::Short,
                format!("EMA7 {fast:.2} below EMA25 {slow:.2}, RSI {rsi:.1} not oversold"),
            )
        } else {
            (Action::Hold, format!("No clean trend, RSI {rsi:.1}"))
        }
    }
}

impl OraclePort for RuleOracle {
    fn decide(&self, ctx: &DecisionContext) -> Result<Decision, OracleError> {
        let (action, reason, reflection) = match ctx.position {
            Position::Flat => {
                let (action, reason) = self.entry(ctx);
                (action, reason, None)
            }
            Position::Open { side, .. } => {
                let pnl = ctx.floating_pnl;
                if pnl <= -self.stop_loss_pct {
                    (
                        Action::Close,
                        format!("Stop hit at {pnl:.2}%"),
                        Some(format!(
                            "{side} entry went {pnl:.2}% against me; the trend signal was late"
                        )),
                    )
                } else if pnl >= self.take_profit_pct {
                    (
                        Action::Close,
                        format!("Target reached at {pnl:.2}%"),
                        Some(format!("{side} trend entry worked, took {pnl:.2}%")),
                    )
                } else {
                    let keep = match side {
                        Side::Long => Action::Long,
                        Side::Short => Action::Short,
                    };
                    (keep, format!("Holding {side} at {pnl:.2}%"), None)
                }
            }
        };

        Ok(Decision {
            news_sentiment: Sentiment::Unknown,
            action,
            reason,
            reflection,
        })
    }
}
