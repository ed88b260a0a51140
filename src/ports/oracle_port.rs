//! Decision oracle port trait.

use crate::domain::context::DecisionContext;
use crate::domain::decision::Decision;
use crate::domain::error::OracleError;

pub trait OraclePort {
    /// Transport errors, timeouts and off-schema replies all surface as `Err`.
    fn decide(&self, context: &DecisionContext) -> Result<Decision, OracleError>;
}
