//! News headline port trait.

use crate::domain::error::TraderError;

pub trait NewsPort {
    /// Recent headlines as free text. Failures are [`TraderError::NewsUnavailable`].
    fn fetch_headlines(&self) -> Result<String, TraderError>;
}
