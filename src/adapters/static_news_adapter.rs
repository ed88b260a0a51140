//! News provider that always returns the same text.

use crate::domain::error::TraderError;
use crate::ports::news_port::NewsPort;

#[derive(Debug, Clone, Default)]
pub struct StaticNewsAdapter {
    text: String,
}

impl StaticNewsAdapter {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl NewsPort for StaticNewsAdapter {
    fn fetch_headlines(&self) -> Result<String, TraderError> {
        Ok(self.text.clone())
    }
}
