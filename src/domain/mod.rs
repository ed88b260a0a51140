//! Core domain types and logic.

pub mod candle;
pub mod indicator;
pub mod position;
pub mod ledger;
pub mod reflection;
pub mod decision;
pub mod context;
pub mod decision_loop;
pub mod settings;
pub mod error;
