//! Recurring transaction engine: schedule arithmetic, horizon
//! generation of expected transactions, their lifecycle, forecasting
//! over the pending set, and batch orchestration across templates.

pub mod batch;
pub mod error;
pub mod forecast;
pub mod generator;
pub mod lifecycle;
pub mod recurrence;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{EngineError, Result};
