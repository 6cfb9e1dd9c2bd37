//! Common transport-layer types shared between the engine crate and the
//! HTTP handlers, so both sides agree on forecast payload shapes without
//! duplicating them.

mod forecast;

pub use forecast::{CashFlowReport, CategoryForecast, DateRange};
