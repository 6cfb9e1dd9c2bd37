use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An inclusive date window used by forecast queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Net cash-flow over a date window, computed from pending expected
/// transactions. Income counts positively, expenses negatively;
/// `net = total_income - total_expense`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CashFlowReport {
    pub range: DateRange,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net: Decimal,
}

impl CashFlowReport {
    pub fn new(range: DateRange, mut total_income: Decimal, mut total_expense: Decimal) -> Self {
        // Amounts read back from sqlite come scale-stripped; reports
        // always carry a fixed two-decimal scale on the wire.
        let mut net = total_income - total_expense;
        total_income.rescale(2);
        total_expense.rescale(2);
        net.rescale(2);
        Self {
            range,
            total_income,
            total_expense,
            net,
        }
    }
}

/// Signed per-category totals over a date window. Categories with no
/// matching pending rows are absent rather than present with zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryForecast {
    pub range: DateRange,
    pub categories: HashMap<String, Decimal>,
}
