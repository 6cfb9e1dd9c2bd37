//! Forecast queries over pending expected transactions: cash-flow and
//! per-category aggregation, plus the listings the API surfaces.

use chrono::{NaiveDate, Utc};
use common::{CashFlowReport, CategoryForecast, DateRange};
use model::entities::expected_transaction::{self, ExpectedStatus};
use model::entities::prelude::*;
use model::entities::recurring_transaction_template::TransactionType;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::Result;

/// Sums pending expected transactions for a user over an inclusive date
/// window into income, expense and net totals. Confirmed and cancelled
/// rows never contribute.
#[instrument(skip(db))]
pub async fn cash_flow_forecast(
    db: &DatabaseConnection,
    user_id: i32,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<CashFlowReport> {
    let rows = pending_in_window(db, user_id, start, end).await?;

    let mut total_income = Decimal::ZERO;
    let mut total_expense = Decimal::ZERO;
    for row in &rows {
        match row.transaction_type {
            TransactionType::Income => total_income += row.expected_amount,
            TransactionType::Expense => total_expense += row.expected_amount,
        }
    }

    debug!(
        "Cash flow for user {} over {}..={}: {} pending rows",
        user_id,
        start,
        end,
        rows.len()
    );
    Ok(CashFlowReport::new(
        DateRange::new(start, end),
        total_income,
        total_expense,
    ))
}

/// Signed per-category totals for a user's pending rows in a window.
/// Income adds, expense subtracts. Rows without a category (null or
/// empty) are left out entirely, as are categories with no pending rows.
#[instrument(skip(db))]
pub async fn category_forecast(
    db: &DatabaseConnection,
    user_id: i32,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<CategoryForecast> {
    let rows = pending_in_window(db, user_id, start, end).await?;

    let mut forecast = CategoryForecast {
        range: DateRange::new(start, end),
        categories: Default::default(),
    };
    for row in rows {
        let Some(category) = row.category.filter(|c| !c.is_empty()) else {
            continue;
        };
        let signed = match row.transaction_type {
            TransactionType::Income => row.expected_amount,
            TransactionType::Expense => -row.expected_amount,
        };
        *forecast.categories.entry(category).or_insert(Decimal::ZERO) += signed;
    }
    for total in forecast.categories.values_mut() {
        total.rescale(2);
    }

    Ok(forecast)
}

async fn pending_in_window(
    db: &DatabaseConnection,
    user_id: i32,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<expected_transaction::Model>> {
    let rows = ExpectedTransaction::find()
        .filter(expected_transaction::Column::UserId.eq(user_id))
        .filter(expected_transaction::Column::Status.eq(ExpectedStatus::Pending))
        .filter(expected_transaction::Column::ExpectedDate.gte(start))
        .filter(expected_transaction::Column::ExpectedDate.lte(end))
        .order_by_asc(expected_transaction::Column::ExpectedDate)
        .all(db)
        .await?;
    Ok(rows)
}

/// All pending expected transactions for a user, soonest first.
#[instrument(skip(db))]
pub async fn pending_for_user(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<expected_transaction::Model>> {
    let rows = ExpectedTransaction::find()
        .filter(expected_transaction::Column::UserId.eq(user_id))
        .filter(expected_transaction::Column::Status.eq(ExpectedStatus::Pending))
        .order_by_asc(expected_transaction::Column::ExpectedDate)
        .all(db)
        .await?;
    Ok(rows)
}

/// A user's expected transactions with a given status, soonest first.
#[instrument(skip(db))]
pub async fn for_user_with_status(
    db: &DatabaseConnection,
    user_id: i32,
    status: ExpectedStatus,
) -> Result<Vec<expected_transaction::Model>> {
    let rows = ExpectedTransaction::find()
        .filter(expected_transaction::Column::UserId.eq(user_id))
        .filter(expected_transaction::Column::Status.eq(status))
        .order_by_asc(expected_transaction::Column::ExpectedDate)
        .all(db)
        .await?;
    Ok(rows)
}

/// Pending rows for a user dated within the next `days` days.
#[instrument(skip(db))]
pub async fn upcoming_for_user(
    db: &DatabaseConnection,
    user_id: i32,
    days: i32,
) -> Result<Vec<expected_transaction::Model>> {
    upcoming_for_user_as_of(db, user_id, days, Utc::now().date_naive()).await
}

/// Same as [`upcoming_for_user`] with an explicit clock.
pub async fn upcoming_for_user_as_of(
    db: &DatabaseConnection,
    user_id: i32,
    days: i32,
    today: NaiveDate,
) -> Result<Vec<expected_transaction::Model>> {
    let end = today
        .checked_add_signed(chrono::Duration::days(i64::from(days)))
        .unwrap_or(today);
    pending_in_window(db, user_id, today, end).await
}

/// Every expected transaction on an account, regardless of status,
/// soonest first.
#[instrument(skip(db))]
pub async fn for_account(
    db: &DatabaseConnection,
    account_id: i32,
) -> Result<Vec<expected_transaction::Model>> {
    let rows = ExpectedTransaction::find()
        .filter(expected_transaction::Column::AccountId.eq(account_id))
        .order_by_asc(expected_transaction::Column::ExpectedDate)
        .all(db)
        .await?;
    Ok(rows)
}

/// Every expected transaction generated from a template, regardless of
/// status, soonest first.
#[instrument(skip(db))]
pub async fn for_template(
    db: &DatabaseConnection,
    template_id: Uuid,
) -> Result<Vec<expected_transaction::Model>> {
    let rows = ExpectedTransaction::find()
        .filter(expected_transaction::Column::TemplateId.eq(template_id))
        .order_by_asc(expected_transaction::Column::ExpectedDate)
        .all(db)
        .await?;
    Ok(rows)
}

/// A user's expected transactions in an inclusive window, any status.
#[instrument(skip(db))]
pub async fn in_date_range(
    db: &DatabaseConnection,
    user_id: i32,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<expected_transaction::Model>> {
    let rows = ExpectedTransaction::find()
        .filter(expected_transaction::Column::UserId.eq(user_id))
        .filter(expected_transaction::Column::ExpectedDate.gte(start))
        .filter(expected_transaction::Column::ExpectedDate.lte(end))
        .order_by_asc(expected_transaction::Column::ExpectedDate)
        .all(db)
        .await?;
    Ok(rows)
}
