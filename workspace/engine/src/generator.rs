use chrono::{Duration, NaiveDate, Utc};
use model::entities::expected_transaction::{self, ExpectedStatus};
use model::entities::prelude::*;
use model::entities::recurring_transaction_template;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::recurrence::next_occurrence;

/// The result of one generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Nothing was done: the template is missing, inactive, not
    /// auto-generating, or its schedule is already past its end date.
    /// Deliberately not an error.
    Skipped,
    /// The schedule was walked up to the horizon. `created` counts only
    /// newly inserted rows; reruns over an already-materialized window
    /// create nothing.
    Generated {
        created: u64,
        next_execution_date: NaiveDate,
    },
}

/// Generates expected transactions for one template up to
/// `today + days_in_advance`, inside a single transaction.
///
/// Walks the schedule from the template's `next_execution_date`,
/// inserting one Pending row per occurrence date that does not already
/// have one, then persists the advanced pointer as the last write.
/// Rerunning with an unchanged clock is a no-op. Any persistence error
/// rolls the whole call back and propagates.
#[instrument(skip(db))]
pub async fn generate(
    db: &DatabaseConnection,
    template_id: Uuid,
    days_in_advance: i32,
) -> Result<GenerationOutcome> {
    generate_as_of(db, template_id, days_in_advance, Utc::now().date_naive()).await
}

/// Same as [`generate`] but with an explicit "today", so callers (and
/// tests) can pin the horizon.
pub async fn generate_as_of(
    db: &DatabaseConnection,
    template_id: Uuid,
    days_in_advance: i32,
    today: NaiveDate,
) -> Result<GenerationOutcome> {
    let txn = db.begin().await?;

    let outcome = async {
        let Some(template) = RecurringTransactionTemplate::find_by_id(template_id)
            .one(&txn)
            .await?
        else {
            debug!("Template {} not found, skipping generation", template_id);
            return Ok(GenerationOutcome::Skipped);
        };
        materialize(&txn, template, days_in_advance, today).await
    }
    .await;

    match outcome {
        Ok(outcome) => {
            txn.commit().await?;
            Ok(outcome)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                error!("Rollback after failed generation also failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}

/// Core of the generator, shared with the batch orchestrator. Runs on
/// the caller's connection, which is expected to be an open transaction.
pub(crate) async fn materialize<C: ConnectionTrait>(
    conn: &C,
    template: recurring_transaction_template::Model,
    days_in_advance: i32,
    today: NaiveDate,
) -> Result<GenerationOutcome> {
    if !template.is_active || !template.auto_generate {
        debug!(
            "Template {} is inactive or not auto-generating, skipping",
            template.id
        );
        return Ok(GenerationOutcome::Skipped);
    }

    let mut cursor = template.next_execution_date;
    if let Some(end_date) = template.end_date {
        if cursor > end_date {
            debug!("Template {} schedule is exhausted, skipping", template.id);
            return Ok(GenerationOutcome::Skipped);
        }
    }

    let horizon = today + Duration::days(i64::from(days_in_advance));
    let mut created = 0u64;

    while cursor <= horizon {
        if let Some(end_date) = template.end_date {
            if cursor > end_date {
                break;
            }
        }

        let exists = ExpectedTransaction::find()
            .filter(expected_transaction::Column::TemplateId.eq(template.id))
            .filter(expected_transaction::Column::ExpectedDate.eq(cursor))
            .one(conn)
            .await?
            .is_some();

        if !exists {
            expected_transaction::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(template.user_id),
                account_id: Set(template.account_id),
                template_id: Set(template.id),
                expected_date: Set(cursor),
                expected_amount: Set(template.amount),
                original_amount: Set(None),
                description: Set(template.description.clone()),
                transaction_type: Set(template.transaction_type),
                category: Set(template.category.clone()),
                status: Set(ExpectedStatus::Pending),
                is_adjusted: Set(false),
                adjustment_reason: Set(None),
                actual_transaction_id: Set(None),
                generated_at: Set(Utc::now().naive_utc()),
                processed_at: Set(None),
                updated_at: Set(None),
            }
            .insert(conn)
            .await?;
            created += 1;
        }

        cursor = next_occurrence(cursor, template.frequency, template.custom_interval_days);
    }

    // The pointer write is the last write of the transaction: a failure
    // anywhere above leaves rows and pointer untouched together.
    let template_id = template.id;
    let mut active: recurring_transaction_template::ActiveModel = template.into();
    active.next_execution_date = Set(cursor);
    active.update(conn).await?;

    info!(
        "Generated {} expected transactions for template {}, pointer now {}",
        created, template_id, cursor
    );
    Ok(GenerationOutcome::Generated {
        created,
        next_execution_date: cursor,
    })
}

/// Computes the occurrence that would follow the template's current
/// pointer, without persisting anything. Errors if the template does
/// not exist.
#[instrument(skip(db))]
pub async fn calculate_next_execution_date(
    db: &DatabaseConnection,
    template_id: Uuid,
) -> Result<NaiveDate> {
    let template = RecurringTransactionTemplate::find_by_id(template_id)
        .one(db)
        .await?
        .ok_or(EngineError::TemplateNotFound(template_id))?;

    Ok(next_occurrence(
        template.next_execution_date,
        template.frequency,
        template.custom_interval_days,
    ))
}
