use chrono::{NaiveDate, Utc};
use model::entities::prelude::*;
use model::entities::recurring_transaction_template;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use sea_orm::TransactionTrait;
use tracing::{error, info, instrument};

use crate::error::Result;
use crate::generator::{materialize, GenerationOutcome};

/// Summary of one batch run over every eligible template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Templates that actually walked their schedule. Skips (exhausted
    /// end dates) are not counted.
    pub templates_processed: u64,
    /// Newly inserted expected transactions across all templates.
    pub rows_created: u64,
}

/// Generates expected transactions for every active, auto-generating
/// template, each up to its own `days_in_advance` horizon, inside one
/// transaction. A failure on any template rolls the entire batch back;
/// no partial progress is ever committed.
#[instrument(skip(db))]
pub async fn generate_for_all_active(db: &DatabaseConnection) -> Result<BatchOutcome> {
    generate_for_all_active_as_of(db, Utc::now().date_naive()).await
}

/// Same as [`generate_for_all_active`] with an explicit "today".
pub async fn generate_for_all_active_as_of(
    db: &DatabaseConnection,
    today: NaiveDate,
) -> Result<BatchOutcome> {
    let txn = db.begin().await?;

    let outcome = async {
        let templates = RecurringTransactionTemplate::find()
            .filter(recurring_transaction_template::Column::IsActive.eq(true))
            .filter(recurring_transaction_template::Column::AutoGenerate.eq(true))
            .order_by_asc(recurring_transaction_template::Column::NextExecutionDate)
            .all(&txn)
            .await?;

        let mut batch = BatchOutcome::default();
        for template in templates {
            let days_in_advance = template.days_in_advance;
            match materialize(&txn, template, days_in_advance, today).await? {
                GenerationOutcome::Generated { created, .. } => {
                    batch.templates_processed += 1;
                    batch.rows_created += created;
                }
                GenerationOutcome::Skipped => {}
            }
        }
        Ok(batch)
    }
    .await;

    match outcome {
        Ok(batch) => {
            txn.commit().await?;
            info!(
                "Batch generation processed {} templates, created {} expected transactions",
                batch.templates_processed, batch.rows_created
            );
            Ok(batch)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                error!("Rollback after failed batch also failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}
