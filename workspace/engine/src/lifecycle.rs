use chrono::Utc;
use model::entities::expected_transaction::{self, ExpectedStatus};
use model::entities::prelude::*;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, Set, TransactionTrait,
};
use tracing::{error, instrument, warn};
use uuid::Uuid;

/// Outcome of a single state transition attempt. The public operations
/// collapse this to a bool, but the causes stay distinguishable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    NotFound,
    /// The row exists but is already Confirmed or Cancelled.
    NotPending,
}

/// Marks a Pending expected transaction as Confirmed, recording the real
/// transaction that fulfilled it. Returns false when the row is missing,
/// already processed, or the database fails (the failure is logged).
#[instrument(skip(db))]
pub async fn confirm(
    db: &DatabaseConnection,
    id: Uuid,
    actual_transaction_id: Uuid,
) -> bool {
    run_transition(db, "confirm", id, |row| {
        let now = Utc::now().naive_utc();
        let mut active: expected_transaction::ActiveModel = row.into();
        active.status = Set(ExpectedStatus::Confirmed);
        active.actual_transaction_id = Set(Some(actual_transaction_id));
        active.processed_at = Set(Some(now));
        active.updated_at = Set(Some(now));
        active
    })
    .await
}

/// Marks a Pending expected transaction as Cancelled with a reason.
#[instrument(skip(db))]
pub async fn cancel(db: &DatabaseConnection, id: Uuid, reason: &str) -> bool {
    let reason = reason.to_string();
    run_transition(db, "cancel", id, move |row| {
        let now = Utc::now().naive_utc();
        let mut active: expected_transaction::ActiveModel = row.into();
        active.status = Set(ExpectedStatus::Cancelled);
        active.adjustment_reason = Set(Some(reason));
        active.processed_at = Set(Some(now));
        active.updated_at = Set(Some(now));
        active
    })
    .await
}

/// Changes the expected amount of a Pending row. The pre-adjustment
/// amount is snapshotted into `original_amount` on the first adjustment
/// only; the row stays Pending and can be adjusted again.
#[instrument(skip(db))]
pub async fn adjust(
    db: &DatabaseConnection,
    id: Uuid,
    new_amount: Decimal,
    reason: &str,
) -> bool {
    let reason = reason.to_string();
    run_transition(db, "adjust", id, move |row| {
        let now = Utc::now().naive_utc();
        let snapshot = if row.is_adjusted {
            row.original_amount
        } else {
            Some(row.expected_amount)
        };
        let mut active: expected_transaction::ActiveModel = row.into();
        active.original_amount = Set(snapshot);
        active.expected_amount = Set(new_amount);
        active.is_adjusted = Set(true);
        active.adjustment_reason = Set(Some(reason));
        active.updated_at = Set(Some(now));
        active
    })
    .await
}

/// Shared transition shape: begin transaction, load, require Pending,
/// apply the mutation, commit. Database failures roll back and are
/// reported as false; the caller cannot tell NotFound from NotPending
/// by design (both are "not found or cannot be transitioned").
async fn run_transition<F>(db: &DatabaseConnection, op: &str, id: Uuid, mutate: F) -> bool
where
    F: FnOnce(expected_transaction::Model) -> expected_transaction::ActiveModel,
{
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(e) => {
            error!("Failed to begin transaction for {} on {}: {}", op, id, e);
            return false;
        }
    };

    match apply_transition(&txn, id, mutate).await {
        Ok(Transition::Applied) => match txn.commit().await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to commit {} on {}: {}", op, id, e);
                false
            }
        },
        Ok(outcome) => {
            // Nothing was written; release the transaction.
            rollback_quietly(txn, op, id).await;
            warn!("Cannot {} expected transaction {}: {:?}", op, id, outcome);
            false
        }
        Err(e) => {
            rollback_quietly(txn, op, id).await;
            error!("Database error during {} on {}: {}", op, id, e);
            false
        }
    }
}

async fn apply_transition<C, F>(conn: &C, id: Uuid, mutate: F) -> Result<Transition, DbErr>
where
    C: ConnectionTrait,
    F: FnOnce(expected_transaction::Model) -> expected_transaction::ActiveModel,
{
    let Some(row) = ExpectedTransaction::find_by_id(id).one(conn).await? else {
        return Ok(Transition::NotFound);
    };
    if row.status != ExpectedStatus::Pending {
        return Ok(Transition::NotPending);
    }

    mutate(row).update(conn).await?;
    Ok(Transition::Applied)
}

async fn rollback_quietly(txn: DatabaseTransaction, op: &str, id: Uuid) {
    if let Err(e) = txn.rollback().await {
        error!("Rollback after {} on {} failed: {}", op, id, e);
    }
}
