use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::recurring_transaction_template;
use super::recurring_transaction_template::TransactionType;

/// Lifecycle state of a single expected transaction.
///
/// `Confirmed` and `Cancelled` are terminal; only `Pending` rows can be
/// confirmed, cancelled or adjusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(15))")]
pub enum ExpectedStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Confirmed")]
    Confirmed,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

/// One forecasted occurrence materialized from a template, e.g. "June
/// rent". Created only by the generator; at most one row exists per
/// `(template_id, expected_date)` pair.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expected_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: i32,
    pub account_id: i32,
    /// The template that generated this row.
    pub template_id: Uuid,
    pub expected_date: NaiveDate,
    /// The latest expected amount; reflects adjustments.
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub expected_amount: Decimal,
    /// Snapshot of the pre-adjustment amount. Set the first time the row
    /// is adjusted and never overwritten afterwards.
    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub original_amount: Option<Decimal>,
    pub description: Option<String>,
    pub transaction_type: TransactionType,
    pub category: Option<String>,
    pub status: ExpectedStatus,
    pub is_adjusted: bool,
    /// Reason given on cancel or adjust.
    pub adjustment_reason: Option<String>,
    /// The real transaction that fulfilled this expectation, set on confirm.
    pub actual_transaction_id: Option<Uuid>,
    pub generated_at: NaiveDateTime,
    /// Set when the row reaches a terminal state.
    pub processed_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each expected transaction belongs to exactly one template.
    #[sea_orm(
        belongs_to = "recurring_transaction_template::Entity",
        from = "Column::TemplateId",
        to = "recurring_transaction_template::Column::Id",
        on_delete = "Cascade"
    )]
    Template,
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id"
    )]
    Account,
}

impl Related<recurring_transaction_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Template.def()
    }
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
