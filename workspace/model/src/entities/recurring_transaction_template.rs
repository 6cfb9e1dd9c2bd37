use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::account;


/// How often a template produces an occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(15))")]
pub enum Frequency {
    #[sea_orm(string_value = "Daily")]
    Daily,
    #[sea_orm(string_value = "Weekly")]
    Weekly,
    #[sea_orm(string_value = "Biweekly")]
    Biweekly,
    #[sea_orm(string_value = "Monthly")]
    Monthly,
    #[sea_orm(string_value = "Quarterly")]
    Quarterly,
    #[sea_orm(string_value = "SemiAnnually")]
    SemiAnnually,
    #[sea_orm(string_value = "Annually")]
    Annually,
    /// Every `custom_interval_days` days.
    #[sea_orm(string_value = "Custom")]
    Custom,
}

/// Whether a transaction adds money to the account or removes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum TransactionType {
    #[sea_orm(string_value = "Income")]
    Income,
    #[sea_orm(string_value = "Expense")]
    Expense,
}

/// A recurrence rule such as "pay $1500 rent every month".
///
/// The generator materializes the rule into `expected_transaction` rows
/// and advances `next_execution_date` as it goes; nothing else moves
/// that pointer.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recurring_transaction_templates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owner of the template; always passed explicitly, never ambient.
    pub user_id: i32,
    /// The account the expected transactions will hit.
    pub account_id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Amount of each occurrence, always positive; the sign comes from
    /// `transaction_type`.
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub category: Option<String>,
    pub frequency: Frequency,
    /// Interval in days, used only when `frequency` is `Custom`.
    pub custom_interval_days: Option<i32>,
    /// The date of the first occurrence.
    pub start_date: NaiveDate,
    /// The date of the last occurrence. If null, it repeats indefinitely.
    pub end_date: Option<NaiveDate>,
    /// The earliest occurrence not yet materialized. Starts at
    /// `start_date`, only ever moves forward.
    pub next_execution_date: NaiveDate,
    /// Inactive templates are skipped by batch generation.
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
    /// Templates with `auto_generate = false` are never materialized by
    /// the generator.
    #[sea_orm(default_value = "true")]
    pub auto_generate: bool,
    /// Generation horizon in days.
    pub days_in_advance: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "account::Entity",
        from = "Column::AccountId",
        to = "account::Column::Id",
        on_delete = "Cascade"
    )]
    Account,
    #[sea_orm(has_many = "super::expected_transaction::Entity")]
    ExpectedTransaction,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::expected_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpectedTransaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
