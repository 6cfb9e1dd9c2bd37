//! Shared fixtures for the engine tests: an in-memory sqlite database
//! with migrations applied, plus seeded users, accounts and templates.

use chrono::{NaiveDate, Utc};
use migration::{Migrator, MigratorTrait};
use model::entities::expected_transaction::{self, ExpectedStatus};
use model::entities::recurring_transaction_template::{self, Frequency, TransactionType};
use model::entities::{account, user};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set};
use uuid::Uuid;

pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    db.execute_unprepared("PRAGMA foreign_keys = ON;")
        .await
        .expect("Failed to enable foreign keys");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

pub async fn insert_user(db: &DatabaseConnection, username: &str) -> i32 {
    user::ActiveModel {
        username: Set(username.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert user")
    .id
}

pub async fn insert_account(db: &DatabaseConnection, owner_id: i32, name: &str) -> i32 {
    account::ActiveModel {
        name: Set(name.to_string()),
        description: Set(None),
        currency_code: Set("USD".to_string()),
        owner_id: Set(owner_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert account")
    .id
}

/// Template parameters with reasonable defaults; tests override what
/// matters to them.
pub struct TemplateFixture {
    pub user_id: i32,
    pub account_id: i32,
    pub name: String,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub category: Option<String>,
    pub frequency: Frequency,
    pub custom_interval_days: Option<i32>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Defaults to `start_date` when None.
    pub next_execution_date: Option<NaiveDate>,
    pub is_active: bool,
    pub auto_generate: bool,
    pub days_in_advance: i32,
}

impl Default for TemplateFixture {
    fn default() -> Self {
        Self {
            user_id: 0,
            account_id: 0,
            name: "Template".to_string(),
            amount: Decimal::new(10000, 2),
            transaction_type: TransactionType::Expense,
            category: None,
            frequency: Frequency::Monthly,
            custom_interval_days: None,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: None,
            next_execution_date: None,
            is_active: true,
            auto_generate: true,
            days_in_advance: 30,
        }
    }
}

pub async fn insert_template(
    db: &DatabaseConnection,
    fixture: TemplateFixture,
) -> recurring_transaction_template::Model {
    recurring_transaction_template::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(fixture.user_id),
        account_id: Set(fixture.account_id),
        name: Set(fixture.name),
        description: Set(None),
        amount: Set(fixture.amount),
        transaction_type: Set(fixture.transaction_type),
        category: Set(fixture.category),
        frequency: Set(fixture.frequency),
        custom_interval_days: Set(fixture.custom_interval_days),
        start_date: Set(fixture.start_date),
        end_date: Set(fixture.end_date),
        next_execution_date: Set(fixture.next_execution_date.unwrap_or(fixture.start_date)),
        is_active: Set(fixture.is_active),
        auto_generate: Set(fixture.auto_generate),
        days_in_advance: Set(fixture.days_in_advance),
    }
    .insert(db)
    .await
    .expect("Failed to insert template")
}

/// Inserts a Pending expected transaction directly, bypassing the
/// generator, for lifecycle and forecast tests.
pub async fn insert_pending_row(
    db: &DatabaseConnection,
    user_id: i32,
    account_id: i32,
    template_id: Uuid,
    expected_date: NaiveDate,
    amount: Decimal,
    transaction_type: TransactionType,
    category: Option<&str>,
) -> expected_transaction::Model {
    expected_transaction::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        account_id: Set(account_id),
        template_id: Set(template_id),
        expected_date: Set(expected_date),
        expected_amount: Set(amount),
        original_amount: Set(None),
        description: Set(None),
        transaction_type: Set(transaction_type),
        category: Set(category.map(str::to_string)),
        status: Set(ExpectedStatus::Pending),
        is_adjusted: Set(false),
        adjustment_reason: Set(None),
        actual_transaction_id: Set(None),
        generated_at: Set(Utc::now().naive_utc()),
        processed_at: Set(None),
        updated_at: Set(None),
    }
    .insert(db)
    .await
    .expect("Failed to insert expected transaction")
}
