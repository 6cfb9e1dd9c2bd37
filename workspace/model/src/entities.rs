//! This file serves as the root for all SeaORM entity modules.
//! We define the data models for the recurring-transaction planning
//! backend here: users and accounts as supporting entities, plus the
//! recurrence templates and the expected transactions they generate.

pub mod account;
pub mod expected_transaction;
pub mod recurring_transaction_template;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::account::Entity as Account;
    pub use super::expected_transaction::Entity as ExpectedTransaction;
    pub use super::recurring_transaction_template::Entity as RecurringTransactionTemplate;
    pub use super::user::Entity as User;
}

#[cfg(test)]
mod test {
    use chrono::{NaiveDate, Utc};
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, ModelTrait, QueryFilter, Set,
    };
    use uuid::Uuid;

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let user1 = user::ActiveModel {
            username: Set("user1".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let account1 = account::ActiveModel {
            name: Set("Checking".to_string()),
            description: Set(Some("Main checking account".to_string())),
            currency_code: Set("USD".to_string()),
            owner_id: Set(user1.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let template = recurring_transaction_template::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user1.id),
            account_id: Set(account1.id),
            name: Set("Rent payment".to_string()),
            description: Set(Some("Monthly rent".to_string())),
            amount: Set(Decimal::new(150000, 2)), // 1500.00
            transaction_type: Set(recurring_transaction_template::TransactionType::Expense),
            category: Set(Some("Housing".to_string())),
            frequency: Set(recurring_transaction_template::Frequency::Monthly),
            custom_interval_days: Set(None),
            start_date: Set(start),
            end_date: Set(None),
            next_execution_date: Set(start),
            is_active: Set(true),
            auto_generate: Set(true),
            days_in_advance: Set(30),
        }
        .insert(&db)
        .await?;

        let expected = expected_transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user1.id),
            account_id: Set(account1.id),
            template_id: Set(template.id),
            expected_date: Set(start),
            expected_amount: Set(Decimal::new(150000, 2)),
            original_amount: Set(None),
            description: Set(Some("Monthly rent".to_string())),
            transaction_type: Set(recurring_transaction_template::TransactionType::Expense),
            category: Set(Some("Housing".to_string())),
            status: Set(expected_transaction::ExpectedStatus::Pending),
            is_adjusted: Set(false),
            adjustment_reason: Set(None),
            actual_transaction_id: Set(None),
            generated_at: Set(Utc::now().naive_utc()),
            processed_at: Set(None),
            updated_at: Set(None),
        }
        .insert(&db)
        .await?;

        // Read back and verify data
        let users = User::find().all(&db).await?;
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "user1");

        let accounts = Account::find().all(&db).await?;
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].name, "Checking");

        let templates = RecurringTransactionTemplate::find().all(&db).await?;
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name, "Rent payment");
        assert_eq!(templates[0].next_execution_date, start);

        let rows = ExpectedTransaction::find()
            .filter(expected_transaction::Column::TemplateId.eq(template.id))
            .all(&db)
            .await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, expected.id);
        assert_eq!(rows[0].expected_amount, Decimal::new(150000, 2));

        // Walk the relations in both directions.
        let owner = template.find_related(User).one(&db).await?.unwrap();
        assert_eq!(owner.id, user1.id);

        let target = template.find_related(Account).one(&db).await?.unwrap();
        assert_eq!(target.id, account1.id);

        let source = expected
            .find_related(RecurringTransactionTemplate)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(source.id, template.id);

        let hit_account = expected.find_related(Account).one(&db).await?.unwrap();
        assert_eq!(hit_account.id, account1.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_amount_keeps_four_decimal_places() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let user = user::ActiveModel {
            username: Set("precise".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let account = account::ActiveModel {
            name: Set("Checking".to_string()),
            description: Set(None),
            currency_code: Set("USD".to_string()),
            owner_id: Set(user.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Uses all four fractional digits of the amount columns.
        let amount = Decimal::new(12_345_678, 4);
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let template = recurring_transaction_template::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.id),
            account_id: Set(account.id),
            name: Set("Big".to_string()),
            description: Set(None),
            amount: Set(amount),
            transaction_type: Set(recurring_transaction_template::TransactionType::Expense),
            category: Set(None),
            frequency: Set(recurring_transaction_template::Frequency::Monthly),
            custom_interval_days: Set(None),
            start_date: Set(start),
            end_date: Set(None),
            next_execution_date: Set(start),
            is_active: Set(true),
            auto_generate: Set(true),
            days_in_advance: Set(30),
        }
        .insert(&db)
        .await?;

        let reloaded = RecurringTransactionTemplate::find_by_id(template.id)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(reloaded.amount, amount);

        Ok(())
    }

    #[tokio::test]
    async fn test_unique_template_date_pair() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let user = user::ActiveModel {
            username: Set("user".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let account = account::ActiveModel {
            name: Set("Checking".to_string()),
            description: Set(None),
            currency_code: Set("USD".to_string()),
            owner_id: Set(user.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let template = recurring_transaction_template::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.id),
            account_id: Set(account.id),
            name: Set("Gym".to_string()),
            description: Set(None),
            amount: Set(Decimal::new(4000, 2)),
            transaction_type: Set(recurring_transaction_template::TransactionType::Expense),
            category: Set(None),
            frequency: Set(recurring_transaction_template::Frequency::Monthly),
            custom_interval_days: Set(None),
            start_date: Set(start),
            end_date: Set(None),
            next_execution_date: Set(start),
            is_active: Set(true),
            auto_generate: Set(true),
            days_in_advance: Set(30),
        }
        .insert(&db)
        .await?;

        let row = |id: Uuid| expected_transaction::ActiveModel {
            id: Set(id),
            user_id: Set(user.id),
            account_id: Set(account.id),
            template_id: Set(template.id),
            expected_date: Set(start),
            expected_amount: Set(Decimal::new(4000, 2)),
            original_amount: Set(None),
            description: Set(None),
            transaction_type: Set(recurring_transaction_template::TransactionType::Expense),
            category: Set(None),
            status: Set(expected_transaction::ExpectedStatus::Pending),
            is_adjusted: Set(false),
            adjustment_reason: Set(None),
            actual_transaction_id: Set(None),
            generated_at: Set(Utc::now().naive_utc()),
            processed_at: Set(None),
            updated_at: Set(None),
        };

        row(Uuid::new_v4()).insert(&db).await?;

        // Second row for the same (template, date) pair must hit the
        // unique index.
        let duplicate = row(Uuid::new_v4()).insert(&db).await;
        assert!(duplicate.is_err());

        Ok(())
    }
}
