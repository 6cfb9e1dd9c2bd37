use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Username).unique_key())
                    .to_owned(),
            )
            .await?;

        // Create accounts table
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(pk_auto(Accounts::Id))
                    .col(string(Accounts::Name))
                    .col(string_null(Accounts::Description))
                    .col(string(Accounts::CurrencyCode))
                    .col(integer(Accounts::OwnerId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_account_owner")
                            .from(Accounts::Table, Accounts::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create recurring_transaction_templates table
        manager
            .create_table(
                Table::create()
                    .table(Templates::Table)
                    .if_not_exists()
                    .col(uuid(Templates::Id).primary_key())
                    .col(integer(Templates::UserId))
                    .col(integer(Templates::AccountId))
                    .col(string(Templates::Name))
                    .col(string_null(Templates::Description))
                    .col(decimal(Templates::Amount).decimal_len(16, 4))
                    .col(string(Templates::TransactionType).string_len(10))
                    .col(string_null(Templates::Category))
                    .col(string(Templates::Frequency).string_len(15))
                    .col(integer_null(Templates::CustomIntervalDays))
                    .col(date(Templates::StartDate))
                    .col(date_null(Templates::EndDate))
                    .col(date(Templates::NextExecutionDate))
                    .col(boolean(Templates::IsActive).default(true))
                    .col(boolean(Templates::AutoGenerate).default(true))
                    .col(integer(Templates::DaysInAdvance).default(30))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_template_user")
                            .from(Templates::Table, Templates::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_template_account")
                            .from(Templates::Table, Templates::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Templates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Name,
    Description,
    CurrencyCode,
    OwnerId,
}

#[derive(DeriveIden)]
enum Templates {
    #[sea_orm(iden = "recurring_transaction_templates")]
    Table,
    Id,
    UserId,
    AccountId,
    Name,
    Description,
    Amount,
    TransactionType,
    Category,
    Frequency,
    CustomIntervalDays,
    StartDate,
    EndDate,
    NextExecutionDate,
    IsActive,
    AutoGenerate,
    DaysInAdvance,
}
