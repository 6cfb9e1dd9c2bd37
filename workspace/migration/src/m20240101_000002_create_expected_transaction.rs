use crate::entity_iden::EntityIden;
use model::entities::prelude::*;
use model::entities::{expected_transaction, recurring_transaction_template};
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create expected_transactions table
        manager
            .create_table(
                Table::create()
                    .table(ExpectedTransaction::table())
                    .if_not_exists()
                    .col(
                        uuid(ExpectedTransaction::column(expected_transaction::Column::Id))
                            .primary_key(),
                    )
                    .col(integer(ExpectedTransaction::column(
                        expected_transaction::Column::UserId,
                    )))
                    .col(integer(ExpectedTransaction::column(
                        expected_transaction::Column::AccountId,
                    )))
                    .col(uuid(ExpectedTransaction::column(
                        expected_transaction::Column::TemplateId,
                    )))
                    .col(date(ExpectedTransaction::column(
                        expected_transaction::Column::ExpectedDate,
                    )))
                    .col(
                        decimal(ExpectedTransaction::column(
                            expected_transaction::Column::ExpectedAmount,
                        ))
                        .decimal_len(16, 4),
                    )
                    .col(
                        decimal_null(ExpectedTransaction::column(
                            expected_transaction::Column::OriginalAmount,
                        ))
                        .decimal_len(16, 4),
                    )
                    .col(string_null(ExpectedTransaction::column(
                        expected_transaction::Column::Description,
                    )))
                    .col(
                        string(ExpectedTransaction::column(
                            expected_transaction::Column::TransactionType,
                        ))
                        .string_len(10),
                    )
                    .col(string_null(ExpectedTransaction::column(
                        expected_transaction::Column::Category,
                    )))
                    .col(
                        string(ExpectedTransaction::column(
                            expected_transaction::Column::Status,
                        ))
                        .string_len(15),
                    )
                    .col(boolean(ExpectedTransaction::column(
                        expected_transaction::Column::IsAdjusted,
                    )))
                    .col(string_null(ExpectedTransaction::column(
                        expected_transaction::Column::AdjustmentReason,
                    )))
                    .col(uuid_null(ExpectedTransaction::column(
                        expected_transaction::Column::ActualTransactionId,
                    )))
                    .col(date_time(ExpectedTransaction::column(
                        expected_transaction::Column::GeneratedAt,
                    )))
                    .col(date_time_null(ExpectedTransaction::column(
                        expected_transaction::Column::ProcessedAt,
                    )))
                    .col(date_time_null(ExpectedTransaction::column(
                        expected_transaction::Column::UpdatedAt,
                    )))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expected_transactions_template")
                            .from(
                                ExpectedTransaction::table(),
                                ExpectedTransaction::column(
                                    expected_transaction::Column::TemplateId,
                                ),
                            )
                            .to(
                                RecurringTransactionTemplate::table(),
                                RecurringTransactionTemplate::column(
                                    recurring_transaction_template::Column::Id,
                                ),
                            )
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per (template, date): generation relies on this to
        // turn a concurrent duplicate insert into a hard error instead
        // of silent double-booking.
        manager
            .create_index(
                Index::create()
                    .name("ux_expected_transactions_template_date")
                    .table(ExpectedTransaction::table())
                    .col(ExpectedTransaction::column(
                        expected_transaction::Column::TemplateId,
                    ))
                    .col(ExpectedTransaction::column(
                        expected_transaction::Column::ExpectedDate,
                    ))
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExpectedTransaction::table()).to_owned())
            .await?;

        Ok(())
    }
}
