use super::user;
use sea_orm::entity::prelude::*;

/// Represents a financial account, like a bank account, credit card, or cash wallet.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    /// ISO 4217 currency code, e.g., "USD", "EUR".
    pub currency_code: String,
    /// The user who owns this account.
    pub owner_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// An account belongs to one owner.
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::recurring_transaction_template::Entity")]
    RecurringTransactionTemplate,
    #[sea_orm(has_many = "super::expected_transaction::Entity")]
    ExpectedTransaction,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
