use model::entities::prelude::*;
use sea_orm::entity::prelude::*;
use sea_orm::Iden;

/// Bridges entity definitions into migration identifiers so table and
/// column names are declared in exactly one place (the entity).
pub trait EntityIden: EntityTrait {
    /// Table identifier taken from the entity's `table_name`.
    fn table() -> IdenName {
        IdenName(Self::default().table_name().to_string())
    }

    /// Column identifier rendered from an entity column variant.
    fn column<C: ColumnTrait + Iden>(column: C) -> IdenName {
        let mut name = String::new();
        column.unquoted(&mut name);
        IdenName(name)
    }
}

impl EntityIden for User {}
impl EntityIden for Account {}
impl EntityIden for RecurringTransactionTemplate {}
impl EntityIden for ExpectedTransaction {}

/// An identifier resolved from an entity, usable wherever the schema
/// builder expects an `Iden`.
#[derive(Debug, Clone)]
pub struct IdenName(String);

impl Iden for IdenName {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        let _ = s.write_str(&self.0);
    }
}
