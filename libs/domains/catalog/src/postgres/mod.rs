//! Postgres backend built on sea-orm.
//!
//! Every component holds a clone of the same `DatabaseConnection` pool.
//! Writers that must not race each other (update and stock adjustments)
//! select the row with `FOR UPDATE` inside a transaction; the lock is
//! released on commit, on explicit rollback, or when the transaction is
//! dropped.

mod ledger;
mod query;
mod store;

pub use ledger::PgStockLedger;
pub use query::PgCatalogQuery;
pub use store::PgProductStore;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Select};

use crate::entity;

/// Live row selected with an exclusive row lock
pub(crate) fn locked_row(id: i64) -> Select<entity::Entity> {
    entity::Entity::find_by_id(id)
        .filter(entity::Column::DeletedAt.is_null())
        .lock_exclusive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn test_locked_row_selects_for_update() {
        let sql = locked_row(42).build(DbBackend::Postgres).to_string();

        assert!(sql.contains(r#""products"."id" = 42"#), "{sql}");
        assert!(sql.contains(r#""products"."deleted_at" IS NULL"#), "{sql}");
        assert!(sql.ends_with("FOR UPDATE"), "{sql}");
    }
}
