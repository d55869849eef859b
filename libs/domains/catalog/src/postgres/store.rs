use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait,
};
use tracing::instrument;

use super::locked_row;
use crate::entity;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{Product, ProductDraft, now};
use crate::repository::ProductStore;

/// Postgres implementation of ProductStore
#[derive(Debug, Clone)]
pub struct PgProductStore {
    db: DatabaseConnection,
}

impl PgProductStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    async fn create(&self, draft: ProductDraft) -> CatalogResult<i64> {
        draft.check()?;

        let model = entity::Model::from_draft(draft, now())
            .into_insert()
            .insert(&self.db)
            .await
            .map_err(|e| CatalogError::Internal(format!("Database error: {}", e)))?;

        tracing::info!(product_id = model.id, "Created product");
        Ok(model.id)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: i64) -> CatalogResult<Product> {
        let model = entity::Entity::find_by_id(id)
            .filter(entity::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(CatalogError::NotFound(id))?;

        Ok(model.into())
    }

    #[instrument(skip(self, product), fields(product_id = product.id))]
    async fn update(&self, product: &Product) -> CatalogResult<Product> {
        product.validate_mutable_fields()?;

        let txn = self.db.begin().await?;

        let mut row = locked_row(product.id)
            .one(&txn)
            .await?
            .ok_or(CatalogError::NotFound(product.id))?;
        row.apply_update(product, now());

        let updated = row.into_edit().update(&txn).await?;
        txn.commit().await?;

        tracing::info!(product_id = product.id, "Updated product");
        Ok(updated.into())
    }

    #[instrument(skip(self))]
    async fn soft_delete(&self, id: i64) -> CatalogResult<()> {
        let at: DateTimeWithTimeZone = now().into();

        let result = entity::Entity::update_many()
            .col_expr(entity::Column::DeletedAt, Expr::value(at))
            .col_expr(entity::Column::UpdatedAt, Expr::value(at))
            .filter(entity::Column::Id.eq(id))
            .filter(entity::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(CatalogError::NotFound(id));
        }

        tracing::info!(product_id = id, "Soft-deleted product");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn test_get_missing_row_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();

        let store = PgProductStore::new(db);
        assert!(matches!(
            store.get_by_id(5).await,
            Err(CatalogError::NotFound(5))
        ));
    }

    #[tokio::test]
    async fn test_soft_delete_without_live_row_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let store = PgProductStore::new(db);
        assert!(matches!(
            store.soft_delete(5).await,
            Err(CatalogError::NotFound(5))
        ));
    }

    #[tokio::test]
    async fn test_create_validates_before_touching_the_database() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let store = PgProductStore::new(db);
        let result = store.create(ProductDraft::new("", 100, 1)).await;
        assert!(matches!(result, Err(CatalogError::InvalidArgument(_))));
    }
}
