use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};
use tracing::instrument;

use super::locked_row;
use crate::entity;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{StockLevels, now};
use crate::repository::StockLedger;

/// Postgres implementation of StockLedger
#[derive(Debug, Clone)]
pub struct PgStockLedger {
    db: DatabaseConnection,
}

impl PgStockLedger {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StockLedger for PgStockLedger {
    #[instrument(skip(self))]
    async fn adjust_stock(&self, product_id: i64, delta: i32) -> CatalogResult<i32> {
        let txn = self.db.begin().await?;

        let row = locked_row(product_id)
            .one(&txn)
            .await?
            .ok_or(CatalogError::NotFound(product_id))?;

        if delta == 0 {
            txn.commit().await?;
            return Ok(row.stock);
        }

        let current = StockLevels {
            stock: row.stock,
            sales_count: row.sales_count,
        };
        let next = match current.apply(product_id, delta) {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!(product_id, delta, error = %e, "Rejected stock adjustment");
                txn.rollback().await?;
                return Err(e);
            }
        };

        let at: DateTimeWithTimeZone = now().into();
        entity::Entity::update_many()
            .col_expr(entity::Column::Stock, Expr::value(next.stock))
            .col_expr(entity::Column::SalesCount, Expr::value(next.sales_count))
            .col_expr(entity::Column::UpdatedAt, Expr::value(at))
            .filter(entity::Column::Id.eq(product_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        tracing::info!(product_id, delta, stock = next.stock, "Adjusted stock");
        Ok(next.stock)
    }
}
