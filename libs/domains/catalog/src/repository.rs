use async_trait::async_trait;

use crate::error::CatalogResult;
use crate::models::{ListQuery, Product, ProductDraft, ProductPage};

/// Owner of the canonical product record
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Persist a new product and return its assigned id
    async fn create(&self, draft: ProductDraft) -> CatalogResult<i64>;

    /// Fetch a live product, `NotFound` if missing or soft-deleted
    async fn get_by_id(&self, id: i64) -> CatalogResult<Product>;

    /// Replace the editable fields of a live product under its row lock.
    ///
    /// `stock` and `sales_count` on the input are ignored; the stored values
    /// are kept and returned.
    async fn update(&self, product: &Product) -> CatalogResult<Product>;

    /// Mark a live product as deleted
    async fn soft_delete(&self, id: i64) -> CatalogResult<()>;
}

/// Lock-guarded stock adjustments
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Apply `delta` to the stock of `product_id` and return the new stock.
    ///
    /// Negative deltas also add `-delta` to the sales counter. Fails with
    /// `InsufficientStock` without writing anything when stock would go
    /// below zero.
    async fn adjust_stock(&self, product_id: i64, delta: i32) -> CatalogResult<i32>;
}

/// Filtered, sorted and paginated reads over live products
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogQuery: Send + Sync {
    /// One page of matching products plus the total match count
    async fn list(&self, query: &ListQuery) -> CatalogResult<ProductPage>;

    /// Distinct non-empty categories of live products, sorted
    async fn categories(&self) -> CatalogResult<Vec<String>>;
}
