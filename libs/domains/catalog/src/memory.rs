//! In-process backend for the catalog components.
//!
//! Rows are kept in their persisted shape ([`entity::Model`], with encoded
//! gallery and attributes) and each row sits behind its own async mutex,
//! which plays the role of the database row lock.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::entity;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{ListQuery, Product, ProductDraft, ProductPage, SortBy, StockLevels, now};
use crate::repository::{CatalogQuery, ProductStore, StockLedger};

type Row = Arc<Mutex<entity::Model>>;

/// Shared storage handle for the in-memory components
#[derive(Debug, Default, Clone)]
pub struct InMemoryStorage {
    rows: Arc<RwLock<BTreeMap<i64, Row>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    async fn insert(&self, mut model: entity::Model) -> i64 {
        let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        model.id = id;
        self.rows.write().await.insert(id, Arc::new(Mutex::new(model)));
        id
    }

    /// Look up a row handle; the map lock is released before the caller
    /// locks the row itself.
    async fn row(&self, id: i64) -> Option<Row> {
        self.rows.read().await.get(&id).cloned()
    }

    async fn snapshot(&self) -> Vec<entity::Model> {
        let handles: Vec<Row> = self.rows.read().await.values().cloned().collect();

        let mut models = Vec::with_capacity(handles.len());
        for handle in handles {
            models.push(handle.lock().await.clone());
        }
        models
    }
}

/// In-memory implementation of ProductStore (for development/testing)
#[derive(Debug, Clone)]
pub struct InMemoryProductStore {
    storage: InMemoryStorage,
}

impl InMemoryProductStore {
    pub fn new(storage: InMemoryStorage) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn create(&self, draft: ProductDraft) -> CatalogResult<i64> {
        draft.check()?;

        let id = self
            .storage
            .insert(entity::Model::from_draft(draft, now()))
            .await;

        tracing::info!(product_id = id, "Created product");
        Ok(id)
    }

    async fn get_by_id(&self, id: i64) -> CatalogResult<Product> {
        let row = self.storage.row(id).await.ok_or(CatalogError::NotFound(id))?;
        let model = row.lock().await.clone();

        if !model.is_live() {
            return Err(CatalogError::NotFound(id));
        }
        Ok(model.into())
    }

    async fn update(&self, product: &Product) -> CatalogResult<Product> {
        product.validate_mutable_fields()?;

        let row = self
            .storage
            .row(product.id)
            .await
            .ok_or(CatalogError::NotFound(product.id))?;
        let mut model = row.lock().await;

        if !model.is_live() {
            return Err(CatalogError::NotFound(product.id));
        }
        model.apply_update(product, now());

        tracing::info!(product_id = product.id, "Updated product");
        Ok(model.clone().into())
    }

    async fn soft_delete(&self, id: i64) -> CatalogResult<()> {
        let row = self.storage.row(id).await.ok_or(CatalogError::NotFound(id))?;
        let mut model = row.lock().await;

        if !model.is_live() {
            return Err(CatalogError::NotFound(id));
        }
        let at = now();
        model.deleted_at = Some(at.into());
        model.updated_at = at.into();

        tracing::info!(product_id = id, "Soft-deleted product");
        Ok(())
    }
}

/// In-memory implementation of StockLedger
#[derive(Debug, Clone)]
pub struct InMemoryStockLedger {
    storage: InMemoryStorage,
}

impl InMemoryStockLedger {
    pub fn new(storage: InMemoryStorage) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl StockLedger for InMemoryStockLedger {
    async fn adjust_stock(&self, product_id: i64, delta: i32) -> CatalogResult<i32> {
        let row = self
            .storage
            .row(product_id)
            .await
            .ok_or(CatalogError::NotFound(product_id))?;
        let mut model = row.lock().await;

        if !model.is_live() {
            return Err(CatalogError::NotFound(product_id));
        }
        if delta == 0 {
            return Ok(model.stock);
        }

        let current = StockLevels {
            stock: model.stock,
            sales_count: model.sales_count,
        };
        let next = current.apply(product_id, delta).inspect_err(|e| {
            tracing::warn!(product_id, delta, error = %e, "Rejected stock adjustment");
        })?;

        model.stock = next.stock;
        model.sales_count = next.sales_count;
        model.updated_at = now().into();

        tracing::info!(product_id, delta, stock = next.stock, "Adjusted stock");
        Ok(next.stock)
    }
}

/// In-memory implementation of CatalogQuery
#[derive(Debug, Clone)]
pub struct InMemoryCatalogQuery {
    storage: InMemoryStorage,
}

impl InMemoryCatalogQuery {
    pub fn new(storage: InMemoryStorage) -> Self {
        Self { storage }
    }
}

fn is_match(model: &entity::Model, query: &ListQuery, keyword: Option<&str>) -> bool {
    if !model.is_live() {
        return false;
    }
    if let Some(category) = query.category_filter() {
        if model.category != category {
            return false;
        }
    }
    if let Some(keyword) = keyword {
        if !model.name.to_lowercase().contains(keyword)
            && !model.description.to_lowercase().contains(keyword)
        {
            return false;
        }
    }
    if query.on_sale_only && !model.is_on_sale {
        return false;
    }
    if query.min_price_bound().is_some_and(|min| model.price < min) {
        return false;
    }
    if query.max_price_bound().is_some_and(|max| model.price > max) {
        return false;
    }
    true
}

fn compare(a: &entity::Model, b: &entity::Model, sort_by: SortBy) -> Ordering {
    let primary = match sort_by {
        SortBy::Id => Ordering::Equal,
        SortBy::Price => a.price.cmp(&b.price),
        SortBy::CreateTime => a.created_at.cmp(&b.created_at),
        SortBy::Sales => a.sales_count.cmp(&b.sales_count),
        SortBy::Rating => a.rating.total_cmp(&b.rating),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl CatalogQuery for InMemoryCatalogQuery {
    async fn list(&self, query: &ListQuery) -> CatalogResult<ProductPage> {
        let keyword = query.keyword_filter().map(str::to_lowercase);

        let mut matched: Vec<entity::Model> = self
            .storage
            .snapshot()
            .await
            .into_iter()
            .filter(|m| is_match(m, query, keyword.as_deref()))
            .collect();

        let total = matched.len() as u64;

        let ascending = query.is_ascending();
        matched.sort_by(|a, b| {
            let ord = compare(a, b, query.sort_by);
            if ascending { ord } else { ord.reverse() }
        });

        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.page_size()).unwrap_or(usize::MAX);
        let items = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(Product::from)
            .collect();

        Ok(ProductPage { items, total })
    }

    async fn categories(&self) -> CatalogResult<Vec<String>> {
        let categories: BTreeSet<String> = self
            .storage
            .snapshot()
            .await
            .into_iter()
            .filter(|m| m.is_live() && !m.category.is_empty())
            .map(|m| m.category)
            .collect();

        Ok(categories.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn components() -> (InMemoryProductStore, InMemoryStockLedger, InMemoryCatalogQuery) {
        let storage = InMemoryStorage::new();
        (
            InMemoryProductStore::new(storage.clone()),
            InMemoryStockLedger::new(storage.clone()),
            InMemoryCatalogQuery::new(storage),
        )
    }

    #[tokio::test]
    async fn test_ids_are_assigned_sequentially() {
        let (store, _, _) = components();
        let first = store.create(ProductDraft::new("A", 100, 1)).await.unwrap();
        let second = store.create(ProductDraft::new("B", 100, 1)).await.unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let (store, _, _) = components();
        let result = store.create(ProductDraft::new(" ", 100, 1)).await;
        assert!(matches!(result, Err(CatalogError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_get_unknown_id() {
        let (store, _, _) = components();
        assert!(matches!(
            store.get_by_id(99).await,
            Err(CatalogError::NotFound(99))
        ));
    }

    #[tokio::test]
    async fn test_update_preserves_stock_and_sales() {
        let (store, ledger, _) = components();
        let id = store.create(ProductDraft::new("Mug", 900, 10)).await.unwrap();
        ledger.adjust_stock(id, -3).await.unwrap();

        let mut product = store.get_by_id(id).await.unwrap();
        product.name = "Large mug".to_string();
        product.stock = 1000;
        product.sales_count = 0;

        let updated = store.update(&product).await.unwrap();
        assert_eq!(updated.name, "Large mug");
        assert_eq!(updated.stock, 7);
        assert_eq!(updated.sales_count, 3);
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn test_soft_delete_twice_is_not_found() {
        let (store, _, _) = components();
        let id = store.create(ProductDraft::new("Pen", 150, 4)).await.unwrap();

        store.soft_delete(id).await.unwrap();
        assert!(matches!(
            store.soft_delete(id).await,
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(
            store.get_by_id(id).await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_zero_delta_writes_nothing() {
        let (store, ledger, _) = components();
        let id = store.create(ProductDraft::new("Pen", 150, 4)).await.unwrap();
        let before = store.get_by_id(id).await.unwrap();

        assert_eq!(ledger.adjust_stock(id, 0).await.unwrap(), 4);

        let after = store.get_by_id(id).await.unwrap();
        assert_eq!(after.updated_at, before.updated_at);
        assert_eq!(after.sales_count, 0);
    }

    #[tokio::test]
    async fn test_rejected_adjustment_leaves_row_untouched() {
        let (store, ledger, _) = components();
        let id = store.create(ProductDraft::new("Pen", 150, 4)).await.unwrap();
        ledger.adjust_stock(id, -1).await.unwrap();

        let result = ledger.adjust_stock(id, -5).await;
        assert!(matches!(
            result,
            Err(CatalogError::InsufficientStock {
                available: 3,
                requested: 5,
                ..
            })
        ));

        let product = store.get_by_id(id).await.unwrap();
        assert_eq!(product.stock, 3);
        assert_eq!(product.sales_count, 1);
    }

    #[tokio::test]
    async fn test_adjusting_deleted_product_is_not_found() {
        let (store, ledger, _) = components();
        let id = store.create(ProductDraft::new("Pen", 150, 4)).await.unwrap();
        store.soft_delete(id).await.unwrap();

        assert!(matches!(
            ledger.adjust_stock(id, 5).await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_keyword_is_case_insensitive_over_name_and_description() {
        let (store, _, query) = components();
        store
            .create(ProductDraft::new("Wireless Mouse", 2500, 1))
            .await
            .unwrap();
        store
            .create(ProductDraft::new("Keyboard", 4500, 1).with_description("Works with any MOUSE pad"))
            .await
            .unwrap();
        store.create(ProductDraft::new("Monitor", 19900, 1)).await.unwrap();

        let page = query
            .list(&ListQuery {
                keyword: "mouse".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 2);
        let names: Vec<&str> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Keyboard", "Wireless Mouse"]);
    }

    #[tokio::test]
    async fn test_keyword_whitespace_is_significant() {
        let (store, _, query) = components();
        for name in ["Mouse pad", "Wireless mouse", "Keyboard"] {
            store.create(ProductDraft::new(name, 100, 1)).await.unwrap();
        }

        let page = query
            .list(&ListQuery {
                keyword: " mouse".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let names: Vec<&str> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(page.total, 1);
        assert_eq!(names, vec!["Wireless mouse"]);

        let page = query
            .list(&ListQuery {
                keyword: " ".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_update_rejects_long_image_url() {
        let (store, _, _) = components();
        let id = store.create(ProductDraft::new("Lamp", 100, 1)).await.unwrap();

        let mut product = store.get_by_id(id).await.unwrap();
        product.image_url = "x".repeat(256);
        assert!(matches!(
            store.update(&product).await,
            Err(CatalogError::InvalidArgument(_))
        ));
        assert!(store.get_by_id(id).await.unwrap().image_url.is_empty());
    }

    #[tokio::test]
    async fn test_price_bounds_are_inclusive() {
        let (store, _, query) = components();
        for price in [100, 200, 300, 400] {
            store
                .create(ProductDraft::new(format!("item-{price}"), price, 1))
                .await
                .unwrap();
        }

        let page = query
            .list(&ListQuery {
                min_price: 200,
                max_price: 300,
                sort_by: SortBy::Price,
                ascending: true,
                ..Default::default()
            })
            .await
            .unwrap();

        let prices: Vec<i64> = page.items.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![200, 300]);
    }

    #[tokio::test]
    async fn test_equal_sort_keys_break_ties_by_id() {
        let (store, _, query) = components();
        for name in ["a", "b", "c"] {
            store.create(ProductDraft::new(name, 500, 1)).await.unwrap();
        }

        let ascending = query
            .list(&ListQuery {
                sort_by: SortBy::Price,
                ascending: true,
                ..Default::default()
            })
            .await
            .unwrap();
        let ids: Vec<i64> = ascending.items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let descending = query
            .list(&ListQuery {
                sort_by: SortBy::Price,
                ..Default::default()
            })
            .await
            .unwrap();
        let ids: Vec<i64> = descending.items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_categories_are_distinct_and_sorted() {
        let (store, _, query) = components();
        store
            .create(ProductDraft::new("a", 1, 1).with_category("toys"))
            .await
            .unwrap();
        store
            .create(ProductDraft::new("b", 1, 1).with_category("books"))
            .await
            .unwrap();
        store
            .create(ProductDraft::new("c", 1, 1).with_category("toys"))
            .await
            .unwrap();
        store.create(ProductDraft::new("d", 1, 1)).await.unwrap();

        assert_eq!(query.categories().await.unwrap(), vec!["books", "toys"]);
    }
}
