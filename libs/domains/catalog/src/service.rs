use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::instrument;
use validator::Validate;

use crate::dto::{
    CreateProductRequest, CreateProductResponse, DeleteProductResponse, GetCategoriesResponse,
    ListProductsRequest, ListProductsResponse, UpdateProductRequest, UpdateProductResponse,
    UpdateStockRequest, UpdateStockResponse,
};
use crate::error::{CatalogError, CatalogResult};
use crate::memory::{
    InMemoryCatalogQuery, InMemoryProductStore, InMemoryStockLedger, InMemoryStorage,
};
use crate::models::{ListQuery, Product, total_pages};
use crate::postgres::{PgCatalogQuery, PgProductStore, PgStockLedger};
use crate::repository::{CatalogQuery, ProductStore, StockLedger};

/// Catalog operations exposed to the transport layer
#[derive(Clone)]
pub struct CatalogService<S, L, Q>
where
    S: ProductStore,
    L: StockLedger,
    Q: CatalogQuery,
{
    store: Arc<S>,
    ledger: Arc<L>,
    query: Arc<Q>,
}

pub type PgCatalogService = CatalogService<PgProductStore, PgStockLedger, PgCatalogQuery>;

pub type InMemoryCatalogService =
    CatalogService<InMemoryProductStore, InMemoryStockLedger, InMemoryCatalogQuery>;

impl PgCatalogService {
    pub fn postgres(db: DatabaseConnection) -> Self {
        Self::new(
            PgProductStore::new(db.clone()),
            PgStockLedger::new(db.clone()),
            PgCatalogQuery::new(db),
        )
    }
}

impl InMemoryCatalogService {
    pub fn in_memory() -> Self {
        let storage = InMemoryStorage::new();
        Self::new(
            InMemoryProductStore::new(storage.clone()),
            InMemoryStockLedger::new(storage.clone()),
            InMemoryCatalogQuery::new(storage),
        )
    }
}

fn ensure_valid_id(id: i64) -> CatalogResult<()> {
    if id <= 0 {
        return Err(CatalogError::InvalidArgument(format!(
            "invalid product id: {}",
            id
        )));
    }
    Ok(())
}

impl<S, L, Q> CatalogService<S, L, Q>
where
    S: ProductStore,
    L: StockLedger,
    Q: CatalogQuery,
{
    pub fn new(store: S, ledger: L, query: Q) -> Self {
        Self {
            store: Arc::new(store),
            ledger: Arc::new(ledger),
            query: Arc::new(query),
        }
    }

    #[instrument(skip(self, req), fields(name = %req.name))]
    pub async fn create_product(
        &self,
        req: CreateProductRequest,
    ) -> CatalogResult<CreateProductResponse> {
        let product_id = self.store.create(req.into()).await?;
        Ok(CreateProductResponse { product_id })
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i64) -> CatalogResult<Product> {
        ensure_valid_id(id)?;
        self.store.get_by_id(id).await
    }

    #[instrument(skip(self, req), fields(product_id = req.id))]
    pub async fn update_product(
        &self,
        req: UpdateProductRequest,
    ) -> CatalogResult<UpdateProductResponse> {
        ensure_valid_id(req.id)?;
        req.validate()?;

        let mut product = self.store.get_by_id(req.id).await?;
        req.apply_to(&mut product);
        self.store.update(&product).await?;

        Ok(UpdateProductResponse { success: true })
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i64) -> CatalogResult<DeleteProductResponse> {
        ensure_valid_id(id)?;
        self.store.soft_delete(id).await?;
        Ok(DeleteProductResponse { success: true })
    }

    #[instrument(skip(self, req))]
    pub async fn list_products(
        &self,
        req: ListProductsRequest,
    ) -> CatalogResult<ListProductsResponse> {
        let query = ListQuery::from(req);
        let page = self.query.list(&query).await?;

        let page_size = query.page_size();
        Ok(ListProductsResponse {
            total_pages: total_pages(page.total, page_size),
            items: page.items,
            total: page.total,
            page: query.page(),
            page_size,
        })
    }

    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> CatalogResult<GetCategoriesResponse> {
        let categories = self.query.categories().await?;
        Ok(GetCategoriesResponse { categories })
    }

    #[instrument(skip(self, req), fields(product_id = req.product_id, delta = req.quantity))]
    pub async fn update_stock(
        &self,
        req: UpdateStockRequest,
    ) -> CatalogResult<UpdateStockResponse> {
        ensure_valid_id(req.product_id)?;

        let current_stock = self
            .ledger
            .adjust_stock(req.product_id, req.quantity)
            .await?;

        Ok(UpdateStockResponse {
            success: true,
            current_stock,
        })
    }
}
