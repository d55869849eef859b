//! Catalog Domain
//!
//! Persistence core of the product catalog: the canonical product record,
//! a lock-guarded stock ledger that never oversells, and filtered/sorted/paginated
//! listings.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              CatalogService                  │  ← request/response boundary, id checks
//! └──────┬──────────────────┬─────────────┬──────┘
//!        │                  │             │
//! ┌──────▼───────┐  ┌───────▼─────┐  ┌────▼─────────┐
//! │ ProductStore │  │ StockLedger │  │ CatalogQuery │  ← traits (repository)
//! └──────┬───────┘  └───────┬─────┘  └────┬─────────┘
//!        │                  │             │
//! ┌──────▼──────────────────▼─────────────▼──────┐
//! │   postgres (sea-orm)  |  memory (tests/dev)  │  ← shared storage handle
//! └──────┬───────────────────────────────────────┘
//!        │
//! ┌──────▼──────┐
//! │    codec    │  ← gallery / attributes ⇄ text columns
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_catalog::{PgCatalogService, UpdateStockRequest};
//!
//! # async fn run(db: sea_orm::DatabaseConnection) -> domain_catalog::CatalogResult<()> {
//! let service = PgCatalogService::postgres(db);
//!
//! let resp = service
//!     .update_stock(UpdateStockRequest { product_id: 1, quantity: -2 })
//!     .await?;
//! println!("{} left", resp.current_stock);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod dto;
pub mod entity;
pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use dto::{
    CreateProductRequest, CreateProductResponse, DeleteProductResponse, GetCategoriesResponse,
    ListProductsRequest, ListProductsResponse, UpdateProductRequest, UpdateProductResponse,
    UpdateStockRequest, UpdateStockResponse,
};
pub use error::{CatalogError, CatalogResult};
pub use memory::{
    InMemoryCatalogQuery, InMemoryProductStore, InMemoryStockLedger, InMemoryStorage,
};
pub use models::{ListQuery, Product, ProductDraft, ProductPage, RecordState, SortBy};
pub use postgres::{PgCatalogQuery, PgProductStore, PgStockLedger};
pub use repository::{CatalogQuery, ProductStore, StockLedger};
pub use service::{CatalogService, InMemoryCatalogService, PgCatalogService};
