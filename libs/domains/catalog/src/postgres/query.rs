use async_trait::async_trait;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, Order};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select,
};
use tracing::instrument;

use crate::entity;
use crate::error::CatalogResult;
use crate::models::{ListQuery, Product, ProductPage, SortBy};
use crate::repository::CatalogQuery;

/// Postgres implementation of CatalogQuery
#[derive(Debug, Clone)]
pub struct PgCatalogQuery {
    db: DatabaseConnection,
}

impl PgCatalogQuery {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Escape LIKE wildcards so the keyword matches literally
fn like_pattern(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn sort_column(sort_by: SortBy) -> entity::Column {
    match sort_by {
        SortBy::Id => entity::Column::Id,
        SortBy::Price => entity::Column::Price,
        SortBy::CreateTime => entity::Column::CreatedAt,
        SortBy::Sales => entity::Column::SalesCount,
        SortBy::Rating => entity::Column::Rating,
    }
}

/// Live products matching the listing filters, unordered and unpaginated
pub(crate) fn filtered(query: &ListQuery) -> Select<entity::Entity> {
    let mut select = entity::Entity::find().filter(entity::Column::DeletedAt.is_null());

    if let Some(category) = query.category_filter() {
        select = select.filter(entity::Column::Category.eq(category));
    }

    if let Some(keyword) = query.keyword_filter() {
        let pattern = like_pattern(keyword);
        select = select.filter(
            Condition::any()
                .add(Expr::col((entity::Entity, entity::Column::Name)).ilike(pattern.clone()))
                .add(
                    Expr::col((entity::Entity, entity::Column::Description)).ilike(pattern),
                ),
        );
    }

    if query.on_sale_only {
        select = select.filter(entity::Column::IsOnSale.eq(true));
    }

    if let Some(min) = query.min_price_bound() {
        select = select.filter(entity::Column::Price.gte(min));
    }

    if let Some(max) = query.max_price_bound() {
        select = select.filter(entity::Column::Price.lte(max));
    }

    select
}

/// Apply ordering and the page window; `id` breaks ties in the same direction
pub(crate) fn ordered_page(
    select: Select<entity::Entity>,
    query: &ListQuery,
) -> Select<entity::Entity> {
    let order = if query.is_ascending() {
        Order::Asc
    } else {
        Order::Desc
    };

    let select = match query.sort_by {
        SortBy::Id => select,
        other => select.order_by(sort_column(other), order.clone()),
    };

    select
        .order_by(entity::Column::Id, order)
        .offset(query.offset())
        .limit(query.page_size())
}

#[async_trait]
impl CatalogQuery for PgCatalogQuery {
    #[instrument(skip(self))]
    async fn list(&self, query: &ListQuery) -> CatalogResult<ProductPage> {
        let select = filtered(query);

        let total = select.clone().count(&self.db).await?;

        let items = ordered_page(select, query)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Product::from)
            .collect();

        tracing::debug!(total, page = query.page(), "Listed products");
        Ok(ProductPage { items, total })
    }

    #[instrument(skip(self))]
    async fn categories(&self) -> CatalogResult<Vec<String>> {
        let categories = entity::Entity::find()
            .select_only()
            .column(entity::Column::Category)
            .distinct()
            .filter(entity::Column::DeletedAt.is_null())
            .filter(entity::Column::Category.ne(""))
            .order_by_asc(entity::Column::Category)
            .into_tuple::<String>()
            .all(&self.db)
            .await?;

        Ok(categories)
    }
}
