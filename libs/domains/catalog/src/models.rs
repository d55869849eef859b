use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use validator::{Validate, ValidationError};

use crate::error::{CatalogError, CatalogResult};

/// Default rating assigned to new products
pub const DEFAULT_RATING: f32 = 5.0;

/// Default page size for listings
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Current time at the precision Postgres `timestamptz` stores (microseconds)
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Product entity - the canonical catalog record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Storage-assigned identity
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Price in minor currency units (e.g. cents)
    pub price: i64,
    /// Units on hand, never negative
    pub stock: i32,
    pub image_url: String,
    /// Ordered image URLs
    pub gallery: Vec<String>,
    pub category: String,
    pub is_on_sale: bool,
    /// Free-form attributes
    pub attributes: BTreeMap<String, String>,
    /// Expected within [0, 5], not enforced here
    pub rating: f32,
    /// Units sold through stock-decreasing adjustments
    pub sales_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set when the product has been soft-deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Lifecycle state of a product record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    Live,
    Deleted { at: DateTime<Utc> },
}

impl Product {
    pub fn state(&self) -> RecordState {
        match self.deleted_at {
            Some(at) => RecordState::Deleted { at },
            None => RecordState::Live,
        }
    }

    pub fn is_live(&self) -> bool {
        self.state() == RecordState::Live
    }

    /// Check the fields a full-record update is allowed to write
    pub fn validate_mutable_fields(&self) -> CatalogResult<()> {
        if self.id <= 0 {
            return Err(CatalogError::InvalidArgument(format!(
                "invalid product id: {}",
                self.id
            )));
        }
        if self.name.trim().is_empty() {
            return Err(CatalogError::InvalidArgument(
                "name must not be empty".to_string(),
            ));
        }
        if self.name.chars().count() > 255 {
            return Err(CatalogError::InvalidArgument(
                "name must be at most 255 characters".to_string(),
            ));
        }
        if self.price < 0 {
            return Err(CatalogError::InvalidArgument(
                "price must not be negative".to_string(),
            ));
        }
        if self.image_url.chars().count() > 255 {
            return Err(CatalogError::InvalidArgument(
                "image_url must be at most 255 characters".to_string(),
            ));
        }
        if self.category.chars().count() > 100 {
            return Err(CatalogError::InvalidArgument(
                "category must be at most 100 characters".to_string(),
            ));
        }
        Ok(())
    }
}

/// Input for creating a product
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductDraft {
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Price in minor currency units
    #[validate(range(min = 0))]
    pub price: i64,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub stock: i32,
    #[validate(length(max = 255))]
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub gallery: Vec<String>,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_on_sale")]
    pub is_on_sale: bool,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

fn default_on_sale() -> bool {
    true
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, price: i64, stock: i32) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            price,
            stock,
            image_url: String::new(),
            gallery: Vec::new(),
            category: String::new(),
            is_on_sale: true,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Validate the draft, mapping failures to `InvalidArgument`
    pub fn check(&self) -> CatalogResult<()> {
        self.validate()?;
        Ok(())
    }
}

/// Result of applying a stock delta to a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockLevels {
    pub stock: i32,
    pub sales_count: i32,
}

impl StockLevels {
    /// Apply `delta` to these levels.
    ///
    /// A negative delta consumes stock and counts the consumed units as sales;
    /// a positive delta restocks and leaves the sales counter alone. Fails with
    /// `InsufficientStock` when a consumption exceeds what is on hand.
    pub fn apply(self, product_id: i64, delta: i32) -> CatalogResult<StockLevels> {
        let delta = i64::from(delta);
        let stock = i64::from(self.stock);

        if delta < 0 && stock < -delta {
            return Err(CatalogError::InsufficientStock {
                product_id,
                available: self.stock,
                requested: -delta,
            });
        }

        let new_stock = i32::try_from(stock + delta).map_err(|_| {
            CatalogError::InvalidArgument(format!(
                "stock adjustment of {} overflows product {}",
                delta, product_id
            ))
        })?;

        let new_sales = if delta < 0 {
            i32::try_from(i64::from(self.sales_count) - delta).map_err(|_| {
                CatalogError::InvalidArgument(format!(
                    "sales counter of product {} would overflow",
                    product_id
                ))
            })?
        } else {
            self.sales_count
        };

        Ok(StockLevels {
            stock: new_stock,
            sales_count: new_sales,
        })
    }
}

/// Sort key for catalog listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortBy {
    /// Newest id first; ignores the direction flag
    #[default]
    Id,
    Price,
    #[strum(serialize = "create_time", serialize = "createTime")]
    CreateTime,
    Sales,
    Rating,
}

impl SortBy {
    /// Parse a caller-supplied key; unknown or empty keys fall back to the default
    pub fn parse_or_default(raw: &str) -> Self {
        match SortBy::from_str(raw.trim()) {
            Ok(SortBy::Id) | Err(_) => SortBy::Id,
            Ok(other) => other,
        }
    }
}

/// Declarative listing request understood by [`crate::CatalogQuery`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Exact category match, empty means any
    #[serde(default)]
    pub category: String,
    /// Case-insensitive substring of name or description, empty means any
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub on_sale_only: bool,
    /// Inclusive lower price bound in minor units, `<= 0` means unbounded
    #[serde(default)]
    pub min_price: i64,
    /// Inclusive upper price bound in minor units, `<= 0` means unbounded
    #[serde(default)]
    pub max_price: i64,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub ascending: bool,
    /// 1-based page, `<= 0` normalizes to 1
    #[serde(default)]
    pub page: i64,
    /// `<= 0` normalizes to [`DEFAULT_PAGE_SIZE`]
    #[serde(default)]
    pub page_size: i64,
}

impl ListQuery {
    pub fn page(&self) -> u64 {
        u64::try_from(self.page).ok().filter(|p| *p > 0).unwrap_or(1)
    }

    pub fn page_size(&self) -> u64 {
        u64::try_from(self.page_size)
            .ok()
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn offset(&self) -> u64 {
        (self.page() - 1).saturating_mul(self.page_size())
    }

    pub fn min_price_bound(&self) -> Option<i64> {
        (self.min_price > 0).then_some(self.min_price)
    }

    pub fn max_price_bound(&self) -> Option<i64> {
        (self.max_price > 0).then_some(self.max_price)
    }

    pub fn category_filter(&self) -> Option<&str> {
        Some(self.category.as_str()).filter(|c| !c.is_empty())
    }

    /// The keyword as given; only the empty string disables the filter
    pub fn keyword_filter(&self) -> Option<&str> {
        Some(self.keyword.as_str()).filter(|k| !k.is_empty())
    }

    /// Whether the primary key is sorted ascending
    pub fn is_ascending(&self) -> bool {
        self.sort_by != SortBy::Id && self.ascending
    }
}

/// One page of a listing plus the pre-pagination match count
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: u64,
}

/// Number of pages needed to show `total` items
pub fn total_pages(total: u64, page_size: u64) -> u64 {
    if total == 0 || page_size == 0 {
        return 0;
    }
    (total as f64 / page_size as f64).ceil() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consumption_counts_sales() {
        let levels = StockLevels {
            stock: 10,
            sales_count: 3,
        };
        let after = levels.apply(1, -4).unwrap();
        assert_eq!(after.stock, 6);
        assert_eq!(after.sales_count, 7);
    }

    #[test]
    fn test_restock_leaves_sales_unchanged() {
        let levels = StockLevels {
            stock: 0,
            sales_count: 12,
        };
        let after = levels.apply(1, 25).unwrap();
        assert_eq!(after.stock, 25);
        assert_eq!(after.sales_count, 12);
    }

    #[test]
    fn test_consuming_everything_is_allowed() {
        let levels = StockLevels {
            stock: 6,
            sales_count: 0,
        };
        let after = levels.apply(9, -6).unwrap();
        assert_eq!(after.stock, 0);
        assert_eq!(after.sales_count, 6);
    }

    #[test]
    fn test_oversell_is_rejected() {
        let levels = StockLevels {
            stock: 4,
            sales_count: 6,
        };
        let err = levels.apply(7, -5).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::InsufficientStock {
                product_id: 7,
                available: 4,
                requested: 5
            }
        ));
    }

    #[test]
    fn test_extreme_deltas_do_not_overflow() {
        let full = StockLevels {
            stock: i32::MAX,
            sales_count: 0,
        };
        assert!(matches!(
            full.apply(1, 1),
            Err(CatalogError::InvalidArgument(_))
        ));

        let empty = StockLevels {
            stock: 0,
            sales_count: 0,
        };
        assert!(matches!(
            empty.apply(1, i32::MIN),
            Err(CatalogError::InsufficientStock { .. })
        ));

        let busy = StockLevels {
            stock: 10,
            sales_count: i32::MAX,
        };
        assert!(matches!(
            busy.apply(1, -1),
            Err(CatalogError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_sort_by_parsing() {
        assert_eq!(SortBy::parse_or_default("price"), SortBy::Price);
        assert_eq!(SortBy::parse_or_default("create_time"), SortBy::CreateTime);
        assert_eq!(SortBy::parse_or_default("createTime"), SortBy::CreateTime);
        assert_eq!(SortBy::parse_or_default("sales"), SortBy::Sales);
        assert_eq!(SortBy::parse_or_default("rating"), SortBy::Rating);
        assert_eq!(SortBy::parse_or_default(""), SortBy::Id);
        assert_eq!(SortBy::parse_or_default("popularity"), SortBy::Id);
    }

    #[test]
    fn test_pagination_normalization() {
        let query = ListQuery {
            page: 0,
            page_size: -3,
            ..Default::default()
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(query.offset(), 0);

        let query = ListQuery {
            page: 3,
            page_size: 25,
            ..Default::default()
        };
        assert_eq!(query.offset(), 50);
    }

    #[test]
    fn test_default_sort_ignores_direction() {
        let query = ListQuery {
            ascending: true,
            ..Default::default()
        };
        assert!(!query.is_ascending());

        let query = ListQuery {
            sort_by: SortBy::Price,
            ascending: true,
            ..Default::default()
        };
        assert!(query.is_ascending());
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, 2), 3);
    }

    #[test]
    fn test_draft_validation() {
        assert!(ProductDraft::new("Desk lamp", 1999, 3).check().is_ok());
        assert!(matches!(
            ProductDraft::new("", 1999, 3).check(),
            Err(CatalogError::InvalidArgument(_))
        ));
        assert!(matches!(
            ProductDraft::new("   ", 1999, 3).check(),
            Err(CatalogError::InvalidArgument(_))
        ));
        assert!(ProductDraft::new("Lamp", -1, 3).check().is_err());
        assert!(ProductDraft::new("Lamp", 1, -3).check().is_err());
    }

    #[test]
    fn test_keyword_is_used_verbatim() {
        let query = |keyword: &str| ListQuery {
            keyword: keyword.to_string(),
            ..Default::default()
        };

        assert_eq!(query("").keyword_filter(), None);
        assert_eq!(query(" mouse").keyword_filter(), Some(" mouse"));
        assert_eq!(query(" ").keyword_filter(), Some(" "));
    }

    #[test]
    fn test_update_rejects_long_image_url() {
        let mut product: Product =
            crate::entity::Model::from_draft(ProductDraft::new("Lamp", 1999, 3), now()).into();
        product.id = 4;
        assert!(product.validate_mutable_fields().is_ok());

        product.image_url = "x".repeat(256);
        assert!(matches!(
            product.validate_mutable_fields(),
            Err(CatalogError::InvalidArgument(ref msg)) if msg.contains("image_url")
        ));
    }
}
