use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{ListQuery, Product, ProductDraft, SortBy};

/// Request to create a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Price in minor currency units
    pub price: i64,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub gallery: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_true")]
    pub is_on_sale: bool,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

fn default_true() -> bool {
    true
}

impl From<CreateProductRequest> for ProductDraft {
    fn from(req: CreateProductRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            price: req.price,
            stock: req.stock,
            image_url: req.image_url,
            gallery: req.gallery,
            category: req.category,
            is_on_sale: req.is_on_sale,
            attributes: req.attributes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProductResponse {
    pub product_id: i64,
}

/// Full replacement of a product's editable fields.
///
/// Stock is not part of the request; it only changes through stock
/// adjustments. A missing rating keeps the stored one.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProductRequest {
    pub id: i64,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0))]
    pub price: i64,
    #[validate(length(max = 255))]
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub gallery: Vec<String>,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_true")]
    pub is_on_sale: bool,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub rating: Option<f32>,
}

impl UpdateProductRequest {
    /// Overlay the request onto the currently stored product
    pub fn apply_to(self, product: &mut Product) {
        product.name = self.name;
        product.description = self.description;
        product.price = self.price;
        product.image_url = self.image_url;
        product.gallery = self.gallery;
        product.category = self.category;
        product.is_on_sale = self.is_on_sale;
        product.attributes = self.attributes;
        if let Some(rating) = self.rating {
            product.rating = rating;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProductResponse {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteProductResponse {
    pub success: bool,
}

/// Listing request as received from callers; the sort key is free text
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListProductsRequest {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub on_sale_only: bool,
    #[serde(default)]
    pub min_price: i64,
    #[serde(default)]
    pub max_price: i64,
    #[serde(default)]
    pub sort_by: String,
    #[serde(default)]
    pub ascending: bool,
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub page_size: i64,
}

impl From<ListProductsRequest> for ListQuery {
    fn from(req: ListProductsRequest) -> Self {
        Self {
            sort_by: SortBy::parse_or_default(&req.sort_by),
            category: req.category,
            keyword: req.keyword,
            on_sale_only: req.on_sale_only,
            min_price: req.min_price,
            max_price: req.max_price,
            ascending: req.ascending,
            page: req.page,
            page_size: req.page_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListProductsResponse {
    pub items: Vec<Product>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCategoriesResponse {
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStockRequest {
    pub product_id: i64,
    /// Signed change: negative consumes, positive restocks
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStockResponse {
    pub success: bool,
    pub current_stock: i32,
}
