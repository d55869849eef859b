use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::models::{DEFAULT_RATING, Product, ProductDraft};

/// Sea-ORM Entity for the products table
///
/// `gallery` and `attributes` hold codec-encoded text; everything else maps
/// one-to-one onto [`Product`].
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price: i64,
    pub stock: i32,
    pub image_url: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub gallery: Option<String>,
    pub category: String,
    pub is_on_sale: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub attributes: Option<String>,
    pub rating: f32,
    pub sales_count: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Persisted shape of a freshly created product. The id is left at 0 for
    /// the backend to assign.
    pub fn from_draft(draft: ProductDraft, at: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            stock: draft.stock,
            image_url: draft.image_url,
            gallery: Some(codec::encode_list(&draft.gallery)),
            category: draft.category,
            is_on_sale: draft.is_on_sale,
            attributes: Some(codec::encode_map(&draft.attributes)),
            rating: DEFAULT_RATING,
            sales_count: 0,
            created_at: at.into(),
            updated_at: at.into(),
            deleted_at: None,
        }
    }

    /// Overwrite the caller-editable fields from `product`.
    ///
    /// `id`, `created_at`, `stock` and `sales_count` keep their stored values;
    /// stock only moves through the ledger.
    pub fn apply_update(&mut self, product: &Product, at: DateTime<Utc>) {
        self.name = product.name.clone();
        self.description = product.description.clone();
        self.price = product.price;
        self.image_url = product.image_url.clone();
        self.gallery = Some(codec::encode_list(&product.gallery));
        self.category = product.category.clone();
        self.is_on_sale = product.is_on_sale;
        self.attributes = Some(codec::encode_map(&product.attributes));
        self.rating = product.rating;
        self.updated_at = at.into();
    }

    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Active model for an INSERT; the identity column is left to the database
    pub fn into_insert(self) -> ActiveModel {
        ActiveModel {
            id: NotSet,
            name: Set(self.name),
            description: Set(self.description),
            price: Set(self.price),
            stock: Set(self.stock),
            image_url: Set(self.image_url),
            gallery: Set(self.gallery),
            category: Set(self.category),
            is_on_sale: Set(self.is_on_sale),
            attributes: Set(self.attributes),
            rating: Set(self.rating),
            sales_count: Set(self.sales_count),
            created_at: Set(self.created_at),
            updated_at: Set(self.updated_at),
            deleted_at: Set(self.deleted_at),
        }
    }

    /// Active model for an UPDATE of the caller-editable columns
    pub fn into_edit(self) -> ActiveModel {
        ActiveModel {
            id: Unchanged(self.id),
            name: Set(self.name),
            description: Set(self.description),
            price: Set(self.price),
            stock: NotSet,
            image_url: Set(self.image_url),
            gallery: Set(self.gallery),
            category: Set(self.category),
            is_on_sale: Set(self.is_on_sale),
            attributes: Set(self.attributes),
            rating: Set(self.rating),
            sales_count: NotSet,
            created_at: NotSet,
            updated_at: Set(self.updated_at),
            deleted_at: NotSet,
        }
    }
}

// Conversion from Sea-ORM Model to domain Product
impl From<Model> for Product {
    fn from(model: Model) -> Self {
        Self {
            gallery: codec::decode_list(model.gallery.as_deref()),
            attributes: codec::decode_map(model.attributes.as_deref()),
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            stock: model.stock,
            image_url: model.image_url,
            category: model.category,
            is_on_sale: model.is_on_sale,
            rating: model.rating,
            sales_count: model.sales_count,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
            deleted_at: model.deleted_at.map(Into::into),
        }
    }
}
