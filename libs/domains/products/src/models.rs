use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Custom validator rejecting blank (empty or whitespace-only) strings
fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

/// Custom validator for prices since `range` does not support Decimal
fn validate_price_value(price: &Decimal) -> Result<(), validator::ValidationError> {
    if *price < Decimal::ZERO {
        return Err(validator::ValidationError::new("negative_price"));
    }
    Ok(())
}

/// Sortable product fields for paginated listing
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortField {
    #[default]
    Id,
    Name,
    Description,
    Stock,
    Price,
}

/// Sort direction for paginated listing
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Product entity - represents a catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Unique identifier, assigned by the store on creation
    pub id: i64,
    /// Product name
    pub name: String,
    /// Product description
    pub description: String,
    /// Current stock quantity
    pub stock: i32,
    /// Unit price (exact decimal, serialized as a string)
    pub price: Decimal,
}

/// DTO for creating a new product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 255), custom(function = validate_not_blank))]
    pub name: String,
    #[validate(length(min = 1, max = 1000), custom(function = validate_not_blank))]
    pub description: String,
    #[validate(range(min = 0))]
    pub stock: i32,
    #[validate(custom(function = validate_price_value))]
    pub price: Decimal,
}

/// DTO for replacing an existing product
///
/// Updates are wholesale replacements: every field is required and overwrites
/// the stored value.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 255), custom(function = validate_not_blank))]
    pub name: String,
    #[validate(length(min = 1, max = 1000), custom(function = validate_not_blank))]
    pub description: String,
    #[validate(range(min = 0))]
    pub stock: i32,
    #[validate(custom(function = validate_price_value))]
    pub price: Decimal,
}

/// Pagination and sorting parameters for listing products
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct PageRequest {
    /// Zero-based page index
    #[serde(default)]
    pub page: u64,
    /// Page size, minimum 1
    #[serde(default = "default_size")]
    pub size: u64,
    /// Field to sort by
    #[serde(default)]
    pub sort: SortField,
    /// Sort direction
    #[serde(default)]
    pub direction: SortDirection,
}

fn default_size() -> u64 {
    10
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: default_size(),
            sort: SortField::default(),
            direction: SortDirection::default(),
        }
    }
}

/// One page of results plus pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Zero-based page index
    pub page: u64,
    /// Requested page size
    pub size: u64,
    /// Total number of items across all pages
    pub total_items: u64,
    /// Total number of pages
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Build a page, deriving `total_pages` from the item total and page size
    pub fn new(items: Vec<T>, page: u64, size: u64, total_items: u64) -> Self {
        let total_pages = if size == 0 {
            0
        } else {
            total_items.div_ceil(size)
        };
        Self {
            items,
            page,
            size,
            total_items,
            total_pages,
        }
    }
}

impl Product {
    /// Build a product from a store-assigned id and a create request
    pub fn new(id: i64, input: CreateProduct) -> Self {
        Self {
            id,
            name: input.name,
            description: input.description,
            stock: input.stock,
            price: input.price,
        }
    }

    /// Replace all mutable fields from an update request
    pub fn apply_update(&mut self, update: UpdateProduct) {
        self.name = update.name;
        self.description = update.description;
        self.stock = update.stock;
        self.price = update.price;
    }
}
