//! Product Service - Business logic layer

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, Page, PageRequest, Product, UpdateProduct};
use crate::repository::ProductRepository;

fn validate_id(id: i64) -> ProductResult<()> {
    if id <= 0 {
        return Err(ProductError::Validation(format!(
            "Invalid product id: {}",
            id
        )));
    }
    Ok(())
}

fn validate_query_price(price: Option<Decimal>) -> ProductResult<Decimal> {
    let price =
        price.ok_or_else(|| ProductError::Validation("Price parameter is required".to_string()))?;
    if price < Decimal::ZERO {
        return Err(ProductError::Validation(format!(
            "Price must not be negative: {}",
            price
        )));
    }
    Ok(price)
}

fn validate_query_name(name: Option<String>) -> ProductResult<String> {
    match name {
        Some(name) if !name.trim().is_empty() => Ok(name),
        _ => Err(ProductError::Validation(
            "Name parameter must not be blank".to_string(),
        )),
    }
}

/// Product service providing business logic operations
///
/// The service layer handles validation, business rules, and orchestrates
/// repository operations.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    /// Create a new ProductService with the given repository
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new product
    #[instrument(skip(self, input), fields(product_name = %input.name))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<Product> {
        // Validate input
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        self.repository.create(input).await
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i64) -> ProductResult<Product> {
        validate_id(id)?;

        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// List products as a sorted page
    #[instrument(skip(self))]
    pub async fn list_products(&self, page: PageRequest) -> ProductResult<Page<Product>> {
        if page.size == 0 {
            return Err(ProductError::Validation(
                "Page size must be at least 1".to_string(),
            ));
        }

        self.repository.list(page).await
    }

    /// Replace an existing product
    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: i64, input: UpdateProduct) -> ProductResult<Product> {
        validate_id(id)?;

        // Validate input
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        self.repository.update(id, input).await
    }

    /// Delete a product
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i64) -> ProductResult<()> {
        validate_id(id)?;

        let deleted = self.repository.delete(id).await?;
        if !deleted {
            return Err(ProductError::NotFound(id));
        }
        Ok(())
    }

    /// Search products by name, case-insensitive
    #[instrument(skip(self))]
    pub async fn search_products(&self, name: Option<String>) -> ProductResult<Vec<Product>> {
        let name = validate_query_name(name)?;
        self.repository.search_by_name(&name).await
    }

    /// Get products with stock above zero
    #[instrument(skip(self))]
    pub async fn get_available(&self) -> ProductResult<Vec<Product>> {
        self.repository.find_available().await
    }

    /// Get products with zero stock
    #[instrument(skip(self))]
    pub async fn get_out_of_stock(&self) -> ProductResult<Vec<Product>> {
        self.repository.find_out_of_stock().await
    }

    /// Get products strictly cheaper than the given price
    #[instrument(skip(self))]
    pub async fn get_cheaper_than(&self, price: Option<Decimal>) -> ProductResult<Vec<Product>> {
        let price = validate_query_price(price)?;
        self.repository.find_cheaper_than(price).await
    }

    /// Get products strictly more expensive than the given price
    #[instrument(skip(self))]
    pub async fn get_more_expensive_than(
        &self,
        price: Option<Decimal>,
    ) -> ProductResult<Vec<Product>> {
        let price = validate_query_price(price)?;
        self.repository.find_more_expensive_than(price).await
    }

    /// Get products priced within the inclusive range
    #[instrument(skip(self))]
    pub async fn get_in_price_range(
        &self,
        min: Option<Decimal>,
        max: Option<Decimal>,
    ) -> ProductResult<Vec<Product>> {
        let min = validate_query_price(min)?;
        let max = validate_query_price(max)?;
        if min > max {
            return Err(ProductError::Validation(format!(
                "Invalid price range: {} > {}",
                min, max
            )));
        }

        self.repository.find_in_price_range(min, max).await
    }

    /// Count all products
    #[instrument(skip(self))]
    pub async fn count_products(&self) -> ProductResult<u64> {
        self.repository.count().await
    }

    /// Count products with stock above zero
    #[instrument(skip(self))]
    pub async fn count_available(&self) -> ProductResult<u64> {
        self.repository.count_available().await
    }

    /// Count products matching a name search
    #[instrument(skip(self))]
    pub async fn count_by_name(&self, name: Option<String>) -> ProductResult<u64> {
        let name = validate_query_name(name)?;
        self.repository.count_by_name(&name).await
    }

    /// Get the highest-priced product
    #[instrument(skip(self))]
    pub async fn get_most_expensive(&self) -> ProductResult<Product> {
        self.repository
            .most_expensive()
            .await?
            .ok_or(ProductError::NoProducts)
    }

    /// Get the lowest-priced product
    #[instrument(skip(self))]
    pub async fn get_cheapest(&self) -> ProductResult<Product> {
        self.repository
            .cheapest()
            .await?
            .ok_or(ProductError::NoProducts)
    }
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
