use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, Page, PageRequest, Product, SortDirection, SortField, UpdateProduct};

/// Repository trait for Product persistence
///
/// This trait defines the data access interface for products.
/// Implementations can use different storage backends (PostgreSQL, in-memory).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Create a new product, assigning its id
    async fn create(&self, input: CreateProduct) -> ProductResult<Product>;

    /// Get a product by ID
    async fn get_by_id(&self, id: i64) -> ProductResult<Option<Product>>;

    /// List products as a sorted page
    async fn list(&self, page: PageRequest) -> ProductResult<Page<Product>>;

    /// Replace an existing product
    async fn update(&self, id: i64, input: UpdateProduct) -> ProductResult<Product>;

    /// Delete a product by ID
    async fn delete(&self, id: i64) -> ProductResult<bool>;

    /// Find products whose name contains the term, case-insensitive
    async fn search_by_name(&self, name: &str) -> ProductResult<Vec<Product>>;

    /// Find products with stock above zero
    async fn find_available(&self) -> ProductResult<Vec<Product>>;

    /// Find products with zero stock
    async fn find_out_of_stock(&self) -> ProductResult<Vec<Product>>;

    /// Find products strictly cheaper than the given price
    async fn find_cheaper_than(&self, price: Decimal) -> ProductResult<Vec<Product>>;

    /// Find products strictly more expensive than the given price
    async fn find_more_expensive_than(&self, price: Decimal) -> ProductResult<Vec<Product>>;

    /// Find products priced within the inclusive range
    async fn find_in_price_range(&self, min: Decimal, max: Decimal) -> ProductResult<Vec<Product>>;

    /// Count all products
    async fn count(&self) -> ProductResult<u64>;

    /// Count products with stock above zero
    async fn count_available(&self) -> ProductResult<u64>;

    /// Count products whose name contains the term, case-insensitive
    async fn count_by_name(&self, name: &str) -> ProductResult<u64>;

    /// The highest-priced product, absent when the table is empty
    async fn most_expensive(&self) -> ProductResult<Option<Product>>;

    /// The lowest-priced product, absent when the table is empty
    async fn cheapest(&self) -> ProductResult<Option<Product>>;
}

/// In-memory implementation of ProductRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<i64, Product>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self {
            products: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(0)),
        }
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let mut products = self.products.write().await;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let product = Product::new(id, input);
        products.insert(id, product.clone());

        tracing::info!(product_id = %id, "Created product");
        Ok(product)
    }

    async fn get_by_id(&self, id: i64) -> ProductResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(&id).cloned())
    }

    async fn list(&self, page: PageRequest) -> ProductResult<Page<Product>> {
        let products = self.products.read().await;

        let mut result: Vec<Product> = products.values().cloned().collect();

        result.sort_by(|a, b| {
            let ordering = match page.sort {
                SortField::Id => a.id.cmp(&b.id),
                SortField::Name => a.name.cmp(&b.name),
                SortField::Description => a.description.cmp(&b.description),
                SortField::Stock => a.stock.cmp(&b.stock),
                SortField::Price => a.price.cmp(&b.price),
            };
            match page.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let total_items = result.len() as u64;
        let items: Vec<Product> = result
            .into_iter()
            .skip(page.page.saturating_mul(page.size) as usize)
            .take(page.size as usize)
            .collect();

        Ok(Page::new(items, page.page, page.size, total_items))
    }

    async fn update(&self, id: i64, input: UpdateProduct) -> ProductResult<Product> {
        let mut products = self.products.write().await;

        let product = products.get_mut(&id).ok_or(ProductError::NotFound(id))?;
        product.apply_update(input);
        let updated = product.clone();

        tracing::info!(product_id = %id, "Updated product");
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> ProductResult<bool> {
        let mut products = self.products.write().await;

        if products.remove(&id).is_some() {
            tracing::info!(product_id = %id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn search_by_name(&self, name: &str) -> ProductResult<Vec<Product>> {
        let products = self.products.read().await;
        let term = name.to_lowercase();

        Ok(products
            .values()
            .filter(|p| p.name.to_lowercase().contains(&term))
            .cloned()
            .collect())
    }

    async fn find_available(&self) -> ProductResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(products.values().filter(|p| p.stock > 0).cloned().collect())
    }

    async fn find_out_of_stock(&self) -> ProductResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(products.values().filter(|p| p.stock == 0).cloned().collect())
    }

    async fn find_cheaper_than(&self, price: Decimal) -> ProductResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(products
            .values()
            .filter(|p| p.price < price)
            .cloned()
            .collect())
    }

    async fn find_more_expensive_than(&self, price: Decimal) -> ProductResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(products
            .values()
            .filter(|p| p.price > price)
            .cloned()
            .collect())
    }

    async fn find_in_price_range(&self, min: Decimal, max: Decimal) -> ProductResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(products
            .values()
            .filter(|p| p.price >= min && p.price <= max)
            .cloned()
            .collect())
    }

    async fn count(&self) -> ProductResult<u64> {
        let products = self.products.read().await;
        Ok(products.len() as u64)
    }

    async fn count_available(&self) -> ProductResult<u64> {
        let products = self.products.read().await;
        Ok(products.values().filter(|p| p.stock > 0).count() as u64)
    }

    async fn count_by_name(&self, name: &str) -> ProductResult<u64> {
        let products = self.products.read().await;
        let term = name.to_lowercase();
        Ok(products
            .values()
            .filter(|p| p.name.to_lowercase().contains(&term))
            .count() as u64)
    }

    async fn most_expensive(&self) -> ProductResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products
            .values()
            .max_by(|a, b| a.price.cmp(&b.price))
            .cloned())
    }

    async fn cheapest(&self) -> ProductResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products
            .values()
            .min_by(|a, b| a.price.cmp(&b.price))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, stock: i32, price: Decimal) -> CreateProduct {
        CreateProduct {
            name: name.to_string(),
            description: format!("{} description", name),
            stock,
            price,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_product() {
        let repo = InMemoryProductRepository::new();

        let product = repo
            .create(input("Widget", 10, Decimal::new(999, 2)))
            .await
            .unwrap();
        assert_eq!(product.id, 1);
        assert_eq!(product.name, "Widget");
        assert_eq!(product.price, Decimal::new(999, 2));

        let fetched = repo.get_by_id(product.id).await.unwrap();
        assert_eq!(fetched, Some(product));
    }

    #[tokio::test]
    async fn test_ids_are_assigned_sequentially() {
        let repo = InMemoryProductRepository::new();

        let first = repo.create(input("A", 1, Decimal::ONE)).await.unwrap();
        let second = repo.create(input("B", 1, Decimal::ONE)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_get_missing_product_returns_none() {
        let repo = InMemoryProductRepository::new();
        assert_eq!(repo.get_by_id(42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_replaces_all_fields() {
        let repo = InMemoryProductRepository::new();
        let product = repo
            .create(input("Widget", 10, Decimal::new(999, 2)))
            .await
            .unwrap();

        let updated = repo
            .update(
                product.id,
                UpdateProduct {
                    name: "Gadget".to_string(),
                    description: "Replaced".to_string(),
                    stock: 0,
                    price: Decimal::new(1250, 2),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, product.id);
        assert_eq!(updated.name, "Gadget");
        assert_eq!(updated.description, "Replaced");
        assert_eq!(updated.stock, 0);
        assert_eq!(updated.price, Decimal::new(1250, 2));
    }

    #[tokio::test]
    async fn test_update_missing_product_fails() {
        let repo = InMemoryProductRepository::new();

        let result = repo
            .update(
                7,
                UpdateProduct {
                    name: "Gadget".to_string(),
                    description: "Replaced".to_string(),
                    stock: 1,
                    price: Decimal::ONE,
                },
            )
            .await;

        assert!(matches!(result, Err(ProductError::NotFound(7))));
    }

    #[tokio::test]
    async fn test_delete_is_permanent() {
        let repo = InMemoryProductRepository::new();
        let product = repo.create(input("Widget", 1, Decimal::ONE)).await.unwrap();

        assert!(repo.delete(product.id).await.unwrap());
        assert_eq!(repo.get_by_id(product.id).await.unwrap(), None);
        assert!(!repo.delete(product.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_sorts_and_paginates() {
        let repo = InMemoryProductRepository::new();
        repo.create(input("A", 1, Decimal::new(300, 2))).await.unwrap();
        repo.create(input("B", 1, Decimal::new(100, 2))).await.unwrap();
        repo.create(input("C", 1, Decimal::new(200, 2))).await.unwrap();

        let page = repo
            .list(PageRequest {
                page: 0,
                size: 2,
                sort: SortField::Price,
                direction: SortDirection::Asc,
            })
            .await
            .unwrap();

        assert_eq!(page.total_items, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.page, 0);
        assert_eq!(page.size, 2);
        let names: Vec<&str> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["B", "C"]);

        let last = repo
            .list(PageRequest {
                page: 1,
                size: 2,
                sort: SortField::Price,
                direction: SortDirection::Asc,
            })
            .await
            .unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].name, "A");
    }

    #[tokio::test]
    async fn test_list_default_order_is_id_descending() {
        let repo = InMemoryProductRepository::new();
        repo.create(input("First", 1, Decimal::ONE)).await.unwrap();
        repo.create(input("Second", 1, Decimal::ONE)).await.unwrap();

        let page = repo.list(PageRequest::default()).await.unwrap();
        let ids: Vec<i64> = page.items.iter().map(|p| p.id).collect();
        assert_eq!(ids, [2, 1]);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_substring() {
        let repo = InMemoryProductRepository::new();
        repo.create(input("Blue Widget", 1, Decimal::ONE)).await.unwrap();
        repo.create(input("Red Gadget", 1, Decimal::ONE)).await.unwrap();

        let found = repo.search_by_name("WIDG").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Blue Widget");

        assert!(repo.search_by_name("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stock_filters() {
        let repo = InMemoryProductRepository::new();
        repo.create(input("Stocked", 5, Decimal::ONE)).await.unwrap();
        repo.create(input("Gone", 0, Decimal::ONE)).await.unwrap();

        let available = repo.find_available().await.unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].name, "Stocked");

        let out = repo.find_out_of_stock().await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Gone");
    }

    #[tokio::test]
    async fn test_price_threshold_is_strict_and_range_is_inclusive() {
        let repo = InMemoryProductRepository::new();
        repo.create(input("Cheap", 1, Decimal::new(500, 2))).await.unwrap();
        repo.create(input("Mid", 1, Decimal::new(1000, 2))).await.unwrap();
        repo.create(input("Dear", 1, Decimal::new(1500, 2))).await.unwrap();

        // price == threshold is excluded on both sides
        let cheaper = repo.find_cheaper_than(Decimal::new(1000, 2)).await.unwrap();
        assert_eq!(cheaper.len(), 1);
        assert_eq!(cheaper[0].name, "Cheap");

        let dearer = repo
            .find_more_expensive_than(Decimal::new(1000, 2))
            .await
            .unwrap();
        assert_eq!(dearer.len(), 1);
        assert_eq!(dearer[0].name, "Dear");

        // range includes both endpoints
        let mut in_range = repo
            .find_in_price_range(Decimal::new(500, 2), Decimal::new(1000, 2))
            .await
            .unwrap();
        in_range.sort_by(|a, b| a.price.cmp(&b.price));
        let names: Vec<&str> = in_range.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Cheap", "Mid"]);
    }

    #[tokio::test]
    async fn test_counts() {
        let repo = InMemoryProductRepository::new();
        repo.create(input("Blue Widget", 5, Decimal::ONE)).await.unwrap();
        repo.create(input("Red Widget", 0, Decimal::ONE)).await.unwrap();
        repo.create(input("Gadget", 3, Decimal::ONE)).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 3);
        assert_eq!(repo.count_available().await.unwrap(), 2);
        assert_eq!(repo.count_by_name("widget").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_price_extremes() {
        let repo = InMemoryProductRepository::new();

        assert_eq!(repo.most_expensive().await.unwrap(), None);
        assert_eq!(repo.cheapest().await.unwrap(), None);

        repo.create(input("Cheap", 1, Decimal::new(100, 2))).await.unwrap();
        repo.create(input("Dear", 1, Decimal::new(900, 2))).await.unwrap();

        assert_eq!(repo.most_expensive().await.unwrap().unwrap().name, "Dear");
        assert_eq!(repo.cheapest().await.unwrap().unwrap().name, "Cheap");
    }
}
