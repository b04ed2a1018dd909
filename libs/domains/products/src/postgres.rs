use async_trait::async_trait;
use database::BaseRepository;
use rust_decimal::Decimal;
use sea_orm::sea_query::{extension::postgres::PgExpr, Expr};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::{
    entity,
    error::{ProductError, ProductResult},
    models::{CreateProduct, Page, PageRequest, Product, SortDirection, SortField, UpdateProduct},
    repository::ProductRepository,
};

/// Escape LIKE wildcards so user input matches literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

pub struct PgProductRepository {
    base: BaseRepository<entity::Entity>,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        // Convert CreateProduct to ActiveModel; the store assigns the id
        let active_model: entity::ActiveModel = input.into();

        let model = self
            .base
            .insert(active_model)
            .await
            .map_err(|e| ProductError::Internal(format!("Database error: {}", e)))?;

        tracing::info!(product_id = %model.id, "Created product");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i64) -> ProductResult<Option<Product>> {
        let model = self
            .base
            .find_by_id(id)
            .await
            .map_err(|e| ProductError::Internal(format!("Database error: {}", e)))?;

        Ok(model.map(|m| m.into()))
    }

    async fn list(&self, page: PageRequest) -> ProductResult<Page<Product>> {
        let column = match page.sort {
            SortField::Id => entity::Column::Id,
            SortField::Name => entity::Column::Name,
            SortField::Description => entity::Column::Description,
            SortField::Stock => entity::Column::Stock,
            SortField::Price => entity::Column::Price,
        };
        let order = match page.direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        };

        let paginator = entity::Entity::find()
            .order_by(column, order)
            .paginate(self.base.db(), page.size);

        let total_items = paginator
            .num_items()
            .await
            .map_err(|e| ProductError::Internal(format!("Database error: {}", e)))?;

        let models = paginator
            .fetch_page(page.page)
            .await
            .map_err(|e| ProductError::Internal(format!("Database error: {}", e)))?;

        let items = models.into_iter().map(|m| m.into()).collect();
        Ok(Page::new(items, page.page, page.size, total_items))
    }

    async fn update(&self, id: i64, input: UpdateProduct) -> ProductResult<Product> {
        // Fetch existing product
        let model = self
            .base
            .find_by_id(id)
            .await
            .map_err(|e| ProductError::Internal(format!("Database error: {}", e)))?
            .ok_or(ProductError::NotFound(id))?;

        // Apply the replacement on the domain model
        let mut product: Product = model.into();
        product.apply_update(input);

        // Convert back to ActiveModel for update
        let active_model = entity::ActiveModel {
            id: Set(product.id),
            name: Set(product.name.clone()),
            description: Set(product.description.clone()),
            stock: Set(product.stock),
            price: Set(product.price),
        };

        let updated_model = self
            .base
            .update(active_model)
            .await
            .map_err(|e| ProductError::Internal(format!("Database error: {}", e)))?;

        tracing::info!(product_id = %id, "Updated product");
        Ok(updated_model.into())
    }

    async fn delete(&self, id: i64) -> ProductResult<bool> {
        let rows_affected = self
            .base
            .delete_by_id(id)
            .await
            .map_err(|e| ProductError::Internal(format!("Database error: {}", e)))?;

        if rows_affected > 0 {
            tracing::info!(product_id = %id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn search_by_name(&self, name: &str) -> ProductResult<Vec<Product>> {
        let pattern = format!("%{}%", escape_like(name));

        let models = entity::Entity::find()
            .filter(Expr::col(entity::Column::Name).ilike(pattern.as_str()))
            .all(self.base.db())
            .await
            .map_err(|e| ProductError::Internal(format!("Database error: {}", e)))?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn find_available(&self) -> ProductResult<Vec<Product>> {
        let models = entity::Entity::find()
            .filter(entity::Column::Stock.gt(0))
            .all(self.base.db())
            .await
            .map_err(|e| ProductError::Internal(format!("Database error: {}", e)))?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn find_out_of_stock(&self) -> ProductResult<Vec<Product>> {
        let models = entity::Entity::find()
            .filter(entity::Column::Stock.eq(0))
            .all(self.base.db())
            .await
            .map_err(|e| ProductError::Internal(format!("Database error: {}", e)))?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn find_cheaper_than(&self, price: Decimal) -> ProductResult<Vec<Product>> {
        let models = entity::Entity::find()
            .filter(entity::Column::Price.lt(price))
            .all(self.base.db())
            .await
            .map_err(|e| ProductError::Internal(format!("Database error: {}", e)))?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn find_more_expensive_than(&self, price: Decimal) -> ProductResult<Vec<Product>> {
        let models = entity::Entity::find()
            .filter(entity::Column::Price.gt(price))
            .all(self.base.db())
            .await
            .map_err(|e| ProductError::Internal(format!("Database error: {}", e)))?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn find_in_price_range(&self, min: Decimal, max: Decimal) -> ProductResult<Vec<Product>> {
        // BETWEEN is inclusive on both endpoints
        let models = entity::Entity::find()
            .filter(entity::Column::Price.between(min, max))
            .all(self.base.db())
            .await
            .map_err(|e| ProductError::Internal(format!("Database error: {}", e)))?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn count(&self) -> ProductResult<u64> {
        entity::Entity::find()
            .count(self.base.db())
            .await
            .map_err(|e| ProductError::Internal(format!("Database error: {}", e)))
    }

    async fn count_available(&self) -> ProductResult<u64> {
        entity::Entity::find()
            .filter(entity::Column::Stock.gt(0))
            .count(self.base.db())
            .await
            .map_err(|e| ProductError::Internal(format!("Database error: {}", e)))
    }

    async fn count_by_name(&self, name: &str) -> ProductResult<u64> {
        let pattern = format!("%{}%", escape_like(name));

        entity::Entity::find()
            .filter(Expr::col(entity::Column::Name).ilike(pattern.as_str()))
            .count(self.base.db())
            .await
            .map_err(|e| ProductError::Internal(format!("Database error: {}", e)))
    }

    async fn most_expensive(&self) -> ProductResult<Option<Product>> {
        let model = entity::Entity::find()
            .order_by_desc(entity::Column::Price)
            .one(self.base.db())
            .await
            .map_err(|e| ProductError::Internal(format!("Database error: {}", e)))?;

        Ok(model.map(|m| m.into()))
    }

    async fn cheapest(&self) -> ProductResult<Option<Product>> {
        let model = entity::Entity::find()
            .order_by_asc(entity::Column::Price)
            .one(self.base.db())
            .await
            .map_err(|e| ProductError::Internal(format!("Database error: {}", e)))?;

        Ok(model.map(|m| m.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn model(id: i64, name: &str, stock: i32, price: Decimal) -> entity::Model {
        entity::Model {
            id,
            name: name.to_string(),
            description: format!("{} description", name),
            stock,
            price,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_returns_product() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[model(1, "Widget", 5, Decimal::new(999, 2))]])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let product = repo.get_by_id(1).await.unwrap().unwrap();
        assert_eq!(product.id, 1);
        assert_eq!(product.name, "Widget");
        assert_eq!(product.price, Decimal::new(999, 2));
    }

    #[tokio::test]
    async fn test_get_by_id_missing_returns_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PgProductRepository::new(db);

        assert_eq!(repo.get_by_id(42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_returns_stored_row() {
        // Postgres inserts read the row back via RETURNING
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[model(7, "Widget", 5, Decimal::new(999, 2))]])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let product = repo
            .create(CreateProduct {
                name: "Widget".to_string(),
                description: "Widget description".to_string(),
                stock: 5,
                price: Decimal::new(999, 2),
            })
            .await
            .unwrap();

        assert_eq!(product.id, 7);
        assert_eq!(product.name, "Widget");
    }

    #[tokio::test]
    async fn test_update_replaces_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![model(3, "Widget", 5, Decimal::new(999, 2))],
                vec![model(3, "Gadget", 0, Decimal::new(1250, 2))],
            ])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let product = repo
            .update(
                3,
                UpdateProduct {
                    name: "Gadget".to_string(),
                    description: "Gadget description".to_string(),
                    stock: 0,
                    price: Decimal::new(1250, 2),
                },
            )
            .await
            .unwrap();

        assert_eq!(product.id, 3);
        assert_eq!(product.name, "Gadget");
        assert_eq!(product.stock, 0);
    }

    #[tokio::test]
    async fn test_update_missing_product_fails() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let result = repo
            .update(
                9,
                UpdateProduct {
                    name: "Gadget".to_string(),
                    description: "Gadget description".to_string(),
                    stock: 1,
                    price: Decimal::ONE,
                },
            )
            .await;

        assert!(matches!(result, Err(ProductError::NotFound(9))));
    }

    #[tokio::test]
    async fn test_delete_reports_rows_affected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    rows_affected: 1,
                    ..Default::default()
                },
                MockExecResult {
                    rows_affected: 0,
                    ..Default::default()
                },
            ])
            .into_connection();
        let repo = PgProductRepository::new(db);

        assert!(repo.delete(1).await.unwrap());
        assert!(!repo.delete(2).await.unwrap());
    }

    #[tokio::test]
    async fn test_most_expensive_on_empty_table() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PgProductRepository::new(db);

        assert_eq!(repo.most_expensive().await.unwrap(), None);
    }

    #[test]
    fn test_escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("100%_\\"), "100\\%\\_\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
