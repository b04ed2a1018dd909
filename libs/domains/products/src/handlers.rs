//! HTTP handlers for Products API

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use axum_helpers::{
    errors::responses::{
        BadRequestIdResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
    IdPath, ValidatedJson,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ProductResult;
use crate::models::{
    CreateProduct, Page, PageRequest, Product, SortDirection, SortField, UpdateProduct,
};
use crate::repository::ProductRepository;
use crate::service::ProductService;

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_product,
        update_product,
        delete_product,
        search_products,
        get_available,
        get_out_of_stock,
        get_cheaper_than,
        get_more_expensive_than,
        get_in_price_range,
        count_products,
        count_available,
        count_by_name,
        get_most_expensive,
        get_cheapest,
    ),
    components(
        schemas(
            Product, CreateProduct, UpdateProduct, PageRequest,
            Page<Product>, SortField, SortDirection
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestIdResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product management endpoints")
    )
)]
pub struct ApiDoc;

/// Create the products router with all HTTP endpoints
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/search", get(search_products))
        .route("/available", get(get_available))
        .route("/out-of-stock", get(get_out_of_stock))
        .route("/price/less-than", get(get_cheaper_than))
        .route("/price/more-than", get(get_more_expensive_than))
        .route("/price/between", get(get_in_price_range))
        .route("/count", get(count_products))
        .route("/count/available", get(count_available))
        .route("/count/search", get(count_by_name))
        .route("/most-expensive", get(get_most_expensive))
        .route("/cheapest", get(get_cheapest))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .with_state(shared_service)
}

/// List products as a sorted page
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    params(PageRequest),
    responses(
        (status = 200, description = "Page of products", body = Page<Product>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(page): Query<PageRequest>,
) -> ProductResult<Json<Page<Product>>> {
    let products = service.list_products(page).await?;
    Ok(Json(products))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created successfully", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let product = service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(id): IdPath,
) -> ProductResult<Json<Product>> {
    let product = service.get_product(id).await?;
    Ok(Json(product))
}

/// Replace a product
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated successfully", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> ProductResult<Json<Product>> {
    let product = service.update_product(id, input).await?;
    Ok(Json(product))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted successfully"),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(id): IdPath,
) -> ProductResult<impl IntoResponse> {
    service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Name search query parameters
#[derive(Debug, serde::Deserialize, utoipa::IntoParams)]
pub struct NameQuery {
    /// Name fragment to match, case-insensitive
    pub name: Option<String>,
}

/// Search products by name
#[utoipa::path(
    get,
    path = "/search",
    tag = "Products",
    params(NameQuery),
    responses(
        (status = 200, description = "Matching products", body = Vec<Product>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(query): Query<NameQuery>,
) -> ProductResult<Json<Vec<Product>>> {
    let products = service.search_products(query.name).await?;
    Ok(Json(products))
}

/// Get products with stock above zero
#[utoipa::path(
    get,
    path = "/available",
    tag = "Products",
    responses(
        (status = 200, description = "Available products", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_available<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<Vec<Product>>> {
    let products = service.get_available().await?;
    Ok(Json(products))
}

/// Get products with zero stock
#[utoipa::path(
    get,
    path = "/out-of-stock",
    tag = "Products",
    responses(
        (status = 200, description = "Out-of-stock products", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_out_of_stock<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<Vec<Product>>> {
    let products = service.get_out_of_stock().await?;
    Ok(Json(products))
}

/// Price threshold query parameters
#[derive(Debug, serde::Deserialize, utoipa::IntoParams)]
pub struct PriceQuery {
    /// Price threshold, exclusive
    pub price: Option<Decimal>,
}

/// Get products cheaper than a price
#[utoipa::path(
    get,
    path = "/price/less-than",
    tag = "Products",
    params(PriceQuery),
    responses(
        (status = 200, description = "Products below the price", body = Vec<Product>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_cheaper_than<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(query): Query<PriceQuery>,
) -> ProductResult<Json<Vec<Product>>> {
    let products = service.get_cheaper_than(query.price).await?;
    Ok(Json(products))
}

/// Get products more expensive than a price
#[utoipa::path(
    get,
    path = "/price/more-than",
    tag = "Products",
    params(PriceQuery),
    responses(
        (status = 200, description = "Products above the price", body = Vec<Product>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_more_expensive_than<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(query): Query<PriceQuery>,
) -> ProductResult<Json<Vec<Product>>> {
    let products = service.get_more_expensive_than(query.price).await?;
    Ok(Json(products))
}

/// Price range query parameters
#[derive(Debug, serde::Deserialize, utoipa::IntoParams)]
pub struct PriceRangeQuery {
    /// Lower price bound, inclusive
    #[serde(rename = "minPrice")]
    pub min_price: Option<Decimal>,
    /// Upper price bound, inclusive
    #[serde(rename = "maxPrice")]
    pub max_price: Option<Decimal>,
}

/// Get products within a price range
#[utoipa::path(
    get,
    path = "/price/between",
    tag = "Products",
    params(PriceRangeQuery),
    responses(
        (status = 200, description = "Products within the range", body = Vec<Product>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_in_price_range<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(query): Query<PriceRangeQuery>,
) -> ProductResult<Json<Vec<Product>>> {
    let products = service
        .get_in_price_range(query.min_price, query.max_price)
        .await?;
    Ok(Json(products))
}

/// Count all products
#[utoipa::path(
    get,
    path = "/count",
    tag = "Products",
    responses(
        (status = 200, description = "Product count", body = u64),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn count_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<u64>> {
    let count = service.count_products().await?;
    Ok(Json(count))
}

/// Count products with stock above zero
#[utoipa::path(
    get,
    path = "/count/available",
    tag = "Products",
    responses(
        (status = 200, description = "Available product count", body = u64),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn count_available<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<u64>> {
    let count = service.count_available().await?;
    Ok(Json(count))
}

/// Count products matching a name search
#[utoipa::path(
    get,
    path = "/count/search",
    tag = "Products",
    params(NameQuery),
    responses(
        (status = 200, description = "Matching product count", body = u64),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn count_by_name<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(query): Query<NameQuery>,
) -> ProductResult<Json<u64>> {
    let count = service.count_by_name(query.name).await?;
    Ok(Json(count))
}

/// Get the most expensive product
#[utoipa::path(
    get,
    path = "/most-expensive",
    tag = "Products",
    responses(
        (status = 200, description = "Most expensive product", body = Product),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_most_expensive<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<Product>> {
    let product = service.get_most_expensive().await?;
    Ok(Json(product))
}

/// Get the cheapest product
#[utoipa::path(
    get,
    path = "/cheapest",
    tag = "Products",
    responses(
        (status = 200, description = "Cheapest product", body = Product),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_cheapest<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<Product>> {
    let product = service.get_cheapest().await?;
    Ok(Json(product))
}
