//! HTTP handlers for Products API

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use axum_helpers::{
    ObjectIdPath, ValidatedJson, ValidatedQuery,
    errors::responses::{
        BadRequestObjectIdResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
};
use domain_users::UserRepository;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ProductResult;
use crate::maintenance::{MigrationReport, OwnerDiagnostic};
use crate::models::{
    CreateProduct, PriceRangeQuery, ProductOwner, ProductResponse, StockUpdate, UpdateProduct,
};
use crate::repository::ProductRepository;
use crate::service::ProductService;

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        create_product,
        list_products,
        list_available,
        list_by_category,
        list_by_price_range,
        list_by_owner,
        owner_diagnostics,
        migrate_owners,
        get_product,
        update_product,
        delete_product,
        update_stock,
    ),
    components(
        schemas(
            ProductResponse, ProductOwner, CreateProduct, UpdateProduct, StockUpdate,
            MigrationReport, OwnerDiagnostic
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestObjectIdResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product management endpoints"),
        (name = "Maintenance", description = "Owner reference repair")
    )
)]
pub struct ApiDoc;

type SharedService<R, U> = Arc<ProductService<R, U>>;

/// Create the products router with all HTTP endpoints
pub fn router<R, U>(service: ProductService<R, U>) -> Router
where
    R: ProductRepository + 'static,
    U: UserRepository + 'static,
{
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/available", get(list_available))
        .route("/category/{category}", get(list_by_category))
        .route("/price-range", get(list_by_price_range))
        .route("/owner/{owner_id}", get(list_by_owner))
        .route("/debug/owners", get(owner_diagnostics))
        .route("/migrate/owners", post(migrate_owners))
        .route(
            "/{id}",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/{id}/stock", patch(update_stock))
        .with_state(shared_service)
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created successfully", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository, U: UserRepository>(
    State(service): State<SharedService<R, U>>,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let product = service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// List all products with their owners
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    responses(
        (status = 200, description = "All products", body = Vec<ProductResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository, U: UserRepository>(
    State(service): State<SharedService<R, U>>,
) -> ProductResult<Json<Vec<ProductResponse>>> {
    let products = service.list_products().await?;
    Ok(Json(products))
}

/// List products that are available and in stock
#[utoipa::path(
    get,
    path = "/available",
    tag = "Products",
    responses(
        (status = 200, description = "Products with isAvailable = true and stock > 0", body = Vec<ProductResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_available<R: ProductRepository, U: UserRepository>(
    State(service): State<SharedService<R, U>>,
) -> ProductResult<Json<Vec<ProductResponse>>> {
    let products = service.list_available().await?;
    Ok(Json(products))
}

/// List products in a category
#[utoipa::path(
    get,
    path = "/category/{category}",
    tag = "Products",
    params(
        ("category" = String, Path, description = "Category name")
    ),
    responses(
        (status = 200, description = "Products whose categories contain the value", body = Vec<ProductResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_by_category<R: ProductRepository, U: UserRepository>(
    State(service): State<SharedService<R, U>>,
    Path(category): Path<String>,
) -> ProductResult<Json<Vec<ProductResponse>>> {
    let products = service.list_by_category(&category).await?;
    Ok(Json(products))
}

/// List products within a price range (inclusive)
#[utoipa::path(
    get,
    path = "/price-range",
    tag = "Products",
    params(PriceRangeQuery),
    responses(
        (status = 200, description = "Products with min <= price <= max", body = Vec<ProductResponse>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_by_price_range<R: ProductRepository, U: UserRepository>(
    State(service): State<SharedService<R, U>>,
    ValidatedQuery(range): ValidatedQuery<PriceRangeQuery>,
) -> ProductResult<Json<Vec<ProductResponse>>> {
    let products = service.list_by_price_range(range.min, range.max).await?;
    Ok(Json(products))
}

/// List products of one owner
#[utoipa::path(
    get,
    path = "/owner/{owner_id}",
    tag = "Products",
    params(
        ("owner_id" = String, Path, description = "Owner user ID (24-character hex)")
    ),
    responses(
        (status = 200, description = "Products of the owner", body = Vec<ProductResponse>),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_by_owner<R: ProductRepository, U: UserRepository>(
    State(service): State<SharedService<R, U>>,
    ObjectIdPath(owner_id): ObjectIdPath,
) -> ProductResult<Json<Vec<ProductResponse>>> {
    let products = service.list_by_owner(owner_id).await?;
    Ok(Json(products))
}

/// Show how each product's owner is stored
#[utoipa::path(
    get,
    path = "/debug/owners",
    tag = "Maintenance",
    responses(
        (status = 200, description = "Stored owner and its type per product", body = Vec<OwnerDiagnostic>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn owner_diagnostics<R: ProductRepository, U: UserRepository>(
    State(service): State<SharedService<R, U>>,
) -> ProductResult<Json<Vec<OwnerDiagnostic>>> {
    let diagnostics = service.maintenance().owner_diagnostics().await?;
    Ok(Json(diagnostics))
}

/// Convert string owners to ObjectId references
#[utoipa::path(
    post,
    path = "/migrate/owners",
    tag = "Maintenance",
    responses(
        (status = 200, description = "Migration report", body = MigrationReport),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn migrate_owners<R: ProductRepository, U: UserRepository>(
    State(service): State<SharedService<R, U>>,
) -> ProductResult<Json<MigrationReport>> {
    let report = service.maintenance().migrate_owners().await?;
    Ok(Json(report))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ID (24-character hex)")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository, U: UserRepository>(
    State(service): State<SharedService<R, U>>,
    ObjectIdPath(id): ObjectIdPath,
) -> ProductResult<Json<ProductResponse>> {
    let product = service.get_product(id).await?;
    Ok(Json(product))
}

/// Partially update a product
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ID (24-character hex)")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated successfully", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository, U: UserRepository>(
    State(service): State<SharedService<R, U>>,
    ObjectIdPath(id): ObjectIdPath,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> ProductResult<Json<ProductResponse>> {
    let product = service.update_product(id, input).await?;
    Ok(Json(product))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ID (24-character hex)")
    ),
    responses(
        (status = 204, description = "Product deleted successfully"),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository, U: UserRepository>(
    State(service): State<SharedService<R, U>>,
    ObjectIdPath(id): ObjectIdPath,
) -> ProductResult<impl IntoResponse> {
    service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Set the stock level
#[utoipa::path(
    patch,
    path = "/{id}/stock",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ID (24-character hex)")
    ),
    request_body = StockUpdate,
    responses(
        (status = 200, description = "Stock updated; isAvailable = quantity > 0", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_stock<R: ProductRepository, U: UserRepository>(
    State(service): State<SharedService<R, U>>,
    ObjectIdPath(id): ObjectIdPath,
    ValidatedJson(input): ValidatedJson<StockUpdate>,
) -> ProductResult<Json<ProductResponse>> {
    let product = service.update_stock(id, input).await?;
    Ok(Json(product))
}
