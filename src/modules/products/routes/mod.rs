use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use super::error::ProductsError;
use super::models::{NewProduct, Product};
use super::sample::sample_products;
use super::store::ProductStore;

pub const SEED_MESSAGE: &str = "Sample products added successfully";

type Store = Arc<dyn ProductStore>;

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub success: bool,
    pub data: Product,
}

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub success: bool,
    pub message: &'static str,
    pub count: usize,
    pub data: Vec<Product>,
}

const SAMPLE_SEGMENT: &str = "sample";

/// Routes relative to the module mount point. `POST /sample` is registered
/// only when seeding is enabled; `GET /sample` is still an id lookup.
pub fn router(store: Store, sample_seed: bool) -> Router {
    let mut router = Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/{id}", get(get_product));

    if sample_seed {
        router = router.route("/sample", get(get_sample_segment).post(seed_products));
    }

    router.with_state(store)
}

async fn list_products(State(store): State<Store>) -> Result<Json<ListResponse>, ProductsError> {
    let products = store.list().await.map_err(ProductsError::List)?;
    Ok(Json(ListResponse {
        success: true,
        count: products.len(),
        data: products,
    }))
}

async fn get_product(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<Json<ItemResponse>, ProductsError> {
    find_product(store.as_ref(), &id).await
}

// The static seed route shadows `/{id}` for this segment.
async fn get_sample_segment(State(store): State<Store>) -> Result<Json<ItemResponse>, ProductsError> {
    find_product(store.as_ref(), SAMPLE_SEGMENT).await
}

async fn find_product(store: &dyn ProductStore, id: &str) -> Result<Json<ItemResponse>, ProductsError> {
    let product = store
        .get(id)
        .await
        .map_err(ProductsError::Get)?
        .ok_or(ProductsError::NotFound)?;
    Ok(Json(ItemResponse {
        success: true,
        data: product,
    }))
}

async fn create_product(
    State(store): State<Store>,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<ItemResponse>), ProductsError> {
    let Json(product) = payload.map_err(|rejection| ProductsError::Invalid(rejection.body_text()))?;
    product.validate().map_err(ProductsError::Invalid)?;

    let created = store.insert(product).await.map_err(ProductsError::Create)?;
    tracing::info!(product_id = %created.id, "product created");

    Ok((
        StatusCode::CREATED,
        Json(ItemResponse {
            success: true,
            data: created,
        }),
    ))
}

async fn seed_products(State(store): State<Store>) -> Result<Json<SeedResponse>, ProductsError> {
    let products = store
        .replace_all(sample_products())
        .await
        .map_err(ProductsError::Seed)?;
    tracing::info!(count = products.len(), "sample products installed");

    Ok(Json(SeedResponse {
        success: true,
        message: SEED_MESSAGE,
        count: products.len(),
        data: products,
    }))
}
