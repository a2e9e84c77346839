use axum::response::{IntoResponse, Response};
use shopfront_db::DbError;
use shopfront_http::AppError;
use thiserror::Error;

pub const LIST_FAILED: &str = "Error fetching products";
pub const NOT_FOUND: &str = "Product not found";
pub const GET_FAILED: &str = "Error fetching product";
pub const CREATE_FAILED: &str = "Error creating product";
pub const SEED_FAILED: &str = "Error adding sample products";

/// Failures of the products endpoints, one variant per client-visible outcome.
#[derive(Error, Debug)]
pub enum ProductsError {
    #[error("product not found")]
    NotFound,

    #[error("invalid product: {0}")]
    Invalid(String),

    #[error("listing products failed: {0}")]
    List(#[source] DbError),

    #[error("loading product failed: {0}")]
    Get(#[source] DbError),

    #[error("creating product failed: {0}")]
    Create(#[source] DbError),

    #[error("seeding products failed: {0}")]
    Seed(#[source] DbError),
}

impl From<ProductsError> for AppError {
    fn from(error: ProductsError) -> Self {
        match error {
            ProductsError::NotFound => AppError::not_found(NOT_FOUND),
            // A malformed id cannot name a stored product.
            ProductsError::Get(source) if source.is_invalid_id() => AppError::not_found(NOT_FOUND),
            ProductsError::Invalid(message) => AppError::bad_request(message),
            ProductsError::List(source) => AppError::internal(LIST_FAILED, source),
            ProductsError::Get(source) => AppError::internal(GET_FAILED, source),
            ProductsError::Create(source) => AppError::internal(CREATE_FAILED, source),
            ProductsError::Seed(source) => AppError::internal(SEED_FAILED, source),
        }
    }
}

impl IntoResponse for ProductsError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn malformed_id_maps_to_not_found() {
        let error = AppError::from(ProductsError::Get(DbError::InvalidId("abc".to_string())));
        assert_eq!(error.status(), StatusCode::NOT_FOUND);
        assert!(matches!(error, AppError::NotFound { message } if message == NOT_FOUND));
    }

    #[test]
    fn storage_failures_map_to_internal_with_fixed_messages() {
        let cases = [
            (ProductsError::List(DbError::Disconnected), LIST_FAILED),
            (ProductsError::Get(DbError::Disconnected), GET_FAILED),
            (ProductsError::Create(DbError::Disconnected), CREATE_FAILED),
            (ProductsError::Seed(DbError::Disconnected), SEED_FAILED),
        ];
        for (error, expected) in cases {
            match AppError::from(error) {
                AppError::Internal { message, .. } => assert_eq!(message, expected),
                other => panic!("unexpected mapping: {other:?}"),
            }
        }
    }

    #[test]
    fn invalid_payload_maps_to_bad_request() {
        let error = AppError::from(ProductsError::Invalid("name is required".to_string()));
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    }
}
