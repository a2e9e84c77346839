use async_trait::async_trait;
use shopfront_db::{Collection, Database, DbError};

use super::models::{NewProduct, Product};

pub const COLLECTION: &str = "products";

/// Persistence seam for the products module.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Every product, newest first.
    async fn list(&self) -> Result<Vec<Product>, DbError>;

    /// `Ok(None)` when the id is well formed but unknown;
    /// [`DbError::InvalidId`] when it is malformed.
    async fn get(&self, id: &str) -> Result<Option<Product>, DbError>;

    async fn insert(&self, product: NewProduct) -> Result<Product, DbError>;

    /// Atomically replace the whole collection.
    async fn replace_all(&self, products: Vec<NewProduct>) -> Result<Vec<Product>, DbError>;
}

/// [`ProductStore`] backed by the `products` document collection.
#[derive(Clone)]
pub struct DocumentProductStore {
    database: Database,
}

impl DocumentProductStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    // Resolved per call so a disconnected handle fails the request, not startup.
    fn collection(&self) -> Result<Collection<NewProduct>, DbError> {
        self.database.collection(COLLECTION)
    }
}

#[async_trait]
impl ProductStore for DocumentProductStore {
    async fn list(&self) -> Result<Vec<Product>, DbError> {
        let documents = self.collection()?.find_all().await?;
        Ok(documents.into_iter().map(Product::from).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Product>, DbError> {
        let document = self.collection()?.find_by_id(id).await?;
        Ok(document.map(Product::from))
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, DbError> {
        let document = self.collection()?.insert_one(product).await?;
        Ok(Product::from(document))
    }

    async fn replace_all(&self, products: Vec<NewProduct>) -> Result<Vec<Product>, DbError> {
        let documents = self.collection()?.replace_all(products).await?;
        Ok(documents.into_iter().map(Product::from).collect())
    }
}
