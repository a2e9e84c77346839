pub mod error;
pub mod models;
pub mod routes;
pub mod sample;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use shopfront_db::Database;
use shopfront_kernel::{InitCtx, Migration, Module};

pub use error::ProductsError;
pub use models::{NewProduct, Product};
pub use sample::sample_products;
pub use store::{DocumentProductStore, ProductStore};

/// Product catalogue: list, lookup, create and the sample seed.
pub struct ProductsModule {
    store: Arc<dyn ProductStore>,
    sample_seed: bool,
}

impl ProductsModule {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self {
            store,
            sample_seed: true,
        }
    }

    pub fn with_sample_seed(mut self, enabled: bool) -> Self {
        self.sample_seed = enabled;
        self
    }
}

#[async_trait]
impl Module for ProductsModule {
    fn name(&self) -> &'static str {
        "products"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = %ctx.settings.environment,
            database = ctx.database.state().as_str(),
            sample_seed = self.sample_seed,
            "products module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone(), self.sample_seed)
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment(self.sample_seed))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE IF NOT EXISTS products (
                    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
                    id         TEXT    NOT NULL UNIQUE,
                    created_at INTEGER NOT NULL,
                    body       TEXT    NOT NULL
                );
                CREATE INDEX IF NOT EXISTS products_created_at
                    ON products (created_at DESC, seq DESC);
                "#,
        }]
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "products module stopped");
        Ok(())
    }
}

fn error_response(description: &str) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn openapi_fragment(sample_seed: bool) -> serde_json::Value {
    let mut fragment = serde_json::json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List products, newest first",
                    "tags": ["Products"],
                    "responses": {
                        "200": {
                            "description": "All products",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/ProductList" }
                                }
                            }
                        },
                        "500": error_response("Error fetching products")
                    }
                },
                "post": {
                    "summary": "Create a product",
                    "tags": ["Products"],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/NewProduct" }
                            }
                        }
                    },
                    "responses": {
                        "201": { "description": "Created product" },
                        "400": error_response("Invalid product"),
                        "500": error_response("Error creating product")
                    }
                }
            },
            "/{id}": {
                "get": {
                    "summary": "Fetch one product",
                    "tags": ["Products"],
                    "parameters": [{
                        "name": "id",
                        "in": "path",
                        "required": true,
                        "schema": { "type": "string", "pattern": "^[0-9a-fA-F]{24}$" }
                    }],
                    "responses": {
                        "200": { "description": "The product" },
                        "404": error_response("Product not found"),
                        "500": error_response("Error fetching product")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "NewProduct": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "description": { "type": "string" },
                        "price": { "type": "number", "minimum": 0 },
                        "image": { "type": "string" },
                        "category": { "type": "string" },
                        "stock": { "type": "integer", "minimum": 0 }
                    },
                    "required": ["name", "description", "price", "image", "category", "stock"]
                },
                "Product": {
                    "allOf": [
                        { "$ref": "#/components/schemas/NewProduct" },
                        {
                            "type": "object",
                            "properties": {
                                "_id": { "type": "string" },
                                "createdAt": { "type": "string", "format": "date-time" }
                            },
                            "required": ["_id", "createdAt"]
                        }
                    ]
                },
                "ProductList": {
                    "type": "object",
                    "properties": {
                        "success": { "type": "boolean" },
                        "count": { "type": "integer" },
                        "data": {
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/Product" }
                        }
                    }
                }
            }
        }
    });

    if sample_seed {
        fragment["paths"]["/sample"] = serde_json::json!({
            "post": {
                "summary": "Replace all products with the sample catalogue",
                "tags": ["Products"],
                "responses": {
                    "200": { "description": "Sample products added successfully" },
                    "500": error_response("Error adding sample products")
                }
            }
        });
    }

    fragment
}

/// Create the products module over the document store.
pub fn create_module(database: Database, sample_seed: bool) -> Arc<dyn Module> {
    let store = Arc::new(DocumentProductStore::new(database));
    Arc::new(ProductsModule::new(store).with_sample_seed(sample_seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_sample_route_only_when_enabled() {
        let enabled = openapi_fragment(true);
        let disabled = openapi_fragment(false);
        assert!(enabled["paths"]["/sample"].is_object());
        assert!(disabled["paths"].get("/sample").is_none());
        assert!(disabled["paths"]["/{id}"]["get"].is_object());
    }

    #[test]
    fn module_contributes_one_migration() {
        let module = create_module(Database::disconnected(), true);
        assert_eq!(module.name(), "products");
        let migrations = module.migrations();
        assert_eq!(migrations.len(), 1);
        assert!(migrations[0].up.contains("CREATE TABLE IF NOT EXISTS products"));
    }
}
