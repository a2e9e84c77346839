pub mod products;

use shopfront_db::Database;
use shopfront_kernel::{settings::Settings, ModuleRegistry};

/// Register all application modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, settings: &Settings, database: &Database) {
    registry.register(products::create_module(
        database.clone(),
        settings.server.enable_sample_seed,
    ));
}
