//! Core traits, settings, and the module registry shared by every Shopfront crate.

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Module};
pub use registry::ModuleRegistry;
pub use shopfront_db::Migration;
