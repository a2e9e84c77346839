//! Shopfront application: the product catalogue module and the startup
//! sequence that serves it.

pub mod bootstrap;
pub mod modules;

pub use bootstrap::run;
