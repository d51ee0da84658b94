//! facet-core - Core library for Facet
//!
//! This crate provides configuration parsing for `facet.yml`, the
//! strongly-typed migration unit name, and the core error type shared by the
//! other Facet crates.

pub mod config;
pub mod error;
pub mod unit_name;

pub use config::{Config, DatabaseConfig, MigrationsConfig, ServerConfig, StartupConfig};
pub use error::{CoreError, CoreResult};
pub use unit_name::UnitName;
