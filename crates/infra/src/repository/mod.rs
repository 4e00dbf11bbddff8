//! Catalog storage boundary.
//!
//! One async trait, an in-memory implementation for tests/dev, and a Postgres
//! implementation for production.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryCatalogRepository;
pub use postgres::PostgresCatalogRepository;
pub use r#trait::{CatalogRepository, RepositoryError};
