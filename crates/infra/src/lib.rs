//! Infrastructure layer: configuration and catalog storage adapters.

pub mod config;
pub mod repository;

pub use config::AppConfig;
pub use repository::{
    CatalogRepository, InMemoryCatalogRepository, PostgresCatalogRepository, RepositoryError,
};
