use thiserror::Error;

use souvenir_catalog::{Category, CategoryRef, FilterDescriptor, PriceBounds, Product};
use souvenir_core::{CategoryId, DomainError};

/// Catalog storage error.
///
/// Infrastructure failures (connection, decoding) plus the few business
/// rejections that can only be decided against stored data.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("malformed row: {0}")]
    Decode(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl From<DomainError> for RepositoryError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound => RepositoryError::NotFound,
            DomainError::Conflict(msg) => RepositoryError::Conflict(msg),
            other => RepositoryError::Invariant(other.to_string()),
        }
    }
}

/// Read access to the product catalog.
///
/// ## Contract
///
/// - Every product query applies `status = ACTIVE AND is_active = true` on top of
///   the descriptor. There is no way to opt out.
/// - Returned products carry images ordered by `sort_order` and only active price
///   tiers, ordered by ascending `min_quantity`.
/// - `find_products` and `count_products` are independent reads; callers may run
///   them concurrently and must not expect them to be mutually consistent.
#[async_trait::async_trait]
pub trait CatalogRepository: Send + Sync {
    /// One page of matching products (`skip`/`take` from the descriptor).
    async fn find_products(&self, filter: &FilterDescriptor) -> Result<Vec<Product>, RepositoryError>;

    /// Number of products matching the descriptor, ignoring pagination.
    async fn count_products(&self, filter: &FilterDescriptor) -> Result<u64, RepositoryError>;

    /// Min/max price over visible products, `None` for an empty catalog.
    async fn price_bounds(&self) -> Result<Option<PriceBounds>, RepositoryError>;

    /// A visible product by slug.
    async fn find_product_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError>;

    /// A category by id or slug, active or not.
    async fn find_category(&self, reference: &CategoryRef) -> Result<Option<Category>, RepositoryError>;

    /// Direct children of a category.
    async fn child_categories(&self, parent: CategoryId) -> Result<Vec<Category>, RepositoryError>;

    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError>;

    /// Delete a category. Rejected with `Conflict` while it still has children
    /// or products.
    async fn delete_category(&self, id: CategoryId) -> Result<(), RepositoryError>;
}
