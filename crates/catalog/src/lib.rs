//! Catalog domain for the souvenir storefront.
//!
//! Product and category model, the listing query builder, the transport
//! formatter and pagination shapes. Pure logic: no IO, no HTTP, no storage.

pub mod category;
pub mod format;
pub mod page;
pub mod product;
pub mod query;

pub use category::{Category, CategoryFilter, CategoryNode, LOW_BUDGET_SLUG, build_tree};
pub use format::{FormatProduct, FormattedProduct, format_products};
pub use page::{CategoryPage, Pagination, ProductPage};
pub use product::{
    CategorySummary, DiscountType, PriceTier, Product, ProductImage, ProductStatus,
};
pub use query::{
    ADMIN_PAGE_SIZE, Audience, CategoryRef, FilterDescriptor, ListingParams, ListingQuery,
    PUBLIC_PAGE_SIZE, PriceBounds, SortDirection, SortField, SortKey, normalize,
};
