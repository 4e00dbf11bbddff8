//! Catalog page assembly.
//!
//! `CatalogService` runs normalize → resolve category → repository → format for
//! every listing endpoint. Storage failures stop here: listings degrade to an
//! empty page, single-entity lookups to not-found. Raw storage errors never
//! reach the HTTP layer.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use souvenir_catalog::{
    Audience, Category, CategoryFilter, CategoryNode, CategoryPage, CategoryRef, FormatProduct,
    FormattedProduct, ListingParams, ListingQuery, Pagination, ProductPage, build_tree,
    format_products, normalize,
};
use souvenir_infra::{
    AppConfig, CatalogRepository, InMemoryCatalogRepository, PostgresCatalogRepository,
    RepositoryError,
};

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("{0} not found")]
    NotFound(&'static str),
}

/// Unit and line price of a product at a given order quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub quantity: u32,
    pub unit_price: f64,
    pub total: f64,
}

#[derive(Clone)]
pub struct CatalogService {
    repo: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn CatalogRepository>) -> Self {
        Self { repo }
    }

    /// Storefront or back-office product listing.
    pub async fn list_products(&self, params: &ListingParams, audience: Audience) -> ProductPage {
        let query = normalize(params, audience);
        let (page, limit) = (query.page, query.limit);

        let category = match &query.category {
            Some(reference) => match self.resolve_listing_category(reference).await {
                Ok(filter) => filter,
                Err(e) => {
                    tracing::error!(error = %e, "category lookup failed; returning empty listing");
                    return ProductPage::empty(page, limit);
                }
            },
            None => CategoryFilter::Any,
        };

        self.run_listing(query, category).await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "product listing failed; returning empty listing");
            ProductPage::empty(page, limit)
        })
    }

    /// Listing for a category-detail page.
    ///
    /// The category must exist and be active. Its direct children are included,
    /// except for the low-budget category, which lists flagged products instead.
    pub async fn category_page(&self, slug: &str, params: &ListingParams) -> Result<CategoryPage, CatalogError> {
        let category = match self.repo.find_category(&CategoryRef::Slug(slug.to_string())).await {
            Ok(Some(c)) if c.is_active => c,
            Ok(_) => return Err(CatalogError::NotFound("category")),
            Err(e) => {
                tracing::error!(error = %e, slug, "category lookup failed");
                return Err(CatalogError::NotFound("category"));
            }
        };

        let query = normalize(params, Audience::Public);
        let (page, limit) = (query.page, query.limit);

        let listing = match self.category_filter(&category).await {
            Ok(filter) => self.run_listing(query, filter).await,
            Err(e) => Err(e),
        }
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, slug, "category listing failed; returning empty listing");
            ProductPage::empty(page, limit)
        });

        Ok(CategoryPage {
            category: category.summary(),
            listing,
        })
    }

    pub async fn product_detail(&self, slug: &str) -> Result<FormattedProduct, CatalogError> {
        match self.repo.find_product_by_slug(slug).await {
            Ok(Some(p)) => Ok(p.format()),
            Ok(None) => Err(CatalogError::NotFound("product")),
            Err(e) => {
                tracing::error!(error = %e, slug, "product lookup failed");
                Err(CatalogError::NotFound("product"))
            }
        }
    }

    /// Quantity pricing for a visible product.
    pub async fn price_quote(&self, slug: &str, quantity: u32) -> Result<PriceQuote, CatalogError> {
        let product = match self.repo.find_product_by_slug(slug).await {
            Ok(Some(p)) => p,
            Ok(None) => return Err(CatalogError::NotFound("product")),
            Err(e) => {
                tracing::error!(error = %e, slug, "product lookup failed");
                return Err(CatalogError::NotFound("product"));
            }
        };
        let quantity = quantity.max(1);
        let unit = product.unit_price_for(quantity);
        Ok(PriceQuote {
            quantity,
            unit_price: unit.to_f64().unwrap_or_default(),
            total: (unit * Decimal::from(quantity)).to_f64().unwrap_or_default(),
        })
    }

    /// Active categories as a navigation tree.
    pub async fn category_tree(&self) -> Vec<CategoryNode> {
        match self.repo.list_categories().await {
            Ok(all) => build_tree(&all),
            Err(e) => {
                tracing::error!(error = %e, "category listing failed");
                Vec::new()
            }
        }
    }

    async fn resolve_listing_category(&self, reference: &CategoryRef) -> Result<CategoryFilter, RepositoryError> {
        match self.repo.find_category(reference).await? {
            Some(c) if c.is_active => self.category_filter(&c).await,
            _ => {
                tracing::debug!(?reference, "category did not resolve; listing matches nothing");
                Ok(CategoryFilter::nothing())
            }
        }
    }

    async fn category_filter(&self, category: &Category) -> Result<CategoryFilter, RepositoryError> {
        if category.is_low_budget() {
            return Ok(CategoryFilter::LowBudget);
        }
        let children = self.repo.child_categories(category.id).await?;
        Ok(CategoryFilter::for_category(category, &children))
    }

    async fn run_listing(&self, query: ListingQuery, category: CategoryFilter) -> Result<ProductPage, RepositoryError> {
        let bounds = self.repo.price_bounds().await?;
        let descriptor = query.into_descriptor(category, bounds);
        tracing::debug!(
            page = descriptor.page,
            limit = descriptor.limit,
            skip = descriptor.skip(),
            sort = ?descriptor.sort,
            category = ?descriptor.category,
            search = ?descriptor.search,
            "listing products"
        );

        let (items, total) = tokio::join!(
            self.repo.find_products(&descriptor),
            self.repo.count_products(&descriptor)
        );
        let (items, total) = (items?, total?);

        Ok(ProductPage {
            items: format_products(&items),
            pagination: Pagination::new(descriptor.page, descriptor.limit, total),
        })
    }
}

/// Pick the repository from configuration.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<CatalogService> {
    let repo: Arc<dyn CatalogRepository> = match &config.database_url {
        Some(url) => {
            let repo = PostgresCatalogRepository::connect(url, config.database_max_connections).await?;
            tracing::info!(max_connections = config.database_max_connections, "connected to postgres");
            Arc::new(repo)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; serving an empty in-memory catalog");
            Arc::new(InMemoryCatalogRepository::new())
        }
    };
    Ok(CatalogService::new(repo))
}
