use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use souvenir_catalog::{Category, CategoryRef, FilterDescriptor, PriceBounds, Product};
use souvenir_core::{CategoryId, DomainError};

use super::r#trait::{CatalogRepository, RepositoryError};

#[derive(Debug, Default)]
struct Catalog {
    categories: Vec<Category>,
    products: Vec<Product>,
}

/// In-memory catalog store.
///
/// Intended for tests/dev. Evaluates [`FilterDescriptor::matches`] over every
/// product, so it is also the reference semantics for the SQL implementation.
#[derive(Debug, Default)]
pub struct InMemoryCatalogRepository {
    inner: RwLock<Catalog>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Catalog>, RepositoryError> {
        self.inner
            .read()
            .map_err(|_| RepositoryError::Unavailable("catalog lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Catalog>, RepositoryError> {
        self.inner
            .write()
            .map_err(|_| RepositoryError::Unavailable("catalog lock poisoned".into()))
    }

    /// Insert or replace a category.
    ///
    /// The parent must exist, and re-parenting may not close a cycle.
    pub fn upsert_category(&self, category: Category) -> Result<(), RepositoryError> {
        let mut catalog = self.write()?;

        if let Some(parent_id) = category.parent_id {
            if !catalog.categories.iter().any(|c| c.id == parent_id) {
                return Err(DomainError::validation(format!("parent category {parent_id} does not exist")).into());
            }
            let mut cursor = Some(parent_id);
            while let Some(id) = cursor {
                if id == category.id {
                    return Err(DomainError::invariant(format!(
                        "category {} cannot be its own ancestor",
                        category.slug
                    ))
                    .into());
                }
                cursor = catalog
                    .categories
                    .iter()
                    .find(|c| c.id == id)
                    .and_then(|c| c.parent_id);
            }
        }
        if catalog
            .categories
            .iter()
            .any(|c| c.slug == category.slug && c.id != category.id)
        {
            return Err(DomainError::conflict(format!("slug {} already in use", category.slug)).into());
        }

        match catalog.categories.iter_mut().find(|c| c.id == category.id) {
            Some(existing) => *existing = category,
            None => catalog.categories.push(category),
        }
        Ok(())
    }

    /// Insert or replace a product after checking its invariants.
    pub fn upsert_product(&self, product: Product) -> Result<(), RepositoryError> {
        product.validate()?;
        let mut catalog = self.write()?;

        if !catalog.categories.iter().any(|c| c.id == product.category_id()) {
            return Err(DomainError::validation(format!(
                "category {} does not exist",
                product.category_id()
            ))
            .into());
        }

        match catalog.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => catalog.products.push(product),
        }
        Ok(())
    }
}

/// Shape a stored product the way the storage contract promises.
fn for_read(product: &Product) -> Product {
    let mut p = product.clone();
    p.images.sort_by_key(|i| i.sort_order);
    p.price_tiers.retain(|t| t.is_active);
    p.price_tiers.sort_by_key(|t| t.min_quantity);
    p
}

#[async_trait::async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn find_products(&self, filter: &FilterDescriptor) -> Result<Vec<Product>, RepositoryError> {
        let catalog = self.read()?;
        let mut hits: Vec<&Product> = catalog.products.iter().filter(|p| filter.matches(p)).collect();
        hits.sort_by(|a, b| filter.compare(a, b));

        let skip = usize::try_from(filter.skip()).unwrap_or(usize::MAX);
        Ok(hits
            .into_iter()
            .skip(skip)
            .take(filter.take() as usize)
            .map(for_read)
            .collect())
    }

    async fn count_products(&self, filter: &FilterDescriptor) -> Result<u64, RepositoryError> {
        let catalog = self.read()?;
        Ok(catalog.products.iter().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn price_bounds(&self) -> Result<Option<PriceBounds>, RepositoryError> {
        let catalog = self.read()?;
        let mut prices = catalog.products.iter().filter(|p| p.is_visible()).map(|p| p.price);
        let Some(first) = prices.next() else {
            return Ok(None);
        };
        let (min, max) = prices.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Ok(Some(PriceBounds { min, max }))
    }

    async fn find_product_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let catalog = self.read()?;
        Ok(catalog
            .products
            .iter()
            .find(|p| p.slug == slug && p.is_visible())
            .map(for_read))
    }

    async fn find_category(&self, reference: &CategoryRef) -> Result<Option<Category>, RepositoryError> {
        let catalog = self.read()?;
        Ok(catalog
            .categories
            .iter()
            .find(|c| match reference {
                CategoryRef::Id(id) => c.id == *id,
                CategoryRef::Slug(slug) => c.slug == *slug,
            })
            .cloned())
    }

    async fn child_categories(&self, parent: CategoryId) -> Result<Vec<Category>, RepositoryError> {
        let catalog = self.read()?;
        let mut children: Vec<Category> = catalog
            .categories
            .iter()
            .filter(|c| c.parent_id == Some(parent))
            .cloned()
            .collect();
        children.sort_by_key(|c| c.sort_order);
        Ok(children)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let catalog = self.read()?;
        let mut all = catalog.categories.clone();
        all.sort_by_key(|c| c.sort_order);
        Ok(all)
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let mut catalog = self.write()?;
        if !catalog.categories.iter().any(|c| c.id == id) {
            return Err(RepositoryError::NotFound);
        }
        if catalog.categories.iter().any(|c| c.parent_id == Some(id)) {
            return Err(RepositoryError::Conflict("category has child categories".into()));
        }
        if catalog.products.iter().any(|p| p.category_id() == id) {
            return Err(RepositoryError::Conflict("category has products".into()));
        }
        catalog.categories.retain(|c| c.id != id);
        Ok(())
    }
}
