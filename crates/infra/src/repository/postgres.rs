//! Postgres-backed catalog repository.
//!
//! Listing predicates are assembled with `sqlx::QueryBuilder` and bound
//! parameters only. Images and price tiers are loaded in one extra query each
//! per page, keyed by the page's product ids.
//!
//! Schema: `crates/infra/migrations/0001_catalog.sql`.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use uuid::Uuid;

use souvenir_catalog::{
    Category, CategoryFilter, CategoryRef, CategorySummary, DiscountType, FilterDescriptor,
    PriceBounds, PriceTier, Product, ProductImage, ProductStatus, SortDirection, SortField,
};
use souvenir_core::{CategoryId, ImageId, PriceTierId, ProductId};

use super::r#trait::{CatalogRepository, RepositoryError};

const PRODUCT_COLUMNS: &str = r#"
    p.id, p.slug, p.sku, p.name, p.description, p.short_description,
    p.price, p.compare_price, p.print_price, p.quantity,
    p.is_active, p.is_featured, p.is_low_budget, p.allow_custom_print,
    p.status, p.created_at,
    c.id AS category_id, c.slug AS category_slug, c.name AS category_name
"#;

const CATEGORY_COLUMNS: &str =
    "id, slug, name, description, parent_id, is_active, sort_order";

/// Catalog repository over a Postgres connection pool.
///
/// `PgPool` is internally reference-counted, so clones share connections.
#[derive(Debug, Clone)]
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    async fn load_images(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<ProductImage>>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, product_id, url, alt_text, sort_order, is_main
            FROM product_images
            WHERE product_id = ANY($1)
            ORDER BY product_id, sort_order ASC
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut out: HashMap<Uuid, Vec<ProductImage>> = HashMap::new();
        for row in rows {
            let product_id: Uuid = row.try_get("product_id")?;
            out.entry(product_id).or_default().push(ProductImage {
                id: ImageId::from_uuid(row.try_get("id")?),
                url: row.try_get("url")?,
                alt_text: row.try_get("alt_text")?,
                sort_order: row.try_get("sort_order")?,
                is_main: row.try_get("is_main")?,
            });
        }
        Ok(out)
    }

    async fn load_tiers(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<PriceTier>>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, product_id, min_quantity, discount_type, discount_value, is_active
            FROM price_tiers
            WHERE product_id = ANY($1) AND is_active = TRUE
            ORDER BY product_id, min_quantity ASC
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut out: HashMap<Uuid, Vec<PriceTier>> = HashMap::new();
        for row in rows {
            let product_id: Uuid = row.try_get("product_id")?;
            let raw_type: String = row.try_get("discount_type")?;
            let discount_type = DiscountType::parse(&raw_type)
                .ok_or_else(|| RepositoryError::Decode(format!("unknown discount_type {raw_type:?}")))?;
            out.entry(product_id).or_default().push(PriceTier {
                id: PriceTierId::from_uuid(row.try_get("id")?),
                min_quantity: row.try_get("min_quantity")?,
                discount_type,
                discount_value: row.try_get("discount_value")?,
                is_active: row.try_get("is_active")?,
            });
        }
        Ok(out)
    }

    /// Attach images and tiers to bare product rows, preserving row order.
    async fn hydrate(&self, mut products: Vec<Product>) -> Result<Vec<Product>, RepositoryError> {
        if products.is_empty() {
            return Ok(products);
        }
        let ids: Vec<Uuid> = products.iter().map(|p| *p.id.as_uuid()).collect();
        let (mut images, mut tiers) = tokio::try_join!(self.load_images(&ids), self.load_tiers(&ids))?;

        for p in &mut products {
            let key = *p.id.as_uuid();
            p.images = images.remove(&key).unwrap_or_default();
            p.price_tiers = tiers.remove(&key).unwrap_or_default();
        }
        Ok(products)
    }
}

/// Base predicate plus every descriptor clause. Expects the products table
/// aliased as `p`.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &FilterDescriptor) {
    qb.push(" WHERE p.status = 'ACTIVE' AND p.is_active = TRUE");

    match &filter.category {
        CategoryFilter::Any => {}
        CategoryFilter::InTree(ids) if ids.is_empty() => {
            qb.push(" AND FALSE");
        }
        CategoryFilter::InTree(ids) => {
            let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
            qb.push(" AND p.category_id = ANY(");
            qb.push_bind(ids);
            qb.push(")");
        }
        CategoryFilter::LowBudget => {
            qb.push(" AND p.is_low_budget = TRUE");
        }
    }

    if let Some(term) = &filter.search {
        let pattern = format!("%{}%", escape_like(term));
        qb.push(" AND (p.name ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR p.description ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR p.sku ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
    if let Some(min) = filter.price_min {
        qb.push(" AND p.price >= ");
        qb.push_bind(min);
    }
    if let Some(max) = filter.price_max {
        qb.push(" AND p.price <= ");
        qb.push_bind(max);
    }
    if filter.in_stock_only {
        qb.push(" AND p.quantity > 0");
    }
    if filter.featured_only {
        qb.push(" AND p.is_featured = TRUE");
    }
}

fn order_clause(filter: &FilterDescriptor) -> &'static str {
    match filter.sort.ordering() {
        (SortField::Price, SortDirection::Asc) => " ORDER BY p.price ASC, p.id ASC",
        (SortField::Price, SortDirection::Desc) => " ORDER BY p.price DESC, p.id ASC",
        (SortField::CreatedAt, SortDirection::Asc) => " ORDER BY p.created_at ASC, p.id ASC",
        (SortField::CreatedAt, SortDirection::Desc) => " ORDER BY p.created_at DESC, p.id ASC",
    }
}

/// Escape `%`, `_` and `\` so user text is matched literally by ILIKE.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn product_from_row(row: &PgRow) -> Result<Product, RepositoryError> {
    let raw_status: String = row.try_get("status")?;
    let status = ProductStatus::parse(&raw_status)
        .ok_or_else(|| RepositoryError::Decode(format!("unknown product status {raw_status:?}")))?;

    Ok(Product {
        id: ProductId::from_uuid(row.try_get("id")?),
        slug: row.try_get("slug")?,
        sku: row.try_get("sku")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        short_description: row.try_get("short_description")?,
        price: row.try_get::<Decimal, _>("price")?,
        compare_price: row.try_get::<Option<Decimal>, _>("compare_price")?,
        print_price: row.try_get::<Option<Decimal>, _>("print_price")?,
        quantity: row.try_get("quantity")?,
        is_active: row.try_get("is_active")?,
        is_featured: row.try_get("is_featured")?,
        is_low_budget: row.try_get("is_low_budget")?,
        allow_custom_print: row.try_get("allow_custom_print")?,
        status,
        category: CategorySummary {
            id: CategoryId::from_uuid(row.try_get("category_id")?),
            slug: row.try_get("category_slug")?,
            name: row.try_get("category_name")?,
        },
        images: Vec::new(),
        price_tiers: Vec::new(),
        created_at: row.try_get("created_at")?,
    })
}

fn category_from_row(row: &PgRow) -> Result<Category, RepositoryError> {
    Ok(Category {
        id: CategoryId::from_uuid(row.try_get("id")?),
        slug: row.try_get("slug")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        parent_id: row
            .try_get::<Option<Uuid>, _>("parent_id")?
            .map(CategoryId::from_uuid),
        is_active: row.try_get("is_active")?,
        sort_order: row.try_get("sort_order")?,
    })
}

#[async_trait::async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    #[tracing::instrument(skip(self, filter), fields(page = filter.page, limit = filter.limit))]
    async fn find_products(&self, filter: &FilterDescriptor) -> Result<Vec<Product>, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(PRODUCT_COLUMNS);
        qb.push(" FROM products p JOIN categories c ON c.id = p.category_id");
        push_filter(&mut qb, filter);
        qb.push(order_clause(filter));
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(filter.take()));
        qb.push(" OFFSET ");
        qb.push_bind(i64::try_from(filter.skip()).unwrap_or(i64::MAX));

        let rows = qb.build().fetch_all(&self.pool).await?;
        let products = rows
            .iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        self.hydrate(products).await
    }

    #[tracing::instrument(skip(self, filter))]
    async fn count_products(&self, filter: &FilterDescriptor) -> Result<u64, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) AS total FROM products p");
        push_filter(&mut qb, filter);

        let row = qb.build().fetch_one(&self.pool).await?;
        let total: i64 = row.try_get("total")?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    #[tracing::instrument(skip(self))]
    async fn price_bounds(&self) -> Result<Option<PriceBounds>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT MIN(price) AS min_price, MAX(price) AS max_price
            FROM products
            WHERE status = 'ACTIVE' AND is_active = TRUE
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let min: Option<Decimal> = row.try_get("min_price")?;
        let max: Option<Decimal> = row.try_get("max_price")?;
        Ok(min.zip(max).map(|(min, max)| PriceBounds { min, max }))
    }

    #[tracing::instrument(skip(self))]
    async fn find_product_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(PRODUCT_COLUMNS);
        qb.push(" FROM products p JOIN categories c ON c.id = p.category_id");
        qb.push(" WHERE p.status = 'ACTIVE' AND p.is_active = TRUE AND p.slug = ");
        qb.push_bind(slug);

        let Some(row) = qb.build().fetch_optional(&self.pool).await? else {
            return Ok(None);
        };
        let product = product_from_row(&row)?;
        Ok(self.hydrate(vec![product]).await?.pop())
    }

    #[tracing::instrument(skip(self))]
    async fn find_category(&self, reference: &CategoryRef) -> Result<Option<Category>, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE "));
        match reference {
            CategoryRef::Id(id) => {
                qb.push("id = ");
                qb.push_bind(*id.as_uuid());
            }
            CategoryRef::Slug(slug) => {
                qb.push("slug = ");
                qb.push_bind(slug.as_str());
            }
        }

        let row = qb.build().fetch_optional(&self.pool).await?;
        row.as_ref().map(category_from_row).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn child_categories(&self, parent: CategoryId) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE parent_id = $1 ORDER BY sort_order ASC, name ASC"
        ))
        .bind(parent.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(category_from_row).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY sort_order ASC, name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(category_from_row).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn delete_category(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT
                EXISTS (SELECT 1 FROM categories WHERE id = $1) AS found,
                EXISTS (SELECT 1 FROM categories WHERE parent_id = $1) AS has_children,
                EXISTS (SELECT 1 FROM products WHERE category_id = $1) AS has_products
            "#,
        )
        .bind(id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        if !row.try_get::<bool, _>("found")? {
            return Err(RepositoryError::NotFound);
        }
        if row.try_get::<bool, _>("has_children")? {
            return Err(RepositoryError::Conflict("category has child categories".into()));
        }
        if row.try_get::<bool, _>("has_products")? {
            return Err(RepositoryError::Conflict("category has products".into()));
        }

        // FK constraints (ON DELETE RESTRICT) still reject a racing insert.
        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
