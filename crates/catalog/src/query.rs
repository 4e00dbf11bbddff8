//! Catalog query builder.
//!
//! Turns untyped listing parameters into a [`FilterDescriptor`]. Parsing is
//! permissive: nothing here returns an error, every malformed or missing value
//! falls back to a default. Category resolution and catalog price bounds need
//! storage, so they are passed in by the caller via
//! [`ListingQuery::into_descriptor`].

use core::cmp::Ordering;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Serialize;

use souvenir_core::CategoryId;

use crate::category::CategoryFilter;
use crate::product::Product;

/// Page size of the storefront listings.
pub const PUBLIC_PAGE_SIZE: u32 = 12;

/// Page size of the back-office product list.
pub const ADMIN_PAGE_SIZE: u32 = 20;

/// Who the listing is rendered for; decides the page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Public,
    Admin,
}

impl Audience {
    pub fn page_size(&self) -> u32 {
        match self {
            Audience::Public => PUBLIC_PAGE_SIZE,
            Audience::Admin => ADMIN_PAGE_SIZE,
        }
    }
}

/// Raw query-string parameters of a listing request. Every field is optional text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingParams {
    pub page: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort_by: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub in_stock_only: Option<String>,
    pub featured: Option<String>,
}

impl ListingParams {
    /// Collect params from decoded query pairs (camelCase keys).
    ///
    /// The first occurrence of a repeated key wins; unknown keys are ignored.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "page" => &mut params.page,
                "search" => &mut params.search,
                "category" => &mut params.category,
                "sortBy" => &mut params.sort_by,
                "minPrice" => &mut params.min_price,
                "maxPrice" => &mut params.max_price,
                "inStockOnly" => &mut params.in_stock_only,
                "featured" => &mut params.featured,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.as_ref().to_string());
            }
        }
        params
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    Newest,
    /// No popularity metric exists yet; ordered like `Newest`.
    #[default]
    Popularity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Price,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortKey {
    /// Missing means `Popularity`; anything unrecognised means `Newest`.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return SortKey::Popularity;
        };
        match raw {
            "price-asc" => SortKey::PriceAsc,
            "price-desc" => SortKey::PriceDesc,
            "newest" => SortKey::Newest,
            "popularity" => SortKey::Popularity,
            _ => SortKey::Newest,
        }
    }

    pub fn ordering(&self) -> (SortField, SortDirection) {
        match self {
            SortKey::PriceAsc => (SortField::Price, SortDirection::Asc),
            SortKey::PriceDesc => (SortField::Price, SortDirection::Desc),
            SortKey::Newest | SortKey::Popularity => (SortField::CreatedAt, SortDirection::Desc),
        }
    }
}

/// A `category` parameter: a uuid is an id, anything else is a slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryRef {
    Id(CategoryId),
    Slug(String),
}

impl CategoryRef {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(match raw.parse::<CategoryId>() {
            Ok(id) => CategoryRef::Id(id),
            Err(_) => CategoryRef::Slug(raw.to_string()),
        })
    }
}

/// Min/max price over every visible product in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBounds {
    pub min: Decimal,
    pub max: Decimal,
}

/// Normalized listing request, before category resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub category: Option<CategoryRef>,
    pub sort: SortKey,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub in_stock_only: bool,
    pub featured_only: bool,
}

/// Normalize raw listing parameters. Never fails.
pub fn normalize(params: &ListingParams, audience: Audience) -> ListingQuery {
    let (min_price, max_price) = match (
        parse_price(params.min_price.as_deref()),
        parse_price(params.max_price.as_deref()),
    ) {
        (Some(lo), Some(hi)) if lo > hi => (Some(hi), Some(lo)),
        bounds => bounds,
    };

    ListingQuery {
        page: parse_page(params.page.as_deref()),
        limit: audience.page_size(),
        search: params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        category: params.category.as_deref().and_then(CategoryRef::parse),
        sort: SortKey::parse(params.sort_by.as_deref()),
        min_price,
        max_price,
        in_stock_only: parse_flag(params.in_stock_only.as_deref()),
        featured_only: parse_flag(params.featured.as_deref()),
    }
}

/// Page number clamped to `>= 1`; non-numeric input means page 1.
pub fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .map(|p| p.clamp(1, i64::from(u32::MAX)) as u32)
        .unwrap_or(1)
}

fn parse_price(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn parse_flag(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|s| s.trim().to_ascii_lowercase()).as_deref(),
        Some("true" | "1" | "yes" | "on")
    )
}

/// Finite prices beyond `Decimal`'s range saturate so the bound still filters.
fn price_to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(if value.abs() < 1.0 {
        Decimal::ZERO
    } else if value > 0.0 {
        Decimal::MAX
    } else {
        Decimal::MIN
    })
}

/// Rows to skip for a 1-based page.
pub fn skip_for(page: u32, limit: u32) -> u64 {
    u64::from(page.max(1) - 1) * u64::from(limit)
}

impl ListingQuery {
    pub fn skip(&self) -> u64 {
        skip_for(self.page, self.limit)
    }

    /// Finish the descriptor once the category and catalog bounds are known.
    ///
    /// A requested bound equal to the catalog bound is dropped from the
    /// predicate. Without known bounds every requested bound is applied.
    pub fn into_descriptor(self, category: CategoryFilter, bounds: Option<PriceBounds>) -> FilterDescriptor {
        let price_min = self
            .min_price
            .map(price_to_decimal)
            .filter(|v| bounds.is_none_or(|b| *v != b.min));
        let price_max = self
            .max_price
            .map(price_to_decimal)
            .filter(|v| bounds.is_none_or(|b| *v != b.max));

        FilterDescriptor {
            page: self.page,
            limit: self.limit,
            search: self.search,
            category,
            sort: self.sort,
            price_min,
            price_max,
            in_stock_only: self.in_stock_only,
            featured_only: self.featured_only,
        }
    }
}

/// Fully-resolved listing filter, consumed once by a repository.
///
/// The visibility base predicate (`status = ACTIVE AND is_active`) is implied
/// and cannot be switched off.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDescriptor {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub category: CategoryFilter,
    pub sort: SortKey,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub in_stock_only: bool,
    pub featured_only: bool,
}

impl FilterDescriptor {
    pub fn skip(&self) -> u64 {
        skip_for(self.page, self.limit)
    }

    pub fn take(&self) -> u32 {
        self.limit
    }

    /// Evaluate the predicate against one product.
    pub fn matches(&self, product: &Product) -> bool {
        if !product.is_visible() {
            return false;
        }
        let category_ok = match &self.category {
            CategoryFilter::Any => true,
            CategoryFilter::InTree(ids) => ids.contains(&product.category_id()),
            CategoryFilter::LowBudget => product.is_low_budget,
        };
        if !category_ok {
            return false;
        }
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            let hit = product.name.to_lowercase().contains(&term)
                || product.sku.to_lowercase().contains(&term)
                || product
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }
        if self.price_min.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.price_max.is_some_and(|max| product.price > max) {
            return false;
        }
        if self.in_stock_only && !product.in_stock() {
            return false;
        }
        if self.featured_only && !product.is_featured {
            return false;
        }
        true
    }

    /// Listing order, ties broken by id so pages are stable.
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let (field, direction) = self.sort.ordering();
        let primary = match field {
            SortField::Price => a.price.cmp(&b.price),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        let primary = match direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}
