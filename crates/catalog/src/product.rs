use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use souvenir_core::{CategoryId, DomainError, DomainResult, ImageId, PriceTierId, ProductId};

/// Product publication lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProductStatus {
    Draft,
    Active,
    Archived,
}

impl ProductStatus {
    /// Parse the stored (and serialized) upper-case name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(ProductStatus::Draft),
            "ACTIVE" => Some(ProductStatus::Active),
            "ARCHIVED" => Some(ProductStatus::Archived),
            _ => None,
        }
    }
}

/// The category a product is filed under, as carried on the product record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: CategoryId,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductImage {
    pub id: ImageId,
    pub url: String,
    pub alt_text: Option<String>,
    pub sort_order: i32,
    pub is_main: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

impl DiscountType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "percentage" => Some(DiscountType::Percentage),
            "fixed" => Some(DiscountType::Fixed),
            _ => None,
        }
    }
}

/// Quantity-based discount rule attached to a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceTier {
    pub id: PriceTierId,
    pub min_quantity: i32,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub is_active: bool,
}

impl PriceTier {
    /// Unit price after applying this tier to `base`. Never negative.
    pub fn apply(&self, base: Decimal) -> Decimal {
        let discounted = match self.discount_type {
            DiscountType::Percentage => {
                base - base * self.discount_value / Decimal::ONE_HUNDRED
            }
            DiscountType::Fixed => base - self.discount_value,
        };
        discounted.max(Decimal::ZERO)
    }
}

/// Catalog product as persisted, including owned images and price tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub slug: String,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price: Decimal,
    pub compare_price: Option<Decimal>,
    pub print_price: Option<Decimal>,
    pub quantity: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub is_low_budget: bool,
    pub allow_custom_print: bool,
    pub status: ProductStatus,
    pub category: CategorySummary,
    pub images: Vec<ProductImage>,
    pub price_tiers: Vec<PriceTier>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Visible to shoppers: published and switched on.
    pub fn is_visible(&self) -> bool {
        self.status == ProductStatus::Active && self.is_active
    }

    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }

    pub fn category_id(&self) -> CategoryId {
        self.category.id
    }

    /// Check the catalog invariants before a product is stored.
    pub fn validate(&self) -> DomainResult<()> {
        if self.slug.trim().is_empty() {
            return Err(DomainError::validation("slug must not be empty"));
        }
        if self.price < Decimal::ZERO {
            return Err(DomainError::invariant("price must be >= 0"));
        }
        if self.quantity < 0 {
            return Err(DomainError::invariant("quantity must be >= 0"));
        }
        if self.images.iter().filter(|i| i.is_main).count() > 1 {
            return Err(DomainError::invariant("at most one image may be flagged main"));
        }
        if let Some(tier) = self.price_tiers.iter().find(|t| t.min_quantity <= 0) {
            return Err(DomainError::invariant(format!(
                "price tier {} must have min_quantity > 0",
                tier.id
            )));
        }
        Ok(())
    }

    /// Images ordered by their sort-order field.
    pub fn ordered_images(&self) -> Vec<&ProductImage> {
        let mut images: Vec<&ProductImage> = self.images.iter().collect();
        images.sort_by_key(|i| i.sort_order);
        images
    }

    /// The flagged main image, else the first image by sort order.
    pub fn main_image(&self) -> Option<&ProductImage> {
        self.images
            .iter()
            .find(|i| i.is_main)
            .or_else(|| self.images.iter().min_by_key(|i| i.sort_order))
    }

    /// Active tiers in ascending `min_quantity` order.
    pub fn active_tiers(&self) -> Vec<&PriceTier> {
        let mut tiers: Vec<&PriceTier> = self.price_tiers.iter().filter(|t| t.is_active).collect();
        tiers.sort_by_key(|t| t.min_quantity);
        tiers
    }

    /// Unit price for an order of `quantity` units.
    ///
    /// The highest active tier whose threshold is met wins; below every threshold
    /// the list price applies.
    pub fn unit_price_for(&self, quantity: u32) -> Decimal {
        self.active_tiers()
            .into_iter()
            .take_while(|t| i64::from(t.min_quantity) <= i64::from(quantity))
            .last()
            .map(|t| t.apply(self.price))
            .unwrap_or(self.price)
    }
}
