//! Transport shapes for products.
//!
//! Decimal money fields become plain `f64` with no rounding. Related records are
//! trimmed to what a product card or detail page renders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use souvenir_core::{ImageId, PriceTierId, ProductId};

use crate::product::{CategorySummary, DiscountType, PriceTier, Product, ProductImage, ProductStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedImage {
    pub id: ImageId,
    pub url: String,
    pub alt_text: Option<String>,
    pub is_main: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedPriceTier {
    pub id: PriceTierId,
    pub min_quantity: i32,
    pub discount_type: DiscountType,
    pub discount_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedProduct {
    pub id: ProductId,
    pub slug: String,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price: f64,
    pub compare_price: Option<f64>,
    pub print_price: Option<f64>,
    pub quantity: i32,
    pub is_featured: bool,
    pub is_low_budget: bool,
    pub allow_custom_print: bool,
    pub status: ProductStatus,
    pub category: CategorySummary,
    pub images: Vec<FormattedImage>,
    pub price_tiers: Vec<FormattedPriceTier>,
    pub created_at: DateTime<Utc>,
}

/// Conversion into the transport shape.
///
/// Implemented for already-formatted products as the identity, so formatting
/// twice is the same as formatting once.
pub trait FormatProduct {
    fn format(&self) -> FormattedProduct;
}

impl FormatProduct for Product {
    fn format(&self) -> FormattedProduct {
        let main = self.main_image().map(|m| m.id);
        FormattedProduct {
            id: self.id,
            slug: self.slug.clone(),
            sku: self.sku.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            short_description: self.short_description.clone(),
            price: money(self.price),
            compare_price: self.compare_price.map(money),
            print_price: self.print_price.map(money),
            quantity: self.quantity,
            is_featured: self.is_featured,
            is_low_budget: self.is_low_budget,
            allow_custom_print: self.allow_custom_print,
            status: self.status,
            category: self.category.clone(),
            images: self
                .ordered_images()
                .into_iter()
                .map(|image| format_image(image, main == Some(image.id)))
                .collect(),
            price_tiers: self.active_tiers().into_iter().map(format_tier).collect(),
            created_at: self.created_at,
        }
    }
}

impl FormatProduct for FormattedProduct {
    fn format(&self) -> FormattedProduct {
        self.clone()
    }
}

pub fn format_products<P: FormatProduct>(products: &[P]) -> Vec<FormattedProduct> {
    products.iter().map(FormatProduct::format).collect()
}

fn money(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

fn format_image(image: &ProductImage, is_main: bool) -> FormattedImage {
    FormattedImage {
        id: image.id,
        url: image.url.clone(),
        alt_text: image.alt_text.clone(),
        is_main,
    }
}

fn format_tier(tier: &PriceTier) -> FormattedPriceTier {
    FormattedPriceTier {
        id: tier.id,
        min_quantity: tier.min_quantity,
        discount_type: tier.discount_type,
        discount_value: money(tier.discount_value),
    }
}
