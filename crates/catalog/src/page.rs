use serde::Serialize;

use crate::format::FormattedProduct;
use crate::product::CategorySummary;

/// Pagination metadata of a listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    /// `pages = ceil(total / limit)`, zero when there is nothing to show.
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let pages = if limit == 0 { 0 } else { total.div_ceil(u64::from(limit)) };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }

    pub fn empty(page: u32, limit: u32) -> Self {
        Self::new(page, limit, 0)
    }
}

/// A listing page as handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPage {
    pub items: Vec<FormattedProduct>,
    pub pagination: Pagination,
}

impl ProductPage {
    pub fn empty(page: u32, limit: u32) -> Self {
        Self {
            items: Vec::new(),
            pagination: Pagination::empty(page, limit),
        }
    }
}

/// A category-detail page: the category plus its listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPage {
    pub category: CategorySummary,
    #[serde(flatten)]
    pub listing: ProductPage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_total_means_zero_pages() {
        let p = ProductPage::empty(3, 12);
        assert_eq!(p.pagination.pages, 0);
        assert_eq!(p.pagination.total, 0);
        assert!(p.items.is_empty());
    }

    #[test]
    fn fifteen_items_in_pages_of_twelve() {
        assert_eq!(Pagination::new(1, 12, 15).pages, 2);
        assert_eq!(Pagination::new(1, 12, 12).pages, 1);
        assert_eq!(Pagination::new(1, 20, 41).pages, 3);
    }

    proptest! {
        /// Property: pages is the ceiling of total / limit.
        #[test]
        fn pages_is_ceiling(total in 0u64..1_000_000, limit in 1u32..200) {
            let p = Pagination::new(1, limit, total);
            let limit = u64::from(limit);
            prop_assert!(p.pages * limit >= total);
            prop_assert!(p.pages == 0 || (p.pages - 1) * limit < total);
        }
    }
}
