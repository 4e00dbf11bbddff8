use std::collections::{HashMap, HashSet};

use serde::Serialize;

use souvenir_core::CategoryId;

use crate::product::CategorySummary;

/// Slug of the distinguished low-budget pseudo-category.
pub const LOW_BUDGET_SLUG: &str = "low-budget";

const LOW_BUDGET_NAME: &str = "low budget";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<CategoryId>,
    pub is_active: bool,
    pub sort_order: i32,
}

impl Category {
    /// Whether selecting this category means "products flagged low budget"
    /// rather than "products filed under this category".
    pub fn is_low_budget(&self) -> bool {
        self.slug == LOW_BUDGET_SLUG || self.name.to_lowercase().contains(LOW_BUDGET_NAME)
    }

    pub fn summary(&self) -> CategorySummary {
        CategorySummary {
            id: self.id,
            slug: self.slug.clone(),
            name: self.name.clone(),
        }
    }
}

/// How a listing is narrowed by category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    /// No category constraint.
    Any,
    /// `category_id` must be one of these (a category plus its direct children).
    /// An empty set matches nothing.
    InTree(Vec<CategoryId>),
    /// `is_low_budget = true`, whatever the product's category.
    LowBudget,
}

impl CategoryFilter {
    /// Filter for a resolved category and its direct children.
    pub fn for_category(category: &Category, children: &[Category]) -> Self {
        if category.is_low_budget() {
            return CategoryFilter::LowBudget;
        }
        let mut ids = Vec::with_capacity(children.len() + 1);
        ids.push(category.id);
        ids.extend(
            children
                .iter()
                .filter(|c| c.parent_id == Some(category.id))
                .map(|c| c.id),
        );
        CategoryFilter::InTree(ids)
    }

    /// Filter for a category reference that did not resolve.
    pub fn nothing() -> Self {
        CategoryFilter::InTree(Vec::new())
    }
}

/// A node of the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    pub id: CategoryId,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub children: Vec<CategoryNode>,
}

/// Build the active category tree, siblings ordered by `sort_order` then name.
///
/// Only categories reachable from an active root are included, so a parent cycle
/// in stored data can never recurse.
pub fn build_tree(categories: &[Category]) -> Vec<CategoryNode> {
    let mut by_parent: HashMap<Option<CategoryId>, Vec<&Category>> = HashMap::new();
    for c in categories.iter().filter(|c| c.is_active) {
        by_parent.entry(c.parent_id).or_default().push(c);
    }
    for siblings in by_parent.values_mut() {
        siblings.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));
    }

    let mut visited = HashSet::new();
    nodes_under(None, &by_parent, &mut visited)
}

fn nodes_under(
    parent: Option<CategoryId>,
    by_parent: &HashMap<Option<CategoryId>, Vec<&Category>>,
    visited: &mut HashSet<CategoryId>,
) -> Vec<CategoryNode> {
    let Some(siblings) = by_parent.get(&parent) else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(siblings.len());
    for c in siblings {
        if !visited.insert(c.id) {
            continue;
        }
        out.push(CategoryNode {
            id: c.id,
            slug: c.slug.clone(),
            name: c.name.clone(),
            description: c.description.clone(),
            sort_order: c.sort_order,
            children: nodes_under(Some(c.id), by_parent, visited),
        });
    }
    out
}
