//! Category tree assembly and traversal.
//!
//! Categories arrive as a flat list linked by `parent_id`. The data layer
//! does not prevent cycles or dangling parents, so every walk here carries a
//! visited set and returns a partial result instead of failing.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;
use tracing::warn;

use crate::domain::aggregates::{Category, Product};
use crate::{CatalogError, Result};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    #[serde(flatten)]
    pub category: Category,
    /// Depth below the requested parent; roots are 0.
    pub level: usize,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn id(&self) -> &str { &self.category.id }
    pub fn name(&self) -> &str { &self.category.name }
}

/// Children of each parent id, in display order.
///
/// A category whose parent does not exist is indexed as a root, the same way
/// [`breadcrumbs`] ends its path there.
fn children_index(categories: &[Category]) -> HashMap<Option<&str>, Vec<&Category>> {
    let known: HashSet<&str> = categories.iter().map(|c| c.id.as_str()).collect();
    let mut index: HashMap<Option<&str>, Vec<&Category>> = HashMap::new();
    for category in categories {
        let parent = category.parent_id.as_deref().filter(|parent| known.contains(parent));
        index.entry(parent).or_default().push(category);
    }
    for siblings in index.values_mut() {
        siblings.sort_by(|a, b| {
            a.position.cmp(&b.position)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
    }
    index
}

/// Nested tree of everything under `parent_id` (`None` for the whole forest).
///
/// Each category appears at most once; a node that would be revisited through
/// a parent cycle is dropped.
pub fn build_tree(categories: &[Category], parent_id: Option<&str>) -> Vec<TreeNode> {
    let index = children_index(categories);
    let mut visited = HashSet::new();
    if let Some(parent) = parent_id {
        visited.insert(parent);
    }
    build_level(&index, parent_id, 0, &mut visited)
}

fn build_level<'a>(
    index: &HashMap<Option<&'a str>, Vec<&'a Category>>,
    parent_id: Option<&'a str>,
    level: usize,
    visited: &mut HashSet<&'a str>,
) -> Vec<TreeNode> {
    let Some(children) = index.get(&parent_id) else {
        return Vec::new();
    };
    let mut nodes = Vec::with_capacity(children.len());
    for &child in children {
        if !visited.insert(child.id.as_str()) {
            warn!(category_id = %child.id, "category parent cycle detected while building tree");
            continue;
        }
        let grandchildren = build_level(index, Some(child.id.as_str()), level + 1, visited);
        nodes.push(TreeNode { category: child.clone(), level, children: grandchildren });
    }
    nodes
}

/// Nodes whose name contains `term` (case-insensitive), plus their ancestors.
///
/// Subtrees without a single match are pruned.
pub fn filter_tree(tree: &[TreeNode], term: &str) -> Vec<TreeNode> {
    let needle = term.to_lowercase();
    filter_nodes(tree, &needle)
}

fn filter_nodes(nodes: &[TreeNode], needle: &str) -> Vec<TreeNode> {
    nodes
        .iter()
        .filter_map(|node| {
            let children = filter_nodes(&node.children, needle);
            let matches = node.category.name.to_lowercase().contains(needle);
            (matches || !children.is_empty()).then(|| TreeNode {
                category: node.category.clone(),
                level: node.level,
                children,
            })
        })
        .collect()
}

/// `category_id` followed by every id reachable through child links, breadth first.
pub fn descendant_ids(category_id: &str, all: &[Category]) -> Vec<String> {
    let index = children_index(all);
    let mut seen: HashSet<&str> = HashSet::from([category_id]);
    let mut out = vec![category_id.to_string()];
    let mut queue = VecDeque::from([category_id]);
    while let Some(current) = queue.pop_front() {
        for child in index.get(&Some(current)).into_iter().flatten() {
            if seen.insert(child.id.as_str()) {
                out.push(child.id.clone());
                queue.push_back(child.id.as_str());
            }
        }
    }
    out
}

/// Ancestor chain of `category_id`, root first and the category itself last.
///
/// Unknown ids give an empty path. The walk stops at a parent that cannot be
/// resolved, or at the first repeated id when the chain loops.
pub fn breadcrumbs(category_id: &str, all: &[Category]) -> Vec<Category> {
    let by_id: HashMap<&str, &Category> = all.iter().map(|c| (c.id.as_str(), c)).collect();
    let mut path = Vec::new();
    let mut visited = HashSet::new();
    let mut current = by_id.get(category_id).copied();
    while let Some(category) = current {
        if !visited.insert(category.id.as_str()) {
            warn!(category_id, "category parent cycle detected while walking breadcrumbs");
            break;
        }
        path.push(category.clone());
        current = category.parent_id.as_deref().and_then(|parent| by_id.get(parent).copied());
    }
    path.reverse();
    path
}

/// Products whose direct category is `category_id` or any of its descendants.
pub fn count_products_in_subtree(category_id: &str, categories: &[Category], products: &[Product]) -> usize {
    let ids: HashSet<String> = descendant_ids(category_id, categories).into_iter().collect();
    products.iter().filter(|p| ids.contains(&p.category_id)).count()
}

/// Products of the subtree rooted at `category_id`, in input order.
pub fn products_in_subtree<'a>(category_id: &str, categories: &[Category], products: &'a [Product]) -> Vec<&'a Product> {
    let ids: HashSet<String> = descendant_ids(category_id, categories).into_iter().collect();
    products.iter().filter(|p| ids.contains(&p.category_id)).collect()
}

/// Rejects moving `category_id` under itself, one of its descendants, or a
/// category that does not exist.
pub fn ensure_valid_parent(category_id: &str, new_parent_id: Option<&str>, all: &[Category]) -> Result<()> {
    let Some(parent) = new_parent_id else {
        return Ok(());
    };
    if !all.iter().any(|c| c.id == parent) {
        return Err(CatalogError::CategoryNotFound(parent.to_string()));
    }
    if descendant_ids(category_id, all).iter().any(|id| id == parent) {
        return Err(CatalogError::ParentCycle {
            category_id: category_id.to_string(),
            parent_id: parent.to_string(),
        });
    }
    Ok(())
}

/// A category can be deleted only once nothing hangs off it.
pub fn ensure_deletable(category_id: &str, categories: &[Category], products: &[Product]) -> Result<()> {
    if !categories.iter().any(|c| c.id == category_id) {
        return Err(CatalogError::CategoryNotFound(category_id.to_string()));
    }
    let has_children = categories.iter().any(|c| c.id != category_id && c.parent_id.as_deref() == Some(category_id));
    if has_children || products.iter().any(|p| p.category_id == category_id) {
        return Err(CatalogError::CategoryInUse(category_id.to_string()));
    }
    Ok(())
}
