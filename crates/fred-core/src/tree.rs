//! Hierarchical index over category records.
//!
//! [`CategoryTree`] turns a flat list of [`Category`] records into a tree
//! keyed by identifier, supporting indexed lookup, breadth-first iteration,
//! and subtree extraction. Parent links are index lookups into an internal
//! arena, so category records stay owned in one place.

use std::collections::HashMap;

use crate::error::{FredError, Result};
use crate::types::{Category, CategoryId};

#[derive(Clone, Debug)]
struct Node {
    category: Category,
    children: Vec<usize>,
}

/// A read-mostly tree over category records.
///
/// Build one from the flat parent/child records returned by the category
/// endpoints. Exactly one record may reference a parent outside the supplied
/// set (or carry no parent at all); that record becomes the root.
#[derive(Clone, Debug)]
pub struct CategoryTree {
    nodes: Vec<Node>,
    index: HashMap<CategoryId, usize>,
    root: usize,
}

impl CategoryTree {
    /// Builds a tree from a flat list of categories.
    ///
    /// # Errors
    ///
    /// Returns [`FredError::InvalidOperation`] when the list is empty,
    /// contains duplicate ids, has no unique root, or contains a cycle.
    pub fn from_categories(categories: Vec<Category>) -> Result<Self> {
        if categories.is_empty() {
            return Err(FredError::InvalidOperation(
                "Cannot build a tree from an empty category list".to_string(),
            ));
        }

        let mut index = HashMap::with_capacity(categories.len());
        for (i, cat) in categories.iter().enumerate() {
            if index.insert(cat.id, i).is_some() {
                return Err(FredError::InvalidOperation(format!(
                    "Duplicate category id {} in tree input",
                    cat.id
                )));
            }
        }

        let mut nodes: Vec<Node> = categories
            .into_iter()
            .map(|category| Node {
                category,
                children: Vec::new(),
            })
            .collect();

        // A node is the root when its parent is absent, itself, or outside
        // the supplied set.
        let mut root: Option<usize> = None;
        for i in 0..nodes.len() {
            let id = nodes[i].category.id;
            let resolved_parent = match nodes[i].category.parent_id {
                Some(parent) if parent != id => index.get(&parent).copied(),
                _ => None,
            };
            match resolved_parent {
                Some(parent_idx) => nodes[parent_idx].children.push(i),
                None => {
                    if let Some(existing) = root {
                        let existing_id: CategoryId = nodes[existing].category.id;
                        return Err(FredError::InvalidOperation(format!(
                            "Multiple roots in tree input: {existing_id} and {id}"
                        )));
                    }
                    root = Some(i);
                }
            }
        }

        let root = root.ok_or_else(|| {
            FredError::InvalidOperation("No root in tree input (cycle detected)".to_string())
        })?;

        let tree = Self { nodes, index, root };

        // Every node must be reachable from the root; anything else means a
        // cycle detached from the tree.
        if tree.iter().count() != tree.nodes.len() {
            return Err(FredError::InvalidOperation(
                "Tree input contains categories unreachable from the root".to_string(),
            ));
        }

        Ok(tree)
    }

    /// Returns the root category.
    #[must_use]
    pub fn root(&self) -> &Category {
        &self.nodes[self.root].category
    }

    /// Looks up a category by id. Returns `None` when the id is not in the
    /// tree.
    #[must_use]
    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.index.get(&id).map(|&i| &self.nodes[i].category)
    }

    /// Returns the direct children of a category, in insertion order.
    ///
    /// Returns `None` when the id is not in the tree.
    #[must_use]
    pub fn children(&self, id: CategoryId) -> Option<Vec<&Category>> {
        let &i = self.index.get(&id)?;
        Some(
            self.nodes[i]
                .children
                .iter()
                .map(|&c| &self.nodes[c].category)
                .collect(),
        )
    }

    /// Iterates over all categories in breadth-first order, starting at the
    /// root.
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        BfsIter {
            tree: self,
            queue: std::collections::VecDeque::from([self.root]),
        }
    }

    /// Extracts the subtree rooted at the given id.
    ///
    /// The result contains exactly the given category and its descendants.
    /// Returns `None` when the id is not in the tree.
    #[must_use]
    pub fn subtree(&self, id: CategoryId) -> Option<Self> {
        let &start = self.index.get(&id)?;
        let mut categories = Vec::new();
        let mut queue = std::collections::VecDeque::from([start]);
        while let Some(i) = queue.pop_front() {
            categories.push(self.nodes[i].category.clone());
            queue.extend(&self.nodes[i].children);
        }
        // The subtree root's parent is outside the collected set, which is
        // exactly the root rule of from_categories.
        Some(Self::from_categories(categories).expect("subtree of a valid tree is valid"))
    }

    /// Number of categories in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true when the tree holds no categories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

struct BfsIter<'a> {
    tree: &'a CategoryTree,
    queue: std::collections::VecDeque<usize>,
}

impl<'a> Iterator for BfsIter<'a> {
    type Item = &'a Category;

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.queue.pop_front()?;
        self.queue.extend(&self.tree.nodes[i].children);
        Some(&self.tree.nodes[i].category)
    }
}
