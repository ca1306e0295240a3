//! Tree Builder - Ordered component tree derived from the registry.
//!
//! A pure function of the registry snapshot: children are grouped by
//! `parent_id`, every list is sorted by ordinal, and records whose parent is
//! not registered become roots. Running it twice on the same registry gives
//! the same tree.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::registry::{ComponentRecord, Registry};
use crate::types::{ComponentAction, ComponentKind, PageMeta};

// =============================================================================
// Tree Types
// =============================================================================

/// A component record with its children attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentNode {
    pub id: String,
    #[serde(flatten)]
    pub kind: ComponentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub ordinal: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub actions: Vec<ComponentAction>,
    #[serde(default)]
    pub children: Vec<ComponentNode>,
}

impl ComponentNode {
    fn leaf(record: &ComponentRecord) -> Self {
        Self {
            id: record.id.clone(),
            kind: record.kind.clone(),
            parent_id: record.parent_id.clone(),
            ordinal: record.ordinal,
            label: record.label.clone(),
            disabled: record.disabled,
            actions: record.actions.clone(),
            children: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// The externally published artifact: page metadata plus root components.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageState {
    pub id: String,
    pub title: String,
    pub url: String,
    pub components: Vec<ComponentNode>,
}

impl PageState {
    /// Build the page state for `meta` from the current registry.
    pub fn build(meta: &PageMeta, registry: &Registry) -> Self {
        Self {
            id: meta.id.clone(),
            title: meta.title.clone(),
            url: meta.url.clone(),
            components: build_tree(registry),
        }
    }

    /// Find a node anywhere in the tree.
    pub fn find(&self, id: &str) -> Option<&ComponentNode> {
        self.iter().find(|node| node.id == id)
    }

    /// Pre-order traversal of every node.
    pub fn iter(&self) -> Nodes<'_> {
        Nodes {
            stack: self.components.iter().rev().collect(),
        }
    }

    /// Total number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Pre-order iterator over a [`PageState`].
pub struct Nodes<'a> {
    stack: Vec<&'a ComponentNode>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a ComponentNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Rebuild the ordered root list from the registry.
///
/// Every record appears exactly once. A record whose `parent_id` names an
/// unregistered component (or itself) is a root. Records caught in a parent
/// cycle are unreachable from any root; they are promoted to roots in
/// ordinal order so they still show up.
pub fn build_tree(registry: &Registry) -> Vec<ComponentNode> {
    let mut children: HashMap<&str, Vec<&ComponentRecord>> = HashMap::new();
    let mut roots: Vec<&ComponentRecord> = Vec::new();

    for record in registry.records() {
        match record.parent_id.as_deref() {
            Some(parent) if parent != record.id && registry.contains(parent) => {
                children.entry(parent).or_default().push(record);
            }
            _ => roots.push(record),
        }
    }
    for list in children.values_mut() {
        list.sort_by_key(|record| record.ordinal);
    }
    roots.sort_by_key(|record| record.ordinal);

    let mut visited: HashSet<&str> = HashSet::with_capacity(registry.len());
    let mut tree: Vec<ComponentNode> = roots
        .into_iter()
        .map(|root| attach(root, &children, &mut visited))
        .collect();

    if visited.len() < registry.len() {
        let mut stranded: Vec<&ComponentRecord> = registry
            .records()
            .filter(|record| !visited.contains(record.id.as_str()))
            .collect();
        stranded.sort_by_key(|record| record.ordinal);
        for record in stranded {
            if !visited.contains(record.id.as_str()) {
                tree.push(attach(record, &children, &mut visited));
            }
        }
        tree.sort_by_key(|node| node.ordinal);
    }

    tree
}

fn attach<'a>(
    record: &'a ComponentRecord,
    children: &HashMap<&str, Vec<&'a ComponentRecord>>,
    visited: &mut HashSet<&'a str>,
) -> ComponentNode {
    visited.insert(record.id.as_str());
    let mut node = ComponentNode::leaf(record);
    if let Some(kids) = children.get(record.id.as_str()) {
        for &kid in kids {
            if !visited.contains(kid.id.as_str()) {
                node.children.push(attach(kid, children, visited));
            }
        }
    }
    node
}

// =============================================================================
// Tests
// =============================================================================
