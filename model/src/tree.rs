//! The mutable BOM tree model.
//!
//! `BomTree` owns every node in an id-keyed arena and designates at most one
//! node as the root. All structural mutations keep the parent back-reference
//! and the parent's child list consistent in the same operation, so a node is
//! listed by its parent exactly when its `parent` field points back at it.
//!
//! The model performs no I/O and holds no UI state; callers hold a `BomTree`
//! explicitly and pass `NodeId`s across the boundary.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{BomError, BomResult};
use crate::node::{
    clamp_cost, clamp_quantity, coerce_cost, coerce_quantity, BomNode, NodeId, NodeKind, Part,
    PartInit, PartUpdate, DEFAULT_ASSEMBLY_NAME, DEFAULT_PART_NAME, ROOT_ASSEMBLY_NAME,
};

/// In-memory hierarchical bill of materials.
#[derive(Debug, Clone, Default)]
pub struct BomTree {
    nodes: HashMap<NodeId, BomNode>,
    root: Option<NodeId>,
    next_id: u64,
}

impl BomTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_id(&mut self) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// The designated root, or `None` for an empty tree.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of nodes reachable from the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&BomNode> {
        self.nodes.get(&id)
    }

    pub fn part(&self, id: NodeId) -> Option<&Part> {
        self.nodes.get(&id).and_then(BomNode::as_part)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Child ids of `id` in insertion order; empty for parts and unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(BomNode::children).unwrap_or(&[])
    }

    fn is_assembly(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(BomNode::is_assembly)
    }

    /// Create an assembly and attach it under `parent`, or designate it as
    /// the new root when `parent` is `None`. Replacing an existing root
    /// discards the previous tree, so callers must ensure that is
    /// intentional. A parent id that is unknown or names a part falls back
    /// to attaching under the root, with a warning.
    pub fn create_assembly(&mut self, name: &str, parent: Option<NodeId>) -> NodeId {
        let name = name.trim();
        let name = if name.is_empty() {
            DEFAULT_ASSEMBLY_NAME
        } else {
            name
        };

        let id = self.alloc_id();
        self.nodes.insert(
            id,
            BomNode {
                id,
                parent: None,
                kind: NodeKind::Assembly {
                    name: name.to_string(),
                    children: Vec::new(),
                },
            },
        );

        match parent {
            Some(p) if self.is_assembly(p) => self.attach(id, p),
            Some(p) => {
                warn!(parent = %p, assembly = %id, "parent is not an assembly in the tree, attaching under root");
                let target = self.root_assembly_or_create();
                self.attach(id, target);
            }
            None => self.set_root(id),
        }

        debug!(assembly = %id, name, "created assembly");
        id
    }

    /// Create a part from a loose payload. With a `parent` it is appended
    /// there; otherwise it lands under the existing root, creating a
    /// `"Root Assembly"` first if the tree is empty.
    pub fn create_part(&mut self, init: PartInit, parent: Option<NodeId>) -> NodeId {
        let name = init
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_PART_NAME)
            .to_string();
        let part = Part {
            name,
            sku: init.sku.unwrap_or_default(),
            quantity: clamp_quantity(init.quantity.unwrap_or(1)),
            cost: clamp_cost(init.cost.unwrap_or(0.0)),
            supplier: init.supplier.unwrap_or_default(),
            description: init.description.unwrap_or_default(),
            compatibility: init.compatibility.unwrap_or_default(),
        };

        let target = match parent {
            Some(p) if self.is_assembly(p) => p,
            Some(p) => {
                warn!(parent = %p, "parent is not an assembly in the tree, attaching under root");
                self.root_assembly_or_create()
            }
            None => self.root_assembly_or_create(),
        };

        let id = self.alloc_id();
        self.nodes.insert(
            id,
            BomNode {
                id,
                parent: None,
                kind: NodeKind::Part(part),
            },
        );
        self.attach(id, target);

        debug!(part = %id, parent = %target, "created part");
        id
    }

    /// The root assembly, creating a default-named one if the tree is empty.
    fn root_assembly_or_create(&mut self) -> NodeId {
        match self.root {
            Some(r) if self.is_assembly(r) => r,
            _ => self.create_assembly(ROOT_ASSEMBLY_NAME, None),
        }
    }

    fn set_root(&mut self, id: NodeId) {
        if let Some(old) = self.root.take() {
            if old != id {
                warn!(old_root = %old, new_root = %id, "replacing root discards the previous tree");
                self.purge_subtree(old);
            }
        }
        self.root = Some(id);
    }

    /// Append `child` to `parent`'s child list and point its back-reference
    /// at `parent`. Caller guarantees `parent` is an assembly in the tree.
    fn attach(&mut self, child: NodeId, parent: NodeId) {
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(BomNode {
            kind: NodeKind::Assembly { children, .. },
            ..
        }) = self.nodes.get_mut(&parent)
        {
            children.push(child);
        }
    }

    /// Remove `id` from its parent's child list and clear the back-reference.
    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get(&id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(BomNode {
            kind: NodeKind::Assembly { children, .. },
            ..
        }) = self.nodes.get_mut(&parent)
        {
            children.retain(|c| *c != id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = None;
        }
    }

    /// Drop `id` and every descendant from the arena.
    fn purge_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children());
            }
        }
    }

    /// Delete a node and its entire subtree. Deleting the root empties the
    /// tree. Silently a no-op for ids not in the tree.
    pub fn delete_item(&mut self, id: NodeId) {
        if !self.nodes.contains_key(&id) {
            debug!(item = %id, "delete ignored, id not in tree");
            return;
        }
        if self.root == Some(id) {
            self.root = None;
        }
        self.detach(id);
        self.purge_subtree(id);
        debug!(item = %id, "deleted subtree");
    }

    /// True when `id` is `ancestor` or lies in its subtree.
    fn in_subtree(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.parent(c);
        }
        false
    }

    /// Re-attach `item` as the last child of `new_parent`.
    ///
    /// A `None` target detaches the subtree and discards it, same as
    /// [`delete_item`](Self::delete_item): a detached subtree is unreachable
    /// from every traversal and can never be re-attached, so it is not kept
    /// alive. Moves that would create a cycle (the target is the item itself
    /// or one of its descendants, which includes every possible target when
    /// the item is the current root) and moves onto a part are rejected with
    /// `InvalidMove`. Unknown item ids are a silent no-op.
    pub fn move_item(&mut self, item: NodeId, new_parent: Option<NodeId>) -> BomResult<()> {
        if !self.nodes.contains_key(&item) {
            debug!(item = %item, "move ignored, id not in tree");
            return Ok(());
        }

        let Some(target) = new_parent else {
            debug!(item = %item, "move without target detaches and discards the subtree");
            self.delete_item(item);
            return Ok(());
        };

        if !self.nodes.contains_key(&target) {
            return Err(BomError::invalid_move(format!(
                "target {target} is not in the tree"
            )));
        }
        if !self.is_assembly(target) {
            return Err(BomError::invalid_move(format!(
                "target {target} is a part and cannot hold children"
            )));
        }
        if self.in_subtree(item, target) {
            return Err(BomError::invalid_move(format!(
                "moving {item} under {target} would create a cycle"
            )));
        }

        self.detach(item);
        self.attach(item, target);
        debug!(item = %item, target = %target, "moved item");
        Ok(())
    }

    /// Rename a node. An empty name falls back to `"Assembly"` or `"Part"`
    /// depending on the variant, never to an empty string.
    pub fn rename(&mut self, id: NodeId, name: &str) {
        let name = name.trim();
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        match &mut node.kind {
            NodeKind::Assembly { name: n, .. } => {
                *n = if name.is_empty() { "Assembly" } else { name }.to_string();
            }
            NodeKind::Part(part) => {
                part.name = if name.is_empty() { "Part" } else { name }.to_string();
            }
        }
    }

    /// Apply a field-level edit to a part. Numeric fields arrive as raw text
    /// and are coerced, never rejected; empty compatibility rules are
    /// dropped. A no-op for assemblies and unknown ids.
    pub fn update_part(&mut self, id: NodeId, update: PartUpdate) {
        let Some(BomNode {
            kind: NodeKind::Part(part),
            ..
        }) = self.nodes.get_mut(&id)
        else {
            warn!(item = %id, "update_part ignored, id is not a part in the tree");
            return;
        };

        if let Some(name) = update.name {
            let name = name.trim();
            part.name = if name.is_empty() { "Part" } else { name }.to_string();
        }
        if let Some(sku) = update.sku {
            part.sku = sku.trim().to_string();
        }
        if let Some(quantity) = update.quantity {
            part.quantity = coerce_quantity(&quantity);
        }
        if let Some(cost) = update.cost {
            part.cost = coerce_cost(&cost);
        }
        if let Some(supplier) = update.supplier {
            part.supplier = supplier.trim().to_string();
        }
        if let Some(description) = update.description {
            part.description = description.trim().to_string();
        }
        if let Some(compatibility) = update.compatibility {
            part.compatibility = compatibility
                .into_iter()
                .map(|rule| rule.trim().to_string())
                .filter(|rule| !rule.is_empty())
                .collect();
        }
    }

    /// Total cost of the subtree rooted at `id`: `cost * quantity` for a
    /// part, the recursive sum over children for an assembly, 0 for unknown
    /// ids. A fresh traversal on every call; nothing is cached or mutated.
    pub fn cost_of(&self, id: NodeId) -> f64 {
        match self.nodes.get(&id).map(|n| &n.kind) {
            Some(NodeKind::Part(part)) => part.extended_cost(),
            Some(NodeKind::Assembly { children, .. }) => {
                children.iter().map(|c| self.cost_of(*c)).sum()
            }
            None => 0.0,
        }
    }

    /// Total cost of the whole tree; 0 when empty.
    pub fn total_cost(&self) -> f64 {
        self.root.map_or(0.0, |r| self.cost_of(r))
    }

    fn walk(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        for child in self.children(id).to_vec() {
            self.walk(child, out);
        }
    }

    /// Every node id reachable from the root, pre-order.
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        if let Some(root) = self.root {
            self.walk(root, &mut out);
        }
        out
    }

    /// Every part in the tree, pre-order. Used for validation sweeps.
    pub fn all_parts(&self) -> Vec<NodeId> {
        self.pre_order()
            .into_iter()
            .filter(|id| self.nodes[id].is_part())
            .collect()
    }

    /// Every assembly in the tree, pre-order.
    pub fn all_assemblies(&self) -> Vec<NodeId> {
        self.pre_order()
            .into_iter()
            .filter(|id| self.nodes[id].is_assembly())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(name: &str, cost: f64, quantity: u32) -> PartInit {
        PartInit {
            name: Some(name.to_string()),
            cost: Some(cost),
            quantity: Some(quantity),
            ..PartInit::default()
        }
    }

    #[test]
    fn create_assembly_defaults_name() {
        let mut tree = BomTree::new();
        let id = tree.create_assembly("   ", None);
        assert_eq!(tree.node(id).unwrap().name(), DEFAULT_ASSEMBLY_NAME);
        assert_eq!(tree.root(), Some(id));
    }

    #[test]
    fn create_part_under_empty_tree_synthesizes_root() {
        let mut tree = BomTree::new();
        let part = tree.create_part(part("Bolt", 0.1, 4), None);
        let root = tree.root().expect("root assembly created");
        assert_eq!(tree.node(root).unwrap().name(), ROOT_ASSEMBLY_NAME);
        assert_eq!(tree.children(root), &[part]);
        assert_eq!(tree.parent(part), Some(root));
    }

    #[test]
    fn create_part_clamps_invalid_numbers() {
        let mut tree = BomTree::new();
        let id = tree.create_part(
            PartInit {
                quantity: Some(0),
                cost: Some(f64::NAN),
                ..PartInit::default()
            },
            None,
        );
        let part = tree.part(id).unwrap();
        assert_eq!(part.name, DEFAULT_PART_NAME);
        assert_eq!(part.quantity, 1);
        assert_eq!(part.cost, 0.0);
    }

    #[test]
    fn stale_parent_id_falls_back_to_root() {
        let mut tree = BomTree::new();
        let root = tree.create_assembly("Top", None);
        let gone = tree.create_assembly("Doomed", Some(root));
        tree.delete_item(gone);

        let orphan = tree.create_assembly("Orphan", Some(gone));
        assert_eq!(tree.parent(orphan), Some(root));
        assert_eq!(tree.root(), Some(root));
    }

    #[test]
    fn ids_are_unique_across_creates() {
        let mut tree = BomTree::new();
        let root = tree.create_assembly("Root", None);
        let mut ids = vec![root];
        for i in 0..20 {
            ids.push(tree.create_part(part(&format!("P{i}"), 1.0, 1), Some(root)));
        }
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }

    #[test]
    fn hotend_scenario_cost() {
        let mut tree = BomTree::new();
        let hotend = tree.create_assembly("Hotend", None);
        tree.create_part(part("Nozzle", 8.99, 1), Some(hotend));
        assert!((tree.cost_of(hotend) - 8.99).abs() < 1e-9);
        assert!((tree.total_cost() - 8.99).abs() < 1e-9);
    }

    #[test]
    fn cost_is_additive_over_children() {
        let mut tree = BomTree::new();
        let root = tree.create_assembly("Root", None);
        let sub = tree.create_assembly("Sub", Some(root));
        tree.create_part(part("A", 2.5, 2), Some(root));
        tree.create_part(part("B", 1.25, 4), Some(sub));
        let child_sum: f64 = tree.children(root).iter().map(|c| tree.cost_of(*c)).sum();
        assert!((tree.cost_of(root) - child_sum).abs() < 1e-9);
        assert!((tree.total_cost() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn delete_removes_entire_subtree() {
        let mut tree = BomTree::new();
        let root = tree.create_assembly("Root", None);
        let sub = tree.create_assembly("Sub", Some(root));
        let p1 = tree.create_part(part("A", 1.0, 1), Some(sub));
        let p2 = tree.create_part(part("B", 1.0, 1), Some(root));

        tree.delete_item(sub);

        let parts = tree.all_parts();
        assert!(!parts.contains(&p1));
        assert!(parts.contains(&p2));
        assert!(tree.node(sub).is_none());
        assert!(tree.node(p1).is_none());
        assert_eq!(tree.children(root), &[p2]);
    }

    #[test]
    fn delete_root_empties_tree() {
        let mut tree = BomTree::new();
        let root = tree.create_assembly("Root", None);
        tree.create_part(part("A", 1.0, 1), Some(root));
        tree.delete_item(root);
        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 0);
        assert_eq!(tree.total_cost(), 0.0);
    }

    #[test]
    fn delete_unknown_id_is_a_noop() {
        let mut tree = BomTree::new();
        let root = tree.create_assembly("Root", None);
        let p = tree.create_part(part("A", 1.0, 1), Some(root));
        tree.delete_item(p);
        // second delete of the same id must not disturb anything
        tree.delete_item(p);
        assert_eq!(tree.root(), Some(root));
    }

    #[test]
    fn move_reorders_to_last_child() {
        let mut tree = BomTree::new();
        let root = tree.create_assembly("Root", None);
        let a = tree.create_assembly("A", Some(root));
        let b = tree.create_assembly("B", Some(root));
        let p = tree.create_part(part("P", 1.0, 1), Some(a));

        tree.move_item(p, Some(b)).unwrap();

        assert_eq!(tree.children(a), &[] as &[NodeId]);
        assert_eq!(tree.children(b), &[p]);
        assert_eq!(tree.parent(p), Some(b));
    }

    #[test]
    fn move_into_own_subtree_is_rejected() {
        let mut tree = BomTree::new();
        let root = tree.create_assembly("Root", None);
        let a = tree.create_assembly("A", Some(root));
        let b = tree.create_assembly("B", Some(a));

        let err = tree.move_item(a, Some(b)).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_MOVE");
        // structure unchanged
        assert_eq!(tree.parent(b), Some(a));
        assert_eq!(tree.parent(a), Some(root));
    }

    #[test]
    fn move_root_is_rejected() {
        let mut tree = BomTree::new();
        let root = tree.create_assembly("Root", None);
        let a = tree.create_assembly("A", Some(root));
        assert!(tree.move_item(root, Some(a)).is_err());
        assert_eq!(tree.root(), Some(root));
    }

    #[test]
    fn move_onto_part_is_rejected() {
        let mut tree = BomTree::new();
        let root = tree.create_assembly("Root", None);
        let p = tree.create_part(part("P", 1.0, 1), Some(root));
        let a = tree.create_assembly("A", Some(root));
        assert!(tree.move_item(a, Some(p)).is_err());
        assert_eq!(tree.parent(a), Some(root));
    }

    #[test]
    fn move_without_target_discards_subtree() {
        let mut tree = BomTree::new();
        let root = tree.create_assembly("Root", None);
        let a = tree.create_assembly("A", Some(root));
        let p = tree.create_part(part("P", 1.0, 1), Some(a));

        tree.move_item(a, None).unwrap();

        assert!(tree.node(a).is_none());
        assert!(tree.node(p).is_none());
        assert_eq!(tree.children(root), &[] as &[NodeId]);
    }

    #[test]
    fn update_part_coerces_text_input() {
        let mut tree = BomTree::new();
        let root = tree.create_assembly("Root", None);
        let p = tree.create_part(part("P", 2.0, 2), Some(root));

        tree.update_part(
            p,
            PartUpdate {
                quantity: Some("-3".to_string()),
                cost: Some("abc".to_string()),
                ..PartUpdate::default()
            },
        );
        let part = tree.part(p).unwrap();
        assert_eq!(part.quantity, 1);
        assert_eq!(part.cost, 0.0);

        tree.update_part(
            p,
            PartUpdate {
                quantity: Some("7".to_string()),
                cost: Some("12.50".to_string()),
                compatibility: Some(vec!["M3 threads".to_string(), "  ".to_string()]),
                ..PartUpdate::default()
            },
        );
        let part = tree.part(p).unwrap();
        assert_eq!(part.quantity, 7);
        assert_eq!(part.cost, 12.5);
        assert_eq!(part.compatibility, vec!["M3 threads".to_string()]);
    }

    #[test]
    fn rename_falls_back_to_variant_default() {
        let mut tree = BomTree::new();
        let root = tree.create_assembly("Root", None);
        let p = tree.create_part(part("P", 1.0, 1), Some(root));
        tree.rename(root, "  ");
        tree.rename(p, "");
        assert_eq!(tree.node(root).unwrap().name(), "Assembly");
        assert_eq!(tree.node(p).unwrap().name(), "Part");
    }

    #[test]
    fn traversals_are_pre_order() {
        let mut tree = BomTree::new();
        let root = tree.create_assembly("Root", None);
        let a = tree.create_assembly("A", Some(root));
        let p1 = tree.create_part(part("P1", 1.0, 1), Some(a));
        let b = tree.create_assembly("B", Some(root));
        let p2 = tree.create_part(part("P2", 1.0, 1), Some(b));

        assert_eq!(tree.pre_order(), vec![root, a, p1, b, p2]);
        assert_eq!(tree.all_assemblies(), vec![root, a, b]);
        assert_eq!(tree.all_parts(), vec![p1, p2]);
    }
}
