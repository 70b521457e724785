//! Derived report data.
//!
//! These are the data behind the exported reports: a shopping list
//! (aggregated purchasing view), a cost summary (per-top-level-assembly
//! rollup), and an assembly outline (depth-annotated build order). Rendering
//! them to any presentation format is the consumer's business; the model
//! only computes the numbers.

use std::collections::HashMap;

use serde::Serialize;

use crate::node::{NodeId, NodeKind};
use crate::tree::BomTree;

/// One line of the shopping list: every occurrence of the same part
/// aggregated into a single purchasable entry.
#[derive(Debug, Clone, Serialize)]
pub struct ShoppingListEntry {
    pub name: String,
    pub sku: String,
    /// Distinct suppliers seen across occurrences, first-seen order.
    pub suppliers: Vec<String>,
    /// Unit cost of the first occurrence; occurrences with differing unit
    /// costs still contribute their own extended cost to `extended_cost`.
    pub unit_cost: f64,
    pub quantity: u64,
    pub extended_cost: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShoppingList {
    pub entries: Vec<ShoppingListEntry>,
    pub distinct_items: usize,
    pub total_units: u64,
    pub total_cost: f64,
}

/// Aggregate every part in the tree by normalized (name, sku), keeping
/// first-seen order.
pub fn shopping_list(tree: &BomTree) -> ShoppingList {
    let mut entries: Vec<ShoppingListEntry> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for id in tree.all_parts() {
        let Some(part) = tree.part(id) else { continue };
        let key = (part.name.trim().to_lowercase(), part.sku.trim().to_lowercase());
        let slot = *index.entry(key).or_insert_with(|| {
            entries.push(ShoppingListEntry {
                name: part.name.clone(),
                sku: part.sku.clone(),
                suppliers: Vec::new(),
                unit_cost: part.cost,
                quantity: 0,
                extended_cost: 0.0,
            });
            entries.len() - 1
        });
        let entry = &mut entries[slot];
        entry.quantity += u64::from(part.quantity);
        entry.extended_cost += part.extended_cost();
        let supplier = part.supplier.trim();
        if !supplier.is_empty() && !entry.suppliers.iter().any(|s| s == supplier) {
            entry.suppliers.push(supplier.to_string());
        }
    }

    ShoppingList {
        distinct_items: entries.len(),
        total_units: entries.iter().map(|e| e.quantity).sum(),
        total_cost: entries.iter().map(|e| e.extended_cost).sum(),
        entries,
    }
}

/// Cost rollup for one direct child of the root.
#[derive(Debug, Clone, Serialize)]
pub struct CostLine {
    pub id: NodeId,
    pub name: String,
    pub is_assembly: bool,
    pub part_count: usize,
    pub cost: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CostSummary {
    pub lines: Vec<CostLine>,
    pub total: f64,
}

/// Per-top-level-child cost rollup plus the grand total.
pub fn cost_summary(tree: &BomTree) -> CostSummary {
    let mut lines = Vec::new();
    if let Some(root) = tree.root() {
        for child in tree.children(root).to_vec() {
            let Some(node) = tree.node(child) else { continue };
            let part_count = count_parts(tree, child);
            lines.push(CostLine {
                id: child,
                name: node.name().to_string(),
                is_assembly: node.is_assembly(),
                part_count,
                cost: tree.cost_of(child),
            });
        }
    }
    CostSummary {
        total: tree.total_cost(),
        lines,
    }
}

fn count_parts(tree: &BomTree, id: NodeId) -> usize {
    match tree.node(id).map(|n| &n.kind) {
        Some(NodeKind::Part(_)) => 1,
        Some(NodeKind::Assembly { children, .. }) => {
            children.iter().map(|c| count_parts(tree, *c)).sum()
        }
        None => 0,
    }
}

/// One row of the assembly outline, in build (pre-order) order.
#[derive(Debug, Clone, Serialize)]
pub struct OutlineItem {
    pub id: NodeId,
    pub depth: usize,
    pub name: String,
    pub is_assembly: bool,
    /// Quantity for parts, `None` for assemblies.
    pub quantity: Option<u32>,
    /// Subtree cost for assemblies, extended cost for parts.
    pub cost: f64,
}

/// Depth-annotated pre-order walk of the whole tree.
///
/// Subtree costs are computed in one post-order pass and looked up per row,
/// rather than re-traversing shared subtrees once per displayed node.
pub fn assembly_outline(tree: &BomTree) -> Vec<OutlineItem> {
    let mut costs: HashMap<NodeId, f64> = HashMap::new();
    if let Some(root) = tree.root() {
        fill_costs(tree, root, &mut costs);
    }

    tree.pre_order()
        .into_iter()
        .filter_map(|id| {
            let node = tree.node(id)?;
            Some(OutlineItem {
                id,
                depth: depth_of(tree, id),
                name: node.name().to_string(),
                is_assembly: node.is_assembly(),
                quantity: node.as_part().map(|p| p.quantity),
                cost: costs.get(&id).copied().unwrap_or(0.0),
            })
        })
        .collect()
}

fn fill_costs(tree: &BomTree, id: NodeId, costs: &mut HashMap<NodeId, f64>) -> f64 {
    let cost = match tree.node(id).map(|n| &n.kind) {
        Some(NodeKind::Part(part)) => part.extended_cost(),
        Some(NodeKind::Assembly { children, .. }) => children
            .to_vec()
            .into_iter()
            .map(|c| fill_costs(tree, c, costs))
            .sum(),
        None => 0.0,
    };
    costs.insert(id, cost);
    cost
}

fn depth_of(tree: &BomTree, id: NodeId) -> usize {
    let mut depth = 0;
    let mut current = tree.parent(id);
    while let Some(p) = current {
        depth += 1;
        current = tree.parent(p);
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::PartInit;

    fn sample_tree() -> BomTree {
        let mut tree = BomTree::new();
        let root = tree.create_assembly("Printer", None);
        let hotend = tree.create_assembly("Hotend", Some(root));
        tree.create_part(
            PartInit {
                name: Some("Nozzle".to_string()),
                sku: Some("NZ-04".to_string()),
                cost: Some(8.99),
                quantity: Some(1),
                supplier: Some("E3D".to_string()),
                ..PartInit::default()
            },
            Some(hotend),
        );
        let frame = tree.create_assembly("Frame", Some(root));
        tree.create_part(
            PartInit {
                name: Some("M3 Bolt".to_string()),
                cost: Some(0.10),
                quantity: Some(8),
                supplier: Some("McMaster".to_string()),
                ..PartInit::default()
            },
            Some(frame),
        );
        tree.create_part(
            PartInit {
                name: Some("M3 Bolt".to_string()),
                cost: Some(0.10),
                quantity: Some(4),
                supplier: Some("Bolt Depot".to_string()),
                ..PartInit::default()
            },
            Some(hotend),
        );
        tree
    }

    #[test]
    fn shopping_list_aggregates_duplicate_parts() {
        let list = shopping_list(&sample_tree());
        assert_eq!(list.distinct_items, 2);

        let bolts = list.entries.iter().find(|e| e.name == "M3 Bolt").unwrap();
        assert_eq!(bolts.quantity, 12);
        assert!((bolts.extended_cost - 1.20).abs() < 1e-9);
        // pre-order visits the Hotend subtree before Frame
        assert_eq!(
            bolts.suppliers,
            vec!["Bolt Depot".to_string(), "McMaster".to_string()]
        );

        assert_eq!(list.total_units, 13);
        assert!((list.total_cost - 10.19).abs() < 1e-9);
    }

    #[test]
    fn cost_summary_rolls_up_top_level_children() {
        let summary = cost_summary(&sample_tree());
        assert_eq!(summary.lines.len(), 2);

        let hotend = summary.lines.iter().find(|l| l.name == "Hotend").unwrap();
        assert_eq!(hotend.part_count, 2);
        assert!((hotend.cost - 9.39).abs() < 1e-9);

        let frame = summary.lines.iter().find(|l| l.name == "Frame").unwrap();
        assert_eq!(frame.part_count, 1);
        assert!((frame.cost - 0.80).abs() < 1e-9);

        assert!((summary.total - 10.19).abs() < 1e-9);
    }

    #[test]
    fn outline_walks_pre_order_with_depths() {
        let outline = assembly_outline(&sample_tree());
        let names: Vec<_> = outline.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Printer", "Hotend", "Nozzle", "M3 Bolt", "Frame", "M3 Bolt"]
        );
        assert_eq!(outline[0].depth, 0);
        assert_eq!(outline[1].depth, 1);
        assert_eq!(outline[2].depth, 2);
        assert!((outline[0].cost - 10.19).abs() < 1e-9);
        assert_eq!(outline[2].quantity, Some(1));
        assert!(outline[1].is_assembly);
    }

    #[test]
    fn empty_tree_reports_are_empty() {
        let tree = BomTree::new();
        assert!(shopping_list(&tree).entries.is_empty());
        assert!(cost_summary(&tree).lines.is_empty());
        assert_eq!(cost_summary(&tree).total, 0.0);
        assert!(assembly_outline(&tree).is_empty());
    }
}
