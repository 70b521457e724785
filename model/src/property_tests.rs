//! Property-based tests for the BOM tree model: serialization round-trip
//! fidelity, cost aggregation, and id uniqueness across arbitrary trees.

use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;

use crate::node::{NodeId, Part, PartInit};
use crate::tree::BomTree;

// Free text including the five XML metacharacters, so every round-trip also
// exercises escaping. No leading/trailing whitespace: the XML reader trims
// text content, and the edit paths trim on the way in.
const TEXT: &str = r#"[A-Za-z0-9&<>'"]{1,12}"#;

prop_compose! {
    fn arb_part_init()(
        name in TEXT,
        sku in option::of("[A-Z0-9-]{2,8}"),
        quantity in option::of(1u32..50),
        cost in option::of(0.0f64..250.0),
        supplier in option::of(TEXT),
        description in option::of(TEXT),
        compatibility in option::of(vec(TEXT, 1..3)),
    ) -> PartInit {
        PartInit {
            name: Some(name),
            sku,
            quantity,
            cost,
            supplier,
            description,
            compatibility,
        }
    }
}

#[derive(Debug, Clone)]
enum NodeSpec {
    Part(PartInit),
    Assembly(String, Vec<NodeSpec>),
}

fn arb_node_spec() -> impl Strategy<Value = NodeSpec> {
    let leaf = arb_part_init().prop_map(NodeSpec::Part);
    leaf.prop_recursive(3, 16, 4, |inner| {
        (TEXT, vec(inner, 0..4)).prop_map(|(name, children)| NodeSpec::Assembly(name, children))
    })
}

fn build_children(tree: &mut BomTree, parent: NodeId, specs: &[NodeSpec]) {
    // assemblies first, so the built order is on the loader's
    // order-preserving path
    for spec in specs {
        if let NodeSpec::Assembly(name, children) = spec {
            let id = tree.create_assembly(name, Some(parent));
            build_children(tree, id, children);
        }
    }
    for spec in specs {
        if let NodeSpec::Part(init) = spec {
            tree.create_part(init.clone(), Some(parent));
        }
    }
}

prop_compose! {
    fn arb_tree()(name in TEXT, children in vec(arb_node_spec(), 0..5)) -> BomTree {
        let mut tree = BomTree::new();
        let root = tree.create_assembly(&name, None);
        build_children(&mut tree, root, &children);
        tree
    }
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

/// Identity-free view of a tree: depth, name, and part payload per node in
/// pre-order.
fn snapshot(tree: &BomTree) -> Vec<(usize, String, Option<Part>)> {
    tree.pre_order()
        .into_iter()
        .map(|id| {
            let node = tree.node(id).expect("traversal only yields live nodes");
            (
                depth_of(tree, id),
                node.name().to_string(),
                node.as_part().cloned(),
            )
        })
        .collect()
}

proptest! {
    /// Serialize-then-parse reconstructs the same shape, names, and part
    /// fields; only node ids are renumbered.
    #[test]
    fn roundtrip_preserves_shape_and_fields(tree in arb_tree()) {
        let reparsed = BomTree::from_xml(&tree.to_xml()).unwrap();
        prop_assert_eq!(snapshot(&reparsed), snapshot(&tree));
    }

    /// An assembly's cost is exactly the sum of its children's costs, and
    /// the tree total matches the flat sum over all parts.
    #[test]
    fn cost_is_additive(tree in arb_tree()) {
        let root = tree.root().unwrap();
        let child_sum: f64 = tree.children(root).iter().map(|c| tree.cost_of(*c)).sum();
        let total = tree.total_cost();
        prop_assert!((tree.cost_of(root) - child_sum).abs() <= 1e-6 * child_sum.abs().max(1.0));

        let part_sum: f64 = tree
            .all_parts()
            .iter()
            .filter_map(|id| tree.part(*id))
            .map(Part::extended_cost)
            .sum();
        prop_assert!((total - part_sum).abs() <= 1e-6 * part_sum.abs().max(1.0));
    }

    /// Ids are pairwise distinct, and a reload restarts the counter.
    #[test]
    fn ids_are_unique_and_restart_on_reload(tree in arb_tree()) {
        let mut ids = tree.pre_order();
        let count = ids.len();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), count);

        let reparsed = BomTree::from_xml(&tree.to_xml()).unwrap();
        prop_assert_eq!(reparsed.root().unwrap().raw(), 0);
        let mut new_ids = reparsed.pre_order();
        let new_count = new_ids.len();
        new_ids.sort();
        new_ids.dedup();
        prop_assert_eq!(new_ids.len(), new_count);
    }

    /// Deleting any direct child of the root removes its whole subtree from
    /// every traversal.
    #[test]
    fn delete_removes_subtree(tree in arb_tree(), pick in any::<prop::sample::Index>()) {
        let mut tree = tree;
        let root = tree.root().unwrap();
        let children = tree.children(root).to_vec();
        prop_assume!(!children.is_empty());
        let victim = children[pick.index(children.len())];

        let mut doomed = vec![victim];
        let mut stack = vec![victim];
        while let Some(id) = stack.pop() {
            for child in tree.children(id).to_vec() {
                doomed.push(child);
                stack.push(child);
            }
        }

        tree.delete_item(victim);
        let remaining = tree.pre_order();
        for id in doomed {
            prop_assert!(!remaining.contains(&id));
        }
    }

    /// Quantity coercion never yields anything below 1, cost coercion never
    /// yields a negative or non-finite value, for completely arbitrary input.
    #[test]
    fn coercion_is_total(input in ".{0,20}") {
        prop_assert!(crate::node::coerce_quantity(&input) >= 1);
        let cost = crate::node::coerce_cost(&input);
        prop_assert!(cost.is_finite() && cost >= 0.0);
    }
}
