//! BOM node types.
//!
//! A tree is made of two node kinds: assemblies, which group children and
//! carry no cost of their own, and parts, which are leaves with a unit cost,
//! a quantity, and descriptive metadata. Nodes are identified by a `NodeId`
//! allocated from a per-tree monotonic counter; ids are never reused within
//! one loaded tree and restart from zero on a full reload.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Default name for an assembly created without one.
pub const DEFAULT_ASSEMBLY_NAME: &str = "New Assembly";
/// Default name for a part created without one.
pub const DEFAULT_PART_NAME: &str = "New Part";
/// Name of the synthetic root assembly created when none exists.
pub const ROOT_ASSEMBLY_NAME: &str = "Root Assembly";

/// Stable identity of a node for the lifetime of one loaded tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

/// A part: leaf node with unit cost, quantity, and descriptive metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Part {
    #[validate(length(min = 1, message = "Part name is required"))]
    pub name: String,
    pub sku: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,
    #[validate(range(min = 0.0, message = "Cost must be non-negative"))]
    pub cost: f64,
    pub supplier: String,
    pub description: String,
    pub compatibility: Vec<String>,
}

impl Part {
    /// Unit cost times quantity.
    pub fn extended_cost(&self) -> f64 {
        self.cost * f64::from(self.quantity)
    }
}

impl Default for Part {
    fn default() -> Self {
        Self {
            name: DEFAULT_PART_NAME.to_string(),
            sku: String::new(),
            quantity: 1,
            cost: 0.0,
            supplier: String::new(),
            description: String::new(),
            compatibility: Vec::new(),
        }
    }
}

/// Loose creation payload for `BomTree::create_part`; unset fields fall back
/// to defaults (name `"New Part"`, quantity 1, cost 0, the rest empty).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartInit {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub quantity: Option<u32>,
    pub cost: Option<f64>,
    pub supplier: Option<String>,
    pub description: Option<String>,
    pub compatibility: Option<Vec<String>>,
}

/// Field-level edit payload for `BomTree::update_part`.
///
/// Quantity and cost arrive as raw text, as typed into a form field, and are
/// coerced to safe values rather than rejected: anything that does not parse
/// to a number at least 1 becomes 1, anything that is not a finite
/// non-negative number becomes 0.
#[derive(Debug, Clone, Default)]
pub struct PartUpdate {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub quantity: Option<String>,
    pub cost: Option<String>,
    pub supplier: Option<String>,
    pub description: Option<String>,
    pub compatibility: Option<Vec<String>>,
}

/// Coerce raw quantity input to an integer >= 1.
pub fn coerce_quantity(input: &str) -> u32 {
    match input.trim().parse::<i64>() {
        Ok(q) if q >= 1 => q.min(i64::from(u32::MAX)) as u32,
        _ => 1,
    }
}

/// Coerce raw cost input to a finite decimal >= 0.
pub fn coerce_cost(input: &str) -> f64 {
    match input.trim().parse::<f64>() {
        Ok(c) if c.is_finite() && c >= 0.0 => c,
        _ => 0.0,
    }
}

/// Floor an already-numeric quantity at 1.
pub fn clamp_quantity(quantity: u32) -> u32 {
    quantity.max(1)
}

/// Floor an already-numeric cost at 0, mapping non-finite values to 0.
pub fn clamp_cost(cost: f64) -> f64 {
    if cost.is_finite() && cost >= 0.0 {
        cost
    } else {
        0.0
    }
}

/// The two node variants of the BOM tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Assembly { name: String, children: Vec<NodeId> },
    Part(Part),
}

/// A node in the tree: identity, a non-owning parent back-reference, and the
/// variant payload. The parent's child list is the sole owning relationship;
/// `parent` is a lookup-only index kept consistent by every structural
/// mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
}

impl BomNode {
    pub fn name(&self) -> &str {
        match &self.kind {
            NodeKind::Assembly { name, .. } => name,
            NodeKind::Part(part) => &part.name,
        }
    }

    pub fn is_assembly(&self) -> bool {
        matches!(self.kind, NodeKind::Assembly { .. })
    }

    pub fn is_part(&self) -> bool {
        matches!(self.kind, NodeKind::Part(_))
    }

    pub fn as_part(&self) -> Option<&Part> {
        match &self.kind {
            NodeKind::Part(part) => Some(part),
            NodeKind::Assembly { .. } => None,
        }
    }

    /// Child ids in insertion order; empty for parts.
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Assembly { children, .. } => children,
            NodeKind::Part(_) => &[],
        }
    }
}
