//! # BOMForge Tree Model
//!
//! In-memory hierarchical bill-of-materials model: a mutable tree of
//! assemblies and parts with cost aggregation, a non-fatal validation sweep,
//! derived report data, and bidirectional serialization to the `<bom>` XML
//! wire format.
//!
//! ## Key types
//!
//! - **BomTree**: the model itself — arena-owned nodes, a single designated
//!   root, and a per-instance id counter that restarts on every full reload
//! - **BomNode / NodeKind / Part**: the two node variants and their fields
//! - **BomValidator / ValidationReport**: warning sweep over the whole tree
//! - **ShoppingList / CostSummary / OutlineItem**: derived report data
//!
//! ## Boundaries
//!
//! The model is single-threaded and synchronous and performs no I/O: XML
//! text passes through it as strings, and reading or writing files is the
//! caller's responsibility. Structural parse failures surface as
//! [`BomError`]; malformed numeric field input never errors, it is coerced
//! to safe defaults (quantity 1, cost 0).

pub mod error;
pub mod node;
pub mod reports;
pub mod sample;
pub mod tree;
pub mod validation;
pub mod xml;

#[cfg(test)]
mod property_tests;

pub use error::{BomError, BomResult};
pub use node::{
    coerce_cost, coerce_quantity, BomNode, NodeId, NodeKind, Part, PartInit, PartUpdate,
    DEFAULT_ASSEMBLY_NAME, DEFAULT_PART_NAME, ROOT_ASSEMBLY_NAME,
};
pub use reports::{
    assembly_outline, cost_summary, shopping_list, CostLine, CostSummary, OutlineItem,
    ShoppingList, ShoppingListEntry,
};
pub use sample::SAMPLE_BOM_XML;
pub use tree::BomTree;
pub use validation::{
    BomValidator, ValidationIssue, ValidationReport, ValidationSeverity, ValidationSummary,
};
pub use xml::XML_DECLARATION;
