//! Non-fatal validation sweep over a BOM tree.
//!
//! Validation never blocks a mutation or a save; it walks the tree via the
//! pre-order traversals and collects warnings for the user: parts or
//! assemblies with empty names, quantities below 1, negative or non-numeric
//! costs. The tree's own edit paths coerce bad numeric input on the way in,
//! so in practice these fire on data assembled outside the edit API.

use serde::Serialize;
use validator::Validate;

use crate::node::{NodeId, Part};
use crate::tree::BomTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

/// Single validation finding tied to a node in the tree.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    pub node: Option<NodeId>,
    pub field: Option<String>,
    pub message: String,
    pub suggestion: Option<String>,
}

/// Summary statistics for one sweep.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationSummary {
    pub total_parts: usize,
    pub total_assemblies: usize,
    pub unnamed_parts: usize,
    pub unnamed_assemblies: usize,
    pub invalid_quantities: usize,
    pub invalid_costs: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub warning_count: usize,
    pub issues: Vec<ValidationIssue>,
    pub summary: ValidationSummary,
}

/// Whole-tree validator.
pub struct BomValidator {
    require_part_name: bool,
    require_assembly_name: bool,
}

impl Default for BomValidator {
    fn default() -> Self {
        Self {
            require_part_name: true,
            require_assembly_name: true,
        }
    }
}

impl BomValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_part_name_required(mut self, required: bool) -> Self {
        self.require_part_name = required;
        self
    }

    pub fn with_assembly_name_required(mut self, required: bool) -> Self {
        self.require_assembly_name = required;
        self
    }

    /// Run the sweep. Warnings are collected into the report; nothing is
    /// mutated and nothing fails.
    pub fn validate(&self, tree: &BomTree) -> ValidationReport {
        let mut issues = Vec::new();
        let mut summary = ValidationSummary {
            total_parts: 0,
            total_assemblies: 0,
            unnamed_parts: 0,
            unnamed_assemblies: 0,
            invalid_quantities: 0,
            invalid_costs: 0,
        };

        for id in tree.all_parts() {
            let Some(part) = tree.part(id) else { continue };
            summary.total_parts += 1;
            let found = check_part(part, id, self.require_part_name);
            for issue in &found {
                match issue.field.as_deref() {
                    Some("name") => summary.unnamed_parts += 1,
                    Some("quantity") => summary.invalid_quantities += 1,
                    Some("cost") => summary.invalid_costs += 1,
                    _ => {}
                }
            }
            issues.extend(found);
        }

        for id in tree.all_assemblies() {
            let Some(node) = tree.node(id) else { continue };
            summary.total_assemblies += 1;
            if self.require_assembly_name && node.name().trim().is_empty() {
                summary.unnamed_assemblies += 1;
                issues.push(ValidationIssue {
                    severity: ValidationSeverity::Warning,
                    node: Some(id),
                    field: Some("name".to_string()),
                    message: "Assembly missing required field: name".to_string(),
                    suggestion: Some("Give the assembly a descriptive name".to_string()),
                });
            }
        }

        let warning_count = issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Warning)
            .count();
        ValidationReport {
            is_valid: issues.is_empty(),
            warning_count,
            issues,
            summary,
        }
    }
}

/// Field checks for a single part, driven by the `validator` derive on
/// [`Part`] plus a non-finite cost check for values the range rule lets
/// through (infinity compares above the minimum).
fn check_part(part: &Part, id: NodeId, require_name: bool) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if let Err(errors) = part.validate() {
        for (field, field_errors) in errors.field_errors() {
            if field == "name" && !require_name {
                continue;
            }
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Validation failed for field '{field}'"));
                issues.push(ValidationIssue {
                    severity: ValidationSeverity::Warning,
                    node: Some(id),
                    field: Some(field.to_string()),
                    message: format!("Part \"{}\": {message}", part.name),
                    suggestion: suggestion_for(field),
                });
            }
        }
    }

    if part.cost.is_infinite() {
        issues.push(ValidationIssue {
            severity: ValidationSeverity::Warning,
            node: Some(id),
            field: Some("cost".to_string()),
            message: format!("Part \"{}\": cost is not a finite number", part.name),
            suggestion: suggestion_for("cost"),
        });
    }

    issues
}

fn suggestion_for(field: &str) -> Option<String> {
    match field {
        "name" => Some("Give the part a descriptive name".to_string()),
        "quantity" => Some("Set a quantity of at least 1".to_string()),
        "cost" => Some("Set a non-negative unit cost".to_string()),
        _ => None,
    }
}
