//! XML serialization of a `BomTree`.

use quick_xml::escape::escape;

use crate::node::{BomNode, NodeId, NodeKind, Part};
use crate::tree::BomTree;

/// Declaration prepended by [`to_xml_document`].
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

/// Serialize the whole tree as a `<bom>` fragment without the XML
/// declaration. An empty tree yields the bare `<bom></bom>` shell.
///
/// Indentation is two spaces per tree depth. All text content is escaped for
/// the five XML metacharacters so the output can always be re-parsed.
pub fn to_xml(tree: &BomTree) -> String {
    let Some(root) = tree.root() else {
        return "<bom></bom>".to_string();
    };
    let mut out = String::from("<bom>\n");
    write_node(tree, root, 1, &mut out);
    out.push_str("</bom>");
    out
}

/// [`to_xml`] with the `<?xml ...?>` declaration prepended, the form written
/// to disk at save boundaries.
pub fn to_xml_document(tree: &BomTree) -> String {
    format!("{XML_DECLARATION}\n{}", to_xml(tree))
}

impl BomTree {
    /// See [`to_xml`].
    pub fn to_xml(&self) -> String {
        to_xml(self)
    }

    /// See [`to_xml_document`].
    pub fn to_xml_document(&self) -> String {
        to_xml_document(self)
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn push_text_element(out: &mut String, depth: usize, tag: &str, text: &str) {
    push_indent(out, depth);
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(&escape(text));
    out.push_str("</");
    out.push_str(tag);
    out.push_str(">\n");
}

fn write_node(tree: &BomTree, id: NodeId, depth: usize, out: &mut String) {
    let Some(node) = tree.node(id) else {
        return;
    };
    match &node.kind {
        NodeKind::Assembly { name, children } => {
            push_indent(out, depth);
            out.push_str("<assembly>\n");
            push_text_element(out, depth + 1, "name", name);
            for child in children {
                write_node(tree, *child, depth + 1, out);
            }
            push_indent(out, depth);
            out.push_str("</assembly>\n");
        }
        NodeKind::Part(part) => write_part(part, depth, out),
    }
}

// Field order is fixed: name, sku, quantity, cost, supplier, description,
// compatibility. Optional text fields are omitted when empty; quantity and
// cost are always present.
fn write_part(part: &Part, depth: usize, out: &mut String) {
    push_indent(out, depth);
    out.push_str("<part>\n");
    push_text_element(out, depth + 1, "name", &part.name);
    if !part.sku.is_empty() {
        push_text_element(out, depth + 1, "sku", &part.sku);
    }
    push_text_element(out, depth + 1, "quantity", &part.quantity.to_string());
    push_text_element(out, depth + 1, "cost", &part.cost.to_string());
    if !part.supplier.is_empty() {
        push_text_element(out, depth + 1, "supplier", &part.supplier);
    }
    if !part.description.is_empty() {
        push_text_element(out, depth + 1, "description", &part.description);
    }
    if !part.compatibility.is_empty() {
        push_indent(out, depth + 1);
        out.push_str("<compatibility>\n");
        for rule in &part.compatibility {
            push_text_element(out, depth + 2, "rule", rule);
        }
        push_indent(out, depth + 1);
        out.push_str("</compatibility>\n");
    }
    push_indent(out, depth);
    out.push_str("</part>\n");
}
