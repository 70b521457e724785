//! XML deserialization into a `BomTree`.

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::error::{BomError, BomResult};
use crate::node::{coerce_cost, coerce_quantity, NodeId, PartInit, ROOT_ASSEMBLY_NAME};
use crate::tree::BomTree;

/// Minimal element tree collected from the event stream before the BOM
/// structural rules are applied.
#[derive(Debug, Default)]
struct XmlElement {
    name: String,
    text: String,
    children: Vec<XmlElement>,
}

/// Parse a BOM document into a fresh tree.
///
/// Fails with a parse error on malformed XML and with `MissingBomRoot` when
/// the document root is not a `bom` element. The tree is built fully
/// detached and only returned on success, so callers swapping it into a
/// model never observe a partially applied load.
///
/// Structural rule for the content of `<bom>`: a single top-level assembly
/// with no top-level parts becomes the root directly; any other mix gets a
/// synthetic `"Root Assembly"` holding all top-level assemblies and parts.
/// At every level assemblies are ingested before parts, each kind keeping
/// its own document order, so a document interleaving parts before
/// assemblies does not round-trip that interleaving.
pub fn from_xml(xml: &str) -> BomResult<BomTree> {
    let doc = parse_element_tree(xml)?;
    if doc.name != "bom" {
        return Err(BomError::MissingBomRoot);
    }

    let mut tree = BomTree::new();
    let assemblies: Vec<&XmlElement> = doc.children.iter().filter(|c| c.name == "assembly").collect();
    let parts: Vec<&XmlElement> = doc.children.iter().filter(|c| c.name == "part").collect();

    if assemblies.len() == 1 && parts.is_empty() {
        build_assembly(&mut tree, assemblies[0], None);
    } else if !assemblies.is_empty() || !parts.is_empty() {
        let root = tree.create_assembly(ROOT_ASSEMBLY_NAME, None);
        for assembly in &assemblies {
            build_assembly(&mut tree, assembly, Some(root));
        }
        for part in &parts {
            build_part(&mut tree, part, root);
        }
    }

    debug!(nodes = tree.node_count(), "loaded BOM document");
    Ok(tree)
}

impl BomTree {
    /// See [`from_xml`].
    pub fn from_xml(xml: &str) -> BomResult<Self> {
        from_xml(xml)
    }

    /// Replace this tree with the parsed document. The id counter restarts
    /// from zero. On a parse error the existing tree is left untouched.
    pub fn load_xml(&mut self, xml: &str) -> BomResult<()> {
        *self = from_xml(xml)?;
        Ok(())
    }
}

fn parse_element_tree(xml: &str) -> BomResult<XmlElement> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if root.is_some() && stack.is_empty() {
                    return Err(BomError::xml("content after document root"));
                }
                stack.push(XmlElement {
                    name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                    ..XmlElement::default()
                });
            }
            Event::Empty(e) => {
                if root.is_some() && stack.is_empty() {
                    return Err(BomError::xml("content after document root"));
                }
                let element = XmlElement {
                    name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                    ..XmlElement::default()
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Text(e) => {
                let text = e.unescape()?;
                match stack.last_mut() {
                    Some(element) => element.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => return Err(BomError::xml("text outside of root element")),
                }
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                if let Some(element) = stack.last_mut() {
                    element.text.push_str(&text);
                }
            }
            Event::End(_) => {
                // mismatched names are already rejected by the reader
                let element = stack
                    .pop()
                    .ok_or_else(|| BomError::xml("unexpected closing tag"))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(BomError::xml("unexpected end of document"));
    }
    root.ok_or_else(|| BomError::xml("no root element"))
}

fn direct_text<'a>(element: &'a XmlElement, name: &str) -> Option<&'a str> {
    element
        .children
        .iter()
        .find(|c| c.name == name)
        .map(|c| c.text.as_str())
}

fn build_assembly(tree: &mut BomTree, element: &XmlElement, parent: Option<NodeId>) -> NodeId {
    let name = direct_text(element, "name")
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("Assembly");
    let id = tree.create_assembly(name, parent);

    for child in element.children.iter().filter(|c| c.name == "assembly") {
        build_assembly(tree, child, Some(id));
    }
    for child in element.children.iter().filter(|c| c.name == "part") {
        build_part(tree, child, id);
    }
    id
}

fn build_part(tree: &mut BomTree, element: &XmlElement, parent: NodeId) -> NodeId {
    let name = direct_text(element, "name")
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("Part");
    let compatibility = element
        .children
        .iter()
        .find(|c| c.name == "compatibility")
        .map(|wrapper| {
            wrapper
                .children
                .iter()
                .filter(|c| c.name == "rule")
                .map(|rule| rule.text.trim().to_string())
                .filter(|rule| !rule.is_empty())
                .collect()
        })
        .unwrap_or_default();

    tree.create_part(
        PartInit {
            name: Some(name.to_string()),
            sku: Some(direct_text(element, "sku").unwrap_or_default().to_string()),
            quantity: Some(coerce_quantity(direct_text(element, "quantity").unwrap_or("1"))),
            cost: Some(coerce_cost(direct_text(element, "cost").unwrap_or("0"))),
            supplier: Some(direct_text(element, "supplier").unwrap_or_default().to_string()),
            description: Some(
                direct_text(element, "description")
                    .unwrap_or_default()
                    .to_string(),
            ),
            compatibility: Some(compatibility),
        },
        Some(parent),
    )
}
