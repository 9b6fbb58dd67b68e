use crate::dom::element::ElementNode;
use crate::dom::navigator::{DomNavigator, NodeKind};
use crate::dom::xpath;
use crate::error::{ResolveError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Tag name reported for the document node
pub const DOCUMENT_TAG: &str = "#document";

/// Handle to a node inside a [`DomTree`]. Ordering follows document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in document order (the document is 0)
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    tag_name: String,
    attributes: IndexMap<String, String>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Represents a page snapshot as a navigable document.
///
/// The tree always starts with a synthetic `#document` node whose single
/// child is the top-level element of the snapshot.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<NodeData>,
}

impl DomTree {
    /// Build a document around the given root element
    pub fn new(root: ElementNode) -> Self {
        let mut tree = Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                tag_name: DOCUMENT_TAG.to_string(),
                attributes: IndexMap::new(),
                text: None,
                parent: None,
                children: Vec::new(),
            }],
        };
        tree.insert(&root, NodeId(0));
        tree
    }

    /// Parse a JSON element snapshot into a document
    pub fn from_json(json: &str) -> Result<Self> {
        let root: ElementNode = serde_json::from_str(json)?;
        Ok(Self::new(root))
    }

    /// Builder method: record the document's URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.nodes[0].attributes.insert("url".to_string(), url.into());
        self
    }

    /// URL of the document, when known
    pub fn url(&self) -> Option<&str> {
        self.nodes[0].attributes.get("url").map(String::as_str)
    }

    fn insert(&mut self, element: &ElementNode, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind: NodeKind::Element,
            tag_name: element.tag_name.clone(),
            attributes: element.attributes.clone(),
            text: element.text_content.clone(),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);

        for child in &element.children {
            self.insert(child, id);
        }
        id
    }

    fn data(&self, node: NodeId) -> Option<&NodeData> {
        self.nodes.get(node.0)
    }

    /// The top-level content container (the snapshot's root element)
    pub fn document_element(&self) -> Option<NodeId> {
        self.nodes[0].children.first().copied()
    }

    /// Look up a node handle by its document-order position
    pub fn node(&self, index: usize) -> Option<NodeId> {
        (index < self.nodes.len()).then_some(NodeId(index))
    }

    /// Count element nodes in the tree
    pub fn count_elements(&self) -> usize {
        self.nodes.len() - 1
    }

    /// First element carrying the given `id` attribute
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.attributes.get("id").is_some_and(|v| v == id))
            .map(NodeId)
    }

    /// All elements with the given tag, in document order
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.kind == NodeKind::Element && n.tag_name.eq_ignore_ascii_case(tag))
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    /// Short description of a node for logs
    pub fn describe(&self, node: NodeId) -> String {
        match self.data(node) {
            Some(data) if data.kind == NodeKind::Element => {
                let mut out = format!("<{}", data.tag_name);
                if let Some(id) = data.attributes.get("id") {
                    out.push_str(&format!(" id=\"{}\"", id));
                }
                out.push('>');
                out
            }
            Some(data) => data.tag_name.clone(),
            None => format!("<invalid node {}>", node.0),
        }
    }

    fn collect_text(&self, node: NodeId, pieces: &mut Vec<String>) {
        let Some(data) = self.data(node) else {
            return;
        };
        if let Some(text) = &data.text {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                pieces.push(trimmed.to_string());
            }
        }
        for child in &data.children {
            self.collect_text(*child, pieces);
        }
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.data(node) else {
            return;
        };
        out.push('<');
        out.push_str(&data.tag_name);
        for (name, value) in &data.attributes {
            out.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
        }
        out.push('>');
        self.write_contents(data, out);
        out.push_str(&format!("</{}>", data.tag_name));
    }

    fn write_contents(&self, data: &NodeData, out: &mut String) {
        if let Some(text) = &data.text {
            out.push_str(&escape_html(text));
        }
        for child in &data.children {
            self.write_html(*child, out);
        }
    }
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl DomNavigator for DomTree {
    type Node = NodeId;

    fn document(&self) -> NodeId {
        NodeId(0)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.data(node).and_then(|n| n.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.data(node).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn node_kind(&self, node: NodeId) -> NodeKind {
        self.data(node).map_or(NodeKind::Element, |n| n.kind)
    }

    fn tag_name(&self, node: NodeId) -> &str {
        self.data(node).map_or("", |n| n.tag_name.as_str())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.data(node)
            .and_then(|n| n.attributes.get(name))
            .map(String::as_str)
    }

    fn attribute_names(&self, node: NodeId) -> Vec<&str> {
        self.data(node)
            .map(|n| n.attributes.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn own_text(&self, node: NodeId) -> Option<&str> {
        self.data(node).and_then(|n| n.text.as_deref())
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut pieces = Vec::new();
        self.collect_text(node, &mut pieces);
        pieces.join(" ")
    }

    fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        if let Some(data) = self.data(node) {
            self.write_contents(data, &mut out);
        }
        out
    }

    fn evaluate_path(&self, context: NodeId, query: &str) -> Result<Vec<Result<NodeId>>> {
        if self.data(context).is_none() {
            return Err(ResolveError::NodeNotFound(format!("node {}", context.0)));
        }
        let nodes = xpath::evaluate(self, context, query)?;
        Ok(nodes.into_iter().map(Ok).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_tree() -> DomTree {
        let root = ElementNode::new("html").with_child(
            ElementNode::new("body")
                .with_child(
                    ElementNode::new("header").with_child(
                        ElementNode::new("button")
                            .with_attribute("id", "nav-btn")
                            .with_text("Menu"),
                    ),
                )
                .with_child(
                    ElementNode::new("main")
                        .with_child(
                            ElementNode::new("a")
                                .with_attribute("href", "/page")
                                .with_text("Click here"),
                        )
                        .with_child(
                            ElementNode::new("div")
                                .with_attribute("class", "content")
                                .with_text("Some text"),
                        ),
                ),
        );
        DomTree::new(root)
    }

    #[test]
    fn test_dom_tree_creation() {
        let tree = create_test_tree();
        let doc = tree.document();

        assert_eq!(tree.node_kind(doc), NodeKind::Document);
        assert_eq!(tree.tag_name(doc), DOCUMENT_TAG);
        let html = tree.document_element().unwrap();
        assert_eq!(tree.tag_name(html), "html");
        assert_eq!(tree.parent(html), Some(doc));
        assert_eq!(tree.count_elements(), 7);
    }

    #[test]
    fn test_document_order() {
        let tree = create_test_tree();
        let order: Vec<_> = tree
            .descendants(tree.document())
            .into_iter()
            .map(|n| tree.tag_name(n).to_string())
            .collect();
        assert_eq!(order, vec!["html", "body", "header", "button", "main", "a", "div"]);

        let ids: Vec<_> = tree.descendants(tree.document()).iter().map(|n| n.index()).collect();
        assert_eq!(ids, (1..=7).collect::<Vec<_>>());
    }

    #[test]
    fn test_find_by_id_and_tag() {
        let tree = create_test_tree();
        let button = tree.find_by_id("nav-btn").unwrap();
        assert_eq!(tree.tag_name(button), "button");
        assert_eq!(tree.elements_by_tag("A").len(), 1);
        assert!(tree.find_by_id("missing").is_none());
    }

    #[test]
    fn test_text_and_html() {
        let tree = create_test_tree();
        let main = tree.elements_by_tag("main")[0];
        assert_eq!(tree.text_content(main), "Click here Some text");
        assert_eq!(
            tree.inner_html(main),
            "<a href=\"/page\">Click here</a><div class=\"content\">Some text</div>"
        );
    }

    #[test]
    fn test_url_and_owning_document() {
        let tree = create_test_tree().with_url("https://example.com/app");
        assert_eq!(tree.url(), Some("https://example.com/app"));
        assert_eq!(tree.attribute(tree.document(), "url"), Some("https://example.com/app"));

        let button = tree.find_by_id("nav-btn").unwrap();
        assert_eq!(tree.owning_document(button), Some(tree.document()));
    }

    #[test]
    fn test_invalid_node_handles() {
        let tree = create_test_tree();
        let bogus = NodeId(999);
        assert_eq!(tree.tag_name(bogus), "");
        assert!(tree.parent(bogus).is_none());
        assert!(tree.children(bogus).is_empty());
        assert!(tree.node(999).is_none());
        assert!(tree.evaluate_path(bogus, "//a").is_err());
    }
}
