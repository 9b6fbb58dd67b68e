//! Read-only tree access used by the resolution engine

use crate::error::{ResolveError, Result};
use std::fmt::Debug;
use std::hash::Hash;

/// Kind of a node in a navigable tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Browser-level pseudo-node above documents
    Browser,
    /// Document node owning the element tree
    Document,
    /// Location pseudo-node (the document's address)
    Location,
    /// Regular element
    Element,
}

impl NodeKind {
    /// Document/location/browser-level nodes have no stable sibling ordering
    pub fn is_pseudo(&self) -> bool {
        !matches!(self, NodeKind::Element)
    }
}

/// Read-only navigation over a document tree.
///
/// Node handles are cheap copies; the tree must stay unchanged while a
/// resolution call is running.
pub trait DomNavigator {
    /// Node handle type
    type Node: Copy + Eq + Hash + Debug;

    /// The document node of this tree
    fn document(&self) -> Self::Node;

    /// Parent of a node, `None` for the document or detached nodes
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Child nodes in document order
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Kind of the node
    fn node_kind(&self, node: Self::Node) -> NodeKind;

    /// Tag name as recorded in the document (`#document` for documents)
    fn tag_name(&self, node: Self::Node) -> &str;

    /// Attribute value, if present
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// Names of all attributes on the node, in document order
    fn attribute_names(&self, node: Self::Node) -> Vec<&str>;

    /// Text directly owned by the node (not contributed by child elements)
    fn own_text(&self, node: Self::Node) -> Option<&str>;

    /// Concatenated text of the node and its descendants
    fn text_content(&self, node: Self::Node) -> String;

    /// Serialized markup of the node's contents
    fn inner_html(&self, node: Self::Node) -> String;

    /// Evaluate a path query relative to `context`.
    ///
    /// Each returned item is fetched separately so a single failing item
    /// does not invalidate the rest.
    fn evaluate_path(
        &self,
        _context: Self::Node,
        _query: &str,
    ) -> Result<Vec<Result<Self::Node>>> {
        Err(ResolveError::PathQueryUnsupported)
    }

    /// Descendants of `node` in document order, excluding `node` itself
    fn descendants(&self, node: Self::Node) -> Vec<Self::Node> {
        let mut out = Vec::new();
        let mut stack: Vec<Self::Node> = self.children(node).into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).into_iter().rev());
        }
        out
    }

    /// Nearest document-kind ancestor, or the node itself if it is one
    fn owning_document(&self, node: Self::Node) -> Option<Self::Node> {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if self.node_kind(candidate) == NodeKind::Document {
                return Some(candidate);
            }
            current = self.parent(candidate);
        }
        None
    }
}
