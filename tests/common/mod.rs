#![allow(dead_code)]

use replay_locator::{DomNavigator, DomTree, NodeId, NodeKind};
use serde_json::{Value, json};

/// Build a tree from a `json!` element snapshot
pub fn tree_from(snapshot: Value) -> DomTree {
    DomTree::from_json(&snapshot.to_string()).expect("valid snapshot")
}

/// Checkout page as it looked when the step was recorded
pub fn recorded_checkout() -> Value {
    json!({
        "tag_name": "html",
        "children": [
            {"tag_name": "head", "children": [
                {"tag_name": "title", "text_content": "Checkout"},
                {"tag_name": "script"}
            ]},
            {"tag_name": "body", "children": [
                {"tag_name": "form", "attributes": {"id": "checkout", "method": "post"}, "children": [
                    {"tag_name": "input", "attributes": {"name": "email", "type": "email"}},
                    {"tag_name": "input", "attributes": {"name": "promo"}},
                    {"tag_name": "button", "attributes": {"type": "submit"}, "text_content": "Pay now"}
                ]}
            ]}
        ]
    })
}

/// Same page after a redesign: a banner was added and the form renamed
pub fn redesigned_checkout() -> Value {
    json!({
        "tag_name": "html",
        "children": [
            {"tag_name": "head", "children": [
                {"tag_name": "title", "text_content": "Checkout"}
            ]},
            {"tag_name": "body", "children": [
                {"tag_name": "div", "attributes": {"class": "banner"}, "text_content": "Free shipping today"},
                {"tag_name": "form", "attributes": {"id": "checkout-v2", "method": "post"}, "children": [
                    {"tag_name": "input", "attributes": {"name": "email", "type": "email"}},
                    {"tag_name": "input", "attributes": {"name": "promo"}},
                    {"tag_name": "button", "attributes": {"type": "submit", "class": "primary"}, "text_content": "Pay now"}
                ]}
            ]}
        ]
    })
}

/// Descriptors captured for the pay button on the recorded page
pub fn pay_button_descriptors() -> Value {
    json!({
        "fingerprint": "1:2:1:3",
        "elementPath": "//form[@id='checkout']/button",
        "breadcrumbs": [
            {"tag": "BUTTON", "index": 0, "attributes": {"type": "submit", "textproxy": "Pay now"}, "numAttributes": 1},
            {"tag": "FORM", "index": 0, "attributes": {"id": "checkout"}, "numAttributes": 2},
            {"tag": "BODY", "index": 0},
            {"tag": "HTML", "index": 0}
        ]
    })
}

/// A tree view without path query support that can cut one subtree off
/// from its document
pub struct LimitedTree<'a> {
    pub inner: &'a DomTree,
    pub detached: Option<NodeId>,
}

impl<'a> LimitedTree<'a> {
    pub fn new(inner: &'a DomTree) -> Self {
        Self { inner, detached: None }
    }

    pub fn detaching(inner: &'a DomTree, node: NodeId) -> Self {
        Self {
            inner,
            detached: Some(node),
        }
    }
}

impl DomNavigator for LimitedTree<'_> {
    type Node = NodeId;

    fn document(&self) -> NodeId {
        self.inner.document()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        if self.detached == Some(node) {
            return None;
        }
        self.inner.parent(node)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner
            .children(node)
            .into_iter()
            .filter(|child| self.detached != Some(*child))
            .collect()
    }

    fn node_kind(&self, node: NodeId) -> NodeKind {
        self.inner.node_kind(node)
    }

    fn tag_name(&self, node: NodeId) -> &str {
        self.inner.tag_name(node)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.inner.attribute(node, name)
    }

    fn attribute_names(&self, node: NodeId) -> Vec<&str> {
        self.inner.attribute_names(node)
    }

    fn own_text(&self, node: NodeId) -> Option<&str> {
        self.inner.own_text(node)
    }

    fn text_content(&self, node: NodeId) -> String {
        self.inner.text_content(node)
    }

    fn inner_html(&self, node: NodeId) -> String {
        self.inner.inner_html(node)
    }
}
