//! Document model used by the resolution engine
//!
//! This module provides:
//! - ElementNode: serializable description of an element snapshot
//! - DomTree: navigable document built from a snapshot
//! - DomNavigator: the read-only tree abstraction the engine works against
//! - xpath: the path query language used by element paths

pub mod element;
pub mod navigator;
pub mod tree;
pub mod xpath;

pub use element::{ElementNode, NON_CONTENT_TAGS, is_content_tag};
pub use navigator::{DomNavigator, NodeKind};
pub use tree::{DOCUMENT_TAG, DomTree, NodeId};

use crate::error::Result;

/// Build a document from a JSON element snapshot
pub fn load_snapshot(json: &str, url: Option<&str>) -> Result<DomTree> {
    let tree = DomTree::from_json(json)?;
    Ok(match url {
        Some(url) => tree.with_url(url),
        None => tree,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_node_export() {
        let element = ElementNode::new("div");
        assert_eq!(element.tag_name, "div");
    }

    #[test]
    fn test_load_snapshot() {
        let json = r#"{"tag_name": "html", "children": [{"tag_name": "body"}]}"#;
        let tree = load_snapshot(json, Some("https://example.com/")).unwrap();
        assert_eq!(tree.count_elements(), 2);
        assert_eq!(tree.url(), Some("https://example.com/"));

        assert!(load_snapshot("not json", None).is_err());
    }
}
