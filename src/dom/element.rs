use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Tags that never count as content when indexing siblings
pub const NON_CONTENT_TAGS: [&str; 7] = [
    "#cdata-section",
    "cdata",
    "meta",
    "title",
    "link",
    "style",
    "script",
];

/// Check whether a tag name denotes a content element
pub fn is_content_tag(tag: &str) -> bool {
    !NON_CONTENT_TAGS
        .iter()
        .any(|excluded| excluded.eq_ignore_ascii_case(tag))
}

/// Represents a DOM element in a page snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementNode {
    /// HTML tag name (e.g., "div", "button", "input")
    pub tag_name: String,

    /// Element attributes in document order
    #[serde(default)]
    pub attributes: IndexMap<String, String>,

    /// Text directly owned by the element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,

    /// Child elements
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementNode>,
}

impl ElementNode {
    /// Create a new ElementNode
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: IndexMap::new(),
            text_content: None,
            children: Vec::new(),
        }
    }

    /// Builder method: add one attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_attribute(key, value);
        self
    }

    /// Builder method: set text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    /// Builder method: set children
    pub fn with_children(mut self, children: Vec<ElementNode>) -> Self {
        self.children = children;
        self
    }

    /// Builder method: append a child
    pub fn with_child(mut self, child: ElementNode) -> Self {
        self.children.push(child);
        self
    }

    /// Add a single attribute
    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_node_creation() {
        let element = ElementNode::new("button")
            .with_attribute("id", "test-id")
            .with_attribute("class", "btn primary")
            .with_text("Click me");

        assert_eq!(element.tag_name, "button");
        assert_eq!(element.attributes.get("id").map(String::as_str), Some("test-id"));
        assert_eq!(element.text_content, Some("Click me".to_string()));
        let keys: Vec<_> = element.attributes.keys().cloned().collect();
        assert_eq!(keys, vec!["id", "class"]);
    }

    #[test]
    fn test_content_tags() {
        assert!(is_content_tag("div"));
        assert!(is_content_tag("BODY"));
        assert!(!is_content_tag("SCRIPT"));
        assert!(!is_content_tag("meta"));
    }

    #[test]
    fn test_deserialize_snapshot() {
        let json = r#"{
            "tag_name": "div",
            "attributes": {"id": "a", "class": "box"},
            "children": [{"tag_name": "span", "text_content": "Hi"}]
        }"#;

        let element: ElementNode = serde_json::from_str(json).unwrap();
        assert_eq!(element.tag_name, "div");
        assert_eq!(element.children.len(), 1);
        assert_eq!(element.children[0].text_content.as_deref(), Some("Hi"));
        assert!(element.children[0].attributes.is_empty());
    }
}
