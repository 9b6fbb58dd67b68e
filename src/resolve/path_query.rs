use crate::dom::DomNavigator;
use crate::error::{ResolveError, Result};

/// Evaluates element path queries against a node's owning document
#[derive(Debug, Clone, Copy, Default)]
pub struct PathQueryEvaluator;

impl PathQueryEvaluator {
    /// Nodes selected by `query` relative to `node`, in document order.
    ///
    /// Never fails: unsupported documents, detached nodes and malformed
    /// queries all produce an empty list, and result items that cannot be
    /// retrieved are skipped.
    pub fn evaluate<T: DomNavigator>(&self, tree: &T, node: T::Node, query: &str) -> Vec<T::Node> {
        match self.try_evaluate(tree, node, query) {
            Ok(nodes) => nodes,
            Err(e) => {
                log::debug!("Path query '{}' produced no results: {}", query, e);
                Vec::new()
            }
        }
    }

    /// Like [`evaluate`](Self::evaluate), but reports why nothing could be evaluated
    pub fn try_evaluate<T: DomNavigator>(&self, tree: &T, node: T::Node, query: &str) -> Result<Vec<T::Node>> {
        if query.trim().is_empty() {
            return Err(ResolveError::path_query(0, "empty path query"));
        }
        tree.owning_document(node).ok_or(ResolveError::DetachedNode)?;

        let items = tree.evaluate_path(node, query)?;
        let mut nodes = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match item {
                Ok(found) => nodes.push(found),
                Err(e) => log::debug!("Skipping path query result {}: {}", index, e),
            }
        }
        Ok(nodes)
    }

    /// First node selected by `query`, if any
    pub fn first<T: DomNavigator>(&self, tree: &T, node: T::Node, query: &str) -> Option<T::Node> {
        self.evaluate(tree, node, query).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{DomTree, ElementNode, NodeKind};

    fn sample() -> DomTree {
        DomTree::new(
            ElementNode::new("html").with_child(
                ElementNode::new("body")
                    .with_child(ElementNode::new("p").with_attribute("id", "one"))
                    .with_child(ElementNode::new("p").with_attribute("id", "two")),
            ),
        )
    }

    /// Wraps a tree, dropping path support or failing selected result items
    struct Flaky<'a> {
        inner: &'a DomTree,
        supports_paths: bool,
    }

    impl DomNavigator for Flaky<'_> {
        type Node = crate::dom::NodeId;

        fn document(&self) -> Self::Node {
            self.inner.document()
        }
        fn parent(&self, node: Self::Node) -> Option<Self::Node> {
            self.inner.parent(node)
        }
        fn children(&self, node: Self::Node) -> Vec<Self::Node> {
            self.inner.children(node)
        }
        fn node_kind(&self, node: Self::Node) -> NodeKind {
            self.inner.node_kind(node)
        }
        fn tag_name(&self, node: Self::Node) -> &str {
            self.inner.tag_name(node)
        }
        fn attribute(&self, node: Self::Node, name: &str) -> Option<&str> {
            self.inner.attribute(node, name)
        }
        fn attribute_names(&self, node: Self::Node) -> Vec<&str> {
            self.inner.attribute_names(node)
        }
        fn own_text(&self, node: Self::Node) -> Option<&str> {
            self.inner.own_text(node)
        }
        fn text_content(&self, node: Self::Node) -> String {
            self.inner.text_content(node)
        }
        fn inner_html(&self, node: Self::Node) -> String {
            self.inner.inner_html(node)
        }
        fn evaluate_path(&self, context: Self::Node, query: &str) -> Result<Vec<Result<Self::Node>>> {
            if !self.supports_paths {
                return Err(ResolveError::PathQueryUnsupported);
            }
            let mut items = self.inner.evaluate_path(context, query)?;
            if let Some(first) = items.first_mut() {
                *first = Err(ResolveError::NodeNotFound("stale item".to_string()));
            }
            Ok(items)
        }
    }

    #[test]
    fn test_evaluate_in_document_order() {
        let tree = sample();
        let nodes = PathQueryEvaluator.evaluate(&tree, tree.document(), "//p");
        assert_eq!(nodes, vec![tree.find_by_id("one").unwrap(), tree.find_by_id("two").unwrap()]);
    }

    #[test]
    fn test_relative_to_node() {
        let tree = sample();
        let body = tree.elements_by_tag("body")[0];
        let first = PathQueryEvaluator.first(&tree, body, "p[2]");
        assert_eq!(first, tree.find_by_id("two"));
    }

    #[test]
    fn test_malformed_and_empty_queries() {
        let tree = sample();
        let evaluator = PathQueryEvaluator;
        assert!(evaluator.evaluate(&tree, tree.document(), "//p[").is_empty());
        assert!(evaluator.evaluate(&tree, tree.document(), "  ").is_empty());
        assert!(matches!(
            evaluator.try_evaluate(&tree, tree.document(), ""),
            Err(ResolveError::PathQuery { .. })
        ));
    }

    #[test]
    fn test_unsupported_document_yields_nothing() {
        let tree = sample();
        let flaky = Flaky {
            inner: &tree,
            supports_paths: false,
        };
        assert!(PathQueryEvaluator.evaluate(&flaky, flaky.document(), "//p").is_empty());
        assert!(matches!(
            PathQueryEvaluator.try_evaluate(&flaky, flaky.document(), "//p"),
            Err(ResolveError::PathQueryUnsupported)
        ));
    }

    #[test]
    fn test_failed_items_are_skipped() {
        let tree = sample();
        let flaky = Flaky {
            inner: &tree,
            supports_paths: true,
        };
        let nodes = PathQueryEvaluator.evaluate(&flaky, flaky.document(), "//p");
        assert_eq!(nodes, vec![tree.find_by_id("two").unwrap()]);
    }
}
