//! Index-path fingerprints.
//!
//! A fingerprint is a `:`-separated list of uppercase hex segments, one per
//! level from the top-level content container down to the target. Each
//! segment is the 1-based position of the node among its parent's content
//! elements (script, style, meta, title, link and cdata nodes do not
//! count). The top-level container always encodes as the sentinel `1`.

use crate::dom::{DomNavigator, NodeKind, is_content_tag};
use crate::error::{ResolveError, Result};

/// Segment emitted for the top-level content container
pub const FINGERPRINT_SENTINEL: &str = "1";

/// Separator between fingerprint segments
pub const SEGMENT_SEPARATOR: char = ':';

/// Encodes and decodes index-path fingerprints
#[derive(Debug, Clone, Copy, Default)]
pub struct FingerprintCodec;

impl FingerprintCodec {
    /// Fingerprint of `target`, or `None` if it cannot be encoded
    pub fn encode<T: DomNavigator>(&self, tree: &T, target: T::Node) -> Option<String> {
        self.try_encode(tree, target).ok()
    }

    /// Fingerprint of `target`.
    ///
    /// # Errors
    ///
    /// Fails for non-element or non-content targets and for nodes that are
    /// not attached to a document.
    pub fn try_encode<T: DomNavigator>(&self, tree: &T, target: T::Node) -> Result<String> {
        if tree.node_kind(target) != NodeKind::Element {
            return Err(ResolveError::InvalidDescriptor(
                "only elements can be fingerprinted".to_string(),
            ));
        }
        if !is_content_tag(tree.tag_name(target)) {
            return Err(ResolveError::InvalidDescriptor(format!(
                "<{}> is not a content element",
                tree.tag_name(target)
            )));
        }

        let mut segments = Vec::new();
        let mut current = target;
        loop {
            let parent = tree.parent(current).ok_or(ResolveError::DetachedNode)?;
            if tree.node_kind(parent) == NodeKind::Document {
                segments.push(FINGERPRINT_SENTINEL.to_string());
                break;
            }
            let position = content_position(tree, parent, current).ok_or(ResolveError::DetachedNode)?;
            segments.push(format!("{:X}", position));
            current = parent;
        }

        segments.reverse();
        Ok(segments.join(&SEGMENT_SEPARATOR.to_string()))
    }

    /// Node addressed by `fingerprint` below `root`, or `None`
    pub fn decode<T: DomNavigator>(&self, tree: &T, root: T::Node, fingerprint: &str) -> Option<T::Node> {
        self.try_decode(tree, root, fingerprint).ok()
    }

    /// Node addressed by `fingerprint` below `root`.
    ///
    /// # Errors
    ///
    /// [`ResolveError::MalformedFingerprint`] for empty or unparsable input,
    /// [`ResolveError::NodeNotFound`] when a segment has no positional match.
    pub fn try_decode<T: DomNavigator>(
        &self,
        tree: &T,
        root: T::Node,
        fingerprint: &str,
    ) -> Result<T::Node> {
        let segments = parse_segments(fingerprint)?;

        let mut scope = root;
        for (depth, wanted) in segments.iter().enumerate() {
            scope = content_children(tree, scope)
                .nth(wanted - 1)
                .ok_or_else(|| {
                    ResolveError::NodeNotFound(format!(
                        "fingerprint segment {} ({:X}) has no match",
                        depth, wanted
                    ))
                })?;
        }
        Ok(scope)
    }
}

/// Parse fingerprint segments into 1-based positions
pub fn parse_segments(fingerprint: &str) -> Result<Vec<usize>> {
    let trimmed = fingerprint.trim();
    if trimmed.is_empty() {
        return Err(ResolveError::MalformedFingerprint("empty fingerprint".to_string()));
    }
    trimmed
        .split(SEGMENT_SEPARATOR)
        .map(|segment| match usize::from_str_radix(segment, 16) {
            Ok(position) if position > 0 => Ok(position),
            _ => Err(ResolveError::MalformedFingerprint(format!(
                "invalid segment '{}'",
                segment
            ))),
        })
        .collect()
}

fn content_children<T: DomNavigator>(tree: &T, parent: T::Node) -> impl Iterator<Item = T::Node> + '_ {
    tree.children(parent).into_iter().filter(move |child| {
        tree.node_kind(*child) == NodeKind::Element && is_content_tag(tree.tag_name(*child))
    })
}

fn content_position<T: DomNavigator>(tree: &T, parent: T::Node, node: T::Node) -> Option<usize> {
    content_children(tree, parent)
        .position(|child| child == node)
        .map(|i| i + 1)
}
