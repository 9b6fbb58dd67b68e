//! Breadcrumb descriptors handed over by the capture side

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Attribute names treated as the privileged naming pair
pub const NAMED_ATTRS: [&str; 2] = ["id", "name"];

/// Check whether an attribute belongs to the `id`/`name` pair
pub fn is_named_attr(name: &str) -> bool {
    NAMED_ATTRS.contains(&name)
}

/// One ancestor's recorded identity: tag, index and salient attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crumb {
    /// Tag name of the recorded element
    pub tag: String,

    /// 0-based position among same-tag elements under the navigable ancestor
    #[serde(default)]
    pub index: usize,

    /// Salient attributes, in recorded order
    #[serde(default)]
    pub attributes: IndexMap<String, String>,

    /// Number of attributes the element carried at record time
    #[serde(default)]
    pub num_attributes: usize,
}

impl Crumb {
    /// Create a crumb without attributes
    pub fn new(tag: impl Into<String>, index: usize) -> Self {
        Self {
            tag: tag.into(),
            index,
            attributes: IndexMap::new(),
            num_attributes: 0,
        }
    }

    /// Builder method: add a recorded attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self.num_attributes = self.num_attributes.max(self.attributes.len());
        self
    }

    /// Recorded attribute value
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Recorded `id`, ignoring empty values
    pub fn id(&self) -> Option<&str> {
        self.attribute("id").filter(|v| !v.is_empty())
    }

    /// Recorded `name`, ignoring empty values
    pub fn name(&self) -> Option<&str> {
        self.attribute("name").filter(|v| !v.is_empty())
    }

    /// Whether the crumb carries a usable `id` or `name`
    pub fn has_named_attrs(&self) -> bool {
        self.id().is_some() || self.name().is_some()
    }

    /// Attributes other than the `id`/`name` pair
    pub fn extra_attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .filter(|(name, _)| !is_named_attr(name))
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// Ordered ancestor chain of a recorded target.
///
/// Stored target-first: index 0 is the target's own crumb and the last
/// entry is the outermost ancestor. The search walks from the last entry
/// down to index 0, starting at the document root. This is also the
/// serialized order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Breadcrumbs(Vec<Crumb>);

impl Breadcrumbs {
    /// Wrap crumbs already stored target-first
    pub fn from_target_first(crumbs: Vec<Crumb>) -> Self {
        Self(crumbs)
    }

    /// Build from crumbs listed outermost ancestor first
    pub fn from_outermost_first(mut crumbs: Vec<Crumb>) -> Self {
        crumbs.reverse();
        Self(crumbs)
    }

    /// Number of crumbs
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no crumbs
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Crumb at a search index (0 = target)
    pub fn get(&self, index: usize) -> Option<&Crumb> {
        self.0.get(index)
    }

    /// The target element's own crumb
    pub fn target(&self) -> Option<&Crumb> {
        self.0.first()
    }

    /// The outermost recorded ancestor
    pub fn outermost(&self) -> Option<&Crumb> {
        self.0.last()
    }

    /// Iterate crumbs in search order (outermost first)
    pub fn search_order(&self) -> impl Iterator<Item = &Crumb> {
        self.0.iter().rev()
    }
}
