//! Per-tag attribute normalization rules.
//!
//! Every recorded attribute is compared through the rule registered for the
//! crumb's tag category and attribute name; anything unregistered is an
//! exact string comparison.

/// Attribute carrying the value an input had when it was recorded
pub const RECORDED_VALUE_ATTR: &str = "data-recorded-value";

/// Synthetic attribute comparing normalized text content
pub const TEXT_PROXY_ATTR: &str = "textproxy";

/// Synthetic attribute comparing normalized inner markup
pub const HTML_PROXY_ATTR: &str = "htmlproxy";

/// Tag categories with distinct attribute handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagCategory {
    Anchor,
    Image,
    Input,
    Form,
    Button,
    Object,
    Applet,
    IFrame,
    Select,
    /// Document, location and browser pseudo-nodes
    DocumentLike,
    Other,
}

impl TagCategory {
    /// Classify a tag name
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "a" => TagCategory::Anchor,
            "img" => TagCategory::Image,
            "input" => TagCategory::Input,
            "form" => TagCategory::Form,
            "button" => TagCategory::Button,
            "object" => TagCategory::Object,
            "applet" => TagCategory::Applet,
            "iframe" | "frame" => TagCategory::IFrame,
            "select" => TagCategory::Select,
            "#document" | "document" | "location" | "browser" => TagCategory::DocumentLike,
            _ => TagCategory::Other,
        }
    }
}

/// How a recorded attribute is compared with a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrRule {
    /// Exact string equality
    Exact,
    /// Exact, otherwise partial credit from URL component overlap
    UrlSimilarity,
    /// Only the last path segment of a URL is compared
    LastPathSegment,
    /// Missing values take the given default; compared case-insensitively
    DefaultsTo(&'static str),
    /// Prefer the recorded-default shadow attribute over the live value
    RecordedValue,
    /// Token overlap against the candidate's normalized text
    TextProxy,
    /// Token overlap against the candidate's normalized inner markup
    HtmlProxy,
}

const RULES: &[(TagCategory, &str, AttrRule)] = &[
    (TagCategory::Anchor, "href", AttrRule::UrlSimilarity),
    (TagCategory::Image, "src", AttrRule::LastPathSegment),
    (TagCategory::Input, "src", AttrRule::LastPathSegment),
    (TagCategory::Input, "value", AttrRule::RecordedValue),
    (TagCategory::Input, "type", AttrRule::DefaultsTo("text")),
    (TagCategory::Button, "type", AttrRule::DefaultsTo("submit")),
    (TagCategory::Form, "method", AttrRule::DefaultsTo("GET")),
    (TagCategory::Form, "action", AttrRule::UrlSimilarity),
    (TagCategory::Object, "data", AttrRule::LastPathSegment),
    (TagCategory::Applet, "code", AttrRule::LastPathSegment),
    (TagCategory::Applet, "archive", AttrRule::LastPathSegment),
    (TagCategory::IFrame, "src", AttrRule::UrlSimilarity),
    (TagCategory::Select, "multiple", AttrRule::DefaultsTo("false")),
];

/// Rule for comparing `attribute` on an element of `category`
pub fn rule_for(category: TagCategory, attribute: &str) -> AttrRule {
    let name = attribute.to_ascii_lowercase();
    match name.as_str() {
        TEXT_PROXY_ATTR => return AttrRule::TextProxy,
        HTML_PROXY_ATTR => return AttrRule::HtmlProxy,
        _ => {}
    }
    if category == TagCategory::DocumentLike && name.starts_with("url") {
        return AttrRule::UrlSimilarity;
    }
    RULES
        .iter()
        .find(|(c, attr, _)| *c == category && *attr == name)
        .map_or(AttrRule::Exact, |(_, _, rule)| *rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(TagCategory::from_tag("A"), TagCategory::Anchor);
        assert_eq!(TagCategory::from_tag("iframe"), TagCategory::IFrame);
        assert_eq!(TagCategory::from_tag("#document"), TagCategory::DocumentLike);
        assert_eq!(TagCategory::from_tag("DIV"), TagCategory::Other);
    }

    #[test]
    fn test_rule_lookup() {
        assert_eq!(rule_for(TagCategory::Anchor, "href"), AttrRule::UrlSimilarity);
        assert_eq!(rule_for(TagCategory::Image, "SRC"), AttrRule::LastPathSegment);
        assert_eq!(rule_for(TagCategory::Input, "type"), AttrRule::DefaultsTo("text"));
        assert_eq!(rule_for(TagCategory::Button, "type"), AttrRule::DefaultsTo("submit"));
        assert_eq!(rule_for(TagCategory::Form, "method"), AttrRule::DefaultsTo("GET"));
        assert_eq!(rule_for(TagCategory::DocumentLike, "urldocument"), AttrRule::UrlSimilarity);
        assert_eq!(rule_for(TagCategory::Other, "href"), AttrRule::Exact);
        assert_eq!(rule_for(TagCategory::Other, "textproxy"), AttrRule::TextProxy);
        assert_eq!(rule_for(TagCategory::Select, "class"), AttrRule::Exact);
    }
}
