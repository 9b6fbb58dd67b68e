use serde::{Deserialize, Serialize};
use std::fmt;

/// Which resolution methods are enabled.
///
/// Parsed from a selector string: a method is enabled when the string
/// contains its token (`fp`, `ep`, `bc`) or `all`, case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct MatchTypes {
    pub fingerprint: bool,
    pub element_path: bool,
    pub breadcrumbs: bool,
}

impl MatchTypes {
    /// All methods enabled
    pub fn all() -> Self {
        Self {
            fingerprint: true,
            element_path: true,
            breadcrumbs: true,
        }
    }

    /// Parse a selector string such as `"fp|bc"` or `"all"`
    pub fn parse(selector: &str) -> Self {
        let lower = selector.to_ascii_lowercase();
        let all = lower.contains("all");
        Self {
            fingerprint: all || lower.contains("fp"),
            element_path: all || lower.contains("ep"),
            breadcrumbs: all || lower.contains("bc"),
        }
    }

    /// Whether no method is enabled
    pub fn is_empty(&self) -> bool {
        !(self.fingerprint || self.element_path || self.breadcrumbs)
    }
}

impl Default for MatchTypes {
    fn default() -> Self {
        Self::all()
    }
}

impl From<String> for MatchTypes {
    fn from(selector: String) -> Self {
        Self::parse(&selector)
    }
}

impl From<MatchTypes> for String {
    fn from(types: MatchTypes) -> Self {
        types.to_string()
    }
}

impl fmt::Display for MatchTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fingerprint && self.element_path && self.breadcrumbs {
            return write!(f, "all");
        }
        let tokens: Vec<&str> = [
            (self.fingerprint, "fp"),
            (self.element_path, "ep"),
            (self.breadcrumbs, "bc"),
        ]
        .iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, token)| *token)
        .collect();
        write!(f, "{}", tokens.join("|"))
    }
}

/// Scoring fractions used by the breadcrumb search.
///
/// Every structural fraction is multiplied by the per-crumb weight
/// (`1 / number of crumbs`). The defaults keep the ordering
/// named-unique > positional > tag-only > document-wide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringWeights {
    /// Unique `id`/`name` match under the current scope
    pub named_in_scope: f64,
    /// Unique `id`/`name` match elsewhere in the document
    pub named_in_document: f64,
    /// Recorded sibling index, no usable naming
    pub positional: f64,
    /// Recorded sibling index when `id`/`name` were duplicated or stale
    pub positional_named: f64,
    /// Any same-tag element under a document/location/browser scope
    pub tag_under_pseudo: f64,
    /// Any same-tag element when `id`/`name` were duplicated or stale
    pub tag_named: f64,
    /// Any same-tag element, no naming
    pub tag_only: f64,
    /// Same-tag element anywhere in the document
    pub document_wide: f64,
    /// Share of the crumb weight given to attributes when naming is privileged
    pub attribute_share_named: f64,
    /// Share of the crumb weight given to attributes otherwise
    pub attribute_share: f64,
    /// Multiplier applied to the structural score when no attribute matched
    pub no_attribute_penalty: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            named_in_scope: 0.75,
            named_in_document: 0.50,
            positional: 0.50,
            positional_named: 0.25,
            tag_under_pseudo: 0.50,
            tag_named: 0.25,
            tag_only: 0.20,
            document_wide: 0.0,
            attribute_share_named: 0.25,
            attribute_share: 0.50,
            no_attribute_penalty: 0.85,
        }
    }
}

/// Options for a resolution call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolveOptions {
    /// Methods to run
    pub match_types: MatchTypes,

    /// Ignore `id`/`name` below document-level scopes (e.g. generated ids)
    pub ignore_named_attrs: bool,

    /// Skip the breadcrumb walk when fingerprint and element path agree perfectly
    pub optimized_match: bool,

    /// Discard imperfect structural hits so the caller retries other documents
    pub preferred_document: bool,

    /// Widen the breadcrumb candidate search during a cross-document rescan
    pub hail_mary: bool,

    /// Scoring fractions
    pub weights: ScoringWeights,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            match_types: MatchTypes::all(),
            ignore_named_attrs: false,
            optimized_match: true,
            preferred_document: false,
            hail_mary: false,
            weights: ScoringWeights::default(),
        }
    }
}

impl ResolveOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the enabled methods
    pub fn match_types(mut self, match_types: MatchTypes) -> Self {
        self.match_types = match_types;
        self
    }

    /// Set whether `id`/`name` attributes are ignored
    pub fn ignore_named_attrs(mut self, ignore: bool) -> Self {
        self.ignore_named_attrs = ignore;
        self
    }

    /// Set optimized matching
    pub fn optimized_match(mut self, optimized: bool) -> Self {
        self.optimized_match = optimized;
        self
    }

    /// Mark the searched document as the preferred one
    pub fn preferred_document(mut self, preferred: bool) -> Self {
        self.preferred_document = preferred;
        self
    }

    /// Set hail-mary (cross-document rescan) mode
    pub fn hail_mary(mut self, hail_mary: bool) -> Self {
        self.hail_mary = hail_mary;
        self
    }

    /// Set scoring weights
    pub fn weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Load options from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
