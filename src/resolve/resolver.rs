//! Multi-method element resolution.
//!
//! The resolver runs up to three independent methods (fingerprint, element
//! path, breadcrumbs), scores each, and summarizes whether they agree.
//! It never fails: every internal fault degrades to "this method found
//! nothing" and is reported to the diagnostics collaborator.

use crate::config::ResolveOptions;
use crate::dom::DomNavigator;
use crate::error::{ResolveError, Result};
use crate::resolve::breadcrumbs::{BreadcrumbMatcher, SearchMode};
use crate::resolve::crumb::Breadcrumbs;
use crate::resolve::diagnostics::{Diagnostics, LogDiagnostics};
use crate::resolve::fingerprint::FingerprintCodec;
use crate::resolve::path_query::PathQueryEvaluator;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Resolution method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodType {
    Fingerprint,
    ElementPath,
    Breadcrumbs,
}

impl MethodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodType::Fingerprint => "fingerprint",
            MethodType::ElementPath => "elementpath",
            MethodType::Breadcrumbs => "breadcrumbs",
        }
    }
}

impl fmt::Display for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodResult<N> {
    #[serde(rename = "type")]
    pub method: MethodType,
    pub target_node: Option<N>,
    pub target_score: f64,
}

impl<N> MethodResult<N> {
    /// A method result; a zero score or missing node means "not found"
    pub fn new(method: MethodType, target_node: Option<N>, target_score: f64) -> Self {
        let target_score = target_score.clamp(0.0, 1.0);
        match target_node {
            Some(node) if target_score > 0.0 => Self {
                method,
                target_node: Some(node),
                target_score,
            },
            _ => Self::not_found(method),
        }
    }

    /// A method that found nothing
    pub fn not_found(method: MethodType) -> Self {
        Self {
            method,
            target_node: None,
            target_score: 0.0,
        }
    }

    /// Whether the method located a node
    pub fn is_found(&self) -> bool {
        self.target_node.is_some()
    }
}

/// How the attempted methods relate to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodsOutcome {
    AllFailed,
    OneFound,
    AllAgree,
    Disagree,
}

impl fmt::Display for MethodsOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MethodsOutcome::AllFailed => "allfailed",
            MethodsOutcome::OneFound => "onefound",
            MethodsOutcome::AllAgree => "allagree",
            MethodsOutcome::Disagree => "disagree",
        })
    }
}

/// Method whose node was selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selected {
    Fingerprint,
    ElementPath,
    Breadcrumbs,
    None,
}

impl Selected {
    /// Selected method, if any
    pub fn method(&self) -> Option<MethodType> {
        match self {
            Selected::Fingerprint => Some(MethodType::Fingerprint),
            Selected::ElementPath => Some(MethodType::ElementPath),
            Selected::Breadcrumbs => Some(MethodType::Breadcrumbs),
            Selected::None => None,
        }
    }
}

impl From<MethodType> for Selected {
    fn from(method: MethodType) -> Self {
        match method {
            MethodType::Fingerprint => Selected::Fingerprint,
            MethodType::ElementPath => Selected::ElementPath,
            MethodType::Breadcrumbs => Selected::Breadcrumbs,
        }
    }
}

impl fmt::Display for Selected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.method() {
            Some(method) => method.fmt(f),
            None => f.write_str("none"),
        }
    }
}

/// Result of a resolution call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary<N> {
    /// Node of the selected method
    pub target_node: Option<N>,
    /// Mean score over all attempted methods
    pub target_score: f64,
    pub methods: MethodsOutcome,
    pub selected: Selected,
    /// Results of the attempted methods, in fingerprint, element path, breadcrumbs order
    pub method_results: Vec<MethodResult<N>>,
}

impl<N> Summary<N> {
    /// Summary of a call that could not search at all
    pub fn all_failed() -> Self {
        Self {
            target_node: None,
            target_score: 0.0,
            methods: MethodsOutcome::AllFailed,
            selected: Selected::None,
            method_results: Vec::new(),
        }
    }

    /// Result of the given method, if it was attempted
    pub fn result_for(&self, method: MethodType) -> Option<&MethodResult<N>> {
        self.method_results.iter().find(|r| r.method == method)
    }
}

/// Recorded descriptors of the element to locate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Descriptors {
    pub fingerprint: Option<String>,
    pub element_path: Option<String>,
    pub breadcrumbs: Option<Breadcrumbs>,
}

impl Descriptors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the fingerprint
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    /// Builder method: set the element path query
    pub fn with_element_path(mut self, element_path: impl Into<String>) -> Self {
        self.element_path = Some(element_path.into());
        self
    }

    /// Builder method: set the breadcrumbs
    pub fn with_breadcrumbs(mut self, breadcrumbs: Breadcrumbs) -> Self {
        self.breadcrumbs = Some(breadcrumbs);
        self
    }

    /// Parse descriptors from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Stateless multi-method resolver
#[derive(Debug, Clone, Default)]
pub struct Resolver<D: Diagnostics = LogDiagnostics> {
    diagnostics: D,
}

impl Resolver<LogDiagnostics> {
    /// Create a resolver reporting through the `log` facade
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: Diagnostics> Resolver<D> {
    /// Create a resolver with a custom diagnostics collaborator
    pub fn with_diagnostics(diagnostics: D) -> Self {
        Self { diagnostics }
    }

    /// The diagnostics collaborator
    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    /// Locate the recorded element in `tree`, searching from its document
    pub fn resolve<T: DomNavigator>(
        &self,
        tree: &T,
        descriptors: &Descriptors,
        options: &ResolveOptions,
    ) -> Summary<T::Node> {
        self.search_for_target_node(tree, Some(tree.document()), descriptors, options)
    }

    /// Locate the recorded element below `root`.
    ///
    /// A missing root yields an all-failed summary.
    pub fn search_for_target_node<T: DomNavigator>(
        &self,
        tree: &T,
        root: Option<T::Node>,
        descriptors: &Descriptors,
        options: &ResolveOptions,
    ) -> Summary<T::Node> {
        let Some(root) = root else {
            log::debug!("No search root given");
            let summary = Summary::all_failed();
            self.diagnostics.summary(&summary);
            return summary;
        };

        let matcher = BreadcrumbMatcher::new(tree, &options.weights, &self.diagnostics);
        let types = options.match_types;
        let mut results = Vec::new();

        if let (true, Some(fingerprint)) = (types.fingerprint, descriptors.fingerprint.as_deref()) {
            let found = FingerprintCodec.try_decode(tree, root, fingerprint);
            results.push(self.structural_result(&matcher, tree, root, MethodType::Fingerprint, found, descriptors, options));
        }

        if let (true, Some(element_path)) = (types.element_path, descriptors.element_path.as_deref()) {
            let found = PathQueryEvaluator.try_evaluate(tree, root, element_path).and_then(|nodes| {
                nodes
                    .into_iter()
                    .next()
                    .ok_or_else(|| ResolveError::NodeNotFound(format!("'{}' matched nothing", element_path)))
            });
            results.push(self.structural_result(&matcher, tree, root, MethodType::ElementPath, found, descriptors, options));
        }

        if let (true, Some(crumbs)) = (types.breadcrumbs, descriptors.breadcrumbs.as_ref()) {
            if options.optimized_match && structural_methods_agree(&results) {
                log::debug!("Fingerprint and element path agree perfectly, skipping breadcrumbs");
            } else {
                let found = matcher.follow_breadcrumbs(
                    root,
                    None,
                    crumbs,
                    SearchMode {
                        find_mode: true,
                        hail_mary: options.hail_mary,
                        ignore_named_attrs: options.ignore_named_attrs,
                    },
                );
                let result = MethodResult::new(MethodType::Breadcrumbs, found.target_node, found.target_score);
                self.diagnostics.method_finished(&result);
                results.push(result);
            }
        }

        let summary = summarize(results);
        self.diagnostics.summary(&summary);
        summary
    }

    /// Score a fingerprint or element path hit against the target crumb
    #[allow(clippy::too_many_arguments)]
    fn structural_result<T: DomNavigator>(
        &self,
        matcher: &BreadcrumbMatcher<'_, T, D>,
        tree: &T,
        root: T::Node,
        method: MethodType,
        found: Result<T::Node>,
        descriptors: &Descriptors,
        options: &ResolveOptions,
    ) -> MethodResult<T::Node> {
        let node = match found {
            Ok(node) => node,
            Err(e) => {
                self.diagnostics.method_fault(method, &e);
                let result = MethodResult::not_found(method);
                self.diagnostics.method_finished(&result);
                return result;
            }
        };

        let score = match descriptors.breadcrumbs.as_ref().and_then(Breadcrumbs::target) {
            Some(crumb) => matcher.score_node(
                root,
                tree.parent(node),
                crumb,
                node,
                SearchMode {
                    find_mode: false,
                    hail_mary: options.hail_mary,
                    ignore_named_attrs: options.ignore_named_attrs,
                },
            ),
            None => 1.0,
        };

        let result = if options.preferred_document && score < 1.0 {
            log::debug!("Discarding imperfect {} match ({:.3}) on preferred document", method, score);
            MethodResult::not_found(method)
        } else {
            MethodResult::new(method, Some(node), score)
        };
        self.diagnostics.method_finished(&result);
        result
    }
}

fn structural_methods_agree<N: PartialEq>(results: &[MethodResult<N>]) -> bool {
    let perfect = |method| {
        results
            .iter()
            .find(|r| r.method == method && r.target_score >= 1.0)
            .and_then(|r| r.target_node.as_ref())
    };
    match (perfect(MethodType::Fingerprint), perfect(MethodType::ElementPath)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn summarize<N: Copy + PartialEq>(results: Vec<MethodResult<N>>) -> Summary<N> {
    let found: Vec<&MethodResult<N>> = results.iter().filter(|r| r.is_found()).collect();

    let methods = match found.as_slice() {
        [] => MethodsOutcome::AllFailed,
        [_] => MethodsOutcome::OneFound,
        [first, rest @ ..] if rest.iter().all(|r| r.target_node == first.target_node) => MethodsOutcome::AllAgree,
        _ => MethodsOutcome::Disagree,
    };

    let mut best: Option<&MethodResult<N>> = None;
    for &result in &found {
        if best.is_none_or(|b| result.target_score > b.target_score) {
            best = Some(result);
        }
    }

    let target_score = if results.is_empty() {
        0.0
    } else {
        results.iter().map(|r| r.target_score).sum::<f64>() / results.len() as f64
    };

    Summary {
        target_node: best.and_then(|b| b.target_node),
        target_score,
        methods,
        selected: best.map_or(Selected::None, |b| b.method.into()),
        method_results: results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchTypes;
    use crate::dom::{DomTree, ElementNode, NodeId};
    use crate::resolve::crumb::Crumb;
    use std::cell::Cell;
    use std::fmt::Debug;

    #[derive(Default)]
    struct Counting {
        searches: Cell<usize>,
        full_searches: Cell<usize>,
        faults: Cell<usize>,
        summaries: Cell<usize>,
    }

    impl Diagnostics for Counting {
        fn breadcrumb_search_started(&self, _crumbs: usize, find_mode: bool) {
            self.searches.set(self.searches.get() + 1);
            if find_mode {
                self.full_searches.set(self.full_searches.get() + 1);
            }
        }

        fn method_fault(&self, _method: MethodType, _error: &ResolveError) {
            self.faults.set(self.faults.get() + 1);
        }

        fn summary<N: Debug>(&self, _summary: &Summary<N>) {
            self.summaries.set(self.summaries.get() + 1);
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "expected {}, got {}", expected, actual);
    }

    fn button_page() -> DomTree {
        DomTree::new(
            ElementNode::new("html").with_child(
                ElementNode::new("body").with_child(
                    ElementNode::new("div")
                        .with_attribute("id", "main")
                        .with_child(ElementNode::new("button").with_attribute("id", "go").with_text("Go"))
                        .with_child(ElementNode::new("button").with_text("Stop")),
                ),
            ),
        )
    }

    fn button_descriptors() -> Descriptors {
        Descriptors::new()
            .with_fingerprint("1:1:1:1")
            .with_element_path("//button[@id='go']")
            .with_breadcrumbs(Breadcrumbs::from_outermost_first(vec![
                Crumb::new("BODY", 0),
                Crumb::new("DIV", 0).with_attribute("id", "main"),
                Crumb::new("BUTTON", 0).with_attribute("id", "go"),
            ]))
    }

    fn section_page() -> DomTree {
        let section = |id: &str, class: &str| {
            ElementNode::new("section")
                .with_attribute("id", id)
                .with_child(ElementNode::new("p").with_attribute("class", class))
        };
        DomTree::new(ElementNode::new("html").with_child(ElementNode::new("body").with_children(vec![
            section("s1", "x"),
            section("s2", "y"),
            section("s3", "z"),
        ])))
    }

    fn section_descriptors(target: Crumb) -> Descriptors {
        Descriptors::new()
            .with_fingerprint("1:1:1:1")
            .with_element_path("//section[2]/p")
            .with_breadcrumbs(Breadcrumbs::from_outermost_first(vec![
                Crumb::new("BODY", 0),
                Crumb::new("SECTION", 2),
                target,
            ]))
    }

    fn p_in(tree: &DomTree, section: &str) -> NodeId {
        let section = tree.find_by_id(section).unwrap();
        tree.children(section)[0]
    }

    #[test]
    fn test_missing_root_fails_fast() {
        let tree = button_page();
        let resolver = Resolver::with_diagnostics(Counting::default());
        let summary = resolver.search_for_target_node(&tree, None, &button_descriptors(), &ResolveOptions::default());

        assert_eq!(summary, Summary::all_failed());
        assert_eq!(summary.selected, Selected::None);
        assert_eq!(resolver.diagnostics().searches.get(), 0);
        assert_eq!(resolver.diagnostics().summaries.get(), 1);
    }

    #[test]
    fn test_optimized_match_skips_breadcrumbs() {
        let tree = button_page();
        let resolver = Resolver::with_diagnostics(Counting::default());
        let summary = resolver.resolve(&tree, &button_descriptors(), &ResolveOptions::default());

        assert_eq!(resolver.diagnostics().full_searches.get(), 0);
        assert_eq!(summary.method_results.len(), 2);
        assert!(summary.result_for(MethodType::Breadcrumbs).is_none());
        assert_eq!(summary.methods, MethodsOutcome::AllAgree);
        assert_eq!(summary.selected, Selected::Fingerprint);
        assert_eq!(summary.target_node, tree.find_by_id("go"));
        assert_close(summary.target_score, 1.0);
    }

    #[test]
    fn test_unoptimized_match_runs_breadcrumbs() {
        let tree = button_page();
        let resolver = Resolver::with_diagnostics(Counting::default());
        let options = ResolveOptions::new().optimized_match(false);
        let summary = resolver.resolve(&tree, &button_descriptors(), &options);

        assert_eq!(resolver.diagnostics().full_searches.get(), 1);
        let breadcrumbs = summary.result_for(MethodType::Breadcrumbs).unwrap();
        assert_eq!(breadcrumbs.target_node, tree.find_by_id("go"));
        assert_close(breadcrumbs.target_score, 1.0);
        assert_eq!(summary.methods, MethodsOutcome::AllAgree);
    }

    #[test]
    fn test_disagreement_ties_go_to_fingerprint() {
        let tree = section_page();
        let resolver = Resolver::with_diagnostics(Counting::default());
        let summary = resolver.resolve(&tree, &section_descriptors(Crumb::new("P", 0)), &ResolveOptions::default());

        let nodes: Vec<_> = summary.method_results.iter().map(|r| r.target_node).collect();
        assert_eq!(
            nodes,
            vec![Some(p_in(&tree, "s1")), Some(p_in(&tree, "s2")), Some(p_in(&tree, "s3"))]
        );
        assert_eq!(summary.methods, MethodsOutcome::Disagree);
        assert_eq!(summary.selected, Selected::Fingerprint);
        assert_eq!(summary.target_node, Some(p_in(&tree, "s1")));
        assert_close(summary.target_score, 1.0);
    }

    #[test]
    fn test_disagreement_selects_highest_score() {
        let tree = section_page();
        let resolver = Resolver::with_diagnostics(Counting::default());
        let target = Crumb::new("P", 0).with_attribute("class", "y");
        let summary = resolver.resolve(&tree, &section_descriptors(target), &ResolveOptions::default());

        assert_eq!(summary.methods, MethodsOutcome::Disagree);
        assert_eq!(summary.selected, Selected::ElementPath);
        assert_eq!(summary.target_node, Some(p_in(&tree, "s2")));

        let scores: Vec<f64> = summary.method_results.iter().map(|r| r.target_score).collect();
        assert_close(scores[0], 0.5 * 0.85);
        assert_close(scores[1], 1.0);
        assert_close(scores[2], 2.0 / 3.0 + 0.5 / 3.0 * 0.85);
        assert_close(summary.target_score, scores.iter().sum::<f64>() / 3.0);
    }

    #[test]
    fn test_structural_hit_keeps_its_node() {
        let group = |id: &str, text: &str| {
            ElementNode::new("div")
                .with_attribute("id", id)
                .with_child(ElementNode::new("button").with_attribute("class", "btn").with_text(text))
        };
        let tree = DomTree::new(
            ElementNode::new("html")
                .with_child(ElementNode::new("body").with_children(vec![group("a", "A"), group("b", "B")])),
        );
        let descriptors = Descriptors::new()
            .with_fingerprint("1:1:2:1")
            .with_breadcrumbs(Breadcrumbs::from_target_first(vec![
                Crumb::new("BUTTON", 1).with_attribute("class", "btn"),
            ]));
        let options = ResolveOptions::new().match_types(MatchTypes::parse("fp"));
        let summary = Resolver::new().resolve(&tree, &descriptors, &options);

        let fingerprint = summary.result_for(MethodType::Fingerprint).unwrap();
        assert_eq!(tree.own_text(fingerprint.target_node.unwrap()), Some("B"));
        // no button at index 1 under div#b: document-wide structure + 0.5 class
        assert_close(fingerprint.target_score, 0.5);
        assert_eq!(tree.own_text(summary.target_node.unwrap()), Some("B"));
    }

    #[test]
    fn test_preferred_document_discards_imperfect_hits() {
        let tree = section_page();
        let resolver = Resolver::with_diagnostics(Counting::default());
        let target = Crumb::new("P", 0).with_attribute("class", "y");
        let options = ResolveOptions::new()
            .preferred_document(true)
            .match_types(MatchTypes::parse("fp"));
        let summary = resolver.resolve(&tree, &section_descriptors(target), &options);

        assert_eq!(summary.methods, MethodsOutcome::AllFailed);
        assert_eq!(summary.method_results.len(), 1);
        assert!(summary.target_node.is_none());
    }

    #[test]
    fn test_failed_method_counts_toward_mean() {
        let tree = button_page();
        let resolver = Resolver::with_diagnostics(Counting::default());
        let descriptors = Descriptors::new()
            .with_fingerprint("1:zz")
            .with_element_path("//button[2]");
        let summary = resolver.resolve(&tree, &descriptors, &ResolveOptions::default());

        assert_eq!(resolver.diagnostics().faults.get(), 1);
        assert_eq!(summary.methods, MethodsOutcome::OneFound);
        assert_eq!(summary.selected, Selected::ElementPath);
        assert_eq!(tree.own_text(summary.target_node.unwrap()), Some("Stop"));
        assert_close(summary.target_score, 0.5);
    }

    #[test]
    fn test_match_types_filter_methods() {
        let tree = button_page();
        let resolver = Resolver::new();
        let options = ResolveOptions::new().match_types(MatchTypes::parse("bc"));
        let summary = resolver.resolve(&tree, &button_descriptors(), &options);

        assert_eq!(summary.method_results.len(), 1);
        assert_eq!(summary.selected, Selected::Breadcrumbs);
        assert_eq!(summary.methods, MethodsOutcome::OneFound);
    }

    #[test]
    fn test_summary_json_shape() {
        let tree = button_page();
        let summary = Resolver::new().resolve(&tree, &button_descriptors(), &ResolveOptions::default());
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["methods"], "allagree");
        assert_eq!(json["selected"], "fingerprint");
        assert_eq!(json["methodResults"][0]["type"], "fingerprint");
        assert_eq!(json["methodResults"][1]["type"], "elementpath");
        assert_eq!(json["targetNode"], summary.target_node.unwrap().index());

        let none = serde_json::to_value(Summary::<NodeId>::all_failed()).unwrap();
        assert_eq!(none["selected"], "none");
        assert!(none["targetNode"].is_null());
    }

    #[test]
    fn test_descriptors_from_json() {
        let descriptors = Descriptors::from_json(
            r#"{"fingerprint": "1:2", "elementPath": "//a", "breadcrumbs": [{"tag": "A", "index": 0, "attributes": {"href": "/x"}, "numAttributes": 1}]}"#,
        )
        .unwrap();
        assert_eq!(descriptors.fingerprint.as_deref(), Some("1:2"));
        assert_eq!(descriptors.element_path.as_deref(), Some("//a"));
        assert_eq!(descriptors.breadcrumbs.unwrap().target().unwrap().tag, "A");
    }
}
