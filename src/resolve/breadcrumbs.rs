//! Breadcrumb similarity search.
//!
//! Starting at the document root, each crumb (outermost first) is matched
//! against candidates found under the current scope. Candidates come from
//! the first non-empty discovery tier:
//!
//! 1. a unique `id`/`name` match under the scope, then in the document
//! 2. the element at the recorded same-tag index under the scope
//! 3. any same-tag element under the scope (find/hail-mary mode or pseudo scope)
//! 4. any same-tag element in the document
//!
//! Each candidate's structural score is topped up by its attribute score,
//! the best candidate becomes the scope for the next crumb, and the
//! per-crumb winning scores add up to the final score.

use crate::config::ScoringWeights;
use crate::dom::{DomNavigator, NodeKind};
use crate::resolve::crumb::{Breadcrumbs, Crumb, is_named_attr};
use crate::resolve::diagnostics::{CrumbTrace, Diagnostics, DiscoveryTier};
use crate::resolve::similarity::{html_proxy, last_path_segment, proxy_similarity, text_proxy, url_similarity};
use crate::resolve::tag_rules::{AttrRule, RECORDED_VALUE_ATTR, TagCategory, rule_for};

/// Flags controlling a breadcrumb search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchMode {
    /// Allow any same-tag element under the scope as a candidate
    pub find_mode: bool,
    /// Cross-document rescan; widens candidates like find mode
    pub hail_mary: bool,
    /// Do not privilege `id`/`name` below pseudo-node scopes
    pub ignore_named_attrs: bool,
}

/// Deepest node reached by a breadcrumb search and its accumulated score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreadcrumbMatch<N> {
    pub target_node: Option<N>,
    pub target_score: f64,
}

impl<N> BreadcrumbMatch<N> {
    fn not_found() -> Self {
        Self {
            target_node: None,
            target_score: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Naming {
    /// No usable `id`/`name`, or they are ignored
    Absent,
    /// `id`/`name` drive discovery
    Privileged,
    /// `id`/`name` were duplicated or stale; scored as one ordinary attribute
    Demoted,
}

#[derive(Debug, Clone, Copy)]
struct Weighting {
    attrib_bonus: f64,
    per_attribute: f64,
    extra_count: usize,
}

#[derive(Debug, Clone, Copy)]
struct Candidate<N> {
    node: N,
    crumb_score: f64,
}

struct Discovery<N> {
    candidates: Vec<Candidate<N>>,
    tier: DiscoveryTier,
    naming: Naming,
    weighting: Weighting,
}

#[derive(Debug, Clone, Copy, Default)]
struct AttributeScore {
    attrib_score: f64,
    any_matched: bool,
    url_score: Option<f64>,
}

/// Weighted, attribute-aware search driven by a breadcrumb chain
pub struct BreadcrumbMatcher<'a, T: DomNavigator, D: Diagnostics> {
    tree: &'a T,
    weights: &'a ScoringWeights,
    diagnostics: &'a D,
}

impl<'a, T: DomNavigator, D: Diagnostics> BreadcrumbMatcher<'a, T, D> {
    /// Create a matcher over `tree`
    pub fn new(tree: &'a T, weights: &'a ScoringWeights, diagnostics: &'a D) -> Self {
        Self {
            tree,
            weights,
            diagnostics,
        }
    }

    /// Follow the whole chain, starting with the outermost crumb.
    ///
    /// `scope` defaults to `doc_root`.
    pub fn follow_breadcrumbs(
        &self,
        doc_root: T::Node,
        scope: Option<T::Node>,
        crumbs: &Breadcrumbs,
        mode: SearchMode,
    ) -> BreadcrumbMatch<T::Node> {
        match crumbs.len().checked_sub(1) {
            Some(start) => self.follow_from(doc_root, scope, crumbs, start, 0.0, mode),
            None => BreadcrumbMatch::not_found(),
        }
    }

    /// Continue a search at `crumb_index` with an already accumulated score.
    ///
    /// A crumb without candidates resets the accumulated score to 0 and the
    /// next crumb is searched under the unchanged scope.
    pub fn follow_from(
        &self,
        doc_root: T::Node,
        scope: Option<T::Node>,
        crumbs: &Breadcrumbs,
        crumb_index: usize,
        cumulative_score: f64,
        mode: SearchMode,
    ) -> BreadcrumbMatch<T::Node> {
        self.diagnostics
            .breadcrumb_search_started(crumbs.len(), mode.find_mode);
        if crumbs.is_empty() {
            return BreadcrumbMatch::not_found();
        }

        let per_crumb = 1.0 / crumbs.len() as f64;
        let mut scope = scope.unwrap_or(doc_root);
        let mut cumulative = cumulative_score;
        let mut target = None;
        let mut index = crumb_index.min(crumbs.len() - 1);

        while let Some(crumb) = crumbs.get(index) {
            match self.match_crumb(doc_root, scope, crumb, index, per_crumb, mode) {
                Some((winner, score)) => {
                    cumulative += score;
                    target = Some(winner);
                    scope = winner;
                }
                None => {
                    cumulative = 0.0;
                    target = None;
                }
            }
            if index == 0 {
                break;
            }
            index -= 1;
        }

        BreadcrumbMatch {
            target_node: target,
            target_score: cumulative.clamp(0.0, 1.0),
        }
    }

    /// Score `node` as the element `crumb` describes, searched under `scope`.
    ///
    /// The node is kept whatever else the crumb would discover: it earns the
    /// structural fraction of the discovery tier that contains it, or the
    /// document-wide fraction when it only shares the crumb's tag.
    pub fn score_node(
        &self,
        doc_root: T::Node,
        scope: Option<T::Node>,
        crumb: &Crumb,
        node: T::Node,
        mode: SearchMode,
    ) -> f64 {
        self.diagnostics.breadcrumb_search_started(1, mode.find_mode);
        let scope = scope.unwrap_or(doc_root);
        let discovery = self.discover(doc_root, scope, crumb, 1.0, mode);

        let (tier, structural) = match discovery.candidates.iter().find(|c| c.node == node) {
            Some(candidate) => (discovery.tier, candidate.crumb_score),
            None if self.tree.tag_name(node).eq_ignore_ascii_case(&crumb.tag) => {
                (DiscoveryTier::DocumentWide, self.weights.document_wide)
            }
            None => (DiscoveryTier::None, 0.0),
        };

        let category = TagCategory::from_tag(&crumb.tag);
        let scored = self.score_attributes(crumb, category, discovery.naming, &discovery.weighting, node);
        let mut crumb_score = structural;
        if discovery.weighting.extra_count > 0 && !scored.any_matched {
            crumb_score *= self.weights.no_attribute_penalty;
        }
        let total = (crumb_score + scored.attrib_score).clamp(0.0, 1.0);

        self.diagnostics.crumb_processed(&CrumbTrace {
            crumb_index: 0,
            tag: crumb.tag.clone(),
            tier,
            candidates: 1,
            winner: Some(node),
            winner_score: total,
            best_crumb_score: crumb_score,
            named_demoted: discovery.naming == Naming::Demoted,
        });
        total
    }

    fn match_crumb(
        &self,
        doc_root: T::Node,
        scope: T::Node,
        crumb: &Crumb,
        crumb_index: usize,
        per_crumb: f64,
        mode: SearchMode,
    ) -> Option<(T::Node, f64)> {
        let w = self.weights;
        let Discovery {
            candidates,
            tier,
            naming,
            weighting,
        } = self.discover(doc_root, scope, crumb, per_crumb, mode);

        let category = TagCategory::from_tag(&crumb.tag);
        let mut best_url: Option<f64> = None;
        let mut best_crumb_score: f64 = 0.0;
        let mut winner: Option<(T::Node, f64)> = None;

        // Better tiers were pushed first; walking backwards lets them win ties.
        for candidate in candidates.iter().rev() {
            let scored = self.score_attributes(crumb, category, naming, &weighting, candidate.node);
            let mut crumb_score = candidate.crumb_score;

            if let Some(url_score) = scored.url_score {
                match best_url {
                    Some(best) if url_score < best => crumb_score = 0.0,
                    _ => best_url = Some(url_score),
                }
            }
            if weighting.extra_count > 0 && !scored.any_matched {
                crumb_score *= w.no_attribute_penalty;
            }

            best_crumb_score = best_crumb_score.max(crumb_score);
            let total = crumb_score + scored.attrib_score;
            if winner.is_none_or(|(_, best)| total >= best) {
                winner = Some((candidate.node, total));
            }
        }

        self.diagnostics.crumb_processed(&CrumbTrace {
            crumb_index,
            tag: crumb.tag.clone(),
            tier,
            candidates: candidates.len(),
            winner: winner.map(|(node, _)| node),
            winner_score: winner.map_or(0.0, |(_, score)| score),
            best_crumb_score,
            named_demoted: naming == Naming::Demoted,
        });

        winner
    }

    /// Candidates for `crumb` from the first non-empty discovery tier
    fn discover(
        &self,
        doc_root: T::Node,
        scope: T::Node,
        crumb: &Crumb,
        per_crumb: f64,
        mode: SearchMode,
    ) -> Discovery<T::Node> {
        let w = self.weights;
        let scope_pseudo = self.tree.node_kind(scope).is_pseudo();
        let mut naming = if crumb.has_named_attrs() && (!mode.ignore_named_attrs || scope_pseudo) {
            Naming::Privileged
        } else {
            Naming::Absent
        };

        let mut candidates = Vec::new();
        let mut tier = DiscoveryTier::None;

        if naming == Naming::Privileged {
            let bonus = self.weighting(crumb, naming, per_crumb).attrib_bonus;
            let in_scope = self.named_matches(scope, crumb);
            match in_scope.as_slice() {
                [node] => {
                    candidates.push(Candidate {
                        node: *node,
                        crumb_score: per_crumb * (w.named_in_scope + bonus),
                    });
                    tier = DiscoveryTier::NamedInScope;
                }
                [] => match self.named_matches(doc_root, crumb).as_slice() {
                    [node] => {
                        candidates.push(Candidate {
                            node: *node,
                            crumb_score: per_crumb * (w.named_in_document + bonus),
                        });
                        tier = DiscoveryTier::NamedInDocument;
                    }
                    _ => naming = Naming::Demoted,
                },
                _ => naming = Naming::Demoted,
            }
        }

        let weighting = self.weighting(crumb, naming, per_crumb);
        let bonus = weighting.attrib_bonus;

        if candidates.is_empty() && !scope_pseudo {
            let fraction = if naming == Naming::Demoted {
                w.positional_named
            } else {
                w.positional
            };
            if let Some(node) = self.same_tag_under(scope, &crumb.tag, false).into_iter().nth(crumb.index) {
                candidates.push(Candidate {
                    node,
                    crumb_score: per_crumb * (fraction + bonus),
                });
                tier = DiscoveryTier::Positional;
            }
        }

        if candidates.is_empty() && (mode.find_mode || mode.hail_mary || scope_pseudo) {
            let fraction = if scope_pseudo {
                w.tag_under_pseudo
            } else if naming == Naming::Demoted {
                w.tag_named
            } else {
                w.tag_only
            };
            candidates.extend(
                self.same_tag_under(scope, &crumb.tag, scope_pseudo)
                    .into_iter()
                    .map(|node| Candidate {
                        node,
                        crumb_score: per_crumb * (fraction + bonus),
                    }),
            );
            if !candidates.is_empty() {
                tier = DiscoveryTier::SameTag;
            }
        }

        if candidates.is_empty() {
            candidates.extend(
                self.same_tag_under(doc_root, &crumb.tag, true)
                    .into_iter()
                    .map(|node| Candidate {
                        node,
                        crumb_score: per_crumb * w.document_wide,
                    }),
            );
            if !candidates.is_empty() {
                tier = DiscoveryTier::DocumentWide;
            }
        }

        Discovery {
            candidates,
            tier,
            naming,
            weighting,
        }
    }

    fn weighting(&self, crumb: &Crumb, naming: Naming, per_crumb: f64) -> Weighting {
        let share = match naming {
            Naming::Absent => self.weights.attribute_share,
            Naming::Privileged | Naming::Demoted => self.weights.attribute_share_named,
        };
        let mut extra_count = crumb.extra_attributes().count();
        if naming == Naming::Demoted {
            extra_count += 1;
        }

        if extra_count == 0 {
            Weighting {
                attrib_bonus: share,
                per_attribute: 0.0,
                extra_count,
            }
        } else {
            Weighting {
                attrib_bonus: 0.0,
                per_attribute: per_crumb * share / extra_count as f64,
                extra_count,
            }
        }
    }

    fn named_matches(&self, root: T::Node, crumb: &Crumb) -> Vec<T::Node> {
        let (id, name) = (crumb.id(), crumb.name());
        self.tree
            .descendants(root)
            .into_iter()
            .filter(|node| {
                self.tree.node_kind(*node) == NodeKind::Element
                    && (id.is_some_and(|id| self.tree.attribute(*node, "id") == Some(id))
                        || name.is_some_and(|name| self.tree.attribute(*node, "name") == Some(name)))
            })
            .collect()
    }

    fn same_tag_under(&self, scope: T::Node, tag: &str, include_scope: bool) -> Vec<T::Node> {
        let mut nodes = Vec::new();
        if include_scope {
            nodes.push(scope);
        }
        nodes.extend(self.tree.descendants(scope));
        nodes.retain(|node| self.tree.tag_name(*node).eq_ignore_ascii_case(tag));
        nodes
    }

    fn score_attributes(
        &self,
        crumb: &Crumb,
        category: TagCategory,
        naming: Naming,
        weighting: &Weighting,
        node: T::Node,
    ) -> AttributeScore {
        let mut score = AttributeScore::default();

        for (name, recorded) in &crumb.attributes {
            if is_named_attr(name) {
                continue;
            }
            let rule = rule_for(category, name);
            let actual = self.candidate_value(node, category, rule, name);
            let credit = attribute_credit(rule, recorded, actual.as_deref());

            if rule == AttrRule::UrlSimilarity {
                score.url_score = Some(score.url_score.map_or(credit, |s: f64| s.min(credit)));
            }
            if credit > 0.0 {
                score.any_matched = true;
                score.attrib_score += weighting.per_attribute * credit;
            }
        }

        if naming == Naming::Demoted {
            let matched = match (crumb.id(), crumb.name()) {
                (Some(id), _) => self.tree.attribute(node, "id") == Some(id),
                (None, Some(name)) => self.tree.attribute(node, "name") == Some(name),
                (None, None) => false,
            };
            if matched {
                score.any_matched = true;
                score.attrib_score += weighting.per_attribute;
            }
        }

        score
    }

    fn candidate_value(&self, node: T::Node, category: TagCategory, rule: AttrRule, name: &str) -> Option<String> {
        let tree = self.tree;
        match rule {
            AttrRule::TextProxy => Some(text_proxy(tree, node)),
            AttrRule::HtmlProxy => Some(html_proxy(tree, node)),
            AttrRule::RecordedValue => tree
                .attribute(node, RECORDED_VALUE_ATTR)
                .or_else(|| tree.attribute(node, name))
                .map(str::to_string),
            AttrRule::UrlSimilarity if category == TagCategory::DocumentLike => tree
                .attribute(node, name)
                .or_else(|| tree.attribute(node, "url"))
                .map(str::to_string),
            _ => tree.attribute(node, name).map(str::to_string),
        }
    }
}

/// Credit in `[0, 1]` earned by a candidate value under `rule`
fn attribute_credit(rule: AttrRule, recorded: &str, actual: Option<&str>) -> f64 {
    let exact = |matched: bool| if matched { 1.0 } else { 0.0 };
    match rule {
        AttrRule::Exact | AttrRule::RecordedValue => exact(actual == Some(recorded)),
        AttrRule::UrlSimilarity => actual.map_or(0.0, |actual| url_similarity(recorded, actual)),
        AttrRule::LastPathSegment => {
            actual.map_or(0.0, |actual| exact(last_path_segment(recorded) == last_path_segment(actual)))
        }
        AttrRule::DefaultsTo(default) => exact(actual.unwrap_or(default).eq_ignore_ascii_case(recorded)),
        AttrRule::TextProxy | AttrRule::HtmlProxy => {
            actual.map_or(0.0, |actual| proxy_similarity(recorded, actual))
        }
    }
}
