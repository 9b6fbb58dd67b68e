//! Diagnostics collaborator injected into the resolver

use crate::error::ResolveError;
use crate::resolve::resolver::{MethodResult, MethodType, Summary};
use std::fmt::Debug;

/// Candidate discovery tier that produced a crumb's candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryTier {
    /// Unique `id`/`name` match under the scope
    NamedInScope,
    /// Unique `id`/`name` match elsewhere in the document
    NamedInDocument,
    /// Recorded same-tag index under the scope
    Positional,
    /// Any same-tag element under the scope
    SameTag,
    /// Any same-tag element in the document
    DocumentWide,
    /// Nothing matched
    None,
}

/// Outcome of processing one crumb
#[derive(Debug, Clone)]
pub struct CrumbTrace<N> {
    /// Search index of the crumb (0 = target)
    pub crumb_index: usize,
    /// Recorded tag
    pub tag: String,
    /// Tier the candidates came from
    pub tier: DiscoveryTier,
    /// Number of candidates scored
    pub candidates: usize,
    /// Winning node, if any
    pub winner: Option<N>,
    /// Structural plus attribute score of the winner
    pub winner_score: f64,
    /// Best structural score seen among candidates
    pub best_crumb_score: f64,
    /// Whether `id`/`name` had to be scored as ordinary attributes
    pub named_demoted: bool,
}

/// Receives progress and results of resolution calls.
///
/// All methods default to doing nothing.
pub trait Diagnostics {
    /// A breadcrumb search is starting
    fn breadcrumb_search_started(&self, _crumbs: usize, _find_mode: bool) {}

    /// One crumb level was processed
    fn crumb_processed<N: Debug>(&self, _trace: &CrumbTrace<N>) {}

    /// A method finished (found or not)
    fn method_finished<N: Debug>(&self, _result: &MethodResult<N>) {}

    /// A method hit an internal fault and is treated as not found
    fn method_fault(&self, _method: MethodType, _error: &ResolveError) {}

    /// The resolver produced its summary
    fn summary<N: Debug>(&self, _summary: &Summary<N>) {}
}

/// Diagnostics written through the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn breadcrumb_search_started(&self, crumbs: usize, find_mode: bool) {
        log::debug!("Following {} breadcrumbs (find mode: {})", crumbs, find_mode);
    }

    fn crumb_processed<N: Debug>(&self, trace: &CrumbTrace<N>) {
        log::debug!(
            "Crumb {} <{}>: {} candidate(s) via {:?}, winner {:?} score {:.3} (best structural {:.3}{})",
            trace.crumb_index,
            trace.tag,
            trace.candidates,
            trace.tier,
            trace.winner,
            trace.winner_score,
            trace.best_crumb_score,
            if trace.named_demoted { ", id/name demoted" } else { "" }
        );
    }

    fn method_finished<N: Debug>(&self, result: &MethodResult<N>) {
        match &result.target_node {
            Some(node) => log::debug!(
                "Method {} found {:?} with score {:.3}",
                result.method,
                node,
                result.target_score
            ),
            None => log::debug!("Method {} found nothing", result.method),
        }
    }

    fn method_fault(&self, method: MethodType, error: &ResolveError) {
        if error.is_not_found() {
            log::debug!("Method {} not found: {}", method, error);
        } else {
            log::warn!("Method {} failed: {}", method, error);
        }
    }

    fn summary<N: Debug>(&self, summary: &Summary<N>) {
        log::info!(
            "Resolution {}: selected {} node {:?} score {:.3}",
            summary.methods,
            summary.selected,
            summary.target_node,
            summary.target_score
        );
    }
}
