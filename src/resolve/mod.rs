//! Element resolution engine
//!
//! This module provides:
//! - FingerprintCodec: index-path fingerprints of elements
//! - PathQueryEvaluator: element path queries against a node's document
//! - BreadcrumbMatcher: weighted similarity search over recorded ancestors
//! - Resolver: runs the methods above and summarizes their agreement

pub mod breadcrumbs;
pub mod crumb;
pub mod diagnostics;
pub mod fingerprint;
pub mod path_query;
pub mod resolver;
pub mod similarity;
pub mod tag_rules;

pub use breadcrumbs::{BreadcrumbMatch, BreadcrumbMatcher, SearchMode};
pub use crumb::{Breadcrumbs, Crumb};
pub use diagnostics::{CrumbTrace, Diagnostics, DiscoveryTier, LogDiagnostics};
pub use fingerprint::FingerprintCodec;
pub use path_query::PathQueryEvaluator;
pub use resolver::{Descriptors, MethodResult, MethodType, MethodsOutcome, Resolver, Selected, Summary};
pub use tag_rules::{AttrRule, TagCategory};
