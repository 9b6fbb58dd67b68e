//! # replay-locator
//!
//! Re-locates recorded elements in a live page for record-and-replay browser automation.
//!
//! ## Features
//!
//! - **Fingerprints**: Compact index paths that skip non-content elements (script, style, ...)
//! - **Element Paths**: XPath queries evaluated against the element's document
//! - **Breadcrumbs**: Weighted similarity search over the recorded ancestor chain
//! - **Summaries**: Every method is scored and the results are compared
//!
//! ## Command Line
//!
//! ```bash
//! # Resolve recorded descriptors against a JSON page snapshot
//! cargo run -- --dom page.json --descriptors step.json --pretty
//!
//! # Produce a fingerprint for the first node an XPath selects
//! cargo run -- --dom page.json --encode "//form/input[2]"
//! ```
//!
//! ## Library Usage
//!
//! ```rust
//! use replay_locator::{Breadcrumbs, Crumb, Descriptors, DomTree, ElementNode, ResolveOptions, Resolver};
//!
//! # fn main() -> replay_locator::Result<()> {
//! let tree = DomTree::new(
//!     ElementNode::new("html").with_child(
//!         ElementNode::new("body")
//!             .with_child(ElementNode::new("button").with_attribute("id", "save").with_text("Save")),
//!     ),
//! );
//!
//! let descriptors = Descriptors::new()
//!     .with_fingerprint("1:1:1")
//!     .with_element_path("//button[@id='save']")
//!     .with_breadcrumbs(Breadcrumbs::from_outermost_first(vec![
//!         Crumb::new("BODY", 0),
//!         Crumb::new("BUTTON", 0).with_attribute("id", "save"),
//!     ]));
//!
//! let summary = Resolver::new().resolve(&tree, &descriptors, &ResolveOptions::default());
//! assert_eq!(summary.target_node, tree.find_by_id("save"));
//! println!("{} via {} ({:.2})", summary.methods, summary.selected, summary.target_score);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`dom`]: Document model, tree navigation and XPath evaluation
//! - [`resolve`]: Fingerprints, breadcrumbs and the multi-method resolver
//! - [`config`]: Resolution options and scoring weights
//! - [`error`]: Error types and result aliases

pub mod config;
pub mod dom;
pub mod error;
pub mod resolve;

pub use config::{MatchTypes, ResolveOptions, ScoringWeights};
pub use dom::{DomNavigator, DomTree, ElementNode, NodeId, NodeKind};
pub use error::{ResolveError, Result};
pub use resolve::{
    Breadcrumbs, Crumb, Descriptors, FingerprintCodec, MethodResult, MethodType, MethodsOutcome,
    PathQueryEvaluator, Resolver, Selected, Summary,
};
