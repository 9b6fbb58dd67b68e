//! Path query language (an XPath 1.0 subset) for element paths.
//!
//! Supports absolute and relative location paths, the `/` and `//`
//! separators, `.` and `..`, `*`, tag name tests (ASCII case-insensitive, as
//! HTML tags are), `node()`, explicit axes (`child`, `descendant`,
//! `descendant-or-self`, `parent`, `ancestor`, `self`, `following-sibling`,
//! `preceding-sibling`), unions with `|`, and predicates built from
//! positions, `@attr`, `text()`, literals, comparisons, `and`/`or` and the
//! functions `position`, `last`, `not`, `contains`, `starts-with`,
//! `normalize-space`, `string-length` and `count`.
//!
//! # Submodules
//!
//! - [`parser`]: tokenizer and recursive descent parser.
//! - [`eval`]: evaluator over any [`DomNavigator`].

pub mod eval;
pub mod parser;

pub use eval::Evaluator;
pub use parser::{Query, parse};

use crate::dom::navigator::DomNavigator;
use crate::error::Result;

/// Parse and evaluate `expression` relative to `context`.
///
/// Results are unique and in document order.
///
/// # Errors
///
/// Returns [`crate::ResolveError::PathQuery`] if the expression is malformed.
pub fn evaluate<T: DomNavigator>(tree: &T, context: T::Node, expression: &str) -> Result<Vec<T::Node>> {
    let query = parse(expression)?;
    Ok(Evaluator::new(tree).evaluate(&query, context))
}
