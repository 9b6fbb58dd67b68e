//! Partial-credit similarity measures for attribute comparison

use crate::dom::DomNavigator;
use url::Url;

const RELATIVE_BASE: &str = "http://relative.invalid/";

fn parse_url(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    Url::parse(raw)
        .ok()
        .or_else(|| Url::parse(RELATIVE_BASE).ok()?.join(raw).ok())
}

/// Similarity of two URLs in `[0, 1]`.
///
/// Scheme, host (with port) and path each contribute one component; every
/// query pair contributes one more. The path earns partial credit for
/// leading segments in common. Identical strings score 1.
pub fn url_similarity(recorded: &str, actual: &str) -> f64 {
    if recorded == actual {
        return 1.0;
    }
    let (Some(recorded), Some(actual)) = (parse_url(recorded), parse_url(actual)) else {
        return 0.0;
    };

    let mut matched = 0.0;
    if recorded.scheme() == actual.scheme() {
        matched += 1.0;
    }
    if recorded.host_str() == actual.host_str() && recorded.port_or_known_default() == actual.port_or_known_default() {
        matched += 1.0;
    }
    matched += path_similarity(recorded.path(), actual.path());

    let recorded_pairs: Vec<(String, String)> = recorded.query_pairs().into_owned().collect();
    let actual_pairs: Vec<(String, String)> = actual.query_pairs().into_owned().collect();
    matched += recorded_pairs.iter().filter(|pair| actual_pairs.contains(pair)).count() as f64;

    let total = 3.0 + recorded_pairs.len().max(actual_pairs.len()) as f64;
    matched / total
}

fn path_similarity(recorded: &str, actual: &str) -> f64 {
    if recorded == actual {
        return 1.0;
    }
    let recorded: Vec<&str> = recorded.split('/').filter(|s| !s.is_empty()).collect();
    let actual: Vec<&str> = actual.split('/').filter(|s| !s.is_empty()).collect();
    let longest = recorded.len().max(actual.len());
    if longest == 0 {
        return 1.0;
    }
    let common = recorded
        .iter()
        .zip(actual.iter())
        .take_while(|(a, b)| a == b)
        .count();
    common as f64 / longest as f64
}

/// Last path segment of a URL-ish value, without query or fragment
pub fn last_path_segment(value: &str) -> &str {
    let value = value.split(['?', '#']).next().unwrap_or(value);
    value.trim_end_matches('/').rsplit('/').next().unwrap_or(value)
}

/// Fraction of recorded whitespace-delimited tokens found in `actual`
pub fn proxy_similarity(recorded: &str, actual: &str) -> f64 {
    let tokens: Vec<&str> = recorded.split_whitespace().collect();
    if tokens.is_empty() {
        return if actual.trim().is_empty() { 1.0 } else { 0.0 };
    }
    let found = tokens.iter().filter(|token| actual.contains(*token)).count();
    found as f64 / tokens.len() as f64
}

/// Collapse runs of whitespace into single spaces
pub fn normalize_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized text proxy of a node
pub fn text_proxy<T: DomNavigator>(tree: &T, node: T::Node) -> String {
    normalize_whitespace(&tree.text_content(node))
}

/// Normalized markup proxy of a node
pub fn html_proxy<T: DomNavigator>(tree: &T, node: T::Node) -> String {
    normalize_whitespace(&tree.inner_html(node))
}
