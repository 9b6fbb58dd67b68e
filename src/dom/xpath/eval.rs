//! Path query evaluation over any [`DomNavigator`]

use super::parser::{Axis, CmpOp, Expr, Function, LocationPath, NodeTest, Query, Step};
use crate::dom::navigator::{DomNavigator, NodeKind};
use std::collections::{HashMap, HashSet};

/// Intermediate predicate value
#[derive(Debug, Clone)]
enum Value {
    Bool(bool),
    Number(f64),
    Str(String),
    /// String values of a node-set
    Nodes(Vec<String>),
}

impl Value {
    fn truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Nodes(items) => !items.is_empty(),
        }
    }

    fn to_number(&self) -> f64 {
        match self {
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::Str(s) => parse_number(s),
            Value::Nodes(items) => items.first().map_or(f64::NAN, |s| parse_number(s)),
        }
    }

    fn to_text(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Number(n) if n.fract() == 0.0 && n.is_finite() => format!("{}", *n as i64),
            Value::Number(n) => n.to_string(),
            Value::Str(s) => s.clone(),
            Value::Nodes(items) => items.first().cloned().unwrap_or_default(),
        }
    }
}

fn parse_number(s: &str) -> f64 {
    s.trim().parse::<f64>().unwrap_or(f64::NAN)
}

fn compare_scalars(op: CmpOp, left: &Value, right: &Value) -> bool {
    match op {
        CmpOp::Eq | CmpOp::NotEq => {
            let equal = match (left, right) {
                (Value::Bool(_), _) | (_, Value::Bool(_)) => left.truthy() == right.truthy(),
                (Value::Number(_), _) | (_, Value::Number(_)) => left.to_number() == right.to_number(),
                _ => left.to_text() == right.to_text(),
            };
            if op == CmpOp::Eq { equal } else { !equal }
        }
        CmpOp::Lt => left.to_number() < right.to_number(),
        CmpOp::LtEq => left.to_number() <= right.to_number(),
        CmpOp::Gt => left.to_number() > right.to_number(),
        CmpOp::GtEq => left.to_number() >= right.to_number(),
    }
}

fn compare(op: CmpOp, left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Nodes(items), Value::Bool(_)) | (Value::Bool(_), Value::Nodes(items)) => {
            let as_bool = Value::Bool(!items.is_empty());
            if matches!(left, Value::Nodes(_)) {
                compare_scalars(op, &as_bool, right)
            } else {
                compare_scalars(op, left, &as_bool)
            }
        }
        (Value::Nodes(l), Value::Nodes(r)) => l.iter().any(|a| {
            r.iter()
                .any(|b| compare_scalars(op, &Value::Str(a.clone()), &Value::Str(b.clone())))
        }),
        (Value::Nodes(items), other) => items
            .iter()
            .any(|item| compare_scalars(op, &Value::Str(item.clone()), other)),
        (other, Value::Nodes(items)) => items
            .iter()
            .any(|item| compare_scalars(op, other, &Value::Str(item.clone()))),
        _ => compare_scalars(op, left, right),
    }
}

fn normalize_space(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Evaluates parsed queries against a tree, keeping results in document order
pub struct Evaluator<'a, T: DomNavigator> {
    tree: &'a T,
    order: HashMap<T::Node, usize>,
}

impl<'a, T: DomNavigator> Evaluator<'a, T> {
    /// Create an evaluator for the given tree
    pub fn new(tree: &'a T) -> Self {
        let document = tree.document();
        let mut order = HashMap::new();
        order.insert(document, 0);
        for (i, node) in tree.descendants(document).into_iter().enumerate() {
            order.insert(node, i + 1);
        }
        Self { tree, order }
    }

    /// Evaluate a query relative to `context`
    pub fn evaluate(&self, query: &Query, context: T::Node) -> Vec<T::Node> {
        let mut results = Vec::new();
        for path in &query.paths {
            results.extend(self.eval_path(path, context));
        }
        self.sort_unique(results)
    }

    fn sort_unique(&self, nodes: Vec<T::Node>) -> Vec<T::Node> {
        let mut seen = HashSet::new();
        let mut unique: Vec<T::Node> = nodes.into_iter().filter(|n| seen.insert(*n)).collect();
        unique.sort_by_key(|n| self.order.get(n).copied().unwrap_or(usize::MAX));
        unique
    }

    fn eval_path(&self, path: &LocationPath, context: T::Node) -> Vec<T::Node> {
        let start = if path.absolute {
            self.tree.owning_document(context).unwrap_or_else(|| self.tree.document())
        } else {
            context
        };

        let mut current = vec![start];
        for step in &path.steps {
            let mut next = Vec::new();
            for node in &current {
                next.extend(self.eval_step(step, *node));
            }
            current = self.sort_unique(next);
            if current.is_empty() {
                break;
            }
        }
        current
    }

    fn axis_nodes(&self, axis: Axis, node: T::Node) -> Vec<T::Node> {
        let tree = self.tree;
        match axis {
            Axis::Child => tree.children(node),
            Axis::Descendant => tree.descendants(node),
            Axis::DescendantOrSelf => {
                let mut nodes = vec![node];
                nodes.extend(tree.descendants(node));
                nodes
            }
            Axis::Parent => tree.parent(node).into_iter().collect(),
            Axis::Ancestor => {
                let mut nodes = Vec::new();
                let mut current = tree.parent(node);
                while let Some(parent) = current {
                    nodes.push(parent);
                    current = tree.parent(parent);
                }
                nodes
            }
            Axis::SelfNode => vec![node],
            Axis::FollowingSibling | Axis::PrecedingSibling => {
                let Some(parent) = tree.parent(node) else {
                    return Vec::new();
                };
                let siblings = tree.children(parent);
                let Some(pos) = siblings.iter().position(|s| *s == node) else {
                    return Vec::new();
                };
                if axis == Axis::FollowingSibling {
                    siblings[pos + 1..].to_vec()
                } else {
                    siblings[..pos].iter().rev().copied().collect()
                }
            }
        }
    }

    fn matches_test(&self, test: &NodeTest, node: T::Node) -> bool {
        match test {
            NodeTest::AnyNode => true,
            NodeTest::AnyElement => self.tree.node_kind(node) == NodeKind::Element,
            NodeTest::Name(name) => {
                self.tree.node_kind(node) == NodeKind::Element
                    && self.tree.tag_name(node).eq_ignore_ascii_case(name)
            }
        }
    }

    fn eval_step(&self, step: &Step, node: T::Node) -> Vec<T::Node> {
        let mut candidates: Vec<T::Node> = self
            .axis_nodes(step.axis, node)
            .into_iter()
            .filter(|n| self.matches_test(&step.test, *n))
            .collect();

        for predicate in &step.predicates {
            let size = candidates.len();
            candidates = candidates
                .into_iter()
                .enumerate()
                .filter(|(i, candidate)| {
                    match self.eval_expr(predicate, *candidate, i + 1, size) {
                        Value::Number(n) => n == (i + 1) as f64,
                        other => other.truthy(),
                    }
                })
                .map(|(_, candidate)| candidate)
                .collect();
        }
        candidates
    }

    fn string_value(&self, node: T::Node) -> String {
        self.tree.text_content(node)
    }

    fn eval_expr(&self, expr: &Expr, node: T::Node, position: usize, size: usize) -> Value {
        match expr {
            Expr::Or(left, right) => Value::Bool(
                self.eval_expr(left, node, position, size).truthy()
                    || self.eval_expr(right, node, position, size).truthy(),
            ),
            Expr::And(left, right) => Value::Bool(
                self.eval_expr(left, node, position, size).truthy()
                    && self.eval_expr(right, node, position, size).truthy(),
            ),
            Expr::Compare(op, left, right) => {
                let left = self.eval_expr(left, node, position, size);
                let right = self.eval_expr(right, node, position, size);
                Value::Bool(compare(*op, &left, &right))
            }
            Expr::Number(n) => Value::Number(*n),
            Expr::Literal(s) => Value::Str(s.clone()),
            Expr::Attribute(name) => Value::Nodes(
                self.tree
                    .attribute(node, name)
                    .map(|v| vec![v.to_string()])
                    .unwrap_or_default(),
            ),
            Expr::AnyAttribute => Value::Nodes(
                self.tree
                    .attribute_names(node)
                    .into_iter()
                    .filter_map(|name| self.tree.attribute(node, name))
                    .map(str::to_string)
                    .collect(),
            ),
            Expr::Path(path) => Value::Nodes(
                self.eval_path(path, node)
                    .into_iter()
                    .map(|n| self.string_value(n))
                    .collect(),
            ),
            Expr::Call(function, args) => self.call(*function, args, node, position, size),
        }
    }

    fn call(
        &self,
        function: Function,
        args: &[Expr],
        node: T::Node,
        position: usize,
        size: usize,
    ) -> Value {
        let arg = |i: usize| {
            args.get(i)
                .map(|a| self.eval_expr(a, node, position, size))
        };
        let context_string = || Value::Str(self.string_value(node));

        match function {
            Function::Position => Value::Number(position as f64),
            Function::Last => Value::Number(size as f64),
            Function::Not => Value::Bool(!arg(0).is_some_and(|v| v.truthy())),
            Function::Contains => {
                let haystack = arg(0).map(|v| v.to_text()).unwrap_or_default();
                let needle = arg(1).map(|v| v.to_text()).unwrap_or_default();
                Value::Bool(haystack.contains(&needle))
            }
            Function::StartsWith => {
                let haystack = arg(0).map(|v| v.to_text()).unwrap_or_default();
                let prefix = arg(1).map(|v| v.to_text()).unwrap_or_default();
                Value::Bool(haystack.starts_with(&prefix))
            }
            Function::NormalizeSpace => {
                let source = arg(0).unwrap_or_else(context_string);
                Value::Str(normalize_space(&source.to_text()))
            }
            Function::StringLength => {
                let source = arg(0).unwrap_or_else(context_string);
                Value::Number(source.to_text().chars().count() as f64)
            }
            Function::Count => match arg(0) {
                Some(Value::Nodes(items)) => Value::Number(items.len() as f64),
                _ => Value::Number(f64::NAN),
            },
            Function::Text => Value::Nodes(
                self.tree
                    .own_text(node)
                    .map(|t| vec![t.to_string()])
                    .unwrap_or_default(),
            ),
        }
    }
}
