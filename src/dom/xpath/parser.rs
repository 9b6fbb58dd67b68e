//! Tokenizer and recursive descent parser for path query expressions

use crate::error::{ResolveError, Result};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Slash,
    DoubleSlash,
    LBracket,
    RBracket,
    LParen,
    RParen,
    At,
    Comma,
    Pipe,
    Dot,
    DotDot,
    Star,
    ColonColon,
    Op(CmpOp),
    Name(String),
    Literal(String),
    Number(f64),
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

/// Navigation axis of a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Parent,
    Ancestor,
    SelfNode,
    FollowingSibling,
    PrecedingSibling,
}

impl Axis {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "child" => Axis::Child,
            "descendant" => Axis::Descendant,
            "descendant-or-self" => Axis::DescendantOrSelf,
            "parent" => Axis::Parent,
            "ancestor" => Axis::Ancestor,
            "self" => Axis::SelfNode,
            "following-sibling" => Axis::FollowingSibling,
            "preceding-sibling" => Axis::PrecedingSibling,
            _ => return None,
        })
    }

    /// Reverse axes number their positions from the context node outward
    pub fn is_reverse(&self) -> bool {
        matches!(self, Axis::Parent | Axis::Ancestor | Axis::PrecedingSibling)
    }
}

/// Node test of a step
#[derive(Debug, Clone, PartialEq)]
pub enum NodeTest {
    /// `*`: any element
    AnyElement,
    /// `node()`: any node
    AnyNode,
    /// Element with the given tag (ASCII case-insensitive)
    Name(String),
}

/// One location step
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Expr>,
}

/// A location path such as `/html/body//a[2]`
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    pub absolute: bool,
    pub steps: Vec<Step>,
}

/// Built-in functions usable inside predicates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Function {
    Position,
    Last,
    Not,
    Contains,
    StartsWith,
    NormalizeSpace,
    StringLength,
    Count,
    Text,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "position" => Function::Position,
            "last" => Function::Last,
            "not" => Function::Not,
            "contains" => Function::Contains,
            "starts-with" => Function::StartsWith,
            "normalize-space" => Function::NormalizeSpace,
            "string-length" => Function::StringLength,
            "count" => Function::Count,
            "text" => Function::Text,
            _ => return None,
        })
    }

    fn arity(&self) -> (usize, usize) {
        match self {
            Function::Position | Function::Last | Function::Text => (0, 0),
            Function::Not | Function::Count => (1, 1),
            Function::Contains | Function::StartsWith => (2, 2),
            Function::NormalizeSpace | Function::StringLength => (0, 1),
        }
    }
}

/// Predicate expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Compare(CmpOp, Box<Expr>, Box<Expr>),
    Number(f64),
    Literal(String),
    Attribute(String),
    AnyAttribute,
    Path(LocationPath),
    Call(Function, Vec<Expr>),
}

/// Parsed query: one or more paths joined by `|`
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub paths: Vec<LocationPath>,
}

fn tokenize(input: &str) -> Result<Vec<(usize, Token)>> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];
        let next = chars.get(i + 1).map(|(_, c)| *c);
        let (token, width) = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '/' if next == Some('/') => (Token::DoubleSlash, 2),
            '/' => (Token::Slash, 1),
            '[' => (Token::LBracket, 1),
            ']' => (Token::RBracket, 1),
            '(' => (Token::LParen, 1),
            ')' => (Token::RParen, 1),
            '@' => (Token::At, 1),
            ',' => (Token::Comma, 1),
            '|' => (Token::Pipe, 1),
            '*' => (Token::Star, 1),
            ':' if next == Some(':') => (Token::ColonColon, 2),
            '=' => (Token::Op(CmpOp::Eq), 1),
            '!' if next == Some('=') => (Token::Op(CmpOp::NotEq), 2),
            '<' if next == Some('=') => (Token::Op(CmpOp::LtEq), 2),
            '<' => (Token::Op(CmpOp::Lt), 1),
            '>' if next == Some('=') => (Token::Op(CmpOp::GtEq), 2),
            '>' => (Token::Op(CmpOp::Gt), 1),
            '.' if next == Some('.') => (Token::DotDot, 2),
            '.' if !next.is_some_and(|n| n.is_ascii_digit()) => (Token::Dot, 1),
            '\'' | '"' => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|(_, ch)| *ch == c)
                    .ok_or_else(|| ResolveError::path_query(offset, "unterminated string literal"))?;
                let literal: String = chars[i + 1..i + 1 + end].iter().map(|(_, ch)| ch).collect();
                (Token::Literal(literal), end + 2)
            }
            c if c.is_ascii_digit() || c == '.' => {
                let len = chars[i..]
                    .iter()
                    .take_while(|(_, ch)| ch.is_ascii_digit() || *ch == '.')
                    .count();
                let text: String = chars[i..i + len].iter().map(|(_, ch)| ch).collect();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| ResolveError::path_query(offset, format!("invalid number '{}'", text)))?;
                (Token::Number(value), len)
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut len = 0;
                while let Some((_, ch)) = chars.get(i + len) {
                    let single_colon = *ch == ':'
                        && chars.get(i + len + 1).is_some_and(|(_, n)| *n != ':')
                        && len > 0;
                    if ch.is_alphanumeric() || matches!(ch, '-' | '_' | '.') || single_colon {
                        len += 1;
                    } else {
                        break;
                    }
                }
                let name: String = chars[i..i + len].iter().map(|(_, ch)| ch).collect();
                (Token::Name(name), len)
            }
            other => {
                return Err(ResolveError::path_query(
                    offset,
                    format!("unexpected character '{}'", other),
                ));
            }
        };
        tokens.push((offset, token));
        i += width;
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn peek_at(&self, ahead: usize) -> Option<&Token> {
        self.tokens.get(self.pos + ahead).map(|(_, t)| t)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |(o, _)| *o)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        self.pos += 1;
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        if self.eat(&expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected {:?}", expected)))
        }
    }

    fn error(&self, reason: impl Into<String>) -> ResolveError {
        ResolveError::path_query(self.offset(), reason)
    }

    fn parse_query(&mut self) -> Result<Query> {
        let mut paths = vec![self.parse_path()?];
        while self.eat(&Token::Pipe) {
            paths.push(self.parse_path()?);
        }
        if self.peek().is_some() {
            return Err(self.error("unexpected trailing input"));
        }
        Ok(Query { paths })
    }

    fn parse_path(&mut self) -> Result<LocationPath> {
        let mut steps = Vec::new();
        let absolute = match self.peek() {
            Some(Token::Slash) => {
                self.pos += 1;
                if !self.starts_step() {
                    return Ok(LocationPath { absolute: true, steps });
                }
                true
            }
            Some(Token::DoubleSlash) => {
                self.pos += 1;
                steps.push(descendant_or_self());
                true
            }
            _ => false,
        };

        steps.push(self.parse_step()?);
        loop {
            match self.peek() {
                Some(Token::Slash) => {
                    self.pos += 1;
                }
                Some(Token::DoubleSlash) => {
                    self.pos += 1;
                    steps.push(descendant_or_self());
                }
                _ => break,
            }
            steps.push(self.parse_step()?);
        }

        Ok(LocationPath { absolute, steps })
    }

    fn starts_step(&self) -> bool {
        matches!(
            self.peek(),
            Some(Token::Name(_) | Token::Star | Token::Dot | Token::DotDot)
        )
    }

    fn parse_step(&mut self) -> Result<Step> {
        if self.eat(&Token::Dot) {
            return Ok(Step {
                axis: Axis::SelfNode,
                test: NodeTest::AnyNode,
                predicates: Vec::new(),
            });
        }
        if self.eat(&Token::DotDot) {
            return Ok(Step {
                axis: Axis::Parent,
                test: NodeTest::AnyNode,
                predicates: Vec::new(),
            });
        }

        let mut axis = Axis::Child;
        if let (Some(Token::Name(name)), Some(Token::ColonColon)) = (self.peek(), self.peek_at(1)) {
            axis = Axis::from_name(name)
                .ok_or_else(|| self.error(format!("unsupported axis '{}'", name)))?;
            self.pos += 2;
        }

        let test = match self.advance() {
            Some(Token::Star) => NodeTest::AnyElement,
            Some(Token::Name(name)) if self.peek() == Some(&Token::LParen) => {
                self.pos += 1;
                self.expect(Token::RParen)?;
                match name.as_str() {
                    "node" => NodeTest::AnyNode,
                    other => {
                        self.pos -= 1;
                        return Err(self.error(format!("unsupported node test '{}()'", other)));
                    }
                }
            }
            Some(Token::Name(name)) => NodeTest::Name(name),
            _ => {
                self.pos = self.pos.saturating_sub(1);
                return Err(self.error("expected a node test"));
            }
        };

        let mut predicates = Vec::new();
        while self.eat(&Token::LBracket) {
            predicates.push(self.parse_or()?);
            self.expect(Token::RBracket)?;
        }

        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_and()?;
        while self.eat_keyword("or") {
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_comparison()?;
        while self.eat_keyword("and") {
            let right = self.parse_comparison()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if matches!(self.peek(), Some(Token::Name(name)) if name == keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let mut left = self.parse_primary()?;
        while let Some(Token::Op(op)) = self.peek() {
            let op = *op;
            self.pos += 1;
            let right = self.parse_primary()?;
            left = Expr::Compare(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.peek().cloned() {
            Some(Token::Number(value)) => {
                self.pos += 1;
                Ok(Expr::Number(value))
            }
            Some(Token::Literal(text)) => {
                self.pos += 1;
                Ok(Expr::Literal(text))
            }
            Some(Token::At) => {
                self.pos += 1;
                match self.advance() {
                    Some(Token::Name(name)) => Ok(Expr::Attribute(name)),
                    Some(Token::Star) => Ok(Expr::AnyAttribute),
                    _ => {
                        self.pos -= 1;
                        Err(self.error("expected attribute name after '@'"))
                    }
                }
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.parse_or()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Name(name)) if self.peek_at(1) == Some(&Token::LParen) && name != "node" => {
                let function = Function::from_name(&name)
                    .ok_or_else(|| self.error(format!("unknown function '{}'", name)))?;
                self.pos += 2;
                let mut args = Vec::new();
                if !self.eat(&Token::RParen) {
                    loop {
                        args.push(self.parse_or()?);
                        if self.eat(&Token::Comma) {
                            continue;
                        }
                        self.expect(Token::RParen)?;
                        break;
                    }
                }
                let (min, max) = function.arity();
                if args.len() < min || args.len() > max {
                    return Err(self.error(format!(
                        "function '{}' takes {}..={} arguments, got {}",
                        name,
                        min,
                        max,
                        args.len()
                    )));
                }
                Ok(Expr::Call(function, args))
            }
            Some(Token::Slash | Token::DoubleSlash) => Ok(Expr::Path(self.parse_path()?)),
            _ if self.starts_step() => Ok(Expr::Path(self.parse_path()?)),
            _ => Err(self.error("expected an expression")),
        }
    }
}

fn descendant_or_self() -> Step {
    Step {
        axis: Axis::DescendantOrSelf,
        test: NodeTest::AnyNode,
        predicates: Vec::new(),
    }
}

/// Parse a path query expression
pub fn parse(input: &str) -> Result<Query> {
    if input.trim().is_empty() {
        return Err(ResolveError::path_query(0, "empty expression"));
    }
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: input.len(),
    };
    parser.parse_query()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_absolute_path() {
        let query = parse("/html/body/div[2]").unwrap();
        assert_eq!(query.paths.len(), 1);
        let path = &query.paths[0];
        assert!(path.absolute);
        assert_eq!(path.steps.len(), 3);
        assert_eq!(path.steps[2].test, NodeTest::Name("div".to_string()));
        assert_eq!(path.steps[2].predicates, vec![Expr::Number(2.0)]);
    }

    #[test]
    fn test_parse_descendant_shorthand() {
        let query = parse("//a[@id='x']").unwrap();
        let path = &query.paths[0];
        assert_eq!(path.steps[0].axis, Axis::DescendantOrSelf);
        assert_eq!(path.steps[1].test, NodeTest::Name("a".to_string()));
        assert!(matches!(
            &path.steps[1].predicates[0],
            Expr::Compare(CmpOp::Eq, left, _) if **left == Expr::Attribute("id".to_string())
        ));
    }

    #[test]
    fn test_parse_functions_and_union() {
        let query =
            parse("//div[contains(@class, \"menu\") and not(@hidden)] | //span[last()]").unwrap();
        assert_eq!(query.paths.len(), 2);
        assert!(matches!(query.paths[0].steps[1].predicates[0], Expr::And(_, _)));
    }

    #[test]
    fn test_parse_explicit_axis() {
        let query = parse("following-sibling::li[1]").unwrap();
        assert_eq!(query.paths[0].steps[0].axis, Axis::FollowingSibling);
        assert!(!query.paths[0].absolute);
    }

    #[test]
    fn test_parse_root_only() {
        let query = parse("/").unwrap();
        assert!(query.paths[0].absolute);
        assert!(query.paths[0].steps.is_empty());
    }

    #[test]
    fn test_malformed_expressions() {
        assert!(parse("").is_err());
        assert!(parse("//div[").is_err());
        assert!(parse("//div[@id='x]").is_err());
        assert!(parse("//div]").is_err());
        assert!(parse("bogus::div").is_err());
        assert!(parse("//div[frobnicate()]").is_err());
        assert!(parse("//#div").is_err());
    }
}
