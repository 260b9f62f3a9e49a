// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Pratt parser for JSONPath queries
//!
//! Segments and selectors are parsed by plain recursive descent. Filter
//! expressions use binding powers so that `||` binds loosest, `&&` tighter
//! and comparisons tightest. Comparisons do not chain.

use super::error::{ParseResult, SyntaxError};
use super::span::Spanned;
use super::tokenizer::Token;
use crate::ast::{
    ComparisonOperator, ExpressionKind, ExpressionNode, QueryNode, QueryRoot, SegmentKind,
    SegmentNode, SelectorNode, SliceBounds, SourceSpan,
};
use serde_json::{Number, Value};
use smallvec::SmallVec;

/// Largest magnitude of an index or slice bound (I-JSON safe integers)
pub const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

/// Operator precedence levels (higher = tighter binding)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// Start of an expression
    Lowest = 0,
    /// Logical OR
    Or = 1,
    /// Logical AND
    And = 2,
    /// Comparison operators, non-associative
    Comparison = 3,
}

fn infix_precedence(token: &Token<'_>) -> Option<Precedence> {
    match token {
        Token::OrOr => Some(Precedence::Or),
        Token::AndAnd => Some(Precedence::And),
        token if comparison_operator(token).is_some() => Some(Precedence::Comparison),
        _ => None,
    }
}

fn comparison_operator(token: &Token<'_>) -> Option<ComparisonOperator> {
    match token {
        Token::EqualEqual => Some(ComparisonOperator::Equal),
        Token::NotEqual => Some(ComparisonOperator::NotEqual),
        Token::LessThan => Some(ComparisonOperator::LessThan),
        Token::LessThanOrEqual => Some(ComparisonOperator::LessThanOrEqual),
        Token::GreaterThan => Some(ComparisonOperator::GreaterThan),
        Token::GreaterThanOrEqual => Some(ComparisonOperator::GreaterThanOrEqual),
        _ => None,
    }
}

/// Parser over a token list produced by [`tokenize`](super::tokenizer::tokenize)
pub struct Parser<'input> {
    source: &'input str,
    tokens: Vec<Spanned<Token<'input>>>,
    position: usize,
    depth: usize,
    max_depth: usize,
}

impl<'input> Parser<'input> {
    /// Create a parser; `tokens` must end with [`Token::Eof`]
    pub fn new(source: &'input str, tokens: Vec<Spanned<Token<'input>>>, max_depth: usize) -> Self {
        Self {
            source,
            tokens,
            position: 0,
            depth: 0,
            max_depth,
        }
    }

    fn current(&self) -> &Spanned<Token<'input>> {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.position.min(last)]
    }

    fn peek(&self) -> &Token<'input> {
        &self.current().value
    }

    fn peek_next(&self) -> Option<&Spanned<Token<'input>>> {
        self.tokens.get(self.position + 1)
    }

    fn advance(&mut self) -> Spanned<Token<'input>> {
        let token = self.current().clone();
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    fn previous_end(&self) -> usize {
        self.position
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index))
            .map_or(0, |token| token.end)
    }

    fn error_at(&self, token: &Spanned<Token<'input>>, message: impl Into<String>) -> SyntaxError {
        let offending_symbol = match token.value {
            Token::Eof => None,
            _ => Some(
                SourceSpan::new(token.start, token.end)
                    .text(self.source)
                    .to_string(),
            ),
        };
        SyntaxError::new(token.line, token.column, message, offending_symbol)
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        let token = self.current();
        self.error_at(
            token,
            format!("expected {expected}, found {}", token.value.describe()),
        )
    }

    fn expect(&mut self, expected: Token<'input>, description: &str) -> ParseResult<Spanned<Token<'input>>> {
        if *self.peek() == expected {
            Ok(self.advance())
        } else {
            Err(self.unexpected(description))
        }
    }

    /// Run `parse` one nesting level deeper, failing once the limit is hit
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= self.max_depth {
            return Err(self.error_at(
                self.current(),
                format!("maximum nesting depth of {} exceeded", self.max_depth),
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Parse a complete query; the whole input must be consumed
    pub fn parse_query(mut self) -> ParseResult<QueryNode> {
        let first = self.current().clone();
        if first.start != 0 {
            return Err(self.error_at(&first, "leading blank space is not allowed"));
        }
        if first.value != Token::Dollar {
            return Err(self.unexpected("'$'"));
        }
        self.advance();
        let query = self.parse_segments(QueryRoot::Root, first.start)?;

        let last = self.current().clone();
        if last.value != Token::Eof {
            return Err(self.unexpected("segment or end of input"));
        }
        if last.start != query.span.end {
            return Err(self.error_at(&last, "trailing blank space is not allowed"));
        }
        Ok(query)
    }

    fn parse_segments(&mut self, root: QueryRoot, start: usize) -> ParseResult<QueryNode> {
        let mut segments = Vec::new();
        loop {
            let segment = match self.peek() {
                Token::Dot => {
                    let dot = self.advance();
                    self.parse_shorthand(&dot, SegmentKind::Child)?
                }
                Token::DotDot => {
                    let dots = self.advance();
                    if *self.peek() == Token::LeftBracket && dots.touches(self.current()) {
                        self.advance();
                        SegmentNode {
                            kind: SegmentKind::Descendant,
                            selectors: self.parse_bracketed()?,
                        }
                    } else {
                        self.parse_shorthand(&dots, SegmentKind::Descendant)?
                    }
                }
                Token::LeftBracket => {
                    self.advance();
                    SegmentNode {
                        kind: SegmentKind::Child,
                        selectors: self.parse_bracketed()?,
                    }
                }
                _ => break,
            };
            segments.push(segment);
        }

        Ok(QueryNode {
            root,
            segments,
            span: SourceSpan::new(start, self.previous_end()),
        })
    }

    /// `.name`, `.*`, `..name` or `..*`
    fn parse_shorthand(
        &mut self,
        marker: &Spanned<Token<'input>>,
        kind: SegmentKind,
    ) -> ParseResult<SegmentNode> {
        let next = self.current().clone();
        if !marker.touches(&next) {
            return Err(self.error_at(
                &next,
                format!("blank space is not allowed after {}", marker.value.describe()),
            ));
        }
        let selector = match next.value {
            Token::Star => SelectorNode::Wildcard,
            Token::Name(name) => SelectorNode::Name(name.to_string()),
            _ => return Err(self.unexpected("member name or '*'")),
        };
        self.advance();

        let mut selectors = SmallVec::new();
        selectors.push(selector);
        Ok(SegmentNode { kind, selectors })
    }

    /// Selectors after an opening bracket, through the closing one
    fn parse_bracketed(&mut self) -> ParseResult<SmallVec<[SelectorNode; 1]>> {
        let mut selectors = SmallVec::new();
        loop {
            selectors.push(self.parse_selector()?);
            match self.peek() {
                Token::Comma => {
                    self.advance();
                }
                Token::RightBracket => {
                    self.advance();
                    return Ok(selectors);
                }
                _ => return Err(self.unexpected("',' or ']'")),
            }
        }
    }

    fn parse_selector(&mut self) -> ParseResult<SelectorNode> {
        match self.peek().clone() {
            Token::String(name) => {
                self.advance();
                Ok(SelectorNode::Name(name))
            }
            Token::Star => {
                self.advance();
                Ok(SelectorNode::Wildcard)
            }
            Token::Question => {
                self.advance();
                let predicate = self.nested(|p| p.parse_expression(Precedence::Lowest))?;
                Ok(SelectorNode::Filter(Box::new(predicate)))
            }
            Token::Number(_) | Token::Colon => self.parse_index_or_slice(),
            _ => Err(self.unexpected("selector")),
        }
    }

    fn parse_index_or_slice(&mut self) -> ParseResult<SelectorNode> {
        let start = self.parse_optional_integer()?;
        if *self.peek() != Token::Colon {
            return match start {
                Some(index) => Ok(SelectorNode::Index(index)),
                None => Err(self.unexpected("index")),
            };
        }
        self.advance();

        let end = self.parse_optional_integer()?;
        let step = if *self.peek() == Token::Colon {
            self.advance();
            self.parse_optional_integer()?
        } else {
            None
        };
        Ok(SelectorNode::Slice(SliceBounds { start, end, step }))
    }

    fn parse_optional_integer(&mut self) -> ParseResult<Option<i64>> {
        let token = self.current().clone();
        let Token::Number(text) = token.value else {
            return Ok(None);
        };
        let value = parse_integer(text).map_err(|message| self.error_at(&token, message))?;
        self.advance();
        Ok(Some(value))
    }

    /// Parse a filter expression whose operators all bind tighter than `min`
    fn parse_expression(&mut self, min: Precedence) -> ParseResult<ExpressionNode> {
        let mut left = self.parse_prefix()?;

        loop {
            let operator = self.current().clone();
            let Some(precedence) = infix_precedence(&operator.value) else {
                break;
            };
            if precedence <= min {
                break;
            }
            self.advance();

            left = match operator.value {
                Token::OrOr => {
                    let right = self.parse_expression(Precedence::Or)?;
                    join(left, right, ExpressionKind::Or, |kind| match kind {
                        ExpressionKind::Or(operands) => Ok(operands),
                        other => Err(other),
                    })
                }
                Token::AndAnd => {
                    let right = self.parse_expression(Precedence::And)?;
                    join(left, right, ExpressionKind::And, |kind| match kind {
                        ExpressionKind::And(operands) => Ok(operands),
                        other => Err(other),
                    })
                }
                ref token => {
                    let Some(comparison) = comparison_operator(token) else {
                        return Err(self.error_at(&operator, "unexpected operator"));
                    };
                    if !is_comparable(&left) {
                        return Err(self.error_at(
                            &operator,
                            format!("left operand of '{comparison}' is not comparable"),
                        ));
                    }
                    let right = self.parse_comparable()?;
                    if comparison_operator(self.peek()).is_some() {
                        return Err(self.error_at(
                            self.current(),
                            "comparison operators cannot be chained",
                        ));
                    }
                    let span = left.span.to(right.span);
                    ExpressionNode::new(
                        ExpressionKind::Comparison {
                            operator: comparison,
                            left: Box::new(left),
                            right: Box::new(right),
                        },
                        span,
                    )
                }
            };
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> ParseResult<ExpressionNode> {
        let token = self.current().clone();
        match token.value {
            Token::Bang => {
                self.advance();
                let operand = self.nested(|p| p.parse_prefix())?;
                let span = SourceSpan::new(token.start, operand.span.end);
                Ok(ExpressionNode::new(
                    ExpressionKind::Not(Box::new(operand)),
                    span,
                ))
            }
            Token::LeftParen => {
                self.advance();
                let inner = self.nested(|p| p.parse_expression(Precedence::Lowest))?;
                let close = self.expect(Token::RightParen, "')'")?;
                Ok(ExpressionNode::new(
                    ExpressionKind::Paren(Box::new(inner)),
                    SourceSpan::new(token.start, close.end),
                ))
            }
            _ => self.parse_comparable(),
        }
    }

    /// Literal, query or function call
    fn parse_comparable(&mut self) -> ParseResult<ExpressionNode> {
        let token = self.current().clone();
        let span = SourceSpan::new(token.start, token.end);
        let literal = |value: Value| ExpressionNode::new(ExpressionKind::Literal(value), span);

        match token.value {
            Token::Number(text) => {
                let value = parse_number(text).map_err(|message| self.error_at(&token, message))?;
                self.advance();
                Ok(literal(value))
            }
            Token::String(value) => {
                self.advance();
                Ok(literal(Value::String(value)))
            }
            Token::Dollar | Token::At => {
                let root = if token.value == Token::Dollar {
                    QueryRoot::Root
                } else {
                    QueryRoot::Current
                };
                self.advance();
                let query = self.parse_segments(root, token.start)?;
                let span = query.span;
                Ok(ExpressionNode::new(ExpressionKind::Query(query), span))
            }
            Token::Name(name) => {
                if let Some(next) = self.peek_next()
                    && next.value == Token::LeftParen
                {
                    return self.parse_function_call(name);
                }
                let value = match name {
                    "true" => Value::Bool(true),
                    "false" => Value::Bool(false),
                    "null" => Value::Null,
                    _ => return Err(self.unexpected("literal, query or function call")),
                };
                self.advance();
                Ok(literal(value))
            }
            _ => Err(self.unexpected("literal, query or function call")),
        }
    }

    fn parse_function_call(&mut self, name: &'input str) -> ParseResult<ExpressionNode> {
        let name_token = self.advance();
        if !is_function_name(name) {
            return Err(self.error_at(&name_token, format!("invalid function name '{name}'")));
        }
        let open = self.advance();
        if !name_token.touches(&open) {
            return Err(self.error_at(
                &open,
                "blank space is not allowed between a function name and '('",
            ));
        }

        let arguments = self.nested(|p| {
            let mut arguments = Vec::new();
            if *p.peek() != Token::RightParen {
                loop {
                    arguments.push(p.parse_expression(Precedence::Lowest)?);
                    if *p.peek() != Token::Comma {
                        break;
                    }
                    p.advance();
                }
            }
            Ok(arguments)
        })?;
        let close = self.expect(Token::RightParen, "',' or ')'")?;

        Ok(ExpressionNode::new(
            ExpressionKind::FunctionCall {
                name: name.to_string(),
                arguments,
            },
            SourceSpan::new(name_token.start, close.end),
        ))
    }
}

/// Append `right` to a flat operand list, reusing `left` if it already is one
fn join(
    left: ExpressionNode,
    right: ExpressionNode,
    build: fn(Vec<ExpressionNode>) -> ExpressionKind,
    operands_of: fn(ExpressionKind) -> Result<Vec<ExpressionNode>, ExpressionKind>,
) -> ExpressionNode {
    let span = left.span.to(right.span);
    let operands = match operands_of(left.kind) {
        Ok(mut operands) => {
            operands.push(right);
            operands
        }
        Err(kind) => vec![ExpressionNode::new(kind, left.span), right],
    };
    ExpressionNode::new(build(operands), span)
}

fn is_comparable(node: &ExpressionNode) -> bool {
    matches!(
        node.kind,
        ExpressionKind::Literal(_) | ExpressionKind::Query(_) | ExpressionKind::FunctionCall { .. }
    )
}

fn is_function_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Validate an index or slice bound
fn parse_integer(text: &str) -> Result<i64, &'static str> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err("expected an integer");
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return Err("leading zeros are not allowed");
    }
    if text == "-0" {
        return Err("negative zero is not allowed");
    }
    let value: i64 = text.parse().map_err(|_| "integer out of range")?;
    if !(-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&value) {
        return Err("integer out of range");
    }
    Ok(value)
}

/// Convert a number literal to a JSON value
fn parse_number(text: &str) -> Result<Value, &'static str> {
    let integer_part = text
        .trim_start_matches('-')
        .split(['.', 'e', 'E'])
        .next()
        .unwrap_or_default();
    if integer_part.len() > 1 && integer_part.starts_with('0') {
        return Err("leading zeros are not allowed");
    }
    if !text.contains(['.', 'e', 'E'])
        && let Ok(integer) = text.parse::<i64>()
    {
        return Ok(Value::from(integer));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or("number out of range")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerConfig;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn query(text: &str) -> QueryNode {
        parse(text, &CompilerConfig::default()).unwrap()
    }

    fn error(text: &str) -> SyntaxError {
        parse(text, &CompilerConfig::default()).unwrap_err()
    }

    fn predicate(text: &str) -> ExpressionNode {
        let mut query = query(text);
        match query.segments.remove(0).selectors.remove(0) {
            SelectorNode::Filter(predicate) => *predicate,
            other => panic!("expected a filter, got {other:?}"),
        }
    }

    #[test]
    fn test_shorthand_and_brackets() {
        let parsed = query("$.store..book[0, 'title', *]");
        assert_eq!(parsed.root, QueryRoot::Root);
        assert_eq!(parsed.segments.len(), 3);
        assert_eq!(parsed.segments[0].kind, SegmentKind::Child);
        assert_eq!(parsed.segments[1].kind, SegmentKind::Descendant);
        assert_eq!(
            parsed.segments[2].selectors.to_vec(),
            vec![
                SelectorNode::Index(0),
                SelectorNode::Name("title".to_string()),
                SelectorNode::Wildcard,
            ]
        );
        assert_eq!(parsed.span, SourceSpan::new(0, 28));
    }

    #[test]
    fn test_slices() {
        let parsed = query("$[1:4][::-1][:2][5:]");
        let bounds: Vec<_> = parsed
            .segments
            .iter()
            .map(|segment| segment.selectors[0].clone())
            .collect();
        assert_eq!(
            bounds,
            vec![
                SelectorNode::Slice(SliceBounds { start: Some(1), end: Some(4), step: None }),
                SelectorNode::Slice(SliceBounds { start: None, end: None, step: Some(-1) }),
                SelectorNode::Slice(SliceBounds { start: None, end: Some(2), step: None }),
                SelectorNode::Slice(SliceBounds { start: Some(5), end: None, step: None }),
            ]
        );
    }

    #[test]
    fn test_logical_precedence() {
        let parsed = predicate("$[?@.a || @.b && @.c || @.d]");
        let ExpressionKind::Or(operands) = parsed.kind else {
            panic!("expected ||");
        };
        assert_eq!(operands.len(), 3);
        assert!(matches!(operands[1].kind, ExpressionKind::And(_)));
    }

    #[test]
    fn test_comparison_and_function() {
        let parsed = predicate("$[?length(@.name) >= 3]");
        let ExpressionKind::Comparison { operator, left, right } = parsed.kind else {
            panic!("expected a comparison");
        };
        assert_eq!(operator, ComparisonOperator::GreaterThanOrEqual);
        assert_eq!(left.function_name(), Some("length"));
        assert_eq!(right.kind, ExpressionKind::Literal(Value::from(3)));
    }

    #[test]
    fn test_literal_test_is_syntactically_accepted() {
        let parsed = predicate("$[?true]");
        assert_eq!(parsed.kind, ExpressionKind::Literal(Value::Bool(true)));
    }

    #[test]
    fn test_spans_cover_source() {
        let source = "$[?match(@.a, 'x.*') && !(@.b)]";
        let parsed = predicate(source);
        let ExpressionKind::And(operands) = &parsed.kind else {
            panic!("expected &&");
        };
        assert_eq!(operands[0].span.text(source), "match(@.a, 'x.*')");
        assert_eq!(operands[1].span.text(source), "!(@.b)");
    }

    #[test]
    fn test_rejected_queries() {
        for text in [
            "",
            " $",
            "$ ",
            "$. a",
            "$.. a",
            "$[01]",
            "$[-0]",
            "$[9007199254740992]",
            "$[1.0]",
            "$[?@.a == 1 == 2]",
            "$[?(@.a) == 1]",
            "$[?!@.a == 1]",
            "$[?length (@.a)]",
            "$[?Length(@.a)]",
            "$[?foo]",
            "$[?@.a ==]",
            "$.a[",
            "@.a",
        ] {
            assert!(
                parse(text, &CompilerConfig::default()).is_err(),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_boundary_integers() {
        let parsed = query("$[-9007199254740991, 9007199254740991]");
        assert_eq!(
            parsed.segments[0].selectors.to_vec(),
            vec![
                SelectorNode::Index(-MAX_SAFE_INTEGER),
                SelectorNode::Index(MAX_SAFE_INTEGER),
            ]
        );
    }

    #[test]
    fn test_error_position() {
        let error = error("$.a[");
        assert_eq!((error.line, error.column), (1, 4));
        assert_eq!(error.offending_symbol, None);

        let error = self::error("$\n.a[?@.b ==]");
        assert_eq!((error.line, error.column), (2, 10));
        assert_eq!(error.offending_symbol.as_deref(), Some("]"));
    }

    #[test]
    fn test_nesting_limit() {
        let config = CompilerConfig {
            max_nesting_depth: 4,
        };
        assert!(parse("$[?((@.a))]", &config).is_ok());
        assert!(parse("$[?((((@.a))))]", &config).is_err());
    }
}
