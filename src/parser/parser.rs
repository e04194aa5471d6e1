// Copyright 2025 Stoolap Contributors
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

//! Pratt parser for WHERE-clause predicates
//!
//! The parser is deliberately lenient about operand counts: `timestamp >`
//! and `between 1 and 2` parse into nodes with missing operands, leaving the
//! analyzer to report them with the operator's position.

use smallvec::{smallvec, SmallVec};

use crate::core::{ArithmeticOp, Error, Operator, Result};

use super::ast::{ExprArena, ExprKind, Literal, NodeId};
use super::lexer::Lexer;
use super::precedence::Precedence;
use super::token::{Token, TokenType};

/// A parsed predicate: the arena and its root node
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub arena: ExprArena,
    pub root: NodeId,
}

impl Predicate {
    /// Render the whole predicate back to SQL text
    pub fn to_sql(&self) -> String {
        self.arena.display(self.root).to_string()
    }
}

/// Parse predicate text into an expression arena
pub fn parse_predicate(input: &str) -> Result<Predicate> {
    Parser::new(input).parse()
}

/// Predicate parser
pub struct Parser {
    lexer: Lexer,
    cur_token: Token,
    peek_token: Token,
    arena: ExprArena,
}

impl Parser {
    /// Create a new parser for the given input
    pub fn new(input: &str) -> Self {
        let mut lexer = Lexer::new(input);
        let cur_token = lexer.next_token();
        let peek_token = lexer.next_token();
        Self {
            lexer,
            cur_token,
            peek_token,
            arena: ExprArena::new(),
        }
    }

    /// Parse the whole input as one predicate
    pub fn parse(mut self) -> Result<Predicate> {
        if self.cur_token.is_eof() {
            return Err(Error::syntax(self.cur_token.position, "empty predicate"));
        }
        let root = self.parse_expression(Precedence::Lowest)?;
        if !self.peek_token.is_eof() {
            return Err(self.unexpected(&self.peek_token));
        }
        Ok(Predicate {
            arena: self.arena,
            root,
        })
    }

    fn next_token(&mut self) {
        let next = self.lexer.next_token();
        self.cur_token = std::mem::replace(&mut self.peek_token, next);
    }

    fn check_token(token: &Token) -> Result<()> {
        if token.token_type == TokenType::Error {
            return Err(Error::syntax(
                token.position,
                token.error.as_deref().unwrap_or("invalid token"),
            ));
        }
        Ok(())
    }

    fn unexpected(&self, token: &Token) -> Error {
        if token.token_type == TokenType::Error {
            return Error::syntax(
                token.position,
                token.error.as_deref().unwrap_or("invalid token"),
            );
        }
        if token.is_eof() {
            return Error::syntax(token.position, "unexpected end of input");
        }
        Error::syntax(
            token.position,
            format!("unexpected token '{}'", token.literal),
        )
    }

    fn expect_punctuator(&mut self, punct: &str) -> Result<()> {
        if self.peek_token.is_punctuator(punct) {
            self.next_token();
            Ok(())
        } else {
            Err(Error::syntax(
                self.peek_token.position,
                format!("expected '{}'", punct),
            ))
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.peek_token.is_keyword(keyword) {
            self.next_token();
            Ok(())
        } else {
            Err(Error::syntax(
                self.peek_token.position,
                format!("expected {}", keyword),
            ))
        }
    }

    /// True when the peek token cannot start an operand
    fn peek_ends_operand(&self) -> bool {
        let t = &self.peek_token;
        t.is_eof()
            || t.is_punctuator(")")
            || t.is_punctuator(",")
            || t.is_keyword("AND")
            || t.is_keyword("OR")
    }

    fn peek_precedence(&self) -> Precedence {
        match self.peek_token.token_type {
            TokenType::Operator | TokenType::Keyword => {
                Precedence::for_operator(&self.peek_token.literal)
            }
            _ => Precedence::Lowest,
        }
    }

    fn is_infix_token(&self) -> bool {
        match self.peek_token.token_type {
            TokenType::Operator => true,
            TokenType::Keyword => matches!(
                self.peek_token.literal.as_str(),
                "AND" | "OR" | "IN" | "BETWEEN" | "NOT"
            ),
            _ => false,
        }
    }

    /// Parse an expression
    pub fn parse_expression(&mut self, precedence: Precedence) -> Result<NodeId> {
        let mut left = self.parse_prefix_expression()?;

        while !self.peek_token.is_eof() && precedence < self.peek_precedence() {
            if !self.is_infix_token() {
                break;
            }
            self.next_token();
            left = self.parse_infix_expression(left)?;
        }
        Self::check_token(&self.peek_token)?;

        Ok(left)
    }

    fn parse_prefix_expression(&mut self) -> Result<NodeId> {
        let token = self.cur_token.clone();
        let pos = token.position;
        match token.token_type {
            TokenType::Identifier => {
                if self.peek_token.is_punctuator("(") {
                    self.parse_function_call(token.literal, pos)
                } else {
                    Ok(self.arena.add(ExprKind::Column(token.literal), pos))
                }
            }
            TokenType::Integer => {
                let value = token.literal.parse::<i64>().map_err(|_| {
                    Error::syntax(pos, format!("invalid integer '{}'", token.literal))
                })?;
                Ok(self
                    .arena
                    .add(ExprKind::Literal(Literal::Integer(value)), pos))
            }
            TokenType::Float => {
                let value = token.literal.parse::<f64>().map_err(|_| {
                    Error::syntax(pos, format!("invalid number '{}'", token.literal))
                })?;
                Ok(self.arena.add(ExprKind::Literal(Literal::Float(value)), pos))
            }
            TokenType::String => {
                let inner = &token.literal[1..token.literal.len() - 1];
                Ok(self
                    .arena
                    .add(ExprKind::Literal(Literal::String(inner.to_string())), pos))
            }
            TokenType::Parameter => {
                let index = token.literal[1..]
                    .parse::<usize>()
                    .ok()
                    .filter(|&n| n > 0)
                    .ok_or_else(|| {
                        Error::syntax(pos, format!("invalid bind variable '{}'", token.literal))
                    })?;
                Ok(self.arena.add(ExprKind::BindVariable(index - 1), pos))
            }
            TokenType::Keyword => self.parse_keyword_expression(&token),
            TokenType::Operator => self.parse_prefix_operator(&token),
            TokenType::Punctuator if token.is_punctuator("(") => self.parse_grouped(),
            _ => Err(self.unexpected(&token)),
        }
    }

    fn parse_keyword_expression(&mut self, token: &Token) -> Result<NodeId> {
        let pos = token.position;
        match token.literal.as_str() {
            "NULL" => Ok(self.arena.add(ExprKind::Literal(Literal::Null), pos)),
            "TRUE" => Ok(self.arena.add(ExprKind::Literal(Literal::Boolean(true)), pos)),
            "FALSE" => Ok(self
                .arena
                .add(ExprKind::Literal(Literal::Boolean(false)), pos)),
            "NOT" => {
                self.next_token();
                let inner = self.parse_expression(Precedence::Not)?;
                Ok(self.arena.add(ExprKind::Not(inner), pos))
            }
            "BETWEEN" => {
                let (lo, hi) = self.parse_between_bounds()?;
                Ok(self.arena.add(
                    ExprKind::Between {
                        negated: false,
                        args: smallvec![lo, hi],
                    },
                    pos,
                ))
            }
            _ => Err(self.unexpected(token)),
        }
    }

    fn parse_prefix_operator(&mut self, token: &Token) -> Result<NodeId> {
        let pos = token.position;
        match token.literal.as_str() {
            "-" => {
                self.next_token();
                if self.cur_token.token_type == TokenType::Integer {
                    if let Ok(value) = format!("-{}", self.cur_token.literal).parse::<i64>() {
                        return Ok(self
                            .arena
                            .add(ExprKind::Literal(Literal::Integer(value)), pos));
                    }
                }
                let inner = self.parse_expression(Precedence::Prefix)?;
                Ok(self.arena.add(ExprKind::Negate(inner), pos))
            }
            "+" => {
                self.next_token();
                self.parse_expression(Precedence::Prefix)
            }
            op => {
                let operator = comparison_operator(op)
                    .ok_or_else(|| Error::syntax(pos, format!("unexpected operator '{}'", op)))?;
                let mut args = SmallVec::new();
                if !self.peek_ends_operand() {
                    self.next_token();
                    args.push(self.parse_expression(Precedence::LessGreater)?);
                }
                Ok(self.arena.add(
                    ExprKind::Comparison {
                        op: operator,
                        args,
                    },
                    pos,
                ))
            }
        }
    }

    /// `(` expression `)` or `(SELECT ...)`
    fn parse_grouped(&mut self) -> Result<NodeId> {
        if self.peek_token.is_keyword("SELECT") {
            return self.parse_sub_query();
        }
        self.next_token();
        let inner = self.parse_expression(Precedence::Lowest)?;
        self.expect_punctuator(")")?;
        Ok(inner)
    }

    /// Capture the raw text of `(SELECT ...)`; the current token is `(`
    fn parse_sub_query(&mut self) -> Result<NodeId> {
        let open = self.cur_token.position;
        let start = self.peek_token.position;
        let mut depth = 1usize;
        loop {
            self.next_token();
            let t = &self.cur_token;
            if t.is_eof() {
                return Err(Error::syntax(open, "unclosed sub-query"));
            }
            Self::check_token(t)?;
            if t.is_punctuator("(") {
                depth += 1;
            } else if t.is_punctuator(")") {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
        }
        let text = self.lexer.slice(start, self.cur_token.position);
        Ok(self
            .arena
            .add(ExprKind::SubQuery(text.trim().to_string()), start))
    }

    fn parse_function_call(&mut self, name: String, pos: usize) -> Result<NodeId> {
        self.next_token(); // (
        let mut args = Vec::new();
        if self.peek_token.is_punctuator(")") {
            self.next_token();
        } else {
            loop {
                self.next_token();
                args.push(self.parse_expression(Precedence::Lowest)?);
                if self.peek_token.is_punctuator(",") {
                    self.next_token();
                } else {
                    self.expect_punctuator(")")?;
                    break;
                }
            }
        }
        Ok(self.arena.add(ExprKind::Function { name, args }, pos))
    }

    fn parse_infix_expression(&mut self, left: NodeId) -> Result<NodeId> {
        let token = self.cur_token.clone();
        let pos = token.position;

        match token.token_type {
            TokenType::Keyword => match token.literal.as_str() {
                "AND" | "OR" => {
                    self.next_token();
                    let right = self.parse_expression(Precedence::for_operator(&token.literal))?;
                    let kind = if token.literal == "AND" {
                        ExprKind::And(left, right)
                    } else {
                        ExprKind::Or(left, right)
                    };
                    Ok(self.arena.add(kind, pos))
                }
                "IN" => self.parse_in_expression(left, false, pos),
                "BETWEEN" => self.parse_between_expression(left, false, pos),
                "NOT" => {
                    if self.peek_token.is_keyword("IN") {
                        self.next_token();
                        self.parse_in_expression(left, true, pos)
                    } else if self.peek_token.is_keyword("BETWEEN") {
                        self.next_token();
                        self.parse_between_expression(left, true, pos)
                    } else {
                        Err(Error::syntax(
                            self.peek_token.position,
                            "expected IN or BETWEEN after NOT",
                        ))
                    }
                }
                _ => Err(self.unexpected(&token)),
            },
            TokenType::Operator => {
                if let Some(op) = comparison_operator(&token.literal) {
                    let mut args: SmallVec<[NodeId; 2]> = smallvec![left];
                    if !self.peek_ends_operand() {
                        self.next_token();
                        args.push(self.parse_expression(Precedence::for_operator(&token.literal))?);
                    }
                    return Ok(self.arena.add(ExprKind::Comparison { op, args }, pos));
                }
                let op = match token.literal.as_str() {
                    "+" => ArithmeticOp::Add,
                    "-" => ArithmeticOp::Sub,
                    "*" => ArithmeticOp::Mul,
                    "/" => ArithmeticOp::Div,
                    _ => return Err(self.unexpected(&token)),
                };
                self.next_token();
                let right = self.parse_expression(Precedence::for_operator(&token.literal))?;
                Ok(self
                    .arena
                    .add(ExprKind::Arithmetic { op, left, right }, pos))
            }
            _ => Err(self.unexpected(&token)),
        }
    }

    /// Bounds of BETWEEN; the current token is BETWEEN
    fn parse_between_bounds(&mut self) -> Result<(NodeId, NodeId)> {
        self.next_token();
        let lower = self.parse_expression(Precedence::Equals)?;
        self.expect_keyword("AND")?;
        self.next_token();
        let upper = self.parse_expression(Precedence::Equals)?;
        Ok((lower, upper))
    }

    fn parse_between_expression(
        &mut self,
        left: NodeId,
        negated: bool,
        pos: usize,
    ) -> Result<NodeId> {
        let (lower, upper) = self.parse_between_bounds()?;
        Ok(self.arena.add(
            ExprKind::Between {
                negated,
                args: smallvec![left, lower, upper],
            },
            pos,
        ))
    }

    /// IN list; the current token is IN
    fn parse_in_expression(&mut self, target: NodeId, negated: bool, pos: usize) -> Result<NodeId> {
        let mut list = Vec::new();
        let list_position;
        let parenthesized = self.peek_token.is_punctuator("(");

        if parenthesized {
            self.next_token();
            list_position = self.cur_token.position;
            if self.peek_token.is_keyword("SELECT") {
                list.push(self.parse_sub_query()?);
            } else if self.peek_token.is_punctuator(")") {
                self.next_token();
            } else {
                loop {
                    self.next_token();
                    list.push(self.parse_expression(Precedence::Lowest)?);
                    if self.peek_token.is_punctuator(",") {
                        self.next_token();
                    } else {
                        self.expect_punctuator(")")?;
                        break;
                    }
                }
            }
        } else {
            self.next_token();
            list_position = self.cur_token.position;
            list.push(self.parse_expression(Precedence::Equals)?);
        }

        Ok(self.arena.add(
            ExprKind::In {
                negated,
                target,
                list,
                list_position,
                parenthesized,
            },
            pos,
        ))
    }
}

fn comparison_operator(op: &str) -> Option<Operator> {
    match op {
        "=" | "==" => Some(Operator::Eq),
        "!=" | "<>" => Some(Operator::Ne),
        ">" => Some(Operator::Gt),
        ">=" => Some(Operator::Gte),
        "<" => Some(Operator::Lt),
        "<=" => Some(Operator::Lte),
        _ => None,
    }
}
