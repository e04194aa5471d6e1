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

//! Predicate expression tree
//!
//! Nodes live in an [`ExprArena`] and refer to each other by [`NodeId`].
//! Every node records the character offset of its token: the operator for
//! comparisons and logical nodes, the keyword for BETWEEN and IN, the first
//! character for literals, columns and function calls.

use std::fmt;

use smallvec::SmallVec;

use crate::core::{ArithmeticOp, Operator};

/// Index of a node inside an [`ExprArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Literal constant
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    /// Unquoted string contents
    String(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(v) => write!(f, "{}", v),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

/// Node kinds
///
/// Comparison and BETWEEN keep their operands in a list because a malformed
/// predicate may supply fewer than the operator needs; the analyzer reports
/// that as an arity error.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    And(NodeId, NodeId),
    Or(NodeId, NodeId),
    Not(NodeId),
    Comparison {
        op: Operator,
        args: SmallVec<[NodeId; 2]>,
    },
    /// `args[0] BETWEEN args[1] AND args[2]`
    Between {
        negated: bool,
        args: SmallVec<[NodeId; 3]>,
    },
    In {
        negated: bool,
        target: NodeId,
        list: Vec<NodeId>,
        /// Offset of the opening parenthesis, or of the single operand
        list_position: usize,
        parenthesized: bool,
    },
    Literal(Literal),
    Column(String),
    /// Zero-based bind variable index (`$1` is 0)
    BindVariable(usize),
    Function {
        name: String,
        args: Vec<NodeId>,
    },
    Arithmetic {
        op: ArithmeticOp,
        left: NodeId,
        right: NodeId,
    },
    Negate(NodeId),
    /// Raw text of a parenthesized `SELECT`
    SubQuery(String),
}

/// A node and its source offset
#[derive(Debug, Clone, PartialEq)]
pub struct ExprNode {
    pub kind: ExprKind,
    pub position: usize,
}

/// Owner of all nodes of one predicate
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExprArena {
    nodes: Vec<ExprNode>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its id
    pub fn add(&mut self, kind: ExprKind, position: usize) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(ExprNode { kind, position });
        id
    }

    pub fn get(&self, id: NodeId) -> &ExprNode {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &ExprKind {
        &self.nodes[id.index()].kind
    }

    pub fn position(&self, id: NodeId) -> usize {
        self.nodes[id.index()].position
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Column name if the node is a column reference
    pub fn column_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            ExprKind::Column(name) => Some(name),
            _ => None,
        }
    }

    /// String contents if the node is a string literal
    pub fn string_literal(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            ExprKind::Literal(Literal::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn is_null_literal(&self, id: NodeId) -> bool {
        matches!(self.kind(id), ExprKind::Literal(Literal::Null))
    }

    pub fn is_sub_query(&self, id: NodeId) -> bool {
        matches!(self.kind(id), ExprKind::SubQuery(_))
    }

    /// Render a node back to SQL text
    pub fn display(&self, id: NodeId) -> ExprDisplay<'_> {
        ExprDisplay { arena: self, id }
    }

    fn binding(&self, id: NodeId) -> u8 {
        match self.kind(id) {
            ExprKind::Or(..) => 1,
            ExprKind::And(..) => 2,
            ExprKind::Not(_) => 3,
            ExprKind::Comparison { .. } | ExprKind::Between { .. } | ExprKind::In { .. } => 4,
            ExprKind::Arithmetic {
                op: ArithmeticOp::Add | ArithmeticOp::Sub,
                ..
            } => 5,
            ExprKind::Arithmetic { .. } => 6,
            _ => 7,
        }
    }

    fn fmt_child(&self, f: &mut fmt::Formatter<'_>, id: NodeId, min: u8) -> fmt::Result {
        if self.binding(id) < min {
            write!(f, "(")?;
            self.fmt_node(f, id)?;
            write!(f, ")")
        } else {
            self.fmt_node(f, id)
        }
    }

    fn fmt_list(&self, f: &mut fmt::Formatter<'_>, ids: &[NodeId]) -> fmt::Result {
        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            self.fmt_node(f, *id)?;
        }
        Ok(())
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId) -> fmt::Result {
        match self.kind(id) {
            ExprKind::And(l, r) => {
                self.fmt_child(f, *l, 2)?;
                write!(f, " and ")?;
                self.fmt_child(f, *r, 2)
            }
            ExprKind::Or(l, r) => {
                self.fmt_child(f, *l, 1)?;
                write!(f, " or ")?;
                self.fmt_child(f, *r, 1)
            }
            ExprKind::Not(inner) => {
                write!(f, "not ")?;
                self.fmt_child(f, *inner, 4)
            }
            ExprKind::Comparison { op, args } => match args.as_slice() {
                [l, r] => {
                    self.fmt_child(f, *l, 5)?;
                    write!(f, " {} ", op)?;
                    self.fmt_child(f, *r, 5)
                }
                [only] => {
                    self.fmt_child(f, *only, 5)?;
                    write!(f, " {}", op)
                }
                _ => write!(f, "{}", op),
            },
            ExprKind::Between { negated, args } => {
                let keyword = if *negated { "not between" } else { "between" };
                match args.as_slice() {
                    [target, lo, hi] => {
                        self.fmt_child(f, *target, 5)?;
                        write!(f, " {} ", keyword)?;
                        self.fmt_child(f, *lo, 5)?;
                        write!(f, " and ")?;
                        self.fmt_child(f, *hi, 5)
                    }
                    [lo, hi] => {
                        write!(f, "{} ", keyword)?;
                        self.fmt_child(f, *lo, 5)?;
                        write!(f, " and ")?;
                        self.fmt_child(f, *hi, 5)
                    }
                    _ => write!(f, "{}", keyword),
                }
            }
            ExprKind::In {
                negated,
                target,
                list,
                parenthesized,
                ..
            } => {
                self.fmt_child(f, *target, 5)?;
                write!(f, " {}", if *negated { "not in " } else { "in " })?;
                if let [single] = list.as_slice() {
                    if let ExprKind::SubQuery(text) = self.kind(*single) {
                        return write!(f, "({})", text);
                    }
                }
                if *parenthesized {
                    write!(f, "(")?;
                    self.fmt_list(f, list)?;
                    write!(f, ")")
                } else {
                    self.fmt_list(f, list)
                }
            }
            ExprKind::Literal(lit) => write!(f, "{}", lit),
            ExprKind::Column(name) => write!(f, "{}", name),
            ExprKind::BindVariable(idx) => write!(f, "${}", idx + 1),
            ExprKind::Function { name, args } => {
                write!(f, "{}(", name)?;
                self.fmt_list(f, args)?;
                write!(f, ")")
            }
            ExprKind::Arithmetic { op, left, right } => {
                let min = self.binding(id);
                self.fmt_child(f, *left, min)?;
                write!(f, " {} ", op)?;
                self.fmt_child(f, *right, min + 1)
            }
            ExprKind::Negate(inner) => {
                write!(f, "-")?;
                self.fmt_child(f, *inner, 7)
            }
            ExprKind::SubQuery(text) => write!(f, "({})", text),
        }
    }
}

/// [`fmt::Display`] adapter returned by [`ExprArena::display`]
pub struct ExprDisplay<'a> {
    arena: &'a ExprArena,
    id: NodeId,
}

impl fmt::Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.arena.fmt_node(f, self.id)
    }
}
