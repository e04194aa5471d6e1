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

//! Function Registry
//!
//! Looks up the built-in functions by name and compiles expression nodes
//! into [`ScalarFn`] trees.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;

use super::{datetime, ConstantEvaluator, EvalContext, ScalarFn};
use crate::core::{Error, PeriodUnit, Result, Value};
use crate::parser::{ExprArena, ExprKind, Literal, NodeId};

/// Global function registry instance
static GLOBAL_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

/// Get the global function registry
#[inline]
pub fn global_registry() -> &'static FunctionRegistry {
    GLOBAL_REGISTRY.get_or_init(FunctionRegistry::new)
}

/// Built-in function implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Now,
    /// Reads the clock on every row, so never folded
    SysTimestamp,
    DateAdd,
    ToTimestamp,
    ToDate,
    Abs,
}

/// Function information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInfo {
    /// Lower-case function name
    pub name: &'static str,
    pub kind: FunctionKind,
    pub min_args: usize,
    pub max_args: usize,
    pub description: &'static str,
}

/// Function registry for predicate functions
pub struct FunctionRegistry {
    functions: FxHashMap<&'static str, FunctionInfo>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// Create a registry with all built-in functions registered
    pub fn new() -> Self {
        let mut registry = Self {
            functions: FxHashMap::default(),
        };

        registry.register("now", FunctionKind::Now, 0, 0, "Current time, fixed per execution");
        registry.register(
            "systimestamp",
            FunctionKind::SysTimestamp,
            0,
            0,
            "Current time, read per row",
        );
        registry.register(
            "dateadd",
            FunctionKind::DateAdd,
            3,
            3,
            "Adds a period to a timestamp. Usage: dateadd('d', 1, ts)",
        );
        registry.register(
            "to_timestamp",
            FunctionKind::ToTimestamp,
            1,
            1,
            "Parses a timestamp literal",
        );
        registry.register(
            "to_date",
            FunctionKind::ToDate,
            2,
            2,
            "Parses a date with a pattern. Usage: to_date('2015-02-23', 'yyyy-MM-dd')",
        );
        registry.register("abs", FunctionKind::Abs, 1, 1, "Absolute value");

        registry
    }

    fn register(
        &mut self,
        name: &'static str,
        kind: FunctionKind,
        min_args: usize,
        max_args: usize,
        description: &'static str,
    ) {
        self.functions.insert(
            name,
            FunctionInfo {
                name,
                kind,
                min_args,
                max_args,
                description,
            },
        );
    }

    /// Look up a function, ignoring case
    pub fn get(&self, name: &str) -> Option<&FunctionInfo> {
        self.functions.get(name.to_ascii_lowercase().as_str())
    }

    /// Check if a function exists
    pub fn exists(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All registered functions, sorted by name
    pub fn list(&self) -> Vec<&FunctionInfo> {
        let mut all: Vec<_> = self.functions.values().collect();
        all.sort_by_key(|info| info.name);
        all
    }

    fn compile_function(
        &self,
        arena: &ExprArena,
        name: &str,
        args: &[NodeId],
        position: usize,
    ) -> Result<Option<ScalarFn>> {
        let Some(info) = self.get(name) else {
            return Ok(None);
        };
        if args.len() < info.min_args {
            return Err(Error::too_few_arguments(
                position,
                info.name,
                args.len(),
                info.min_args,
            ));
        }
        if args.len() > info.max_args {
            return Err(Error::syntax(
                position,
                format!(
                    "too many arguments for '{}' [found={},expected={}]",
                    info.name,
                    args.len(),
                    info.max_args
                ),
            ));
        }

        let mut compiled = Vec::with_capacity(args.len());
        for &arg in args {
            match self.compile(arena, arg)? {
                Some(f) => compiled.push(f),
                None => return Ok(None),
            }
        }
        let mut compiled = compiled.into_iter().map(Box::new);
        let mut next = || compiled.next().ok_or_else(|| Error::syntax(position, "missing argument"));

        let f = match info.kind {
            FunctionKind::Now => ScalarFn::Now,
            FunctionKind::SysTimestamp => return Ok(None),
            FunctionKind::DateAdd => {
                let unit = period_unit(arena, args[0], &*next()?)?;
                ScalarFn::DateAdd {
                    unit,
                    amount: next()?,
                    ts: next()?,
                }
            }
            FunctionKind::ToTimestamp => ScalarFn::ToTimestamp(next()?),
            FunctionKind::ToDate => {
                let value = next()?;
                let pattern = constant_text(arena, args[1], &*next()?)?;
                if datetime::translate_pattern(&pattern).is_none() {
                    return Err(Error::unexpected_type(
                        arena.position(args[1]),
                        "date pattern",
                        pattern,
                    ));
                }
                ScalarFn::ToDate { value, pattern }
            }
            FunctionKind::Abs => ScalarFn::Abs(next()?),
        };
        Ok(Some(f))
    }
}

/// A compile-time text constant, e.g. a `to_date` pattern
fn constant_text(arena: &ExprArena, node: NodeId, f: &ScalarFn) -> Result<String> {
    if f.is_constant() {
        if let Value::Text(s) = f.eval(&EvalContext::compile_time()) {
            return Ok(s.to_string());
        }
    }
    Err(Error::unexpected_type(
        arena.position(node),
        "STRING",
        f.data_type().to_string(),
    ))
}

fn period_unit(arena: &ExprArena, node: NodeId, f: &ScalarFn) -> Result<PeriodUnit> {
    let text = constant_text(arena, node, f)?;
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => PeriodUnit::from_char(c)
            .ok_or_else(|| Error::unexpected_type(arena.position(node), "period unit", text)),
        _ => Err(Error::unexpected_type(
            arena.position(node),
            "period unit",
            text,
        )),
    }
}

impl ConstantEvaluator for FunctionRegistry {
    fn compile(&self, arena: &ExprArena, node: NodeId) -> Result<Option<ScalarFn>> {
        let f = match arena.kind(node) {
            ExprKind::Literal(lit) => ScalarFn::Const(match lit {
                Literal::Null => Value::null_unknown(),
                Literal::Boolean(b) => Value::Boolean(*b),
                Literal::Integer(i) => Value::Integer(*i),
                Literal::Float(v) => Value::Float(*v),
                Literal::String(s) => Value::text(s.as_str()),
            }),
            ExprKind::BindVariable(index) => ScalarFn::BindVariable(*index),
            ExprKind::Negate(inner) => match self.compile(arena, *inner)? {
                Some(f) => ScalarFn::Neg(Box::new(f)),
                None => return Ok(None),
            },
            ExprKind::Arithmetic { op, left, right } => {
                match (self.compile(arena, *left)?, self.compile(arena, *right)?) {
                    (Some(l), Some(r)) => ScalarFn::Arithmetic {
                        op: *op,
                        left: Box::new(l),
                        right: Box::new(r),
                    },
                    _ => return Ok(None),
                }
            }
            ExprKind::Function { name, args } => {
                return self.compile_function(arena, name, args, arena.position(node))
            }
            ExprKind::Column(_)
            | ExprKind::SubQuery(_)
            | ExprKind::And(..)
            | ExprKind::Or(..)
            | ExprKind::Not(_)
            | ExprKind::Comparison { .. }
            | ExprKind::Between { .. }
            | ExprKind::In { .. } => return Ok(None),
        };
        Ok(Some(f))
    }
}
