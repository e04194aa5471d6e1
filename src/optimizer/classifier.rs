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

//! Leaf predicate classification
//!
//! Turns comparisons, BETWEEN and IN over the designated timestamp or a
//! key-eligible symbol column into [`Fragment`]s. Anything else becomes
//! filter material; only malformed predicates are errors.

use crate::config::AnalyzerConfig;
use crate::core::{
    parse_partial_timestamp, DataType, Error, Operator, PartialTimestamp, Result, TableMetadata,
    MAX_TIMESTAMP, NULL_TIMESTAMP,
};
use crate::functions::{ConstantEvaluator, EvalContext, ScalarFn};
use crate::intervals::{
    parse_interval_literal, Interval, IntervalList, IntervalStep, IntervalTemplate, StepOp,
    TimestampSource,
};
use crate::parser::{ExprArena, ExprKind, Literal, NodeId};

use super::fragment::{Fragment, KeyConstraint, LambdaKey};
use super::model::{KeyValue, KeyValueSet};

/// A timestamp operand after constant folding
enum TimestampOperand {
    Static(PartialTimestamp),
    Dynamic(ScalarFn),
    Null,
    NotConstant,
}

impl TimestampOperand {
    fn into_source(self) -> Option<TimestampSource> {
        match self {
            TimestampOperand::Static(ts) => Some(TimestampSource::Static {
                floor: ts.floor,
                ceil: ts.ceil,
            }),
            TimestampOperand::Dynamic(f) => Some(TimestampSource::Dynamic(f)),
            TimestampOperand::Null | TimestampOperand::NotConstant => None,
        }
    }
}

/// Classifies one predicate node at a time
pub(crate) struct Classifier<'a> {
    pub arena: &'a ExprArena,
    pub metadata: &'a dyn TableMetadata,
    pub evaluator: &'a dyn ConstantEvaluator,
    pub config: &'a AnalyzerConfig,
    pub preferred: Option<&'a str>,
}

impl Classifier<'_> {
    /// Classify a node that is not AND, OR or NOT
    pub fn classify(&self, node: NodeId) -> Result<Fragment> {
        match self.arena.kind(node) {
            ExprKind::Literal(Literal::Boolean(b)) => Ok(Fragment::truth(*b)),
            ExprKind::Comparison { op, args } => self.classify_comparison(node, *op, args),
            ExprKind::Between { negated, args } => self.classify_between(node, *negated, args),
            ExprKind::In {
                negated,
                target,
                list,
                list_position,
                ..
            } => self.classify_in(node, *negated, *target, list, *list_position),
            _ => Ok(Fragment::filter(node)),
        }
    }

    // =========================================================================
    // Comparisons
    // =========================================================================

    fn classify_comparison(&self, node: NodeId, op: Operator, args: &[NodeId]) -> Result<Fragment> {
        let &[left, right] = args else {
            return Err(Error::too_few_arguments(
                self.arena.position(node),
                op.to_string(),
                args.len(),
                2,
            ));
        };

        let (column, operand, op) = match (
            self.arena.column_name(left),
            self.arena.column_name(right),
        ) {
            (Some(a), Some(b)) if a.eq_ignore_ascii_case(b) => {
                return Ok(if self.config.fold_self_comparisons {
                    Fragment::truth(op.self_comparison())
                } else {
                    Fragment::filter(node)
                });
            }
            (Some(_), Some(_)) => return Ok(Fragment::filter(node)),
            (Some(_), None) => (left, right, op),
            (None, Some(_)) => (right, left, op.flip()),
            (None, None) => return Ok(Fragment::filter(node)),
        };

        let name = self.arena.column_name(column).unwrap_or_default();
        if self.metadata.is_timestamp(name) {
            return self.timestamp_comparison(node, op, operand);
        }
        match op {
            Operator::Eq | Operator::Ne => self.key_comparison(node, op, column, operand),
            _ => Ok(Fragment::filter(node)),
        }
    }

    fn timestamp_comparison(&self, node: NodeId, op: Operator, operand: NodeId) -> Result<Fragment> {
        if self.arena.is_null_literal(operand) {
            return Ok(Fragment::filter(node));
        }
        if let Some(text) = self.arena.string_literal(operand) {
            if matches!(op, Operator::Eq | Operator::Ne) && text.contains(';') {
                return Err(Error::NotADate {
                    position: self.arena.position(operand),
                });
            }
        }

        match self.timestamp_operand(operand)? {
            TimestampOperand::Static(ts) => Ok(Fragment::intervals(static_comparison(op, ts))),
            TimestampOperand::Dynamic(f) => {
                let (step_op, template) = comparison_template(op, TimestampSource::Dynamic(f));
                Ok(Fragment::dynamic(IntervalStep::new(step_op, vec![template])))
            }
            TimestampOperand::Null => Ok(Fragment::always_false()),
            TimestampOperand::NotConstant => Ok(Fragment::filter(node)),
        }
    }

    fn key_comparison(
        &self,
        node: NodeId,
        op: Operator,
        column: NodeId,
        operand: NodeId,
    ) -> Result<Fragment> {
        let Some(value) = self.evaluator.try_evaluate_const(self.arena, operand)? else {
            return Ok(Fragment::filter(node));
        };
        let Some(name) = self.key_column(column)? else {
            return Ok(Fragment::filter(node));
        };
        if value.is_null() && !self.metadata.accepts_null_keys() {
            return Ok(Fragment::filter(node));
        }

        let values: KeyValueSet = std::iter::once(KeyValue::from_value(&value)).collect();
        let constraint = if op == Operator::Eq {
            KeyConstraint::include(name, values, node)
        } else {
            KeyConstraint::exclude(name, values, node)
        };
        Ok(Fragment::key(constraint))
    }

    // =========================================================================
    // BETWEEN
    // =========================================================================

    fn classify_between(&self, node: NodeId, negated: bool, args: &[NodeId]) -> Result<Fragment> {
        if let Some(&nested) = args
            .iter()
            .find(|&&arg| matches!(self.arena.kind(arg), ExprKind::Between { .. }))
        {
            return Err(Error::NestedBetween {
                position: self.arena.position(nested),
            });
        }
        let &[target, lo, hi] = args else {
            return Err(Error::too_few_arguments(
                self.arena.position(node),
                "between",
                args.len(),
                3,
            ));
        };

        let is_timestamp = self
            .arena
            .column_name(target)
            .is_some_and(|name| self.metadata.is_timestamp(name));
        if !is_timestamp {
            return Ok(Fragment::filter(node));
        }

        let lo = self.timestamp_operand(lo)?;
        let hi = self.timestamp_operand(hi)?;
        match (lo, hi) {
            (TimestampOperand::NotConstant, _) | (_, TimestampOperand::NotConstant) => {
                Ok(Fragment::filter(node))
            }
            (TimestampOperand::Null, _) | (_, TimestampOperand::Null) => Ok(if negated {
                Fragment::filter(node)
            } else {
                Fragment::always_false()
            }),
            (TimestampOperand::Static(a), TimestampOperand::Static(b)) => {
                let range =
                    IntervalList::single(Interval::new(a.floor.min(b.floor), a.ceil.max(b.ceil)));
                Ok(Fragment::intervals(if negated { range.invert() } else { range }))
            }
            (lo, hi) => match (lo.into_source(), hi.into_source()) {
                (Some(a), Some(b)) => {
                    let op = if negated {
                        StepOp::Subtract
                    } else {
                        StepOp::Intersect
                    };
                    Ok(Fragment::dynamic(IntervalStep::new(
                        op,
                        vec![IntervalTemplate::Between(a, b)],
                    )))
                }
                _ => Ok(Fragment::filter(node)),
            },
        }
    }

    // =========================================================================
    // IN
    // =========================================================================

    fn classify_in(
        &self,
        node: NodeId,
        negated: bool,
        target: NodeId,
        list: &[NodeId],
        list_position: usize,
    ) -> Result<Fragment> {
        if list.is_empty() {
            return Err(Error::too_few_arguments(list_position, "in", 0, 1));
        }
        let Some(name) = self.arena.column_name(target) else {
            return Ok(Fragment::filter(node));
        };
        if self.metadata.is_timestamp(name) {
            self.timestamp_in(node, negated, list)
        } else {
            self.key_in(node, negated, target, list)
        }
    }

    fn timestamp_in(&self, node: NodeId, negated: bool, list: &[NodeId]) -> Result<Fragment> {
        // a single non-constant element leaves the whole list to the filter
        let mut compiled = Vec::with_capacity(list.len());
        for &element in list {
            match self.arena.kind(element) {
                ExprKind::Literal(Literal::String(_) | Literal::Null) => compiled.push(None),
                _ => match self.evaluator.compile(self.arena, element)? {
                    Some(f) => compiled.push(Some(f)),
                    None => return Ok(Fragment::filter(node)),
                },
            }
        }

        let mut intervals = IntervalList::empty();
        let mut templates = Vec::new();
        for (&element, f) in list.iter().zip(compiled) {
            let position = self.arena.position(element);
            let parsed = match f {
                None => match self.arena.string_literal(element) {
                    Some(text) => {
                        parse_interval_literal(text, position, self.config.max_interval_repeat)?
                    }
                    None => IntervalList::single(Interval::NULL),
                },
                Some(f) if f.is_constant() => {
                    self.check_timestamp_type(element, &f)?;
                    let value = f.eval(&EvalContext::compile_time());
                    match (&value, value.as_str()) {
                        (_, Some(text)) => parse_interval_literal(
                            text,
                            position,
                            self.config.max_interval_repeat,
                        )?,
                        _ if value.is_null() => IntervalList::single(Interval::NULL),
                        _ => {
                            let ts = value
                                .as_timestamp_range()
                                .ok_or(Error::InvalidDate { position })?;
                            IntervalList::single(Interval::new(ts.floor, ts.ceil))
                        }
                    }
                }
                Some(f) => {
                    self.check_timestamp_type(element, &f)?;
                    templates.push(IntervalTemplate::Point(TimestampSource::Dynamic(f)));
                    continue;
                }
            };
            intervals = intervals.union(&parsed);
        }

        if templates.is_empty() {
            return Ok(Fragment::intervals(if negated {
                intervals.invert()
            } else {
                intervals
            }));
        }

        templates.extend(intervals.iter().map(|iv| {
            IntervalTemplate::Point(TimestampSource::Static {
                floor: iv.lo,
                ceil: iv.hi,
            })
        }));
        let op = if negated {
            StepOp::Subtract
        } else {
            StepOp::Intersect
        };
        Ok(Fragment::dynamic(IntervalStep::new(op, templates)))
    }

    fn key_in(
        &self,
        node: NodeId,
        negated: bool,
        target: NodeId,
        list: &[NodeId],
    ) -> Result<Fragment> {
        let Some(column) = self.key_column(target)? else {
            return Ok(Fragment::filter(node));
        };

        if let [single] = list {
            if let ExprKind::SubQuery(text) = self.arena.kind(*single) {
                if negated {
                    return Ok(Fragment::filter(node));
                }
                return Ok(Fragment::lambda(LambdaKey {
                    column: column.to_string(),
                    sub_query: text.clone(),
                    source: node,
                    position: self.arena.position(node),
                }));
            }
        }

        let mut values = KeyValueSet::new();
        for &element in list {
            if self.arena.is_sub_query(element) {
                return Ok(Fragment::filter(node));
            }
            let Some(value) = self.evaluator.try_evaluate_const(self.arena, element)? else {
                return Ok(Fragment::filter(node));
            };
            if value.is_null() && !self.metadata.accepts_null_keys() {
                return Ok(Fragment::filter(node));
            }
            values.insert(KeyValue::from_value(&value));
        }

        Ok(Fragment::key(if negated {
            KeyConstraint::exclude(column, values, node)
        } else {
            KeyConstraint::include(column, values, node)
        }))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Resolve a column reference used as a key candidate
    ///
    /// Unknown columns are an error; known but ineligible columns give `None`.
    fn key_column(&self, column: NodeId) -> Result<Option<&str>> {
        let name = self.arena.column_name(column).unwrap_or_default();
        let index = self
            .metadata
            .column_index(name)
            .ok_or_else(|| Error::invalid_column(self.arena.position(column), name))?;
        let schema_column = self.metadata.column(index);
        if schema_column.data_type != DataType::Symbol {
            return Ok(None);
        }
        let eligible = match self.preferred {
            Some(preferred) => schema_column.name.eq_ignore_ascii_case(preferred),
            None => schema_column.indexed,
        };
        Ok(eligible.then_some(schema_column.name.as_str()))
    }

    fn timestamp_operand(&self, node: NodeId) -> Result<TimestampOperand> {
        let position = self.arena.position(node);
        if let Some(text) = self.arena.string_literal(node) {
            return parse_partial_timestamp(text)
                .map(TimestampOperand::Static)
                .ok_or(Error::InvalidDate { position });
        }
        if self.arena.is_null_literal(node) {
            return Ok(TimestampOperand::Null);
        }

        let Some(f) = self.evaluator.compile(self.arena, node)? else {
            return Ok(TimestampOperand::NotConstant);
        };
        self.check_timestamp_type(node, &f)?;
        if !f.is_constant() {
            return Ok(TimestampOperand::Dynamic(f));
        }

        let value = f.eval(&EvalContext::compile_time());
        if value.is_null() {
            return Ok(TimestampOperand::Null);
        }
        value
            .as_timestamp_range()
            .map(TimestampOperand::Static)
            .ok_or(Error::InvalidDate { position })
    }

    /// Integer literals are epoch microseconds; other numbers and booleans
    /// cannot bound a timestamp
    fn check_timestamp_type(&self, node: NodeId, f: &ScalarFn) -> Result<()> {
        let data_type = f.data_type();
        let integer_literal = matches!(
            self.arena.kind(node),
            ExprKind::Literal(Literal::Integer(_))
        );
        if data_type.is_timestamp_compatible() || integer_literal {
            Ok(())
        } else {
            Err(Error::unexpected_type(
                self.arena.position(node),
                "TIMESTAMP",
                data_type.to_string(),
            ))
        }
    }
}

/// Interval of `ts <op> literal`
fn static_comparison(op: Operator, ts: PartialTimestamp) -> IntervalList {
    let bounded = |lo: Option<i64>, hi: Option<i64>| match (lo, hi) {
        (Some(lo), Some(hi)) => IntervalList::single(Interval::new(lo, hi)),
        _ => IntervalList::empty(),
    };
    match op {
        Operator::Eq => bounded(Some(ts.floor), Some(ts.ceil)),
        Operator::Ne => bounded(Some(ts.floor), Some(ts.ceil)).invert(),
        Operator::Gt => bounded(ts.ceil.checked_add(1), Some(MAX_TIMESTAMP)),
        Operator::Gte => bounded(Some(ts.floor), Some(MAX_TIMESTAMP)),
        Operator::Lt => bounded(Some(NULL_TIMESTAMP), ts.floor.checked_sub(1)),
        Operator::Lte => bounded(Some(NULL_TIMESTAMP), Some(ts.ceil)),
    }
}

/// Deferred form of `ts <op> source`
fn comparison_template(op: Operator, source: TimestampSource) -> (StepOp, IntervalTemplate) {
    match op {
        Operator::Eq => (StepOp::Intersect, IntervalTemplate::Point(source)),
        Operator::Ne => (StepOp::Subtract, IntervalTemplate::Point(source)),
        Operator::Gt | Operator::Gte => (
            StepOp::Intersect,
            IntervalTemplate::After {
                source,
                inclusive: op == Operator::Gte,
            },
        ),
        Operator::Lt | Operator::Lte => (
            StepOp::Intersect,
            IntervalTemplate::Before {
                source,
                inclusive: op == Operator::Lte,
            },
        ),
    }
}
