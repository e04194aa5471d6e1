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

//! Partial models and the AND/OR/NOT merge rules
//!
//! Every predicate node analyzes to a [`Fragment`]. Fragments are merged
//! bottom-up and never share state, so a merge simply consumes its inputs.
//! Key constraints are kept for every column seen; the choice of the key
//! column happens once, after the whole clause is merged.

use tracing::trace;

use crate::core::{Error, Result};
use crate::intervals::{IntervalList, IntervalStep};
use crate::parser::NodeId;

use super::model::{IntrinsicValue, KeyValueSet};

/// Timestamp constraint of a fragment
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IntervalConstraint {
    pub base: IntervalList,
    /// Deferred predicates, replayed against `base` per execution
    pub steps: Vec<IntervalStep>,
}

impl IntervalConstraint {
    fn is_static(&self) -> bool {
        self.steps.is_empty()
    }

    fn and(self, other: IntervalConstraint) -> IntervalConstraint {
        let mut steps = self.steps;
        steps.extend(other.steps);
        IntervalConstraint {
            base: self.base.intersect(&other.base),
            steps,
        }
    }
}

/// Values constrained for one symbol column
///
/// After normalization `include` and `exclude` are never both present.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct KeyConstraint {
    /// Column name as declared in the table metadata
    pub column: String,
    pub include: Option<KeyValueSet>,
    pub exclude: KeyValueSet,
    /// Conjuncts to hand back to the filter if the column is not chosen
    pub sources: Vec<NodeId>,
}

impl KeyConstraint {
    pub fn include(column: &str, values: KeyValueSet, source: NodeId) -> Self {
        Self {
            column: column.to_string(),
            include: Some(values),
            exclude: KeyValueSet::new(),
            sources: vec![source],
        }
    }

    pub fn exclude(column: &str, values: KeyValueSet, source: NodeId) -> Self {
        Self {
            column: column.to_string(),
            include: None,
            exclude: values,
            sources: vec![source],
        }
    }

    fn merge_and(&mut self, other: KeyConstraint) {
        self.include = match (self.include.take(), other.include) {
            (Some(a), Some(b)) => Some(a.intersect(&b)),
            (a, b) => a.or(b),
        };
        self.exclude = self.exclude.union(&other.exclude);
        self.sources.extend(other.sources);
    }

    /// Drop excluded values from the inclusion set; false if nothing is left
    fn normalize(&mut self) -> bool {
        if let Some(include) = &self.include {
            let remaining = include.difference(&self.exclude);
            self.exclude = KeyValueSet::new();
            let satisfiable = !remaining.is_empty();
            self.include = Some(remaining);
            satisfiable
        } else {
            true
        }
    }
}

/// `column IN (SELECT ...)` waiting to be chosen as the key
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LambdaKey {
    pub column: String,
    pub sub_query: String,
    pub source: NodeId,
    /// Offset reported when the same column carries a second lambda
    pub position: usize,
}

/// What one predicate node contributes to the intrinsic model
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Fragment {
    pub value: IntrinsicValue,
    pub intervals: Option<IntervalConstraint>,
    pub keys: Vec<KeyConstraint>,
    pub lambdas: Vec<LambdaKey>,
    pub filter: Vec<NodeId>,
}

impl Fragment {
    fn empty(value: IntrinsicValue) -> Self {
        Self {
            value,
            intervals: None,
            keys: Vec::new(),
            lambdas: Vec::new(),
            filter: Vec::new(),
        }
    }

    pub fn always_true() -> Self {
        Self::empty(IntrinsicValue::True)
    }

    pub fn always_false() -> Self {
        Self::empty(IntrinsicValue::False)
    }

    pub fn truth(value: bool) -> Self {
        if value {
            Self::always_true()
        } else {
            Self::always_false()
        }
    }

    /// The node is kept as-is for the scan to evaluate
    pub fn filter(node: NodeId) -> Self {
        Self {
            filter: vec![node],
            ..Self::empty(IntrinsicValue::Undefined)
        }
    }

    /// Compile-time interval list; empty means FALSE
    pub fn intervals(list: IntervalList) -> Self {
        if list.is_empty() {
            return Self::always_false();
        }
        Self {
            intervals: Some(IntervalConstraint {
                base: list,
                steps: Vec::new(),
            }),
            ..Self::empty(IntrinsicValue::Undefined)
        }
    }

    /// One deferred predicate over the whole domain
    pub fn dynamic(step: IntervalStep) -> Self {
        Self {
            intervals: Some(IntervalConstraint {
                base: IntervalList::full(),
                steps: vec![step],
            }),
            ..Self::empty(IntrinsicValue::Undefined)
        }
    }

    pub fn key(constraint: KeyConstraint) -> Self {
        let mut fragment = Self {
            keys: vec![constraint],
            ..Self::empty(IntrinsicValue::Undefined)
        };
        fragment.normalize();
        fragment
    }

    pub fn lambda(lambda: LambdaKey) -> Self {
        Self {
            lambdas: vec![lambda],
            ..Self::empty(IntrinsicValue::Undefined)
        }
    }

    /// No residual filter and no sub-query: safe to combine under OR and NOT
    fn is_pure(&self) -> bool {
        self.value == IntrinsicValue::Undefined && self.filter.is_empty() && self.lambdas.is_empty()
    }

    fn is_pure_intervals(&self) -> bool {
        self.is_pure() && self.keys.is_empty() && self.intervals.is_some()
    }

    /// Exactly one key column and nothing else
    fn single_key(&self) -> Option<&KeyConstraint> {
        match self.keys.as_slice() {
            [key] if self.is_pure() && self.intervals.is_none() => Some(key),
            _ => None,
        }
    }

    /// Collapse to FALSE when any constraint became unsatisfiable
    fn normalize(&mut self) {
        if self.value != IntrinsicValue::Undefined {
            return;
        }
        let mut satisfiable = self
            .intervals
            .as_ref()
            .map_or(true, |iv| !iv.base.is_empty());
        for key in &mut self.keys {
            satisfiable &= key.normalize();
        }
        if !satisfiable {
            trace!("conjunction is unsatisfiable");
            *self = Self::always_false();
        }
    }

    /// Conjunction of all `fragments`, given in source order
    ///
    /// All fragments are merged before the verdict is taken so the result does
    /// not depend on the order of the conjuncts.
    pub fn and_all(fragments: impl IntoIterator<Item = Fragment>) -> Result<Fragment> {
        let mut acc = Self::always_true();
        let mut unsatisfiable = false;

        for fragment in fragments {
            match fragment.value {
                IntrinsicValue::True => continue,
                IntrinsicValue::False => {
                    unsatisfiable = true;
                    continue;
                }
                IntrinsicValue::Undefined => {}
            }
            acc.value = IntrinsicValue::Undefined;

            acc.intervals = match (acc.intervals.take(), fragment.intervals) {
                (Some(a), Some(b)) => Some(a.and(b)),
                (a, b) => a.or(b),
            };

            for key in fragment.keys {
                match acc
                    .keys
                    .iter_mut()
                    .find(|k| k.column.eq_ignore_ascii_case(&key.column))
                {
                    Some(existing) => existing.merge_and(key),
                    None => acc.keys.push(key),
                }
            }

            for lambda in fragment.lambdas {
                if let Some(existing) = acc
                    .lambdas
                    .iter()
                    .find(|l| l.column.eq_ignore_ascii_case(&lambda.column))
                {
                    return Err(Error::MultipleLambda {
                        position: existing.position.min(lambda.position),
                    });
                }
                acc.lambdas.push(lambda);
            }

            acc.filter.extend(fragment.filter);
        }

        if unsatisfiable {
            return Ok(Self::always_false());
        }
        acc.normalize();
        Ok(acc)
    }

    /// Disjunction of two branches; `node` is the OR itself
    pub fn or(self, other: Fragment, node: NodeId) -> Fragment {
        match (self.value, other.value) {
            (IntrinsicValue::True, _) | (_, IntrinsicValue::True) => return Self::always_true(),
            (IntrinsicValue::False, _) => return other,
            (_, IntrinsicValue::False) => return self,
            _ => {}
        }

        if self.is_pure_intervals() && other.is_pure_intervals() {
            if let (Some(a), Some(b)) = (&self.intervals, &other.intervals) {
                if a.is_static() && b.is_static() {
                    return Self::intervals(a.base.union(&b.base));
                }
            }
        }

        if let (Some(a), Some(b)) = (self.single_key(), other.single_key()) {
            if a.column.eq_ignore_ascii_case(&b.column) {
                if let (Some(ia), Some(ib)) = (&a.include, &b.include) {
                    return Self::key(KeyConstraint::include(&a.column, ia.union(ib), node));
                }
            }
        }

        trace!(%node, "OR branches constrain different domains");
        Self::filter(node)
    }

    /// Negation of the fragment; `node` is the NOT itself
    pub fn not(self, node: NodeId) -> Fragment {
        match self.value {
            IntrinsicValue::True => return Self::always_false(),
            IntrinsicValue::False => return Self::always_true(),
            IntrinsicValue::Undefined => {}
        }

        if self.is_pure_intervals() {
            if let Some(iv) = self.intervals {
                if iv.is_static() {
                    return Self::intervals(iv.base.invert());
                }
                if iv.base.is_full() && iv.steps.len() == 1 {
                    let mut steps = iv.steps;
                    steps[0].op = steps[0].op.negate();
                    return Self {
                        intervals: Some(IntervalConstraint {
                            base: iv.base,
                            steps,
                        }),
                        ..Self::empty(IntrinsicValue::Undefined)
                    };
                }
            }
            return Self::filter(node);
        }

        if let Some(key) = self.single_key() {
            let negated = match &key.include {
                Some(include) => KeyConstraint::exclude(&key.column, include.clone(), node),
                None => KeyConstraint::include(&key.column, key.exclude.clone(), node),
            };
            return Self::key(negated);
        }

        Self::filter(node)
    }
}
