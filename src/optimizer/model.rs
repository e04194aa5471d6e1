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

//! Output of WHERE-clause analysis

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::core::Value;
use crate::intervals::{IntervalList, RuntimeIntervalModel};
use crate::parser::{ExprArena, ExprKind, NodeId};

/// Verdict of the analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IntrinsicValue {
    /// Every row matches
    True,
    /// No row can match
    False,
    /// Intervals, keys and filter apply
    #[default]
    Undefined,
}

impl fmt::Display for IntrinsicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntrinsicValue::True => write!(f, "TRUE"),
            IntrinsicValue::False => write!(f, "FALSE"),
            IntrinsicValue::Undefined => write!(f, "UNDEFINED"),
        }
    }
}

/// A key column value used for index lookups
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyValue {
    Null,
    Str(Arc<str>),
}

impl KeyValue {
    /// Key form of a folded constant; non-text values use their SQL rendering
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null(_) => KeyValue::Null,
            Value::Text(s) => KeyValue::Str(Arc::clone(s)),
            other => KeyValue::Str(Arc::from(other.to_string().as_str())),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            KeyValue::Null => None,
            KeyValue::Str(s) => Some(s),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, KeyValue::Null)
    }
}

impl From<&str> for KeyValue {
    fn from(s: &str) -> Self {
        KeyValue::Str(Arc::from(s))
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Null => write!(f, "null"),
            KeyValue::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Insertion-ordered set of key values
#[derive(Debug, Clone, Default)]
pub struct KeyValueSet {
    values: Vec<KeyValue>,
    seen: FxHashSet<KeyValue>,
}

impl KeyValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value; returns false if it was already present
    pub fn insert(&mut self, value: KeyValue) -> bool {
        if self.seen.contains(&value) {
            return false;
        }
        self.seen.insert(value.clone());
        self.values.push(value);
        true
    }

    pub fn contains(&self, value: &KeyValue) -> bool {
        self.seen.contains(value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyValue> {
        self.values.iter()
    }

    pub fn as_slice(&self) -> &[KeyValue] {
        &self.values
    }

    /// Values present in both sets, in the order of `self`
    pub fn intersect(&self, other: &KeyValueSet) -> KeyValueSet {
        self.iter().filter(|v| other.contains(v)).cloned().collect()
    }

    /// Values of `self` followed by the new values of `other`
    pub fn union(&self, other: &KeyValueSet) -> KeyValueSet {
        self.iter().chain(other.iter()).cloned().collect()
    }

    /// Values of `self` that are not in `other`
    pub fn difference(&self, other: &KeyValueSet) -> KeyValueSet {
        self.iter().filter(|v| !other.contains(v)).cloned().collect()
    }
}

impl PartialEq for KeyValueSet {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for KeyValueSet {}

impl FromIterator<KeyValue> for KeyValueSet {
    fn from_iter<I: IntoIterator<Item = KeyValue>>(iter: I) -> Self {
        let mut set = KeyValueSet::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl<'a> IntoIterator for &'a KeyValueSet {
    type Item = &'a KeyValue;
    type IntoIter = std::slice::Iter<'a, KeyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl fmt::Display for KeyValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, "]")
    }
}

/// Predicates the scan must still evaluate, joined by AND
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidualFilter {
    conjuncts: Vec<NodeId>,
}

impl ResidualFilter {
    /// `None` when nothing is left to evaluate
    pub(crate) fn from_nodes(arena: &ExprArena, mut nodes: Vec<NodeId>) -> Option<Self> {
        if nodes.is_empty() {
            return None;
        }
        nodes.sort_by_key(|&id| (arena.position(id), id));
        nodes.dedup();
        Some(Self { conjuncts: nodes })
    }

    /// Retained nodes in source order
    pub fn conjuncts(&self) -> &[NodeId] {
        &self.conjuncts
    }

    /// Render the filter as SQL
    pub fn display(&self, arena: &ExprArena) -> String {
        let mut sql = String::new();
        for (i, &id) in self.conjuncts.iter().enumerate() {
            if i > 0 {
                sql.push_str(" and ");
            }
            if matches!(arena.kind(id), ExprKind::Or(..)) && self.conjuncts.len() > 1 {
                sql.push_str(&format!("({})", arena.display(id)));
            } else {
                sql.push_str(&arena.display(id).to_string());
            }
        }
        sql
    }
}

/// Everything the scan can use from a WHERE clause
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntrinsicModel {
    pub intrinsic_value: IntrinsicValue,
    /// Column whose index drives the scan
    pub key_column: Option<String>,
    pub key_values: KeyValueSet,
    pub key_excluded_values: KeyValueSet,
    /// Raw text of the sub-query producing the key values
    pub key_sub_query: Option<String>,
    pub filter: Option<ResidualFilter>,
    /// Timestamp constraint; `None` when the clause does not restrict time
    pub intervals: Option<RuntimeIntervalModel>,
}

impl IntrinsicModel {
    /// Model of a clause that matches every row
    pub fn always_true() -> Self {
        Self {
            intrinsic_value: IntrinsicValue::True,
            ..Self::default()
        }
    }

    /// Model of a clause that matches nothing
    pub fn always_false() -> Self {
        Self {
            intrinsic_value: IntrinsicValue::False,
            intervals: Some(RuntimeIntervalModel::from_static(IntervalList::empty())),
            ..Self::default()
        }
    }

    pub fn has_interval_filters(&self) -> bool {
        self.intervals.is_some()
    }

    /// The interval list when it is fully known at compile time
    pub fn static_intervals(&self) -> Option<&IntervalList> {
        self.intervals
            .as_ref()
            .and_then(RuntimeIntervalModel::static_intervals)
    }

    /// Interval model for the scan; the whole domain when time is unrestricted
    pub fn build_interval_model(&self) -> RuntimeIntervalModel {
        self.intervals
            .clone()
            .unwrap_or_else(|| RuntimeIntervalModel::from_static(IntervalList::full()))
    }

    /// Residual filter as SQL, if any
    pub fn filter_sql(&self, arena: &ExprArena) -> Option<String> {
        self.filter.as_ref().map(|f| f.display(arena))
    }
}
