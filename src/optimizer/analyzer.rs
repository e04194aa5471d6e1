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

//! WHERE-clause analyzer
//!
//! Walks the predicate tree, classifies the leaves and merges the results
//! into an [`IntrinsicModel`]. AND chains are flattened so that every
//! conjunct is classified (and every error reported) before the verdict is
//! taken.

use tracing::debug;

use crate::config::AnalyzerConfig;
use crate::core::{Result, TableMetadata};
use crate::functions::{global_registry, ConstantEvaluator};
use crate::intervals::RuntimeIntervalModel;
use crate::parser::{ExprArena, ExprKind, NodeId, Predicate};

use super::classifier::Classifier;
use super::fragment::Fragment;
use super::model::{IntrinsicModel, IntrinsicValue, ResidualFilter};

/// Extracts intervals, key values and the residual filter from a predicate
pub struct WhereClauseAnalyzer<'a> {
    metadata: &'a dyn TableMetadata,
    evaluator: &'a dyn ConstantEvaluator,
    config: AnalyzerConfig,
}

impl<'a> WhereClauseAnalyzer<'a> {
    pub fn new(metadata: &'a dyn TableMetadata, evaluator: &'a dyn ConstantEvaluator) -> Self {
        Self {
            metadata,
            evaluator,
            config: AnalyzerConfig::default(),
        }
    }

    /// Analyzer using the built-in function registry
    pub fn for_table(metadata: &'a dyn TableMetadata) -> Self {
        Self::new(metadata, global_registry())
    }

    pub fn with_config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze the tree rooted at `root`
    ///
    /// `preferred` names the column the caller wants as key column; when set,
    /// no other column is considered.
    pub fn extract(
        &self,
        arena: &ExprArena,
        root: NodeId,
        preferred: Option<&str>,
    ) -> Result<IntrinsicModel> {
        let classifier = Classifier {
            arena,
            metadata: self.metadata,
            evaluator: self.evaluator,
            config: &self.config,
            preferred,
        };
        let fragment = self.walk(&classifier, root)?;
        let model = finish(fragment, arena, preferred);
        debug!(
            verdict = %model.intrinsic_value,
            key_column = ?model.key_column,
            "where clause analyzed"
        );
        Ok(model)
    }

    /// Analyze a parsed predicate
    pub fn extract_predicate(
        &self,
        predicate: &Predicate,
        preferred: Option<&str>,
    ) -> Result<IntrinsicModel> {
        self.extract(&predicate.arena, predicate.root, preferred)
    }

    fn walk(&self, classifier: &Classifier<'_>, node: NodeId) -> Result<Fragment> {
        let arena = classifier.arena;
        match arena.kind(node) {
            ExprKind::And(..) => {
                let mut conjuncts = Vec::new();
                flatten_and(arena, node, &mut conjuncts);
                let fragments = conjuncts
                    .into_iter()
                    .map(|c| self.walk(classifier, c))
                    .collect::<Result<Vec<_>>>()?;
                Fragment::and_all(fragments)
            }
            ExprKind::Or(left, right) => {
                if !self.config.merge_or_branches {
                    return Ok(Fragment::filter(node));
                }
                // a branch that cannot be analyzed leaves the whole OR to the scan
                match (self.walk(classifier, *left), self.walk(classifier, *right)) {
                    (Ok(left), Ok(right)) => Ok(left.or(right, node)),
                    (Err(e), _) | (_, Err(e)) => {
                        debug!(error = %e, "OR branch not analyzable, kept in filter");
                        Ok(Fragment::filter(node))
                    }
                }
            }
            ExprKind::Not(inner) => Ok(self.walk(classifier, *inner)?.not(node)),
            _ => classifier.classify(node),
        }
    }
}

/// Conjuncts of an AND chain in source order
fn flatten_and(arena: &ExprArena, node: NodeId, out: &mut Vec<NodeId>) {
    match arena.kind(node) {
        ExprKind::And(left, right) => {
            flatten_and(arena, *left, out);
            flatten_and(arena, *right, out);
        }
        _ => out.push(node),
    }
}

/// Pick the key column and turn the merged fragment into the public model
fn finish(fragment: Fragment, arena: &ExprArena, preferred: Option<&str>) -> IntrinsicModel {
    match fragment.value {
        IntrinsicValue::True => return IntrinsicModel::always_true(),
        IntrinsicValue::False => return IntrinsicModel::always_false(),
        IntrinsicValue::Undefined => {}
    }
    let Fragment {
        intervals,
        keys,
        lambdas,
        mut filter,
        ..
    } = fragment;

    let chosen = match preferred {
        Some(preferred) => lambdas
            .iter()
            .map(|l| &l.column)
            .chain(keys.iter().map(|k| &k.column))
            .find(|c| c.eq_ignore_ascii_case(preferred))
            .cloned(),
        None => lambdas
            .iter()
            .min_by_key(|l| l.position)
            .map(|l| l.column.clone())
            .or_else(|| {
                keys.iter()
                    .find(|k| k.include.is_some())
                    .map(|k| k.column.clone())
            })
            .or_else(|| keys.first().map(|k| k.column.clone())),
    };
    let is_chosen = |column: &str| {
        chosen
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(column))
    };

    let mut model = IntrinsicModel::default();
    for lambda in lambdas {
        if is_chosen(&lambda.column) {
            model.key_sub_query = Some(lambda.sub_query);
        } else {
            debug!(column = %lambda.column, "sub-query key demoted to filter");
            filter.push(lambda.source);
        }
    }
    for key in keys {
        if is_chosen(&key.column) && model.key_sub_query.is_none() {
            model.key_values = key.include.unwrap_or_default();
            model.key_excluded_values = key.exclude;
        } else {
            debug!(column = %key.column, "key predicates demoted to filter");
            filter.extend(key.sources);
        }
    }

    model.key_column = chosen;
    model.filter = ResidualFilter::from_nodes(arena, filter);
    model.intervals = intervals.map(|iv| RuntimeIntervalModel::new(iv.base, iv.steps));
    model
}
