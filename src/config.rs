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

//! Analyzer configuration

/// Default upper bound for the repeat count of interval shorthand
pub const DEFAULT_MAX_INTERVAL_REPEAT: usize = 100_000;

/// Configuration options for the WHERE-clause analyzer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Largest accepted `count` in `date;period;interval;count`
    /// Default: 100000
    pub max_interval_repeat: usize,

    /// Union intervals and key values across OR branches that constrain the
    /// same domain. When false every OR goes to the residual filter.
    /// Default: true
    pub merge_or_branches: bool,

    /// Fold `x = x`, `x > x` and friends to TRUE/FALSE
    /// Default: true
    pub fold_self_comparisons: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_interval_repeat: DEFAULT_MAX_INTERVAL_REPEAT,
            merge_or_branches: true,
            fold_self_comparisons: true,
        }
    }
}

impl AnalyzerConfig {
    /// Creates a new AnalyzerConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config that only extracts from plain conjunctions
    pub fn conservative() -> Self {
        Self {
            merge_or_branches: false,
            fold_self_comparisons: false,
            ..Self::default()
        }
    }

    /// Builder method to set the shorthand repeat limit
    pub fn with_max_interval_repeat(mut self, count: usize) -> Self {
        self.max_interval_repeat = count;
        self
    }

    /// Builder method to enable/disable OR merging
    pub fn with_merge_or_branches(mut self, enabled: bool) -> Self {
        self.merge_or_branches = enabled;
        self
    }

    /// Builder method to enable/disable self-comparison folding
    pub fn with_fold_self_comparisons(mut self, enabled: bool) -> Self {
        self.fold_self_comparisons = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.max_interval_repeat, 100_000);
        assert!(config.merge_or_branches);
        assert!(config.fold_self_comparisons);
        assert_eq!(config, AnalyzerConfig::new());
    }

    #[test]
    fn test_builders() {
        let config = AnalyzerConfig::new()
            .with_max_interval_repeat(10)
            .with_merge_or_branches(false);
        assert_eq!(config.max_interval_repeat, 10);
        assert!(!config.merge_or_branches);
        assert!(config.fold_self_comparisons);

        let conservative = AnalyzerConfig::conservative();
        assert!(!conservative.merge_or_branches);
        assert!(!conservative.fold_self_comparisons);
        assert_eq!(conservative.max_interval_repeat, DEFAULT_MAX_INTERVAL_REPEAT);
    }
}
