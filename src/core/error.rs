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

//! Error types for predicate analysis
//!
//! Every error raised while parsing or analyzing a WHERE clause carries the
//! character offset of the token that caused it. Errors are fatal to the
//! statement being compiled; there is no nested cause chain.

use thiserror::Error;

/// Result type alias for analyzer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Compile-time predicate error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // =========================================================================
    // Arity errors
    // =========================================================================
    /// An operator, BETWEEN or IN received fewer operands than it needs
    #[error("[{position}] too few arguments for '{operator}' [found={found},expected={expected}]")]
    TooFewArguments {
        position: usize,
        operator: String,
        found: usize,
        expected: usize,
    },

    // =========================================================================
    // Literal errors
    // =========================================================================
    /// Literal could not be parsed as a date or timestamp
    #[error("[{position}] Invalid date")]
    InvalidDate { position: usize },

    /// Interval shorthand used where a single timestamp is expected
    #[error("[{position}] Not a date, use IN keyword with intervals")]
    NotADate { position: usize },

    /// Malformed `date;period;unit;count` shorthand
    #[error("[{position}] Invalid interval: {message}")]
    InvalidInterval { position: usize, message: String },

    /// Constant of a type that cannot be compared with a timestamp
    #[error("[{position}] unexpected argument type [expected={expected},found={found}]")]
    UnexpectedType {
        position: usize,
        expected: String,
        found: String,
    },

    // =========================================================================
    // Column errors
    // =========================================================================
    /// Column reference does not resolve against the table metadata
    #[error("[{position}] Invalid column: {name}")]
    InvalidColumn { position: usize, name: String },

    // =========================================================================
    // Structural errors
    // =========================================================================
    /// BETWEEN used as a bound of another BETWEEN
    #[error("[{position}] between statements cannot be nested")]
    NestedBetween { position: usize },

    /// More than one sub-query key in the same conjunction
    #[error("[{position}] Multiple lambda expressions not supported")]
    MultipleLambda { position: usize },

    // =========================================================================
    // Syntax errors
    // =========================================================================
    /// Predicate text could not be parsed
    #[error("[{position}] {message}")]
    Syntax { position: usize, message: String },
}

/// Broad classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Wrong operand count
    Arity,
    /// Unparseable date/time, malformed shorthand or wrong constant type
    Literal,
    /// Unknown column reference
    Column,
    /// Nested BETWEEN, multiple lambda keys
    Structural,
    /// Raised by the predicate parser
    Syntax,
}

impl Error {
    /// Create a new TooFewArguments error
    pub fn too_few_arguments(
        position: usize,
        operator: impl Into<String>,
        found: usize,
        expected: usize,
    ) -> Self {
        Error::TooFewArguments {
            position,
            operator: operator.into(),
            found,
            expected,
        }
    }

    /// Create a new InvalidInterval error
    pub fn invalid_interval(position: usize, message: impl Into<String>) -> Self {
        Error::InvalidInterval {
            position,
            message: message.into(),
        }
    }

    /// Create a new InvalidColumn error
    pub fn invalid_column(position: usize, name: impl Into<String>) -> Self {
        Error::InvalidColumn {
            position,
            name: name.into(),
        }
    }

    /// Create a new UnexpectedType error
    pub fn unexpected_type(
        position: usize,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Error::UnexpectedType {
            position,
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a new Syntax error
    pub fn syntax(position: usize, message: impl Into<String>) -> Self {
        Error::Syntax {
            position,
            message: message.into(),
        }
    }

    /// Character offset of the offending token
    pub fn position(&self) -> usize {
        match self {
            Error::TooFewArguments { position, .. }
            | Error::InvalidDate { position }
            | Error::NotADate { position }
            | Error::InvalidInterval { position, .. }
            | Error::UnexpectedType { position, .. }
            | Error::InvalidColumn { position, .. }
            | Error::NestedBetween { position }
            | Error::MultipleLambda { position }
            | Error::Syntax { position, .. } => *position,
        }
    }

    /// Classify the error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::TooFewArguments { .. } => ErrorCategory::Arity,
            Error::InvalidDate { .. }
            | Error::NotADate { .. }
            | Error::InvalidInterval { .. }
            | Error::UnexpectedType { .. } => ErrorCategory::Literal,
            Error::InvalidColumn { .. } => ErrorCategory::Column,
            Error::NestedBetween { .. } | Error::MultipleLambda { .. } => {
                ErrorCategory::Structural
            }
            Error::Syntax { .. } => ErrorCategory::Syntax,
        }
    }

    /// Message without the position prefix
    pub fn message(&self) -> String {
        let full = self.to_string();
        match full.find("] ") {
            Some(idx) => full[idx + 2..].to_string(),
            None => full,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::too_few_arguments(10, ">", 1, 2).to_string(),
            "[10] too few arguments for '>' [found=1,expected=2]"
        );
        assert_eq!(
            Error::InvalidDate { position: 4 }.to_string(),
            "[4] Invalid date"
        );
        assert_eq!(
            Error::NestedBetween { position: 12 }.to_string(),
            "[12] between statements cannot be nested"
        );
        assert_eq!(
            Error::invalid_column(0, "abb").to_string(),
            "[0] Invalid column: abb"
        );
    }

    #[test]
    fn test_error_position_and_category() {
        let err = Error::MultipleLambda { position: 37 };
        assert_eq!(err.position(), 37);
        assert_eq!(err.category(), ErrorCategory::Structural);

        let err = Error::invalid_interval(12, "unknown period unit 'x'");
        assert_eq!(err.position(), 12);
        assert_eq!(err.category(), ErrorCategory::Literal);
        assert_eq!(err.message(), "Invalid interval: unknown period unit 'x'");

        assert_eq!(
            Error::too_few_arguments(8, "in", 0, 1).category(),
            ErrorCategory::Arity
        );
        assert_eq!(
            Error::syntax(3, "unexpected token").category(),
            ErrorCategory::Syntax
        );
    }
}
