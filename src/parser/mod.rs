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

//! Predicate parser
//!
//! - [`Lexer`] - Tokenizer for predicate text
//! - [`Parser`] - Pratt parser that builds an [`ExprArena`]
//! - [`ast`] - Expression nodes
//! - [`token`] - Token types
//!
//! # Example
//!
//! ```
//! use where_intrinsics::parser::{parse_predicate, ExprKind};
//!
//! let predicate = parse_predicate("sym in ('A', 'B') and timestamp > '2024'").unwrap();
//! assert!(matches!(predicate.arena.kind(predicate.root), ExprKind::And(..)));
//! ```

pub mod ast;
pub mod lexer;
#[allow(clippy::module_inception)]
pub mod parser;
pub mod precedence;
pub mod token;

pub use ast::{ExprArena, ExprDisplay, ExprKind, ExprNode, Literal, NodeId};
pub use lexer::Lexer;
pub use parser::{parse_predicate, Parser, Predicate};
pub use precedence::Precedence;
pub use token::{is_keyword, is_operator, is_punctuator, Token, TokenType, KEYWORDS, OPERATORS};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_predicate() {
        let p = parse_predicate("bid > 100").unwrap();
        assert!(matches!(p.arena.kind(p.root), ExprKind::Comparison { .. }));
        assert_eq!(p.arena.len(), 3);
    }

    #[test]
    fn test_parse_empty_string() {
        assert!(parse_predicate("").is_err());
        assert!(parse_predicate("   \n\t  ").is_err());
    }

    #[test]
    fn test_parse_complex_predicate() {
        let p = parse_predicate(
            r#"
            timestamp in '2015-02-23T10:00;2d'
                and (sym = 'A' or sym = 'B')
                and not bid between 1 and 2
                and "mode" in (select mode from modes where x = 1)
            "#,
        )
        .unwrap();
        assert_eq!(
            p.to_sql(),
            "timestamp in '2015-02-23T10:00;2d' and (sym = 'A' or sym = 'B') \
             and not bid between 1 and 2 and mode in (select mode from modes where x = 1)"
        );
    }
}
