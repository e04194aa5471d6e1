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

//! Token types for the predicate lexer

use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::LazyLock;

/// TokenType represents the type of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// Error token
    Error,
    /// End of file
    Eof,
    /// Identifier (column name, function name)
    Identifier,
    /// Keyword (AND, OR, NOT, IN, BETWEEN, ...)
    Keyword,
    /// String literal ('hello')
    String,
    /// Integer number (123)
    Integer,
    /// Floating point number (123.45)
    Float,
    /// Operator (=, <, >, +, -, etc.)
    Operator,
    /// Punctuator (comma, parentheses)
    Punctuator,
    /// Bind variable ($1)
    Parameter,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Error => write!(f, "ERROR"),
            TokenType::Eof => write!(f, "EOF"),
            TokenType::Identifier => write!(f, "IDENTIFIER"),
            TokenType::Keyword => write!(f, "KEYWORD"),
            TokenType::String => write!(f, "STRING"),
            TokenType::Integer => write!(f, "INTEGER"),
            TokenType::Float => write!(f, "FLOAT"),
            TokenType::Operator => write!(f, "OPERATOR"),
            TokenType::Punctuator => write!(f, "PUNCTUATOR"),
            TokenType::Parameter => write!(f, "PARAMETER"),
        }
    }
}

/// Token represents a lexical token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The type of the token
    pub token_type: TokenType,
    /// The literal string value; string literals keep their quotes
    pub literal: String,
    /// Character offset in the source, starting at 0
    pub position: usize,
    /// Error message (if token_type is Error)
    pub error: Option<String>,
}

impl Token {
    /// Create a new token
    pub fn new(token_type: TokenType, literal: impl Into<String>, position: usize) -> Self {
        Self {
            token_type,
            literal: literal.into(),
            position,
            error: None,
        }
    }

    /// Create an error token
    pub fn error(message: impl Into<String>, literal: impl Into<String>, position: usize) -> Self {
        Self {
            token_type: TokenType::Error,
            literal: literal.into(),
            position,
            error: Some(message.into()),
        }
    }

    /// Create an EOF token
    pub fn eof(position: usize) -> Self {
        Self {
            token_type: TokenType::Eof,
            literal: String::new(),
            position,
            error: None,
        }
    }

    /// Check if this is an EOF token
    pub fn is_eof(&self) -> bool {
        self.token_type == TokenType::Eof
    }

    /// Check if this is a keyword with the given value (case-insensitive)
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.token_type == TokenType::Keyword && self.literal.eq_ignore_ascii_case(keyword)
    }

    /// Check if this is an operator with the given value
    pub fn is_operator(&self, op: &str) -> bool {
        self.token_type == TokenType::Operator && self.literal == op
    }

    /// Check if this is a punctuator with the given value
    pub fn is_punctuator(&self, punct: &str) -> bool {
        self.token_type == TokenType::Punctuator && self.literal == punct
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token_type {
            TokenType::Error => write!(
                f,
                "{}: {} at {}",
                self.token_type,
                self.error.as_deref().unwrap_or("unknown error"),
                self.position
            ),
            TokenType::Keyword => write!(
                f,
                "{}: {} at {}",
                self.token_type, self.literal, self.position
            ),
            _ => write!(
                f,
                "{}: '{}' at {}",
                self.token_type, self.literal, self.position
            ),
        }
    }
}

/// Keywords recognized inside a predicate
pub static KEYWORDS: &[&str] = &[
    "AND", "OR", "NOT", "IN", "BETWEEN", "NULL", "TRUE", "FALSE", "SELECT",
];

static KEYWORD_SET: LazyLock<FxHashSet<&'static str>> =
    LazyLock::new(|| KEYWORDS.iter().copied().collect());

/// Check if a word is a keyword (case-insensitive)
pub fn is_keyword(s: &str) -> bool {
    KEYWORD_SET.contains(s) || KEYWORD_SET.contains(s.to_ascii_uppercase().as_str())
}

/// Operators recognized by the lexer
pub static OPERATORS: &[&str] = &[
    "=", "==", "!=", "<>", "<", "<=", ">", ">=", "+", "-", "*", "/",
];

static OPERATOR_SET: LazyLock<FxHashSet<&'static str>> =
    LazyLock::new(|| OPERATORS.iter().copied().collect());

/// Check if a string is an operator
pub fn is_operator(s: &str) -> bool {
    OPERATOR_SET.contains(s)
}

/// Predicate punctuators
pub static PUNCTUATORS: &[char] = &[',', '(', ')'];

/// Check if a character is a punctuator
pub fn is_punctuator(c: char) -> bool {
    PUNCTUATORS.contains(&c)
}

/// Characters that can be part of an operator
pub fn is_operator_char(c: char) -> bool {
    matches!(c, '=' | '<' | '>' | '!' | '+' | '-' | '*' | '/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        assert!(is_keyword("AND"));
        assert!(is_keyword("between"));
        assert!(is_keyword("Null"));
        assert!(!is_keyword("timestamp"));
        assert!(!is_keyword("sym"));
    }

    #[test]
    fn test_operators() {
        assert!(is_operator("<>"));
        assert!(is_operator(">="));
        assert!(!is_operator("=>"));
        assert!(is_operator_char('!'));
        assert!(!is_operator_char('('));
    }

    #[test]
    fn test_token_predicates() {
        let t = Token::new(TokenType::Keyword, "BETWEEN", 4);
        assert!(t.is_keyword("between"));
        assert!(!t.is_operator("="));
        assert_eq!(t.to_string(), "KEYWORD: BETWEEN at 4");

        let t = Token::new(TokenType::Punctuator, "(", 7);
        assert!(t.is_punctuator("("));
        assert_eq!(t.to_string(), "PUNCTUATOR: '(' at 7");
    }
}
