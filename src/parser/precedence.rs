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

//! Operator precedence levels for the Pratt parser

/// Precedence levels (higher number = higher precedence)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum Precedence {
    /// Lowest precedence
    #[default]
    Lowest = 1,
    /// Logical operators (OR)
    Or = 2,
    /// Logical operators (AND)
    And = 3,
    /// NOT operator
    Not = 4,
    /// Comparison operators (=, <>, !=, IN, BETWEEN)
    Equals = 5,
    /// Comparison operators (<, >, <=, >=)
    LessGreater = 6,
    /// Addition and subtraction (+, -)
    Sum = 7,
    /// Multiplication and division (*, /)
    Product = 8,
    /// Prefix operators (-, NOT)
    Prefix = 9,
    /// Function calls
    Call = 10,
}

impl Precedence {
    /// Get precedence for an operator or keyword
    pub fn for_operator(op: &str) -> Precedence {
        match op.to_uppercase().as_str() {
            "OR" => Precedence::Or,
            "AND" => Precedence::And,
            "NOT" => Precedence::Not,
            "=" | "==" | "<>" | "!=" | "IN" | "BETWEEN" => Precedence::Equals,
            "<" | ">" | "<=" | ">=" => Precedence::LessGreater,
            "+" | "-" => Precedence::Sum,
            "*" | "/" => Precedence::Product,
            "(" => Precedence::Call,
            _ => Precedence::Lowest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_order() {
        assert!(Precedence::Lowest < Precedence::Or);
        assert!(Precedence::Or < Precedence::And);
        assert!(Precedence::And < Precedence::Not);
        assert!(Precedence::Not < Precedence::Equals);
        assert!(Precedence::Equals < Precedence::LessGreater);
        assert!(Precedence::Sum < Precedence::Product);
        assert!(Precedence::Prefix < Precedence::Call);
    }

    #[test]
    fn test_for_operator() {
        assert_eq!(Precedence::for_operator("or"), Precedence::Or);
        assert_eq!(Precedence::for_operator("between"), Precedence::Equals);
        assert_eq!(Precedence::for_operator(">="), Precedence::LessGreater);
        assert_eq!(Precedence::for_operator("/"), Precedence::Product);
        assert_eq!(Precedence::for_operator("xyz"), Precedence::Lowest);
    }
}
