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

//! Predicate lexer (tokenizer)
//!
//! Positions are character offsets, which is what error messages report.

use super::token::{is_keyword, is_operator, is_operator_char, is_punctuator, Token, TokenType};

/// Lexer for tokenizing predicate text
pub struct Lexer {
    /// Input characters
    input: Vec<char>,
    /// Current position in input (points to current char)
    position: usize,
    /// Current character under examination
    ch: char,
    /// Last error encountered
    last_error: Option<String>,
}

impl Lexer {
    /// Create a new lexer for the given input
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let ch = chars.first().copied().unwrap_or('\0');
        Self {
            input: chars,
            position: 0,
            ch,
            last_error: None,
        }
    }

    /// Read the next character
    fn read_char(&mut self) {
        if self.position < self.input.len() {
            self.position += 1;
        }
        self.ch = self.input.get(self.position).copied().unwrap_or('\0');
    }

    /// Peek at the next character without advancing
    fn peek_char(&self) -> char {
        self.input.get(self.position + 1).copied().unwrap_or('\0')
    }

    /// Source text between two character offsets
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.input.len());
        let start = start.min(end);
        self.input[start..end].iter().collect()
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let pos = self.position;

        let token = match self.ch {
            '\0' if self.position >= self.input.len() => Token::eof(pos),

            // String literal (single quotes)
            '\'' => {
                let literal = self.read_string_literal();
                Token::new(TokenType::String, literal, pos)
            }

            // Double-quoted identifier
            '"' => {
                let literal = self.read_quoted_identifier('"');
                Token::new(TokenType::Identifier, literal, pos)
            }

            // Number literal
            c if c.is_ascii_digit() => {
                let literal = self.read_number();
                if literal.contains('.') || literal.contains('e') || literal.contains('E') {
                    Token::new(TokenType::Float, literal, pos)
                } else {
                    Token::new(TokenType::Integer, literal, pos)
                }
            }

            // Bind variable ($1, $2, etc.)
            '$' if self.peek_char().is_ascii_digit() => {
                let literal = self.read_parameter();
                Token::new(TokenType::Parameter, literal, pos)
            }

            c if is_punctuator(c) => {
                self.read_char();
                Token::new(TokenType::Punctuator, c.to_string(), pos)
            }

            c if is_operator_char(c) => {
                let literal = self.read_operator();
                Token::new(TokenType::Operator, literal, pos)
            }

            // Identifier or keyword
            c if c.is_alphabetic() || c == '_' => {
                let literal = self.read_identifier();
                if is_keyword(&literal) {
                    Token::new(TokenType::Keyword, literal.to_uppercase(), pos)
                } else {
                    Token::new(TokenType::Identifier, literal, pos)
                }
            }

            // Unrecognized character
            c => {
                self.read_char();
                Token::error(
                    format!("unrecognized character: {:?}", c),
                    c.to_string(),
                    pos,
                )
            }
        };

        match self.last_error.take() {
            Some(message) => Token::error(message, token.literal, pos),
            None => token,
        }
    }

    /// Skip whitespace characters
    fn skip_whitespace(&mut self) {
        while self.ch.is_whitespace() {
            self.read_char();
        }
    }

    /// Read an identifier
    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        result.push(self.ch);
        self.read_char();

        while self.ch.is_alphanumeric() || self.ch == '_' {
            result.push(self.ch);
            self.read_char();
        }

        result
    }

    /// Read a number (integer or float)
    fn read_number(&mut self) -> String {
        let mut result = String::new();

        while self.ch.is_ascii_digit() {
            result.push(self.ch);
            self.read_char();
        }

        // Check for decimal point
        if self.ch == '.' && self.peek_char().is_ascii_digit() {
            result.push(self.ch);
            self.read_char();

            while self.ch.is_ascii_digit() {
                result.push(self.ch);
                self.read_char();
            }
        }

        // Check for exponent (E or e)
        if self.ch == 'e' || self.ch == 'E' {
            result.push(self.ch);
            self.read_char();

            if self.ch == '+' || self.ch == '-' {
                result.push(self.ch);
                self.read_char();
            }

            if !self.ch.is_ascii_digit() {
                self.last_error = Some("invalid number format: exponent has no digits".to_string());
                return result;
            }

            while self.ch.is_ascii_digit() {
                result.push(self.ch);
                self.read_char();
            }
        }

        result
    }

    /// Read a string literal (single-quoted), keeping the quotes
    fn read_string_literal(&mut self) -> String {
        let mut result = String::new();
        let quote = self.ch;
        result.push(quote);
        self.read_char(); // consume opening quote

        loop {
            if self.ch == '\0' && self.position >= self.input.len() {
                self.last_error = Some("unterminated string literal".to_string());
                result.push(quote);
                break;
            } else if self.ch == quote {
                // SQL standard: '' becomes '
                if self.peek_char() == quote {
                    result.push(self.ch);
                    self.read_char();
                    self.read_char();
                } else {
                    result.push(quote);
                    self.read_char();
                    break;
                }
            } else {
                result.push(self.ch);
                self.read_char();
            }
        }

        result
    }

    /// Read a double-quoted identifier
    fn read_quoted_identifier(&mut self, quote: char) -> String {
        let mut result = String::new();
        self.read_char(); // consume opening quote

        while self.position < self.input.len() {
            if self.ch == quote && self.peek_char() == quote {
                result.push(self.ch);
                self.read_char();
                self.read_char();
            } else if self.ch == quote {
                break;
            } else {
                result.push(self.ch);
                self.read_char();
            }
        }

        if self.ch == quote {
            self.read_char();
        } else {
            self.last_error = Some(format!(
                "unterminated quoted identifier starting with {}",
                quote
            ));
        }

        result
    }

    /// Read an operator
    fn read_operator(&mut self) -> String {
        let mut result = String::new();
        let first_char = self.ch;
        result.push(first_char);
        self.read_char();

        let two_chars: String = [first_char, self.ch].iter().collect();
        if is_operator(&two_chars) {
            result.push(self.ch);
            self.read_char();
        }

        result
    }

    /// Read a bind variable ($1, $2, etc.)
    fn read_parameter(&mut self) -> String {
        let mut result = String::new();
        result.push(self.ch); // $
        self.read_char();

        while self.ch.is_ascii_digit() {
            result.push(self.ch);
            self.read_char();
        }

        result
    }
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        if token.is_eof() {
            None
        } else {
            Some(token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<(TokenType, String, usize)> {
        Lexer::new(input)
            .map(|t| (t.token_type, t.literal, t.position))
            .collect()
    }

    #[test]
    fn test_basic_predicate() {
        let toks = tokens("sym = 'x' and bid >= 10.5");
        assert_eq!(
            toks,
            vec![
                (TokenType::Identifier, "sym".to_string(), 0),
                (TokenType::Operator, "=".to_string(), 4),
                (TokenType::String, "'x'".to_string(), 6),
                (TokenType::Keyword, "AND".to_string(), 10),
                (TokenType::Identifier, "bid".to_string(), 14),
                (TokenType::Operator, ">=".to_string(), 18),
                (TokenType::Float, "10.5".to_string(), 21),
            ]
        );
    }

    #[test]
    fn test_operators_and_params() {
        let toks = tokens("a<>b != $12");
        assert_eq!(toks[1], (TokenType::Operator, "<>".to_string(), 1));
        assert_eq!(toks[3], (TokenType::Operator, "!=".to_string(), 5));
        assert_eq!(toks[4], (TokenType::Parameter, "$12".to_string(), 8));
    }

    #[test]
    fn test_string_escape_and_quoted_identifier() {
        let toks = tokens("\"my col\" = 'it''s'");
        assert_eq!(toks[0], (TokenType::Identifier, "my col".to_string(), 0));
        assert_eq!(toks[2], (TokenType::String, "'it's'".to_string(), 11));
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let mut lexer = Lexer::new("x = 'abc");
        lexer.next_token();
        lexer.next_token();
        let t = lexer.next_token();
        assert_eq!(t.token_type, TokenType::Error);
        assert_eq!(t.position, 4);
    }

    #[test]
    fn test_eof_position_and_slice() {
        let mut lexer = Lexer::new("ab ");
        lexer.next_token();
        let eof = lexer.next_token();
        assert!(eof.is_eof());
        assert_eq!(eof.position, 3);
        assert_eq!(lexer.slice(0, 2), "ab");
        assert_eq!(lexer.slice(1, 99), "b ");
    }
}
