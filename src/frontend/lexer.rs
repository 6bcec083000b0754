//! Lexer for Offside
//!
//! Converts source text into the complete token sequence. The lexer never
//! fails: malformed input becomes `Error` tokens that the parser rejects.

use std::collections::HashMap;

use log::trace;

use crate::frontend::token::{is_keyword, is_operator, Token, TokenKind};

/// The lexer state
pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: usize,
    /// Whitespace characters seen since the last newline
    indent: usize,
    tokens: Vec<Token>,
    ids: HashMap<String, u32>,
    next_id: u32,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            indent: 0,
            tokens: Vec::new(),
            ids: HashMap::new(),
            next_id: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source.get(self.pos + offset).copied()
    }

    fn slice(&self, start: usize) -> String {
        self.source[start..self.pos].iter().collect()
    }

    fn newline(&mut self) {
        self.line += 1;
        self.indent = 0;
    }

    fn push_token(&mut self, kind: TokenKind, lexeme: String) {
        let id = match self.ids.get(&lexeme) {
            Some(&id) => id,
            None => {
                let id = self.next_id;
                self.next_id += 1;
                self.ids.insert(lexeme.clone(), id);
                id
            }
        };
        let token = Token {
            kind,
            lexeme,
            line: self.line,
            id,
            indent: self.indent,
        };
        trace!(
            "token {:?} {:?} line {} id {} indent {}",
            token.kind,
            token.lexeme,
            token.line,
            token.id,
            token.indent
        );
        self.tokens.push(token);
    }

    /// Tokenize the entire source
    pub fn tokenize(mut self) -> Vec<Token> {
        while let Some(c) = self.peek() {
            match c {
                '\n' => {
                    self.pos += 1;
                    self.newline();
                }
                '\r' => {
                    self.pos += 1;
                    if self.peek() == Some('\n') {
                        self.pos += 1;
                    }
                    self.newline();
                }
                _ if c.is_whitespace() => {
                    self.pos += 1;
                    self.indent += 1;
                }
                '[' if self.peek_at(1) == Some('<') => self.consume_attribute(),
                _ if c.is_alphabetic() || c == '_' => self.consume_word(),
                _ if c.is_ascii_digit() => self.consume_number(),
                '.' if self.peek_at(1).is_some_and(|d| d.is_ascii_digit()) => {
                    self.consume_number()
                }
                '"' => self.consume_string(),
                '\'' => self.consume_char(),
                '/' if self.peek_at(1) == Some('/') => self.consume_line_comment(),
                '(' if self.peek_at(1) == Some('*') => self.consume_block_comment(),
                _ if is_operator(&c.to_string()) => self.consume_operator(),
                _ => {
                    self.pos += 1;
                    self.push_token(TokenKind::Error, c.to_string());
                }
            }
        }
        self.tokens
    }

    /// `[<...>]` attribute, terminated at the next `]`
    fn consume_attribute(&mut self) {
        let start = self.pos;
        self.pos += 1;
        while let Some(c) = self.peek() {
            if c == ']' {
                break;
            }
            self.pos += 1;
        }
        if self.peek() == Some(']') {
            self.pos += 1;
            let lexeme = self.slice(start);
            self.push_token(TokenKind::Attribute, lexeme);
        } else {
            let lexeme = self.slice(start);
            self.push_token(TokenKind::Error, lexeme);
        }
    }

    fn consume_word(&mut self) {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let word = self.slice(start);
        let kind = if is_keyword(&word) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        self.push_token(kind, word);
    }

    fn consume_number(&mut self) {
        let mut start = self.pos;

        // A sign emitted just before this number is absorbed into the literal
        // when it is preceded by start-of-input, whitespace, or `=`.
        if self.pos > 0 {
            let prev = self.source[self.pos - 1];
            let before_ok = self.pos < 2 || {
                let b = self.source[self.pos - 2];
                b.is_whitespace() || b == '='
            };
            let last_is_sign = self
                .tokens
                .last()
                .is_some_and(|t| t.kind == TokenKind::Operator && (t.lexeme == "-" || t.lexeme == "+"));
            if (prev == '-' || prev == '+') && before_ok && last_is_sign {
                self.tokens.pop();
                self.pos -= 1;
                start = self.pos;
                self.pos += 1;
            }
        }

        let mut is_float = false;
        while let Some(c) = self.peek() {
            if c == '.' {
                // `..` ends the number before the range operator
                if self.peek_at(1) == Some('.') {
                    break;
                }
                if is_float {
                    let lexeme = self.slice(start);
                    self.push_token(TokenKind::Error, lexeme);
                    return;
                }
                is_float = true;
                self.pos += 1;
            } else if c.is_ascii_digit() {
                self.pos += 1;
            } else {
                break;
            }
        }

        // Number directly followed by the range operator: emit both tokens.
        if self.peek() == Some('.') && self.peek_at(1) == Some('.') {
            let kind = if is_float { TokenKind::FloatNumber } else { TokenKind::Number };
            let lexeme = self.slice(start);
            self.push_token(kind, lexeme);
            self.pos += 2;
            self.push_token(TokenKind::Operator, "..".to_string());
            return;
        }

        // Exponent part
        if matches!(self.peek(), Some('e') | Some('E')) {
            is_float = true;
            self.pos += 1;
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.pos += 1;
            }
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                let lexeme = self.slice(start);
                self.push_token(TokenKind::Error, lexeme);
                return;
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }

        // Float suffixes
        if matches!(self.peek(), Some('f' | 'F' | 'd' | 'D')) {
            is_float = true;
            self.pos += 1;
        }
        // Integer suffixes, including the two-character `uy`/`UY`
        if let Some(c) = self.peek() {
            if matches!(c.to_ascii_lowercase(), 'l' | 'u' | 'y' | 'n') {
                let next = self.peek_at(1);
                self.pos += 1;
                if c.to_ascii_lowercase() == 'u'
                    && next.is_some_and(|n| n.to_ascii_lowercase() == 'y')
                {
                    self.pos += 1;
                }
            }
        }

        // Anything else trailing the number folds the whole run into an error.
        let trailing_garbage = |c: char| !c.is_whitespace() && !is_operator(&c.to_string());
        if self.peek().is_some_and(trailing_garbage) {
            while self.peek().is_some_and(trailing_garbage) {
                self.pos += 1;
            }
            let lexeme = self.slice(start);
            self.push_token(TokenKind::Error, lexeme);
            return;
        }

        let kind = if is_float { TokenKind::FloatNumber } else { TokenKind::Number };
        let lexeme = self.slice(start);
        self.push_token(kind, lexeme);
    }

    fn consume_string(&mut self) {
        let start = self.pos;
        self.pos += 1;
        while let Some(c) = self.peek() {
            if c == '"' {
                break;
            }
            if c == '\\' && self.pos + 1 < self.source.len() {
                self.pos += 1;
            }
            self.pos += 1;
        }
        if self.peek() == Some('"') {
            self.pos += 1;
            let lexeme = self.slice(start);
            self.push_token(TokenKind::StringLiteral, lexeme);
        } else {
            let lexeme = self.slice(start);
            self.push_token(TokenKind::Error, lexeme);
        }
    }

    fn consume_char(&mut self) {
        let start = self.pos;
        self.pos += 1;
        if self.peek() == Some('\\') {
            self.pos += 1;
        }
        if self.peek().is_some() {
            self.pos += 1;
        }
        if self.peek() == Some('\'') {
            self.pos += 1;
            let lexeme = self.slice(start);
            self.push_token(TokenKind::CharLiteral, lexeme);
        } else {
            let lexeme = self.slice(start);
            self.push_token(TokenKind::Error, lexeme);
        }
    }

    /// `//` comment, terminated by a carriage return
    fn consume_line_comment(&mut self) {
        self.pos += 2;
        while let Some(c) = self.peek() {
            if c == '\r' {
                break;
            }
            self.pos += 1;
        }
        if self.peek() == Some('\r') {
            self.pos += 1;
            if self.peek() == Some('\n') {
                self.pos += 1;
            }
        }
        self.newline();
    }

    /// `(* ... *)` comment, produces no token
    fn consume_block_comment(&mut self) {
        self.pos += 2;
        while let Some(c) = self.peek() {
            if c == '*' && self.peek_at(1) == Some(')') {
                self.pos += 2;
                return;
            }
            if c == '\n' {
                self.newline();
            }
            self.pos += 1;
        }
    }

    /// Greedy longest-match against the operator table
    fn consume_operator(&mut self) {
        let mut lexeme = String::new();
        while let Some(c) = self.peek() {
            let mut candidate = lexeme.clone();
            candidate.push(c);
            if is_operator(&candidate) {
                lexeme = candidate;
                self.pos += 1;
            } else {
                break;
            }
        }
        self.push_token(TokenKind::Operator, lexeme);
    }
}
