//! Token definitions for Offside

use serde::Serialize;

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// The raw source text of the token (string/char lexemes keep their quotes)
    pub lexeme: String,
    /// 1-based source line the token starts on
    pub line: usize,
    /// Stable numeric id, assigned on first sighting of this lexeme
    pub id: u32,
    /// Whitespace count since the last newline when the token was created
    pub indent: usize,
}

impl Token {
    pub fn is(&self, kind: TokenKind, lexeme: &str) -> bool {
        self.kind == kind && self.lexeme == lexeme
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.is(TokenKind::Keyword, word)
    }

    pub fn is_operator(&self, op: &str) -> bool {
        self.is(TokenKind::Operator, op)
    }
}

/// Token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Keyword,
    Identifier,
    Number,
    FloatNumber,
    StringLiteral,
    CharLiteral,
    Operator,
    Attribute,
    Error,
}

/// Reserved words of the source language
pub const KEYWORDS: &[&str] = &[
    "let", "rec", "fun", "match", "with", "if", "then", "else", "elif", "for", "to", "do",
    "while", "type", "module", "namespace", "open", "exception", "try", "finally", "raise",
    "begin", "end", "in", "of", "when", "as", "val", "mutable", "lazy", "async", "yield",
    "return", "use", "new", "interface", "inherit", "abstract", "default", "member", "static",
    "override", "private", "public", "internal", "base", "null", "true", "false", "and", "or",
    "not", "upcast", "downcast", "int", "int32", "int64", "float", "double", "decimal", "bool",
    "string", "char", "unit", "obj", "byte", "sbyte", "int16", "uint16", "uint", "float32",
    "single", "printfn", "downto", "printf", "class", "Map",
];

/// Operator lexemes, matched greedily (longest prefix wins)
pub const OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "%", "=", "<", ">", "<=", ">=", "<>", "&&", "||", "!", "|>", ">>",
    "<<", "::", "@", "^", "~", "?", ":", "->", "<-", "|", "&", ";;", "(", ")", "[", "]", "{",
    "}", ",", ".", "..", ";", "**", "&&&", "|||", "^^^", "~~~", "<<<", ">>>", "$",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

pub fn is_operator(text: &str) -> bool {
    OPERATORS.contains(&text)
}
