//! Error handling for the Offside front end

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal lexical/syntax failure: any of these aborts the run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("line {line}: invalid token '{lexeme}'")]
    InvalidToken { lexeme: String, line: usize },

    #[error("line {line}: unmatched opening parenthesis")]
    UnmatchedOpeningParen { line: usize },

    #[error("line {line}: unmatched closing parenthesis")]
    UnmatchedClosingParen { line: usize },

    #[error("line {line}: consecutive operators '{first}' and '{second}'")]
    ConsecutiveOperators { first: String, second: String, line: usize },

    #[error("line {line}: unexpected token '{lexeme}'")]
    UnexpectedToken { lexeme: String, line: usize },

    #[error("line {line}: expected {expected}, got '{got}'")]
    Expected { expected: String, got: String, line: usize },

    #[error("line {line}: unexpected token after 'for': '{lexeme}'")]
    UnexpectedAfterFor { lexeme: String, line: usize },

    #[error("line {line}: invalid variable declaration: {message}")]
    InvalidVariableDeclaration { message: String, line: usize },

    #[error("unexpected end of input")]
    UnexpectedEof,
}

impl Error {
    /// Source line the error points at, when it has one
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::InvalidToken { line, .. }
            | Self::UnmatchedOpeningParen { line }
            | Self::UnmatchedClosingParen { line }
            | Self::ConsecutiveOperators { line, .. }
            | Self::UnexpectedToken { line, .. }
            | Self::Expected { line, .. }
            | Self::UnexpectedAfterFor { line, .. }
            | Self::InvalidVariableDeclaration { line, .. } => Some(*line),
            Self::UnexpectedEof => None,
        }
    }
}
