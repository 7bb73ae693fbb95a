use thiserror::Error;

/// Errors that can occur while reading a pbrt-style scene.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Unexpected character '{ch}' at line {line}")]
    UnexpectedChar { ch: char, line: usize },

    #[error("Unterminated string starting at line {0}")]
    UnterminatedString(usize),

    #[error("Invalid number '{text}' at line {line}")]
    InvalidNumber { text: String, line: usize },

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Unexpected end of file")]
    UnexpectedEof,

    #[error("Unknown material '{name}' at line {line}")]
    UnknownMaterial { name: String, line: usize },

    #[error("Unclosed AttributeBegin at line {0}")]
    UnclosedBlock(usize),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;
