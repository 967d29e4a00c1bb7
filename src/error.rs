//! Error types for the lexer, the parser and the memory backend.

use thiserror::Error;

use crate::tokenizer::Location;

pub type Result<T> = std::result::Result<T, Error>;

/// A position in the source text that matched no token shape.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("[{location}] {message}")]
pub struct LexError {
    pub message: String,
    pub location: Location,
}

/// A grammar mismatch. Lex failures surface as parse failures too.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    /// `found` is the offending token text, `None` at end of input.
    #[error(
        "{}{}, got: {}",
        fmt_location(.location),
        .message,
        .found.as_deref().unwrap_or("end of input")
    )]
    Syntax {
        message: String,
        found: Option<String>,
        location: Option<Location>,
    },
}

fn fmt_location(location: &Option<Location>) -> String {
    match location {
        Some(location) => format!("[{location}] "),
        None => String::new(),
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Invalid datatype: {0}")]
    InvalidDatatype(String),

    #[error("Table does not exist: {0}")]
    TableDoesNotExist(String),

    #[error("Missing values: table has {expected} columns, got {found} values")]
    MissingValues { expected: usize, found: usize },

    #[error("Column does not exist: {0}")]
    ColumnDoesNotExist(String),

    #[error("Numeric literal {0} is not a 32-bit integer")]
    InvalidInteger(String),
}

impl From<LexError> for Error {
    fn from(error: LexError) -> Self {
        Error::Parse(ParseError::Lex(error))
    }
}
