//! A minimal SQL front-end and in-memory execution engine.
//!
//! SQL text is lexed into [tokenizer::Token]s, parsed into an [ast::Ast] and
//! executed by a [MemoryBackend], which supports `CREATE TABLE`, `INSERT`
//! and `SELECT`.

pub mod ast;
pub mod backend;
pub mod cell;
pub mod data_type;
pub mod error;
pub mod parser;
pub mod table;
pub mod tokenizer;

pub use backend::{ExecutionResult, MemoryBackend, QueryResult, ResultColumn};
pub use cell::Cell;
pub use data_type::DataType;
pub use error::{Error, LexError, ParseError, Result};
pub use parser::parse;
pub use table::{ColumnDef, Schema, Table};
pub use tokenizer::lex;
