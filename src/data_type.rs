use std::fmt;

use allocative::Allocative;

/// The column types a table schema can declare.
/// The type decides how the bytes of a [crate::Cell] are read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Allocative)]
pub enum DataType {
    /// UTF-8 text, stored as its raw bytes.
    Text,
    /// A 32-bit signed integer, stored as 4 big-endian bytes.
    Int,
    /// A boolean, stored as a single byte. No SQL literal produces one.
    Bool,
}

impl DataType {
    /// Maps a declared column type name. Only `int` and `text` can be declared.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(Self::Int),
            "text" => Some(Self::Text),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Int => "int",
            Self::Bool => "bool",
        })
    }
}
