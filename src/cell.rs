use std::fmt;
use std::sync::Arc;

use allocative::Allocative;

use crate::data_type::DataType;

/// One column's value within one row, kept in its encoded byte form.
///
/// The bytes carry no type tag: the column's [DataType] decides which of
/// [Cell::as_text], [Cell::as_int] or [Cell::as_bool] applies. Decoding with
/// the wrong one gives a meaningless value, never a panic.
///
/// The bytes are wrapped in an [Arc] so result sets share them with the table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Allocative)]
pub struct Cell(Arc<[u8]>);

impl Cell {
    /// Encodes an integer as 4 big-endian two's-complement bytes.
    pub fn from_int(value: i32) -> Self {
        Self(Arc::from(value.to_be_bytes().as_slice()))
    }

    /// Encodes text as its raw UTF-8 bytes.
    pub fn from_text(value: &str) -> Self {
        Self(Arc::from(value.as_bytes()))
    }

    /// Encodes a boolean as a single `1` or `0` byte.
    pub fn from_bool(value: bool) -> Self {
        Self(Arc::from([u8::from(value)].as_slice()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reads the bytes as UTF-8, replacing invalid sequences.
    pub fn as_text(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }

    /// Reads the first four bytes as a big-endian `i32`. Shorter cells are
    /// padded with leading zero bytes.
    pub fn as_int(&self) -> i32 {
        let mut buf = [0u8; 4];
        let bytes = &self.0[..self.0.len().min(4)];
        buf[4 - bytes.len()..].copy_from_slice(bytes);
        i32::from_be_bytes(buf)
    }

    /// `None` for an empty cell, otherwise whether the first byte is `1`.
    pub fn as_bool(&self) -> Option<bool> {
        self.0.first().map(|b| *b == 1)
    }

    /// Renders the cell for display according to `data_type`.
    pub fn display(&self, data_type: DataType) -> CellDisplay<'_> {
        CellDisplay {
            cell: self,
            data_type,
        }
    }
}

/// Helper returned by [Cell::display].
pub struct CellDisplay<'a> {
    cell: &'a Cell,
    data_type: DataType,
}

impl fmt::Display for CellDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data_type {
            DataType::Int => write!(f, "{}", self.cell.as_int()),
            DataType::Text => f.write_str(&self.cell.as_text()),
            DataType::Bool => match self.cell.as_bool() {
                Some(b) => write!(f, "{b}"),
                None => f.write_str("NULL"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_encoding_is_big_endian() {
        assert_eq!(Cell::from_int(1).as_bytes(), &[0, 0, 0, 1]);
        assert_eq!(Cell::from_int(258).as_bytes(), &[0, 0, 1, 2]);
        assert_eq!(Cell::from_int(-1).as_bytes(), &[0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn test_as_int() {
        assert_eq!(Cell::from_int(42).as_int(), 42);
        assert_eq!(Cell::from_int(i32::MIN).as_int(), i32::MIN);
        assert_eq!(Cell::from_int(i32::MAX).as_int(), i32::MAX);
    }

    #[test]
    fn test_as_int_on_short_cell() {
        assert_eq!(Cell::default().as_int(), 0);
        assert_eq!(Cell::from_text("\u{1}").as_int(), 1);
    }

    #[test]
    fn test_as_text() {
        assert_eq!(Cell::from_text("hello").as_text(), "hello");
        assert_eq!(Cell::from_text("").as_text(), "");
        assert_eq!(Cell::from_text("héllo").len(), 6);
    }

    #[test]
    fn test_as_bool() {
        assert_eq!(Cell::from_bool(true).as_bool(), Some(true));
        assert_eq!(Cell::from_bool(false).as_bool(), Some(false));
        assert_eq!(Cell::default().as_bool(), None);
        assert!(Cell::default().is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(Cell::from_int(-7).display(DataType::Int).to_string(), "-7");
        assert_eq!(Cell::from_text("x").display(DataType::Text).to_string(), "x");
        assert_eq!(Cell::from_bool(true).display(DataType::Bool).to_string(), "true");
        assert_eq!(Cell::default().display(DataType::Bool).to_string(), "NULL");
    }

    #[test]
    fn test_clone_shares_bytes() {
        let a = Cell::from_text("shared");
        let b = a.clone();

        assert!(std::ptr::eq(a.as_bytes(), b.as_bytes()));
    }
}
