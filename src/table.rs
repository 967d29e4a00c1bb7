use allocative::Allocative;

use crate::cell::Cell;
use crate::data_type::DataType;

/// Column definition in the schema
#[derive(Debug, Clone, PartialEq, Allocative)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
}

#[derive(Debug, Clone, Default, PartialEq, Allocative)]
pub struct Schema {
    pub columns: Vec<ColumnDef>,
}

impl Schema {
    /// Index of the column called `name`, if any.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.name == name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// A table: its schema plus rows of encoded cells in insertion order.
#[derive(Debug, Clone, Allocative)]
pub struct Table {
    pub name: String,
    pub schema: Schema,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(name: String, schema: Schema) -> Self {
        Self {
            name,
            schema,
            rows: Vec::new(),
        }
    }

    /// Appends a row as is. Arity is checked by the caller against the
    /// statement, so a row may hold fewer cells than the schema has columns.
    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn get_row(&self, row_idx: usize) -> Option<&[Cell]> {
        self.rows.get(row_idx).map(Vec::as_slice)
    }
}
