use std::collections::HashMap;
use std::fmt;

use allocative::Allocative;
use log::{debug, warn};

use crate::ast::{CreateTable, Expression, InsertInto, Select, SelectItem, Statement};
use crate::cell::Cell;
use crate::data_type::DataType;
use crate::error::{Error, Result};
use crate::parser::parse;
use crate::table::{ColumnDef, Schema, Table};
use crate::tokenizer::{Token, TokenKind};

/// The in-memory table store. It executes parsed statements against the
/// tables it owns; nothing is persisted.
#[derive(Debug, Default, Allocative)]
pub struct MemoryBackend {
    tables: HashMap<String, Table>,
}

/// Name and type of one column of a [QueryResult].
#[derive(Debug, Clone, PartialEq)]
pub struct ResultColumn {
    pub name: String,
    pub data_type: DataType,
}

/// Represents the result of a successful `SELECT`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    pub columns: Vec<ResultColumn>,
    /// Encoded cells, aligned with `columns`.
    pub rows: Vec<Vec<Cell>>,
}

/// Outcome of one executed statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    CreateTable,
    Insert,
    Select(QueryResult),
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the table described by `create`.
    ///
    /// A table with the same name is silently replaced, rows included.
    ///
    /// # Errors
    /// [Error::InvalidDatatype] if a column type is neither `int` nor `text`.
    /// The store is left untouched in that case.
    pub fn create_table(&mut self, create: &CreateTable) -> Result<()> {
        let columns = create
            .columns
            .iter()
            .map(|column| {
                let data_type = DataType::from_type_name(&column.data_type.text)
                    .ok_or_else(|| Error::InvalidDatatype(column.data_type.text.clone()))?;
                Ok(ColumnDef {
                    name: column.name.text.clone(),
                    data_type,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let name = create.name.text.clone();
        if self.tables.contains_key(&name) {
            debug!("replacing existing table {name:?}");
        }
        debug!("created table {name:?} with {} columns", columns.len());

        let table = Table::new(name.clone(), Schema { columns });
        self.tables.insert(name, table);
        Ok(())
    }

    /// Appends one row to the target table.
    ///
    /// Numeric literals are stored as 4-byte big-endian integers and string
    /// literals as their raw bytes. Binary expressions are skipped, so the
    /// row ends up shorter than the schema; identifiers are stored as empty
    /// cells.
    ///
    /// # Errors
    /// - [Error::TableDoesNotExist] for an unknown table.
    /// - [Error::MissingValues] when the value count differs from the column count.
    /// - [Error::InvalidInteger] for a numeric literal that is not an `i32`.
    pub fn insert(&mut self, insert: &InsertInto) -> Result<()> {
        let table = self
            .tables
            .get_mut(&insert.table.text)
            .ok_or_else(|| Error::TableDoesNotExist(insert.table.text.clone()))?;

        if insert.values.len() != table.schema.len() {
            return Err(Error::MissingValues {
                expected: table.schema.len(),
                found: insert.values.len(),
            });
        }

        let mut row = Vec::with_capacity(insert.values.len());
        for value in &insert.values {
            let Some(literal) = value.as_literal() else {
                warn!("skipping non-literal value {value} in INSERT INTO {}", table.name);
                continue;
            };
            row.push(literal_to_cell(literal)?);
        }

        table.push_row(row);
        debug!("inserted row #{} into {:?}", table.row_count(), table.name);
        Ok(())
    }

    /// Projects every row of the source table.
    ///
    /// Only column names (and `*`) can be projected; any other expression is
    /// skipped with a warning. Projections are evaluated per row, so a table
    /// without rows yields an empty result with no columns, whatever the
    /// projection names.
    ///
    /// # Example
    /// ```
    /// use minisql::{Cell, MemoryBackend};
    /// use minisql::backend::ExecutionResult;
    ///
    /// let mut backend = MemoryBackend::new();
    /// let results = backend
    ///     .run("CREATE TABLE t (a int, b text); INSERT INTO t VALUES (1, 'x'); SELECT b, a FROM t")
    ///     .unwrap();
    ///
    /// let ExecutionResult::Select(result) = &results[2] else { panic!() };
    /// assert_eq!(result.rows, vec![vec![Cell::from_text("x"), Cell::from_int(1)]]);
    /// ```
    ///
    /// # Errors
    /// - [Error::TableDoesNotExist] for an unknown table, or an empty name
    ///   without a `FROM` clause.
    /// - [Error::ColumnDoesNotExist] for a name missing from the schema,
    ///   once the table holds a row.
    pub fn select(&self, select: &Select) -> Result<QueryResult> {
        let from = select.from.as_ref().map_or("", |table| table.text.as_str());
        let table = self
            .tables
            .get(from)
            .ok_or_else(|| Error::TableDoesNotExist(from.to_string()))?;

        if table.row_count() == 0 {
            debug!("selected 0 rows from {:?}", table.name);
            return Ok(QueryResult::default());
        }

        let projection = resolve_projection(table, &select.items)?;

        let rows: Vec<Vec<Cell>> = table
            .rows()
            .iter()
            .map(|row| {
                projection
                    .iter()
                    .map(|(idx, _)| row.get(*idx).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        let columns = projection.into_iter().map(|(_, column)| column).collect();

        debug!("selected {} rows from {:?}", rows.len(), table.name);
        Ok(QueryResult { columns, rows })
    }

    /// Executes one parsed statement.
    pub fn execute(&mut self, statement: &Statement) -> Result<ExecutionResult> {
        match statement {
            Statement::CreateTable(create) => {
                self.create_table(create)?;
                Ok(ExecutionResult::CreateTable)
            }
            Statement::InsertInto(insert) => {
                self.insert(insert)?;
                Ok(ExecutionResult::Insert)
            }
            Statement::Select(select) => self.select(select).map(ExecutionResult::Select),
        }
    }

    /// Parses `sql` and executes its statements in order.
    ///
    /// # Errors
    /// Stops at the first failing statement. Statements before it stay applied.
    pub fn run(&mut self, sql: &str) -> Result<Vec<ExecutionResult>> {
        let ast = parse(sql)?;
        ast.statements
            .iter()
            .map(|statement| self.execute(statement))
            .collect()
    }

    /// Retrieves a reference to a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Names of every registered table, sorted.
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Bytes allocated on the heap by the store.
    pub fn memory_usage(&self) -> usize {
        allocative::size_of_unique_allocated_data(self)
    }
}

/// Maps each projected item to a source column index and its result column.
fn resolve_projection(table: &Table, items: &[SelectItem]) -> Result<Vec<(usize, ResultColumn)>> {
    let mut projection = Vec::new();

    for item in items {
        match item {
            SelectItem::Wildcard => {
                projection.extend(table.schema.columns.iter().enumerate().map(|(idx, col)| {
                    (
                        idx,
                        ResultColumn {
                            name: col.name.clone(),
                            data_type: col.data_type,
                        },
                    )
                }));
            }
            SelectItem::Expression {
                expression: Expression::Literal(token),
                alias,
            } if token.kind == TokenKind::Identifier => {
                let idx = table
                    .schema
                    .position(&token.text)
                    .ok_or_else(|| Error::ColumnDoesNotExist(token.text.clone()))?;
                let col = &table.schema.columns[idx];
                let name = alias.as_ref().map_or(&col.name, |alias| &alias.text);
                projection.push((
                    idx,
                    ResultColumn {
                        name: name.clone(),
                        data_type: col.data_type,
                    },
                ));
            }
            SelectItem::Expression { expression, .. } => {
                warn!("skipping projection {expression}: only column names can be selected");
            }
        }
    }

    Ok(projection)
}

fn literal_to_cell(token: &Token) -> Result<Cell> {
    match token.kind {
        TokenKind::Numeric => token
            .text
            .parse::<i32>()
            .map(Cell::from_int)
            .map_err(|_| Error::InvalidInteger(token.text.clone())),
        TokenKind::String => Ok(Cell::from_text(&token.text)),
        _ => {
            warn!("identifier {token} has no value, storing an empty cell");
            Ok(Cell::default())
        }
    }
}

impl fmt::Display for QueryResult {
    /// Renders the result as a text table:
    ///
    /// ```text
    /// | id | name |
    /// =============
    /// | 1 | Alice |
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header: String = self
            .columns
            .iter()
            .map(|col| format!("| {} ", col.name))
            .chain(std::iter::once("|".to_string()))
            .collect();
        writeln!(f, "{header}")?;
        writeln!(f, "{}", "=".repeat(header.chars().count()))?;

        for row in &self.rows {
            write!(f, "|")?;
            for (cell, col) in row.iter().zip(&self.columns) {
                write!(f, " {} |", cell.display(col.data_type))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
