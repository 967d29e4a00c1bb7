use std::fmt;

use crate::tokenizer::Token;

/// A parsed program: statements in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ast {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(CreateTable),
    InsertInto(InsertInto),
    Select(Select),
}

/// `CREATE TABLE <name> ( [<column> <type>], ... )`
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub name: Token,
    pub columns: Vec<ColumnDefinition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: Token,
    /// Any keyword token; the backend decides which ones are valid types.
    pub data_type: Token,
}

/// `INSERT INTO <table> VALUES ( <expression>, ... )`
#[derive(Debug, Clone, PartialEq)]
pub struct InsertInto {
    pub table: Token,
    pub values: Vec<Expression>,
}

/// `SELECT <item>, ... [FROM <table>]`
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub items: Vec<SelectItem>,
    pub from: Option<Token>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    /// `*`
    Wildcard,
    /// `<expression> [AS <alias>]`
    Expression {
        expression: Expression,
        alias: Option<Token>,
    },
}

impl From<Expression> for SelectItem {
    fn from(expression: Expression) -> Self {
        SelectItem::Expression {
            expression,
            alias: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// An identifier, numeric or string token.
    Literal(Token),
    Binary {
        left: Box<Expression>,
        right: Box<Expression>,
        operator: Token,
    },
}

impl Expression {
    pub fn binary(left: Expression, right: Expression, operator: Token) -> Self {
        Expression::Binary {
            left: Box::new(left),
            right: Box::new(right),
            operator,
        }
    }

    /// Returns the token if this is a [Expression::Literal].
    pub fn as_literal(&self) -> Option<&Token> {
        match self {
            Expression::Literal(token) => Some(token),
            Expression::Binary { .. } => None,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(token) => write!(f, "{token}"),
            Expression::Binary {
                left,
                right,
                operator,
            } => write!(f, "({left} {operator} {right})"),
        }
    }
}
