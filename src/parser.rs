//! Recursive-descent parser with precedence climbing for expressions.
//!
//! Every sub-parser is a pure function over `(tokens, cursor)`. It returns
//! `Ok(Some((node, next_cursor)))` when it matched, `Ok(None)` when the
//! tokens at `cursor` do not start its construct (nothing is consumed), and
//! `Err` once it has committed and the input breaks the grammar.

use log::debug;

use crate::ast::*;
use crate::error::ParseError;
use crate::tokenizer::{Keyword, Symbol, Token, TokenKind, lex};

type Parsed<T> = Result<Option<(T, usize)>, ParseError>;

/// Signature shared by the item parsers handed to [parse_list]. The last
/// argument is the set of tokens that end the item.
type ItemParser<T> = fn(&[Token], usize, &[Token]) -> Parsed<T>;

/// Parses SQL text into an [Ast].
///
/// Statements are separated by at least one `;`. The last statement may
/// omit it.
///
/// # Example
/// ```
/// use minisql::ast::Statement;
/// use minisql::parser::parse;
///
/// let ast = parse("CREATE TABLE t (a int); INSERT INTO t VALUES (1);").unwrap();
/// assert_eq!(ast.statements.len(), 2);
/// assert!(matches!(ast.statements[1], Statement::InsertInto(_)));
/// ```
pub fn parse(source: &str) -> Result<Ast, ParseError> {
    let tokens = lex(source)?;
    let semicolon = Token::symbol(Symbol::Semicolon);

    let mut ast = Ast::default();
    let mut cursor = 0;
    while cursor < tokens.len() {
        let Some((statement, next)) = parse_statement(&tokens, cursor)? else {
            return Err(syntax_error(&tokens, cursor, "expected statement"));
        };
        ast.statements.push(statement);
        cursor = next;

        let mut has_semicolon = false;
        while expect_token(&tokens, cursor, &semicolon) {
            cursor += 1;
            has_semicolon = true;
        }

        if !has_semicolon && cursor < tokens.len() {
            return Err(syntax_error(
                &tokens,
                cursor,
                "expected semicolon delimiter between statements",
            ));
        }
    }

    Ok(ast)
}

/// Tries SELECT, then INSERT, then CREATE TABLE. The three grammars start
/// with distinct keywords, so at most one of them can match.
fn parse_statement(tokens: &[Token], cursor: usize) -> Parsed<Statement> {
    if let Some((select, next)) = parse_select(tokens, cursor)? {
        return Ok(Some((Statement::Select(select), next)));
    }
    if let Some((insert, next)) = parse_insert(tokens, cursor)? {
        return Ok(Some((Statement::InsertInto(insert), next)));
    }
    if let Some((create, next)) = parse_create_table(tokens, cursor)? {
        return Ok(Some((Statement::CreateTable(create), next)));
    }
    Ok(None)
}

fn parse_select(tokens: &[Token], cursor: usize) -> Parsed<Select> {
    if !at_keyword(tokens, cursor, Keyword::Select) {
        return Ok(None);
    }

    let from_keyword = Token::keyword(Keyword::From);
    let delimiters = [from_keyword.clone(), Token::symbol(Symbol::Semicolon)];
    let (items, mut cursor) = parse_list(
        tokens,
        cursor + 1,
        &delimiters,
        parse_select_item,
        "expression",
    )?;

    let mut from = None;
    if expect_token(tokens, cursor, &from_keyword) {
        let Some((table, next)) = parse_token(tokens, cursor + 1, TokenKind::Identifier) else {
            return Err(syntax_error(tokens, cursor + 1, "expected table name"));
        };
        from = Some(table);
        cursor = next;
    }

    Ok(Some((Select { items, from }, cursor)))
}

fn parse_select_item(tokens: &[Token], cursor: usize, delimiters: &[Token]) -> Parsed<SelectItem> {
    if expect_token(tokens, cursor, &Token::symbol(Symbol::Asterisk)) {
        return Ok(Some((SelectItem::Wildcard, cursor + 1)));
    }

    let as_keyword = Token::keyword(Keyword::As);
    let mut item_delimiters = delimiters.to_vec();
    item_delimiters.push(as_keyword.clone());

    let Some((expression, mut cursor)) = parse_expression(tokens, cursor, &item_delimiters, 0)?
    else {
        return Ok(None);
    };

    let mut alias = None;
    if expect_token(tokens, cursor, &as_keyword) {
        let Some((name, next)) = parse_token(tokens, cursor + 1, TokenKind::Identifier) else {
            return Err(syntax_error(tokens, cursor + 1, "expected alias"));
        };
        alias = Some(name);
        cursor = next;
    }

    Ok(Some((SelectItem::Expression { expression, alias }, cursor)))
}

fn parse_insert(tokens: &[Token], cursor: usize) -> Parsed<InsertInto> {
    if !at_keyword(tokens, cursor, Keyword::Insert) {
        return Ok(None);
    }
    let cursor = expect(tokens, cursor + 1, &Token::keyword(Keyword::Into), "expected INTO")?;

    let Some((table, cursor)) = parse_token(tokens, cursor, TokenKind::Identifier) else {
        return Err(syntax_error(tokens, cursor, "expected table name"));
    };

    let cursor = expect(tokens, cursor, &Token::keyword(Keyword::Values), "expected VALUES")?;
    let cursor = expect(
        tokens,
        cursor,
        &Token::symbol(Symbol::LeftParen),
        "expected opening paren",
    )?;

    let closing = Token::symbol(Symbol::RightParen);
    let (values, cursor) = parse_list(tokens, cursor, &[closing.clone()], parse_value, "expression")?;
    let cursor = expect(tokens, cursor, &closing, "expected closing paren")?;

    Ok(Some((InsertInto { table, values }, cursor)))
}

fn parse_value(tokens: &[Token], cursor: usize, delimiters: &[Token]) -> Parsed<Expression> {
    parse_expression(tokens, cursor, delimiters, 0)
}

fn parse_create_table(tokens: &[Token], cursor: usize) -> Parsed<CreateTable> {
    if !at_keyword(tokens, cursor, Keyword::Create) {
        return Ok(None);
    }
    let cursor = expect(tokens, cursor + 1, &Token::keyword(Keyword::Table), "expected TABLE")?;

    let Some((name, cursor)) = parse_token(tokens, cursor, TokenKind::Identifier) else {
        return Err(syntax_error(tokens, cursor, "expected table name"));
    };

    let cursor = expect(
        tokens,
        cursor,
        &Token::symbol(Symbol::LeftParen),
        "expected opening paren",
    )?;

    let closing = Token::symbol(Symbol::RightParen);
    let (columns, cursor) = parse_list(
        tokens,
        cursor,
        &[closing.clone()],
        parse_column_definition,
        "column definition",
    )?;
    let cursor = expect(tokens, cursor, &closing, "expected closing paren")?;

    Ok(Some((CreateTable { name, columns }, cursor)))
}

fn parse_column_definition(
    tokens: &[Token],
    cursor: usize,
    _delimiters: &[Token],
) -> Parsed<ColumnDefinition> {
    let Some((name, cursor)) = parse_token(tokens, cursor, TokenKind::Identifier) else {
        return Ok(None);
    };

    match tokens.get(cursor) {
        Some(data_type) if matches!(data_type.kind, TokenKind::Keyword(_)) => Ok(Some((
            ColumnDefinition {
                name,
                data_type: data_type.clone(),
            },
            cursor + 1,
        ))),
        _ => Err(syntax_error(tokens, cursor, "expected column type")),
    }
}

/// Reads comma-separated items until one of `delimiters` (or the end of
/// input) is reached. The delimiter itself is not consumed. An empty list is
/// legal; a leading, doubled or trailing comma is not.
fn parse_list<T>(
    tokens: &[Token],
    initial_cursor: usize,
    delimiters: &[Token],
    parse_item: ItemParser<T>,
    expected_item: &str,
) -> Result<(Vec<T>, usize), ParseError> {
    let comma = Token::symbol(Symbol::Comma);
    let mut item_delimiters = delimiters.to_vec();
    item_delimiters.push(comma.clone());

    let mut cursor = initial_cursor;
    let mut items = Vec::new();
    loop {
        match tokens.get(cursor) {
            None => break,
            Some(token) if delimiters.contains(token) => break,
            Some(_) => {}
        }

        if !items.is_empty() {
            if !expect_token(tokens, cursor, &comma) {
                return Err(syntax_error(tokens, cursor, "expected comma"));
            }
            cursor += 1;
        }

        let Some((item, next)) = parse_item(tokens, cursor, &item_delimiters)? else {
            return Err(syntax_error(tokens, cursor, &format!("expected {expected_item}")));
        };
        items.push(item);
        cursor = next;
    }

    Ok((items, cursor))
}

/// Parses an expression with precedence climbing.
///
/// Operators binding no tighter than `min_binding_power` are left for the
/// enclosing call, which makes equal-power chains fold to the left.
fn parse_expression(
    tokens: &[Token],
    cursor: usize,
    delimiters: &[Token],
    min_binding_power: u8,
) -> Parsed<Expression> {
    let Some((mut expression, mut cursor)) = parse_primary(tokens, cursor)? else {
        return Ok(None);
    };

    while let Some(token) = tokens.get(cursor) {
        if delimiters.contains(token) {
            break;
        }

        let power = binding_power(token);
        if power == 0 {
            return Err(syntax_error(tokens, cursor, "expected binary operation"));
        }
        if power <= min_binding_power {
            break;
        }

        let Some((right, next)) = parse_expression(tokens, cursor + 1, delimiters, power)? else {
            return Err(syntax_error(tokens, cursor + 1, "expected expression"));
        };
        expression = Expression::binary(expression, right, token.clone());
        cursor = next;
    }

    Ok(Some((expression, cursor)))
}

fn parse_primary(tokens: &[Token], cursor: usize) -> Parsed<Expression> {
    let Some(token) = tokens.get(cursor) else {
        return Ok(None);
    };

    if token.is_symbol(Symbol::LeftParen) {
        let closing = Token::symbol(Symbol::RightParen);
        let Some((expression, next)) =
            parse_expression(tokens, cursor + 1, std::slice::from_ref(&closing), 0)?
        else {
            return Err(syntax_error(tokens, cursor + 1, "expected expression"));
        };
        let next = expect(tokens, next, &closing, "expected closing paren")?;
        return Ok(Some((expression, next)));
    }

    match token.kind {
        TokenKind::Identifier | TokenKind::Numeric | TokenKind::String => {
            Ok(Some((Expression::Literal(token.clone()), cursor + 1)))
        }
        _ => Ok(None),
    }
}

/// AND and OR bind loosest; comparison, concatenation and addition share one
/// level. Zero marks a token that is not a binary operator.
fn binding_power(token: &Token) -> u8 {
    match token.kind {
        TokenKind::Keyword(Keyword::And | Keyword::Or) => 1,
        TokenKind::Keyword(Keyword::Eq | Keyword::Neq | Keyword::Concat)
        | TokenKind::Symbol(Symbol::Plus) => 3,
        _ => 0,
    }
}

// --- Cursor helpers ---

fn expect_token(tokens: &[Token], cursor: usize, expected: &Token) -> bool {
    tokens.get(cursor) == Some(expected)
}

fn at_keyword(tokens: &[Token], cursor: usize, keyword: Keyword) -> bool {
    tokens.get(cursor).is_some_and(|token| token.is_keyword(keyword))
}

/// Consumes `expected` or fails with `message`.
fn expect(
    tokens: &[Token],
    cursor: usize,
    expected: &Token,
    message: &str,
) -> Result<usize, ParseError> {
    if expect_token(tokens, cursor, expected) {
        Ok(cursor + 1)
    } else {
        Err(syntax_error(tokens, cursor, message))
    }
}

fn parse_token(tokens: &[Token], cursor: usize, kind: TokenKind) -> Option<(Token, usize)> {
    tokens
        .get(cursor)
        .filter(|token| token.kind == kind)
        .map(|token| (token.clone(), cursor + 1))
}

/// Points at the offending token, or at the last token past the end.
fn syntax_error(tokens: &[Token], cursor: usize, message: &str) -> ParseError {
    let found = tokens.get(cursor);
    let error = ParseError::Syntax {
        message: message.to_string(),
        found: found.map(Token::to_string),
        location: found.or(tokens.last()).map(|token| token.location),
    };
    debug!("parse failed: {error}");
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Location;

    fn ident(name: &str) -> Expression {
        Expression::Literal(Token::identifier(name))
    }

    fn select_expressions(sql: &str) -> Vec<Expression> {
        let mut ast = parse(sql).unwrap();
        match ast.statements.remove(0) {
            Statement::Select(select) => select
                .items
                .into_iter()
                .map(|item| match item {
                    SelectItem::Expression { expression, .. } => expression,
                    SelectItem::Wildcard => panic!("Unexpected wildcard"),
                })
                .collect(),
            other => panic!("Expected Select, got {other:?}"),
        }
    }

    fn syntax_message(sql: &str) -> (String, Option<Location>) {
        match parse(sql).unwrap_err() {
            ParseError::Syntax {
                message, location, ..
            } => (message, location),
            other => panic!("Expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_create_table() {
        let ast = parse("CREATE TABLE users (id INT, name TEXT)").unwrap();

        match &ast.statements[0] {
            Statement::CreateTable(ct) => {
                assert_eq!(ct.name, Token::identifier("users"));
                assert_eq!(ct.columns.len(), 2);
                assert_eq!(ct.columns[0].name, Token::identifier("id"));
                assert_eq!(ct.columns[0].data_type, Token::keyword(Keyword::Int));
                assert_eq!(ct.columns[1].name, Token::identifier("name"));
                assert_eq!(ct.columns[1].data_type, Token::keyword(Keyword::Text));
            }
            _ => panic!("Expected CreateTable"),
        }
    }

    #[test]
    fn test_parse_create_table_without_columns() {
        let ast = parse("CREATE TABLE t ()").unwrap();

        assert_eq!(
            ast.statements,
            vec![Statement::CreateTable(CreateTable {
                name: Token::identifier("t"),
                columns: vec![],
            })]
        );
    }

    #[test]
    fn test_parse_create_table_accepts_any_type_keyword() {
        let ast = parse("CREATE TABLE t (a table)").unwrap();

        let Statement::CreateTable(ct) = &ast.statements[0] else {
            panic!("Expected CreateTable");
        };
        assert_eq!(ct.columns[0].data_type, Token::keyword(Keyword::Table));
    }

    #[test]
    fn test_parse_create_table_missing_type() {
        let (message, _) = syntax_message("CREATE TABLE t (a b)");
        assert_eq!(message, "expected column type");
    }

    #[test]
    fn test_parse_insert() {
        let ast = parse("INSERT INTO users VALUES (1, 'Alice', a || b)").unwrap();

        assert_eq!(
            ast.statements,
            vec![Statement::InsertInto(InsertInto {
                table: Token::identifier("users"),
                values: vec![
                    Expression::Literal(Token::numeric("1")),
                    Expression::Literal(Token::string("Alice")),
                    Expression::binary(ident("a"), ident("b"), Token::keyword(Keyword::Concat)),
                ],
            })]
        );
    }

    #[test]
    fn test_parse_insert_empty_values() {
        let ast = parse("insert into t values ()").unwrap();

        let Statement::InsertInto(insert) = &ast.statements[0] else {
            panic!("Expected InsertInto");
        };
        assert!(insert.values.is_empty());
    }

    #[test]
    fn test_parse_insert_missing_closing_paren() {
        let (message, location) = syntax_message("INSERT INTO t VALUES (1, 2");
        assert_eq!(message, "expected closing paren");
        assert_eq!(location, Some(Location { line: 1, column: 26 }));
    }

    #[test]
    fn test_parse_select_with_from() {
        let ast = parse("SELECT a, b FROM t").unwrap();

        assert_eq!(
            ast.statements,
            vec![Statement::Select(Select {
                items: vec![ident("a").into(), ident("b").into()],
                from: Some(Token::identifier("t")),
            })]
        );
    }

    #[test]
    fn test_parse_select_without_from() {
        let ast = parse("SELECT 1, 'x'").unwrap();

        let Statement::Select(select) = &ast.statements[0] else {
            panic!("Expected Select");
        };
        assert_eq!(select.items.len(), 2);
        assert!(select.from.is_none());
    }

    #[test]
    fn test_parse_select_wildcard_and_alias() {
        let ast = parse("SELECT *, a AS b FROM t").unwrap();

        let Statement::Select(select) = &ast.statements[0] else {
            panic!("Expected Select");
        };
        assert_eq!(
            select.items,
            vec![
                SelectItem::Wildcard,
                SelectItem::Expression {
                    expression: ident("a"),
                    alias: Some(Token::identifier("b")),
                },
            ]
        );
    }

    #[test]
    fn test_parse_select_missing_table_name() {
        let (message, _) = syntax_message("SELECT a FROM");
        assert_eq!(message, "expected table name");
    }

    #[test]
    fn test_precedence_or_is_root() {
        let expressions = select_expressions("SELECT a = b OR c");

        assert_eq!(
            expressions,
            vec![Expression::binary(
                Expression::binary(ident("a"), ident("b"), Token::keyword(Keyword::Eq)),
                ident("c"),
                Token::keyword(Keyword::Or),
            )]
        );
    }

    #[test]
    fn test_precedence_tighter_operator_on_the_right() {
        let expressions = select_expressions("SELECT a OR b = c");

        assert_eq!(
            expressions,
            vec![Expression::binary(
                ident("a"),
                Expression::binary(ident("b"), ident("c"), Token::keyword(Keyword::Eq)),
                Token::keyword(Keyword::Or),
            )]
        );
    }

    #[test]
    fn test_left_associativity() {
        let plus = Token::symbol(Symbol::Plus);
        let expressions = select_expressions("SELECT a + b + c");

        assert_eq!(
            expressions,
            vec![Expression::binary(
                Expression::binary(ident("a"), ident("b"), plus.clone()),
                ident("c"),
                plus,
            )]
        );
    }

    #[test]
    fn test_left_associativity_and_or() {
        let expressions = select_expressions("SELECT a AND b OR c");

        assert_eq!(
            expressions,
            vec![Expression::binary(
                Expression::binary(ident("a"), ident("b"), Token::keyword(Keyword::And)),
                ident("c"),
                Token::keyword(Keyword::Or),
            )]
        );
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let expressions = select_expressions("SELECT (a OR b) = c");

        assert_eq!(
            expressions,
            vec![Expression::binary(
                Expression::binary(ident("a"), ident("b"), Token::keyword(Keyword::Or)),
                ident("c"),
                Token::keyword(Keyword::Eq),
            )]
        );
    }

    #[test]
    fn test_nested_parentheses() {
        let expressions = select_expressions("SELECT ((a))");
        assert_eq!(expressions, vec![ident("a")]);
    }

    #[test]
    fn test_unclosed_parenthesis() {
        let (message, _) = syntax_message("SELECT (a + b FROM t");
        assert_eq!(message, "expected binary operation");

        let (message, _) = syntax_message("SELECT (a + b");
        assert_eq!(message, "expected closing paren");
    }

    #[test]
    fn test_missing_operator() {
        let (message, location) = syntax_message("SELECT a b FROM t");
        assert_eq!(message, "expected binary operation");
        assert_eq!(location, Some(Location { line: 1, column: 10 }));
    }

    #[test]
    fn test_dangling_operator() {
        let (message, _) = syntax_message("SELECT a + FROM t");
        assert_eq!(message, "expected expression");
    }

    #[test]
    fn test_stray_leading_comma() {
        let (message, location) = syntax_message("INSERT INTO t VALUES (, 1)");
        assert_eq!(message, "expected expression");
        assert_eq!(location, Some(Location { line: 1, column: 23 }));
    }

    #[test]
    fn test_trailing_comma() {
        let (message, _) = syntax_message("CREATE TABLE t (a int,)");
        assert_eq!(message, "expected column definition");
    }

    #[test]
    fn test_missing_comma_between_columns() {
        let (message, location) = syntax_message("CREATE TABLE t (a int b text)");
        assert_eq!(message, "expected comma");
        assert_eq!(location, Some(Location { line: 1, column: 23 }));
    }

    #[test]
    fn test_multiple_statements() {
        let ast = parse("CREATE TABLE t (a int); INSERT INTO t VALUES (1);; SELECT a FROM t;").unwrap();

        assert_eq!(ast.statements.len(), 3);
        assert!(matches!(ast.statements[0], Statement::CreateTable(_)));
        assert!(matches!(ast.statements[1], Statement::InsertInto(_)));
        assert!(matches!(ast.statements[2], Statement::Select(_)));
    }

    #[test]
    fn test_missing_semicolon_between_statements() {
        let (message, _) = syntax_message("SELECT a FROM t SELECT b FROM t");
        assert_eq!(message, "expected semicolon delimiter between statements");
    }

    #[test]
    fn test_unknown_statement() {
        let (message, location) = syntax_message("DROP TABLE t");
        assert_eq!(message, "expected statement");
        assert_eq!(location, Some(Location { line: 1, column: 1 }));
    }

    #[test]
    fn test_statement_keywords_any_case() {
        let ast = parse("create TABLE t (a INT); Insert into t values (1); sElEcT a from t").unwrap();

        assert!(matches!(ast.statements[0], Statement::CreateTable(_)));
        assert!(matches!(ast.statements[1], Statement::InsertInto(_)));
        assert!(matches!(ast.statements[2], Statement::Select(_)));
    }

    #[test]
    fn test_keyword_text_outside_keyword_token_is_not_a_statement() {
        let (message, _) = syntax_message("'select' a FROM t");
        assert_eq!(message, "expected statement");

        let (message, _) = syntax_message("selected a FROM t");
        assert_eq!(message, "expected statement");
    }

    #[test]
    fn test_empty_source() {
        assert!(parse("").unwrap().statements.is_empty());
        assert!(parse("   ").unwrap().statements.is_empty());
    }

    #[test]
    fn test_lex_error_surfaces_as_parse_error() {
        assert!(matches!(parse("SELECT @"), Err(ParseError::Lex(_))));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let sql = "CREATE TABLE t (a int, b text); SELECT (a || b) = 'x' OR a + 1 AS c FROM t";
        assert_eq!(parse(sql).unwrap(), parse(sql).unwrap());
    }

    #[test]
    fn test_binding_power_table() {
        assert_eq!(binding_power(&Token::keyword(Keyword::And)), 1);
        assert_eq!(binding_power(&Token::keyword(Keyword::Or)), 1);
        assert_eq!(binding_power(&Token::keyword(Keyword::Eq)), 3);
        assert_eq!(binding_power(&Token::keyword(Keyword::Neq)), 3);
        assert_eq!(binding_power(&Token::keyword(Keyword::Concat)), 3);
        assert_eq!(binding_power(&Token::symbol(Symbol::Plus)), 3);
        assert_eq!(binding_power(&Token::symbol(Symbol::Asterisk)), 0);
        assert_eq!(binding_power(&Token::identifier("a")), 0);
    }
}
