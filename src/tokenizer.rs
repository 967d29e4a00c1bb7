use std::fmt;

use crate::error::LexError;

/// A 1-based position in the source text. `column` counts characters and
/// restarts at 1 after every newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Reserved words, including the operator keywords `=`, `!=` and `||`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Select,
    From,
    As,
    Insert,
    Into,
    Values,
    Create,
    Table,
    Int,
    Text,
    And,
    Or,
    /// `=`
    Eq,
    /// `!=`
    Neq,
    /// `||`, string concatenation.
    Concat,
}

impl Keyword {
    /// Canonical spelling, used as the token text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::From => "from",
            Self::As => "as",
            Self::Insert => "insert",
            Self::Into => "into",
            Self::Values => "values",
            Self::Create => "create",
            Self::Table => "table",
            Self::Int => "int",
            Self::Text => "text",
            Self::And => "and",
            Self::Or => "or",
            Self::Eq => "=",
            Self::Neq => "!=",
            Self::Concat => "||",
        }
    }

    /// Case-insensitive lookup of a whole word.
    fn from_word(word: &str) -> Option<Self> {
        match word.to_lowercase().as_str() {
            "select" => Some(Self::Select),
            "from" => Some(Self::From),
            "as" => Some(Self::As),
            "insert" => Some(Self::Insert),
            "into" => Some(Self::Into),
            "values" => Some(Self::Values),
            "create" => Some(Self::Create),
            "table" => Some(Self::Table),
            "int" => Some(Self::Int),
            "text" => Some(Self::Text),
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    LeftParen,
    RightParen,
    Comma,
    Semicolon,
    Asterisk,
    Plus,
}

impl Symbol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::Asterisk => "*",
            Self::Plus => "+",
        }
    }

    fn from_char(ch: char) -> Option<Self> {
        match ch {
            '(' => Some(Self::LeftParen),
            ')' => Some(Self::RightParen),
            ',' => Some(Self::Comma),
            ';' => Some(Self::Semicolon),
            '*' => Some(Self::Asterisk),
            '+' => Some(Self::Plus),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword(Keyword),
    Symbol(Symbol),
    Identifier,
    Numeric,
    String,
}

/// A located token. Two tokens are equal when kind and text match; the
/// location only serves diagnostics.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    /// Keywords use their canonical lowercase spelling, strings exclude
    /// the surrounding quotes.
    pub text: String,
    pub location: Location,
}

impl Token {
    /// Builds an unlocated token, mostly useful to compare against.
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            location: Location::default(),
        }
    }

    pub fn keyword(keyword: Keyword) -> Self {
        Self::new(TokenKind::Keyword(keyword), keyword.as_str())
    }

    pub fn symbol(symbol: Symbol) -> Self {
        Self::new(TokenKind::Symbol(symbol), symbol.as_str())
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Self::new(TokenKind::Identifier, name)
    }

    pub fn numeric(digits: impl Into<String>) -> Self {
        Self::new(TokenKind::Numeric, digits)
    }

    pub fn string(text: impl Into<String>) -> Self {
        Self::new(TokenKind::String, text)
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    pub fn is_symbol(&self, symbol: Symbol) -> bool {
        self.kind == TokenKind::Symbol(symbol)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.text == other.text
    }
}

impl Eq for Token {}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::String => write!(f, "'{}'", self.text),
            _ => f.write_str(&self.text),
        }
    }
}

/// Converts SQL text into located [Token]s.
///
/// # Errors
/// Returns a [LexError] at the first position that matches no token shape.
///
/// # Example
/// ```
/// use minisql::tokenizer::{lex, Keyword, Token};
/// let tokens = lex("SELECT name FROM users").unwrap();
/// assert_eq!(tokens[0], Token::keyword(Keyword::Select));
/// assert_eq!(tokens[1], Token::identifier("name"));
/// assert_eq!(tokens[3].location.column, 18);
/// ```
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    Tokenizer::new(source).tokenize()
}

/// A lexical scanner over the characters of the source text.
pub struct Tokenizer {
    input: Vec<char>,
    position: usize,
    line: u32,
    column: u32,
}

impl Tokenizer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Processes the entire input and returns the tokens in source order.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        let location = self.location();
        let ch = self.current_char();

        let (kind, text) = if let Some(keyword) = self.read_operator() {
            (TokenKind::Keyword(keyword), keyword.as_str().to_string())
        } else if let Some(symbol) = Symbol::from_char(ch) {
            self.advance();
            (TokenKind::Symbol(symbol), symbol.as_str().to_string())
        } else if ch == '\'' {
            (TokenKind::String, self.read_string(location)?)
        } else if ch.is_ascii_digit() {
            (TokenKind::Numeric, self.read_number())
        } else if ch.is_alphabetic() || ch == '_' {
            let word = self.read_word();
            match Keyword::from_word(&word) {
                Some(keyword) => (TokenKind::Keyword(keyword), keyword.as_str().to_string()),
                None => (TokenKind::Identifier, word),
            }
        } else {
            return Err(LexError {
                message: format!("unexpected character {ch:?}"),
                location,
            });
        };

        Ok(Token {
            kind,
            text,
            location,
        })
    }

    // --- Navigation Helpers ---

    fn current_char(&self) -> char {
        self.input[self.position]
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn advance(&mut self) {
        if self.current_char() == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.position += 1;
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn location(&self) -> Location {
        Location {
            line: self.line,
            column: self.column,
        }
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    // --- Extraction Logic ---

    /// Matches the operator keywords, two-character spellings first.
    fn read_operator(&mut self) -> Option<Keyword> {
        let keyword = match (self.current_char(), self.peek_char()) {
            ('!', Some('=')) => Keyword::Neq,
            ('|', Some('|')) => Keyword::Concat,
            ('=', _) => Keyword::Eq,
            _ => return None,
        };
        for _ in 0..keyword.as_str().len() {
            self.advance();
        }
        Some(keyword)
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while !self.is_at_end()
            && (self.current_char().is_alphanumeric() || self.current_char() == '_')
        {
            word.push(self.current_char());
            self.advance();
        }
        word
    }

    /// Digits with at most one decimal point. A second dot ends the literal.
    fn read_number(&mut self) -> String {
        let mut number = String::new();
        let mut has_dot = false;

        while !self.is_at_end() {
            let ch = self.current_char();
            if ch == '.' && !has_dot {
                has_dot = true;
            } else if !ch.is_ascii_digit() {
                break;
            }
            number.push(ch);
            self.advance();
        }

        number
    }

    /// Single-quoted text; everything up to the next quote is taken verbatim.
    fn read_string(&mut self, start: Location) -> Result<String, LexError> {
        self.advance(); // opening quote

        let mut string = String::new();
        while !self.is_at_end() && self.current_char() != '\'' {
            string.push(self.current_char());
            self.advance();
        }

        if self.is_at_end() {
            return Err(LexError {
                message: "unterminated string".into(),
                location: start,
            });
        }

        self.advance(); // closing quote
        Ok(string)
    }
}
