//! Template lexer.
//!
//! Splits template source into literal text and the tokens of the expressions
//! placed between the interpolation delimiters, e.g. `{{ user.name }}`.
pub mod token;
pub mod value;

pub use token::Token;
pub use value::{ToTemplateValue, Value};

use super::{Error, Syntax};

/// Token along with its position in the source, used for error reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenWithContext {
    token: Token,
    line: usize,
    column: usize,
}

impl TokenWithContext {
    pub fn new(token: Token, line: usize, column: usize) -> Self {
        Self {
            token,
            line,
            column,
        }
    }

    pub fn token(&self) -> Token {
        self.token.clone()
    }

    /// Line where the token starts, starting at 1.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Column where the token starts, starting at 1.
    pub fn column(&self) -> usize {
        self.column
    }
}

/// Anything that can be turned into a list of template tokens.
pub trait Tokenize {
    fn tokenize_with(&self, syntax: &Syntax) -> Result<Vec<TokenWithContext>, Error>;

    /// Tokenize using the default `{{ }}` delimiters.
    fn tokenize(&self) -> Result<Vec<TokenWithContext>, Error> {
        self.tokenize_with(&Syntax::default())
    }
}

impl Tokenize for &str {
    fn tokenize_with(&self, syntax: &Syntax) -> Result<Vec<TokenWithContext>, Error> {
        Lexer::new(self, syntax).tokens()
    }
}

impl Tokenize for String {
    fn tokenize_with(&self, syntax: &Syntax) -> Result<Vec<TokenWithContext>, Error> {
        Lexer::new(self, syntax).tokens()
    }
}

/// Template lexer.
pub struct Lexer {
    source: Vec<char>,
    open: Vec<char>,
    close: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<TokenWithContext>,
}

impl Lexer {
    /// Create a lexer for the given source and delimiters.
    pub fn new(source: &str, syntax: &Syntax) -> Self {
        Self {
            source: source.chars().collect(),
            open: syntax.open().chars().collect(),
            close: syntax.close().chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: vec![],
        }
    }

    /// Tokenize the whole source.
    pub fn tokens(mut self) -> Result<Vec<TokenWithContext>, Error> {
        let mut text = String::new();
        let (mut text_line, mut text_column) = (self.line, self.column);

        while self.pos < self.source.len() {
            if self.at(&self.open) {
                if !text.is_empty() {
                    self.tokens.push(TokenWithContext::new(
                        Token::Text(std::mem::take(&mut text)),
                        text_line,
                        text_column,
                    ));
                }

                self.push(Token::BlockStart);
                self.advance(self.open.len());
                self.expression()?;

                text_line = self.line;
                text_column = self.column;
            } else {
                text.push(self.source[self.pos]);
                self.advance(1);
            }
        }

        if !text.is_empty() {
            self.tokens.push(TokenWithContext::new(
                Token::Text(text),
                text_line,
                text_column,
            ));
        }

        Ok(self.tokens)
    }

    // Lex one interpolation, up to and including the closing delimiter.
    fn expression(&mut self) -> Result<(), Error> {
        loop {
            self.skip_whitespace();

            if self.pos >= self.source.len() {
                return Err(Error::Eof("interpolation"));
            }

            if self.at(&self.close) {
                self.push(Token::BlockEnd);
                self.advance(self.close.len());
                return Ok(());
            }

            let c = self.source[self.pos];

            match c {
                '"' | '\'' => self.string(c)?,
                '0'..='9' => self.number()?,
                c if c.is_alphabetic() || c == '_' => self.identifier(),
                _ => self.operator(c)?,
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<(), Error> {
        let (line, column) = (self.line, self.column);
        let mut value = String::new();
        self.advance(1);

        loop {
            let c = *self.source.get(self.pos).ok_or(Error::Eof("string"))?;
            self.advance(1);

            match c {
                '\\' => {
                    let escaped = *self.source.get(self.pos).ok_or(Error::Eof("string"))?;
                    self.advance(1);
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        c => c,
                    });
                }
                c if c == quote => break,
                c => value.push(c),
            }
        }

        self.tokens.push(TokenWithContext::new(
            Token::Value(Value::String(value)),
            line,
            column,
        ));

        Ok(())
    }

    fn number(&mut self) -> Result<(), Error> {
        let (line, column) = (self.line, self.column);
        let mut digits = String::new();

        while let Some(c) = self.peek(0).filter(|c| c.is_ascii_digit()) {
            digits.push(c);
            self.advance(1);
        }

        // `list.0.1` is two lookups, not a float.
        let after_dot = matches!(self.tokens.last().map(|t| &t.token), Some(Token::Dot));
        let fraction = !after_dot
            && self.peek(0) == Some('.')
            && self.peek(1).map(|c| c.is_ascii_digit()).unwrap_or(false);

        let value = if fraction {
            digits.push('.');
            self.advance(1);
            while let Some(c) = self.peek(0).filter(|c| c.is_ascii_digit()) {
                digits.push(c);
                self.advance(1);
            }
            digits.parse::<f64>().map(Value::Float).ok()
        } else {
            digits.parse::<i64>().map(Value::Integer).ok()
        };

        match value {
            Some(value) => {
                self.tokens
                    .push(TokenWithContext::new(Token::Value(value), line, column));
                Ok(())
            }
            None => Err(Error::Syntax(TokenWithContext::new(
                Token::Text(digits),
                line,
                column,
            ))),
        }
    }

    fn identifier(&mut self) {
        let (line, column) = (self.line, self.column);
        let mut name = String::new();

        while let Some(c) = self.peek(0).filter(|c| c.is_alphanumeric() || *c == '_') {
            name.push(c);
            self.advance(1);
        }

        let token = match name.as_str() {
            "true" => Token::Value(Value::Boolean(true)),
            "false" => Token::Value(Value::Boolean(false)),
            "null" => Token::Value(Value::Null),
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            _ => Token::Variable(name),
        };

        self.tokens.push(TokenWithContext::new(token, line, column));
    }

    fn operator(&mut self, c: char) -> Result<(), Error> {
        let next = self.peek(1);

        let (token, len) = match (c, next) {
            ('=', Some('=')) => (Token::Equals, 2),
            ('!', Some('=')) => (Token::NotEquals, 2),
            ('<', Some('=')) => (Token::LessEqualThan, 2),
            ('>', Some('=')) => (Token::GreaterEqualThan, 2),
            ('&', Some('&')) => (Token::And, 2),
            ('|', Some('|')) => (Token::Or, 2),
            ('!', _) => (Token::Not, 1),
            ('<', _) => (Token::LessThan, 1),
            ('>', _) => (Token::GreaterThan, 1),
            ('+', _) => (Token::Plus, 1),
            ('-', _) => (Token::Minus, 1),
            ('*', _) => (Token::Mult, 1),
            ('/', _) => (Token::Div, 1),
            ('%', _) => (Token::Mod, 1),
            ('.', _) => (Token::Dot, 1),
            (',', _) => (Token::Comma, 1),
            ('(', _) => (Token::RoundBracketStart, 1),
            (')', _) => (Token::RoundBracketEnd, 1),
            ('[', _) => (Token::SquareBracketStart, 1),
            (']', _) => (Token::SquareBracketEnd, 1),
            (c, _) => {
                return Err(Error::Syntax(TokenWithContext::new(
                    Token::Text(c.to_string()),
                    self.line,
                    self.column,
                )))
            }
        };

        self.push(token);
        self.advance(len);

        Ok(())
    }

    fn push(&mut self, token: Token) {
        self.tokens
            .push(TokenWithContext::new(token, self.line, self.column));
    }

    fn at(&self, delimiter: &[char]) -> bool {
        self.source[self.pos..].starts_with(delimiter)
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.source.get(self.pos + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek(0).map(|c| c.is_whitespace()).unwrap_or(false) {
            self.advance(1);
        }
    }

    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            if let Some(c) = self.source.get(self.pos) {
                if *c == '\n' {
                    self.line += 1;
                    self.column = 1;
                } else {
                    self.column += 1;
                }
                self.pos += 1;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        source
            .tokenize()
            .expect("tokenize")
            .into_iter()
            .map(|t| t.token())
            .collect()
    }

    #[test]
    fn test_text_and_variable() {
        assert_eq!(
            tokens("Hello {{ name }}!"),
            vec![
                Token::Text("Hello ".into()),
                Token::BlockStart,
                Token::Variable("name".into()),
                Token::BlockEnd,
                Token::Text("!".into()),
            ]
        );
    }

    #[test]
    fn test_expression_tokens() {
        assert_eq!(
            tokens(r#"{{ a.b + 1.5 >= 'x}}' && !c }}"#),
            vec![
                Token::BlockStart,
                Token::Variable("a".into()),
                Token::Dot,
                Token::Variable("b".into()),
                Token::Plus,
                Token::Value(Value::Float(1.5)),
                Token::GreaterEqualThan,
                Token::Value(Value::String("x}}".into())),
                Token::And,
                Token::Not,
                Token::Variable("c".into()),
                Token::BlockEnd,
            ]
        );
    }

    #[test]
    fn test_index_after_dot() {
        assert_eq!(
            tokens("{{ list.0.1 }}"),
            vec![
                Token::BlockStart,
                Token::Variable("list".into()),
                Token::Dot,
                Token::Value(Value::Integer(0)),
                Token::Dot,
                Token::Value(Value::Integer(1)),
                Token::BlockEnd,
            ]
        );
    }

    #[test]
    fn test_custom_delimiters() -> Result<(), Error> {
        let syntax = Syntax::new("<%=", "%>")?;
        let tokens = "<p><%= 5 %></p>".tokenize_with(&syntax)?;
        assert_eq!(tokens[2].token(), Token::Value(Value::Integer(5)));
        assert_eq!(tokens.len(), 5);

        // Braces are plain text with other delimiters.
        let tokens = "{{ name }}".tokenize_with(&syntax)?;
        assert_eq!(tokens.len(), 1);
        Ok(())
    }

    #[test]
    fn test_positions() -> Result<(), Error> {
        let tokens = "<p>\n  {{ title }}</p>".tokenize()?;
        let title = &tokens[2];
        assert_eq!(title.token(), Token::Variable("title".into()));
        assert_eq!(title.line(), 2);
        assert_eq!(title.column(), 6);
        Ok(())
    }

    #[test]
    fn test_unclosed() {
        assert!(matches!(
            "Hello {{ name".tokenize(),
            Err(Error::Eof("interpolation"))
        ));
        assert!(matches!(
            r#"{{ "name }}"#.tokenize(),
            Err(Error::Eof("string"))
        ));
    }

    #[test]
    fn test_unknown_character() {
        match "{{ a # b }}".tokenize() {
            Err(Error::Syntax(token)) => {
                assert_eq!(token.token(), Token::Text("#".into()));
                assert_eq!(token.column(), 6);
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }
}
