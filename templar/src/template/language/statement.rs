//! Template statement: either literal text or an interpolated expression.
use super::super::{Context, Error, Token, TokenWithContext};
use super::Expression;

use std::iter::{Iterator, Peekable};

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    // Text copied into the output as-is.
    Text(String),
    // `{{ expression }}`, the value is written into the output.
    Print(Expression),
}

impl Statement {
    /// Evaluate the statement given the context.
    pub fn evaluate(&self, context: &Context) -> Result<String, Error> {
        match self {
            Statement::Text(text) => Ok(text.clone()),
            Statement::Print(expression) => Ok(expression.evaluate(context)?.to_string()),
        }
    }

    /// Parse a single statement.
    pub fn parse(
        iter: &mut Peekable<impl Iterator<Item = TokenWithContext>>,
    ) -> Result<Self, Error> {
        let next = iter.next().ok_or(Error::Eof("statement"))?;

        match next.token() {
            Token::Text(text) => Ok(Statement::Text(text)),

            Token::BlockStart => {
                if let Some(Token::BlockEnd) = iter.peek().map(|next| next.token()) {
                    return Err(Error::EmptyExpression(next.line(), next.column()));
                }

                let expression = Expression::parse(iter)?;
                let end = iter.next().ok_or(Error::Eof("interpolation"))?;

                match end.token() {
                    Token::BlockEnd => Ok(Statement::Print(expression)),
                    _ => Err(Error::WrongToken(end, Token::BlockEnd)),
                }
            }

            _ => Err(Error::Syntax(next)),
        }
    }
}
