use super::{
    super::lexer::{Token, TokenWithContext, Value},
    super::Context,
    super::Error,
    Op, Term,
};

use std::iter::{Iterator, Peekable};

/// How deeply expressions can nest: brackets, operators and method calls all count.
pub const MAX_DEPTH: usize = 128;

/// An expression, like `price * quantity` or `user.name.upcase`,
/// which when evaluated produces a single value.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    // Standard `5 + 6`-style expression.
    // It's recursive, so you can have something like `(5 + 6) / (1 - 5)`.
    Binary {
        left: Box<Expression>,
        op: Op,
        right: Box<Expression>,
    },

    Unary {
        op: Op,
        operand: Box<Expression>,
    },

    // Base case for recursive expression parsing, which evaluates to the value
    // of the term, e.g. `5` evalutes to `5` or `variable_name` evalutes to whatever
    // the variable is set to in the context.
    Term {
        term: Term,
    },

    // A list of expressions, e.g.
    // `[1, 2, variable, "hello world"]`
    List {
        terms: Vec<Expression>,
    },

    // Call a method on a value, e.g. `name.upcase` or `tags.join(", ")`.
    // Hash keys and list indices are looked up the same way.
    Function {
        term: Box<Expression>,
        name: String,
        args: Vec<Expression>,
    },
}

impl Expression {
    /// Create new constant expression (term).
    pub fn constant(value: Value) -> Self {
        Self::Term {
            term: Term::constant(value),
        }
    }

    /// Create new variable expression (term).
    pub fn variable(variable: String) -> Self {
        Self::Term {
            term: Term::variable(variable),
        }
    }

    /// Evaluate the expression to a value given the context.
    pub fn evaluate(&self, context: &Context) -> Result<Value, Error> {
        match self {
            Expression::Term { term } => term.evaluate(context),

            Expression::Binary { left, op, right } => {
                let left = left.evaluate(context)?;

                // Don't evaluate the right side if the result is already known.
                match op {
                    Op::And if !left.truthy() => return Ok(Value::Boolean(false)),
                    Op::Or if left.truthy() => return Ok(Value::Boolean(true)),
                    _ => (),
                }

                let right = right.evaluate(context)?;
                Ok(op.evaluate_binary(&left, &right))
            }

            Expression::Unary { op, operand } => {
                let operand = operand.evaluate(context)?;
                Ok(op.evaluate_unary(&operand))
            }

            Expression::List { terms } => {
                let mut list = vec![];
                for term in terms {
                    list.push(term.evaluate(context)?);
                }
                Ok(Value::List(list))
            }

            Expression::Function { term, name, args } => {
                let value = term.evaluate(context)?;
                let args = args
                    .iter()
                    .map(|arg| arg.evaluate(context))
                    .collect::<Result<Vec<Value>, Error>>()?;

                value.call(name, &args)
            }
        }
    }

    /// Parse an expression from the tokens inside an interpolation.
    /// Stops at the first token that can't continue the expression, e.g. the block end.
    pub fn parse(iter: &mut Peekable<impl Iterator<Item = TokenWithContext>>) -> Result<Self, Error> {
        Self::binary(iter, Op::LOWEST, 0)
    }

    // Precedence climbing: only consume operators that bind at least as tight as `limit`.
    fn binary(
        iter: &mut Peekable<impl Iterator<Item = TokenWithContext>>,
        limit: u8,
        depth: usize,
    ) -> Result<Self, Error> {
        let mut left = Self::unary(iter, depth)?;
        let mut depth = depth;

        loop {
            let op = match iter.peek().and_then(|next| Op::from_token(next.token())) {
                Some(op) if op.binary() && op.precedence() <= limit => op,
                _ => break,
            };

            // Each operator nests the expression parsed so far one level deeper.
            let next = iter.next().ok_or(Error::Eof("expression"))?;
            depth = Self::deeper(&next, depth)?;
            let right = Self::binary(iter, op.precedence() - 1, depth)?;

            left = Expression::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn unary(
        iter: &mut Peekable<impl Iterator<Item = TokenWithContext>>,
        depth: usize,
    ) -> Result<Self, Error> {
        let op = match iter.peek().map(|next| next.token()) {
            Some(Token::Not) => Op::Not,
            Some(Token::Minus) => Op::Sub,
            Some(Token::Plus) => Op::Add,
            _ => return Self::postfix(iter, depth),
        };

        let next = iter.next().ok_or(Error::Eof("expression"))?;
        let operand = Self::unary(iter, Self::deeper(&next, depth)?)?;

        Ok(Expression::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    // A term followed by any number of `.method` or `.method(args)` calls.
    fn postfix(
        iter: &mut Peekable<impl Iterator<Item = TokenWithContext>>,
        depth: usize,
    ) -> Result<Self, Error> {
        let mut term = Self::term(iter, depth)?;
        let mut depth = depth;

        while let Some(Token::Dot) = iter.peek().map(|next| next.token()) {
            let dot = iter.next().ok_or(Error::Eof("method call"))?;
            depth = Self::deeper(&dot, depth)?;
            let next = iter.next().ok_or(Error::Eof("method call"))?;

            let name = match next.token() {
                Token::Variable(name) => name,
                Token::Value(Value::Integer(index)) => index.to_string(),
                _ => return Err(Error::ExpressionSyntax(next)),
            };

            let args = match iter.peek().map(|next| next.token()) {
                Some(Token::RoundBracketStart) => {
                    let open = iter.next().ok_or(Error::Eof("method call"))?;
                    Self::sequence(iter, Token::RoundBracketEnd, Self::deeper(&open, depth)?)?
                }
                _ => vec![],
            };

            term = Expression::Function {
                term: Box::new(term),
                name,
                args,
            };
        }

        Ok(term)
    }

    fn term(
        iter: &mut Peekable<impl Iterator<Item = TokenWithContext>>,
        depth: usize,
    ) -> Result<Self, Error> {
        let next = iter.next().ok_or(Error::Eof("term"))?;

        match next.token() {
            Token::RoundBracketStart => {
                let expression = Self::binary(iter, Op::LOWEST, Self::deeper(&next, depth)?)?;
                Self::expect(iter, Token::RoundBracketEnd)?;
                Ok(expression)
            }

            Token::SquareBracketStart => Ok(Expression::List {
                terms: Self::sequence(iter, Token::SquareBracketEnd, Self::deeper(&next, depth)?)?,
            }),

            token => match Term::from_token(token) {
                Some(term) => Ok(Expression::Term { term }),
                None => Err(Error::ExpressionSyntax(next)),
            },
        }
    }

    // Comma-separated expressions, e.g. function arguments or list items.
    // The opening bracket has already been consumed.
    fn sequence(
        iter: &mut Peekable<impl Iterator<Item = TokenWithContext>>,
        end: Token,
        depth: usize,
    ) -> Result<Vec<Self>, Error> {
        let mut items = vec![];

        if iter.peek().map(|next| next.token()) == Some(end.clone()) {
            let _ = iter.next();
            return Ok(items);
        }

        loop {
            items.push(Self::binary(iter, Op::LOWEST, depth)?);

            let next = iter.next().ok_or(Error::Eof("list"))?;
            match next.token() {
                Token::Comma => continue,
                token if token == end => return Ok(items),
                _ => return Err(Error::WrongToken(next, end)),
            }
        }
    }

    // Parsing and evaluating are recursive, so nesting is capped
    // to keep the stack bounded.
    fn deeper(token: &TokenWithContext, depth: usize) -> Result<usize, Error> {
        if depth >= MAX_DEPTH {
            Err(Error::TooDeep(token.clone()))
        } else {
            Ok(depth + 1)
        }
    }

    fn expect(
        iter: &mut Peekable<impl Iterator<Item = TokenWithContext>>,
        expected: Token,
    ) -> Result<(), Error> {
        let next = iter.next().ok_or(Error::Eof("expression"))?;

        if next.token() == expected {
            Ok(())
        } else {
            Err(Error::WrongToken(next, expected))
        }
    }
}
