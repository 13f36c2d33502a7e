//! Mathematical operation between data types.
use super::super::lexer::{Token, Value};

use std::cmp::Ordering;

/// List of supported operations, e.g. addition, equality, etc.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Op {
    Not,
    And,
    Or,
    Add,
    Sub,
    Mult,
    Div,
    Mod,
    Equals,
    NotEquals,
    GreaterThan,
    GreaterEqualThan,
    LessThan,
    LessEqualThan,
}

impl PartialOrd for Op {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let self_prec = self.precedence();
        let other_prec = other.precedence();
        self_prec.partial_cmp(&other_prec)
    }
}

impl Op {
    /// Lowest binding operator precedence, i.e. the largest number.
    pub const LOWEST: u8 = 12;

    /// Convert a language token to an op. If the token
    /// isn't an op, `None` is returned.
    pub fn from_token(token: Token) -> Option<Self> {
        Option::<Self>::from(token)
    }

    /// Is this a binary operator, i.e. an operation between two terms?
    pub fn binary(&self) -> bool {
        !matches!(self, Op::Not)
    }

    /// Evaluate the operation on a value.
    pub fn evaluate_unary(&self, value: &Value) -> Value {
        match self {
            Op::Not => Value::Boolean(!value.truthy()),
            Op::Sub => match value {
                Value::Integer(integer) => Value::Integer(integer.wrapping_neg()),
                Value::Float(float) => Value::Float(-float),
                _ => Value::Null,
            },
            Op::Add => value.clone(),
            _ => Value::Null,
        }
    }

    /// Combine two values into one using the operation.
    pub fn evaluate_binary(&self, left: &Value, right: &Value) -> Value {
        match self {
            Op::Equals => Value::Boolean(left == right),
            Op::NotEquals => Value::Boolean(left != right),
            Op::LessThan => Value::Boolean(left < right),
            Op::LessEqualThan => Value::Boolean(left <= right),
            Op::GreaterThan => Value::Boolean(left > right),
            Op::GreaterEqualThan => Value::Boolean(left >= right),
            Op::And => Value::Boolean(left.truthy() && right.truthy()),
            Op::Or => Value::Boolean(left.truthy() || right.truthy()),
            Op::Add => left.add(right),
            Op::Sub => left.sub(right),
            Op::Mult => left.mul(right),
            Op::Div => left.div(right),
            Op::Mod => left.rem(right),
            Op::Not => Value::Null,
        }
    }

    /// Calculate operator precedence, i.e. in an expression with multiple
    /// operations, determine their order of execution. Lower binds tighter.
    // Source: <https://en.cppreference.com/w/c/language/operator_precedence>
    pub fn precedence(&self) -> u8 {
        match self {
            Op::Not => 1,
            Op::Mult | Op::Div | Op::Mod => 3,
            Op::Add | Op::Sub => 4,
            Op::GreaterThan | Op::GreaterEqualThan | Op::LessThan | Op::LessEqualThan => 6,
            Op::Equals | Op::NotEquals => 7,
            Op::And => 11,
            Op::Or => 12,
        }
    }
}

impl From<Token> for Option<Op> {
    fn from(token: Token) -> Option<Op> {
        Some(match token {
            Token::Not => Op::Not,
            Token::And => Op::And,
            Token::Or => Op::Or,
            Token::Equals => Op::Equals,
            Token::NotEquals => Op::NotEquals,
            Token::GreaterThan => Op::GreaterThan,
            Token::GreaterEqualThan => Op::GreaterEqualThan,
            Token::LessThan => Op::LessThan,
            Token::LessEqualThan => Op::LessEqualThan,
            Token::Plus => Op::Add,
            Token::Minus => Op::Sub,
            Token::Mult => Op::Mult,
            Token::Div => Op::Div,
            Token::Mod => Op::Mod,
            _ => return None,
        })
    }
}
