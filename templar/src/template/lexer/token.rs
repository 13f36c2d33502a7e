use super::Value;

/// A template language token, e.g. a piece of text or `+`.
#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    // e.g. `<html><body></body></html>`
    Text(String),
    // e.g. `{{ logged_in }}`
    Variable(String),
    // e.g. `{{ "hello world" }}` or `{{ 5 }}`
    Value(Value),
    // `{{`
    BlockStart,
    // `}}`
    BlockEnd,
    Dot,
    And,
    Or,
    Not,
    Plus,
    Minus,
    Mod,
    Div,
    Mult,
    Equals,
    NotEquals,
    GreaterThan,
    GreaterEqualThan,
    LessThan,
    LessEqualThan,
    SquareBracketStart,
    SquareBracketEnd,
    Comma,
    RoundBracketStart,
    RoundBracketEnd,
}

impl Token {
    /// Number of characters the token occupies in the source,
    /// used to underline it in error messages.
    pub fn len(&self) -> usize {
        match self {
            Token::Variable(name) => name.chars().count(),
            Token::Value(Value::String(s)) => s.chars().count() + 2,
            Token::Value(value) => value.to_string().chars().count(),
            Token::Text(text) => text.chars().count(),
            Token::BlockStart | Token::BlockEnd => 2,
            Token::And
            | Token::Or
            | Token::Equals
            | Token::NotEquals
            | Token::GreaterEqualThan
            | Token::LessEqualThan => 2,
            _ => 1,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Token::Text(text) => write!(f, "{}", text),
            Token::Variable(name) => write!(f, "{}", name),
            Token::Value(Value::String(s)) => write!(f, "\"{}\"", s),
            Token::Value(value) => write!(f, "{}", value),
            Token::BlockStart => write!(f, "block start"),
            Token::BlockEnd => write!(f, "block end"),
            Token::Dot => write!(f, "."),
            Token::And => write!(f, "&&"),
            Token::Or => write!(f, "||"),
            Token::Not => write!(f, "!"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Mod => write!(f, "%"),
            Token::Div => write!(f, "/"),
            Token::Mult => write!(f, "*"),
            Token::Equals => write!(f, "=="),
            Token::NotEquals => write!(f, "!="),
            Token::GreaterThan => write!(f, ">"),
            Token::GreaterEqualThan => write!(f, ">="),
            Token::LessThan => write!(f, "<"),
            Token::LessEqualThan => write!(f, "<="),
            Token::SquareBracketStart => write!(f, "["),
            Token::SquareBracketEnd => write!(f, "]"),
            Token::Comma => write!(f, ","),
            Token::RoundBracketStart => write!(f, "("),
            Token::RoundBracketEnd => write!(f, ")"),
        }
    }
}
