use super::{Token, TokenWithContext};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("syntax error")]
    Syntax(TokenWithContext),

    #[error("expression syntax error")]
    ExpressionSyntax(TokenWithContext),

    #[error("expected token \"{1}\", but have token \"{found}\" instead", found = .0.token())]
    WrongToken(TokenWithContext, Token),

    #[error("reached end of file while performing \"{0}\", did you forget a closing delimiter?")]
    Eof(&'static str),

    #[error("expression is nested too deeply")]
    TooDeep(TokenWithContext),

    #[error("interpolation at line {0}, column {1} is empty")]
    EmptyExpression(usize, usize),

    #[error("interpolation delimiters must not be empty")]
    EmptyDelimiter,

    #[error("variable \"{0}\" is not defined or in scope")]
    UndefinedVariable(String),

    #[error("method \"{0}\" is not defined for {1}")]
    UnknownMethod(String, &'static str),

    #[error("variables must be a hash, got {0} instead")]
    NotAHash(&'static str),

    #[error("serialization error")]
    SerializationError,

    #[error("{0}")]
    Pretty(String),
}

impl Error {
    /// Rewrite a syntax error into a message that shows the offending line
    /// of the template and points at the token, e.g.:
    ///
    /// ```text
    /// ---> greet:1:10
    ///
    ///   |
    /// 1 | Hello {{ # }}
    ///   |          ^ syntax error
    /// ```
    pub fn pretty(self, source: &str, name: Option<&str>) -> Self {
        let token = match self {
            Error::Syntax(ref token) => token,
            Error::ExpressionSyntax(ref token) => token,
            Error::WrongToken(ref token, _) => token,
            Error::TooDeep(ref token) => token,
            _ => {
                if let Some(name) = name {
                    let prefix = "---> ";
                    return Error::Pretty(format!(
                        "{}{}\n\n{}{}",
                        prefix,
                        name,
                        " ".repeat(prefix.len()),
                        self
                    ));
                } else {
                    return self;
                }
            }
        };

        let error_msg = match self {
            Error::Syntax(_) => "syntax error",
            Error::ExpressionSyntax(_) => "expression syntax error",
            Error::WrongToken(_, _) => "unexpected token",
            Error::TooDeep(_) => "nested too deeply",
            _ => "",
        };

        let context = match source.lines().nth(token.line().max(1) - 1) {
            Some(context) => context,
            None => return self,
        };

        let leading_spaces = context.len() - context.trim_start().len();
        let underline = " ".repeat(token.column().saturating_sub(1 + leading_spaces))
            + &"^".repeat(token.token().len().max(1))
            + &format!(" {}", error_msg);

        let line_number = format!("{} | ", token.line());
        let underline_offset = " ".repeat(token.line().to_string().len()) + " | ";

        let header = if let Some(name) = name {
            format!("---> {}:{}:{}\n\n", name, token.line(), token.column())
        } else {
            "".to_string()
        };

        Error::Pretty(format!(
            "{}{}\n{}{}\n{}{}",
            header,
            underline_offset.trim_end(),
            line_number,
            context.trim(),
            underline_offset,
            underline
        ))
    }
}
