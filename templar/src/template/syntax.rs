//! Interpolation delimiters.
use super::Error;
use serde::{Deserialize, Serialize};

/// Delimiters surrounding an interpolated expression, `{{` and `}}` by default.
///
/// Each cache carries its own syntax, so two caches in the same process can
/// compile templates written with different delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Syntax {
    open: String,
    close: String,
}

impl Syntax {
    pub fn new(open: impl ToString, close: impl ToString) -> Result<Self, Error> {
        let syntax = Self {
            open: open.to_string(),
            close: close.to_string(),
        };

        syntax.validate()?;

        Ok(syntax)
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }

    /// Check the delimiters can be used by the lexer.
    pub fn validate(&self) -> Result<(), Error> {
        if self.open.is_empty() || self.close.is_empty() {
            Err(Error::EmptyDelimiter)
        } else {
            Ok(())
        }
    }
}

impl Default for Syntax {
    fn default() -> Self {
        Self {
            open: "{{".into(),
            close: "}}".into(),
        }
    }
}
