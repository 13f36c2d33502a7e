//! Template compiler.
//!
//! Templates are HTML (or any text) with expressions placed between interpolation
//! delimiters, `{{` and `}}` by default. Compiling a template parses it once; rendering
//! it evaluates every expression against the variables and writes the result in place.
//!
//! # Example
//!
//! ```
//! # use templar::template::*;
//! let template = Template::from_str("<h1>{{ title }}</h1>").unwrap();
//! let mut context = Context::new();
//!
//! context.set("title", "Hello from Templar!").unwrap();
//!
//! let rendered = template.render(&context).unwrap();
//!
//! assert_eq!(rendered, "<h1>Hello from Templar!</h1>");
//! ```
pub mod context;
pub mod error;
pub mod language;
pub mod lexer;
pub mod syntax;

pub use context::{Context, IntoContext};
pub use error::Error;
pub use lexer::{Lexer, ToTemplateValue, Token, TokenWithContext, Tokenize, Value};
pub use syntax::Syntax;

use language::Program;

/// Compiled template, ready to be rendered any number of times.
#[derive(Clone, Debug)]
pub struct Template {
    program: Program,
}

impl Template {
    /// Compile a template written with the given delimiters.
    pub fn compile(source: &str, syntax: &Syntax) -> Result<Self, Error> {
        syntax.validate()?;

        Ok(Template {
            program: Program::from_str(source, syntax)?,
        })
    }

    /// Compile a template written with the default `{{ }}` delimiters.
    pub fn from_str(source: &str) -> Result<Self, Error> {
        Self::compile(source, &Syntax::default())
    }

    pub fn render(&self, context: impl IntoContext) -> Result<String, Error> {
        let context = context.into_context()?;

        self.program.evaluate(&context)
    }

    pub fn render_default(&self) -> Result<String, Error> {
        self.program.evaluate(&Context::default())
    }
}
