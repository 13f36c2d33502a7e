//! Types and traits which, when imported, make working with Templar ergonomic.
//!
//! ```
//! use templar::prelude::*;
//! ```
pub use crate::cache::{LoadEvent, Registry, Target, TemplateCache};
pub use crate::config::Config;
pub use crate::error::Error;
pub use crate::logging::Logger;
pub use crate::template::{Context, IntoContext, Syntax, Template, ToTemplateValue, Value};
pub use crate::transport::{HttpTransport, Transport};

/// A macro to easily implement async traits methods.
pub use async_trait::async_trait;

pub use tokio;
