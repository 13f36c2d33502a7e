//! Templar is a cache of HTML templates that live behind URLs. Templates are registered by name,
//! fetched and compiled once, and rendered by name as many times as needed.
//!
//! # Getting started
//!
//! Templar is built on top of Tokio:
//!
//! ```bash
//! cargo add templar
//! cargo add tokio@1 --features full
//! ```
//!
//! The types you need most are available with one import:
//!
//! ```
//! use templar::prelude::*;
//! ```
//!
//! ### Templates
//!
//! Templates are text with expressions between `{{` and `}}`. Variables are inserted as-is,
//! without HTML escaping:
//!
//! ```
//! use templar::prelude::*;
//!
//! let template = Template::from_str("<h1>Hello {{ name }}!</h1>").unwrap();
//! let html = template.render([("name", "World")]).unwrap();
//!
//! assert_eq!(html, "<h1>Hello World!</h1>");
//! ```
//!
//! ### Template cache
//!
//! Creating a cache starts fetching every registered template in the background:
//!
//! ```rust,ignore
//! use templar::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     Logger::init();
//!
//!     let cache = TemplateCache::builder([
//!         ("header", "https://example.com/views/header.html"),
//!         ("list", "https://example.com/views/list.html"),
//!     ])
//!     .on_all_loaded(|| println!("ready"))
//!     .create()?;
//!
//!     let html = cache.render_async("header", [("title", "Inbox")]).await?;
//!     println!("{}", html);
//!
//!     Ok(())
//! }
//! ```
pub mod cache;
pub mod colors;
pub mod config;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod template;
pub mod transport;

pub use cache::{Builder, LoadEvent, OnAllLoaded, Registry, Target, TemplateCache};
pub use error::Error;

/// Wrapper around async traits to make them easy to use.
pub use async_trait::async_trait;
/// Tokio is an asynchronous runtime for Rust.
pub use tokio;

/// Convert the first letter of the string to uppercase lettering.
pub fn capitalize(string: &str) -> String {
    let mut iter = string.chars();
    match iter.next() {
        None => String::new(),
        Some(letter) => letter.to_uppercase().chain(iter).collect(),
    }
}

/// Remove unsafe characters from a string printed
/// inside an HTML template.
pub fn safe_html(string: &str) -> String {
    string.replace('<', "&lt;").replace('>', "&gt;")
}
