//! Kiln - Template Engine
//!
//! Templates are text with embedded directives. Each template is compiled
//! into a small render-script program which is then run against a [`Store`]
//! of data.
//!
//! ```
//! use kiln::{Options, Store};
//! use serde_json::json;
//!
//! let text = "<%~ users <ul> %><li><%= name %></li><%~ %>";
//! let store = Store::new().with_must("users", json!([{"name": "ana"}, {"name": "bo"}]));
//!
//! let output = kiln::render(text, &store, &Options::new()).unwrap();
//! assert_eq!(output, "<ul><li>ana</li><li>bo</li></ul>");
//! ```
mod cache;
mod compile;
mod engine;
mod escape;
mod loader;
pub mod log;
mod options;
mod pipe;
mod region;
mod render;
mod script;
mod store;
mod syntax;

pub use cache::{Artifact, Cache, MemoryCache};
pub use compile::{resolve_include, Template};
pub use engine::Engine;
pub use escape::escape_html;
pub use loader::{FileSystem, Loader, MemoryLoader};
pub use options::{Encoding, Escape, Options};
pub use store::Store;
pub use syntax::{Delimiters, Marker, Modifier};

use log::Error;

/// Compile the given text into a [`Template`] with a default [`Engine`].
///
/// # Errors
///
/// Returns an [`Error`] when the text contains a malformed directive.
#[inline]
pub fn compile(text: &str, options: &Options) -> Result<Template, Error> {
    Engine::default().compile(text, options)
}

/// Compile and render the given text with a default [`Engine`].
///
/// # Errors
///
/// Returns an [`Error`] when compilation or rendering fails.
///
/// # Examples
///
/// ```
/// use kiln::{Options, Store};
///
/// let store = Store::new().with_must("n", 2);
/// let output = kiln::render("<%? n > 1 %>many<%? ? %>one<%? %>", &store, &Options::new());
///
/// assert_eq!(output.unwrap(), "many");
/// ```
#[inline]
pub fn render(text: &str, store: &Store, options: &Options) -> Result<String, Error> {
    Engine::default().render_text(text, store, options)
}
