//! Markdown front end and HTML output for sanitized article bodies.
//!
//! This crate turns untrusted markdown into HTML in three steps:
//! - [`MarkdownParser`]: pulldown-cmark events and raw HTML merged into one
//!   [`quill_sanitize::Node`] tree, with registered tags as components
//! - [`quill_sanitize::Sanitizer`]: the allow-list filter
//! - [`HtmlWriter`]: serialization, with components delegated to an
//!   [`Overrides`] table for the output target
//!
//! [`ArticleRenderer`] runs all three.
//!
//! # Example
//!
//! ```
//! use quill_renderer::{ArticleRenderer, Overrides};
//! use quill_sanitize::RenderContext;
//!
//! let ctx = RenderContext::default();
//! let result = ArticleRenderer::new().render_markdown(
//!     "[click](javascript:alert(1)) or [read](https://example.com)",
//!     &ctx,
//!     &Overrides::web(),
//! );
//! assert_eq!(result.html, r#"<p> or <a href="https://example.com">read</a></p>"#);
//! ```

mod entities;
mod html;
mod html_tag;
mod overrides;
mod parser;
mod renderer;

pub use html::{HtmlWriter, escape_html, push_attr};
pub use overrides::{ComponentRenderer, DefaultOverride, Overrides};
pub use parser::{ComponentRegistry, MarkdownParser};
pub use renderer::{ArticleRenderer, RenderResult};
