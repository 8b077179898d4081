//! Fail-closed allow-list filter for article node trees.
//!
//! Article bodies are untrusted. This crate takes the node tree produced by a
//! markdown parser and projects it onto a restricted tree that only contains
//! allow-listed elements, allow-listed custom components and a per-type set of
//! attributes.
//!
//! # Architecture
//!
//! - [`Node`]: closed tagged union of text, standard elements, custom
//!   components and line-break markers
//! - [`RenderContext`]: article metadata and viewer state for one render call
//! - [`AllowListPolicy`]: static allow-list tables
//! - [`Sanitizer`]: the filter itself
//!
//! The filter never fails. Anything that is not allowed renders as nothing.
//!
//! # Example
//!
//! ```
//! use quill_sanitize::{Element, Node, RenderContext, sanitize};
//!
//! let ctx = RenderContext::default();
//! let link = Element::new("a")
//!     .with_attr("href", "https://example.com")
//!     .with_attr("onclick", "steal()")
//!     .with_child(Node::text("text"));
//!
//! let clean = sanitize(&link.into(), &ctx).unwrap();
//! assert_eq!(
//!     clean,
//!     Element::new("a")
//!         .with_attr("href", "https://example.com")
//!         .with_child(Node::text("text"))
//!         .into()
//! );
//! ```

mod context;
mod filter;
mod node;
mod policy;

pub use context::{
    Advertisement, Article, BenefitAds, Byline, ContextError, Organization, RenderContext,
};
pub use filter::{Sanitizer, sanitize, sanitize_children};
pub use node::{Attributes, Component, ComponentKind, Element, Node, PropValue, Props};
pub use policy::{
    AllowListPolicy, BASE_ATTRIBUTES, DEFAULT_COMPONENTS, SAFE_HREF_PREFIXES, STANDARD_TAGS,
};
