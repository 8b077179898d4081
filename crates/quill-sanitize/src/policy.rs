//! Static allow-list tables.

use std::collections::BTreeSet;

use crate::node::ComponentKind;

/// Standard element tags that survive filtering.
pub const STANDARD_TAGS: &[&str] = &[
    "a",
    "b",
    "blockquote",
    "code",
    "del",
    "div",
    "em",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "img",
    "p",
    "pre",
    "strong",
    "sup",
    "table",
    "tbody",
    "th",
    "thead",
    "tr",
    "td",
    "li",
    "ul",
    "ol",
    "footer",
    "hr",
    "span",
    "input",
];

/// Attributes kept on every standard element.
pub const BASE_ATTRIBUTES: &[&str] = &["key", "style", "align", "className"];

/// Allowed `href` prefixes. Relative URLs are never allowed.
pub const SAFE_HREF_PREFIXES: &[&str] = &["https://", "http://", "mailto://"];

/// Custom components reachable without extra configuration.
pub const DEFAULT_COMPONENTS: &[&str] = &[
    "embed",
    "iframe",
    "img",
    "pre",
    "poll",
    "paywall",
    "subscribenow",
];

/// Allow-list policy for standard elements and custom components.
pub struct AllowListPolicy;

impl AllowListPolicy {
    /// Check whether a lower-cased tag is a permitted standard element.
    #[must_use]
    pub fn is_standard_tag(tag: &str) -> bool {
        STANDARD_TAGS.contains(&tag)
    }

    /// Check whether an attribute survives on every standard element.
    #[must_use]
    pub fn is_base_attribute(name: &str) -> bool {
        BASE_ATTRIBUTES.contains(&name)
    }

    /// Check whether an anchor target uses an allowed scheme.
    #[must_use]
    pub fn is_safe_href(href: &str) -> bool {
        SAFE_HREF_PREFIXES
            .iter()
            .any(|prefix| href.starts_with(prefix))
    }

    /// Resolve the set of component kinds reachable in one render call.
    ///
    /// Names are compared case-insensitively.
    #[must_use]
    pub fn component_set<I, S>(extra: I) -> BTreeSet<ComponentKind>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        DEFAULT_COMPONENTS
            .iter()
            .map(|name| ComponentKind::from_name(name))
            .chain(
                extra
                    .into_iter()
                    .map(|name| ComponentKind::from_name(name.as_ref())),
            )
            .collect()
    }
}
