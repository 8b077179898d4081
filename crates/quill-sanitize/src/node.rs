//! Node tree representation for article bodies.
//!
//! A tree is built fresh for every render from parser output. Filtering never
//! mutates a tree in place; [`crate::Sanitizer`] always produces a new one.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::context::{Article, BenefitAds};

/// Attributes of a standard markup element (name → value, keys unique).
pub type Attributes = BTreeMap<String, String>;

/// Props of a custom component (name → value, keys unique).
pub type Props = BTreeMap<String, PropValue>;

/// Node in an article tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// Text content.
    Text {
        /// The text itself (unescaped).
        text: String,
    },
    /// Standard markup element such as `p` or `a`.
    Element(Element),
    /// Application widget such as a paywall or an ad slot.
    Component(Component),
    /// Parser placeholder for a literal hard line break. Carries no key.
    Placeholder,
    /// Line-break element.
    LineBreak,
    /// Invocation of the caller's default override component.
    Override {
        /// Children passed to the override.
        children: Vec<Node>,
    },
}

impl Node {
    /// Create a text node.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(Node::count).sum::<usize>()
    }

    /// Child nodes (empty for leaves).
    #[must_use]
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Element(element) => &element.children,
            Self::Component(component) => &component.children,
            Self::Override { children } => children,
            Self::Text { .. } | Self::Placeholder | Self::LineBreak => &[],
        }
    }

    /// Concatenated text of this subtree.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text { text } => out.push_str(text),
            Self::LineBreak | Self::Placeholder => out.push('\n'),
            _ => {
                for child in self.children() {
                    child.collect_text(out);
                }
            }
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<Component> for Node {
    fn from(component: Component) -> Self {
        Self::Component(component)
    }
}

/// Standard markup element.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Element {
    /// Tag name as written by the author (case preserved).
    pub tag: String,
    /// Element attributes.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: Attributes,
    /// Child nodes in document order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Element {
    /// Create a new element with the given tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Add a single attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Set children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Append a child.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Get an attribute value by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// Custom application component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    /// What the component is.
    pub kind: ComponentKind,
    /// Component props.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub props: Props,
    /// Child nodes in document order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Component {
    /// Create a component of the given kind with no props.
    #[must_use]
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            props: Props::new(),
            children: Vec::new(),
        }
    }

    /// Add a single prop.
    #[must_use]
    pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    /// Set children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Get a text prop by name.
    #[must_use]
    pub fn text_prop(&self, name: &str) -> Option<&str> {
        match self.props.get(name) {
            Some(PropValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    /// Get a boolean prop by name.
    #[must_use]
    pub fn bool_prop(&self, name: &str) -> Option<bool> {
        match self.props.get(name) {
            Some(PropValue::Bool(value)) => Some(*value),
            _ => None,
        }
    }
}

/// Closed set of custom component kinds.
///
/// Dispatch happens on this enum, never on a runtime name string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Img,
    Embed,
    Iframe,
    Pre,
    Poll,
    Paywall,
    SubscribeNow,
    Ad,
    /// Application-specific widget without a dedicated projection.
    Custom(String),
}

impl ComponentKind {
    /// Map a component name to its kind (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "img" => Self::Img,
            "embed" => Self::Embed,
            "iframe" => Self::Iframe,
            "pre" => Self::Pre,
            "poll" => Self::Poll,
            "paywall" => Self::Paywall,
            "subscribenow" => Self::SubscribeNow,
            "ad" => Self::Ad,
            _ => Self::Custom(lower),
        }
    }

    /// Lower-cased registration name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Img => "img",
            Self::Embed => "embed",
            Self::Iframe => "iframe",
            Self::Pre => "pre",
            Self::Poll => "poll",
            Self::Paywall => "paywall",
            Self::SubscribeNow => "subscribenow",
            Self::Ad => "ad",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value of a component prop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropValue {
    Text(String),
    Bool(bool),
    Article(Box<Article>),
    Ads(Vec<BenefitAds>),
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Article> for PropValue {
    fn from(value: Article) -> Self {
        Self::Article(Box::new(value))
    }
}

impl From<Vec<BenefitAds>> for PropValue {
    fn from(value: Vec<BenefitAds>) -> Self {
        Self::Ads(value)
    }
}
