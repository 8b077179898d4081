//! Markdown to node tree conversion.
//!
//! Walks pulldown-cmark events and builds the unsanitized node tree that the
//! filter consumes. Raw HTML is tokenized and merged into the same tree, so
//! `<Paywall>` opened in one HTML block and closed in a later one wraps the
//! markdown in between.

use std::collections::BTreeSet;

use pulldown_cmark::{Alignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use quill_sanitize::{Component, ComponentKind, Element, Node, PropValue};

use crate::html_tag::{HtmlToken, is_void_element, tokenize};

/// Component names recognized when no registry is supplied.
const DEFAULT_REGISTRATIONS: &[&str] = &["poll", "paywall", "subscribenow", "embed", "iframe", "img"];

/// Names of tags that become custom components instead of plain elements.
///
/// Keys are lower-cased, so `<Paywall>` and `<paywall>` both match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRegistry {
    names: BTreeSet<String>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            names: BTreeSet::new(),
        }
    }

    /// Register a component name.
    pub fn register(&mut self, name: &str) {
        self.names.insert(name.to_ascii_lowercase());
    }

    /// Register a component name (builder form).
    #[must_use]
    pub fn with(mut self, name: &str) -> Self {
        self.register(name);
        self
    }

    /// Check whether a tag name is registered (case-insensitive).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_ascii_lowercase())
    }

    /// Iterate over registered names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        DEFAULT_REGISTRATIONS
            .iter()
            .fold(Self::empty(), |registry, name| registry.with(name))
    }
}

impl<S: AsRef<str>> Extend<S> for ComponentRegistry {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for name in iter {
            self.register(name.as_ref());
        }
    }
}

/// Markdown parser producing [`Node`] trees.
///
/// # Example
///
/// ```
/// use quill_renderer::MarkdownParser;
/// use quill_sanitize::{Element, Node};
///
/// let nodes = MarkdownParser::new().parse("Hello *world*");
/// assert_eq!(
///     nodes,
///     vec![Node::from(
///         Element::new("p")
///             .with_child(Node::text("Hello "))
///             .with_child(Element::new("em").with_child(Node::text("world")))
///     )]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct MarkdownParser {
    registry: ComponentRegistry,
    gfm: bool,
}

impl MarkdownParser {
    /// Create a parser with GFM enabled and the default component registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: ComponentRegistry::default(),
            gfm: true,
        }
    }

    /// Replace the component registry.
    #[must_use]
    pub fn with_registry(mut self, registry: ComponentRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Component registry in use.
    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Parse markdown into top-level nodes.
    #[must_use]
    pub fn parse(&self, markdown: &str) -> Vec<Node> {
        let mut builder = TreeBuilder::new(&self.registry);
        for event in Parser::new_ext(markdown, self.parser_options()) {
            builder.event(event);
        }
        builder.finish()
    }
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Where an open frame came from.
#[derive(Debug, PartialEq, Eq)]
enum Origin {
    Root,
    Markdown,
    /// Raw HTML tag (lower-cased name).
    Html(String),
}

/// Node under construction.
#[derive(Debug)]
enum Pending {
    Root(Vec<Node>),
    Element(Element),
    Component(Component),
}

impl Pending {
    fn children_mut(&mut self) -> &mut Vec<Node> {
        match self {
            Self::Root(children) => children,
            Self::Element(element) => &mut element.children,
            Self::Component(component) => &mut component.children,
        }
    }

    fn into_node(self) -> Option<Node> {
        match self {
            Self::Root(_) => None,
            Self::Element(element) => Some(Node::Element(element)),
            Self::Component(component) => Some(Node::Component(component)),
        }
    }
}

#[derive(Debug)]
struct Frame {
    origin: Origin,
    pending: Pending,
}

/// Stack-based tree construction from markdown events.
struct TreeBuilder<'r> {
    registry: &'r ComponentRegistry,
    stack: Vec<Frame>,
    alignments: Vec<Alignment>,
    cell_index: usize,
    in_table_head: bool,
}

impl<'r> TreeBuilder<'r> {
    fn new(registry: &'r ComponentRegistry) -> Self {
        Self {
            registry,
            stack: vec![Frame {
                origin: Origin::Root,
                pending: Pending::Root(Vec::new()),
            }],
            alignments: Vec::new(),
            cell_index: 0,
            in_table_head: false,
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while self.stack.len() > 1 {
            self.pop();
        }
        match self.stack.pop().map(|frame| frame.pending) {
            Some(Pending::Root(children)) => children,
            _ => Vec::new(),
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.push_text(&text),
            Event::Code(code) => {
                let element = Element::new("code").with_child(Node::text(code.as_ref()));
                self.push_node(element.into());
            }
            Event::Html(html) => self.raw_html(&html, true),
            Event::InlineHtml(html) => self.raw_html(&html, false),
            Event::SoftBreak => self.push_text("\n"),
            Event::HardBreak => self.push_node(Node::Placeholder),
            Event::Rule => self.push_node(Element::new("hr").into()),
            Event::TaskListMarker(checked) => {
                let mut input = Element::new("input").with_attr("type", "checkbox");
                if checked {
                    input = input.with_attr("checked", "checked");
                }
                self.push_node(input.into());
            }
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not supported
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.open_element(Element::new("p")),
            Tag::Heading { level, classes, .. } => {
                let mut heading = Element::new(heading_tag(level));
                if !classes.is_empty() {
                    let joined = classes
                        .iter()
                        .map(std::ops::Deref::deref)
                        .collect::<Vec<&str>>();
                    heading = heading.with_attr("className", joined.join(" "));
                }
                self.open_element(heading);
            }
            Tag::BlockQuote(_) => self.open_element(Element::new("blockquote")),
            Tag::CodeBlock(kind) => {
                let mut code = Element::new("code");
                if let CodeBlockKind::Fenced(info) = kind {
                    let lang = info.split_whitespace().next().unwrap_or_default();
                    if !lang.is_empty() {
                        code = code.with_attr("className", format!("language-{lang}"));
                    }
                }
                self.open_element(Element::new("pre"));
                self.open_element(code);
            }
            Tag::List(Some(_)) => self.open_element(Element::new("ol")),
            Tag::List(None) => self.open_element(Element::new("ul")),
            Tag::Item => self.open_element(Element::new("li")),
            Tag::Table(alignments) => {
                self.alignments = alignments;
                self.open_element(Element::new("table"));
            }
            Tag::TableHead => {
                self.in_table_head = true;
                self.cell_index = 0;
                self.open_element(Element::new("thead"));
                self.open_element(Element::new("tr"));
            }
            Tag::TableRow => {
                self.cell_index = 0;
                self.open_element(Element::new("tr"));
            }
            Tag::TableCell => {
                let tag = if self.in_table_head { "th" } else { "td" };
                let mut cell = Element::new(tag);
                if let Some(align) = self.alignments.get(self.cell_index).and_then(align_value) {
                    cell = cell.with_attr("align", align);
                }
                self.open_element(cell);
            }
            Tag::Emphasis => self.open_element(Element::new("em")),
            Tag::Strong => self.open_element(Element::new("strong")),
            Tag::Strikethrough => self.open_element(Element::new("del")),
            Tag::Superscript => self.open_element(Element::new("sup")),
            Tag::Subscript => self.open_element(Element::new("sub")),
            Tag::Link { dest_url, .. } => {
                self.open_element(Element::new("a").with_attr("href", dest_url.as_ref()));
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                // Alt text arrives as children; folded into a prop on close
                if self.registry.contains("img") {
                    let mut img = Component::new(ComponentKind::Img).with_prop("src", dest_url.as_ref());
                    if !title.is_empty() {
                        img = img.with_prop("title", title.as_ref());
                    }
                    self.open(Origin::Markdown, Pending::Component(img));
                } else {
                    let mut img = Element::new("img").with_attr("src", dest_url.as_ref());
                    if !title.is_empty() {
                        img = img.with_attr("title", title.as_ref());
                    }
                    self.open_element(img);
                }
            }
            Tag::FootnoteDefinition(_)
            | Tag::HtmlBlock
            | Tag::MetadataBlock(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::BlockQuote(_)
            | TagEnd::List(_)
            | TagEnd::Item
            | TagEnd::TableRow
            | TagEnd::TableCell
            | TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Strikethrough
            | TagEnd::Superscript
            | TagEnd::Subscript
            | TagEnd::Link => self.close_markdown(),
            TagEnd::CodeBlock => {
                self.close_markdown();
                self.close_markdown();
            }
            TagEnd::TableHead => {
                self.close_markdown();
                self.close_markdown();
                self.in_table_head = false;
                self.open_element(Element::new("tbody"));
            }
            TagEnd::Table => {
                self.close_markdown();
                self.close_markdown();
                self.alignments.clear();
            }
            TagEnd::Image => self.close_image(),
            TagEnd::FootnoteDefinition
            | TagEnd::HtmlBlock
            | TagEnd::MetadataBlock(_)
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition => {}
        }
        if matches!(tag, TagEnd::TableCell) {
            self.cell_index += 1;
        }
    }

    /// Merge a raw HTML fragment into the tree.
    ///
    /// Whitespace-only text in block-level HTML is layout, not content.
    fn raw_html(&mut self, html: &str, block: bool) {
        for token in tokenize(html) {
            match token {
                HtmlToken::Text(text) => {
                    if !(block && text.trim().is_empty()) {
                        self.push_text(&text);
                    }
                }
                HtmlToken::Open {
                    name,
                    attrs,
                    self_closing,
                } => self.open_html(&name, attrs, self_closing),
                HtmlToken::Close(name) => self.close_html(&name),
            }
        }
    }

    fn open_html(&mut self, name: &str, attrs: Vec<(String, String)>, self_closing: bool) {
        let attrs = attrs
            .into_iter()
            .map(|(key, value)| (prop_name(key), value));

        let pending = if self.registry.contains(name) {
            let mut component = Component::new(ComponentKind::from_name(name));
            component.props = attrs.map(|(k, v)| (k, PropValue::Text(v))).collect();
            Pending::Component(component)
        } else {
            let mut element = Element::new(name);
            element.attrs = attrs.collect();
            Pending::Element(element)
        };

        if self_closing || is_void_element(name) {
            if let Some(node) = pending.into_node() {
                self.push_node(node);
            }
        } else {
            self.open(Origin::Html(name.to_ascii_lowercase()), pending);
        }
    }

    /// Close the nearest matching raw HTML frame.
    ///
    /// The search stops at the innermost markdown frame, so an HTML block at
    /// the top level may span several markdown blocks. Stray close tags are
    /// ignored.
    fn close_html(&mut self, name: &str) {
        let origin = Origin::Html(name.to_ascii_lowercase());
        let found = self
            .stack
            .iter()
            .rev()
            .take_while(|frame| frame.origin != Origin::Markdown)
            .any(|frame| frame.origin == origin);
        if !found {
            return;
        }

        while let Some(frame) = self.stack.pop_if(|frame| frame.origin != Origin::Root) {
            let done = frame.origin == origin;
            self.attach(frame);
            if done {
                break;
            }
        }
    }

    /// Close the innermost markdown frame along with any unclosed HTML inside it.
    fn close_markdown(&mut self) {
        while let Some(frame) = self.stack.pop_if(|frame| frame.origin != Origin::Root) {
            let markdown = frame.origin == Origin::Markdown;
            self.attach(frame);
            if markdown {
                return;
            }
        }
    }

    /// Close an image frame, folding its text children into the alt text.
    fn close_image(&mut self) {
        while self
            .stack
            .last()
            .is_some_and(|frame| matches!(frame.origin, Origin::Html(_)))
        {
            self.pop();
        }
        let Some(frame) = self.stack.pop_if(|frame| frame.origin == Origin::Markdown) else {
            return;
        };
        let node = match frame.pending {
            Pending::Component(mut img) => {
                let alt = take_text(&mut img.children);
                if !alt.is_empty() {
                    img.props.insert("alt".to_owned(), PropValue::Text(alt));
                }
                Node::Component(img)
            }
            Pending::Element(mut img) => {
                let alt = take_text(&mut img.children);
                if !alt.is_empty() {
                    img.attrs.insert("alt".to_owned(), alt);
                }
                Node::Element(img)
            }
            Pending::Root(_) => return,
        };
        self.push_node(node);
    }

    fn open_element(&mut self, element: Element) {
        self.open(Origin::Markdown, Pending::Element(element));
    }

    fn open(&mut self, origin: Origin, pending: Pending) {
        self.stack.push(Frame { origin, pending });
    }

    /// Pop the top frame and attach it to its parent. The root frame stays.
    fn pop(&mut self) {
        if let Some(frame) = self.stack.pop_if(|frame| frame.origin != Origin::Root) {
            self.attach(frame);
        }
    }

    fn attach(&mut self, frame: Frame) {
        if let Some(node) = frame.pending.into_node() {
            self.push_node(node);
        }
    }

    fn push_node(&mut self, node: Node) {
        if let Some(frame) = self.stack.last_mut() {
            frame.pending.children_mut().push(node);
        }
    }

    fn push_text(&mut self, text: &str) {
        let Some(frame) = self.stack.last_mut() else {
            return;
        };
        let children = frame.pending.children_mut();
        if let Some(Node::Text { text: previous }) = children.last_mut() {
            previous.push_str(text);
        } else {
            children.push(Node::text(text));
        }
    }
}

/// Map an HTML attribute name to its prop name.
fn prop_name(name: String) -> String {
    if name.eq_ignore_ascii_case("class") {
        "className".to_owned()
    } else {
        name
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

fn align_value(alignment: &Alignment) -> Option<&'static str> {
    match alignment {
        Alignment::None => None,
        Alignment::Left => Some("left"),
        Alignment::Center => Some("center"),
        Alignment::Right => Some("right"),
    }
}

/// Drain children into their concatenated text.
fn take_text(children: &mut Vec<Node>) -> String {
    children.drain(..).map(|node| node.text_content()).collect()
}
