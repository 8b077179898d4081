//! Fail-closed filter from parser output to a restricted node tree.
//!
//! Anything that is not explicitly allowed renders as nothing: unknown tags,
//! unregistered components, anchors with unsafe targets and non-checkbox
//! inputs are dropped together with their children. Filtering is a
//! projection, so running it on its own output is a no-op.

use std::collections::BTreeSet;

use crate::context::RenderContext;
use crate::node::{Attributes, Component, ComponentKind, Element, Node, PropValue, Props};
use crate::policy::{AllowListPolicy, BASE_ATTRIBUTES};

/// Sanitize a single node. `None` means the node renders as nothing.
///
/// # Example
///
/// ```
/// use quill_sanitize::{Element, Node, RenderContext, sanitize};
///
/// let ctx = RenderContext::default();
/// let script = Element::new("script").with_child(Node::text("alert(1)"));
/// assert_eq!(sanitize(&script.into(), &ctx), None);
/// ```
#[must_use]
pub fn sanitize(node: &Node, ctx: &RenderContext) -> Option<Node> {
    Sanitizer::new(ctx).sanitize(node)
}

/// Sanitize a list of sibling nodes, dropping the ones that render as nothing.
#[must_use]
pub fn sanitize_children(nodes: &[Node], ctx: &RenderContext) -> Vec<Node> {
    Sanitizer::new(ctx).sanitize_children(nodes)
}

/// Allow-list filter bound to one render context.
///
/// The reachable component set is resolved once on construction, so a
/// sanitizer can be reused for every node of a render pass.
#[derive(Debug)]
pub struct Sanitizer<'a> {
    ctx: &'a RenderContext,
    components: BTreeSet<ComponentKind>,
}

impl<'a> Sanitizer<'a> {
    /// Create a sanitizer for the given context.
    #[must_use]
    pub fn new(ctx: &'a RenderContext) -> Self {
        let components = AllowListPolicy::component_set(&ctx.extra_allowed_custom_components);
        tracing::debug!(
            extra_components = ?ctx.extra_allowed_custom_components,
            default_override = ctx.default_override,
            "Sanitizer configured"
        );
        Self { ctx, components }
    }

    /// Check whether a component kind is reachable in this render call.
    #[must_use]
    pub fn allows_component(&self, kind: &ComponentKind) -> bool {
        self.components.contains(kind)
    }

    /// Sanitize a single node.
    #[must_use]
    pub fn sanitize(&self, node: &Node) -> Option<Node> {
        match node {
            Node::Text { .. } | Node::LineBreak => Some(node.clone()),
            // Only meaningful as a direct child of a paragraph.
            Node::Placeholder => None,
            Node::Override { children } => {
                self.ctx.default_override.then(|| Node::Override {
                    children: self.sanitize_children(children),
                })
            }
            Node::Component(component) => self.component(component),
            Node::Element(element) => self.element(element),
        }
    }

    /// Sanitize sibling nodes, preserving order.
    #[must_use]
    pub fn sanitize_children(&self, nodes: &[Node]) -> Vec<Node> {
        nodes.iter().filter_map(|node| self.sanitize(node)).collect()
    }

    fn paragraph_children(&self, nodes: &[Node]) -> Vec<Node> {
        nodes
            .iter()
            .filter_map(|node| match node {
                Node::Placeholder => Some(Node::LineBreak),
                other => self.sanitize(other),
            })
            .collect()
    }

    fn element(&self, element: &Element) -> Option<Node> {
        let tag = element.tag.to_ascii_lowercase();
        if !AllowListPolicy::is_standard_tag(&tag) {
            return None;
        }

        if self.ctx.default_override {
            let children = if tag == "p" {
                self.paragraph_children(&element.children)
            } else {
                self.sanitize_children(&element.children)
            };
            return Some(Node::Override { children });
        }

        let mut attrs = base_attributes(&element.attrs);

        match tag.as_str() {
            "a" => {
                let href = element
                    .attr("href")
                    .filter(|href| AllowListPolicy::is_safe_href(href))?;
                attrs.insert("href".to_owned(), href.to_owned());
            }
            "input" => return checkbox(element),
            _ => {}
        }

        let children = if tag == "p" {
            self.paragraph_children(&element.children)
        } else {
            self.sanitize_children(&element.children)
        };

        Some(Node::Element(Element {
            tag,
            attrs,
            children,
        }))
    }

    fn component(&self, component: &Component) -> Option<Node> {
        if !self.allows_component(&component.kind) {
            return None;
        }

        let source = &component.props;
        let mut props = base_props(source);

        let children = match &component.kind {
            ComponentKind::Img => {
                copy_props(source, &mut props, &["src", "height", "width"]);
                Vec::new()
            }
            ComponentKind::Embed => {
                copy_props(source, &mut props, &["src"]);
                Vec::new()
            }
            ComponentKind::Iframe => {
                copy_props(source, &mut props, &["src", "title", "allow"]);
                Vec::new()
            }
            // Paid content stays inside the paywall; the target decides whether to show it.
            ComponentKind::Paywall => {
                props = self.paywall_props();
                self.sanitize_children(&component.children)
            }
            ComponentKind::SubscribeNow => {
                props = self.paywall_props();
                Vec::new()
            }
            ComponentKind::Ad => {
                copy_props(source, &mut props, &["subscriptionBenefitId"]);
                if let Some(ads) = &self.ctx.ads_context {
                    props.insert("adsContext".to_owned(), PropValue::Ads(ads.clone()));
                }
                self.sanitize_children(&component.children)
            }
            // Base projection only; original props never pass through.
            ComponentKind::Pre | ComponentKind::Poll | ComponentKind::Custom(_) => {
                self.sanitize_children(&component.children)
            }
        };

        Some(Node::Component(Component {
            kind: component.kind.clone(),
            props,
            children,
        }))
    }

    /// Props injected into paywall and subscribe widgets.
    fn paywall_props(&self) -> Props {
        let ctx = self.ctx;
        let mut props = Props::new();
        props.insert(
            "article".to_owned(),
            PropValue::Article(Box::new(ctx.article.clone())),
        );
        props.insert(
            "showPaywalledContent".to_owned(),
            PropValue::Bool(ctx.show_paywalled_content()),
        );
        props.insert(
            "isSubscriber".to_owned(),
            PropValue::Bool(ctx.is_subscriber()),
        );
        if let Some(name) = &ctx.paid_articles_benefit_name {
            props.insert(
                "paidArticlesBenefitName".to_owned(),
                PropValue::Text(name.clone()),
            );
        }
        props
    }
}

/// Collapse an `input` element to a disabled checkbox, or reject it.
fn checkbox(element: &Element) -> Option<Node> {
    if element.attr("type") != Some("checkbox") {
        return None;
    }

    let mut attrs = Attributes::new();
    attrs.insert("type".to_owned(), "checkbox".to_owned());
    if let Some(checked) = element.attr("checked") {
        attrs.insert("checked".to_owned(), checked.to_owned());
    }
    attrs.insert("disabled".to_owned(), "disabled".to_owned());

    Some(Node::Element(Element {
        tag: "input".to_owned(),
        attrs,
        children: Vec::new(),
    }))
}

fn base_attributes(source: &Attributes) -> Attributes {
    source
        .iter()
        .filter(|(name, _)| AllowListPolicy::is_base_attribute(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

fn base_props(source: &Props) -> Props {
    let mut props = Props::new();
    copy_props(source, &mut props, BASE_ATTRIBUTES);
    props
}

fn copy_props(source: &Props, target: &mut Props, names: &[&str]) {
    for name in names {
        if let Some(value) = source.get(*name) {
            target.insert((*name).to_owned(), value.clone());
        }
    }
}
