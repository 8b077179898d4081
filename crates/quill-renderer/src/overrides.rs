//! Output targets: how custom components turn into markup.
//!
//! The filter decides which components survive and which props they carry.
//! An [`Overrides`] table decides what each surviving component looks like for
//! one output target (web page, email, plain text).

use std::collections::HashMap;
use std::fmt;
use std::fmt::Write;

use quill_sanitize::{
    Advertisement, AllowListPolicy, Article, BenefitAds, Component, ComponentKind, PropValue,
};

use crate::html::{escape_html, push_attr};

/// Renders one custom component given its already rendered children.
pub trait ComponentRenderer: Send + Sync {
    /// Append the component's markup to `out`.
    fn render(&self, component: &Component, children: &str, out: &mut String);
}

impl<F> ComponentRenderer for F
where
    F: Fn(&Component, &str, &mut String) + Send + Sync,
{
    fn render(&self, component: &Component, children: &str, out: &mut String) {
        self(component, children, out);
    }
}

/// Renderer for `Override` nodes, given the rendered children.
pub type DefaultOverride = Box<dyn Fn(&str, &mut String) + Send + Sync>;

/// Capability table mapping component kinds to renderers.
///
/// Kinds without a registered renderer render nothing.
#[derive(Default)]
pub struct Overrides {
    components: HashMap<ComponentKind, Box<dyn ComponentRenderer>>,
    default_override: Option<DefaultOverride>,
}

impl Overrides {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a renderer for a component kind.
    #[must_use]
    pub fn with_component(
        mut self,
        kind: ComponentKind,
        renderer: impl ComponentRenderer + 'static,
    ) -> Self {
        self.components.insert(kind, Box::new(renderer));
        self
    }

    /// Set the renderer used for `Override` nodes.
    #[must_use]
    pub fn with_default_override(
        mut self,
        renderer: impl Fn(&str, &mut String) + Send + Sync + 'static,
    ) -> Self {
        self.default_override = Some(Box::new(renderer));
        self
    }

    /// Renderer for a component kind.
    #[must_use]
    pub fn component(&self, kind: &ComponentKind) -> Option<&dyn ComponentRenderer> {
        self.components.get(kind).map(|renderer| &**renderer)
    }

    /// Renderer for `Override` nodes.
    #[must_use]
    pub fn default_override(&self) -> Option<&(dyn Fn(&str, &mut String) + Send + Sync)> {
        self.default_override.as_deref()
    }

    /// Component kinds that have a renderer.
    pub fn kinds(&self) -> impl Iterator<Item = &ComponentKind> {
        self.components.keys()
    }

    /// Web page target.
    #[must_use]
    pub fn web() -> Self {
        Self::new()
            .with_component(ComponentKind::Img, render_img)
            .with_component(ComponentKind::Pre, render_pre)
            .with_component(ComponentKind::Paywall, render_paywall)
            .with_component(ComponentKind::SubscribeNow, render_subscribe_now)
            .with_component(ComponentKind::Ad, render_ad_block)
            .with_component(ComponentKind::Embed, render_nothing)
            .with_component(ComponentKind::Iframe, render_nothing)
            .with_component(ComponentKind::Poll, render_nothing)
    }

    /// Email target. Frames become links and ads become text links.
    #[must_use]
    pub fn email() -> Self {
        Self::web()
            .with_component(ComponentKind::Embed, render_src_link)
            .with_component(ComponentKind::Iframe, render_src_link)
            .with_component(ComponentKind::Ad, render_ad_links)
    }

    /// Plain text target: every overridden element becomes a `<span>`.
    #[must_use]
    pub fn plain_text() -> Self {
        Self::new()
            .with_component(ComponentKind::Pre, render_pre)
            .with_default_override(|children: &str, out: &mut String| {
                out.push_str("<span>");
                out.push_str(children);
                out.push_str("</span>");
            })
    }
}

impl fmt::Debug for Overrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.components.keys().map(ComponentKind::name).collect();
        kinds.sort_unstable();
        f.debug_struct("Overrides")
            .field("components", &kinds)
            .field("default_override", &self.default_override.is_some())
            .finish()
    }
}

fn render_nothing(_component: &Component, _children: &str, _out: &mut String) {}

fn render_pre(_component: &Component, children: &str, out: &mut String) {
    write!(out, "<pre>{children}</pre>").unwrap();
}

fn render_img(component: &Component, _children: &str, out: &mut String) {
    let Some(src) = component.text_prop("src").filter(|src| is_http_url(src)) else {
        return;
    };
    out.push_str("<img");
    push_attr(out, "src", src);
    for name in ["width", "height"] {
        if let Some(value) = component.text_prop(name) {
            push_attr(out, name, value);
        }
    }
    push_attr(out, "style", "max-width:100%");
    out.push('>');
}

fn render_paywall(component: &Component, children: &str, out: &mut String) {
    if component.bool_prop("showPaywalledContent").unwrap_or(true) {
        out.push_str(children);
        return;
    }
    let benefit = component
        .text_prop("paidArticlesBenefitName")
        .unwrap_or("premium");
    let organization = article(component).map_or("", |article| article.organization.name.as_str());
    write!(
        out,
        r#"<div class="paywall paywall-locked"><p>This section is for {} subscribers"#,
        escape_html(benefit)
    )
    .unwrap();
    if !organization.is_empty() {
        write!(out, " of {}", escape_html(organization)).unwrap();
    }
    out.push_str(".</p></div>");
}

fn render_subscribe_now(component: &Component, _children: &str, out: &mut String) {
    if component.bool_prop("isSubscriber").unwrap_or(false) {
        return;
    }
    let organization = article(component).map_or("", |article| article.organization.name.as_str());
    if organization.is_empty() {
        out.push_str(r#"<div class="subscribe-now"><p>Subscribe</p></div>"#);
    } else {
        write!(
            out,
            r#"<div class="subscribe-now"><p>Subscribe to {}</p></div>"#,
            escape_html(organization)
        )
        .unwrap();
    }
}

fn render_ad_block(component: &Component, _children: &str, out: &mut String) {
    let ads = benefit_ads(component);
    if ads.is_empty() {
        return;
    }
    out.push_str(r#"<div class="ad">"#);
    for ad in ads.iter().filter(|ad| is_http_url(&ad.link_url)) {
        out.push_str("<a");
        push_attr(out, "href", &ad.link_url);
        push_attr(out, "rel", "sponsored");
        out.push('>');
        if is_http_url(&ad.image_url) {
            out.push_str("<img");
            push_attr(out, "src", &ad.image_url);
            push_attr(out, "alt", &ad.text);
            out.push('>');
        } else {
            out.push_str(&escape_html(&ad.text));
        }
        out.push_str("</a>");
    }
    out.push_str("</div>");
}

fn render_ad_links(component: &Component, _children: &str, out: &mut String) {
    for ad in benefit_ads(component)
        .iter()
        .filter(|ad| is_http_url(&ad.link_url))
    {
        out.push_str("<p><a");
        push_attr(out, "href", &ad.link_url);
        write!(out, ">{}</a></p>", escape_html(&ad.text)).unwrap();
    }
}

fn render_src_link(component: &Component, _children: &str, out: &mut String) {
    let Some(src) = component
        .text_prop("src")
        .filter(|src| AllowListPolicy::is_safe_href(src))
    else {
        return;
    };
    let label = component.text_prop("title").unwrap_or(src);
    out.push_str("<p><a");
    push_attr(out, "href", src);
    write!(out, ">{}</a></p>", escape_html(label)).unwrap();
}

fn article(component: &Component) -> Option<&Article> {
    match component.props.get("article") {
        Some(PropValue::Article(article)) => Some(article),
        _ => None,
    }
}

/// Ads for the component's `subscriptionBenefitId`.
fn benefit_ads(component: &Component) -> &[Advertisement] {
    let Some(benefit_id) = component.text_prop("subscriptionBenefitId") else {
        return &[];
    };
    let Some(PropValue::Ads(entries)) = component.props.get("adsContext") else {
        return &[];
    };
    entries
        .iter()
        .find(|entry: &&BenefitAds| entry.benefit_id == benefit_id)
        .map(|entry| entry.ads.as_slice())
        .unwrap_or_default()
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}
