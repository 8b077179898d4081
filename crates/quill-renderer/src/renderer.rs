//! Markdown to sanitized HTML in one call.

use quill_sanitize::{Node, RenderContext, Sanitizer};

use crate::html::HtmlWriter;
use crate::overrides::Overrides;
use crate::parser::{ComponentRegistry, MarkdownParser};

/// Result of rendering an article body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderResult {
    /// Rendered HTML.
    pub html: String,
    /// Number of nodes in the sanitized tree.
    pub node_count: usize,
    /// Number of parsed nodes removed by the filter.
    pub dropped: usize,
}

/// Parses, sanitizes and serializes article bodies.
///
/// # Example
///
/// ```
/// use quill_renderer::{ArticleRenderer, Overrides};
/// use quill_sanitize::RenderContext;
///
/// let renderer = ArticleRenderer::new();
/// let result = renderer.render_markdown(
///     "Hello <script>alert(1)</script>**world**",
///     &RenderContext::default(),
///     &Overrides::web(),
/// );
/// assert_eq!(result.html, "<p>Hello <strong>world</strong></p>");
/// ```
#[derive(Clone, Debug)]
pub struct ArticleRenderer {
    gfm: bool,
}

impl ArticleRenderer {
    /// Create a renderer with GFM enabled.
    #[must_use]
    pub fn new() -> Self {
        Self { gfm: true }
    }

    /// Enable or disable GitHub Flavored Markdown features.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Build the parser for one render call.
    ///
    /// Tags become components when they are registered by default, by the
    /// output target, or by the context's extra component list.
    #[must_use]
    pub fn parser(&self, ctx: &RenderContext, overrides: &Overrides) -> MarkdownParser {
        let mut registry = ComponentRegistry::default();
        registry.extend(overrides.kinds().map(|kind| kind.name().to_owned()));
        registry.extend(&ctx.extra_allowed_custom_components);
        MarkdownParser::new()
            .with_gfm(self.gfm)
            .with_registry(registry)
    }

    /// Parse markdown into the unsanitized node tree.
    #[must_use]
    pub fn parse(&self, markdown: &str, ctx: &RenderContext, overrides: &Overrides) -> Vec<Node> {
        self.parser(ctx, overrides).parse(markdown)
    }

    /// Parse and sanitize markdown.
    #[must_use]
    pub fn sanitize(
        &self,
        markdown: &str,
        ctx: &RenderContext,
        overrides: &Overrides,
    ) -> Vec<Node> {
        let parsed = self.parse(markdown, ctx, overrides);
        Sanitizer::new(ctx).sanitize_children(&parsed)
    }

    /// Render markdown to sanitized HTML.
    #[must_use]
    pub fn render_markdown(
        &self,
        markdown: &str,
        ctx: &RenderContext,
        overrides: &Overrides,
    ) -> RenderResult {
        let parsed = self.parse(markdown, ctx, overrides);
        self.render_nodes(&parsed, ctx, overrides)
    }

    /// Sanitize and render an already parsed tree.
    #[must_use]
    pub fn render_nodes(
        &self,
        nodes: &[Node],
        ctx: &RenderContext,
        overrides: &Overrides,
    ) -> RenderResult {
        let clean = Sanitizer::new(ctx).sanitize_children(nodes);
        let html = HtmlWriter::new(overrides).write(&clean);

        let parsed_count = count(nodes);
        let node_count = count(&clean);
        let dropped = parsed_count.saturating_sub(node_count);
        tracing::debug!(node_count, dropped, "Rendered article");

        RenderResult {
            html,
            node_count,
            dropped,
        }
    }
}

impl Default for ArticleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn count(nodes: &[Node]) -> usize {
    nodes.iter().map(Node::count).sum()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quill_sanitize::{Advertisement, Article, BenefitAds, Organization};

    use super::*;

    fn render(markdown: &str, ctx: &RenderContext) -> RenderResult {
        ArticleRenderer::new().render_markdown(markdown, ctx, &Overrides::web())
    }

    fn ctx() -> RenderContext {
        RenderContext::new(Article {
            title: "Launch".to_owned(),
            organization: Organization {
                name: "Acme".to_owned(),
                avatar_url: None,
            },
            ..Default::default()
        })
    }

    #[test]
    fn test_plain_markdown() {
        let result = render("# Title\n\nSome *text*.", &ctx());
        assert_eq!(result.html, "<h1>Title</h1><p>Some <em>text</em>.</p>");
        assert_eq!(result.dropped, 0);
    }

    #[test]
    fn test_script_removed_and_counted() {
        let result = render("<script>alert(1)</script>\n\nok", &ctx());
        assert_eq!(result.html, "<p>ok</p>");
        assert_eq!(result.dropped, 2);
    }

    #[test]
    fn test_event_handler_attributes_removed() {
        let result = render(r#"<span onclick="x()" style="color:red">hi</span>"#, &ctx());
        assert_eq!(result.html, r#"<p><span style="color:red">hi</span></p>"#);
    }

    #[test]
    fn test_unsafe_link_removed_with_text() {
        let result = render("[a](javascript:alert(1)) [b](https://ok.example)", &ctx());
        assert_eq!(result.html, r#"<p> <a href="https://ok.example">b</a></p>"#);
    }

    #[test]
    fn test_hard_break_renders_br() {
        let result = render("one  \ntwo", &ctx());
        assert_eq!(result.html, "<p>one<br>two</p>");
    }

    #[test]
    fn test_task_list_disabled_checkbox() {
        let result = render("- [x] done", &ctx());
        assert_eq!(
            result.html,
            r#"<ul><li><input checked="checked" disabled="disabled" type="checkbox">done</li></ul>"#
        );
    }

    #[test]
    fn test_image_component() {
        let result = render("![cat](https://cdn.example.com/cat.png)", &ctx());
        assert_eq!(
            result.html,
            r#"<p><img src="https://cdn.example.com/cat.png" style="max-width:100%"></p>"#
        );
    }

    #[test]
    fn test_paywall_locked() {
        let ctx = ctx()
            .with_paywalled_content(false)
            .with_paid_articles_benefit_name("Premium");
        let result = render("<Paywall>\n\nsecret\n\n</Paywall>", &ctx);
        assert_eq!(
            result.html,
            r#"<div class="paywall paywall-locked"><p>This section is for Premium subscribers of Acme.</p></div>"#
        );
        assert!(!result.html.contains("secret"));
    }

    #[test]
    fn test_paywall_unlocked_for_subscriber() {
        let ctx = ctx().with_paywalled_content(true).with_subscriber(true);
        let result = render(
            "Free\n\n<Paywall>\n\nsecret premium text\n\n<script>x()</script>\n\n</Paywall>",
            &ctx,
        );
        assert_eq!(result.html, "<p>Free</p><p>secret premium text</p>");
    }

    #[test]
    fn test_subscribe_now() {
        let result = render("<SubscribeNow />", &ctx());
        assert_eq!(
            result.html,
            r#"<div class="subscribe-now"><p>Subscribe to Acme</p></div>"#
        );
        let subscribed = render("<SubscribeNow />", &ctx().with_subscriber(true));
        assert_eq!(subscribed.html, "");
    }

    #[test]
    fn test_ad_requires_extra_component() {
        let ads = vec![BenefitAds {
            benefit_id: "b1".to_owned(),
            ads: vec![Advertisement {
                id: "ad-1".to_owned(),
                text: "Sponsor".to_owned(),
                link_url: "https://sponsor.example.com".to_owned(),
                image_url: String::new(),
                image_url_dark: None,
            }],
        }];
        let markdown = r#"<Ad subscriptionBenefitId="b1" />"#;

        let without = render(markdown, &ctx().with_ads(ads.clone()));
        assert_eq!(without.html, "");

        let with = render(
            markdown,
            &ctx().with_ads(ads).with_extra_components(["Ad"]),
        );
        assert_eq!(
            with.html,
            r#"<div class="ad"><a href="https://sponsor.example.com" rel="sponsored">Sponsor</a></div>"#
        );
    }

    #[test]
    fn test_unknown_component_removed() {
        let result = render(
            "<Countdown to=\"2030\">\n\nsoon\n\n</Countdown>\n\nafter",
            &ctx(),
        );
        assert_eq!(result.html, "<p>after</p>");
    }

    #[test]
    fn test_default_override_plain_text() {
        let ctx = ctx().with_default_override();
        let result = ArticleRenderer::new().render_markdown(
            "# Title\n\n**bold** text",
            &ctx,
            &Overrides::plain_text(),
        );
        assert_eq!(
            result.html,
            "<span>Title</span><span><span>bold</span> text</span>"
        );
    }

    #[test]
    fn test_gfm_disabled() {
        let result = ArticleRenderer::new().with_gfm(false).render_markdown(
            "~~x~~",
            &ctx(),
            &Overrides::web(),
        );
        assert_eq!(result.html, "<p>~~x~~</p>");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let renderer = ArticleRenderer::new();
        let ctx = ctx();
        let markdown = "# T\n\n<div onclick=\"x\">a  \nb</div>\n\n<Paywall>\n\nx\n\n</Paywall>";
        let once = renderer.sanitize(markdown, &ctx, &Overrides::web());
        let twice = Sanitizer::new(&ctx).sanitize_children(&once);
        assert_eq!(once, twice);
    }
}
