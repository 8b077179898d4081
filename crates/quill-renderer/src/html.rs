//! HTML serialization of sanitized node trees.
//!
//! The writer trusts the tree shape (the filter already ran) but never trusts
//! strings: every text node and attribute value is escaped, and tag or
//! attribute names that are not plain identifiers are skipped.

use std::fmt::Write;

use quill_sanitize::{Element, Node};

use crate::html_tag::is_void_element;
use crate::overrides::Overrides;

/// Escape text for HTML content and double-quoted attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Write ` name="value"` with the value escaped.
pub fn push_attr(out: &mut String, name: &str, value: &str) {
    write!(out, r#" {name}="{}""#, escape_html(value)).unwrap();
}

/// Serializes node trees to HTML, delegating components to [`Overrides`].
pub struct HtmlWriter<'a> {
    overrides: &'a Overrides,
}

impl<'a> HtmlWriter<'a> {
    /// Create a writer for the given output target.
    #[must_use]
    pub fn new(overrides: &'a Overrides) -> Self {
        Self { overrides }
    }

    /// Serialize sibling nodes.
    #[must_use]
    pub fn write(&self, nodes: &[Node]) -> String {
        let mut out = String::new();
        for node in nodes {
            self.write_node(node, &mut out);
        }
        out
    }

    /// Serialize a single node into `out`.
    pub fn write_node(&self, node: &Node, out: &mut String) {
        match node {
            Node::Text { text } => out.push_str(&escape_html(text)),
            Node::LineBreak => out.push_str("<br>"),
            Node::Placeholder => {}
            Node::Element(element) => self.element(element, out),
            Node::Component(component) => {
                let children = self.write(&component.children);
                match self.overrides.component(&component.kind) {
                    Some(renderer) => renderer.render(component, &children, out),
                    None => {
                        tracing::debug!(kind = %component.kind, "No renderer for component");
                    }
                }
            }
            Node::Override { children } => {
                let children = self.write(children);
                match self.overrides.default_override() {
                    Some(renderer) => renderer(&children, out),
                    None => out.push_str(&children),
                }
            }
        }
    }

    fn element(&self, element: &Element, out: &mut String) {
        let tag = element.tag.as_str();
        if !is_valid_name(tag) {
            tracing::warn!(tag, "Skipping element with invalid tag name");
            return;
        }

        out.push('<');
        out.push_str(tag);
        for (name, value) in &element.attrs {
            // React reconciliation key, not markup
            if name == "key" {
                continue;
            }
            if !is_valid_name(name) {
                continue;
            }
            let name = if name == "className" { "class" } else { name };
            push_attr(out, name, value);
        }
        out.push('>');

        if is_void_element(tag) {
            return;
        }

        for child in &element.children {
            self.write_node(child, out);
        }
        write!(out, "</{tag}>").unwrap();
    }
}

/// Tag and attribute names: a letter followed by letters, digits, `-` or `_`.
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quill_sanitize::{Component, ComponentKind};

    use super::*;

    fn write(nodes: &[Node]) -> String {
        HtmlWriter::new(&Overrides::new()).write(nodes)
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_text_escaped() {
        assert_eq!(write(&[Node::text("1 < 2 & 3")]), "1 &lt; 2 &amp; 3");
    }

    #[test]
    fn test_element_with_sorted_attributes() {
        let node: Node = Element::new("p")
            .with_attr("style", "color:red")
            .with_attr("align", "center")
            .with_attr("className", "lead")
            .with_child(Node::text("Hi"))
            .into();
        assert_eq!(
            write(&[node]),
            r#"<p align="center" class="lead" style="color:red">Hi</p>"#
        );
    }

    #[test]
    fn test_key_attribute_not_written() {
        let node: Node = Element::new("li").with_attr("key", "1").into();
        assert_eq!(write(&[node]), "<li></li>");
    }

    #[test]
    fn test_attribute_value_escaped() {
        let node: Node = Element::new("a")
            .with_attr("href", r#"https://x.example/?a="b""#)
            .into();
        assert_eq!(
            write(&[node]),
            r#"<a href="https://x.example/?a=&quot;b&quot;"></a>"#
        );
    }

    #[test]
    fn test_void_elements() {
        let nodes = vec![
            Element::new("hr").into(),
            Element::new("input")
                .with_attr("type", "checkbox")
                .with_attr("disabled", "disabled")
                .into(),
        ];
        assert_eq!(
            write(&nodes),
            r#"<hr><input disabled="disabled" type="checkbox">"#
        );
    }

    #[test]
    fn test_line_break() {
        let node: Node = Element::new("p")
            .with_children(vec![Node::text("a"), Node::LineBreak, Node::text("b")])
            .into();
        assert_eq!(write(&[node]), "<p>a<br>b</p>");
    }

    #[test]
    fn test_invalid_names_skipped() {
        let nodes = vec![
            Element::new("p").with_attr("on click", "x").into(),
            Element::new("x<y").with_child(Node::text("gone")).into(),
        ];
        assert_eq!(write(&nodes), "<p></p>");
    }

    #[test]
    fn test_component_without_renderer_renders_nothing() {
        let node: Node = Component::new(ComponentKind::Poll)
            .with_children(vec![Node::text("question")])
            .into();
        assert_eq!(write(&[node]), "");
    }

    #[test]
    fn test_override_without_renderer_renders_children() {
        let node = Node::Override {
            children: vec![Node::text("plain")],
        };
        assert_eq!(write(&[node]), "plain");
    }

    #[test]
    fn test_registered_component_renderer() {
        let overrides = Overrides::new().with_component(
            ComponentKind::Pre,
            |_: &Component, children: &str, out: &mut String| {
                out.push_str("<pre>");
                out.push_str(children);
                out.push_str("</pre>");
            },
        );
        let node: Node = Component::new(ComponentKind::Pre)
            .with_children(vec![Node::text("a < b")])
            .into();
        assert_eq!(
            HtmlWriter::new(&overrides).write(&[node]),
            "<pre>a &lt; b</pre>"
        );
    }
}
