//! Tokenizer for raw HTML embedded in markdown.
//!
//! Splits a raw HTML fragment into open tags, close tags and text. This is
//! not a full HTML parser: comments, doctypes and processing instructions
//! are skipped, and an unterminated tag drops the rest of the fragment.

use crate::entities::decode_entities;

/// A token from a raw HTML fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HtmlToken {
    /// `<name attr="value">` or `<name />`.
    Open {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    /// `</name>`.
    Close(String),
    /// Text between tags (entities decoded).
    Text(String),
}

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Check whether a tag name is a void element (case-insensitive).
pub(crate) fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS
        .iter()
        .any(|void| void.eq_ignore_ascii_case(name))
}

/// Split a raw HTML fragment into tokens.
pub(crate) fn tokenize(html: &str) -> Vec<HtmlToken> {
    let mut tokens = Vec::new();
    let mut rest = html;

    while !rest.is_empty() {
        let Some(lt) = rest.find('<') else {
            push_text(&mut tokens, rest);
            break;
        };
        push_text(&mut tokens, &rest[..lt]);
        rest = &rest[lt..];

        if let Some(after) = rest.strip_prefix("<!--") {
            rest = after.find("-->").map_or("", |end| &after[end + 3..]);
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            rest = rest.find('>').map_or("", |end| &rest[end + 1..]);
        } else if is_tag_start(rest) {
            match parse_tag(rest) {
                Some((token, remaining)) => {
                    tokens.push(token);
                    rest = remaining;
                }
                None => break,
            }
        } else {
            // A '<' that does not start a tag is literal text
            push_text(&mut tokens, "<");
            rest = &rest[1..];
        }
    }

    tokens
}

fn is_tag_start(s: &str) -> bool {
    let after = s.strip_prefix('<').unwrap_or(s);
    let after = after.strip_prefix('/').unwrap_or(after);
    after.starts_with(|c: char| c.is_ascii_alphabetic())
}

fn push_text(tokens: &mut Vec<HtmlToken>, text: &str) {
    if text.is_empty() {
        return;
    }
    let decoded = decode_entities(text);
    if let Some(HtmlToken::Text(previous)) = tokens.last_mut() {
        previous.push_str(&decoded);
    } else {
        tokens.push(HtmlToken::Text(decoded));
    }
}

/// Parse a tag starting at `<`. Returns the token and the remaining input.
fn parse_tag(input: &str) -> Option<(HtmlToken, &str)> {
    let end = find_tag_end(input)?;
    let inner = &input[1..end];
    let rest = &input[end + 1..];

    if let Some(closing) = inner.strip_prefix('/') {
        let name = closing.split_whitespace().next()?;
        return Some((HtmlToken::Close(name.to_owned()), rest));
    }

    let name_end = inner
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(inner.len());
    let (attrs, self_closing) = parse_attributes(&inner[name_end..]);

    Some((
        HtmlToken::Open {
            name: inner[..name_end].to_owned(),
            attrs,
            self_closing,
        },
        rest,
    ))
}

/// Find the byte offset of the `>` that ends the tag, honoring quotes.
fn find_tag_end(input: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in input.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(open), _) if open == c => quote = None,
            (None, '>') => return Some(i),
            _ => {}
        }
    }
    None
}

/// Parse the attribute section of an open tag.
///
/// Supports `key="value"`, `key='value'`, `key=value` and bare `key`.
fn parse_attributes(input: &str) -> (Vec<(String, String)>, bool) {
    let mut attrs = Vec::new();
    let mut self_closing = false;
    let mut rest = input;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }

        if let Some(after) = rest.strip_prefix('/') {
            self_closing = after.trim().is_empty();
            rest = after;
            continue;
        }

        let name_end = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '/')
            .unwrap_or(rest.len());
        let name = &rest[..name_end];
        rest = rest[name_end..].trim_start();

        let value = if let Some(after_eq) = rest.strip_prefix('=') {
            let (value, remaining) = parse_value(after_eq.trim_start());
            rest = remaining;
            value
        } else {
            ""
        };

        if !name.is_empty() {
            attrs.push((name.to_owned(), decode_entities(value)));
        }
    }

    (attrs, self_closing)
}

fn parse_value(s: &str) -> (&str, &str) {
    for quote in ['"', '\''] {
        if let Some(stripped) = s.strip_prefix(quote) {
            return match stripped.find(quote) {
                Some(end) => (&stripped[..end], &stripped[end + 1..]),
                None => (stripped, ""),
            };
        }
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    (&s[..end], &s[end..])
}
