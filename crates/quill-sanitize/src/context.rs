//! Render context passed alongside a node tree.
//!
//! Contexts are typically built by the caller from application state, or
//! loaded from a YAML/JSON sidecar file next to the article.

use serde::{Deserialize, Serialize};

/// Article metadata available to custom components.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Article {
    pub title: String,
    pub body: String,
    /// Publication timestamp (RFC 3339). `None` for drafts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    pub byline: Byline,
    pub organization: Organization,
    pub slug: String,
    /// Whether `body` is a truncated preview of the full article.
    pub is_preview: bool,
}

impl Article {
    /// Whether the article has been published.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }
}

/// Author shown on an article.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Byline {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Organization that owns an article.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Organization {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Advertisements associated with one subscription benefit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitAds {
    pub benefit_id: String,
    #[serde(default)]
    pub ads: Vec<Advertisement>,
}

/// A single advertisement campaign.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Advertisement {
    pub id: String,
    pub text: String,
    pub link_url: String,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url_dark: Option<String>,
}

/// Immutable configuration for one render call.
///
/// # Example
///
/// ```
/// use quill_sanitize::{Article, RenderContext};
///
/// let ctx = RenderContext::new(Article::default())
///     .with_subscriber(true)
///     .with_extra_components(["ad"]);
/// assert!(ctx.is_subscriber());
/// assert!(ctx.show_paywalled_content());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderContext {
    /// The article being rendered.
    pub article: Article,
    /// Whether paywalled sections are shown (absent means shown).
    pub show_paywalled_content: Option<bool>,
    /// Whether the viewer is a subscriber (absent means not).
    pub is_subscriber: Option<bool>,
    /// Display name of the benefit that unlocks paid content.
    pub paid_articles_benefit_name: Option<String>,
    /// Replace every standard element with the output target's override.
    pub default_override: bool,
    /// Additional custom component names to allow (case-insensitive).
    pub extra_allowed_custom_components: Vec<String>,
    /// Advertisements keyed by benefit.
    pub ads_context: Option<Vec<BenefitAds>>,
}

impl RenderContext {
    /// Create a context for the given article with default viewer settings.
    #[must_use]
    pub fn new(article: Article) -> Self {
        Self {
            article,
            ..Default::default()
        }
    }

    /// Parse a context from YAML content.
    ///
    /// Empty content yields a default context.
    pub fn from_yaml(content: &str) -> Result<Self, ContextError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(trimmed)?)
    }

    /// Parse a context from JSON content.
    pub fn from_json(content: &str) -> Result<Self, ContextError> {
        Ok(serde_json::from_str(content)?)
    }

    #[must_use]
    pub fn with_paywalled_content(mut self, show: bool) -> Self {
        self.show_paywalled_content = Some(show);
        self
    }

    #[must_use]
    pub fn with_subscriber(mut self, is_subscriber: bool) -> Self {
        self.is_subscriber = Some(is_subscriber);
        self
    }

    #[must_use]
    pub fn with_paid_articles_benefit_name(mut self, name: impl Into<String>) -> Self {
        self.paid_articles_benefit_name = Some(name.into());
        self
    }

    /// Route every allowed standard element through the default override.
    #[must_use]
    pub fn with_default_override(mut self) -> Self {
        self.default_override = true;
        self
    }

    #[must_use]
    pub fn with_extra_components<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_allowed_custom_components
            .extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_ads(mut self, ads: Vec<BenefitAds>) -> Self {
        self.ads_context = Some(ads);
        self
    }

    /// Effective paywall visibility.
    #[must_use]
    pub fn show_paywalled_content(&self) -> bool {
        self.show_paywalled_content.unwrap_or(true)
    }

    /// Effective subscriber flag.
    #[must_use]
    pub fn is_subscriber(&self) -> bool {
        self.is_subscriber.unwrap_or(false)
    }

    /// Advertisements registered for a benefit.
    #[must_use]
    pub fn ads_for(&self, benefit_id: &str) -> &[Advertisement] {
        self.ads_context
            .iter()
            .flatten()
            .find(|entry| entry.benefit_id == benefit_id)
            .map(|entry| entry.ads.as_slice())
            .unwrap_or_default()
    }
}

/// Error loading a render context.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// Malformed YAML.
    #[error("Invalid YAML context: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Malformed JSON.
    #[error("Invalid JSON context: {0}")]
    Json(#[from] serde_json::Error),
}
