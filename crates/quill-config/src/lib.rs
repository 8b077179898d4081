//! Configuration management for Quill.
//!
//! Parses `quill.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `viewer.paid_articles_benefit_name` supports `${VAR}` and
//! `${VAR:-default}` expansion.
//!
//! ## Example
//!
//! ```toml
//! [render]
//! target = "email"
//! gfm = true
//!
//! [components]
//! extra = ["ad"]
//!
//! [viewer]
//! is_subscriber = false
//! paid_articles_benefit_name = "${BENEFIT_NAME:-Premium}"
//! ```

mod expand;
mod target;

use std::path::{Path, PathBuf};

use quill_sanitize::RenderContext;
use serde::Deserialize;

pub use target::{ParseTargetError, RenderTarget};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override output target.
    pub target: Option<RenderTarget>,
    /// Override GFM flag.
    pub gfm: Option<bool>,
    /// Override default override flag.
    pub default_override: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "quill.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rendering configuration.
    pub render: RenderConfig,
    /// Custom component configuration.
    pub components: ComponentsConfig,
    /// Viewer defaults applied to every render context.
    pub viewer: ViewerConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output target.
    pub target: RenderTarget,
    /// Enable GitHub Flavored Markdown.
    pub gfm: bool,
    /// Replace every standard element with the target's default override.
    pub default_override: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            target: RenderTarget::Web,
            gfm: true,
            default_override: false,
        }
    }
}

/// Custom component configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ComponentsConfig {
    /// Component names allowed in addition to the built-in set.
    pub extra: Vec<String>,
}

/// Viewer defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Whether paywalled sections are shown.
    pub show_paywalled_content: Option<bool>,
    /// Whether the viewer is a subscriber.
    pub is_subscriber: Option<bool>,
    /// Display name of the benefit that unlocks paid content.
    pub paid_articles_benefit_name: Option<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`viewer.paid_articles_benefit_name`").
        field: String,
        /// Error message (e.g., "${`BENEFIT_NAME`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a component name to be a plain ASCII identifier.
fn require_component_name(name: &str) -> Result<(), ConfigError> {
    require_non_empty(name, "components.extra")?;
    if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Validation(format!(
            "components.extra: {name:?} must contain only ASCII letters and digits"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `quill.toml` in current directory and parents.
    /// Without a config file the defaults are used.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        tracing::debug!(
            path = ?config.config_path,
            render_target = %config.render.target,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(target) = settings.target {
            self.render.target = target;
        }
        if let Some(gfm) = settings.gfm {
            self.render.gfm = gfm;
        }
        if let Some(default_override) = settings.default_override {
            self.render.default_override = default_override;
        }
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.exists())
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for name in &self.components.extra {
            require_component_name(name)?;
        }
        if let Some(name) = &self.viewer.paid_articles_benefit_name {
            require_non_empty(name, "viewer.paid_articles_benefit_name")?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref name) = self.viewer.paid_articles_benefit_name {
            self.viewer.paid_articles_benefit_name = Some(expand::expand_env(
                name,
                "viewer.paid_articles_benefit_name",
            )?);
        }
        Ok(())
    }

    /// Fill a render context with configured defaults.
    ///
    /// Values already present in the context win. Extra components are
    /// merged, and the default override is enabled if either side enables it
    /// or the target is plain text.
    #[must_use]
    pub fn apply_to(&self, mut ctx: RenderContext) -> RenderContext {
        let viewer = &self.viewer;
        ctx.show_paywalled_content = ctx
            .show_paywalled_content
            .or(viewer.show_paywalled_content);
        ctx.is_subscriber = ctx.is_subscriber.or(viewer.is_subscriber);
        if ctx.paid_articles_benefit_name.is_none() {
            ctx.paid_articles_benefit_name
                .clone_from(&viewer.paid_articles_benefit_name);
        }
        ctx.default_override |=
            self.render.default_override || self.render.target == RenderTarget::PlainText;

        for name in &self.components.extra {
            let known = ctx
                .extra_allowed_custom_components
                .iter()
                .any(|existing| existing.eq_ignore_ascii_case(name));
            if !known {
                ctx.extra_allowed_custom_components.push(name.clone());
            }
        }
        ctx
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.render.target, RenderTarget::Web);
        assert!(config.render.gfm);
        assert!(!config.render.default_override);
        assert!(config.components.extra.is_empty());
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.render.target, RenderTarget::Web);
        assert!(config.render.gfm);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[render]
target = "plain-text"
gfm = false
default_override = true

[components]
extra = ["ad", "Countdown"]

[viewer]
show_paywalled_content = false
is_subscriber = true
paid_articles_benefit_name = "Gold"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.render.target, RenderTarget::PlainText);
        assert!(!config.render.gfm);
        assert!(config.render.default_override);
        assert_eq!(config.components.extra, vec!["ad", "Countdown"]);
        assert_eq!(config.viewer.show_paywalled_content, Some(false));
        assert_eq!(config.viewer.is_subscriber, Some(true));
        assert_eq!(
            config.viewer.paid_articles_benefit_name.as_deref(),
            Some("Gold")
        );
    }

    #[test]
    fn test_parse_unknown_target_fails() {
        let result: Result<Config, _> = toml::from_str("[render]\ntarget = \"pdf\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_component_names() {
        let mut config = Config::default();
        config.components.extra = vec!["ad".to_owned(), "Countdown2".to_owned()];
        assert!(config.validate().is_ok());

        config.components.extra = vec!["bad-name".to_owned()];
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("bad-name"));

        config.components.extra = vec![String::new()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_benefit_name() {
        let mut config = Config::default();
        config.viewer.paid_articles_benefit_name = Some("  ".to_owned());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("viewer.paid_articles_benefit_name"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            target: Some(RenderTarget::Email),
            gfm: Some(false),
            ..Default::default()
        });
        assert_eq!(config.render.target, RenderTarget::Email);
        assert!(!config.render.gfm);
        assert!(!config.render.default_override);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.render.target, RenderTarget::Web);
        assert!(config.render.gfm);
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let result = Config::load(Some(Path::new("/nonexistent/quill.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_explicit_file_with_cli_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quill.toml");
        fs::write(&path, "[render]\ntarget = \"email\"\n\n[components]\nextra = [\"ad\"]\n")
            .unwrap();

        let settings = CliSettings {
            gfm: Some(false),
            ..Default::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.render.target, RenderTarget::Email);
        assert!(!config.render.gfm);
        assert_eq!(config.components.extra, vec!["ad"]);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quill.toml");
        fs::write(&path, "[render\n").unwrap();
        let result = Config::load(Some(&path), None);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_rejects_invalid_component() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quill.toml");
        fs::write(&path, "[components]\nextra = [\"<script>\"]\n").unwrap();
        let result = Config::load(Some(&path), None);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_load_expands_benefit_name() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("QUILL_CONFIG_TEST_BENEFIT", "Founders");
        }
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quill.toml");
        fs::write(
            &path,
            "[viewer]\npaid_articles_benefit_name = \"${QUILL_CONFIG_TEST_BENEFIT}\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(
            config.viewer.paid_articles_benefit_name.as_deref(),
            Some("Founders")
        );
        unsafe {
            std::env::remove_var("QUILL_CONFIG_TEST_BENEFIT");
        }
    }

    #[test]
    fn test_discover_config_in_parent() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("articles/2026");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("quill.toml"), "").unwrap();

        assert_eq!(
            Config::discover_config(&nested),
            Some(dir.path().join("quill.toml"))
        );
    }

    #[test]
    fn test_discover_config_none() {
        let dir = TempDir::new().unwrap();
        // A quill.toml in an ancestor of the temp dir would be found first
        let found = Config::discover_config(dir.path());
        assert!(found.is_none_or(|path| !path.starts_with(dir.path())));
    }

    #[test]
    fn test_apply_to_fills_missing_values() {
        let mut config = Config::default();
        config.render.default_override = true;
        config.components.extra = vec!["ad".to_owned()];
        config.viewer = ViewerConfig {
            show_paywalled_content: Some(false),
            is_subscriber: Some(true),
            paid_articles_benefit_name: Some("Gold".to_owned()),
        };

        let ctx = config.apply_to(RenderContext::default());

        assert_eq!(ctx.show_paywalled_content, Some(false));
        assert_eq!(ctx.is_subscriber, Some(true));
        assert_eq!(ctx.paid_articles_benefit_name.as_deref(), Some("Gold"));
        assert!(ctx.default_override);
        assert_eq!(ctx.extra_allowed_custom_components, vec!["ad"]);
    }

    #[test]
    fn test_apply_to_keeps_context_values() {
        let mut config = Config::default();
        config.components.extra = vec!["ad".to_owned(), "poll".to_owned()];
        config.viewer.is_subscriber = Some(true);
        config.viewer.paid_articles_benefit_name = Some("Gold".to_owned());

        let ctx = RenderContext::default()
            .with_subscriber(false)
            .with_paid_articles_benefit_name("Silver")
            .with_extra_components(["Ad"]);
        let ctx = config.apply_to(ctx);

        assert_eq!(ctx.is_subscriber, Some(false));
        assert_eq!(ctx.paid_articles_benefit_name.as_deref(), Some("Silver"));
        assert_eq!(ctx.extra_allowed_custom_components, vec!["Ad", "poll"]);
    }

    #[test]
    fn test_apply_to_plain_text_enables_default_override() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            target: Some(RenderTarget::PlainText),
            ..Default::default()
        });

        let ctx = config.apply_to(RenderContext::default());
        assert!(ctx.default_override);

        let web = Config::default().apply_to(RenderContext::default());
        assert!(!web.default_override);
    }
}
