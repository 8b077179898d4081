//! CLI command implementations.

pub(crate) mod render;
pub(crate) mod tree;

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use quill_config::{CliSettings, Config, RenderTarget};
use quill_renderer::Overrides;
use quill_sanitize::{Article, RenderContext};

use crate::error::CliError;

pub(crate) use render::RenderArgs;
pub(crate) use tree::TreeArgs;

/// Arguments shared by every command that reads an article.
#[derive(Args)]
pub(crate) struct InputArgs {
    /// Path to the markdown file.
    markdown_file: PathBuf,

    /// Render context file (YAML, or JSON when the extension is `.json`).
    #[arg(long)]
    context: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover quill.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output target (overrides config). `plain-text` implies --default-override.
    #[arg(short, long)]
    target: Option<RenderTarget>,

    /// Disable GitHub Flavored Markdown (overrides config).
    #[arg(long)]
    no_gfm: bool,

    /// Route every standard element through the target's default override.
    #[arg(long)]
    default_override: bool,
}

/// Everything a command needs to render one article.
pub(crate) struct Loaded {
    pub config: Config,
    pub markdown: String,
    pub ctx: RenderContext,
}

impl InputArgs {
    /// Load configuration, markdown and render context.
    pub(crate) fn load(&self) -> Result<Loaded, CliError> {
        let cli_settings = CliSettings {
            target: self.target,
            gfm: self.no_gfm.then_some(false),
            default_override: self.default_override.then_some(true),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let markdown = std::fs::read_to_string(&self.markdown_file)?;
        let ctx = load_context(self.context.as_deref(), &self.markdown_file, &markdown)?;
        let ctx = config.apply_to(ctx);

        Ok(Loaded {
            config,
            markdown,
            ctx,
        })
    }
}

/// Load a render context file, or build one from the markdown file name.
pub(crate) fn load_context(
    context_path: Option<&Path>,
    markdown_file: &Path,
    markdown: &str,
) -> Result<RenderContext, CliError> {
    let Some(path) = context_path else {
        let slug = markdown_file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Ok(RenderContext::new(Article {
            title: slug.clone(),
            body: markdown.to_owned(),
            slug,
            ..Default::default()
        }));
    };

    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let ctx = if is_json {
        RenderContext::from_json(&content)?
    } else {
        RenderContext::from_yaml(&content)?
    };
    Ok(ctx)
}

/// Component renderers for an output target.
pub(crate) fn overrides_for(target: RenderTarget) -> Overrides {
    match target {
        RenderTarget::Web => Overrides::web(),
        RenderTarget::Email => Overrides::email(),
        RenderTarget::PlainText => Overrides::plain_text(),
    }
}

/// Write text to a file, or to stdout when no path is given.
pub(crate) fn write_output(path: Option<&Path>, text: &str) -> Result<(), CliError> {
    match path {
        Some(path) => std::fs::write(path, text)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}
