//! `quill render` command implementation.

use std::path::PathBuf;

use clap::Args;
use quill_renderer::{ArticleRenderer, RenderResult};

use super::{InputArgs, overrides_for, write_output};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, context or input files cannot be read.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let result = self.render()?;

        output.dropped_nodes(result.dropped);

        write_output(self.output.as_deref(), &result.html)?;
        if let Some(path) = &self.output {
            output.wrote(path);
        }
        Ok(())
    }

    fn render(&self) -> Result<RenderResult, CliError> {
        let loaded = self.input.load()?;
        let overrides = overrides_for(loaded.config.render.target);
        tracing::info!(render_target = %loaded.config.render.target, "Rendering article");

        Ok(ArticleRenderer::new()
            .with_gfm(loaded.config.render.gfm)
            .render_markdown(&loaded.markdown, &loaded.ctx, &overrides))
    }
}
