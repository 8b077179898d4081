//! `quill tree` command implementation.

use clap::Args;
use quill_renderer::ArticleRenderer;
use quill_sanitize::Node;

use super::{InputArgs, overrides_for, write_output};
use crate::error::CliError;

/// Arguments for the tree command.
#[derive(Args)]
pub(crate) struct TreeArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Print the parsed tree before sanitization.
    #[arg(long)]
    raw: bool,
}

impl TreeArgs {
    /// Execute the tree command.
    ///
    /// # Errors
    ///
    /// Returns an error if input files cannot be read or the tree cannot be serialized.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let nodes = self.nodes()?;
        let json = serde_json::to_string_pretty(&nodes)?;
        write_output(None, &json)
    }

    fn nodes(&self) -> Result<Vec<Node>, CliError> {
        let loaded = self.input.load()?;
        let overrides = overrides_for(loaded.config.render.target);
        let renderer = ArticleRenderer::new().with_gfm(loaded.config.render.gfm);

        Ok(if self.raw {
            renderer.parse(&loaded.markdown, &loaded.ctx, &overrides)
        } else {
            renderer.sanitize(&loaded.markdown, &loaded.ctx, &overrides)
        })
    }
}
