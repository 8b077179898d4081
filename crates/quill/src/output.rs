//! Status lines for the render commands.
//!
//! Everything goes to stderr; stdout carries only rendered HTML or JSON.

use std::fmt::Display;
use std::path::Path;

use console::{Style, Term};

/// Reports render outcomes on stderr.
pub(crate) struct Output {
    term: Term,
    notice: Style,
    done: Style,
    failed: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            notice: Style::new().yellow(),
            done: Style::new().green(),
            failed: Style::new().red(),
        }
    }

    /// Tell the user how many nodes the allow-list removed. Silent for zero.
    pub(crate) fn dropped_nodes(&self, dropped: usize) {
        if let Some(msg) = dropped_message(dropped) {
            self.line(&self.notice, &msg);
        }
    }

    /// Confirm where the HTML was written.
    pub(crate) fn wrote(&self, path: &Path) {
        self.line(&self.done, &format!("Wrote {}", path.display()));
    }

    pub(crate) fn failure(&self, err: &dyn Display) {
        self.line(&self.failed, &format!("Error: {err}"));
    }

    fn line(&self, style: &Style, msg: &str) {
        let _ = self.term.write_line(&style.apply_to(msg).to_string());
    }
}

fn dropped_message(dropped: usize) -> Option<String> {
    match dropped {
        0 => None,
        1 => Some("Removed 1 node not allowed in article bodies".to_owned()),
        n => Some(format!("Removed {n} nodes not allowed in article bodies")),
    }
}
