//! Output target selection.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Where rendered HTML is going to be shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderTarget {
    /// Article page.
    #[default]
    Web,
    /// Newsletter email.
    Email,
    /// Text extraction (previews, search snippets).
    PlainText,
}

impl RenderTarget {
    /// All targets, in declaration order.
    pub const ALL: [Self; 3] = [Self::Web, Self::Email, Self::PlainText];

    /// Config and CLI spelling of the target.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Email => "email",
            Self::PlainText => "plain-text",
        }
    }
}

impl fmt::Display for RenderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown render target name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown render target {0:?} (expected web, email or plain-text)")]
pub struct ParseTargetError(String);

impl FromStr for RenderTarget {
    type Err = ParseTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|target| target.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseTargetError(s.to_owned()))
    }
}
