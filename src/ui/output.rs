//! Output verbosity.

use std::str::FromStr;

/// How much the CLI prints besides the requested data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Status messages and data.
    #[default]
    Normal,
    /// Data and errors only.
    Quiet,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "quiet" => Ok(Self::Quiet),
            _ => Err(format!("unknown output mode: {}", s)),
        }
    }
}

impl OutputMode {
    /// Whether status messages (headers, successes, warnings) are shown.
    pub fn shows_status(&self) -> bool {
        matches!(self, Self::Normal)
    }
}
