use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::logger::{LoggerFormat, LoggerLevel};

/// Logger configuration.
///
/// Every field has a default, so a partial (or empty) document deserializes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// Filter directives, e.g. `"info"` or `"wharf_e2e=debug,info"`.
    pub level: LoggerLevel,
    /// Include the event target (module path) in each line.
    pub with_targets: bool,
    /// Allow ANSI colors for the text format.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            with_targets: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// Colors are used only when enabled and stdout is a terminal.
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }
}
