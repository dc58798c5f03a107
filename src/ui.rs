//! Console output for the host commands
//!
//! Status lines go through `cliclack` in an interactive terminal and fall
//! back to tagged plain text when piped or under CI.

use console::style;
use std::io::IsTerminal;

/// CI systems that set one of these never get styled output
const CI_VARS: [&str; 9] = [
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "TRAVIS",
    "JENKINS_URL",
    "BUILDKITE",
    "TEAMCITY_VERSION",
    "TF_BUILD",
];

/// Where status lines go and how they look
#[derive(Debug, Clone, Copy)]
pub struct Console {
    styled: bool,
}

impl Console {
    /// Styled output only on a terminal outside CI
    pub fn detect() -> Self {
        let styled = std::io::stdout().is_terminal()
            && !CI_VARS.iter().any(|var| std::env::var_os(var).is_some());
        Self { styled }
    }

    #[cfg(test)]
    fn plain() -> Self {
        Self { styled: false }
    }

    /// A finished step, with the file or object it produced
    pub fn done(&self, message: &str, detail: &str) {
        if self.styled {
            cliclack::log::success(format!("{} ({})", message, style(detail).dim())).ok();
        } else {
            println!("  {} {} ({})", style("[OK]").green(), message, detail);
        }
    }

    pub fn warn(&self, message: &str, hint: &str) {
        if self.styled {
            cliclack::log::warning(format!("{} - {}", message, style(hint).dim())).ok();
        } else {
            println!("  {} {} - {}", style("[WARN]").yellow(), message, hint);
        }
    }

    pub fn info(&self, message: &str) {
        if self.styled {
            cliclack::log::info(message).ok();
        } else {
            println!("  {} {}", style("[INFO]").cyan(), message);
        }
    }

    /// Per-layer entry count line
    pub fn layer_count(&self, layer: &str, entries: usize) {
        let layer = if layer.is_empty() { "<anonymous>" } else { layer };
        if self.styled {
            println!("  {}: {}", style(layer).dim(), entries);
        } else {
            println!("  {}: {}", layer, entries);
        }
    }
}
