use anyhow::{Context, Result};

use super::HostShell;
use crate::cmd::{CommandOutput, run_cmd_output};

/// Runs commands on this machine.
#[derive(Debug, Clone)]
pub struct LocalShell {
    computer: String,
}

impl LocalShell {
    pub fn new() -> Self {
        Self {
            computer: local_computer_name(),
        }
    }
}

impl Default for LocalShell {
    fn default() -> Self {
        Self::new()
    }
}

impl HostShell for LocalShell {
    fn computer(&self) -> &str {
        &self.computer
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        run_cmd_output(program, args, &[])
    }

    fn temp_dir(&self) -> Result<String> {
        Ok(std::env::temp_dir().to_string_lossy().into_owned())
    }

    fn write_file(&self, path: &str, contents: &str) -> Result<()> {
        std::fs::write(path, contents).with_context(|| format!("failed to write {path}"))
    }

    fn remove_file(&self, path: &str) -> Result<()> {
        std::fs::remove_file(path).with_context(|| format!("failed to remove {path}"))
    }
}

/// `COMPUTERNAME` on Windows, `HOSTNAME` elsewhere.
pub(super) fn local_computer_name() -> String {
    std::env::var("COMPUTERNAME")
        .or_else(|_| std::env::var("HOSTNAME"))
        .ok()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}
