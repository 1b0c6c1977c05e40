//! Thin wrapper over `wecutil.exe` sub-commands.
//!
//! `wecutil` does not report failures through a reliable exit code, so every
//! call is judged by scraping its output as well.

use anyhow::Result;

use crate::cmd::CommandOutput;
use crate::error::WecError;
use crate::host::HostShell;

/// Error code `wecutil cs` prints when the subscription was saved but could not
/// be activated yet (e.g. no source has connected). The subscription exists.
pub const BENIGN_CREATE_CODE: &str = "0x3ae8";

/// How a `wecutil` invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Success,
    /// Completed, but with a known non-fatal warning.
    Warning(String),
    Failure(String),
}

/// Judge a finished `wecutil` call by exit status and output text.
pub fn classify(output: &CommandOutput) -> Verdict {
    let text = output.combined();
    if output.success && !mentions_error(&text) {
        return Verdict::Success;
    }
    if text.is_empty() {
        return Verdict::Failure(format!(
            "exit code {}",
            output.code.map_or_else(|| "unknown".to_string(), |c| c.to_string())
        ));
    }
    Verdict::Failure(text)
}

/// Like [`classify`], but downgrades the known activation warning of
/// `wecutil cs`.
pub fn classify_create(output: &CommandOutput) -> Verdict {
    match classify(output) {
        Verdict::Failure(text) if text.to_ascii_lowercase().contains(BENIGN_CREATE_CODE) => {
            Verdict::Warning(text)
        }
        other => other,
    }
}

fn mentions_error(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("error") || lower.starts_with("failed")
}

/// `wecutil` bound to one host.
pub struct Wecutil<'a> {
    shell: &'a dyn HostShell,
    program: &'a str,
}

impl<'a> Wecutil<'a> {
    pub fn new(shell: &'a dyn HostShell, program: &'a str) -> Self {
        Self { shell, program }
    }

    pub fn shell(&self) -> &'a dyn HostShell {
        self.shell
    }

    fn call(&self, args: &[&str]) -> Result<CommandOutput> {
        self.shell.run(self.program, args)
    }

    fn failure(&self, operation: &'static str, message: String) -> WecError {
        WecError::Command {
            computer: self.shell.computer().to_string(),
            operation,
            message,
        }
    }

    /// `wecutil es`: names of all subscriptions on the host.
    ///
    /// Names may contain any word, so only the exit status is judged here.
    pub fn enumerate(&self) -> Result<Vec<String>> {
        let output = self.call(&["es"])?;
        if !output.success {
            return Err(self.failure("enumerate-subscription", output.combined()).into());
        }
        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    /// `wecutil gs <name> /f:xml`: the subscription document.
    pub fn get_xml(&self, name: &str) -> Result<String> {
        let output = self.call(&["gs", name, "/f:xml"])?;
        let body = output.stdout.trim_start_matches('\u{feff}').trim_start();
        if output.success && body.starts_with('<') {
            return Ok(output.stdout);
        }
        Err(self.failure("get-subscription", output.combined()).into())
    }

    /// `wecutil ds <name>`.
    pub fn delete(&self, name: &str) -> Result<Verdict> {
        Ok(classify(&self.call(&["ds", name])?))
    }

    /// `wecutil cs <file>`.
    pub fn create(&self, path: &str) -> Result<Verdict> {
        Ok(classify_create(&self.call(&["cs", path])?))
    }

    /// `wecutil gr <name>`: runtime status text.
    pub fn runtime_status(&self, name: &str) -> Result<String> {
        let output = self.call(&["gr", name])?;
        if !output.success && output.stdout.trim().is_empty() {
            return Err(self
                .failure("get-subscriptionruntimestatus", output.combined())
                .into());
        }
        Ok(output.stdout)
    }

    /// `wecutil rs <name>`: retry every inactive source.
    pub fn retry(&self, name: &str) -> Result<()> {
        match classify(&self.call(&["rs", name])?) {
            Verdict::Success => Ok(()),
            Verdict::Warning(message) | Verdict::Failure(message) => {
                Err(self.failure("retry-subscription", message).into())
            }
        }
    }
}
