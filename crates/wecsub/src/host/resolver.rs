use wecsub_core::error::{Error, Result};
use wecsub_core::sddl::{SidResolver, is_sid};

use super::{HostShell, ps_quote};

/// Translates account names to SIDs with `NTAccount.Translate` on the host.
pub struct PowerShellSidResolver<'a> {
    shell: &'a dyn HostShell,
    powershell: &'a str,
}

impl<'a> PowerShellSidResolver<'a> {
    pub fn new(shell: &'a dyn HostShell, powershell: &'a str) -> Self {
        Self { shell, powershell }
    }
}

impl SidResolver for PowerShellSidResolver<'_> {
    fn resolve(&self, account: &str) -> Result<String> {
        let script = format!(
            "(New-Object System.Security.Principal.NTAccount({})).Translate([System.Security.Principal.SecurityIdentifier]).Value",
            ps_quote(account)
        );
        let failure = |reason: String| Error::SidResolution {
            account: account.to_string(),
            reason,
        };

        let output = self
            .shell
            .run(self.powershell, &["-NoProfile", "-NonInteractive", "-Command", script.as_str()])
            .map_err(|e| failure(e.to_string()))?;

        let sid = output.stdout.trim();
        if !output.success || !is_sid(sid) {
            return Err(failure(first_line(&output.combined())));
        }
        Ok(sid.to_string())
    }
}

fn first_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("no output")
        .to_string()
}
