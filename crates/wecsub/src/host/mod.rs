//! Execution on the collector host.
//!
//! Every subscription operation runs through a [`HostShell`], either on this
//! machine or on a remote collector via WinRM.

mod local;
mod remote;
mod resolver;

use anyhow::{Result, bail};
use wecsub_core::Config;

pub use local::LocalShell;
pub use remote::{Credential, RemoteShell, ps_quote};
pub use resolver::PowerShellSidResolver;

use crate::cmd::CommandOutput;

/// A place where programs run and files live.
pub trait HostShell {
    /// Name of the computer commands run on.
    fn computer(&self) -> &str;

    /// Session profile this shell was opened from, if any.
    fn session_name(&self) -> Option<&str> {
        None
    }

    /// Run a program to completion and capture its output.
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;

    /// Directory for temporary files on the host.
    fn temp_dir(&self) -> Result<String>;

    fn write_file(&self, path: &str, contents: &str) -> Result<()>;

    fn remove_file(&self, path: &str) -> Result<()>;
}

/// Join a file name onto a host directory using the directory's separator.
pub fn join_host_path(dir: &str, file_name: &str) -> String {
    let sep = if dir.contains('\\') || !dir.contains('/') { '\\' } else { '/' };
    let dir = dir.trim_end_matches(['\\', '/']);
    format!("{dir}{sep}{file_name}")
}

/// Where to connect, as selected on the command line.
#[derive(Debug, Clone, Default)]
pub struct TargetArgs {
    pub computer: Option<String>,
    pub session: Option<String>,
    pub credential: Option<String>,
}

/// Open the shell selected by `--session`, `--computer` or the configured
/// default, in that order. No selection means the local machine.
pub fn connect(
    target: &TargetArgs,
    config: &Config,
    password: impl FnOnce(&str) -> Result<String>,
) -> Result<Box<dyn HostShell>> {
    if target.session.is_some() && target.computer.is_some() {
        bail!("--session and --computer are mutually exclusive");
    }

    if let Some(name) = &target.session {
        let profile = config.session(name)?;
        let username = target.credential.clone().or_else(|| profile.username.clone());
        let credential = username
            .map(|u| password(&u).map(|p| Credential::new(u, p)))
            .transpose()?;
        tracing::info!(session = %name, computer = %profile.computer, "using session profile");
        return Ok(Box::new(
            RemoteShell::from_profile(profile, &config.powershell_path, credential)
                .with_session_name(name),
        ));
    }

    let computer = target.computer.clone().or_else(|| config.default_computer.clone());
    match computer {
        Some(computer) if !is_local_name(&computer) => {
            let credential = target
                .credential
                .clone()
                .map(|u| password(&u).map(|p| Credential::new(u, p)))
                .transpose()?;
            Ok(Box::new(RemoteShell::new(
                computer,
                &config.powershell_path,
                credential,
            )))
        }
        _ => {
            if target.credential.is_some() {
                tracing::warn!("--credential is ignored for the local computer");
            }
            Ok(Box::new(LocalShell::new()))
        }
    }
}

/// Whether `name` refers to this machine.
pub fn is_local_name(name: &str) -> bool {
    let name = name.trim();
    if name.is_empty() || name == "." || name.eq_ignore_ascii_case("localhost") || name == "127.0.0.1" {
        return true;
    }
    let this = local::local_computer_name();
    let short = name.split('.').next().unwrap_or(name);
    short.eq_ignore_ascii_case(&this)
}
