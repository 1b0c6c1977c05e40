use anyhow::{Result, bail};
use dialoguer::{Confirm, Password};

/// Environment variable consulted before prompting for a remoting password.
pub const PASSWORD_ENV: &str = "WECSUB_PASSWORD";

/// Ask before a destructive step. Skipped by `--yes` and in
/// non-interactive runs.
pub fn confirm(prompt: &str, yes: bool, non_interactive: bool) -> Result<bool> {
    if yes || non_interactive {
        return Ok(true);
    }
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}

/// Password for `username`, from the environment or typed in.
pub fn password(username: &str, non_interactive: bool) -> Result<String> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok(pw);
    }
    if non_interactive {
        bail!("no password for '{username}': set {PASSWORD_ENV} when running non-interactively");
    }
    let pw: String = Password::new()
        .with_prompt(format!("Password for {username}"))
        .interact()?;
    Ok(pw)
}
