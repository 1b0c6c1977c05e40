//! CLI subcommands.
//!
//! User-facing output uses writeln! to stdout; diagnostics go through tracing.

pub mod get;
pub mod lifecycle;
pub mod runtime;
pub mod set;
pub mod transfer;

use std::io::Write;

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use wecsub_core::Config;

use crate::host::HostShell;

/// Everything a subcommand needs besides its own arguments.
pub struct Context<'a> {
    pub shell: &'a dyn HostShell,
    pub config: &'a Config,
    pub non_interactive: bool,
    pub json: bool,
}

impl Context<'_> {
    pub fn wecutil_path(&self) -> &str {
        &self.config.wecutil_path
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List subscriptions and their properties
    Get(get::GetArgs),
    /// Change properties of existing subscriptions
    Set(set::SetArgs),
    /// Enable subscriptions
    Enable(lifecycle::NamesArgs),
    /// Disable subscriptions
    Disable(lifecycle::NamesArgs),
    /// Delete subscriptions
    Remove(lifecycle::NamesArgs),
    /// Show runtime status of subscriptions
    Status(runtime::RuntimeArgs),
    /// Retry inactive event sources of subscriptions
    Retry(runtime::RuntimeArgs),
    /// Save a subscription document to a local file
    Export(transfer::ExportArgs),
    /// Create a subscription from a local XML file
    Import(transfer::ImportArgs),
}

/// Execute a subcommand against the connected host.
pub fn run(ctx: &Context<'_>, command: Command) -> Result<()> {
    match command {
        Command::Get(args) => get::run(ctx, &args),
        Command::Set(args) => set::run(ctx, args),
        Command::Enable(args) => lifecycle::set_enabled(ctx, &args, true),
        Command::Disable(args) => lifecycle::set_enabled(ctx, &args, false),
        Command::Remove(args) => lifecycle::remove(ctx, &args),
        Command::Status(args) => runtime::status(ctx, &args),
        Command::Retry(args) => runtime::retry(ctx, &args),
        Command::Export(args) => transfer::export(ctx, &args),
        Command::Import(args) => transfer::import(ctx, &args),
    }
}

/// Per-subscription result of a mutating command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub computer_name: String,
    pub name: String,
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Print reports as JSON or one line each.
pub fn write_reports(out: &mut impl Write, reports: &[Report], json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(reports)?)?;
        return Ok(());
    }
    for r in reports {
        match &r.warning {
            Some(w) => writeln!(out, "{} '{}' on {} (warning: {w})", r.action, r.name, r.computer_name)?,
            None => writeln!(out, "{} '{}' on {}", r.action, r.name, r.computer_name)?,
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    fn report(warning: Option<&str>) -> Report {
        Report {
            computer_name: "wec01".into(),
            name: "TestSecurity".into(),
            action: "Updated",
            warning: warning.map(String::from),
        }
    }

    #[test]
    fn text_reports_mention_warning() {
        let mut out = Vec::new();
        write_reports(&mut out, &[report(None), report(Some("0x3ae8"))], false).expect("write");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(
            text,
            "Updated 'TestSecurity' on wec01\nUpdated 'TestSecurity' on wec01 (warning: 0x3ae8)\n"
        );
    }

    #[test]
    fn json_reports_omit_missing_warning() {
        let mut out = Vec::new();
        write_reports(&mut out, &[report(None)], true).expect("write");
        let value: serde_json::Value = serde_json::from_slice(&out).expect("json");
        assert_eq!(value[0]["computerName"], "wec01");
        assert!(value[0].get("warning").is_none());
    }
}
