use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::{Context, Report, write_reports};
use crate::enumerate::matching_names;
use crate::service::ensure_collector_running;
use crate::wecutil::Wecutil;

#[derive(Debug, Args)]
pub struct RuntimeArgs {
    /// Subscription names; wildcards allowed. Defaults to all
    pub names: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RuntimeStatus {
    computer_name: String,
    name: String,
    status: String,
}

/// `status`: `wecutil gr` for every matching subscription.
pub fn status(ctx: &Context<'_>, args: &RuntimeArgs) -> Result<()> {
    ensure_collector_running(ctx.shell)?;
    let wecutil = Wecutil::new(ctx.shell, ctx.wecutil_path());
    let computer = ctx.shell.computer();

    let mut statuses = Vec::new();
    for name in matching_names(&wecutil, &args.names)? {
        match wecutil.runtime_status(&name) {
            Ok(status) => statuses.push(RuntimeStatus {
                computer_name: computer.to_string(),
                name,
                status: status.trim_end().to_string(),
            }),
            Err(e) => tracing::warn!(computer, subscription = %name, "{e:#}"),
        }
    }

    let mut out = io::stdout();
    if ctx.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&statuses)?)?;
        return Ok(());
    }
    for (i, s) in statuses.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(out, "== {} ({}) ==", s.name, s.computer_name)?;
        writeln!(out, "{}", s.status)?;
    }
    Ok(())
}

/// `retry`: `wecutil rs` for every matching subscription.
pub fn retry(ctx: &Context<'_>, args: &RuntimeArgs) -> Result<()> {
    ensure_collector_running(ctx.shell)?;
    let wecutil = Wecutil::new(ctx.shell, ctx.wecutil_path());
    let computer = ctx.shell.computer();

    let mut reports = Vec::new();
    for name in matching_names(&wecutil, &args.names)? {
        tracing::info!(computer, subscription = %name, "retrying inactive sources");
        wecutil.retry(&name)?;
        reports.push(Report {
            computer_name: computer.to_string(),
            name,
            action: "Retried",
            warning: None,
        });
    }
    write_reports(&mut io::stdout(), &reports, ctx.json)
}
