use std::io;

use anyhow::Result;
use clap::Args;
use wecsub_core::SubscriptionChanges;

use super::{Context, Report, set, write_reports};
use crate::enumerate::matching_names;
use crate::error::WecError;
use crate::prompt;
use crate::service::ensure_collector_running;
use crate::wecutil::{Verdict, Wecutil};

/// Subscription names plus confirmation control.
#[derive(Debug, Args)]
pub struct NamesArgs {
    /// Subscription names; wildcards allowed
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// `enable` / `disable`.
pub fn set_enabled(ctx: &Context<'_>, args: &NamesArgs, enabled: bool) -> Result<()> {
    let changes = SubscriptionChanges {
        enabled: Some(enabled),
        ..SubscriptionChanges::default()
    };
    set::update(ctx, &args.names, &changes, args.yes, false)
}

/// `remove`: `wecutil ds` for every matching subscription.
pub fn remove(ctx: &Context<'_>, args: &NamesArgs) -> Result<()> {
    ensure_collector_running(ctx.shell)?;
    let wecutil = Wecutil::new(ctx.shell, ctx.wecutil_path());
    let computer = ctx.shell.computer();

    let mut reports = Vec::new();
    for name in matching_names(&wecutil, &args.names)? {
        let question = format!("Delete subscription '{name}' on {computer}?");
        if !prompt::confirm(&question, args.yes, ctx.non_interactive)? {
            tracing::info!(subscription = %name, "skipped");
            continue;
        }
        tracing::info!(computer, subscription = %name, "deleting subscription");
        if let Verdict::Failure(message) | Verdict::Warning(message) = wecutil.delete(&name)? {
            return Err(WecError::Delete {
                computer: computer.to_string(),
                name,
                message,
            }
            .into());
        }
        reports.push(Report {
            computer_name: computer.to_string(),
            name,
            action: "Removed",
            warning: None,
        });
    }

    write_reports(&mut io::stdout(), &reports, ctx.json)
}
