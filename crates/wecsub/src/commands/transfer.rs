use std::io;
use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use clap::Args;
use wecsub_core::SubscriptionDocument;
use wecsub_core::schema;

use super::{Context, Report, write_reports};
use crate::apply::{self, ApplyOutcome};
use crate::enumerate::enumerate;
use crate::service::ensure_collector_running;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Subscription name; must match exactly one subscription
    pub name: String,

    /// Local file to write the XML document to
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Local subscription XML file
    pub file: PathBuf,

    /// Create under this name instead of the one in the file
    #[arg(long)]
    pub name: Option<String>,
}

pub fn export(ctx: &Context<'_>, args: &ExportArgs) -> Result<()> {
    let mut subscriptions = enumerate(ctx.shell, ctx.wecutil_path(), std::slice::from_ref(&args.name))?;
    let sub = match subscriptions.len() {
        1 => subscriptions.remove(0),
        0 => bail!("no subscription matching '{}'", args.name),
        n => bail!("'{}' matched {n} subscriptions; export needs exactly one", args.name),
    };

    let xml = sub.document.to_xml()?;
    std::fs::write(&args.output, xml)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    tracing::info!(subscription = %sub.name, path = %args.output.display(), "exported");

    write_reports(
        &mut io::stdout(),
        &[Report {
            computer_name: sub.computer_name,
            name: sub.name,
            action: "Exported",
            warning: None,
        }],
        ctx.json,
    )
}

pub fn import(ctx: &Context<'_>, args: &ImportArgs) -> Result<()> {
    let xml = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let mut document = SubscriptionDocument::parse(&xml)
        .with_context(|| format!("{} is not a subscription document", args.file.display()))?;
    if let Some(name) = &args.name {
        document.set_text(&[schema::SUBSCRIPTION_ID], name.trim())?;
    }
    let name = document
        .subscription_id()
        .filter(|n| !n.is_empty())
        .context("subscription document has no SubscriptionId")?;

    ensure_collector_running(ctx.shell)?;
    let outcome = apply::import(ctx.shell, ctx.wecutil_path(), &document)?;
    write_reports(
        &mut io::stdout(),
        &[Report {
            computer_name: ctx.shell.computer().to_string(),
            name,
            action: "Imported",
            warning: match outcome {
                ApplyOutcome::Applied => None,
                ApplyOutcome::AppliedWithWarning(w) => Some(w),
            },
        }],
        ctx.json,
    )
}
