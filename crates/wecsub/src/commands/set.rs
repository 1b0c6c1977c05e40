use std::io::{self, Write};

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use wecsub_core::SubscriptionChanges;
use wecsub_core::duration::parse_millis;
use wecsub_core::schema::{ContentFormat, TransportName};

use super::{Context, Report, write_reports};
use crate::apply::{ApplyOutcome, apply};
use crate::enumerate::enumerate;
use crate::host::PowerShellSidResolver;
use crate::prompt;
use crate::wecutil::Wecutil;

/// Arguments for the `set` subcommand.
#[derive(Debug, Default, Args)]
pub struct SetArgs {
    /// Subscription name; wildcards select several subscriptions
    pub name: String,

    /// Rename the subscription (only when NAME matches exactly one)
    #[arg(long)]
    pub new_name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// true or false
    #[arg(long)]
    pub enabled: Option<bool>,

    /// Forward events already in the source logs (true or false)
    #[arg(long)]
    pub read_existing_events: Option<bool>,

    /// Events or RenderedText
    #[arg(long, value_parser = parse_content_format)]
    pub content_format: Option<ContentFormat>,

    /// Destination log on the collector
    #[arg(long)]
    pub log_file: Option<String>,

    /// Locale for rendered text, e.g. en-US
    #[arg(long)]
    pub locale: Option<String>,

    /// `<Select>`/`<Suppress>` fragment; repeat to combine several
    #[arg(long)]
    pub query: Option<Vec<String>>,

    /// Delivery latency, e.g. 30s, 15m, 900000 (ms); switches to Custom mode
    #[arg(long, value_parser = parse_duration)]
    pub max_latency: Option<u64>,

    /// Events per batch; switches to Custom mode
    #[arg(long)]
    pub max_items: Option<u32>,

    /// Heartbeat interval, same format as --max-latency; switches to Custom mode
    #[arg(long, value_parser = parse_duration)]
    pub heartbeat_interval: Option<u64>,

    /// HTTP or HTTPS
    #[arg(long, value_parser = parse_transport)]
    pub transport: Option<TransportName>,

    /// Domain computer or group (name or SID) allowed to forward; repeatable
    #[arg(long = "domain-computer")]
    pub domain_computers: Option<Vec<String>>,

    /// DNS name pattern of a non-domain source; repeatable
    #[arg(long = "non-domain-dns")]
    pub non_domain_dns: Option<Vec<String>>,

    /// Thumbprint of an issuing CA for non-domain sources; repeatable
    #[arg(long = "issuer-ca-thumbprint")]
    pub issuer_ca_thumbprints: Option<Vec<String>>,

    /// Expiry as RFC 3339 timestamp or YYYY-MM-DD (UTC midnight)
    #[arg(long, value_parser = parse_expires)]
    pub expires: Option<DateTime<Utc>>,

    /// Print the resulting documents instead of applying them
    #[arg(long)]
    pub what_if: bool,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

impl SetArgs {
    pub fn changes(&self) -> SubscriptionChanges {
        SubscriptionChanges {
            new_name: self.new_name.clone(),
            description: self.description.clone(),
            enabled: self.enabled,
            read_existing_events: self.read_existing_events,
            content_format: self.content_format,
            log_file: self.log_file.clone(),
            locale: self.locale.clone(),
            query: self.query.clone(),
            max_latency_ms: self.max_latency,
            max_items: self.max_items,
            heartbeat_interval_ms: self.heartbeat_interval,
            transport: self.transport,
            allowed_source_domain_computers: self.domain_computers.clone(),
            allowed_non_domain_dns: self.non_domain_dns.clone(),
            allowed_issuer_ca_thumbprints: self.issuer_ca_thumbprints.clone(),
            expires: self.expires,
        }
    }
}

fn parse_content_format(s: &str) -> Result<ContentFormat, String> {
    s.parse().map_err(|e: wecsub_core::Error| e.to_string())
}

fn parse_transport(s: &str) -> Result<TransportName, String> {
    s.parse().map_err(|e: wecsub_core::Error| e.to_string())
}

fn parse_duration(s: &str) -> Result<u64, String> {
    parse_millis(s).map_err(|e| e.to_string())
}

fn parse_expires(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid expiry '{s}' (expected RFC 3339 or YYYY-MM-DD)"))
}

pub fn run(ctx: &Context<'_>, args: SetArgs) -> Result<()> {
    let changes = args.changes();
    if changes.is_empty() {
        bail!("nothing to change: pass at least one property flag");
    }
    update(ctx, &[args.name], &changes, args.yes, args.what_if)
}

/// Mutate and re-apply every subscription matching `patterns`.
pub(crate) fn update(
    ctx: &Context<'_>,
    patterns: &[String],
    changes: &SubscriptionChanges,
    yes: bool,
    what_if: bool,
) -> Result<()> {
    let subscriptions = enumerate(ctx.shell, ctx.wecutil_path(), patterns)?;
    if changes.new_name.is_some() && subscriptions.len() > 1 {
        bail!(
            "--new-name needs exactly one subscription, but {} matched",
            subscriptions.len()
        );
    }

    if let Some(new_name) = changes.new_name.as_deref().map(str::trim)
        && let Some(sub) = subscriptions.first()
        && !sub.name.eq_ignore_ascii_case(new_name)
    {
        let existing = Wecutil::new(ctx.shell, ctx.wecutil_path()).enumerate()?;
        if existing.iter().any(|n| n.eq_ignore_ascii_case(new_name)) {
            bail!(
                "cannot rename '{}': a subscription named '{new_name}' already exists on {}",
                sub.name,
                sub.computer_name
            );
        }
    }

    let resolver = PowerShellSidResolver::new(ctx.shell, &ctx.config.powershell_path);
    let mut out = io::stdout();
    let mut reports = Vec::new();

    for sub in &subscriptions {
        let updated = changes.applied_to(&sub.document, &resolver)?;
        if what_if {
            writeln!(out, "{}", updated.to_xml()?)?;
            continue;
        }
        if updated == sub.document {
            tracing::info!(computer = %sub.computer_name, subscription = %sub.name, "already up to date");
            continue;
        }
        let question = format!("Replace subscription '{}' on {}?", sub.name, sub.computer_name);
        if !prompt::confirm(&question, yes, ctx.non_interactive)? {
            tracing::info!(subscription = %sub.name, "skipped");
            continue;
        }

        let outcome = apply(ctx.shell, ctx.wecutil_path(), &sub.name, &updated)?;
        reports.push(Report {
            computer_name: sub.computer_name.clone(),
            name: updated.subscription_id().unwrap_or_else(|| sub.name.clone()),
            action: "Updated",
            warning: match outcome {
                ApplyOutcome::Applied => None,
                ApplyOutcome::AppliedWithWarning(w) => Some(w),
            },
        });
    }

    if !what_if {
        write_reports(&mut out, &reports, ctx.json)?;
    }
    Ok(())
}
