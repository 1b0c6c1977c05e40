//! Find subscriptions on a host and fetch their documents.

use anyhow::Result;
use wecsub_core::{SubscriptionDocument, WildcardPattern};

use crate::host::HostShell;
use crate::service::ensure_collector_running;
use crate::subscription::Subscription;
use crate::wecutil::Wecutil;

/// Subscription names on the host matching any of `patterns`, in the order
/// `wecutil es` lists them. An empty pattern list matches everything.
///
/// A pattern matching nothing is logged as a warning.
pub fn matching_names(wecutil: &Wecutil<'_>, patterns: &[String]) -> Result<Vec<String>> {
    let compiled = if patterns.is_empty() {
        vec![WildcardPattern::new("*")?]
    } else {
        patterns
            .iter()
            .map(|p| WildcardPattern::new(p))
            .collect::<Result<Vec<_>, _>>()?
    };

    let names = wecutil.enumerate()?;
    tracing::debug!(
        computer = wecutil.shell().computer(),
        total = names.len(),
        "enumerated subscriptions"
    );

    let mut matched = Vec::new();
    for name in &names {
        if compiled.iter().any(|p| p.is_match(name)) && !matched.contains(name) {
            matched.push(name.clone());
        }
    }

    for pattern in &compiled {
        if names.iter().any(|n| pattern.is_match(n)) {
            continue;
        }
        let computer = wecutil.shell().computer();
        if pattern.has_wildcards() {
            tracing::warn!(computer, "no subscription matching '{}'", pattern.as_str());
        } else {
            tracing::warn!(computer, "subscription '{}' not found", pattern.as_str());
        }
    }

    Ok(matched)
}

/// Fetch one subscription document and wrap it as a record.
pub fn fetch(wecutil: &Wecutil<'_>, name: &str) -> Result<Subscription> {
    let shell = wecutil.shell();
    let xml = wecutil.get_xml(name)?;
    let document = SubscriptionDocument::parse(&xml)?;
    Ok(Subscription::build(
        shell.computer(),
        shell.session_name(),
        document,
    )?)
}

/// Enumerate subscriptions matching `patterns` and fetch each of them.
///
/// Fails before any query if the collector service is not running. A
/// subscription that disappears or cannot be read between listing and
/// fetching is skipped with a warning.
pub fn enumerate(
    shell: &dyn HostShell,
    wecutil_path: &str,
    patterns: &[String],
) -> Result<Vec<Subscription>> {
    ensure_collector_running(shell)?;
    let wecutil = Wecutil::new(shell, wecutil_path);

    let mut subscriptions = Vec::new();
    for name in matching_names(&wecutil, patterns)? {
        match fetch(&wecutil, &name) {
            Ok(sub) => subscriptions.push(sub),
            Err(e) => {
                tracing::warn!(computer = shell.computer(), subscription = %name, "skipping: {e:#}");
            }
        }
    }
    Ok(subscriptions)
}
