//! Rendering of subscription records for the terminal.

use std::fmt::Write as _;

use anyhow::Result;

use crate::subscription::Subscription;

/// Output layout for subscription listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Table,
    List,
    Json,
}

pub fn render(subscriptions: &[Subscription], format: Format) -> Result<String> {
    match format {
        Format::Table => Ok(render_table(subscriptions)),
        Format::List => Ok(render_list(subscriptions)),
        Format::Json => Ok(serde_json::to_string_pretty(subscriptions)?),
    }
}

fn opt<T: ToString>(value: Option<&T>) -> String {
    value.map_or_else(|| "-".to_string(), ToString::to_string)
}

/// One row per subscription.
pub fn render_table(subscriptions: &[Subscription]) -> String {
    const HEADERS: [&str; 6] = ["COMPUTER", "NAME", "ENABLED", "TYPE", "MODE", "LOGFILE"];

    let rows: Vec<[String; 6]> = subscriptions
        .iter()
        .map(|s| {
            [
                s.computer_name.clone(),
                s.name.clone(),
                opt(s.enabled.as_ref()),
                opt(s.subscription_type.as_ref()),
                opt(s.configuration_mode.as_ref()),
                opt(s.log_file.as_ref()),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut line = |cells: &[&str]| {
        let text: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(c, w)| format!("{c:<w$}"))
            .collect();
        let _ = writeln!(out, "{}", text.join("  ").trim_end());
    };
    line(&HEADERS);
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        line(&cells);
    }
    out
}

/// Every property, one subscription after another.
pub fn render_list(subscriptions: &[Subscription]) -> String {
    let mut out = String::new();
    for (i, s) in subscriptions.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let mut field = |label: &str, value: String| {
            let _ = writeln!(out, "{label:<28}: {value}");
        };
        field("ComputerName", s.computer_name.clone());
        if let Some(session) = &s.session {
            field("Session", session.clone());
        }
        field("Name", s.name.clone());
        field("SubscriptionType", opt(s.subscription_type.as_ref()));
        field("Description", opt(s.description.as_ref()));
        field("Enabled", opt(s.enabled.as_ref()));
        field("Uri", opt(s.uri.as_ref()));
        field("ConfigurationMode", opt(s.configuration_mode.as_ref()));
        field("DeliveryMode", opt(s.delivery_mode.as_ref()));
        field("MaxItems", opt(s.max_items.as_ref()));
        field("MaxLatencyTime (ms)", opt(s.max_latency_ms.as_ref()));
        field("HeartbeatInterval (ms)", opt(s.heartbeat_interval_ms.as_ref()));
        field(
            "Expires",
            s.expires
                .map_or_else(|| "-".to_string(), |e| e.to_rfc3339()),
        );
        field("ReadExistingEvents", opt(s.read_existing_events.as_ref()));
        field("TransportName", opt(s.transport_name.as_ref()));
        field("ContentFormat", opt(s.content_format.as_ref()));
        field("Locale", opt(s.locale.as_ref()));
        field("LogFile", opt(s.log_file.as_ref()));
        field("PublisherName", opt(s.publisher_name.as_ref()));
        field(
            "AllowedSourceDomainComputers",
            opt(s.allowed_source_domain_computers.as_ref()),
        );
        field("AllowedSourceDomainSids", s.allowed_source_domain_sids.join(", "));
        field("AllowedSubjects", s.allowed_non_domain_subjects.join(", "));
        field("AllowedIssuerCAs", s.allowed_issuer_cas.join(", "));
        field("Query", opt(s.query.as_ref()));
    }
    out
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use wecsub_core::SubscriptionDocument;

    use super::*;

    fn record(name: &str, enabled: bool) -> Subscription {
        let xml = format!(
            r#"<Subscription xmlns="http://schemas.microsoft.com/2006/03/windows/events/subscription">
  <SubscriptionId>{name}</SubscriptionId>
  <SubscriptionType>SourceInitiated</SubscriptionType>
  <Enabled>{enabled}</Enabled>
  <ConfigurationMode>Custom</ConfigurationMode>
  <LogFile>ForwardedEvents</LogFile>
</Subscription>"#
        );
        let doc = SubscriptionDocument::parse(&xml).expect("parse");
        Subscription::build("wec01", None, doc).expect("build")
    }

    #[test]
    fn table_aligns_columns() {
        let table = render_table(&[record("TestSecurity", true), record("Sysmon", false)]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("COMPUTER  NAME          ENABLED"));
        assert!(lines[1].contains("TestSecurity  true"));
        assert!(lines[2].contains("Sysmon        false"));
    }

    #[test]
    fn empty_table_has_only_headers() {
        assert_eq!(render_table(&[]).lines().count(), 1);
    }

    #[test]
    fn list_shows_missing_values_as_dash() {
        let list = render_list(&[record("TestSecurity", true)]);
        assert!(list.contains("Name                        : TestSecurity"));
        assert!(list.contains("Locale                      : -"));
    }

    #[test]
    fn json_is_an_array() {
        let json = render(&[record("A", true)], Format::Json).expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(value[0]["name"], "A");
    }
}
