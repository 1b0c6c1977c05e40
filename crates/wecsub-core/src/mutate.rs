//! Property mutation of subscription documents.
//!
//! A [`SubscriptionChanges`] holds every property a caller may change. Fields
//! are applied one at a time in declaration order: batching and heartbeat
//! changes flip `ConfigurationMode` to `Custom`, and nothing applied earlier
//! may undo that.

use chrono::{DateTime, Utc};

use crate::document::SubscriptionDocument;
use crate::error::{Error, Result};
use crate::schema::{self, ConfigurationMode, ContentFormat, TransportName};
use crate::sddl::{self, SidResolver};

/// Requested property changes. `None` leaves the property untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionChanges {
    /// Rename the subscription (`SubscriptionId`).
    pub new_name: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub read_existing_events: Option<bool>,
    pub content_format: Option<ContentFormat>,
    pub log_file: Option<String>,
    /// Language tag for rendered text, e.g. `en-US`.
    pub locale: Option<String>,
    /// Query fragments (`<Select>` / `<Suppress>` elements) joined into one query.
    pub query: Option<Vec<String>>,
    pub max_latency_ms: Option<u64>,
    pub max_items: Option<u32>,
    pub heartbeat_interval_ms: Option<u64>,
    pub transport: Option<TransportName>,
    /// Account names or SIDs allowed to forward as domain members.
    pub allowed_source_domain_computers: Option<Vec<String>>,
    /// DNS name patterns of allowed non-domain computers.
    pub allowed_non_domain_dns: Option<Vec<String>>,
    /// Thumbprints of CAs allowed to issue non-domain client certificates.
    pub allowed_issuer_ca_thumbprints: Option<Vec<String>>,
    pub expires: Option<DateTime<Utc>>,
}

impl SubscriptionChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply to a copy of `doc`, leaving the original untouched.
    pub fn applied_to(
        &self,
        doc: &SubscriptionDocument,
        resolver: &dyn SidResolver,
    ) -> Result<SubscriptionDocument> {
        let mut copy = doc.clone();
        self.apply(&mut copy, resolver)?;
        Ok(copy)
    }

    /// Apply every requested change to `doc` in declaration order.
    pub fn apply(&self, doc: &mut SubscriptionDocument, resolver: &dyn SidResolver) -> Result<()> {
        if let Some(name) = &self.new_name {
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::invalid(schema::SUBSCRIPTION_ID, "name must not be empty"));
            }
            doc.set_text(&[schema::SUBSCRIPTION_ID], name)?;
        }
        if let Some(description) = &self.description {
            doc.set_text(&[schema::DESCRIPTION], description)?;
        }
        if let Some(enabled) = self.enabled {
            doc.set_text(&[schema::ENABLED], bool_text(enabled))?;
        }
        if let Some(read) = self.read_existing_events {
            doc.set_text(&[schema::READ_EXISTING_EVENTS], bool_text(read))?;
        }
        if let Some(format) = self.content_format {
            doc.set_text(&[schema::CONTENT_FORMAT], &format.to_string())?;
        }
        if let Some(log_file) = &self.log_file {
            doc.set_text(&[schema::LOG_FILE], log_file.trim())?;
        }
        if let Some(locale) = &self.locale {
            doc.set_attribute(&[schema::LOCALE], schema::ATTR_LANGUAGE, locale.trim())?;
        }
        if let Some(filters) = &self.query {
            doc.set_cdata(&[schema::QUERY], &build_query_list(filters)?)?;
        }
        if let Some(latency) = self.max_latency_ms {
            ensure_delivery(doc)?;
            doc.set_text(
                &[schema::DELIVERY, schema::BATCHING, schema::MAX_LATENCY_TIME],
                &latency.to_string(),
            )?;
            force_custom_mode(doc)?;
        }
        if let Some(items) = self.max_items {
            if items == 0 {
                return Err(Error::invalid(schema::MAX_ITEMS, "must be at least 1"));
            }
            ensure_delivery(doc)?;
            doc.set_text(
                &[schema::DELIVERY, schema::BATCHING, schema::MAX_ITEMS],
                &items.to_string(),
            )?;
            force_custom_mode(doc)?;
        }
        if let Some(interval) = self.heartbeat_interval_ms {
            ensure_delivery(doc)?;
            doc.set_attribute(
                &[schema::DELIVERY, schema::PUSH_SETTINGS, schema::HEARTBEAT],
                schema::ATTR_INTERVAL,
                &interval.to_string(),
            )?;
            force_custom_mode(doc)?;
        }
        if let Some(transport) = self.transport {
            doc.set_text(&[schema::TRANSPORT_NAME], &transport.to_string())?;
        }
        if let Some(entries) = &self.allowed_source_domain_computers {
            let sids = sddl::resolve_all(entries, resolver);
            if sids.len() < entries.len() {
                tracing::warn!(
                    requested = entries.len(),
                    granted = sids.len(),
                    "some domain computer entries were not added"
                );
            }
            doc.set_text(
                &[schema::ALLOWED_SOURCE_DOMAIN_COMPUTERS],
                &sddl::build_descriptor(&sids),
            )?;
        }
        if let Some(dns) = &self.allowed_non_domain_dns {
            ensure_non_domain_skeleton(doc)?;
            doc.replace_children(
                &[
                    schema::ALLOWED_SOURCE_NON_DOMAIN_COMPUTERS,
                    schema::ALLOWED_SUBJECT_LIST,
                ],
                schema::SUBJECT,
                &clean_list(dns),
            )?;
        }
        if let Some(thumbprints) = &self.allowed_issuer_ca_thumbprints {
            let normalized = thumbprints
                .iter()
                .map(|t| normalize_thumbprint(t))
                .collect::<Result<Vec<_>>>()?;
            ensure_non_domain_skeleton(doc)?;
            doc.replace_children(
                &[
                    schema::ALLOWED_SOURCE_NON_DOMAIN_COMPUTERS,
                    schema::ALLOWED_ISSUER_CA_LIST,
                ],
                schema::ISSUER_CA,
                &normalized,
            )?;
        }
        if let Some(expires) = self.expires {
            doc.set_text(&[schema::EXPIRES], &format_expires(expires))?;
        }
        Ok(())
    }
}

/// Build a single query list from filter fragments.
pub fn build_query_list(filters: &[String]) -> Result<String> {
    let body: String = filters
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .collect();
    if body.is_empty() {
        return Err(Error::invalid(schema::QUERY, "at least one filter is required"));
    }
    Ok(format!(r#"<QueryList><Query Id="0">{body}</Query></QueryList>"#))
}

/// Expiration timestamp in the form `wecutil` writes it.
pub fn format_expires(expires: DateTime<Utc>) -> String {
    expires.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Strip separators and upper-case a certificate thumbprint.
pub fn normalize_thumbprint(raw: &str) -> Result<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect::<String>()
        .to_ascii_uppercase();
    if cleaned.len() != 40 || !cleaned.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::invalid(
            schema::ISSUER_CA,
            format!("'{raw}' is not a 40-digit SHA-1 thumbprint"),
        ));
    }
    Ok(cleaned)
}

const fn bool_text(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn clean_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn ensure_delivery(doc: &mut SubscriptionDocument) -> Result<()> {
    let delivery = doc.ensure_path(&[schema::DELIVERY])?;
    delivery
        .attributes
        .entry(schema::ATTR_MODE.to_string())
        .or_insert_with(|| "Push".to_string());
    Ok(())
}

fn force_custom_mode(doc: &mut SubscriptionDocument) -> Result<()> {
    if doc.configuration_mode() != Some(ConfigurationMode::Custom) {
        tracing::debug!("switching configuration mode to Custom");
    }
    doc.set_text(
        &[schema::CONFIGURATION_MODE],
        &ConfigurationMode::Custom.to_string(),
    )
}

/// `<AllowedSourceNonDomainComputers>` with its three (possibly empty) lists.
fn ensure_non_domain_skeleton(doc: &mut SubscriptionDocument) -> Result<()> {
    for list in schema::NON_DOMAIN_ORDER {
        doc.ensure_path(&[schema::ALLOWED_SOURCE_NON_DOMAIN_COMPUTERS, list])?;
    }
    Ok(())
}
