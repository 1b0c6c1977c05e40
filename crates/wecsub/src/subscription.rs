//! Subscription records handed to callers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use wecsub_core::SubscriptionDocument;
use wecsub_core::error::Error;
use wecsub_core::schema::{self, ConfigurationMode, ContentFormat, TransportName};
use wecsub_core::sddl;

/// One subscription as found on one host.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub computer_name: String,
    /// Session profile the subscription was read through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    pub name: String,
    pub subscription_type: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub uri: Option<String>,
    pub configuration_mode: Option<ConfigurationMode>,
    pub delivery_mode: Option<String>,
    pub max_items: Option<u32>,
    pub max_latency_ms: Option<u64>,
    pub heartbeat_interval_ms: Option<u64>,
    pub expires: Option<DateTime<Utc>>,
    pub query: Option<String>,
    pub read_existing_events: Option<bool>,
    pub transport_name: Option<TransportName>,
    pub content_format: Option<ContentFormat>,
    pub locale: Option<String>,
    pub log_file: Option<String>,
    pub publisher_name: Option<String>,
    pub allowed_source_domain_computers: Option<String>,
    /// Trustees granted access by `allowed_source_domain_computers`.
    pub allowed_source_domain_sids: Vec<String>,
    pub allowed_non_domain_subjects: Vec<String>,
    pub allowed_issuer_cas: Vec<String>,
    #[serde(skip)]
    pub document: SubscriptionDocument,
}

impl Subscription {
    /// Wrap a fetched document together with where it came from.
    pub fn build(
        computer_name: &str,
        session: Option<&str>,
        document: SubscriptionDocument,
    ) -> Result<Self, Error> {
        let name = document
            .subscription_id()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::MissingElement(schema::SUBSCRIPTION_ID.into()))?;
        let allowed_source_domain_computers = document.allowed_source_domain_computers();
        let allowed_source_domain_sids = allowed_source_domain_computers
            .as_deref()
            .map(sddl::parse_descriptor_sids)
            .unwrap_or_default();

        Ok(Self {
            computer_name: computer_name.to_string(),
            session: session.map(String::from),
            name,
            subscription_type: document.subscription_type(),
            description: document.description(),
            enabled: document.enabled(),
            uri: document.uri(),
            configuration_mode: document.configuration_mode(),
            delivery_mode: document.delivery_mode(),
            max_items: document.max_items(),
            max_latency_ms: document.max_latency_ms(),
            heartbeat_interval_ms: document.heartbeat_interval_ms(),
            expires: document.expires(),
            query: document.query(),
            read_existing_events: document.read_existing_events(),
            transport_name: document.transport_name(),
            content_format: document.content_format(),
            locale: document.locale(),
            log_file: document.log_file(),
            publisher_name: document.publisher_name(),
            allowed_source_domain_computers,
            allowed_source_domain_sids,
            allowed_non_domain_subjects: document.allowed_non_domain_subjects(),
            allowed_issuer_cas: document.allowed_issuer_cas(),
            document,
        })
    }
}
