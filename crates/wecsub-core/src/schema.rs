//! Names and enumerations of the Windows Event Collector subscription schema.
//!
//! The schema is owned by the operating system; these values must match what
//! `wecutil.exe` emits and accepts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Namespace of every element in a subscription document.
pub const SUBSCRIPTION_NS: &str = "http://schemas.microsoft.com/2006/03/windows/events/subscription";

pub const SUBSCRIPTION: &str = "Subscription";
pub const SUBSCRIPTION_ID: &str = "SubscriptionId";
pub const SUBSCRIPTION_TYPE: &str = "SubscriptionType";
pub const DESCRIPTION: &str = "Description";
pub const ENABLED: &str = "Enabled";
pub const URI: &str = "Uri";
pub const CONFIGURATION_MODE: &str = "ConfigurationMode";
pub const DELIVERY: &str = "Delivery";
pub const BATCHING: &str = "Batching";
pub const MAX_ITEMS: &str = "MaxItems";
pub const MAX_LATENCY_TIME: &str = "MaxLatencyTime";
pub const PUSH_SETTINGS: &str = "PushSettings";
pub const HEARTBEAT: &str = "Heartbeat";
pub const EXPIRES: &str = "Expires";
pub const QUERY: &str = "Query";
pub const READ_EXISTING_EVENTS: &str = "ReadExistingEvents";
pub const TRANSPORT_NAME: &str = "TransportName";
pub const TRANSPORT_PORT: &str = "TransportPort";
pub const CONTENT_FORMAT: &str = "ContentFormat";
pub const LOCALE: &str = "Locale";
pub const LOG_FILE: &str = "LogFile";
pub const PUBLISHER_NAME: &str = "PublisherName";
pub const ALLOWED_SOURCE_NON_DOMAIN_COMPUTERS: &str = "AllowedSourceNonDomainComputers";
pub const ALLOWED_ISSUER_CA_LIST: &str = "AllowedIssuerCAList";
pub const ISSUER_CA: &str = "IssuerCA";
pub const ALLOWED_SUBJECT_LIST: &str = "AllowedSubjectList";
pub const SUBJECT: &str = "Subject";
pub const DENIED_SUBJECT_LIST: &str = "DeniedSubjectList";
pub const ALLOWED_SOURCE_DOMAIN_COMPUTERS: &str = "AllowedSourceDomainComputers";

pub const ATTR_MODE: &str = "Mode";
pub const ATTR_INTERVAL: &str = "Interval";
pub const ATTR_LANGUAGE: &str = "Language";

/// Top-level children of `<Subscription>` in the order `wecutil gs` emits them.
pub const TOP_LEVEL_ORDER: &[&str] = &[
    SUBSCRIPTION_ID,
    SUBSCRIPTION_TYPE,
    DESCRIPTION,
    ENABLED,
    URI,
    CONFIGURATION_MODE,
    DELIVERY,
    EXPIRES,
    QUERY,
    READ_EXISTING_EVENTS,
    TRANSPORT_NAME,
    TRANSPORT_PORT,
    CONTENT_FORMAT,
    LOCALE,
    LOG_FILE,
    PUBLISHER_NAME,
    ALLOWED_SOURCE_NON_DOMAIN_COMPUTERS,
    ALLOWED_SOURCE_DOMAIN_COMPUTERS,
];

/// Children of `<Delivery>`.
pub const DELIVERY_ORDER: &[&str] = &[BATCHING, PUSH_SETTINGS];

/// Children of `<Batching>`.
pub const BATCHING_ORDER: &[&str] = &[MAX_ITEMS, MAX_LATENCY_TIME];

/// Children of `<AllowedSourceNonDomainComputers>`.
pub const NON_DOMAIN_ORDER: &[&str] =
    &[ALLOWED_ISSUER_CA_LIST, ALLOWED_SUBJECT_LIST, DENIED_SUBJECT_LIST];

/// Canonical sibling order for children of the element named `parent`.
pub fn child_order(parent: &str) -> &'static [&'static str] {
    match parent {
        SUBSCRIPTION => TOP_LEVEL_ORDER,
        DELIVERY => DELIVERY_ORDER,
        BATCHING => BATCHING_ORDER,
        ALLOWED_SOURCE_NON_DOMAIN_COMPUTERS => NON_DOMAIN_ORDER,
        _ => &[],
    }
}

/// Format of forwarded event content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentFormat {
    Events,
    RenderedText,
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Events => write!(f, "Events"),
            Self::RenderedText => write!(f, "RenderedText"),
        }
    }
}

impl FromStr for ContentFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "events" => Ok(Self::Events),
            "renderedtext" => Ok(Self::RenderedText),
            _ => Err(Error::invalid(
                CONTENT_FORMAT,
                format!("unknown content format '{s}' (expected Events or RenderedText)"),
            )),
        }
    }
}

/// Transport used by source computers to reach the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportName {
    #[serde(rename = "HTTP")]
    Http,
    #[serde(rename = "HTTPS")]
    Https,
}

impl fmt::Display for TransportName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "HTTP"),
            Self::Https => write!(f, "HTTPS"),
        }
    }
}

impl FromStr for TransportName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HTTP" => Ok(Self::Http),
            "HTTPS" => Ok(Self::Https),
            _ => Err(Error::invalid(
                TRANSPORT_NAME,
                format!("unknown transport '{s}' (expected HTTP or HTTPS)"),
            )),
        }
    }
}

/// Delivery optimization preset. `Custom` means the batching and heartbeat
/// values in `<Delivery>` are honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigurationMode {
    Normal,
    MinLatency,
    MinBandwidth,
    Custom,
}

impl fmt::Display for ConfigurationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "Normal"),
            Self::MinLatency => write!(f, "MinLatency"),
            Self::MinBandwidth => write!(f, "MinBandwidth"),
            Self::Custom => write!(f, "Custom"),
        }
    }
}

impl FromStr for ConfigurationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "minlatency" => Ok(Self::MinLatency),
            "minbandwidth" => Ok(Self::MinBandwidth),
            "custom" => Ok(Self::Custom),
            _ => Err(Error::invalid(
                CONFIGURATION_MODE,
                format!("unknown configuration mode '{s}'"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_format_parse_is_case_insensitive() {
        assert_eq!("renderedtext".parse::<ContentFormat>().ok(), Some(ContentFormat::RenderedText));
        assert_eq!("Events".parse::<ContentFormat>().ok(), Some(ContentFormat::Events));
        assert!("xml".parse::<ContentFormat>().is_err());
    }

    #[test]
    fn transport_display_is_upper_case() {
        assert_eq!(TransportName::Https.to_string(), "HTTPS");
        assert_eq!("https".parse::<TransportName>().ok(), Some(TransportName::Https));
    }

    #[test]
    fn top_level_order_ends_with_access_lists() {
        let n = TOP_LEVEL_ORDER.len();
        assert_eq!(TOP_LEVEL_ORDER[n - 1], ALLOWED_SOURCE_DOMAIN_COMPUTERS);
        assert_eq!(TOP_LEVEL_ORDER[n - 2], ALLOWED_SOURCE_NON_DOMAIN_COMPUTERS);
    }

    #[test]
    fn unknown_parent_has_no_order() {
        assert!(child_order("Heartbeat").is_empty());
    }
}
