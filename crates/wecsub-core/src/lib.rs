//! wecsub core library
//!
//! Host-independent pieces of the subscription tooling:
//! - Subscription document model over the WEC subscription schema
//! - Property mutation with schema-aware element insertion
//! - Security descriptor construction for domain source computers
//! - Configuration resolution and hierarchy

pub mod config;
pub mod document;
pub mod duration;
pub mod error;
pub mod mutate;
pub mod schema;
pub mod sddl;
pub mod tracing_init;
pub mod wildcard;

pub use config::Config;
pub use document::SubscriptionDocument;
pub use error::{Error, Result};
pub use mutate::SubscriptionChanges;
pub use sddl::SidResolver;
pub use wildcard::WildcardPattern;
