//! Security descriptor for `<AllowedSourceDomainComputers>`.
//!
//! The element holds an SDDL string. wecsub always rebuilds it from scratch:
//! owner Network Service, group Built-in Administrators, a protected DACL with
//! one generic-read ACE per allowed identity, empty SACL.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;

/// Owner, group and DACL flags preceding the access entries.
pub const DESCRIPTOR_PREFIX: &str = "O:NSG:BAD:P";

/// Empty SACL terminating the descriptor.
pub const DESCRIPTOR_SUFFIX: &str = "S:";

static SID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^S-\d+-\d+(-\d+)+$").expect("static regex is valid"));

static ACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(([^;()]*);([^;()]*);([^;()]*);([^;()]*);([^;()]*);([^;()]*)\)")
        .expect("static regex is valid")
});

/// Translates account names (e.g. `CONTOSO\Domain Computers`) to SIDs.
pub trait SidResolver {
    fn resolve(&self, account: &str) -> Result<String>;
}

/// Whether `text` already is a SID string such as `S-1-5-21-1-2-3-515`.
pub fn is_sid(text: &str) -> bool {
    SID_RE.is_match(text.trim())
}

/// Resolve every entry to a SID, in input order.
///
/// SID strings pass through unchanged. An entry that fails to resolve is
/// logged and skipped; the remaining entries are still returned.
pub fn resolve_all(entries: &[String], resolver: &dyn SidResolver) -> Vec<String> {
    let mut sids = Vec::with_capacity(entries.len());
    for entry in entries {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        if is_sid(entry) {
            sids.push(entry.to_ascii_uppercase());
            continue;
        }
        match resolver.resolve(entry) {
            Ok(sid) if is_sid(&sid) => {
                tracing::debug!(account = entry, %sid, "resolved account");
                sids.push(sid.trim().to_ascii_uppercase());
            }
            Ok(other) => {
                tracing::warn!(account = entry, "resolver returned '{other}', which is not a SID; skipping");
            }
            Err(e) => {
                tracing::warn!(account = entry, "{e}; skipping");
            }
        }
    }
    sids
}

/// Build the descriptor granting generic read to each SID.
pub fn build_descriptor(sids: &[String]) -> String {
    let aces: String = sids.iter().map(|sid| format!("(A;;GR;;;{sid})")).collect();
    format!("{DESCRIPTOR_PREFIX}{aces}{DESCRIPTOR_SUFFIX}")
}

/// Trustees of the allow entries in a descriptor. Well-known aliases such as
/// `DC` are returned as written.
pub fn parse_descriptor_sids(descriptor: &str) -> Vec<String> {
    ACE_RE
        .captures_iter(descriptor)
        .filter(|caps| caps.get(1).is_some_and(|t| t.as_str() == "A"))
        .filter_map(|caps| caps.get(6).map(|m| m.as_str().to_string()))
        .collect()
}
