#![allow(clippy::unwrap_used)] // Integration tests use unwrap for brevity

//! Enumeration and delete-then-create flows against an in-memory collector.

mod common;

use common::{FakeHost, TEMP_DIR, WECUTIL};
use wecsub::apply::{ApplyOutcome, apply, import};
use wecsub::cmd::CommandOutput;
use wecsub::enumerate::enumerate;
use wecsub::error::WecError;
use wecsub_core::{SidResolver, SubscriptionChanges, SubscriptionDocument};

struct NoAccounts;

impl SidResolver for NoAccounts {
    fn resolve(&self, account: &str) -> wecsub_core::Result<String> {
        Err(wecsub_core::Error::SidResolution {
            account: account.to_string(),
            reason: "no directory".into(),
        })
    }
}

fn host() -> FakeHost {
    FakeHost::new()
        .with_subscription("TestSecurity")
        .with_subscription("Sysmon")
        .with_subscription("TestDns")
}

#[test]
fn wildcard_enumeration_returns_only_matching_names() {
    let host = host();
    let subs = enumerate(&host, WECUTIL, &["Test*".to_string()]).unwrap();
    let names: Vec<&str> = subs.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["TestSecurity", "TestDns"]);
    assert!(subs.iter().all(|s| s.computer_name == "wec01"));
}

#[test]
fn empty_pattern_list_returns_everything() {
    let subs = enumerate(&host(), WECUTIL, &[]).unwrap();
    assert_eq!(subs.len(), 3);
}

#[test]
fn overlapping_patterns_do_not_duplicate() {
    let patterns = vec!["Test*".to_string(), "testsecurity".to_string()];
    let subs = enumerate(&host(), WECUTIL, &patterns).unwrap();
    assert_eq!(subs.len(), 2);
}

#[test]
fn unmatched_pattern_yields_no_record() {
    let subs = enumerate(&host(), WECUTIL, &["Missing".to_string()]).unwrap();
    assert!(subs.is_empty());
}

#[test]
fn stopped_service_fails_before_any_query() {
    let mut host = host();
    host.service_running = false;
    let err = enumerate(&host, WECUTIL, &[]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<WecError>(),
        Some(WecError::ServiceNotRunning { .. })
    ));
    assert!(host.calls_starting_with(WECUTIL).is_empty());
}

#[test]
fn unreadable_subscription_is_skipped() {
    let host = host().with_override(
        "wecutil gs Sysmon",
        CommandOutput::failed(5, "Failed to open subscription. Error = 0x5."),
    );
    let subs = enumerate(&host, WECUTIL, &[]).unwrap();
    let names: Vec<&str> = subs.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["TestSecurity", "TestDns"]);
}

#[test]
fn apply_deletes_then_creates_and_cleans_up() {
    let host = host();
    let sub = enumerate(&host, WECUTIL, &["TestSecurity".to_string()])
        .unwrap()
        .remove(0);
    let changes = SubscriptionChanges {
        enabled: Some(false),
        max_latency_ms: Some(30_000),
        ..SubscriptionChanges::default()
    };
    let updated = changes.applied_to(&sub.document, &NoAccounts).unwrap();

    let outcome = apply(&host, WECUTIL, "TestSecurity", &updated).unwrap();
    assert_eq!(outcome, ApplyOutcome::Applied);

    let calls = host.calls.borrow().clone();
    let write = calls.iter().position(|c| c.starts_with("write ")).unwrap();
    let delete = calls.iter().position(|c| c == "wecutil ds TestSecurity").unwrap();
    let create = calls.iter().position(|c| c.starts_with("wecutil cs ")).unwrap();
    let remove = calls.iter().position(|c| c.starts_with("remove ")).unwrap();
    assert!(write < delete && delete < create && create < remove);

    let staged = calls[write].trim_start_matches("write ");
    assert!(staged.starts_with(TEMP_DIR));
    assert!(staged.ends_with(".xml"));
    assert!(host.files.borrow().is_empty());

    let stored = host.document("TestSecurity").unwrap();
    assert_eq!(stored.enabled(), Some(false));
    assert_eq!(stored.max_latency_ms(), Some(30_000));
    assert_eq!(stored.configuration_mode().map(|m| m.to_string()).as_deref(), Some("Custom"));
}

#[test]
fn rename_replaces_the_original() {
    let host = host();
    let sub = enumerate(&host, WECUTIL, &["TestDns".to_string()])
        .unwrap()
        .remove(0);
    let changes = SubscriptionChanges {
        new_name: Some("Dns".into()),
        ..SubscriptionChanges::default()
    };
    let updated = changes.applied_to(&sub.document, &NoAccounts).unwrap();
    apply(&host, WECUTIL, "TestDns", &updated).unwrap();

    assert_eq!(host.names(), vec!["TestSecurity", "Sysmon", "Dns"]);
}

#[test]
fn activation_warning_is_a_warning_outcome() {
    let host = host().with_override(
        "wecutil cs",
        CommandOutput::failed(
            15080,
            "Warning: The subscription is saved successfully, but it can't be activated at this time. Error = 0x3ae8.",
        ),
    );
    let doc = host.document("TestSecurity").unwrap();

    let outcome = apply(&host, WECUTIL, "TestSecurity", &doc).unwrap();
    assert!(matches!(outcome, ApplyOutcome::AppliedWithWarning(w) if w.contains("0x3ae8")));
    assert!(host.files.borrow().is_empty());
}

#[test]
fn create_failure_keeps_the_staged_file() {
    let host = host().with_override(
        "wecutil cs",
        CommandOutput::failed(13, "Failed to create subscription. Error = 0xd.\nThe data is invalid."),
    );
    let doc = host.document("TestSecurity").unwrap();

    let err = apply(&host, WECUTIL, "TestSecurity", &doc).unwrap_err();
    let Some(WecError::Create { temp_path, message, .. }) = err.downcast_ref::<WecError>() else {
        panic!("expected create error, got {err:#}");
    };
    assert!(message.contains("0xd"));
    assert!(host.files.borrow().contains_key(temp_path));
    assert!(host.calls_starting_with("remove ").is_empty());
    // Deleted without rollback.
    assert!(host.document("TestSecurity").is_none());
}

#[test]
fn delete_failure_keeps_the_original() {
    let host = host().with_override(
        "wecutil ds",
        CommandOutput::failed(5, "Failed to delete subscription. Error = 0x5.\nAccess is denied."),
    );
    let doc = host.document("Sysmon").unwrap();

    let err = apply(&host, WECUTIL, "Sysmon", &doc).unwrap_err();
    assert!(matches!(err.downcast_ref::<WecError>(), Some(WecError::Delete { .. })));
    assert!(host.calls_starting_with("wecutil cs").is_empty());
    assert!(host.files.borrow().is_empty());
    assert!(host.document("Sysmon").is_some());
}

#[test]
fn unreachable_delete_removes_the_staged_file() {
    let host = host().with_unreachable("wecutil ds");
    let doc = host.document("Sysmon").unwrap();

    let err = apply(&host, WECUTIL, "Sysmon", &doc).unwrap_err();
    assert!(format!("{err:#}").contains("WinRM"));
    assert_eq!(host.calls_starting_with("remove ").len(), 1);
    assert!(host.files.borrow().is_empty());
    assert!(host.calls_starting_with("wecutil cs").is_empty());
}

#[test]
fn temp_write_failure_stops_before_delete() {
    let mut host = host();
    host.fail_writes = true;
    let doc = host.document("Sysmon").unwrap();

    let err = apply(&host, WECUTIL, "Sysmon", &doc).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<WecError>(),
        Some(WecError::TempFileWrite { .. })
    ));
    assert!(host.calls_starting_with("wecutil ds").is_empty());
}

#[test]
fn import_creates_without_deleting() {
    let host = FakeHost::new().with_subscription("TestSecurity");
    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("imported.xml");
    std::fs::write(&file, common::subscription_xml("Imported")).unwrap();

    let doc = SubscriptionDocument::parse(&std::fs::read_to_string(&file).unwrap()).unwrap();
    let outcome = import(&host, WECUTIL, &doc).unwrap();

    assert_eq!(outcome, ApplyOutcome::Applied);
    assert_eq!(host.names(), vec!["TestSecurity", "Imported"]);
    assert!(host.calls_starting_with("wecutil ds").is_empty());
}
