#![allow(clippy::unwrap_used)] // Integration tests use unwrap for brevity

//! `set`, `enable` and `disable` driven through the command dispatcher.

mod common;

use common::{FakeHost, WECUTIL};
use wecsub::commands::lifecycle::NamesArgs;
use wecsub::commands::set::SetArgs;
use wecsub::commands::{self, Command, Context};
use wecsub_core::Config;

fn config() -> Config {
    Config {
        wecutil_path: WECUTIL.to_string(),
        ..Config::default()
    }
}

fn run(host: &FakeHost, command: Command) -> anyhow::Result<()> {
    let config = config();
    let ctx = Context {
        shell: host,
        config: &config,
        non_interactive: true,
        json: false,
    };
    commands::run(&ctx, command)
}

fn host() -> FakeHost {
    FakeHost::new()
        .with_subscription("TestSecurity")
        .with_subscription("Sysmon")
        .with_subscription("TestDns")
}

fn names(patterns: &[&str]) -> NamesArgs {
    NamesArgs {
        names: patterns.iter().map(|p| (*p).to_string()).collect(),
        yes: true,
    }
}

#[test]
fn rename_onto_an_existing_name_is_refused_before_delete() {
    let host = host();
    let err = run(
        &host,
        Command::Set(SetArgs {
            name: "TestDns".into(),
            new_name: Some("sysmon".into()),
            yes: true,
            ..SetArgs::default()
        }),
    )
    .unwrap_err();

    assert!(err.to_string().contains("already exists"));
    assert!(host.calls_starting_with("wecutil ds").is_empty());
    assert!(host.calls_starting_with("write ").is_empty());
    assert_eq!(host.names(), vec!["TestSecurity", "Sysmon", "TestDns"]);
}

#[test]
fn rename_with_several_matches_is_refused() {
    let host = host();
    let result = run(
        &host,
        Command::Set(SetArgs {
            name: "Test*".into(),
            new_name: Some("Renamed".into()),
            yes: true,
            ..SetArgs::default()
        }),
    );

    assert!(result.is_err());
    assert!(host.calls_starting_with("wecutil ds").is_empty());
}

#[test]
fn rename_to_a_free_name_replaces_the_subscription() {
    let host = host();
    run(
        &host,
        Command::Set(SetArgs {
            name: "TestDns".into(),
            new_name: Some("Dns".into()),
            yes: true,
            ..SetArgs::default()
        }),
    )
    .unwrap();

    assert_eq!(host.names(), vec!["TestSecurity", "Sysmon", "Dns"]);
}

#[test]
fn set_without_changes_is_rejected() {
    let host = host();
    let result = run(
        &host,
        Command::Set(SetArgs {
            name: "TestDns".into(),
            ..SetArgs::default()
        }),
    );
    assert!(result.is_err());
    assert!(host.calls.borrow().is_empty());
}

#[test]
fn what_if_leaves_the_host_untouched() {
    let host = host();
    run(
        &host,
        Command::Set(SetArgs {
            name: "TestSecurity".into(),
            description: Some("edited".into()),
            what_if: true,
            ..SetArgs::default()
        }),
    )
    .unwrap();

    assert!(host.calls_starting_with("write ").is_empty());
    assert!(host.calls_starting_with("wecutil ds").is_empty());
    assert!(host.calls_starting_with("wecutil cs").is_empty());
    assert_eq!(
        host.document("TestSecurity").unwrap().description().as_deref(),
        Some("Forward security events")
    );
}

#[test]
fn enabling_an_enabled_subscription_changes_nothing() {
    let host = host();
    run(&host, Command::Enable(names(&["TestSecurity"]))).unwrap();

    assert!(host.calls_starting_with("write ").is_empty());
    assert!(host.calls_starting_with("wecutil ds").is_empty());
}

#[test]
fn disable_applies_to_every_match() {
    let host = host();
    run(&host, Command::Disable(names(&["Test*"]))).unwrap();

    assert_eq!(
        host.calls_starting_with("wecutil ds"),
        vec!["wecutil ds TestSecurity", "wecutil ds TestDns"]
    );
    assert_eq!(host.document("TestSecurity").unwrap().enabled(), Some(false));
    assert_eq!(host.document("TestDns").unwrap().enabled(), Some(false));
    assert_eq!(host.document("Sysmon").unwrap().enabled(), Some(true));
    assert!(host.files.borrow().is_empty());
}
