//! In-memory collector host for integration tests.
//!
//! Simulates `sc.exe` and `wecutil` well enough to drive enumeration and the
//! delete-then-create flow, and records every call for ordering assertions.

#![allow(dead_code, clippy::unwrap_used)]

use std::cell::RefCell;
use std::collections::BTreeMap;

use anyhow::{Result, bail};

use wecsub::cmd::CommandOutput;
use wecsub::host::HostShell;
use wecsub_core::SubscriptionDocument;

pub const WECUTIL: &str = "wecutil";
pub const TEMP_DIR: &str = "C:\\Windows\\Temp";

pub struct FakeHost {
    pub service_running: bool,
    pub fail_writes: bool,
    /// Subscription documents by name, in `wecutil es` order.
    pub subscriptions: RefCell<Vec<(String, String)>>,
    pub files: RefCell<BTreeMap<String, String>>,
    pub calls: RefCell<Vec<String>>,
    /// Canned replies for commands starting with the given text.
    overrides: Vec<(String, CommandOutput)>,
    /// Commands starting with the given text fail to run at all.
    unreachable: Vec<String>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            service_running: true,
            fail_writes: false,
            subscriptions: RefCell::new(Vec::new()),
            files: RefCell::new(BTreeMap::new()),
            calls: RefCell::new(Vec::new()),
            overrides: Vec::new(),
            unreachable: Vec::new(),
        }
    }

    pub fn with_subscription(self, name: &str) -> Self {
        self.subscriptions
            .borrow_mut()
            .push((name.to_string(), subscription_xml(name)));
        self
    }

    pub fn with_override(mut self, prefix: &str, output: CommandOutput) -> Self {
        self.overrides.push((prefix.to_string(), output));
        self
    }

    pub fn with_unreachable(mut self, prefix: &str) -> Self {
        self.unreachable.push(prefix.to_string());
        self
    }

    pub fn names(&self) -> Vec<String> {
        self.subscriptions.borrow().iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn document(&self, name: &str) -> Option<SubscriptionDocument> {
        self.subscriptions
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, xml)| SubscriptionDocument::parse(xml).unwrap())
    }

    /// Recorded calls whose text starts with `prefix`.
    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn wecutil(&self, args: &[&str]) -> CommandOutput {
        match args {
            ["es"] => CommandOutput::ok(self.names().join("\r\n")),
            ["gs", name, "/f:xml"] => match self.subscriptions.borrow().iter().find(|(n, _)| n == *name) {
                Some((_, xml)) => CommandOutput::ok(xml.clone()),
                None => not_found(),
            },
            ["ds", name] => {
                let mut subs = self.subscriptions.borrow_mut();
                match subs.iter().position(|(n, _)| n == *name) {
                    Some(i) => {
                        subs.remove(i);
                        CommandOutput::ok("")
                    }
                    None => not_found(),
                }
            }
            ["cs", path] => {
                let Some(xml) = self.files.borrow().get(*path).cloned() else {
                    return CommandOutput::failed(2, "Failed to open file. Error = 0x2.");
                };
                let name = SubscriptionDocument::parse(&xml)
                    .unwrap()
                    .subscription_id()
                    .unwrap();
                self.subscriptions.borrow_mut().push((name, xml));
                CommandOutput::ok("")
            }
            ["gr", name] => CommandOutput::ok(format!("Subscription: {name}\n\tRunTimeStatus: Active")),
            ["rs", _] => CommandOutput::ok(""),
            _ => CommandOutput::failed(87, "The parameter is incorrect."),
        }
    }
}

fn not_found() -> CommandOutput {
    CommandOutput::failed(
        15007,
        "Failed to open subscription. Error = 0x3a9f.\nThe specified channel could not be found.",
    )
}

impl HostShell for FakeHost {
    fn computer(&self) -> &str {
        "wec01"
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let line = format!("{program} {}", args.join(" "));
        self.calls.borrow_mut().push(line.clone());

        if self.unreachable.iter().any(|p| line.starts_with(p)) {
            bail!("WinRM cannot complete the operation on wec01");
        }
        if let Some((_, output)) = self.overrides.iter().find(|(p, _)| line.starts_with(p)) {
            return Ok(output.clone());
        }
        match program {
            "sc.exe" if self.service_running => Ok(CommandOutput::ok(
                "SERVICE_NAME: wecsvc\n        TYPE               : 20  WIN32_SHARE_PROCESS\n        STATE              : 4  RUNNING\n",
            )),
            "sc.exe" => Ok(CommandOutput::ok(
                "SERVICE_NAME: wecsvc\n        STATE              : 1  STOPPED\n",
            )),
            WECUTIL => Ok(self.wecutil(args)),
            other => bail!("unexpected program {other}"),
        }
    }

    fn temp_dir(&self) -> Result<String> {
        Ok(TEMP_DIR.to_string())
    }

    fn write_file(&self, path: &str, contents: &str) -> Result<()> {
        self.calls.borrow_mut().push(format!("write {path}"));
        if self.fail_writes {
            bail!("Access to the path '{path}' is denied.");
        }
        self.files.borrow_mut().insert(path.to_string(), contents.to_string());
        Ok(())
    }

    fn remove_file(&self, path: &str) -> Result<()> {
        self.calls.borrow_mut().push(format!("remove {path}"));
        self.files.borrow_mut().remove(path);
        Ok(())
    }
}

pub fn subscription_xml(name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Subscription xmlns="http://schemas.microsoft.com/2006/03/windows/events/subscription">
  <SubscriptionId>{name}</SubscriptionId>
  <SubscriptionType>SourceInitiated</SubscriptionType>
  <Description>Forward security events</Description>
  <Enabled>true</Enabled>
  <Uri>http://schemas.microsoft.com/wbem/wsman/1/windows/EventLog</Uri>
  <ConfigurationMode>Normal</ConfigurationMode>
  <Delivery Mode="Push">
    <Batching>
      <MaxItems>1</MaxItems>
      <MaxLatencyTime>900000</MaxLatencyTime>
    </Batching>
    <PushSettings>
      <Heartbeat Interval="900000"/>
    </PushSettings>
  </Delivery>
  <Query><![CDATA[<QueryList><Query Id="0"><Select Path="Security">*</Select></Query></QueryList>]]></Query>
  <ReadExistingEvents>false</ReadExistingEvents>
  <TransportName>HTTP</TransportName>
  <ContentFormat>RenderedText</ContentFormat>
  <Locale Language="en-US"/>
  <LogFile>ForwardedEvents</LogFile>
  <PublisherName>Microsoft-Windows-EventCollector</PublisherName>
  <AllowedSourceDomainComputers>O:NSG:BAD:P(A;;GA;;;DC)S:</AllowedSourceDomainComputers>
</Subscription>"#
    )
}
