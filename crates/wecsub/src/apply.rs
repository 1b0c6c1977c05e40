//! Replace a live subscription with an edited document.
//!
//! `wecutil` cannot update a subscription in place. The document is staged in
//! a temporary file on the host, the old subscription is deleted and a new one
//! is created from the file. Nothing restores the old subscription if the
//! create step fails; the staged file is kept so it can be retried by hand.

use anyhow::Result;
use wecsub_core::SubscriptionDocument;

use crate::error::WecError;
use crate::host::{HostShell, join_host_path};
use crate::wecutil::{Verdict, Wecutil};

/// Result of a successful apply or import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Saved, but `wecutil` reported a non-fatal condition.
    AppliedWithWarning(String),
}

/// Write `xml` to a fresh temporary file on the host and return its path.
pub fn stage(shell: &dyn HostShell, xml: &str) -> Result<String> {
    let temp_dir = shell
        .temp_dir()
        .map_err(|e| temp_write_error(shell, "<temp dir>", &e))?;
    let path = join_host_path(&temp_dir, &format!("wecsub_{}.xml", uuid::Uuid::new_v4()));
    tracing::debug!(computer = shell.computer(), %path, "staging subscription document");
    shell
        .write_file(&path, xml)
        .map_err(|e| temp_write_error(shell, &path, &e))?;
    Ok(path)
}

/// Delete `original_name` and recreate it from `document`.
pub fn apply(
    shell: &dyn HostShell,
    wecutil_path: &str,
    original_name: &str,
    document: &SubscriptionDocument,
) -> Result<ApplyOutcome> {
    let wecutil = Wecutil::new(shell, wecutil_path);
    let name = document
        .subscription_id()
        .unwrap_or_else(|| original_name.to_string());

    let path = stage(shell, &document.to_xml()?)?;

    tracing::info!(computer = shell.computer(), subscription = original_name, "deleting subscription");
    let verdict = match wecutil.delete(original_name) {
        Ok(verdict) => verdict,
        Err(e) => {
            remove_staged(shell, &path);
            return Err(e);
        }
    };
    if let Verdict::Failure(message) | Verdict::Warning(message) = verdict {
        remove_staged(shell, &path);
        return Err(WecError::Delete {
            computer: shell.computer().to_string(),
            name: original_name.to_string(),
            message,
        }
        .into());
    }

    tracing::info!(computer = shell.computer(), subscription = %name, "creating subscription");
    create_staged(&wecutil, &name, path)
}

/// Create a subscription from `document` without deleting anything first.
pub fn import(
    shell: &dyn HostShell,
    wecutil_path: &str,
    document: &SubscriptionDocument,
) -> Result<ApplyOutcome> {
    let wecutil = Wecutil::new(shell, wecutil_path);
    let name = document.subscription_id().unwrap_or_default();
    let path = stage(shell, &document.to_xml()?)?;
    tracing::info!(computer = shell.computer(), subscription = %name, "creating subscription");
    create_staged(&wecutil, &name, path)
}

fn create_staged(wecutil: &Wecutil<'_>, name: &str, path: String) -> Result<ApplyOutcome> {
    let shell = wecutil.shell();
    match wecutil.create(&path)? {
        Verdict::Success => {
            remove_staged(shell, &path);
            Ok(ApplyOutcome::Applied)
        }
        Verdict::Warning(message) => {
            tracing::warn!(computer = shell.computer(), subscription = name, "{message}");
            remove_staged(shell, &path);
            Ok(ApplyOutcome::AppliedWithWarning(message))
        }
        Verdict::Failure(message) => {
            tracing::error!(
                computer = shell.computer(),
                subscription = name,
                staged = %path,
                "create failed; staged document left in place"
            );
            Err(WecError::Create {
                computer: shell.computer().to_string(),
                name: name.to_string(),
                temp_path: path,
                message,
            }
            .into())
        }
    }
}

fn remove_staged(shell: &dyn HostShell, path: &str) {
    if let Err(e) = shell.remove_file(path) {
        tracing::warn!(computer = shell.computer(), %path, "failed to remove temporary file: {e:#}");
    }
}

fn temp_write_error(shell: &dyn HostShell, path: &str, e: &anyhow::Error) -> WecError {
    WecError::TempFileWrite {
        computer: shell.computer().to_string(),
        path: path.to_string(),
        reason: format!("{e:#}"),
    }
}
