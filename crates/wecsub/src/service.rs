use anyhow::Result;

use crate::error::WecError;
use crate::host::HostShell;

/// Service name of the Windows Event Collector.
pub const COLLECTOR_SERVICE: &str = "wecsvc";

/// Whether `sc.exe query` output reports a running service.
fn is_running(sc_output: &str) -> bool {
    sc_output
        .lines()
        .map(str::trim)
        .filter(|l| l.to_ascii_uppercase().starts_with("STATE"))
        .any(|l| l.to_ascii_uppercase().contains("RUNNING"))
}

/// Fail with [`WecError::ServiceNotRunning`] unless wecsvc runs on the host.
pub fn ensure_collector_running(shell: &dyn HostShell) -> Result<()> {
    let output = shell.run("sc.exe", &["query", COLLECTOR_SERVICE])?;
    if output.success && is_running(&output.stdout) {
        tracing::debug!(computer = shell.computer(), "wecsvc is running");
        return Ok(());
    }
    tracing::debug!(computer = shell.computer(), "sc.exe query: {}", output.combined());
    Err(WecError::ServiceNotRunning {
        computer: shell.computer().to_string(),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUNNING: &str = "
SERVICE_NAME: wecsvc
        TYPE               : 20  WIN32_SHARE_PROCESS
        STATE              : 4  RUNNING
                                (STOPPABLE, NOT_PAUSABLE, ACCEPTS_SHUTDOWN)
        WIN32_EXIT_CODE    : 0  (0x0)
";

    const STOPPED: &str = "
SERVICE_NAME: wecsvc
        TYPE               : 20  WIN32_SHARE_PROCESS
        STATE              : 1  STOPPED
        WIN32_EXIT_CODE    : 1077  (0x435)
";

    #[test]
    fn detects_running_state() {
        assert!(is_running(RUNNING));
    }

    #[test]
    fn stopped_service_is_not_running() {
        assert!(!is_running(STOPPED));
    }

    #[test]
    fn missing_service_is_not_running() {
        assert!(!is_running(
            "[SC] EnumQueryServicesStatus:OpenService FAILED 1060:\n\nThe specified service does not exist as an installed service."
        ));
    }
}
