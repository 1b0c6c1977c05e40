use std::fmt;

use anyhow::{Context, Result, bail};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use wecsub_core::config::SessionProfile;

use super::HostShell;
use crate::cmd::{CommandOutput, run_cmd_output};
use crate::prompt::PASSWORD_ENV;

/// Explicit account for WinRM authentication.
#[derive(Clone)]
pub struct Credential {
    pub username: String,
    password: String,
}

impl Credential {
    pub const fn new(username: String, password: String) -> Self {
        Self { username, password }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Runs commands on a remote collector through `Invoke-Command`.
///
/// Each call starts a local PowerShell with an encoded script. The remote
/// script block returns `{ ExitCode, Output }`, which comes back as JSON.
#[derive(Debug, Clone)]
pub struct RemoteShell {
    computer: String,
    port: Option<u16>,
    use_ssl: bool,
    authentication: Option<String>,
    credential: Option<Credential>,
    powershell: String,
    session_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemoteResult {
    #[serde(rename = "ExitCode")]
    exit_code: Option<i32>,
    #[serde(rename = "Output")]
    output: Option<String>,
}

impl RemoteShell {
    pub fn new(computer: String, powershell: &str, credential: Option<Credential>) -> Self {
        Self {
            computer,
            port: None,
            use_ssl: false,
            authentication: None,
            credential,
            powershell: powershell.to_string(),
            session_name: None,
        }
    }

    pub fn from_profile(
        profile: &SessionProfile,
        powershell: &str,
        credential: Option<Credential>,
    ) -> Self {
        Self {
            computer: profile.computer.clone(),
            port: profile.port,
            use_ssl: profile.use_ssl,
            authentication: profile.authentication.clone(),
            credential,
            powershell: powershell.to_string(),
            session_name: None,
        }
    }

    #[must_use]
    pub fn with_session_name(mut self, name: &str) -> Self {
        self.session_name = Some(name.to_string());
        self
    }

    /// Wrap `body` in an `Invoke-Command` call against this computer.
    fn build_script(&self, body: &str) -> String {
        let mut script = String::from(
            "$ErrorActionPreference = 'Stop'\n$ProgressPreference = 'SilentlyContinue'\n",
        );
        script.push_str(&format!(
            "$params = @{{ ComputerName = {} }}\n",
            ps_quote(&self.computer)
        ));
        if let Some(port) = self.port {
            script.push_str(&format!("$params.Port = {port}\n"));
        }
        if self.use_ssl {
            script.push_str("$params.UseSSL = $true\n");
        }
        if let Some(auth) = &self.authentication {
            script.push_str(&format!("$params.Authentication = {}\n", ps_quote(auth)));
        }
        if let Some(cred) = &self.credential {
            script.push_str(&format!(
                "$secure = ConvertTo-SecureString $env:{PASSWORD_ENV} -AsPlainText -Force\n\
                 $params.Credential = New-Object System.Management.Automation.PSCredential({}, $secure)\n",
                ps_quote(&cred.username)
            ));
        }
        script.push_str("$result = Invoke-Command @params -ScriptBlock {\n");
        script.push_str(body);
        script.push_str("\n}\n$result | Select-Object ExitCode, Output | ConvertTo-Json -Compress\n");
        script
    }

    fn invoke(&self, body: &str) -> Result<RemoteResult> {
        let encoded = encode_command(&self.build_script(body));
        let args = ["-NoProfile", "-NonInteractive", "-EncodedCommand", encoded.as_str()];
        let env: Vec<(&str, &str)> = self
            .credential
            .as_ref()
            .map(|c| vec![(PASSWORD_ENV, c.password.as_str())])
            .unwrap_or_default();

        let output = run_cmd_output(&self.powershell, &args, &env)?;
        if !output.success {
            bail!(
                "remote invocation on {} failed: {}",
                self.computer,
                output.combined()
            );
        }
        parse_remote_result(&output.stdout)
            .with_context(|| format!("unexpected reply from {}", self.computer))
    }

    fn invoke_checked(&self, body: &str, what: &str) -> Result<String> {
        let result = self.invoke(body)?;
        let output = result.output.unwrap_or_default();
        if result.exit_code.unwrap_or(0) != 0 {
            bail!("{what} on {} failed: {}", self.computer, output.trim());
        }
        Ok(output)
    }
}

impl HostShell for RemoteShell {
    fn computer(&self) -> &str {
        &self.computer
    }

    fn session_name(&self) -> Option<&str> {
        self.session_name.as_deref()
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        tracing::debug!(computer = %self.computer, "exec (remote): {program} {}", args.join(" "));
        let quoted: Vec<String> = args.iter().map(|a| ps_quote(a)).collect();
        let body = format!(
            "$out = & {} {} 2>&1 | ForEach-Object {{ \"$_\" }}\n\
             [pscustomobject]@{{ ExitCode = $LASTEXITCODE; Output = ($out -join \"`n\") }}",
            ps_quote(program),
            quoted.join(" ")
        );
        let result = self.invoke(&body)?;
        Ok(CommandOutput {
            success: result.exit_code == Some(0),
            code: result.exit_code,
            stdout: result.output.unwrap_or_default(),
            stderr: String::new(),
        })
    }

    fn temp_dir(&self) -> Result<String> {
        let body = "[pscustomobject]@{ ExitCode = 0; Output = [System.IO.Path]::GetTempPath() }";
        Ok(self.invoke_checked(body, "temp directory lookup")?.trim().to_string())
    }

    fn write_file(&self, path: &str, contents: &str) -> Result<()> {
        let body = format!(
            "$text = [System.Text.Encoding]::UTF8.GetString([System.Convert]::FromBase64String('{}'))\n\
             [System.IO.File]::WriteAllText({}, $text)\n\
             [pscustomobject]@{{ ExitCode = 0; Output = '' }}",
            STANDARD.encode(contents.as_bytes()),
            ps_quote(path)
        );
        self.invoke_checked(&body, "file write").map(drop)
    }

    fn remove_file(&self, path: &str) -> Result<()> {
        let body = format!(
            "Remove-Item -LiteralPath {} -Force -ErrorAction Stop\n\
             [pscustomobject]@{{ ExitCode = 0; Output = '' }}",
            ps_quote(path)
        );
        self.invoke_checked(&body, "file removal").map(drop)
    }
}

/// Quote a value as a PowerShell single-quoted string literal.
pub fn ps_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        // PowerShell also treats typographic single quotes as delimiters.
        if matches!(c, '\'' | '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}') {
            out.push(c);
        }
        out.push(c);
    }
    out.push('\'');
    out
}

/// Base64 of the UTF-16LE script, as `-EncodedCommand` expects.
fn encode_command(script: &str) -> String {
    let bytes: Vec<u8> = script.encode_utf16().flat_map(u16::to_le_bytes).collect();
    STANDARD.encode(bytes)
}

/// The JSON reply is the last non-empty line of stdout.
fn parse_remote_result(stdout: &str) -> Result<RemoteResult> {
    let line = stdout
        .lines()
        .map(str::trim)
        .rfind(|l| !l.is_empty())
        .context("no output")?;
    Ok(serde_json::from_str(line)?)
}
