//! Shell command execution utilities for cfgmgr daemons.
//!
//! Device CLI sessions are driven through `/bin/sh` so that a batch of
//! configuration lines can be piped into the CLI in one invocation.
//! Every argument that ends up on a shell line goes through [`shellquote`].
//!
//! # Example
//!
//! ```ignore
//! use eos_cfgmgr_common::shell::{self, FASTCLI_CMD};
//!
//! let lines = vec!["configure".to_string(), "end".to_string()];
//! let cmd = shell::cli_batch(FASTCLI_CMD, &lines);
//! let result = shell::exec(&cmd).await?;
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{CfgMgrError, CfgMgrResult};

/// Path to the EOS `FastCli` binary used for on-box CLI sessions.
pub const FASTCLI_CMD: &str = "/usr/bin/FastCli";

/// Privilege level requested for configuration sessions.
pub const CLI_PRIVILEGE: &str = "15";

/// Path to the `printf` command used to feed CLI sessions.
pub const PRINTF_CMD: &str = "/usr/bin/printf";

/// Regex for characters that need escaping in shell double-quotes.
/// Matches: $, `, ", \
static SHELL_ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([$`"\\])"#).expect("Invalid regex pattern"));

/// Quotes a string for safe use in shell commands.
///
/// Wraps the string in double quotes and escapes `$`, `` ` ``, `"` and `\`.
///
/// # Example
///
/// ```
/// use eos_cfgmgr_common::shell::shellquote;
///
/// assert_eq!(shellquote("simple"), "\"simple\"");
/// assert_eq!(shellquote("with$var"), "\"with\\$var\"");
/// assert_eq!(shellquote("with\"quote"), "\"with\\\"quote\"");
/// ```
pub fn shellquote(s: &str) -> String {
    let escaped = SHELL_ESCAPE_RE.replace_all(s, r"\$1");
    format!("\"{}\"", escaped)
}

/// Builds a shell line that pipes `lines` into a CLI session.
///
/// Each line is quoted separately and printed with a trailing newline,
/// so line breaks inside a single line cannot inject extra commands.
pub fn cli_batch(cli_path: &str, lines: &[String]) -> String {
    let quoted: Vec<String> = lines
        .iter()
        .map(|line| shellquote(&line.replace('\n', " ")))
        .collect();
    format!(
        "{} '%s\\n' {} | {} -p {}",
        PRINTF_CMD,
        quoted.join(" "),
        cli_path,
        CLI_PRIVILEGE
    )
}

/// Builds a shell line that runs a single show command in the CLI.
pub fn cli_show(cli_path: &str, show_cmd: &str) -> String {
    format!(
        "{} -p {} -c {}",
        cli_path,
        CLI_PRIVILEGE,
        shellquote(show_cmd)
    )
}

/// Result of a shell command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// The exit code of the command (0 = success).
    pub exit_code: i32,
    /// The combined stdout output.
    pub stdout: String,
    /// The combined stderr output.
    pub stderr: String,
}

impl ExecResult {
    /// Returns true if the command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns the combined output (stdout + stderr) for error messages.
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Executes a shell command asynchronously.
///
/// The command runs through `/bin/sh -c` so pipes work.
///
/// # Returns
///
/// * `Ok(ExecResult)` - The command execution result
/// * `Err(CfgMgrError)` - If the command could not be spawned
pub async fn exec(cmd: &str) -> CfgMgrResult<ExecResult> {
    tracing::debug!(command = %cmd, "Executing shell command");

    let output = Command::new("/bin/sh")
        .arg("-c")
        .arg(cmd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| CfgMgrError::ShellExec {
            command: cmd.to_string(),
            source: e,
        })?;

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    let result = ExecResult {
        exit_code,
        stdout,
        stderr,
    };

    if result.success() {
        tracing::trace!(command = %cmd, exit_code = exit_code, "Command succeeded");
    } else {
        tracing::warn!(
            command = %cmd,
            exit_code = exit_code,
            stderr = %result.stderr,
            "Command failed"
        );
    }

    Ok(result)
}

/// Executes a shell command and returns an error on non-zero exit.
///
/// # Returns
///
/// * `Ok(String)` - The stdout output on success
/// * `Err(CfgMgrError)` - If the command fails or returns non-zero
pub async fn exec_or_throw(cmd: &str) -> CfgMgrResult<String> {
    let result = exec(cmd).await?;
    if result.success() {
        Ok(result.stdout)
    } else {
        Err(CfgMgrError::ShellCommandFailed {
            command: cmd.to_string(),
            exit_code: result.exit_code,
            output: result.combined_output(),
        })
    }
}
