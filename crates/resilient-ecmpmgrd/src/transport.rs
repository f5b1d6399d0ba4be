//! Command transports for resilient ECMP
//!
//! [`CliTransport`] pipes a command batch into the device CLI inside a named
//! configuration session and commits it as one unit. [`SimulatedDevice`]
//! keeps a running config in memory; it serves both as a transport and as a
//! facts provider so offline runs and tests can observe before/after state.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use eos_cfgmgr_common::{
    shell, CfgMgrError, CfgMgrResult, CommandTransport, FactsProvider, NEGATION_PREFIX,
};

use crate::facts::{parse_line, parse_running_config};
use crate::render::render;
use crate::tables::{session, RESOURCE_NAME};
use crate::types::{AddressFamilyConfig, ConfigurationSet};

/// Sequence number making session names unique within the process.
static SESSION_SEQ: AtomicU32 = AtomicU32::new(0);

/// Applies commands through an on-box CLI configuration session.
///
/// The batch is staged in a named session first. The session is committed
/// only when no line was rejected, and aborted otherwise, so the device never
/// keeps part of a batch.
#[derive(Debug, Clone)]
pub struct CliTransport {
    cli_path: String,
}

impl CliTransport {
    pub fn new(cli_path: impl Into<String>) -> Self {
        Self {
            cli_path: cli_path.into(),
        }
    }

    fn session_name() -> String {
        format!(
            "{}_{}_{}",
            RESOURCE_NAME,
            std::process::id(),
            SESSION_SEQ.fetch_add(1, Ordering::Relaxed)
        )
    }

    fn enter_session(name: &str) -> String {
        format!("{} {}", session::CONFIGURE_SESSION, name)
    }

    /// Stages the batch in session `name` without committing it.
    fn stage_lines(name: &str, commands: &[String]) -> Vec<String> {
        let mut lines = Vec::with_capacity(commands.len() + 2);
        lines.push(Self::enter_session(name));
        lines.extend(commands.iter().cloned());
        lines.push(session::END.to_string());
        lines
    }

    /// Re-enters session `name` and runs `action` (commit or abort).
    fn finish_lines(name: &str, action: &str) -> Vec<String> {
        vec![Self::enter_session(name), action.to_string()]
    }

    async fn run_batch(&self, lines: &[String]) -> CfgMgrResult<String> {
        shell::exec_or_throw(&shell::cli_batch(&self.cli_path, lines)).await
    }
}

/// Returns the first error line echoed by the CLI.
///
/// The CLI exits 0 even when a line is rejected; errors start with '%'.
fn rejected_line(output: &str) -> Option<&str> {
    output
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with('%'))
}

#[async_trait]
impl CommandTransport for CliTransport {
    #[instrument(skip(self, commands), fields(count = commands.len()))]
    async fn edit_config(&mut self, commands: &[String]) -> CfgMgrResult<()> {
        let name = Self::session_name();
        let output = self.run_batch(&Self::stage_lines(&name, commands)).await?;

        if let Some(rejected) = rejected_line(&output) {
            let error = CfgMgrError::transport(rejected.to_string());
            if let Err(e) = self
                .run_batch(&Self::finish_lines(&name, session::ABORT))
                .await
            {
                warn!(session = %name, error = %e, "Failed to abort configuration session");
            }
            return Err(error);
        }

        let output = self
            .run_batch(&Self::finish_lines(&name, session::COMMIT))
            .await?;
        if let Some(rejected) = rejected_line(&output) {
            return Err(CfgMgrError::transport(rejected.to_string()));
        }

        info!(session = %name, "Committed {} commands", commands.len());
        Ok(())
    }
}

/// In-memory device holding resilient ECMP running-config lines.
///
/// Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct SimulatedDevice {
    inner: Arc<Mutex<DeviceState>>,
}

#[derive(Debug, Default)]
struct DeviceState {
    running_config: Vec<String>,
    applied: Vec<Vec<String>>,
}

impl SimulatedDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the device from running-config text.
    ///
    /// Resilience lines are stored in their rendered form, other lines are
    /// dropped.
    pub fn from_running_config(text: &str) -> Self {
        let running_config = text.lines().filter_map(canonical).collect();
        Self {
            inner: Arc::new(Mutex::new(DeviceState {
                running_config,
                applied: Vec::new(),
            })),
        }
    }

    /// Returns the current running-config lines.
    pub async fn running_config(&self) -> Vec<String> {
        self.inner.lock().await.running_config.clone()
    }

    /// Returns every batch applied so far, in order.
    pub async fn applied(&self) -> Vec<Vec<String>> {
        self.inner.lock().await.applied.clone()
    }
}

/// Renders a running-config line the way the device stores it.
fn canonical(line: &str) -> Option<String> {
    let (afi, route) = parse_line(line)?;
    render(&AddressFamilyConfig::new(afi, vec![route]))
        .first()
        .map(ToString::to_string)
}

/// Applies one command to a running config.
fn apply(running_config: &mut Vec<String>, command: &str) -> CfgMgrResult<()> {
    let invalid = || CfgMgrError::transport(format!("% Invalid input: {}", command));

    if let Some(removed) = command.strip_prefix(NEGATION_PREFIX) {
        let removed = canonical(removed).ok_or_else(invalid)?;
        running_config.retain(|line| *line != removed);
        return Ok(());
    }

    let (afi, route) = parse_line(command).ok_or_else(invalid)?;
    let line = canonical(command).ok_or_else(invalid)?;

    // One entry per destination; a new value replaces the old one.
    let existing = running_config.iter().position(|existing| {
        parse_line(existing)
            .map(|(a, r)| a == afi && r.destination == route.destination)
            .unwrap_or(false)
    });
    match existing {
        Some(idx) => running_config[idx] = line,
        None => running_config.push(line),
    }
    Ok(())
}

#[async_trait]
impl CommandTransport for SimulatedDevice {
    async fn edit_config(&mut self, commands: &[String]) -> CfgMgrResult<()> {
        let mut state = self.inner.lock().await;

        // The batch lands as a whole or not at all.
        let mut staged = state.running_config.clone();
        for command in commands {
            apply(&mut staged, command)?;
        }
        state.running_config = staged;
        state.applied.push(commands.to_vec());
        Ok(())
    }
}

#[async_trait]
impl FactsProvider for SimulatedDevice {
    type Facts = ConfigurationSet;

    fn resource_name(&self) -> &str {
        RESOURCE_NAME
    }

    async fn gather(&self) -> CfgMgrResult<ConfigurationSet> {
        let state = self.inner.lock().await;
        Ok(parse_running_config(&state.running_config.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Afi, RouteEntry};
    use pretty_assertions::assert_eq;

    const ROUTE_V4: &str = "ip hardware fib ecmp resilience 10.0.0.0/8 capacity 16 redundancy 2";

    /// CLI stand-in that appends every session it receives to `log`.
    fn recording_cli(log: &tempfile::NamedTempFile, extra: &str) -> String {
        format!("tee -a {} {}; true", log.path().display(), extra)
    }

    fn read_log(log: &tempfile::NamedTempFile) -> Vec<String> {
        std::fs::read_to_string(log.path())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_stage_and_finish_lines() {
        let lines = CliTransport::stage_lines("s1", &[ROUTE_V4.to_string()]);
        assert_eq!(lines, vec!["configure session s1", ROUTE_V4, "end"]);
        assert_eq!(
            CliTransport::finish_lines("s1", session::COMMIT),
            vec!["configure session s1", "commit"]
        );
    }

    #[test]
    fn test_session_names_are_unique() {
        let first = CliTransport::session_name();
        let second = CliTransport::session_name();
        assert!(first.starts_with("resilient_ecmp_"));
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_cli_transport_commits_clean_session() {
        let log = tempfile::NamedTempFile::new().unwrap();
        let mut transport = CliTransport::new(recording_cli(&log, ">/dev/null"));

        transport.edit_config(&[ROUTE_V4.to_string()]).await.unwrap();

        let lines = read_log(&log);
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("configure session resilient_ecmp_"));
        assert_eq!(&lines[1..3], &[ROUTE_V4.to_string(), "end".to_string()]);
        assert_eq!(lines[3], lines[0]);
        assert_eq!(lines[4], "commit");
    }

    #[tokio::test]
    async fn test_cli_transport_aborts_rejected_session() {
        let log = tempfile::NamedTempFile::new().unwrap();
        let mut transport = CliTransport::new(recording_cli(
            &log,
            "| grep bogus >/dev/null && echo '% Invalid input (at token 1)'",
        ));

        match transport
            .edit_config(&[ROUTE_V4.to_string(), "bogus".to_string()])
            .await
        {
            Err(CfgMgrError::Transport { message }) => {
                assert_eq!(message, "% Invalid input (at token 1)")
            }
            other => panic!("Expected Transport error, got {:?}", other),
        }

        let lines = read_log(&log);
        assert_eq!(lines.last().map(String::as_str), Some("abort"));
        assert!(!lines.iter().any(|line| line == "commit"));
    }

    #[tokio::test]
    async fn test_cli_transport_nonzero_exit() {
        let mut transport = CliTransport::new("false");
        let result = transport.edit_config(&[]).await;
        assert!(matches!(result, Err(CfgMgrError::ShellCommandFailed { .. })));
    }

    #[tokio::test]
    async fn test_simulated_device_apply_and_gather() {
        let mut device = SimulatedDevice::from_running_config(
            "hostname leaf1\nip hardware fib ecmp resilience 10.0.0.0/8 capacity 16 redundancy 2\n",
        );

        device
            .edit_config(&[
                "no ip hardware fib ecmp resilience 10.0.0.0/8 capacity 16 redundancy 2".to_string(),
                "ipv6 hardware fib ecmp resilience ::/0 capacity 8 redundancy 1".to_string(),
            ])
            .await
            .unwrap();

        assert_eq!(
            device.gather().await.unwrap(),
            vec![AddressFamilyConfig::new(
                Afi::Ipv6,
                vec![RouteEntry::new("::/0", 8, 1)]
            )]
        );
        assert_eq!(device.applied().await.len(), 1);
    }

    #[tokio::test]
    async fn test_simulated_device_replaces_same_destination() {
        let mut device = SimulatedDevice::new();
        device
            .edit_config(&[
                ROUTE_V4.to_string(),
                "ip hardware fib ecmp resilience 10.0.0.0/8 capacity 32 redundancy 2".to_string(),
            ])
            .await
            .unwrap();
        assert_eq!(
            device.running_config().await,
            vec!["ip hardware fib ecmp resilience 10.0.0.0/8 capacity 32 redundancy 2"]
        );
    }

    #[tokio::test]
    async fn test_simulated_device_failed_batch_changes_nothing() {
        let mut device = SimulatedDevice::from_running_config(ROUTE_V4);

        let result = device
            .edit_config(&[format!("no {}", ROUTE_V4), "bogus".to_string()])
            .await;

        assert!(matches!(result, Err(CfgMgrError::Transport { .. })));
        assert_eq!(device.running_config().await, vec![ROUTE_V4]);
        assert!(device.applied().await.is_empty());
    }

    #[tokio::test]
    async fn test_simulated_device_removes_irregularly_spaced_line() {
        let mut device = SimulatedDevice::from_running_config(
            "  ip hardware fib ecmp resilience  10.0.0.0/8 capacity 16   redundancy 2\n",
        );
        assert_eq!(device.running_config().await, vec![ROUTE_V4]);

        let result = crate::ResilientEcmpMgr::new(device.clone(), device.clone())
            .execute(&[], crate::ResourceState::Deleted)
            .await
            .unwrap();

        assert_eq!(result.commands, vec![format!("no {}", ROUTE_V4)]);
        assert_eq!(result.after, Some(vec![]));
        assert!(device.gather().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_simulated_device_rejects_unknown_command() {
        let mut device = SimulatedDevice::new();
        let result = device.edit_config(&["router bgp 65000".to_string()]).await;
        assert!(matches!(result, Err(CfgMgrError::Transport { .. })));
        let result = device.edit_config(&["no router bgp 65000".to_string()]).await;
        assert!(matches!(result, Err(CfgMgrError::Transport { .. })));
        assert!(device.applied().await.is_empty());
    }
}
